pub mod diff;
pub mod eval;
pub mod expr;
pub mod expression;
pub mod simplify;

pub use eval::Bindings;
pub use expression::Expression;
