use crate::lang::ast::*;
use crate::lang::error::{LangError, LangResult};
use crate::lang::lexer::Lexer;
use crate::lang::token::{Token, TokenKind};

/// Binding power of prefix `-`/`+`: tighter than `*`, looser than `^`,
/// so `-x^2` is `-(x^2)`.
const PREFIX_BP: u8 = 5;

/// Limit on nested sub-expressions, so evaluation and differentiation
/// of the resulting tree cannot exhaust the stack.
pub const MAX_DEPTH: usize = 256;

/// Pratt parser for single-expression formulas in x and y.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Upper bound on the depth of the node being parsed.
    depth: usize,
}

/// Lex and parse a complete expression.
pub fn parse_source(source: &str) -> LangResult<Expr> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_expression()
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parse one expression and require that it consumes all input.
    pub fn parse_expression(&mut self) -> LangResult<Expr> {
        if self.is_at_end() {
            return Err(LangError::parse("expression is empty"));
        }
        let expr = self.parse_expr(0)?;
        if !self.is_at_end() {
            let tok = self.peek();
            return Err(
                LangError::parse(format!("unexpected {}", tok.kind.describe())).with_span(tok.span)
            );
        }
        Ok(expr)
    }

    fn parse_expr(&mut self, min_bp: u8) -> LangResult<Expr> {
        let entry = self.depth;
        let result = self.parse_chain(min_bp);
        self.depth = entry;
        result
    }

    /// Pratt loop: parse expression with given minimum binding power.
    /// Every operator in a chain nests the left side one level deeper.
    fn parse_chain(&mut self, min_bp: u8) -> LangResult<Expr> {
        self.descend()?;
        let mut lhs = self.parse_prefix()?;

        loop {
            let (op, left_bp, right_bp) = match self.peek_kind() {
                TokenKind::Plus => (BinOpKind::Add, 1, 2),
                TokenKind::Minus => (BinOpKind::Sub, 1, 2),
                TokenKind::Star => (BinOpKind::Mul, 3, 4),
                TokenKind::Slash => (BinOpKind::Div, 3, 4),
                TokenKind::Caret => (BinOpKind::Pow, 8, 7), // right-associative
                _ => break,
            };

            if left_bp < min_bp {
                break;
            }

            self.advance();
            self.descend()?;
            let rhs = self.parse_expr(right_bp)?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> LangResult<Expr> {
        match self.peek_kind() {
            TokenKind::Integer(_) | TokenKind::Float(_) => self.parse_number(),
            TokenKind::Ident(_) => self.parse_ident(),
            TokenKind::LParen => self.parse_grouped(),
            TokenKind::Pipe => self.parse_abs(),
            TokenKind::Minus => {
                let op_span = self.advance().span;
                let operand = self.parse_expr(PREFIX_BP)?;
                let span = op_span.merge(operand.span());
                Ok(Expr::Neg {
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenKind::Plus => {
                self.advance();
                self.parse_expr(PREFIX_BP)
            }
            _ => {
                let tok = self.peek();
                Err(LangError::parse(format!(
                    "expected expression, found {}",
                    tok.kind.describe()
                ))
                .with_span(tok.span))
            }
        }
    }

    fn parse_number(&mut self) -> LangResult<Expr> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Integer(n) => Ok(Expr::Number(NumberLit::Int(n), tok.span)),
            TokenKind::Float(f) => Ok(Expr::Number(NumberLit::Float(f), tok.span)),
            _ => unreachable!(),
        }
    }

    fn parse_ident(&mut self) -> LangResult<Expr> {
        let tok = self.advance();
        let name = match tok.kind {
            TokenKind::Ident(name) => name,
            _ => unreachable!(),
        };
        if self.peek_kind() == TokenKind::LParen {
            return self.parse_call(name, tok.span);
        }
        Ok(Expr::Ident(name, tok.span))
    }

    fn parse_call(&mut self, name: String, start: crate::lang::token::Span) -> LangResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();

        if self.peek_kind() != TokenKind::RParen {
            args.push(self.parse_expr(0)?);
            while self.peek_kind() == TokenKind::Comma {
                self.advance();
                args.push(self.parse_expr(0)?);
            }
        }

        let end = self.expect(TokenKind::RParen)?.span;
        Ok(Expr::Call {
            name,
            args,
            span: start.merge(end),
        })
    }

    fn parse_grouped(&mut self) -> LangResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expr(0)?;
        self.expect(TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_abs(&mut self) -> LangResult<Expr> {
        let start = self.expect(TokenKind::Pipe)?.span;
        let inner = self.parse_expr(0)?;
        let end = self.expect(TokenKind::Pipe)?.span;
        // Desugar |x| to abs(x)
        Ok(Expr::Call {
            name: "abs".to_string(),
            args: vec![inner],
            span: start.merge(end),
        })
    }

    fn descend(&mut self) -> LangResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(LangError::parse(format!(
                "expression is nested too deeply (limit {})",
                MAX_DEPTH
            ))
            .with_span(self.peek().span));
        }
        Ok(())
    }

    // --- Token helpers ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind.clone()
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> LangResult<Token> {
        let tok = self.peek().clone();
        if std::mem::discriminant(&tok.kind) == std::mem::discriminant(&kind) {
            Ok(self.advance())
        } else {
            Err(LangError::parse(format!(
                "expected {}, found {}",
                kind.describe(),
                tok.kind.describe()
            ))
            .with_span(tok.span))
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.tokens[self.pos].kind, TokenKind::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::error::ErrorKind;

    fn parse(input: &str) -> Expr {
        parse_source(input).unwrap()
    }

    #[test]
    fn test_simple_arithmetic() {
        let expr = parse("3 + 4 * 2");
        // Add(3, Mul(4, 2)) due to precedence
        match expr {
            Expr::BinOp {
                op: BinOpKind::Add,
                lhs,
                rhs,
                ..
            } => {
                assert!(matches!(*lhs, Expr::Number(NumberLit::Int(3), _)));
                assert!(matches!(
                    *rhs,
                    Expr::BinOp {
                        op: BinOpKind::Mul,
                        ..
                    }
                ));
            }
            _ => panic!("unexpected: {:?}", expr),
        }
    }

    #[test]
    fn test_exponentiation_right_assoc() {
        let expr = parse("2^3^4");
        match expr {
            Expr::BinOp {
                op: BinOpKind::Pow,
                rhs,
                ..
            } => {
                assert!(matches!(
                    *rhs,
                    Expr::BinOp {
                        op: BinOpKind::Pow,
                        ..
                    }
                ));
            }
            _ => panic!("unexpected: {:?}", expr),
        }
    }

    #[test]
    fn test_neg_binds_looser_than_pow() {
        // -x^2 is -(x^2)
        let expr = parse("-x^2");
        match expr {
            Expr::Neg { operand, .. } => {
                assert!(matches!(
                    *operand,
                    Expr::BinOp {
                        op: BinOpKind::Pow,
                        ..
                    }
                ));
            }
            _ => panic!("unexpected: {:?}", expr),
        }
    }

    #[test]
    fn test_func_call() {
        let expr = parse("log(2, x)");
        match expr {
            Expr::Call { name, args, .. } => {
                assert_eq!(name, "log");
                assert_eq!(args.len(), 2);
            }
            _ => panic!("unexpected: {:?}", expr),
        }
    }

    #[test]
    fn test_abs_bars() {
        let expr = parse("|x - y|");
        assert!(matches!(expr, Expr::Call { ref name, .. } if name == "abs"));
    }

    #[test]
    fn test_implicit_mul() {
        let expr = parse("3x");
        assert!(matches!(
            expr,
            Expr::BinOp {
                op: BinOpKind::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_dangling_operator() {
        let err = parse_source("x +").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert!(err.message.contains("end of input"), "{}", err.message);
    }

    #[test]
    fn test_empty_input() {
        let err = parse_source("   ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert_eq!(err.message, "expression is empty");
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let deep = format!("{}x{}", "(".repeat(10_000), ")".repeat(10_000));
        let err = parse_source(&deep).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert!(err.message.contains("nested too deeply"), "{}", err.message);

        assert!(parse_source(&"-".repeat(10_000)).is_err());
        assert!(parse_source(&format!("x{}", "+x".repeat(10_000))).is_err());
        assert!(parse_source(&format!("{}x", "sin(".repeat(5_000))).is_err());
    }

    #[test]
    fn test_moderate_nesting_is_fine() {
        let nested = format!("{}x{}", "(".repeat(50), ")".repeat(50));
        assert!(parse_source(&nested).is_ok());
        let sum = format!("x{}", "+y".repeat(100));
        assert!(parse_source(&sum).is_ok());
    }

    #[test]
    fn test_unbalanced_paren() {
        assert!(parse_source("(x + y").is_err());
        assert!(parse_source("x + y)").is_err());
    }
}
