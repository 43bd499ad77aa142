/// Source location span (char offsets into the expression text).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Integer(i64),
    Float(f64),
    Ident(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Caret,

    // Delimiters
    LParen,
    RParen,
    Comma,
    Pipe,

    Eof,
}

impl TokenKind {
    /// Whether this token can appear as the last token before implicit multiplication.
    pub fn can_end_implicit_mul(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer(_) | TokenKind::Float(_) | TokenKind::Ident(_) | TokenKind::RParen
        )
    }

    /// Whether this token can appear as the first token after implicit multiplication.
    pub fn can_start_implicit_mul(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer(_) | TokenKind::Float(_) | TokenKind::Ident(_) | TokenKind::LParen
        )
    }

    /// Short human-readable name used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Integer(n) => format!("number {}", n),
            TokenKind::Float(f) => format!("number {}", f),
            TokenKind::Ident(name) => format!("'{}'", name),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Caret => "'^'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Pipe => "'|'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}
