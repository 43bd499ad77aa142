use crate::lang::error::{LangError, LangResult};
use crate::lang::token::{Span, Token, TokenKind};

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> LangResult<Vec<Token>> {
        while !self.is_at_end() {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            let token = self.next_token()?;
            // Insert implicit multiplication if applicable
            if let Some(prev) = self.tokens.last() {
                if prev.kind.can_end_implicit_mul() && token.kind.can_start_implicit_mul() {
                    // `sin(` is a call, not `sin * (`
                    let is_func_call = matches!(&prev.kind, TokenKind::Ident(_))
                        && matches!(&token.kind, TokenKind::LParen);
                    if !is_func_call {
                        let span = Span::new(prev.span.end, token.span.start);
                        self.tokens.push(Token::new(TokenKind::Star, span));
                    }
                }
            }
            self.tokens.push(token);
        }
        self.tokens
            .push(Token::new(TokenKind::Eof, Span::new(self.pos, self.pos)));
        Ok(self.tokens)
    }

    fn next_token(&mut self) -> LangResult<Token> {
        let start = self.pos;
        let ch = self.advance();

        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' | '\u{2212}' => TokenKind::Minus,
            '*' | '\u{00D7}' | '\u{22C5}' => TokenKind::Star,
            '/' | '\u{00F7}' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '|' => TokenKind::Pipe,
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                return self.read_number(start);
            }
            c if c.is_ascii_digit() => return self.read_number(start),
            c if is_ident_start(c) => return self.read_identifier(start),
            _ => {
                return Err(LangError::lex(format!("unexpected character '{}'", ch))
                    .with_span(Span::new(start, self.pos)))
            }
        };
        Ok(Token::new(kind, Span::new(start, self.pos)))
    }

    fn read_number(&mut self, start: usize) -> LangResult<Token> {
        // The first char (digit or '.') is already consumed.
        let mut is_float = self.source[start] == '.';
        self.eat_digits();

        if !is_float && self.peek() == Some('.') {
            is_float = true;
            self.advance();
            self.eat_digits();
        }

        // Scientific notation, only when an exponent actually follows
        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign = matches!(self.peek_at(1), Some('+') | Some('-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.advance();
                if sign {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        let text: String = self.source[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        let span = Span::new(start, self.pos);

        if is_float {
            let val: f64 = text
                .parse()
                .map_err(|_| LangError::lex(format!("invalid number: {}", text)).with_span(span))?;
            Ok(Token::new(TokenKind::Float(val), span))
        } else {
            match text.parse::<i64>() {
                Ok(val) => Ok(Token::new(TokenKind::Integer(val), span)),
                // Too large for i64; keep it as a float literal
                Err(_) => {
                    let val: f64 = text.parse().map_err(|_| {
                        LangError::lex(format!("invalid number: {}", text)).with_span(span)
                    })?;
                    Ok(Token::new(TokenKind::Float(val), span))
                }
            }
        }
    }

    fn read_identifier(&mut self, start: usize) -> LangResult<Token> {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.source[start..self.pos].iter().collect();
        Ok(Token::new(TokenKind::Ident(text), Span::new(start, self.pos)))
    }

    fn eat_digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.source[self.pos];
        self.pos += 1;
        ch
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !matches!(k, TokenKind::Eof))
            .collect()
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(
            lex("3 + 4"),
            vec![TokenKind::Integer(3), TokenKind::Plus, TokenKind::Integer(4)]
        );
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(
            lex("3x"),
            vec![
                TokenKind::Integer(3),
                TokenKind::Star,
                TokenKind::Ident("x".into()),
            ]
        );
        let tokens = lex("2(x+1)");
        assert_eq!(tokens[0], TokenKind::Integer(2));
        assert_eq!(tokens[1], TokenKind::Star);
        assert_eq!(tokens[2], TokenKind::LParen);
    }

    #[test]
    fn test_implicit_mul_between_groups() {
        // (x+1)(y-1) -> (x+1) * (y-1)
        let tokens = lex("(x+1)(y-1)");
        assert_eq!(tokens[5], TokenKind::Star);
        assert_eq!(tokens[6], TokenKind::LParen);
    }

    #[test]
    fn test_no_implicit_mul_for_func_call() {
        let tokens = lex("sin(x)");
        assert_eq!(tokens[0], TokenKind::Ident("sin".into()));
        assert_eq!(tokens[1], TokenKind::LParen);
    }

    #[test]
    fn test_float() {
        assert_eq!(lex("3.14"), vec![TokenKind::Float(3.14)]);
        assert_eq!(lex(".5"), vec![TokenKind::Float(0.5)]);
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(lex("1e10"), vec![TokenKind::Float(1e10)]);
        assert_eq!(lex("3.14e-2"), vec![TokenKind::Float(3.14e-2)]);
    }

    #[test]
    fn test_e_without_exponent_is_implicit_mul() {
        // `2e` is two times Euler's number, not a malformed literal
        assert_eq!(
            lex("2e"),
            vec![
                TokenKind::Integer(2),
                TokenKind::Star,
                TokenKind::Ident("e".into()),
            ]
        );
    }

    #[test]
    fn test_unicode_operators() {
        assert_eq!(
            lex("x × y ÷ 2"),
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Star,
                TokenKind::Ident("y".into()),
                TokenKind::Slash,
                TokenKind::Integer(2),
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("x $ y").tokenize().unwrap_err();
        assert_eq!(err.kind, crate::lang::error::ErrorKind::LexError);
        assert_eq!(err.span, Some(Span::new(2, 3)));
    }
}
