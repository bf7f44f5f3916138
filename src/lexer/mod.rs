//! Lexical analysis for SansScript.
//!
//! The lexer runs on the output of [`crate::translit::normalize`], so apart
//! from string contents and the Devanāgarī digits it only ever sees ASCII.
//! It walks the source one character at a time while maintaining a
//! [`Position`], and emits a flat token stream terminated by a single `EOF`.

mod position;
mod token;

pub use position::*;
pub use token::*;

use std::rc::Rc;

use crate::error::Error;

const DEVANAGARI_DIGITS: &str = "०१२३४५६७८९";

fn devanagari_digit(c: char) -> Option<u32> {
    DEVANAGARI_DIGITS
        .chars()
        .position(|digit| digit == c)
        .map(|value| value as u32)
}

pub struct Lexer {
    chars: Vec<char>,
    pos: Position,
    current: Option<char>,
}

impl Lexer {
    pub fn new(file_name: &str, text: &str) -> Self {
        let file_name: Rc<str> = file_name.into();
        let file_text: Rc<str> = text.into();
        let chars: Vec<char> = text.chars().collect();
        let current = chars.first().copied();

        Self {
            chars,
            pos: Position::start(file_name, file_text),
            current,
        }
    }

    fn advance(&mut self) {
        self.pos.advance(self.current);
        self.current = self.chars.get(self.pos.index).copied();
    }

    pub fn make_tokens(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = vec![];

        while let Some(c) = self.current {
            match c {
                ' ' | '\t' => self.advance(),
                '#' => self.skip_comment(),
                ';' | '\n' => {
                    tokens.push(self.single_char(TokenKind::Newline));
                }
                'a'..='z' | 'A'..='Z' => tokens.push(self.make_identifier()),
                _ if c.is_ascii_digit() || devanagari_digit(c).is_some() => {
                    tokens.push(self.make_number())
                }
                '+' => tokens.push(self.single_char(TokenKind::Plus)),
                '-' => tokens.push(self.single_char(TokenKind::Minus)),
                '*' => tokens.push(self.single_char(TokenKind::Mul)),
                '/' => tokens.push(self.single_char(TokenKind::Div)),
                '^' => tokens.push(self.single_char(TokenKind::Pow)),
                '(' => tokens.push(self.single_char(TokenKind::LParen)),
                ')' => tokens.push(self.single_char(TokenKind::RParen)),
                '[' => tokens.push(self.single_char(TokenKind::LSquare)),
                ']' => tokens.push(self.single_char(TokenKind::RSquare)),
                ',' => tokens.push(self.single_char(TokenKind::Comma)),
                ':' => tokens.push(self.single_char(TokenKind::Keyword(":".into()))),
                '=' => tokens.push(self.make_equals()),
                '!' => tokens.push(self.make_not_equals()?),
                '>' => tokens.push(self.make_greater_than()),
                '<' => tokens.push(self.make_less_than()),
                '\'' | '"' => tokens.push(self.make_string()?),
                _ => {
                    let pos_start = self.pos.clone();
                    self.advance();
                    return Err(Error::illegal_character(
                        pos_start,
                        self.pos.clone(),
                        format!("'{c}'"),
                    ));
                }
            }
        }

        tokens.push(Token::new(
            TokenKind::Eof,
            self.pos.clone(),
            self.pos.clone(),
        ));
        Ok(tokens)
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let pos_start = self.pos.clone();
        self.advance();
        Token::new(kind, pos_start, self.pos.clone())
    }

    /// `#` swallows everything up to and including the next line feed.
    fn skip_comment(&mut self) {
        self.advance();
        while let Some(c) = self.current {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn make_identifier(&mut self) -> Token {
        let pos_start = self.pos.clone();
        let mut name = String::new();

        while let Some(c) = self.current {
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            self.advance();
        }

        let kind = if KEYWORDS.contains(name.as_str()) {
            TokenKind::Keyword(name)
        } else {
            TokenKind::Identifier(name)
        };

        Token::new(kind, pos_start, self.pos.clone())
    }

    /// Digits (ASCII or Devanāgarī, the latter folded to `0-9`) with at most
    /// one decimal point. A second dot ends the number.
    fn make_number(&mut self) -> Token {
        let pos_start = self.pos.clone();
        let mut digits = String::new();
        let mut dots = 0;

        while let Some(c) = self.current {
            if let Some(value) = devanagari_digit(c) {
                digits.push(char::from_digit(value, 10).unwrap_or('0'));
            } else if c.is_ascii_digit() {
                digits.push(c);
            } else if c == '.' {
                if dots == 1 {
                    break;
                }
                dots += 1;
                digits.push('.');
            } else {
                break;
            }
            self.advance();
        }

        let kind = if dots == 0 {
            match digits.parse::<i64>() {
                Ok(value) => TokenKind::Int(value),
                // literal too large for an integer, fall back to a float
                Err(_) => TokenKind::Float(digits.parse::<f64>().unwrap_or(f64::INFINITY)),
            }
        } else {
            TokenKind::Float(digits.parse::<f64>().unwrap_or(f64::NAN))
        };

        Token::new(kind, pos_start, self.pos.clone())
    }

    /// Strings respect `\` escapes: `\n` and `\t` translate, any other
    /// escaped character stands for itself.
    fn make_string(&mut self) -> Result<Token, Error> {
        let pos_start = self.pos.clone();
        let quote_char = self.current.unwrap_or('"');
        let quote = if quote_char == '\'' {
            QuoteKind::Single
        } else {
            QuoteKind::Double
        };
        let mut value = String::new();
        let mut escaped = false;
        let mut closed = false;

        self.advance();
        while let Some(c) = self.current {
            if escaped {
                value.push(match c {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote_char {
                closed = true;
            } else {
                value.push(c);
            }
            self.advance();
            if closed {
                break;
            }
        }

        if !closed {
            return Err(Error::expected_character(
                pos_start,
                self.pos.clone(),
                format!("'{quote_char}'"),
            ));
        }

        Ok(Token::new(
            TokenKind::Str { value, quote },
            pos_start,
            self.pos.clone(),
        ))
    }

    fn make_equals(&mut self) -> Token {
        let pos_start = self.pos.clone();
        self.advance();
        let kind = if self.current == Some('=') {
            self.advance();
            TokenKind::Ee
        } else {
            TokenKind::Eq
        };
        Token::new(kind, pos_start, self.pos.clone())
    }

    /// A lone `!` is an error, it only exists as part of `!=`.
    fn make_not_equals(&mut self) -> Result<Token, Error> {
        let pos_start = self.pos.clone();
        self.advance();
        if self.current == Some('=') {
            self.advance();
            return Ok(Token::new(TokenKind::Ne, pos_start, self.pos.clone()));
        }
        self.advance();
        Err(Error::expected_character(
            pos_start,
            self.pos.clone(),
            "'=' अनन्तरम्‌ '!' | '=' anantaram '!'".into(),
        ))
    }

    fn make_greater_than(&mut self) -> Token {
        let pos_start = self.pos.clone();
        self.advance();
        let kind = if self.current == Some('=') {
            self.advance();
            TokenKind::Gte
        } else {
            TokenKind::Gt
        };
        Token::new(kind, pos_start, self.pos.clone())
    }

    fn make_less_than(&mut self) -> Token {
        let pos_start = self.pos.clone();
        self.advance();
        let kind = if self.current == Some('=') {
            self.advance();
            TokenKind::Lte
        } else {
            TokenKind::Lt
        };
        Token::new(kind, pos_start, self.pos.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new("test.sans", input)
            .make_tokens()
            .expect("lexing failed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_lex_ends_with_single_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(
            kinds("1 + 2"),
            vec![
                TokenKind::Int(1),
                TokenKind::Plus,
                TokenKind::Int(2),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lex_keyword_and_identifier() {
        assert_eq!(
            kinds("charah foo"),
            vec![
                TokenKind::Keyword("charah".into()),
                TokenKind::Identifier("foo".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lex_devanagari_digits() {
        assert_eq!(kinds("४२"), vec![TokenKind::Int(42), TokenKind::Eof]);
        assert_eq!(kinds("३.५"), vec![TokenKind::Float(3.5), TokenKind::Eof]);
    }

    #[test]
    fn test_lex_second_dot_ends_the_number() {
        // the dangling '.' after "1.2" is not a token of its own
        let error = Lexer::new("test.sans", "1.2.3").make_tokens().unwrap_err();
        assert!(error.to_string().contains("'.'"));
    }

    #[test]
    fn test_lex_string_escapes() {
        assert_eq!(
            kinds(r#""a\nb\q""#),
            vec![
                TokenKind::Str {
                    value: "a\nbq".into(),
                    quote: QuoteKind::Double
                },
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lex_quote_styles() {
        assert_eq!(
            kinds("'a' \"b\""),
            vec![
                TokenKind::Str {
                    value: "a".into(),
                    quote: QuoteKind::Single
                },
                TokenKind::Str {
                    value: "b".into(),
                    quote: QuoteKind::Double
                },
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lex_comparison_operators() {
        assert_eq!(
            kinds("= == != < > <= >="),
            vec![
                TokenKind::Eq,
                TokenKind::Ee,
                TokenKind::Ne,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Lte,
                TokenKind::Gte,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lex_colon_is_keyword() {
        assert_eq!(
            kinds(":"),
            vec![TokenKind::Keyword(":".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_lex_comment_swallows_line() {
        assert_eq!(
            kinds("1 # comment\n2"),
            vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Eof]
        );
    }

    #[test]
    fn test_lex_lone_exclamation_is_error() {
        assert!(Lexer::new("test.sans", "!").make_tokens().is_err());
    }

    #[test]
    fn test_lex_illegal_character() {
        let error = Lexer::new("test.sans", "1 @ 2").make_tokens().unwrap_err();
        assert!(error.to_string().contains("avaidh charitra"));
        assert!(error.to_string().contains("'@'"));
    }

    #[test]
    fn test_lex_newline_and_semicolon() {
        assert_eq!(
            kinds("1;2\n3"),
            vec![
                TokenKind::Int(1),
                TokenKind::Newline,
                TokenKind::Int(2),
                TokenKind::Newline,
                TokenKind::Int(3),
                TokenKind::Eof
            ]
        );
    }
}
