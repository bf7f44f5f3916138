use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;

use super::position::Position;

/// Which quote character delimited a string literal. The distinction is kept
/// all the way into the runtime so values print back with the style they
/// were written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    Single,
    Double,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Str { value: String, quote: QuoteKind },
    Identifier(String),
    Keyword(String),
    Plus,
    Minus,
    Mul,
    Div,
    Pow,
    Eq,
    Ee,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    LParen,
    RParen,
    LSquare,
    RSquare,
    Comma,
    Newline,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(value) => write!(f, "INT:{value}"),
            TokenKind::Float(value) => write!(f, "FLOAT:{value:?}"),
            TokenKind::Str { value, .. } => write!(f, "STRING:{value}"),
            TokenKind::Identifier(name) => write!(f, "IDENTIFIER:{name}"),
            TokenKind::Keyword(name) => write!(f, "KEYWORD:{name}"),
            TokenKind::Plus => f.write_str("PLUS"),
            TokenKind::Minus => f.write_str("MINUS"),
            TokenKind::Mul => f.write_str("MUL"),
            TokenKind::Div => f.write_str("DIV"),
            TokenKind::Pow => f.write_str("POW"),
            TokenKind::Eq => f.write_str("EQ"),
            TokenKind::Ee => f.write_str("EE"),
            TokenKind::Ne => f.write_str("NE"),
            TokenKind::Lt => f.write_str("LT"),
            TokenKind::Gt => f.write_str("GT"),
            TokenKind::Lte => f.write_str("LTE"),
            TokenKind::Gte => f.write_str("GTE"),
            TokenKind::LParen => f.write_str("LPAREN"),
            TokenKind::RParen => f.write_str("RPAREN"),
            TokenKind::LSquare => f.write_str("LSQUARE"),
            TokenKind::RSquare => f.write_str("RSQUARE"),
            TokenKind::Comma => f.write_str("COMMA"),
            TokenKind::Newline => f.write_str("NEWLINE"),
            TokenKind::Eof => f.write_str("EOF"),
        }
    }
}

/// Accepted spellings per keyword, diacritic-preserving ITRANS first.
pub const KW_VAR: &[&str] = &["charaH", "charah"];
pub const KW_AND: &[&str] = &["tathA", "tatha"];
pub const KW_OR: &[&str] = &["vA", "va"];
pub const KW_NOT: &[&str] = &["nahi"];
pub const KW_IF: &[&str] = &["yadi"];
pub const KW_ELIF: &[&str] = &["anyadi"];
pub const KW_ELSE: &[&str] = &["uta"];
pub const KW_END: &[&str] = &["aMta", "anta", "amta"];
pub const KW_FOR: &[&str] = &["kRRite", "krrite"];
pub const KW_TO: &[&str] = &["ityasmai"];
pub const KW_STEP: &[&str] = &["charaNa", "charana"];
pub const KW_WHILE: &[&str] = &["sopAnaH", "sopanah"];
pub const KW_FUNC: &[&str] = &["niyoga"];
pub const KW_RETURN: &[&str] = &["pratyAvartanam", "pratyavartanam"];
pub const KW_BREAK: &[&str] = &["virAmaH", "viramah"];
pub const KW_CONTINUE: &[&str] = &["anuvartanam"];

pub static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let groups: &[&[&str]] = &[
        KW_VAR,
        KW_AND,
        KW_OR,
        KW_NOT,
        KW_IF,
        KW_ELIF,
        KW_ELSE,
        KW_END,
        KW_FOR,
        KW_TO,
        KW_STEP,
        KW_WHILE,
        KW_FUNC,
        KW_RETURN,
        KW_BREAK,
        KW_CONTINUE,
    ];

    groups.iter().flat_map(|group| group.iter().copied()).collect()
});

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos_start: Position,
    pub pos_end: Position,
}

impl Token {
    pub fn new(kind: TokenKind, pos_start: Position, pos_end: Position) -> Self {
        Self {
            kind,
            pos_start,
            pos_end,
        }
    }

    /// Exact keyword match against a single spelling.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Keyword(name) if name == keyword)
    }

    /// Exact keyword match against each accepted spelling in turn.
    pub fn matches_any_keyword(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|keyword| self.matches_keyword(keyword))
    }

    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_set_contains_both_spellings() {
        assert!(KEYWORDS.contains("charaH"));
        assert!(KEYWORDS.contains("charah"));
        assert!(KEYWORDS.contains("kRRite"));
        assert!(KEYWORDS.contains("amta"));
        assert!(!KEYWORDS.contains("mudrayati"));
    }

    #[test]
    fn test_matches_any_keyword_is_exact() {
        let pos = Position::start("test.sans".into(), "tatha".into());
        let token = Token::new(TokenKind::Keyword("tatha".into()), pos.clone(), pos);

        assert!(token.matches_any_keyword(KW_AND));
        assert!(!token.matches_any_keyword(KW_OR));
    }
}
