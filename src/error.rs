//! Error records for every pipeline stage, with arrow-underlined source
//! excerpts and, for runtime failures, a traceback over the call-frame chain.

use std::fmt;

use colored::Colorize;

use crate::lexer::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IllegalCharacter,
    ExpectedCharacter,
    InvalidSyntax,
    Runtime,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::IllegalCharacter => "अवैध चरित्र | avaidh charitra",
            ErrorKind::ExpectedCharacter | ErrorKind::InvalidSyntax => {
                "अवैध वाक्यविन्यासः | avaidh vakyavinyasyah"
            }
            ErrorKind::Runtime => "रनटाइम् त्रुटिः | runtime trutih",
        }
    }
}

/// One call frame of a runtime traceback, outermost first.
#[derive(Debug, Clone)]
pub struct TraceFrame {
    pub display_name: String,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub pos_start: Position,
    pub pos_end: Position,
    pub details: String,
    pub trace: Vec<TraceFrame>,
}

impl Error {
    pub fn illegal_character(pos_start: Position, pos_end: Position, details: String) -> Self {
        Self {
            kind: ErrorKind::IllegalCharacter,
            pos_start,
            pos_end,
            details,
            trace: vec![],
        }
    }

    pub fn expected_character(pos_start: Position, pos_end: Position, details: String) -> Self {
        Self {
            kind: ErrorKind::ExpectedCharacter,
            pos_start,
            pos_end,
            details,
            trace: vec![],
        }
    }

    pub fn invalid_syntax(pos_start: Position, pos_end: Position, details: String) -> Self {
        Self {
            kind: ErrorKind::InvalidSyntax,
            pos_start,
            pos_end,
            details,
            trace: vec![],
        }
    }

    pub fn runtime(
        pos_start: Position,
        pos_end: Position,
        details: String,
        trace: Vec<TraceFrame>,
    ) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            pos_start,
            pos_end,
            details,
            trace,
        }
    }

    pub fn as_string(&self) -> String {
        let mut result = String::new();

        if self.kind == ErrorKind::Runtime {
            result.push_str(&self.generate_traceback());
        }

        result.push_str(&format!("{}:{}\n", self.kind.name(), self.details));
        result.push_str(&format!(
            "संचिका <{file}>, पंक्ति {line} |\nsanchikaa <{file}>, pankti {line}\n",
            file = self.pos_start.file_name,
            line = self.pos_start.line + 1
        ));
        result.push('\n');
        result.push_str(&string_with_arrows(
            &self.pos_start.file_text,
            &self.pos_start,
            &self.pos_end,
        ));

        result
    }

    fn generate_traceback(&self) -> String {
        let mut result = String::from(
            "अनुसन्धानं कुर्वन्तु, अद्यतनतमं आह्वानं अन्तिमम् | anusandhanam kurvantu, adyatanatamam aahvanam antimam :-\n",
        );

        for frame in &self.trace {
            result.push_str(&format!(
                "      sanchikaa <{}>, pankti {}, {}\n",
                frame.pos.file_name,
                frame.pos.line + 1,
                frame.display_name
            ));
        }

        result
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl std::error::Error for Error {}

/// Excerpt the offending lines and underline the error span with `^`.
pub fn string_with_arrows(text: &str, pos_start: &Position, pos_end: &Position) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut result = String::new();

    let last_line = pos_end.line.min(lines.len().saturating_sub(1));
    for line_number in pos_start.line..=last_line {
        let line = lines.get(line_number).copied().unwrap_or("");
        let line_len = line.chars().count();

        let col_start = if line_number == pos_start.line {
            pos_start.column.min(line_len)
        } else {
            0
        };
        let col_end = if line_number == pos_end.line {
            pos_end.column.clamp(col_start, line_len.max(col_start))
        } else {
            line_len
        };

        result.push_str(line);
        result.push('\n');
        result.push_str(&" ".repeat(col_start));
        let arrows = "^".repeat((col_end - col_start).max(1));
        result.push_str(&format!("{}", arrows.red()));
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, start: usize, end: usize) -> (Position, Position) {
        let file: std::rc::Rc<str> = "test.sans".into();
        let source: std::rc::Rc<str> = text.into();
        let mut pos_start = Position::start(file, source);
        let chars: Vec<char> = text.chars().collect();
        for i in 0..start {
            pos_start.advance(chars.get(i).copied());
        }
        let mut pos_end = pos_start.clone();
        for i in start..end {
            pos_end.advance(chars.get(i).copied());
        }
        (pos_start, pos_end)
    }

    #[test]
    fn test_error_string_carries_name_file_and_line() {
        let (start, end) = span("charah x = @", 11, 12);
        let error = Error::illegal_character(start, end, "'@'".into());
        let rendered = error.as_string();

        assert!(rendered.contains("avaidh charitra:'@'"));
        assert!(rendered.contains("sanchikaa <test.sans>, pankti 1"));
    }

    #[test]
    fn test_arrows_underline_the_span() {
        colored::control::set_override(false);
        let (start, end) = span("charah x = @", 11, 12);
        let rendered = string_with_arrows("charah x = @", &start, &end);

        assert!(rendered.contains("charah x = @\n"));
        assert!(rendered.contains(&format!("{}^", " ".repeat(11))));
        colored::control::unset_override();
    }

    #[test]
    fn test_runtime_error_renders_traceback() {
        let (start, end) = span("1/0", 2, 3);
        let frame = TraceFrame {
            display_name: "<karyakram>".into(),
            pos: start.clone(),
        };
        let error = Error::runtime(start, end, "शून्येन विभागः | shunyen vibhagah".into(), vec![frame]);
        let rendered = error.as_string();

        assert!(rendered.contains("anusandhanam kurvantu"));
        assert!(rendered.contains("pankti 1, <karyakram>"));
        assert!(rendered.contains("shunyen vibhagah"));
    }
}
