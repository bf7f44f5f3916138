//! Recursive-descent parser with explicit precedence levels.
//!
//! Every parse procedure returns a [`ParseResult`] carrying the node or the
//! error plus advancement bookkeeping. `try_register` lets a caller attempt a
//! production and rewind on failure, while `failure` only replaces an earlier
//! error when no tokens were consumed since the last registered point, so the
//! deepest diagnostic survives.

pub mod ast;

pub use ast::*;

use crate::error::Error;
use crate::lexer::{
    Token, TokenKind, KW_AND, KW_BREAK, KW_CONTINUE, KW_ELIF, KW_ELSE, KW_END, KW_FOR, KW_FUNC,
    KW_IF, KW_NOT, KW_OR, KW_RETURN, KW_STEP, KW_TO, KW_VAR, KW_WHILE,
};

#[derive(Debug, Default)]
pub struct ParseResult {
    pub node: Option<Node>,
    pub error: Option<Error>,
    pub advance_count: usize,
    pub last_registered_advance_count: usize,
    pub to_reverse_count: usize,
}

impl ParseResult {
    fn new() -> Self {
        Self::default()
    }

    fn register_advancement(&mut self) {
        self.last_registered_advance_count = 1;
        self.advance_count += 1;
    }

    /// Fold a sub-result into this one, propagating its error.
    fn register(&mut self, res: ParseResult) -> Option<Node> {
        self.last_registered_advance_count = res.advance_count;
        self.advance_count += res.advance_count;
        if res.error.is_some() {
            self.error = res.error;
        }
        res.node
    }

    /// Like `register`, but a failed sub-result is discarded and its
    /// consumed-token count recorded so the caller can rewind.
    fn try_register(&mut self, res: ParseResult) -> Option<Node> {
        if res.error.is_some() {
            self.to_reverse_count = res.advance_count;
            return None;
        }
        self.register(res)
    }

    fn success(mut self, node: Node) -> Self {
        self.node = Some(node);
        self
    }

    fn failure(mut self, error: Error) -> Self {
        if self.error.is_none() || self.last_registered_advance_count == 0 {
            self.error = Some(error);
        }
        self
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    /// The token stream must be lexer output, i.e. terminated by `EOF`.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    fn current(&self) -> &Token {
        let index = self.index.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn reverse(&mut self, amount: usize) {
        self.index = self.index.saturating_sub(amount);
    }

    fn invalid_syntax(&self, details: &str) -> Error {
        let current = self.current();
        Error::invalid_syntax(
            current.pos_start.clone(),
            current.pos_end.clone(),
            details.into(),
        )
    }

    fn expected_char(&self, details: &str) -> Error {
        let current = self.current();
        Error::expected_character(
            current.pos_start.clone(),
            current.pos_end.clone(),
            details.into(),
        )
    }

    pub fn parse(&mut self) -> Result<Node, Error> {
        let mut res = self.statements();
        if res.error.is_none() && !matches!(self.current().kind, TokenKind::Eof) {
            res = res.failure(self.invalid_syntax(
                "अपेक्षितं '+', '-', '*' अथवा '/' | apekchhit '+', '-', '*' athva '/'",
            ));
        }

        if let Some(error) = res.error {
            return Err(error);
        }
        match res.node {
            Some(node) => Ok(node),
            None => unreachable!("statements() always yields a node or an error"),
        }
    }

    fn statements(&mut self) -> ParseResult {
        let mut res = ParseResult::new();
        let mut statements = vec![];
        let pos_start = self.current().pos_start.clone();

        while matches!(self.current().kind, TokenKind::Newline) {
            res.register_advancement();
            self.advance();
        }

        let Some(statement) = res.register(self.statement()) else {
            return res;
        };
        statements.push(statement);

        loop {
            let mut newline_count = 0;
            while matches!(self.current().kind, TokenKind::Newline) {
                res.register_advancement();
                self.advance();
                newline_count += 1;
            }
            if newline_count == 0 {
                break;
            }

            let attempt = self.statement();
            match res.try_register(attempt) {
                Some(statement) => statements.push(statement),
                None => {
                    let amount = res.to_reverse_count;
                    self.reverse(amount);
                    break;
                }
            }
        }

        let pos_end = self.current().pos_end.clone();
        res.success(Node::Statements {
            statements,
            pos_start,
            pos_end,
        })
    }

    fn statement(&mut self) -> ParseResult {
        let mut res = ParseResult::new();
        let pos_start = self.current().pos_start.clone();

        if self.current().matches_any_keyword(KW_RETURN) {
            res.register_advancement();
            self.advance();

            let value = res.try_register(self.expr());
            if value.is_none() {
                let amount = res.to_reverse_count;
                self.reverse(amount);
            }
            let pos_end = self.current().pos_end.clone();
            return res.success(Node::Return {
                value: value.map(Box::new),
                pos_start,
                pos_end,
            });
        }

        if self.current().matches_any_keyword(KW_BREAK) {
            res.register_advancement();
            self.advance();
            let pos_end = self.current().pos_end.clone();
            return res.success(Node::Break { pos_start, pos_end });
        }

        if self.current().matches_any_keyword(KW_CONTINUE) {
            res.register_advancement();
            self.advance();
            let pos_end = self.current().pos_end.clone();
            return res.success(Node::Continue { pos_start, pos_end });
        }

        let Some(expr) = res.register(self.expr()) else {
            let error = self.invalid_syntax("अपेक्षितं वाक्यम् | apekchhitam vakhyam");
            return res.failure(error);
        };
        res.success(expr)
    }

    fn expr(&mut self) -> ParseResult {
        let mut res = ParseResult::new();

        if self.current().matches_any_keyword(KW_VAR) {
            res.register_advancement();
            self.advance();

            let name = self.current().clone();
            if name.identifier_name().is_none() {
                let error = self.invalid_syntax("अपेक्षितं परिचयकः | apekchhit parichayakah");
                return res.failure(error);
            }
            res.register_advancement();
            self.advance();

            if !matches!(self.current().kind, TokenKind::Eq) {
                let error = self.invalid_syntax("अपेक्षितं '=' | apekchhit '='");
                return res.failure(error);
            }
            res.register_advancement();
            self.advance();

            let Some(value) = res.register(self.expr()) else {
                return res;
            };
            return res.success(Node::VarAssign {
                name,
                value: Box::new(value),
            });
        }

        let attempt = self.bin_op(
            Self::comp_expr,
            |t| t.matches_any_keyword(KW_AND) || t.matches_any_keyword(KW_OR),
            Self::comp_expr,
        );
        let Some(node) = res.register(attempt) else {
            let error = self.invalid_syntax(
                "अपेक्षितं 'charah', INT, FLOAT, 'nahi', '+', '-', परिचयकः अथवा '(' | apekchhit 'charah', INT, FLOAT, 'nahi', '+', '-', parichayakah athva '('",
            );
            return res.failure(error);
        };
        res.success(node)
    }

    fn comp_expr(&mut self) -> ParseResult {
        let mut res = ParseResult::new();

        if self.current().matches_any_keyword(KW_NOT) {
            let op = self.current().clone();
            res.register_advancement();
            self.advance();

            let Some(operand) = res.register(self.comp_expr()) else {
                return res;
            };
            return res.success(Node::UnaryOp {
                op,
                operand: Box::new(operand),
            });
        }

        let attempt = self.bin_op(
            Self::arith_expr,
            |t| {
                matches!(
                    t.kind,
                    TokenKind::Ee
                        | TokenKind::Ne
                        | TokenKind::Lt
                        | TokenKind::Gt
                        | TokenKind::Lte
                        | TokenKind::Gte
                )
            },
            Self::arith_expr,
        );
        let Some(node) = res.register(attempt) else {
            let error = self.invalid_syntax(
                "अपेक्षितं INT, FLOAT, 'nahi', '+', '-', परिचयकः अथवा '(' | apekchhit INT, FLOAT, 'nahi', '+', '-', parichayakah athva '('",
            );
            return res.failure(error);
        };
        res.success(node)
    }

    fn arith_expr(&mut self) -> ParseResult {
        self.bin_op(
            Self::term,
            |t| matches!(t.kind, TokenKind::Plus | TokenKind::Minus),
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult {
        self.bin_op(
            Self::factor,
            |t| matches!(t.kind, TokenKind::Mul | TokenKind::Div),
            Self::factor,
        )
    }

    fn factor(&mut self) -> ParseResult {
        let mut res = ParseResult::new();
        let token = self.current().clone();

        if matches!(token.kind, TokenKind::Plus | TokenKind::Minus) {
            res.register_advancement();
            self.advance();
            let Some(operand) = res.register(self.factor()) else {
                return res;
            };
            return res.success(Node::UnaryOp {
                op: token,
                operand: Box::new(operand),
            });
        }

        self.power()
    }

    /// `^` is right-associative: the right operand re-enters at `factor`.
    fn power(&mut self) -> ParseResult {
        self.bin_op(
            Self::call,
            |t| matches!(t.kind, TokenKind::Pow),
            Self::factor,
        )
    }

    fn call(&mut self) -> ParseResult {
        let mut res = ParseResult::new();
        let Some(atom) = res.register(self.atom()) else {
            return res;
        };

        if !matches!(self.current().kind, TokenKind::LParen) {
            return res.success(atom);
        }
        res.register_advancement();
        self.advance();

        let mut args = vec![];
        if matches!(self.current().kind, TokenKind::RParen) {
            res.register_advancement();
            self.advance();
        } else {
            let Some(arg) = res.register(self.expr()) else {
                let error = self.invalid_syntax(
                    "अपेक्षितं ')', INT, FLOAT, '+', '-', परिचयकः अथवा '(' | apekchhit ')', INT, FLOAT, '+', '-', parichayakah athva '('",
                );
                return res.failure(error);
            };
            args.push(arg);

            while matches!(self.current().kind, TokenKind::Comma) {
                res.register_advancement();
                self.advance();
                let Some(arg) = res.register(self.expr()) else {
                    return res;
                };
                args.push(arg);
            }

            if !matches!(self.current().kind, TokenKind::RParen) {
                let error = self.expected_char("अपेक्षितं ',' अथवा ')' | apekchhit ',' athva ')'");
                return res.failure(error);
            }
            res.register_advancement();
            self.advance();
        }

        res.success(Node::Call {
            callee: Box::new(atom),
            args,
        })
    }

    fn atom(&mut self) -> ParseResult {
        let mut res = ParseResult::new();
        let token = self.current().clone();

        match &token.kind {
            TokenKind::Int(_) | TokenKind::Float(_) => {
                res.register_advancement();
                self.advance();
                res.success(Node::Number { token })
            }
            TokenKind::Str { .. } => {
                res.register_advancement();
                self.advance();
                res.success(Node::Str { token })
            }
            TokenKind::Identifier(_) => {
                res.register_advancement();
                self.advance();
                res.success(Node::VarAccess { name: token })
            }
            TokenKind::LParen => {
                res.register_advancement();
                self.advance();
                let Some(expr) = res.register(self.expr()) else {
                    return res;
                };
                if !matches!(self.current().kind, TokenKind::RParen) {
                    let error = self.invalid_syntax("अपेक्षितं ')' | apekchhit ')'");
                    return res.failure(error);
                }
                res.register_advancement();
                self.advance();
                res.success(expr)
            }
            TokenKind::LSquare => {
                let attempt = self.list_expr();
                let Some(list) = res.register(attempt) else {
                    return res;
                };
                res.success(list)
            }
            TokenKind::Keyword(_) if token.matches_any_keyword(KW_IF) => {
                let attempt = self.if_expr();
                let Some(node) = res.register(attempt) else {
                    return res;
                };
                res.success(node)
            }
            TokenKind::Keyword(_) if token.matches_any_keyword(KW_FOR) => {
                let attempt = self.for_expr();
                let Some(node) = res.register(attempt) else {
                    return res;
                };
                res.success(node)
            }
            TokenKind::Keyword(_) if token.matches_any_keyword(KW_WHILE) => {
                let attempt = self.while_expr();
                let Some(node) = res.register(attempt) else {
                    return res;
                };
                res.success(node)
            }
            TokenKind::Keyword(_) if token.matches_any_keyword(KW_FUNC) => {
                let attempt = self.func_def();
                let Some(node) = res.register(attempt) else {
                    return res;
                };
                res.success(node)
            }
            _ => {
                let error = self.invalid_syntax(
                    "अपेक्षितं INT, FLOAT, परिचयकः, '+', '-' अथवा '(' | apekchhit INT, FLOAT, parichayakah, '+', '-' athva '('",
                );
                res.failure(error)
            }
        }
    }

    fn list_expr(&mut self) -> ParseResult {
        let mut res = ParseResult::new();
        let pos_start = self.current().pos_start.clone();

        if !matches!(self.current().kind, TokenKind::LSquare) {
            let error = self.invalid_syntax("अपेक्षितं '[' | apekchhit '['");
            return res.failure(error);
        }
        res.register_advancement();
        self.advance();

        let mut elements = vec![];
        if matches!(self.current().kind, TokenKind::RSquare) {
            let pos_end = self.current().pos_end.clone();
            res.register_advancement();
            self.advance();
            return res.success(Node::List {
                elements,
                pos_start,
                pos_end,
            });
        }

        let Some(element) = res.register(self.expr()) else {
            let error = self.invalid_syntax(
                "अपेक्षितं ']', INT, FLOAT, '+', '-', परिचयकः अथवा '(' | apekchhit ']', INT, FLOAT, '+', '-', parichayakah athva '('",
            );
            return res.failure(error);
        };
        elements.push(element);

        while matches!(self.current().kind, TokenKind::Comma) {
            res.register_advancement();
            self.advance();
            let Some(element) = res.register(self.expr()) else {
                return res;
            };
            elements.push(element);
        }

        if !matches!(self.current().kind, TokenKind::RSquare) {
            let error = self.expected_char("अपेक्षितं ',' अथवा ']' | apekchhit ',' athva ']'");
            return res.failure(error);
        }
        let pos_end = self.current().pos_end.clone();
        res.register_advancement();
        self.advance();

        res.success(Node::List {
            elements,
            pos_start,
            pos_end,
        })
    }

    /// `yadi expr : body (anyadi expr : body)* (uta : body)?`
    ///
    /// A block body runs to `anta` (ending the whole chain) or directly into
    /// the next `anyadi`/`uta`; an expression body continues inline.
    fn if_expr(&mut self) -> ParseResult {
        let mut res = ParseResult::new();
        let pos_start = self.current().pos_start.clone();
        let mut cases: Vec<IfCase> = vec![];
        let mut else_case: Option<ElseCase> = None;

        let mut expected: &[&str] = KW_IF;
        loop {
            if !self.current().matches_any_keyword(expected) {
                let error = self.invalid_syntax(&format!(
                    "अपेक्षितं '{kw}' | apekchhit '{kw}'",
                    kw = expected[0]
                ));
                return res.failure(error);
            }
            res.register_advancement();
            self.advance();

            let Some(condition) = res.register(self.expr()) else {
                return res;
            };

            if !self.current().matches_keyword(":") {
                let error = self.invalid_syntax("अपेक्षितं ':' | apekchhit ':'");
                return res.failure(error);
            }
            res.register_advancement();
            self.advance();

            if matches!(self.current().kind, TokenKind::Newline) {
                res.register_advancement();
                self.advance();

                let Some(body) = res.register(self.statements()) else {
                    return res;
                };
                cases.push(IfCase {
                    condition,
                    body,
                    should_return_null: true,
                });

                if self.current().matches_any_keyword(KW_END) {
                    let pos_end = self.current().pos_end.clone();
                    res.register_advancement();
                    self.advance();
                    return res.success(Node::If {
                        cases,
                        else_case: None,
                        pos_start,
                        pos_end,
                    });
                }
                if !self.current().matches_any_keyword(KW_ELIF)
                    && !self.current().matches_any_keyword(KW_ELSE)
                {
                    let error = self.invalid_syntax("अपेक्षितं 'anta' | apekchhit 'anta'");
                    return res.failure(error);
                }
            } else {
                let Some(body) = res.register(self.statement()) else {
                    return res;
                };
                cases.push(IfCase {
                    condition,
                    body,
                    should_return_null: false,
                });
            }

            if self.current().matches_any_keyword(KW_ELIF) {
                expected = KW_ELIF;
                continue;
            }
            break;
        }

        if self.current().matches_any_keyword(KW_ELSE) {
            res.register_advancement();
            self.advance();

            if !self.current().matches_keyword(":") {
                let error = self.invalid_syntax("अपेक्षितं ':' | apekchhit ':'");
                return res.failure(error);
            }
            res.register_advancement();
            self.advance();

            if matches!(self.current().kind, TokenKind::Newline) {
                res.register_advancement();
                self.advance();

                let Some(body) = res.register(self.statements()) else {
                    return res;
                };
                else_case = Some(ElseCase {
                    body,
                    should_return_null: true,
                });

                if !self.current().matches_any_keyword(KW_END) {
                    let error = self.invalid_syntax("अपेक्षितं 'anta' | apekchhit 'anta'");
                    return res.failure(error);
                }
                res.register_advancement();
                self.advance();
            } else {
                let Some(body) = res.register(self.statement()) else {
                    return res;
                };
                else_case = Some(ElseCase {
                    body,
                    should_return_null: false,
                });
            }
        }

        let pos_end = match &else_case {
            Some(else_case) => else_case.body.pos_end(),
            None => match cases.last() {
                Some(case) => case.body.pos_end(),
                None => pos_start.clone(),
            },
        };
        res.success(Node::If {
            cases,
            else_case: else_case.map(Box::new),
            pos_start,
            pos_end,
        })
    }

    /// `krrite IDENT = expr ityasmai expr (charana expr)? : body`
    fn for_expr(&mut self) -> ParseResult {
        let mut res = ParseResult::new();

        if !self.current().matches_any_keyword(KW_FOR) {
            let error = self.expected_char("अपेक्षितं 'krrite' | apekchhit 'krrite'");
            return res.failure(error);
        }
        res.register_advancement();
        self.advance();

        let var_name = self.current().clone();
        if var_name.identifier_name().is_none() {
            let error = self.expected_char("अपेक्षितं परिचयकः | apekchhit parichayakah");
            return res.failure(error);
        }
        res.register_advancement();
        self.advance();

        if !matches!(self.current().kind, TokenKind::Eq) {
            let error = self.expected_char("अपेक्षितं '=' | apekchhit '='");
            return res.failure(error);
        }
        res.register_advancement();
        self.advance();

        let Some(start) = res.register(self.expr()) else {
            return res;
        };

        if !self.current().matches_any_keyword(KW_TO) {
            let error = self.expected_char("अपेक्षितं 'ityasmai' | apekchhit 'ityasmai'");
            return res.failure(error);
        }
        res.register_advancement();
        self.advance();

        let Some(end) = res.register(self.expr()) else {
            return res;
        };

        let step = if self.current().matches_any_keyword(KW_STEP) {
            res.register_advancement();
            self.advance();
            let Some(step) = res.register(self.expr()) else {
                return res;
            };
            Some(Box::new(step))
        } else {
            None
        };

        if !self.current().matches_keyword(":") {
            let error = self.expected_char("अपेक्षितं ':' | apekchhit ':'");
            return res.failure(error);
        }
        res.register_advancement();
        self.advance();

        if matches!(self.current().kind, TokenKind::Newline) {
            res.register_advancement();
            self.advance();

            let Some(body) = res.register(self.statements()) else {
                return res;
            };

            if !self.current().matches_any_keyword(KW_END) {
                let error = self.invalid_syntax("अपेक्षितं 'anta' | apekchhit 'anta'");
                return res.failure(error);
            }
            res.register_advancement();
            self.advance();

            return res.success(Node::For {
                var_name,
                start: Box::new(start),
                end: Box::new(end),
                step,
                body: Box::new(body),
                should_return_null: true,
            });
        }

        let Some(body) = res.register(self.statement()) else {
            return res;
        };
        res.success(Node::For {
            var_name,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
            should_return_null: false,
        })
    }

    /// `sopanah expr : body`
    fn while_expr(&mut self) -> ParseResult {
        let mut res = ParseResult::new();

        if !self.current().matches_any_keyword(KW_WHILE) {
            let error = self.expected_char("अपेक्षितं 'sopanah' | apekchhit 'sopanah'");
            return res.failure(error);
        }
        res.register_advancement();
        self.advance();

        let Some(condition) = res.register(self.expr()) else {
            return res;
        };

        if !self.current().matches_keyword(":") {
            let error = self.expected_char("अपेक्षितं ':' | apekchhit ':'");
            return res.failure(error);
        }
        res.register_advancement();
        self.advance();

        if matches!(self.current().kind, TokenKind::Newline) {
            res.register_advancement();
            self.advance();

            let Some(body) = res.register(self.statements()) else {
                return res;
            };

            if !self.current().matches_any_keyword(KW_END) {
                let error = self.invalid_syntax("अपेक्षितं 'anta' | apekchhit 'anta'");
                return res.failure(error);
            }
            res.register_advancement();
            self.advance();

            return res.success(Node::While {
                condition: Box::new(condition),
                body: Box::new(body),
                should_return_null: true,
            });
        }

        let Some(body) = res.register(self.statement()) else {
            return res;
        };
        res.success(Node::While {
            condition: Box::new(condition),
            body: Box::new(body),
            should_return_null: false,
        })
    }

    /// `niyoga IDENT? ( (IDENT (, IDENT)*)? ) : body`
    fn func_def(&mut self) -> ParseResult {
        let mut res = ParseResult::new();
        let pos_start = self.current().pos_start.clone();

        if !self.current().matches_any_keyword(KW_FUNC) {
            let error = self.expected_char("अपेक्षितं 'niyoga' | apekchhit 'niyoga'");
            return res.failure(error);
        }
        res.register_advancement();
        self.advance();

        let name = if self.current().identifier_name().is_some() {
            let name = self.current().clone();
            res.register_advancement();
            self.advance();

            if !matches!(self.current().kind, TokenKind::LParen) {
                let error = self.expected_char("अपेक्षितं '(' | apekchhit '('");
                return res.failure(error);
            }
            Some(name)
        } else {
            if !matches!(self.current().kind, TokenKind::LParen) {
                let error =
                    self.expected_char("अपेक्षितं परिचयकः अथवा '(' | apekchhit parichayakah athva '('");
                return res.failure(error);
            }
            None
        };
        res.register_advancement();
        self.advance();

        let mut arg_names = vec![];
        if self.current().identifier_name().is_some() {
            arg_names.push(self.current().clone());
            res.register_advancement();
            self.advance();

            while matches!(self.current().kind, TokenKind::Comma) {
                res.register_advancement();
                self.advance();

                if self.current().identifier_name().is_none() {
                    let error = self.expected_char("अपेक्षितं परिचयकः | apekchhit parichayakah");
                    return res.failure(error);
                }
                arg_names.push(self.current().clone());
                res.register_advancement();
                self.advance();
            }

            if !matches!(self.current().kind, TokenKind::RParen) {
                let error = self.expected_char("अपेक्षितं ',' अथवा ')' | apekchhit ',' athva ')'");
                return res.failure(error);
            }
        } else if !matches!(self.current().kind, TokenKind::RParen) {
            let error =
                self.expected_char("अपेक्षितं परिचयकः अथवा ')' | apekchhit parichayakah athva ')'");
            return res.failure(error);
        }
        res.register_advancement();
        self.advance();

        if !self.current().matches_keyword(":") {
            let error = self.expected_char("अपेक्षितं ':' | apekchhit ':'");
            return res.failure(error);
        }
        res.register_advancement();
        self.advance();

        if !matches!(self.current().kind, TokenKind::Newline) {
            let Some(body) = res.register(self.expr()) else {
                return res;
            };
            let pos_end = body.pos_end();
            return res.success(Node::FuncDef {
                name,
                arg_names,
                body: Box::new(body),
                should_auto_return: true,
                pos_start,
                pos_end,
            });
        }
        res.register_advancement();
        self.advance();

        let Some(body) = res.register(self.statements()) else {
            return res;
        };

        if !self.current().matches_any_keyword(KW_END) {
            let error = self.invalid_syntax("अपेक्षितं 'anta' | apekchhit 'anta'");
            return res.failure(error);
        }
        let pos_end = self.current().pos_end.clone();
        res.register_advancement();
        self.advance();

        res.success(Node::FuncDef {
            name,
            arg_names,
            body: Box::new(body),
            should_auto_return: false,
            pos_start,
            pos_end,
        })
    }

    fn bin_op(
        &mut self,
        func_a: fn(&mut Self) -> ParseResult,
        ops: fn(&Token) -> bool,
        func_b: fn(&mut Self) -> ParseResult,
    ) -> ParseResult {
        let mut res = ParseResult::new();
        let Some(mut left) = res.register(func_a(self)) else {
            return res;
        };

        while ops(self.current()) {
            let op = self.current().clone();
            res.register_advancement();
            self.advance();

            let Some(right) = res.register(func_b(self)) else {
                return res;
            };
            left = Node::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        res.success(left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Result<Node, Error> {
        let tokens = Lexer::new("test.sans", input).make_tokens()?;
        Parser::new(tokens).parse()
    }

    fn parse_single(input: &str) -> Node {
        match parse(input).expect("parsing failed") {
            Node::Statements { mut statements, .. } => {
                assert_eq!(statements.len(), 1);
                statements.remove(0)
            }
            node => panic!("expected statement list, got {node:?}"),
        }
    }

    #[test]
    fn test_parse_precedence_mul_over_add() {
        let node = parse_single("2 + 3 * 4");
        let Node::BinaryOp { op, right, .. } = node else {
            panic!("expected binary op");
        };
        assert!(matches!(op.kind, TokenKind::Plus));
        assert!(matches!(*right, Node::BinaryOp { .. }));
    }

    #[test]
    fn test_parse_power_is_right_associative() {
        let node = parse_single("2 ^ 3 ^ 4");
        let Node::BinaryOp { left, op, right } = node else {
            panic!("expected binary op");
        };
        assert!(matches!(op.kind, TokenKind::Pow));
        assert!(matches!(*left, Node::Number { .. }));
        assert!(matches!(*right, Node::BinaryOp { .. }));
    }

    #[test]
    fn test_parse_unary_binds_tighter_than_mul() {
        let node = parse_single("-2 * 3");
        let Node::BinaryOp { left, op, .. } = node else {
            panic!("expected binary op");
        };
        assert!(matches!(op.kind, TokenKind::Mul));
        assert!(matches!(*left, Node::UnaryOp { .. }));
    }

    #[test]
    fn test_parse_var_assignment() {
        let node = parse_single("charah x = 5");
        let Node::VarAssign { name, value } = node else {
            panic!("expected assignment");
        };
        assert_eq!(name.identifier_name(), Some("x"));
        assert!(matches!(*value, Node::Number { .. }));
    }

    #[test]
    fn test_parse_statements_split_on_semicolon() {
        let node = parse("charah a = 1; a + 1").expect("parsing failed");
        let Node::Statements { statements, .. } = node else {
            panic!("expected statement list");
        };
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_parse_call_with_args() {
        let node = parse_single("f(1, 2, 3)");
        let Node::Call { callee, args } = node else {
            panic!("expected call");
        };
        assert!(matches!(*callee, Node::VarAccess { .. }));
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_parse_list_literal() {
        let node = parse_single("[1, 2, 3]");
        let Node::List { elements, .. } = node else {
            panic!("expected list");
        };
        assert_eq!(elements.len(), 3);
    }

    #[test]
    fn test_parse_inline_if_with_elif_and_else() {
        let node = parse_single("yadi 1: 10 anyadi 2: 20 uta: 30");
        let Node::If {
            cases, else_case, ..
        } = node
        else {
            panic!("expected if");
        };
        assert_eq!(cases.len(), 2);
        assert!(!cases[0].should_return_null);
        assert!(else_case.is_some());
    }

    #[test]
    fn test_parse_block_if_requires_anta() {
        assert!(parse("yadi 1:\n10\n").is_err());
        assert!(parse("yadi 1:\n10\nanta").is_ok());
    }

    #[test]
    fn test_parse_block_if_case_yields_null_flag() {
        let node = parse_single("yadi 1:\n10\nanta");
        let Node::If { cases, .. } = node else {
            panic!("expected if");
        };
        assert!(cases[0].should_return_null);
    }

    #[test]
    fn test_parse_for_with_step() {
        let node = parse_single("krrite i = 0 ityasmai 10 charana 2: i");
        let Node::For {
            var_name,
            step,
            should_return_null,
            ..
        } = node
        else {
            panic!("expected for");
        };
        assert_eq!(var_name.identifier_name(), Some("i"));
        assert!(step.is_some());
        assert!(!should_return_null);
    }

    #[test]
    fn test_parse_block_for() {
        let node = parse_single("krrite i = 0 ityasmai 3:\ni\nanta");
        let Node::For {
            should_return_null, ..
        } = node
        else {
            panic!("expected for");
        };
        assert!(should_return_null);
    }

    #[test]
    fn test_parse_while() {
        let node = parse_single("sopanah 1: 2");
        assert!(matches!(node, Node::While { .. }));
    }

    #[test]
    fn test_parse_func_def_single_expression_auto_returns() {
        let node = parse_single("niyoga sq(x): x ^ 2");
        let Node::FuncDef {
            name,
            arg_names,
            should_auto_return,
            ..
        } = node
        else {
            panic!("expected function definition");
        };
        assert_eq!(name.and_then(|t| t.identifier_name().map(str::to_owned)), Some("sq".into()));
        assert_eq!(arg_names.len(), 1);
        assert!(should_auto_return);
    }

    #[test]
    fn test_parse_block_func_def() {
        let node = parse_single("niyoga f(x):\npratyavartanam x\nanta");
        let Node::FuncDef {
            should_auto_return, ..
        } = node
        else {
            panic!("expected function definition");
        };
        assert!(!should_auto_return);
    }

    #[test]
    fn test_parse_anonymous_func_def() {
        let node = parse_single("niyoga (x): x");
        let Node::FuncDef { name, .. } = node else {
            panic!("expected function definition");
        };
        assert!(name.is_none());
    }

    #[test]
    fn test_parse_return_without_value() {
        let node = parse_single("pratyavartanam");
        let Node::Return { value, .. } = node else {
            panic!("expected return");
        };
        assert!(value.is_none());
    }

    #[test]
    fn test_parse_break_and_continue() {
        assert!(matches!(parse_single("viramah"), Node::Break { .. }));
        assert!(matches!(parse_single("anuvartanam"), Node::Continue { .. }));
    }

    #[test]
    fn test_parse_requires_eof() {
        assert!(parse("1 1").is_err());
    }

    #[test]
    fn test_parse_missing_rparen() {
        let error = parse("(1 + 2").unwrap_err();
        assert!(error.to_string().contains("apekchhit ')'"));
    }

    #[test]
    fn test_parse_node_spans_are_ordered() {
        let node = parse_single("charah x = 1 + 2");
        assert!(node.pos_start().index <= node.pos_end().index);
    }

    #[test]
    fn test_parse_keyword_spellings_interchangeable() {
        assert!(parse("charaH x = 1").is_ok());
        assert!(parse("kRRite i = 0 ityasmai 3: i").is_ok());
        assert!(parse("sopAnaH 0: 1").is_ok());
        assert!(parse("yadi 1:\n1\naMta").is_ok());
        assert!(parse("yadi 1:\n1\namta").is_ok());
    }
}
