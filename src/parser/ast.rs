//! AST node types produced by the parser and consumed by the interpreter.
//!
//! Every node carries (or can derive) the start/end positions of the source
//! tokens it spans, which the interpreter threads into runtime values for
//! error attribution.

use crate::lexer::{Position, Token};

#[derive(Debug, Clone)]
pub struct IfCase {
    pub condition: Node,
    pub body: Node,
    /// Block-bodied cases yield null, expression-bodied ones yield their value.
    pub should_return_null: bool,
}

#[derive(Debug, Clone)]
pub struct ElseCase {
    pub body: Node,
    pub should_return_null: bool,
}

#[derive(Debug, Clone)]
pub enum Node {
    Number {
        token: Token,
    },
    Str {
        token: Token,
    },
    List {
        elements: Vec<Node>,
        pos_start: Position,
        pos_end: Position,
    },
    /// A run of statements. Evaluates to a single-element list holding the
    /// last statement's value.
    Statements {
        statements: Vec<Node>,
        pos_start: Position,
        pos_end: Position,
    },
    VarAccess {
        name: Token,
    },
    VarAssign {
        name: Token,
        value: Box<Node>,
    },
    BinaryOp {
        left: Box<Node>,
        op: Token,
        right: Box<Node>,
    },
    UnaryOp {
        op: Token,
        operand: Box<Node>,
    },
    If {
        cases: Vec<IfCase>,
        else_case: Option<Box<ElseCase>>,
        pos_start: Position,
        pos_end: Position,
    },
    For {
        var_name: Token,
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
        body: Box<Node>,
        should_return_null: bool,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
        should_return_null: bool,
    },
    FuncDef {
        name: Option<Token>,
        arg_names: Vec<Token>,
        body: Box<Node>,
        should_auto_return: bool,
        pos_start: Position,
        pos_end: Position,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    Return {
        value: Option<Box<Node>>,
        pos_start: Position,
        pos_end: Position,
    },
    Break {
        pos_start: Position,
        pos_end: Position,
    },
    Continue {
        pos_start: Position,
        pos_end: Position,
    },
}

impl Node {
    pub fn pos_start(&self) -> Position {
        match self {
            Node::Number { token } | Node::Str { token } => token.pos_start.clone(),
            Node::List { pos_start, .. }
            | Node::Statements { pos_start, .. }
            | Node::If { pos_start, .. }
            | Node::FuncDef { pos_start, .. }
            | Node::Return { pos_start, .. }
            | Node::Break { pos_start, .. }
            | Node::Continue { pos_start, .. } => pos_start.clone(),
            Node::VarAccess { name } | Node::VarAssign { name, .. } => name.pos_start.clone(),
            Node::BinaryOp { left, .. } => left.pos_start(),
            Node::UnaryOp { op, .. } => op.pos_start.clone(),
            Node::For { var_name, .. } => var_name.pos_start.clone(),
            Node::While { condition, .. } => condition.pos_start(),
            Node::Call { callee, .. } => callee.pos_start(),
        }
    }

    pub fn pos_end(&self) -> Position {
        match self {
            Node::Number { token } | Node::Str { token } => token.pos_end.clone(),
            Node::List { pos_end, .. }
            | Node::Statements { pos_end, .. }
            | Node::If { pos_end, .. }
            | Node::FuncDef { pos_end, .. }
            | Node::Return { pos_end, .. }
            | Node::Break { pos_end, .. }
            | Node::Continue { pos_end, .. } => pos_end.clone(),
            Node::VarAccess { name } => name.pos_end.clone(),
            Node::VarAssign { value, .. } => value.pos_end(),
            Node::BinaryOp { right, .. } => right.pos_end(),
            Node::UnaryOp { operand, .. } => operand.pos_end(),
            Node::For { body, .. } | Node::While { body, .. } => body.pos_end(),
            Node::Call { callee, args } => args
                .last()
                .map(Node::pos_end)
                .unwrap_or_else(|| callee.pos_end()),
        }
    }
}
