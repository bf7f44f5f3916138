//! Runtime values and their operator contracts.
//!
//! Every value carries the source span it was produced at and a back-link to
//! the [`Context`] active at creation; both exist purely for error
//! attribution. Lists alias their element storage, so in-place mutation
//! through the list built-ins is visible to every holder of the same list.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::lexer::{Position, QuoteKind};
use crate::parser::Node;

use super::builtins::Builtin;
use super::context::Context;

/// Numbers are either integers or floats; any float operand makes the
/// result a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(value) => value as f64,
            Num::Float(value) => value,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Num::Int(value) => value == 0,
            Num::Float(value) => value == 0.0,
        }
    }

    pub fn truthy(self) -> bool {
        !self.is_zero()
    }

    /// Integer arithmetic promotes to float on overflow.
    pub fn add(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a
                .checked_add(b)
                .map(Num::Int)
                .unwrap_or(Num::Float(a as f64 + b as f64)),
            _ => Num::Float(self.as_f64() + other.as_f64()),
        }
    }

    pub fn sub(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a
                .checked_sub(b)
                .map(Num::Int)
                .unwrap_or(Num::Float(a as f64 - b as f64)),
            _ => Num::Float(self.as_f64() - other.as_f64()),
        }
    }

    pub fn mul(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a
                .checked_mul(b)
                .map(Num::Int)
                .unwrap_or(Num::Float(a as f64 * b as f64)),
            _ => Num::Float(self.as_f64() * other.as_f64()),
        }
    }

    /// Integer division truncates toward zero. The caller rules out zero
    /// divisors beforehand.
    pub fn div(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a
                .checked_div(b)
                .map(Num::Int)
                .unwrap_or(Num::Float(a as f64 / b as f64)),
            _ => Num::Float(self.as_f64() / other.as_f64()),
        }
    }

    pub fn pow(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) if b >= 0 => u32::try_from(b)
                .ok()
                .and_then(|exp| a.checked_pow(exp))
                .map(Num::Int)
                .unwrap_or(Num::Float((a as f64).powf(b as f64))),
            _ => Num::Float(self.as_f64().powf(other.as_f64())),
        }
    }

    pub fn equals(self, other: Num) -> bool {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }

    pub fn less_than(self, other: Num) -> bool {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a < b,
            _ => self.as_f64() < other.as_f64(),
        }
    }

    pub fn greater_than(self, other: Num) -> bool {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a > b,
            _ => self.as_f64() > other.as_f64(),
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Int(value) => write!(f, "{value}"),
            // Debug formatting keeps the decimal point on round floats
            Num::Float(value) => write!(f, "{value:?}"),
        }
    }
}

/// A user-defined function: the body AST plus the context captured at the
/// definition site (lexical scope).
#[derive(Debug)]
pub struct FunctionDef {
    pub name: Option<String>,
    pub body: Node,
    pub arg_names: Vec<String>,
    pub should_auto_return: bool,
    pub captured: Context,
}

impl FunctionDef {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<अज्ञातम्>")
    }
}

#[derive(Debug, Clone)]
pub enum ValueKind {
    Number(Num),
    Str { value: String, quote: QuoteKind },
    List(Rc<RefCell<Vec<Value>>>),
    Function(Rc<FunctionDef>),
    Builtin(Builtin),
}

#[derive(Debug, Clone)]
pub struct Value {
    pub kind: ValueKind,
    pub pos_start: Position,
    pub pos_end: Position,
    pub context: Option<Context>,
}

fn internal_position() -> Position {
    Position::start("<antargata>".into(), "".into())
}

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            pos_start: internal_position(),
            pos_end: internal_position(),
            context: None,
        }
    }

    pub fn number(num: Num) -> Self {
        Self::new(ValueKind::Number(num))
    }

    pub fn int(value: i64) -> Self {
        Self::number(Num::Int(value))
    }

    pub fn null() -> Self {
        Self::int(0)
    }

    pub fn true_value() -> Self {
        Self::int(1)
    }

    pub fn false_value() -> Self {
        Self::int(0)
    }

    pub fn pi() -> Self {
        Self::number(Num::Float(std::f64::consts::PI))
    }

    pub fn bool(value: bool) -> Self {
        Self::int(i64::from(value))
    }

    pub fn string(value: String, quote: QuoteKind) -> Self {
        Self::new(ValueKind::Str { value, quote })
    }

    pub fn list(elements: Vec<Value>) -> Self {
        Self::new(ValueKind::List(Rc::new(RefCell::new(elements))))
    }

    pub fn with_pos(mut self, pos_start: Position, pos_end: Position) -> Self {
        self.pos_start = pos_start;
        self.pos_end = pos_end;
        self
    }

    pub fn with_context(mut self, context: &Context) -> Self {
        self.context = Some(context.clone());
        self
    }

    /// A fresh value sharing this one's span and context. List results get
    /// new element storage, never an alias of an operand.
    fn derived(&self, kind: ValueKind) -> Value {
        Value {
            kind,
            pos_start: self.pos_start.clone(),
            pos_end: self.pos_end.clone(),
            context: self.context.clone(),
        }
    }

    fn derived_number(&self, num: Num) -> Value {
        self.derived(ValueKind::Number(num))
    }

    pub fn runtime_error(
        &self,
        pos_start: &Position,
        pos_end: &Position,
        details: impl Into<String>,
    ) -> Error {
        let trace = self
            .context
            .as_ref()
            .map(|context| context.traceback(pos_start))
            .unwrap_or_default();
        Error::runtime(pos_start.clone(), pos_end.clone(), details.into(), trace)
    }

    fn illegal_operation(&self, _other: &Value) -> Error {
        self.runtime_error(&self.pos_start, &self.pos_end, "अवैध क्रिया | avaidh kriya")
    }

    fn index_error(&self, other: &Value) -> Error {
        self.runtime_error(
            &other.pos_start,
            &other.pos_end,
            "अवैध स्थानम् | avaidh sthanam",
        )
    }

    pub fn is_true(&self) -> bool {
        match &self.kind {
            ValueKind::Number(num) => num.truthy(),
            ValueKind::Str { value, .. } => !value.is_empty(),
            ValueKind::List(elements) => !elements.borrow().is_empty(),
            ValueKind::Function(_) | ValueKind::Builtin(_) => true,
        }
    }

    pub fn type_is_number(&self) -> bool {
        matches!(self.kind, ValueKind::Number(_))
    }

    pub fn type_is_string(&self) -> bool {
        matches!(self.kind, ValueKind::Str { .. })
    }

    pub fn type_is_list(&self) -> bool {
        matches!(self.kind, ValueKind::List(_))
    }

    pub fn type_is_function(&self) -> bool {
        matches!(self.kind, ValueKind::Function(_) | ValueKind::Builtin(_))
    }

    pub fn added_to(&self, other: &Value) -> Result<Value, Error> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(self.derived_number(a.add(*b))),
            (ValueKind::Str { value: a, .. }, ValueKind::Str { value: b, .. }) => {
                Ok(self.derived(ValueKind::Str {
                    value: format!("{a}{b}"),
                    quote: QuoteKind::Double,
                }))
            }
            (ValueKind::List(elements), ValueKind::Number(_)) => {
                let mut appended = elements.borrow().clone();
                appended.push(other.clone());
                Ok(self.derived(ValueKind::List(Rc::new(RefCell::new(appended)))))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn subtracted_by(&self, other: &Value) -> Result<Value, Error> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(self.derived_number(a.sub(*b))),
            (ValueKind::List(elements), ValueKind::Number(index)) => {
                let mut removed = elements.borrow().clone();
                let index = resolve_index(removed.len(), *index).ok_or_else(|| self.index_error(other))?;
                removed.remove(index);
                Ok(self.derived(ValueKind::List(Rc::new(RefCell::new(removed)))))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn multiplied_by(&self, other: &Value) -> Result<Value, Error> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(self.derived_number(a.mul(*b))),
            (ValueKind::Str { value, .. }, ValueKind::Number(Num::Int(count))) => {
                let count = usize::try_from(*count).unwrap_or(0);
                Ok(self.derived(ValueKind::Str {
                    value: value.repeat(count),
                    quote: QuoteKind::Double,
                }))
            }
            (ValueKind::List(elements), ValueKind::Number(_)) => {
                let mut appended = elements.borrow().clone();
                appended.push(other.clone());
                Ok(self.derived(ValueKind::List(Rc::new(RefCell::new(appended)))))
            }
            (ValueKind::List(a), ValueKind::List(b)) => {
                // element-wise product, the shorter side padded with zeroes
                let a = a.borrow().clone();
                let b = b.borrow().clone();
                let len = a.len().max(b.len());
                let mut products = Vec::with_capacity(len);
                for index in 0..len {
                    let left = a.get(index).cloned().unwrap_or_else(Value::null);
                    let right = b.get(index).cloned().unwrap_or_else(Value::null);
                    products.push(left.multiplied_by(&right)?);
                }
                Ok(self.derived(ValueKind::List(Rc::new(RefCell::new(products)))))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn divided_by(&self, other: &Value) -> Result<Value, Error> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                if b.is_zero() {
                    return Err(self.runtime_error(
                        &other.pos_start,
                        &other.pos_end,
                        "शून्येन विभागः | shunyen vibhagah",
                    ));
                }
                Ok(self.derived_number(a.div(*b)))
            }
            (ValueKind::List(elements), ValueKind::Number(index)) => {
                let elements = elements.borrow();
                let index = resolve_index(elements.len(), *index).ok_or_else(|| self.index_error(other))?;
                Ok(elements[index].clone())
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn powered_by(&self, other: &Value) -> Result<Value, Error> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(self.derived_number(a.pow(*b))),
            _ => Err(self.illegal_operation(other)),
        }
    }

    fn numeric_compare(
        &self,
        other: &Value,
        compare: fn(Num, Num) -> bool,
    ) -> Result<Value, Error> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                Ok(self.derived_number(Num::Int(i64::from(compare(*a, *b)))))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn comp_eq(&self, other: &Value) -> Result<Value, Error> {
        self.numeric_compare(other, Num::equals)
    }

    pub fn comp_ne(&self, other: &Value) -> Result<Value, Error> {
        self.numeric_compare(other, |a, b| !a.equals(b))
    }

    pub fn comp_lt(&self, other: &Value) -> Result<Value, Error> {
        self.numeric_compare(other, Num::less_than)
    }

    pub fn comp_gt(&self, other: &Value) -> Result<Value, Error> {
        self.numeric_compare(other, Num::greater_than)
    }

    pub fn comp_lte(&self, other: &Value) -> Result<Value, Error> {
        self.numeric_compare(other, |a, b| !a.greater_than(b))
    }

    pub fn comp_gte(&self, other: &Value) -> Result<Value, Error> {
        self.numeric_compare(other, |a, b| !a.less_than(b))
    }

    /// Both operands are always evaluated before the combinator applies;
    /// `tatha`/`va` do not short-circuit.
    pub fn anded_by(&self, other: &Value) -> Result<Value, Error> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                Ok(self.derived_number(Num::Int(i64::from(a.truthy() && b.truthy()))))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn ored_by(&self, other: &Value) -> Result<Value, Error> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                Ok(self.derived_number(Num::Int(i64::from(a.truthy() || b.truthy()))))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn notted(&self) -> Result<Value, Error> {
        Ok(self.derived_number(Num::Int(i64::from(!self.is_true()))))
    }
}

/// Negative indices count from the end of the list.
pub fn resolve_index(len: usize, index: Num) -> Option<usize> {
    let Num::Int(index) = index else {
        return None;
    };
    let resolved = if index < 0 {
        index + len as i64
    } else {
        index
    };
    usize::try_from(resolved).ok().filter(|&i| i < len)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Number(num) => write!(f, "{num}"),
            ValueKind::Str { value, quote } => {
                if value.is_empty() {
                    f.write_str("''")
                } else {
                    match quote {
                        QuoteKind::Single => write!(f, "'{value}'"),
                        QuoteKind::Double => write!(f, "\"{value}\""),
                    }
                }
            }
            ValueKind::List(elements) => {
                let elements = elements.borrow();
                let rendered: Vec<String> =
                    elements.iter().map(|element| element.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            ValueKind::Function(func) => write!(f, "<function {}>", func.display_name()),
            ValueKind::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name()),
        }
    }
}
