//! Tree-walking evaluator.
//!
//! Each visitor returns `Result<Value, Flow>`: the error/return/break/
//! continue signals ride the `Err` side and propagate with `?` until the
//! construct that consumes them (loops eat break/continue, calls eat
//! return, `evaluate_source` reports everything left over).

pub mod builtins;
pub mod context;
pub mod symbol_table;
pub mod value;

use std::rc::Rc;

use log::debug;

use crate::error::Error;
use crate::hooks::Host;
use crate::lexer::{Lexer, Position, QuoteKind, Token, TokenKind, KW_AND, KW_NOT, KW_OR};
use crate::parser::{ElseCase, IfCase, Node, Parser};
use crate::translit;

use self::builtins::Builtin;
use self::context::Context;
use self::symbol_table::{SharedSymbolTable, SymbolTable};
use self::value::{resolve_index, FunctionDef, Num, Value, ValueKind};

pub const PROGRAM_CONTEXT: &str = "<कार्यक्रम> | <karyakram>";

/// Non-local exit signals. At most one is ever in flight; consumers clear
/// the signal they handle and re-raise everything else.
#[derive(Debug)]
pub enum Flow {
    Error(Error),
    Return {
        value: Value,
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

impl From<Error> for Flow {
    fn from(error: Error) -> Self {
        Flow::Error(error)
    }
}

pub type Evaluated = Result<Value, Flow>;

fn runtime_error(
    context: &Context,
    pos_start: &Position,
    pos_end: &Position,
    details: impl Into<String>,
) -> Flow {
    Flow::Error(Error::runtime(
        pos_start.clone(),
        pos_end.clone(),
        details.into(),
        context.traceback(pos_start),
    ))
}

pub struct Interpreter<'h> {
    globals: SharedSymbolTable,
    host: &'h mut dyn Host,
}

impl<'h> Interpreter<'h> {
    pub fn new(globals: SharedSymbolTable, host: &'h mut dyn Host) -> Self {
        Self { globals, host }
    }

    /// The full pipeline against the root environment: normalize → lex →
    /// parse → evaluate. Also the re-entry point for the `dhavayati`
    /// built-in, which runs sub-scripts in the same globals.
    pub fn evaluate_source(&mut self, source: &str, file_name: &str) -> Result<Value, Error> {
        let normalized = translit::normalize(source);

        let tokens = match Lexer::new(file_name, &normalized).make_tokens() {
            Ok(tokens) => tokens,
            Err(error) => {
                debug!("lexing {file_name} failed: {}", error.details);
                return Err(error);
            }
        };

        let ast = match Parser::new(tokens).parse() {
            Ok(ast) => ast,
            Err(error) => {
                debug!("parsing {file_name} failed: {}", error.details);
                return Err(error);
            }
        };

        let root = Context::root(PROGRAM_CONTEXT, Rc::clone(&self.globals));
        match self.visit(&ast, &root) {
            Ok(value) => Ok(value),
            Err(Flow::Error(error)) => Err(error),
            Err(Flow::Return {
                pos_start, pos_end, ..
            }) => Err(stray_signal_error(
                &root,
                &pos_start,
                &pos_end,
                "अवैध प्रत्यावर्तनम् | avaidh pratyavartanam",
            )),
            Err(Flow::Break { pos_start, pos_end }) => Err(stray_signal_error(
                &root,
                &pos_start,
                &pos_end,
                "अवैध विरामः | avaidh viramah",
            )),
            Err(Flow::Continue { pos_start, pos_end }) => Err(stray_signal_error(
                &root,
                &pos_start,
                &pos_end,
                "अवैध अनुवर्तनम् | avaidh anuvartanam",
            )),
        }
    }

    fn visit(&mut self, node: &Node, context: &Context) -> Evaluated {
        match node {
            Node::Number { token } => visit_number(token, context),
            Node::Str { token } => visit_string(token, context),
            Node::Statements {
                statements,
                pos_start,
                pos_end,
            } => self.visit_statements(statements, pos_start, pos_end, context),
            Node::List {
                elements,
                pos_start,
                pos_end,
            } => self.visit_list(elements, pos_start, pos_end, context),
            Node::VarAccess { name } => visit_var_access(name, context),
            Node::VarAssign { name, value } => self.visit_var_assign(name, value, context),
            Node::BinaryOp { left, op, right } => self.visit_binary_op(left, op, right, context),
            Node::UnaryOp { op, operand } => self.visit_unary_op(op, operand, context),
            Node::If {
                cases,
                else_case,
                pos_start,
                pos_end,
            } => self.visit_if(cases, else_case.as_deref(), pos_start, pos_end, context),
            Node::For { .. } => self.visit_for(node, context),
            Node::While {
                condition,
                body,
                should_return_null,
            } => self.visit_while(condition, body, *should_return_null, node, context),
            Node::FuncDef {
                name,
                arg_names,
                body,
                should_auto_return,
                pos_start,
                pos_end,
            } => visit_func_def(
                name.as_ref(),
                arg_names,
                body,
                *should_auto_return,
                pos_start,
                pos_end,
                context,
            ),
            Node::Call { callee, args } => self.visit_call(node, callee, args, context),
            Node::Return {
                value,
                pos_start,
                pos_end,
            } => self.visit_return(value.as_deref(), pos_start, pos_end, context),
            Node::Break { pos_start, pos_end } => Err(Flow::Break {
                pos_start: pos_start.clone(),
                pos_end: pos_end.clone(),
            }),
            Node::Continue { pos_start, pos_end } => Err(Flow::Continue {
                pos_start: pos_start.clone(),
                pos_end: pos_end.clone(),
            }),
        }
    }

    /// A statement run evaluates top to bottom and yields the last value,
    /// wrapped in a single-element list.
    fn visit_statements(
        &mut self,
        statements: &[Node],
        pos_start: &Position,
        pos_end: &Position,
        context: &Context,
    ) -> Evaluated {
        let mut last = Value::null();
        for statement in statements {
            last = self.visit(statement, context)?;
        }
        Ok(Value::list(vec![last])
            .with_pos(pos_start.clone(), pos_end.clone())
            .with_context(context))
    }

    fn visit_list(
        &mut self,
        element_nodes: &[Node],
        pos_start: &Position,
        pos_end: &Position,
        context: &Context,
    ) -> Evaluated {
        let mut elements = vec![];
        for element_node in element_nodes {
            elements.push(self.visit(element_node, context)?);
        }
        Ok(Value::list(elements)
            .with_pos(pos_start.clone(), pos_end.clone())
            .with_context(context))
    }

    fn visit_var_assign(
        &mut self,
        name: &Token,
        value_node: &Node,
        context: &Context,
    ) -> Evaluated {
        let value = self.visit(value_node, context)?;
        if let Some(name) = name.identifier_name() {
            context.symbols().borrow_mut().set(name, value.clone());
        }
        Ok(value)
    }

    fn visit_binary_op(
        &mut self,
        left_node: &Node,
        op: &Token,
        right_node: &Node,
        context: &Context,
    ) -> Evaluated {
        let left = self.visit(left_node, context)?;
        let right = self.visit(right_node, context)?;

        let result = match &op.kind {
            TokenKind::Plus => left.added_to(&right),
            TokenKind::Minus => left.subtracted_by(&right),
            TokenKind::Mul => left.multiplied_by(&right),
            TokenKind::Div => left.divided_by(&right),
            TokenKind::Pow => left.powered_by(&right),
            TokenKind::Ee => left.comp_eq(&right),
            TokenKind::Ne => left.comp_ne(&right),
            TokenKind::Lt => left.comp_lt(&right),
            TokenKind::Gt => left.comp_gt(&right),
            TokenKind::Lte => left.comp_lte(&right),
            TokenKind::Gte => left.comp_gte(&right),
            TokenKind::Keyword(_) if op.matches_any_keyword(KW_AND) => left.anded_by(&right),
            TokenKind::Keyword(_) if op.matches_any_keyword(KW_OR) => left.ored_by(&right),
            _ => unreachable!("parser only emits operator tokens in binary position"),
        };

        Ok(result?.with_pos(left_node.pos_start(), right_node.pos_end()))
    }

    fn visit_unary_op(&mut self, op: &Token, operand_node: &Node, context: &Context) -> Evaluated {
        let operand = self.visit(operand_node, context)?;

        let result = match &op.kind {
            TokenKind::Minus => operand.multiplied_by(&Value::int(-1))?,
            TokenKind::Keyword(_) if op.matches_any_keyword(KW_NOT) => operand.notted()?,
            _ => operand,
        };

        Ok(result.with_pos(op.pos_start.clone(), operand_node.pos_end()))
    }

    fn visit_if(
        &mut self,
        cases: &[IfCase],
        else_case: Option<&ElseCase>,
        pos_start: &Position,
        pos_end: &Position,
        context: &Context,
    ) -> Evaluated {
        let null = || {
            Value::null()
                .with_pos(pos_start.clone(), pos_end.clone())
                .with_context(context)
        };

        for case in cases {
            let condition = self.visit(&case.condition, context)?;
            if condition.is_true() {
                let value = self.visit(&case.body, context)?;
                return Ok(if case.should_return_null { null() } else { value });
            }
        }

        if let Some(else_case) = else_case {
            let value = self.visit(&else_case.body, context)?;
            return Ok(if else_case.should_return_null {
                null()
            } else {
                value
            });
        }

        Ok(null())
    }

    fn visit_for(&mut self, node: &Node, context: &Context) -> Evaluated {
        let Node::For {
            var_name,
            start,
            end,
            step,
            body,
            should_return_null,
        } = node
        else {
            unreachable!("visit_for is only dispatched on For nodes");
        };

        let start_value = self.visit(start, context)?;
        let end_value = self.visit(end, context)?;
        let step_value = match step {
            Some(step) => self.visit(step, context)?,
            None => Value::int(1),
        };

        let mut i = expect_number(&start_value, context)?;
        let end_num = expect_number(&end_value, context)?;
        let step_num = expect_number(&step_value, context)?;

        let ascending = match step_num {
            Num::Int(value) => value >= 0,
            Num::Float(value) => value >= 0.0,
        };

        let loop_var = match var_name.identifier_name() {
            Some(name) => name.to_owned(),
            None => unreachable!("for loop variable is an identifier token"),
        };

        let mut elements = vec![];
        loop {
            let proceed = if ascending {
                i.less_than(end_num)
            } else {
                i.greater_than(end_num)
            };
            if !proceed {
                break;
            }

            let bound = Value::number(i)
                .with_pos(var_name.pos_start.clone(), var_name.pos_end.clone())
                .with_context(context);
            context.symbols().borrow_mut().set(loop_var.clone(), bound);
            i = i.add(step_num);

            match self.visit(body, context) {
                Ok(value) => elements.push(value),
                Err(Flow::Continue { .. }) => continue,
                Err(Flow::Break { .. }) => break,
                Err(flow) => return Err(flow),
            }
        }

        Ok(loop_result(elements, *should_return_null, node, context))
    }

    fn visit_while(
        &mut self,
        condition: &Node,
        body: &Node,
        should_return_null: bool,
        node: &Node,
        context: &Context,
    ) -> Evaluated {
        let mut elements = vec![];
        loop {
            let condition_value = self.visit(condition, context)?;
            if !condition_value.is_true() {
                break;
            }

            match self.visit(body, context) {
                Ok(value) => elements.push(value),
                Err(Flow::Continue { .. }) => continue,
                Err(Flow::Break { .. }) => break,
                Err(flow) => return Err(flow),
            }
        }

        Ok(loop_result(elements, should_return_null, node, context))
    }

    fn visit_call(
        &mut self,
        node: &Node,
        callee_node: &Node,
        arg_nodes: &[Node],
        context: &Context,
    ) -> Evaluated {
        let callee = self
            .visit(callee_node, context)?
            .with_pos(node.pos_start(), node.pos_end());

        let mut args = vec![];
        for arg_node in arg_nodes {
            args.push(self.visit(arg_node, context)?);
        }

        let result = match callee.kind.clone() {
            ValueKind::Function(def) => self.call_function(&callee, &def, args)?,
            ValueKind::Builtin(builtin) => self.call_builtin(&callee, builtin, args, context)?,
            _ => {
                return Err(runtime_error(
                    context,
                    &callee.pos_start,
                    &callee.pos_end,
                    "अवैध क्रिया | avaidh kriya",
                ))
            }
        };

        Ok(result
            .with_pos(node.pos_start(), node.pos_end())
            .with_context(context))
    }

    /// User function call: a fresh frame whose symbol table hangs off the
    /// captured (defining) table, arguments bound by position.
    fn call_function(
        &mut self,
        callee: &Value,
        def: &Rc<FunctionDef>,
        args: Vec<Value>,
    ) -> Evaluated {
        let exec_symbols = SymbolTable::with_parent(def.captured.symbols()).shared();
        let exec_context = Context::child(
            def.display_name(),
            &def.captured,
            callee.pos_start.clone(),
            Rc::clone(&exec_symbols),
        );

        check_arity(callee, def.arg_names.len(), args.len(), &exec_context)?;

        for (name, value) in def.arg_names.iter().zip(args) {
            exec_symbols
                .borrow_mut()
                .set(name.clone(), value.with_context(&exec_context));
        }

        match self.visit(&def.body, &exec_context) {
            Ok(value) => Ok(if def.should_auto_return {
                value
            } else {
                Value::null()
            }),
            Err(Flow::Return { value, .. }) => Ok(value),
            Err(flow) => Err(flow),
        }
    }

    fn call_builtin(
        &mut self,
        callee: &Value,
        builtin: Builtin,
        args: Vec<Value>,
        context: &Context,
    ) -> Evaluated {
        let exec_context = Context::child(
            builtin.name(),
            context,
            callee.pos_start.clone(),
            SymbolTable::with_parent(context.symbols()).shared(),
        );

        check_arity(callee, builtin.arg_names().len(), args.len(), &exec_context)?;

        let invalid_list = || {
            runtime_error(
                &exec_context,
                &callee.pos_start,
                &callee.pos_end,
                "अवैध सूची | avaidh suchi",
            )
        };
        let invalid_index = || {
            runtime_error(
                &exec_context,
                &callee.pos_start,
                &callee.pos_end,
                "अवैध स्थानम् | avaidh sthanam",
            )
        };

        match builtin {
            Builtin::Print => {
                self.host.write(&format!("{}\n", args[0]));
                Ok(Value::null())
            }
            Builtin::PrintRt => Ok(Value::string(args[0].to_string(), QuoteKind::Double)),
            Builtin::Input => match self.host.read_line() {
                Ok(line) => Ok(Value::string(line, QuoteKind::Double)),
                Err(_) => Err(runtime_error(
                    &exec_context,
                    &callee.pos_start,
                    &callee.pos_end,
                    "अवैध प्रवेशः | avaidh praveshah",
                )),
            },
            Builtin::InputInt => {
                let line = self.host.read_line().map_err(|_| {
                    runtime_error(
                        &exec_context,
                        &callee.pos_start,
                        &callee.pos_end,
                        "अवैध प्रवेशः | avaidh praveshah",
                    )
                })?;
                match line.trim().parse::<i64>() {
                    Ok(number) => Ok(Value::int(number)),
                    Err(_) => Err(runtime_error(
                        &exec_context,
                        &callee.pos_start,
                        &callee.pos_end,
                        "अवैध अंकः | avaidh ankah",
                    )),
                }
            }
            Builtin::Clear => {
                self.host.clear_screen();
                Ok(Value::null())
            }
            Builtin::IsNumber => Ok(Value::bool(args[0].type_is_number())),
            Builtin::IsString => Ok(Value::bool(args[0].type_is_string())),
            Builtin::IsList => Ok(Value::bool(args[0].type_is_list())),
            Builtin::IsFunction => Ok(Value::bool(args[0].type_is_function())),
            Builtin::Append => {
                let ValueKind::List(elements) = &args[0].kind else {
                    return Err(invalid_list());
                };
                elements.borrow_mut().push(args[1].clone());
                Ok(Value::null())
            }
            Builtin::Pop => {
                let ValueKind::List(elements) = &args[0].kind else {
                    return Err(invalid_list());
                };
                let ValueKind::Number(index) = &args[1].kind else {
                    return Err(invalid_index());
                };
                let mut elements = elements.borrow_mut();
                let index = resolve_index(elements.len(), *index).ok_or_else(invalid_index)?;
                Ok(elements.remove(index))
            }
            Builtin::Extend => {
                let (ValueKind::List(first), ValueKind::List(second)) =
                    (&args[0].kind, &args[1].kind)
                else {
                    return Err(invalid_list());
                };
                // clone before extending, list1 and list2 may alias
                let appended = second.borrow().clone();
                first.borrow_mut().extend(appended);
                Ok(Value::null())
            }
            Builtin::Len => {
                let ValueKind::List(elements) = &args[0].kind else {
                    return Err(invalid_list());
                };
                Ok(Value::int(elements.borrow().len() as i64))
            }
            Builtin::Run => {
                let ValueKind::Str { value: path, .. } = &args[0].kind else {
                    return Err(runtime_error(
                        &exec_context,
                        &callee.pos_start,
                        &callee.pos_end,
                        "अवैध सूत्रम् | avaidh sutram",
                    ));
                };
                let script = self.host.read_file(path).map_err(|error| {
                    runtime_error(
                        &exec_context,
                        &callee.pos_start,
                        &callee.pos_end,
                        format!("अवैध सञ्चिका | avaidh sanchikaa: {error}"),
                    )
                })?;
                if let Err(error) = self.evaluate_source(&script, path) {
                    return Err(runtime_error(
                        &exec_context,
                        &callee.pos_start,
                        &callee.pos_end,
                        format!("अवैध सञ्चिका | avaidh sanchikaa:\n{error}"),
                    ));
                }
                Ok(Value::null())
            }
        }
    }

    fn visit_return(
        &mut self,
        value_node: Option<&Node>,
        pos_start: &Position,
        pos_end: &Position,
        context: &Context,
    ) -> Evaluated {
        let value = match value_node {
            Some(node) => self.visit(node, context)?,
            None => Value::null()
                .with_pos(pos_start.clone(), pos_end.clone())
                .with_context(context),
        };
        Err(Flow::Return {
            value,
            pos_start: pos_start.clone(),
            pos_end: pos_end.clone(),
        })
    }
}

/// Block-form loops yield null; expression-form loops collect every
/// iteration's value into a list.
fn loop_result(
    elements: Vec<Value>,
    should_return_null: bool,
    node: &Node,
    context: &Context,
) -> Value {
    let result = if should_return_null {
        Value::null()
    } else {
        Value::list(elements)
    };
    result
        .with_pos(node.pos_start(), node.pos_end())
        .with_context(context)
}

fn stray_signal_error(
    context: &Context,
    pos_start: &Position,
    pos_end: &Position,
    details: &str,
) -> Error {
    Error::runtime(
        pos_start.clone(),
        pos_end.clone(),
        details.into(),
        context.traceback(pos_start),
    )
}

fn check_arity(
    callee: &Value,
    expected: usize,
    given: usize,
    context: &Context,
) -> Result<(), Flow> {
    if given > expected {
        let extra = given - expected;
        return Err(runtime_error(
            context,
            &callee.pos_start,
            &callee.pos_end,
            format!("{extra} अधिक प्राप्ताः | {extra} adhik praptaah"),
        ));
    }
    if given < expected {
        let missing = expected - given;
        return Err(runtime_error(
            context,
            &callee.pos_start,
            &callee.pos_end,
            format!("{missing} अभावाः | {missing} abhavah"),
        ));
    }
    Ok(())
}

fn expect_number(value: &Value, context: &Context) -> Result<Num, Flow> {
    match &value.kind {
        ValueKind::Number(num) => Ok(*num),
        _ => Err(runtime_error(
            context,
            &value.pos_start,
            &value.pos_end,
            "अवैध अंकः | avaidh ankah",
        )),
    }
}

fn visit_number(token: &Token, context: &Context) -> Evaluated {
    let num = match token.kind {
        TokenKind::Int(value) => Num::Int(value),
        TokenKind::Float(value) => Num::Float(value),
        _ => unreachable!("number node always holds a numeric token"),
    };
    Ok(Value::number(num)
        .with_pos(token.pos_start.clone(), token.pos_end.clone())
        .with_context(context))
}

fn visit_string(token: &Token, context: &Context) -> Evaluated {
    let TokenKind::Str { value, quote } = &token.kind else {
        unreachable!("string node always holds a string token");
    };
    Ok(Value::string(value.clone(), *quote)
        .with_pos(token.pos_start.clone(), token.pos_end.clone())
        .with_context(context))
}

fn visit_var_access(name: &Token, context: &Context) -> Evaluated {
    let Some(var_name) = name.identifier_name() else {
        unreachable!("variable access always holds an identifier token");
    };

    let value = context.symbols().borrow().get(var_name);
    match value {
        // a fresh copy, blamed on the access site from here on
        Some(value) => Ok(value
            .with_pos(name.pos_start.clone(), name.pos_end.clone())
            .with_context(context)),
        None => Err(runtime_error(
            context,
            &name.pos_start,
            &name.pos_end,
            format!("'{var_name}' न विवक्षितम् | '{var_name}' na vivakshitam"),
        )),
    }
}

fn visit_func_def(
    name: Option<&Token>,
    arg_name_tokens: &[Token],
    body: &Node,
    should_auto_return: bool,
    pos_start: &Position,
    pos_end: &Position,
    context: &Context,
) -> Evaluated {
    let func_name = name
        .and_then(|token| token.identifier_name())
        .map(str::to_owned);
    let arg_names: Vec<String> = arg_name_tokens
        .iter()
        .filter_map(|token| token.identifier_name().map(str::to_owned))
        .collect();

    let def = FunctionDef {
        name: func_name.clone(),
        body: body.clone(),
        arg_names,
        should_auto_return,
        captured: context.clone(),
    };
    let value = Value::new(ValueKind::Function(Rc::new(def)))
        .with_pos(pos_start.clone(), pos_end.clone())
        .with_context(context);

    if let Some(func_name) = func_name {
        context.symbols().borrow_mut().set(func_name, value.clone());
    }
    Ok(value)
}
