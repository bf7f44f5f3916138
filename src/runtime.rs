//! Process-wide runtime: one seeded global environment shared by every
//! `run` call, plus the host hooks the built-ins go through.

use crate::error::Error;
use crate::hooks::{Host, StdHost};
use crate::interpreter::builtins::Builtin;
use crate::interpreter::symbol_table::{SharedSymbolTable, SymbolTable};
use crate::interpreter::value::{Value, ValueKind};
use crate::interpreter::Interpreter;

pub struct Runtime {
    globals: SharedSymbolTable,
    host: Box<dyn Host>,
}

impl Runtime {
    pub fn new(host: Box<dyn Host>) -> Self {
        let globals = SymbolTable::new().shared();
        seed_globals(&globals);
        Self { globals, host }
    }

    pub fn with_std_host() -> Self {
        Self::new(Box::<StdHost>::default())
    }

    /// Evaluate a source text against the shared global environment. The
    /// result is the top-level statement list's value: a one-element list
    /// holding the last statement's value.
    pub fn run(&mut self, source: &str, file_name: &str) -> Result<Value, Error> {
        let mut interpreter = Interpreter::new(self.globals.clone(), self.host.as_mut());
        interpreter.evaluate_source(source, file_name)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::with_std_host()
    }
}

/// Constants and built-ins, bound under both the diacritic-preserving and
/// the plain romanization.
fn seed_globals(globals: &SharedSymbolTable) {
    let mut table = globals.borrow_mut();

    for name in ["shUnya", "shunya"] {
        table.set(name, Value::null());
    }
    table.set("satya", Value::true_value());
    table.set("asatya", Value::false_value());
    table.set("pi", Value::pi());

    let builtins: &[(&str, &str, Builtin)] = &[
        ("mudrayati", "mudrayati", Builtin::Print),
        ("mudrayati_punaH", "mudrayati_punah", Builtin::PrintRt),
        ("praveshaH", "praveshah", Builtin::Input),
        ("aMka_praveshaH", "anka_praveshah", Builtin::InputInt),
        ("shuddha", "shuddha", Builtin::Clear),
        ("aMkaH_vA", "ankah_va", Builtin::IsNumber),
        ("sUtram_vA", "sutram_va", Builtin::IsString),
        ("sUchiH_vA", "suchih_va", Builtin::IsList),
        ("kAryaH_vA", "karyah_va", Builtin::IsFunction),
        ("saMyojayati", "samyojayati", Builtin::Append),
        ("apanayati", "apanayati", Builtin::Pop),
        ("prasArayati", "prasarayati", Builtin::Extend),
        ("parimANam", "parimanam", Builtin::Len),
        ("dhAvayati", "dhavayati", Builtin::Run),
    ];

    for (diacritic, plain, builtin) in builtins {
        table.set(*diacritic, Value::new(ValueKind::Builtin(*builtin)));
        table.set(*plain, Value::new(ValueKind::Builtin(*builtin)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::ScriptedHost;

    fn runtime() -> Runtime {
        Runtime::new(Box::new(ScriptedHost::new()))
    }

    /// The shell-facing view of a result: the single element of a length-1
    /// list, the whole value otherwise.
    fn eval(runtime: &mut Runtime, source: &str) -> String {
        let value = runtime.run(source, "test.sans").expect("script failed");
        match &value.kind {
            ValueKind::List(elements) if elements.borrow().len() == 1 => {
                elements.borrow()[0].to_string()
            }
            _ => value.to_string(),
        }
    }

    #[test]
    fn test_globals_are_shared_across_runs() {
        let mut runtime = runtime();
        eval(&mut runtime, "charah x = 2 + 3");
        assert_eq!(eval(&mut runtime, "x"), "5");
    }

    #[test]
    fn test_seeded_constants() {
        let mut runtime = runtime();
        assert_eq!(eval(&mut runtime, "shunya"), "0");
        assert_eq!(eval(&mut runtime, "shUnya"), "0");
        assert_eq!(eval(&mut runtime, "satya"), "1");
        assert_eq!(eval(&mut runtime, "asatya"), "0");
        assert!(eval(&mut runtime, "pi").starts_with("3.14159"));
    }

    #[test]
    fn test_builtins_reachable_under_both_spellings() {
        let mut runtime = runtime();
        assert_eq!(eval(&mut runtime, "ankah_va(1)"), "1");
        assert_eq!(eval(&mut runtime, "aMkaH_vA(1)"), "1");
        assert_eq!(eval(&mut runtime, "sutram_va('x')"), "1");
        assert_eq!(eval(&mut runtime, "karyah_va(mudrayati)"), "1");
    }
}
