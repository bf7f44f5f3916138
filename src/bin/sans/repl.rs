//! The interactive SansScript shell.

use std::io::{self, BufRead, Write};

use sansscript::interpreter::value::ValueKind;
use sansscript::runtime::Runtime;

const PROMPT: &str = "SansScript>> ";

/// Read-eval-print until EOF. A length-1 result list prints its single
/// element, anything else prints whole.
pub fn shell(runtime: &mut Runtime) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!("\nExiting SansScript Shell...");
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        match runtime.run(&line, "<stdin>") {
            Err(error) => println!("{error}"),
            Ok(value) => println!("{}", render(&value)),
        }
    }
}

fn render(value: &sansscript::interpreter::value::Value) -> String {
    if let ValueKind::List(elements) = &value.kind {
        let elements = elements.borrow();
        if elements.len() == 1 {
            return elements[0].to_string();
        }
    }
    value.to_string()
}
