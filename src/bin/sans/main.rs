//! # Sans
//!
//! The SansScript interpreter binary: runs a script file, or starts the
//! interactive shell when no file is given.

mod cli;
mod repl;

use std::fs;

use anyhow::Context as _;
use log::debug;

use sansscript::runtime::Runtime;

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into())?;

    let mut runtime = Runtime::with_std_host();

    let Some(file) = args.file else {
        return repl::shell(&mut runtime);
    };

    let source = fs::read_to_string(&file)
        .with_context(|| format!("could not read {}", file.display()))?;
    let file_name = file.display().to_string();

    debug!("running {file_name}");
    if let Err(error) = runtime.run(&source, &file_name) {
        eprintln!("{error}");
        std::process::exit(1);
    }

    Ok(())
}
