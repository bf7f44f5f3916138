//! Host hooks: the only points where the interpreter touches the outside
//! world. The built-ins block on these until they return.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{self, BufRead, Write};
use std::rc::Rc;

pub trait Host {
    fn read_line(&mut self) -> io::Result<String>;
    fn write(&mut self, text: &str);
    fn clear_screen(&mut self);
    fn read_file(&mut self, path: &str) -> io::Result<String>;
}

/// Production host over stdin/stdout and the filesystem.
#[derive(Debug, Default)]
pub struct StdHost;

impl Host for StdHost {
    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    fn write(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn clear_screen(&mut self) {
        // ANSI clear + home, the portable equivalent of cls/clear
        self.write("\x1b[2J\x1b[1;1H");
    }

    fn read_file(&mut self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Everything the scripted host observed, shared out so callers can inspect
/// it after the runtime consumed the host.
#[derive(Debug, Default)]
pub struct HostLog {
    pub output: String,
    pub clear_count: usize,
}

/// Canned host for tests and embedders: replays queued input lines, records
/// output, and serves files from an in-memory map.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    input: VecDeque<String>,
    files: HashMap<String, String>,
    log: Rc<RefCell<HostLog>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, lines: &[&str]) -> Self {
        self.input = lines.iter().map(|line| (*line).to_owned()).collect();
        self
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    pub fn log(&self) -> Rc<RefCell<HostLog>> {
        Rc::clone(&self.log)
    }
}

impl Host for ScriptedHost {
    fn read_line(&mut self) -> io::Result<String> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted input left"))
    }

    fn write(&mut self, text: &str) {
        self.log.borrow_mut().output.push_str(text);
    }

    fn clear_screen(&mut self) {
        self.log.borrow_mut().clear_count += 1;
    }

    fn read_file(&mut self, path: &str) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}")))
    }
}
