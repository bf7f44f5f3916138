use std::fmt;
use std::rc::Rc;

use crate::error::TraceFrame;
use crate::lexer::Position;

use super::symbol_table::SharedSymbolTable;

struct ContextData {
    display_name: String,
    parent: Option<Context>,
    parent_entry_pos: Option<Position>,
    symbols: SharedSymbolTable,
}

/// Call-frame descriptor: a display name for tracebacks, the frame that
/// entered it (plus the call-site position), and the symbol table bound to
/// this frame. Cheap to clone; every runtime value links back to one.
#[derive(Clone)]
pub struct Context {
    data: Rc<ContextData>,
}

impl Context {
    pub fn root(display_name: impl Into<String>, symbols: SharedSymbolTable) -> Self {
        Self {
            data: Rc::new(ContextData {
                display_name: display_name.into(),
                parent: None,
                parent_entry_pos: None,
                symbols,
            }),
        }
    }

    pub fn child(
        display_name: impl Into<String>,
        parent: &Context,
        entry_pos: Position,
        symbols: SharedSymbolTable,
    ) -> Self {
        Self {
            data: Rc::new(ContextData {
                display_name: display_name.into(),
                parent: Some(parent.clone()),
                parent_entry_pos: Some(entry_pos),
                symbols,
            }),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.data.display_name
    }

    pub fn symbols(&self) -> SharedSymbolTable {
        Rc::clone(&self.data.symbols)
    }

    /// Walk the frame chain outward from the error site, outermost frame
    /// first, for traceback rendering.
    pub fn traceback(&self, error_pos: &Position) -> Vec<TraceFrame> {
        let mut frames = vec![];
        let mut current = Some(self.clone());
        let mut pos = Some(error_pos.clone());

        while let Some(context) = current {
            if let Some(frame_pos) = pos {
                frames.push(TraceFrame {
                    display_name: context.data.display_name.clone(),
                    pos: frame_pos,
                });
            }
            pos = context.data.parent_entry_pos.clone();
            current = context.data.parent.clone();
        }

        frames.reverse();
        frames
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("display_name", &self.data.display_name)
            .field("has_parent", &self.data.parent.is_some())
            .finish()
    }
}
