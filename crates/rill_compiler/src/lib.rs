//! rill_compiler: the whole front end behind one call.
//!
//! [`Compilation::compile`] runs scan, parse and bind over a source
//! string and hands back the bound program with every diagnostic the
//! pipeline produced, sorted by source position. Callers decide what to
//! do next: render the diagnostics, or evaluate the program when there
//! are none.

use rill_binder::{bind, BoundProgram};
use rill_core::text::LineMap;
use rill_diagnostics::{Diagnostic, DiagnosticCollection};
use rill_parser::parse;

/// The result of compiling one source string.
#[derive(Debug)]
pub struct Compilation {
    pub program: BoundProgram,
    diagnostics: DiagnosticCollection,
}

impl Compilation {
    pub fn compile(source: &str) -> Compilation {
        let (syntax, mut diagnostics) = parse(source);
        let (program, bind_diagnostics) = bind(&syntax);
        diagnostics.extend(bind_diagnostics);
        diagnostics.sort();
        Compilation {
            program,
            diagnostics,
        }
    }

    /// Any diagnostic makes the program unrunnable.
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.diagnostics()
    }

    /// Render every diagnostic in the `(line:col, line:col) message.`
    /// form, one per line, in source order.
    pub fn render_diagnostics(&self, source: &str) -> String {
        let line_map = LineMap::new(source);
        let mut rendered = String::new();
        for diagnostic in self.diagnostics() {
            rendered.push_str(&diagnostic.format(&line_map));
            rendered.push('\n');
        }
        rendered
    }
}
