//! rill: the rill script runner.
//!
//! Usage:
//!   rill [options] <file>
//!
//! Compiles the script, prints any diagnostics, and evaluates it when
//! the compilation is clean. Exit codes: 0 on success, 1 for usage and
//! IO failures, 2 when diagnostics were reported, 3 for an uncaught
//! panic.

use clap::Parser as ClapParser;
use miette::{NamedSource, SourceSpan};
use rill_compiler::Compilation;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;

#[derive(ClapParser, Debug)]
#[command(name = "rill", about = "rill - a small scripting language", version)]
struct Cli {
    /// The script to run.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Type-check only, do not evaluate.
    #[arg(long)]
    check: bool,

    /// Render diagnostics with source excerpts.
    #[arg(long)]
    pretty: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = Cli::parse();
    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let source = match std::fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(error) => {
            print_error(&format!("Failed to read '{}': {}", cli.file.display(), error));
            return 1;
        }
    };

    let compilation = Compilation::compile(&source);

    if compilation.has_errors() {
        if cli.pretty {
            print_pretty_diagnostics(&cli.file, &source, &compilation);
        } else {
            eprint!("{}", compilation.render_diagnostics(&source));
        }
        return 2;
    }

    if cli.check {
        return 0;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match rill_evaluator::evaluate(&compilation.program, &mut out) {
        Ok(()) => 0,
        Err(panic) => {
            print_error(&format!("Uncaught panic: {}", panic));
            3
        }
    }
}

/// A diagnostic repackaged for miette's fancy renderer.
#[derive(Debug, Error, miette::Diagnostic)]
#[error("{message}")]
struct RenderedDiagnostic {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label]
    span: SourceSpan,
}

fn print_pretty_diagnostics(path: &Path, source: &str, compilation: &Compilation) {
    for diagnostic in compilation.diagnostics() {
        let start = byte_offset(source, diagnostic.span.start as usize);
        let end = byte_offset(source, diagnostic.span.end() as usize);
        let report = miette::Report::new(RenderedDiagnostic {
            message: format!("RL{}: {}", diagnostic.code, diagnostic.message_text),
            src: NamedSource::new(path.display().to_string(), source.to_string()),
            span: SourceSpan::new(start.into(), end - start),
        });
        eprintln!("{:?}", report);
    }
}

/// Diagnostic spans count characters; miette labels count bytes.
fn byte_offset(source: &str, char_offset: usize) -> usize {
    source
        .char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(source.len())
}

fn print_error(msg: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::byte_offset;

    #[test]
    fn byte_offsets_track_multibyte_characters() {
        let source = "let ü = \"héllo\"";
        assert_eq!(byte_offset(source, 0), 0);
        assert_eq!(byte_offset(source, 4), 4);
        // `ü` is two bytes, so everything after it shifts by one.
        assert_eq!(byte_offset(source, 5), 6);
        assert_eq!(byte_offset(source, 8), 9);
        // Past the end clamps to the source length.
        assert_eq!(byte_offset(source, 99), source.len());
    }
}
