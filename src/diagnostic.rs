// Copyright 2026 Cornell University
// released under MIT License
// author: Nikil Shyamunder <nvs26@cornell.edu>
// author: Kevin Laeufer <laeufer@cornell.edu>

use std::collections::HashSet;

use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{Buffer, ColorChoice};

use crate::ir::{BrickId, ExprId, StateId};

/// Track reported findings per model node so a node is only flagged once
/// even when several checks trip over it.
#[derive(Hash, Eq, PartialEq, Debug)]
pub enum ErrorKey {
    AppKey,
    InitialKey,
    BrickKey(BrickId),
    StateKey(StateId),
    ActionKey(StateId, usize),
    TransitionKey(StateId, usize),
    ExprKey(ExprId),
}

/// Severity of diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

/// A single finding about the model. Models are built through the API rather
/// than parsed from a source file, so there is no source location to label;
/// the message itself names the offending brick, state or expression node.
struct Diagnostic {
    message: String,
    level: Level,
}

impl Diagnostic {
    fn emit(&self, buffer: &mut Buffer, files: &SimpleFiles<String, String>) {
        let severity = match self.level {
            Level::Error => Severity::Error,
            Level::Warning => Severity::Warning,
        };

        let diagnostic: CodespanDiagnostic<usize> =
            CodespanDiagnostic::new(severity).with_message(&self.message);

        let config = term::Config::default();
        term::emit(buffer, &config, files, &diagnostic).expect("Failed to write diagnostic");
    }
}

pub struct DiagnosticHandler {
    files: SimpleFiles<String, String>,
    reported_errs: HashSet<ErrorKey>,
    error_string: String,
    /// `color_choice` indicates whether to emit error messages w/ ANSI colors
    color_choice: ColorChoice,
}

impl Default for DiagnosticHandler {
    /// Default `DiagnosticHandler` does not emit colored error messages
    fn default() -> Self {
        Self::new(ColorChoice::Never)
    }
}

impl DiagnosticHandler {
    pub fn new(color_choice: ColorChoice) -> Self {
        Self {
            files: SimpleFiles::new(),
            reported_errs: HashSet::new(),
            error_string: String::new(),
            color_choice,
        }
    }

    /// Creates a buffer for error diagnostics
    /// (different buffers are created based on whether we want colors or not)
    fn create_buffer(&self) -> Buffer {
        if self.color_choice == ColorChoice::Never {
            Buffer::no_color()
        } else {
            Buffer::ansi()
        }
    }

    /// Everything reported so far, in report order.
    pub fn error_string(&self) -> &str {
        &self.error_string
    }

    /// Report a finding anchored at a specific model node. Repeated findings
    /// for the same node are dropped.
    pub fn emit_model_diagnostic(&mut self, key: ErrorKey, message: &str, level: Level) {
        if !self.reported_errs.insert(key) {
            return;
        }
        let mut buffer = self.create_buffer();
        let diagnostic = Diagnostic {
            message: message.to_string(),
            level,
        };

        diagnostic.emit(&mut buffer, &self.files);

        let error_msg = String::from_utf8_lossy(buffer.as_slice()).to_string();
        self.error_string.push_str(&error_msg);
        print!("{}", error_msg);
    }

    pub fn emit_general_message(&mut self, message: &str, level: Level) {
        let mut buffer = self.create_buffer();
        let diagnostic = Diagnostic {
            message: message.to_string(),
            level,
        };

        diagnostic.emit(&mut buffer, &self.files);

        let error_msg = String::from_utf8_lossy(buffer.as_slice()).to_string();
        self.error_string.push_str(&error_msg);
        print!("{}", error_msg);
    }
}
