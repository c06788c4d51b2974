//! Error catalogue: syntax/semantic error kinds and their rendered diagnostics.
//!
//! Rather than the reference implementation's scattered integer codes compared against a
//! shared allocator, every specific error is a variant of one of two small tagged enums.
//! Message templates live on the enums themselves (`Display`, via `thiserror`); line numbers
//! and caret pointers are attached separately by whichever caller has source position in
//! hand (the scanner's diagnostic helpers), then accumulated in an [`ErrorLog`].

use thiserror::Error;

/// The two error kinds tracked (and counted) independently, per the reference grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Semantic,
}

/// Syntax-level errors, raised while scanning or parsing the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("SYNTAX[Invalid Initialisation]: Missing keywords")]
    InitMissKeyword,
    #[error("SYNTAX[Invalid Initialisation]: Invalid device name")]
    InitWrongName,
    #[error("SYNTAX[Invalid Initialisation]: Invalid setting")]
    InitWrongSet,
    #[error("SYNTAX[Invalid Connection]: Missing keywords")]
    ConnectMissKeyword,
    #[error("SYNTAX[Invalid Connection]: Invalid device I/O")]
    ConnectWrongIo,
    #[error("SYNTAX[Invalid Monitor]: Missing keywords")]
    MonitorMissKeyword,
    #[error("SYNTAX[Invalid Monitor]: Invalid monitor point")]
    MonitorWrongPoint,
    #[error("SYNTAX[Incomplete File]: Missing sentences")]
    MissDescription,
    #[error("SYNTAX[Incomplete File]: Missing start mark")]
    MissStartMark,
    #[error("SYNTAX[No Termination]: Missing termination mark")]
    MissTermination,
    #[error("SYNTAX[Keyword Not Found]: Invalid keyword")]
    KeywordNotFound,
    #[error("SYNTAX[Invalid Comment]: Missing end comment mark '*/'")]
    InvalidComment,
}

/// Semantic-level errors, raised by Devices/Network/Monitors or whole-circuit checks.
///
/// `PortAbsent` and `NotOutput` are kept distinct (and distinctly worded) even though the
/// reference implementation renders both as "Referencing a nonexisting port".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("SEMANTIC[INIT]: Device is initialised with wrong property")]
    InvalidQualifier,
    #[error("SEMANTIC[INIT]: No qualifier supplied")]
    NoQualifier,
    #[error("SEMANTIC[INIT]: Bad device")]
    BadDevice,
    #[error("SEMANTIC[INIT]: Qualifier given but not expected")]
    QualifierPresent,
    #[error("SEMANTIC[INIT]: Device is being initialised twice")]
    DevicePresent,
    #[error("SEMANTIC[CONNECT]: Input is connected to an input")]
    InputToInput,
    #[error("SEMANTIC[CONNECT]: Output is connected to an output")]
    OutputToOutput,
    #[error("SEMANTIC[CONNECT]: Input is already connected")]
    InputConnected,
    #[error("SEMANTIC[REFERENCE]: Referencing a nonexisting port")]
    PortAbsent,
    #[error("SEMANTIC[REFERENCE]: Referencing a nonexisting device")]
    DeviceAbsent,
    #[error("SEMANTIC[REFERENCE]: Referencing a port that is not an output")]
    NotOutput,
    #[error("SEMANTIC[REFERENCE]: Referencing a monitor port more than once")]
    MonitorPresent,
    #[error("SEMANTIC[CONNECT]: The input CLK of a dtype is not connected to CLOCK")]
    NotClockToClk,
    #[error("SEMANTIC[CONNECT]: The circuit cannot be resolved. Circuit oscillates")]
    Oscillate,
    #[error("SEMANTIC[CONNECT]: There are unused inputs")]
    UnusedInputs,
    #[error("SEMANTIC[CONNECT]: An RC is expected to be connected to a DTYPE SET or CLEAR")]
    NotRcToDType,
}

/// One fully rendered diagnostic block: line number, caret-pointed source excerpt, message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub line: usize,
    pub pointer: String,
    pub message: String,
    pub detail: Option<String>,
}

impl Diagnostic {
    /// Renders the full multi-line block as printed by the CLI front end.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("Error in line: {}\n{}\n{}", self.line, self.pointer, self.message);
        if let Some(detail) = &self.detail {
            out.push(' ');
            out.push_str(detail);
        }
        out
    }
}

/// Accumulates diagnostics for one compilation and counts syntax/semantic occurrences.
#[derive(Debug, Default, Clone)]
pub struct ErrorLog {
    diagnostics: Vec<Diagnostic>,
    syntax_count: usize,
    semantic_count: usize,
}

impl ErrorLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_syntax(&mut self, error: SyntaxError, line: usize, pointer: String, detail: Option<String>) {
        self.syntax_count += 1;
        self.diagnostics.push(Diagnostic {
            kind: ErrorKind::Syntax,
            line,
            pointer,
            message: error.to_string(),
            detail,
        });
    }

    pub fn record_semantic(&mut self, error: SemanticError, line: usize, pointer: String, detail: Option<String>) {
        self.semantic_count += 1;
        self.diagnostics.push(Diagnostic {
            kind: ErrorKind::Semantic,
            line,
            pointer,
            message: error.to_string(),
            detail,
        });
    }

    #[must_use]
    pub fn syntax_count(&self) -> usize {
        self.syntax_count
    }

    #[must_use]
    pub fn semantic_count(&self) -> usize {
        self.semantic_count
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.syntax_count == 0 && self.semantic_count == 0
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Renders every diagnostic block followed by the terminal syntax/semantic summary.
    #[must_use]
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            out.push_str(&diagnostic.render());
            out.push('\n');
        }
        out.push_str(&format!(
            "Total syntax errors: {}\nTotal semantic errors: {}\n",
            self.syntax_count, self.semantic_count
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_absent_and_not_output_have_distinct_messages() {
        assert_ne!(SemanticError::PortAbsent.to_string(), SemanticError::NotOutput.to_string());
    }

    #[test]
    fn error_log_counts_independently() {
        let mut log = ErrorLog::new();
        log.record_syntax(SyntaxError::MissTermination, 1, "^".into(), None);
        log.record_semantic(SemanticError::Oscillate, 2, "^".into(), None);
        assert_eq!(log.syntax_count(), 1);
        assert_eq!(log.semantic_count(), 1);
        assert!(!log.is_clean());
    }

    #[test]
    fn fresh_log_is_clean() {
        assert!(ErrorLog::new().is_clean());
    }
}
