//! Warnings and fatal events raised while converting a workbook.
use std::fmt::Display;
use tracing::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Fatal,
}

/// One event with the sheet and, when known, the row and column it concerns.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub sheet: String,
    /// Spreadsheet row number (1-based)
    pub row: Option<usize>,
    /// Spreadsheet column letter
    pub column: Option<String>,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "WARNING: ")?,
            Severity::Fatal => write!(f, "ERROR: ")?,
        }
        write!(f, "sheet \"{}\"", self.sheet)?;
        if let Some(row) = self.row {
            write!(f, " row {row}")?;
        }
        if let Some(column) = &self.column {
            write!(f, " column {column}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Collects the diagnostics of one run, in the order they were raised.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    events: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning and logs it.
    pub fn warn(&mut self, sheet: &str, row: Option<usize>, column: Option<String>, message: String) {
        let diagnostic = Diagnostic {
            severity: Severity::Warning,
            sheet: sheet.to_owned(),
            row,
            column,
            message,
        };
        warn!("{}", diagnostic);
        self.events.push(diagnostic);
    }

    /// Records the event that ended a run.
    pub fn fatal(&mut self, sheet: &str, row: Option<usize>, column: Option<String>, message: String) {
        self.events.push(Diagnostic {
            severity: Severity::Fatal,
            sheet: sheet.to_owned(),
            row,
            column,
            message,
        });
    }

    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.events.iter().filter(|event| event.severity == Severity::Warning)
    }

    pub fn has_fatal(&self) -> bool {
        self.events.iter().any(|event| event.severity == Severity::Fatal)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
