//! # Conversion Pipeline
//!
//! Drives one run through its stages:
//!
//! ```text
//! Init -> TemplateLoaded -> SheetsIngested -> Corrected -> Written
//! ```
//!
//! Any error moves the run to `Failed`, which is terminal. Calling a stage
//! out of order is an error too. The fact text is only handed out once the
//! run is `Written`.
use crate::diagnostic::Diagnostics;
use crate::error::RustyFactsError;
use crate::facts::FactWriter;
use crate::spreadsheet::RawSheet;
use crate::table;
use crate::table::FactTable;
use crate::table::RawTable;
use crate::template::Template;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use tracing::info;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Init,
    TemplateLoaded,
    SheetsIngested,
    Corrected,
    Written,
    Failed,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Init => "INIT",
            Stage::TemplateLoaded => "TEMPLATE_LOADED",
            Stage::SheetsIngested => "SHEETS_INGESTED",
            Stage::Corrected => "CORRECTED",
            Stage::Written => "WRITTEN",
            Stage::Failed => "FAILED",
        };
        write!(f, "{name}")
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Cannot {operation} a conversion in state {stage}")]
    InvalidStage { operation: &'static str, stage: Stage },
}

/// One template and workbook conversion.
#[derive(Debug)]
pub struct Conversion {
    stage: Stage,
    template: Template,
    tables: Vec<RawTable>,
    facts: Vec<FactTable>,
    output: String,
    diagnostics: Diagnostics,
}

impl Default for Conversion {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversion {
    pub fn new() -> Self {
        Self {
            stage: Stage::Init,
            template: Template::default(),
            tables: Vec::new(),
            facts: Vec::new(),
            output: String::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Parses the template text.
    pub fn load_template(&mut self, text: &str) -> Result<(), RustyFactsError> {
        self.require(Stage::Init, "load a template into")?;
        let template = Template::parse(text).map_err(RustyFactsError::from);
        self.template = self.settle(template, "template")?;
        info!("Template declares {} tables", self.template.len());
        self.stage = Stage::TemplateLoaded;
        Ok(())
    }

    /// Reads and parses a template file.
    pub fn load_template_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), RustyFactsError> {
        self.require(Stage::Init, "load a template into")?;
        let template = Template::from_file(path);
        self.template = self.settle(template, "template")?;
        info!("Template declares {} tables", self.template.len());
        self.stage = Stage::TemplateLoaded;
        Ok(())
    }

    /// Takes the sheets of a workbook, pairs them with the template, then
    /// normalizes table names and trims text cells.
    pub fn ingest(&mut self, sheets: Vec<RawSheet>) -> Result<(), RustyFactsError> {
        self.require(Stage::TemplateLoaded, "ingest sheets into")?;
        let tables = table::ingest(&self.template, sheets, &mut self.diagnostics)
            .and_then(table::normalize_names)
            .map(table::trim)
            .map_err(RustyFactsError::from);
        self.tables = self.settle(tables, "workbook")?;
        self.stage = Stage::SheetsIngested;
        Ok(())
    }

    /// Corrects every ingested table according to its style.
    pub fn correct(&mut self) -> Result<(), RustyFactsError> {
        self.require(Stage::SheetsIngested, "correct")?;
        let tables = std::mem::take(&mut self.tables);
        let facts = table::correct(tables, &mut self.diagnostics);
        self.facts = self.settle(facts, "workbook")?;
        self.stage = Stage::Corrected;
        Ok(())
    }

    /// Renders the fact text. Calling it again on a written run returns
    /// the same text.
    pub fn write(&mut self) -> Result<&str, RustyFactsError> {
        if self.stage == Stage::Written {
            return Ok(&self.output);
        }
        self.require(Stage::Corrected, "write")?;
        let output = FactWriter::to_text(&self.facts);
        self.output = self.settle(output, "output")?;
        self.stage = Stage::Written;
        Ok(&self.output)
    }

    /// The fact text, once the run is written.
    pub fn output(&self) -> Option<&str> {
        (self.stage == Stage::Written).then_some(self.output.as_str())
    }

    fn require(&mut self, stage: Stage, operation: &'static str) -> Result<(), RustyFactsError> {
        if self.stage == stage {
            return Ok(());
        }
        let error = RustyFactsError::from(PipelineError::InvalidStage {
            operation,
            stage: self.stage,
        });
        if self.stage != Stage::Failed {
            self.fail("pipeline", &error);
        }
        Err(error)
    }

    /// Moves the run to `Failed` when the stage result is an error.
    fn settle<T>(&mut self, result: Result<T, RustyFactsError>, subject: &str) -> Result<T, RustyFactsError> {
        result.inspect_err(|error| self.fail(subject, error))
    }

    /// Records the error as a fatal diagnostic, located on its sheet when it
    /// has one and on `subject` otherwise.
    fn fail(&mut self, subject: &str, error: &RustyFactsError) {
        debug!("Conversion failed in state {}: {}", self.stage, error);
        match error.location() {
            Some(location) => self.diagnostics.fatal(&location.sheet, location.row, location.column, error.to_string()),
            None => self.diagnostics.fatal(subject, None, None, error.to_string()),
        }
        self.stage = Stage::Failed;
        self.tables.clear();
        self.facts.clear();
        self.output.clear();
    }
}

/// Runs a whole conversion and returns the fact text.
pub fn convert(template: &str, sheets: Vec<RawSheet>) -> Result<String, RustyFactsError> {
    let mut conversion = Conversion::new();
    conversion.load_template(template)?;
    conversion.ingest(sheets)?;
    conversion.correct()?;
    Ok(conversion.write()?.to_owned())
}
