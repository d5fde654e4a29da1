//! # Spreadsheet Reading Module
//!
//! Reads `.xlsx`/`.xlsm` workbooks into [`RawSheet`]s: one rectangular grid of
//! [`RawCell`] values per worksheet, in workbook order. Everything past this
//! module works only with these two types and never sees reader internals.
use crate::error::RustyFactsError;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use std::ffi::OsStr;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

pub(crate) mod cell;
pub(crate) mod xlsx;

pub use xlsx::XlsxSpreadsheet;

/// Errors raised while reading a workbook.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Cannot detect file format for '{0}'")]
    FileFormatError(String),

    #[error("Missing part '{0}' in workbook")]
    FileError(String),

    #[error("Workbook '{0}' contains no sheets")]
    SpreadsheetEmptyError(String),

    #[error("Invalid cell value in sheet \"{0}\" at {1}: '{2}'")]
    CellValueError(String, String, String),
}

/// One cell value as delivered by a sheet reader.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawCell {
    #[default]
    Null,
    Number(f64),
    Text(String),
    Time(NaiveTime),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl RawCell {
    pub fn is_null(&self) -> bool {
        matches!(self, RawCell::Null)
    }

    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawCell::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Display for RawCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawCell::Null => write!(f, "None"),
            RawCell::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{}", *number as i64)
            }
            RawCell::Number(number) => write!(f, "{number}"),
            RawCell::Text(text) => write!(f, "{text}"),
            RawCell::Time(time) => write!(f, "{}", time.format("%H:%M:%S")),
            RawCell::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            RawCell::DateTime(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::Text(value.to_owned())
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::Number(value)
    }
}

/// A worksheet as a grid starting at A1: `rows[0]` is spreadsheet row 1.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSheet {
    /// Sheet title as shown on the workbook tab
    pub title: String,
    pub rows: Vec<Vec<RawCell>>,
    /// Whether the workbook counts serial dates from 1904-01-01
    pub is_1904: bool,
}

impl RawSheet {
    pub fn new(title: &str, rows: Vec<Vec<RawCell>>) -> Self {
        Self {
            title: title.to_owned(),
            rows,
            is_1904: false,
        }
    }

    pub fn with_1904(mut self, is_1904: bool) -> Self {
        self.is_1904 = is_1904;
        self
    }
}

/// A source of worksheets.
pub trait Spreadsheet {
    /// Returns the file name of this spreadsheet
    fn name(&self) -> String;

    /// Reads every worksheet, in workbook order.
    fn read_sheets(&mut self) -> Result<Vec<RawSheet>, RustyFactsError>;
}

/// Opens a workbook, choosing the reader from the file extension.
pub fn open_spreadsheet<P: AsRef<Path>>(path: P) -> Result<Box<dyn Spreadsheet>, RustyFactsError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => Ok(Box::new(XlsxSpreadsheet::open(path)?)),
        _ => Err(SpreadsheetError::FileFormatError(path.display().to_string()).into()),
    }
}
