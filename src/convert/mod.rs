//! # Type Conversion Module
//!
//! Turns one raw cell into the literal text of a fact argument according to
//! the declared column type, or reports a type mismatch with the sheet, row,
//! column and value involved.
//!
//! | type          | accepts                                   | emits                         |
//! |---------------|-------------------------------------------|-------------------------------|
//! | `int`         | integral number, integer text, `1;2` list | `20`, `(1;2)`                 |
//! | `constant`    | `_*[a-z][A-Za-z0-9_']*`, `a;b` list       | `male`, `(a;b)`               |
//! | `string`      | any text, `a;b` list                      | `"Dany"`, `("a";"b")`         |
//! | `time`        | time of day, `HH:MM:SS` text              | `(18,1,13)`                   |
//! | `date`        | date or datetime, `YYYY-MM-DD` text       | `(5,1,2024)`                  |
//! | `datetime`    | datetime, `YYYY-MM-DD HH:MM:SS` text      | `((5,1,2024),(10,0,0))`       |
//! | `auto_detect` | first match of int, time, datetime, date, constant, string | as matched |
use crate::diagnostic::Diagnostics;
use crate::helpers::reference::column_letter;
use crate::spreadsheet::RawCell;
use crate::template::ColumnSchema;
use crate::template::TypeTag;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use thiserror::Error;

pub mod literal;

use literal::*;

/// Order in which `auto_detect` tries the concrete types.
pub const AUTO_DETECT_ORDER: [TypeTag; 6] = [
    TypeTag::Int,
    TypeTag::Time,
    TypeTag::DateTime,
    TypeTag::Date,
    TypeTag::Constant,
    TypeTag::String,
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Wrong type in sheet \"{table}\" row {row} column {column}: expecting {expected}, {}", describe(.value))]
    TypeMismatch {
        table: String,
        /// Spreadsheet row number (1-based)
        row: usize,
        /// Spreadsheet column letter
        column: String,
        expected: TypeTag,
        value: RawCell,
    },
}

fn describe(value: &RawCell) -> String {
    match value {
        RawCell::Null => "unexpected empty value".to_owned(),
        _ => format!("getting '{value}'"),
    }
}

/// Position of the cell being converted.
#[derive(Copy, Clone, Debug)]
pub struct CellContext<'a> {
    pub table: &'a str,
    /// Spreadsheet row number (1-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    /// Date system of the workbook holding the cell
    pub is_1904: bool,
}

impl<'a> CellContext<'a> {
    pub fn new(table: &'a str, row: usize, col: usize) -> Self {
        Self {
            table,
            row,
            col,
            is_1904: false,
        }
    }

    pub fn date_system(self, is_1904: bool) -> Self {
        Self { is_1904, ..self }
    }

    pub fn mismatch(&self, expected: TypeTag, value: &RawCell) -> ConversionError {
        ConversionError::TypeMismatch {
            table: self.table.to_owned(),
            row: self.row,
            column: column_letter(self.col),
            expected,
            value: value.clone(),
        }
    }
}

/// Converts one non-empty cell; `None` when the value does not fit the type.
pub type Converter = fn(&CellContext, &RawCell, &mut Diagnostics) -> Option<String>;

impl TypeTag {
    /// The conversion function of this type, `None` for `skip`.
    pub fn converter(&self) -> Option<Converter> {
        match self {
            TypeTag::Skip => None,
            TypeTag::AutoDetect => Some(to_auto_detect),
            TypeTag::Int => Some(to_int),
            TypeTag::Constant => Some(to_constant),
            TypeTag::String => Some(to_string),
            TypeTag::Time => Some(to_time),
            TypeTag::Date => Some(to_date),
            TypeTag::DateTime => Some(to_datetime),
        }
    }
}

/// A column type bound to its converter and default value.
#[derive(Clone, Debug)]
pub struct ColumnConverter {
    pub kind: TypeTag,
    pub default: Option<String>,
    convert: Converter,
}

impl ColumnConverter {
    /// `None` for `skip` columns, which are never converted.
    pub fn new(column: &ColumnSchema) -> Option<Self> {
        Some(Self {
            kind: column.kind,
            default: column.default.to_owned(),
            convert: column.kind.converter()?,
        })
    }

    /// Converts a cell. An empty cell takes the column default, or is a
    /// mismatch when there is none.
    pub fn apply(&self, context: &CellContext, value: &RawCell, diagnostics: &mut Diagnostics) -> Result<String, ConversionError> {
        match (value, &self.default) {
            (RawCell::Null, Some(default)) => Ok(default.to_owned()),
            (RawCell::Null, None) => Err(context.mismatch(self.kind, value)),
            _ => (self.convert)(context, value, diagnostics).ok_or_else(|| context.mismatch(self.kind, value)),
        }
    }
}

/// Converts a cell with a bare type and no default.
pub fn convert(kind: TypeTag, context: &CellContext, value: &RawCell, diagnostics: &mut Diagnostics) -> Result<Option<String>, ConversionError> {
    match ColumnConverter::new(&ColumnSchema::new(kind)) {
        Some(converter) => converter.apply(context, value, diagnostics).map(Some),
        None => Ok(None),
    }
}

fn to_int(_: &CellContext, value: &RawCell, _: &mut Diagnostics) -> Option<String> {
    match value {
        RawCell::Number(number) => integral(*number),
        RawCell::Text(text) => literal_list(text, integer_text),
        _ => None,
    }
}

fn to_constant(_: &CellContext, value: &RawCell, _: &mut Diagnostics) -> Option<String> {
    let text = value.as_text()?;
    literal_list(text, |item| is_constant(item).then(|| item.to_owned()))
}

fn to_string(_: &CellContext, value: &RawCell, _: &mut Diagnostics) -> Option<String> {
    let text = value.as_text()?;
    literal_list(text, |item| Some(quote(item)))
}

fn to_time(context: &CellContext, value: &RawCell, diagnostics: &mut Diagnostics) -> Option<String> {
    match value {
        RawCell::Time(time) => Some(time_tuple(time)),
        RawCell::Text(text) => parse_time(text).map(|time| time_tuple(&time)),
        RawCell::DateTime(datetime) if is_midnight_sentinel(datetime, context.is_1904) => {
            diagnostics.warn(
                context.table,
                Some(context.row),
                Some(column_letter(context.col)),
                format!("datetime '{value}' read as time (0,0,0)"),
            );
            Some("(0,0,0)".to_owned())
        }
        _ => None,
    }
}

fn to_date(_: &CellContext, value: &RawCell, _: &mut Diagnostics) -> Option<String> {
    match value {
        RawCell::Date(date) => Some(date_tuple(date)),
        RawCell::DateTime(datetime) => Some(date_tuple(&datetime.date())),
        RawCell::Text(text) => parse_date(text).map(|date| date_tuple(&date)),
        _ => None,
    }
}

fn to_datetime(_: &CellContext, value: &RawCell, _: &mut Diagnostics) -> Option<String> {
    match value {
        RawCell::DateTime(datetime) => Some(datetime_tuple(datetime)),
        RawCell::Text(text) => parse_datetime(text).map(|datetime| datetime_tuple(&datetime)),
        _ => None,
    }
}

fn to_auto_detect(context: &CellContext, value: &RawCell, diagnostics: &mut Diagnostics) -> Option<String> {
    AUTO_DETECT_ORDER
        .iter()
        .filter_map(TypeTag::converter)
        .find_map(|convert| convert(context, value, diagnostics))
}

/// Midnight stored as day zero of the workbook's date system, which some
/// writers produce for a `00:00:00` time cell.
fn is_midnight_sentinel(datetime: &NaiveDateTime, is_1904: bool) -> bool {
    let day_zero = if is_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    };
    datetime.time() == chrono::NaiveTime::MIN && day_zero == Some(datetime.date())
}
