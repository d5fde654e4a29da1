use crate::convert::ConversionError;
use crate::helpers::reference::column_letter;
use crate::helpers::reference::reference_to_index;
use crate::spreadsheet::SpreadsheetError;
use crate::table::TableError;
use thiserror::Error;

/// Main error type for the Rusty Facts converter.
/// Aggregates errors from the standard library, dependencies and every pipeline stage.
#[derive(Error, Debug)]
pub enum RustyFactsError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Reader errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Core errors
    #[error("{0}")]
    TemplateError(#[from] crate::template::TemplateError),

    #[error("{0}")]
    ConversionError(#[from] crate::convert::ConversionError),

    #[error("{0}")]
    TableError(#[from] crate::table::TableError),

    #[error("{0}")]
    PipelineError(#[from] crate::pipeline::PipelineError),
}

/// Sheet, row and column an error points at.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub sheet: String,
    /// Spreadsheet row number (1-based)
    pub row: Option<usize>,
    /// Spreadsheet column letter
    pub column: Option<String>,
}

impl Location {
    fn of_sheet(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_owned(),
            row: None,
            column: None,
        }
    }
}

impl RustyFactsError {
    /// Where in the workbook the error occurred, when it concerns a sheet.
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::ConversionError(ConversionError::TypeMismatch { table, row, column, .. }) => Some(Location {
                sheet: table.to_owned(),
                row: Some(*row),
                column: Some(column.to_owned()),
            }),
            Self::TableError(error) => match error {
                TableError::SheetNotFound(sheet) | TableError::TableName(sheet) | TableError::MatrixSchema(sheet) => {
                    Some(Location::of_sheet(sheet))
                }
                TableError::DuplicateName { second, .. } => Some(Location::of_sheet(second)),
            },
            Self::SpreadsheetError(SpreadsheetError::CellValueError(sheet, reference, _)) => {
                let (row, col) = reference_to_index(reference).unzip();
                Some(Location {
                    sheet: sheet.to_owned(),
                    row: row.map(|row| row + 1),
                    column: col.map(column_letter),
                })
            }
            _ => None,
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyFactsError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustyFactsError::WithContextError(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::RawCell;
    use crate::template::TypeTag;
    use pretty_assertions::assert_eq;

    #[test]
    fn locate_errors() {
        let mismatch = RustyFactsError::from(ConversionError::TypeMismatch {
            table: "Sheet1".to_owned(),
            row: 2,
            column: "A".to_owned(),
            expected: TypeTag::Time,
            value: RawCell::from("100:20:10"),
        });
        let location = mismatch.location().unwrap();
        assert_eq!((location.sheet.as_str(), location.row, location.column.as_deref()), ("Sheet1", Some(2), Some("A")));

        let cell = RustyFactsError::from(SpreadsheetError::CellValueError(
            "Data".to_owned(),
            "AB12".to_owned(),
            "#N/A".to_owned(),
        ));
        let location = cell.location().unwrap();
        assert_eq!((location.row, location.column.as_deref()), (Some(12), Some("AB")));

        let missing = RustyFactsError::from(TableError::SheetNotFound("Places".to_owned()));
        assert_eq!(missing.location().unwrap().sheet, "Places");
        assert_eq!(RustyFactsError::WithContextError("x".to_owned()).location(), None);
    }
}
