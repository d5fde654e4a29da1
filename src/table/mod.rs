//! # Table Correction Module
//!
//! Brings the sheets read from a workbook into the shape facts are written
//! from. Each stage takes the tables by value and hands back new ones:
//!
//! 1. [`ingest`]: pair sheets with their template declarations
//! 2. [`normalize_names`]: derive the predicate name from the sheet title
//! 3. [`trim`]: strip whitespace around text cells
//! 4. [`correct`]: drop empty rows and columns, convert every cell by type
use crate::convert::literal::is_constant;
use crate::diagnostic::Diagnostics;
use crate::error::RustyFactsError;
use crate::spreadsheet::RawCell;
use crate::spreadsheet::RawSheet;
use crate::template::Style;
use crate::template::TableSchema;
use crate::template::Template;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashSet;
use thiserror::Error;
use tracing::info;

mod matrix;
mod row;

/// Spreadsheet row number of the header row.
pub const HEADER_ROW: usize = 1;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Sheet \"{0}\" not found")]
    SheetNotFound(String),

    #[error("Sheet name \"{0}\" cannot be used as a predicate name")]
    TableName(String),

    #[error("Sheets \"{first}\" and \"{second}\" both map to predicate \"{name}\"")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error("Sheet \"{0}\" needs three non-skip types for a matrix style")]
    MatrixSchema(String),
}

/// A spreadsheet row before correction.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRow {
    /// Spreadsheet row number (1-based)
    pub index: usize,
    pub cells: Vec<RawCell>,
}

impl RawRow {
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(RawCell::is_null)
    }
}

/// A declared sheet with its rows, as read.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTable {
    /// Sheet title, used in diagnostics
    pub title: String,
    /// Predicate name; the title until [`normalize_names`] runs
    pub name: String,
    pub schema: TableSchema,
    pub rows: Vec<RawRow>,
    /// Date system of the workbook the sheet came from
    pub is_1904: bool,
}

/// A fully converted table, ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct FactTable {
    pub title: String,
    pub name: String,
    pub style: Style,
    /// Column indexes left out of every fact
    pub skipped: BTreeSet<usize>,
    pub body: FactBody,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FactBody {
    Rows(Vec<FactRow>),
    Matrix(MatrixBody),
}

/// The arguments of one row fact, in declared column order.
#[derive(Clone, Debug, PartialEq)]
pub struct FactRow {
    pub row: usize,
    pub args: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatrixBody {
    /// Converted header cells by column index
    pub xs: BTreeMap<usize, String>,
    pub rows: Vec<MatrixRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatrixRow {
    pub row: usize,
    pub y: String,
    /// Converted inner cells as (column index, value), ascending by column
    pub values: Vec<(usize, String)>,
}

/// Pairs sheets with their declarations, in workbook order.
///
/// Sheets the template does not declare are skipped and declared sheets
/// without data rows are dropped, both with a warning. A declared sheet
/// missing from the workbook is an error.
pub fn ingest(template: &Template, sheets: Vec<RawSheet>, diagnostics: &mut Diagnostics) -> Result<Vec<RawTable>, TableError> {
    let mut tables = Vec::new();
    let mut found = HashSet::new();
    for sheet in sheets {
        let Some(schema) = template.get(&sheet.title) else {
            diagnostics.warn(&sheet.title, None, None, "sheet is not defined in the template, skipping it".to_owned());
            continue;
        };
        found.insert(sheet.title.to_owned());
        if sheet.rows.len() <= HEADER_ROW {
            diagnostics.warn(&sheet.title, None, None, "sheet is empty, ignoring it".to_owned());
            continue;
        }
        info!("Parsing sheet \"{}\" with style \"{}\"", sheet.title, schema.style);
        let rows = sheet
            .rows
            .into_iter()
            .enumerate()
            .map(|(index, cells)| RawRow { index: index + 1, cells })
            .collect();
        tables.push(RawTable {
            name: sheet.title.to_owned(),
            title: sheet.title,
            schema: schema.to_owned(),
            rows,
            is_1904: sheet.is_1904,
        });
    }

    match template.tables().iter().find(|table| !found.contains(&table.name)) {
        Some(missing) => Err(TableError::SheetNotFound(missing.name.to_owned())),
        None => Ok(tables),
    }
}

/// Turns a sheet title into a predicate name: kept when it already is a
/// constant, otherwise tried again with its first letter lower-cased.
pub fn predicate_name(title: &str) -> Option<String> {
    if is_constant(title) {
        return Some(title.to_owned());
    }
    let mut characters = title.chars();
    let first = characters.next()?;
    let name = first.to_lowercase().chain(characters).collect::<String>();
    is_constant(&name).then_some(name)
}

/// Renames every table to its predicate name. Two tables may not end up
/// with the same name.
pub fn normalize_names(tables: Vec<RawTable>) -> Result<Vec<RawTable>, TableError> {
    let mut names: Vec<(String, String)> = Vec::with_capacity(tables.len());
    tables
        .into_iter()
        .map(|table| {
            let name = predicate_name(&table.title).ok_or_else(|| TableError::TableName(table.title.to_owned()))?;
            if let Some((_, first)) = names.iter().find(|(seen, _)| *seen == name) {
                return Err(TableError::DuplicateName {
                    name,
                    first: first.to_owned(),
                    second: table.title,
                });
            }
            names.push((name.to_owned(), table.title.to_owned()));
            let mut schema = table.schema;
            schema.name = name.to_owned();
            Ok(RawTable { name, schema, ..table })
        })
        .collect()
}

/// Strips leading and trailing whitespace from every text cell.
pub fn trim(tables: Vec<RawTable>) -> Vec<RawTable> {
    tables
        .into_iter()
        .map(|table| RawTable {
            rows: table
                .rows
                .into_iter()
                .map(|row| RawRow {
                    index: row.index,
                    cells: row.cells.into_iter().map(trim_cell).collect(),
                })
                .collect(),
            ..table
        })
        .collect()
}

fn trim_cell(cell: RawCell) -> RawCell {
    match cell {
        RawCell::Text(text) if text.trim().len() != text.len() => RawCell::Text(text.trim().to_owned()),
        _ => cell,
    }
}

/// Corrects every table according to its style. The first error stops the run.
pub fn correct(tables: Vec<RawTable>, diagnostics: &mut Diagnostics) -> Result<Vec<FactTable>, RustyFactsError> {
    tables
        .into_iter()
        .map(|table| match table.schema.style {
            Style::Row | Style::RowIndexed => row::correct_rows(table, diagnostics),
            Style::MatrixXy | Style::SparseMatrixXy => matrix::correct_matrix(table, diagnostics),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::template::ColumnSchema;
    use crate::template::TypeTag;

    pub(crate) fn text(value: &str) -> RawCell {
        RawCell::from(value)
    }

    pub(crate) fn number(value: f64) -> RawCell {
        RawCell::Number(value)
    }

    pub(crate) fn raw_table(title: &str, style: Style, kinds: &[TypeTag], rows: Vec<Vec<RawCell>>) -> RawTable {
        let columns = kinds.iter().map(|kind| ColumnSchema::new(*kind)).collect();
        RawTable {
            title: title.to_owned(),
            name: title.to_owned(),
            schema: TableSchema::new(title, style, columns),
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(index, cells)| RawRow { index: index + 1, cells })
                .collect(),
            is_1904: false,
        }
    }

    #[test]
    fn ingest_pairs_sheets_with_template() {
        let template = Template::parse("People, row, string\nEmpty, row, int").unwrap();
        let sheets = vec![
            RawSheet::new("Notes", vec![vec![text("free text")]]),
            RawSheet::new("People", vec![vec![text("name")], vec![text("Dany")]]),
            RawSheet::new("Empty", vec![vec![text("header only")]]),
        ];
        let mut diagnostics = Diagnostics::new();
        let tables = ingest(&template, sheets, &mut diagnostics).unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].title, "People");
        assert_eq!(tables[0].rows[1], RawRow { index: 2, cells: vec![text("Dany")] });
        let sheets = diagnostics.warnings().map(|event| event.sheet.as_str()).collect::<Vec<_>>();
        assert_eq!(sheets, vec!["Notes", "Empty"]);
    }

    #[test]
    fn ingest_missing_sheet() {
        let template = Template::parse("People, row, string\nPlaces, row, string").unwrap();
        let sheets = vec![RawSheet::new("People", vec![vec![text("name")], vec![text("Dany")]])];
        let result = ingest(&template, sheets, &mut Diagnostics::new());
        assert!(matches!(result, Err(TableError::SheetNotFound(ref name)) if name == "Places"));
    }

    #[test]
    fn predicate_names() {
        assert_eq!(predicate_name("sheet1").as_deref(), Some("sheet1"));
        assert_eq!(predicate_name("Sheet1").as_deref(), Some("sheet1"));
        assert_eq!(predicate_name("Ärzte"), None);
        assert_eq!(predicate_name("My Sheet"), None);
        assert_eq!(predicate_name("1st"), None);
        assert_eq!(predicate_name(""), None);
    }

    #[test]
    fn normalize_renames_tables_and_schemas() {
        let tables = vec![raw_table("Sheet1", Style::Row, &[TypeTag::Int], vec![])];
        let tables = normalize_names(tables).unwrap();
        assert_eq!(tables[0].name, "sheet1");
        assert_eq!(tables[0].schema.name, "sheet1");
        assert_eq!(tables[0].title, "Sheet1");
    }

    #[test]
    fn normalize_rejects_bad_and_duplicate_names() {
        let tables = vec![raw_table("Total Cost", Style::Row, &[TypeTag::Int], vec![])];
        assert!(matches!(normalize_names(tables), Err(TableError::TableName(_))));

        let tables = vec![
            raw_table("Sheet1", Style::Row, &[TypeTag::Int], vec![]),
            raw_table("sheet1", Style::Row, &[TypeTag::Int], vec![]),
        ];
        assert!(matches!(
            normalize_names(tables),
            Err(TableError::DuplicateName { ref first, ref second, .. }) if first == "Sheet1" && second == "sheet1"
        ));
    }

    #[test]
    fn trim_only_touches_text() {
        let tables = vec![raw_table(
            "t",
            Style::Row,
            &[TypeTag::String, TypeTag::Int],
            vec![vec![text("  Dany "), number(3.0), RawCell::Null]],
        )];
        let tables = trim(tables);
        assert_eq!(tables[0].rows[0].cells, vec![text("Dany"), number(3.0), RawCell::Null]);
    }
}
