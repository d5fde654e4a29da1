//! # Template Module
//!
//! A template declares, one line per sheet, how a sheet turns into facts:
//!
//! ```text
//! % table, style, type[=default], ...
//! Sheet1, row, string, string, int=0, constant
//! Distances, matrix_xy, constant, constant, int
//! ```
//!
//! Fields are comma separated (CSV quoting applies), everything from `%` to
//! the end of the line is a comment and blank lines are ignored.
use crate::error::RustyFactsError;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

mod column;

pub use column::ColumnSchema;
pub use column::Style;
pub use column::TypeTag;

/// Number of types a matrix style declares: x axis, y axis and value.
pub const MATRIX_ARITY: usize = 3;

/// Errors in the template text. All of them are reported with the 1-based
/// template line they were found on.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template line {line}: duplicate table '{table}'")]
    DuplicateTable { line: usize, table: String },

    #[error("Template line {line}: missing style for table '{table}'")]
    MissingStyle { line: usize, table: String },

    #[error("Template line {line}: style not valid: '{style}'")]
    InvalidStyle { line: usize, style: String },

    #[error("Template line {line}: style '{style}' of table '{table}' needs {expected} types, found {found}")]
    Arity {
        line: usize,
        table: String,
        style: Style,
        expected: &'static str,
        found: usize,
    },

    #[error("Template line {line}: type not valid: '{kind}'")]
    InvalidType { line: usize, kind: String },

    #[error("Template line {line}: matrix table '{table}' cannot declare a skip type")]
    MatrixSkip { line: usize, table: String },

    #[error("Template line {line}: empty default value for type '{kind}'")]
    EmptyDefault { line: usize, kind: TypeTag },

    #[error("Template line {line}: {source}")]
    Csv { line: usize, source: csv::Error },
}

/// The declaration of one table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSchema {
    /// Table name, matched against the sheet title
    pub name: String,
    pub style: Style,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(name: &str, style: Style, columns: Vec<ColumnSchema>) -> Self {
        Self {
            name: name.to_owned(),
            style,
            columns,
        }
    }
}

/// All table declarations, in template order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Template {
    tables: Vec<TableSchema>,
}

impl Template {
    /// Reads and parses a template file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RustyFactsError> {
        let text = fs::read_to_string(path.as_ref()).map_err(|error| {
            RustyFactsError::WithContextError(format!(
                "Read template '{}': {error}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self::parse(&text)?)
    }

    /// Parses template text.
    ///
    /// Each line is checked in this order: the table is not declared yet,
    /// the style is known, a matrix style has exactly three types, every
    /// type is known.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut template = Template::default();
        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            let content = strip_comment(line);
            if content.trim().is_empty() {
                continue;
            }
            let fields = split_fields(content, line_number)?;
            let schema = parse_declaration(&template, &fields, line_number)?;
            debug!("Template declares table \"{}\" with style {}", schema.name, schema.style);
            template.tables.push(schema);
        }
        Ok(template)
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Cuts the line at the first `%` outside double quotes.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (index, character) in line.char_indices() {
        match character {
            '"' => quoted = !quoted,
            '%' if !quoted => return &line[..index],
            _ => {}
        }
    }
    line
}

fn split_fields(content: &str, line: usize) -> Result<Vec<String>, TemplateError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let record = reader
        .records()
        .next()
        .transpose()
        .map_err(|source| TemplateError::Csv { line, source })?
        .unwrap_or_default();
    Ok(record.iter().map(str::to_owned).collect())
}

fn parse_declaration(template: &Template, fields: &[String], line: usize) -> Result<TableSchema, TemplateError> {
    let table = fields.first().cloned().unwrap_or_default();
    if template.contains(&table) {
        return Err(TemplateError::DuplicateTable { line, table });
    }

    let style_name = fields.get(1).ok_or_else(|| TemplateError::MissingStyle {
        line,
        table: table.to_owned(),
    })?;
    let style = Style::parse(style_name).ok_or_else(|| TemplateError::InvalidStyle {
        line,
        style: style_name.to_owned(),
    })?;

    let declarations = &fields[2..];
    let arity = if style.is_matrix() {
        (declarations.len() != MATRIX_ARITY).then_some("exactly 3")
    } else {
        declarations.is_empty().then_some("at least 1")
    };
    if let Some(expected) = arity {
        return Err(TemplateError::Arity {
            line,
            table,
            style,
            expected,
            found: declarations.len(),
        });
    }

    let columns = declarations
        .iter()
        .map(|declaration| parse_column(declaration, line))
        .collect::<Result<Vec<_>, _>>()?;
    if style.is_matrix() && columns.iter().any(|column| column.kind == TypeTag::Skip) {
        return Err(TemplateError::MatrixSkip { line, table });
    }
    Ok(TableSchema::new(&table, style, columns))
}

/// Parses `type` or `type=default`; the default is kept verbatim.
fn parse_column(declaration: &str, line: usize) -> Result<ColumnSchema, TemplateError> {
    let (name, default) = match declaration.split_once('=') {
        Some((name, default)) => (name.trim(), Some(default)),
        None => (declaration.trim(), None),
    };
    let kind = TypeTag::parse(name).ok_or_else(|| TemplateError::InvalidType {
        line,
        kind: name.to_owned(),
    })?;
    match default {
        Some("") => Err(TemplateError::EmptyDefault { line, kind }),
        Some(default) => Ok(ColumnSchema::with_default(kind, default)),
        None => Ok(ColumnSchema::new(kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_template() {
        let text = "% people and distances\n\
                    Sheet1, row, string, string, int, constant\n\
                    \n\
                    Distances, sparse_matrix_xy, constant, constant, int=0 % km\n";
        let template = Template::parse(text).unwrap();
        assert_eq!(template.len(), 2);

        let people = template.get("Sheet1").unwrap();
        assert_eq!(people.style, Style::Row);
        assert_eq!(
            people.columns,
            vec![
                ColumnSchema::new(TypeTag::String),
                ColumnSchema::new(TypeTag::String),
                ColumnSchema::new(TypeTag::Int),
                ColumnSchema::new(TypeTag::Constant),
            ]
        );

        let distances = template.get("Distances").unwrap();
        assert_eq!(distances.style, Style::SparseMatrixXy);
        assert_eq!(distances.columns[2], ColumnSchema::with_default(TypeTag::Int, "0"));
        assert_eq!(template.tables()[0].name, "Sheet1");
    }

    #[test]
    fn default_kept_verbatim() {
        let template = Template::parse("T, row, string=\"n/a\", constant=none").unwrap();
        let table = template.get("T").unwrap();
        assert_eq!(table.columns[0].default.as_deref(), Some("\"n/a\""));
        assert_eq!(table.columns[1].default.as_deref(), Some("none"));
    }

    #[test]
    fn duplicate_table() {
        let result = Template::parse("T, row, int\nT, row, int");
        assert!(matches!(result, Err(TemplateError::DuplicateTable { line: 2, .. })));
    }

    #[test]
    fn invalid_style() {
        let result = Template::parse("T, column, int");
        assert!(matches!(result, Err(TemplateError::InvalidStyle { line: 1, ref style }) if style == "column"));
        assert!(matches!(Template::parse("T"), Err(TemplateError::MissingStyle { .. })));
    }

    #[test]
    fn matrix_arity() {
        let result = Template::parse("M, matrix_xy, int, int");
        assert!(matches!(result, Err(TemplateError::Arity { found: 2, .. })));
        let result = Template::parse("R, row");
        assert!(matches!(result, Err(TemplateError::Arity { found: 0, .. })));
    }

    #[test]
    fn invalid_type() {
        let result = Template::parse("T, row, int, float");
        assert!(matches!(result, Err(TemplateError::InvalidType { ref kind, .. }) if kind == "float"));
        let result = Template::parse("T, row, date_rel");
        assert!(matches!(result, Err(TemplateError::InvalidType { .. })));
    }

    #[test]
    fn validation_order() {
        // a bad style is reported before the arity and type problems on the same line
        let result = Template::parse("T, grid, float");
        assert!(matches!(result, Err(TemplateError::InvalidStyle { .. })));
        let result = Template::parse("T, matrix_xy, float");
        assert!(matches!(result, Err(TemplateError::Arity { .. })));
    }

    #[test]
    fn matrix_rejects_skip() {
        let result = Template::parse("M, sparse_matrix_xy, constant, skip, int");
        assert!(matches!(result, Err(TemplateError::MatrixSkip { line: 1, ref table }) if table == "M"));
        assert!(Template::parse("R, row, constant, skip, int").is_ok());
    }

    #[test]
    fn percent_inside_quotes() {
        let template = Template::parse("T, row, string=\"50%\" % share\nU, row, int % 100%").unwrap();
        assert_eq!(template.get("T").unwrap().columns[0].default.as_deref(), Some("\"50%\""));
        assert_eq!(template.get("U").unwrap().columns, vec![ColumnSchema::new(TypeTag::Int)]);
    }

    #[test]
    fn empty_default() {
        let result = Template::parse("T, row, int=");
        assert!(matches!(result, Err(TemplateError::EmptyDefault { kind: TypeTag::Int, .. })));
    }
}
