use std::fmt::Display;

/// Layout of a sheet: how its rows and columns map onto facts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Style {
    /// One fact per data row
    Row,
    /// One fact per data row, prefixed with a 0-based row number
    RowIndexed,
    /// One fact per inner cell: header row is x, first column is y
    MatrixXy,
    /// Like `MatrixXy`, empty inner cells produce no fact
    SparseMatrixXy,
}

impl Style {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Style::Row => "row",
            Style::RowIndexed => "row_indexed",
            Style::MatrixXy => "matrix_xy",
            Style::SparseMatrixXy => "sparse_matrix_xy",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "row" => Some(Style::Row),
            "row_indexed" => Some(Style::RowIndexed),
            "matrix_xy" => Some(Style::MatrixXy),
            "sparse_matrix_xy" => Some(Style::SparseMatrixXy),
            _ => None,
        }
    }

    pub const fn is_matrix(&self) -> bool {
        matches!(self, Style::MatrixXy | Style::SparseMatrixXy)
    }
}

impl Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeTag {
    AutoDetect,
    Skip,
    Int,
    Constant,
    Time,
    Date,
    DateTime,
    String,
}

impl TypeTag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TypeTag::AutoDetect => "auto_detect",
            TypeTag::Skip => "skip",
            TypeTag::Int => "int",
            TypeTag::Constant => "constant",
            TypeTag::Time => "time",
            TypeTag::Date => "date",
            TypeTag::DateTime => "datetime",
            TypeTag::String => "string",
        }
    }

    /// Type names are matched exactly; the template vocabulary is lowercase.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "auto_detect" => Some(TypeTag::AutoDetect),
            "skip" => Some(TypeTag::Skip),
            "int" => Some(TypeTag::Int),
            "constant" => Some(TypeTag::Constant),
            "time" => Some(TypeTag::Time),
            "date" => Some(TypeTag::Date),
            "datetime" => Some(TypeTag::DateTime),
            "string" => Some(TypeTag::String),
            _ => None,
        }
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column declaration: `type` or `type=default`.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSchema {
    pub kind: TypeTag,
    /// Literal text emitted when the cell is empty
    pub default: Option<String>,
}

impl ColumnSchema {
    pub fn new(kind: TypeTag) -> Self {
        Self { kind, default: None }
    }

    pub fn with_default(kind: TypeTag, default: &str) -> Self {
        Self {
            kind,
            default: Some(default.to_owned()),
        }
    }
}
