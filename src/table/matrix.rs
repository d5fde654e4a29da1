//! `matrix_xy` and `sparse_matrix_xy` correction: the header row holds the
//! x values, column A the y values and every inner cell one `(x,y,value)`.
use super::FactBody;
use super::FactTable;
use super::MatrixBody;
use super::MatrixRow;
use super::RawTable;
use super::TableError;
use crate::convert::CellContext;
use crate::convert::ColumnConverter;
use crate::diagnostic::Diagnostics;
use crate::error::RustyFactsError;
use crate::helpers::reference::column_letter;
use crate::spreadsheet::RawCell;
use crate::template::Style;
use crate::template::MATRIX_ARITY;
use std::collections::BTreeSet;

/// Column of the y values.
const Y_COLUMN: usize = 0;

pub(super) fn correct_matrix(table: RawTable, diagnostics: &mut Diagnostics) -> Result<FactTable, RustyFactsError> {
    let RawTable { title, name, schema, mut rows, is_1904 } = table;
    let converters = schema.columns.iter().filter_map(ColumnConverter::new).collect::<Vec<_>>();
    let [x_axis, y_axis, value] = <[ColumnConverter; MATRIX_ARITY]>::try_from(converters)
        .map_err(|_| TableError::MatrixSchema(title.to_owned()))?;

    let width = rows.iter().map(|row| row.cells.len()).max().unwrap_or_default();
    for row in rows.iter_mut() {
        row.cells.resize(width, RawCell::Null);
    }
    if rows.is_empty() {
        return Ok(empty_matrix(title, name, schema.style));
    }
    let header = rows.remove(0);

    let skipped = (Y_COLUMN + 1..width)
        .filter(|col| rows.iter().all(|row| row.cells[*col].is_null()))
        .collect::<BTreeSet<_>>();
    for col in skipped.iter() {
        diagnostics.warn(&title, None, Some(column_letter(*col)), "empty column, ignoring it".to_owned());
    }
    rows.retain(|row| {
        let empty = row.is_empty();
        if empty {
            diagnostics.warn(&title, Some(row.index), None, "empty row, ignoring it".to_owned());
        }
        !empty
    });
    let columns = (Y_COLUMN + 1..width).filter(|col| !skipped.contains(col)).collect::<Vec<_>>();

    let mut body = MatrixBody::default();
    for col in columns.iter() {
        let context = CellContext::new(&title, header.index, *col).date_system(is_1904);
        body.xs.insert(*col, x_axis.apply(&context, &header.cells[*col], diagnostics)?);
    }
    let mut ys = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        let context = CellContext::new(&title, row.index, Y_COLUMN).date_system(is_1904);
        ys.push(y_axis.apply(&context, &row.cells[Y_COLUMN], diagnostics)?);
    }

    let sparse = schema.style == Style::SparseMatrixXy;
    for (row, y) in rows.iter().zip(ys) {
        let mut values = Vec::with_capacity(columns.len());
        for col in columns.iter() {
            let cell = &row.cells[*col];
            if sparse && cell.is_null() {
                continue;
            }
            let context = CellContext::new(&title, row.index, *col).date_system(is_1904);
            values.push((*col, value.apply(&context, cell, diagnostics)?));
        }
        body.rows.push(MatrixRow { row: row.index, y, values });
    }

    Ok(FactTable {
        title,
        name,
        style: schema.style,
        skipped,
        body: FactBody::Matrix(body),
    })
}

fn empty_matrix(title: String, name: String, style: Style) -> FactTable {
    FactTable {
        title,
        name,
        style,
        skipped: BTreeSet::new(),
        body: FactBody::Matrix(MatrixBody::default()),
    }
}
