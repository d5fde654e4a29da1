//! `row` and `row_indexed` correction: one fact per data row.
use super::FactBody;
use super::FactRow;
use super::FactTable;
use super::RawRow;
use super::RawTable;
use super::HEADER_ROW;
use crate::convert::CellContext;
use crate::convert::ColumnConverter;
use crate::diagnostic::Diagnostics;
use crate::error::RustyFactsError;
use crate::template::Style;
use std::collections::BTreeSet;

pub(super) fn correct_rows(table: RawTable, diagnostics: &mut Diagnostics) -> Result<FactTable, RustyFactsError> {
    let RawTable { title, name, schema, rows, is_1904 } = table;
    let arity = schema.columns.len();

    let mut rows = rows
        .into_iter()
        .filter(|row| row.index != HEADER_ROW)
        .filter(|row| {
            let empty = row.is_empty();
            if empty {
                diagnostics.warn(&title, Some(row.index), None, "empty row, ignoring it".to_owned());
            }
            !empty
        })
        .collect::<Vec<RawRow>>();

    let mut truncated = false;
    for row in rows.iter_mut() {
        truncated |= row.cells.len() > arity;
        row.cells.resize(arity, Default::default());
    }
    if truncated {
        diagnostics.warn(&title, None, None, format!("cells beyond the {arity} declared columns, ignoring them"));
    }

    let converters = schema.columns.iter().map(ColumnConverter::new).collect::<Vec<_>>();
    let skipped = converters
        .iter()
        .enumerate()
        .filter_map(|(col, converter)| converter.is_none().then_some(col))
        .collect::<BTreeSet<_>>();

    // column by column, so the first bad cell of the leftmost column is reported
    let mut args = vec![Vec::with_capacity(arity + 1); rows.len()];
    if schema.style == Style::RowIndexed {
        for (sequence, row_args) in args.iter_mut().enumerate() {
            row_args.push(sequence.to_string());
        }
    }
    for (col, converter) in converters.iter().enumerate() {
        let Some(converter) = converter else {
            continue;
        };
        for (row, row_args) in rows.iter().zip(args.iter_mut()) {
            let context = CellContext::new(&title, row.index, col).date_system(is_1904);
            row_args.push(converter.apply(&context, &row.cells[col], diagnostics)?);
        }
    }

    let facts = rows
        .iter()
        .zip(args)
        .map(|(row, args)| FactRow { row: row.index, args })
        .collect();
    Ok(FactTable {
        title,
        name,
        style: schema.style,
        skipped,
        body: FactBody::Rows(facts),
    })
}
