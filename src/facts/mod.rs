//! # Fact Writer Module
//!
//! Serializes corrected tables into fact text. Every table gets a banner
//! comment, then one fact per row (or per inner cell for matrix styles),
//! then two blank lines:
//!
//! ```text
//! %%%%%%%%%%%%
//! %% sheet1 %%
//! %%%%%%%%%%%%
//! sheet1("Dany","Hans",20,male).
//! ```
use crate::error::RustyFactsError;
use crate::table::FactBody;
use crate::table::FactTable;
use std::io::Write;
use tracing::debug;

/// Width of the `%% ` and ` %%` banner frame around a name.
const BANNER_FRAME: usize = 6;

pub struct FactWriter;

impl FactWriter {
    /// Writes every table in order. Returns the number of facts written.
    pub fn write<W: Write>(tables: &[FactTable], mut writer: W) -> Result<usize, RustyFactsError> {
        let mut count = 0;
        for table in tables {
            let facts = Self::write_table(table, &mut writer)?;
            debug!("Wrote {} facts for predicate \"{}\"", facts, table.name);
            count += facts;
        }
        writer.flush()?;
        Ok(count)
    }

    /// Writes all tables into a new string.
    pub fn to_text(tables: &[FactTable]) -> Result<String, RustyFactsError> {
        let mut buffer = Vec::new();
        Self::write(tables, &mut buffer)?;
        String::from_utf8(buffer).map_err(|error| RustyFactsError::WithContextError(error.to_string()))
    }

    fn write_table<W: Write>(table: &FactTable, writer: &mut W) -> Result<usize, RustyFactsError> {
        write_banner(&table.name, writer)?;
        let mut count = 0;
        match &table.body {
            FactBody::Rows(rows) => {
                for row in rows {
                    write_fact(&table.name, &row.args, writer)?;
                    count += 1;
                }
            }
            FactBody::Matrix(body) => {
                for row in body.rows.iter() {
                    for (col, value) in row.values.iter() {
                        let Some(x) = body.xs.get(col) else {
                            continue;
                        };
                        write_fact(&table.name, [x, &row.y, value], writer)?;
                        count += 1;
                    }
                }
            }
        }
        writer.write_all(b"\n\n")?;
        Ok(count)
    }
}

fn write_banner<W: Write>(name: &str, writer: &mut W) -> std::io::Result<()> {
    let frame = "%".repeat(name.chars().count() + BANNER_FRAME);
    writeln!(writer, "{frame}")?;
    writeln!(writer, "%% {name} %%")?;
    writeln!(writer, "{frame}")
}

fn write_fact<W, I, S>(name: &str, args: I, writer: &mut W) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    write!(writer, "{name}")?;
    if let Some(first) = args.next() {
        write!(writer, "({}", first.as_ref())?;
        for arg in args {
            write!(writer, ",{}", arg.as_ref())?;
        }
        write!(writer, ")")?;
    }
    writeln!(writer, ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FactRow;
    use crate::table::MatrixBody;
    use crate::table::MatrixRow;
    use crate::template::Style;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::collections::BTreeSet;

    fn table(name: &str, style: Style, body: FactBody) -> FactTable {
        FactTable {
            title: name.to_owned(),
            name: name.to_owned(),
            style,
            skipped: BTreeSet::new(),
            body,
        }
    }

    #[test]
    fn row_facts() {
        let rows = vec![FactRow {
            row: 2,
            args: vec!["\"Dany\"".into(), "\"Hans\"".into(), "20".into(), "male".into()],
        }];
        let text = FactWriter::to_text(&[table("sheet1", Style::Row, FactBody::Rows(rows))]).unwrap();
        assert_eq!(
            text,
            "%%%%%%%%%%%%\n%% sheet1 %%\n%%%%%%%%%%%%\nsheet1(\"Dany\",\"Hans\",20,male).\n\n\n"
        );
    }

    #[test]
    fn matrix_facts_and_table_order() {
        let body = MatrixBody {
            xs: BTreeMap::from([(1, "a".to_owned()), (2, "b".to_owned())]),
            rows: vec![
                MatrixRow { row: 2, y: "c".into(), values: vec![(1, "1".into()), (2, "2".into())] },
                MatrixRow { row: 3, y: "d".into(), values: vec![(2, "4".into())] },
            ],
        };
        let tables = [
            table("m", Style::SparseMatrixXy, FactBody::Matrix(body)),
            table("empty", Style::Row, FactBody::Rows(vec![])),
        ];
        let mut buffer = Vec::new();
        let count = FactWriter::write(&tables, &mut buffer).unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "%%%%%%%\n%% m %%\n%%%%%%%\nm(a,c,1).\nm(b,c,2).\nm(b,d,4).\n\n\n\
             %%%%%%%%%%%\n%% empty %%\n%%%%%%%%%%%\n\n\n"
        );
    }

    #[test]
    fn fact_without_arguments() {
        let mut buffer = Vec::new();
        write_fact("done", Vec::<String>::new(), &mut buffer).unwrap();
        assert_eq!(buffer, b"done.\n");
    }
}
