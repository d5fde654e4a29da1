//! # Rusty Facts
//!
//! Converts spreadsheet workbooks into logic-program fact files.
//!
//! A template declares, per sheet, how its cells are laid out and what type
//! every column holds:
//!
//! ```text
//! Sheet1, row, string, string, int, constant
//! ```
//!
//! and the matching sheet becomes one fact per row:
//!
//! ```text
//! sheet1("Dany","Hans",20,male).
//! ```
//!
//! ## Styles
//!
//! - `row`: one fact per data row, arguments in column order
//! - `row_indexed`: like `row`, with a 0-based row number as first argument
//! - `matrix_xy`: header row and first column are axes, one fact per inner cell
//! - `sparse_matrix_xy`: like `matrix_xy`, empty inner cells produce no fact
//!
//! ## Stages
//!
//! Reading the workbook ([`spreadsheet`]) is kept apart from the conversion
//! itself: the template ([`template`]), the table corrections ([`table`]) with
//! their cell conversions ([`convert`]), and the fact output ([`facts`]).
//! [`pipeline::Conversion`] runs these stages in order; [`cli`] is the
//! command-line front end.
pub mod cli;
pub mod convert;
pub mod diagnostic;
pub mod error;
pub mod facts;
mod helpers;
pub mod pipeline;
pub mod spreadsheet;
pub mod table;
pub mod template;

pub use diagnostic::Diagnostics;
pub use error::RustyFactsError;
pub use facts::FactWriter;
pub use pipeline::convert;
pub use pipeline::Conversion;
pub use pipeline::Stage;
pub use spreadsheet::open_spreadsheet;
pub use spreadsheet::RawCell;
pub use spreadsheet::RawSheet;
pub use spreadsheet::Spreadsheet;
pub use template::Template;
