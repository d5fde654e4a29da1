#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// One cell of a fixture workbook.
#[derive(Clone, Debug)]
pub enum Value {
    Empty,
    Number(f64),
    /// Inline string
    Text(&'static str),
    /// Entry of the shared string table
    Shared(&'static str),
    Bool(bool),
    /// Serial number formatted `h:mm:ss`
    Time(f64),
    /// Serial number formatted `m/d/yyyy`
    Date(f64),
    /// Error cell such as `#N/A`
    Error(&'static str),
}

pub use Value::*;

pub struct Sheet {
    pub name: &'static str,
    pub rows: Vec<Vec<Value>>,
}

pub fn sheet(name: &'static str, rows: Vec<Vec<Value>>) -> Sheet {
    Sheet { name, rows }
}

const MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Writes a minimal `.xlsx` package holding `sheets`.
pub fn write_workbook(path: &Path, sheets: &[Sheet]) {
    let file = std::fs::File::create(path).expect("create workbook");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    let mut shared = Vec::<&'static str>::new();

    let mut parts = Vec::new();
    for (index, sheet) in sheets.iter().enumerate() {
        parts.push((format!("xl/worksheets/sheet{}.xml", index + 1), worksheet(sheet, &mut shared)));
    }
    parts.push(("[Content_Types].xml".to_owned(), content_types(sheets.len())));
    parts.push(("xl/workbook.xml".to_owned(), workbook(sheets)));
    parts.push(("xl/_rels/workbook.xml.rels".to_owned(), relationships(sheets.len())));
    parts.push(("xl/styles.xml".to_owned(), styles()));
    parts.push(("xl/sharedStrings.xml".to_owned(), shared_strings(&shared)));

    for (name, content) in parts {
        zip.start_file(name, options).expect("start part");
        zip.write_all(content.as_bytes()).expect("write part");
    }
    zip.finish().expect("finish workbook");
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn worksheet(sheet: &Sheet, shared: &mut Vec<&'static str>) -> String {
    let mut xml = format!("<worksheet xmlns=\"{MAIN}\"><sheetData>");
    for (row, values) in sheet.rows.iter().enumerate() {
        xml.push_str(&format!("<row r=\"{}\">", row + 1));
        for (col, value) in values.iter().enumerate() {
            let reference = format!("{}{}", column_letter(col), row + 1);
            let cell = match value {
                Empty => continue,
                Number(number) => format!("<c r=\"{reference}\"><v>{number}</v></c>"),
                Text(text) => format!("<c r=\"{reference}\" t=\"inlineStr\"><is><t>{}</t></is></c>", escape(text)),
                Shared(text) => {
                    let index = shared.iter().position(|it| it == text).unwrap_or_else(|| {
                        shared.push(*text);
                        shared.len() - 1
                    });
                    format!("<c r=\"{reference}\" t=\"s\"><v>{index}</v></c>")
                }
                Bool(flag) => format!("<c r=\"{reference}\" t=\"b\"><v>{}</v></c>", u8::from(*flag)),
                Time(serial) => format!("<c r=\"{reference}\" s=\"1\"><v>{serial}</v></c>"),
                Date(serial) => format!("<c r=\"{reference}\" s=\"2\"><v>{serial}</v></c>"),
                Error(code) => format!("<c r=\"{reference}\" t=\"e\"><v>{}</v></c>", escape(code)),
            };
            xml.push_str(&cell);
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn workbook(sheets: &[Sheet]) -> String {
    let mut xml = format!("<workbook xmlns=\"{MAIN}\" xmlns:r=\"{RELATIONSHIPS}\"><workbookPr/><sheets>");
    for (index, sheet) in sheets.iter().enumerate() {
        xml.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
            escape(sheet.name),
            index + 1,
            index + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn relationships(count: usize) -> String {
    let mut xml = "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">".to_owned();
    for index in 1..=count {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{index}\" Type=\"{RELATIONSHIPS}/worksheet\" Target=\"worksheets/sheet{index}.xml\"/>"
        ));
    }
    xml.push_str(&format!(
        "<Relationship Id=\"rId{}\" Type=\"{RELATIONSHIPS}/styles\" Target=\"styles.xml\"/>",
        count + 1
    ));
    xml.push_str("</Relationships>");
    xml
}

fn styles() -> String {
    format!(
        "<styleSheet xmlns=\"{MAIN}\"><cellXfs count=\"3\">\
         <xf numFmtId=\"0\"/><xf numFmtId=\"21\"/><xf numFmtId=\"14\"/>\
         </cellXfs></styleSheet>"
    )
}

fn shared_strings(strings: &[&str]) -> String {
    let mut xml = format!("<sst xmlns=\"{MAIN}\" count=\"{0}\" uniqueCount=\"{0}\">", strings.len());
    for text in strings {
        xml.push_str(&format!("<si><t>{}</t></si>", escape(text)));
    }
    xml.push_str("</sst>");
    xml
}

fn content_types(count: usize) -> String {
    let mut xml = "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
        <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
        <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
        <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>"
        .to_owned();
    for index in 1..=count {
        xml.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{index}.xml\" \
             ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>"
        ));
    }
    xml.push_str("</Types>");
    xml
}
