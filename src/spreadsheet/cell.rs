use crate::helpers::reference::index_to_reference;
use crate::spreadsheet::RawCell;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;

/// Types of cell data in `.xlsx` worksheets.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as serial numbers from the 1900 epoch
    NumberDateTime1900,
    /// Date values stored as serial numbers from the 1900 epoch
    NumberDate1900,
    /// Time values stored as serial numbers from the 1900 epoch
    NumberTime1900,
    /// Date/time values stored as serial numbers from the 1904 epoch
    NumberDateTime1904,
    /// Date values stored as serial numbers from the 1904 epoch
    NumberDate1904,
    /// Time values stored as serial numbers from the 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses a custom number format code, looking for date and time tokens
    /// outside of literals, escapes and `[...]` sections.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_date = false;
        let mut is_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_literal => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }

    fn is_1904(&self) -> bool {
        matches!(self, Self::NumberDateTime1904 | Self::NumberDate1904 | Self::NumberTime1904)
    }
}

/// A single populated cell as streamed from a worksheet part.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    /// Cell value as stored in the part
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the stored value into a [`RawCell`], resolving shared strings
    /// and serial dates.
    pub(crate) fn to_raw(&self, shared_strings: &[String]) -> Result<RawCell, String> {
        match self.kind {
            CellType::Empty => Ok(RawCell::Null),
            CellType::Boolean => Ok(RawCell::Text(if self.value == "1" { "true" } else { "false" }.to_owned())),
            CellType::Number => self.to_double().map(RawCell::Number),
            CellType::InlineString => Ok(RawCell::Text(self.value.to_owned())),
            CellType::SharedString => self
                .value
                .parse::<usize>()
                .ok()
                .and_then(|index| shared_strings.get(index))
                .map(|text| RawCell::Text(text.to_owned()))
                .ok_or_else(|| format!("unknown shared string '{}'", self.value)),
            CellType::NumberTime1900 | CellType::NumberTime1904 => {
                let serial = self.to_double()?;
                if (0.0..1.0).contains(&serial) {
                    Ok(RawCell::Time(serial_to_datetime(serial, self.kind.is_1904())?.time()))
                } else {
                    serial_to_datetime(serial, self.kind.is_1904()).map(RawCell::DateTime)
                }
            }
            CellType::NumberDate1900 | CellType::NumberDate1904 => {
                let serial = self.to_double()?;
                let datetime = serial_to_datetime(serial, self.kind.is_1904())?;
                if serial.fract() == 0.0 {
                    Ok(RawCell::Date(datetime.date()))
                } else {
                    Ok(RawCell::DateTime(datetime))
                }
            }
            CellType::NumberDateTime1900 | CellType::NumberDateTime1904 => {
                serial_to_datetime(self.to_double()?, self.kind.is_1904()).map(RawCell::DateTime)
            }
            CellType::IsoDateTime => parse_iso(&self.value),
            CellType::Error => Err(self.value.to_owned()),
        }
    }

    fn to_double(&self) -> Result<f64, String> {
        self.value
            .parse::<f64>()
            .map_err(|_| format!("parse '{}' to double failed", self.value))
    }
}

/// Converts a serial number to a datetime. The 1900 system keeps the Lotus
/// 1-2-3 leap year bug: serials 1 to 59 are shifted by one day.
pub(crate) fn serial_to_datetime(serial: f64, is_1904: bool) -> Result<NaiveDateTime, String> {
    // 2958466 is 10000-01-01, past the last date a workbook can hold
    if !serial.is_finite() || !(0.0..2_958_466.0).contains(&serial) {
        return Err(format!("serial date '{serial}' out of range"));
    }
    let days = serial.trunc() as i64;
    let offset = if is_1904 {
        days + 1462
    } else if 0 < days && days < 60 {
        days + 1
    } else {
        days
    };
    let seconds = (serial.fract() * 86_400f64).round() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default();
    epoch
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::days(offset) + Duration::seconds(seconds))
        .ok_or_else(|| format!("serial date '{serial}' out of range"))
}

/// Parses the ISO 8601 text of a `t="d"` cell.
fn parse_iso(value: &str) -> Result<RawCell, String> {
    if value.contains('T') {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .map(RawCell::DateTime)
            .map_err(|_| format!("parse '{value}' to datetime failed"))
    } else if value.contains(':') {
        NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
            .map(RawCell::Time)
            .map_err(|_| format!("parse '{value}' to time failed"))
    } else {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(RawCell::Date)
            .map_err(|_| format!("parse '{value}' to date failed"))
    }
}
