//! Text forms of fact arguments and the grammars cell values are checked against.
use chrono::Datelike;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::Timelike;
use regex::Regex;
use std::sync::LazyLock;

static CONSTANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_*[a-z][A-Za-z0-9_']*$").expect("Hardcode regex pattern"));

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("Hardcode regex pattern"));

/// Separator of multi-valued cells, kept as is in the emitted tuple.
pub const LIST_SEPARATOR: char = ';';

/// True if `value` is a lowercase identifier usable as an unquoted atom.
pub fn is_constant(value: &str) -> bool {
    CONSTANT.is_match(value)
}

/// Renders an integral number; `None` for fractions and out-of-range values.
pub fn integral(number: f64) -> Option<String> {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 9.2e18 {
        Some((number as i64).to_string())
    } else {
        None
    }
}

/// Parses integer text such as "20", "-3" or "+7" into its canonical form.
pub fn integer_text(value: &str) -> Option<String> {
    if INTEGER.is_match(value) {
        value.parse::<i64>().ok().map(|number| number.to_string())
    } else {
        None
    }
}

/// Applies `item` to every `;`-separated element of `text`.
/// One element is returned bare, several are wrapped as `(a;b;c)`.
pub fn literal_list<F>(text: &str, item: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let items = text
        .split(LIST_SEPARATOR)
        .map(|element| item(element.trim()))
        .collect::<Option<Vec<_>>>()?;
    match items.as_slice() {
        [single] => Some(single.to_owned()),
        _ => Some(format!("({})", items.join(";"))),
    }
}

/// Wraps text in double quotes, escaping backslashes, quotes and newlines.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for character in value.chars() {
        match character {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(character),
        }
    }
    quoted.push('"');
    quoted
}

/// `(hour,minute,second)`
pub fn time_tuple(time: &NaiveTime) -> String {
    format!("({},{},{})", time.hour(), time.minute(), time.second())
}

/// `(day,month,year)`
pub fn date_tuple(date: &NaiveDate) -> String {
    format!("({},{},{})", date.day(), date.month(), date.year())
}

/// `((day,month,year),(hour,minute,second))`
pub fn datetime_tuple(datetime: &NaiveDateTime) -> String {
    format!("({},{})", date_tuple(&datetime.date()), time_tuple(&datetime.time()))
}

/// Parses time-of-day text, `HH:MM:SS` or `HH:MM`.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Parses date text, `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses datetime text, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_grammar() {
        assert!(is_constant("male"));
        assert!(is_constant("__x"));
        assert!(is_constant("sheet1"));
        assert!(is_constant("aB_9'"));
        assert!(!is_constant("Male"));
        assert!(!is_constant("_"));
        assert!(!is_constant("1a"));
        assert!(!is_constant("a b"));
        assert!(!is_constant(""));
    }

    #[test]
    fn integers() {
        assert_eq!(integral(20.0).as_deref(), Some("20"));
        assert_eq!(integral(-3.0).as_deref(), Some("-3"));
        assert_eq!(integral(2.5), None);
        assert_eq!(integral(f64::NAN), None);
        assert_eq!(integer_text("+7").as_deref(), Some("7"));
        assert_eq!(integer_text("3.0"), None);
        assert_eq!(integer_text("x"), None);
    }

    #[test]
    fn lists() {
        let constant = |item: &str| is_constant(item).then(|| item.to_owned());
        assert_eq!(literal_list("a;b;c", constant).as_deref(), Some("(a;b;c)"));
        assert_eq!(literal_list("a", constant).as_deref(), Some("a"));
        assert_eq!(literal_list("a; b", constant).as_deref(), Some("(a;b)"));
        assert_eq!(literal_list("a;B", constant), None);
        assert_eq!(literal_list("a;b", |item| Some(quote(item))).as_deref(), Some("(\"a\";\"b\")"));
    }

    #[test]
    fn quoting() {
        assert_eq!(quote("Dany"), "\"Dany\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn calendar_text() {
        assert_eq!(parse_time("00:20:10"), NaiveTime::from_hms_opt(0, 20, 10));
        assert_eq!(parse_time("18:01"), NaiveTime::from_hms_opt(18, 1, 0));
        assert_eq!(parse_time("100:20:10"), None);
        assert_eq!(parse_time("25:00:00"), None);
        assert_eq!(parse_date("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_date("2023-02-29"), None);
        assert!(parse_datetime("2024-01-05 10:00:00").is_some());
        assert!(parse_datetime("2024-01-05T10:00:00").is_some());
        assert!(parse_datetime("2024-01-05").is_none());
    }
}
