//! Flat `key value` record files.
//!
//! A record is one `<key> <value>` pair per line. The key ends at the
//! first space; the value is the rest of the line, unescaped, so values
//! must not contain newlines. Encoding refuses such values instead of
//! writing a file that would not read back.
//!
//! Record types describe their on-disk shape with a static schema: one
//! [`Field`] per persisted field, in file order. Fields that are not in
//! the schema are not persisted.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::datetime::TaskDate;
use crate::error::{Error, Result};

/// The closed set of scalar types a record field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Timestamp,
    Date,
}

/// A decoded field value, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Timestamp(DateTime<Utc>),
    Date(TaskDate),
}

impl FieldKind {
    pub fn decode(self, raw: &str) -> std::result::Result<FieldValue, String> {
        match self {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw)
                .map(|ts| FieldValue::Timestamp(ts.with_timezone(&Utc)))
                .map_err(|e| format!("bad timestamp '{raw}': {e}")),
            FieldKind::Date => raw
                .parse::<TaskDate>()
                .map(FieldValue::Date)
                .map_err(|e| e.to_string()),
        }
    }
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
            FieldValue::Date(_) => FieldKind::Date,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Nanos, true),
            FieldValue::Date(d) => d.to_string(),
        }
    }
}

/// One persisted field of a record type.
///
/// `get` returns `None` when an optional field is absent; required
/// fields always return a value. `set` is only ever handed a value of
/// the field's own `kind`.
pub struct Field<R> {
    pub key: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub get: fn(&R) -> Option<FieldValue>,
    pub set: fn(&mut R, FieldValue),
}

/// A type that can be written to and read from a record file.
pub trait Record: Default + Sized + 'static {
    fn schema() -> &'static [Field<Self>];
}

/// Encode a record, one line per present field in schema order.
pub fn encode<R: Record>(record: &R) -> Result<String> {
    let mut out = String::new();
    for field in R::schema() {
        let Some(value) = (field.get)(record) else {
            if field.required {
                return Err(Error::InvalidRecordFormat(format!(
                    "{} is required",
                    field.key
                )));
            }
            continue;
        };
        let text = value.encode();
        if text.contains('\n') || text.contains('\r') {
            return Err(Error::InvalidRecordFormat(format!(
                "value of {} contains a line break",
                field.key
            )));
        }
        out.push_str(field.key);
        out.push(' ');
        out.push_str(&text);
        out.push('\n');
    }
    Ok(out)
}

/// Decode a record. Blank lines are ignored; everything else must be a
/// known key appearing at most once. Values are taken verbatim, so
/// surrounding whitespace and empty values survive a round trip.
pub fn decode<R: Record>(text: &str) -> Result<R> {
    let mut pairs: HashMap<&str, &str> = HashMap::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(' ')
            .ok_or_else(|| Error::InvalidRecordFormat(format!("invalid line: {line}")))?;
        if pairs.insert(key, value).is_some() {
            return Err(Error::InvalidRecordFormat(format!("duplicate key: {key}")));
        }
    }

    let mut record = R::default();
    for field in R::schema() {
        let Some(raw) = pairs.remove(field.key) else {
            if field.required {
                return Err(Error::InvalidRecordFormat(format!(
                    "{} is required",
                    field.key
                )));
            }
            continue;
        };
        let value = field
            .kind
            .decode(raw)
            .map_err(|e| Error::InvalidRecordFormat(format!("{}: {e}", field.key)))?;
        (field.set)(&mut record, value);
    }

    if let Some(key) = pairs.keys().min() {
        return Err(Error::InvalidRecordFormat(format!("unknown key: {key}")));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Default, PartialEq)]
    struct Note {
        name: String,
        at: Option<DateTime<Utc>>,
        scratch: u32,
    }

    const NOTE_FIELDS: &[Field<Note>] = &[
        Field {
            key: "name",
            kind: FieldKind::Text,
            required: true,
            get: |n| Some(FieldValue::Text(n.name.clone())),
            set: |n, v| {
                if let FieldValue::Text(s) = v {
                    n.name = s;
                }
            },
        },
        Field {
            key: "at",
            kind: FieldKind::Timestamp,
            required: false,
            get: |n| n.at.map(FieldValue::Timestamp),
            set: |n, v| {
                if let FieldValue::Timestamp(ts) = v {
                    n.at = Some(ts);
                }
            },
        },
    ];

    impl Record for Note {
        fn schema() -> &'static [Field<Self>] {
            NOTE_FIELDS
        }
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap() + chrono::Duration::nanoseconds(123_456_789)
    }

    #[test]
    fn encode_in_schema_order_and_skips_untagged() {
        let note = Note {
            name: "water the plants".to_string(),
            at: Some(ts()),
            scratch: 7,
        };
        assert_eq!(
            encode(&note).unwrap(),
            "name water the plants\nat 2026-10-18T09:30:00.123456789Z\n"
        );
    }

    #[test]
    fn absent_optional_is_omitted() {
        let note = Note {
            name: "x".to_string(),
            ..Default::default()
        };
        assert_eq!(encode(&note).unwrap(), "name x\n");
    }

    #[test]
    fn decode_reads_back_what_encode_wrote() {
        let note = Note {
            name: " call  mom ".to_string(),
            at: Some(ts()),
            scratch: 0,
        };
        let text = encode(&note).unwrap();
        let back: Note = decode(&text).unwrap();
        assert_eq!(back, note);
    }

    #[test]
    fn empty_value_reads_back() {
        let note = Note::default();
        let text = encode(&note).unwrap();
        assert_eq!(text, "name \n");
        let back: Note = decode(&text).unwrap();
        assert_eq!(back, note);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let note: Note = decode("name x\r\nat 2026-10-18T09:30:00Z\r\n").unwrap();
        assert_eq!(note.name, "x");
        assert!(note.at.is_some());
    }

    #[test]
    fn decode_skips_blank_lines() {
        let note: Note = decode("\nname x\n\n").unwrap();
        assert_eq!(note.name, "x");
        assert_eq!(note.at, None);
    }

    #[test]
    fn line_without_space_is_rejected() {
        let err = decode::<Note>("name x\nbroken\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRecordFormat(m) if m.contains("invalid line")));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let err = decode::<Note>("name a\nname b\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRecordFormat(m) if m.contains("duplicate key: name")));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = decode::<Note>("name a\ncolor blue\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRecordFormat(m) if m.contains("unknown key: color")));
    }

    #[test]
    fn missing_required_key_is_rejected() {
        let err = decode::<Note>("at 2026-10-18T09:30:00Z\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRecordFormat(m) if m.contains("name is required")));
    }

    #[test]
    fn bad_value_names_the_key() {
        let err = decode::<Note>("name a\nat yesterday\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRecordFormat(m) if m.starts_with("at:")));
    }

    #[test]
    fn newline_in_value_is_refused() {
        let note = Note {
            name: "two\nlines".to_string(),
            ..Default::default()
        };
        let err = encode(&note).unwrap_err();
        assert!(matches!(err, Error::InvalidRecordFormat(_)));
    }

    #[test]
    fn value_kinds_match_field_kinds() {
        assert_eq!(FieldValue::Timestamp(ts()).kind(), FieldKind::Timestamp);
        let date = FieldKind::Date.decode("2026-10-20").unwrap();
        assert_eq!(date.kind(), FieldKind::Date);
        assert_eq!(date.encode(), "2026-10-20");
    }
}
