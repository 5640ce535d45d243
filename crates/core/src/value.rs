//! Cell values.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single table cell.
///
/// Loaders decide the variant; the engine never coerces between them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Value {
    /// Parse a raw delimited-file cell.
    ///
    /// Empty (after trimming) → `Null`; then integer, float, boolean,
    /// ISO date, ISO datetime; anything else is kept as text.
    pub fn parse_cell(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Self::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        match s.to_ascii_lowercase().as_str() {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
            return Self::Date(d);
        }
        for fmt in [DATETIME_FORMAT, "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Self::DateTime(dt);
            }
        }
        Self::Text(s.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value. Only integers and floats qualify.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Calendar date of a date or datetime value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Whether the value marks a row as explicitly excluded.
    pub fn is_truthy_flag(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(t) => matches!(
                t.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "y" | "1" | "x"
            ),
            Self::Null | Self::Date(_) | Self::DateTime(_) => false,
        }
    }

    /// Compact textual rendering used for size estimation and distinct counts.
    ///
    /// `Null` renders as the empty string.
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
            Self::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Self::Text(t) => t.clone(),
        }
    }

    /// Length in bytes of [`render`](Self::render).
    pub fn rendered_len(&self) -> usize {
        match self {
            Self::Null => 0,
            Self::Text(t) => t.len(),
            other => other.render().len(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(t) => serializer.serialize_str(t),
            other => serializer.serialize_str(&other.render()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}
