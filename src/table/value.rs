use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use std::fmt::Display;
use std::hash::Hash;
use std::hash::Hasher;

/// Day zero of the Excel 1900 date system, accounting for the phantom 1900-02-29.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Milliseconds in one day, the resolution used when rendering date serials.
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A single scalar cell of a table.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Missing value
    #[default]
    Empty,
    /// Free text
    Text(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Date/time stored as an Excel serial number in the 1900 date system
    DateTime(f64),
}

impl Value {
    /// Returns true for missing values and for text that is empty once trimmed.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Bit pattern used for equality and hashing of floating point payloads.
    /// Folds `-0.0` into `0.0` and every NaN into one canonical NaN.
    fn float_key(number: f64) -> u64 {
        if number == 0.0 {
            0f64.to_bits()
        } else if number.is_nan() {
            f64::NAN.to_bits()
        } else {
            number.to_bits()
        }
    }
}

/// Converts an Excel serial number (1900 date system) to a date and time.
pub(crate) fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let (year, month, day) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * MILLIS_PER_DAY).round() as i64;
    epoch.checked_add_signed(Duration::try_milliseconds(millis)?)
}

/// Formats a number the way a spreadsheet shows it by default: integral values without a
/// fractional part, everything else with the shortest round-trip representation.
pub(crate) fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(text) => write!(f, "{}", text),
            Value::Number(number) => write!(f, "{}", format_number(*number)),
            Value::Bool(value) => write!(f, "{}", value),
            Value::DateTime(serial) => match serial_to_datetime(*serial) {
                Some(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{}", format_number(*serial)),
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Text(left), Value::Text(right)) => left == right,
            (Value::Number(left), Value::Number(right)) => {
                Value::float_key(*left) == Value::float_key(*right)
            }
            (Value::Bool(left), Value::Bool(right)) => left == right,
            (Value::DateTime(left), Value::DateTime(right)) => {
                Value::float_key(*left) == Value::float_key(*right)
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Empty => (),
            Value::Text(text) => text.hash(state),
            Value::Number(number) | Value::DateTime(number) => {
                Value::float_key(*number).hash(state)
            }
            Value::Bool(value) => value.hash(state),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values() {
        assert!(Value::Empty.is_blank());
        assert!(Value::from("   ").is_blank());
        assert!(!Value::from("x").is_blank());
        assert!(!Value::Number(0.0).is_blank());
        assert!(!Value::Bool(false).is_blank());
    }

    #[test]
    fn number_equality_folds_signed_zero() {
        assert_eq!(Value::Number(0.0), Value::Number(-0.0));
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_ne!(Value::Number(1.0), Value::from("1"));
    }

    #[test]
    fn display_formats() {
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(Value::DateTime(45292.5).to_string(), "2024-01-01 12:00:00");
    }
}
