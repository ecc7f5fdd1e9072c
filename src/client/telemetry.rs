/// A typed telemetry value.
///
/// One tagged union replaces per-type send paths: the value's declared type at
/// the call site decides the JSON encoding, with no implicit numeric coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryValue<'a> {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(&'a str),
}

impl From<i32> for TelemetryValue<'_> {
    fn from(v: i32) -> Self {
        TelemetryValue::Integer(i64::from(v))
    }
}

impl From<i64> for TelemetryValue<'_> {
    fn from(v: i64) -> Self {
        TelemetryValue::Integer(v)
    }
}

impl From<u32> for TelemetryValue<'_> {
    fn from(v: u32) -> Self {
        TelemetryValue::Integer(i64::from(v))
    }
}

impl From<f32> for TelemetryValue<'_> {
    fn from(v: f32) -> Self {
        TelemetryValue::Float(f64::from(v))
    }
}

impl From<f64> for TelemetryValue<'_> {
    fn from(v: f64) -> Self {
        TelemetryValue::Float(v)
    }
}

impl From<bool> for TelemetryValue<'_> {
    fn from(v: bool) -> Self {
        TelemetryValue::Boolean(v)
    }
}

impl<'a> From<&'a str> for TelemetryValue<'a> {
    fn from(v: &'a str) -> Self {
        TelemetryValue::Text(v)
    }
}
