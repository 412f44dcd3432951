//! InfluxDB line protocol encoding.
//!
//! `measurement[,tag=value...] field=value[,field=value...] [nanoseconds]`

use crate::metrics::{FieldValue, Point};

const KEY_SPECIAL: &[char] = &[',', '=', ' '];

/// Encode a point as one line, timestamp in nanoseconds.
pub fn encode(point: &Point) -> String {
    let mut line = escape(point.measurement, &[',', ' ']);

    // Line protocol rejects empty tag values.
    for (key, value) in point.tags.iter().filter(|(_, v)| !v.is_empty()) {
        line.push(',');
        line.push_str(&escape(key, KEY_SPECIAL));
        line.push('=');
        line.push_str(&escape(value, KEY_SPECIAL));
    }

    let fields: Vec<String> = point
        .fields
        .iter()
        .map(|(key, value)| format!("{}={}", escape(key, KEY_SPECIAL), field_value(value)))
        .collect();
    line.push(' ');
    line.push_str(&fields.join(","));

    if let Some(nanos) = point.time.and_then(|t| t.timestamp_nanos_opt()) {
        line.push(' ');
        line.push_str(&nanos.to_string());
    }

    line
}

fn field_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Str(s) => format!("\"{}\"", escape(s, &['"'])),
        FieldValue::Int(i) => format!("{}i", i),
        FieldValue::Float(f) => f.to_string(),
    }
}

/// Backslash-escape `special`, backslashes and line breaks so the result
/// stays on one line.
fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => {
                if special.contains(&ch) {
                    out.push('\\');
                }
                out.push(ch);
            }
        }
    }
    out
}
