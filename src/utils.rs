//! Utility functions for reading and writing field values
//!
//! Field values are plain strings. Numbers are read with leading-prefix
//! float parsing, so `"12abc"` reads as 12 and `"abc"` or `""` as nothing,
//! and written back with zero fractional digits.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Placeholder substituted with the 1-based item index in field-id templates
pub const INDEX_PLACEHOLDER: &str = "{index}";

fn float_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("float prefix pattern is valid")
    })
}

fn integer_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("integer prefix pattern is valid"))
}

/// Resolve a field-id template for a 1-based item index.
///
/// Only the first placeholder is substituted. Templates without a
/// placeholder (single-instance fields) resolve to themselves.
pub fn resolve_template(pattern: &str, index: usize) -> String {
    pattern.replacen(INDEX_PLACEHOLDER, &index.to_string(), 1)
}

/// Parse the longest leading decimal literal of `text`.
///
/// Returns `None` when no numeric prefix exists.
pub fn parse_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let matched = float_prefix_regex().find(trimmed)?.as_str();
    match matched.trim_start_matches(['+', '-']) {
        "Infinity" if matched.starts_with('-') => Some(f64::NEG_INFINITY),
        "Infinity" => Some(f64::INFINITY),
        _ => matched.parse::<f64>().ok(),
    }
}

/// Parse the leading base-10 integer of `text`.
pub fn parse_integer(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let matched = integer_prefix_regex().find(trimmed)?.as_str();
    matched.parse::<f64>().ok()
}

/// Numeric value of a field: unparsable or empty text counts as 0.
pub fn parse_number(text: &str) -> f64 {
    match parse_float(text) {
        Some(n) if !n.is_nan() => n,
        _ => 0.0,
    }
}

/// Render a number with zero fractional digits, rounding half away from zero.
pub fn format_fixed0(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    let rounded = value.round();
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{:.0}", rounded)
    }
}

/// Render a number with thousands separators and at most three fractional
/// digits, as locale formatting shows running totals.
pub fn format_grouped(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "∞" } else { "-∞" };
        return text.to_string();
    }

    let thousandths = (value.abs() * 1000.0).round();
    let integer = (thousandths / 1000.0).trunc();
    let fraction = (thousandths - integer * 1000.0) as u32;

    let digits = format!("{:.0}", integer);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if fraction > 0 {
        grouped.push('.');
        grouped.push_str(format!("{:03}", fraction).trim_end_matches('0'));
    }

    if value < 0.0 && thousandths > 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Shortest decimal rendering of a number; integral values drop the fraction.
pub fn number_to_string(value: f64) -> String {
    if !value.is_finite() || (value == value.trunc() && value.abs() < 1e21) {
        format_fixed0(value)
    } else {
        format!("{}", value)
    }
}

/// String conversion of a payload value as a page would perform it.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(number_to_string).unwrap_or_default(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Whether a payload value counts as "set" when written into a field
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text written into a field for a payload value; falsy values clear the field.
pub fn field_text(value: &Value) -> String {
    if is_truthy(value) {
        value_to_string(value)
    } else {
        String::new()
    }
}
