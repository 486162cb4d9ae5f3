//! Helpers for reading panel parameters out of a `serde_json::Value` object.
//!
//! Panels are configured by partial JSON objects (slider changes, `--params`
//! on the CLI, a replayed [`Seed`](crate::Seed)). Each helper takes the object,
//! a key, and a fallback; missing or wrong-typed keys yield the fallback, so
//! callers pass the *current* value as fallback to get merge semantics.

use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Like [`param_f64`] but clamps the result into `[min, max]`.
///
/// Non-finite inputs are treated as missing.
pub fn param_f64_in(params: &Value, name: &str, default: f64, min: f64, max: f64) -> f64 {
    let v = param_f64(params, name, default);
    if v.is_finite() {
        v.clamp(min, max)
    } else {
        default
    }
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only non-negative JSON integers are accepted.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Like [`param_usize`] but clamps the result into `[min, max]`.
pub fn param_usize_in(params: &Value, name: &str, default: usize, min: usize, max: usize) -> usize {
    param_usize(params, name, default).clamp(min, max)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Builds one entry of a `param_schema()` object for a numeric slider.
pub fn number_schema(default: f64, min: f64, max: f64, description: &str) -> Value {
    serde_json::json!({
        "type": "number",
        "default": default,
        "min": min,
        "max": max,
        "description": description,
    })
}
