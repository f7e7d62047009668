use serde_json::Value;

/// Read a count that the feed may send as a number or a numeric string.
pub fn value_as_u32(value: &Value) -> Option<u32> {
    value_as_f64(value)
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u32)
}

/// Read a number that the feed may send as a number or a numeric string.
/// Percent signs are tolerated ("64%").
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// Render a scalar for display: strings as-is, whole numbers without ".0".
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) => Some(format_number(f)),
            _ => None,
        },
        _ => None,
    }
}

/// Format a number without a trailing fraction when it is whole.
pub fn format_number(num: f64) -> String {
    if num.fract() == 0.0 && num.abs() < 1e15 {
        format!("{:.0}", num)
    } else {
        num.to_string()
    }
}
