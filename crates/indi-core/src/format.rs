//! Locale-independent formatting of values crossing the wire
//!
//! The INDI wire format always uses `.` as the decimal separator. These
//! functions are the only place numbers and switch states are turned into
//! (or read back from) wire text.

/// Format a number for the wire
///
/// Integral values print without a fractional part (`3`), other values with
/// the shortest representation that round-trips (`2.25`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    // Display for f64 never uses exponent notation or a locale separator
    format!("{}", value)
}

/// Parse a wire number
///
/// Accepts plain decimals (`-12.5`) and sexagesimal notation with `:` or
/// whitespace separators (`-12:30:00`, `5 30`).
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(v) = text.parse::<f64>() {
        return Some(v);
    }

    let parts: Vec<&str> = text
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let negative = parts[0].starts_with('-');
    let mut total = 0.0;
    let mut scale = 1.0;
    for part in &parts {
        let v: f64 = part.parse().ok()?;
        total += v.abs() / scale;
        scale *= 60.0;
    }
    Some(if negative { -total } else { total })
}

/// Wire text for a switch state
pub fn format_switch(on: bool) -> &'static str {
    if on {
        "On"
    } else {
        "Off"
    }
}

/// Parse a wire switch state (`On`/`Off`, case-insensitive)
pub fn parse_switch(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("on") {
        Some(true)
    } else if text.eq_ignore_ascii_case("off") {
        Some(false)
    } else {
        None
    }
}
