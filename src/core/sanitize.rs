// src/core/sanitize.rs

/// Join-key normal form: trimmed, and integral numbers lose a trailing `.0`
/// (spreadsheets turn `12` into `12.0`).
pub fn normalize_key(s: &str) -> String {
    let t = s.trim();
    if let Some(int_part) = t.strip_suffix(".0") {
        if !int_part.is_empty() && int_part.chars().all(|c| c.is_ascii_digit()) {
            return s!(int_part);
        }
    }
    if let Ok(f) = t.parse::<f64>() {
        if f.is_finite() && f.fract() == 0.0 && t.contains(['.', 'e', 'E']) && f.abs() < 1e15 {
            return (f as i64).to_string();
        }
    }
    s!(t)
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Parse an id cell that may have been through a spreadsheet (`"12.0"`).
pub fn parse_id(s: &str) -> Option<u32> {
    normalize_key(s).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys() {
        assert_eq!(normalize_key(" 12 "), "12");
        assert_eq!(normalize_key("12.0"), "12");
        assert_eq!(normalize_key("12.00"), "12");
        assert_eq!(normalize_key("12.5"), "12.5");
        assert_eq!(normalize_key("abc"), "abc");
        assert_eq!(parse_id("3091.0"), Some(3091));
        assert_eq!(parse_id("x"), None);
    }
}
