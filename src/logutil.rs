//! Keep player-supplied text on one log line.
//! Names typed at the console may carry tabs, newlines or terminal escapes.

/// Longest preview of a single value in a log line.
const MAX_PREVIEW: usize = 64;

/// Escape a string for single-line logging:
/// - `\n` => `\\n`, `\r` => `\\r`, `\t` => `\\t`
/// - backslash => `\\\\`
/// - other control characters => `\xNN`
///
/// Values longer than 64 characters are cut with an ellipsis.
pub fn escape_log(s: &str) -> String {
    escape_log_with_limit(s, MAX_PREVIEW)
}

pub fn escape_log_with_limit(s: &str, limit: usize) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(s.len().min(limit) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= limit {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
