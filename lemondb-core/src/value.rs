//! The single scalar type LemonDB tables hold: a wrapping 32-bit signed integer.

/// Every column and the `SUM`/`MIN`/`MAX` answer vectors hold this type.
pub type Value = i32;

/// Parses the longest leading decimal run of `s` as a base-10 signed integer,
/// mirroring `strtol`'s "parse as much as looks like a number, ignore the
/// rest" behavior used throughout `original_source` for condition literals
/// and `INSERT` operands. Unparsable input (no leading digits) yields `0`.
/// Values outside `i32` range are truncated the way `static_cast<int32_t>`
/// truncates an overflowed `long` in the original.
pub fn parse_int_literal(s: &str) -> Value {
    let s = s.trim_start();
    let mut chars = s.char_indices().peekable();
    let mut end = 0;
    if let Some(&(_, c)) = chars.peek() {
        if c == '+' || c == '-' {
            end = c.len_utf8();
            chars.next();
        }
    }
    let mut saw_digit = false;
    for (idx, c) in chars {
        if c.is_ascii_digit() {
            saw_digit = true;
            end = idx + c.len_utf8();
        } else {
            break;
        }
    }
    if !saw_digit {
        return 0;
    }
    match s[..end].parse::<i64>() {
        Ok(v) => v as i32,
        Err(_) => 0,
    }
}
