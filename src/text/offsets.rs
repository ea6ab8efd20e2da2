//! Character offset helpers
//!
//! The core counts offsets in Unicode scalar values (chars). Browser text
//! inputs report `selectionStart` in UTF-16 code units, so the WASM boundary
//! converts with the helpers below.

/// Number of chars in `s`
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the char at `char_idx`, clamped to `s.len()`
pub fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

/// Convert a UTF-16 code unit offset to a char offset
///
/// An offset that lands inside a surrogate pair resolves to the char that
/// contains it. Offsets past the end clamp to the char length.
pub fn utf16_to_char(s: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in s.chars().enumerate() {
        if units >= utf16_offset {
            return idx;
        }
        units += ch.len_utf16();
        if units > utf16_offset {
            return idx;
        }
    }
    char_len(s)
}

/// Convert a char offset to a UTF-16 code unit offset (clamped)
pub fn char_to_utf16(s: &str, char_offset: usize) -> usize {
    s.chars().take(char_offset).map(char::len_utf16).sum()
}

/// Length in chars of the longest common prefix
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Length in chars of the longest common suffix, at most `max`
pub fn common_suffix_len(a: &str, b: &str, max: usize) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take(max)
        .take_while(|(x, y)| x == y)
        .count()
}
