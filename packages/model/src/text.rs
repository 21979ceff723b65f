//! Char-offset string helpers
//!
//! All text offsets in the model are measured in chars, not bytes.

/// Number of chars in a string.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the given char offset, or `None` if out of range.
/// An offset equal to the char length maps to the end of the string.
pub fn byte_offset(s: &str, chars: usize) -> Option<usize> {
    let mut count = 0;
    for (i, _) in s.char_indices() {
        if count == chars {
            return Some(i);
        }
        count += 1;
    }
    if count == chars {
        Some(s.len())
    } else {
        None
    }
}

/// Substring by char offsets, clamped to the string's length.
pub fn slice_chars(s: &str, from: usize, to: usize) -> String {
    s.chars().skip(from).take(to.saturating_sub(from)).collect()
}
