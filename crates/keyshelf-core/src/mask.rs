//! Display-safe redaction of API key values.

/// Number of `*` appended after a delimited prefix, independent of the
/// secret's real length.
pub const MASK_SUFFIX_LEN: usize = 32;

const DELIMITER: char = '-';
const VISIBLE_EDGE: usize = 4;

/// Mask a secret for display.
///
/// - Empty input stays empty.
/// - With a `-`, everything up to and including the last `-` is kept and
///   exactly 32 `*` follow.
/// - Without a `-` and longer than 8 characters, the first and last 4
///   characters are kept and the middle is starred.
/// - Otherwise every character is starred.
pub fn mask_key(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    if let Some(index) = value.rfind(DELIMITER) {
        let prefix = &value[..index + DELIMITER.len_utf8()];
        return format!("{}{}", prefix, "*".repeat(MASK_SUFFIX_LEN));
    }

    let len = value.chars().count();
    if len > VISIBLE_EDGE * 2 {
        let head: String = value.chars().take(VISIBLE_EDGE).collect();
        let tail: String = value.chars().skip(len - VISIBLE_EDGE).collect();
        return format!("{}{}{}", head, "*".repeat(len - VISIBLE_EDGE * 2), tail);
    }

    "*".repeat(len)
}
