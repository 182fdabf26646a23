//! Punctuation stripping.
//!
//! The built-in set covers the ASCII punctuation marks and the full-width
//! CJK marks that show up in mixed Chinese/English corpora. Optionally any
//! character in a Unicode punctuation category is stripped as well.

use unicode_categories::UnicodeCategories;

/// Punctuation stripped regardless of configuration.
pub const PUNCTUATION: &str = "，_《。》、？；：‘’＂“”【「】」·！@￥…（）—,<.>/?;:'\"[]{}~`!#$%^&*()-=+";

/// Returns `true` for characters in the built-in punctuation set.
#[inline]
pub fn is_builtin_punctuation(ch: char) -> bool {
    PUNCTUATION.contains(ch)
}

/// Remove punctuation and control characters from `text`.
///
/// Returns the stripped text and the number of punctuation characters
/// removed. Control characters other than whitespace are dropped but not
/// counted, since they are invisible in the source text.
pub fn strip_punctuation(text: &str, unicode_categories: bool) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut removed = 0usize;
    for ch in text.chars() {
        if is_builtin_punctuation(ch) || (unicode_categories && ch.is_punctuation()) {
            removed += 1;
        } else if ch.is_control() && !ch.is_whitespace() {
            continue;
        } else {
            out.push(ch);
        }
    }
    (out, removed)
}

/// Convenience wrapper returning only the stripped text using the built-in
/// set.
pub fn remove_punctuation(text: &str) -> String {
    strip_punctuation(text, false).0
}
