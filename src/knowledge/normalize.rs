//! Canonical identifiers for free-form labels.
//!
//! Every name that reaches the knowledge store or a query goes through
//! [`normalize`] first, so equality and map lookups always compare
//! canonical forms.

/// Returned when nothing recognizable survives normalization.
pub const PLACEHOLDER: &str = "x";

/// Prepended when the identifier would otherwise start with a digit.
pub const DIGIT_GUARD: &str = "x_";

/// Convert free text into a canonical `[a-z0-9_]` identifier.
///
/// Lowercases and trims, maps space/hyphen/underscore to `_`, folds
/// accented vowels and `ñ` to ASCII, drops everything else. Total: never
/// fails, unrecognizable input degrades to [`PLACEHOLDER`].
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.trim().chars().flat_map(char::to_lowercase) {
        match c {
            'a'..='z' | '0'..='9' => out.push(c),
            ' ' | '-' | '_' => out.push('_'),
            'á' | 'à' | 'â' | 'ä' => out.push('a'),
            'é' | 'è' | 'ê' | 'ë' => out.push('e'),
            'í' | 'ì' | 'î' | 'ï' => out.push('i'),
            'ó' | 'ò' | 'ô' | 'ö' => out.push('o'),
            'ú' | 'ù' | 'û' | 'ü' => out.push('u'),
            'ñ' => out.push('n'),
            _ => {}
        }
    }

    if out.is_empty() {
        return PLACEHOLDER.to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, DIGIT_GUARD);
    }
    out
}

/// True when `text` is already in canonical form.
pub fn is_canonical(text: &str) -> bool {
    !text.is_empty()
        && !text.starts_with(|c: char| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
