/// Normalize raw document or query text into the form the vectorizer indexes.
///
/// Lowercases, strips the fixed ASCII punctuation set, and collapses every
/// run of whitespace to a single space. Applying it twice yields the same
/// string as applying it once, so corpus text and query text can be passed
/// through unconditionally.
#[inline]
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .flat_map(char::to_lowercase)
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokenize normalized text. The normalizer guarantees single-space
/// separation, so this is a plain whitespace split.
#[inline]
pub fn tokenize(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}
