use once_cell::sync::Lazy;
use regex::Regex;

/// Word characters, whitespace runs, or a single other character.
/// Every character falls into exactly one alternative, so tokens tile the input.
static WORD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+|\s+|[^\w\s]").expect("word token pattern is valid"));

/// Split `text` into diff tokens. Concatenating the tokens yields `text`.
pub fn tokenize(text: &str) -> Vec<&str> {
    WORD_TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}
