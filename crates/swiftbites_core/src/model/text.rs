//! Text folding shared by uniqueness checks and list filters.
//!
//! Two strings are "the same name" when their folded keys are equal, and a
//! filter matches when its folded form is a substring of a stored folded
//! column.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Folds text to its case- and diacritic-insensitive comparison key.
///
/// Trims, collapses whitespace runs, lowercases, then drops combining
/// marks after canonical decomposition (`Crème` folds to `creme`).
pub fn fold_key(value: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    collapsed
        .to_lowercase()
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect()
}
