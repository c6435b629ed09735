//! Header and path-segment normalization.
//!
//! Spreadsheet headers arrive as free-form Czech labels ("Název atributu",
//! "A1 - OST", "Vysvětlivky k vyplnění"). [`normalize_key`] turns them into
//! stable structural keys over `[a-z0-9_]` so columns can be located by name
//! and tree keys stay safe to use as identifiers.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s./-]+").expect("separator pattern compiles"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]").expect("disallowed pattern compiles"));
static UNDERSCORE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("underscore pattern compiles"));

/// Normalizes a label into a lowercase `[a-z0-9_]` key.
///
/// Normalizing an already normalized key returns it unchanged.
pub fn normalize_key(label: &str) -> String {
    let folded = fold_diacritics(label.trim()).to_lowercase();
    let separated = SEPARATORS.replace_all(&folded, "_");
    let stripped = DISALLOWED.replace_all(&separated, "");
    let collapsed = UNDERSCORE_RUNS.replace_all(&stripped, "_");
    collapsed.trim_matches('_').to_string()
}

/// Normalizes a header cell, falling back to `col_<index>` for null cells.
pub fn normalize_header(cell: Option<&str>, index: usize) -> String {
    match cell {
        Some(label) => normalize_key(label),
        None => format!("col_{index}"),
    }
}

fn fold_diacritics(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}
