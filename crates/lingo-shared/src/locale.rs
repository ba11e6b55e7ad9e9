//! Nationality-to-language lookup.
//!
//! A small fixed table; extending it is a deliberate edit here, never a
//! silent runtime fallback elsewhere.  Unknown keys resolve to
//! [`DEFAULT_LANGUAGE`].

/// Language used when a nationality key is missing from the table.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Map a nationality key to the human-readable language name embedded in
/// translation instructions.
pub fn language_for(nationality: &str) -> &'static str {
    match nationality {
        "Korea" => "한국어",
        "USA" => "English",
        "Japan" => "日本語",
        "China" => "中文",
        "Vietnam" => "Tiếng Việt",
        "UK" => "English",
        _ => DEFAULT_LANGUAGE,
    }
}
