//! Display-name generation for a raw provider-native model id (spec §4.6).
//!
//! `"claude-3-5-haiku-20241022"` → `"Claude 3 5 Haiku"`;
//! `"gpt-4o-2024-05-13"` → `"Gpt 4o"`.

/// Derive a human-readable display name from a raw model id (spec §4.6 "Display-name
/// generation").
///
/// Strips a trailing ISO-date suffix (`-YYYYMMDD` or `-YYYY-MM-DD`) and a trailing
/// `-latest`, replaces `-`/`_` with spaces, and title-cases each whitespace-separated
/// word.
#[must_use]
pub fn display_name(raw_model_id: &str) -> String {
    let without_latest = raw_model_id.strip_suffix("-latest").unwrap_or(raw_model_id);
    let without_date = strip_date_suffix(without_latest);
    without_date
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_date_suffix(s: &str) -> &str {
    if s.len() >= 11 {
        let (head, tail) = s.split_at(s.len() - 11);
        if is_dashed_iso_date(tail) {
            return head;
        }
    }
    if s.len() >= 9 {
        let (head, tail) = s.split_at(s.len() - 9);
        if is_compact_iso_date(tail) {
            return head;
        }
    }
    s
}

/// Matches `-YYYY-MM-DD`.
fn is_dashed_iso_date(tail: &str) -> bool {
    let bytes = tail.as_bytes();
    bytes[0] == b'-'
        && bytes[1..5].iter().all(u8::is_ascii_digit)
        && bytes[5] == b'-'
        && bytes[6..8].iter().all(u8::is_ascii_digit)
        && bytes[8] == b'-'
        && bytes[9..11].iter().all(u8::is_ascii_digit)
}

/// Matches `-YYYYMMDD`.
fn is_compact_iso_date(tail: &str) -> bool {
    let bytes = tail.as_bytes();
    bytes[0] == b'-' && bytes[1..9].iter().all(u8::is_ascii_digit)
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
