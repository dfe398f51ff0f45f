// src/utils/text.rs

//! Text helpers shared by the extractor and the generator.

/// Title-case a string: the first letter of every run of letters is
/// uppercased, the rest lowercased.
///
/// # Examples
/// ```
/// use pnpgen::utils::text::title_case;
///
/// assert_eq!(title_case("project FILES"), "Project Files");
/// ```
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_word = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(ch);
            in_word = false;
        }
    }
    result
}

/// Truncate to `max_chars` characters, appending `...` when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// Strip a markdown code fence wrapping a model reply, if present.
///
/// A ```` ```json ```` fence takes precedence over a bare ```` ``` ```` one.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();

    let inner = if let Some((_, rest)) = text.split_once("```json") {
        rest
    } else if let Some((_, rest)) = text.split_once("```") {
        rest
    } else {
        return text;
    };

    inner.split("```").next().unwrap_or(inner).trim()
}
