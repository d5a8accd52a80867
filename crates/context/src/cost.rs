//! Character cost utilities.
//!
//! The downstream transport limits the briefing by characters, not tokens,
//! so every cost here counts Unicode scalar values. Byte length would
//! over-count accented names and emoji.

/// Marker appended when the packed context is hard-truncated.
pub const ELLIPSIS: &str = "...";

/// Character cost of a string.
pub fn char_cost(text: &str) -> usize {
    text.chars().count()
}

/// Cut `text` to at most `budget` characters, ending in [`ELLIPSIS`] when
/// anything was removed. Always splits on a character boundary.
pub fn truncate_with_ellipsis(text: &str, budget: usize) -> String {
    if char_cost(text) <= budget {
        return text.to_string();
    }
    let marker = char_cost(ELLIPSIS);
    if budget < marker {
        return text.chars().take(budget).collect();
    }
    let mut out: String = text.chars().take(budget - marker).collect();
    out.push_str(ELLIPSIS);
    out
}
