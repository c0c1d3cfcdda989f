//! Picks representative lines for a conversation.

use super::heuristics::is_actionable;

/// Maximum snippets per conversation.
pub const MAX_BULLETS: usize = 3;
/// Maximum characters per snippet.
pub const MAX_BULLET_CHARS: usize = 180;

/// Up to [`MAX_BULLETS`] snippets from `texts` (arrival order).
///
/// Actionable texts come first, longer before shorter within each group;
/// equal keys keep their arrival order. Snippets are trimmed and cut at
/// [`MAX_BULLET_CHARS`] characters without an ellipsis.
pub fn summarize<S: AsRef<str>>(texts: &[S]) -> Vec<String> {
    let mut ranked: Vec<(bool, usize, &str)> = texts
        .iter()
        .map(|t| {
            let text = t.as_ref();
            (is_actionable(text), text.chars().count(), text)
        })
        .collect();
    // Stable, so ties stay in arrival order.
    ranked.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));

    ranked
        .into_iter()
        .take(MAX_BULLETS)
        .map(|(_, _, text)| text.trim().chars().take(MAX_BULLET_CHARS).collect())
        .collect()
}
