//! Excerpt shortening for citations.

/// Marker appended when an excerpt is truncated.
const PLACEHOLDER: &str = "...";

/// Collapses whitespace and shortens `text` to at most `max_chars`
/// characters, cutting at a word boundary and appending `...` when anything
/// was dropped. The input is never modified.
#[must_use]
pub fn shorten(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let budget = max_chars.saturating_sub(PLACEHOLDER.chars().count());
    let mut excerpt = String::new();
    let mut used = 0usize;

    for word in collapsed.split(' ') {
        let word_chars = word.chars().count();
        let needed = if excerpt.is_empty() {
            word_chars
        } else {
            word_chars + 1
        };
        if used + needed > budget {
            break;
        }
        if !excerpt.is_empty() {
            excerpt.push(' ');
        }
        excerpt.push_str(word);
        used += needed;
    }

    // A first word longer than the whole budget: hard-cut it.
    if excerpt.is_empty() {
        excerpt = collapsed.chars().take(budget).collect();
    }

    excerpt.push_str(PLACEHOLDER);
    excerpt
}
