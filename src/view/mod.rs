//! Presenters
//!
//! Each presenter is a [`Render`](crate::runner::Render) impl that reads a
//! machine's state and fills the frame's [`Scene`](crate::scene::Scene). No
//! presenter mutates the machine it draws.

pub mod digit_span;
pub mod dsst;
pub mod feelings;
pub mod pvt;
pub mod shell;
pub mod sleepiness;

use crate::scene::TextSize;

/// Greedy word wrap at `max_width` logical pixels.
///
/// Words wider than a whole line are hard-broken across lines.
pub fn wrap_text(text: &str, max_width: f32, size: TextSize) -> Vec<String> {
    let per_line = ((max_width / size.char_width()).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > per_line {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(per_line).peekable();
            while let Some(chunk) = chunks.next() {
                let piece: String = chunk.iter().collect();
                if chunks.peek().is_some() {
                    lines.push(piece);
                } else {
                    current = piece;
                }
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word_len <= per_line {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Number of whole lines that fit in `height`
pub fn visible_lines(height: f32, size: TextSize) -> usize {
    if height <= 0.0 {
        return 0;
    }
    (height / size.line_height()).floor() as usize
}

/// Digits rendered as a spaced string, e.g. `3 1 4`
pub(crate) fn spaced_digits(digits: &[u8]) -> String {
    digits
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wrap_breaks_on_word_boundaries() {
        // Normal text advances 13px per char: 130px fits ten characters
        let lines = wrap_text("the quick brown fox jumps", 130.0, TextSize::Normal);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_wrap_hard_breaks_long_words() {
        let lines = wrap_text("ok abcdefghijklmnopqrstuvwxy z", 130.0, TextSize::Normal);
        assert_eq!(lines, vec!["ok", "abcdefghij", "klmnopqrst", "uvwxy z"]);
    }

    #[test]
    fn test_wrap_empty_and_whitespace() {
        assert!(wrap_text("", 100.0, TextSize::Normal).is_empty());
        assert!(wrap_text("   ", 100.0, TextSize::Normal).is_empty());
    }

    #[test]
    fn test_visible_lines() {
        assert_eq!(visible_lines(80.0, TextSize::Normal), 3);
        assert_eq!(visible_lines(25.0, TextSize::Normal), 0);
        assert_eq!(visible_lines(-1.0, TextSize::Normal), 0);
    }

    #[test]
    fn test_spaced_digits() {
        assert_eq!(spaced_digits(&[3, 1, 4]), "3 1 4");
        assert_eq!(spaced_digits(&[]), "");
    }
}
