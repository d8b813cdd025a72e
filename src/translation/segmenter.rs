/*!
 * Sentence segmentation for paragraph text.
 *
 * Text is split at a whitespace character that directly follows `.`, `?` or
 * `!`, unless the terminal looks like part of an abbreviation:
 * - `x.y.` style forms such as "e.g." or "i.e." (word, dot, word, terminal)
 * - a capitalized two-letter form ending in a dot such as "Mr." or "Dr."
 *
 * This is a heuristic. Titles longer than two letters ("Mrs.") still break,
 * and a real sentence ending in a form like "Jo." or "U.S." does not.
 */

use once_cell::sync::Lazy;
use regex::Regex;

static BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.?!]\s").expect("sentence boundary pattern is valid")
});

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether the text ending with `before` (terminal included) must not be split
fn is_abbreviation(before: &str) -> bool {
    let mut tail = before.chars().rev();
    let terminal = tail.next();
    let c2 = tail.next();
    let c3 = tail.next();
    let c4 = tail.next();

    // "e.g." / "i.e."
    let dotted = matches!((c4, c3, c2), (Some(a), Some('.'), Some(b)) if is_word_char(a) && is_word_char(b));
    // "Mr." / "Dr."
    let titled = matches!((c3, c2, terminal), (Some(a), Some(b), Some('.')) if a.is_ascii_uppercase() && b.is_ascii_lowercase());

    dotted || titled
}

/// Split text into trimmed, non-empty sentences in order
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in BOUNDARY.find_iter(text) {
        // The match is an ASCII terminal plus one whitespace character
        let terminal_end = boundary.start() + 1;
        if is_abbreviation(&text[..terminal_end]) {
            continue;
        }
        push_trimmed(&mut sentences, &text[start..terminal_end]);
        start = boundary.end();
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}
