/// Collapses every whitespace run to a single space and trims the ends.
///
/// The ASCII information separators U+001C..U+001F count as whitespace too;
/// PDF text layers sometimes carry them between words.
pub fn normalize_whitespace(text: &str) -> String {
    text.split(is_collapsible_whitespace)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_collapsible_whitespace(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '\u{1c}'..='\u{1f}')
}

/// Splits text into sentences after `.`, `!` or `?` followed by whitespace.
///
/// This is a punctuation heuristic, not a sentence-boundary detector:
/// `"Dr. Smith"` and `"costs 3. 5 euros"` both split after the period.
/// Joining the result with single spaces gives back `normalize_whitespace(text)`.
pub fn segment(text: &str) -> Vec<String> {
    let collapsed = normalize_whitespace(text);
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut previous = None;

    for (index, ch) in collapsed.char_indices() {
        if ch == ' ' && previous.is_some_and(is_sentence_terminal) {
            sentences.push(collapsed[start..index].to_string());
            start = index + 1;
        }
        previous = Some(ch);
    }

    if start < collapsed.len() {
        sentences.push(collapsed[start..].to_string());
    }

    sentences
}

fn is_sentence_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}
