use crate::models::HighlightMarkers;
use crate::normalize::normalize;
use regex::{Regex, RegexBuilder};

/// Decides whether a sentence contains the query and marks where it does.
///
/// Matching runs on normalized text, so it ignores accents and case.
/// Highlighting runs on the raw sentence with a case-insensitive literal scan
/// of the raw query; it does not fold accents. When the two disagree (query
/// `cafe`, sentence `Café`) the sentence is still a match but comes back
/// without markers.
#[derive(Debug, Clone)]
pub struct Matcher {
    normalized_query: String,
    literal: Option<Regex>,
    markers: HighlightMarkers,
}

impl Matcher {
    pub fn new(query: &str, markers: HighlightMarkers) -> Self {
        let literal = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .ok();

        Self {
            normalized_query: normalize(query),
            literal,
            markers,
        }
    }

    pub fn is_match(&self, sentence: &str) -> bool {
        !self.normalized_query.is_empty() && normalize(sentence).contains(&self.normalized_query)
    }

    pub fn highlight(&self, sentence: &str) -> Option<String> {
        if !self.is_match(sentence) {
            return None;
        }

        let Some(literal) = &self.literal else {
            return Some(sentence.to_string());
        };

        let mut highlighted = String::with_capacity(sentence.len());
        let mut cursor = 0;
        for found in literal.find_iter(sentence) {
            highlighted.push_str(&sentence[cursor..found.start()]);
            highlighted.push_str(&self.markers.open);
            highlighted.push_str(found.as_str());
            highlighted.push_str(&self.markers.close);
            cursor = found.end();
        }
        highlighted.push_str(&sentence[cursor..]);

        Some(highlighted)
    }

    /// Highlighted form of every matching sentence, in input order.
    pub fn matching_sentences<I, S>(&self, sentences: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        sentences
            .into_iter()
            .filter_map(|sentence| self.highlight(sentence.as_ref()))
            .collect()
    }
}
