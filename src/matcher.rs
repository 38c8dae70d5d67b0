use crate::model::Entry;
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32Str};

pub struct FuzzyMatcher {
    matcher: Matcher,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
        }
    }

    /// Scores each of `indices` against `query` by entry name, drops non-matches
    /// and orders the rest by score. Equal scores keep their incoming order.
    pub fn rank(&mut self, query: &str, entries: &[Entry], indices: &[usize]) -> Vec<usize> {
        let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);
        let mut buf = Vec::new();

        let mut scored: Vec<(usize, u32)> = indices
            .iter()
            .filter_map(|&idx| {
                let haystack = Utf32Str::new(&entries[idx].name, &mut buf);
                pattern.score(haystack, &mut self.matcher).map(|score| (idx, score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().map(|(idx, _)| idx).collect()
    }
}
