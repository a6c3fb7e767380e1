//! Span indexer: segments document text into addressable reading units
//!
//! Builds an immutable, offset-addressed index of sentences and words over a
//! text snapshot. All offsets are half-open `[start, end)` ranges counted in
//! **code points** (not bytes), because that is the unit the narration
//! capability reports word boundaries in.
//!
//! Segmentation is a punctuation heuristic, not linguistics: a sentence ends
//! at a maximal run of ASCII `.` `!` `?`, optionally followed by ASCII closing
//! quotes/brackets, when the run is followed by whitespace or end-of-text.
//! Non-ASCII terminators are treated as ordinary text; that is a documented
//! limitation of the heuristic.

use serde::{Deserialize, Serialize};

/// Kind of a reading unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Sentence,
    Word,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKind::Sentence => write!(f, "sentence"),
            UnitKind::Word => write!(f, "word"),
        }
    }
}

/// A sentence or word with its position in the source text
///
/// Ids are sequential per kind, starting at 0. Word ids increase monotonically
/// across the whole document, not per sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingUnit {
    pub id: usize,
    pub kind: UnitKind,
    /// Start offset in code points, inclusive
    pub start: usize,
    /// End offset in code points, exclusive
    pub end: usize,
    /// Owning sentence id; `None` for sentence units
    pub parent_sentence: Option<usize>,
    /// Unit text, trimmed of surrounding whitespace (offsets are untrimmed)
    pub text: String,
}

/// Immutable index of reading units over one text snapshot
///
/// Built once per playback session and never mutated; an edit produces a
/// whole new index. Safe to share behind an `Arc` and read concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanIndex {
    sentences: Vec<ReadingUnit>,
    words: Vec<ReadingUnit>,
    source_text: String,
    char_len: usize,
}

/// Sentence-terminating punctuation (ASCII only, by design)
fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Closing quotes/brackets that may trail a terminator run
fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '}')
}

impl SpanIndex {
    /// Build an index over `text`
    ///
    /// Deterministic and O(n); equal inputs produce identical indices.
    /// Empty or whitespace-only input yields an index with zero units.
    pub fn build(text: &str) -> SpanIndex {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();

        let mut index = SpanIndex {
            sentences: Vec::new(),
            words: Vec::new(),
            source_text: text.to_string(),
            char_len: n,
        };

        let mut run_start = 0;
        let mut i = 0;
        while i < n {
            if !is_terminator(chars[i]) {
                i += 1;
                continue;
            }

            // Maximal terminator run, so "?!" and "..." are one boundary.
            while i < n && is_terminator(chars[i]) {
                i += 1;
            }
            while i < n && is_closer(chars[i]) {
                i += 1;
            }

            // Only a boundary when followed by whitespace or end-of-text;
            // "3.14" keeps scanning.
            if i < n && !chars[i].is_whitespace() {
                continue;
            }
            while i < n && chars[i].is_whitespace() {
                i += 1;
            }

            index.push_sentence(&chars, run_start, i);
            run_start = i;
        }

        // Trailing non-terminated remainder becomes a final sentence.
        if run_start < n {
            index.push_sentence(&chars, run_start, n);
        }

        index
    }

    /// Append a sentence unit for `chars[start..end)` plus its word units
    ///
    /// Whitespace-only runs are dropped rather than emitted as empty units.
    fn push_sentence(&mut self, chars: &[char], start: usize, end: usize) {
        let mut trim_start = start;
        while trim_start < end && chars[trim_start].is_whitespace() {
            trim_start += 1;
        }
        if trim_start == end {
            return;
        }
        let mut trim_end = end;
        while trim_end > trim_start && chars[trim_end - 1].is_whitespace() {
            trim_end -= 1;
        }

        let sentence_id = self.sentences.len();
        self.sentences.push(ReadingUnit {
            id: sentence_id,
            kind: UnitKind::Sentence,
            start,
            end,
            parent_sentence: None,
            text: chars[trim_start..trim_end].iter().collect(),
        });

        // Whitespace-delimited tokens, offsets excluding the whitespace.
        let mut w = start;
        while w < end {
            if chars[w].is_whitespace() {
                w += 1;
                continue;
            }
            let word_start = w;
            while w < end && !chars[w].is_whitespace() {
                w += 1;
            }
            self.words.push(ReadingUnit {
                id: self.words.len(),
                kind: UnitKind::Word,
                start: word_start,
                end: w,
                parent_sentence: Some(sentence_id),
                text: chars[word_start..w].iter().collect(),
            });
        }
    }

    /// Word unit whose span contains `offset`
    ///
    /// A unit that starts exactly at `offset` wins over one that merely
    /// covers it. Offsets falling in whitespace between words match nothing.
    pub fn word_at(&self, offset: usize) -> Option<&ReadingUnit> {
        let idx = self.words.partition_point(|w| w.start <= offset);
        if idx == 0 {
            return None;
        }
        let word = &self.words[idx - 1];
        (offset < word.end).then_some(word)
    }

    /// Sentence unit whose span contains `offset`
    ///
    /// Sentence spans tile the text, so any in-range offset matches. Offsets
    /// at or beyond the end of the text snap to the last sentence.
    pub fn sentence_at(&self, offset: usize) -> Option<&ReadingUnit> {
        let idx = self.sentences.partition_point(|s| s.start <= offset);
        if idx == 0 {
            return self.sentences.first();
        }
        let sentence = &self.sentences[idx - 1];
        if offset < sentence.end {
            Some(sentence)
        } else {
            self.sentences.last()
        }
    }

    /// Sentence unit by id
    pub fn sentence(&self, id: usize) -> Option<&ReadingUnit> {
        self.sentences.get(id)
    }

    /// Word unit by id
    pub fn word(&self, id: usize) -> Option<&ReadingUnit> {
        self.words.get(id)
    }

    /// Source text from the given code-point offset to the end
    ///
    /// This is the resynthesis suffix: the text resubmitted to narration when
    /// playback restarts at a sentence.
    pub fn suffix_from(&self, char_offset: usize) -> &str {
        match self.source_text.char_indices().nth(char_offset) {
            Some((byte, _)) => &self.source_text[byte..],
            None => "",
        }
    }

    pub fn sentences(&self) -> &[ReadingUnit] {
        &self.sentences
    }

    pub fn words(&self) -> &[ReadingUnit] {
        &self.words
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Length of the source text in code points
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// True when the text produced no reading units
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_sentence_scenario() {
        let index = SpanIndex::build("First sentence. Second sentence.");

        assert_eq!(index.sentences().len(), 2);
        let first = &index.sentences()[0];
        assert_eq!((first.start, first.end), (0, 16));
        assert_eq!(first.text, "First sentence.");

        let second = &index.sentences()[1];
        assert_eq!((second.start, second.end), (16, 32));
        assert_eq!(second.text, "Second sentence.");

        let ids: Vec<usize> = index.words().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(index.words()[2].text, "Second");
        assert_eq!(index.words()[2].parent_sentence, Some(1));
    }

    #[test]
    fn build_is_deterministic() {
        let text = "One. Two! Three? And a trailing remainder";
        assert_eq!(SpanIndex::build(text), SpanIndex::build(text));
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert!(SpanIndex::build("").is_empty());
        let ws = SpanIndex::build("   \n\t  ");
        assert!(ws.is_empty());
        assert!(ws.words().is_empty());
    }

    #[test]
    fn no_terminator_is_one_sentence() {
        let index = SpanIndex::build("no punctuation here");
        assert_eq!(index.sentences().len(), 1);
        assert_eq!(index.sentences()[0].text, "no punctuation here");
        assert_eq!(index.words().len(), 3);
    }

    #[test]
    fn consecutive_terminators_collapse() {
        let index = SpanIndex::build("Really?! Yes... definitely.");
        let texts: Vec<&str> = index.sentences().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Really?!", "Yes... definitely."]);
    }

    #[test]
    fn closing_quote_after_terminator() {
        let index = SpanIndex::build("He said \"Stop!\" Then he left.");
        assert_eq!(index.sentences().len(), 2);
        assert_eq!(index.sentences()[0].text, "He said \"Stop!\"");
        assert_eq!(index.sentences()[1].text, "Then he left.");
    }

    #[test]
    fn decimal_point_is_not_a_boundary() {
        let index = SpanIndex::build("Pi is 3.14 roughly. Indeed.");
        assert_eq!(index.sentences().len(), 2);
        assert_eq!(index.sentences()[0].text, "Pi is 3.14 roughly.");
    }

    #[test]
    fn word_spans_nest_in_sentence_spans() {
        let index = SpanIndex::build("Alpha beta. Gamma delta epsilon! Zeta");
        for word in index.words() {
            let sentence = index.sentence(word.parent_sentence.unwrap()).unwrap();
            assert!(sentence.start <= word.start && word.end <= sentence.end);
            assert!(word.start < word.end);
        }
        // In order and non-overlapping per kind.
        for pair in index.words().windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        for pair in index.sentences().windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn word_lookup_prefers_unit_starting_at_offset() {
        let index = SpanIndex::build("Hello world");
        // "world" spans [6, 11)
        let word = index.word_at(6).unwrap();
        assert_eq!(word.text, "world");
        assert_eq!((word.start, word.end), (6, 11));

        // Mid-word offsets resolve to the covering unit.
        assert_eq!(index.word_at(8).unwrap().text, "world");
        // Whitespace gap matches nothing.
        assert!(index.word_at(5).is_none());
        // Past the end matches nothing.
        assert!(index.word_at(11).is_none());
    }

    #[test]
    fn sentence_lookup_snaps_past_end() {
        let index = SpanIndex::build("One. Two.");
        assert_eq!(index.sentence_at(0).unwrap().id, 0);
        assert_eq!(index.sentence_at(5).unwrap().id, 1);
        assert_eq!(index.sentence_at(999).unwrap().id, 1);
    }

    #[test]
    fn offsets_are_code_points_not_bytes() {
        // "héllo" is 5 code points but 6 bytes.
        let index = SpanIndex::build("héllo wörld. Next.");
        let word = index.word_at(6).unwrap();
        assert_eq!(word.text, "wörld.");
        assert_eq!(index.suffix_from(13), "Next.");
    }

    #[test]
    fn suffix_from_sentence_start() {
        let index = SpanIndex::build("First sentence. Second sentence.");
        let second = &index.sentences()[1];
        assert_eq!(index.suffix_from(second.start), "Second sentence.");
        assert_eq!(index.suffix_from(0), index.source_text());
        assert_eq!(index.suffix_from(1000), "");
    }
}
