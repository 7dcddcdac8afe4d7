//! Sentence-aware word chunker.
//!
//! Splits a source document into bounded-size chunks for independent
//! embedding. A "token" here is one whitespace-delimited word, not a model
//! subword token; the cap bounds embedding cost per chunk while sentence
//! boundaries keep chunks semantically coherent.

use std::collections::HashSet;

pub const DEFAULT_MAX_TOKENS: usize = 32;

/// Tokens that contain a `.` but never terminate a sentence.
pub const DEFAULT_SENTENCE_EXCEPTIONS: &[&str] = &[
    "Ph.D.", "J.D.", "M.D.", "Dr.", "Mr.", "Mrs.", "Ms.", "e.g.", "i.e.",
];

/// Per-token boundary bookkeeping while filling one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundaryState {
    /// No sentence-terminal word seen yet in this chunk.
    Scanning,
    /// At least one sentence end seen; the next chunk restarts after it.
    SentenceSeen,
}

/// Deterministic splitter over whitespace-tokenized words.
///
/// Pure and total: any input string yields a finite chunk list, empty input
/// yields an empty list. Each call re-splits from scratch.
#[derive(Debug, Clone)]
pub struct Chunker {
    max_tokens: usize,
    sentence_exceptions: HashSet<String>,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS)
    }
}

impl Chunker {
    /// Create a chunker with the given per-chunk word budget and the default
    /// sentence-exception list. `max_tokens` must be positive.
    pub fn new(max_tokens: usize) -> Self {
        assert!(max_tokens > 0, "max_tokens must be > 0");
        Self {
            max_tokens,
            sentence_exceptions: DEFAULT_SENTENCE_EXCEPTIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Replace the sentence-exception set.
    pub fn with_exceptions<I, S>(mut self, exceptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sentence_exceptions = exceptions.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// A word terminates a sentence when it contains `.` and is not an
    /// exception (exact token match, e.g. "Ph.D.").
    fn is_sentence_end(&self, token: &str) -> bool {
        token.contains('.') && !self.sentence_exceptions.contains(token)
    }

    /// Split `text` into ordered, non-empty chunks of at most `max_tokens`
    /// words each.
    ///
    /// Each chunk fills word-by-word up to the cap. If a sentence-terminal
    /// word (other than the last token examined for this chunk) was passed,
    /// the next chunk restarts right after the last such word — tokens
    /// between that boundary and the cap are scanned again into the next
    /// chunk. This duplication reproduces the reference behavior and is
    /// relied on by downstream ranking; do not collapse it.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < tokens.len() {
            let end = usize::min(start + self.max_tokens, tokens.len());
            let mut state = BoundaryState::Scanning;
            let mut restart = end;

            for (i, token) in tokens[start..end].iter().enumerate() {
                let idx = start + i;
                // The last token examined never marks a boundary: a chunk
                // that ends exactly on a sentence end needs no restart.
                if idx + 1 < end && self.is_sentence_end(token) {
                    state = BoundaryState::SentenceSeen;
                    restart = idx + 1;
                }
            }

            chunks.push(tokens[start..end].join(" "));
            start = match state {
                BoundaryState::SentenceSeen => restart,
                BoundaryState::Scanning => end,
            };
        }

        chunks
    }
}
