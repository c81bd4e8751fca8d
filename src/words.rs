// src/words.rs

//! Word and phrase counting over plain text.
//!
//! [`count`] answers the one-off "how many times does this appear" question.
//! [`WordCounter`] holds a reusable word list for scanning many documents
//! against the same vocabulary, and the module-level registry keeps named
//! counters alive between calls so repeated scans skip the setup cost.
//! Matching is case-insensitive throughout.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Mutex;

use lazy_static::lazy_static;
use serde::Serialize;
use tracing::debug;

lazy_static! {
    static ref REGISTRY: Mutex<HashMap<String, WordCounter>> = Mutex::new(HashMap::new());
}

/// Counts case-insensitive occurrences of `word` in `text`, including
/// occurrences inside longer words. Matches do not overlap.
pub fn count(word: &str, text: &str) -> u64 {
    if word.is_empty() {
        return 0;
    }
    let needle = word.to_lowercase();
    let haystack = text.to_lowercase();
    let mut hits = 0;
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle.as_str()) {
        hits += 1;
        start += pos + needle.len();
    }
    hits
}

/// How scan matches are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Matches must sit on delimiter boundaries.
    #[default]
    Words,
    /// Matches count wherever they occur, even inside longer words.
    Substring,
}

impl MatchMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Words => "words",
            Self::Substring => "substring",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
struct WordEntry {
    word: String,
    lower: String,
    value: i64,
}

/// Per-word result of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct WordHit {
    pub word: String,
    pub hits: u64,
    pub value: i64,
}

/// Aggregate result of one scan: total hit count, summed values of the
/// matched words, and one [`WordHit`] per word that matched at all.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub count: u64,
    pub value: i64,
    pub mode: MatchMode,
    pub matches: Vec<WordHit>,
}

/// A reusable vocabulary scanner. Words carry an optional integer value
/// that accumulates into [`ScanSummary::value`] on every hit, which lets a
/// word list double as a scoring table.
#[derive(Debug, Clone, Default)]
pub struct WordCounter {
    entries: Vec<WordEntry>,
    mode: MatchMode,
    extra_delimiters: HashSet<char>,
    word_chars: HashSet<char>,
}

impl WordCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one word with a value. Empty words are ignored.
    pub fn add_word(&mut self, word: &str, value: i64) {
        if word.is_empty() {
            return;
        }
        self.entries.push(WordEntry {
            word: word.to_string(),
            lower: word.to_lowercase(),
            value,
        });
    }

    /// Adds a batch of words, all valued zero.
    pub fn add_words<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        for word in words {
            self.add_word(word, 0);
        }
    }

    pub fn set_mode(&mut self, mode: MatchMode) {
        self.mode = mode;
    }

    /// Treats each character in `chars` as a word delimiter, on top of the
    /// default rule that anything non-alphanumeric delimits.
    pub fn add_delimiters(&mut self, chars: &str) {
        for c in chars.chars() {
            self.word_chars.remove(&c);
            self.extra_delimiters.insert(c);
        }
    }

    /// Treats each character in `chars` as part of a word, so "e-mail"
    /// scans as one word once '-' is added here.
    pub fn add_word_chars(&mut self, chars: &str) {
        for c in chars.chars() {
            self.extra_delimiters.remove(&c);
            self.word_chars.insert(c);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_delimiter(&self, c: char) -> bool {
        if self.word_chars.contains(&c) {
            return false;
        }
        !c.is_alphanumeric() || self.extra_delimiters.contains(&c)
    }

    /// Scans `text` once. Counters start from zero on every call.
    pub fn scan(&self, text: &str) -> ScanSummary {
        let haystack = text.to_lowercase();
        let mut counters = vec![0u64; self.entries.len()];

        for (i, entry) in self.entries.iter().enumerate() {
            let needle = entry.lower.as_str();
            let mut start = 0;
            while let Some(pos) = haystack[start..].find(needle) {
                let at = start + pos;
                let end = at + needle.len();
                if self.accepts(&haystack, at, end) {
                    counters[i] += 1;
                }
                start = end;
            }
        }

        let mut summary = ScanSummary {
            count: 0,
            value: 0,
            mode: self.mode,
            matches: Vec::new(),
        };
        for (entry, &hits) in self.entries.iter().zip(&counters) {
            if hits == 0 {
                continue;
            }
            summary.count += hits;
            summary.value += entry.value * hits as i64;
            summary.matches.push(WordHit {
                word: entry.word.clone(),
                hits,
                value: entry.value,
            });
        }
        summary
    }

    fn accepts(&self, haystack: &str, at: usize, end: usize) -> bool {
        match self.mode {
            MatchMode::Substring => true,
            MatchMode::Words => {
                let before = haystack[..at].chars().next_back();
                let after = haystack[end..].chars().next();
                before.is_none_or(|c| self.is_delimiter(c))
                    && after.is_none_or(|c| self.is_delimiter(c))
            }
        }
    }
}

// ── Named counter registry ───────────────────────────────────

/// Scans with a cached counter. The first call under a `name` loads `words`
/// into the new counter; later calls reuse the cached vocabulary and ignore
/// the `words` argument, the point being to pay the setup once.
pub fn scan_named(name: &str, words: &[(&str, i64)], text: &str) -> ScanSummary {
    let mut registry = REGISTRY.lock().unwrap_or_else(|e| e.into_inner());
    let counter = registry.entry(name.to_string()).or_insert_with(|| {
        debug!("Caching word counter '{}'", name);
        WordCounter::new()
    });
    if counter.is_empty() {
        for (word, value) in words {
            counter.add_word(word, *value);
        }
    }
    counter.scan(text)
}

/// Drops every cached counter.
pub fn reset() {
    REGISTRY.lock().unwrap_or_else(|e| e.into_inner()).clear();
}

/// Number of counters currently cached.
pub fn cached() -> usize {
    REGISTRY.lock().unwrap_or_else(|e| e.into_inner()).len()
}
