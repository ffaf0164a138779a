//! Text helpers shared by the taxonomy, the normalizer and the relevance scorer.
//!
//! Three views of a string are used:
//! - `normalize_key`: lowercased, trimmed, whitespace collapsed (`"  Spring   Boot "` → `"spring boot"`)
//! - `compact_key`: lowercased alphanumerics plus `+` and `#` (`"Node.js"` → `"nodejs"`, `"C++"` → `"c++"`)
//! - `tokenize`: word tokens with byte spans into the original text

use std::collections::BTreeSet;

/// Minimum similarity for a fuzzy taxonomy match.
pub const FUZZY_THRESHOLD: f64 = 0.8;

/// Compact forms shorter than this are compared by word set only. Below it a
/// single edit usually names a different tool (`Preact`/`React`, `Nuxt.js`/`Next.js`).
pub const FUZZY_EDIT_MIN_LEN: usize = 7;

/// A word token with its byte span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lowercased token text.
    pub text: String,
    pub start: usize,
    pub end: usize,
}

pub fn normalize_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn compact_key(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == '+' || *c == '#')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lowercased alphanumeric word set, used for Jaccard similarity.
pub fn word_set(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

/// Similarity in `[0, 1]`: the better of word-set Jaccard and normalized
/// Damerau-Levenshtein over the compact forms. Edit distance only applies
/// when both compact forms reach `FUZZY_EDIT_MIN_LEN` and share a first character.
pub fn similarity(a: &str, b: &str) -> f64 {
    let token_score = jaccard(&word_set(a), &word_set(b));
    let (ca, cb) = (compact_key(a), compact_key(b));
    let long_enough =
        ca.chars().count() >= FUZZY_EDIT_MIN_LEN && cb.chars().count() >= FUZZY_EDIT_MIN_LEN;
    if !long_enough || ca.chars().next() != cb.chars().next() {
        return token_score;
    }
    token_score.max(strsim::normalized_damerau_levenshtein(&ca, &cb))
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '-' | '/')
}

/// Splits free text into word tokens, keeping `+ # . - /` inside words so
/// `Node.js`, `C++` and `CI/CD` survive as single tokens. Trailing
/// punctuation (`"React."`) is trimmed from the span.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        match (is_token_char(c), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                push_token(text, s, i, &mut tokens);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        push_token(text, s, text.len(), &mut tokens);
    }

    tokens
}

fn push_token(text: &str, start: usize, end: usize, tokens: &mut Vec<Token>) {
    let raw = &text[start..end];
    let trimmed_end = raw.trim_end_matches(&['.', '-', '/'][..]);
    let trimmed = trimmed_end.trim_start_matches(&['-', '/'][..]);
    if trimmed.is_empty() || !trimmed.chars().any(char::is_alphanumeric) {
        return;
    }
    let lead = trimmed_end.len() - trimmed.len();
    let s = start + lead;
    let e = start + trimmed_end.len();
    tokens.push(Token {
        text: text[s..e].to_lowercase(),
        start: s,
        end: e,
    });
}

/// Keywords worth matching between responsibilities and bullets: tokens of
/// at least three characters that are not stop words.
pub fn keywords(text: &str) -> BTreeSet<String> {
    tokenize(text)
        .into_iter()
        .map(|t| t.text)
        .filter(|t| t.chars().count() >= 3 && !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

const STOP_WORDS: &[&str] = &[
    "and", "the", "for", "with", "our", "you", "your", "will", "are", "from", "that", "this",
    "into", "across", "using", "use", "all", "who", "have", "has", "was", "were", "work",
    "working", "team", "teams", "able", "other", "such", "new", "via", "per", "within",
    "their", "them", "they", "its", "over", "more", "not", "can", "etc",
];
