//! Which vocabulary words are searchable.

use crate::config::HitConfig;
use anyhow::Result;
use regex::Regex;

const NUMBER: &str = "[0-9]";
const ENGLISH: &str = "[a-zA-Z]";
const HIRAGANA: &str = "[ぁ-ん]";
const KATAKANA: &str = "[ァ-ヴ]";
const KANJI: &str = "[\u{2E80}-\u{2E99}\u{2E9B}-\u{2EF3}\u{2F00}-\u{2FD5}\u{3005}\u{3007}\u{3021}-\u{3029}\u{3038}-\u{303B}\u{3400}-\u{4DB5}\u{4E00}-\u{9FC3}\u{F900}-\u{FA2D}\u{FA30}-\u{FA6A}\u{FA70}-\u{FAD9}]";

/// Word predicate built from `[search.hit]`.
#[derive(Debug, Clone)]
pub struct HitMatcher {
    min_length: usize,
    pattern: Option<Regex>,
}

impl HitMatcher {
    pub fn new(config: &HitConfig) -> Result<Self> {
        let classes: Vec<_> = [
            (config.number, NUMBER),
            (config.english, ENGLISH),
            (config.hiragana, HIRAGANA),
            (config.katakana, KATAKANA),
            (config.kanji, KANJI),
        ]
        .into_iter()
        .filter_map(|(enabled, class)| enabled.then_some(class))
        .collect();

        let pattern = if classes.is_empty() {
            None
        } else {
            Some(Regex::new(&classes.join("|"))?)
        };
        Ok(Self {
            min_length: config.min_length,
            pattern,
        })
    }

    /// Long enough, contains an enabled class, and is not an ellipsis.
    pub fn is_hit(&self, word: &str) -> bool {
        let Some(pattern) = &self.pattern else {
            return false;
        };
        word != "..." && word.chars().count() >= self.min_length && pattern.is_match(word)
    }
}
