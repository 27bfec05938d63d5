//! Script-aware word segmentation.
//!
//! Text is cut wherever the character class changes:
//!
//! ```text
//! "Rustで書く静的サイト 2024!"
//!  -> ["Rust", "で", "書", "く", "静的", "サイト", " ", "2024", "!"]
//! ```
//!
//! Whitespace runs become a single `" "` token so page snippets can be
//! reassembled from the word list.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Hiragana,
    Katakana,
    Kanji,
    Space,
    Other,
}

/// Kanji ranges, including CJK radicals and iteration marks.
const KANJI: &[(char, char)] = &[
    ('\u{2E80}', '\u{2FDF}'),
    ('\u{3005}', '\u{3005}'),
    ('\u{3007}', '\u{3007}'),
    ('\u{3021}', '\u{3029}'),
    ('\u{3038}', '\u{303B}'),
    ('\u{3400}', '\u{4DBF}'),
    ('\u{4E00}', '\u{9FFF}'),
    ('\u{F900}', '\u{FAFF}'),
];

pub(super) fn in_ranges(c: char, ranges: &[(char, char)]) -> bool {
    ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&c))
}

fn classify(c: char) -> CharClass {
    match c {
        _ if c.is_whitespace() => CharClass::Space,
        '\u{3041}'..='\u{309F}' => CharClass::Hiragana,
        // includes the prolonged sound mark `ー` (U+30FC)
        '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' | '\u{FF66}'..='\u{FF9F}' => {
            CharClass::Katakana
        }
        _ if in_ranges(c, KANJI) => CharClass::Kanji,
        _ if c.is_alphanumeric() => CharClass::Word,
        _ => CharClass::Other,
    }
}

/// Split `text` into runs of one character class.
pub fn segment(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut current: Option<CharClass> = None;

    for (i, c) in text.char_indices() {
        let class = classify(c);
        match current {
            Some(prev) if prev == class => {}
            Some(prev) => {
                push_run(&mut words, &text[start..i], prev);
                start = i;
                current = Some(class);
            }
            None => current = Some(class),
        }
    }
    if let Some(class) = current {
        push_run(&mut words, &text[start..], class);
    }
    words
}

fn push_run(words: &mut Vec<String>, run: &str, class: CharClass) {
    if class == CharClass::Space {
        words.push(" ".to_string());
    } else {
        words.push(run.to_string());
    }
}

/// Drop newlines, collapse whitespace runs, trim.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace(['\n', '\r'], "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_latin() {
        assert_eq!(segment("Hello, world 42"), vec!["Hello", ",", " ", "world", " ", "42"]);
    }

    #[test]
    fn test_segment_japanese() {
        assert_eq!(
            segment("Rustで書く静的サイト"),
            vec!["Rust", "で", "書", "く", "静的", "サイト"]
        );
        assert_eq!(segment("スーパー"), vec!["スーパー"]);
    }

    #[test]
    fn test_whitespace_runs_single_token() {
        assert_eq!(segment("a \t b"), vec!["a", " ", "b"]);
    }

    #[test]
    fn test_punctuation_runs() {
        assert_eq!(segment("wait..."), vec!["wait", "..."]);
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  line one\nline  two \t "), "line oneline two");
        assert_eq!(normalize_text("\n\n"), "");
    }
}
