//! Keyword highlighting: marks every non-overlapping, longest-match keyword
//! occurrence inside generated text.
//!
//! Algorithm:
//! 1. Scan case-insensitively for each keyword as a literal (regex-escaped).
//! 2. Drop any hit weakly contained in a strictly longer hit.
//! 3. Dedupe identical spans, keeping the first keyword that produced it.
//! 4. Sort by start; walk left to right, skipping hits behind the cursor.

use std::collections::HashSet;

use regex::RegexBuilder;
use serde::Serialize;
use tracing::warn;

/// One piece of highlighted output. Concatenating every segment's text in order
/// reproduces the input exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Plain { text: String },
    Match { text: String, keyword: String },
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Segment::Plain { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Segment::Plain { text } | Segment::Match { text, .. } => text,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Segment::Match { .. })
    }
}

#[derive(Debug)]
struct Hit<'k> {
    start: usize,
    end: usize,
    keyword: &'k str,
}

impl Hit<'_> {
    fn len(&self) -> usize {
        self.end - self.start
    }

    fn within(&self, other: &Hit<'_>) -> bool {
        other.start <= self.start && other.end >= self.end
    }
}

pub fn highlight<S: AsRef<str>>(text: &str, keywords: &[S]) -> Vec<Segment> {
    if text.is_empty() || keywords.is_empty() {
        return vec![Segment::plain(text)];
    }

    let hits = find_hits(text, keywords);

    let longest: Vec<&Hit> = hits
        .iter()
        .filter(|a| !hits.iter().any(|b| b.len() > a.len() && a.within(b)))
        .collect();

    let mut seen = HashSet::new();
    let mut unique: Vec<&Hit> = longest
        .into_iter()
        .filter(|h| seen.insert((h.start, h.end)))
        .collect();
    unique.sort_by_key(|h| h.start);

    let mut segments = Vec::with_capacity(unique.len() * 2 + 1);
    let mut cursor = 0;
    for hit in unique {
        if hit.start < cursor {
            continue;
        }
        if hit.start > cursor {
            segments.push(Segment::plain(&text[cursor..hit.start]));
        }
        segments.push(Segment::Match {
            text: text[hit.start..hit.end].to_string(),
            keyword: hit.keyword.to_string(),
        });
        cursor = hit.end;
    }
    if cursor < text.len() || segments.is_empty() {
        segments.push(Segment::plain(&text[cursor..]));
    }
    segments
}

fn find_hits<'k, S: AsRef<str>>(text: &str, keywords: &'k [S]) -> Vec<Hit<'k>> {
    let mut hits = Vec::new();
    for keyword in keywords.iter().map(AsRef::<str>::as_ref) {
        if keyword.is_empty() {
            continue;
        }
        let pattern = match RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
        {
            Ok(p) => p,
            Err(e) => {
                warn!("Skipping keyword {keyword:?} for highlighting: {e}");
                continue;
            }
        };
        hits.extend(pattern.find_iter(text).map(|m| Hit {
            start: m.start(),
            end: m.end(),
            keyword,
        }));
    }
    hits
}

/// The keywords that occur anywhere in `text`, ignoring case, in input order.
pub fn keywords_in_text<'k, S: AsRef<str>>(text: &str, keywords: &'k [S]) -> Vec<&'k str> {
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|k| !k.is_empty() && lowered.contains(&k.to_lowercase()))
        .collect()
}

/// Full Unicode case-insensitive equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebuild(segments: &[Segment]) -> String {
        segments.iter().map(Segment::text).collect()
    }

    fn matched(segments: &[Segment]) -> Vec<&str> {
        segments
            .iter()
            .filter(|s| s.is_match())
            .map(Segment::text)
            .collect()
    }

    #[test]
    fn test_concatenation_reproduces_input() {
        let cases: &[(&str, &[&str])] = &[
            ("Gold Ring, Gold Band, Wedding Gift", &["gold", "gold ring", "gift"]),
            ("aaaa", &["a", "aa"]),
            ("no matches here", &["zebra"]),
            ("Café crème brûlée", &["CRÈME", "é"]),
            ("ends with ring", &["ring"]),
            ("ring starts", &["ring"]),
            ("", &["x"]),
        ];
        for &(text, keywords) in cases {
            let segments = highlight(text, keywords);
            assert_eq!(rebuild(&segments), text, "lost characters for {text:?}");
        }
    }

    #[test]
    fn test_longer_keyword_wins_over_contained_one() {
        let segments = highlight("Minimalist gold ring for her", &["ring", "gold ring"]);
        assert_eq!(matched(&segments), vec!["gold ring"]);
        assert_eq!(
            segments[1],
            Segment::Match {
                text: "gold ring".to_string(),
                keyword: "gold ring".to_string(),
            }
        );
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let segments = highlight("A thoughtful gift for mom", &["Gift"]);
        assert_eq!(
            segments,
            vec![
                Segment::plain("A thoughtful "),
                Segment::Match {
                    text: "gift".to_string(),
                    keyword: "Gift".to_string(),
                },
                Segment::plain(" for mom"),
            ]
        );
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let segments = highlight("Size 8.5 (US) ring, size 835", &["8.5 (US)"]);
        assert_eq!(matched(&segments), vec!["8.5 (US)"]);
    }

    #[test]
    fn test_matches_inside_words() {
        let segments = highlight("Handmade earrings", &["ring"]);
        assert_eq!(matched(&segments), vec!["ring"]);
    }

    #[test]
    fn test_empty_inputs_return_single_plain_segment() {
        let none: [&str; 0] = [];
        assert_eq!(highlight("Oak sign", &none), vec![Segment::plain("Oak sign")]);
        assert_eq!(highlight("", &["oak"]), vec![Segment::plain("")]);
    }

    #[test]
    fn test_empty_keyword_is_ignored() {
        let segments = highlight("Oak sign", &["", "oak"]);
        assert_eq!(matched(&segments), vec!["Oak"]);
        assert_eq!(rebuild(&segments), "Oak sign");
    }

    #[test]
    fn test_identical_spans_are_emitted_once() {
        let segments = highlight("Boho Decor", &["boho", "BOHO"]);
        assert_eq!(matched(&segments), vec!["Boho"]);
        assert_eq!(
            segments[0],
            Segment::Match {
                text: "Boho".to_string(),
                keyword: "boho".to_string(),
            }
        );
    }

    #[test]
    fn test_partial_overlap_first_by_start_wins() {
        // "wood sign" and "sign post" overlap on "sign" without containment.
        let segments = highlight("wood sign post", &["sign post", "wood sign"]);
        assert_eq!(matched(&segments), vec!["wood sign"]);
        assert_eq!(rebuild(&segments), "wood sign post");
    }

    #[test]
    fn test_repeated_occurrences_all_marked() {
        let segments = highlight("Gift box, gift tag, GIFT", &["gift"]);
        assert_eq!(matched(&segments), vec!["Gift", "gift", "GIFT"]);
    }

    #[test]
    fn test_keywords_in_text_ignores_case() {
        let keywords = ["Gold Ring", "wedding band", "", "gift"];
        let used = keywords_in_text("Dainty gold ring, perfect GIFT", &keywords);
        assert_eq!(used, vec!["Gold Ring", "gift"]);
    }

    #[test]
    fn test_eq_ignore_case_folds_non_ascii() {
        assert!(eq_ignore_case("CAFÉ MUG", "café mug"));
        assert!(eq_ignore_case("Straße", "STRAßE"));
        assert!(!eq_ignore_case("café mug", "cafe mug"));
    }
}
