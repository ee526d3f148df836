//! Title display split: priority keyword chip, the part shoppers see in search
//! results, and the dimmed remainder.

use serde::Serialize;

use crate::highlight::matcher::{highlight, Segment};

/// Characters of a title visible in marketplace search results.
pub const VISIBLE_TITLE_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleDisplay {
    pub priority_chip: Option<String>,
    pub visible: Vec<Segment>,
    pub dimmed: Vec<Segment>,
}

impl TitleDisplay {
    pub fn visible_text(&self) -> String {
        self.visible.iter().map(Segment::text).collect()
    }

    pub fn dimmed_text(&self) -> String {
        self.dimmed.iter().map(Segment::text).collect()
    }
}

pub fn split_title<S: AsRef<str>>(
    title: &str,
    priority_keyword: Option<&str>,
    keywords: &[S],
) -> TitleDisplay {
    let priority = priority_keyword
        .filter(|k| !k.is_empty())
        .and_then(|k| prefix_len_ignore_case(title, k).map(|len| (k, len)));

    let (rest, budget) = match priority {
        Some((keyword, prefix_len)) => (
            &title[prefix_len..],
            VISIBLE_TITLE_CHARS as i64 - keyword.chars().count() as i64,
        ),
        None => (title, VISIBLE_TITLE_CHARS as i64),
    };

    let split = split_point(rest, budget);
    let (visible, dimmed) = rest.split_at(split);

    TitleDisplay {
        priority_chip: priority.map(|(keyword, _)| keyword.to_string()),
        visible: highlight(visible, keywords),
        dimmed: if dimmed.is_empty() {
            Vec::new()
        } else {
            highlight(dimmed, keywords)
        },
    }
}

/// Byte length of the title prefix matching `prefix` case-insensitively, if any.
fn prefix_len_ignore_case(title: &str, prefix: &str) -> Option<usize> {
    let mut title_chars = title.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = title_chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(title_chars.next().map_or(title.len(), |(i, _)| i))
}

/// Byte index where the visible part ends. Backs off to the last space at or
/// before the budget; hard-splits at the budget when there is none.
fn split_point(text: &str, budget: i64) -> usize {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    if (chars.len() as i64) <= budget {
        return text.len();
    }

    let search_upto = budget.max(0) as usize;
    let boundary = chars
        .iter()
        .take(search_upto + 1)
        .rposition(|&(_, c)| c == ' ');

    let char_index = match boundary {
        Some(i) if i > 0 => i,
        _ if budget > 0 => budget as usize,
        _ => 0,
    };
    chars.get(char_index).map_or(text.len(), |&(byte, _)| byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_KEYWORDS: [&str; 0] = [];

    #[test]
    fn test_short_title_with_priority_keyword_is_fully_visible() {
        let display = split_title(
            "Personalized Gift, Wood Sign, Home Decor",
            Some("Personalized Gift"),
            &NO_KEYWORDS,
        );
        assert_eq!(display.priority_chip.as_deref(), Some("Personalized Gift"));
        assert_eq!(display.visible_text(), ", Wood Sign, Home Decor");
        assert!(display.dimmed.is_empty());
        assert!(display.visible_text().chars().count() <= VISIBLE_TITLE_CHARS - 17);
    }

    #[test]
    fn test_priority_keyword_reduces_budget_and_splits_on_space() {
        let display = split_title(
            "Personalized Gift, Custom Wood Sign, Farmhouse Home Decor",
            Some("personalized gift"),
            &NO_KEYWORDS,
        );
        // The chip shows the keyword as the user typed it.
        assert_eq!(display.priority_chip.as_deref(), Some("personalized gift"));
        assert_eq!(display.visible_text(), ", Custom Wood Sign,");
        assert_eq!(display.dimmed_text(), " Farmhouse Home Decor");
        assert!(display.visible_text().chars().count() <= VISIBLE_TITLE_CHARS - 17);
    }

    #[test]
    fn test_without_priority_keyword_budget_is_forty() {
        let title = "Personalized Gift, Custom Wood Sign, Farmhouse Home Decor";
        let display = split_title(title, None, &NO_KEYWORDS);
        assert!(display.priority_chip.is_none());
        assert_eq!(display.visible_text(), "Personalized Gift, Custom Wood Sign,");
        assert_eq!(display.dimmed_text(), " Farmhouse Home Decor");
        assert_eq!(
            format!("{}{}", display.visible_text(), display.dimmed_text()),
            title
        );
    }

    #[test]
    fn test_priority_keyword_not_at_start_is_ignored() {
        let display = split_title("Wood Sign, Personalized Gift", Some("Personalized Gift"), &NO_KEYWORDS);
        assert!(display.priority_chip.is_none());
        assert_eq!(display.visible_text(), "Wood Sign, Personalized Gift");
    }

    #[test]
    fn test_no_space_hard_splits_at_budget() {
        let title = "Supercalifragilisticexpialidocious-handmade-ceramic-mug";
        let display = split_title(title, None, &NO_KEYWORDS);
        assert_eq!(display.visible_text().chars().count(), VISIBLE_TITLE_CHARS);
        assert_eq!(display.dimmed_text(), &title[VISIBLE_TITLE_CHARS..]);
    }

    #[test]
    fn test_non_positive_budget_hides_everything_after_chip() {
        let keyword = "An Extremely Long Priority Keyword Phrase Here";
        let title = format!("{keyword} and more words");
        let display = split_title(&title, Some(keyword), &NO_KEYWORDS);
        assert_eq!(display.priority_chip.as_deref(), Some(keyword));
        // Space at index 0 does not count as a boundary; budget <= 0 splits at 0.
        assert_eq!(display.visible_text(), "");
        assert_eq!(display.dimmed_text(), " and more words");
    }

    #[test]
    fn test_both_parts_are_highlighted() {
        let display = split_title(
            "Oak Wood Sign, Rustic Farmhouse Wall Decor, Housewarming Gift",
            None,
            &["wood sign", "housewarming gift"],
        );
        assert!(display.visible.iter().any(|s| s.text() == "Wood Sign" && s.is_match()));
        assert!(display
            .dimmed
            .iter()
            .any(|s| s.text() == "Housewarming Gift" && s.is_match()));
    }

    #[test]
    fn test_prefix_len_handles_multibyte_characters() {
        assert_eq!(prefix_len_ignore_case("Café Mug", "CAFÉ"), Some("Café".len()));
        assert_eq!(prefix_len_ignore_case("Caf", "Café"), None);
    }
}
