//! `@email` mention extraction from free-form notification text.

use std::sync::LazyLock;

use regex::Regex;

/// An `@` followed by an RFC 5322 style address: dot-atom or quoted local
/// part, then a hostname or bracketed IP literal.
static MENTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r##"(?i)@("##,
        r##"(?:[a-z0-9!#$%\&'*+/=?^_`{|}\~-]+(?:\.[a-z0-9!#$%\&'*+/=?^_`{|}\~-]+)*"##,
        r##"|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")"##,
        r##"@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?"##,
        r##"|\[(?:(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])\.){3}"##,
        r##"(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9]"##,
        r##"|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\]))"##,
    ))
    .expect("invalid mention pattern")
});

/// Returns the addresses mentioned in `text`, without the leading `@`, in
/// order of first appearance and without duplicates.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut mentions: Vec<String> = MENTION_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    dedup_preserving_order(&mut mentions);
    mentions
}

/// Removes repeated entries, keeping the first occurrence of each.
pub fn dedup_preserving_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::with_capacity(items.len());
    items.retain(|item| seen.insert(item.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_mentions_in_order() {
        let text = "Hello students! @studentagnes@gmail.com @studentmiche@gmail.com";
        assert_eq!(
            extract_mentions(text),
            vec!["studentagnes@gmail.com", "studentmiche@gmail.com"]
        );
    }

    #[test]
    fn ignores_bare_addresses_without_mention_marker() {
        assert!(extract_mentions("mail studentjon@gmail.com directly").is_empty());
    }

    #[test]
    fn empty_text_has_no_mentions() {
        assert!(extract_mentions("").is_empty());
        assert!(extract_mentions("   ").is_empty());
    }

    #[test]
    fn repeated_mentions_collapse() {
        let text = "@a@x.com and again @b@x.com then @a@x.com";
        assert_eq!(extract_mentions(text), vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn matches_case_insensitively_keeping_original_case() {
        assert_eq!(extract_mentions("hi @Student.One@Example.COM!"), vec![
            "Student.One@Example.COM"
        ]);
    }

    #[test]
    fn accepts_quoted_local_part_and_ip_literal() {
        assert_eq!(extract_mentions(r#"ping @"first.last"@x.com"#), vec![
            r#""first.last"@x.com"#
        ]);
        assert_eq!(extract_mentions("ping @ops@[192.168.0.1] now"), vec![
            "ops@[192.168.0.1]"
        ]);
    }

    #[test]
    fn stops_at_trailing_punctuation() {
        assert_eq!(extract_mentions("thanks @s@school.edu."), vec!["s@school.edu"]);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mut items = vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "a".to_string(),
        ];
        dedup_preserving_order(&mut items);
        assert_eq!(items, vec!["b", "a", "c"]);
    }
}
