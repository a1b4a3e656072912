//! Mention detection
//!
//! A message mentions a user when it contains `@<name>` as a case-insensitive
//! whole-word match. This is a plain token scan, not a structured mention
//! model: multi-word display names will only match on their first word.

/// Whether `content` contains a whole-word `@name` mention.
pub fn contains_mention(content: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let content_lower = content.to_lowercase();
    let name_lower = name.to_lowercase();

    let mut search_from = 0;
    while let Some(at) = content_lower[search_from..].find('@') {
        let start = search_from + at + 1;
        let candidate = &content_lower[start..];
        if candidate.starts_with(&name_lower) {
            let boundary = candidate[name_lower.len()..].chars().next();
            if !matches!(boundary, Some(c) if c.is_alphanumeric() || c == '_') {
                return true;
            }
        }
        search_from = start;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_mention() {
        assert!(contains_mention("hello @alice", "alice"));
    }

    #[test]
    fn test_word_boundary() {
        assert!(!contains_mention("hello @alicex", "alice"));
        assert!(!contains_mention("hello @alice_2", "alice"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(contains_mention("ping @Alice!", "alice"));
        assert!(contains_mention("ping @alice", "Alice"));
    }

    #[test]
    fn test_mention_followed_by_punctuation() {
        assert!(contains_mention("@alice, got a minute?", "alice"));
        assert!(contains_mention("(cc @alice)", "alice"));
    }

    #[test]
    fn test_no_at_sign() {
        assert!(!contains_mention("alice should see this", "alice"));
    }

    #[test]
    fn test_second_mention_matches() {
        assert!(contains_mention("@bob and @alice", "alice"));
    }

    #[test]
    fn test_empty_name_never_matches() {
        assert!(!contains_mention("hello @", ""));
    }

    #[test]
    fn test_mention_at_end_of_content() {
        assert!(contains_mention("ping @alice", "alice"));
    }
}
