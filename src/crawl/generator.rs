// src/crawl/generator.rs
// =============================================================================
// Query generation: the initial search space and truncation expansion.
//
// Seeding: every two-character string over the alphabet, first character
// as the outer loop, second as the inner loop. For an alphabet of length L
// that is L*L queries, always in the same order.
//
// Expansion: when a query comes back with a full page of results there are
// more names behind it, so one more character is appended. Which
// characters get appended depends on the ExpansionPolicy.
// =============================================================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionPolicy {
    /// Start at the character the last returned name has right after the
    /// query prefix, continue to the end of the alphabet. Assumes the
    /// server returns names in alphabet order.
    #[default]
    ResumeFromLast,
    /// Append every alphabet character. More requests, but nothing is
    /// skipped if the server's ordering differs from the alphabet's.
    FullAlphabet,
}

pub fn seed_queries(alphabet: &[char]) -> Vec<String> {
    let mut queries = Vec::with_capacity(alphabet.len() * alphabet.len());
    for &first in alphabet {
        for &second in alphabet {
            queries.push([first, second].iter().collect());
        }
    }
    queries
}

// Alphabet index to resume expansion from.
//
// Looks at the character of `last_name` just past the query prefix
// (character position = query length in characters). Falls back to the
// start of the alphabet when the name is too short or the character is
// not in the alphabet.
pub fn resume_index(query: &str, last_name: &str, alphabet: &[char]) -> usize {
    let position = query.chars().count();
    last_name
        .chars()
        .nth(position)
        .and_then(|c| alphabet.iter().position(|&a| a == c))
        .unwrap_or(0)
}

// Longer queries to issue for a truncated `query`, in alphabet order
pub fn expansion_queries(
    query: &str,
    names: &[String],
    alphabet: &[char],
    policy: ExpansionPolicy,
) -> Vec<String> {
    let start = match (policy, names.last()) {
        // Names are stored trimmed, so read the resume character the same way
        (ExpansionPolicy::ResumeFromLast, Some(last)) => {
            resume_index(query, last.trim(), alphabet)
        }
        _ => 0,
    };

    alphabet[start..]
        .iter()
        .map(|c| {
            let mut next = String::with_capacity(query.len() + c.len_utf8());
            next.push_str(query);
            next.push(*c);
            next
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_seed_is_full_cross_product_in_order() {
        let queries = seed_queries(&alphabet("abc"));
        assert_eq!(
            queries,
            vec!["aa", "ab", "ac", "ba", "bb", "bc", "ca", "cb", "cc"]
        );
    }

    #[test]
    fn test_seed_size_and_uniqueness() {
        let abc = alphabet(" +-.0123456789abcdefghijklmnopqrstuvwxyz");
        let queries = seed_queries(&abc);
        assert_eq!(queries.len(), 40 * 40);
        assert!(queries.iter().all(|q| q.chars().count() == 2));

        let unique: std::collections::HashSet<_> = queries.iter().collect();
        assert_eq!(unique.len(), queries.len());
        assert_eq!(queries[0], "  ");
        assert_eq!(queries[1], " +");
    }

    #[test]
    fn test_seed_empty_alphabet() {
        assert!(seed_queries(&[]).is_empty());
    }

    #[test]
    fn test_resume_from_middle_of_alphabet() {
        let az = alphabet("abcdefghijklmnopqrstuvwxyz");
        let result = expansion_queries(
            "ab",
            &names(&["abc", "abmorris"]),
            &az,
            ExpansionPolicy::ResumeFromLast,
        );
        assert_eq!(result.len(), 14);
        assert_eq!(result.first().unwrap(), "abm");
        assert_eq!(result.last().unwrap(), "abz");
    }

    #[test]
    fn test_resume_at_last_character() {
        let az = alphabet("abcdefghijklmnopqrstuvwxyz");
        let result = expansion_queries(
            "ab",
            &names(&["abz9"]),
            &az,
            ExpansionPolicy::ResumeFromLast,
        );
        assert_eq!(result, vec!["abz"]);
    }

    #[test]
    fn test_resume_ignores_surrounding_whitespace() {
        let az = alphabet("abcdefghijklmnopqrstuvwxyz");
        let result = expansion_queries(
            "ab",
            &names(&["abc", "  abmorris "]),
            &az,
            ExpansionPolicy::ResumeFromLast,
        );
        assert_eq!(result.first().unwrap(), "abm");
        assert_eq!(result.len(), 14);
    }

    #[test]
    fn test_resume_falls_back_to_start() {
        let az = alphabet("abcdefghijklmnopqrstuvwxyz");
        // Too short to have a character after the prefix
        assert_eq!(resume_index("ab", "ab", &az), 0);
        // Character outside the alphabet
        assert_eq!(resume_index("ab", "ab_x", &az), 0);
    }

    #[test]
    fn test_resume_uses_query_length() {
        let az = alphabet("abcdefghijklmnopqrstuvwxyz");
        // Query of length 3: the 4th character decides
        assert_eq!(resume_index("abc", "abcq", &az), 16);
    }

    #[test]
    fn test_full_alphabet_ignores_last_name() {
        let abc = alphabet("abc");
        let result = expansion_queries("ab", &names(&["abc"]), &abc, ExpansionPolicy::FullAlphabet);
        assert_eq!(result, vec!["aba", "abb", "abc"]);
    }

    #[test]
    fn test_policy_from_settings_text() {
        let policy: ExpansionPolicy = serde_json::from_str("\"full_alphabet\"").unwrap();
        assert_eq!(policy, ExpansionPolicy::FullAlphabet);
        assert_eq!(ExpansionPolicy::default(), ExpansionPolicy::ResumeFromLast);
    }
}
