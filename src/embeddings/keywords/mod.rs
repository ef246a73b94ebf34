#[cfg(test)]
mod tests;

use fancy_regex::Regex;
use std::sync::LazyLock;

/// Shorter tokens are dropped
const MIN_TOKEN_CHARS: usize = 3;

// ASCII word characters only, matching the `\W` class of the GitHub UI script
static NON_WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));

/// Build the keyword set for a repository.
///
/// Topics come first, followed by the lowercased tokens of `name` and
/// `description` longer than two characters. Duplicates are dropped and
/// first-seen order is kept.
#[inline]
pub fn extract_keywords(topics: &[String], name: &str, description: Option<&str>) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::with_capacity(topics.len() + 8);

    for topic in topics {
        push_unique(&mut keywords, topic);
    }

    let text = format!("{} {}", name, description.unwrap_or_default()).to_lowercase();
    let text = NON_WORD_REGEX.replace_all(&text, " ");

    for token in text.split_whitespace() {
        if token.chars().count() >= MIN_TOKEN_CHARS {
            push_unique(&mut keywords, token);
        }
    }

    keywords
}

fn push_unique(keywords: &mut Vec<String>, keyword: &str) {
    if !keywords.iter().any(|k| k == keyword) {
        keywords.push(keyword.to_string());
    }
}
