use super::*;

fn topics(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[test]
fn name_description_and_topics() {
    let keywords = extract_keywords(&topics(&["cli", "go"]), "My-Repo!", Some("A cool tool"));

    for expected in ["cli", "go", "repo", "cool", "tool"] {
        assert!(
            keywords.iter().any(|k| k == expected),
            "missing {expected} in {keywords:?}"
        );
    }
    assert!(!keywords.iter().any(|k| k == "my"));
    assert!(!keywords.iter().any(|k| k == "a"));
    assert_eq!(keywords, vec!["cli", "go", "repo", "cool", "tool"]);
}

#[test]
fn short_topics_are_kept() {
    // Length filtering only applies to name/description tokens
    let keywords = extract_keywords(&topics(&["ai"]), "x", None);
    assert_eq!(keywords, vec!["ai"]);
}

#[test]
fn missing_description() {
    let keywords = extract_keywords(&[], "terraform_modules", None);
    assert_eq!(keywords, vec!["terraform_modules"]);
}

#[test]
fn duplicates_are_collapsed() {
    let keywords = extract_keywords(
        &topics(&["rust", "parser"]),
        "rust-parser",
        Some("A Rust parser for RUST sources; parser combinators."),
    );
    assert_eq!(
        keywords,
        vec!["rust", "parser", "for", "sources", "combinators"]
    );
}

#[test]
fn non_ascii_punctuation_splits_tokens() {
    let keywords = extract_keywords(&[], "docs", Some("café—menu/api v2.0"));
    assert_eq!(keywords, vec!["docs", "caf", "menu", "api"]);
}
