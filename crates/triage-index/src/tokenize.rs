//! Tokenization for the term index — lowercase, alphanumeric word split,
//! English stopword removal, then unigrams plus adjacent-pair bigrams.

use std::collections::HashSet;
use std::sync::OnceLock;

/// English stopwords removed before any n-gram is formed.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "cannot", "could", "dare", "did", "do", "does", "doing", "down", "during",
    "each", "every", "few", "for", "from", "further", "had", "has", "have", "having", "he",
    "her", "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into",
    "is", "it", "its", "itself", "just", "may", "me", "might", "more", "most", "must", "my",
    "myself", "need", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
    "other", "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "shall", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "used", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours",
    "yourself", "yourselves",
];

fn stopword_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

/// Lowercase, split on non-alphanumerics, drop tokens shorter than two
/// characters and stopwords.
pub fn tokenize(text: &str) -> Vec<String> {
    let stop = stopword_set();
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 2 && !stop.contains(w))
        .map(|w| w.to_string())
        .collect()
}

/// Index terms for a text: unigrams plus bigrams over the surviving tokens.
/// Bigram terms join their two tokens with a single space.
pub fn terms(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut out = Vec::with_capacity(tokens.len() * 2);
    out.extend(tokens.iter().cloned());
    for pair in tokens.windows(2) {
        out.push(format!("{} {}", pair[0], pair[1]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_filters_stopwords_and_short_tokens() {
        let tokens = tokenize("How do I reset my password?");
        assert_eq!(tokens, vec!["reset", "password"]);
    }

    #[test]
    fn tokenizer_is_case_insensitive() {
        assert_eq!(tokenize("VPN Client"), tokenize("vpn client"));
    }

    #[test]
    fn terms_include_bigrams() {
        let t = terms("reset your password today");
        assert!(t.contains(&"reset".to_string()));
        assert!(t.contains(&"reset password".to_string()));
        assert!(t.contains(&"password today".to_string()));
    }

    #[test]
    fn bigrams_form_after_stopword_removal() {
        // "the" drops out, so the bigram bridges the gap
        let t = terms("reset the password");
        assert!(t.contains(&"reset password".to_string()));
    }

    #[test]
    fn empty_text_yields_no_terms() {
        assert!(terms("").is_empty());
        assert!(terms("I am so at it").is_empty());
    }
}
