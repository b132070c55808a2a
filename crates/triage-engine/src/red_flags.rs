//! Security red-flag screen.

/// Phrases that mark a query as a potential security incident. Matched as
/// case-insensitive substrings of the raw query, before any retrieval.
const RED_FLAG_PHRASES: [&str; 11] = [
    "data breach",
    "ransomware",
    "account compromised",
    "phishing link clicked",
    "lost laptop",
    "unauthorized access",
    "malware",
    "virus detected",
    "hacked",
    "stolen device",
    "suspicious activity",
];

/// True if the query mentions any security red-flag phrase.
pub fn detect_red_flag(query: &str) -> bool {
    let lower = query.to_lowercase();
    RED_FLAG_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitively_inside_longer_text() {
        assert!(detect_red_flag("I think my Account Compromised yesterday"));
        assert!(detect_red_flag("RANSOMWARE popup on my screen"));
        assert!(detect_red_flag("someone hacked into the share"));
    }

    #[test]
    fn ordinary_queries_pass() {
        assert!(!detect_red_flag("how do I reset my password"));
        assert!(!detect_red_flag("vpn keeps disconnecting"));
        assert!(!detect_red_flag(""));
    }
}
