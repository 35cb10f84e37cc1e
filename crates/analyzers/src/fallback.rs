//! Policy fallback keyword classifier.
//!
//! When the `policy` breaker short-circuits a call, this runs
//! synchronously in its place. It is deliberately crude:
//! a keyword scan, not a model. Its only job is to avoid silently
//! passing obviously dangerous text while the real policy analyzer is
//! degraded.

const VIOLENCE_KEYWORDS: &[&str] = &["bomb", "explosive device", "mass shooting", "massacre"];
const WEAPONS_KEYWORDS: &[&str] = &["bioweapon", "nerve agent", "how to build a gun"];
const SELF_HARM_KEYWORDS: &[&str] = &["kill myself", "suicide method", "self-harm"];

/// Returns the name of the first rule that fires against `text`, or
/// `None` if the classifier found nothing. Matching is case-insensitive
/// substring matching — the same crude-but-safe style as the router's
/// heuristic default set.
pub fn classify(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    if VIOLENCE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some("violence_keyword");
    }
    if WEAPONS_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some("weapons_keyword");
    }
    if SELF_HARM_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some("self_harm_keyword");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_bomb_making_question() {
        assert_eq!(classify("How do I make a bomb?"), Some("violence_keyword"));
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(classify("BOMB threat"), Some("violence_keyword"));
    }

    #[test]
    fn benign_text_does_not_fire() {
        assert_eq!(classify("Hello, how are you?"), None);
    }
}
