//! Collection-name derivation for non-media files (§4.H step 3): the first
//! two significant words of `descriptive_text`, or `"documents"` if none
//! qualify.

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "if", "in", "into", "is", "it",
    "its", "of", "on", "or", "that", "the", "this", "to", "was", "we", "were", "will", "with", "you",
];

pub const FALLBACK_COLLECTION: &str = "documents";

pub fn derive_collection(descriptive_text: &str) -> String {
    let mut seen = std::collections::HashSet::new();
    let words: Vec<String> = descriptive_text
        .split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_ascii_lowercase())
        .filter(|w| !w.is_empty() && w.chars().any(|c| c.is_alphabetic()))
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .filter(|w| seen.insert(w.clone()))
        .take(2)
        .collect();

    if words.is_empty() {
        FALLBACK_COLLECTION.to_string()
    } else {
        words.join("_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_two_significant_words() {
        assert_eq!(derive_collection("We propose a new caching scheme."), "propose_caching");
    }

    #[test]
    fn falls_back_when_only_stopwords_present() {
        assert_eq!(derive_collection("the a an of"), FALLBACK_COLLECTION);
    }

    #[test]
    fn falls_back_on_empty_text() {
        assert_eq!(derive_collection(""), FALLBACK_COLLECTION);
    }

    #[test]
    fn deduplicates_repeated_words() {
        assert_eq!(derive_collection("cache cache caching scheme"), "cache_caching");
    }
}
