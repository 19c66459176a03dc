//! Stopword sets.
//!
//! The built-in list is the standard English set used by common NLP
//! pipelines. A model directory can replace it with its own
//! `stopwords.txt`.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::ModelError;

const ENGLISH: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below",
    "beside", "besides", "between", "beyond", "both", "bottom", "but", "by", "ca", "call",
    "can", "cannot", "could", "did", "do", "does", "doing", "done", "down", "due", "during",
    "each", "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "even",
    "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
    "fifty", "first", "five", "for", "former", "formerly", "forty", "four", "from", "front",
    "full", "further", "get", "give", "go", "had", "has", "have", "he", "hence", "her",
    "here", "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself",
    "his", "how", "however", "hundred", "i", "if", "in", "indeed", "into", "is", "it", "its",
    "itself", "just", "keep", "last", "latter", "latterly", "least", "less", "made", "make",
    "many", "may", "me", "meanwhile", "might", "mine", "more", "moreover", "most", "mostly",
    "move", "much", "must", "my", "myself", "name", "namely", "neither", "never",
    "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not", "nothing",
    "now", "nowhere", "n't", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "quite", "rather", "re", "really", "regarding", "same",
    "say", "see", "seem", "seemed", "seeming", "seems", "serious", "several", "she", "should",
    "show", "side", "since", "six", "sixty", "so", "some", "somehow", "someone", "something",
    "sometime", "sometimes", "somewhere", "still", "such", "take", "ten", "than", "that",
    "the", "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "third", "this", "those", "though",
    "three", "through", "throughout", "thru", "thus", "to", "together", "too", "top",
    "toward", "towards", "twelve", "twenty", "two", "under", "unless", "until", "up", "upon",
    "us", "used", "using", "various", "very", "via", "was", "we", "well", "were", "what",
    "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas", "whereby",
    "wherein", "whereupon", "wherever", "whether", "which", "while", "whither", "who",
    "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without", "would",
    "yet", "you", "your", "yours", "yourself", "yourselves",
    // Clitics as the tokenizer emits them, straight and curly apostrophes.
    "'d", "'ll", "'m", "'re", "'s", "'ve", "\u{2019}d", "\u{2019}ll", "\u{2019}m", "\u{2019}re",
    "\u{2019}s", "\u{2019}ve", "n\u{2019}t",
];

/// Case-insensitive stopword lookup.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}

impl StopWords {
    /// The built-in English list.
    pub fn english() -> Self {
        Self::from_words(ENGLISH.iter().copied())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Read one word per line. Blank lines and `#` comments are skipped.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
        let set = Self::from_words(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.starts_with('#')),
        );
        info!(count = set.len(), path = %path.display(), "loaded stopwords");
        Ok(set)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token) || self.words.contains(&token.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_covers_function_words() {
        let stop = StopWords::english();
        for w in ["the", "of", "and", "a", "to", "in"] {
            assert!(stop.contains(w), "{w} should be a stopword");
        }
        for w in ["revenue", "growth", "quarterly"] {
            assert!(!stop.contains(w), "{w} should not be a stopword");
        }
    }

    #[test]
    fn english_covers_clitics() {
        let stop = StopWords::english();
        for w in ["'s", "'ll", "'ve", "'d", "'m", "'re", "n't", "N'T", "\u{2019}s", "n\u{2019}t"] {
            assert!(stop.contains(w), "{w} should be a stopword");
        }
        assert!(!stop.contains("'"));
    }

    #[test]
    fn lookup_ignores_case() {
        let stop = StopWords::english();
        assert!(stop.contains("The"));
        assert!(stop.contains("AND"));
    }

    #[test]
    fn load_skips_comments_and_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stopwords.txt");
        std::fs::write(&path, "# custom list\nfoo\n\n  Bar \n").unwrap();

        let stop = StopWords::load(&path).unwrap();
        assert_eq!(stop.len(), 2);
        assert!(stop.contains("foo"));
        assert!(stop.contains("bar"));
        assert!(!stop.contains("the"));
    }
}
