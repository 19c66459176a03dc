//! Tokenization against a loaded embedding space.
//!
//! Splitting follows the BERT pre-tokenizer from the `tokenizers` crate:
//! whitespace separates tokens and every punctuation character stands alone.
//! English clitics are then glued back together (`'s`, `'re`, `n't`, ...) so
//! "Company's" is `Company` + `'s` and "don't" is `do` + `n't`. Each token is then flagged as stopword / punctuation and paired with its
//! vector if the embedding table knows it.

use std::path::Path;

use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};
use tracing::info;

use crate::{EmbeddingTable, ModelError, StopWords};

/// One token of a document, borrowing its vector from the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'m> {
    pub text: String,
    pub is_stop: bool,
    pub is_punct: bool,
    pub vector: Option<&'m [f32]>,
}

impl Token<'_> {
    pub fn has_vector(&self) -> bool {
        self.vector.is_some()
    }

    /// Whether this token contributes to the document vector.
    pub fn qualifies(&self) -> bool {
        !self.is_stop && !self.is_punct && self.has_vector()
    }
}

/// Splits text into flagged tokens over an embedding space of dimension `dim`.
pub trait Tokenizer: Send + Sync {
    fn tokenize<'m>(&'m self, text: &str) -> Result<Vec<Token<'m>>, ModelError>;

    fn dim(&self) -> usize;
}

/// Embedding table plus stopword list: the loaded language model.
#[derive(Debug)]
pub struct LanguageModel {
    embeddings: EmbeddingTable,
    stopwords: StopWords,
}

impl LanguageModel {
    pub fn new(embeddings: EmbeddingTable, stopwords: StopWords) -> Self {
        Self {
            embeddings,
            stopwords,
        }
    }

    /// Load a model directory containing `vectors.txt` and, optionally,
    /// `stopwords.txt`. Without the latter the English list is used.
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        let vectors_path = model_dir.join("vectors.txt");
        let stopwords_path = model_dir.join("stopwords.txt");

        if !vectors_path.exists() {
            return Err(ModelError::NotFound(vectors_path));
        }
        let embeddings = EmbeddingTable::load(&vectors_path)?;

        let stopwords = if stopwords_path.exists() {
            StopWords::load(&stopwords_path)?
        } else {
            StopWords::english()
        };

        info!(
            dim = embeddings.dim(),
            vocab = embeddings.len(),
            stopwords = stopwords.len(),
            "loaded language model"
        );
        Ok(Self::new(embeddings, stopwords))
    }

    pub fn embeddings(&self) -> &EmbeddingTable {
        &self.embeddings
    }

    pub fn stopwords(&self) -> &StopWords {
        &self.stopwords
    }

    /// Exact match first, then the lowercase form.
    fn lookup(&self, token: &str) -> Option<&[f32]> {
        self.embeddings.get(token).or_else(|| {
            let lower = token.to_lowercase();
            if lower == token {
                None
            } else {
                self.embeddings.get(&lower)
            }
        })
    }
}

impl Tokenizer for LanguageModel {
    fn tokenize<'m>(&'m self, text: &str) -> Result<Vec<Token<'m>>, ModelError> {
        Ok(split(text)?
            .into_iter()
            .map(|piece| Token {
                is_stop: self.stopwords.contains(&piece),
                is_punct: is_punct(&piece),
                vector: self.lookup(&piece),
                text: piece,
            })
            .collect())
    }

    fn dim(&self) -> usize {
        self.embeddings.dim()
    }
}

fn split(text: &str) -> Result<Vec<String>, ModelError> {
    let mut pretokenized = PreTokenizedString::from(text);
    BertPreTokenizer
        .pre_tokenize(&mut pretokenized)
        .map_err(|e| ModelError::Tokenize(e.to_string()))?;
    let pieces = pretokenized
        .get_splits(OffsetReferential::Original, OffsetType::Byte)
        .into_iter()
        .map(|(piece, offsets, _)| (piece.to_string(), offsets))
        .collect();
    Ok(merge_clitics(pieces))
}

/// Suffixes that follow an apostrophe inside an English word.
const CLITICS: &[&str] = &["s", "t", "re", "ve", "ll", "d", "m"];

fn is_apostrophe(piece: &str) -> bool {
    piece == "'" || piece == "\u{2019}"
}

/// Rejoin `word ' suffix` runs with no whitespace between them into `word`
/// and `'suffix`. Before `'t` the trailing `n` moves over: `don't` becomes
/// `do` + `n't`.
fn merge_clitics(pieces: Vec<(String, (usize, usize))>) -> Vec<String> {
    let mut out: Vec<(String, usize)> = Vec::with_capacity(pieces.len());
    let mut pieces = pieces.into_iter().peekable();

    while let Some((piece, (start, end))) = pieces.next() {
        let after_word = out.last().is_some_and(|(prev, prev_end)| {
            *prev_end == start && prev.chars().last().is_some_and(char::is_alphanumeric)
        });
        if after_word && is_apostrophe(&piece) {
            let suffix = pieces.next_if(|(next, (next_start, _))| {
                *next_start == end && CLITICS.contains(&next.to_lowercase().as_str())
            });
            if let Some((suffix, (_, suffix_end))) = suffix {
                let mut clitic = format!("{piece}{suffix}");
                if suffix.eq_ignore_ascii_case("t") {
                    if let Some((prev, _)) = out.last_mut() {
                        if prev.len() > 1 && prev.ends_with(['n', 'N']) {
                            if let Some(n) = prev.pop() {
                                clitic.insert(0, n);
                            }
                        }
                    }
                }
                out.push((clitic, suffix_end));
                continue;
            }
        }
        out.push((piece, end));
    }

    out.into_iter().map(|(piece, _)| piece).collect()
}

/// Non-empty and without a single letter or digit.
fn is_punct(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LanguageModel {
        let table = EmbeddingTable::from_entries(
            2,
            [
                ("revenue", vec![1.0, 0.0]),
                ("growth", vec![0.0, 1.0]),
                ("the", vec![5.0, 5.0]),
                ("Apple", vec![0.5, 0.5]),
                (",", vec![9.0, 9.0]),
            ],
        )
        .unwrap();
        LanguageModel::new(table, StopWords::english())
    }

    #[test]
    fn splits_on_whitespace_and_punctuation() {
        let model = model();
        let tokens = model.tokenize("Revenue, growth!").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["Revenue", ",", "growth", "!"]);
    }

    fn texts(model: &LanguageModel, text: &str) -> Vec<String> {
        model
            .tokenize(text)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn clitics_are_split_off_as_stopwords() {
        let model = model();
        let tokens = model.tokenize("Company's revenue don't").unwrap();
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, ["Company", "'s", "revenue", "do", "n't"]);

        let stop: Vec<bool> = tokens.iter().map(|t| t.is_stop).collect();
        assert_eq!(stop, [false, true, false, true, true]);
        assert!(tokens.iter().all(|t| !t.is_punct));
    }

    #[test]
    fn clitic_forms() {
        let model = model();
        assert_eq!(texts(&model, "can't WON'T"), ["ca", "n't", "WO", "N'T"]);
        assert_eq!(texts(&model, "they're we've I'd you'll I'm"), [
            "they", "'re", "we", "'ve", "I", "'d", "you", "'ll", "I", "'m"
        ]);
        assert_eq!(texts(&model, "Company\u{2019}s"), ["Company", "\u{2019}s"]);
    }

    #[test]
    fn detached_apostrophes_stay_punctuation() {
        let model = model();
        assert_eq!(texts(&model, "Company ' s"), ["Company", "'", "s"]);
        assert_eq!(texts(&model, "'s revenue"), ["'", "s", "revenue"]);
        assert_eq!(texts(&model, "rock'n'roll"), ["rock", "'", "n", "'", "roll"]);
        assert_eq!(texts(&model, "'t"), ["'", "t"]);
    }

    #[test]
    fn flags_stop_punct_and_vectors() {
        let model = model();
        let tokens = model.tokenize("the revenue , widgets").unwrap();

        assert!(tokens[0].is_stop);
        assert!(tokens[0].has_vector());
        assert!(!tokens[0].qualifies());

        assert!(tokens[1].qualifies());

        assert!(tokens[2].is_punct);
        assert!(tokens[2].has_vector());
        assert!(!tokens[2].qualifies());

        assert!(!tokens[3].has_vector());
        assert!(!tokens[3].qualifies());
    }

    #[test]
    fn lowercase_fallback() {
        let model = model();
        let tokens = model.tokenize("GROWTH Apple apple").unwrap();
        assert_eq!(tokens[0].vector, Some(&[0.0, 1.0][..]));
        assert_eq!(tokens[1].vector, Some(&[0.5, 0.5][..]));
        // No uppercase fallback.
        assert!(tokens[2].vector.is_none());
    }

    #[test]
    fn empty_text_has_no_tokens() {
        let model = model();
        assert!(model.tokenize("").unwrap().is_empty());
        assert!(model.tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn punctuation_detection() {
        assert!(is_punct("."));
        assert!(is_punct("—"));
        assert!(!is_punct("a."));
        assert!(!is_punct("42"));
        assert!(!is_punct(""));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vectors.txt"), "alpha 1 0\nbeta 0 1\n").unwrap();

        let model = LanguageModel::load(dir.path()).unwrap();
        assert_eq!(model.dim(), 2);
        assert!(model.stopwords().contains("the"));

        std::fs::write(dir.path().join("stopwords.txt"), "alpha\n").unwrap();
        let model = LanguageModel::load(dir.path()).unwrap();
        assert!(model.stopwords().contains("alpha"));
        assert!(!model.stopwords().contains("the"));
    }

    #[test]
    fn load_requires_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let err = LanguageModel::load(dir.path()).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(p) if p.ends_with("vectors.txt")));
    }
}
