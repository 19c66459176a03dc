//! Static word embeddings: an immutable token → vector table.
//!
//! The on-disk format is the plain-text layout used by GloVe and word2vec:
//! one `token v1 v2 … vD` row per line. A word2vec `<count> <dim>` header
//! line is detected and honoured. D is taken from the file.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::ModelError;

/// Token → vector lookup of fixed dimensionality.
///
/// Vectors live in one flat buffer; the index maps a token to its row.
pub struct EmbeddingTable {
    index: HashMap<String, usize>,
    values: Vec<f32>,
    dim: usize,
}

impl std::fmt::Debug for EmbeddingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingTable")
            .field("dim", &self.dim)
            .field("vocab", &self.index.len())
            .finish()
    }
}

impl EmbeddingTable {
    /// Load a vectors file from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let file = File::open(path).map_err(|e| ModelError::io(path, e))?;
        let table = Self::from_reader(BufReader::new(file), path)?;
        info!(
            dim = table.dim,
            vocab = table.len(),
            path = %path.display(),
            "loaded embedding table"
        );
        Ok(table)
    }

    /// Parse a vectors file. `path` is only used in error messages.
    pub fn from_reader<R: BufRead>(reader: R, path: &Path) -> Result<Self, ModelError> {
        let mut index = HashMap::new();
        let mut values = Vec::new();
        let mut dim: Option<usize> = None;
        let mut seen_row = false;

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|e| ModelError::io(path, e))?;
            let mut fields = line.split_whitespace();
            let Some(token) = fields.next() else {
                continue;
            };
            let rest: Vec<&str> = fields.collect();

            if !seen_row {
                seen_row = true;
                if let Some(header_dim) = parse_header(token, &rest) {
                    debug!(dim = header_dim, "word2vec header");
                    dim = Some(header_dim);
                    continue;
                }
            }

            let parse_err = |message: String| ModelError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message,
            };

            if rest.is_empty() {
                return Err(parse_err(format!("token {token:?} has no vector")));
            }
            let expected = *dim.get_or_insert(rest.len());
            if rest.len() < expected {
                return Err(parse_err(format!(
                    "token {token:?} has {} components, expected {expected}",
                    rest.len()
                )));
            }

            // Tokens may contain spaces: the last D fields are the vector.
            let (words, components) = rest.split_at(rest.len() - expected);
            let token = if words.is_empty() {
                token.to_string()
            } else {
                let mut joined = token.to_string();
                for word in words {
                    joined.push(' ');
                    joined.push_str(word);
                }
                joined
            };

            let Entry::Vacant(slot) = index.entry(token) else {
                continue;
            };
            for field in components {
                let v: f32 = field
                    .parse()
                    .map_err(|_| parse_err(format!("invalid number {field:?}")))?;
                values.push(v);
            }
            slot.insert(values.len() / expected - 1);
        }

        let dim = match dim {
            Some(d) if !index.is_empty() => d,
            _ => return Err(ModelError::EmptyVocabulary),
        };

        Ok(Self { index, values, dim })
    }

    /// Build a table from in-memory entries. Every vector must have length `dim`.
    pub fn from_entries<I, S>(dim: usize, entries: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut index = HashMap::new();
        let mut values = Vec::new();

        for (token, vector) in entries {
            if vector.len() != dim {
                return Err(ModelError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
            if let Entry::Vacant(slot) = index.entry(token.into()) {
                slot.insert(values.len() / dim.max(1));
                values.extend(vector);
            }
        }

        if index.is_empty() || dim == 0 {
            return Err(ModelError::EmptyVocabulary);
        }
        Ok(Self { index, values, dim })
    }

    /// Embedding dimensionality D.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of tokens with a vector.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Vector for an exact token.
    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.index.get(token).map(|&row| {
            let offset = row * self.dim;
            &self.values[offset..offset + self.dim]
        })
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }
}

/// A word2vec header is exactly two positive integers: `<count> <dim>`.
fn parse_header(first: &str, rest: &[&str]) -> Option<usize> {
    if rest.len() != 1 {
        return None;
    }
    let _count: usize = first.parse().ok()?;
    let dim: usize = rest[0].parse().ok()?;
    (dim > 0).then_some(dim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(text: &str) -> Result<EmbeddingTable, ModelError> {
        EmbeddingTable::from_reader(text.as_bytes(), Path::new("vectors.txt"))
    }

    #[test]
    fn glove_layout() {
        let table = parse("revenue 1.0 0.0 0.5\ngrowth 0.0 1.0 -0.5\n").unwrap();
        assert_eq!(table.dim(), 3);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("revenue"), Some(&[1.0, 0.0, 0.5][..]));
        assert_eq!(table.get("growth"), Some(&[0.0, 1.0, -0.5][..]));
        assert!(table.get("missing").is_none());
    }

    #[test]
    fn word2vec_header_is_skipped() {
        let table = parse("2 2\nalpha 1 2\nbeta 3 4\n").unwrap();
        assert_eq!(table.dim(), 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("beta"), Some(&[3.0, 4.0][..]));
    }

    #[test]
    fn header_dim_must_match_rows() {
        let err = parse("1 3\nalpha 1 2\n").unwrap_err();
        assert!(matches!(err, ModelError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn ragged_rows_fail() {
        let err = parse("alpha 1 2 3\nbeta 1 2\n").unwrap_err();
        match err {
            ModelError::Parse { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("expected 3"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tokens_with_spaces_take_the_last_d_fields() {
        let table = parse("the 1 0\n. . . 0.5 0.5\nat&t inc 0.25 0.75\n").unwrap();
        assert_eq!(table.dim(), 2);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(". . ."), Some(&[0.5, 0.5][..]));
        assert_eq!(table.get("at&t inc"), Some(&[0.25, 0.75][..]));
        assert!(table.get(".").is_none());

        // The header fixes D before any spaced row.
        let table = parse("2 2\n. . . 0.5 0.5\nthe 1 0\n").unwrap();
        assert_eq!(table.get(". . ."), Some(&[0.5, 0.5][..]));
    }

    #[test]
    fn bad_number_fails() {
        let err = parse("alpha 1 x\n").unwrap_err();
        assert!(matches!(err, ModelError::Parse { line: 1, .. }));
    }

    #[test]
    fn token_without_vector_fails() {
        assert!(matches!(
            parse("alpha 1\nlonely\n").unwrap_err(),
            ModelError::Parse { line: 2, .. }
        ));
    }

    #[test]
    fn empty_file_fails() {
        assert!(matches!(parse("").unwrap_err(), ModelError::EmptyVocabulary));
        assert!(matches!(
            parse("\n\n").unwrap_err(),
            ModelError::EmptyVocabulary
        ));
    }

    #[test]
    fn duplicate_tokens_keep_first() {
        let table = parse("alpha 1 1\nalpha 9 9\nbeta 2 2\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("alpha"), Some(&[1.0, 1.0][..]));
        assert_eq!(table.get("beta"), Some(&[2.0, 2.0][..]));
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "quarterly 0.1 0.2").unwrap();
        writeln!(file, "revenue 0.3 0.4").unwrap();
        let table = EmbeddingTable::load(file.path()).unwrap();
        assert_eq!(table.dim(), 2);
        assert!(table.contains("quarterly"));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EmbeddingTable::load(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    #[test]
    fn from_entries_checks_dim() {
        let err = EmbeddingTable::from_entries(2, [("a", vec![1.0, 2.0]), ("b", vec![1.0])])
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));

        let table =
            EmbeddingTable::from_entries(2, [("a", vec![1.0, 2.0]), ("b", vec![3.0, 4.0])])
                .unwrap();
        assert_eq!(table.get("b"), Some(&[3.0, 4.0][..]));
    }
}
