//! The class vocabulary of a loaded classifier.

use std::collections::HashSet;

use titlecat_core::Label;

use crate::ModelError;

/// Ordered, duplicate-free list of the labels a classifier can emit.
///
/// Order matches the artifact's class order, which is also the tie-break
/// order for decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    labels: Vec<Label>,
}

/// Summary statistics for a LabelSet.
pub struct LabelSummary {
    pub total: usize,
    pub text: usize,
    pub numeric: usize,
}

impl LabelSet {
    /// Build from the artifact's class list. Empty or repeated classes are rejected.
    pub fn new(labels: Vec<Label>) -> Result<Self, ModelError> {
        if labels.is_empty() {
            return Err(ModelError::NoClasses);
        }
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label) {
                return Err(ModelError::Artifact(format!("duplicate class {label}")));
            }
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn summary(&self) -> LabelSummary {
        let text = self.labels.iter().filter(|l| l.as_text().is_some()).count();
        LabelSummary {
            total: self.labels.len(),
            text,
            numeric: self.labels.len() - text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_artifact_order() {
        let set = LabelSet::new(vec!["b".into(), "a".into(), 3i64.into()]).unwrap();
        let order: Vec<String> = set.iter().map(|l| l.to_string()).collect();
        assert_eq!(order, ["b", "a", "3"]);
        assert_eq!(set.get(1), Some(&Label::from("a")));
        assert!(set.contains(&Label::from(3i64)));
        assert!(!set.contains(&Label::from("3")));
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert!(matches!(LabelSet::new(vec![]), Err(ModelError::NoClasses)));
        assert!(matches!(
            LabelSet::new(vec!["a".into(), "a".into()]),
            Err(ModelError::Artifact(_))
        ));
    }

    #[test]
    fn summary_counts() {
        let set = LabelSet::new(vec!["finance".into(), "sports".into(), 1i64.into()]).unwrap();
        let s = set.summary();
        assert_eq!(s.total, 3);
        assert_eq!(s.text, 2);
        assert_eq!(s.numeric, 1);
    }
}
