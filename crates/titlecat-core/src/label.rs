//! Category labels as emitted by a pretrained classifier.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A discrete category value.
///
/// Classifier artifacts store their classes as integers, floats or text.
/// The JSON type is kept so a label serializes back exactly as the artifact
/// declared it: `1` stays `1` and `1.0` stays `1.0`.
///
/// Floats compare by bit pattern, so a label set can hash them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Integer(n) => n.hash(state),
            Self::Float(x) => x.to_bits().hash(state),
            Self::Text(s) => s.hash(state),
        }
    }
}

impl Label {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) | Self::Float(_) => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Label {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for Label {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}
