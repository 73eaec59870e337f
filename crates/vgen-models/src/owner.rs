//! Owner references for catalogued videos.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of entity a video is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Image,
    User,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Image => "image",
            OwnerKind::User => "user",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to the entity a video (and its downloads) belongs to.
///
/// A deployment scopes videos either to a source image or directly to a
/// user; the two variants are mutually exclusive per record. One catalog
/// handles both rather than two parallel code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OwnerRef {
    Image(i64),
    User(i64),
}

impl OwnerRef {
    pub fn kind(&self) -> OwnerKind {
        match self {
            OwnerRef::Image(_) => OwnerKind::Image,
            OwnerRef::User(_) => OwnerKind::User,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            OwnerRef::Image(id) | OwnerRef::User(id) => *id,
        }
    }

    /// Split into the nullable column pair `(image_id, user_id)`.
    pub fn column_pair(&self) -> (Option<i64>, Option<i64>) {
        match self {
            OwnerRef::Image(id) => (Some(*id), None),
            OwnerRef::User(id) => (None, Some(*id)),
        }
    }

    /// Rebuild from the nullable column pair, if exactly one side is set.
    pub fn from_column_pair(image_id: Option<i64>, user_id: Option<i64>) -> Option<Self> {
        match (image_id, user_id) {
            (Some(id), None) => Some(OwnerRef::Image(id)),
            (None, Some(id)) => Some(OwnerRef::User(id)),
            _ => None,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_pair_round_trip() {
        let owner = OwnerRef::Image(42);
        let (image_id, user_id) = owner.column_pair();
        assert_eq!(OwnerRef::from_column_pair(image_id, user_id), Some(owner));

        let owner = OwnerRef::User(7);
        let (image_id, user_id) = owner.column_pair();
        assert_eq!(OwnerRef::from_column_pair(image_id, user_id), Some(owner));
    }

    #[test]
    fn test_column_pair_rejects_ambiguous() {
        assert_eq!(OwnerRef::from_column_pair(None, None), None);
        assert_eq!(OwnerRef::from_column_pair(Some(1), Some(2)), None);
    }

    #[test]
    fn test_serde_tagged() {
        let owner = OwnerRef::Image(5);
        let json = serde_json::to_string(&owner).unwrap();
        assert_eq!(json, r#"{"kind":"image","id":5}"#);

        let parsed: OwnerRef = serde_json::from_str(r#"{"kind":"user","id":9}"#).unwrap();
        assert_eq!(parsed, OwnerRef::User(9));
    }
}
