use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two kinds of votable content. Votes treat both uniformly; the kind
/// only selects which content table backs the ownership lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Comment,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Comment => "comment",
        }
    }
}

/// Opaque reference to a votable content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentRef {
    pub kind: ContentKind,
    pub id: Uuid,
}

impl ContentRef {
    pub fn post(id: Uuid) -> Self {
        Self {
            kind: ContentKind::Post,
            id,
        }
    }

    pub fn comment(id: Uuid) -> Self {
        Self {
            kind: ContentKind::Comment,
            id,
        }
    }
}

/// What the content collaborator exposes about an item: who wrote it and
/// whether it has been (soft-)deleted.
#[derive(Debug, Clone, Copy)]
pub struct ContentHead {
    pub author_id: Uuid,
    pub deleted: bool,
}
