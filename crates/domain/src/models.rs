use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(UserId);
string_id!(PostId);
string_id!(CommentId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Lecturer,
    Admin,
}

/// The authenticated user performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub role: UserRole,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PostCategory {
    #[default]
    Discussion,
    Aide,
    Annonce,
    Exercices,
}

impl PostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostCategory::Discussion => "Discussion",
            PostCategory::Aide => "Aide",
            PostCategory::Annonce => "Annonce",
            PostCategory::Exercices => "Exercices",
        }
    }
}

impl std::str::FromStr for PostCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Discussion" => Ok(PostCategory::Discussion),
            "Aide" => Ok(PostCategory::Aide),
            "Annonce" => Ok(PostCategory::Annonce),
            "Exercices" => Ok(PostCategory::Exercices),
            other => Err(format!("Unknown post category: {}", other)),
        }
    }
}

/// A node of a post's discussion tree.
///
/// `id`, `author_id`, `author_name` and `created_at` are fixed at creation.
/// `likes` always equals `liked_by.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub author_id: UserId,
    pub author_name: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub liked_by: BTreeSet<UserId>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn new(
        id: CommentId,
        author: &Actor,
        content: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            author_id: author.id.clone(),
            author_name: author.name.clone(),
            content: content.into(),
            created_at,
            likes: 0,
            liked_by: BTreeSet::new(),
            replies: Vec::new(),
        }
    }

    /// Number of nodes below this one, at every depth.
    pub fn descendant_count(&self) -> usize {
        self.replies.iter().map(|r| 1 + r.descendant_count()).sum()
    }

    pub fn is_liked_by(&self, user: &UserId) -> bool {
        self.liked_by.contains(user)
    }
}

/// Title, body and category of a post as submitted by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: PostCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub category: PostCategory,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub liked_by: BTreeSet<UserId>,
    /// Total node count of `replies`, kept in sync by every mutation.
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub replies: Vec<Comment>,
    #[serde(default)]
    pub blocked: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}
