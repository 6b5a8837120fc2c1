use chrono::NaiveDateTime;
use domain::{Comment, Post, PostId, UserId};
use sqlx::{types::Json, FromRow};
use std::collections::BTreeSet;

#[derive(FromRow)]
pub struct SqlPost {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub likes: i64,
    pub liked_by: Json<BTreeSet<UserId>>,
    pub comments: i64,
    pub replies: Json<Vec<Comment>>,
    pub blocked: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl TryFrom<SqlPost> for Post {
    type Error = anyhow::Error;

    fn try_from(sql: SqlPost) -> Result<Self, Self::Error> {
        Ok(Post {
            id: PostId::new(sql.id),
            author_id: UserId::new(sql.author_id),
            author_name: sql.author_name,
            title: sql.title,
            content: sql.content,
            category: sql.category.parse().map_err(anyhow::Error::msg)?,
            likes: u32::try_from(sql.likes)?,
            liked_by: sql.liked_by.0,
            comments: u32::try_from(sql.comments)?,
            replies: sql.replies.0,
            blocked: sql.blocked,
            created_at: sql.created_at,
            updated_at: sql.updated_at,
        })
    }
}
