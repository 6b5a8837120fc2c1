use crate::{models::SqlPost, Db};
use domain::{Post, PostId};
use sqlx::types::Json;

const POST_COLUMNS: &str = r#"
    id, author_id, author_name, title, content, category,
    likes, liked_by, comments, replies, blocked, created_at, updated_at
"#;

impl Db {
    /// Writes the whole post, thread included.
    pub async fn upsert_post(&self, post: &Post) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                id, author_id, author_name, title, content, category,
                likes, liked_by, comments, replies, blocked, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                category = excluded.category,
                likes = excluded.likes,
                liked_by = excluded.liked_by,
                comments = excluded.comments,
                replies = excluded.replies,
                blocked = excluded.blocked,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(post.id.as_str())
        .bind(post.author_id.as_str())
        .bind(&post.author_name)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.category.as_str())
        .bind(i64::from(post.likes))
        .bind(Json(&post.liked_by))
        .bind(i64::from(post.comments))
        .bind(Json(&post.replies))
        .bind(post.blocked)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_post(&self, id: &PostId) -> anyhow::Result<Option<Post>> {
        let sql = format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS);
        let row = sqlx::query_as::<_, SqlPost>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Post::try_from).transpose()
    }

    /// Newest first. Blocked posts are left out unless `include_blocked`.
    pub async fn list_posts(&self, include_blocked: bool) -> anyhow::Result<Vec<Post>> {
        let sql = format!(
            "SELECT {} FROM posts WHERE (? OR blocked = FALSE) ORDER BY created_at DESC",
            POST_COLUMNS
        );
        let rows = sqlx::query_as::<_, SqlPost>(&sql)
            .bind(include_blocked)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Post::try_from).collect()
    }

    /// Returns whether a row was removed.
    pub async fn delete_post(&self, id: &PostId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::Db;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use domain::{Actor, Post, PostCategory, PostDraft, PostId, UserRole};

    fn ts(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 10)
            .unwrap()
            .and_hms_opt(14, minute, 0)
            .unwrap()
    }

    fn author() -> Actor {
        Actor {
            id: "stu-1".into(),
            name: "Awa".into(),
            role: UserRole::Student,
        }
    }

    fn post(id: &str, minute: u32) -> Post {
        let draft = PostDraft {
            title: format!("Sujet {}", id),
            content: "Besoin d'aide pour le TP".into(),
            category: PostCategory::Aide,
        };
        Post::new(id.into(), draft, &author(), ts(minute))
    }

    async fn db() -> Db {
        Db::new("sqlite::memory:").await.expect("in-memory database")
    }

    #[tokio::test]
    async fn saved_post_reloads_with_thread() {
        let db = db().await;
        let a = author();
        let p = post("p1", 0)
            .add_reply(None, "premier", &a, "c1".into(), ts(1))
            .add_reply(Some(&"c1".into()), "réponse", &a, "c2".into(), ts(2))
            .toggle_like(&"c2".into(), &a.id)
            .toggle_post_like(&a.id);

        db.upsert_post(&p).await.unwrap();
        let loaded = db.get_post(&p.id).await.unwrap().expect("post exists");
        assert_eq!(loaded, p);
        assert_eq!(loaded.comments, 2);
    }

    #[tokio::test]
    async fn upsert_overwrites_mutable_fields() {
        let db = db().await;
        let p = post("p1", 0);
        db.upsert_post(&p).await.unwrap();

        let updated = p
            .add_reply(None, "salut", &author(), "c1".into(), ts(3))
            .with_blocked(true);
        db.upsert_post(&updated).await.unwrap();

        let loaded = db.get_post(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded.comments, 1);
        assert!(loaded.blocked);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_hides_blocked() {
        let db = db().await;
        db.upsert_post(&post("old", 0)).await.unwrap();
        db.upsert_post(&post("new", 30)).await.unwrap();
        db.upsert_post(&post("hidden", 15).with_blocked(true))
            .await
            .unwrap();

        let visible: Vec<String> = db
            .list_posts(false)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(visible, vec!["new", "old"]);

        let all = db.list_posts(true).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].id.as_str(), "hidden");
        assert!(all[0].created_at - all[2].created_at == Duration::minutes(30));
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let db = db().await;
        db.upsert_post(&post("p1", 0)).await.unwrap();

        assert!(db.delete_post(&PostId::from("p1")).await.unwrap());
        assert!(!db.delete_post(&PostId::from("p1")).await.unwrap());
        assert!(db.get_post(&PostId::from("p1")).await.unwrap().is_none());
    }
}
