use chrono::{NaiveDateTime, Utc};
use domain::{CommentId, PostId};

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn stamp(prefix: &str) -> String {
    format!(
        "{}-{}-{:08x}",
        prefix,
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}

pub fn new_post_id() -> PostId {
    PostId::new(stamp("post"))
}

pub fn new_comment_id() -> CommentId {
    CommentId::new(stamp("comment"))
}
