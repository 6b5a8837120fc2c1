use crate::models::CommentId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThreadError {
    #[error("comment {0} not found")]
    CommentNotFound(CommentId),

    #[error("only the author may {0}")]
    Forbidden(&'static str),

    #[error("content must not be empty")]
    EmptyContent,

    #[error("post is blocked")]
    PostBlocked,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("malformed session token")]
    Malformed,

    #[error("session token signature mismatch")]
    BadSignature,

    #[error("invalid session secret")]
    BadSecret,
}
