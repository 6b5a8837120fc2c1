use anyhow::Context;
use domain::{session, Actor, Composer, Post, ThreadAction, UserRole};
use reqwest::{Client, RequestBuilder};
use serde_json::json;

const BASE_URL: &str = "http://127.0.0.1:3000";

struct Session {
    client: Client,
    token: String,
    actor: Actor,
}

impl Session {
    fn new(client: &Client, actor: Actor, secret: &str) -> anyhow::Result<Self> {
        let token = session::sign(&actor, secret)?;
        Ok(Self {
            client: client.clone(),
            token,
            actor,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", BASE_URL, path))
            .bearer_auth(&self.token)
    }

    /// Sends what the comment box produced to the matching endpoint.
    async fn submit(&self, post: &Post, action: ThreadAction) -> anyhow::Result<Post> {
        let base = format!("/api/posts/{}/comments", post.id);
        let req = match action {
            ThreadAction::AddReply { reply_to, content } => self
                .request(reqwest::Method::POST, &base)
                .json(&json!({ "content": content, "replyTo": reply_to })),
            ThreadAction::EditComment {
                comment_id,
                content,
            } => self
                .request(reqwest::Method::PUT, &format!("{}/{}", base, comment_id))
                .json(&json!({ "content": content })),
            ThreadAction::DeleteComment { comment_id } => {
                self.request(reqwest::Method::DELETE, &format!("{}/{}", base, comment_id))
            }
            ThreadAction::ToggleLike { comment_id } => {
                self.request(reqwest::Method::POST, &format!("{}/{}/like", base, comment_id))
            }
        };
        read_post(req).await
    }
}

async fn read_post(req: RequestBuilder) -> anyhow::Result<Post> {
    let resp = req.send().await?;
    if !resp.status().is_success() {
        anyhow::bail!("{} {}", resp.status(), resp.text().await?);
    }
    Ok(resp.json().await?)
}

fn print_thread(post: &Post) {
    println!("   -> \"{}\" ({} comment(s))", post.title, post.comments);
    fn walk(comments: &[domain::Comment], depth: usize) {
        for c in comments {
            println!(
                "      {}- [{}] {}: {} (♥ {})",
                "  ".repeat(depth),
                c.created_at.format("%Y-%m-%d %H:%M"),
                c.author_name,
                c.content,
                c.likes
            );
            walk(&c.replies, depth + 1);
        }
    }
    walk(&post.replies, 0);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let secret = std::env::var("CAMPUSWORK_SECURITY__SESSION_SECRET")
        .unwrap_or_else(|_| "change_me_please".to_string());

    let client = Client::new();
    let student = Session::new(
        &client,
        Actor {
            id: "stu-001".into(),
            name: "Ferris".into(),
            role: UserRole::Student,
        },
        &secret,
    )?;
    let lecturer = Session::new(
        &client,
        Actor {
            id: "lec-001".into(),
            name: "Dr. Crab".into(),
            role: UserRole::Lecturer,
        },
        &secret,
    )?;
    println!("Starting CampusWork test client...");

    println!("\n[1/5] Creating a post...");
    let post = read_post(
        student
            .request(reqwest::Method::POST, "/api/posts")
            .json(&json!({
                "title": "Projet compilateur",
                "content": "Retours bienvenus sur l'analyseur syntaxique.",
                "category": "Discussion"
            })),
    )
    .await
    .context("Is the server running?")?;
    print_thread(&post);

    println!("\n[2/5] Posting a root comment...");
    let mut composer = Composer::new();
    composer.set_input("La grammaire est-elle LL(1) ?");
    let action = composer.submit().context("Composer had no input")?;
    let post = lecturer.submit(&post, action).await?;
    print_thread(&post);

    println!("\n[3/5] Replying to it...");
    let question = post.replies[0].clone();
    composer.reply_to(&question);
    composer.set_input("Oui, après factorisation à gauche.");
    let action = composer.submit().context("Composer had no input")?;
    let post = student.submit(&post, action).await?;
    print_thread(&post);

    println!("\n[4/5] Liking and editing...");
    let post = student
        .submit(
            &post,
            ThreadAction::ToggleLike {
                comment_id: question.id.clone(),
            },
        )
        .await?;
    composer.edit(&question, &lecturer.actor)?;
    composer.set_input(format!("{} (et sans récursion à gauche)", composer.input()));
    let action = composer.submit().context("Composer had no input")?;
    let post = lecturer.submit(&post, action).await?;
    print_thread(&post);

    println!("\n[5/5] Deleting the root comment with its replies...");
    let post = lecturer
        .submit(
            &post,
            ThreadAction::DeleteComment {
                comment_id: question.id,
            },
        )
        .await?;
    print_thread(&post);

    Ok(())
}
