//! Helpers shared by the in-module tests.

use std::net::SocketAddr;

use axum::Router;

use crate::ats::models::ScoreInput;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn sample_input() -> ScoreInput {
    ScoreInput {
        resume_id: "r1".to_string(),
        resume_text: "Experienced in Node.js, TypeScript and PostgreSQL".to_string(),
        job_description: "Looking for Node.js and PostgreSQL developer".to_string(),
        required_skills: vec!["Node.js".to_string(), "PostgreSQL".to_string()],
        bonus_skills: vec!["TypeScript".to_string()],
    }
}
