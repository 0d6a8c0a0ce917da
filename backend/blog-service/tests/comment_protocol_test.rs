mod common;

use actix_web::{http::StatusCode, ResponseError};
use blog_service::models::{Comment, RecordId};
use blog_service::services::CommentService;
use blog_service::store::{InMemoryRecordStore, RecordStore, StoreError};
use std::sync::Arc;

use common::{post, user, InstrumentedStore};

fn seeded() -> (Arc<InMemoryRecordStore>, RecordId, RecordId) {
    let ada = user("1", "ada");
    let hello = post("2", &ada, "Hello World", 0);
    let ids = (ada.id.clone(), hello.id.clone());
    let store = Arc::new(InMemoryRecordStore::seeded(vec![ada], vec![hello]));
    (store, ids.0, ids.1)
}

#[tokio::test]
async fn concurrent_adds_on_one_post_lose_an_update() {
    let (memory, user_id, post_id) = seeded();
    let store = Arc::new(InstrumentedStore::new(memory.clone()).with_read_barrier(2));
    let service = CommentService::new(store.clone());

    let first = Comment::new(user_id.clone(), "ada", "first");
    let second = Comment::new(user_id.clone(), "ada", "second");

    // Both mutations read the same snapshot before either writes.
    let (a, b) = tokio::join!(
        service.append_comment(&post_id, first.clone()),
        service.append_comment(&post_id, second.clone()),
    );
    a.unwrap();
    b.unwrap();

    let stored = memory.get_post(&post_id).await.unwrap();
    assert_eq!(store.writes(), 2);
    assert_eq!(stored.comments.len(), 1);
    assert!(stored.comments[0] == first || stored.comments[0] == second);
}

#[tokio::test]
async fn sequential_adds_keep_every_comment() {
    let (memory, user_id, post_id) = seeded();
    let service = CommentService::new(memory.clone());

    for body in ["one", "two", "three"] {
        service
            .append_comment(&post_id, Comment::new(user_id.clone(), "ada", body))
            .await
            .unwrap();
    }

    let stored = memory.get_post(&post_id).await.unwrap();
    let bodies: Vec<&str> = stored.comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(bodies, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn failed_fetch_aborts_without_writing() {
    let (memory, user_id, post_id) = seeded();
    let store = Arc::new(
        InstrumentedStore::new(memory)
            .failing_post_reads(StoreError::Transport("connection refused".into())),
    );
    let service = CommentService::new(store.clone());

    let err = service
        .add_comment(&post_id, &user_id, "hello")
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(err.to_string().starts_with("Failed to add comment"));
    assert_eq!(store.writes(), 0);

    let err = service
        .delete_comment(&post_id, &user_id, "c1")
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to delete comment"));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn deleting_missing_comment_skips_the_write() {
    let (memory, user_id, post_id) = seeded();
    let store = Arc::new(InstrumentedStore::new(memory));
    let service = CommentService::new(store.clone());

    let post = service
        .delete_comment(&post_id, &user_id, "not-there")
        .await
        .unwrap();

    assert!(post.comments.is_empty());
    assert_eq!(store.writes(), 0);
}
