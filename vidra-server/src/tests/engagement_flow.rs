use axum::http::StatusCode;
use serde_json::Value;
use uuid::Uuid;
use vidra_core::domain::NewVideo;
use vidra_core::store::VideoRepository;
use vidra_core::store::memory::MemoryStore;

use super::{login, test_server};

async fn seed_video(store: &MemoryStore, owner_id: Uuid, title: &str) -> Uuid {
    store
        .create_video(&NewVideo {
            owner_id,
            title: title.to_string(),
            description: String::new(),
            video_url: format!("https://cdn.example.com/{title}.mp4"),
            thumbnail_url: None,
            duration: 120.0,
            is_published: true,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn toggle_requires_authentication() {
    let (server, _) = test_server();
    let response = server
        .post(&format!("/api/v1/engagement/video/{}", Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn video_like_toggles_state_and_counter() {
    let (server, store) = test_server();
    let (user, access, _) = login(&server, "ivan").await;
    let owner_id = Uuid::parse_str(user["id"].as_str().unwrap()).unwrap();
    let video_id = seed_video(&store, owner_id, "first").await;

    let liked = server
        .post(&format!("/api/v1/engagement/video/{video_id}"))
        .authorization_bearer(&access)
        .await;
    liked.assert_status_ok();
    let body = liked.json::<Value>();
    assert_eq!(body["data"]["state"], "Active");
    assert_eq!(body["data"]["counter"], 1);

    let unliked = server
        .post(&format!("/api/v1/engagement/video/{video_id}"))
        .authorization_bearer(&access)
        .await;
    unliked.assert_status_ok();
    let body = unliked.json::<Value>();
    assert_eq!(body["data"]["state"], "Inactive");
    assert_eq!(body["data"]["counter"], 0);
}

#[tokio::test]
async fn likes_from_distinct_users_accumulate() {
    let (server, store) = test_server();
    let (_, access_a, _) = login(&server, "judy").await;
    let (_, access_b, _) = login(&server, "karl").await;
    let video_id = seed_video(&store, Uuid::new_v4(), "popular").await;

    for access in [&access_a, &access_b] {
        server
            .post(&format!("/api/v1/engagement/video/{video_id}"))
            .authorization_bearer(access)
            .await
            .assert_status_ok();
    }

    let second = server
        .post(&format!("/api/v1/engagement/video/{video_id}"))
        .authorization_bearer(&access_b)
        .await;
    // B's second call unlikes; A's like is untouched.
    assert_eq!(second.json::<Value>()["data"]["counter"], 1);
}

#[tokio::test]
async fn unknown_kind_segment_is_rejected() {
    let (server, _) = test_server();
    let (_, access, _) = login(&server, "leo").await;

    let response = server
        .post(&format!("/api/v1/engagement/playlist/{}", Uuid::new_v4()))
        .authorization_bearer(&access)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_subject_is_not_found() {
    let (server, _) = test_server();
    let (_, access, _) = login(&server, "mallory").await;

    let response = server
        .post(&format!("/api/v1/engagement/video/{}", Uuid::new_v4()))
        .authorization_bearer(&access)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_subject_id_is_bad_request() {
    let (server, _) = test_server();
    let (_, access, _) = login(&server, "nina").await;

    let response = server
        .post("/api/v1/engagement/video/not-a-uuid")
        .authorization_bearer(&access)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn subscription_toggle_updates_subscriber_count() {
    let (server, _) = test_server();
    let (channel, _, _) = login(&server, "owner").await;
    let (_, access, _) = login(&server, "viewer").await;
    let channel_id = channel["id"].as_str().unwrap();

    let subscribed = server
        .post(&format!("/api/v1/subscriptions/{channel_id}"))
        .authorization_bearer(&access)
        .await;
    subscribed.assert_status_ok();
    let body = subscribed.json::<Value>();
    assert_eq!(body["data"]["state"], "Active");
    assert_eq!(body["data"]["counter"], 1);

    let unsubscribed = server
        .post(&format!("/api/v1/subscriptions/{channel_id}"))
        .authorization_bearer(&access)
        .await;
    assert_eq!(unsubscribed.json::<Value>()["data"]["counter"], 0);
}
