mod common;

use axum::http::StatusCode;
use common::{TestApp, TestUser};
use serde_json::json;

async fn post_by(app: &TestApp, user: &TestUser) -> i64 {
    app.post(
        "/api/posts",
        Some(&user.token),
        json!({ "title": "News", "content": "Something happened" }),
    )
    .await
    .body["id"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn social_actions_notify_the_other_party() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let post = post_by(&app, &alice).await;

    app.post(
        &format!("/api/accounts/follow/{}", alice.id),
        Some(&bob.token),
        json!({}),
    )
    .await;
    app.post(&format!("/api/posts/{post}/like"), Some(&bob.token), json!({}))
        .await;
    app.post(
        "/api/posts/comments",
        Some(&bob.token),
        json!({ "post": post, "content": "Nice" }),
    )
    .await;

    let inbox = app.get("/api/notifications", Some(&alice.token)).await;
    assert_eq!(inbox.status, StatusCode::OK);
    let items = inbox.body.as_array().unwrap();
    assert_eq!(items.len(), 3);

    assert_eq!(items[0]["verb"], "commented on your post");
    assert_eq!(items[0]["target_type"], "post");
    assert_eq!(items[0]["target_id"], post);
    assert_eq!(items[1]["verb"], "liked your post");
    assert_eq!(items[2]["verb"], "started following you");
    assert_eq!(items[2]["target_type"], "user");
    assert_eq!(items[2]["target_id"], alice.id);
    for item in items {
        assert_eq!(item["actor"], "bob");
        assert_eq!(item["actor_id"], bob.id);
        assert_eq!(item["read"], false);
    }

    let bob_inbox = app.get("/api/notifications", Some(&bob.token)).await;
    assert!(bob_inbox.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn acting_on_your_own_post_is_silent() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let post = post_by(&app, &alice).await;

    app.post(&format!("/api/posts/{post}/like"), Some(&alice.token), json!({}))
        .await;
    app.post(
        "/api/posts/comments",
        Some(&alice.token),
        json!({ "post": post, "content": "Replying to myself" }),
    )
    .await;

    let count = app
        .get("/api/notifications/unread-count", Some(&alice.token))
        .await;
    assert_eq!(count.body["unread_count"], 0);
}

#[tokio::test]
async fn rejected_duplicates_leave_no_notification() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let post = post_by(&app, &alice).await;
    let like = format!("/api/posts/{post}/like");
    let follow = format!("/api/accounts/follow/{}", alice.id);

    assert_eq!(
        app.post(&like, Some(&bob.token), json!({})).await.status,
        StatusCode::CREATED
    );
    assert_eq!(
        app.post(&like, Some(&bob.token), json!({})).await.status,
        StatusCode::BAD_REQUEST
    );
    app.post(&follow, Some(&bob.token), json!({})).await;
    assert_eq!(
        app.post(&follow, Some(&bob.token), json!({})).await.status,
        StatusCode::BAD_REQUEST
    );

    let inbox = app.get("/api/notifications", Some(&alice.token)).await;
    assert_eq!(inbox.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn marking_read() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let carol = app.register("carol").await;

    for follower in [&bob, &carol] {
        app.post(
            &format!("/api/accounts/follow/{}", alice.id),
            Some(&follower.token),
            json!({}),
        )
        .await;
    }

    let count = app
        .get("/api/notifications/unread-count", Some(&alice.token))
        .await;
    assert_eq!(count.body["unread_count"], 2);

    let inbox = app.get("/api/notifications", Some(&alice.token)).await;
    let first = inbox.body[0]["id"].as_i64().unwrap();
    let read_url = format!("/api/notifications/{first}/read");

    let stranger = app.post(&read_url, Some(&bob.token), json!({})).await;
    assert_eq!(stranger.status, StatusCode::NOT_FOUND);
    assert_eq!(stranger.message(), "Notification not found");

    let marked = app.post(&read_url, Some(&alice.token), json!({})).await;
    assert_eq!(marked.status, StatusCode::OK);
    assert_eq!(marked.body["message"], "Notification marked as read");

    let count = app
        .get("/api/notifications/unread-count", Some(&alice.token))
        .await;
    assert_eq!(count.body["unread_count"], 1);

    let all = app
        .post("/api/notifications/read-all", Some(&alice.token), json!({}))
        .await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body["message"], "All notifications marked as read");
    assert_eq!(all.body["updated"], 1);

    let count = app
        .get("/api/notifications/unread-count", Some(&alice.token))
        .await;
    assert_eq!(count.body["unread_count"], 0);

    assert_eq!(
        app.get("/api/notifications", None).await.status,
        StatusCode::UNAUTHORIZED
    );
}
