mod common;

use axum::http::StatusCode;
use common::{TestApp, TestUser};
use serde_json::{json, Value};

async fn create_post(app: &TestApp, user: &TestUser, title: &str, content: &str) -> i64 {
    let response = app
        .post(
            "/api/posts",
            Some(&user.token),
            json!({ "title": title, "content": content }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["id"].as_i64().unwrap()
}

fn titles(page: &Value) -> Vec<&str> {
    page["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn create_and_read_posts() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;

    let anonymous = app
        .post("/api/posts", None, json!({ "title": "Hi", "content": "There" }))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let invalid = app
        .post("/api/posts", Some(&alice.token), json!({ "title": "" }))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert!(invalid.field_errors()["title"].is_array());
    assert!(invalid.field_errors()["content"].is_array());

    let id = create_post(&app, &alice, "First", "Hello world").await;

    let detail = app.get(&format!("/api/posts/{id}"), None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["author"], "alice");
    assert_eq!(detail.body["author_id"], alice.id);
    assert_eq!(detail.body["comments_count"], 0);
    assert_eq!(detail.body["likes_count"], 0);
    assert_eq!(detail.body["liked_by_user"], false);

    let list = app.get("/api/posts", None).await;
    assert_eq!(list.body["count"], 1);
    assert_eq!(titles(&list.body), ["First"]);

    assert_eq!(
        app.get("/api/posts/9999", None).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn only_the_author_may_change_a_post() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let id = create_post(&app, &alice, "Mine", "Body").await;
    let url = format!("/api/posts/{id}");

    let hijack = app.patch(&url, Some(&bob.token), json!({ "title": "Bob's" })).await;
    assert_eq!(hijack.status, StatusCode::FORBIDDEN);
    assert_eq!(
        app.delete(&url, Some(&bob.token)).await.status,
        StatusCode::FORBIDDEN
    );

    let patched = app
        .patch(&url, Some(&alice.token), json!({ "title": "Renamed" }))
        .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.body["title"], "Renamed");
    assert_eq!(patched.body["content"], "Body");

    let incomplete = app
        .put(&url, Some(&alice.token), json!({ "title": "Only" }))
        .await;
    assert_eq!(incomplete.status, StatusCode::BAD_REQUEST);

    let put = app
        .put(
            &url,
            Some(&alice.token),
            json!({ "title": "Whole", "content": "New body" }),
        )
        .await;
    assert_eq!(put.body["content"], "New body");

    assert_eq!(
        app.delete(&url, Some(&alice.token)).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(app.get(&url, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn likes_are_counted_once_per_user() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let id = create_post(&app, &alice, "Likeable", "Body").await;
    let like = format!("/api/posts/{id}/like");
    let unlike = format!("/api/posts/{id}/unlike");

    let liked = app.post(&like, Some(&bob.token), json!({})).await;
    assert_eq!(liked.status, StatusCode::CREATED);
    assert_eq!(liked.body["message"], "Post liked");

    let twice = app.post(&like, Some(&bob.token), json!({})).await;
    assert_eq!(twice.status, StatusCode::BAD_REQUEST);
    assert_eq!(twice.message(), "You have already liked this post");

    let as_bob = app.get(&format!("/api/posts/{id}"), Some(&bob.token)).await;
    assert_eq!(as_bob.body["likes_count"], 1);
    assert_eq!(as_bob.body["liked_by_user"], true);

    let as_alice = app.get(&format!("/api/posts/{id}"), Some(&alice.token)).await;
    assert_eq!(as_alice.body["liked_by_user"], false);

    let unliked = app.post(&unlike, Some(&bob.token), json!({})).await;
    assert_eq!(unliked.status, StatusCode::OK);
    assert_eq!(unliked.body["message"], "Post unliked");

    let again = app.post(&unlike, Some(&bob.token), json!({})).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.message(), "You have not liked this post");

    assert_eq!(
        app.post("/api/posts/9999/like", Some(&bob.token), json!({}))
            .await
            .status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.post(&like, None, json!({})).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn comments_attach_to_existing_posts() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let id = create_post(&app, &alice, "Discuss", "Body").await;
    let other = create_post(&app, &alice, "Other", "Body").await;

    let unknown = app
        .post(
            "/api/posts/comments",
            Some(&bob.token),
            json!({ "post": 9999, "content": "Hello?" }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert!(unknown.field_errors()["post"].is_array());

    for text in ["First!", "Second"] {
        let created = app
            .post(
                "/api/posts/comments",
                Some(&bob.token),
                json!({ "post": id, "content": text }),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(created.body["author"], "bob");
    }
    app.post(
        "/api/posts/comments",
        Some(&alice.token),
        json!({ "post": other, "content": "Elsewhere" }),
    )
    .await;

    let filtered = app
        .get(&format!("/api/posts/comments?post={id}"), None)
        .await;
    assert_eq!(filtered.body["count"], 2);
    assert_eq!(filtered.body["results"][0]["content"], "First!");
    assert_eq!(filtered.body["results"][1]["content"], "Second");

    let all = app.get("/api/posts/comments", None).await;
    assert_eq!(all.body["count"], 3);

    let detail = app.get(&format!("/api/posts/{id}"), None).await;
    assert_eq!(detail.body["comments_count"], 2);
    assert_eq!(detail.body["comments"][0]["content"], "First!");

    let comment_id = filtered.body["results"][0]["id"].as_i64().unwrap();
    let comment = format!("/api/posts/comments/{comment_id}");
    assert_eq!(
        app.patch(&comment, Some(&alice.token), json!({ "content": "Mine now" }))
            .await
            .status,
        StatusCode::FORBIDDEN
    );
    let edited = app
        .patch(&comment, Some(&bob.token), json!({ "content": "Edited" }))
        .await;
    assert_eq!(edited.body["content"], "Edited");
    assert_eq!(
        app.delete(&comment, Some(&bob.token)).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(app.get(&comment, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_is_paginated_newest_first() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    for n in 1..=12 {
        create_post(&app, &alice, &format!("Post {n}"), "Body").await;
    }

    let first = app.get("/api/posts", None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["count"], 12);
    assert_eq!(first.body["results"].as_array().unwrap().len(), 10);
    assert_eq!(first.body["results"][0]["title"], "Post 12");
    assert_eq!(first.body["next"], "/api/posts?page=2");
    assert!(first.body["previous"].is_null());

    let second = app.get("/api/posts?page=2", None).await;
    assert_eq!(titles(&second.body), ["Post 2", "Post 1"]);
    assert!(second.body["next"].is_null());
    assert_eq!(second.body["previous"], "/api/posts");

    let sized = app.get("/api/posts?page_size=5&page=3", None).await;
    assert_eq!(sized.body["results"].as_array().unwrap().len(), 2);

    assert_eq!(
        app.get("/api/posts?page=3", None).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/api/posts?page=abc", None).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn search_matches_title_or_content() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    create_post(&app, &alice, "Rust tips", "Ownership explained").await;
    create_post(&app, &alice, "Gardening", "Tomatoes love rust-free tools").await;
    create_post(&app, &alice, "Cooking", "Pasta").await;

    let rust = app.get("/api/posts?search=rust", None).await;
    assert_eq!(titles(&rust.body), ["Gardening", "Rust tips"]);

    let both = app.get("/api/posts?search=rust%20ownership", None).await;
    assert_eq!(titles(&both.body), ["Rust tips"]);

    let none = app.get("/api/posts?search=python", None).await;
    assert_eq!(none.body["count"], 0);
}

#[tokio::test]
async fn feed_shows_followed_authors_only() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let carol = app.register("carol").await;

    create_post(&app, &bob, "Bob one", "Body").await;
    create_post(&app, &carol, "Carol one", "Body").await;
    create_post(&app, &bob, "Bob two", "Body").await;
    create_post(&app, &alice, "Alice own", "Body").await;

    let empty = app.get("/api/posts/feed", Some(&alice.token)).await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body["count"], 0);

    app.post(
        &format!("/api/accounts/follow/{}", bob.id),
        Some(&alice.token),
        json!({}),
    )
    .await;

    let feed = app.get("/api/posts/feed", Some(&alice.token)).await;
    assert_eq!(titles(&feed.body), ["Bob two", "Bob one"]);

    assert_eq!(
        app.get("/api/posts/feed", None).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn non_author_is_forbidden_before_the_body_is_read() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let id = create_post(&app, &alice, "Mine", "Body").await;

    let post = app
        .patch(&format!("/api/posts/{id}"), Some(&bob.token), json!({ "title": 7 }))
        .await;
    assert_eq!(post.status, StatusCode::FORBIDDEN);

    let comment = app
        .post(
            "/api/posts/comments",
            Some(&alice.token),
            json!({ "post": id, "content": "Mine too" }),
        )
        .await;
    let comment_id = comment.body["id"].as_i64().unwrap();
    let edit = app
        .send(
            axum::http::Method::PUT,
            &format!("/api/posts/comments/{comment_id}"),
            Some(&bob.token),
            None,
        )
        .await;
    assert_eq!(edit.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn search_wildcards_match_only_themselves() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    create_post(&app, &alice, "Rust tips", "Ownership explained").await;

    let percent = app.get("/api/posts?search=%25", None).await;
    assert_eq!(percent.body["count"], 0);
    let underscore = app.get("/api/posts?search=_", None).await;
    assert_eq!(underscore.body["count"], 0);

    create_post(&app, &alice, "Progress", "We are 100% done_here").await;
    let literal = app.get("/api/posts?search=100%25", None).await;
    assert_eq!(titles(&literal.body), ["Progress"]);
    let underscore = app.get("/api/posts?search=_", None).await;
    assert_eq!(titles(&underscore.body), ["Progress"]);
}
