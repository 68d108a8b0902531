//! Integration tests: engagement toggles and the derived read models
//!
//! Coverage:
//! - Like/unlike parity for videos, comments and tweets
//! - Subscribe/unsubscribe and exact channel statistics
//! - Liked-videos feed only lists video likes
//! - Malformed ids and missing tokens

mod common;

use actix_web::{http::StatusCode, test};
use common::{bearer, init_app, TestContext};
use serde_json::Value;
use uuid::Uuid;
use vidtube_service::db::EntityStore;

#[actix_web::test]
async fn test_video_like_toggles_alternate() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("owner").await;
    let fan = ctx.seed_user("fan").await;
    let video = ctx.seed_video(owner, "launch", true).await;
    let app = init_app(&ctx).await;

    let expected = [
        (true, 1, "Video Liked Successfully"),
        (false, 0, "Video Unliked Successfully"),
        (true, 1, "Video Liked Successfully"),
    ];
    for (active, count, message) in expected {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/videos/{}/like", video))
            .insert_header(bearer(fan))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["active"], active);
        assert_eq!(body["data"]["count"], count);
        assert_eq!(body["message"], message);
    }

    let liked = ctx.store.list_liked_videos(fan).await.unwrap();
    assert_eq!(liked.len(), 1);
}

#[actix_web::test]
async fn test_likes_from_different_users_accumulate() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("owner").await;
    let video = ctx.seed_video(owner, "popular", true).await;
    let app = init_app(&ctx).await;

    for (i, name) in ["a", "b", "c"].iter().enumerate() {
        let user = ctx.seed_user(name).await;
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/videos/{}/like", video))
            .insert_header(bearer(user))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["count"], (i + 1) as i64);
    }
}

#[actix_web::test]
async fn test_comment_and_tweet_likes_use_their_own_labels() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("owner").await;
    let video = ctx.seed_video(owner, "talk", true).await;
    let comment = ctx.store.insert_comment(video, owner, "first").await.unwrap();
    let post = ctx.store.insert_post(owner, "hello followers").await.unwrap();
    let app = init_app(&ctx).await;

    let cases = [
        (format!("/api/v1/comments/{}/like", comment.id), "Comment Liked Successfully"),
        (format!("/api/v1/tweets/{}/like", post.id), "Tweet Liked Successfully"),
        (format!("/api/v1/posts/{}/like", post.id), "Tweet Unliked Successfully"),
    ];
    for (uri, message) in cases {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(owner))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], message, "{}", uri);
    }
}

#[actix_web::test]
async fn test_liked_videos_lists_only_video_likes() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("owner").await;
    let fan = ctx.seed_user("fan").await;
    let liked = ctx.seed_video(owner, "liked one", true).await;
    let other = ctx.seed_video(owner, "commented one", true).await;
    let comment = ctx.store.insert_comment(other, owner, "pinned").await.unwrap();
    let post = ctx.store.insert_post(owner, "news").await.unwrap();
    let app = init_app(&ctx).await;

    for uri in [
        format!("/api/v1/videos/{}/like", liked),
        format!("/api/v1/comments/{}/like", comment.id),
        format!("/api/v1/tweets/{}/like", post.id),
    ] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(fan))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me/liked-videos")
        .insert_header(bearer(fan))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let videos = body["data"].as_array().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["id"], liked.to_string());
    assert_eq!(videos[0]["title"], "liked one");
    assert_eq!(videos[0]["thumbnail"], "https://media.test/liked one.png");
    assert_eq!(videos[0]["description"], "liked one description");
}

#[actix_web::test]
async fn test_liked_videos_empty_is_success() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("lurker").await;
    let app = init_app(&ctx).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me/liked-videos")
        .insert_header(bearer(user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"], serde_json::json!([]));
    assert_eq!(body["message"], "You haven't liked any Video yet");
}

#[actix_web::test]
async fn test_subscribe_twice_returns_to_zero() {
    let ctx = TestContext::new();
    let channel = ctx.seed_user("channel").await;
    let viewer = ctx.seed_user("viewer").await;
    let app = init_app(&ctx).await;

    let subscribe = || {
        test::TestRequest::post()
            .uri(&format!("/api/v1/channels/{}/subscribe", channel))
            .insert_header(bearer(viewer))
            .to_request()
    };

    let first: Value = test::call_and_read_body_json(&app, subscribe()).await;
    assert_eq!(first["message"], "Subscribed Successfully");
    assert_eq!(first["data"]["count"], 1);

    let second: Value = test::call_and_read_body_json(&app, subscribe()).await;
    assert_eq!(second["message"], "Unsubscribed Successfully");
    assert_eq!(second["data"]["active"], false);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/{}/stats", channel))
        .insert_header(bearer(viewer))
        .to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["data"]["subscriberCount"], 0);
    assert_eq!(stats["data"]["isSubscribed"], false);
}

#[actix_web::test]
async fn test_channel_stats_are_exact() {
    let ctx = TestContext::new();
    let channel = ctx.seed_user("channel").await;
    let fans: Vec<Uuid> = vec![
        ctx.seed_user("fan1").await,
        ctx.seed_user("fan2").await,
        ctx.seed_user("fan3").await,
    ];
    let video = ctx.seed_video(channel, "hit", true).await;
    ctx.seed_video(channel, "draft", false).await;
    let app = init_app(&ctx).await;

    for fan in &fans {
        for uri in [
            format!("/api/v1/channels/{}/subscribe", channel),
            format!("/api/v1/videos/{}/like", video),
        ] {
            let req = test::TestRequest::post()
                .uri(&uri)
                .insert_header(bearer(*fan))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/{}/stats", channel))
        .insert_header(bearer(fans[0]))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let stats = &body["data"];
    assert_eq!(stats["subscriberCount"], 3);
    assert_eq!(stats["subscribedToCount"], 0);
    assert_eq!(stats["isSubscribed"], true);
    assert_eq!(stats["totalVideoCount"], 2);
    assert_eq!(stats["totalLikesAcrossVideos"], 3);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/{}/subscribers", channel))
        .insert_header(bearer(fans[0]))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}/subscriptions", fans[1]))
        .insert_header(bearer(fans[0]))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"][0]["id"], channel.to_string());
}

#[actix_web::test]
async fn test_self_subscription_is_rejected() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("narcissus").await;
    let app = init_app(&ctx).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/channels/{}/subscribe", user))
        .insert_header(bearer(user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 400);
}

#[actix_web::test]
async fn test_toggle_on_missing_or_malformed_target() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("user").await;
    let app = init_app(&ctx).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/videos/{}/like", Uuid::new_v4()))
        .insert_header(bearer(user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/videos/not-a-uuid/like")
        .insert_header(bearer(user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid path parameter"));
}

#[actix_web::test]
async fn test_actor_without_profile_cannot_engage() {
    let ctx = TestContext::new();
    let channel = ctx.seed_user("channel").await;
    let video = ctx.seed_video(channel, "open", true).await;
    let ghost = Uuid::new_v4();
    let app = init_app(&ctx).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/videos/{}/comments", video))
        .insert_header(bearer(ghost))
        .set_json(serde_json::json!({ "content": "hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User not found");

    for uri in [
        format!("/api/v1/channels/{}/subscribe", channel),
        format!("/api/v1/videos/{}/like", video),
    ] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(ghost))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/{}/stats", channel))
        .insert_header(bearer(channel))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["subscriberCount"], 0);
    assert_eq!(body["data"]["totalLikesAcrossVideos"], 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/videos/{}/comments", video))
        .insert_header(bearer(channel))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("owner").await;
    let video = ctx.seed_video(owner, "v", true).await;
    let app = init_app(&ctx).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/videos/{}/like", video))
        .to_request();
    let err = test::try_call_service(&app, req)
        .await
        .err()
        .expect("request without token must fail");
    assert_eq!(
        err.as_response_error().status_code(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
