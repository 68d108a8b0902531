//! Integration tests: video catalogue, uploads and draft visibility

mod common;

use actix_web::{http::StatusCode, test};
use common::{bearer, init_app, multipart_body, video_upload_parts, FakeGateway, FormPart, TestContext};
use serde_json::Value;
use uuid::Uuid;
use vidtube_service::db::EntityStore;

fn multipart_request(uri: &str, user: Uuid, parts: &[FormPart<'_>]) -> test::TestRequest {
    let (content_type, body) = multipart_body(parts);
    test::TestRequest::post()
        .uri(uri)
        .insert_header(bearer(user))
        .insert_header(("content-type", content_type))
        .set_payload(body)
}

#[actix_web::test]
async fn test_second_page_holds_records_eleven_to_twenty() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("owner").await;
    let viewer = ctx.seed_user("viewer").await;
    for i in 0..25 {
        ctx.seed_video(owner, &format!("video {:02}", i), true).await;
    }
    let app = init_app(&ctx).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/videos?page=2&limit=10&sortBy=createdAt&sortType=asc")
        .insert_header(bearer(viewer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let titles: Vec<&str> = body["data"]["videos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["title"].as_str().unwrap())
        .collect();
    let expected: Vec<String> = (10..20).map(|i| format!("video {:02}", i)).collect();
    assert_eq!(titles, expected);

    let pagination = &body["data"]["pagination"];
    assert_eq!(pagination["totalVideos"], 25);
    assert_eq!(pagination["totalPages"], 3);
    assert_eq!(pagination["currentPage"], 2);
    assert_eq!(pagination["limit"], 10);
}

#[actix_web::test]
async fn test_listing_filters_by_title_and_owner() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice").await;
    let bob = ctx.seed_user("bob").await;
    ctx.seed_video(alice, "Rust Tutorial", true).await;
    ctx.seed_video(alice, "Cooking", true).await;
    ctx.seed_video(bob, "rust in production", true).await;
    let app = init_app(&ctx).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/videos?query=RUST")
        .insert_header(bearer(bob))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["pagination"]["totalVideos"], 2);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/videos?query=rust&userId={}", alice))
        .insert_header(bearer(bob))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let videos = body["data"]["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["title"], "Rust Tutorial");
    assert_eq!(videos[0]["owner"], alice.to_string());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/videos?userId={}", Uuid::new_v4()))
        .insert_header(bearer(bob))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_listing_rejects_bad_paging_and_sort() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("user").await;
    let app = init_app(&ctx).await;

    for uri in [
        "/api/v1/videos?page=0",
        "/api/v1/videos?limit=0",
        "/api/v1/videos?limit=101",
        "/api/v1/videos?sortBy=views",
        "/api/v1/videos?sortType=sideways",
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(user))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[actix_web::test]
async fn test_drafts_are_visible_only_to_their_owner() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("owner").await;
    let viewer = ctx.seed_user("viewer").await;
    let draft = ctx.seed_video(owner, "work in progress", false).await;
    let app = init_app(&ctx).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/videos/{}", draft))
        .insert_header(bearer(viewer))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/videos/{}", draft))
        .insert_header(bearer(owner))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["isPublished"], false);
    assert_eq!(body["data"]["ownerDetails"]["username"], "owner");

    let req = test::TestRequest::get()
        .uri("/api/v1/videos")
        .insert_header(bearer(viewer))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["pagination"]["totalVideos"], 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/{}/videos", owner))
        .insert_header(bearer(viewer))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "No videos found");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/videos/{}/comments", draft))
        .insert_header(bearer(viewer))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_publish_video_creates_draft_and_clears_staging() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("creator").await;
    let app = init_app(&ctx).await;

    let req = multipart_request("/api/v1/videos", owner, &video_upload_parts("My first video"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    let video = &body["data"];
    assert_eq!(video["title"], "My first video");
    assert_eq!(video["isPublished"], false);
    assert_eq!(video["videoFile"], "https://media.test/upload/1");
    assert_eq!(video["thumbnail"], "https://media.test/upload/2");
    assert_eq!(video["duration"], 12.5);
    assert_eq!(video["owner"], owner.to_string());

    assert_eq!(ctx.media.calls(), 2);
    assert_eq!(ctx.staged_files(), 0);
}

#[actix_web::test]
async fn test_publish_video_requires_both_files() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("creator").await;
    let app = init_app(&ctx).await;

    let mut parts = video_upload_parts("No thumbnail");
    parts.pop();
    let req = multipart_request("/api/v1/videos", owner, &parts).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "thumbnail is required");
    assert_eq!(ctx.media.calls(), 0);
    assert_eq!(ctx.staged_files(), 0);
}

#[actix_web::test]
async fn test_publish_video_rejects_wrong_media_type() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("creator").await;
    let app = init_app(&ctx).await;

    let parts = vec![
        FormPart::Text("title", "t"),
        FormPart::Text("description", "d"),
        FormPart::File {
            name: "videoFile",
            file_name: "notes.txt",
            content_type: "text/plain",
            bytes: b"hello",
        },
    ];
    let req = multipart_request("/api/v1/videos", owner, &parts).to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn test_gateway_failure_stores_nothing() {
    for failing_call in [1, 2] {
        let ctx = TestContext::with_gateway(FakeGateway::failing_on(vec![failing_call]));
        let owner = ctx.seed_user("creator").await;
        let app = init_app(&ctx).await;

        let req = multipart_request("/api/v1/videos", owner, &video_upload_parts("Doomed"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);

        let stored = ctx.store.list_owner_videos(owner, true).await.unwrap();
        assert!(stored.is_empty(), "failing call {}", failing_call);
        assert_eq!(ctx.staged_files(), 0);
    }
}

#[actix_web::test]
async fn test_owner_updates_title_and_thumbnail() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("owner").await;
    let intruder = ctx.seed_user("intruder").await;
    let video = ctx.seed_video(owner, "old title", true).await;
    let app = init_app(&ctx).await;
    let uri = format!("/api/v1/videos/{}", video);

    let parts = vec![
        FormPart::Text("title", "new title"),
        FormPart::File {
            name: "thumbnail",
            file_name: "fresh.jpg",
            content_type: "image/jpeg",
            bytes: b"jpeg",
        },
    ];

    let req = multipart_request(&uri, intruder, &parts)
        .method(actix_web::http::Method::PATCH)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(ctx.media.calls(), 0);

    let req = multipart_request(&uri, owner, &parts)
        .method(actix_web::http::Method::PATCH)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["title"], "new title");
    assert_eq!(body["data"]["description"], "old title description");
    assert_eq!(body["data"]["thumbnail"], "https://media.test/upload/1");

    let req = multipart_request(&uri, owner, &[])
        .method(actix_web::http::Method::PATCH)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn test_title_longer_than_column_is_rejected() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("creator").await;
    let video = ctx.seed_video(owner, "short", true).await;
    let app = init_app(&ctx).await;
    let too_long = "x".repeat(201);

    let req = multipart_request("/api/v1/videos", owner, &video_upload_parts(&too_long))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"], serde_json::json!(["title: must be 1-200 characters"]));
    assert_eq!(ctx.media.calls(), 0);
    assert_eq!(ctx.staged_files(), 0);

    let uri = format!("/api/v1/videos/{}", video);
    let req = multipart_request(&uri, owner, &[FormPart::Text("title", &too_long)])
        .method(actix_web::http::Method::PATCH)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
    let stored = ctx.store.find_video(video).await.unwrap().unwrap();
    assert_eq!(stored.title, "short");

    let longest = "y".repeat(200);
    let req = multipart_request(&uri, owner, &[FormPart::Text("title", &longest)])
        .method(actix_web::http::Method::PATCH)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["title"], longest);
}

#[actix_web::test]
async fn test_comment_pages_are_oldest_first() {
    let ctx = TestContext::new();
    let owner = ctx.seed_user("owner").await;
    let video = ctx.seed_video(owner, "chatty", true).await;
    for i in 0..25 {
        ctx.store
            .insert_comment(video, owner, &format!("comment {:02}", i))
            .await
            .unwrap();
    }
    let app = init_app(&ctx).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/videos/{}/comments?page=2&limit=10", video))
        .insert_header(bearer(owner))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let contents: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["content"].as_str().unwrap())
        .collect();
    let expected: Vec<String> = (10..20).map(|i| format!("comment {:02}", i)).collect();
    assert_eq!(contents, expected);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/videos/{}/comments?page=4&limit=10", video))
        .insert_header(bearer(owner))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], serde_json::json!([]));
    assert_eq!(body["message"], "No comments found");
}
