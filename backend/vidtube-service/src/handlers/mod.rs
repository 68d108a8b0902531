/// HTTP handlers for the `/api/v1` surface
///
/// Each module maps requests onto one service and wraps the result in the
/// success envelope. Identity always comes from the `UserId` extractor.
pub mod comments;
pub mod dashboard;
pub mod health;
pub mod likes;
pub mod playlists;
pub mod posts;
pub mod subscriptions;
pub mod uploads;
pub mod users;
pub mod videos;

use actix_web::web;

use crate::error::AppError;

/// Register every authenticated route. Mounted under `/api/v1`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Extractor failures (malformed ids, bad query strings, bad JSON) use the
    // same error envelope as everything else
    cfg.app_data(web::PathConfig::default().error_handler(|err, _| {
        AppError::InvalidArgument(format!("Invalid path parameter: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        AppError::InvalidArgument(format!("Invalid query string: {}", err)).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _| {
        AppError::InvalidArgument(format!("Invalid JSON body: {}", err)).into()
    }));

    cfg.service(
        web::scope("/videos")
            .service(
                web::resource("")
                    .route(web::get().to(videos::get_all_videos))
                    .route(web::post().to(videos::publish_a_video)),
            )
            .service(
                web::resource("/{video_id}")
                    .route(web::get().to(videos::get_video_by_id))
                    .route(web::patch().to(videos::update_video))
                    .route(web::delete().to(videos::delete_video)),
            )
            .route(
                "/{video_id}/publish-status",
                web::patch().to(videos::toggle_publish_status),
            )
            .service(
                web::resource("/{video_id}/comments")
                    .route(web::get().to(comments::get_video_comments))
                    .route(web::post().to(comments::add_comment)),
            )
            .route("/{video_id}/like", web::post().to(likes::toggle_video_like)),
    )
    .service(
        web::scope("/comments")
            .service(
                web::resource("/{comment_id}")
                    .route(web::patch().to(comments::update_comment))
                    .route(web::delete().to(comments::delete_comment)),
            )
            .route(
                "/{comment_id}/like",
                web::post().to(likes::toggle_comment_like),
            ),
    )
    .route("/tweets/{tweet_id}/like", web::post().to(likes::toggle_tweet_like))
    .service(
        web::scope("/posts")
            .service(web::resource("").route(web::post().to(posts::create_post)))
            .service(
                web::resource("/{post_id}")
                    .route(web::get().to(posts::get_post))
                    .route(web::patch().to(posts::update_post))
                    .route(web::delete().to(posts::delete_post)),
            )
            .route("/{post_id}/like", web::post().to(likes::toggle_tweet_like)),
    )
    .service(
        web::scope("/channels")
            .route(
                "/{channel_id}/subscribe",
                web::post().to(subscriptions::toggle_subscription),
            )
            .route(
                "/{channel_id}/subscribers",
                web::get().to(subscriptions::get_channel_subscribers),
            )
            .route(
                "/{channel_id}/stats",
                web::get().to(dashboard::get_channel_stats),
            )
            .route(
                "/{channel_id}/videos",
                web::get().to(dashboard::get_channel_videos),
            ),
    )
    .service(
        web::scope("/playlists")
            .service(web::resource("").route(web::post().to(playlists::create_playlist)))
            .service(
                web::resource("/{playlist_id}")
                    .route(web::get().to(playlists::get_playlist_by_id))
                    .route(web::patch().to(playlists::update_playlist))
                    .route(web::delete().to(playlists::delete_playlist)),
            )
            .service(
                web::resource("/{playlist_id}/videos/{video_id}")
                    .route(web::post().to(playlists::add_video_to_playlist))
                    .route(web::delete().to(playlists::remove_video_from_playlist)),
            ),
    )
    .service(
        web::scope("/users")
            .route("/me", web::put().to(users::sync_profile))
            .route("/me/liked-videos", web::get().to(likes::get_liked_videos))
            .route(
                "/{user_id}/subscriptions",
                web::get().to(subscriptions::get_subscribed_channels),
            )
            .route(
                "/{user_id}/playlists",
                web::get().to(playlists::get_user_playlists),
            )
            .route("/{user_id}/posts", web::get().to(posts::get_user_posts)),
    );
}
