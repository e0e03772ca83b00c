use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;

pub mod auth;
pub mod comments;
pub mod config;
pub mod error;
pub mod follows;
pub mod likes;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod reserve;

use config::settings::Settings;
use error::method_not_allowed;

const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub settings: Settings,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> PgPool {
        app_state.pool.clone()
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(app_state: &AppState) -> Settings {
        app_state.settings.clone()
    }
}

pub fn app(app_state: AppState) -> Router {
    let auth_router = Router::new()
        .route("/register/", post(auth::handler::register))
        .route("/login/", post(auth::handler::login))
        .route("/logout/", post(auth::handler::logout))
        .route("/user/:id/", post(auth::handler::get_user_info));

    let follows_router = Router::new()
        .route("/user/:id/following/", post(follows::handler::get_following))
        .route("/user/:id/followers/", post(follows::handler::get_followers))
        .route("/follow_user/:id/", post(follows::handler::follow_user))
        .route("/unfollow_user/:id/", post(follows::handler::unfollow_user))
        .route("/is_following/:id/", get(follows::handler::is_following));

    let content_router = Router::new()
        .route(
            "/publish_content/",
            post(posts::handler::publish_content)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/edit_content/:id/", post(posts::handler::edit_content))
        .route("/delete_content/:id/", delete(posts::handler::delete_content))
        .route("/list_content/", get(posts::handler::list_content))
        .route(
            "/get_content_detail/:id/",
            get(posts::handler::get_content_detail),
        )
        .route(
            "/publish_comment/:post_id/",
            post(comments::handler::publish_comment),
        )
        .route(
            "/get_comment_list/:post_id/",
            get(comments::handler::get_comment_list),
        )
        .route("/like_post/:id/", post(likes::handler::like_post))
        .route("/unlike_post/:id/", post(likes::handler::unlike_post))
        .route("/like_comment/:id/", post(likes::handler::like_comment))
        .route("/unlike_comment/:id/", post(likes::handler::unlike_comment));

    let notifications_router = Router::new()
        .route(
            "/notifications/",
            get(notifications::handler::list_notifications),
        )
        .route(
            "/notifications/:id/read/",
            post(notifications::handler::mark_notification_read),
        );

    // Write endpoints below answer wrong methods with a JSON 405
    let messages_router = Router::new()
        .route(
            "/send_message/",
            post(messages::handler::send_message).fallback(method_not_allowed),
        )
        .route(
            "/receive_messages/:user_id/",
            get(messages::handler::receive_messages),
        )
        .route("/list_messages/", get(messages::handler::list_messages))
        .route(
            "/search_messages/:keyword/",
            get(messages::handler::search_messages),
        )
        .route(
            "/get_message_detail/:id/",
            get(messages::handler::get_message_detail),
        )
        .route(
            "/mark_as_read/:id/",
            post(messages::handler::mark_as_read).fallback(method_not_allowed),
        )
        .route(
            "/mark_as_unread/:id/",
            post(messages::handler::mark_as_unread).fallback(method_not_allowed),
        )
        .route(
            "/delete_message/:id/",
            post(messages::handler::delete_message).fallback(method_not_allowed),
        )
        .route(
            "/recall_message/:id/",
            post(messages::handler::recall_message).fallback(method_not_allowed),
        );

    let reserve_router = Router::new()
        .route("/activities/", get(reserve::handler::get_activity_list))
        .route(
            "/activities/create/",
            post(reserve::handler::create_activity).fallback(method_not_allowed),
        )
        .route("/activities/:id/", get(reserve::handler::get_activity_detail))
        .route(
            "/activities/:id/edit/",
            post(reserve::handler::edit_activity).fallback(method_not_allowed),
        )
        .route(
            "/activities/:id/delete/",
            post(reserve::handler::delete_activity).fallback(method_not_allowed),
        )
        .route(
            "/reservations/create/",
            post(reserve::handler::create_reservation).fallback(method_not_allowed),
        )
        .route(
            "/reservations/:id/",
            get(reserve::handler::get_reservation_detail),
        )
        .route(
            "/reservations/:id/cancel/",
            post(reserve::handler::cancel_reservation).fallback(method_not_allowed),
        )
        .route(
            "/reservations/:id/manage/",
            post(reserve::handler::manage_reservation).fallback(method_not_allowed),
        );

    Router::new()
        .route("/", get(|| async { "Hello, World!" }))
        .merge(auth_router)
        .merge(follows_router)
        .merge(content_router)
        .merge(notifications_router)
        .merge(messages_router)
        .merge(reserve_router)
        .with_state(app_state)
}
