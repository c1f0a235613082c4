pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use self::handlers::{categories, comments, likes, posts};

pub fn build_api_router(state: ApiState) -> Router<ApiState> {
    let public = Router::new()
        .route("/categories", get(categories::list_categories))
        .route("/posts", get(posts::list_posts))
        .route("/posts/metadata", get(posts::post_metadata))
        .route("/posts/{id}/comments", get(comments::list_comments));

    let authenticated = Router::new()
        .route("/posts", post(posts::create_post))
        .route("/posts/{id}", get(posts::get_post))
        .route(
            "/posts/{id}/like",
            post(likes::like_post).delete(likes::unlike_post),
        )
        .route("/me/posts", get(posts::list_my_posts))
        .route("/me/posts/metadata", get(posts::my_post_metadata))
        .route("/me/liked", get(posts::list_my_liked_posts))
        .route("/me/liked/metadata", get(posts::my_liked_post_metadata))
        .route("/comments", post(comments::create_comment))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_session,
        ));

    public.merge(authenticated)
}
