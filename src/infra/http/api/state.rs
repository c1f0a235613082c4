use std::sync::Arc;

use crate::application::comments::CommentService;
use crate::application::likes::LikeService;
use crate::application::posts::PostService;
use crate::application::sessions::SessionService;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct ApiState {
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub likes: Arc<LikeService>,
    pub sessions: Arc<SessionService>,
    pub db: Arc<PostgresRepositories>,
}
