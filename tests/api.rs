use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

use forum::application::comments::CommentService;
use forum::application::likes::LikeService;
use forum::application::pagination::PageWindow;
use forum::application::posts::PostService;
use forum::application::repos::{
    CategoriesRepo, CommentsRepo, LikesRepo, PostListScope, PostsRepo, PostsWriteRepo, RepoError,
    SessionsRepo, UsersRepo,
};
use forum::application::sessions::SessionService;
use forum::domain::entities::{
    CategoryRecord, CommentRecord, NewComment, NewPost, PostRecord, SessionRecord,
};
use forum::infra::db::PostgresRepositories;
use forum::infra::http::{ApiState, build_router};

const ALICE: i64 = 1;
const BOB: i64 = 2;

#[derive(Default)]
struct Store {
    posts: Vec<(NewPost, OffsetDateTime)>,
    comments: Vec<NewComment>,
    likes: Vec<(i64, i64)>,
    sessions: Vec<(Vec<u8>, SessionRecord)>,
    listed: Vec<(PostListScope, Option<i64>, PageWindow)>,
}

/// In-memory stand-in for every repository the router touches.
#[derive(Default)]
struct InMemoryForum {
    store: Mutex<Store>,
}

impl InMemoryForum {
    fn username(id: i64) -> Option<&'static str> {
        match id {
            ALICE => Some("alice"),
            BOB => Some("bob"),
            _ => None,
        }
    }

    fn category(id: i64) -> &'static str {
        match id {
            10 => "general",
            _ => "help",
        }
    }

    fn record(&self, id: i64) -> Option<PostRecord> {
        let store = self.store.lock().unwrap();
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        let (post, created_at) = store.posts.get(index)?;
        Some(PostRecord {
            id,
            title: post.title.clone(),
            content: post.content.clone(),
            author: Self::username(post.author_id).unwrap_or("ghost").to_string(),
            category_id: post.category_id,
            category: Self::category(post.category_id).to_string(),
            image_data: post.image_data.clone(),
            like_count: store.likes.iter().filter(|(_, p)| *p == id).count() as i64,
            comment_count: store.comments.iter().filter(|c| c.post_id == id).count() as i64,
            created_at: *created_at,
        })
    }

    fn post_count(&self) -> usize {
        self.store.lock().unwrap().posts.len()
    }
}

#[async_trait]
impl PostsRepo for InMemoryForum {
    async fn list_posts(
        &self,
        scope: PostListScope,
        category_id: Option<i64>,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let total = {
            let mut store = self.store.lock().unwrap();
            store.listed.push((scope, category_id, window));
            store.posts.len() as i64
        };
        Ok((1..=total).rev().filter_map(|id| self.record(id)).collect())
    }

    async fn count_posts(
        &self,
        _scope: PostListScope,
        _category_id: Option<i64>,
    ) -> Result<u64, RepoError> {
        Ok(self.post_count() as u64)
    }

    async fn find_post(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.record(id))
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryForum {
    async fn create_post(&self, post: NewPost) -> Result<i64, RepoError> {
        let mut store = self.store.lock().unwrap();
        store.posts.push((post, OffsetDateTime::now_utc()));
        Ok(store.posts.len() as i64)
    }
}

#[async_trait]
impl CategoriesRepo for InMemoryForum {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        Ok(vec![
            CategoryRecord {
                id: 10,
                name: "general".into(),
            },
            CategoryRecord {
                id: 11,
                name: "help".into(),
            },
        ])
    }

    async fn category_id_by_name(&self, name: &str) -> Result<i64, RepoError> {
        match name {
            "general" => Ok(10),
            "help" => Ok(11),
            _ => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UsersRepo for InMemoryForum {
    async fn username_by_id(&self, id: i64) -> Result<String, RepoError> {
        Self::username(id)
            .map(str::to_string)
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentsRepo for InMemoryForum {
    async fn create_comment(&self, comment: NewComment) -> Result<i64, RepoError> {
        if self.record(comment.post_id).is_none() {
            return Err(RepoError::InvalidInput {
                message: "insert or update on table \"comments\" violates foreign key constraint"
                    .into(),
            });
        }
        let mut store = self.store.lock().unwrap();
        store.comments.push(comment);
        Ok(store.comments.len() as i64)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentRecord>, RepoError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .comments
            .iter()
            .enumerate()
            .filter(|(_, c)| c.post_id == post_id)
            .map(|(idx, c)| CommentRecord {
                id: idx as i64 + 1,
                post_id: c.post_id,
                author_id: c.author_id,
                author: Self::username(c.author_id).unwrap_or("ghost").to_string(),
                content: c.content.clone(),
                created_at: OffsetDateTime::UNIX_EPOCH,
            })
            .collect())
    }
}

#[async_trait]
impl LikesRepo for InMemoryForum {
    async fn like_post(&self, user_id: i64, post_id: i64) -> Result<(), RepoError> {
        let mut store = self.store.lock().unwrap();
        if !store.likes.contains(&(user_id, post_id)) {
            store.likes.push((user_id, post_id));
        }
        Ok(())
    }

    async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<(), RepoError> {
        self.store
            .lock()
            .unwrap()
            .likes
            .retain(|pair| *pair != (user_id, post_id));
        Ok(())
    }

    async fn has_liked(&self, user_id: i64, post_id: i64) -> Result<bool, RepoError> {
        Ok(self.store.lock().unwrap().likes.contains(&(user_id, post_id)))
    }
}

#[async_trait]
impl SessionsRepo for InMemoryForum {
    async fn create_session(
        &self,
        token_hash: &[u8],
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> Result<(), RepoError> {
        self.store.lock().unwrap().sessions.push((
            token_hash.to_vec(),
            SessionRecord {
                user_id,
                expires_at,
            },
        ));
        Ok(())
    }

    async fn find_session(&self, token_hash: &[u8]) -> Result<Option<SessionRecord>, RepoError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .sessions
            .iter()
            .find(|(hash, _)| hash.as_slice() == token_hash)
            .map(|(_, record)| record.clone()))
    }
}

struct TestApp {
    router: Router,
    forum: Arc<InMemoryForum>,
    sessions: Arc<SessionService>,
}

impl TestApp {
    fn new() -> Self {
        let forum = Arc::new(InMemoryForum::default());
        // Never connected: only /health touches the pool.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://forum@localhost/forum_test")
            .expect("lazy pool");

        let sessions = Arc::new(SessionService::new(forum.clone(), forum.clone()));
        let state = ApiState {
            posts: Arc::new(PostService::new(
                forum.clone(),
                forum.clone(),
                forum.clone(),
                forum.clone(),
                forum.clone(),
            )),
            comments: Arc::new(CommentService::new(forum.clone())),
            likes: Arc::new(LikeService::new(forum.clone(), forum.clone())),
            sessions: sessions.clone(),
            db: Arc::new(PostgresRepositories::new(pool)),
        };

        Self {
            router: build_router(state, 10 * 1024 * 1024),
            forum,
            sessions,
        }
    }

    async fn token_for(&self, user_id: i64) -> String {
        self.sessions
            .issue(user_id, Duration::hours(1))
            .await
            .expect("issue session")
            .token
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router responds");
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes()
            .to_vec();
        (status, body)
    }

    async fn seed_post(&self, token: &str, title: &str) {
        let (status, _) = self
            .send(authed(
                Method::POST,
                "/posts",
                token,
                json!({
                    "title": title,
                    "content": "body",
                    "author": "alice",
                    "category": "general",
                })
                .to_string(),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

fn authed(method: Method, uri: &str, token: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("request")
}

fn anonymous(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("json body")
}

fn png_base64(width: u32, height: u32) -> String {
    let buffer = image::ImageBuffer::from_pixel(width, height, image::Rgb([9u8, 9, 9]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(buffer)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    STANDARD.encode(out.into_inner())
}

#[tokio::test]
async fn comment_endpoint_rejects_other_methods() {
    let app = TestApp::new();
    let token = app.token_for(ALICE).await;

    let (status, body) = app
        .send(authed(Method::GET, "/comments", &token, Body::empty()))
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(body.is_empty());
}

#[tokio::test]
async fn comment_with_empty_body_is_bad_request() {
    let app = TestApp::new();
    let token = app.token_for(ALICE).await;

    let (status, _) = app
        .send(authed(Method::POST, "/comments", &token, Body::empty()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comment_with_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let token = app.token_for(ALICE).await;

    let (status, body) = app
        .send(authed(Method::POST, "/comments", &token, "{\"post_id\": 1,"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["code"], "bad_request");
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[tokio::test]
async fn blank_comment_content_is_bad_request() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = TestApp::new();
    let token = app.token_for(ALICE).await;
    app.seed_post(&token, "hello").await;

    let (status, body) = app
        .send(authed(
            Method::POST,
            "/comments",
            &token,
            json!({"post_id": 1, "content": "   "}).to_string(),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["code"], "empty_body");
    let logged = logs.text();
    assert!(logged.contains("forum::http::comments"), "{logged}");
    assert!(logged.contains("empty comment content"), "{logged}");
}

#[tokio::test]
async fn valid_comment_is_created_for_session_user() {
    let app = TestApp::new();
    let alice = app.token_for(ALICE).await;
    let bob = app.token_for(BOB).await;
    app.seed_post(&alice, "hello").await;

    let (status, body) = app
        .send(authed(
            Method::POST,
            "/comments",
            &bob,
            json!({"post_id": 1, "content": "welcome!"}).to_string(),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.is_empty());

    let comments = app.forum.store.lock().unwrap().comments.clone();
    assert_eq!(
        comments,
        vec![NewComment {
            post_id: 1,
            author_id: BOB,
            content: "welcome!".into(),
        }]
    );

    let (status, body) = app
        .send(anonymous(Method::GET, "/posts/1/comments"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)[0]["author"], "bob");
}

#[tokio::test]
async fn comment_on_missing_post_is_internal_error() {
    let app = TestApp::new();
    let token = app.token_for(ALICE).await;

    let (status, body) = app
        .send(authed(
            Method::POST,
            "/comments",
            &token,
            json!({"post_id": 99, "content": "anyone?"}).to_string(),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body)["error"]["code"], "internal_error");
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = TestApp::new();

    let (status, body) = app
        .send(authed(
            Method::POST,
            "/comments",
            "fs_not-a-real-token-but-long-enough-to-parse",
            "{}",
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["error"]["code"], "unauthorized");

    let (status, _) = app.send(anonymous(Method::GET, "/me/posts")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_cookie_authenticates() {
    let app = TestApp::new();
    let token = app.token_for(ALICE).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/me/posts/metadata")
        .header(header::COOKIE, format!("session={token}"))
        .body(Body::empty())
        .expect("request");

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["total_posts"], 0);
}

#[tokio::test]
async fn post_as_someone_else_is_rejected_without_writes() {
    let app = TestApp::new();
    let bob = app.token_for(BOB).await;

    let (status, body) = app
        .send(authed(
            Method::POST,
            "/posts",
            &bob,
            json!({
                "title": "impersonation",
                "content": "hi",
                "author": "alice",
                "category": "general",
            })
            .to_string(),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["message"], "Author not same Username");
    assert_eq!(app.forum.post_count(), 0);
}

#[tokio::test]
async fn post_with_image_is_stored_resized() {
    let app = TestApp::new();
    let alice = app.token_for(ALICE).await;

    let (status, body) = app
        .send(authed(
            Method::POST,
            "/posts",
            &alice,
            json!({
                "title": "",
                "content": "look at this",
                "author": "alice",
                "category": "help",
                "image_data": png_base64(900, 1800),
            })
            .to_string(),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json_body(&body)["id"], 1);

    let record = app.forum.record(1).expect("stored post");
    let stored = image::load_from_memory(&record.image_data.expect("image kept"))
        .expect("decodable image");
    assert!(stored.width() <= 500 && stored.height() <= 500);
    assert_eq!(stored.height(), 500);
}

#[tokio::test]
async fn post_with_invalid_image_is_bad_request() {
    let app = TestApp::new();
    let alice = app.token_for(ALICE).await;

    let (status, body) = app
        .send(authed(
            Method::POST,
            "/posts",
            &alice,
            json!({
                "title": "t",
                "content": "c",
                "author": "alice",
                "category": "general",
                "image_data": "%%%",
            })
            .to_string(),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["message"], "Invalid image data");
    assert_eq!(app.forum.post_count(), 0);
}

#[tokio::test]
async fn listing_pages_translate_to_offsets() {
    let app = TestApp::new();

    let (status, _) = app
        .send(anonymous(Method::GET, "/posts?page=3&category=help"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(anonymous(Method::GET, "/posts?page=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["code"], "invalid_page");

    let listed = app.forum.store.lock().unwrap().listed.clone();
    assert_eq!(
        listed,
        vec![(
            PostListScope::All,
            Some(11),
            PageWindow {
                offset: 20,
                limit: 10
            }
        )]
    );
}

#[tokio::test]
async fn unknown_category_differs_between_metadata_and_listing() {
    let app = TestApp::new();

    let (status, body) = app
        .send(anonymous(Method::GET, "/posts/metadata?category=nope"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body)["error"]["message"], "wrong category");

    let (status, body) = app
        .send(anonymous(Method::GET, "/posts?category=nope"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body)["error"]["message"], "resource not found");
}

#[tokio::test]
async fn likes_show_up_on_post_detail() {
    let app = TestApp::new();
    let alice = app.token_for(ALICE).await;
    let bob = app.token_for(BOB).await;
    app.seed_post(&alice, "likeable").await;

    let (status, _) = app
        .send(authed(Method::POST, "/posts/1/like", &bob, Body::empty()))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .send(authed(Method::GET, "/posts/1", &bob, Body::empty()))
        .await;
    assert_eq!(status, StatusCode::OK);
    let detail = json_body(&body);
    assert_eq!(detail["liked"], true);
    assert_eq!(detail["like_count"], 1);
    assert_eq!(detail["title"], "likeable");

    let (status, _) = app
        .send(authed(Method::DELETE, "/posts/1/like", &bob, Body::empty()))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app
        .send(authed(Method::GET, "/posts/1", &bob, Body::empty()))
        .await;
    assert_eq!(json_body(&body)["liked"], false);

    let (status, _) = app
        .send(authed(Method::POST, "/posts/7/like", &bob, Body::empty()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_are_public() {
    let app = TestApp::new();

    let (status, body) = app.send(anonymous(Method::GET, "/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)[1]["name"], "help");
}
