use std::{process, sync::Arc};

use forum::{
    application::{
        comments::CommentService,
        error::AppError,
        likes::LikeService,
        posts::{ImageLimits, PostService},
        repos::{
            CategoriesRepo, CommentsRepo, LikesRepo, PostsRepo, PostsWriteRepo, SessionsRepo,
            UsersRepo,
        },
        sessions::{SessionError, SessionService},
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::IssueSession(args) => run_issue_session(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_api_state(repositories, &settings);
    serve_http(&settings, state).await
}

async fn run_issue_session(
    settings: config::Settings,
    args: config::IssueSessionArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_api_state(repositories, &settings);

    let issued = state
        .sessions
        .issue(args.user_id, settings.sessions.ttl)
        .await
        .map_err(|err| match err {
            SessionError::UnknownUser => {
                AppError::validation(format!("user {} does not exist", args.user_id))
            }
            SessionError::TtlOutOfRange => {
                AppError::validation("session lifetime is out of range")
            }
            other => AppError::unexpected(format!("failed to issue session: {other}")),
        })?;

    info!(
        target = "forum::sessions",
        user_id = issued.user_id,
        expires_at = %issued.expires_at,
        "session issued"
    );
    println!("{}", issued.token);
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    if settings.database.run_migrations {
        PostgresRepositories::run_migrations(&pool)
            .await
            .map_err(|err| AppError::from(InfraError::from(err)))?;
    }

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_api_state(repositories: Arc<PostgresRepositories>, settings: &config::Settings) -> ApiState {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let categories_repo: Arc<dyn CategoriesRepo> = repositories.clone();
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let comments_repo: Arc<dyn CommentsRepo> = repositories.clone();
    let likes_repo: Arc<dyn LikesRepo> = repositories.clone();
    let sessions_repo: Arc<dyn SessionsRepo> = repositories.clone();

    let dimension = settings.uploads.image_max_dimension.get();
    let posts = PostService::new(
        posts_repo.clone(),
        posts_write_repo,
        categories_repo,
        users_repo.clone(),
        likes_repo.clone(),
    )
    .with_image_limits(ImageLimits {
        max_width: dimension,
        max_height: dimension,
    });

    ApiState {
        posts: Arc::new(posts),
        comments: Arc::new(CommentService::new(comments_repo)),
        likes: Arc::new(LikeService::new(posts_repo, likes_repo)),
        sessions: Arc::new(SessionService::new(sessions_repo, users_repo)),
        db: repositories,
    }
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let body_limit = usize::try_from(settings.uploads.max_request_bytes.get())
        .map_err(|_| AppError::validation("uploads.max_request_bytes exceeds usize"))?;
    let router = http::build_router(state, body_limit);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "forum::server",
        addr = %settings.server.addr,
        "listening"
    );

    let grace = settings.server.graceful_shutdown;
    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            shutdown_signal().await;
            let _ = drain_tx.send(());
        },
    );

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::from(InfraError::from(err)))?;
        }
        _ = async {
            if drain_rx.await.is_ok() {
                tokio::time::sleep(grace).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            warn!(
                target = "forum::server",
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
        }
    }

    info!(target = "forum::server", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(target = "forum::server", "shutdown signal received"),
        Err(err) => {
            error!(target = "forum::server", error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
