//! API Router with Swagger UI

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{ArticleListView, ArticleView, CommentView, ProfileView};
use crate::interfaces::http::common::{ErrorBody, ErrorMessages};
use crate::interfaces::http::middleware::{auth_middleware, optional_auth_middleware, AuthState};
use crate::interfaces::http::modules::health::HealthState;
use crate::interfaces::http::modules::metrics::{http_metrics_middleware, MetricsState};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{
    articles, comments, health, metrics, profiles, tags, users,
};
use crate::interfaces::http::state::ApiState;

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "`Token <jwt>` as returned by login or registration",
                ))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        // Users
        users::register,
        users::login,
        users::current_user,
        users::update_user,
        // Profiles
        profiles::get_profile,
        profiles::follow,
        profiles::unfollow,
        // Articles
        articles::list_articles,
        articles::feed,
        articles::create_article,
        articles::get_article,
        articles::update_article,
        articles::delete_article,
        articles::favorite_article,
        articles::unfavorite_article,
        // Comments
        comments::list_comments,
        comments::add_comment,
        comments::delete_comment,
        // Tags
        tags::list_tags,
    ),
    components(
        schemas(
            ErrorBody,
            ErrorMessages,
            ProfileView,
            ArticleView,
            ArticleListView,
            CommentView,
            users::RegisterRequest,
            users::LoginRequest,
            users::UpdateUserRequest,
            users::UserResponse,
            profiles::ProfileResponse,
            articles::CreateArticleRequest,
            articles::UpdateArticleRequest,
            articles::ArticleResponse,
            comments::AddCommentRequest,
            comments::CommentResponse,
            comments::CommentsResponse,
            tags::TagsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Users", description = "Registration, login and the current user"),
        (name = "Profiles", description = "Public profiles and following"),
        (name = "Articles", description = "Articles, the feed and favorites"),
        (name = "Comments", description = "Comments on articles"),
        (name = "Tags", description = "Tags in use"),
    ),
    info(
        title = "Conduit API",
        version = "1.0.0",
        description = "Blogging platform backend: users, profiles, articles, comments and tags",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Routes under `/api`. Every route sees the optional viewer; mutating routes require one.
fn api_routes(state: ApiState) -> Router {
    let auth_state = AuthState {
        jwt_config: state.jwt_config.clone(),
    };
    let require_auth = middleware::from_fn_with_state(auth_state.clone(), auth_middleware);

    Router::new()
        // Users
        .route("/users", post(users::register))
        .route("/users/login", post(users::login))
        .route(
            "/user",
            get(users::current_user)
                .put(users::update_user)
                .route_layer(require_auth.clone()),
        )
        // Profiles
        .route("/profiles/{username}", get(profiles::get_profile))
        .route(
            "/profiles/{username}/follow",
            post(profiles::follow)
                .delete(profiles::unfollow)
                .route_layer(require_auth.clone()),
        )
        // Articles
        .route(
            "/articles",
            get(articles::list_articles)
                .merge(post(articles::create_article).route_layer(require_auth.clone())),
        )
        .route(
            "/articles/feed",
            get(articles::feed).route_layer(require_auth.clone()),
        )
        .route(
            "/articles/{slug}",
            get(articles::get_article).merge(
                put(articles::update_article)
                    .delete(articles::delete_article)
                    .route_layer(require_auth.clone()),
            ),
        )
        .route(
            "/articles/{slug}/favorite",
            post(articles::favorite_article)
                .delete(articles::unfavorite_article)
                .route_layer(require_auth.clone()),
        )
        // Comments
        .route(
            "/articles/{slug}/comments",
            get(comments::list_comments)
                .merge(post(comments::add_comment).route_layer(require_auth.clone())),
        )
        .route(
            "/articles/{slug}/comments/{id}",
            delete(comments::delete_comment).route_layer(require_auth),
        )
        // Tags
        .route("/tags", get(tags::list_tags))
        .layer(middleware::from_fn_with_state(
            auth_state,
            optional_auth_middleware,
        ))
        .with_state(state)
}

/// Create the full router: `/api`, `/health`, `/docs` and, with a recorder handle, `/metrics`.
pub fn create_api_router(
    state: ApiState,
    health_state: HealthState,
    prometheus_handle: Option<PrometheusHandle>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state);

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .nest("/api", api_routes(state));

    if let Some(handle) = prometheus_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
