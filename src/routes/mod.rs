use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let auth = auth_routes(&rate_limit_config);
    let public = public_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    auth.merge(public).merge(protected)
}

/// Auth routes: signup and login.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/signup", routing::post(handlers::signup))
        .route("/auth/login", routing::post(handlers::login));

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Public routes: the chatbot (which degrades gracefully when logged
/// out) and feedback.
fn public_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/chat", routing::post(handlers::chat::chat))
        .route("/feedback", routing::post(handlers::feedback::create_feedback))
        .route(
            "/feedback/community",
            routing::get(handlers::feedback::community_feedback),
        );

    with_optional_rate_limit(router, config.enabled, config.public)
}

/// Protected routes: everything requiring a valid session.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Auth
        .route("/auth/me", routing::get(handlers::get_current_user))
        .route("/auth/logout", routing::post(handlers::auth::logout))
        // Complaints
        .route(
            "/complaints",
            routing::post(handlers::complaint::create_complaint),
        )
        .route(
            "/complaints/mine",
            routing::get(handlers::complaint::list_my_complaints),
        )
        .route(
            "/complaints/{id}",
            routing::get(handlers::complaint::get_complaint)
                .put(handlers::complaint::update_complaint)
                .delete(handlers::complaint::delete_complaint),
        )
        .route(
            "/complaints/{id}/proof",
            routing::post(handlers::complaint::attach_proof),
        )
        // Admin (role checked in handlers)
        .route(
            "/admin/complaints",
            routing::get(handlers::admin::list_complaints),
        )
        .route(
            "/admin/complaints/{id}/status",
            routing::put(handlers::admin::update_complaint_status),
        )
        .route(
            "/admin/users/{phone}/complaints",
            routing::get(handlers::admin::user_complaints),
        )
        .route("/admin/stats", routing::get(handlers::admin::get_stats))
        .route("/admin/heatmap", routing::get(handlers::admin::get_heatmap))
        .route(
            "/admin/export/complaints.csv",
            routing::get(handlers::admin::export_complaints_csv),
        );

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
