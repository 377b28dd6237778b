#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Once,
};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);
static PHONE_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        // Rate limiting gets in the way of rapid-fire test requests
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        let config = cityzen::config::jwt::JwtConfig::from_env().unwrap();
        let _ = cityzen::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Run migrations only once globally (using atomic bool for thread safety)
    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        cityzen::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    // Clean data tables (reverse dependency order)
    cleanup_tables(&db).await;

    let upload_config = cityzen::services::upload::UploadConfig {
        upload_dir: "./test_uploads".to_string(),
    };
    let chat_sessions = cityzen::services::chatbot::ChatSessions::new();

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(cityzen::routes::create_routes())
        .layer(axum::middleware::from_fn(
            cityzen::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(upload_config))
        .layer(axum::extract::Extension(chat_sessions));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let addr_str = format!("http://{}", addr);
    let client = Client::new();

    TestApp {
        addr: addr_str,
        db,
        client,
    }
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let tables = ["complaints", "feedback", "users"];

    for table in tables {
        let sql = format!("TRUNCATE TABLE {} CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

/// A fresh 10-digit phone number for each call.
pub fn unique_phone() -> String {
    let counter = PHONE_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("9{:09}", counter)
}

/// Sign up a user and return (phone, token).
pub async fn create_test_user(app: &TestApp) -> (String, String) {
    let phone = unique_phone();

    let resp = app
        .client
        .post(app.url("/auth/signup"))
        .json(&serde_json::json!({
            "phone": phone,
            "password": "test_password_123"
        }))
        .send()
        .await
        .expect("Failed to sign up user");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap_or_else(|e| {
        panic!(
            "Failed to parse signup response for '{}': status={}, error={}",
            phone, status, e
        );
    });

    if !body["success"].as_bool().unwrap_or(false) {
        panic!(
            "Failed to sign up '{}': status={}, body={}",
            phone, status, body
        );
    }

    let token = body["data"]["token"]
        .as_str()
        .unwrap_or_else(|| panic!("Response missing token for '{}': {:?}", phone, body))
        .to_string();
    (phone, token)
}

/// Sign up a user, then promote them to admin directly in the database.
pub async fn create_test_admin(app: &TestApp) -> (String, String) {
    let (phone, token) = create_test_user(app).await;

    app.db
        .execute(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "UPDATE users SET role = 'admin' WHERE phone = $1",
            [phone.clone().into()],
        ))
        .await
        .expect("Failed to promote admin");

    (phone, token)
}

/// File a complaint over the multipart endpoint and return its id.
pub async fn create_test_complaint(app: &TestApp, token: &str, district: &str) -> i32 {
    let form = reqwest::multipart::Form::new()
        .text("name", "Test User")
        .text("phone", "9876543210")
        .text("district", district.to_string())
        .text("block", "Sadar")
        .text("gp", "Test GP")
        .text("village", "Test Village")
        .text("landmark", "Near the school")
        .text("pincode", "752001")
        .text("department", "Water Supply")
        .text("complaint", "No water supply for three days");

    let resp = app
        .client
        .post(app.url("/complaints"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to create complaint");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(status, 200, "complaint create failed: {}", body);

    body["data"]["id"].as_i64().expect("missing complaint id") as i32
}

/// One chat turn; returns the bot's reply body.
pub async fn chat_turn(app: &TestApp, token: Option<&str>, message: &str) -> serde_json::Value {
    let mut req = app
        .client
        .post(app.url("/chat"))
        .json(&serde_json::json!({ "message": message }));

    if let Some(token) = token {
        req = req.bearer_auth(token);
    }

    let resp = req.send().await.expect("chat request failed");
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    body["data"].clone()
}
