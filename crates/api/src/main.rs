use std::sync::Arc;

use farmstand_api::app::{build_app, services::AppServices};

#[tokio::main]
async fn main() {
    farmstand_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let frontend_origin = std::env::var("FRONTEND_ORIGIN").ok();

    // Postgres when DATABASE_URL is set, in-memory otherwise.
    let services = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::PgPool::connect(&url)
                .await
                .expect("failed to connect to database");
            AppServices::postgres(pool)
                .await
                .expect("failed to run migrations")
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores");
            AppServices::in_memory()
        }
    };

    let app = build_app(Arc::new(services), &jwt_secret, frontend_origin.as_deref());

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().expect("local addr"));

    axum::serve(listener, app).await.expect("server error");
}
