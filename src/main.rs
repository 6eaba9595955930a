pub mod auth;
pub mod carts;
pub mod db;
pub mod discounts;
pub mod error;
pub mod orders;
pub mod request_id;
pub mod tenants;

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use orders::engine::OrderTransactionEngine;
use orders::handlers::{
    create_order_handler, get_order_handler, list_orders_handler, update_order_status_handler,
};
use orders::repository::OrdersRepository;
use orders::service::OrderService;
use tenants::{MembershipsRepository, TenantsRepository};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        orders::handlers::create_order_handler,
        orders::handlers::list_orders_handler,
        orders::handlers::get_order_handler,
        orders::handlers::update_order_status_handler,
    ),
    components(
        schemas(
            orders::models::Address,
            orders::models::CreateOrderRequest,
            orders::models::UpdateStatusRequest,
            orders::models::OrderStatus,
            orders::models::PaymentStatus,
            orders::models::OrderItemResponse,
            orders::models::OrderResponse,
            orders::models::OrderSummary,
            orders::models::OrderListResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "orders", description = "Tenant-scoped order management endpoints")
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Storefront Orders API",
        version = "1.0.0",
        description = "Multi-tenant order transaction API: cart checkout, order history and fulfillment status",
    )
)]
struct ApiDoc;

/// Registers the bearer scheme the order endpoints reference
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub order_service: OrderService,
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds the CORS and
/// request-id middleware layers
fn create_router(db: PgPool) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let order_service = OrderService::new(
        TenantsRepository::new(db.clone()),
        MembershipsRepository::new(db.clone()),
        OrderTransactionEngine::new(db.clone()),
        OrdersRepository::new(db.clone()),
    );
    let state = AppState { db, order_service };

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // API routes
        .route("/api/tenants/:slug/orders", post(create_order_handler))
        .route("/api/tenants/:slug/orders", get(list_orders_handler))
        .route(
            "/api/tenants/:slug/orders/:order_id",
            get(get_order_handler),
        )
        .route(
            "/api/tenants/:slug/orders/:order_id",
            patch(update_order_status_handler),
        )
        .layer(axum::middleware::from_fn(request_id::middleware))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Storefront Orders API - Starting...");

    // Get configuration from environment variables
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Create the application router
    let app = create_router(db_pool);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Storefront Orders API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests;
