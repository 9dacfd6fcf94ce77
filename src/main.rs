//! Meridian Storefront - storefront service binary

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

use meridian_storefront::checkout::{CheckoutOrchestrator, NotificationOutcome};
use meridian_storefront::domain::aggregates::cart::LineItem;
use meridian_storefront::domain::aggregates::order::{Order, OrderDraft, OrderStatus, ShippingDetails};
use meridian_storefront::domain::aggregates::product::{Product, ProductDraft, ProductUpdate};
use meridian_storefront::domain::aggregates::Admin;
use meridian_storefront::notify::{NatsNotifier, Notifier, NullNotifier};
use meridian_storefront::store::admins::{AdminDirectory, AdminSummary};
use meridian_storefront::store::catalog::CatalogStore;
use meridian_storefront::store::documents::InMemoryCollection;
use meridian_storefront::store::orders::{OrderFilter, OrderService};
use meridian_storefront::Error;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub orders: Arc<OrderService>,
    pub admins: Arc<AdminDirectory>,
    pub checkout: Arc<CheckoutOrchestrator>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let catalog = Arc::new(CatalogStore::new(Arc::new(InMemoryCollection::<Product>::new())));
    catalog.hydrate().await?;
    let orders = Arc::new(OrderService::new(Arc::new(InMemoryCollection::<Order>::new())));
    let admins = Arc::new(AdminDirectory::new(Arc::new(InMemoryCollection::<Admin>::new())));

    if let (Ok(username), Ok(password)) =
        (std::env::var("ADMIN_USERNAME"), std::env::var("ADMIN_PASSWORD"))
    {
        admins.create(&username, &password).await?;
        tracing::info!(%username, "bootstrapped admin account");
    }

    let notifier: Arc<dyn Notifier> = match std::env::var("NATS_URL") {
        Ok(url) => {
            let client = async_nats::connect(&url).await?;
            let subject = std::env::var("NOTIFY_SUBJECT").unwrap_or_else(|_| "storefront.orders".to_string());
            let operator_contact = std::env::var("OPERATOR_CONTACT").ok();
            Arc::new(NatsNotifier::new(client, subject, operator_contact))
        }
        Err(_) => {
            tracing::warn!("NATS_URL not set, order notifications disabled");
            Arc::new(NullNotifier)
        }
    };
    let checkout = Arc::new(CheckoutOrchestrator::new(Arc::clone(&orders), notifier));

    let state = AppState { catalog, orders, admins, checkout };

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "meridian-storefront"})) }))
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/products/:id/rate", post(rate_product))
        .route("/products/:id/comments", post(comment_product))
        .route("/orders", get(list_orders).post(create_order).patch(set_order_status).delete(delete_order))
        .route("/checkout", post(place_checkout))
        .route("/admins", get(list_admins).post(create_admin))
        .route("/admins/:id", put(update_admin).delete(delete_admin))
        .route("/admins/login", post(admin_login))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8083".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("🚀 Meridian Storefront listening on 0.0.0.0:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Maps the library error taxonomy onto HTTP statuses.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Remote(_) | Error::Notification(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(serde_json::json!({"error": self.0.to_string()}))).into_response()
    }
}

fn invalid(err: impl std::fmt::Display) -> ApiError {
    ApiError(Error::Validation(err.to_string()))
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog.list().await)
}

async fn create_product(
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    draft.validate().map_err(invalid)?;
    let product = state.catalog.add(draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.get(&id).await?))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.update(&id, update).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.catalog.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateRequest {
    user_id: String,
    rating: u8,
}

async fn rate_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RateRequest>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.rate(&id, &req.user_id, req.rating).await?))
}

#[derive(Debug, Deserialize)]
struct CommentRequest {
    user: String,
    text: String,
}

async fn comment_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.catalog.comment(&id, &req.user, &req.text).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
struct OrderListParams {
    status: Option<OrderFilter>,
}

async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.list(params.status.unwrap_or_default()).await?))
}

async fn create_order(
    State(state): State<AppState>,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state.orders.create(draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderStatusRequest {
    order_id: String,
    status: OrderStatus,
}

async fn set_order_status(
    State(state): State<AppState>,
    Json(req): Json<OrderStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.set_status(&req.order_id, req.status).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDeleteRequest {
    order_id: String,
}

async fn delete_order(
    State(state): State<AppState>,
    Json(req): Json<OrderDeleteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.orders.delete(&req.order_id).await?;
    Ok(Json(serde_json::json!({"message": "order deleted"})))
}

// =============================================================================
// Checkout
// =============================================================================

#[derive(Debug, Deserialize)]
struct CheckoutRequest {
    #[serde(flatten)]
    shipping: ShippingDetails,
    cart: Vec<LineItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResponse {
    order: Order,
    notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

async fn place_checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    req.shipping.validate().map_err(invalid)?;
    let receipt = state.checkout.place_order(&req.cart, req.shipping).await?;
    let (notified, warning) = match receipt.notification {
        NotificationOutcome::Sent => (true, None),
        NotificationOutcome::Failed(reason) => {
            (false, Some(format!("order placed, notification failed: {}", reason)))
        }
    };
    Ok((StatusCode::CREATED, Json(CheckoutResponse { order: receipt.order, notified, warning })))
}

// =============================================================================
// Admins
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
struct AdminCredentialsRequest {
    #[validate(length(min = 1))]
    username: String,
    #[validate(length(min = 1))]
    password: String,
}

async fn list_admins(State(state): State<AppState>) -> Result<Json<Vec<AdminSummary>>, ApiError> {
    Ok(Json(state.admins.list().await?))
}

async fn create_admin(
    State(state): State<AppState>,
    Json(req): Json<AdminCredentialsRequest>,
) -> Result<(StatusCode, Json<AdminSummary>), ApiError> {
    req.validate().map_err(invalid)?;
    let admin = state.admins.create(&req.username, &req.password).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

async fn update_admin(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdminCredentialsRequest>,
) -> Result<Json<AdminSummary>, ApiError> {
    req.validate().map_err(invalid)?;
    Ok(Json(state.admins.update(&id, &req.username, &req.password).await?))
}

async fn delete_admin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.admins.delete(&id).await?;
    Ok(Json(serde_json::json!({"message": "admin deleted"})))
}

async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminCredentialsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let admin = state.admins.authenticate(&req.username, &req.password).await?;
    Ok(Json(serde_json::json!({"message": "login successful", "username": admin.username})))
}
