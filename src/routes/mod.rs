use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod businesses;
pub mod categories;
pub mod customers;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod sales;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/sales", sales::router())
        .nest("/products", products::router())
        .nest("/customers", customers::router())
        .nest("/businesses", businesses::router())
        .nest("/categories", categories::router())
}
