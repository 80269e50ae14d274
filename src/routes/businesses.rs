use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::businesses::{BusinessList, CreateBusinessRequest, UpdateBusinessRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Business,
    response::ApiResponse,
    services::business_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_businesses).post(create_business))
        .route(
            "/{id}",
            get(get_business)
                .patch(update_business)
                .delete(delete_business),
        )
}

#[utoipa::path(
    get,
    path = "/api/businesses",
    responses((status = 200, description = "Caller's businesses", body = ApiResponse<BusinessList>)),
    security(("bearer_auth" = [])),
    tag = "Businesses"
)]
pub async fn list_businesses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<BusinessList>>> {
    let resp = business_service::list_businesses(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/businesses/{id}",
    responses(
        (status = 200, description = "Business", body = ApiResponse<Business>),
        (status = 404, description = "Business not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Businesses"
)]
pub async fn get_business(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Business>>> {
    let resp = business_service::get_business(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/businesses",
    request_body = CreateBusinessRequest,
    responses((status = 201, description = "Business created", body = ApiResponse<Business>)),
    security(("bearer_auth" = [])),
    tag = "Businesses"
)]
pub async fn create_business(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBusinessRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Business>>)> {
    let resp = business_service::create_business(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/businesses/{id}",
    request_body = UpdateBusinessRequest,
    responses(
        (status = 200, description = "Business updated", body = ApiResponse<Business>),
        (status = 404, description = "Business not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Businesses"
)]
pub async fn update_business(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBusinessRequest>,
) -> AppResult<Json<ApiResponse<Business>>> {
    let resp = business_service::update_business(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/businesses/{id}",
    responses(
        (status = 200, description = "Business deleted"),
        (status = 404, description = "Business not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Businesses"
)]
pub async fn delete_business(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = business_service::delete_business(&state, id).await?;
    Ok(Json(resp))
}
