use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{patch, post},
};

use crate::{
    dto::auth::{
        AuthSession, ForgotPasswordRequest, LoginRequest, OtpVerified, RegisterStepOneRequest,
        RegisterStepTwoRequest, ResendOtpRequest, ResetPasswordRequest, UpdatePasswordRequest,
        VerifyOtpRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register/step/one", post(register_step_one))
        .route("/register/verify-otp", post(verify_otp))
        .route("/register/resend-otp", post(resend_otp))
        .route("/register/step/two", post(register_step_two))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/verify-reset-otp", post(verify_reset_otp))
        .route("/reset-password", post(reset_password))
        .route("/update-password", patch(update_password))
}

#[utoipa::path(
    post,
    path = "/api/register/step/one",
    request_body = RegisterStepOneRequest,
    responses(
        (status = 201, description = "OTP sent"),
        (status = 409, description = "Phone already fully registered"),
        (status = 422, description = "Invalid phone or country code")
    ),
    tag = "Auth"
)]
pub async fn register_step_one(
    State(state): State<AppState>,
    Json(payload): Json<RegisterStepOneRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<serde_json::Value>>)> {
    let resp = auth_service::register_step_one(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/register/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "OTP verified", body = ApiResponse<OtpVerified>),
        (status = 401, description = "Incorrect OTP")
    ),
    tag = "Auth"
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> AppResult<Json<ApiResponse<OtpVerified>>> {
    let resp = auth_service::verify_otp(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/register/resend-otp",
    request_body = ResendOtpRequest,
    responses((status = 201, description = "OTP resent")),
    tag = "Auth"
)]
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(payload): Json<ResendOtpRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<serde_json::Value>>)> {
    let resp = auth_service::resend_otp(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/register/step/two",
    request_body = RegisterStepTwoRequest,
    responses(
        (status = 201, description = "Registration complete", body = ApiResponse<AuthSession>),
        (status = 404, description = "No registration for this phone"),
        (status = 409, description = "Password already set"),
        (status = 422, description = "Password policy violation")
    ),
    tag = "Auth"
)]
pub async fn register_step_two(
    State(state): State<AppState>,
    Json(payload): Json<RegisterStepTwoRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthSession>>)> {
    let resp = auth_service::register_step_two(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<AuthSession>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthSession>>> {
    let resp = auth_service::login(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 200, description = "All sessions revoked")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::logout(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset OTP sent"),
        (status = 400, description = "Registration incomplete"),
        (status = 404, description = "User not found")
    ),
    tag = "Auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::forgot_password(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/verify-reset-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "OTP verified", body = ApiResponse<OtpVerified>),
        (status = 401, description = "Incorrect OTP")
    ),
    tag = "Auth"
)]
pub async fn verify_reset_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> AppResult<Json<ApiResponse<OtpVerified>>> {
    let resp = auth_service::verify_otp(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset, all sessions revoked"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Password policy violation")
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::reset_password(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/update-password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 401, description = "Current password incorrect")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::update_password(&state, &user, payload).await?;
    Ok(Json(resp))
}
