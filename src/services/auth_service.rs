use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    dto::auth::{
        AuthSession, ForgotPasswordRequest, LoginRequest, OtpVerified, RegisterStepOneRequest,
        RegisterStepTwoRequest, ResendOtpRequest, ResetPasswordRequest, UpdatePasswordRequest,
        VerifyOtpRequest,
    },
    entity::{Users, users},
    error::{AppError, AppResult, FieldError},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    services::{otp_service, token},
    state::AppState,
};

const SPECIAL_CHARS: &str = "@$!%*?&£#";

const ALREADY_REGISTERED: &str = "This phone number is already registered. Please use \"Forgot Password\" to reset your password instead of creating a new account.";
const PASSWORD_ALREADY_SET: &str = "This phone number is already registered with a password. Please use \"Forgot Password\" to reset your password or login directly.";
const REGISTRATION_INCOMPLETE: &str =
    "Your registration is incomplete. Please complete your registration instead of resetting password.";
const PASSWORD_POLICY: &str = "Password must contain at least one uppercase letter, one lowercase letter, one number, and one special character.";

/// Step one: claim the phone number and send an OTP. Re-running for an
/// incomplete registration reuses the existing row instead of conflicting.
pub async fn register_step_one(
    state: &AppState,
    payload: RegisterStepOneRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    validate_msisdn(&payload.country_code, &payload.phone)?;

    // Housekeeping, not a precondition: stale incomplete registrations free
    // up their phone numbers after the retention window.
    purge_stale_registrations(&state.orm, state.config.registration_retention_hours).await?;

    let existing = find_user(&state.orm, &payload.country_code, &payload.phone).await?;
    let continuing = match existing {
        Some(user) if user.password_hash.is_some() => {
            return Err(AppError::Conflict(ALREADY_REGISTERED.into()));
        }
        Some(_) => true,
        None => {
            users::ActiveModel {
                id: Set(Uuid::new_v4()),
                first_name: Set(None),
                last_name: Set(None),
                phone: Set(payload.phone.clone()),
                country_code: Set(payload.country_code.clone()),
                email: Set(None),
                password_hash: Set(None),
                status: Set("inactive".into()),
                is_verified: Set(false),
                verified_at: Set(None),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&state.orm)
            .await?;
            false
        }
    };

    otp_service::generate_otp(state, &payload.country_code, &payload.phone).await?;

    let number = format!("{}{}", payload.country_code, payload.phone);
    let message = if continuing {
        format!("OTP sent to +{number} successfully. Continuing previous registration.")
    } else {
        format!("OTP sent to +{number} successfully")
    };
    Ok(ApiResponse::success(
        message,
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn resend_otp(
    state: &AppState,
    payload: ResendOtpRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    validate_msisdn(&payload.country_code, &payload.phone)?;
    otp_service::resend_otp(state, &payload.country_code, &payload.phone).await?;

    let number = format!("{}{}", payload.country_code, payload.phone);
    Ok(ApiResponse::success(
        format!("OTP sent to +{number} successfully"),
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn verify_otp(
    state: &AppState,
    payload: VerifyOtpRequest,
) -> AppResult<ApiResponse<OtpVerified>> {
    if payload.code.len() != 4 || !payload.code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(vec![FieldError::new(
            "code",
            "Code must be a 4-digit number",
        )]));
    }

    let verified = otp_service::verify_otp(
        state,
        &payload.code,
        &payload.country_code,
        &payload.phone,
    )
    .await?;

    if !verified {
        return Err(AppError::Unauthorized("Incorrect OTP entered".into()));
    }

    Ok(ApiResponse::success(
        "OTP verified successfully",
        OtpVerified { verified: true },
        Some(Meta::empty()),
    ))
}

/// Step two: set the password and activate the account.
pub async fn register_step_two(
    state: &AppState,
    payload: RegisterStepTwoRequest,
) -> AppResult<ApiResponse<AuthSession>> {
    let user = find_user(&state.orm, &payload.country_code, &payload.phone)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if user.password_hash.is_some() {
        return Err(AppError::Conflict(PASSWORD_ALREADY_SET.into()));
    }
    // Redundant once the password check holds, kept as a guard against
    // accounts activated or suspended out of band.
    if user.status == "active" || user.status == "suspended" {
        return Err(AppError::Unauthorized(
            "An error occurred. Please try again".into(),
        ));
    }

    validate_password(&payload.password)
        .map_err(|msg| AppError::Validation(vec![FieldError::new("password", msg)]))?;

    let hash = hash_password(&payload.password)?;
    let mut active = user.into_active_model();
    active.password_hash = Set(Some(hash));
    active.status = Set("active".into());
    active.updated_at = Set(Utc::now().into());
    let user = active.update(&state.orm).await?;

    let token = token::issue_token(&state.orm, user.id).await?;

    Ok(ApiResponse::success(
        "Registration successful",
        AuthSession {
            user: sanitize(user),
            token,
        },
        Some(Meta::empty()),
    ))
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<AuthSession>> {
    let user = find_user(&state.orm, &payload.country_code, &payload.phone).await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };
    let Some(hash) = user.password_hash.clone() else {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = token::issue_token(&state.orm, user.id).await?;

    Ok(ApiResponse::success(
        "Login successful",
        AuthSession {
            user: sanitize(user),
            token,
        },
        Some(Meta::empty()),
    ))
}

/// Revokes every session of the caller, not just the presented token.
pub async fn logout(
    state: &AppState,
    auth: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    token::revoke_all(&state.orm, auth.user_id).await?;
    Ok(ApiResponse::success(
        "Logout successful",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user = find_user(&state.orm, &payload.country_code, &payload.phone)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if user.password_hash.is_none() {
        return Err(AppError::BadRequest(REGISTRATION_INCOMPLETE.into()));
    }

    otp_service::generate_otp(state, &payload.country_code, &payload.phone).await?;

    Ok(ApiResponse::success(
        "OTP sent successfully for password reset",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Replaces the password and forces re-login everywhere.
pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user = find_user(&state.orm, &payload.country_code, &payload.phone)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    validate_password(&payload.password)
        .map_err(|msg| AppError::Validation(vec![FieldError::new("password", msg)]))?;

    let hash = hash_password(&payload.password)?;
    let user_id = user.id;
    let mut active = user.into_active_model();
    active.password_hash = Set(Some(hash));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    token::revoke_all(&state.orm, user_id).await?;

    Ok(ApiResponse::success(
        "Password reset successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn update_password(
    state: &AppState,
    auth: &AuthUser,
    payload: UpdatePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user = Users::find_by_id(auth.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let Some(hash) = user.password_hash.clone() else {
        return Err(AppError::BadRequest(REGISTRATION_INCOMPLETE.into()));
    };

    if !verify_password(&payload.old_password, &hash)? {
        return Err(AppError::Unauthorized("Current password is incorrect".into()));
    }
    if payload.new_password == payload.old_password {
        return Err(AppError::Validation(vec![FieldError::new(
            "new_password",
            "New password must be different from the current password",
        )]));
    }
    validate_password(&payload.new_password)
        .map_err(|msg| AppError::Validation(vec![FieldError::new("new_password", msg)]))?;

    let new_hash = hash_password(&payload.new_password)?;
    let mut active = user.into_active_model();
    active.password_hash = Set(Some(new_hash));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Password updated successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Delete incomplete registrations older than the retention window.
/// Shared by step one and the `cleanup` binary.
pub async fn purge_stale_registrations<C: ConnectionTrait>(
    conn: &C,
    retention_hours: i64,
) -> AppResult<u64> {
    let cutoff = Utc::now() - Duration::hours(retention_hours);
    let result = Users::delete_many()
        .filter(users::Column::PasswordHash.is_null())
        .filter(users::Column::Status.eq("inactive"))
        .filter(users::Column::CreatedAt.lt(cutoff))
        .exec(conn)
        .await?;

    if result.rows_affected > 0 {
        tracing::info!(
            count = result.rows_affected,
            retention_hours,
            "purged stale incomplete registrations"
        );
    }
    Ok(result.rows_affected)
}

async fn find_user(
    orm: &OrmConn,
    country_code: &str,
    phone: &str,
) -> AppResult<Option<users::Model>> {
    let user = Users::find()
        .filter(users::Column::CountryCode.eq(country_code))
        .filter(users::Column::Phone.eq(phone))
        .one(orm)
        .await?;
    Ok(user)
}

fn validate_msisdn(country_code: &str, phone: &str) -> AppResult<()> {
    let mut errors = Vec::new();
    if country_code.is_empty()
        || country_code.len() > 3
        || !country_code.chars().all(|c| c.is_ascii_digit())
    {
        errors.push(FieldError::new(
            "country_code",
            "Country code must be 1 to 3 digits",
        ));
    }
    if phone.len() < 9 || phone.len() > 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new("phone", "Phone must be 9 to 10 digits"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long.".into());
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| SPECIAL_CHARS.contains(c));
    if has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        Err(PASSWORD_POLICY.into())
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn sanitize(user: users::Model) -> User {
    User {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        phone: user.phone,
        country_code: user.country_code,
        email: user.email,
        status: user.status,
        is_verified: user.is_verified,
        verified_at: user.verified_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: user.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_policy_rejects_short() {
        assert!(validate_password("short1!").is_err());
    }

    #[test]
    fn password_policy_rejects_missing_uppercase() {
        assert!(validate_password("alllowercase1!").is_err());
    }

    #[test]
    fn password_policy_rejects_missing_special() {
        assert!(validate_password("NoSpecial123").is_err());
    }

    #[test]
    fn password_policy_accepts_valid() {
        assert!(validate_password("Valid123!").is_ok());
        assert!(validate_password("Str0ng£pass").is_ok());
    }

    #[test]
    fn msisdn_validation_flags_both_fields() {
        let err = validate_msisdn("abc", "123").unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "country_code");
                assert_eq!(fields[1].field, "phone");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn msisdn_validation_accepts_nine_digit_phone() {
        assert!(validate_msisdn("255", "123456789").is_ok());
        assert!(validate_msisdn("1", "1234567890").is_ok());
    }
}
