use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::{AuthTokens, auth_tokens},
    error::{AppError, AppResult},
};

/// Issue a bearer token: persist the jti so it can be revoked later, then
/// sign a JWT carrying it. Several tokens may coexist per user (multi-device).
pub async fn issue_token<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<String> {
    let jti = Uuid::new_v4();
    auth_tokens::ActiveModel {
        id: Set(jti),
        user_id: Set(user_id),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        jti: jti.to_string(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(token)
}

/// Delete every token row for the user, invalidating all sessions at once.
pub async fn revoke_all<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<u64> {
    let result = AuthTokens::delete_many()
        .filter(auth_tokens::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
