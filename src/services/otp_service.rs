use chrono::Utc;
use rand::Rng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{Otps, Users, otps, users},
    error::AppResult,
    state::AppState,
};

fn generate_code() -> String {
    rand::rng().random_range(1000..=9999).to_string()
}

pub fn otp_message(app_name: &str, code: &str) -> String {
    format!("Your {app_name} verification code is: {code}. Do not share this code with anyone.")
}

/// Create a fresh OTP row for the number and dispatch it. A failed send is
/// logged but does not roll back the row; the user can resend.
pub async fn generate_otp(state: &AppState, country_code: &str, phone: &str) -> AppResult<String> {
    let code = generate_code();
    otps::ActiveModel {
        id: Set(Uuid::new_v4()),
        country_code: Set(country_code.to_string()),
        phone: Set(phone.to_string()),
        code: Set(code.clone()),
        is_expired: Set(false),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    dispatch(state, country_code, phone, &code).await;
    Ok(code)
}

/// Regenerate the newest OTP for the number and resend it. When no OTP was
/// ever issued this is a silent no-op: step one is the only way to mint the
/// first code.
pub async fn resend_otp(state: &AppState, country_code: &str, phone: &str) -> AppResult<()> {
    let latest = Otps::find()
        .filter(otps::Column::CountryCode.eq(country_code))
        .filter(otps::Column::Phone.eq(phone))
        .order_by_desc(otps::Column::CreatedAt)
        .one(&state.orm)
        .await?;

    if let Some(otp) = latest {
        let code = generate_code();
        let mut active = otp.into_active_model();
        active.code = Set(code.clone());
        active.is_expired = Set(false);
        active.update(&state.orm).await?;
        dispatch(state, country_code, phone, &code).await;
    }

    Ok(())
}

/// Match an unexpired OTP for the number. On success the code is expired and
/// the user marked verified, atomically; a second attempt with the same code
/// therefore fails.
pub async fn verify_otp(
    state: &AppState,
    code: &str,
    country_code: &str,
    phone: &str,
) -> AppResult<bool> {
    let txn = state.orm.begin().await?;

    let otp = Otps::find()
        .filter(otps::Column::Code.eq(code))
        .filter(otps::Column::CountryCode.eq(country_code))
        .filter(otps::Column::Phone.eq(phone))
        .filter(otps::Column::IsExpired.eq(false))
        .one(&txn)
        .await?;

    let Some(otp) = otp else {
        return Ok(false);
    };

    let mut active = otp.into_active_model();
    active.is_expired = Set(true);
    active.update(&txn).await?;

    let user = Users::find()
        .filter(users::Column::CountryCode.eq(country_code))
        .filter(users::Column::Phone.eq(phone))
        .one(&txn)
        .await?;
    if let Some(user) = user {
        let mut active = user.into_active_model();
        active.is_verified = Set(true);
        active.verified_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;
    }

    txn.commit().await?;
    Ok(true)
}

async fn dispatch(state: &AppState, country_code: &str, phone: &str, code: &str) {
    // Full international number only matters to the SMS gateway; storage
    // keeps the composite key.
    let number = format!("{country_code}{phone}");
    let message = otp_message(&state.config.app_name, code);
    match state.sms.send(&number, &message).await {
        Ok(receipt) => {
            tracing::info!(provider = receipt.provider, number, "OTP SMS sent");
        }
        Err(err) => {
            tracing::error!(error = %err, number, "failed to send OTP SMS");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_is_four_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 4);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(code.parse::<u32>().unwrap() >= 1000);
        }
    }

    #[test]
    fn message_includes_app_name_and_code() {
        let message = otp_message("Passo", "1234");
        assert_eq!(
            message,
            "Your Passo verification code is: 1234. Do not share this code with anyone."
        );
    }
}
