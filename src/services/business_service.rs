use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    dto::businesses::{BusinessList, CreateBusinessRequest, UpdateBusinessRequest},
    entity::{Businesses, businesses},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Business,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_businesses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<BusinessList>> {
    let items = Businesses::find()
        .filter(businesses::Column::UserId.eq(user.user_id))
        .order_by_desc(businesses::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(business_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Businesses",
        BusinessList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_business(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Business>> {
    let business = Businesses::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found".into()))?;
    Ok(ApiResponse::success(
        "Business",
        business_from_entity(business),
        None,
    ))
}

pub async fn create_business(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBusinessRequest,
) -> AppResult<ApiResponse<Business>> {
    let id = Uuid::new_v4();
    let business = businesses::ActiveModel {
        id: Set(id),
        user_id: Set(user.user_id),
        slug: Set(build_slug(&payload.name, id)),
        name: Set(payload.name),
        phone: Set(payload.phone),
        country: Set(payload.country),
        description: Set(payload.description),
        address: Set(payload.address),
        email: Set(payload.email),
        website: Set(payload.website),
        tagline: Set(payload.tagline),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Business created",
        business_from_entity(business),
        Some(Meta::empty()),
    ))
}

pub async fn update_business(
    state: &AppState,
    id: Uuid,
    payload: UpdateBusinessRequest,
) -> AppResult<ApiResponse<Business>> {
    let existing = Businesses::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found".into()))?;

    let mut active = existing.into_active_model();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(phone);
    }
    if let Some(country) = payload.country {
        active.country = Set(Some(country));
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(email) = payload.email {
        active.email = Set(Some(email));
    }
    if let Some(website) = payload.website {
        active.website = Set(Some(website));
    }
    if let Some(tagline) = payload.tagline {
        active.tagline = Set(Some(tagline));
    }
    active.updated_at = Set(Utc::now().into());

    let business = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Business updated",
        business_from_entity(business),
        Some(Meta::empty()),
    ))
}

pub async fn delete_business(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Businesses::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Business not found".into()));
    }
    Ok(ApiResponse::success(
        "Business deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Slug from the lowercased name plus a uuid fragment to keep it unique.
fn build_slug(name: &str, id: Uuid) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-');
    let suffix = id.to_string();
    format!("{}-{}", slug, &suffix[..8])
}

fn business_from_entity(model: businesses::Model) -> Business {
    Business {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        slug: model.slug,
        phone: model.phone,
        country: model.country,
        description: model.description,
        address: model.address,
        email: model.email,
        website: model.website,
        tagline: model.tagline,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_lowercased_and_dashed() {
        let id = Uuid::new_v4();
        let slug = build_slug("Mama Ntilie's Shop", id);
        assert!(slug.starts_with("mama-ntilie-s-shop-"));
        assert_eq!(slug.len(), "mama-ntilie-s-shop-".len() + 8);
    }

    #[test]
    fn slug_collapses_consecutive_separators() {
        let id = Uuid::new_v4();
        let slug = build_slug("  Duka   la  Mjini ", id);
        assert!(slug.starts_with("duka-la-mjini-"));
        assert!(!slug.contains("--"));
    }
}
