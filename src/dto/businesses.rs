use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Business;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBusinessRequest {
    pub name: String,
    pub phone: String,
    pub country: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub tagline: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBusinessRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub tagline: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessList {
    pub items: Vec<Business>,
}
