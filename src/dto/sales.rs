use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Sale, SaleItem};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SaleItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub total: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSaleRequest {
    pub business_id: Uuid,
    pub customer_id: Uuid,
    pub payment_status: Option<String>,
    pub items: Vec<SaleItemInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSaleRequest {
    pub customer_id: Option<Uuid>,
    pub payment_status: Option<String>,
    pub items: Vec<SaleItemInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleList {
    pub items: Vec<Sale>,
}
