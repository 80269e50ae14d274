use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::sales::{CreateSaleRequest, SaleItemInput, SaleList, SaleWithItems, UpdateSaleRequest},
    entity::{Businesses, Customers, Products, SaleItems, Sales, products, sale_items, sales},
    error::{AppError, AppResult, FieldError},
    models::{Sale, SaleItem},
    response::{ApiResponse, Meta},
    routes::params::{SaleListQuery, SortOrder},
    state::AppState,
};

pub async fn list_sales(
    state: &AppState,
    query: SaleListQuery,
) -> AppResult<ApiResponse<SaleList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();
    if let Some(business_id) = query.business_id {
        condition = condition.add(sales::Column::BusinessId.eq(business_id));
    }
    if let Some(status) = query.payment_status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(sales::Column::PaymentStatus.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Sales::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sales::Column::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(sales::Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(sale_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Sales", SaleList { items }, Some(meta)))
}

pub async fn get_sale(state: &AppState, id: Uuid) -> AppResult<ApiResponse<SaleWithItems>> {
    let sale = Sales::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale not found".into()))?;

    let items = SaleItems::find()
        .filter(sale_items::Column::SaleId.eq(sale.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(sale_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Sale",
        SaleWithItems {
            sale: sale_from_entity(sale),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Create a sale with its line items in one transaction. Stock is checked
/// against row-locked products and decremented with a conditional update, so
/// two concurrent sales cannot both take the last units.
pub async fn create_sale(
    state: &AppState,
    payload: CreateSaleRequest,
) -> AppResult<ApiResponse<SaleWithItems>> {
    let mut errors = validate_items(&payload.items);
    let payment_status = payload.payment_status.unwrap_or_else(|| "unpaid".into());
    if let Err(err) = validate_payment_status(&payment_status) {
        errors.push(err);
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let txn = state.orm.begin().await?;

    if Businesses::find_by_id(payload.business_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(vec![FieldError::new(
            "business_id",
            "Business not found",
        )]));
    }
    if Customers::find_by_id(payload.customer_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(vec![FieldError::new(
            "customer_id",
            "Customer not found",
        )]));
    }

    // The header total is the sum of the caller-supplied item totals.
    let total_amount = sum_totals(&payload.items)?;

    let sale = sales::ActiveModel {
        id: Set(Uuid::new_v4()),
        business_id: Set(payload.business_id),
        customer_id: Set(payload.customer_id),
        reference: Set(build_reference()),
        total_amount: Set(total_amount),
        payment_status: Set(payment_status),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let items = persist_items(&txn, sale.id, &payload.items).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Sale created successfully",
        SaleWithItems {
            sale: sale_from_entity(sale),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Full replace, not a diff: old line items are removed (returning their
/// stock) and the new payload is inserted from scratch.
pub async fn update_sale(
    state: &AppState,
    id: Uuid,
    payload: UpdateSaleRequest,
) -> AppResult<ApiResponse<SaleWithItems>> {
    let errors = validate_items(&payload.items);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let txn = state.orm.begin().await?;

    let sale = Sales::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale not found".into()))?;

    release_items(&txn, sale.id).await?;
    let items = persist_items(&txn, sale.id, &payload.items).await?;

    let total_amount = sum_totals(&payload.items)?;

    let mut active = sale.into_active_model();
    if let Some(customer_id) = payload.customer_id {
        if Customers::find_by_id(customer_id).one(&txn).await?.is_none() {
            return Err(AppError::Validation(vec![FieldError::new(
                "customer_id",
                "Customer not found",
            )]));
        }
        active.customer_id = Set(customer_id);
    }
    if let Some(payment_status) = payload.payment_status {
        validate_payment_status(&payment_status)
            .map_err(|err| AppError::Validation(vec![err]))?;
        active.payment_status = Set(payment_status);
    }
    active.total_amount = Set(total_amount);
    active.updated_at = Set(Utc::now().into());
    let sale = active.update(&txn).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Sale updated successfully",
        SaleWithItems {
            sale: sale_from_entity(sale),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_sale(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    let sale = Sales::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale not found".into()))?;

    release_items(&txn, sale.id).await?;
    sale.delete(&txn).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Sale deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Lock the referenced products, verify stock per item (errors keyed by item
/// index), then insert the line items and decrement stock atomically.
async fn persist_items(
    txn: &DatabaseTransaction,
    sale_id: Uuid,
    items: &[SaleItemInput],
) -> AppResult<Vec<SaleItem>> {
    let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
    let products = Products::find()
        .filter(products::Column::Id.is_in(product_ids))
        .lock(LockType::Update)
        .all(txn)
        .await?;
    let by_id: HashMap<Uuid, &products::Model> = products.iter().map(|p| (p.id, p)).collect();

    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match by_id.get(&item.product_id) {
            None => errors.push(FieldError::new(
                format!("items.{index}.product_id"),
                "Product not found",
            )),
            Some(product) if product.stock_quantity < item.quantity => {
                errors.push(FieldError::new(
                    format!("items.{index}.quantity"),
                    format!(
                        "Insufficient stock for product {}. Available: {}",
                        product.name, product.stock_quantity
                    ),
                ));
            }
            Some(_) => {}
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut created = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let row = sale_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            sale_id: Set(sale_id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            total: Set(item.total),
            created_at: NotSet,
        }
        .insert(txn)
        .await?;

        // Conditional decrement: zero rows affected means the same product
        // appeared on an earlier line and the combined demand exceeds stock.
        let result = Products::update_many()
            .col_expr(
                products::Column::StockQuantity,
                Expr::col(products::Column::StockQuantity).sub(item.quantity),
            )
            .filter(products::Column::Id.eq(item.product_id))
            .filter(products::Column::StockQuantity.gte(item.quantity))
            .exec(txn)
            .await?;
        if result.rows_affected == 0 {
            let name = by_id
                .get(&item.product_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            return Err(AppError::Validation(vec![FieldError::new(
                format!("items.{index}.quantity"),
                format!("Insufficient stock for product {name}"),
            )]));
        }

        created.push(sale_item_from_entity(row));
    }

    Ok(created)
}

/// Return the stock held by a sale's current items and delete them.
async fn release_items(txn: &DatabaseTransaction, sale_id: Uuid) -> AppResult<()> {
    let old_items = SaleItems::find()
        .filter(sale_items::Column::SaleId.eq(sale_id))
        .all(txn)
        .await?;

    for item in &old_items {
        Products::update_many()
            .col_expr(
                products::Column::StockQuantity,
                Expr::col(products::Column::StockQuantity).add(item.quantity),
            )
            .filter(products::Column::Id.eq(item.product_id))
            .exec(txn)
            .await?;
    }

    SaleItems::delete_many()
        .filter(sale_items::Column::SaleId.eq(sale_id))
        .exec(txn)
        .await?;

    Ok(())
}

fn validate_items(items: &[SaleItemInput]) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if items.is_empty() {
        errors.push(FieldError::new(
            "items",
            "At least one item is required for the sale",
        ));
        return errors;
    }
    for (index, item) in items.iter().enumerate() {
        if item.quantity <= 0 {
            errors.push(FieldError::new(
                format!("items.{index}.quantity"),
                "Quantity must be greater than 0",
            ));
        }
        if item.unit_price <= 0 {
            errors.push(FieldError::new(
                format!("items.{index}.unit_price"),
                "Unit price must be greater than 0",
            ));
        }
        if item.total < 0 {
            errors.push(FieldError::new(
                format!("items.{index}.total"),
                "Total must not be negative",
            ));
        }
    }
    errors
}

/// Header total. Item totals are individually bounded by validation but
/// their sum can still overflow an i64 on absurd payloads.
fn sum_totals(items: &[SaleItemInput]) -> AppResult<i64> {
    items.iter().try_fold(0i64, |acc, item| {
        acc.checked_add(item.total).ok_or_else(|| {
            AppError::Validation(vec![FieldError::new(
                "items",
                "Sale total exceeds the maximum representable amount",
            )])
        })
    })
}

fn validate_payment_status(status: &str) -> Result<(), FieldError> {
    match status {
        "paid" | "unpaid" => Ok(()),
        _ => Err(FieldError::new(
            "payment_status",
            "Payment status must be one of: paid, unpaid",
        )),
    }
}

fn build_reference() -> String {
    format!("REF{}", Utc::now().timestamp_millis())
}

fn sale_from_entity(model: sales::Model) -> Sale {
    Sale {
        id: model.id,
        business_id: model.business_id,
        customer_id: model.customer_id,
        reference: model.reference,
        total_amount: model.total_amount,
        payment_status: model.payment_status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn sale_item_from_entity(model: sale_items::Model) -> SaleItem {
    SaleItem {
        id: model.id,
        sale_id: model.sale_id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, unit_price: i64, total: i64) -> SaleItemInput {
        SaleItemInput {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price,
            total,
        }
    }

    #[test]
    fn empty_items_are_rejected() {
        let errors = validate_items(&[]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "items");
    }

    #[test]
    fn invalid_item_fields_are_keyed_by_index() {
        let errors = validate_items(&[item(5, 10, 50), item(0, 0, -1)]);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["items.1.quantity", "items.1.unit_price", "items.1.total"]
        );
    }

    #[test]
    fn zero_total_is_allowed() {
        // A free line item (e.g. a promotion) is valid as long as prices are.
        let errors = validate_items(&[item(1, 100, 0)]);
        assert!(errors.is_empty());
    }

    #[test]
    fn total_sum_rejects_overflow() {
        let items = [item(1, 100, i64::MAX), item(1, 100, 1)];
        let err = sum_totals(&items).unwrap_err();
        match err {
            AppError::Validation(errors) => assert_eq!(errors[0].field, "items"),
            other => panic!("expected Validation, got {other:?}"),
        }

        assert_eq!(sum_totals(&[item(2, 500, 1000), item(3, 200, 600)]).unwrap(), 1600);
    }

    #[test]
    fn payment_status_is_constrained() {
        assert!(validate_payment_status("paid").is_ok());
        assert!(validate_payment_status("unpaid").is_ok());
        assert!(validate_payment_status("unpain").is_err());
    }

    #[test]
    fn reference_is_timestamp_derived() {
        let reference = build_reference();
        assert!(reference.starts_with("REF"));
        assert!(reference[3..].parse::<i64>().is_ok());
    }
}
