use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use pantrykeeper_core::ItemId;
use pantrykeeper_inventory::{InventoryFilter, ItemPatch, NewInventoryItem};

use crate::app::dto::{self, Envelope};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).patch(update_item).delete(delete_item))
}

/// A path segment that is not an integer (or not even UTF-8) cannot name a record.
fn parse_id(raw: Result<Path<String>, PathRejection>) -> Result<ItemId, ApiError> {
    let Path(raw) = raw.map_err(|_| ApiError::NotFound)?;
    Ok(raw.parse::<ItemId>()?)
}

pub async fn list_items(
    Extension(services): Extension<AppServices>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let query = dto::ListQuery::from_pairs(pairs);
    let filter = InventoryFilter::from_query(query.category.as_deref(), query.low_stock.as_deref());
    let items = services.store().list(&filter).await?;
    let count = items.len();

    Ok((StatusCode::OK, Json(Envelope::data(items).with_count(count))).into_response())
}

pub async fn create_item(
    Extension(services): Extension<AppServices>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body = dto::json_object(&body)?;
    let new_item = NewInventoryItem::from_json(&body)?;

    let item = services.store().create(new_item).await?;
    tracing::info!(id = %item.id, category = %item.category, "inventory item created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(item).with_message("Inventory item created successfully")),
    )
        .into_response())
}

pub async fn get_item(
    Extension(services): Extension<AppServices>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(id)?;

    match services.store().get(id).await? {
        Some(item) => Ok((StatusCode::OK, Json(Envelope::data(item))).into_response()),
        None => Err(ApiError::NotFound),
    }
}

pub async fn update_item(
    Extension(services): Extension<AppServices>,
    id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = parse_id(id)?;
    if services.store().get(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let body = dto::json_object(&body)?;
    let patch = ItemPatch::from_json(&body)?;

    // The store re-checks existence inside its write transaction.
    let item = services
        .store()
        .update(id, &patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(id = %item.id, "inventory item updated");

    Ok((
        StatusCode::OK,
        Json(Envelope::data(item).with_message("Inventory item updated successfully")),
    )
        .into_response())
}

pub async fn delete_item(
    Extension(services): Extension<AppServices>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(id)?;

    if !services.store().delete(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(%id, "inventory item deleted");

    Ok((
        StatusCode::OK,
        Json(Envelope::message("Inventory item deleted successfully")),
    )
        .into_response())
}
