use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::bmi;
use super::dto::{CustomerDetails, CustomerListItem, CustomerPayload, DeletedResponse};
use super::repo;
use crate::auth::jwt::AuthUser;
use crate::error::{ok, ApiError, ApiResponse, ApiResult};
use crate::plans;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_customers(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> ApiResult<Vec<CustomerListItem>> {
    let rows = repo::list(&state.db).await?;
    let items = rows
        .into_iter()
        .map(|row| CustomerListItem {
            imc_classification: bmi::classify(row.customer.imc),
            customer: row.customer,
            plan_count: row.plan_count,
        })
        .collect();
    Ok(ok(items))
}

#[instrument(skip(state, payload))]
pub async fn create_customer(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Json(payload): Json<CustomerPayload>,
) -> Result<(StatusCode, Json<ApiResponse<CustomerDetails>>), ApiError> {
    let payload = payload.normalized()?;

    if repo::find_id_by_id_card(&state.db, &payload.id_card)
        .await?
        .is_some()
    {
        return Err(ApiError::validation("Ya existe un cliente con esta cédula"));
    }

    let imc = payload.derived_imc();
    let customer = repo::create(&state.db, &payload, imc).await?;
    info!(customer_id = %customer.id, "customer created");

    Ok((
        StatusCode::CREATED,
        ok(CustomerDetails::new(customer, Vec::new())),
    ))
}

#[instrument(skip(state))]
pub async fn get_customer(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<CustomerDetails> {
    let customer = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cliente no encontrado"))?;
    let plans = plans::repo::list_by_customer(&state.db, id).await?;
    Ok(ok(CustomerDetails::new(customer, plans)))
}

#[instrument(skip(state, payload))]
pub async fn update_customer(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerPayload>,
) -> ApiResult<CustomerDetails> {
    let payload = payload.normalized()?;

    if let Some(holder) = repo::find_id_by_id_card(&state.db, &payload.id_card).await? {
        if holder != id {
            return Err(ApiError::validation("Ya existe un cliente con esta cédula"));
        }
    }

    let imc = payload.derived_imc();
    let customer = repo::update(&state.db, id, &payload, imc)
        .await?
        .ok_or_else(|| ApiError::not_found("Cliente no encontrado"))?;
    info!(customer_id = %customer.id, "customer updated");

    let plans = plans::repo::list_by_customer(&state.db, id).await?;
    Ok(ok(CustomerDetails::new(customer, plans)))
}

#[instrument(skip(state))]
pub async fn delete_customer(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    // Plans and their meal entries go with the customer (FK cascade).
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Cliente no encontrado"));
    }
    info!(customer_id = %id, "customer deleted");
    Ok(ok(DeletedResponse { id }))
}
