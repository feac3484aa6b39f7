use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::completion::Completion;
use super::dto::{
    meals_to_entries, CopyPlanRequest, CreatePlanRequest, CustomerSummary, DeletedResponse,
    PlanListItem, PlanResponse, UpdatePlanRequest,
};
use super::{grid, repo};
use crate::auth::jwt::AuthUser;
use crate::customers;
use crate::error::{ok, ApiError, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlanListQuery {
    #[serde(default)]
    pub customer_id: Option<Uuid>,
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(query): Query<PlanListQuery>,
) -> ApiResult<Vec<PlanListItem>> {
    let rows = repo::list(&state.db, query.customer_id).await?;
    let items = rows
        .into_iter()
        .map(|row| {
            let customer = match (row.plan.customer_id, row.customer_first_name) {
                (Some(id), Some(first_name)) => Some(CustomerSummary {
                    id,
                    first_name,
                    last_name: row.customer_last_name.unwrap_or_default(),
                    cell_phone: row.customer_cell_phone,
                }),
                _ => None,
            };
            PlanListItem {
                completion: Completion::from_count(row.meal_count.max(0) as usize),
                plan: row.plan,
                customer,
            }
        })
        .collect();
    Ok(ok(items))
}

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Json(payload): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PlanResponse>>), ApiError> {
    let customer = customers::repo::find(&state.db, payload.customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cliente no encontrado"))?;

    let (fields, meals) = payload.into_parts()?;
    let (plan, entries) = repo::create(&state.db, &fields, &meals).await?;
    info!(plan_id = %plan.id, entries = entries.len(), "plan created");

    Ok((
        StatusCode::CREATED,
        ok(PlanResponse::new(plan, Some(customer), entries)),
    ))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<PlanResponse> {
    let details = repo::find_details(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plan nutricional no encontrado"))?;
    grid::warn_on_duplicates(details.plan.id, &details.entries);
    Ok(ok(PlanResponse::new(
        details.plan,
        details.customer,
        details.entries,
    )))
}

#[instrument(skip(state, payload))]
pub async fn update_plan(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlanRequest>,
) -> ApiResult<PlanResponse> {
    let existing = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plan nutricional no encontrado"))?;

    let fields = payload.merged_fields(&existing)?;
    let meals = match &payload.meals {
        Some(map) => Some(meals_to_entries(map)?),
        None => None,
    };

    let (plan, entries) = repo::update(&state.db, id, &fields, meals.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("Plan nutricional no encontrado"))?;
    info!(plan_id = %plan.id, "plan updated");

    let customer = match plan.customer_id {
        Some(cid) => customers::repo::find(&state.db, cid).await?,
        None => None,
    };
    Ok(ok(PlanResponse::new(plan, customer, entries)))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Plan nutricional no encontrado"));
    }
    info!(plan_id = %id, "plan deleted");
    Ok(ok(DeletedResponse { id }))
}

#[instrument(skip(state, payload))]
pub async fn copy_plan(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CopyPlanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PlanResponse>>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("El nombre del plan es requerido"));
    }
    let customer = customers::repo::find(&state.db, payload.customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cliente no encontrado"))?;
    let source = repo::find_details(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plan nutricional no encontrado"))?;

    let (plan, entries) = repo::copy(&state.db, &source, name, payload.customer_id).await?;
    info!(source_plan_id = %id, plan_id = %plan.id, "plan copied");

    Ok((
        StatusCode::CREATED,
        ok(PlanResponse::new(plan, Some(customer), entries)),
    ))
}
