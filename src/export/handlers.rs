use axum::extract::{Path, Query, State};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::document::{self, DocumentArtifact};
use super::sheet::{self, SheetArtifact};
use super::whatsapp::{self, ShareVariant, WhatsAppShare};
use super::ExportError;
use crate::auth::jwt::AuthUser;
use crate::error::{ok, ApiError, ApiResult};
use crate::plans::{grid, repo};
use crate::state::AppState;

async fn plan_details(state: &AppState, id: Uuid) -> Result<repo::PlanDetails, ApiError> {
    let details = repo::find_details(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plan nutricional no encontrado"))?;
    grid::warn_on_duplicates(details.plan.id, &details.entries);
    Ok(details)
}

#[instrument(skip(state))]
pub async fn export_spreadsheet(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<SheetArtifact> {
    let details = plan_details(&state, id).await?;
    let today = OffsetDateTime::now_utc().date();
    Ok(ok(sheet::build(&details.plan, &details.entries, today)))
}

#[instrument(skip(state))]
pub async fn export_document(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<DocumentArtifact> {
    let details = plan_details(&state, id).await?;
    let today = OffsetDateTime::now_utc().date();
    Ok(ok(document::build(
        &details.plan,
        &details.entries,
        details.customer.as_ref(),
        today,
    )))
}

#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    #[serde(default)]
    pub variant: ShareVariant,
}

#[instrument(skip(state))]
pub async fn share_whatsapp(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ShareQuery>,
) -> ApiResult<WhatsAppShare> {
    let details = plan_details(&state, id).await?;
    let share = whatsapp::build_share(
        query.variant,
        &details.plan,
        &details.entries,
        details.customer.as_ref(),
        &state.config.share.phone_country_code,
    )
    .map_err(|err| match err {
        ExportError::MissingPhone => {
            ApiError::validation("El cliente no tiene número de teléfono registrado")
        }
        other => ApiError::Internal(other.into()),
    })?;
    Ok(ok(share))
}
