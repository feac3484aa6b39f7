pub mod document;
pub mod filename;
pub mod handlers;
pub mod image;
pub mod sheet;
pub mod whatsapp;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Failures of the export pipeline. Each export is one isolated user
/// action; an error here never touches plan state and is reported once.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("render target `{0}` not found")]
    TargetNotFound(String),

    #[error("rasterization failed")]
    Rasterize(#[source] anyhow::Error),

    #[error("document rendering failed")]
    Render(#[source] anyhow::Error),

    #[error("download failed")]
    Download(#[source] anyhow::Error),

    #[error("customer has no phone number")]
    MissingPhone,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/plans/:id/export/spreadsheet",
            get(handlers::export_spreadsheet),
        )
        .route("/plans/:id/export/document", get(handlers::export_document))
        .route("/plans/:id/share/whatsapp", get(handlers::share_whatsapp))
}
