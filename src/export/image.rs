use async_trait::async_trait;
use bytes::Bytes;
use time::Date;
use tracing::{info, instrument};

use super::filename::dated_filename;
use super::ExportError;
use crate::config::ExportConfig;
use crate::plans::repo::NutritionalPlan;

/// Options handed to the rasterization collaborator. Defaults mirror the
/// grid export: white background, 2× scale for crisp output.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    pub background: &'static str,
    pub scale: f32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            background: "#ffffff",
            scale: 2.0,
        }
    }
}

/// Turns a rendered region (looked up by element id) into an image blob.
/// Implementations signal a missing target with `TargetNotFound` so the
/// caller can report it distinctly from a rendering failure.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, target_id: &str, opts: &RasterOptions) -> Result<Bytes, ExportError>;
}

/// Receives a finished artifact and hands it to the user as a download.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn save(&self, filename: &str, content_type: &str, body: Bytes) -> anyhow::Result<()>;
}

/// Exports the on-screen grid as a PNG: rasterize the configured target
/// region, then push the blob through the sink. One async hop, no
/// retries; on failure nothing is saved.
#[instrument(skip(rasterizer, sink, plan, config), fields(plan_id = %plan.id))]
pub async fn export_grid_image(
    rasterizer: &dyn Rasterizer,
    sink: &dyn DownloadSink,
    plan: &NutritionalPlan,
    config: &ExportConfig,
    today: Date,
) -> Result<String, ExportError> {
    let blob = rasterizer
        .rasterize(&config.grid_target_id, &RasterOptions::default())
        .await?;

    let filename = dated_filename(&plan.name, today, "png");
    sink.save(&filename, "image/png", blob)
        .await
        .map_err(ExportError::Download)?;

    info!(%filename, "grid image exported");
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn plan() -> NutritionalPlan {
        NutritionalPlan {
            id: Uuid::new_v4(),
            name: "Plan de Prueba".into(),
            description: None,
            customer_id: None,
            status: crate::plans::repo::PlanStatus::Activo,
            start_date: None,
            end_date: None,
            daily_calories: None,
            protein_grams: None,
            carbs_grams: None,
            fat_grams: None,
            fiber_grams: None,
            water_liters: None,
            notes: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn config(target: &str) -> ExportConfig {
        ExportConfig {
            grid_target_id: target.to_string(),
        }
    }

    struct FakeRasterizer {
        known_target: &'static str,
        fail: bool,
        seen_opts: Mutex<Option<RasterOptions>>,
    }

    #[async_trait]
    impl Rasterizer for FakeRasterizer {
        async fn rasterize(
            &self,
            target_id: &str,
            opts: &RasterOptions,
        ) -> Result<Bytes, ExportError> {
            *self.seen_opts.lock().expect("lock") = Some(opts.clone());
            if target_id != self.known_target {
                return Err(ExportError::TargetNotFound(target_id.to_string()));
            }
            if self.fail {
                return Err(ExportError::Rasterize(anyhow::anyhow!("canvas tainted")));
            }
            Ok(Bytes::from_static(b"\x89PNG"))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl DownloadSink for RecordingSink {
        async fn save(&self, filename: &str, content_type: &str, _body: Bytes) -> anyhow::Result<()> {
            self.saved
                .lock()
                .expect("lock")
                .push((filename.to_string(), content_type.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn exports_the_grid_under_the_dated_png_name() {
        let rasterizer = FakeRasterizer {
            known_target: "plan-grid-container",
            fail: false,
            seen_opts: Mutex::new(None),
        };
        let sink = RecordingSink::default();

        let filename = export_grid_image(
            &rasterizer,
            &sink,
            &plan(),
            &config("plan-grid-container"),
            date!(2025 - 01 - 15),
        )
        .await
        .expect("export should succeed");

        assert_eq!(filename, "Plan_de_Prueba_2025-01-15.png");
        let saved = sink.saved.lock().expect("lock");
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0], (filename, "image/png".to_string()));

        let opts = rasterizer.seen_opts.lock().expect("lock").clone().expect("opts");
        assert_eq!(opts.background, "#ffffff");
        assert_eq!(opts.scale, 2.0);
    }

    #[tokio::test]
    async fn missing_target_aborts_without_saving() {
        let rasterizer = FakeRasterizer {
            known_target: "plan-grid-container",
            fail: false,
            seen_opts: Mutex::new(None),
        };
        let sink = RecordingSink::default();

        let err = export_grid_image(
            &rasterizer,
            &sink,
            &plan(),
            &config("missing-id"),
            date!(2025 - 01 - 15),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ExportError::TargetNotFound(id) if id == "missing-id"));
        assert!(sink.saved.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn rasterizer_failure_saves_no_partial_file() {
        let rasterizer = FakeRasterizer {
            known_target: "plan-grid-container",
            fail: true,
            seen_opts: Mutex::new(None),
        };
        let sink = RecordingSink::default();

        let err = export_grid_image(
            &rasterizer,
            &sink,
            &plan(),
            &config("plan-grid-container"),
            date!(2025 - 01 - 15),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ExportError::Rasterize(_)));
        assert!(sink.saved.lock().expect("lock").is_empty());
    }
}
