use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::{info, instrument};

use super::document::{self, DocumentArtifact};
use super::filename::dated_filename;
use super::image::DownloadSink;
use super::ExportError;
use crate::customers::repo::Customer;
use crate::plans::grid::resolve;
use crate::plans::repo::{MealEntry, NutritionalPlan};
use crate::schedule::{DayOfWeek, MealSlot, MealType};

/// Normalizes a stored phone number into the digits-only E.164 form the
/// wa.me link expects: strip everything non-numeric, drop a local trunk
/// `0` prefix, and make sure the country code is present exactly once.
pub fn normalize_phone(raw: &str, country_code: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let normalized = if let Some(rest) = digits.strip_prefix('0') {
        format!("{country_code}{rest}")
    } else if digits.starts_with(country_code) {
        digits
    } else {
        format!("{country_code}{digits}")
    };
    Some(normalized)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareVariant {
    /// Full day-by-day meal listing inside the message.
    #[default]
    Listing,
    /// Short cordial message referencing the downloaded PDF.
    Attachment,
}

fn greeting_name(customer: Option<&Customer>) -> &str {
    customer
        .map(|c| c.first_name.as_str())
        .unwrap_or("estimado/a cliente")
}

/// Message with the whole week written out: one `*DAY*` header per day
/// that has meals, then a bullet per planned slot. Empty days are
/// omitted entirely.
pub fn listing_message(
    plan: &NutritionalPlan,
    meals: &[MealEntry],
    customer: Option<&Customer>,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("¡Hola {}! 👋", greeting_name(customer)));
    lines.push(String::new());
    lines.push(format!(
        "Te comparto tu plan nutricional *\"{}\"*:",
        plan.name
    ));
    lines.push(String::new());
    if let Some(description) = &plan.description {
        lines.push(format!("📝 {description}"));
        lines.push(String::new());
    }

    for day in DayOfWeek::ALL {
        let planned: Vec<(MealType, &str)> = MealType::ALL
            .into_iter()
            .filter_map(|meal| {
                let description = resolve(meals, MealSlot::new(day, meal));
                (!description.is_empty()).then_some((meal, description))
            })
            .collect();
        if planned.is_empty() {
            continue;
        }
        lines.push(format!("*{}*", day.label().to_uppercase()));
        for (meal, description) in planned {
            lines.push(format!("• {}: {}", meal.label(), description));
        }
        lines.push(String::new());
    }

    lines.push("Si tienes alguna duda o necesitas ajustes en el plan, no dudes en escribirme. 💪".to_string());
    lines.push(String::new());
    lines.push("¡Mucho éxito con tu alimentación! 🥗🌿".to_string());

    lines.join("\n")
}

/// Short cordial message for the share-with-PDF flow; the meal detail
/// travels in the attached document instead of the message body.
pub fn attachment_message(plan: &NutritionalPlan, customer: Option<&Customer>) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("¡Hola {}! 👋", greeting_name(customer)));
    lines.push(String::new());
    lines.push("Espero que te encuentres muy bien. 🌟".to_string());
    lines.push(String::new());
    lines.push(format!(
        "Te envío tu plan nutricional *\"{}\"* en formato PDF para que puedas consultarlo fácilmente.",
        plan.name
    ));
    lines.push(String::new());
    lines.push(
        "📎 *El archivo PDF ha sido descargado en tu dispositivo.* Por favor, adjúntalo a esta conversación para compartirlo."
            .to_string(),
    );
    lines.push(String::new());
    if let Some(description) = &plan.description {
        lines.push(format!("📝 {description}"));
        lines.push(String::new());
    }
    lines.push(
        "Si tienes alguna duda o necesitas ajustes en el plan, no dudes en escribirme. Estoy aquí para ayudarte a alcanzar tus objetivos. 💪"
            .to_string(),
    );
    lines.push(String::new());
    lines.push("¡Mucho éxito con tu alimentación! 🥗🌿".to_string());
    lines.push(String::new());
    lines.push("_— Tu nutricionista de confianza_".to_string());

    lines.join("\n")
}

pub fn share_link(phone: &str, message: &str) -> String {
    format!("https://wa.me/{}?text={}", phone, urlencoding::encode(message))
}

#[derive(Debug, Clone, Serialize)]
pub struct WhatsAppShare {
    pub phone: String,
    pub url: String,
    pub message: String,
    /// Filename of the document downloaded alongside, when the flow
    /// generated one.
    pub attachment: Option<String>,
}

/// Builds the deep link for one of the message variants. Fails before
/// doing anything when the customer has no phone number.
pub fn build_share(
    variant: ShareVariant,
    plan: &NutritionalPlan,
    meals: &[MealEntry],
    customer: Option<&Customer>,
    country_code: &str,
) -> Result<WhatsAppShare, ExportError> {
    let phone = customer
        .and_then(|c| c.cell_phone.as_deref())
        .and_then(|raw| normalize_phone(raw, country_code))
        .ok_or(ExportError::MissingPhone)?;

    let message = match variant {
        ShareVariant::Listing => listing_message(plan, meals, customer),
        ShareVariant::Attachment => attachment_message(plan, customer),
    };
    let url = share_link(&phone, &message);
    Ok(WhatsAppShare {
        phone,
        url,
        message,
        attachment: None,
    })
}

/// Renders a document artifact into a downloadable blob (PDF bytes).
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, artifact: &DocumentArtifact) -> anyhow::Result<Bytes>;
}

/// The two-step share flow: generate and download the plan document,
/// then open the WhatsApp link with the attachment message. The phone
/// check runs first so a missing number performs no side effect at all.
#[instrument(skip_all, fields(plan_id = %plan.id))]
pub async fn share_with_document(
    renderer: &dyn DocumentRenderer,
    sink: &dyn DownloadSink,
    plan: &NutritionalPlan,
    meals: &[MealEntry],
    customer: Option<&Customer>,
    country_code: &str,
    today: Date,
) -> Result<WhatsAppShare, ExportError> {
    let phone = customer
        .and_then(|c| c.cell_phone.as_deref())
        .and_then(|raw| normalize_phone(raw, country_code))
        .ok_or(ExportError::MissingPhone)?;

    let artifact = document::build(plan, meals, customer, today);
    let blob = renderer
        .render(&artifact)
        .await
        .map_err(ExportError::Render)?;

    let filename = dated_filename(&plan.name, today, "pdf");
    sink.save(&filename, "application/pdf", blob)
        .await
        .map_err(ExportError::Download)?;

    let message = attachment_message(plan, customer);
    let url = share_link(&phone, &message);
    info!(%filename, "plan shared with document");
    Ok(WhatsAppShare {
        phone,
        url,
        message,
        attachment: Some(filename),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::grid::tests::entry;
    use crate::plans::repo::PlanStatus;
    use std::sync::Mutex;
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn plan(description: Option<&str>) -> NutritionalPlan {
        NutritionalPlan {
            id: Uuid::new_v4(),
            name: "Plan de Prueba".into(),
            description: description.map(Into::into),
            customer_id: None,
            status: PlanStatus::Activo,
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

    fn customer(phone: Option<&str>) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            id_card: "0912345678".into(),
            first_name: "Juan".into(),
            last_name: "Pérez".into(),
            email: None,
            cell_phone: phone.map(Into::into),
            gender: None,
            birth_date: None,
            weight: None,
            height: None,
            imc: None,
            body_fat_percentage: None,
            activity_level: None,
            goal: None,
            daily_calorie_target: None,
            allergies: None,
            medical_conditions: None,
            medications: None,
            dietary_restrictions: None,
            notes: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn phone_normalization_handles_the_three_shapes() {
        assert_eq!(
            normalize_phone("0991234567", "593").as_deref(),
            Some("593991234567")
        );
        assert_eq!(
            normalize_phone("593991234567", "593").as_deref(),
            Some("593991234567")
        );
        assert_eq!(
            normalize_phone("991234567", "593").as_deref(),
            Some("593991234567")
        );
    }

    #[test]
    fn phone_normalization_strips_formatting_first() {
        assert_eq!(
            normalize_phone("+593 99-123-4567", "593").as_deref(),
            Some("593991234567")
        );
        assert_eq!(normalize_phone("sin teléfono", "593"), None);
    }

    #[test]
    fn listing_message_writes_days_with_meals_only() {
        let meals = vec![
            entry(DayOfWeek::Lunes, MealType::Desayuno, "Huevos con tostadas"),
            entry(DayOfWeek::Lunes, MealType::Cena, "Sopa"),
            entry(DayOfWeek::Miercoles, MealType::Almuerzo, "Pollo"),
        ];
        let c = customer(Some("0991234567"));
        let message = listing_message(&plan(None), &meals, Some(&c));

        assert!(message.starts_with("¡Hola Juan! 👋"));
        assert!(message.contains("*\"Plan de Prueba\"*"));
        assert!(message.contains("*LUNES*\n• Desayuno: Huevos con tostadas\n• Cena: Sopa"));
        assert!(message.contains("*MIÉRCOLES*\n• Almuerzo: Pollo"));
        assert!(!message.contains("*MARTES*"));
        assert!(!message.contains("*DOMINGO*"));
    }

    #[test]
    fn listing_message_falls_back_to_a_generic_greeting() {
        let message = listing_message(&plan(Some("Bajo en sal")), &[], None);
        assert!(message.starts_with("¡Hola estimado/a cliente! 👋"));
        assert!(message.contains("📝 Bajo en sal"));
    }

    #[test]
    fn attachment_message_references_the_pdf_not_the_meals() {
        let c = customer(Some("0991234567"));
        let message = attachment_message(&plan(Some("Plan progresivo")), Some(&c));
        assert!(message.contains("en formato PDF"));
        assert!(message.contains("El archivo PDF ha sido descargado"));
        assert!(message.contains("📝 Plan progresivo"));
        assert!(!message.contains("*LUNES*"));
    }

    #[test]
    fn share_link_is_url_encoded() {
        let url = share_link("593991234567", "¡Hola Juan! 👋");
        assert!(url.starts_with("https://wa.me/593991234567?text="));
        assert!(!url.contains(' '));
        assert!(url.contains("%20"));
    }

    #[test]
    fn build_share_requires_a_phone_number() {
        let p = plan(None);
        let no_phone = customer(None);
        assert!(matches!(
            build_share(ShareVariant::Listing, &p, &[], Some(&no_phone), "593"),
            Err(ExportError::MissingPhone)
        ));
        assert!(matches!(
            build_share(ShareVariant::Listing, &p, &[], None, "593"),
            Err(ExportError::MissingPhone)
        ));

        let with_phone = customer(Some("0991234567"));
        let share = build_share(ShareVariant::Attachment, &p, &[], Some(&with_phone), "593")
            .expect("share should build");
        assert_eq!(share.phone, "593991234567");
        assert!(share.url.starts_with("https://wa.me/593991234567?text="));
        assert_eq!(share.attachment, None);
    }

    struct FakeRenderer {
        fail: bool,
        rendered: Mutex<usize>,
    }

    #[async_trait]
    impl DocumentRenderer for FakeRenderer {
        async fn render(&self, _artifact: &DocumentArtifact) -> anyhow::Result<Bytes> {
            *self.rendered.lock().expect("lock") += 1;
            if self.fail {
                anyhow::bail!("renderer crashed");
            }
            Ok(Bytes::from_static(b"%PDF-1.7"))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DownloadSink for RecordingSink {
        async fn save(&self, filename: &str, _content_type: &str, _body: Bytes) -> anyhow::Result<()> {
            self.saved.lock().expect("lock").push(filename.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn share_with_document_downloads_then_links() {
        let renderer = FakeRenderer {
            fail: false,
            rendered: Mutex::new(0),
        };
        let sink = RecordingSink::default();
        let c = customer(Some("0991234567"));

        let share = share_with_document(
            &renderer,
            &sink,
            &plan(None),
            &[],
            Some(&c),
            "593",
            date!(2025 - 01 - 15),
        )
        .await
        .expect("share should succeed");

        assert_eq!(
            share.attachment.as_deref(),
            Some("Plan_de_Prueba_2025-01-15.pdf")
        );
        assert_eq!(
            sink.saved.lock().expect("lock").as_slice(),
            ["Plan_de_Prueba_2025-01-15.pdf"]
        );
        assert!(share.message.contains("en formato PDF"));
    }

    #[tokio::test]
    async fn missing_phone_short_circuits_before_rendering() {
        let renderer = FakeRenderer {
            fail: false,
            rendered: Mutex::new(0),
        };
        let sink = RecordingSink::default();

        let err = share_with_document(
            &renderer,
            &sink,
            &plan(None),
            &[],
            Some(&customer(None)),
            "593",
            date!(2025 - 01 - 15),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ExportError::MissingPhone));
        assert_eq!(*renderer.rendered.lock().expect("lock"), 0);
        assert!(sink.saved.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn renderer_failure_saves_nothing() {
        let renderer = FakeRenderer {
            fail: true,
            rendered: Mutex::new(0),
        };
        let sink = RecordingSink::default();
        let c = customer(Some("0991234567"));

        let err = share_with_document(
            &renderer,
            &sink,
            &plan(None),
            &[],
            Some(&c),
            "593",
            date!(2025 - 01 - 15),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ExportError::Render(_)));
        assert!(sink.saved.lock().expect("lock").is_empty());
    }
}
