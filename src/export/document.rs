use serde::Serialize;
use time::Date;

use super::filename::document_filename;
use crate::customers::bmi;
use crate::customers::repo::Customer;
use crate::plans::grid::resolve;
use crate::plans::repo::{MealEntry, NutritionalPlan};
use crate::schedule::{DayOfWeek, MealSlot, MealType};

const DAY_COLUMN_WIDTH: u16 = 25;
const MEAL_COLUMN_WIDTH: u16 = 48;

/// One layout instruction for the document-rendering collaborator.
/// Blocks are rendered top to bottom in sequence order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocBlock {
    Title { text: String },
    Subtitle { text: String },
    Paragraph { text: String },
    Heading { text: String },
    KeyValueTable { title: String, rows: Vec<[String; 2]> },
    GridTable {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        column_widths: Vec<u16>,
    },
    Footer { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentArtifact {
    pub orientation: &'static str,
    pub filename: String,
    pub blocks: Vec<DocBlock>,
}

fn es_date(date: Date) -> String {
    format!("{}/{}/{}", date.day(), u8::from(date.month()), date.year())
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

fn customer_blocks(customer: &Customer, today: Date) -> Vec<DocBlock> {
    let mut blocks = vec![DocBlock::Heading {
        text: "Información del Cliente".to_string(),
    }];

    let personal = vec![
        ["Nombre completo".to_string(), customer.full_name()],
        ["Cédula".to_string(), customer.id_card.clone()],
        ["Email".to_string(), or_dash(customer.email.clone())],
        ["Teléfono".to_string(), or_dash(customer.cell_phone.clone())],
        [
            "Género".to_string(),
            customer
                .gender
                .map(|g| g.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ],
        [
            "Edad".to_string(),
            or_dash(customer.age_on(today).map(|age| format!("{age} años"))),
        ],
    ];
    blocks.push(DocBlock::KeyValueTable {
        title: "Datos Personales".to_string(),
        rows: personal,
    });

    let imc_text = customer
        .imc
        .map(|value| format!("{} ({})", value, bmi::classify(Some(value)).label));
    let physical = vec![
        [
            "Peso".to_string(),
            or_dash(customer.weight.map(|w| format!("{w} kg"))),
        ],
        [
            "Altura".to_string(),
            or_dash(customer.height.map(|h| format!("{h} m"))),
        ],
        ["IMC".to_string(), or_dash(imc_text)],
        [
            "% Grasa corporal".to_string(),
            or_dash(customer.body_fat_percentage.map(|p| format!("{p}%"))),
        ],
        [
            "Nivel de actividad".to_string(),
            customer
                .activity_level
                .map(|a| a.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ],
        [
            "Objetivo".to_string(),
            customer
                .goal
                .map(|g| g.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ],
    ];
    blocks.push(DocBlock::KeyValueTable {
        title: "Datos Físicos".to_string(),
        rows: physical,
    });

    let medical: Vec<[String; 2]> = [
        ("Alergias", &customer.allergies),
        ("Restricciones dietéticas", &customer.dietary_restrictions),
        ("Condiciones médicas", &customer.medical_conditions),
        ("Medicamentos", &customer.medications),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value
            .as_ref()
            .map(|v| [label.to_string(), v.clone()])
    })
    .collect();

    if !medical.is_empty() {
        blocks.push(DocBlock::Heading {
            text: "Información Médica".to_string(),
        });
        blocks.push(DocBlock::KeyValueTable {
            title: "Información Médica".to_string(),
            rows: medical,
        });
    }

    blocks
}

fn targets_line(plan: &NutritionalPlan) -> Option<String> {
    let mut targets = Vec::new();
    if let Some(calories) = plan.daily_calories {
        targets.push(format!("Calorías: {calories} kcal"));
    }
    if let Some(protein) = plan.protein_grams {
        targets.push(format!("Proteínas: {protein}g"));
    }
    if let Some(carbs) = plan.carbs_grams {
        targets.push(format!("Carbohidratos: {carbs}g"));
    }
    if let Some(fat) = plan.fat_grams {
        targets.push(format!("Grasas: {fat}g"));
    }
    if let Some(fiber) = plan.fiber_grams {
        targets.push(format!("Fibra: {fiber}g"));
    }
    if let Some(water) = plan.water_liters {
        targets.push(format!("Agua: {water}L"));
    }
    if targets.is_empty() {
        None
    } else {
        Some(format!("Objetivos: {}", targets.join("  |  ")))
    }
}

fn weekly_table(meals: &[MealEntry]) -> DocBlock {
    let mut header = Vec::with_capacity(1 + MealType::ALL.len());
    header.push("Día".to_string());
    header.extend(MealType::ALL.iter().map(|m| m.label().to_string()));

    let rows = DayOfWeek::ALL
        .into_iter()
        .map(|day| {
            let mut row = Vec::with_capacity(1 + MealType::ALL.len());
            row.push(day.label().to_string());
            for meal in MealType::ALL {
                let description = resolve(meals, MealSlot::new(day, meal));
                row.push(if description.is_empty() {
                    "-".to_string()
                } else {
                    description.to_string()
                });
            }
            row
        })
        .collect();

    let mut column_widths = vec![DAY_COLUMN_WIDTH];
    column_widths.extend(std::iter::repeat(MEAL_COLUMN_WIDTH).take(MealType::ALL.len()));

    DocBlock::GridTable {
        header,
        rows,
        column_widths,
    }
}

pub fn build(
    plan: &NutritionalPlan,
    meals: &[MealEntry],
    customer: Option<&Customer>,
    today: Date,
) -> DocumentArtifact {
    let mut blocks = vec![
        DocBlock::Title {
            text: "Plan Nutricional".to_string(),
        },
        DocBlock::Subtitle {
            text: plan.name.clone(),
        },
    ];
    if let Some(description) = &plan.description {
        blocks.push(DocBlock::Paragraph {
            text: description.clone(),
        });
    }

    if let Some(customer) = customer {
        blocks.extend(customer_blocks(customer, today));
    }

    let mut plan_info = vec![format!("Estado: {}", plan.status.label())];
    if let Some(start) = plan.start_date {
        plan_info.push(format!("Inicio: {}", es_date(start)));
    }
    if let Some(end) = plan.end_date {
        plan_info.push(format!("Fin: {}", es_date(end)));
    }
    blocks.push(DocBlock::Paragraph {
        text: plan_info.join("  |  "),
    });

    if let Some(targets) = targets_line(plan) {
        blocks.push(DocBlock::Paragraph { text: targets });
    }

    blocks.push(DocBlock::Heading {
        text: "Plan Semanal".to_string(),
    });
    blocks.push(weekly_table(meals));

    if let Some(notes) = &plan.notes {
        blocks.push(DocBlock::Heading {
            text: "Notas del Plan:".to_string(),
        });
        blocks.push(DocBlock::Paragraph {
            text: notes.clone(),
        });
    }

    blocks.push(DocBlock::Footer {
        text: format!("Generado el {}", es_date(today)),
    });

    DocumentArtifact {
        orientation: "landscape",
        filename: document_filename(
            &plan.name,
            customer.map(|c| (c.first_name.as_str(), c.last_name.as_str())),
            today,
        ),
        blocks,
    }
}
