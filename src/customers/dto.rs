use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::bmi::{self, ImcClassification};
use super::repo::{ActivityLevel, Customer, Gender, Goal};
use crate::error::ApiError;
use crate::plans::repo::NutritionalPlan;

/// Request body for creating or replacing a customer. The form always
/// submits the complete field set; omitted optional fields clear.
#[derive(Debug, Deserialize)]
pub struct CustomerPayload {
    pub id_card: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cell_phone: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub birth_date: Option<Date>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub body_fat_percentage: Option<f64>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default)]
    pub goal: Option<Goal>,
    #[serde(default)]
    pub daily_calorie_target: Option<i32>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub medical_conditions: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CustomerPayload {
    /// Trims every text field and rejects missing required ones.
    pub fn normalized(mut self) -> Result<Self, ApiError> {
        self.id_card = self.id_card.trim().to_string();
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();

        if self.id_card.is_empty() {
            return Err(ApiError::validation("La cédula es requerida"));
        }
        if self.first_name.is_empty() {
            return Err(ApiError::validation("El nombre es requerido"));
        }
        if self.last_name.is_empty() {
            return Err(ApiError::validation("El apellido es requerido"));
        }

        self.email = clean(self.email);
        self.cell_phone = clean(self.cell_phone);
        self.allergies = clean(self.allergies);
        self.medical_conditions = clean(self.medical_conditions);
        self.medications = clean(self.medications);
        self.dietary_restrictions = clean(self.dietary_restrictions);
        self.notes = clean(self.notes);
        Ok(self)
    }

    /// IMC derived from the submitted weight/height, when both exist.
    pub fn derived_imc(&self) -> Option<f64> {
        match (self.weight, self.height) {
            (Some(weight), Some(height)) => bmi::imc(weight, height),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerListItem {
    #[serde(flatten)]
    pub customer: Customer,
    pub imc_classification: ImcClassification,
    pub plan_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CustomerDetails {
    #[serde(flatten)]
    pub customer: Customer,
    pub imc_classification: ImcClassification,
    pub nutritional_plans: Vec<NutritionalPlan>,
}

impl CustomerDetails {
    pub fn new(customer: Customer, nutritional_plans: Vec<NutritionalPlan>) -> Self {
        let imc_classification = bmi::classify(customer.imc);
        Self {
            customer,
            imc_classification,
            nutritional_plans,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}
