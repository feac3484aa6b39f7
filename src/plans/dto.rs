use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::completion::Completion;
use super::repo::{MealEntry, NewMealEntry, NutritionalPlan, PlanFields, PlanStatus};
use crate::customers::repo::Customer;
use crate::error::ApiError;
use crate::schedule::{DayOfWeek, MealSlot, MealType};

/// Grid submission shape: day -> meal type -> cell. Unknown days or meal
/// types fail deserialization at the boundary, before any handler runs.
pub type MealsMap = HashMap<DayOfWeek, HashMap<MealType, MealInput>>;

/// A submitted cell: either the plain description string the form sends,
/// or an object carrying nutrition facts alongside it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MealInput {
    Text(String),
    Detailed {
        meal_description: String,
        #[serde(default)]
        calories: Option<i32>,
        #[serde(default)]
        protein_grams: Option<f64>,
        #[serde(default)]
        carbs_grams: Option<f64>,
        #[serde(default)]
        fat_grams: Option<f64>,
        #[serde(default)]
        fiber_grams: Option<f64>,
        #[serde(default)]
        portion_size: Option<String>,
        #[serde(default)]
        preparation_notes: Option<String>,
    },
}

impl MealInput {
    fn description(&self) -> &str {
        match self {
            MealInput::Text(d) => d,
            MealInput::Detailed {
                meal_description, ..
            } => meal_description,
        }
    }
}

/// Flattens the submitted map into entries, in fixed slot order.
pub fn meals_to_entries(meals: &MealsMap) -> Result<Vec<NewMealEntry>, ApiError> {
    let mut out = Vec::new();
    for slot in MealSlot::all() {
        let Some(input) = meals.get(&slot.day).and_then(|row| row.get(&slot.meal)) else {
            continue;
        };
        let description = input.description().trim();
        if description.is_empty() {
            return Err(ApiError::validation(format!(
                "Meal description cannot be empty for {} - {}",
                slot.day.label(),
                slot.meal.label()
            )));
        }
        let mut entry = NewMealEntry {
            day_of_week: slot.day,
            meal_type: slot.meal,
            meal_description: description.to_string(),
            calories: None,
            protein_grams: None,
            carbs_grams: None,
            fat_grams: None,
            fiber_grams: None,
            portion_size: None,
            preparation_notes: None,
        };
        if let MealInput::Detailed {
            calories,
            protein_grams,
            carbs_grams,
            fat_grams,
            fiber_grams,
            portion_size,
            preparation_notes,
            ..
        } = input
        {
            entry.calories = *calories;
            entry.protein_grams = *protein_grams;
            entry.carbs_grams = *carbs_grams;
            entry.fat_grams = *fat_grams;
            entry.fiber_grams = *fiber_grams;
            entry.portion_size = portion_size.clone();
            entry.preparation_notes = preparation_notes.clone();
        }
        out.push(entry);
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub customer_id: Uuid,
    #[serde(default)]
    pub status: Option<PlanStatus>,
    #[serde(default)]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub daily_calories: Option<i32>,
    #[serde(default)]
    pub protein_grams: Option<f64>,
    #[serde(default)]
    pub carbs_grams: Option<f64>,
    #[serde(default)]
    pub fat_grams: Option<f64>,
    #[serde(default)]
    pub fiber_grams: Option<f64>,
    #[serde(default)]
    pub water_liters: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub meals: Option<MealsMap>,
}

impl CreatePlanRequest {
    pub fn into_parts(self) -> Result<(PlanFields, Vec<NewMealEntry>), ApiError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::validation("El nombre del plan es requerido"));
        }
        let meals = match &self.meals {
            Some(map) => meals_to_entries(map)?,
            None => Vec::new(),
        };
        let fields = PlanFields {
            name,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            customer_id: Some(self.customer_id),
            status: self.status.unwrap_or(PlanStatus::Activo),
            start_date: self.start_date,
            end_date: self.end_date,
            daily_calories: self.daily_calories,
            protein_grams: self.protein_grams,
            carbs_grams: self.carbs_grams,
            fat_grams: self.fat_grams,
            fiber_grams: self.fiber_grams,
            water_liters: self.water_liters,
            notes: self
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        };
        Ok((fields, meals))
    }
}

/// Partial update: absent fields keep the stored value; `meals`, when
/// present, replaces the whole grid.
#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<PlanStatus>,
    #[serde(default)]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub daily_calories: Option<i32>,
    #[serde(default)]
    pub protein_grams: Option<f64>,
    #[serde(default)]
    pub carbs_grams: Option<f64>,
    #[serde(default)]
    pub fat_grams: Option<f64>,
    #[serde(default)]
    pub fiber_grams: Option<f64>,
    #[serde(default)]
    pub water_liters: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub meals: Option<MealsMap>,
}

impl UpdatePlanRequest {
    pub fn merged_fields(&self, existing: &NutritionalPlan) -> Result<PlanFields, ApiError> {
        let name = match &self.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ApiError::validation("Plan name cannot be empty"));
                }
                name
            }
            None => existing.name.clone(),
        };
        let description = match &self.description {
            Some(d) => Some(d.trim().to_string()).filter(|d| !d.is_empty()),
            None => existing.description.clone(),
        };
        let notes = match &self.notes {
            Some(n) => Some(n.trim().to_string()).filter(|n| !n.is_empty()),
            None => existing.notes.clone(),
        };
        Ok(PlanFields {
            name,
            description,
            customer_id: self.customer_id.or(existing.customer_id),
            status: self.status.unwrap_or(existing.status),
            start_date: self.start_date.or(existing.start_date),
            end_date: self.end_date.or(existing.end_date),
            daily_calories: self.daily_calories.or(existing.daily_calories),
            protein_grams: self.protein_grams.or(existing.protein_grams),
            carbs_grams: self.carbs_grams.or(existing.carbs_grams),
            fat_grams: self.fat_grams.or(existing.fat_grams),
            fiber_grams: self.fiber_grams.or(existing.fiber_grams),
            water_liters: self.water_liters.or(existing.water_liters),
            notes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CopyPlanRequest {
    pub customer_id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub cell_phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanListItem {
    #[serde(flatten)]
    pub plan: NutritionalPlan,
    pub customer: Option<CustomerSummary>,
    pub completion: Completion,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    #[serde(flatten)]
    pub plan: NutritionalPlan,
    pub customer: Option<Customer>,
    pub meal_entries: Vec<MealEntry>,
    pub completion: Completion,
}

impl PlanResponse {
    pub fn new(plan: NutritionalPlan, customer: Option<Customer>, meal_entries: Vec<MealEntry>) -> Self {
        let completion = Completion::of(&meal_entries);
        Self {
            plan,
            customer,
            meal_entries,
            completion,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}
