use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::customers::repo::Customer;
use crate::schedule::{DayOfWeek, MealSlot, MealType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "plan_status", rename_all = "UPPERCASE")]
pub enum PlanStatus {
    Borrador,
    Activo,
    Pausado,
    Completado,
    Cancelado,
}

impl PlanStatus {
    pub fn label(self) -> &'static str {
        match self {
            PlanStatus::Borrador => "Borrador",
            PlanStatus::Activo => "Activo",
            PlanStatus::Pausado => "Pausado",
            PlanStatus::Completado => "Completado",
            PlanStatus::Cancelado => "Cancelado",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NutritionalPlan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub customer_id: Option<Uuid>,
    pub status: PlanStatus,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub daily_calories: Option<i32>,
    pub protein_grams: Option<f64>,
    pub carbs_grams: Option<f64>,
    pub fat_grams: Option<f64>,
    pub fiber_grams: Option<f64>,
    pub water_liters: Option<f64>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One populated grid cell, with its optional nutrition facts carried
/// through untouched by the grid logic.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealEntry {
    pub id: Uuid,
    pub nutritional_plan_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub meal_type: MealType,
    pub meal_description: String,
    pub calories: Option<i32>,
    pub protein_grams: Option<f64>,
    pub carbs_grams: Option<f64>,
    pub fat_grams: Option<f64>,
    pub fiber_grams: Option<f64>,
    pub portion_size: Option<String>,
    pub preparation_notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl MealEntry {
    pub fn slot(&self) -> MealSlot {
        MealSlot::new(self.day_of_week, self.meal_type)
    }
}

/// A meal entry about to be written, before it has an id or plan.
#[derive(Debug, Clone)]
pub struct NewMealEntry {
    pub day_of_week: DayOfWeek,
    pub meal_type: MealType,
    pub meal_description: String,
    pub calories: Option<i32>,
    pub protein_grams: Option<f64>,
    pub carbs_grams: Option<f64>,
    pub fat_grams: Option<f64>,
    pub fiber_grams: Option<f64>,
    pub portion_size: Option<String>,
    pub preparation_notes: Option<String>,
}

/// Plan columns shared by create and update.
#[derive(Debug, Clone)]
pub struct PlanFields {
    pub name: String,
    pub description: Option<String>,
    pub customer_id: Option<Uuid>,
    pub status: PlanStatus,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub daily_calories: Option<i32>,
    pub protein_grams: Option<f64>,
    pub carbs_grams: Option<f64>,
    pub fat_grams: Option<f64>,
    pub fiber_grams: Option<f64>,
    pub water_liters: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct PlanListRow {
    #[sqlx(flatten)]
    pub plan: NutritionalPlan,
    pub meal_count: i64,
    pub customer_first_name: Option<String>,
    pub customer_last_name: Option<String>,
    pub customer_cell_phone: Option<String>,
}

const LIST_SELECT: &str = r#"
    SELECT p.*,
           (SELECT COUNT(*) FROM meal_entry e WHERE e.nutritional_plan_id = p.id) AS meal_count,
           c.first_name AS customer_first_name,
           c.last_name  AS customer_last_name,
           c.cell_phone AS customer_cell_phone
    FROM nutritional_plan p
    LEFT JOIN customer c ON c.id = p.customer_id
"#;

pub async fn list(db: &PgPool, customer_id: Option<Uuid>) -> Result<Vec<PlanListRow>, sqlx::Error> {
    let rows = match customer_id {
        Some(cid) => {
            let sql = format!("{LIST_SELECT} WHERE p.customer_id = $1 ORDER BY p.created_at DESC");
            sqlx::query_as::<_, PlanListRow>(&sql)
                .bind(cid)
                .fetch_all(db)
                .await?
        }
        None => {
            let sql = format!("{LIST_SELECT} ORDER BY p.created_at DESC");
            sqlx::query_as::<_, PlanListRow>(&sql).fetch_all(db).await?
        }
    };
    Ok(rows)
}

/// Bare plan rows for one customer (customer detail page).
pub async fn list_by_customer(db: &PgPool, customer_id: Uuid) -> Result<Vec<NutritionalPlan>, sqlx::Error> {
    let rows = sqlx::query_as::<_, NutritionalPlan>(
        r#"
        SELECT * FROM nutritional_plan
        WHERE customer_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(customer_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<NutritionalPlan>, sqlx::Error> {
    let plan = sqlx::query_as::<_, NutritionalPlan>(r#"SELECT * FROM nutritional_plan WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(plan)
}

pub async fn entries(db: &PgPool, plan_id: Uuid) -> Result<Vec<MealEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MealEntry>(
        r#"
        SELECT * FROM meal_entry
        WHERE nutritional_plan_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(plan_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub struct PlanDetails {
    pub plan: NutritionalPlan,
    pub customer: Option<Customer>,
    pub entries: Vec<MealEntry>,
}

pub async fn find_details(db: &PgPool, id: Uuid) -> Result<Option<PlanDetails>, sqlx::Error> {
    let Some(plan) = find(db, id).await? else {
        return Ok(None);
    };
    let customer = match plan.customer_id {
        Some(cid) => crate::customers::repo::find(db, cid).await?,
        None => None,
    };
    let entries = entries(db, id).await?;
    Ok(Some(PlanDetails {
        plan,
        customer,
        entries,
    }))
}

async fn insert_entry_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
    meal: &NewMealEntry,
) -> Result<MealEntry, sqlx::Error> {
    let entry = sqlx::query_as::<_, MealEntry>(
        r#"
        INSERT INTO meal_entry (
            nutritional_plan_id, day_of_week, meal_type, meal_description,
            calories, protein_grams, carbs_grams, fat_grams, fiber_grams,
            portion_size, preparation_notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(plan_id)
    .bind(meal.day_of_week)
    .bind(meal.meal_type)
    .bind(&meal.meal_description)
    .bind(meal.calories)
    .bind(meal.protein_grams)
    .bind(meal.carbs_grams)
    .bind(meal.fat_grams)
    .bind(meal.fiber_grams)
    .bind(&meal.portion_size)
    .bind(&meal.preparation_notes)
    .fetch_one(&mut **tx)
    .await?;
    Ok(entry)
}

async fn insert_plan_tx(
    tx: &mut Transaction<'_, Postgres>,
    fields: &PlanFields,
) -> Result<NutritionalPlan, sqlx::Error> {
    let plan = sqlx::query_as::<_, NutritionalPlan>(
        r#"
        INSERT INTO nutritional_plan (
            name, description, customer_id, status, start_date, end_date,
            daily_calories, protein_grams, carbs_grams, fat_grams, fiber_grams,
            water_liters, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.customer_id)
    .bind(fields.status)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.daily_calories)
    .bind(fields.protein_grams)
    .bind(fields.carbs_grams)
    .bind(fields.fat_grams)
    .bind(fields.fiber_grams)
    .bind(fields.water_liters)
    .bind(&fields.notes)
    .fetch_one(&mut **tx)
    .await?;
    Ok(plan)
}

pub async fn create(
    db: &PgPool,
    fields: &PlanFields,
    meals: &[NewMealEntry],
) -> Result<(NutritionalPlan, Vec<MealEntry>), sqlx::Error> {
    let mut tx = db.begin().await?;
    let plan = insert_plan_tx(&mut tx, fields).await?;
    let mut inserted = Vec::with_capacity(meals.len());
    for meal in meals {
        inserted.push(insert_entry_tx(&mut tx, plan.id, meal).await?);
    }
    tx.commit().await?;
    Ok((plan, inserted))
}

/// Updates the plan row; when `meals` is provided the whole entry set is
/// replaced (delete then insert), matching the edit form's submit shape.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    fields: &PlanFields,
    meals: Option<&[NewMealEntry]>,
) -> Result<Option<(NutritionalPlan, Vec<MealEntry>)>, sqlx::Error> {
    let mut tx = db.begin().await?;
    let plan = sqlx::query_as::<_, NutritionalPlan>(
        r#"
        UPDATE nutritional_plan SET
            name = $2, description = $3, customer_id = $4, status = $5,
            start_date = $6, end_date = $7, daily_calories = $8, protein_grams = $9,
            carbs_grams = $10, fat_grams = $11, fiber_grams = $12, water_liters = $13,
            notes = $14, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.customer_id)
    .bind(fields.status)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.daily_calories)
    .bind(fields.protein_grams)
    .bind(fields.carbs_grams)
    .bind(fields.fat_grams)
    .bind(fields.fiber_grams)
    .bind(fields.water_liters)
    .bind(&fields.notes)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(plan) = plan else {
        tx.rollback().await?;
        return Ok(None);
    };

    let inserted = match meals {
        Some(meals) => {
            sqlx::query(r#"DELETE FROM meal_entry WHERE nutritional_plan_id = $1"#)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let mut inserted = Vec::with_capacity(meals.len());
            for meal in meals {
                inserted.push(insert_entry_tx(&mut tx, plan.id, meal).await?);
            }
            inserted
        }
        None => Vec::new(),
    };
    tx.commit().await?;

    let entries = match meals {
        Some(_) => inserted,
        None => entries(db, id).await?,
    };
    Ok(Some((plan, entries)))
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    // Meal entries go with the plan (FK cascade).
    let result = sqlx::query(r#"DELETE FROM nutritional_plan WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Clones a plan (fields and every meal entry) onto a new plan for the
/// given customer. The copy starts out ACTIVO regardless of the source.
pub async fn copy(
    db: &PgPool,
    source: &PlanDetails,
    name: &str,
    customer_id: Uuid,
) -> Result<(NutritionalPlan, Vec<MealEntry>), sqlx::Error> {
    let fields = PlanFields {
        name: name.to_string(),
        description: source.plan.description.clone(),
        customer_id: Some(customer_id),
        status: PlanStatus::Activo,
        start_date: source.plan.start_date,
        end_date: source.plan.end_date,
        daily_calories: source.plan.daily_calories,
        protein_grams: source.plan.protein_grams,
        carbs_grams: source.plan.carbs_grams,
        fat_grams: source.plan.fat_grams,
        fiber_grams: source.plan.fiber_grams,
        water_liters: source.plan.water_liters,
        notes: source.plan.notes.clone(),
    };
    let meals: Vec<NewMealEntry> = source
        .entries
        .iter()
        .map(|e| NewMealEntry {
            day_of_week: e.day_of_week,
            meal_type: e.meal_type,
            meal_description: e.meal_description.clone(),
            calories: e.calories,
            protein_grams: e.protein_grams,
            carbs_grams: e.carbs_grams,
            fat_grams: e.fat_grams,
            fiber_grams: e.fiber_grams,
            portion_size: e.portion_size.clone(),
            preparation_notes: e.preparation_notes.clone(),
        })
        .collect();
    create(db, &fields, &meals).await
}
