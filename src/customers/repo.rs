use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::dto::CustomerPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "gender", rename_all = "UPPERCASE")]
pub enum Gender {
    Masculino,
    Femenino,
    Otro,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Masculino => "Masculino",
            Gender::Femenino => "Femenino",
            Gender::Otro => "Otro",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "activity_level", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityLevel {
    Sedentario,
    Ligero,
    Moderado,
    Activo,
    MuyActivo,
}

impl ActivityLevel {
    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentario => "Sedentario",
            ActivityLevel::Ligero => "Ligero (1-3 días/sem)",
            ActivityLevel::Moderado => "Moderado (3-5 días/sem)",
            ActivityLevel::Activo => "Activo (6-7 días/sem)",
            ActivityLevel::MuyActivo => "Muy activo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "goal", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Goal {
    PerderPeso,
    MantenerPeso,
    GanarPeso,
    GanarMusculo,
    MejorarSalud,
}

impl Goal {
    pub fn label(self) -> &'static str {
        match self {
            Goal::PerderPeso => "Perder peso",
            Goal::MantenerPeso => "Mantener peso",
            Goal::GanarPeso => "Ganar peso",
            Goal::GanarMusculo => "Ganar músculo",
            Goal::MejorarSalud => "Mejorar salud",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub id_card: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub cell_phone: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<Date>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub imc: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<Goal>,
    pub daily_calorie_target: Option<i32>,
    pub allergies: Option<String>,
    pub medical_conditions: Option<String>,
    pub medications: Option<String>,
    pub dietary_restrictions: Option<String>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn age_on(&self, today: Date) -> Option<i32> {
        let birth = self.birth_date?;
        let mut age = today.year() - birth.year();
        if (u8::from(today.month()), today.day()) < (u8::from(birth.month()), birth.day()) {
            age -= 1;
        }
        Some(age)
    }
}

#[derive(Debug, FromRow)]
pub struct CustomerWithPlanCount {
    #[sqlx(flatten)]
    pub customer: Customer,
    pub plan_count: i64,
}

pub async fn list(db: &PgPool) -> Result<Vec<CustomerWithPlanCount>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CustomerWithPlanCount>(
        r#"
        SELECT c.*,
               (SELECT COUNT(*) FROM nutritional_plan p WHERE p.customer_id = c.id) AS plan_count
        FROM customer c
        ORDER BY c.created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Customer>, sqlx::Error> {
    let customer = sqlx::query_as::<_, Customer>(r#"SELECT * FROM customer WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(customer)
}

/// Id of the customer holding this id_card, for the uniqueness check.
pub async fn find_id_by_id_card(db: &PgPool, id_card: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> =
        sqlx::query_as(r#"SELECT id FROM customer WHERE id_card = $1"#)
            .bind(id_card)
            .fetch_optional(db)
            .await?;
    Ok(row.map(|(id,)| id))
}

pub async fn create(
    db: &PgPool,
    payload: &CustomerPayload,
    imc: Option<f64>,
) -> Result<Customer, sqlx::Error> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        INSERT INTO customer (
            id_card, first_name, last_name, email, cell_phone, gender, birth_date,
            weight, height, imc, body_fat_percentage, activity_level, goal,
            daily_calorie_target, allergies, medical_conditions, medications,
            dietary_restrictions, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
        RETURNING *
        "#,
    )
    .bind(&payload.id_card)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.cell_phone)
    .bind(payload.gender)
    .bind(payload.birth_date)
    .bind(payload.weight)
    .bind(payload.height)
    .bind(imc)
    .bind(payload.body_fat_percentage)
    .bind(payload.activity_level)
    .bind(payload.goal)
    .bind(payload.daily_calorie_target)
    .bind(&payload.allergies)
    .bind(&payload.medical_conditions)
    .bind(&payload.medications)
    .bind(&payload.dietary_restrictions)
    .bind(&payload.notes)
    .fetch_one(db)
    .await?;
    Ok(customer)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    payload: &CustomerPayload,
    imc: Option<f64>,
) -> Result<Option<Customer>, sqlx::Error> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        UPDATE customer SET
            id_card = $2, first_name = $3, last_name = $4, email = $5, cell_phone = $6,
            gender = $7, birth_date = $8, weight = $9, height = $10, imc = $11,
            body_fat_percentage = $12, activity_level = $13, goal = $14,
            daily_calorie_target = $15, allergies = $16, medical_conditions = $17,
            medications = $18, dietary_restrictions = $19, notes = $20,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&payload.id_card)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.cell_phone)
    .bind(payload.gender)
    .bind(payload.birth_date)
    .bind(payload.weight)
    .bind(payload.height)
    .bind(imc)
    .bind(payload.body_fat_percentage)
    .bind(payload.activity_level)
    .bind(payload.goal)
    .bind(payload.daily_calorie_target)
    .bind(&payload.allergies)
    .bind(&payload.medical_conditions)
    .bind(&payload.medications)
    .bind(&payload.dietary_restrictions)
    .bind(&payload.notes)
    .fetch_optional(db)
    .await?;
    Ok(customer)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM customer WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
