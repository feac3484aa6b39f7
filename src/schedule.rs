use serde::{Deserialize, Serialize};

/// Day of the week as stored in the database and shown in the grid.
/// The declaration order is the display order everywhere (grid rows,
/// exports, share messages) and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "day_of_week", rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Lunes,
    Martes,
    Miercoles,
    Jueves,
    Viernes,
    Sabado,
    Domingo,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Lunes,
        DayOfWeek::Martes,
        DayOfWeek::Miercoles,
        DayOfWeek::Jueves,
        DayOfWeek::Viernes,
        DayOfWeek::Sabado,
        DayOfWeek::Domingo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DayOfWeek::Lunes => "Lunes",
            DayOfWeek::Martes => "Martes",
            DayOfWeek::Miercoles => "Miércoles",
            DayOfWeek::Jueves => "Jueves",
            DayOfWeek::Viernes => "Viernes",
            DayOfWeek::Sabado => "Sábado",
            DayOfWeek::Domingo => "Domingo",
        }
    }
}

/// One of the five meal slots of a day, in column order.
/// Both colaciones share the same display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "meal_type", rename_all = "UPPERCASE")]
pub enum MealType {
    Desayuno,
    #[serde(rename = "COLACION_1")]
    #[sqlx(rename = "COLACION_1")]
    Colacion1,
    Almuerzo,
    #[serde(rename = "COLACION_2")]
    #[sqlx(rename = "COLACION_2")]
    Colacion2,
    Cena,
}

impl MealType {
    pub const ALL: [MealType; 5] = [
        MealType::Desayuno,
        MealType::Colacion1,
        MealType::Almuerzo,
        MealType::Colacion2,
        MealType::Cena,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MealType::Desayuno => "Desayuno",
            MealType::Colacion1 => "Colación",
            MealType::Almuerzo => "Almuerzo",
            MealType::Colacion2 => "Colación",
            MealType::Cena => "Cena",
        }
    }
}

/// A cell coordinate in the weekly grid: (day, meal type).
/// There are exactly 7 × 5 = 35 distinct slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MealSlot {
    pub day: DayOfWeek,
    pub meal: MealType,
}

impl MealSlot {
    pub const COUNT: usize = DayOfWeek::ALL.len() * MealType::ALL.len();

    pub fn new(day: DayOfWeek, meal: MealType) -> Self {
        Self { day, meal }
    }

    /// Every slot in fixed order: days outer, meal types inner.
    pub fn all() -> impl Iterator<Item = MealSlot> {
        DayOfWeek::ALL.into_iter().flat_map(|day| {
            MealType::ALL
                .into_iter()
                .map(move |meal| MealSlot { day, meal })
        })
    }
}
