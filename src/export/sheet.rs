use serde::Serialize;
use time::Date;

use super::filename::dated_filename;
use crate::plans::grid::resolve;
use crate::plans::repo::{MealEntry, NutritionalPlan};
use crate::schedule::{DayOfWeek, MealSlot, MealType};

/// Column width of the day column and of each meal column, in the
/// spreadsheet writer's character units.
const DAY_COLUMN_WIDTH: u16 = 12;
const MEAL_COLUMN_WIDTH: u16 = 25;

/// Everything the spreadsheet-writing collaborator needs: an ordered 2D
/// grid (header row first), fixed column widths and a filename. Row and
/// column order must be preserved exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetArtifact {
    pub sheet_name: String,
    pub rows: Vec<Vec<String>>,
    pub column_widths: Vec<u16>,
    pub filename: String,
}

pub fn build(plan: &NutritionalPlan, meals: &[MealEntry], today: Date) -> SheetArtifact {
    let mut rows = Vec::with_capacity(1 + DayOfWeek::ALL.len());

    let mut header = Vec::with_capacity(1 + MealType::ALL.len());
    header.push("DÍA".to_string());
    header.extend(MealType::ALL.iter().map(|m| m.label().to_uppercase()));
    rows.push(header);

    for day in DayOfWeek::ALL {
        let mut row = Vec::with_capacity(1 + MealType::ALL.len());
        row.push(day.label().to_uppercase());
        for meal in MealType::ALL {
            row.push(resolve(meals, MealSlot::new(day, meal)).to_string());
        }
        rows.push(row);
    }

    let mut column_widths = vec![DAY_COLUMN_WIDTH];
    column_widths.extend(std::iter::repeat(MEAL_COLUMN_WIDTH).take(MealType::ALL.len()));

    SheetArtifact {
        sheet_name: "Plan Nutricional".to_string(),
        rows,
        column_widths,
        filename: dated_filename(&plan.name, today, "xlsx"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::grid::tests::entry;
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn plan(name: &str) -> NutritionalPlan {
        NutritionalPlan {
            id: Uuid::new_v4(),
            name: name.into(),
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

    #[test]
    fn grid_has_header_plus_one_row_per_day() {
        let artifact = build(&plan("Plan"), &[], date!(2025 - 01 - 15));
        assert_eq!(artifact.rows.len(), 8);
        assert_eq!(
            artifact.rows[0],
            vec!["DÍA", "DESAYUNO", "COLACIÓN", "ALMUERZO", "COLACIÓN", "CENA"]
        );
        assert_eq!(artifact.rows[1][0], "LUNES");
        assert_eq!(artifact.rows[7][0], "DOMINGO");
    }

    #[test]
    fn entries_land_on_their_day_row_and_meal_column() {
        let meals = vec![entry(DayOfWeek::Lunes, MealType::Desayuno, "Eggs")];
        let artifact = build(&plan("Plan"), &meals, date!(2025 - 01 - 15));

        // Lunes row, Desayuno column
        assert_eq!(artifact.rows[1][1], "Eggs");

        // everything else stays empty
        let filled: usize = artifact.rows[1..]
            .iter()
            .flat_map(|row| row[1..].iter())
            .filter(|cell| !cell.is_empty())
            .count();
        assert_eq!(filled, 1);
    }

    #[test]
    fn column_widths_are_fixed_metadata() {
        let artifact = build(&plan("Plan"), &[], date!(2025 - 01 - 15));
        assert_eq!(artifact.column_widths, vec![12, 25, 25, 25, 25, 25]);
    }

    #[test]
    fn filename_carries_the_sanitized_name_and_date() {
        let artifact = build(&plan("Plan: Enero"), &[], date!(2025 - 01 - 15));
        assert_eq!(artifact.filename, "Plan_Enero_2025-01-15.xlsx");
        assert_eq!(artifact.sheet_name, "Plan Nutricional");
    }
}
