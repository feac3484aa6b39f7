use std::collections::HashMap;

use tracing::warn;

use super::repo::MealEntry;
use crate::schedule::MealSlot;

/// Anything the weekly grid can read a cell description from: a saved
/// plan's entry list or an in-progress draft. The same grid shape serves
/// both, so viewing and editing go through one lookup contract.
pub trait GridSource {
    fn description(&self, slot: MealSlot) -> &str;
}

impl GridSource for [MealEntry] {
    fn description(&self, slot: MealSlot) -> &str {
        resolve(self, slot)
    }
}

/// Resolves a slot to its meal description, or `""` when the slot is
/// empty. If upstream data ever carries duplicates for one slot, the
/// first entry in input order wins; rendering stays resilient and the
/// violation is reported by [`duplicate_slots`] instead.
pub fn resolve(meals: &[MealEntry], slot: MealSlot) -> &str {
    meals
        .iter()
        .find(|m| m.day_of_week == slot.day && m.meal_type == slot.meal)
        .map(|m| m.meal_description.as_str())
        .unwrap_or("")
}

/// Audit pass over the uniqueness invariant (at most one entry per slot).
/// Returns the offending slots; callers log and carry on.
pub fn duplicate_slots(meals: &[MealEntry]) -> Vec<MealSlot> {
    let mut seen: HashMap<MealSlot, usize> = HashMap::new();
    for m in meals {
        *seen.entry(m.slot()).or_insert(0) += 1;
    }
    let mut dups: Vec<MealSlot> = seen
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(slot, _)| slot)
        .collect();
    dups.sort_by_key(|s| (s.day as u8, s.meal as u8));
    dups
}

pub fn warn_on_duplicates(plan_id: uuid::Uuid, meals: &[MealEntry]) {
    let dups = duplicate_slots(meals);
    if !dups.is_empty() {
        warn!(%plan_id, ?dups, "plan has multiple entries for the same slot");
    }
}

/// Caller-owned mutable grid state for the edit flow: descriptions keyed
/// by slot, held outside any persisted plan until the form is submitted.
#[derive(Debug, Clone, Default)]
pub struct PlanDraft {
    cells: HashMap<MealSlot, String>,
}

impl PlanDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a draft from a saved plan's entries (the edit-page flow).
    pub fn from_entries(meals: &[MealEntry]) -> Self {
        let mut draft = Self::new();
        for slot in MealSlot::all() {
            let description = resolve(meals, slot);
            if !description.is_empty() {
                draft.cells.insert(slot, description.to_string());
            }
        }
        draft
    }

    pub fn set(&mut self, slot: MealSlot, description: impl Into<String>) {
        self.cells.insert(slot, description.into());
    }

    pub fn clear(&mut self, slot: MealSlot) {
        self.cells.remove(&slot);
    }

    /// Slots whose description is non-blank, i.e. what a save would keep.
    pub fn planned(&self) -> impl Iterator<Item = (MealSlot, &str)> {
        self.cells
            .iter()
            .filter(|(_, d)| !d.trim().is_empty())
            .map(|(slot, d)| (*slot, d.as_str()))
    }
}

impl GridSource for PlanDraft {
    fn description(&self, slot: MealSlot) -> &str {
        self.cells.get(&slot).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schedule::{DayOfWeek, MealType};
    use time::OffsetDateTime;
    use uuid::Uuid;

    pub(crate) fn entry(day: DayOfWeek, meal: MealType, description: &str) -> MealEntry {
        MealEntry {
            id: Uuid::new_v4(),
            nutritional_plan_id: Uuid::new_v4(),
            day_of_week: day,
            meal_type: meal,
            meal_description: description.to_string(),
            calories: None,
            protein_grams: None,
            carbs_grams: None,
            fat_grams: None,
            fiber_grams: None,
            portion_size: None,
            preparation_notes: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn resolve_finds_the_matching_slot() {
        let meals = vec![
            entry(DayOfWeek::Lunes, MealType::Desayuno, "Huevos con tostadas"),
            entry(DayOfWeek::Martes, MealType::Cena, "Sopa de verduras"),
        ];
        let slot = MealSlot::new(DayOfWeek::Lunes, MealType::Desayuno);
        assert_eq!(resolve(&meals, slot), "Huevos con tostadas");
    }

    #[test]
    fn resolve_returns_empty_for_unplanned_slots() {
        let meals = vec![entry(DayOfWeek::Lunes, MealType::Desayuno, "Huevos")];
        let slot = MealSlot::new(DayOfWeek::Domingo, MealType::Cena);
        assert_eq!(resolve(&meals, slot), "");
        assert_eq!(resolve(&[], slot), "");
    }

    #[test]
    fn resolve_takes_the_first_match_on_duplicates() {
        let slot = MealSlot::new(DayOfWeek::Viernes, MealType::Almuerzo);
        let meals = vec![
            entry(DayOfWeek::Viernes, MealType::Almuerzo, "Primera"),
            entry(DayOfWeek::Viernes, MealType::Almuerzo, "Segunda"),
        ];
        assert_eq!(resolve(&meals, slot), "Primera");
        assert_eq!(duplicate_slots(&meals), vec![slot]);
    }

    #[test]
    fn duplicate_audit_is_quiet_on_clean_data() {
        let meals = vec![
            entry(DayOfWeek::Lunes, MealType::Desayuno, "a"),
            entry(DayOfWeek::Lunes, MealType::Cena, "b"),
            entry(DayOfWeek::Martes, MealType::Desayuno, "c"),
        ];
        assert!(duplicate_slots(&meals).is_empty());
    }

    #[test]
    fn draft_edits_are_visible_through_the_grid_source() {
        let slot = MealSlot::new(DayOfWeek::Jueves, MealType::Colacion1);
        let mut draft = PlanDraft::new();
        assert_eq!(draft.description(slot), "");

        draft.set(slot, "Yogur con frutas");
        assert_eq!(draft.description(slot), "Yogur con frutas");

        draft.clear(slot);
        assert_eq!(draft.description(slot), "");
    }

    #[test]
    fn draft_seeded_from_entries_matches_the_snapshot() {
        let meals = vec![
            entry(DayOfWeek::Lunes, MealType::Desayuno, "Huevos"),
            entry(DayOfWeek::Sabado, MealType::Cena, "Pescado"),
        ];
        let draft = PlanDraft::from_entries(&meals);
        for slot in MealSlot::all() {
            // both sources answer the same lookup contract
            assert_eq!(draft.description(slot), meals[..].description(slot));
        }
    }

    #[test]
    fn blank_draft_cells_do_not_count_as_planned() {
        let mut draft = PlanDraft::new();
        draft.set(MealSlot::new(DayOfWeek::Lunes, MealType::Desayuno), "Huevos");
        draft.set(MealSlot::new(DayOfWeek::Lunes, MealType::Cena), "   ");
        assert_eq!(draft.planned().count(), 1);
    }
}
