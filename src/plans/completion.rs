use serde::Serialize;

use super::repo::MealEntry;
use crate::schedule::MealSlot;

/// How full a plan's grid is, out of the 35 possible slots.
///
/// Counts entries as planned regardless of description content; the API
/// layer rejects blank descriptions on write, so stored entries are
/// always non-empty in practice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Completion {
    pub planned: usize,
    pub total: usize,
    pub percent: u8,
    pub fraction: f64,
}

impl Completion {
    pub fn of(meals: &[MealEntry]) -> Self {
        Self::from_count(meals.len())
    }

    pub fn from_count(planned: usize) -> Self {
        let total = MealSlot::COUNT;
        let fraction = planned as f64 / total as f64;
        Self {
            planned,
            total,
            percent: (fraction * 100.0).round() as u8,
            fraction,
        }
    }
}
