use serde::Serialize;

use super::{advice::advise, label::ParsedLabel, stats::derive};

/// Result of analysing one food photo. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionRecord {
    pub class_index: usize,
    pub food_name: String,
    pub reference_unit: Option<String>,
    pub calories: u32,
    pub fat_pct: u32,
    pub carb_pct: u32,
    pub protein_pct: u32,
    pub confidence: f32,
    pub advice: String,
    pub daily_target: f64,
    pub daily_pct: f64,
    pub portions_for_daily: f64,
    pub label_parsed: bool,
}

impl NutritionRecord {
    pub fn build(class_index: usize, confidence: f32, parsed: ParsedLabel, daily_target: f64) -> Self {
        let label_parsed = !parsed.is_fallback();
        let facts = parsed.into_facts();
        let stats = derive(f64::from(facts.calories), daily_target);
        let advice = advise(facts.calories, facts.fat_pct, facts.carb_pct, facts.protein_pct);

        Self {
            class_index,
            food_name: facts.food_name,
            reference_unit: facts.reference_unit,
            calories: facts.calories,
            fat_pct: facts.fat_pct,
            carb_pct: facts.carb_pct,
            protein_pct: facts.protein_pct,
            confidence,
            advice,
            daily_target,
            daily_pct: stats.daily_pct,
            portions_for_daily: stats.portions_for_daily,
            label_parsed,
        }
    }
}

#[cfg(test)]
mod record_tests {
    use super::*;
    use crate::nutrition::label::parse;

    #[test]
    fn build_from_clean_label() {
        let parsed = parse("Nasi Goreng (1 porsi) = 250 kkal (34% lemak, 51% karb, 15% prot)");
        let r = NutritionRecord::build(20, 0.9, parsed, 2000.0);
        assert_eq!(r.food_name, "Nasi Goreng");
        assert_eq!(r.calories, 250);
        assert_eq!(r.daily_pct, 12.5);
        assert_eq!(r.portions_for_daily, 8.0);
        assert_eq!(r.advice, "Balanced macro composition for a standard meal.");
        assert!(r.label_parsed);
    }

    #[test]
    fn build_from_fallback_label() {
        let r = NutritionRecord::build(0, 0.4, parse("Mystery Dish"), 2000.0);
        assert!(!r.label_parsed);
        assert_eq!(r.food_name, "Mystery Dish");
        assert_eq!(r.daily_pct, 0.0);
        assert!(r.portions_for_daily.is_infinite());
        assert_eq!(r.advice, "Relatively low calorie, good for a snack.");
    }
}
