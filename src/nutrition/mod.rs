pub mod advice;
pub mod label;
pub mod record;
pub mod stats;

pub use record::NutritionRecord;
