use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyStats {
    pub daily_pct: f64,
    /// `f64::INFINITY` for zero-calorie food; serialized as JSON `null`.
    pub portions_for_daily: f64,
}

/// Share of `daily_target` covered by one reference unit, and how many units
/// reach the target.
pub fn derive(calories: f64, daily_target: f64) -> DailyStats {
    if calories <= 0.0 {
        return DailyStats {
            daily_pct: 0.0,
            portions_for_daily: f64::INFINITY,
        };
    }
    DailyStats {
        daily_pct: calories / daily_target * 100.0,
        portions_for_daily: daily_target / calories,
    }
}
