use serde::{Deserialize, Serialize};

/// GET /stats/summary response, replaced wholesale on every refresh. Never
/// derived client-side from the entry collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_entries: i64,
    pub average_mood: f64,
    pub average_sleep: f64,
    pub total_water_cups: i64,
    pub total_sport_min: i64,
    /// Consecutive days with an entry, ending today. Defaults to 0 when the
    /// server omits it.
    #[serde(default)]
    pub current_streak: i32,
    pub weekly_stats: PeriodStats,
    pub monthly_stats: PeriodStats,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodStats {
    pub average_mood: f64,
    pub average_sleep: f64,
    pub total_water_cups: i64,
    pub total_sport_min: i64,
    pub entries_count: i64,
}
