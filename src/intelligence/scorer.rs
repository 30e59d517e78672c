/// Scoring for suggestions
///
/// Turns a follow-up's static priority and the recency of the command that
/// produced it into a confidence between 0 and 1.

/// Turns after which a follow-up is worth half as much
const RECENCY_HALF_LIFE: f64 = 5.0;

/// Scorer for calculating confidence scores
pub struct Scorer;

impl Scorer {
    /// Calculate overall score for a suggestion
    ///
    /// # Arguments
    /// * `priority` - Static priority from the follow-up table (0 is best, 100 is worst)
    /// * `recency` - Recency weight of the source command (0.0-1.0)
    ///
    /// # Returns
    /// * Score between 0.0 and 1.0
    pub fn calculate_suggestion_score(priority: u8, recency: f64) -> f64 {
        let base = 1.0 - f64::from(priority.min(100)) / 100.0;

        // Weighted average
        let score = base * 0.8 + recency.clamp(0.0, 1.0) * 0.2;

        score.clamp(0.0, 1.0)
    }

    /// Calculate recency weight using exponential decay
    ///
    /// # Arguments
    /// * `turns_ago` - Number of turns since the source command ran
    pub fn calculate_recency_weight(turns_ago: usize) -> f64 {
        (-(turns_ago as f64) / RECENCY_HALF_LIFE * 2.0_f64.ln()).exp()
    }
}
