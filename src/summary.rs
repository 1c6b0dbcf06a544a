//! Per-session statistics over emitted levels

/// Running maximum and mean of the levels seen in one session
#[derive(Debug, Clone, Default)]
pub struct LevelSummary {
    count: u64,
    sum: f64,
    max: Option<f64>,
}

impl LevelSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one level to the summary
    pub fn record(&mut self, level: f64) {
        self.count += 1;
        self.sum += level;
        self.max = Some(self.max.map_or(level, |max| max.max(level)));
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let summary = LevelSummary::new();
        assert_eq!(summary.count(), 0);
        assert_eq!(summary.max(), None);
        assert_eq!(summary.mean(), None);
    }

    #[test]
    fn test_max_and_mean() {
        let mut summary = LevelSummary::new();
        for level in [0.2, 0.8, 0.5] {
            summary.record(level);
        }
        assert_eq!(summary.count(), 3);
        assert_eq!(summary.max(), Some(0.8));
        assert!((summary.mean().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_all_silent_session() {
        let mut summary = LevelSummary::new();
        summary.record(0.0);
        summary.record(0.0);
        assert_eq!(summary.max(), Some(0.0));
        assert_eq!(summary.mean(), Some(0.0));
    }
}
