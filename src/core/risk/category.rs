/// The fixed category weights from spec §4.4. A matched rule's
/// contribution is `clamp(scoreAdjustment, 0, 100) * category.weight()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskCategory {
    Authentication,
    Behavior,
    Device,
    Location,
    Network,
    Time,
    Velocity,
    Context,
    Reputation,
}

impl RiskCategory {
    pub fn weight(self) -> f64 {
        match self {
            Self::Authentication => 1.0,
            Self::Behavior => 0.9,
            Self::Device => 0.8,
            Self::Location => 0.85,
            Self::Network => 0.7,
            Self::Time => 0.5,
            Self::Velocity => 0.95,
            Self::Context => 0.6,
            Self::Reputation => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_match_spec_table() {
        assert_eq!(RiskCategory::Velocity.weight(), 0.95);
        assert_eq!(RiskCategory::Time.weight(), 0.5);
        assert_eq!(RiskCategory::Reputation.weight(), 1.0);
    }
}
