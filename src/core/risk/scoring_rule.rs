use crate::core::authorization::ConditionOperator;
use crate::core::risk::RiskCategory;
use crate::core::value::AttributeValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleLogic {
    And,
    Or,
}

/// A condition tree node: either a leaf comparison against the assessment
/// context, or a group combining children with AND/OR (spec §4.4).
#[derive(Debug, Clone)]
pub enum RuleCondition {
    Leaf {
        field: String,
        operator: ConditionOperator,
        value: AttributeValue,
    },
    Group {
        logic: RuleLogic,
        children: Vec<RuleCondition>,
    },
}

impl RuleCondition {
    pub fn leaf(field: impl Into<String>, operator: ConditionOperator, value: AttributeValue) -> Self {
        Self::Leaf {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn and(children: Vec<RuleCondition>) -> Self {
        Self::Group {
            logic: RuleLogic::And,
            children,
        }
    }

    pub fn or(children: Vec<RuleCondition>) -> Self {
        Self::Group {
            logic: RuleLogic::Or,
            children,
        }
    }
}

/// A risk scoring rule. Rules are sorted by `priority` descending and
/// evaluated in that order; matched rules each contribute a weighted score.
#[derive(Debug, Clone)]
pub struct ScoringRule {
    pub id: String,
    pub name: String,
    pub category: RiskCategory,
    pub priority: i32,
    pub enabled: bool,
    pub condition: RuleCondition,
    pub score_adjustment: f64,
}

impl ScoringRule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: RiskCategory,
        priority: i32,
        condition: RuleCondition,
        score_adjustment: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            priority,
            enabled: true,
            condition,
            score_adjustment,
        }
    }
}
