use crate::model::{DocumentPlan, ScenarioRecord};

/// Functional, then negative, then boundary scenarios, each in source order.
///
/// Records are neither deduplicated nor validated.
pub fn aggregate(plan: &DocumentPlan) -> Vec<&ScenarioRecord> {
    plan.functional
        .iter()
        .chain(&plan.negative)
        .chain(&plan.boundary)
        .collect()
}
