//! QA test-plan model and the response-reliability steps between a raw
//! completion and a renderable scenario list.

pub mod aggregate;
pub mod model;
pub mod normalize;
pub mod prompt;

pub use aggregate::aggregate;
pub use model::{DocumentPlan, RequirementText, ScenarioRecord};
pub use normalize::{MalformedResponseError, Normalizer};
pub use prompt::{SYSTEM_INSTRUCTION, build_prompt};
