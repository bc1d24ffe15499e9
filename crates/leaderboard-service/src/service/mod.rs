//! 业务服务层

mod classifier;
mod policy;

pub use classifier::{EventClassifier, IgnoreReason, Outcome};
pub use policy::ScoringPolicy;
