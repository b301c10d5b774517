//! Projection engine for the three reference periods

mod state;
mod engine;
mod result;

pub use state::{PeriodBuffers, truncate};
pub use engine::{
    project, project_with, CoefficientPolicy, Period, PeriodProjection, ProjectionConfig,
    ProjectionEngine,
};
pub use result::{PeriodSummary, ProjectionResult, ProjectionSummary, ResultRow};
