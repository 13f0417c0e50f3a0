pub mod render_flow;
pub mod step;

pub use render_flow::RenderFlow;
pub use step::{CompletionOutcome, RunReport, Step, StepOutcome, StepRecord};
