pub mod cli;
pub mod engine;
pub mod os;

pub use engine::admission::AdmissionController;
pub use engine::cycler::{Endpoint, EndpointCycler, Target};
pub use engine::tracker::{ConnectionSlot, FlowTracker};
pub use engine::worker::{run_flow, FlowError, FlowOutcome};
