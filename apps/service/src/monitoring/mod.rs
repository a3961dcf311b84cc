pub mod outcome;
pub mod probe;
pub mod scheduler;
pub mod types;
pub mod validation;
pub mod worker;

pub use outcome::OutcomeProcessor;
pub use probe::ProbeEngine;
pub use scheduler::Scheduler;
pub use types::{Evaluation, Outcome, ProbeError};
pub use worker::Worker;
