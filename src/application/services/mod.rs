//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Prompter)
//! but are themselves concrete structs, not traits.

mod knowledge;
mod troubleshoot;

pub use knowledge::KnowledgeService;
pub use troubleshoot::{StepReport, StepStatus, TroubleshootService, WalkOutcome};
