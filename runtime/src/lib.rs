//! Outpost runtime: registry, route attachments, unit execution and the
//! per-phase pipeline, wired to a host router by [`Engine`].

pub mod attachments;
pub mod engine;
pub mod executor;
pub mod host;
pub mod pipeline;
pub mod registry;

pub mod prelude {
    pub use crate::engine::Engine;
    pub use crate::host::{HookId, HostRouter, HostSignal, PhaseHook};
    pub use crate::pipeline::{PassState, PhaseResult};
}

pub use attachments::AttachmentTable;
pub use engine::Engine;
pub use executor::Executor;
pub use host::{HookId, HostRouter, HostSignal, PhaseHook};
pub use pipeline::{PassState, PhaseResult, PipelineRunner};
pub use registry::Registry;
