//! The model pipeline behind every assistant reply.
//!
//! A fixed two-node chain: `summarize` grounds the answer in the page,
//! `diagram` specializes it into diagram markup. Each node is one model
//! call with narrow instructions. When the full chain is not wanted, a
//! single-call backend answers directly; which one a session gets is
//! decided once, when the session is set up.

mod backend;
mod error;
mod graph;
mod stage;

pub use backend::{build_backend, DirectBackend, GraphBackend, PipelineBackend};
pub use error::PipelineError;
pub use graph::{PipelineGraph, PipelineRun};
pub use stage::{Stage, StageNode};
