//! The interaction pipeline that turns one utterance into one reply.

pub mod pipeline;

pub use pipeline::{substitute_self_references, InteractionPipeline};
