//! Small shared utilities: id generation.

mod ids;

pub use ids::{next_actor_sequence, CorrelationId};
