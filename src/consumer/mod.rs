//! Consumer pipeline: transport abstraction, message decoding, and the
//! change applier loop.
//!
//! Control flow: the transport delivers a [`transport::RawMessage`]
//! with a commit handle → [`decoder::decode`] validates and extracts a
//! [`crate::domain::ChangeEvent`] → [`ChangeApplier`] dispatches to the
//! content store and, only on success, commits the offset and publishes
//! an outcome.

pub mod applier;
pub mod decoder;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod transport;

pub use applier::ChangeApplier;
pub use transport::{ChannelTransport, CommitAck, InboundMessage, MessageTransport, RawMessage};
