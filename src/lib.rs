//! # content-relay
//!
//! Keeps a keyed content store synchronized with a stream of
//! upsert/delete events arriving from a message broker topic, and
//! exposes the resulting store for point and path-based reads.
//!
//! ## Architecture
//!
//! ```text
//! Broker topic
//!     │
//!     ├── MessageTransport (consumer/)      ordered delivery + commit handles
//!     ├── decode → ChangeEvent (consumer/)  validate key + value payload
//!     ├── ChangeApplier (consumer/)         apply, commit-after-success, outcome
//!     │
//!     ├── ContentStore (persistence/)       PostgreSQL or in-memory
//!     │
//!     └── HTTP read path (api/)             get / get_by_path / get_all
//! ```
//!
//! The applier commits a message's offset only after its write has been
//! applied, so at-least-once delivery is bounded to a safe window:
//! a crash between write and commit replays an idempotent upsert or
//! delete, never loses one.

pub mod api;
pub mod app_state;
pub mod config;
pub mod consumer;
pub mod domain;
pub mod error;
pub mod persistence;
