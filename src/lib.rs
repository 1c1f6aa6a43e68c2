//! # actorgrid - Location-Transparent Actor Runtime
//!
//! A single-process actor runtime built around location-transparent
//! addressing (`actor://<node>/<type>/<id>`), bounded per-actor mailboxes,
//! Erlang/OTP-style supervision, and a pluggable directory abstraction that
//! keeps every actor's location lookup behind one trait boundary, so a
//! distributed layer can later slot in without touching actor code.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use actorgrid::*;
//! use async_trait::async_trait;
//! use serde_json::Value;
//! use std::sync::Arc;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Behavior for Echo {
//!     async fn on_message(
//!         &self,
//!         message: Envelope,
//!         _ctx: &ActorContext,
//!     ) -> Result<BehaviorOutcome, BehaviorFailure> {
//!         Ok(BehaviorOutcome::none().emit(EmittedEvent::new("ECHO", message.payload)))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let system = ActorSystem::new(SystemConfig::default());
//!     system.start().await?;
//!
//!     let echo = system.spawn("echo").spawn(Arc::new(Echo)).await?;
//!     echo.send("PING", Value::Null).await?;
//!
//!     system.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! ## Core Actor Runtime
//! - [`address`] - Location-transparent addressing
//! - [`envelope`] - The canonical message envelope and normalization
//! - [`behavior`] - The `onStart`/`onMessage`/`onStop` contract
//! - [`mailbox`] - Bounded per-actor mailbox with configurable overflow policy
//! - [`executor`] - The per-actor processing loop
//! - [`reference`] - Location-transparent actor handles
//!
//! ## Fault Tolerance
//! - [`supervisor`] - Supervision directives, policy and restart backoff
//!
//! ## Messaging Fabric
//! - [`ask`] - Request/response correlation
//! - [`subscription`] - Direct and emit-channel subscription registry
//! - [`deadletter`] - Undeliverable-message ring buffer
//! - [`collector`] - Built-in event-collector actor
//!
//! ## Distribution Boundary
//! - [`directory`] - Distributed directory abstraction (local implementation only)
//! - [`transport`] - Remote-delivery hook (unconfigured by default)
//! - [`cluster`] - Cluster membership record
//!
//! ## Infrastructure
//! - [`system`] - `ActorSystem` configuration, registry and lifecycle
//! - [`util`] - Id generation helpers
//!
//! # Architecture Principles
//!
//! ## Invariant I1: single-threaded-per-actor
//! Exactly one executor loop ever touches a given actor's context and
//! mutable state at a time (§4.2); concurrent message arrivals queue in its
//! mailbox rather than racing on its state.
//!
//! ## Location transparency
//! Every actor handle (`ActorRef`) and address format is the same whether
//! the actor turns out to be local or remote; only the directory lookup
//! inside `enqueueMessage` branches on it.
//!
//! ## Dynamic dispatch for behaviors
//! `Behavior` is `dyn`-safe and actors are stored behind `Arc<dyn Behavior>`:
//! one system here hosts many unrelated actor types under one
//! location-transparent registry, so compile-time monomorphization per
//! message type doesn't fit.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod address;
pub mod ask;
pub mod behavior;
pub mod cluster;
pub mod collector;
pub mod deadletter;
pub mod directory;
pub mod envelope;
pub mod executor;
pub mod mailbox;
pub mod reference;
pub mod subscription;
pub mod supervisor;
pub mod system;
pub mod transport;
pub mod util;

// Re-export commonly used types
pub use address::{Address, AddressError};
pub use ask::{AskError, AskManager};
pub use behavior::{Behavior, BehaviorFailure, BehaviorOutcome, EmittedEvent};
pub use cluster::{ClusterEvent, ClusterState, ClusterStatus};
pub use collector::EventCollectorBehavior;
pub use deadletter::{DeadLetter, DeadLetterQueue, DeadLetterStats};
pub use directory::{Directory, DirectoryChange, DirectorySubscription, InMemoryDirectory};
pub use envelope::{Envelope, NormalizeError};
pub use mailbox::{EnqueueOutcome, Mailbox, OverflowPolicy};
pub use reference::{ActorRef, DirectSubscription, EventSubscription};
pub use subscription::SubscriptionRegistry;
pub use supervisor::{Directive, RestartBackoff, SupervisionPolicy};
pub use system::{ActorContext, ActorSpawnBuilder, ActorSystem, SystemConfig, SystemError, SystemEvent};
pub use transport::{RemoteDeliveryError, RemoteTransport, UnconfiguredTransport};
