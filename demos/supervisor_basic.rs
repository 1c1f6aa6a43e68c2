//! Basic Supervision Example - Restart Policies
//!
//! Demonstrates the four supervision directives (`Resume`, `Restart`,
//! `Stop`, `Escalate`) attached per-actor via `SupervisionPolicy`, and how
//! a bounded restart budget eventually gives up and stops the actor.
//!
//! # Key Concepts
//!
//! - **Resume**: The actor keeps its existing state and mailbox; the failed
//!   message is simply dropped.
//! - **Restart**: `on_start` runs again (after `retryDelay`), up to
//!   `maxRetries` times within the policy's restart window.
//! - **Stop**: The actor is torn down immediately on any failure.
//! - **Escalate**: Currently equivalent to `Stop` at this single-system
//!   scope (no supervision tree to escalate to).
//!
//! Run with: cargo run --example supervisor_basic

use actorgrid::supervisor::SupervisionPolicy;
use actorgrid::{ActorContext, ActorSystem, Behavior, BehaviorFailure, BehaviorOutcome, Envelope, SystemConfig};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Fails whenever it receives `"BOOM"`, otherwise acknowledges normally.
struct FlakyWorker {
    id: String,
}

#[async_trait]
impl Behavior for FlakyWorker {
    async fn on_start(&self, _ctx: &ActorContext) -> Result<Option<Value>, BehaviorFailure> {
        println!("[{}] starting", self.id);
        Ok(None)
    }

    async fn on_message(&self, message: Envelope, _ctx: &ActorContext) -> Result<BehaviorOutcome, BehaviorFailure> {
        if message.kind == "BOOM" {
            println!("[{}] failing on purpose", self.id);
            return Err(BehaviorFailure(anyhow::anyhow!("induced failure")));
        }
        println!("[{}] handled {}", self.id, message.kind);
        Ok(BehaviorOutcome::none())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Basic Supervision Example ===\n");

    let system = ActorSystem::new(SystemConfig::default());
    system.start().await?;
    system.enable_test_mode();

    println!("Step 1: Resume, the actor survives, state untouched");
    let resumer = system
        .spawn("flaky")
        .id("resumer")
        .supervision(SupervisionPolicy::resume())
        .spawn(Arc::new(FlakyWorker { id: "resumer".into() }))
        .await?;
    resumer.send("BOOM", Value::Null).await?;
    resumer.send("PING", Value::Null).await?;
    println!("✅ resumer still alive: {}\n", resumer.is_alive());

    println!("Step 2: Restart, two retries allowed, then escalation stops it");
    let restarter = system
        .spawn("flaky")
        .id("restarter")
        .supervision(SupervisionPolicy::restart(2, Duration::from_millis(10)))
        .spawn(Arc::new(FlakyWorker { id: "restarter".into() }))
        .await?;
    restarter.send("BOOM", Value::Null).await?;
    println!("   alive after 1st failure: {}", restarter.is_alive());
    restarter.send("BOOM", Value::Null).await?;
    println!("   alive after 2nd failure: {}", restarter.is_alive());
    restarter.send("BOOM", Value::Null).await?;
    println!("   alive after 3rd failure: {}\n", restarter.is_alive());

    println!("Step 3: Stop, any failure tears the actor down immediately");
    let stopper = system
        .spawn("flaky")
        .id("stopper")
        .supervision(SupervisionPolicy::stop())
        .spawn(Arc::new(FlakyWorker { id: "stopper".into() }))
        .await?;
    stopper.send("BOOM", Value::Null).await?;
    println!("✅ stopper alive after failure: {}\n", stopper.is_alive());

    println!("Step 4: Only the actors still alive remain registered");
    println!("   live actors: {}", system.list_actors().len());

    system.stop().await?;
    println!("\n=== Example Complete ===");
    Ok(())
}
