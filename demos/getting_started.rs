//! Getting Started Example - Your First Actor
//!
//! Demonstrates the complete workflow: define a behavior, start a system,
//! spawn an actor, send it messages, and read back its state with `ask`.
//!
//! Run with: cargo run --example getting_started

use actorgrid::{ActorContext, ActorSystem, Behavior, BehaviorFailure, BehaviorOutcome, Envelope, SystemConfig};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

// Step 1: Define your behavior. State lives in the actor's JSON context
// rather than Rust fields, since one system hosts many behavior types
// behind the same `dyn Behavior` registry.
struct CounterBehavior;

#[async_trait]
impl Behavior for CounterBehavior {
    async fn on_start(&self, _ctx: &ActorContext) -> Result<Option<Value>, BehaviorFailure> {
        Ok(Some(json!(0)))
    }

    async fn on_message(&self, message: Envelope, ctx: &ActorContext) -> Result<BehaviorOutcome, BehaviorFailure> {
        let value = ctx.context().as_i64().unwrap_or(0);
        match message.kind.as_str() {
            "INCREMENT" => {
                println!("   Counter incremented to: {}", value + 1);
                Ok(BehaviorOutcome::with_context(Value::from(value + 1)))
            }
            "DECREMENT" => {
                println!("   Counter decremented to: {}", value - 1);
                Ok(BehaviorOutcome::with_context(Value::from(value - 1)))
            }
            "GET_VALUE" => Ok(BehaviorOutcome::none().emit(
                actorgrid::EmittedEvent::new("RESPONSE", Value::from(value))
                    .with_correlation_id(ctx.correlation_id().unwrap_or_default()),
            )),
            other => Err(BehaviorFailure(anyhow::anyhow!("unknown message kind: {other}"))),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Getting Started Example ===\n");

    println!("1. Starting the system...");
    let system = ActorSystem::new(SystemConfig::default());
    system.start().await?;
    println!("   System is running\n");

    println!("2. Spawning the counter actor...");
    let counter = system.spawn("counter").spawn(Arc::new(CounterBehavior)).await?;
    println!("   Actor spawned at {}\n", counter.address());

    println!("3. Sending messages...");
    counter.send("INCREMENT", Value::Null).await?;
    counter.send("INCREMENT", Value::Null).await?;
    counter.send("DECREMENT", Value::Null).await?;
    system.flush(None, None).await?;

    println!("\n4. Reading the final value back with ask...");
    let response = counter.ask("GET_VALUE", Value::Null, None).await?;
    println!("   Current value: {}\n", response.payload);

    println!("5. Shutting down...");
    system.stop().await?;
    println!("   System stopped");

    println!("\n=== Example Complete ===");
    Ok(())
}
