//! Event Processing Pipeline
//!
//! Demonstrates chaining actors into a pipeline (Ingest -> Transform ->
//! Output) using point-to-point `ctx.send`, with an event collector
//! subscribed to the final stage's emitted output via the emit-channel
//! fan-out (`ActorSystem::subscribe`).
//!
//! Run with: cargo run --example event_pipeline

use actorgrid::{
    ActorContext, ActorSystem, Behavior, BehaviorFailure, BehaviorOutcome, EmittedEvent, Envelope,
    EventCollectorBehavior, SystemConfig,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

struct IngestStage {
    next: actorgrid::Address,
}

#[async_trait]
impl Behavior for IngestStage {
    async fn on_message(&self, message: Envelope, ctx: &ActorContext) -> Result<BehaviorOutcome, BehaviorFailure> {
        println!("[IngestStage] received {:?}", message.payload);
        ctx.send(&self.next, "TRANSFORM", message.payload).await;
        Ok(BehaviorOutcome::none())
    }
}

struct TransformStage {
    next: actorgrid::Address,
}

#[async_trait]
impl Behavior for TransformStage {
    async fn on_message(&self, message: Envelope, ctx: &ActorContext) -> Result<BehaviorOutcome, BehaviorFailure> {
        let enriched = json!({ "raw": message.payload, "enriched": true });
        println!("[TransformStage] enriching -> {enriched}");
        ctx.send(&self.next, "OUTPUT", enriched).await;
        Ok(BehaviorOutcome::none())
    }
}

struct OutputStage;

#[async_trait]
impl Behavior for OutputStage {
    async fn on_message(&self, message: Envelope, _ctx: &ActorContext) -> Result<BehaviorOutcome, BehaviorFailure> {
        println!("[OutputStage] persisting {}", message.payload);
        Ok(BehaviorOutcome::none().emit(EmittedEvent::new("PERSISTED", message.payload)))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Event Pipeline Example ===\n");

    let system = ActorSystem::new(SystemConfig::default());
    system.start().await?;

    println!("Wiring up the pipeline...");
    let output = system.spawn("output").spawn(Arc::new(OutputStage)).await?;
    let transform = system
        .spawn("transform")
        .spawn(Arc::new(TransformStage { next: output.address().clone() }))
        .await?;
    let ingest = system
        .spawn("ingest")
        .spawn(Arc::new(IngestStage { next: transform.address().clone() }))
        .await?;

    let collector = system.spawn_event_collector(None, true).await?;
    system.subscribe(output.address(), collector.address(), None).await;
    println!("✅ Pipeline ready with 3 stages\n");

    println!("Processing events through the pipeline...");
    for event in ["user_signup", "user_login", "user_logout"] {
        ingest.send("INGEST", json!(event)).await?;
    }
    system.flush(None, None).await?;

    let response = collector.ask("GET_EVENTS", Value::Null, None).await?;
    println!("\nFinal persisted events: {}", response.payload);

    system.stop().await?;
    println!("\n=== Example Complete ===");
    Ok(())
}
