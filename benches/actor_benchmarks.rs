//! Actor System Benchmarks
//!
//! Measures baseline performance of actor lifecycle operations:
//! - Single actor spawn latency
//! - Batch actor spawn (10 actors)
//! - Message processing throughput

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

// Layer 1: Standard library imports
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::Value;

// Layer 3: Internal module imports
use actorgrid::{ActorContext, ActorSystem, Behavior, BehaviorFailure, BehaviorOutcome, Envelope, SystemConfig};

struct CounterBehavior;

#[async_trait]
impl Behavior for CounterBehavior {
    async fn on_message(
        &self,
        _message: Envelope,
        ctx: &ActorContext,
    ) -> Result<BehaviorOutcome, BehaviorFailure> {
        let count = ctx.context().as_i64().unwrap_or(0) + 1;
        Ok(BehaviorOutcome::with_context(Value::from(count)))
    }
}

async fn running_system() -> ActorSystem {
    let system = ActorSystem::new(SystemConfig::default());
    system.start().await.expect("system starts");
    system.enable_test_mode();
    system
}

/// Benchmark: Spawn a single actor (setup + registration overhead)
fn actor_spawn_single(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("actor_spawn_single", |b| {
        b.to_async(&rt).iter(|| async {
            let system = running_system().await;
            let actor_ref = system
                .spawn("counter")
                .spawn(Arc::new(CounterBehavior))
                .await
                .expect("spawn succeeds");

            black_box(&actor_ref);
            system.stop().await.expect("system stops");
        });
    });
}

/// Benchmark: Spawn 10 actors in batch
fn actor_spawn_batch_small(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("actor_spawn_batch_small", |b| {
        b.to_async(&rt).iter(|| async {
            let system = running_system().await;
            let mut refs = Vec::with_capacity(10);

            for _ in 0..10 {
                let actor_ref = system
                    .spawn("counter")
                    .spawn(Arc::new(CounterBehavior))
                    .await
                    .expect("spawn succeeds");
                refs.push(actor_ref);
            }

            black_box(&refs);
            system.stop().await.expect("system stops");
        });
    });
}

/// Benchmark: Message processing throughput under test-mode synchronous dispatch
fn actor_message_throughput(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("actor_message_throughput", |b| {
        b.to_async(&rt).iter(|| async {
            let system = running_system().await;
            let actor_ref = system
                .spawn("counter")
                .spawn(Arc::new(CounterBehavior))
                .await
                .expect("spawn succeeds");

            for _ in 0..100 {
                actor_ref.send("TICK", Value::Null).await.expect("delivered");
            }

            black_box(&actor_ref);
            system.stop().await.expect("system stops");
        });
    });
}

/// Configure criterion for resource-conscious benchmarking
fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30) // Reduced for resource constraints
        .measurement_time(Duration::from_secs(5)) // Shorter measurement
        .warm_up_time(Duration::from_secs(2)) // Shorter warm-up
        .without_plots() // Save disk I/O
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets =
        actor_spawn_single,
        actor_spawn_batch_small,
        actor_message_throughput
}

criterion_main!(benches);
