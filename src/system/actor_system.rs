//! The actor system: registry, router and lifecycle (§2, §4.1).
//!
//! Split into a public `ActorSystem` handle and an `ActorSystemInner` that
//! owns a `DashMap<String, Arc<ActorRecord>>` keyed by address path, rather
//! than a broker-routed pub-sub fabric: this crate's "broker" *is* the
//! directory plus the per-actor mailbox, so messages are routed directly
//! rather than published to a shared bus. `ActorSystemInner`
//! holds a self-referential `Weak<Self>` (built with `Arc::new_cyclic`) so
//! internal methods can hand out `Weak<ActorSystemInner>` to contexts and
//! references without the caller threading an `Arc` through every call.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::broadcast;

// Layer 3: Internal module imports
use crate::address::Address;
use crate::ask::AskError;
use crate::behavior::Behavior;
use crate::cluster::{ClusterEvent, ClusterState, ClusterStatus};
use crate::collector::EventCollectorBehavior;
use crate::deadletter::{DeadLetterQueue, DeadLetterStats};
use crate::directory::{Directory, InMemoryDirectory};
use crate::envelope::Envelope;
use crate::executor;
use crate::mailbox::{EnqueueOutcome, Mailbox, OverflowPolicy};
use crate::reference::{ActorRef, EventSubscription};
use crate::subscription::SubscriptionRegistry;
use crate::supervisor::SupervisionPolicy;
use crate::system::builder::ActorSpawnBuilder;
use crate::system::config::SystemConfig;
use crate::system::errors::SystemError;
use crate::system::events::SystemEvent;
use crate::system::record::{ActorRecord, ActorStatsSnapshot, ExecState};
use crate::transport::{RemoteDeliveryError, RemoteTransport, UnconfiguredTransport};
use crate::util::{next_actor_sequence, CorrelationId};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// System-level lifecycle state (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    Down,
    Up,
    ShuttingDown,
    Stopped,
}

/// Aggregate counters across every local actor (`getSystemStats`, §4.1).
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub actor_count: usize,
    pub messages_received: u64,
    pub messages_processed: u64,
    pub errors: u64,
    pub dead_letters: DeadLetterStats,
    pub pending_asks: usize,
    pub cluster: ClusterState,
}

/// Everything the system owns, reachable through `Arc` by every record,
/// context and reference it hands out (§2).
pub struct ActorSystemInner {
    config: SystemConfig,
    state: RwLock<SystemState>,
    self_handle: Weak<ActorSystemInner>,
    actors: DashMap<String, Arc<ActorRecord>>,
    directory: Arc<dyn Directory>,
    dead_letters: DeadLetterQueue,
    ask_manager: crate::ask::AskManager,
    subscriptions: SubscriptionRegistry,
    transport: Arc<dyn RemoteTransport>,
    actor_sequence: AtomicU64,
    test_mode: AtomicBool,
    system_events: broadcast::Sender<SystemEvent>,
    cluster_events: broadcast::Sender<ClusterEvent>,
    cluster_state: Mutex<ClusterState>,
    shutdown_handlers: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
}

impl ActorSystemInner {
    fn build(config: SystemConfig, transport: Arc<dyn RemoteTransport>) -> Arc<Self> {
        let directory_ttl = config.directory_cache_ttl;
        Arc::new_cyclic(|weak| Self {
            config,
            state: RwLock::new(SystemState::Down),
            self_handle: weak.clone(),
            actors: DashMap::new(),
            directory: Arc::new(InMemoryDirectory::new(directory_ttl)),
            dead_letters: DeadLetterQueue::new(crate::deadletter::DEFAULT_MAX_SIZE),
            ask_manager: crate::ask::AskManager::new(),
            subscriptions: SubscriptionRegistry::new(),
            transport,
            actor_sequence: AtomicU64::new(0),
            test_mode: AtomicBool::new(false),
            system_events: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            cluster_events: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            cluster_state: Mutex::new(ClusterState::default()),
            shutdown_handlers: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn config(&self) -> &SystemConfig {
        &self.config
    }

    fn emit_system_event(&self, event: SystemEvent) {
        let _ = self.system_events.send(event);
    }

    fn emit_cluster_event(&self, event: ClusterEvent) {
        let _ = self.cluster_events.send(event);
    }

    fn is_running(&self) -> bool {
        *self.state.read() == SystemState::Up
    }

    pub(crate) fn has_actor(&self, address: &Address) -> bool {
        self.actors.contains_key(&address.path())
    }

    pub(crate) fn actor_stats(&self, address: &Address) -> Option<ActorStatsSnapshot> {
        self.actors.get(&address.path()).map(|r| r.stats_snapshot())
    }

    pub(crate) fn subscribe_direct(&self, publisher: &Address, event_type: &str, subscriber: Address) {
        self.subscriptions.subscribe_direct(&publisher.path(), event_type, subscriber);
    }

    pub(crate) fn unsubscribe_direct(&self, publisher: &Address, event_type: &str, subscriber: &Address) {
        self.subscriptions.unsubscribe_direct(&publisher.path(), event_type, subscriber);
    }

    pub(crate) fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    pub(crate) fn ask_manager(&self) -> &crate::ask::AskManager {
        &self.ask_manager
    }

    /// Race-free rescheduling (§4.1 routing policy): claims the actor's loop
    /// flag and, depending on test mode, either runs the executor inline
    /// (synchronous dispatch: `enqueue`/`send` only return once every
    /// reachable message has been processed) or hands it to a fresh tokio
    /// task (deferred dispatch, the default).
    pub(crate) async fn maybe_schedule(self: &Arc<Self>, record: Arc<ActorRecord>) {
        if record.exec_state() == ExecState::Stopped {
            return;
        }
        if !record.try_claim_schedule() {
            return;
        }
        if self.test_mode.load(Ordering::Acquire) {
            executor::run(Arc::clone(self), record).await;
        } else {
            let system = Arc::clone(self);
            tokio::spawn(async move {
                executor::run(system, record).await;
            });
        }
    }

    /// Routing policy for `send`/`enqueueMessage` (§4.1): no directory entry
    /// or no local record means dead-letter; a local entry enqueues into the
    /// actor's mailbox (with its own dead-letter branches on full/displace);
    /// any other location is handed to the remote transport.
    pub(crate) async fn enqueue_message(
        self: &Arc<Self>,
        target_path: &str,
        envelope: Envelope,
    ) -> Result<(), RemoteDeliveryError> {
        let address = match Address::parse(target_path) {
            Ok(address) => address,
            Err(_) => {
                self.dead_letters.add(envelope, target_path, "invalid actor path", 1, None);
                return Ok(());
            }
        };

        let location = self.directory.lookup(&address).await;
        match location {
            None => {
                self.dead_letters.add(envelope, target_path, "Actor not found in directory", 1, None);
                Ok(())
            }
            Some(location) if location == self.config.node_address => {
                match self.actors.get(target_path).map(|e| Arc::clone(e.value())) {
                    None => {
                        self.dead_letters.add(envelope, target_path, "Mailbox not found for actor", 1, None);
                        Ok(())
                    }
                    Some(record) => {
                        match record.mailbox.enqueue(envelope.clone()).await {
                            EnqueueOutcome::Accepted => {
                                self.maybe_schedule(record).await;
                                Ok(())
                            }
                            EnqueueOutcome::Rejected => {
                                self.dead_letters.add(
                                    envelope,
                                    target_path,
                                    "Message dropped due to full mailbox",
                                    1,
                                    None,
                                );
                                Ok(())
                            }
                            EnqueueOutcome::Displaced(evicted) => {
                                self.dead_letters.add(
                                    evicted,
                                    target_path,
                                    "displaced by newer message",
                                    1,
                                    None,
                                );
                                self.maybe_schedule(record).await;
                                Ok(())
                            }
                        }
                    }
                }
            }
            Some(location) => self.transport.deliver_remote(&location, &address, envelope).await,
        }
    }

    pub(crate) async fn ask(
        self: &Arc<Self>,
        to: &Address,
        from: Option<Address>,
        kind: impl Into<String>,
        payload: Value,
        timeout: Option<Duration>,
    ) -> Result<Envelope, AskError> {
        let correlation_id = CorrelationId::new();
        let timeout = timeout.unwrap_or(self.config.default_ask_timeout);
        let pending = self.ask_manager.register(&correlation_id, timeout);

        let mut envelope = Envelope::new(kind, payload).with_correlation_id(correlation_id.as_str());
        if let Some(from) = from {
            envelope = envelope.with_sender(from);
        }
        let _ = self.enqueue_message(&to.path(), envelope).await;
        pending.wait().await
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn spawn_actor_internal(
        self: &Arc<Self>,
        kind: String,
        id: Option<String>,
        mailbox_capacity: usize,
        overflow_policy: OverflowPolicy,
        policy: SupervisionPolicy,
        initial_context: Value,
        behavior: Arc<dyn Behavior>,
    ) -> Result<ActorRef, SystemError> {
        if !self.is_running() {
            return Err(SystemError::SystemNotRunning);
        }

        let current = self.actors.len();
        if current >= self.config.max_actors {
            return Err(SystemError::CapacityExceeded {
                current,
                max: self.config.max_actors,
            });
        }

        let id = id.unwrap_or_else(|| format!("actor-{}", next_actor_sequence(&self.actor_sequence)));
        let address = Address::new(&self.config.node_address, kind, id);
        let path = address.path();

        if self.actors.contains_key(&path) {
            return Err(SystemError::DuplicateActorId(address));
        }

        let mailbox = Mailbox::new(mailbox_capacity, overflow_policy);
        let record = Arc::new(ActorRecord::new(address.clone(), behavior, mailbox, initial_context, policy));
        self.actors.insert(path, Arc::clone(&record));
        self.directory.register(&address, &self.config.node_address).await;
        self.emit_system_event(SystemEvent::ActorSpawned { address: address.clone() });

        Ok(ActorRef::new(address, self.self_handle.clone()))
    }

    pub(crate) async fn stop_actor(self: &Arc<Self>, address: &Address) -> Result<(), SystemError> {
        let path = address.path();
        let Some((_, record)) = self.actors.remove(&path) else {
            return Err(SystemError::ActorNotFound(address.clone()));
        };
        self.teardown_actor(&record).await;
        Ok(())
    }

    /// Shared actor teardown, invoked both from the public `stop(reference)`
    /// API and from the executor when supervision decides to stop an actor
    /// (§4.1, §4.5). Assumes the record has already been removed from
    /// `actors` by the caller if called from outside the executor loop.
    pub(crate) async fn teardown_actor(self: &Arc<Self>, record: &Arc<ActorRecord>) {
        record.set_exec_state(ExecState::Stopping);
        self.emit_system_event(SystemEvent::ActorStopping { address: record.address.clone() });

        let ctx = crate::system::context::ActorContext::new(
            record.address.clone(),
            record.context.lock().clone(),
            None,
            self.self_handle.clone(),
        );
        if let Err(err) = record.behavior.on_stop(&ctx).await {
            tracing::warn!(actor = %record.address, error = %err, "onStop failed");
        }

        record.mailbox.stop();
        self.actors.remove(&record.address.path());
        self.directory.unregister(&record.address).await;
        record.set_exec_state(ExecState::Stopped);
        self.emit_system_event(SystemEvent::ActorStopped { address: record.address.clone() });
    }
}

/// Public, cloneable handle to an actor system (§2).
///
/// Cloning shares the same underlying [`ActorSystemInner`] (`Arc`-backed),
/// so every clone observes the same registry and mailboxes.
#[derive(Clone)]
pub struct ActorSystem {
    pub(crate) inner: Arc<ActorSystemInner>,
}

impl ActorSystem {
    /// Builds a system with no remote transport configured; any send that
    /// resolves to a non-local location fails with `RemoteDeliveryError::NotConfigured`.
    pub fn new(config: SystemConfig) -> Self {
        Self::with_transport(config, Arc::new(UnconfiguredTransport))
    }

    pub fn with_transport(config: SystemConfig, transport: Arc<dyn RemoteTransport>) -> Self {
        Self {
            inner: ActorSystemInner::build(config, transport),
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.inner.config
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    /// Transitions the system from down to up (§4.1). Idempotent while
    /// already running.
    pub async fn start(&self) -> Result<(), SystemError> {
        {
            let mut state = self.inner.state.write();
            if *state == SystemState::Up {
                return Ok(());
            }
            *state = SystemState::Up;
        }
        {
            let mut cluster = self.inner.cluster_state.lock();
            if !cluster.nodes.contains(&self.inner.config.node_address) {
                cluster.nodes.push(self.inner.config.node_address.clone());
            }
            cluster.status = ClusterStatus::Up;
        }
        self.inner.emit_system_event(SystemEvent::Initialized);
        self.inner.emit_system_event(SystemEvent::Started);
        Ok(())
    }

    /// Gracefully stops the system (§4.1 `stop()` with no arguments): runs
    /// shutdown handlers, stops every local actor, then drops to `Stopped`.
    /// Exceeding `shutdownTimeout` is a hard error, not a silent best-effort.
    pub async fn stop(&self) -> Result<(), SystemError> {
        {
            let mut state = self.inner.state.write();
            if *state == SystemState::ShuttingDown || *state == SystemState::Stopped {
                return Ok(());
            }
            *state = SystemState::ShuttingDown;
        }
        self.inner.emit_system_event(SystemEvent::Stopping);

        let handlers = std::mem::take(&mut *self.inner.shutdown_handlers.lock());
        for handler in handlers {
            handler();
        }

        let addresses: Vec<Address> = self.inner.actors.iter().map(|e| e.value().address.clone()).collect();
        let inner = Arc::clone(&self.inner);
        let deadline = self.inner.config.shutdown_timeout;
        let stop_all = async move {
            let mut handles = Vec::with_capacity(addresses.len());
            for address in addresses {
                let inner = Arc::clone(&inner);
                handles.push(tokio::spawn(async move {
                    let _ = inner.stop_actor(&address).await;
                }));
            }
            for handle in handles {
                let _ = handle.await;
            }
        };
        let result = tokio::time::timeout(deadline, stop_all).await;

        self.inner.directory.cleanup().await;
        self.inner.ask_manager.cancel_all();
        *self.inner.state.write() = SystemState::Stopped;
        self.inner.emit_system_event(SystemEvent::Stopped);

        result.map_err(|_| SystemError::ShutdownTimeout(deadline))
    }

    pub fn spawn(&self, kind: impl Into<String>) -> ActorSpawnBuilder {
        ActorSpawnBuilder::new(Arc::clone(&self.inner), kind)
    }

    pub async fn lookup(&self, path: &str) -> Option<ActorRef> {
        let address = Address::parse(path).ok()?;
        self.inner.directory.lookup(&address).await?;
        Some(ActorRef::new(address, Arc::downgrade(&self.inner)))
    }

    pub async fn stop_actor(&self, address: &Address) -> Result<(), SystemError> {
        self.inner.stop_actor(address).await
    }

    pub fn list_actors(&self) -> Vec<Address> {
        self.inner.actors.iter().map(|e| e.value().address.clone()).collect()
    }

    pub fn get_system_stats(&self) -> SystemStats {
        let mut messages_received = 0;
        let mut messages_processed = 0;
        let mut errors = 0;
        for entry in self.inner.actors.iter() {
            let snapshot = entry.value().stats_snapshot();
            messages_received += snapshot.messages_received;
            messages_processed += snapshot.messages_processed;
            errors += snapshot.errors;
        }
        SystemStats {
            actor_count: self.inner.actors.len(),
            messages_received,
            messages_processed,
            errors,
            dead_letters: self.inner.dead_letters.get_stats(),
            pending_asks: self.inner.ask_manager.pending_count(),
            cluster: self.inner.cluster_state.lock().clone(),
        }
    }

    pub fn dead_letters(&self) -> &DeadLetterQueue {
        &self.inner.dead_letters
    }

    /// Records `nodes` as joined (§4.1 `join`). Membership consensus itself
    /// is out of scope (§1); this just updates the local record and fans
    /// out `NodeJoined` notifications.
    pub async fn join(&self, nodes: Vec<String>) {
        let mut cluster = self.inner.cluster_state.lock();
        for node in nodes {
            if !cluster.nodes.contains(&node) {
                cluster.nodes.push(node.clone());
                self.inner.emit_cluster_event(ClusterEvent::NodeJoined(node));
            }
        }
    }

    /// Removes this node from the cluster record (§4.1 `leave`).
    pub async fn leave(&self) {
        let mut cluster = self.inner.cluster_state.lock();
        cluster.status = ClusterStatus::Leaving;
        let node = self.inner.config.node_address.clone();
        cluster.nodes.retain(|n| n != &node);
        drop(cluster);
        self.inner.emit_cluster_event(ClusterEvent::NodeLeft(node));
    }

    pub fn get_cluster_state(&self) -> ClusterState {
        self.inner.cluster_state.lock().clone()
    }

    pub fn subscribe_to_cluster_events(&self) -> broadcast::Receiver<ClusterEvent> {
        self.inner.cluster_events.subscribe()
    }

    pub fn subscribe_to_system_events(&self) -> broadcast::Receiver<SystemEvent> {
        self.inner.system_events.subscribe()
    }

    /// Registers a handler run synchronously during `stop()`, before any
    /// actor is torn down (§6).
    pub fn on_shutdown(&self, handler: impl FnOnce() + Send + 'static) {
        self.inner.shutdown_handlers.lock().push(Box::new(handler));
    }

    /// Subscribes `subscriber` to `publisher`'s emitted events (§4.1). Takes
    /// effect by routing a `SUBSCRIBE` control envelope through the
    /// publisher's own mailbox; the executor intercepts it before handing
    /// anything to the behavior, so it is ordered relative to other
    /// messages sent to `publisher`.
    pub async fn subscribe(
        &self,
        publisher: &Address,
        subscriber: &Address,
        events: Option<Vec<String>>,
    ) -> EventSubscription {
        let payload = serde_json::json!({
            "subscriber": subscriber.path(),
            "events": events,
        });
        let envelope = Envelope::new("SUBSCRIBE", payload);
        let _ = self.inner.enqueue_message(&publisher.path(), envelope).await;
        EventSubscription::new(publisher.clone(), subscriber.clone(), events, Arc::downgrade(&self.inner))
    }

    /// Spawns the built-in event-collector actor (§6 component table).
    pub async fn spawn_event_collector(
        &self,
        id: Option<String>,
        auto_start: bool,
    ) -> Result<ActorRef, SystemError> {
        let mut builder = self.spawn("collector");
        if let Some(id) = id {
            builder = builder.id(id);
        }
        builder.spawn(Arc::new(EventCollectorBehavior::new(auto_start))).await
    }

    /// Enables synchronous, in-line dispatch: `enqueue`/`send` only return
    /// once every reachable message has finished processing (§5 test mode).
    pub fn enable_test_mode(&self) {
        self.inner.test_mode.store(true, Ordering::Release);
    }

    pub fn disable_test_mode(&self) {
        self.inner.test_mode.store(false, Ordering::Release);
    }

    pub fn is_test_mode(&self) -> bool {
        self.inner.test_mode.load(Ordering::Acquire)
    }

    /// Drains every mailbox round-robin until quiescence, `timeout` (default
    /// 5s) or `max_rounds` (default 1000) (§4.1 `flush`). Exceeding either
    /// bound is a hard error.
    pub async fn flush(&self, timeout: Option<Duration>, max_rounds: Option<usize>) -> Result<(), SystemError> {
        let deadline = timeout.unwrap_or(Duration::from_secs(5));
        let max_rounds = max_rounds.unwrap_or(1000);
        let inner = Arc::clone(&self.inner);

        let drain = async move {
            for _round in 0..max_rounds {
                let records: Vec<Arc<ActorRecord>> = inner.actors.iter().map(|e| Arc::clone(e.value())).collect();
                let mut any_pending = false;
                for record in &records {
                    if !record.mailbox.is_empty() || record.is_processing() {
                        any_pending = true;
                        inner.maybe_schedule(Arc::clone(record)).await;
                    }
                }
                if !any_pending {
                    return Ok(());
                }
                // Paces rounds against actual processing time rather than
                // burning `max_rounds` on bare poll iterations: a round
                // should observe measurable progress, not just re-check an
                // in-flight message thousands of times per second.
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            Err(SystemError::FlushMaxRoundsExceeded(max_rounds))
        };

        match tokio::time::timeout(deadline, drain).await {
            Ok(result) => result,
            Err(_) => Err(SystemError::FlushTimeout(deadline)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::tests_support::NoopBehavior;

    #[tokio::test]
    async fn starts_and_reports_running() {
        let system = ActorSystem::new(SystemConfig::default());
        assert!(!system.is_running());
        system.start().await.expect("starts");
        assert!(system.is_running());
    }

    #[tokio::test]
    async fn spawn_before_start_fails() {
        let system = ActorSystem::new(SystemConfig::default());
        let result = system.spawn("worker").spawn(Arc::new(NoopBehavior)).await;
        assert!(matches!(result, Err(SystemError::SystemNotRunning)));
    }

    #[tokio::test]
    async fn spawned_actor_is_listed_and_looked_up() {
        let system = ActorSystem::new(SystemConfig::default());
        system.start().await.expect("starts");
        let actor_ref = system
            .spawn("worker")
            .id("w1")
            .spawn(Arc::new(NoopBehavior))
            .await
            .expect("spawns");

        assert_eq!(system.list_actors().len(), 1);
        let looked_up = system.lookup(&actor_ref.address().path()).await;
        assert!(looked_up.is_some());
    }

    #[tokio::test]
    async fn stop_removes_actor_from_registry() {
        let system = ActorSystem::new(SystemConfig::default());
        system.start().await.expect("starts");
        let actor_ref = system.spawn("worker").spawn(Arc::new(NoopBehavior)).await.expect("spawns");

        actor_ref.stop().await.expect("stops");
        assert!(system.list_actors().is_empty());
    }

    #[tokio::test]
    async fn system_stop_tears_down_all_actors() {
        let system = ActorSystem::new(SystemConfig::default());
        system.start().await.expect("starts");
        system.spawn("worker").spawn(Arc::new(NoopBehavior)).await.expect("spawns");
        system.spawn("worker").spawn(Arc::new(NoopBehavior)).await.expect("spawns");

        system.stop().await.expect("stops");
        assert!(system.list_actors().is_empty());
        assert!(!system.is_running());
    }

    #[tokio::test]
    async fn join_and_leave_update_cluster_state() {
        let system = ActorSystem::new(SystemConfig::default());
        system.start().await.expect("starts");

        system.join(vec!["node-2".to_string()]).await;
        assert!(system.get_cluster_state().nodes.contains(&"node-2".to_string()));

        system.leave().await;
        assert_eq!(system.get_cluster_state().status, ClusterStatus::Leaving);
    }

    #[tokio::test]
    async fn sending_to_unknown_actor_is_dead_lettered() {
        let system = ActorSystem::new(SystemConfig::default());
        system.start().await.expect("starts");

        let bogus = Address::local("worker", "nonexistent");
        let _ = system
            .inner
            .enqueue_message(&bogus.path(), Envelope::new("PING", Value::Null))
            .await;

        assert_eq!(system.get_system_stats().dead_letters.size, 1);
    }
}
