//! Scoped publish/subscribe with replay for late subscribers.
//!
//! An [`EventBus`] is constructed for one scope and passed explicitly to the
//! collaborators that share it. Events are addressed by `"<scope>:<key>"`,
//! where the key and its payload type come from an [`EventKey`]
//! implementation.
//!
//! Emission is synchronous: [`EventBus::emit`] queues the event, records it
//! for replay and drains the queue on the calling thread, invoking listeners
//! in registration order. An emit issued from inside a listener is queued
//! and delivered by the drain already in progress, after the current event.
//!
//! A listener registered with [`EventBus::on`] immediately receives every
//! recorded emission for its key (see [`ReplayPolicy`]).
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use roster::event_bus::{EventBus, EventKey, listener};
//!
//! struct Refresh;
//!
//! impl EventKey for Refresh {
//!     type Payload = ();
//!     const NAME: &'static str = "refreshUsers";
//! }
//!
//! let bus = EventBus::new("users-scope");
//! bus.emit::<Refresh>(());
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&calls);
//! bus.on::<Refresh>(listener(move |_: &()| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! }));
//!
//! // Replayed on registration.
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Declares an event name and the payload it carries.
///
/// Two keys sharing a `NAME` must share a payload type; deliveries whose
/// payload type does not match the listener's are skipped.
pub trait EventKey: 'static {
    /// Payload delivered to listeners.
    type Payload: Send + Sync + 'static;
    /// Event name, unscoped.
    const NAME: &'static str;
}

/// A shared callback. Identity (for [`EventBus::off`]) is the `Arc` itself.
pub type Listener<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Wraps a closure as a [`Listener`].
pub fn listener<P, F>(callback: F) -> Listener<P>
where
    F: Fn(&P) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Which past emissions are kept for replay to new listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayPolicy {
    /// Keep every emission for the lifetime of the bus.
    #[default]
    Unbounded,
    /// Keep the most recent `n` emissions of each scoped key.
    LastPerKey(usize),
    /// Keep nothing; late listeners only see later emissions.
    Disabled,
}

type ErasedPayload = Arc<dyn Any + Send + Sync>;
type ErasedListener = Arc<dyn Any + Send + Sync>;
type Dispatch = fn(&[ErasedListener], &ErasedPayload);

#[derive(Clone)]
struct QueuedEvent {
    scoped_key: String,
    payload: ErasedPayload,
    dispatch: Dispatch,
}

#[derive(Default)]
struct BusState {
    listeners: HashMap<String, Vec<ErasedListener>>,
    queue: VecDeque<QueuedEvent>,
    replay: Vec<QueuedEvent>,
    processing: bool,
}

struct BusInner {
    scope: String,
    policy: ReplayPolicy,
    state: Mutex<BusState>,
}

/// A scoped event channel. Clones share the same listeners and buffer.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

fn dispatch_typed<K: EventKey>(listeners: &[ErasedListener], payload: &ErasedPayload) {
    let Some(payload) = payload.downcast_ref::<K::Payload>() else {
        return;
    };
    for erased in listeners {
        if let Some(callback) = erased.downcast_ref::<Listener<K::Payload>>() {
            callback(payload);
        }
    }
}

/// Clears the `processing` flag even if a listener panics.
struct DrainGuard<'a> {
    state: &'a Mutex<BusState>,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().processing = false;
    }
}

impl EventBus {
    /// Creates a bus for `scope` that replays every past emission.
    pub fn new(scope: impl Into<String>) -> Self {
        Self::with_policy(scope, ReplayPolicy::Unbounded)
    }

    /// Creates a bus for `scope` with an explicit replay policy.
    pub fn with_policy(scope: impl Into<String>, policy: ReplayPolicy) -> Self {
        Self {
            inner: Arc::new(BusInner {
                scope: scope.into(),
                policy,
                state: Mutex::new(BusState::default()),
            }),
        }
    }

    /// The scope every key is prefixed with.
    pub fn scope(&self) -> &str {
        &self.inner.scope
    }

    /// The replay policy.
    pub fn policy(&self) -> ReplayPolicy {
        self.inner.policy
    }

    /// `"<scope>:<K::NAME>"`.
    pub fn scoped_key<K: EventKey>(&self) -> String {
        format!("{}:{}", self.inner.scope, K::NAME)
    }

    /// Registers `callback` for `K` and replays every recorded emission of
    /// `K` to it before returning.
    ///
    /// Registering the same `Listener` twice delivers each event twice.
    pub fn on<K: EventKey>(&self, callback: Listener<K::Payload>) {
        let scoped_key = self.scoped_key::<K>();
        let replay: Vec<ErasedPayload> = {
            let mut state = self.inner.state.lock();
            state
                .listeners
                .entry(scoped_key.clone())
                .or_default()
                .push(Arc::new(Arc::clone(&callback)) as ErasedListener);
            state
                .replay
                .iter()
                .filter(|event| event.scoped_key == scoped_key)
                .map(|event| Arc::clone(&event.payload))
                .collect()
        };

        if !replay.is_empty() {
            tracing::debug!(event = %scoped_key, count = replay.len(), "replaying buffered events");
        }
        for payload in replay {
            if let Some(payload) = payload.downcast_ref::<K::Payload>() {
                callback(payload);
            }
        }
    }

    /// Removes every registration of exactly `callback` for `K`. Other
    /// listeners, including equal closures in different `Arc`s, stay.
    pub fn off<K: EventKey>(&self, callback: &Listener<K::Payload>) {
        let scoped_key = self.scoped_key::<K>();
        let mut state = self.inner.state.lock();
        let now_empty = match state.listeners.get_mut(&scoped_key) {
            Some(registered) => {
                registered.retain(|erased| {
                    !erased
                        .downcast_ref::<Listener<K::Payload>>()
                        .is_some_and(|candidate| Arc::ptr_eq(candidate, callback))
                });
                registered.is_empty()
            }
            None => false,
        };
        if now_empty {
            state.listeners.remove(&scoped_key);
        }
    }

    /// Queues `payload` under `K`, records it for replay and drains the
    /// queue.
    pub fn emit<K: EventKey>(&self, payload: K::Payload) {
        let event = QueuedEvent {
            scoped_key: self.scoped_key::<K>(),
            payload: Arc::new(payload),
            dispatch: dispatch_typed::<K>,
        };
        tracing::debug!(event = %event.scoped_key, "event emitted");

        {
            let mut state = self.inner.state.lock();
            state.queue.push_back(event.clone());
            self.record(&mut state, event);
        }

        self.drain();
    }

    fn record(&self, state: &mut BusState, event: QueuedEvent) {
        match self.inner.policy {
            ReplayPolicy::Unbounded => state.replay.push(event),
            ReplayPolicy::Disabled => {}
            ReplayPolicy::LastPerKey(limit) => {
                let scoped_key = event.scoped_key.clone();
                state.replay.push(event);
                let kept = state
                    .replay
                    .iter()
                    .filter(|recorded| recorded.scoped_key == scoped_key)
                    .count();
                let mut excess = kept.saturating_sub(limit);
                state.replay.retain(|recorded| {
                    if excess > 0 && recorded.scoped_key == scoped_key {
                        excess -= 1;
                        false
                    } else {
                        true
                    }
                });
            }
        }
    }

    fn drain(&self) {
        loop {
            let (event, listeners) = {
                let mut state = self.inner.state.lock();
                if state.processing {
                    return;
                }
                let Some(event) = state.queue.pop_front() else {
                    return;
                };
                state.processing = true;
                let listeners = state
                    .listeners
                    .get(&event.scoped_key)
                    .cloned()
                    .unwrap_or_default();
                (event, listeners)
            };

            let _guard = DrainGuard {
                state: &self.inner.state,
            };
            (event.dispatch)(&listeners, &event.payload);
        }
    }

    /// Number of listeners currently registered for `K`.
    pub fn listener_count<K: EventKey>(&self) -> usize {
        let scoped_key = self.scoped_key::<K>();
        self.inner
            .state
            .lock()
            .listeners
            .get(&scoped_key)
            .map_or(0, Vec::len)
    }

    /// Number of emissions currently kept for replay, across all keys.
    pub fn buffered_count(&self) -> usize {
        self.inner.state.lock().replay.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EventBus")
            .field("scope", &self.inner.scope)
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Ping;

    impl EventKey for Ping {
        type Payload = u32;
        const NAME: &'static str = "ping";
    }

    #[rstest]
    fn scoped_key_joins_scope_and_name() {
        let bus = EventBus::new("users-scope");
        assert_eq!(bus.scoped_key::<Ping>(), "users-scope:ping");
    }

    #[rstest]
    fn last_per_key_keeps_most_recent() {
        let bus = EventBus::with_policy("scope", ReplayPolicy::LastPerKey(2));
        for value in 1..=4 {
            bus.emit::<Ping>(value);
        }
        assert_eq!(bus.buffered_count(), 2);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.on::<Ping>(listener(move |value: &u32| sink.lock().push(*value)));
        assert_eq!(*seen.lock(), vec![3, 4]);
    }

    #[rstest]
    fn disabled_policy_keeps_nothing() {
        let bus = EventBus::with_policy("scope", ReplayPolicy::Disabled);
        bus.emit::<Ping>(1);
        assert_eq!(bus.buffered_count(), 0);
    }

    #[rstest]
    fn panicking_listener_does_not_wedge_the_bus() {
        let bus = EventBus::with_policy("scope", ReplayPolicy::Disabled);
        let exploding = listener(|_: &u32| panic!("listener failed"));
        bus.on::<Ping>(Arc::clone(&exploding));

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| bus.emit::<Ping>(1)));
        assert!(outcome.is_err());
        bus.off::<Ping>(&exploding);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.on::<Ping>(listener(move |value: &u32| sink.lock().push(*value)));
        bus.emit::<Ping>(2);
        assert_eq!(*seen.lock(), vec![2]);
    }
}
