//! Signal/slot notification channel for Horizon Label.
//!
//! A [`Signal<Args>`] is the single observer-registration contract the label
//! exposes to its host: the host connects slots (closures) and the label
//! emits when something observable happens, such as a link being activated
//! or auto-detected links arriving from a background job.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Reentrancy
//!
//! Slots are collected under the connection lock and invoked after it is
//! released, so a slot may connect or disconnect slots on the same signal
//! while it is being emitted. Changes take effect on the next emission.
//!
//! # Example
//!
//! ```
//! use horizon_label_core::Signal;
//!
//! let link_activated = Signal::<String>::new();
//!
//! let conn_id = link_activated.connect(|target| {
//!     println!("open {}", target);
//! });
//!
//! link_activated.emit("https://example.com".to_string());
//! link_activated.disconnect(conn_id);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::error::SignalError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;
type ConnectionMap<Args> = Mutex<SlotMap<ConnectionId, Slot<Args>>>;

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a struct/tuple for richer payloads.
///
/// # Thread Safety
///
/// `Signal<Args>` is `Send + Sync`. Slots run on whichever thread calls
/// [`emit`](Self::emit); in this crate family that is always the owner thread
/// of the label.
pub struct Signal<Args> {
    connections: Arc<ConnectionMap<Args>>,
    blocked: AtomicBool,
    emit_count: AtomicU64,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(SlotMap::with_key())),
            blocked: AtomicBool::new(false),
            emit_count: AtomicU64::new(0),
        }
    }

    /// Register `slot`; it runs on every later emission until disconnected.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Like [`connect`](Self::connect), but the slot lives only as long as
    /// the returned guard. The guard may outlive the signal.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            connections: Arc::downgrade(&self.connections),
            id,
        }
    }

    /// Remove one slot. Returns whether `id` was connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect a slot, reporting an unknown ID as an error.
    pub fn try_disconnect(&self, id: ConnectionId) -> Result<(), SignalError> {
        if self.disconnect(id) {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection)
        }
    }

    /// Remove every slot.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Slots currently registered.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Number of emissions that reached connected slots.
    pub fn emit_count(&self) -> u64 {
        self.emit_count.load(Ordering::Acquire)
    }

    /// While blocked, [`emit`](Self::emit) is a no-op. Owners can block a
    /// signal around a batch of changes and notify once afterwards.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Run every slot with `args`, in connection order.
    #[tracing::instrument(skip_all, target = "horizon_label_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "emit suppressed while blocked");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slots = slots.len(), "emit");
        self.emit_count.fetch_add(1, Ordering::AcqRel);

        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::Relaxed))
            .finish()
    }
}

/// Disconnects its slot on drop. Returned by [`Signal::connect_scoped`].
///
/// # Example
///
/// ```
/// use horizon_label_core::Signal;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// let links_changed = Signal::<usize>::new();
/// let redraws = Arc::new(AtomicI32::new(0));
/// {
///     let redraws = redraws.clone();
///     let _guard = links_changed.connect_scoped(move |_| {
///         redraws.fetch_add(1, Ordering::SeqCst);
///     });
///     links_changed.emit(2);
/// }
/// links_changed.emit(3);
/// assert_eq!(redraws.load(Ordering::SeqCst), 1);
/// ```
pub struct ConnectionGuard<Args> {
    connections: Weak<ConnectionMap<Args>>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    /// The ID of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(connections) = self.connections.upgrade() {
            connections.lock().remove(self.id);
        }
    }
}

static_assertions::assert_impl_all!(Signal<String>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionGuard<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&String) + Send + Sync + 'static) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        (log, move |target: &String| sink.lock().push(target.clone()))
    }

    #[test]
    fn test_slots_receive_every_emission() {
        let activated = Signal::<String>::new();
        let (log, slot) = recorder();
        activated.connect(slot);

        activated.emit("https://a.example".into());
        activated.emit("mailto:b@example.org".into());

        assert_eq!(*log.lock(), ["https://a.example", "mailto:b@example.org"]);
        assert_eq!(activated.emit_count(), 2);
    }

    #[test]
    fn test_disconnected_slot_stops_receiving() {
        let activated = Signal::<String>::new();
        let (log, slot) = recorder();
        let id = activated.connect(slot);

        activated.emit("first".into());
        assert!(activated.disconnect(id));
        activated.emit("second".into());

        assert_eq!(*log.lock(), ["first"]);
        assert!(!activated.disconnect(id));
        assert_eq!(activated.try_disconnect(id), Err(SignalError::InvalidConnection));
    }

    #[test]
    fn test_blocked_emit_is_dropped() {
        let activated = Signal::<String>::new();
        let (log, slot) = recorder();
        activated.connect(slot);

        activated.set_blocked(true);
        activated.emit("hidden".into());
        assert!(activated.is_blocked());
        activated.set_blocked(false);
        activated.emit("shown".into());

        assert_eq!(*log.lock(), ["shown"]);
        assert_eq!(activated.emit_count(), 1);
    }

    #[test]
    fn test_slots_run_in_connection_order() {
        let changed = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for index in 0..3 {
            let order = order.clone();
            changed.connect(move |_| order.lock().push(index));
        }

        changed.emit(());
        assert_eq!(*order.lock(), [0, 1, 2]);

        changed.disconnect_all();
        assert_eq!(changed.connection_count(), 0);
    }

    #[test]
    fn test_scoped_connection_ends_with_guard() {
        let changed = Signal::<()>::new();
        let redraws = Arc::new(AtomicUsize::new(0));

        let guard = {
            let redraws = redraws.clone();
            changed.connect_scoped(move |_| {
                redraws.fetch_add(1, Ordering::SeqCst);
            })
        };
        changed.emit(());
        assert_eq!(changed.connection_count(), 1);
        assert!(changed.try_disconnect(guard.id()).is_ok());
        drop(guard);

        changed.emit(());
        assert_eq!(redraws.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_dropped_after_signal() {
        let guard = Signal::<()>::new().connect_scoped(|_| {});
        drop(guard);
    }

    #[test]
    fn test_slot_can_disconnect_during_emit() {
        let changed = Arc::new(Signal::<()>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let own_id: Arc<Mutex<Option<ConnectionId>>> = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&changed);
        let slot_calls = calls.clone();
        let slot_id = own_id.clone();
        let id = changed.connect(move |_| {
            slot_calls.fetch_add(1, Ordering::SeqCst);
            if let (Some(signal), Some(id)) = (weak.upgrade(), *slot_id.lock()) {
                signal.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        changed.emit(());
        changed.emit(());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
