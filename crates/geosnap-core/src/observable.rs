//! Listener registry with explicit release handles.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

static NEXT_LISTENER_KEY: AtomicU64 = AtomicU64::new(1);

/// Handle returned by [`Observable::subscribe`]; pass it back to
/// [`Observable::unsubscribe`] to release the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerKey(u64);

impl ListenerKey {
    fn next() -> Self {
        Self(NEXT_LISTENER_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

/// Shared callback type.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A set of listeners for one kind of event.
///
/// Listeners are invoked outside the internal lock, so a listener may
/// subscribe or unsubscribe while it runs.
pub struct Observable<E> {
    listeners: RwLock<Vec<(ListenerKey, Listener<E>)>>,
}

impl<E> Default for Observable<E> {
    fn default() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }
}

impl<E> std::fmt::Debug for Observable<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<E> Observable<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> ListenerKey {
        self.subscribe_shared(Arc::new(listener))
    }

    /// Subscribe an already shared listener.
    pub fn subscribe_shared(&self, listener: Listener<E>) -> ListenerKey {
        let key = ListenerKey::next();
        self.listeners.write().push((key, listener));
        key
    }

    /// Release a listener. Returns false if the key was unknown (already
    /// released or never issued here).
    pub fn unsubscribe(&self, key: ListenerKey) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(k, _)| *k != key);
        listeners.len() != before
    }

    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let observable = Observable::<u32>::new();
        let total = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let total = Arc::clone(&total);
            observable.subscribe(move |v| {
                total.fetch_add(*v as usize, Ordering::SeqCst);
            });
        }
        observable.emit(&2);
        assert_eq!(total.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_unsubscribe_releases_once() {
        let observable = Observable::<()>::new();
        let key = observable.subscribe(|()| {});
        assert_eq!(observable.listener_count(), 1);
        assert!(observable.unsubscribe(key));
        assert!(!observable.unsubscribe(key));
        assert_eq!(observable.listener_count(), 0);
    }

    #[test]
    fn test_listener_may_unsubscribe_itself() {
        let observable = Arc::new(Observable::<()>::new());
        let key_slot = Arc::new(RwLock::new(None));
        let key = {
            let inner = Arc::clone(&observable);
            let key_slot = Arc::clone(&key_slot);
            observable.subscribe(move |()| {
                if let Some(key) = *key_slot.read() {
                    inner.unsubscribe(key);
                }
            })
        };
        *key_slot.write() = Some(key);
        observable.emit(&());
        assert_eq!(observable.listener_count(), 0);
    }
}
