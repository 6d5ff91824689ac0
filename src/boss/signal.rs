/// Handle returned by [`Signal::subscribe`], used to unsubscribe later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Box<dyn FnMut(&T) + Send + Sync>;

/// A list of callbacks owned by whoever emits the notification.
///
/// Listeners run synchronously inside `emit`, in the order they subscribed.
/// Callbacks are `Send + Sync` because the owner lives in a Bevy component.
pub struct Signal<T> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<T> Signal<T> {
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed (or already removed).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, value: &T) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(value);
        }
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
impl<T> Signal<T> {
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn listeners_run_in_subscription_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut signal: Signal<u32> = Signal::default();

        let first = calls.clone();
        signal.subscribe(move |value| first.lock().unwrap().push(("first", *value)));
        let second = calls.clone();
        signal.subscribe(move |value| second.lock().unwrap().push(("second", *value)));

        signal.emit(&7);

        assert_eq!(*calls.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let calls = Arc::new(Mutex::new(0));
        let mut signal: Signal<()> = Signal::default();

        let counter = calls.clone();
        let id = signal.subscribe(move |_| *counter.lock().unwrap() += 1);

        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));
        signal.emit(&());

        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(signal.listener_count(), 0);
    }
}
