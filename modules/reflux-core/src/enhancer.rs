//! Decorators layered onto a store.
//!
//! An [`Enhancer`] overrides any of three hooks and forwards everything else.
//! [`Enhanced`] installs one enhancer around an inner store and is itself a
//! [`Store`], so layers stack without the inner ones knowing they are wrapped.

use std::any::Any;
use std::sync::Arc;

use tracing::debug;

use crate::action::Action;
use crate::reducer::Reducer;
use crate::store::{Dispatched, StateStore, Store};
use crate::subscribers::{SubscriptionId, Subscribers};

/// Continuation to the next layer down.
pub struct Forward<S> {
    store: Arc<dyn Store<S>>,
}

impl<S> Forward<S> {
    pub fn new(store: Arc<dyn Store<S>>) -> Self {
        Self { store }
    }

    pub fn state(&self) -> Arc<S> {
        self.store.state()
    }

    pub fn dispatch(&self, action: Action) -> Dispatched {
        self.store.dispatch(action)
    }

    pub fn store(&self) -> &Arc<dyn Store<S>> {
        &self.store
    }
}

impl<S> Clone for Forward<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

/// Hooks an enhancer may override. Every default forwards unchanged.
pub trait Enhancer<S>: Send + Sync + 'static {
    fn on_state(&self, inner: &Forward<S>) -> Arc<S> {
        inner.state()
    }

    fn on_dispatch(&self, action: Action, inner: &Forward<S>) -> Dispatched {
        inner.dispatch(action)
    }

    /// Called whenever the inner store notifies. `subscribers` are the
    /// enhanced store's own subscribers.
    fn on_state_changed(&self, subscribers: &Subscribers) {
        subscribers.notify();
    }
}

/// A store with one enhancer installed around an inner store.
pub struct Enhanced<S, E> {
    inner: Forward<S>,
    enhancer: Arc<E>,
    subscribers: Subscribers,
    relay: SubscriptionId,
}

impl<S, E> Enhanced<S, E>
where
    S: Send + Sync + 'static,
    E: Enhancer<S>,
{
    pub fn new(inner: Arc<dyn Store<S>>, enhancer: E) -> Self {
        let enhancer = Arc::new(enhancer);
        let subscribers = Subscribers::new();
        let relay = {
            let enhancer = enhancer.clone();
            let subscribers = subscribers.clone();
            inner
                .subscribers()
                .subscribe(move || enhancer.on_state_changed(&subscribers))
        };
        debug!(
            enhancer = std::any::type_name::<E>(),
            "Installed store enhancer"
        );
        Self {
            inner: Forward::new(inner),
            enhancer,
            subscribers,
            relay,
        }
    }

    pub fn layer(&self) -> &Arc<E> {
        &self.enhancer
    }

    pub fn shared(self) -> Arc<dyn Store<S>> {
        Arc::new(self)
    }
}

impl<S, E> Store<S> for Enhanced<S, E>
where
    S: Send + Sync + 'static,
    E: Enhancer<S>,
{
    fn state(&self) -> Arc<S> {
        self.enhancer.on_state(&self.inner)
    }

    fn dispatch(&self, action: Action) -> Dispatched {
        self.enhancer.on_dispatch(action, &self.inner)
    }

    fn subscribers(&self) -> &Subscribers {
        &self.subscribers
    }

    fn inner(&self) -> Option<&Arc<dyn Store<S>>> {
        Some(self.inner.store())
    }

    fn enhancer(&self) -> Option<&dyn Any> {
        Some(&*self.enhancer)
    }
}

impl<S, E> Drop for Enhanced<S, E> {
    fn drop(&mut self) {
        self.inner.store.subscribers().unsubscribe(self.relay);
    }
}

/// Wrap `store` with `enhancer`.
pub fn enhance<S, E>(store: Arc<dyn Store<S>>, enhancer: E) -> Arc<dyn Store<S>>
where
    S: Send + Sync + 'static,
    E: Enhancer<S>,
{
    Enhanced::new(store, enhancer).shared()
}

type Layer<S> = Box<dyn FnOnce(Arc<dyn Store<S>>) -> Arc<dyn Store<S>> + Send>;

/// Builds a base store and applies enhancers in the order they were added,
/// so the last one added ends up outermost.
pub struct StoreBuilder<S> {
    reducer: Box<dyn Reducer<S>>,
    initial: S,
    layers: Vec<Layer<S>>,
}

impl<S> StoreBuilder<S>
where
    S: PartialEq + Send + Sync + 'static,
{
    pub fn new(reducer: impl Reducer<S> + 'static, initial: S) -> Self {
        Self {
            reducer: Box::new(reducer),
            initial,
            layers: Vec::new(),
        }
    }

    pub fn with_enhancer<E: Enhancer<S>>(self, enhancer: E) -> Self {
        self.with_layer(move |store| enhance(store, enhancer))
    }

    /// Apply an arbitrary factory, for layers that need the inner store to
    /// construct themselves or can fail to install.
    pub fn with_layer<F>(mut self, layer: F) -> Self
    where
        F: FnOnce(Arc<dyn Store<S>>) -> Arc<dyn Store<S>> + Send + 'static,
    {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn build(self) -> Arc<dyn Store<S>> {
        let base: Arc<dyn Store<S>> = StateStore::from_boxed(self.reducer, self.initial).shared();
        self.layers
            .into_iter()
            .fold(base, |store, layer| layer(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Increment;

    fn counter(state: &i32, action: &Action) -> i32 {
        if action.is::<Increment>() {
            state + 1
        } else {
            *state
        }
    }

    #[derive(Default)]
    struct Recorder {
        log: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn entries(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl Enhancer<i32> for Recorder {
        fn on_dispatch(&self, action: Action, inner: &Forward<i32>) -> Dispatched {
            self.log.lock().unwrap().push(format!("before {}", inner.state()));
            let handle = inner.dispatch(action);
            self.log.lock().unwrap().push(format!("after {}", inner.state()));
            handle
        }
    }

    struct Doubling;

    impl Enhancer<i32> for Doubling {
        fn on_state(&self, inner: &Forward<i32>) -> Arc<i32> {
            Arc::new(*inner.state() * 2)
        }
    }

    #[test]
    fn default_hooks_forward_everything() {
        struct Passthrough;
        impl Enhancer<i32> for Passthrough {}

        let store = StoreBuilder::new(counter, 0)
            .with_enhancer(Passthrough)
            .build();
        let _ = store.dispatch_action(Increment);
        assert_eq!(*store.state(), 1);
    }

    #[test]
    fn on_dispatch_wraps_the_inner_dispatch() {
        let base = StateStore::new(counter, 5).shared();
        let enhanced = Enhanced::new(base, Recorder::default());
        let _ = enhanced.dispatch_action(Increment);

        assert_eq!(enhanced.layer().entries(), vec!["before 5", "after 6"]);
    }

    #[test]
    fn on_state_overrides_reads() {
        let store = StoreBuilder::new(counter, 3)
            .with_enhancer(Doubling)
            .build();
        assert_eq!(*store.state(), 6);
    }

    #[test]
    fn notifications_relay_to_outer_subscribers() {
        let store = StoreBuilder::new(counter, 0)
            .with_enhancer(Recorder::default())
            .with_enhancer(Doubling)
            .build();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        store.subscribers().subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let _ = store.dispatch_action(Increment);
        let _ = store.dispatch_action(Increment);

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn on_state_changed_can_filter_notifications() {
        struct Muted;
        impl Enhancer<i32> for Muted {
            fn on_state_changed(&self, _subscribers: &Subscribers) {}
        }

        let store = StoreBuilder::new(counter, 0).with_enhancer(Muted).build();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        store.subscribers().subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let _ = store.dispatch_action(Increment);
        assert_eq!(*store.state(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn find_enhancer_walks_outer_to_inner() {
        let store = StoreBuilder::new(counter, 0)
            .with_enhancer(Recorder::default())
            .with_enhancer(Doubling)
            .build();

        assert!(store.find_enhancer::<Doubling>().is_some());
        let recorder = store.find_enhancer::<Recorder>().expect("recorder installed");
        let _ = store.dispatch_action(Increment);
        assert_eq!(recorder.entries(), vec!["before 0", "after 1"]);
    }

    #[test]
    fn find_enhancer_reports_absent_roles_as_none() {
        struct Missing;
        let store = StoreBuilder::new(counter, 0).with_enhancer(Doubling).build();
        assert!(store.find_enhancer::<Missing>().is_none());

        let bare = StateStore::new(counter, 0).shared();
        assert!(bare.find_enhancer::<Doubling>().is_none());
    }

    #[test]
    fn dropping_an_enhanced_store_detaches_its_relay() {
        let base = StateStore::new(counter, 0).shared();
        let enhanced = Enhanced::new(base.clone(), Doubling);
        assert_eq!(base.subscribers().len(), 1);

        drop(enhanced);
        assert_eq!(base.subscribers().len(), 0);
    }
}
