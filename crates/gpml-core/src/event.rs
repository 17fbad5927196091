//! Change notifications for the pathway model.
//!
//! Editing layers subscribe to stay in sync with mutations driven by
//! loading or by other collaborators. Events carry element handles only;
//! listeners look the elements up themselves and must not re-enter the
//! model from inside a callback.

use std::rc::Rc;

use crate::model::ElementId;

/// A change notification emitted by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    /// Fired after an element was inserted.
    Added(ElementId),
    /// Fired after an element was removed and all inbound references to it
    /// were detached.
    Removed(ElementId),
    /// Fired after an element was mutated, including position refreshes
    /// cascaded from a moved reference target.
    Modified(ElementId),
    /// Fired when the drawing board grew to fit an element.
    BoardResized,
    /// The consolidated notification emitted at the end of a batch scope,
    /// listing every element touched inside it.
    BatchModified(Vec<ElementId>),
}

/// Handle returned by [`subscribe`](crate::model::PathwayModel::subscribe),
/// used to cancel the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(usize);

type Listener = Rc<dyn Fn(&ModelEvent)>;

/// Listener registry with batch coalescing.
#[derive(Default)]
pub(crate) struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: usize,
    batch_depth: u32,
    pending: Vec<ModelEvent>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .field("batch_depth", &self.batch_depth)
            .field("pending", &self.pending)
            .finish()
    }
}

impl EventBus {
    pub(crate) fn subscribe(&mut self, listener: impl Fn(&ModelEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Rc::new(listener)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(sid, _)| *sid != id);
    }

    /// Delivers an event, or queues it when inside a batch scope.
    pub(crate) fn emit(&mut self, event: ModelEvent) {
        if self.batch_depth > 0 {
            self.pending.push(event);
            return;
        }
        self.dispatch(&event);
    }

    pub(crate) fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Closes a batch scope. When the outermost scope exits, all queued
    /// events collapse into a single [`ModelEvent::BatchModified`].
    pub(crate) fn end_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth > 0 || self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        let mut touched = Vec::new();
        for event in &pending {
            let ids: &[ElementId] = match event {
                ModelEvent::Added(id) | ModelEvent::Removed(id) | ModelEvent::Modified(id) => {
                    std::slice::from_ref(id)
                }
                ModelEvent::BatchModified(ids) => ids,
                ModelEvent::BoardResized => &[],
            };
            for id in ids {
                if !touched.contains(id) {
                    touched.push(*id);
                }
            }
        }
        self.dispatch(&ModelEvent::BatchModified(touched));
    }

    fn dispatch(&self, event: &ModelEvent) {
        // Clone the registry first so a listener unsubscribing mid-dispatch
        // cannot invalidate the iteration.
        let listeners: Vec<Listener> = self.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_emit_reaches_listener() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::default();
        let sink = Rc::clone(&seen);
        bus.subscribe(move |ev| sink.borrow_mut().push(ev.clone()));
        bus.emit(ModelEvent::BoardResized);
        assert_eq!(&*seen.borrow(), &[ModelEvent::BoardResized]);
    }

    #[test]
    fn test_unsubscribe() {
        let seen = Rc::new(RefCell::new(0));
        let mut bus = EventBus::default();
        let sink = Rc::clone(&seen);
        let id = bus.subscribe(move |_| *sink.borrow_mut() += 1);
        bus.emit(ModelEvent::BoardResized);
        bus.unsubscribe(id);
        bus.emit(ModelEvent::BoardResized);
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn test_batch_coalesces_into_one_event() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::default();
        let sink = Rc::clone(&seen);
        bus.subscribe(move |ev| sink.borrow_mut().push(ev.clone()));

        bus.begin_batch();
        bus.emit(ModelEvent::Modified(ElementId::for_tests(1)));
        bus.emit(ModelEvent::Modified(ElementId::for_tests(2)));
        bus.emit(ModelEvent::Modified(ElementId::for_tests(1)));
        bus.emit(ModelEvent::BoardResized);
        assert!(seen.borrow().is_empty());
        bus.end_batch();

        assert_eq!(
            &*seen.borrow(),
            &[ModelEvent::BatchModified(vec![
                ElementId::for_tests(1),
                ElementId::for_tests(2)
            ])]
        );
    }

    #[test]
    fn test_nested_batches_deliver_once() {
        let seen = Rc::new(RefCell::new(0));
        let mut bus = EventBus::default();
        let sink = Rc::clone(&seen);
        bus.subscribe(move |_| *sink.borrow_mut() += 1);

        bus.begin_batch();
        bus.begin_batch();
        bus.emit(ModelEvent::Modified(ElementId::for_tests(0)));
        bus.end_batch();
        assert_eq!(*seen.borrow(), 0);
        bus.end_batch();
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn test_empty_batch_is_silent() {
        let seen = Rc::new(RefCell::new(0));
        let mut bus = EventBus::default();
        let sink = Rc::clone(&seen);
        bus.subscribe(move |_| *sink.borrow_mut() += 1);
        bus.begin_batch();
        bus.end_batch();
        assert_eq!(*seen.borrow(), 0);
    }
}
