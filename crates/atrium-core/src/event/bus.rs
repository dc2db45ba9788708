// Copyright 2026 the atrium project authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The central dispatcher owning per-event-kind listener sets.

use super::listener::{EventHandler, EventListener};
use super::{Event, EventKind, FiredEvent};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Opaque identity of a listener registration within one bus.
pub type ListenerId = u64;

struct Registration {
    handler: Weak<RefCell<dyn EventHandler>>,
    enabled: bool,
}

struct BusState {
    /// Kind -> subscribed listeners, in subscription order. Order is what
    /// makes dispatch deterministic for a fixed bus state; set semantics are
    /// enforced on insert.
    categories: HashMap<EventKind, Vec<ListenerId>>,
    registrations: HashMap<ListenerId, Registration>,
    next_id: ListenerId,
}

/// Central event dispatcher.
///
/// Cheap to clone; all clones share one set of categories. The bus holds only
/// weak references to handlers and never outlives dispatch guarantees: a
/// listener removes itself from every category when dropped, so a fire that
/// follows the drop cannot reach it.
///
/// Dispatch is synchronous and single-threaded. A handler may fire further
/// events from inside `on_event`; each `fire` walks a snapshot of the
/// category taken when it started, so mid-dispatch (un)subscription never
/// invalidates an ongoing fan-out.
#[derive(Clone)]
pub struct EventBus {
    state: Rc<RefCell<BusState>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        log::info!("event bus initialized");
        Self {
            state: Rc::new(RefCell::new(BusState {
                categories: HashMap::new(),
                registrations: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Whether `self` and `other` are handles to the same bus.
    pub fn same_bus(&self, other: &EventBus) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Fires an event, fanning it out to every enabled listener subscribed to
    /// its kind, in subscription order.
    ///
    /// Consumption takes effect strictly for listeners later in this fan-out:
    /// side effects of listeners already visited stand. Firing with no
    /// subscribed listeners is a no-op.
    pub fn fire<E: Event>(&self, event: &E) {
        self.dispatch(&FiredEvent::new(event));
    }

    /// Dispatches an already-wrapped event. Returns immediately if the event
    /// has been consumed before the call.
    pub fn dispatch(&self, event: &FiredEvent<'_>) {
        if !event.is_active() {
            return;
        }
        let snapshot: Vec<ListenerId> = {
            let state = self.state.borrow();
            match state.categories.get(&event.kind()) {
                Some(listeners) => listeners.clone(),
                None => return,
            }
        };
        log::trace!(
            "dispatching {:?} to {} listener(s)",
            event.kind(),
            snapshot.len()
        );
        for id in snapshot {
            if !event.is_active() {
                return;
            }
            // Listeners unregistered since the snapshot resolve to None here
            // and are skipped; the borrow must end before the handler runs so
            // that handlers can mutate subscriptions or fire further events.
            let handler = {
                let state = self.state.borrow();
                match state.registrations.get(&id) {
                    Some(reg) if reg.enabled => reg.handler.upgrade(),
                    _ => None,
                }
            };
            let Some(handler) = handler else { continue };
            match handler.try_borrow_mut() {
                Ok(mut handler) => handler.on_event(event),
                // A handler re-entered during its own dispatch; skipping it
                // keeps the remaining fan-out alive.
                Err(_) => log::warn!(
                    "listener {id} already borrowed while dispatching {:?}; skipped",
                    event.kind()
                ),
            };
        }
    }

    /// Subscribes `listener` to events of `kind`.
    ///
    /// Returns `true` only when the registration newly occurred: listeners
    /// bound to a different bus are rejected, and duplicate subscription is an
    /// idempotent no-op.
    pub fn add_listener(&self, kind: EventKind, listener: &EventListener) -> bool {
        if !self.same_bus(listener.bus()) {
            log::warn!("rejected cross-bus subscription for kind {kind:?}");
            return false;
        }
        self.subscribe_id(kind, listener.id())
    }

    /// Removes `listener` from the category for `kind`. Absent subscriptions
    /// and foreign listeners are silent no-ops.
    pub fn remove_listener(&self, kind: EventKind, listener: &EventListener) {
        if !self.same_bus(listener.bus()) {
            return;
        }
        self.unsubscribe_id(kind, listener.id());
    }

    /// Removes `listener` from every category of this bus.
    pub fn remove_all(&self, listener: &EventListener) {
        if !self.same_bus(listener.bus()) {
            return;
        }
        self.unsubscribe_all_id(listener.id());
    }

    /// Number of listeners currently subscribed to `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.state
            .borrow()
            .categories
            .get(&kind)
            .map_or(0, Vec::len)
    }

    pub(crate) fn register(
        &self,
        handler: Weak<RefCell<dyn EventHandler>>,
        enabled: bool,
    ) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state
            .registrations
            .insert(id, Registration { handler, enabled });
        id
    }

    pub(crate) fn unregister(&self, id: ListenerId) {
        let mut state = self.state.borrow_mut();
        for listeners in state.categories.values_mut() {
            listeners.retain(|entry| *entry != id);
        }
        state.registrations.remove(&id);
    }

    pub(crate) fn subscribe_id(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.registrations.contains_key(&id) {
            return false;
        }
        let listeners = state.categories.entry(kind).or_default();
        if listeners.contains(&id) {
            return false;
        }
        listeners.push(id);
        true
    }

    pub(crate) fn unsubscribe_id(&self, kind: EventKind, id: ListenerId) {
        let mut state = self.state.borrow_mut();
        if let Some(listeners) = state.categories.get_mut(&kind) {
            listeners.retain(|entry| *entry != id);
        }
    }

    pub(crate) fn unsubscribe_all_id(&self, id: ListenerId) {
        let mut state = self.state.borrow_mut();
        for listeners in state.categories.values_mut() {
            listeners.retain(|entry| *entry != id);
        }
    }

    pub(crate) fn set_enabled(&self, id: ListenerId, value: bool) {
        if let Some(reg) = self.state.borrow_mut().registrations.get_mut(&id) {
            reg.enabled = value;
        }
    }

    pub(crate) fn is_enabled(&self, id: ListenerId) -> bool {
        self.state
            .borrow()
            .registrations
            .get(&id)
            .is_some_and(|reg| reg.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_event;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Tick;

    #[derive(Debug)]
    struct Tock;

    impl_event!(Tick, Tock);

    /// A handler that counts deliveries and optionally consumes the event
    /// on its nth invocation.
    struct Counter {
        seen: u32,
        consume_on: Option<u32>,
    }

    impl Counter {
        fn new() -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                seen: 0,
                consume_on: None,
            }))
        }

        fn consuming(on: u32) -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                seen: 0,
                consume_on: Some(on),
            }))
        }
    }

    impl EventHandler for Counter {
        fn on_event(&mut self, event: &FiredEvent<'_>) {
            self.seen += 1;
            if self.consume_on == Some(self.seen) {
                assert!(event.consume());
            }
        }
    }

    fn listener(bus: &EventBus, handler: &Rc<RefCell<Counter>>) -> EventListener {
        let erased: Rc<RefCell<dyn EventHandler>> = handler.clone();
        EventListener::new(bus, &erased, true)
    }

    #[test]
    fn fire_reaches_only_subscribed_kind() {
        let bus = EventBus::new();
        let counter = Counter::new();
        let listener = listener(&bus, &counter);
        assert!(listener.subscribe::<Tick>());

        bus.fire(&Tick);
        bus.fire(&Tock);

        assert_eq!(counter.borrow().seen, 1);
    }

    #[test]
    fn duplicate_subscription_is_idempotent() {
        let bus = EventBus::new();
        let counter = Counter::new();
        let listener = listener(&bus, &counter);

        assert!(listener.subscribe::<Tick>());
        assert!(!listener.subscribe::<Tick>());
        assert_eq!(bus.subscriber_count(EventKind::of::<Tick>()), 1);

        bus.fire(&Tick);
        assert_eq!(counter.borrow().seen, 1);
    }

    #[test]
    fn consumption_stops_later_listeners_only() {
        let bus = EventBus::new();
        let first = Counter::new();
        let second = Counter::consuming(1);
        let third = Counter::new();
        let l1 = listener(&bus, &first);
        let l2 = listener(&bus, &second);
        let l3 = listener(&bus, &third);
        assert!(l1.subscribe::<Tick>());
        assert!(l2.subscribe::<Tick>());
        assert!(l3.subscribe::<Tick>());

        bus.fire(&Tick);

        assert_eq!(first.borrow().seen, 1);
        assert_eq!(second.borrow().seen, 1);
        assert_eq!(third.borrow().seen, 0);
    }

    #[test]
    fn disabled_listeners_stay_subscribed_but_are_skipped() {
        let bus = EventBus::new();
        let counter = Counter::new();
        let listener = listener(&bus, &counter);
        assert!(listener.subscribe::<Tick>());

        listener.set_enabled(false);
        bus.fire(&Tick);
        assert_eq!(counter.borrow().seen, 0);
        assert_eq!(bus.subscriber_count(EventKind::of::<Tick>()), 1);

        listener.set_enabled(true);
        bus.fire(&Tick);
        assert_eq!(counter.borrow().seen, 1);
    }

    #[test]
    fn dropping_a_listener_removes_it_from_every_category() {
        let bus = EventBus::new();
        let keep = Counter::new();
        let gone = Counter::new();
        let l_keep = listener(&bus, &keep);
        let l_gone = listener(&bus, &gone);
        assert!(l_keep.subscribe::<Tick>());
        assert!(l_gone.subscribe::<Tick>());
        assert!(l_gone.subscribe::<Tock>());

        bus.fire(&Tick);
        assert_eq!(keep.borrow().seen, 1);
        assert_eq!(gone.borrow().seen, 1);

        drop(l_gone);
        assert_eq!(bus.subscriber_count(EventKind::of::<Tick>()), 1);
        assert_eq!(bus.subscriber_count(EventKind::of::<Tock>()), 0);

        bus.fire(&Tick);
        bus.fire(&Tock);
        assert_eq!(keep.borrow().seen, 2);
        assert_eq!(gone.borrow().seen, 1);
    }

    #[test]
    fn cross_bus_registration_is_rejected() {
        let bus_a = EventBus::new();
        let bus_b = EventBus::new();
        let counter = Counter::new();
        let listener = listener(&bus_a, &counter);

        assert!(!bus_b.add_listener(EventKind::of::<Tick>(), &listener));
        assert_eq!(bus_b.subscriber_count(EventKind::of::<Tick>()), 0);

        // The home bus still accepts it.
        assert!(bus_a.add_listener(EventKind::of::<Tick>(), &listener));
    }

    #[test]
    fn unsubscribing_mid_dispatch_does_not_break_the_walk() {
        struct SelfRemover {
            listener: Option<EventListener>,
            seen: u32,
        }

        impl EventHandler for SelfRemover {
            fn on_event(&mut self, _event: &FiredEvent<'_>) {
                self.seen += 1;
                if let Some(listener) = self.listener.take() {
                    listener.unsubscribe_all();
                    drop(listener);
                }
            }
        }

        let bus = EventBus::new();
        let remover = Rc::new(RefCell::new(SelfRemover {
            listener: None,
            seen: 0,
        }));
        let erased: Rc<RefCell<dyn EventHandler>> = remover.clone();
        let l1 = EventListener::new(&bus, &erased, true);
        assert!(l1.subscribe::<Tick>());
        remover.borrow_mut().listener = Some(l1);

        let tail = Counter::new();
        let l2 = listener(&bus, &tail);
        assert!(l2.subscribe::<Tick>());

        bus.fire(&Tick);
        assert_eq!(remover.borrow().seen, 1);
        assert_eq!(tail.borrow().seen, 1);

        // The remover dropped its registration; only the tail remains.
        bus.fire(&Tick);
        assert_eq!(remover.borrow().seen, 1);
        assert_eq!(tail.borrow().seen, 2);
    }

    #[test]
    fn refiring_from_inside_a_handler_is_permitted() {
        struct Chainer {
            bus: EventBus,
            pings: u32,
        }

        impl EventHandler for Chainer {
            fn on_event(&mut self, event: &FiredEvent<'_>) {
                if event.downcast_ref::<Tick>().is_some() {
                    self.bus.fire(&Tock);
                } else {
                    self.pings += 1;
                }
            }
        }

        let bus = EventBus::new();
        let chainer = Rc::new(RefCell::new(Chainer {
            bus: bus.clone(),
            pings: 0,
        }));
        let erased: Rc<RefCell<dyn EventHandler>> = chainer.clone();
        let listener = EventListener::new(&bus, &erased, true);
        assert!(listener.subscribe::<Tick>());
        assert!(listener.subscribe::<Tock>());

        // The nested Tock dispatch would re-borrow the chainer while it is
        // handling Tick; the bus skips it instead of aborting.
        bus.fire(&Tick);
        assert_eq!(chainer.borrow().pings, 0);

        bus.fire(&Tock);
        assert_eq!(chainer.borrow().pings, 1);
    }
}
