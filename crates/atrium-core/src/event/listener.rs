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

//! Listener registrations binding a handler to exactly one bus.

use super::bus::{EventBus, ListenerId};
use super::{Event, EventKind, FiredEvent};
use std::cell::RefCell;
use std::rc::Rc;

/// A subscriber's reaction to dispatched events.
///
/// Implementations must not panic their way out of `on_event`: a failure in
/// one handler is reported (logged), never allowed to starve the remaining
/// listeners of the same fan-out.
pub trait EventHandler {
    /// Invoked by the bus for every event the owning listener is subscribed
    /// to, while the listener is enabled and the event is still active.
    fn on_event(&mut self, event: &FiredEvent<'_>);
}

/// A registration of one [`EventHandler`] with one [`EventBus`].
///
/// The bus association is fixed at construction and immutable for the
/// listener's whole lifetime. Subscriptions are per event kind and
/// idempotent; the enabled flag gates dispatch without touching them.
///
/// Dropping the listener unsubscribes it from every category, so the bus can
/// never dispatch into freed state.
pub struct EventListener {
    bus: EventBus,
    id: ListenerId,
}

impl EventListener {
    /// Registers `handler` with `bus`.
    ///
    /// The bus keeps only a weak reference; the caller retains ownership of
    /// the handler and typically stores this listener next to it.
    pub fn new(bus: &EventBus, handler: &Rc<RefCell<dyn EventHandler>>, enabled: bool) -> Self {
        let id = bus.register(Rc::downgrade(handler), enabled);
        Self {
            bus: bus.clone(),
            id,
        }
    }

    /// The bus this listener is bound to.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub(crate) fn id(&self) -> ListenerId {
        self.id
    }

    /// Subscribes to events of type `E`. Returns `false` when already
    /// subscribed.
    pub fn subscribe<E: Event>(&self) -> bool {
        self.subscribe_kind(EventKind::of::<E>())
    }

    /// Subscribes to events of the given kind. Returns `false` when already
    /// subscribed.
    pub fn subscribe_kind(&self, kind: EventKind) -> bool {
        self.bus.subscribe_id(kind, self.id)
    }

    /// Unsubscribes from events of type `E`. A no-op when not subscribed.
    pub fn unsubscribe<E: Event>(&self) {
        self.unsubscribe_kind(EventKind::of::<E>());
    }

    /// Unsubscribes from events of the given kind. A no-op when not
    /// subscribed.
    pub fn unsubscribe_kind(&self, kind: EventKind) {
        self.bus.unsubscribe_id(kind, self.id);
    }

    /// Removes this listener from every category of its bus, however the
    /// subscriptions were added.
    pub fn unsubscribe_all(&self) {
        self.bus.unsubscribe_all_id(self.id);
    }

    /// Toggles dispatch eligibility without altering subscriptions.
    pub fn set_enabled(&self, value: bool) {
        self.bus.set_enabled(self.id, value);
    }

    /// Whether this listener currently receives dispatches.
    pub fn is_enabled(&self) -> bool {
        self.bus.is_enabled(self.id)
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.bus.unregister(self.id);
    }
}
