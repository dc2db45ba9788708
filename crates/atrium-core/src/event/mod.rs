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

//! Typed, consumable events and their publish/subscribe machinery.
//!
//! An [`Event`] is a plain value type tagged with a stable [`EventKind`].
//! Firing one wraps it in a [`FiredEvent`] envelope that lives exactly as
//! long as the dispatch call and carries the one-shot `consumed` flag.
//!
//! The subsystem is deliberately single-threaded and synchronous: events are
//! fired on the frame loop thread, fanned out immediately, and never queued.

mod bus;
mod listener;

pub use bus::{EventBus, ListenerId};
pub use listener::{EventHandler, EventListener};

use std::any::Any;
use std::cell::Cell;
use std::fmt;

/// Stable identity of an event kind.
///
/// Derived from a FNV-1a hash of the concrete type's name, so it is identical
/// for every instance of a kind and distinct across kinds, independent of
/// registration or construction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKind(u64);

impl EventKind {
    /// Returns the kind tag for the event type `E`.
    pub fn of<E: Event>() -> Self {
        Self(fnv1a(std::any::type_name::<E>().as_bytes()))
    }

    /// Returns the raw hash value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

const fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// A self-describing message broadcast through the [`EventBus`].
///
/// Implement via the [`impl_event!`](crate::impl_event) macro; the payload is
/// an ordinary struct constructed per occurrence and dropped when the `fire`
/// call returns.
pub trait Event: Any + fmt::Debug {
    /// The stable kind tag of this event's concrete type.
    fn kind(&self) -> EventKind;

    /// Upcast for payload downcasting inside handlers.
    fn as_any(&self) -> &dyn Any;
}

/// Implements [`Event`] for one or more plain payload types.
///
/// ```
/// use atrium_core::impl_event;
///
/// #[derive(Debug)]
/// struct Ping { pub seq: u32 }
/// impl_event!(Ping);
/// ```
#[macro_export]
macro_rules! impl_event {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::event::Event for $ty {
            fn kind(&self) -> $crate::event::EventKind {
                $crate::event::EventKind::of::<$ty>()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    )+};
}

/// The envelope handed to listeners during one `fire` call.
///
/// Borrows the payload and owns the `consumed` flag; once any listener
/// consumes the event, listeners later in the same fan-out never see it.
pub struct FiredEvent<'a> {
    payload: &'a dyn Event,
    consumed: Cell<bool>,
}

impl<'a> FiredEvent<'a> {
    /// Wraps a payload for dispatch. Fired events start out active.
    pub fn new(payload: &'a dyn Event) -> Self {
        Self {
            payload,
            consumed: Cell::new(false),
        }
    }

    /// The kind tag of the wrapped payload.
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Marks the event consumed.
    ///
    /// Returns `true` exactly once, on the first call; a `true` result means
    /// the caller is the one that stopped further propagation.
    pub fn consume(&self) -> bool {
        !self.consumed.replace(true)
    }

    /// Whether the event is still propagating.
    pub fn is_active(&self) -> bool {
        !self.consumed.get()
    }

    /// Downcasts the payload to a concrete event type.
    ///
    /// Returns `None` when the fired event is of a different kind, so a
    /// handler subscribed to several kinds can probe cheaply.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.payload.as_any().downcast_ref::<E>()
    }
}

impl fmt::Debug for FiredEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiredEvent")
            .field("payload", &self.payload)
            .field("consumed", &self.consumed.get())
            .finish()
    }
}
