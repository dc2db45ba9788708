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

//! Generational handles and the arenas that back every render object
//! category.
//!
//! The device is the owner-of-record for all render objects; callers hold
//! typed [`Handle`]s into its arenas. A handle embeds the slot's generation,
//! so use-after-destroy is detected and reported instead of being undefined
//! behavior.

use std::fmt;
use std::marker::PhantomData;

/// Marker for render context handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderContextTag {}
/// Marker for vertex array handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexArrayTag {}
/// Marker for vertex buffer handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexBufferTag {}
/// Marker for index buffer handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexBufferTag {}
/// Marker for 2D texture handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Texture2dTag {}
/// Marker for framebuffer handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTag {}
/// Marker for program handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramTag {}
/// Marker for shader handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderTag {}

/// A typed, generational index into one of the device's arenas.
///
/// Copyable and cheap; holding one does not keep the object alive. A handle
/// whose slot has been reused (generation mismatch) resolves to a stale-handle
/// error, never to another object.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// The slot index within the arena.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation the slot had when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32 },
}

/// A slot-map arena owning all objects of one category.
///
/// Freed slots are reused with a bumped generation, which is what invalidates
/// outstanding handles to the old occupant.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `value` and returns the handle for it.
    pub fn insert<Tag>(&mut self, value: T) -> Handle<Tag> {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let generation = match slot {
                Slot::Vacant { generation } => *generation,
                Slot::Occupied { .. } => unreachable!("free list pointed at an occupied slot"),
            };
            *slot = Slot::Occupied { generation, value };
            Handle::new(index, generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot::Occupied {
                generation: 0,
                value,
            });
            Handle::new(index, 0)
        }
    }

    /// Resolves a handle to a shared reference, or `None` when stale.
    pub fn get<Tag>(&self, handle: Handle<Tag>) -> Option<&T> {
        match self.slots.get(handle.index() as usize) {
            Some(Slot::Occupied { generation, value }) if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Resolves a handle to a mutable reference, or `None` when stale.
    pub fn get_mut<Tag>(&mut self, handle: Handle<Tag>) -> Option<&mut T> {
        match self.slots.get_mut(handle.index() as usize) {
            Some(Slot::Occupied { generation, value }) if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Whether `handle` still points at a live object.
    pub fn contains<Tag>(&self, handle: Handle<Tag>) -> bool {
        self.get(handle).is_some()
    }

    /// Removes the object behind `handle`, returning it. Stale handles yield
    /// `None` and leave the arena untouched.
    pub fn remove<Tag>(&mut self, handle: Handle<Tag>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == handle.generation() => {
                let next_generation = generation.wrapping_add(1);
                let old = std::mem::replace(
                    slot,
                    Slot::Vacant {
                        generation: next_generation,
                    },
                );
                self.free.push(handle.index());
                self.len -= 1;
                match old {
                    Slot::Occupied { value, .. } => Some(value),
                    Slot::Vacant { .. } => unreachable!(),
                }
            }
            _ => None,
        }
    }

    /// Enumerates the handles of every live object, in slot order.
    ///
    /// This is the weak enumeration list: iterating does not extend any
    /// object's lifetime, it simply reflects what is registered right now.
    pub fn handles<Tag>(&self) -> Vec<Handle<Tag>> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { generation, .. } => {
                    Some(Handle::new(index as u32, *generation))
                }
                Slot::Vacant { .. } => None,
            })
            .collect()
    }

    /// Iterates shared references to every live object.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Vacant { .. } => None,
        })
    }

    /// Removes every live object, invoking `f` on each.
    pub fn drain_with(&mut self, mut f: impl FnMut(T)) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if matches!(slot, Slot::Occupied { .. }) {
                let generation = match slot {
                    Slot::Occupied { generation, .. } => *generation,
                    Slot::Vacant { .. } => unreachable!(),
                };
                let old = std::mem::replace(
                    slot,
                    Slot::Vacant {
                        generation: generation.wrapping_add(1),
                    },
                );
                self.free.push(index as u32);
                self.len -= 1;
                if let Slot::Occupied { value, .. } = old {
                    f(value);
                }
            }
        }
    }
}
