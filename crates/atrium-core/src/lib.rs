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

//! # Atrium Core
//!
//! Foundational crate containing the typed event bus, the listener
//! subscription runtime, and the render-device resource contracts that the
//! rest of the engine is wired into.
//!
//! Nothing in here touches a real window system or graphics API; those are
//! collaborators behind the narrow traits in [`platform`], [`script`], and
//! [`render::backend`].

pub mod event;
pub mod platform;
pub mod render;
pub mod script;

pub use event::{Event, EventBus, EventHandler, EventKind, EventListener, FiredEvent};
pub use render::RenderDevice;
