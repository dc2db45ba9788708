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

//! # Atrium Runtime
//!
//! The application layer over `atrium-core`: lifecycle and window event
//! types, the runtime context threaded through every subsystem, the plugin
//! manager, preference loading, and the core/gui application frame loop.

pub mod application;
pub mod config;
pub mod context;
pub mod events;
pub mod plugin;

pub use application::{CoreApplication, GuiApplication};
pub use config::Preferences;
pub use context::RuntimeContext;
pub use plugin::{Plugin, PluginError, PluginId, PluginInfo, PluginManager, PluginRegistration};
