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

//! Headless implementations: a render backend, a window, and a script
//! interpreter that need no display, GPU, or language runtime.

mod backend;
mod script;
mod window;

pub use backend::{HeadlessBackend, OpCounters};
pub use script::EchoInterpreter;
pub use window::HeadlessWindow;
