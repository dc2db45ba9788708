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

//! # Atrium Infra
//!
//! Concrete implementations of the seams `atrium-core` leaves abstract. The
//! headless family backs the engine with pure in-memory state, which is what
//! the launcher uses when no display is available and what the runtime test
//! suites drive their frame loops with.

pub mod headless;

pub use headless::{EchoInterpreter, HeadlessBackend, HeadlessWindow};
