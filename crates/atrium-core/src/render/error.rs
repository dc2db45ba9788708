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

//! Error types for the render-device subsystem.

use std::fmt;

/// An error from render object creation, lookup, or use.
///
/// Malformed specs are configuration errors reported here, never panics;
/// every factory call returns a `Result` that the caller must check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A factory was handed a spec it refuses to construct from.
    InvalidSpec {
        /// The object category being created.
        category: &'static str,
        /// What was wrong with the spec.
        details: String,
    },
    /// A handle whose slot has been destroyed (or reused) was passed in.
    StaleHandle {
        /// The category of the offending handle.
        category: &'static str,
    },
    /// A stateful call needed an active context but none is set.
    NoActiveContext,
    /// A program operation required a linked program.
    ProgramNotLinked,
    /// The concrete backend rejected the operation.
    BackendFailure(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::InvalidSpec { category, details } => {
                write!(f, "invalid {category} spec: {details}")
            }
            ResourceError::StaleHandle { category } => {
                write!(f, "stale {category} handle (object was destroyed)")
            }
            ResourceError::NoActiveContext => {
                write!(f, "no active render context")
            }
            ResourceError::ProgramNotLinked => {
                write!(f, "program has not been linked")
            }
            ResourceError::BackendFailure(details) => {
                write!(f, "render backend failure: {details}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}
