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

//! Script interpretation seam.

use std::fmt;
use std::path::Path;

/// Errors raised while running a script.
#[derive(Debug)]
pub enum ScriptError {
    /// The script file could not be read.
    Io(std::io::Error),
    /// The interpreter rejected the script.
    Evaluation(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "script could not be read: {err}"),
            Self::Evaluation(details) => write!(f, "script evaluation failed: {details}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Evaluation(_) => None,
        }
    }
}

impl From<std::io::Error> for ScriptError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// An interpreter the runtime feeds startup scripts to.
pub trait ScriptInterpreter {
    /// Evaluates a script from source text.
    fn eval(&mut self, source: &str) -> Result<(), ScriptError>;

    /// Reads a script file and evaluates it.
    fn run_file(&mut self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path)?;
        self.eval(&source)
    }
}
