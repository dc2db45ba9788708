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

use atrium_core::script::{ScriptError, ScriptInterpreter};

/// An interpreter that logs each non-empty line instead of executing it.
///
/// Lines starting with `#` are comments. A line reading exactly `fail` makes
/// evaluation error, which is how the runtime's script error paths get
/// exercised without a real language runtime.
#[derive(Debug, Default)]
pub struct EchoInterpreter {
    lines_seen: u64,
}

impl EchoInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-comment lines evaluated so far.
    pub fn lines_seen(&self) -> u64 {
        self.lines_seen
    }
}

impl ScriptInterpreter for EchoInterpreter {
    fn eval(&mut self, source: &str) -> Result<(), ScriptError> {
        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line == "fail" {
                return Err(ScriptError::Evaluation(
                    "script asked for failure".to_string(),
                ));
            }
            self.lines_seen += 1;
            log::info!("script: {line}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blanks_are_skipped() {
        let mut interp = EchoInterpreter::new();
        interp.eval("# header\n\nhello\nworld\n").unwrap();
        assert_eq!(interp.lines_seen(), 2);
    }

    #[test]
    fn fail_line_raises_an_evaluation_error() {
        let mut interp = EchoInterpreter::new();
        assert!(matches!(
            interp.eval("ok\nfail\nnever"),
            Err(ScriptError::Evaluation(_))
        ));
    }
}
