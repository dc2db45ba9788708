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

//! The runtime context.
//!
//! Every subsystem that needs the bus, the window, the device, or the
//! interpreter receives them through a [`RuntimeContext`] handed down from
//! the application; nothing reaches for global state.

use crate::config::Preferences;
use atrium_core::platform::Window;
use atrium_core::render::RenderDevice;
use atrium_core::script::ScriptInterpreter;
use atrium_core::EventBus;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared collaborators of one application run.
#[derive(Clone)]
pub struct RuntimeContext {
    bus: EventBus,
    preferences: Preferences,
    window: Rc<RefCell<dyn Window>>,
    device: Rc<RefCell<RenderDevice>>,
    interpreter: Rc<RefCell<dyn ScriptInterpreter>>,
}

impl RuntimeContext {
    pub fn new(
        preferences: Preferences,
        window: Rc<RefCell<dyn Window>>,
        device: Rc<RefCell<RenderDevice>>,
        interpreter: Rc<RefCell<dyn ScriptInterpreter>>,
    ) -> Self {
        Self {
            bus: EventBus::new(),
            preferences,
            window,
            device,
            interpreter,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn window(&self) -> &Rc<RefCell<dyn Window>> {
        &self.window
    }

    pub fn device(&self) -> &Rc<RefCell<RenderDevice>> {
        &self.device
    }

    pub fn interpreter(&self) -> &Rc<RefCell<dyn ScriptInterpreter>> {
        &self.interpreter
    }

    /// Runs every startup script listed in the preferences, in order. Script
    /// failures are logged and skipped; they never surface on the bus.
    /// Returns the number of scripts that ran cleanly.
    pub fn run_startup_scripts(&self) -> usize {
        let mut interpreter = self.interpreter.borrow_mut();
        let mut succeeded = 0;
        for entry in &self.preferences.scripts {
            match interpreter.run_file(&entry.path) {
                Ok(()) => succeeded += 1,
                Err(err) => {
                    log::error!("startup script {} failed: {err}", entry.path.display());
                }
            }
        }
        succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathEntry;
    use atrium_core::platform::WindowSettings;
    use atrium_infra::{EchoInterpreter, HeadlessBackend, HeadlessWindow};
    use std::path::PathBuf;

    fn context_with_scripts(scripts: Vec<PathEntry>) -> RuntimeContext {
        let preferences = Preferences {
            scripts,
            ..Default::default()
        };
        RuntimeContext::new(
            preferences,
            Rc::new(RefCell::new(HeadlessWindow::open(&WindowSettings::default()))),
            Rc::new(RefCell::new(RenderDevice::new(Box::new(
                HeadlessBackend::new(),
            )))),
            Rc::new(RefCell::new(EchoInterpreter::new())),
        )
    }

    fn scratch_script(name: &str, body: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("atrium-script-{}-{name}.ms", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn startup_scripts_run_in_order_and_failures_are_skipped() {
        let good = scratch_script("good", "say hello\n");
        let bad = scratch_script("bad", "fail\n");
        let missing = PathEntry::new("/nonexistent/atrium-startup.ms");
        let ctx = context_with_scripts(vec![
            PathEntry::new(&good),
            PathEntry::new(&bad),
            missing,
        ]);

        assert_eq!(ctx.run_startup_scripts(), 1);

        std::fs::remove_file(&good).ok();
        std::fs::remove_file(&bad).ok();
    }

    #[test]
    fn no_scripts_is_a_clean_no_op() {
        let ctx = context_with_scripts(Vec::new());
        assert_eq!(ctx.run_startup_scripts(), 0);
    }
}
