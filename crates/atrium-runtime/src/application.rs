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

//! Core and gui applications.
//!
//! [`CoreApplication`] frames a run with `EnterEvent`/`ExitEvent` and the
//! startup scripts; [`GuiApplication`] layers the window frame loop on top,
//! firing the per-frame phase events in a fixed order.

use crate::context::RuntimeContext;
use crate::events::{
    translate_window_events, DockspaceEvent, EnterEvent, ExitEvent, GizmosEvent, IdleEvent,
    MenubarEvent, RenderEvent,
};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

/// Headless application shell: identity, attributes, exit code, and the
/// enter/exit lifecycle around the startup scripts.
pub struct CoreApplication {
    ctx: RuntimeContext,
    name: String,
    version: String,
    arguments: Vec<String>,
    attributes: Map<String, Value>,
    library_paths: Vec<PathBuf>,
    exit_code: i32,
    running: bool,
}

impl CoreApplication {
    pub fn new(name: impl Into<String>, ctx: RuntimeContext) -> Self {
        Self {
            ctx,
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            arguments: std::env::args().collect(),
            attributes: Map::new(),
            library_paths: Vec::new(),
            exit_code: 0,
            running: false,
        }
    }

    /// Replaces the argument vector (by default, the process arguments).
    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn ctx(&self) -> &RuntimeContext {
        &self.ctx
    }

    /// Free-form application attribute, JSON-valued.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    pub fn add_library_path(&mut self, path: impl Into<PathBuf>) {
        self.library_paths.push(path.into());
    }

    pub fn library_paths(&self) -> &[PathBuf] {
        &self.library_paths
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Requests an orderly stop with an exit code.
    pub fn exit(&mut self, code: i32) {
        self.exit_code = code;
        self.running = false;
    }

    /// `exit(0)`.
    pub fn quit(&mut self) {
        self.exit(0);
    }

    /// Opens the run: fires `EnterEvent` and executes the startup scripts.
    pub fn enter(&mut self) {
        log::info!("{} {} entering", self.name, self.version);
        self.running = true;
        self.ctx.bus().fire(&EnterEvent);
        self.ctx.run_startup_scripts();
    }

    /// Closes the run: fires `ExitEvent` and returns the exit code.
    pub fn leave(&mut self) -> i32 {
        self.running = false;
        self.ctx.bus().fire(&ExitEvent {
            code: self.exit_code,
        });
        log::info!("{} exiting with code {}", self.name, self.exit_code);
        self.exit_code
    }

    /// A headless run is enter then leave; there is no frame loop to hold
    /// the application open.
    pub fn exec(&mut self) -> i32 {
        self.enter();
        self.leave()
    }
}

/// How many frame deltas the rolling FPS average keeps.
const FPS_WINDOW: usize = 120;

/// Windowed application: the core shell plus the frame loop.
pub struct GuiApplication {
    core: CoreApplication,
    frame: u64,
    last_frame: Option<Instant>,
    deltas: VecDeque<f64>,
}

impl GuiApplication {
    pub fn new(core: CoreApplication) -> Self {
        Self {
            core,
            frame: 0,
            last_frame: None,
            deltas: VecDeque::with_capacity(FPS_WINDOW),
        }
    }

    pub fn core(&self) -> &CoreApplication {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut CoreApplication {
        &mut self.core
    }

    pub fn ctx(&self) -> &RuntimeContext {
        self.core.ctx()
    }

    /// Frames completed so far.
    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    /// Rolling average over the last [`FPS_WINDOW`] frames; 0.0 until a
    /// delta has been measured.
    pub fn average_fps(&self) -> f64 {
        if self.deltas.is_empty() {
            return 0.0;
        }
        let total: f64 = self.deltas.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        self.deltas.len() as f64 / total
    }

    fn measure_delta(&mut self) -> f64 {
        let now = Instant::now();
        let delta = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        if delta > 0.0 {
            if self.deltas.len() == FPS_WINDOW {
                self.deltas.pop_front();
            }
            self.deltas.push_back(delta);
        }
        delta
    }

    /// Runs exactly one frame: input translation, then the phase events in
    /// their fixed order, then presentation.
    pub fn step(&mut self) {
        let delta = self.measure_delta();
        let ctx = self.core.ctx().clone();
        {
            let mut window = ctx.window().borrow_mut();
            translate_window_events(&mut *window, ctx.bus());
        }
        ctx.bus().fire(&IdleEvent {
            frame: self.frame,
            delta_seconds: delta,
        });
        ctx.bus().fire(&DockspaceEvent);
        ctx.bus().fire(&MenubarEvent);
        ctx.bus().fire(&RenderEvent { frame: self.frame });
        ctx.bus().fire(&GizmosEvent);
        ctx.window().borrow_mut().swap_buffers();
        self.frame += 1;
    }

    fn window_open(&self) -> bool {
        self.core.ctx().window().borrow().is_open()
    }

    /// Enter, run at most `frames` frames (stopping early if the window
    /// closes or `exit` is called), leave.
    pub fn run_frames(&mut self, frames: u64) -> i32 {
        self.core.enter();
        for _ in 0..frames {
            if !self.core.is_running() || !self.window_open() {
                break;
            }
            self.step();
        }
        self.core.leave()
    }

    /// Enter, run until the window closes or `exit` is called, leave.
    pub fn run_until_closed(&mut self) -> i32 {
        self.core.enter();
        while self.core.is_running() && self.window_open() {
            self.step();
        }
        self.core.leave()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preferences;
    use atrium_core::platform::{WindowInput, WindowSettings};
    use atrium_core::render::RenderDevice;
    use atrium_core::{EventHandler, EventKind, EventListener, FiredEvent};
    use atrium_infra::{EchoInterpreter, HeadlessBackend, HeadlessWindow};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn context_with_handle(window: HeadlessWindow) -> (RuntimeContext, Rc<RefCell<HeadlessWindow>>) {
        let handle = Rc::new(RefCell::new(window));
        let ctx = RuntimeContext::new(
            Preferences::default(),
            handle.clone(),
            Rc::new(RefCell::new(RenderDevice::new(Box::new(
                HeadlessBackend::new(),
            )))),
            Rc::new(RefCell::new(EchoInterpreter::new())),
        );
        (ctx, handle)
    }

    fn context(window: HeadlessWindow) -> RuntimeContext {
        context_with_handle(window).0
    }

    #[derive(Default)]
    struct Recorder {
        kinds: Vec<EventKind>,
    }

    impl EventHandler for Recorder {
        fn on_event(&mut self, event: &FiredEvent<'_>) {
            self.kinds.push(event.kind());
        }
    }

    fn record_lifecycle(ctx: &RuntimeContext) -> (Rc<RefCell<Recorder>>, EventListener) {
        let recorder: Rc<RefCell<Recorder>> = Rc::new(RefCell::new(Recorder::default()));
        let handler: Rc<RefCell<dyn EventHandler>> = recorder.clone();
        let listener = EventListener::new(ctx.bus(), &handler, true);
        listener.subscribe::<EnterEvent>();
        listener.subscribe::<IdleEvent>();
        listener.subscribe::<DockspaceEvent>();
        listener.subscribe::<MenubarEvent>();
        listener.subscribe::<RenderEvent>();
        listener.subscribe::<GizmosEvent>();
        listener.subscribe::<ExitEvent>();
        (recorder, listener)
    }

    #[test]
    fn core_exec_frames_the_run_with_enter_and_exit() {
        let ctx = context(HeadlessWindow::open(&WindowSettings::default()));
        let (recorder, _listener) = record_lifecycle(&ctx);
        let mut app = CoreApplication::new("test", ctx).with_arguments(vec![]);
        assert_eq!(app.exec(), 0);
        assert_eq!(
            recorder.borrow().kinds,
            vec![EventKind::of::<EnterEvent>(), EventKind::of::<ExitEvent>()]
        );
        assert!(!app.is_running());
    }

    #[test]
    fn exit_code_is_carried_into_the_exit_event() {
        let ctx = context(HeadlessWindow::open(&WindowSettings::default()));

        struct ExitProbe {
            code: Option<i32>,
        }
        impl EventHandler for ExitProbe {
            fn on_event(&mut self, event: &FiredEvent<'_>) {
                if let Some(exit) = event.downcast_ref::<ExitEvent>() {
                    self.code = Some(exit.code);
                }
            }
        }
        let probe = Rc::new(RefCell::new(ExitProbe { code: None }));
        let handler: Rc<RefCell<dyn EventHandler>> = probe.clone();
        let listener = EventListener::new(ctx.bus(), &handler, true);
        listener.subscribe::<ExitEvent>();

        let mut app = CoreApplication::new("test", ctx).with_arguments(vec![]);
        app.enter();
        app.exit(3);
        assert_eq!(app.leave(), 3);
        assert_eq!(probe.borrow().code, Some(3));
    }

    #[test]
    fn gui_frames_fire_the_phases_in_order() {
        let ctx = context(HeadlessWindow::open(&WindowSettings::default()));
        let (recorder, _listener) = record_lifecycle(&ctx);
        let core = CoreApplication::new("test", ctx).with_arguments(vec![]);
        let mut app = GuiApplication::new(core);

        assert_eq!(app.run_frames(2), 0);
        assert_eq!(app.frame_index(), 2);

        let frame_phases = [
            EventKind::of::<IdleEvent>(),
            EventKind::of::<DockspaceEvent>(),
            EventKind::of::<MenubarEvent>(),
            EventKind::of::<RenderEvent>(),
            EventKind::of::<GizmosEvent>(),
        ];
        let mut expected = vec![EventKind::of::<EnterEvent>()];
        expected.extend_from_slice(&frame_phases);
        expected.extend_from_slice(&frame_phases);
        expected.push(EventKind::of::<ExitEvent>());
        assert_eq!(recorder.borrow().kinds, expected);
    }

    #[test]
    fn run_until_closed_stops_on_the_window_frame_budget() {
        let window = HeadlessWindow::open(&WindowSettings::default()).with_frame_budget(5);
        let ctx = context(window);
        let core = CoreApplication::new("test", ctx).with_arguments(vec![]);
        let mut app = GuiApplication::new(core);
        app.run_until_closed();
        assert_eq!(app.frame_index(), 5);
    }

    #[test]
    fn a_close_request_ends_the_loop_after_that_frame() {
        let (ctx, window) = context_with_handle(HeadlessWindow::open(&WindowSettings::default()));
        window.borrow_mut().push_input(WindowInput::CloseRequested);
        let core = CoreApplication::new("test", ctx).with_arguments(vec![]);
        let mut app = GuiApplication::new(core);
        app.run_until_closed();
        assert_eq!(app.frame_index(), 1);
    }

    #[test]
    fn attributes_hold_json_values() {
        let ctx = context(HeadlessWindow::open(&WindowSettings::default()));
        let mut app = CoreApplication::new("test", ctx).with_arguments(vec![]);
        app.set_attribute("workspace", serde_json::json!({"tabs": 3}));
        assert_eq!(
            app.attribute("workspace").and_then(|v| v["tabs"].as_u64()),
            Some(3)
        );
        assert!(app.attribute("missing").is_none());
    }

    #[test]
    fn average_fps_settles_after_some_frames() {
        let window = HeadlessWindow::open(&WindowSettings::default()).with_frame_budget(10);
        let ctx = context(window);
        let core = CoreApplication::new("test", ctx).with_arguments(vec![]);
        let mut app = GuiApplication::new(core);
        app.run_until_closed();
        // Headless frames are near-instant; the average just has to be a
        // finite positive number once deltas exist.
        assert!(app.average_fps() >= 0.0);
        assert!(app.average_fps().is_finite());
    }
}
