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

//! A full assembly the way the launcher does it: preferences, headless
//! collaborators, a registered plugin, and the gui frame loop.

use atrium_core::platform::WindowSettings;
use atrium_core::render::{clear, ContextSettings, RenderDevice};
use atrium_core::{EventHandler, EventListener, FiredEvent};
use atrium_infra::{EchoInterpreter, HeadlessBackend, HeadlessWindow};
use atrium_runtime::events::RenderEvent;
use atrium_runtime::{
    CoreApplication, GuiApplication, Plugin, PluginManager, PluginRegistration, Preferences,
    RuntimeContext,
};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

thread_local! {
    static FRAMES_DRAWN: Cell<u64> = const { Cell::new(0) };
}

/// A plugin that clears and draws through the shared device on every render
/// phase, the way the in-tree sandbox plugin does.
struct DrawingPlugin {
    ctx: RuntimeContext,
    _listener: Option<EventListener>,
}

impl EventHandler for DrawingPlugin {
    fn on_event(&mut self, event: &FiredEvent<'_>) {
        if event.downcast_ref::<RenderEvent>().is_none() {
            return;
        }
        let mut device = self.ctx.device().borrow_mut();
        if device.clear(clear::ALL).is_ok() {
            FRAMES_DRAWN.with(|count| count.set(count.get() + 1));
        }
    }
}

impl Plugin for DrawingPlugin {
    fn name(&self) -> &str {
        "drawing"
    }
}

fn construct_drawing(ctx: &RuntimeContext) -> Rc<RefCell<dyn Plugin>> {
    let plugin = Rc::new(RefCell::new(DrawingPlugin {
        ctx: ctx.clone(),
        _listener: None,
    }));
    let handler: Rc<RefCell<dyn EventHandler>> = plugin.clone();
    let listener = EventListener::new(ctx.bus(), &handler, true);
    listener.subscribe::<RenderEvent>();
    plugin.borrow_mut()._listener = Some(listener);
    plugin
}

inventory::submit! {
    PluginRegistration {
        path: "drawing",
        name: "Drawing",
        construct: construct_drawing,
    }
}

fn assemble(frame_budget: u64) -> RuntimeContext {
    let preferences = Preferences::default();
    let window = HeadlessWindow::open(&WindowSettings::default()).with_frame_budget(frame_budget);
    let device = RenderDevice::new(Box::new(HeadlessBackend::new()));
    RuntimeContext::new(
        preferences,
        Rc::new(RefCell::new(window)),
        Rc::new(RefCell::new(device)),
        Rc::new(RefCell::new(EchoInterpreter::new())),
    )
}

#[test]
fn plugin_draws_once_per_frame_until_the_window_closes() {
    let ctx = assemble(4);

    // The plugin needs an active context to draw into.
    {
        let mut device = ctx.device().borrow_mut();
        let context = device.new_context(&ContextSettings::default()).unwrap();
        device.set_active_context(Some(context)).unwrap();
    }

    let mut manager = PluginManager::new(&ctx);
    manager.install(Path::new("drawing")).unwrap();
    assert_eq!(manager.plugins().len(), 1);

    let before = FRAMES_DRAWN.with(|count| count.get());
    let core = CoreApplication::new("frame-loop-test", ctx.clone()).with_arguments(vec![]);
    let mut app = GuiApplication::new(core);
    let code = app.run_until_closed();

    assert_eq!(code, 0);
    assert_eq!(app.frame_index(), 4);
    assert_eq!(FRAMES_DRAWN.with(|count| count.get()), before + 4);

    let clears = ctx
        .device()
        .borrow()
        .backend()
        .as_any()
        .downcast_ref::<HeadlessBackend>()
        .map(|backend| backend.counters().clears)
        .unwrap();
    assert_eq!(clears, 4);
}

#[test]
fn uninstalled_plugin_stops_drawing() {
    let ctx = assemble(2);
    {
        let mut device = ctx.device().borrow_mut();
        let context = device.new_context(&ContextSettings::default()).unwrap();
        device.set_active_context(Some(context)).unwrap();
    }

    let mut manager = PluginManager::new(&ctx);
    let id = manager.install(Path::new("drawing")).unwrap();
    manager.uninstall(id).unwrap();
    assert!(manager.is_empty());

    let before = FRAMES_DRAWN.with(|count| count.get());
    let core = CoreApplication::new("frame-loop-test", ctx).with_arguments(vec![]);
    GuiApplication::new(core).run_until_closed();
    assert_eq!(FRAMES_DRAWN.with(|count| count.get()), before);
}
