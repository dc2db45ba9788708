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

//! The sandbox plugin: an offscreen viewport.
//!
//! On enter it creates a framebuffer matching the window, on every render
//! phase it clears into it, and it follows window resizes. Mostly a worked
//! example of the plugin contract: subscribe in the constructor, react to
//! bus events, release resources on drop.

use atrium_core::render::{clear, FramebufferSpec, FramebufferTag, Handle};
use atrium_core::{EventHandler, EventListener, FiredEvent};
use atrium_runtime::events::{EnterEvent, RenderEvent, ResizeEvent};
use atrium_runtime::{Plugin, PluginRegistration, RuntimeContext};
use std::cell::RefCell;
use std::rc::Rc;

pub struct SandboxPlugin {
    ctx: RuntimeContext,
    framebuffer: Option<Handle<FramebufferTag>>,
    frames_rendered: u64,
    _listener: Option<EventListener>,
}

impl SandboxPlugin {
    /// Registry factory.
    pub fn construct(ctx: &RuntimeContext) -> Rc<RefCell<dyn Plugin>> {
        let plugin = Rc::new(RefCell::new(SandboxPlugin {
            ctx: ctx.clone(),
            framebuffer: None,
            frames_rendered: 0,
            _listener: None,
        }));
        let handler: Rc<RefCell<dyn EventHandler>> = plugin.clone();
        let listener = EventListener::new(ctx.bus(), &handler, true);
        listener.subscribe::<EnterEvent>();
        listener.subscribe::<RenderEvent>();
        listener.subscribe::<ResizeEvent>();
        plugin.borrow_mut()._listener = Some(listener);
        plugin
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn framebuffer(&self) -> Option<Handle<FramebufferTag>> {
        self.framebuffer
    }

    fn on_enter(&mut self) {
        let size = self.ctx.window().borrow().size();
        let spec = FramebufferSpec {
            size,
            ..Default::default()
        };
        match self.ctx.device().borrow_mut().new_framebuffer(&spec) {
            Ok(handle) => self.framebuffer = Some(handle),
            Err(err) => log::error!("sandbox framebuffer not created: {err}"),
        }
    }

    fn on_render(&mut self) {
        let Some(framebuffer) = self.framebuffer else {
            return;
        };
        let mut device = self.ctx.device().borrow_mut();
        let result = device
            .bind_framebuffer(Some(framebuffer))
            .and_then(|()| device.clear(clear::COLOR | clear::DEPTH))
            .and_then(|()| device.bind_framebuffer(None));
        match result {
            Ok(()) => self.frames_rendered += 1,
            Err(err) => log::warn!("sandbox render skipped: {err}"),
        }
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        let Some(framebuffer) = self.framebuffer else {
            return;
        };
        if let Err(err) = self
            .ctx
            .device()
            .borrow_mut()
            .resize_framebuffer(framebuffer, [width, height])
        {
            log::warn!("sandbox framebuffer resize failed: {err}");
        }
    }
}

impl EventHandler for SandboxPlugin {
    fn on_event(&mut self, event: &FiredEvent<'_>) {
        if event.downcast_ref::<EnterEvent>().is_some() {
            self.on_enter();
        } else if event.downcast_ref::<RenderEvent>().is_some() {
            self.on_render();
        } else if let Some(resize) = event.downcast_ref::<ResizeEvent>() {
            self.on_resize(resize.width, resize.height);
        }
    }
}

impl Plugin for SandboxPlugin {
    fn name(&self) -> &str {
        "Sandbox"
    }
}

impl Drop for SandboxPlugin {
    fn drop(&mut self) {
        if let Some(framebuffer) = self.framebuffer.take() {
            if let Err(err) = self.ctx.device().borrow_mut().destroy_framebuffer(framebuffer) {
                log::warn!("sandbox framebuffer not released: {err}");
            }
        }
    }
}

inventory::submit! {
    PluginRegistration {
        path: "sandbox",
        name: "Sandbox",
        construct: SandboxPlugin::construct,
    }
}
