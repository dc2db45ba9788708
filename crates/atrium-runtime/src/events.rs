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

//! The event vocabulary of the runtime.
//!
//! Three families: lifecycle events framing the application run, per-frame
//! phase events fired by the gui frame loop, and window events translated
//! from [`WindowInput`] by [`translate_window_events`].

use atrium_core::impl_event;
use atrium_core::platform::{InputAction, Window, WindowInput};
use atrium_core::EventBus;
use std::path::PathBuf;

// --- lifecycle ------------------------------------------------------------

/// Fired once, before the first frame.
#[derive(Debug, Default)]
pub struct EnterEvent;

/// Fired every frame before the phase events.
#[derive(Debug)]
pub struct IdleEvent {
    pub frame: u64,
    pub delta_seconds: f64,
}

/// Fired once, after the last frame.
#[derive(Debug)]
pub struct ExitEvent {
    pub code: i32,
}

// --- frame phases ----------------------------------------------------------

/// Dockspace construction phase.
#[derive(Debug, Default)]
pub struct DockspaceEvent;

/// Menubar construction phase.
#[derive(Debug, Default)]
pub struct MenubarEvent;

/// Main render phase.
#[derive(Debug)]
pub struct RenderEvent {
    pub frame: u64,
}

/// Overlay/gizmos phase, after the main render.
#[derive(Debug, Default)]
pub struct GizmosEvent;

// --- window ----------------------------------------------------------------

#[derive(Debug)]
pub struct KeyEvent {
    pub key: i32,
    pub scancode: i32,
    pub action: InputAction,
    pub mods: u32,
}

#[derive(Debug)]
pub struct CharEvent {
    pub character: char,
}

#[derive(Debug)]
pub struct CursorPosEvent {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug)]
pub struct MouseButtonEvent {
    pub button: u32,
    pub action: InputAction,
    pub mods: u32,
}

#[derive(Debug)]
pub struct ScrollEvent {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug)]
pub struct ResizeEvent {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
pub struct FocusEvent {
    pub focused: bool,
}

#[derive(Debug)]
pub struct IconifyEvent {
    pub iconified: bool,
}

#[derive(Debug)]
pub struct DropEvent {
    pub paths: Vec<PathBuf>,
}

/// The window asked to close.
#[derive(Debug, Default)]
pub struct CloseEvent;

impl_event!(
    EnterEvent,
    IdleEvent,
    ExitEvent,
    DockspaceEvent,
    MenubarEvent,
    RenderEvent,
    GizmosEvent,
    KeyEvent,
    CharEvent,
    CursorPosEvent,
    MouseButtonEvent,
    ScrollEvent,
    ResizeEvent,
    FocusEvent,
    IconifyEvent,
    DropEvent,
    CloseEvent,
);

/// Drains the window's pending input and fires one bus event per unit, in
/// arrival order. Returns the number of inputs translated.
pub fn translate_window_events(window: &mut dyn Window, bus: &EventBus) -> usize {
    let inputs = window.poll_events();
    let count = inputs.len();
    for input in inputs {
        match input {
            WindowInput::Key {
                key,
                scancode,
                action,
                mods,
            } => bus.fire(&KeyEvent {
                key,
                scancode,
                action,
                mods,
            }),
            WindowInput::Char(character) => bus.fire(&CharEvent { character }),
            WindowInput::CursorPos { x, y } => bus.fire(&CursorPosEvent { x, y }),
            WindowInput::MouseButton {
                button,
                action,
                mods,
            } => bus.fire(&MouseButtonEvent {
                button,
                action,
                mods,
            }),
            WindowInput::Scroll { x, y } => bus.fire(&ScrollEvent { x, y }),
            WindowInput::Resized { width, height } => bus.fire(&ResizeEvent { width, height }),
            WindowInput::Focus(focused) => bus.fire(&FocusEvent { focused }),
            WindowInput::Iconify(iconified) => bus.fire(&IconifyEvent { iconified }),
            WindowInput::FileDrop(paths) => bus.fire(&DropEvent { paths }),
            WindowInput::CloseRequested => bus.fire(&CloseEvent),
        }
    }
    count
}
