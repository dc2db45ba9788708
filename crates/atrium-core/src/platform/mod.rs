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

//! Windowing abstraction.
//!
//! The runtime only ever talks to [`Window`]; which windowing stack (or
//! none at all) backs it is an infrastructure decision.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Errors raised by a windowing implementation.
#[derive(Debug)]
pub enum PlatformError {
    /// The window could not be created.
    CreationFailed(String),
    /// The implementation does not support the requested operation.
    Unsupported(&'static str),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreationFailed(details) => write!(f, "window creation failed: {details}"),
            Self::Unsupported(what) => write!(f, "unsupported platform operation: {what}"),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Display mode of a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub size: [u32; 2],
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            size: [1280, 720],
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Creation-time hints a windowing stack may honor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowHints {
    pub resizable: bool,
    pub decorated: bool,
    pub visible: bool,
    pub maximized: bool,
}

impl Default for WindowHints {
    fn default() -> Self {
        Self {
            resizable: true,
            decorated: true,
            visible: true,
            maximized: false,
        }
    }
}

/// Everything needed to open a window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub video: VideoSettings,
    pub hints: WindowHints,
}

/// Press state carried by key and mouse-button input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Press,
    Release,
    Repeat,
}

/// One unit of window input, as drained by [`Window::poll_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum WindowInput {
    Key {
        key: i32,
        scancode: i32,
        action: InputAction,
        mods: u32,
    },
    Char(char),
    CursorPos {
        x: f64,
        y: f64,
    },
    MouseButton {
        button: u32,
        action: InputAction,
        mods: u32,
    },
    Scroll {
        x: f64,
        y: f64,
    },
    Resized {
        width: u32,
        height: u32,
    },
    Focus(bool),
    Iconify(bool),
    FileDrop(Vec<PathBuf>),
    CloseRequested,
}

/// A window the runtime can pump for input and present to.
pub trait Window {
    /// The settings the window was opened with.
    fn settings(&self) -> &WindowSettings;

    /// Current framebuffer size in pixels.
    fn size(&self) -> [u32; 2];

    /// `false` once the window has been closed.
    fn is_open(&self) -> bool;

    /// Asks the window to close; `is_open` turns `false` afterwards.
    fn request_close(&mut self);

    /// Drains the input accumulated since the last poll, oldest first.
    fn poll_events(&mut self) -> Vec<WindowInput>;

    /// Presents the frame.
    fn swap_buffers(&mut self);

    fn set_title(&mut self, title: &str);
}
