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

use atrium_core::platform::{Window, WindowInput, WindowSettings};
use std::collections::VecDeque;

/// A window with no display behind it.
///
/// Input is whatever the owner scripts in through [`push_input`]; an
/// optional frame budget closes the window after a fixed number of
/// `swap_buffers` calls, which gives batch runs a bounded frame loop.
///
/// [`push_input`]: HeadlessWindow::push_input
pub struct HeadlessWindow {
    settings: WindowSettings,
    size: [u32; 2],
    open: bool,
    queued: VecDeque<WindowInput>,
    frames_presented: u64,
    frame_budget: Option<u64>,
}

impl HeadlessWindow {
    pub fn open(settings: &WindowSettings) -> Self {
        log::info!(
            "headless window \"{}\" ({}x{})",
            settings.title,
            settings.video.size[0],
            settings.video.size[1]
        );
        Self {
            settings: settings.clone(),
            size: settings.video.size,
            open: true,
            queued: VecDeque::new(),
            frames_presented: 0,
            frame_budget: None,
        }
    }

    /// Closes the window automatically once `frames` buffers have been
    /// swapped.
    pub fn with_frame_budget(mut self, frames: u64) -> Self {
        self.frame_budget = Some(frames);
        self
    }

    /// Scripts an input unit; it is delivered by the next `poll_events`.
    pub fn push_input(&mut self, input: WindowInput) {
        if let WindowInput::Resized { width, height } = input {
            self.size = [width, height];
        }
        self.queued.push_back(input);
    }

    /// Frames presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Window for HeadlessWindow {
    fn settings(&self) -> &WindowSettings {
        &self.settings
    }

    fn size(&self) -> [u32; 2] {
        self.size
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn request_close(&mut self) {
        self.open = false;
    }

    fn poll_events(&mut self) -> Vec<WindowInput> {
        let drained: Vec<WindowInput> = self.queued.drain(..).collect();
        if drained
            .iter()
            .any(|input| matches!(input, WindowInput::CloseRequested))
        {
            self.open = false;
        }
        drained
    }

    fn swap_buffers(&mut self) {
        self.frames_presented += 1;
        if let Some(budget) = self.frame_budget {
            if self.frames_presented >= budget {
                log::debug!("frame budget of {budget} reached, closing window");
                self.open = false;
            }
        }
    }

    fn set_title(&mut self, title: &str) {
        self.settings.title = title.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_input_is_drained_in_order() {
        let mut window = HeadlessWindow::open(&WindowSettings::default());
        window.push_input(WindowInput::Char('a'));
        window.push_input(WindowInput::Char('b'));
        assert_eq!(
            window.poll_events(),
            vec![WindowInput::Char('a'), WindowInput::Char('b')]
        );
        assert!(window.poll_events().is_empty());
    }

    #[test]
    fn close_request_in_the_queue_closes_the_window() {
        let mut window = HeadlessWindow::open(&WindowSettings::default());
        window.push_input(WindowInput::CloseRequested);
        assert!(window.is_open());
        window.poll_events();
        assert!(!window.is_open());
    }

    #[test]
    fn resize_input_updates_the_reported_size() {
        let mut window = HeadlessWindow::open(&WindowSettings::default());
        window.push_input(WindowInput::Resized {
            width: 640,
            height: 480,
        });
        window.poll_events();
        assert_eq!(window.size(), [640, 480]);
    }

    #[test]
    fn frame_budget_bounds_the_loop() {
        let mut window = HeadlessWindow::open(&WindowSettings::default()).with_frame_budget(3);
        let mut frames = 0;
        while window.is_open() {
            window.poll_events();
            window.swap_buffers();
            frames += 1;
            assert!(frames <= 3);
        }
        assert_eq!(window.frames_presented(), 3);
    }
}
