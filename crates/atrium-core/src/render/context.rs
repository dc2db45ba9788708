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

//! Per-context render state: what is bound, and how the pipeline is
//! configured.

use super::handle::{
    FramebufferTag, Handle, IndexBufferTag, ProgramTag, ShaderTag, Texture2dTag, VertexArrayTag,
    VertexBufferTag,
};
use std::collections::HashMap;

/// Fixed-function pipeline state carried by one context.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// RGBA clear color.
    pub clear_color: [f32; 4],
    /// Viewport rectangle: x, y, width, height.
    pub viewport: [i32; 4],
    /// Alpha testing.
    pub alpha_enabled: bool,
    /// Blending.
    pub blend_enabled: bool,
    /// Back-face culling.
    pub cull_enabled: bool,
    /// Depth testing.
    pub depth_enabled: bool,
    /// Stencil testing.
    pub stencil_enabled: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            viewport: [0, 0, 0, 0],
            alpha_enabled: false,
            blend_enabled: false,
            cull_enabled: false,
            depth_enabled: true,
            stencil_enabled: false,
        }
    }
}

/// What one context currently has bound, one slot per category plus the
/// per-slot texture table.
///
/// Unbinding (`None`) when nothing is bound is not an error; the slot simply
/// stays clear.
#[derive(Debug, Default)]
pub struct ContextBindings {
    /// Bound vertex array.
    pub vertexarray: Option<Handle<VertexArrayTag>>,
    /// Bound vertex buffer.
    pub vertexbuffer: Option<Handle<VertexBufferTag>>,
    /// Bound index buffer.
    pub indexbuffer: Option<Handle<IndexBufferTag>>,
    /// Bound framebuffer; `None` means the default framebuffer.
    pub framebuffer: Option<Handle<FramebufferTag>>,
    /// Bound program.
    pub program: Option<Handle<ProgramTag>>,
    /// Bound standalone shader.
    pub shader: Option<Handle<ShaderTag>>,
    /// Texture bound per slot; cleared slots are removed from the table.
    pub texture_slots: HashMap<u32, Handle<Texture2dTag>>,
}

impl ContextBindings {
    /// The texture tracked for `slot`, if any.
    pub fn texture(&self, slot: u32) -> Option<Handle<Texture2dTag>> {
        self.texture_slots.get(&slot).copied()
    }
}
