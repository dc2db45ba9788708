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

//! The narrow boundary to a concrete graphics API.
//!
//! [`RenderDevice`](super::RenderDevice) owns all object bookkeeping —
//! arenas, the active context, binding state, uniform caches — and calls
//! down through this trait for the operations only a real API can perform.
//! A backend never sees handles, only its own opaque [`BackendId`]s.

use super::spec::{
    ContextSettings, FramebufferSpec, Primitive, ProgramSpec, ShaderSpec, ShaderStage,
    Texture2dSpec, VertexArraySpec,
};
use super::uniform::{UniformId, UniformValue};
use super::ResourceError;
use std::fmt;

/// Opaque backend-side identity of one render object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendId(pub u64);

/// The binding categories a context tracks (textures bind per slot and are
/// notified separately).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindTarget {
    /// Vertex array binding.
    VertexArray,
    /// Vertex buffer binding.
    VertexBuffer,
    /// Index buffer binding.
    IndexBuffer,
    /// Framebuffer binding.
    Framebuffer,
    /// Program binding.
    Program,
    /// Standalone shader binding.
    Shader,
}

/// Buffer categories, for backends that allocate them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Vertex data.
    Vertex,
    /// Index data.
    Index,
}

/// Implemented once per graphics API (OpenGL, a test double, ...).
///
/// All calls are main-thread-only, matching the single-threaded contract of
/// the device that drives them.
pub trait RenderBackend: fmt::Debug + std::any::Any {
    /// Concrete-type escape hatch for diagnostics and tests.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Creates a backend context object.
    fn create_context(&mut self, settings: &ContextSettings) -> Result<BackendId, ResourceError>;

    /// Creates a vertex array object.
    fn create_vertexarray(&mut self, spec: &VertexArraySpec) -> Result<BackendId, ResourceError>;

    /// Creates a buffer and uploads `data`.
    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> Result<BackendId, ResourceError>;

    /// Re-uploads a region of a buffer.
    fn update_buffer(
        &mut self,
        id: BackendId,
        offset: usize,
        data: &[u8],
    ) -> Result<(), ResourceError>;

    /// Creates a 2D texture; `data` is the initial pixel upload, if any.
    fn create_texture2d(
        &mut self,
        spec: &Texture2dSpec,
        data: Option<&[u8]>,
    ) -> Result<BackendId, ResourceError>;

    /// Creates a framebuffer object (attachments are bound by the device).
    fn create_framebuffer(&mut self, spec: &FramebufferSpec) -> Result<BackendId, ResourceError>;

    /// Creates an empty program object.
    fn create_program(&mut self, spec: &ProgramSpec) -> Result<BackendId, ResourceError>;

    /// Compiles a standalone shader object.
    fn create_shader(&mut self, spec: &ShaderSpec) -> Result<BackendId, ResourceError>;

    /// Attaches stage source to a program; compile errors come back as
    /// [`ResourceError::BackendFailure`].
    fn attach_source(
        &mut self,
        program: BackendId,
        stage: ShaderStage,
        source: &str,
    ) -> Result<(), ResourceError>;

    /// Links a program; returns the info log.
    fn link_program(&mut self, program: BackendId) -> Result<String, ResourceError>;

    /// Releases a backend object. Must tolerate ids already destroyed.
    fn destroy(&mut self, id: BackendId);

    /// Re-validation hook: `false` means the backend object is stale (for
    /// example after a context loss) and must be recreated by the caller.
    fn revalue(&mut self, id: BackendId) -> bool;

    /// Binding notification; `None` unbinds the category.
    fn bind(&mut self, target: BindTarget, id: Option<BackendId>);

    /// Texture binding notification for one slot; `None` clears the slot.
    fn bind_texture(&mut self, id: Option<BackendId>, slot: u32);

    /// Uploads a uniform value to a linked program.
    fn upload_uniform(
        &mut self,
        program: BackendId,
        location: UniformId,
        value: &UniformValue,
    ) -> Result<(), ResourceError>;

    /// Clears the bound framebuffer; `mask` is a [`clear`](super::clear)
    /// bit combination.
    fn clear(&mut self, mask: u32);

    /// Non-indexed draw call.
    fn draw_arrays(&mut self, primitive: Primitive, first: usize, count: usize);

    /// Indexed draw call.
    fn draw_indexed(&mut self, primitive: Primitive, count: usize);

    /// Flushes pending work.
    fn flush(&mut self);
}

/// Clear mask bits, combinable with `|`.
pub mod clear {
    /// Clear the color buffer.
    pub const COLOR: u32 = 1 << 0;
    /// Clear the depth buffer.
    pub const DEPTH: u32 = 1 << 1;
    /// Clear the stencil buffer.
    pub const STENCIL: u32 = 1 << 2;
    /// Clear everything.
    pub const ALL: u32 = COLOR | DEPTH | STENCIL;
}
