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

//! Render-device resource model.
//!
//! A [`RenderDevice`] is the sole factory for render objects (contexts,
//! buffers, vertex arrays, textures, framebuffers, programs, shaders). It
//! owns them in generational arenas and hands out typed [`Handle`]s; the
//! actual graphics work happens behind the narrow [`RenderBackend`] trait.

pub mod backend;
pub mod context;
pub mod device;
pub mod error;
pub mod handle;
pub mod spec;
pub mod uniform;

pub use backend::{clear, BackendId, BindTarget, BufferKind, RenderBackend};
pub use context::{ContextBindings, RenderState};
pub use device::RenderDevice;
pub use error::ResourceError;
pub use handle::{
    FramebufferTag, Handle, IndexBufferTag, ProgramTag, RenderContextTag, ShaderTag,
    Texture2dTag, VertexArrayTag, VertexBufferTag,
};
pub use spec::{
    BufferUsage, ContextApi, ContextProfile, ContextSettings, FramebufferSpec, IndexBufferSpec,
    Primitive, ProgramSpec, ShaderSpec, ShaderStage, Texture2dSpec, TextureFlags, TextureFormat,
    VertexArraySpec, VertexBufferSpec,
};
pub use uniform::{UniformId, UniformValue};
