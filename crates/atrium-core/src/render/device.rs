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

//! The render device: sole factory and owner-of-record for render objects.
//!
//! Every object lives in a device-owned arena and is referred to by a
//! generational [`Handle`]. The device tracks exactly one active context at a
//! time; all stateful bind/draw/upload calls implicitly target it. Objects
//! are created through the `new_*` factories (which validate their specs) and
//! released through the `destroy_*` calls; anything still registered when the
//! device drops is released then.

use super::backend::{clear, BackendId, BindTarget, BufferKind, RenderBackend};
use super::context::{ContextBindings, RenderState};
use super::error::ResourceError;
use super::handle::{
    Arena, FramebufferTag, Handle, IndexBufferTag, ProgramTag, RenderContextTag, ShaderTag,
    Texture2dTag, VertexArrayTag, VertexBufferTag,
};
use super::spec::{
    BufferUsage, ContextSettings, FramebufferSpec, IndexBufferSpec, Primitive, ProgramSpec,
    ShaderSpec, ShaderStage, Texture2dSpec, TextureFormat, VertexArraySpec, VertexBufferSpec,
};
use super::uniform::{UniformId, UniformValue};
use std::collections::HashMap;

struct ContextEntry {
    backend: BackendId,
    settings: ContextSettings,
    bindings: ContextBindings,
    state: RenderState,
}

struct VertexArrayEntry {
    backend: BackendId,
    spec: VertexArraySpec,
    vertices: Vec<Handle<VertexBufferTag>>,
    indices: Option<Handle<IndexBufferTag>>,
}

struct VertexBufferEntry {
    backend: BackendId,
    spec: VertexBufferSpec,
    size_bytes: usize,
}

struct IndexBufferEntry {
    backend: BackendId,
    spec: IndexBufferSpec,
    count: usize,
}

struct Texture2dEntry {
    backend: BackendId,
    spec: Texture2dSpec,
}

struct FramebufferEntry {
    backend: BackendId,
    spec: FramebufferSpec,
    color: Vec<Handle<Texture2dTag>>,
    depth: Option<Handle<Texture2dTag>>,
}

struct ProgramEntry {
    backend: BackendId,
    spec: ProgramSpec,
    sources: HashMap<ShaderStage, String>,
    linked: bool,
    info_log: String,
    uniforms: HashMap<String, UniformId>,
    next_uniform: u32,
    /// Texture uniforms cached by `set_uniform_texture`, in first-set order.
    /// Slot assignment happens in `bind_textures`.
    texture_cache: Vec<(UniformId, Handle<Texture2dTag>)>,
}

struct ShaderEntry {
    backend: BackendId,
    spec: ShaderSpec,
    uniforms: HashMap<String, UniformId>,
    next_uniform: u32,
    texture_cache: Vec<(UniformId, Handle<Texture2dTag>)>,
}

/// Factory and registry for all render objects of one graphics backend
/// instance.
pub struct RenderDevice {
    backend: Box<dyn RenderBackend>,
    contexts: Arena<ContextEntry>,
    vertexarrays: Arena<VertexArrayEntry>,
    vertexbuffers: Arena<VertexBufferEntry>,
    indexbuffers: Arena<IndexBufferEntry>,
    textures: Arena<Texture2dEntry>,
    framebuffers: Arena<FramebufferEntry>,
    programs: Arena<ProgramEntry>,
    shaders: Arena<ShaderEntry>,
    active_context: Option<Handle<RenderContextTag>>,
}

impl RenderDevice {
    /// Creates a device over the given backend.
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        log::info!("render device initialized over {backend:?}");
        Self {
            backend,
            contexts: Arena::new(),
            vertexarrays: Arena::new(),
            vertexbuffers: Arena::new(),
            indexbuffers: Arena::new(),
            textures: Arena::new(),
            framebuffers: Arena::new(),
            programs: Arena::new(),
            shaders: Arena::new(),
            active_context: None,
        }
    }

    /// Access to the backend, mostly for diagnostics.
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// Total number of live render objects across all categories.
    pub fn object_count(&self) -> usize {
        self.contexts.len()
            + self.vertexarrays.len()
            + self.vertexbuffers.len()
            + self.indexbuffers.len()
            + self.textures.len()
            + self.framebuffers.len()
            + self.programs.len()
            + self.shaders.len()
    }

    // --- factories -------------------------------------------------------

    /// Creates a render context.
    pub fn new_context(
        &mut self,
        settings: &ContextSettings,
    ) -> Result<Handle<RenderContextTag>, ResourceError> {
        settings.validate()?;
        let backend = self.backend.create_context(settings)?;
        let handle = self.contexts.insert(ContextEntry {
            backend,
            settings: settings.clone(),
            bindings: ContextBindings::default(),
            state: RenderState::default(),
        });
        log::debug!("created context {handle:?}");
        Ok(handle)
    }

    /// Creates a vertex array.
    pub fn new_vertexarray(
        &mut self,
        spec: &VertexArraySpec,
    ) -> Result<Handle<VertexArrayTag>, ResourceError> {
        let backend = self.backend.create_vertexarray(spec)?;
        Ok(self.vertexarrays.insert(VertexArrayEntry {
            backend,
            spec: *spec,
            vertices: Vec::new(),
            indices: None,
        }))
    }

    /// Creates a vertex buffer holding `data`.
    pub fn new_vertexbuffer(
        &mut self,
        spec: &VertexBufferSpec,
        data: &[u8],
    ) -> Result<Handle<VertexBufferTag>, ResourceError> {
        if data.is_empty() && spec.usage == BufferUsage::Static {
            return Err(ResourceError::InvalidSpec {
                category: "vertexbuffer",
                details: "static buffer created without data".to_string(),
            });
        }
        let backend = self.backend.create_buffer(BufferKind::Vertex, data)?;
        Ok(self.vertexbuffers.insert(VertexBufferEntry {
            backend,
            spec: *spec,
            size_bytes: data.len(),
        }))
    }

    /// Creates an index buffer holding `indices`.
    pub fn new_indexbuffer(
        &mut self,
        spec: &IndexBufferSpec,
        indices: &[u32],
    ) -> Result<Handle<IndexBufferTag>, ResourceError> {
        if indices.is_empty() && spec.usage == BufferUsage::Static {
            return Err(ResourceError::InvalidSpec {
                category: "indexbuffer",
                details: "static buffer created without indices".to_string(),
            });
        }
        let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_ne_bytes()).collect();
        let backend = self.backend.create_buffer(BufferKind::Index, &bytes)?;
        Ok(self.indexbuffers.insert(IndexBufferEntry {
            backend,
            spec: *spec,
            count: indices.len(),
        }))
    }

    /// Creates a 2D texture; `data` is the optional initial pixel upload and
    /// must match the spec's dimensions when present.
    pub fn new_texture2d(
        &mut self,
        spec: &Texture2dSpec,
        data: Option<&[u8]>,
    ) -> Result<Handle<Texture2dTag>, ResourceError> {
        spec.validate()?;
        if let Some(data) = data {
            let expected = texel_bytes(spec.format)
                * spec.size[0] as usize
                * spec.size[1] as usize;
            if data.len() != expected {
                return Err(ResourceError::InvalidSpec {
                    category: "texture2d",
                    details: format!(
                        "pixel data is {} bytes, spec requires {expected}",
                        data.len()
                    ),
                });
            }
        }
        let backend = self.backend.create_texture2d(spec, data)?;
        Ok(self.textures.insert(Texture2dEntry {
            backend,
            spec: *spec,
        }))
    }

    /// Creates a framebuffer together with its color attachment and, when
    /// the spec asks for depth bits, a depth attachment. The attachments are
    /// regular device-registered textures.
    pub fn new_framebuffer(
        &mut self,
        spec: &FramebufferSpec,
    ) -> Result<Handle<FramebufferTag>, ResourceError> {
        spec.validate()?;
        let (color, depth) = self.create_attachments(spec)?;
        let backend = match self.backend.create_framebuffer(spec) {
            Ok(backend) => backend,
            Err(err) => {
                // Unwind the attachments so a failed create has no side
                // effects on the registry.
                self.destroy_texture2d(color).ok();
                if let Some(depth) = depth {
                    self.destroy_texture2d(depth).ok();
                }
                return Err(err);
            }
        };
        Ok(self.framebuffers.insert(FramebufferEntry {
            backend,
            spec: *spec,
            color: vec![color],
            depth,
        }))
    }

    /// Creates an empty program.
    pub fn new_program(&mut self, spec: &ProgramSpec) -> Result<Handle<ProgramTag>, ResourceError> {
        let backend = self.backend.create_program(spec)?;
        Ok(self.programs.insert(ProgramEntry {
            backend,
            spec: spec.clone(),
            sources: HashMap::new(),
            linked: false,
            info_log: String::new(),
            uniforms: HashMap::new(),
            next_uniform: 0,
            texture_cache: Vec::new(),
        }))
    }

    /// Compiles a standalone shader.
    pub fn new_shader(&mut self, spec: &ShaderSpec) -> Result<Handle<ShaderTag>, ResourceError> {
        spec.validate()?;
        let backend = self.backend.create_shader(spec)?;
        Ok(self.shaders.insert(ShaderEntry {
            backend,
            spec: spec.clone(),
            uniforms: HashMap::new(),
            next_uniform: 0,
            texture_cache: Vec::new(),
        }))
    }

    fn create_attachments(
        &mut self,
        spec: &FramebufferSpec,
    ) -> Result<(Handle<Texture2dTag>, Option<Handle<Texture2dTag>>), ResourceError> {
        let color = self.new_texture2d(
            &Texture2dSpec {
                size: spec.size,
                format: spec.format,
                flags: spec.flags,
            },
            None,
        )?;
        let depth = if spec.depth_bits > 0 {
            let depth_spec = Texture2dSpec {
                size: spec.size,
                format: TextureFormat::Depth24Stencil8,
                flags: spec.flags,
            };
            match self.new_texture2d(&depth_spec, None) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    self.destroy_texture2d(color).ok();
                    return Err(err);
                }
            }
        } else {
            None
        };
        Ok((color, depth))
    }

    // --- destruction -----------------------------------------------------

    /// Destroys a context. Destroying the active context clears the active
    /// slot.
    pub fn destroy_context(
        &mut self,
        handle: Handle<RenderContextTag>,
    ) -> Result<(), ResourceError> {
        let entry = self.contexts.remove(handle).ok_or(ResourceError::StaleHandle {
            category: "context",
        })?;
        if self.active_context == Some(handle) {
            self.active_context = None;
        }
        self.backend.destroy(entry.backend);
        log::debug!("destroyed context {handle:?}");
        Ok(())
    }

    /// Destroys a vertex array (not the buffers composed into it).
    pub fn destroy_vertexarray(
        &mut self,
        handle: Handle<VertexArrayTag>,
    ) -> Result<(), ResourceError> {
        let entry = self
            .vertexarrays
            .remove(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "vertexarray",
            })?;
        self.backend.destroy(entry.backend);
        Ok(())
    }

    /// Destroys a vertex buffer.
    pub fn destroy_vertexbuffer(
        &mut self,
        handle: Handle<VertexBufferTag>,
    ) -> Result<(), ResourceError> {
        let entry = self
            .vertexbuffers
            .remove(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "vertexbuffer",
            })?;
        self.backend.destroy(entry.backend);
        Ok(())
    }

    /// Destroys an index buffer.
    pub fn destroy_indexbuffer(
        &mut self,
        handle: Handle<IndexBufferTag>,
    ) -> Result<(), ResourceError> {
        let entry = self
            .indexbuffers
            .remove(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "indexbuffer",
            })?;
        self.backend.destroy(entry.backend);
        Ok(())
    }

    /// Destroys a texture.
    pub fn destroy_texture2d(
        &mut self,
        handle: Handle<Texture2dTag>,
    ) -> Result<(), ResourceError> {
        let entry = self.textures.remove(handle).ok_or(ResourceError::StaleHandle {
            category: "texture2d",
        })?;
        self.backend.destroy(entry.backend);
        Ok(())
    }

    /// Destroys a framebuffer and the attachments created with it.
    pub fn destroy_framebuffer(
        &mut self,
        handle: Handle<FramebufferTag>,
    ) -> Result<(), ResourceError> {
        let entry = self
            .framebuffers
            .remove(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "framebuffer",
            })?;
        for color in entry.color {
            self.destroy_texture2d(color).ok();
        }
        if let Some(depth) = entry.depth {
            self.destroy_texture2d(depth).ok();
        }
        self.backend.destroy(entry.backend);
        Ok(())
    }

    /// Destroys a program.
    pub fn destroy_program(&mut self, handle: Handle<ProgramTag>) -> Result<(), ResourceError> {
        let entry = self.programs.remove(handle).ok_or(ResourceError::StaleHandle {
            category: "program",
        })?;
        self.backend.destroy(entry.backend);
        Ok(())
    }

    /// Destroys a shader.
    pub fn destroy_shader(&mut self, handle: Handle<ShaderTag>) -> Result<(), ResourceError> {
        let entry = self.shaders.remove(handle).ok_or(ResourceError::StaleHandle {
            category: "shader",
        })?;
        self.backend.destroy(entry.backend);
        Ok(())
    }

    // --- enumeration -----------------------------------------------------

    /// Live context handles.
    pub fn contexts(&self) -> Vec<Handle<RenderContextTag>> {
        self.contexts.handles()
    }

    /// Live vertex array handles.
    pub fn vertexarrays(&self) -> Vec<Handle<VertexArrayTag>> {
        self.vertexarrays.handles()
    }

    /// Live vertex buffer handles.
    pub fn vertexbuffers(&self) -> Vec<Handle<VertexBufferTag>> {
        self.vertexbuffers.handles()
    }

    /// Live index buffer handles.
    pub fn indexbuffers(&self) -> Vec<Handle<IndexBufferTag>> {
        self.indexbuffers.handles()
    }

    /// Live texture handles.
    pub fn texture2ds(&self) -> Vec<Handle<Texture2dTag>> {
        self.textures.handles()
    }

    /// Live framebuffer handles.
    pub fn framebuffers(&self) -> Vec<Handle<FramebufferTag>> {
        self.framebuffers.handles()
    }

    /// Live program handles.
    pub fn programs(&self) -> Vec<Handle<ProgramTag>> {
        self.programs.handles()
    }

    /// Live shader handles.
    pub fn shaders(&self) -> Vec<Handle<ShaderTag>> {
        self.shaders.handles()
    }

    // --- active context and bind protocol --------------------------------

    /// The context stateful calls currently route through, if any.
    pub fn active_context(&self) -> Option<Handle<RenderContextTag>> {
        self.active_context
    }

    /// Replaces the active-context slot. The previous active context is left
    /// alive; destruction stays the caller's decision.
    pub fn set_active_context(
        &mut self,
        context: Option<Handle<RenderContextTag>>,
    ) -> Result<(), ResourceError> {
        if let Some(handle) = context {
            if !self.contexts.contains(handle) {
                return Err(ResourceError::StaleHandle {
                    category: "context",
                });
            }
        }
        self.active_context = context;
        Ok(())
    }

    fn active_entry(&self) -> Result<&ContextEntry, ResourceError> {
        let handle = self.active_context.ok_or(ResourceError::NoActiveContext)?;
        self.contexts
            .get(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "context",
            })
    }

    fn active_entry_mut(&mut self) -> Result<&mut ContextEntry, ResourceError> {
        let handle = self.active_context.ok_or(ResourceError::NoActiveContext)?;
        self.contexts
            .get_mut(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "context",
            })
    }

    /// The active context's creation settings.
    pub fn context_settings(&self) -> Result<&ContextSettings, ResourceError> {
        Ok(&self.active_entry()?.settings)
    }

    /// The active context's current bindings.
    pub fn context_bindings(&self) -> Result<&ContextBindings, ResourceError> {
        Ok(&self.active_entry()?.bindings)
    }

    /// The active context's pipeline state.
    pub fn render_state(&self) -> Result<&RenderState, ResourceError> {
        Ok(&self.active_entry()?.state)
    }

    /// Replaces the active context's pipeline state wholesale.
    pub fn set_render_state(&mut self, state: RenderState) -> Result<(), ResourceError> {
        self.active_entry_mut()?.state = state;
        Ok(())
    }

    /// Sets the active context's clear color.
    pub fn set_clear_color(&mut self, color: [f32; 4]) -> Result<(), ResourceError> {
        self.active_entry_mut()?.state.clear_color = color;
        Ok(())
    }

    /// Sets the active context's viewport.
    pub fn set_viewport(&mut self, viewport: [i32; 4]) -> Result<(), ResourceError> {
        self.active_entry_mut()?.state.viewport = viewport;
        Ok(())
    }

    /// Binds (or with `None`, unbinds) a vertex array on the active context.
    pub fn bind_vertexarray(
        &mut self,
        handle: Option<Handle<VertexArrayTag>>,
    ) -> Result<(), ResourceError> {
        let backend_id = match handle {
            Some(handle) => Some(
                self.vertexarrays
                    .get(handle)
                    .ok_or(ResourceError::StaleHandle {
                        category: "vertexarray",
                    })?
                    .backend,
            ),
            None => None,
        };
        self.active_entry_mut()?.bindings.vertexarray = handle;
        self.backend.bind(BindTarget::VertexArray, backend_id);
        Ok(())
    }

    /// Binds (or unbinds) a vertex buffer on the active context.
    pub fn bind_vertexbuffer(
        &mut self,
        handle: Option<Handle<VertexBufferTag>>,
    ) -> Result<(), ResourceError> {
        let backend_id = match handle {
            Some(handle) => Some(
                self.vertexbuffers
                    .get(handle)
                    .ok_or(ResourceError::StaleHandle {
                        category: "vertexbuffer",
                    })?
                    .backend,
            ),
            None => None,
        };
        self.active_entry_mut()?.bindings.vertexbuffer = handle;
        self.backend.bind(BindTarget::VertexBuffer, backend_id);
        Ok(())
    }

    /// Binds (or unbinds) an index buffer on the active context.
    pub fn bind_indexbuffer(
        &mut self,
        handle: Option<Handle<IndexBufferTag>>,
    ) -> Result<(), ResourceError> {
        let backend_id = match handle {
            Some(handle) => Some(
                self.indexbuffers
                    .get(handle)
                    .ok_or(ResourceError::StaleHandle {
                        category: "indexbuffer",
                    })?
                    .backend,
            ),
            None => None,
        };
        self.active_entry_mut()?.bindings.indexbuffer = handle;
        self.backend.bind(BindTarget::IndexBuffer, backend_id);
        Ok(())
    }

    /// Binds (or unbinds) a framebuffer on the active context. Unbinding
    /// falls back to the default framebuffer.
    pub fn bind_framebuffer(
        &mut self,
        handle: Option<Handle<FramebufferTag>>,
    ) -> Result<(), ResourceError> {
        let backend_id = match handle {
            Some(handle) => Some(
                self.framebuffers
                    .get(handle)
                    .ok_or(ResourceError::StaleHandle {
                        category: "framebuffer",
                    })?
                    .backend,
            ),
            None => None,
        };
        self.active_entry_mut()?.bindings.framebuffer = handle;
        self.backend.bind(BindTarget::Framebuffer, backend_id);
        Ok(())
    }

    /// Binds (or unbinds) a program on the active context.
    pub fn bind_program(
        &mut self,
        handle: Option<Handle<ProgramTag>>,
    ) -> Result<(), ResourceError> {
        let backend_id = match handle {
            Some(handle) => Some(
                self.programs
                    .get(handle)
                    .ok_or(ResourceError::StaleHandle {
                        category: "program",
                    })?
                    .backend,
            ),
            None => None,
        };
        self.active_entry_mut()?.bindings.program = handle;
        self.backend.bind(BindTarget::Program, backend_id);
        Ok(())
    }

    /// Binds (or unbinds) a standalone shader on the active context.
    pub fn bind_shader(&mut self, handle: Option<Handle<ShaderTag>>) -> Result<(), ResourceError> {
        let backend_id = match handle {
            Some(handle) => Some(
                self.shaders
                    .get(handle)
                    .ok_or(ResourceError::StaleHandle {
                        category: "shader",
                    })?
                    .backend,
            ),
            None => None,
        };
        self.active_entry_mut()?.bindings.shader = handle;
        self.backend.bind(BindTarget::Shader, backend_id);
        Ok(())
    }

    /// Binds (or with `None`, clears) the texture tracked for `slot` on the
    /// active context.
    pub fn bind_texture(
        &mut self,
        handle: Option<Handle<Texture2dTag>>,
        slot: u32,
    ) -> Result<(), ResourceError> {
        let backend_id = match handle {
            Some(handle) => Some(
                self.textures
                    .get(handle)
                    .ok_or(ResourceError::StaleHandle {
                        category: "texture2d",
                    })?
                    .backend,
            ),
            None => None,
        };
        let bindings = &mut self.active_entry_mut()?.bindings;
        match handle {
            Some(handle) => {
                bindings.texture_slots.insert(slot, handle);
            }
            None => {
                bindings.texture_slots.remove(&slot);
            }
        }
        self.backend.bind_texture(backend_id, slot);
        Ok(())
    }

    // --- vertex array composition ----------------------------------------

    /// Adds a vertex buffer to a vertex array.
    pub fn vertexarray_add_vertices(
        &mut self,
        array: Handle<VertexArrayTag>,
        vertices: Handle<VertexBufferTag>,
    ) -> Result<(), ResourceError> {
        if !self.vertexbuffers.contains(vertices) {
            return Err(ResourceError::StaleHandle {
                category: "vertexbuffer",
            });
        }
        let entry = self
            .vertexarrays
            .get_mut(array)
            .ok_or(ResourceError::StaleHandle {
                category: "vertexarray",
            })?;
        entry.vertices.push(vertices);
        Ok(())
    }

    /// Sets (or clears) the index buffer of a vertex array.
    pub fn vertexarray_set_indices(
        &mut self,
        array: Handle<VertexArrayTag>,
        indices: Option<Handle<IndexBufferTag>>,
    ) -> Result<(), ResourceError> {
        if let Some(indices) = indices {
            if !self.indexbuffers.contains(indices) {
                return Err(ResourceError::StaleHandle {
                    category: "indexbuffer",
                });
            }
        }
        let entry = self
            .vertexarrays
            .get_mut(array)
            .ok_or(ResourceError::StaleHandle {
                category: "vertexarray",
            })?;
        entry.indices = indices;
        Ok(())
    }

    /// The vertex buffers composed into a vertex array.
    pub fn vertexarray_vertices(
        &self,
        array: Handle<VertexArrayTag>,
    ) -> Result<&[Handle<VertexBufferTag>], ResourceError> {
        self.vertexarrays
            .get(array)
            .map(|entry| entry.vertices.as_slice())
            .ok_or(ResourceError::StaleHandle {
                category: "vertexarray",
            })
    }

    // --- buffer and texture updates --------------------------------------

    /// Re-uploads a region of a vertex buffer.
    pub fn update_vertexbuffer(
        &mut self,
        handle: Handle<VertexBufferTag>,
        offset: usize,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let entry = self
            .vertexbuffers
            .get_mut(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "vertexbuffer",
            })?;
        entry.size_bytes = entry.size_bytes.max(offset + data.len());
        self.backend.update_buffer(entry.backend, offset, data)
    }

    /// Size in bytes of a vertex buffer's contents.
    pub fn vertexbuffer_size(
        &self,
        handle: Handle<VertexBufferTag>,
    ) -> Result<usize, ResourceError> {
        self.vertexbuffers
            .get(handle)
            .map(|entry| entry.size_bytes)
            .ok_or(ResourceError::StaleHandle {
                category: "vertexbuffer",
            })
    }

    /// A vertex buffer's creation spec.
    pub fn vertexbuffer_spec(
        &self,
        handle: Handle<VertexBufferTag>,
    ) -> Result<&VertexBufferSpec, ResourceError> {
        self.vertexbuffers
            .get(handle)
            .map(|entry| &entry.spec)
            .ok_or(ResourceError::StaleHandle {
                category: "vertexbuffer",
            })
    }

    /// Number of indices in an index buffer.
    pub fn indexbuffer_count(
        &self,
        handle: Handle<IndexBufferTag>,
    ) -> Result<usize, ResourceError> {
        self.indexbuffers
            .get(handle)
            .map(|entry| entry.count)
            .ok_or(ResourceError::StaleHandle {
                category: "indexbuffer",
            })
    }

    /// An index buffer's creation spec.
    pub fn indexbuffer_spec(
        &self,
        handle: Handle<IndexBufferTag>,
    ) -> Result<&IndexBufferSpec, ResourceError> {
        self.indexbuffers
            .get(handle)
            .map(|entry| &entry.spec)
            .ok_or(ResourceError::StaleHandle {
                category: "indexbuffer",
            })
    }

    /// A texture's creation spec.
    pub fn texture2d_spec(
        &self,
        handle: Handle<Texture2dTag>,
    ) -> Result<&Texture2dSpec, ResourceError> {
        self.textures
            .get(handle)
            .map(|entry| &entry.spec)
            .ok_or(ResourceError::StaleHandle {
                category: "texture2d",
            })
    }

    // --- framebuffers -----------------------------------------------------

    /// A framebuffer's creation spec (size reflects the last resize).
    pub fn framebuffer_spec(
        &self,
        handle: Handle<FramebufferTag>,
    ) -> Result<&FramebufferSpec, ResourceError> {
        self.framebuffers
            .get(handle)
            .map(|entry| &entry.spec)
            .ok_or(ResourceError::StaleHandle {
                category: "framebuffer",
            })
    }

    /// A framebuffer's color attachments.
    pub fn framebuffer_color_attachments(
        &self,
        handle: Handle<FramebufferTag>,
    ) -> Result<&[Handle<Texture2dTag>], ResourceError> {
        self.framebuffers
            .get(handle)
            .map(|entry| entry.color.as_slice())
            .ok_or(ResourceError::StaleHandle {
                category: "framebuffer",
            })
    }

    /// A framebuffer's depth attachment, if the spec requested one.
    pub fn framebuffer_depth_attachment(
        &self,
        handle: Handle<FramebufferTag>,
    ) -> Result<Option<Handle<Texture2dTag>>, ResourceError> {
        self.framebuffers
            .get(handle)
            .map(|entry| entry.depth)
            .ok_or(ResourceError::StaleHandle {
                category: "framebuffer",
            })
    }

    /// Attaches an additional color texture. Returns `false` if it is
    /// already attached.
    pub fn framebuffer_attach(
        &mut self,
        handle: Handle<FramebufferTag>,
        texture: Handle<Texture2dTag>,
    ) -> Result<bool, ResourceError> {
        if !self.textures.contains(texture) {
            return Err(ResourceError::StaleHandle {
                category: "texture2d",
            });
        }
        let entry = self
            .framebuffers
            .get_mut(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "framebuffer",
            })?;
        if entry.color.contains(&texture) {
            return Ok(false);
        }
        entry.color.push(texture);
        Ok(true)
    }

    /// Detaches a color texture. Returns `false` if it was not attached.
    pub fn framebuffer_detach(
        &mut self,
        handle: Handle<FramebufferTag>,
        texture: Handle<Texture2dTag>,
    ) -> Result<bool, ResourceError> {
        let entry = self
            .framebuffers
            .get_mut(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "framebuffer",
            })?;
        let before = entry.color.len();
        entry.color.retain(|attached| *attached != texture);
        Ok(entry.color.len() != before)
    }

    /// Resizes a framebuffer by recreating its attachments at the new size.
    /// Attachments added through [`framebuffer_attach`](Self::framebuffer_attach)
    /// stay untouched; only the device-created ones are replaced.
    pub fn resize_framebuffer(
        &mut self,
        handle: Handle<FramebufferTag>,
        size: [u32; 2],
    ) -> Result<(), ResourceError> {
        if size[0] == 0 || size[1] == 0 {
            return Err(ResourceError::InvalidSpec {
                category: "framebuffer",
                details: format!("resize to degenerate size {}x{}", size[0], size[1]),
            });
        }
        let (old_color, old_depth, mut new_spec) = {
            let entry = self
                .framebuffers
                .get(handle)
                .ok_or(ResourceError::StaleHandle {
                    category: "framebuffer",
                })?;
            (entry.color.first().copied(), entry.depth, entry.spec)
        };
        if new_spec.size == size {
            return Ok(());
        }
        new_spec.size = size;
        let (color, depth) = self.create_attachments(&new_spec)?;
        if let Some(old) = old_color {
            self.destroy_texture2d(old).ok();
        }
        if let Some(old) = old_depth {
            self.destroy_texture2d(old).ok();
        }
        let entry = self
            .framebuffers
            .get_mut(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "framebuffer",
            })?;
        entry.spec = new_spec;
        if entry.color.is_empty() {
            entry.color.push(color);
        } else {
            entry.color[0] = color;
        }
        entry.depth = depth;
        Ok(())
    }

    // --- programs and uniforms -------------------------------------------

    /// Attaches stage source to a program, invalidating its link state.
    pub fn program_attach(
        &mut self,
        handle: Handle<ProgramTag>,
        stage: ShaderStage,
        source: &str,
    ) -> Result<(), ResourceError> {
        if source.trim().is_empty() {
            return Err(ResourceError::InvalidSpec {
                category: "program",
                details: "attached source must not be empty".to_string(),
            });
        }
        let backend_id = {
            let entry = self
                .programs
                .get_mut(handle)
                .ok_or(ResourceError::StaleHandle {
                    category: "program",
                })?;
            entry.sources.insert(stage, source.to_string());
            entry.linked = false;
            entry.backend
        };
        self.backend.attach_source(backend_id, stage, source)
    }

    /// Detaches a stage. Returns `false` if the stage had no source.
    pub fn program_detach(
        &mut self,
        handle: Handle<ProgramTag>,
        stage: ShaderStage,
    ) -> Result<bool, ResourceError> {
        let entry = self
            .programs
            .get_mut(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "program",
            })?;
        let removed = entry.sources.remove(&stage).is_some();
        if removed {
            entry.linked = false;
        }
        Ok(removed)
    }

    /// Links a program from its attached sources.
    pub fn link_program(&mut self, handle: Handle<ProgramTag>) -> Result<(), ResourceError> {
        let backend_id = {
            let entry = self
                .programs
                .get(handle)
                .ok_or(ResourceError::StaleHandle {
                    category: "program",
                })?;
            if entry.sources.is_empty() {
                return Err(ResourceError::InvalidSpec {
                    category: "program",
                    details: "link of a program with no attached sources".to_string(),
                });
            }
            entry.backend
        };
        let info_log = self.backend.link_program(backend_id)?;
        let entry = self
            .programs
            .get_mut(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "program",
            })?;
        entry.info_log = info_log;
        entry.linked = true;
        Ok(())
    }

    /// The program's last link log.
    pub fn program_info_log(&self, handle: Handle<ProgramTag>) -> Result<&str, ResourceError> {
        self.programs
            .get(handle)
            .map(|entry| entry.info_log.as_str())
            .ok_or(ResourceError::StaleHandle {
                category: "program",
            })
    }

    /// A program's creation spec.
    pub fn program_spec(&self, handle: Handle<ProgramTag>) -> Result<&ProgramSpec, ResourceError> {
        self.programs
            .get(handle)
            .map(|entry| &entry.spec)
            .ok_or(ResourceError::StaleHandle {
                category: "program",
            })
    }

    /// Resolves (interning on first use) the location of a named uniform on
    /// a linked program.
    pub fn uniform_location(
        &mut self,
        handle: Handle<ProgramTag>,
        name: &str,
    ) -> Result<UniformId, ResourceError> {
        let entry = self
            .programs
            .get_mut(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "program",
            })?;
        if !entry.linked {
            return Err(ResourceError::ProgramNotLinked);
        }
        if let Some(id) = entry.uniforms.get(name) {
            return Ok(*id);
        }
        let id = UniformId(entry.next_uniform);
        entry.next_uniform += 1;
        entry.uniforms.insert(name.to_string(), id);
        Ok(id)
    }

    /// Uploads a plain uniform value immediately through the active context.
    pub fn set_uniform(
        &mut self,
        handle: Handle<ProgramTag>,
        name: &str,
        value: UniformValue,
    ) -> Result<(), ResourceError> {
        self.active_entry()?;
        let location = self.uniform_location(handle, name)?;
        let backend_id = self
            .programs
            .get(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "program",
            })?
            .backend;
        self.backend.upload_uniform(backend_id, location, &value)
    }

    /// Caches a texture uniform instead of uploading it: the texture and its
    /// slot are resolved later, during [`bind_textures`](Self::bind_textures).
    /// Re-setting a texture uniform keeps its position in the cache order.
    pub fn set_uniform_texture(
        &mut self,
        handle: Handle<ProgramTag>,
        name: &str,
        texture: Handle<Texture2dTag>,
    ) -> Result<(), ResourceError> {
        if !self.textures.contains(texture) {
            return Err(ResourceError::StaleHandle {
                category: "texture2d",
            });
        }
        let location = self.uniform_location(handle, name)?;
        let entry = self
            .programs
            .get_mut(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "program",
            })?;
        match entry
            .texture_cache
            .iter_mut()
            .find(|(cached, _)| *cached == location)
        {
            Some((_, cached_texture)) => *cached_texture = texture,
            None => entry.texture_cache.push((location, texture)),
        }
        Ok(())
    }

    /// The deferred texture pass: binds every cached texture uniform to a
    /// slot (in cache order) and uploads the slot index to its location.
    pub fn bind_textures(&mut self, handle: Handle<ProgramTag>) -> Result<(), ResourceError> {
        self.active_entry()?;
        let (backend_id, cache) = {
            let entry = self
                .programs
                .get(handle)
                .ok_or(ResourceError::StaleHandle {
                    category: "program",
                })?;
            if !entry.linked {
                return Err(ResourceError::ProgramNotLinked);
            }
            (entry.backend, entry.texture_cache.clone())
        };
        // Validate the whole cache first so a stale entry cannot leave the
        // pass half-applied.
        for (_, texture) in &cache {
            if !self.textures.contains(*texture) {
                return Err(ResourceError::StaleHandle {
                    category: "texture2d",
                });
            }
        }
        for (slot, (location, texture)) in cache.into_iter().enumerate() {
            let slot = slot as u32;
            self.bind_texture(Some(texture), slot)?;
            self.backend
                .upload_uniform(backend_id, location, &UniformValue::Int(slot as i32))?;
        }
        Ok(())
    }

    /// Number of texture uniforms currently cached on a program.
    pub fn cached_texture_count(
        &self,
        handle: Handle<ProgramTag>,
    ) -> Result<usize, ResourceError> {
        self.programs
            .get(handle)
            .map(|entry| entry.texture_cache.len())
            .ok_or(ResourceError::StaleHandle {
                category: "program",
            })
    }

    /// A standalone shader's creation spec.
    pub fn shader_spec(&self, handle: Handle<ShaderTag>) -> Result<&ShaderSpec, ResourceError> {
        self.shaders
            .get(handle)
            .map(|entry| &entry.spec)
            .ok_or(ResourceError::StaleHandle {
                category: "shader",
            })
    }

    /// Resolves (interning on first use) a named uniform on a standalone
    /// shader.
    pub fn shader_uniform_location(
        &mut self,
        handle: Handle<ShaderTag>,
        name: &str,
    ) -> Result<UniformId, ResourceError> {
        let entry = self
            .shaders
            .get_mut(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "shader",
            })?;
        if let Some(id) = entry.uniforms.get(name) {
            return Ok(*id);
        }
        let id = UniformId(entry.next_uniform);
        entry.next_uniform += 1;
        entry.uniforms.insert(name.to_string(), id);
        Ok(id)
    }

    /// Uploads a plain uniform to a standalone shader through the active
    /// context.
    pub fn set_shader_uniform(
        &mut self,
        handle: Handle<ShaderTag>,
        name: &str,
        value: UniformValue,
    ) -> Result<(), ResourceError> {
        self.active_entry()?;
        let location = self.shader_uniform_location(handle, name)?;
        let backend_id = self
            .shaders
            .get(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "shader",
            })?
            .backend;
        self.backend.upload_uniform(backend_id, location, &value)
    }

    /// Caches a texture uniform on a standalone shader, same contract as
    /// [`set_uniform_texture`](Self::set_uniform_texture).
    pub fn set_shader_uniform_texture(
        &mut self,
        handle: Handle<ShaderTag>,
        name: &str,
        texture: Handle<Texture2dTag>,
    ) -> Result<(), ResourceError> {
        if !self.textures.contains(texture) {
            return Err(ResourceError::StaleHandle {
                category: "texture2d",
            });
        }
        let location = self.shader_uniform_location(handle, name)?;
        let entry = self
            .shaders
            .get_mut(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "shader",
            })?;
        match entry
            .texture_cache
            .iter_mut()
            .find(|(cached, _)| *cached == location)
        {
            Some((_, cached_texture)) => *cached_texture = texture,
            None => entry.texture_cache.push((location, texture)),
        }
        Ok(())
    }

    /// The deferred texture pass for a standalone shader.
    pub fn bind_shader_textures(&mut self, handle: Handle<ShaderTag>) -> Result<(), ResourceError> {
        self.active_entry()?;
        let (backend_id, cache) = {
            let entry = self
                .shaders
                .get(handle)
                .ok_or(ResourceError::StaleHandle {
                    category: "shader",
                })?;
            (entry.backend, entry.texture_cache.clone())
        };
        for (_, texture) in &cache {
            if !self.textures.contains(*texture) {
                return Err(ResourceError::StaleHandle {
                    category: "texture2d",
                });
            }
        }
        for (slot, (location, texture)) in cache.into_iter().enumerate() {
            let slot = slot as u32;
            self.bind_texture(Some(texture), slot)?;
            self.backend
                .upload_uniform(backend_id, location, &UniformValue::Int(slot as i32))?;
        }
        Ok(())
    }

    // --- revalidation ----------------------------------------------------

    /// Asks the backend to re-validate a context; `false` means it must be
    /// recreated before further use.
    pub fn revalue_context(
        &mut self,
        handle: Handle<RenderContextTag>,
    ) -> Result<bool, ResourceError> {
        let backend_id = self
            .contexts
            .get(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "context",
            })?
            .backend;
        Ok(self.backend.revalue(backend_id))
    }

    /// Re-validates a vertex array.
    pub fn revalue_vertexarray(
        &mut self,
        handle: Handle<VertexArrayTag>,
    ) -> Result<bool, ResourceError> {
        let backend_id = self
            .vertexarrays
            .get(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "vertexarray",
            })?
            .backend;
        Ok(self.backend.revalue(backend_id))
    }

    /// Re-validates a vertex buffer.
    pub fn revalue_vertexbuffer(
        &mut self,
        handle: Handle<VertexBufferTag>,
    ) -> Result<bool, ResourceError> {
        let backend_id = self
            .vertexbuffers
            .get(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "vertexbuffer",
            })?
            .backend;
        Ok(self.backend.revalue(backend_id))
    }

    /// Re-validates an index buffer.
    pub fn revalue_indexbuffer(
        &mut self,
        handle: Handle<IndexBufferTag>,
    ) -> Result<bool, ResourceError> {
        let backend_id = self
            .indexbuffers
            .get(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "indexbuffer",
            })?
            .backend;
        Ok(self.backend.revalue(backend_id))
    }

    /// Re-validates a texture.
    pub fn revalue_texture2d(
        &mut self,
        handle: Handle<Texture2dTag>,
    ) -> Result<bool, ResourceError> {
        let backend_id = self
            .textures
            .get(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "texture2d",
            })?
            .backend;
        Ok(self.backend.revalue(backend_id))
    }

    /// Re-validates a framebuffer.
    pub fn revalue_framebuffer(
        &mut self,
        handle: Handle<FramebufferTag>,
    ) -> Result<bool, ResourceError> {
        let backend_id = self
            .framebuffers
            .get(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "framebuffer",
            })?
            .backend;
        Ok(self.backend.revalue(backend_id))
    }

    /// Re-validates a program.
    pub fn revalue_program(&mut self, handle: Handle<ProgramTag>) -> Result<bool, ResourceError> {
        let backend_id = self
            .programs
            .get(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "program",
            })?
            .backend;
        Ok(self.backend.revalue(backend_id))
    }

    /// Re-validates a standalone shader.
    pub fn revalue_shader(&mut self, handle: Handle<ShaderTag>) -> Result<bool, ResourceError> {
        let backend_id = self
            .shaders
            .get(handle)
            .ok_or(ResourceError::StaleHandle {
                category: "shader",
            })?
            .backend;
        Ok(self.backend.revalue(backend_id))
    }

    // --- draw calls -------------------------------------------------------

    /// Clears the bound framebuffer of the active context.
    pub fn clear(&mut self, mask: u32) -> Result<(), ResourceError> {
        self.active_entry()?;
        self.backend.clear(mask & clear::ALL);
        Ok(())
    }

    /// Draws a vertex array: indexed when it has indices, otherwise as a
    /// plain array over its first vertex buffer.
    pub fn draw(&mut self, array: Handle<VertexArrayTag>) -> Result<(), ResourceError> {
        self.active_entry()?;
        let (primitive, indices, first_buffer) = {
            let entry = self
                .vertexarrays
                .get(array)
                .ok_or(ResourceError::StaleHandle {
                    category: "vertexarray",
                })?;
            (entry.spec.primitive, entry.indices, entry.vertices.first().copied())
        };
        self.bind_vertexarray(Some(array))?;
        if let Some(indices) = indices {
            let count = self.indexbuffer_count(indices)?;
            self.backend.draw_indexed(primitive, count);
        } else if let Some(buffer) = first_buffer {
            let bytes = self.vertexbuffer_size(buffer)?;
            self.backend.draw_arrays(primitive, 0, bytes);
        }
        Ok(())
    }

    /// Non-indexed draw through the active context.
    pub fn draw_arrays(
        &mut self,
        primitive: Primitive,
        first: usize,
        count: usize,
    ) -> Result<(), ResourceError> {
        self.active_entry()?;
        self.backend.draw_arrays(primitive, first, count);
        Ok(())
    }

    /// Indexed draw through the active context.
    pub fn draw_indexed(&mut self, primitive: Primitive, count: usize) -> Result<(), ResourceError> {
        self.active_entry()?;
        self.backend.draw_indexed(primitive, count);
        Ok(())
    }

    /// Flushes the active context.
    pub fn flush(&mut self) -> Result<(), ResourceError> {
        self.active_entry()?;
        self.backend.flush();
        Ok(())
    }
}

impl Drop for RenderDevice {
    fn drop(&mut self) {
        let leaked = self.object_count();
        if leaked > 0 {
            log::warn!("render device dropped with {leaked} live object(s); releasing them");
        }
        let backend = &mut self.backend;
        self.contexts.drain_with(|entry| backend.destroy(entry.backend));
        self.vertexarrays
            .drain_with(|entry| backend.destroy(entry.backend));
        self.vertexbuffers
            .drain_with(|entry| backend.destroy(entry.backend));
        self.indexbuffers
            .drain_with(|entry| backend.destroy(entry.backend));
        self.textures.drain_with(|entry| backend.destroy(entry.backend));
        self.framebuffers
            .drain_with(|entry| backend.destroy(entry.backend));
        self.programs.drain_with(|entry| backend.destroy(entry.backend));
        self.shaders.drain_with(|entry| backend.destroy(entry.backend));
    }
}

fn texel_bytes(format: TextureFormat) -> usize {
    match format {
        TextureFormat::Rgba8 => 4,
        TextureFormat::Rgb8 => 3,
        TextureFormat::R8 => 1,
        TextureFormat::Depth24Stencil8 => 4,
    }
}
