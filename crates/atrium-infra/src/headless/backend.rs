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

use atrium_core::render::{
    BackendId, BindTarget, BufferKind, ContextSettings, FramebufferSpec, Primitive, ProgramSpec,
    RenderBackend, ResourceError, ShaderSpec, ShaderStage, Texture2dSpec, UniformId, UniformValue,
    VertexArraySpec,
};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Counters of the work a [`HeadlessBackend`] has been asked to do.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpCounters {
    pub creates: u64,
    pub destroys: u64,
    pub binds: u64,
    pub uniform_uploads: u64,
    pub buffer_updates: u64,
    pub clears: u64,
    pub draw_calls: u64,
    pub flushes: u64,
}

/// A render backend that performs no graphics work at all.
///
/// Object creation hands out monotonically increasing ids and records them in
/// an alive-set; `revalue` answers from that set, so device-level liveness
/// logic behaves exactly as it would over a real API. Program sources are
/// kept so linking can fail deterministically: any attached source containing
/// `#error` fails the link with that line as the log.
pub struct HeadlessBackend {
    next_id: u64,
    alive: HashSet<u64>,
    program_sources: HashMap<u64, Vec<String>>,
    counters: OpCounters,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            alive: HashSet::new(),
            program_sources: HashMap::new(),
            counters: OpCounters::default(),
        }
    }

    /// Snapshot of the operation counters.
    pub fn counters(&self) -> OpCounters {
        self.counters
    }

    /// Number of backend objects currently alive.
    pub fn live_objects(&self) -> usize {
        self.alive.len()
    }

    fn fresh(&mut self) -> BackendId {
        self.next_id += 1;
        self.alive.insert(self.next_id);
        self.counters.creates += 1;
        BackendId(self.next_id)
    }

    fn check_alive(&self, id: BackendId) -> Result<(), ResourceError> {
        if self.alive.contains(&id.0) {
            Ok(())
        } else {
            Err(ResourceError::BackendFailure(format!(
                "operation on destroyed backend object {}",
                id.0
            )))
        }
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeadlessBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessBackend")
            .field("alive", &self.alive.len())
            .field("counters", &self.counters)
            .finish()
    }
}

impl RenderBackend for HeadlessBackend {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn create_context(&mut self, settings: &ContextSettings) -> Result<BackendId, ResourceError> {
        let id = self.fresh();
        log::debug!(
            "headless context {} ({:?} {}.{})",
            id.0,
            settings.api,
            settings.major,
            settings.minor
        );
        Ok(id)
    }

    fn create_vertexarray(&mut self, _spec: &VertexArraySpec) -> Result<BackendId, ResourceError> {
        Ok(self.fresh())
    }

    fn create_buffer(&mut self, _kind: BufferKind, _data: &[u8]) -> Result<BackendId, ResourceError> {
        Ok(self.fresh())
    }

    fn update_buffer(
        &mut self,
        id: BackendId,
        _offset: usize,
        _data: &[u8],
    ) -> Result<(), ResourceError> {
        self.check_alive(id)?;
        self.counters.buffer_updates += 1;
        Ok(())
    }

    fn create_texture2d(
        &mut self,
        _spec: &Texture2dSpec,
        _data: Option<&[u8]>,
    ) -> Result<BackendId, ResourceError> {
        Ok(self.fresh())
    }

    fn create_framebuffer(&mut self, _spec: &FramebufferSpec) -> Result<BackendId, ResourceError> {
        Ok(self.fresh())
    }

    fn create_program(&mut self, _spec: &ProgramSpec) -> Result<BackendId, ResourceError> {
        let id = self.fresh();
        self.program_sources.insert(id.0, Vec::new());
        Ok(id)
    }

    fn create_shader(&mut self, spec: &ShaderSpec) -> Result<BackendId, ResourceError> {
        if spec.source.contains("#error") {
            return Err(ResourceError::BackendFailure(
                "shader source contains #error".to_string(),
            ));
        }
        Ok(self.fresh())
    }

    fn attach_source(
        &mut self,
        program: BackendId,
        _stage: ShaderStage,
        source: &str,
    ) -> Result<(), ResourceError> {
        self.check_alive(program)?;
        self.program_sources
            .entry(program.0)
            .or_default()
            .push(source.to_string());
        Ok(())
    }

    fn link_program(&mut self, program: BackendId) -> Result<String, ResourceError> {
        self.check_alive(program)?;
        let sources = self.program_sources.get(&program.0);
        if let Some(line) = sources
            .into_iter()
            .flatten()
            .flat_map(|source| source.lines())
            .find(|line| line.contains("#error"))
        {
            return Err(ResourceError::BackendFailure(format!(
                "link failed: {}",
                line.trim()
            )));
        }
        Ok("link successful".to_string())
    }

    fn destroy(&mut self, id: BackendId) {
        if self.alive.remove(&id.0) {
            self.program_sources.remove(&id.0);
            self.counters.destroys += 1;
        } else {
            log::warn!("double destroy of backend object {}", id.0);
        }
    }

    fn revalue(&mut self, id: BackendId) -> bool {
        self.alive.contains(&id.0)
    }

    fn bind(&mut self, _target: BindTarget, _id: Option<BackendId>) {
        self.counters.binds += 1;
    }

    fn bind_texture(&mut self, _id: Option<BackendId>, _slot: u32) {
        self.counters.binds += 1;
    }

    fn upload_uniform(
        &mut self,
        program: BackendId,
        _location: UniformId,
        _value: &UniformValue,
    ) -> Result<(), ResourceError> {
        self.check_alive(program)?;
        self.counters.uniform_uploads += 1;
        Ok(())
    }

    fn clear(&mut self, _mask: u32) {
        self.counters.clears += 1;
    }

    fn draw_arrays(&mut self, _primitive: Primitive, _first: usize, _count: usize) {
        self.counters.draw_calls += 1;
    }

    fn draw_indexed(&mut self, _primitive: Primitive, _count: usize) {
        self.counters.draw_calls += 1;
    }

    fn flush(&mut self) {
        self.counters.flushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::render::RenderDevice;

    #[test]
    fn ids_are_unique_and_tracked() {
        let mut backend = HeadlessBackend::new();
        let a = backend.create_vertexarray(&VertexArraySpec::default()).unwrap();
        let b = backend.create_vertexarray(&VertexArraySpec::default()).unwrap();
        assert_ne!(a, b);
        assert_eq!(backend.live_objects(), 2);
        backend.destroy(a);
        assert!(!backend.revalue(a));
        assert!(backend.revalue(b));
    }

    #[test]
    fn link_fails_on_error_directive() {
        let mut backend = HeadlessBackend::new();
        let program = backend.create_program(&ProgramSpec::default()).unwrap();
        backend
            .attach_source(program, ShaderStage::Vertex, "#error missing uniforms")
            .unwrap();
        assert!(backend.link_program(program).is_err());
    }

    #[test]
    fn drives_a_full_device_frame() {
        let mut device = RenderDevice::new(Box::new(HeadlessBackend::new()));
        let ctx = device.new_context(&ContextSettings::default()).unwrap();
        device.set_active_context(Some(ctx)).unwrap();
        device.clear(atrium_core::render::clear::ALL).unwrap();
        device.draw_arrays(Primitive::Triangles, 0, 3).unwrap();
        device.flush().unwrap();
        let counters = device
            .backend()
            .as_any()
            .downcast_ref::<HeadlessBackend>()
            .map(HeadlessBackend::counters)
            .unwrap();
        assert_eq!(counters.clears, 1);
        assert_eq!(counters.draw_calls, 1);
        assert_eq!(counters.flushes, 1);
    }
}
