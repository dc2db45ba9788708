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

//! Uniform locations and the values uploaded to them.

/// An interned uniform location within one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformId(pub u32);

/// A value uploaded to a program uniform.
///
/// Matrices are column-major, flattened. Texture uniforms are not a variant
/// here on purpose: they are cached on the program and resolved to slot
/// indices during the deferred
/// [`bind_textures`](super::RenderDevice::bind_textures) pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Boolean uniform.
    Bool(bool),
    /// Signed integer uniform (also used for sampler slot indices).
    Int(i32),
    /// Scalar float uniform.
    Float(f32),
    /// 2-component float vector.
    Vec2([f32; 2]),
    /// 3-component float vector.
    Vec3([f32; 3]),
    /// 4-component float vector.
    Vec4([f32; 4]),
    /// 2x2 float matrix.
    Mat2([f32; 4]),
    /// 3x3 float matrix.
    Mat3([f32; 9]),
    /// 4x4 float matrix.
    Mat4([f32; 16]),
}
