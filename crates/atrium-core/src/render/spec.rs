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

//! Creation specs for every render object category.
//!
//! Specs are plain serde-serializable values so they can round-trip through
//! the JSON preference document. Each factory validates its spec before
//! touching the backend; a malformed spec is reported as
//! [`ResourceError::InvalidSpec`](super::ResourceError::InvalidSpec), never
//! paid for with a half-constructed object.

use super::error::ResourceError;
use serde::{Deserialize, Serialize};

/// Graphics API requested for a render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContextApi {
    /// OpenGL-style API (the only one the original launcher shipped).
    #[default]
    OpenGl,
    /// Vulkan-style API.
    Vulkan,
    /// Unknown/other backend.
    Unknown,
}

/// Context profile selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContextProfile {
    /// Whatever the backend prefers.
    Any,
    /// Core profile.
    Core,
    /// Compatibility profile.
    #[default]
    Compat,
    /// Debug-instrumented context.
    Debug,
}

/// Settings used to create a render context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Requested API.
    pub api: ContextApi,
    /// Major API version.
    pub major: i32,
    /// Minor API version.
    pub minor: i32,
    /// Profile selection.
    pub profile: ContextProfile,
    /// Depth buffer bits.
    pub depth_bits: u32,
    /// Stencil buffer bits.
    pub stencil_bits: u32,
    /// Whether multisampling is requested.
    pub multisample: bool,
    /// Whether an sRGB-capable default framebuffer is requested.
    pub srgb_capable: bool,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            api: ContextApi::OpenGl,
            major: 4,
            minor: 6,
            profile: ContextProfile::Compat,
            depth_bits: 24,
            stencil_bits: 8,
            multisample: true,
            srgb_capable: false,
        }
    }
}

impl ContextSettings {
    pub(crate) fn validate(&self) -> Result<(), ResourceError> {
        if self.major < 1 {
            return Err(ResourceError::InvalidSpec {
                category: "context",
                details: format!("major version must be >= 1, got {}", self.major),
            });
        }
        Ok(())
    }
}

/// Primitive topology drawn from a vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    /// Point list.
    Points,
    /// Line list.
    Lines,
    /// Triangle list.
    #[default]
    Triangles,
}

/// Buffer update frequency hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BufferUsage {
    /// Uploaded once, drawn many times.
    #[default]
    Static,
    /// Re-uploaded occasionally.
    Dynamic,
    /// Re-uploaded every frame.
    Stream,
}

/// Spec for a vertex array object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VertexArraySpec {
    /// Primitive topology used when drawing this array.
    pub primitive: Primitive,
}

/// Spec for a vertex buffer. Vertex data is passed to the factory alongside
/// the spec, as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VertexBufferSpec {
    /// Update frequency hint.
    pub usage: BufferUsage,
}

/// Spec for an index buffer. Indices are passed to the factory alongside the
/// spec.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IndexBufferSpec {
    /// Update frequency hint.
    pub usage: BufferUsage,
}

/// Color/pixel layout of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextureFormat {
    /// 8-bit RGBA.
    #[default]
    Rgba8,
    /// 8-bit RGB.
    Rgb8,
    /// Single 8-bit channel.
    R8,
    /// 24-bit depth + 8-bit stencil, used for framebuffer depth attachments.
    Depth24Stencil8,
}

/// Sampler/storage behavior flags for textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureFlags {
    /// Linear filtering.
    pub smooth: bool,
    /// Repeat wrapping.
    pub repeat: bool,
    /// Generate mipmaps.
    pub mipmap: bool,
}

impl Default for TextureFlags {
    /// Smooth + repeat, no mipmaps.
    fn default() -> Self {
        Self {
            smooth: true,
            repeat: true,
            mipmap: false,
        }
    }
}

/// Spec for a 2D texture. Pixel data, when uploaded at creation, is passed to
/// the factory alongside the spec.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Texture2dSpec {
    /// Width and height in pixels.
    pub size: [u32; 2],
    /// Pixel format.
    pub format: TextureFormat,
    /// Sampler flags.
    pub flags: TextureFlags,
}

impl Default for Texture2dSpec {
    fn default() -> Self {
        Self {
            size: [1, 1],
            format: TextureFormat::default(),
            flags: TextureFlags::default(),
        }
    }
}

impl Texture2dSpec {
    pub(crate) fn validate(&self) -> Result<(), ResourceError> {
        if self.size[0] == 0 || self.size[1] == 0 {
            return Err(ResourceError::InvalidSpec {
                category: "texture2d",
                details: format!("size must be non-zero, got {}x{}", self.size[0], self.size[1]),
            });
        }
        Ok(())
    }
}

/// Spec for a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramebufferSpec {
    /// Width and height in pixels.
    pub size: [u32; 2],
    /// Color attachment format.
    pub format: TextureFormat,
    /// Color attachment sampler flags.
    pub flags: TextureFlags,
    /// Depth buffer bits; 0 disables the depth attachment.
    pub depth_bits: u32,
    /// Stencil buffer bits.
    pub stencil_bits: u32,
    /// Multisample count; 0 disables multisampling.
    pub samples: u32,
    /// Stereo rendering.
    pub stereo: bool,
}

impl Default for FramebufferSpec {
    fn default() -> Self {
        Self {
            size: [1280, 720],
            format: TextureFormat::Rgba8,
            flags: TextureFlags::default(),
            depth_bits: 24,
            stencil_bits: 8,
            samples: 0,
            stereo: false,
        }
    }
}

impl FramebufferSpec {
    pub(crate) fn validate(&self) -> Result<(), ResourceError> {
        if self.size[0] == 0 || self.size[1] == 0 {
            return Err(ResourceError::InvalidSpec {
                category: "framebuffer",
                details: format!("size must be non-zero, got {}x{}", self.size[0], self.size[1]),
            });
        }
        Ok(())
    }
}

/// Spec for a shader program (a linked set of per-stage shaders).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProgramSpec {
    /// Optional debug label.
    pub label: Option<String>,
}

/// Shader pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShaderStage {
    /// Vertex stage.
    #[default]
    Vertex,
    /// Fragment/pixel stage.
    Fragment,
    /// Geometry stage.
    Geometry,
}

/// Spec for a standalone shader object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShaderSpec {
    /// Pipeline stage this shader compiles for.
    pub stage: ShaderStage,
    /// Shader source text.
    pub source: String,
}

impl ShaderSpec {
    pub(crate) fn validate(&self) -> Result<(), ResourceError> {
        if self.source.trim().is_empty() {
            return Err(ResourceError::InvalidSpec {
                category: "shader",
                details: "source must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_settings_default_matches_launcher_preferences() {
        let settings = ContextSettings::default();
        assert_eq!(settings.api, ContextApi::OpenGl);
        assert_eq!((settings.major, settings.minor), (4, 6));
        assert_eq!(settings.depth_bits, 24);
        assert_eq!(settings.stencil_bits, 8);
    }

    #[test]
    fn specs_round_trip_through_json() {
        let spec = Texture2dSpec {
            size: [64, 32],
            format: TextureFormat::Rgb8,
            flags: TextureFlags {
                smooth: false,
                repeat: true,
                mipmap: true,
            },
        };
        let json = serde_json::to_string(&spec).unwrap();
        let back: Texture2dSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: ContextSettings =
            serde_json::from_str(r#"{ "api": "opengl", "major": 3, "minor": 3 }"#).unwrap();
        assert_eq!((settings.major, settings.minor), (3, 3));
        assert_eq!(settings.depth_bits, 24);

        let spec: FramebufferSpec = serde_json::from_str(r#"{ "size": [640, 480] }"#).unwrap();
        assert_eq!(spec.size, [640, 480]);
        assert_eq!(spec.format, TextureFormat::Rgba8);
    }

    #[test]
    fn degenerate_specs_fail_validation() {
        assert!(Texture2dSpec {
            size: [0, 16],
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(FramebufferSpec {
            size: [0, 0],
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(ShaderSpec {
            stage: ShaderStage::Vertex,
            source: "   ".to_string(),
        }
        .validate()
        .is_err());
        assert!(ContextSettings {
            major: 0,
            ..Default::default()
        }
        .validate()
        .is_err());
    }
}
