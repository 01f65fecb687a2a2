//! Uniform bridge.
//!
//! A program's bindings are discovered by reflecting its WGSL module with naga:
//! the `var<uniform>` block (every struct member becomes a named uniform), each
//! `texture_2d<f32>` global (a named sampler slot) and the filtering sampler.
//! Values are staged in a CPU-side [`UniformBlock`] and uploaded when a pass
//! builds its bind group.

use std::collections::HashMap;

use vhsdepth_core::UniformValue;

use crate::error::{ShaderError, ShaderStage};

/// Shape of a reflected uniform member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    /// A type the bridge cannot write (integers, arrays, nested structs).
    Unsupported,
}

impl UniformKind {
    /// Component count, if writable.
    #[must_use]
    pub fn arity(self) -> Option<usize> {
        match self {
            UniformKind::Float => Some(1),
            UniformKind::Vec2 => Some(2),
            UniformKind::Vec3 => Some(3),
            UniformKind::Vec4 => Some(4),
            UniformKind::Mat4 => Some(16),
            UniformKind::Unsupported => None,
        }
    }

    fn from_naga(inner: &naga::TypeInner) -> Self {
        use naga::{ScalarKind, TypeInner, VectorSize};

        let is_f32 = |scalar: &naga::Scalar| scalar.kind == ScalarKind::Float && scalar.width == 4;
        match inner {
            TypeInner::Scalar(scalar) if is_f32(scalar) => UniformKind::Float,
            TypeInner::Vector { size, scalar } if is_f32(scalar) => match size {
                VectorSize::Bi => UniformKind::Vec2,
                VectorSize::Tri => UniformKind::Vec3,
                VectorSize::Quad => UniformKind::Vec4,
            },
            TypeInner::Matrix {
                columns: VectorSize::Quad,
                rows: VectorSize::Quad,
                scalar,
            } if is_f32(scalar) => UniformKind::Mat4,
            _ => UniformKind::Unsupported,
        }
    }
}

/// A named field of the uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformMember {
    /// Byte offset inside the block.
    pub offset: u32,
    pub kind: UniformKind,
}

/// Layout of a program's `var<uniform>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlockLayout {
    pub binding: u32,
    /// Size in bytes, rounded up to 16.
    pub size: u32,
    pub members: HashMap<String, UniformMember>,
}

/// A named texture slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    pub name: String,
    pub binding: u32,
}

/// Everything a program binds, all in group 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingReflection {
    pub uniforms: Option<UniformBlockLayout>,
    pub textures: Vec<TextureSlot>,
    pub sampler: Option<u32>,
}

impl BindingReflection {
    /// Binding slot of the texture named `name`.
    #[must_use]
    pub fn texture_binding(&self, name: &str) -> Option<u32> {
        self.textures
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.binding)
    }

    #[must_use]
    pub fn uniform(&self, name: &str) -> Option<UniformMember> {
        self.uniforms
            .as_ref()
            .and_then(|block| block.members.get(name))
            .copied()
    }
}

/// Extracts the bindings of a validated module.
pub fn reflect(program: &str, module: &naga::Module) -> Result<BindingReflection, ShaderError> {
    let error = |msg: String| ShaderError::new(program, ShaderStage::Validate, msg);
    let mut reflection = BindingReflection::default();

    for (_, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else {
            continue;
        };
        let name = var.name.clone().unwrap_or_default();
        if binding.group != 0 {
            return Err(error(format!(
                "'{name}' uses bind group {}; only group 0 is supported",
                binding.group
            )));
        }
        let ty = &module.types[var.ty];
        match var.space {
            naga::AddressSpace::Uniform => {
                if reflection.uniforms.is_some() {
                    return Err(error(format!(
                        "'{name}' is a second uniform block; only one is supported"
                    )));
                }
                reflection.uniforms = Some(reflect_block(module, &name, ty, binding.binding));
            }
            naga::AddressSpace::Handle => match &ty.inner {
                naga::TypeInner::Image {
                    dim: naga::ImageDimension::D2,
                    arrayed: false,
                    class:
                        naga::ImageClass::Sampled {
                            kind: naga::ScalarKind::Float,
                            multi: false,
                        },
                } => reflection.textures.push(TextureSlot {
                    name,
                    binding: binding.binding,
                }),
                naga::TypeInner::Sampler { comparison: false } => {
                    if reflection.sampler.is_some() {
                        return Err(error(format!(
                            "'{name}' is a second sampler; passes share one linear sampler"
                        )));
                    }
                    reflection.sampler = Some(binding.binding);
                }
                _ => {
                    return Err(error(format!(
                        "'{name}' must be a texture_2d<f32> or a filtering sampler"
                    )))
                }
            },
            other => {
                return Err(error(format!(
                    "'{name}' uses unsupported address space {other:?}"
                )))
            }
        }
    }

    reflection.textures.sort_by_key(|slot| slot.binding);
    Ok(reflection)
}

fn reflect_block(
    module: &naga::Module,
    var_name: &str,
    ty: &naga::Type,
    binding: u32,
) -> UniformBlockLayout {
    let mut members = HashMap::new();
    let size = match &ty.inner {
        naga::TypeInner::Struct {
            members: fields,
            span,
        } => {
            for field in fields {
                if let Some(name) = &field.name {
                    members.insert(
                        name.clone(),
                        UniformMember {
                            offset: field.offset,
                            kind: UniformKind::from_naga(&module.types[field.ty].inner),
                        },
                    );
                }
            }
            *span
        }
        // A bare `var<uniform> u_time: f32;` is a block with one member.
        inner => {
            members.insert(
                var_name.to_string(),
                UniformMember {
                    offset: 0,
                    kind: UniformKind::from_naga(inner),
                },
            );
            inner.size(module.to_ctx())
        }
    };
    UniformBlockLayout {
        binding,
        size: size.max(16).div_ceil(16) * 16,
        members,
    }
}

/// CPU-side staging for a program's uniform block.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: Option<UniformBlockLayout>,
    bytes: Vec<u8>,
}

impl UniformBlock {
    #[must_use]
    pub fn new(layout: Option<UniformBlockLayout>) -> Self {
        let size = layout.as_ref().map_or(0, |l| l.size as usize);
        Self {
            layout,
            bytes: vec![0; size],
        }
    }

    /// Writes `value` into the member `name`.
    ///
    /// Returns false, changing nothing, when the block has no such member or
    /// the member's shape differs from the value's. Passes share one parameter
    /// superset, so misses are routine and only traced.
    pub fn set(&mut self, name: &str, value: UniformValue) -> bool {
        let Some(member) = self
            .layout
            .as_ref()
            .and_then(|l| l.members.get(name))
            .copied()
        else {
            log::trace!("uniform '{name}' not declared, ignored");
            return false;
        };
        if member.kind.arity() != Some(value.arity()) {
            log::trace!(
                "uniform '{name}' is {:?}, got {} components, ignored",
                member.kind,
                value.arity()
            );
            return false;
        }
        let data: &[u8] = bytemuck::cast_slice(value.as_slice());
        let start = member.offset as usize;
        let Some(slot) = self.bytes.get_mut(start..start + data.len()) else {
            log::trace!("uniform '{name}' lies outside the block, ignored");
            return false;
        };
        slot.copy_from_slice(data);
        true
    }

    /// Reads back the components of member `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec<f32>> {
        let member = self.layout.as_ref()?.members.get(name)?;
        let arity = member.kind.arity()?;
        let start = member.offset as usize;
        let bytes = self.bytes.get(start..start + arity * 4)?;
        Some(
            bytes
                .chunks_exact(4)
                .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        )
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn binding(&self) -> Option<u32> {
        self.layout.as_ref().map(|l| l.binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r"
struct Params {
    u_time: f32,
    u_resolution: vec2<f32>,
    u_glowColor: vec3<f32>,
    u_viewMatrix: mat4x4<f32>,
    u_frame: u32,
}
@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var u_sampler: sampler;
@group(0) @binding(3) var u_vhsTexture: texture_2d<f32>;
@group(0) @binding(2) var u_depthMap: texture_2d<f32>;

@fragment
fn fs_main(@builtin(position) p: vec4<f32>) -> @location(0) vec4<f32> {
    let a = textureSample(u_depthMap, u_sampler, p.xy);
    let b = textureSample(u_vhsTexture, u_sampler, p.xy);
    return a + b + vec4<f32>(params.u_glowColor * params.u_time, f32(params.u_frame))
        + params.u_viewMatrix[0] + vec4<f32>(params.u_resolution, 0.0, 0.0);
}
";

    fn reflect_source(source: &str) -> Result<BindingReflection, ShaderError> {
        let module = naga::front::wgsl::parse_str(source).unwrap();
        reflect("test", &module)
    }

    #[test]
    fn test_reflects_block_and_slots() {
        let reflection = reflect_source(SOURCE).unwrap();
        let block = reflection.uniforms.as_ref().unwrap();
        assert_eq!(block.binding, 0);
        assert_eq!(block.size % 16, 0);
        assert_eq!(reflection.uniform("u_time").unwrap().offset, 0);
        assert_eq!(reflection.uniform("u_resolution").unwrap().offset, 8);
        assert_eq!(reflection.uniform("u_glowColor").unwrap().offset, 16);
        assert_eq!(reflection.uniform("u_viewMatrix").unwrap().offset, 32);
        assert_eq!(
            reflection.uniform("u_frame").unwrap().kind,
            UniformKind::Unsupported
        );
        assert_eq!(reflection.sampler, Some(1));
        assert_eq!(reflection.texture_binding("u_depthMap"), Some(2));
        assert_eq!(reflection.texture_binding("u_vhsTexture"), Some(3));
        assert_eq!(reflection.textures[0].name, "u_depthMap");
    }

    #[test]
    fn test_set_ignores_unknown_and_mismatched() {
        let reflection = reflect_source(SOURCE).unwrap();
        let mut block = UniformBlock::new(reflection.uniforms);
        assert!(block.set("u_time", UniformValue::Float(2.5)));
        assert!(block.set("u_glowColor", UniformValue::Vec3([0.1, 0.2, 0.3])));
        assert!(!block.set("u_contourCount", UniformValue::Float(10.0)));
        assert!(!block.set("u_time", UniformValue::Vec2([1.0, 2.0])));
        assert!(!block.set("u_frame", UniformValue::Float(1.0)));
        assert_eq!(block.get("u_time"), Some(vec![2.5]));
        assert_eq!(block.get("u_glowColor"), Some(vec![0.1, 0.2, 0.3]));
    }

    #[test]
    fn test_matrix_written_column_major() {
        let reflection = reflect_source(SOURCE).unwrap();
        let mut block = UniformBlock::new(reflection.uniforms);
        let m = vhsdepth_core::Mat4::from_translation(vhsdepth_core::Vec3::new(4.0, 5.0, 6.0));
        assert!(block.set("u_viewMatrix", UniformValue::from(m)));
        let cols = block.get("u_viewMatrix").unwrap();
        assert_eq!(&cols[12..15], &[4.0, 5.0, 6.0]);
    }

    proptest::proptest! {
        #[test]
        fn prop_written_values_read_back(t in -1.0e6f32..1.0e6, x in -10.0f32..10.0, y in -10.0f32..10.0) {
            let reflection = reflect_source(SOURCE).unwrap();
            let mut block = UniformBlock::new(reflection.uniforms);
            block.set("u_time", UniformValue::Float(t));
            block.set("u_resolution", UniformValue::Vec2([x, y]));
            proptest::prop_assert_eq!(block.get("u_time"), Some(vec![t]));
            proptest::prop_assert_eq!(block.get("u_resolution"), Some(vec![x, y]));
            // Neighbours are untouched.
            proptest::prop_assert_eq!(block.get("u_glowColor"), Some(vec![0.0, 0.0, 0.0]));
        }
    }

    #[test]
    fn test_block_without_layout_ignores_everything() {
        let mut block = UniformBlock::new(None);
        assert!(!block.set("u_time", UniformValue::Float(1.0)));
        assert!(block.bytes().is_empty());
        assert_eq!(block.binding(), None);
    }

    #[test]
    fn test_rejects_other_groups() {
        let err = reflect_source(
            "@group(1) @binding(0) var t: texture_2d<f32>;\n\
             @fragment fn fs_main() -> @location(0) vec4<f32> { return textureLoad(t, vec2<i32>(0), 0); }",
        )
        .unwrap_err();
        assert_eq!(err.stage, ShaderStage::Validate);
        assert!(err.diagnostic.contains("group 1"));
    }

    #[test]
    fn test_bare_uniform_is_single_member() {
        let reflection = reflect_source(
            "@group(0) @binding(0) var<uniform> u_time: f32;\n\
             @fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(u_time); }",
        )
        .unwrap();
        let member = reflection.uniform("u_time").unwrap();
        assert_eq!((member.offset, member.kind), (0, UniformKind::Float));
        assert_eq!(reflection.uniforms.unwrap().size, 16);
    }
}
