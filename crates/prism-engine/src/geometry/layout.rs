use crate::error::RenderError;

/// One vertex input declared by a compiled program.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ShaderAttribute {
    pub location: u32,
    pub component_count: u8,
}

/// Vertex inputs of a program, in declaration order.
///
/// Produced once by reflection when the program is first compiled.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ShaderInputLayout {
    attributes: Vec<ShaderAttribute>,
}

impl ShaderInputLayout {
    /// Builds a layout, rejecting duplicate locations and out-of-range component counts.
    pub fn from_attributes(attributes: Vec<ShaderAttribute>) -> Result<Self, RenderError> {
        for (i, a) in attributes.iter().enumerate() {
            check_component_count(a.component_count)?;
            if attributes[..i].iter().any(|b| b.location == a.location) {
                return Err(RenderError::DuplicateLocation(a.location));
            }
        }
        Ok(Self { attributes })
    }

    pub fn attributes(&self) -> &[ShaderAttribute] {
        &self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// One attribute as physically packed in a vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferAttribute {
    pub location: u32,
    pub component_count: u8,
    /// Byte offset inside one vertex.
    pub offset: u32,
}

/// Physical packing of a submesh's vertex buffer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BufferLayout {
    attributes: Vec<BufferAttribute>,
    stride: u32,
}

impl BufferLayout {
    pub fn from_attributes(attributes: Vec<BufferAttribute>, stride: u32) -> Result<Self, RenderError> {
        for (i, a) in attributes.iter().enumerate() {
            check_component_count(a.component_count)?;
            if attributes[..i].iter().any(|b| b.location == a.location) {
                return Err(RenderError::DuplicateLocation(a.location));
            }
        }
        Ok(Self { attributes, stride })
    }

    /// Tightly packed f32 attributes in the given order; offsets and stride are derived.
    ///
    /// `attrs` is a list of `(location, component_count)`.
    pub fn packed(attrs: &[(u32, u8)]) -> Result<Self, RenderError> {
        let mut offset = 0u32;
        let mut attributes = Vec::with_capacity(attrs.len());
        for &(location, component_count) in attrs {
            attributes.push(BufferAttribute { location, component_count, offset });
            offset += u32::from(component_count) * 4;
        }
        Self::from_attributes(attributes, offset)
    }

    pub fn attributes(&self) -> &[BufferAttribute] {
        &self.attributes
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Floats per vertex.
    pub fn floats_per_vertex(&self) -> usize {
        (self.stride / 4) as usize
    }

    /// Linear scan for the attribute bound to `location`.
    pub fn find(&self, location: u32) -> Option<&BufferAttribute> {
        self.attributes.iter().find(|a| a.location == location)
    }
}

/// Maps an f32 component count to the matching wgpu vertex format.
pub fn vertex_format(component_count: u8) -> wgpu::VertexFormat {
    match component_count {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

fn check_component_count(count: u8) -> Result<(), RenderError> {
    if (1..=4).contains(&count) {
        Ok(())
    } else {
        Err(RenderError::InvalidComponentCount(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── packed ────────────────────────────────────────────────────────────

    #[test]
    fn packed_derives_offsets_and_stride() {
        let layout = BufferLayout::packed(&[(0, 3), (1, 3), (2, 2)]).unwrap();
        let offsets: Vec<u32> = layout.attributes().iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
        assert_eq!(layout.stride(), 32);
        assert_eq!(layout.floats_per_vertex(), 8);
    }

    #[test]
    fn find_by_location() {
        let layout = BufferLayout::packed(&[(0, 3), (2, 2)]).unwrap();
        assert_eq!(layout.find(2).map(|a| a.offset), Some(12));
        assert!(layout.find(1).is_none());
    }

    // ── invariants ────────────────────────────────────────────────────────

    #[test]
    fn duplicate_buffer_location_rejected() {
        let err = BufferLayout::packed(&[(0, 3), (0, 2)]).unwrap_err();
        assert!(matches!(err, RenderError::DuplicateLocation(0)));
    }

    #[test]
    fn duplicate_shader_location_rejected() {
        let attrs = vec![
            ShaderAttribute { location: 4, component_count: 2 },
            ShaderAttribute { location: 4, component_count: 3 },
        ];
        assert!(matches!(
            ShaderInputLayout::from_attributes(attrs),
            Err(RenderError::DuplicateLocation(4))
        ));
    }

    #[test]
    fn component_count_out_of_range_rejected() {
        assert!(matches!(
            BufferLayout::packed(&[(0, 5)]),
            Err(RenderError::InvalidComponentCount(5))
        ));
        assert!(matches!(
            BufferLayout::packed(&[(0, 0)]),
            Err(RenderError::InvalidComponentCount(0))
        ));
    }

    #[test]
    fn vertex_formats() {
        assert_eq!(vertex_format(2), wgpu::VertexFormat::Float32x2);
        assert_eq!(vertex_format(3), wgpu::VertexFormat::Float32x3);
    }
}
