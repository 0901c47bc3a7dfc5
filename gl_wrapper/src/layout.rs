use gl::types::GLenum;

/// Scalar type of one vertex attribute component.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElementType {
    Float,
    UnsignedInt,
    UnsignedByte,
}

impl ElementType {
    /// Size of one component in bytes.
    pub fn size(&self) -> usize {
        match self {
            ElementType::Float => std::mem::size_of::<f32>(),
            ElementType::UnsignedInt => std::mem::size_of::<u32>(),
            ElementType::UnsignedByte => std::mem::size_of::<u8>(),
        }
    }

    pub fn gl_enum(&self) -> GLenum {
        match self {
            ElementType::Float => gl::FLOAT,
            ElementType::UnsignedInt => gl::UNSIGNED_INT,
            ElementType::UnsignedByte => gl::UNSIGNED_BYTE,
        }
    }
}

/// Rust scalars usable as vertex attribute components.
pub trait VertexElement {
    const TYPE: ElementType;
    const NORMALIZED: bool;
}

impl VertexElement for f32 {
    const TYPE: ElementType = ElementType::Float;
    const NORMALIZED: bool = false;
}

impl VertexElement for u32 {
    const TYPE: ElementType = ElementType::UnsignedInt;
    const NORMALIZED: bool = false;
}

impl VertexElement for u8 {
    const TYPE: ElementType = ElementType::UnsignedByte;
    const NORMALIZED: bool = true;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexBufferElement {
    pub count: u32,
    pub kind: ElementType,
    pub normalized: bool,
}

impl VertexBufferElement {
    pub fn size(&self) -> usize {
        self.count as usize * self.kind.size()
    }
}

/// Attribute structure of interleaved vertex data.
///
/// Elements bind to attribute locations in push order, starting at 0.
#[derive(Clone, Debug, Default)]
pub struct VertexBufferLayout {
    elements: Vec<VertexBufferElement>,
    stride: usize,
}

impl VertexBufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: VertexElement>(&mut self, count: u32) {
        let element = VertexBufferElement {
            count,
            kind: T::TYPE,
            normalized: T::NORMALIZED,
        };

        self.stride += element.size();
        self.elements.push(element);
    }

    pub fn with<T: VertexElement>(mut self, count: u32) -> Self {
        self.push::<T>(count);
        self
    }

    pub fn elements(&self) -> &[VertexBufferElement] {
        &self.elements
    }

    /// Bytes between two consecutive vertices.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Yields `(attribute index, element, byte offset)` for every element.
    pub fn offsets(&self) -> impl Iterator<Item = (u32, &VertexBufferElement, usize)> + '_ {
        self.elements
            .iter()
            .enumerate()
            .scan(0, |offset, (i, element)| {
                let current = *offset;
                *offset += element.size();
                Some((i as u32, element, current))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_sum_of_element_sizes() {
        let layout = VertexBufferLayout::new()
            .with::<f32>(3)
            .with::<u8>(4)
            .with::<f32>(2)
            .with::<u32>(1);

        assert_eq!(layout.stride(), 12 + 4 + 8 + 4);
        assert_eq!(layout.elements().len(), 4);
    }

    #[test]
    fn offsets_are_prefix_sums() {
        let mut layout = VertexBufferLayout::new();
        layout.push::<f32>(2);
        layout.push::<f32>(2);
        layout.push::<u8>(4);

        let offsets: Vec<_> = layout.offsets().map(|(i, _, o)| (i, o)).collect();

        assert_eq!(offsets, vec![(0, 0), (1, 8), (2, 16)]);
    }

    #[test]
    fn byte_elements_are_normalized() {
        let layout = VertexBufferLayout::new().with::<u8>(4).with::<f32>(1);

        assert!(layout.elements()[0].normalized);
        assert!(!layout.elements()[1].normalized);
        assert_eq!(layout.elements()[0].kind.gl_enum(), gl::UNSIGNED_BYTE);
    }

    #[test]
    fn empty_layout() {
        let layout = VertexBufferLayout::new();

        assert_eq!(layout.stride(), 0);
        assert_eq!(layout.offsets().count(), 0);
    }
}
