use glam::Mat4;

use crate::range::BufferRange;

use super::model::ModelId;

/// A placed instance of a model.
#[derive(Debug, Clone)]
pub struct Entity {
    pub transform: Mat4,
    pub model: ModelId,
    uniform_range: BufferRange,
}

impl Entity {
    pub fn new(transform: Mat4, model: ModelId) -> Self {
        Self {
            transform,
            model,
            uniform_range: BufferRange::default(),
        }
    }

    /// Slice of the frame uniform buffer written for this entity by the last pack.
    pub fn uniform_range(&self) -> BufferRange {
        self.uniform_range
    }

    pub(crate) fn set_uniform_range(&mut self, range: BufferRange) {
        self.uniform_range = range;
    }
}
