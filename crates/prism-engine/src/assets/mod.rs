//! File-backed resources: images and models.

mod image;
mod model;

pub use image::{load_image, Image};
pub use model::{import_obj, import_obj_buf, ImportedModel, MaterialDesc};
