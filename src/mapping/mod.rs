pub mod attribute;
pub mod registry;
pub mod resource;
pub mod transform;

pub use attribute::{
    AttributeBinding, AttributeMapper, CanonicalValueGroup, SubAttributeBinding, TypeBinding,
};
pub use registry::MappingRegistry;
pub use resource::{Projection, ResourceMapper};
pub use transform::Transformation;
