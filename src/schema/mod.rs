pub mod definitions;
pub mod registry;

// Re-export commonly used items
pub use definitions::{AttributeDescriptor, DataType, ResourceDescriptor};
pub use registry::SchemaRegistry;
