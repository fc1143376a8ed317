pub mod path;
pub mod value;

pub use path::AttributePath;
pub use value::{ScimAttribute, ScimAttributeValue, ScimObject, ScimValue};
