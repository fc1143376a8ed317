pub mod config;
pub mod error;
pub mod ldap;
pub mod mapping;
pub mod parser;
pub mod schema;
pub mod scim;
pub mod utils;

// Re-export commonly used types for easier access
pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use ldap::{LdapAttribute, LdapEntry, LdapFilter};
pub use mapping::resource::Projection;
pub use mapping::{MappingRegistry, ResourceMapper, Transformation};
pub use parser::{parse_filter, ScimFilter, SortSpec};
pub use schema::SchemaRegistry;
pub use scim::{AttributePath, ScimAttribute, ScimObject, ScimValue};
