pub mod attribute;
pub mod filter;

pub use attribute::{LdapAttribute, LdapEntry};
pub use filter::LdapFilter;
