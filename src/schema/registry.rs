//! Read-only registry of resource and attribute descriptors.
//!
//! Built once at startup and shared by every request-serving worker;
//! lookups are case-insensitive on attribute and resource names and
//! case-sensitive on schema URIs.

use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::definitions::{
    AttributeDescriptor, ResourceDescriptor, GROUP_DESCRIPTOR, USER_DESCRIPTOR,
};

#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    /// Resource descriptors keyed by lower-cased resource name.
    resources: HashMap<String, Arc<ResourceDescriptor>>,
}

impl SchemaRegistry {
    /// A registry holding the built-in core User and Group schemas.
    pub fn new() -> Self {
        SchemaRegistry::with_resources(vec![USER_DESCRIPTOR.clone(), GROUP_DESCRIPTOR.clone()])
    }

    pub fn with_resources(resources: Vec<ResourceDescriptor>) -> Self {
        let resources = resources
            .into_iter()
            .map(|r| (r.name.to_lowercase(), Arc::new(r)))
            .collect();
        SchemaRegistry { resources }
    }

    pub fn lookup_resource(&self, name: &str) -> Option<&Arc<ResourceDescriptor>> {
        self.resources.get(&name.to_lowercase())
    }

    /// Find an attribute descriptor by schema URI and attribute name.
    pub fn lookup_attribute(&self, schema: &str, name: &str) -> Option<&AttributeDescriptor> {
        self.resources
            .values()
            .filter(|r| r.schema == schema)
            .find_map(|r| r.attribute(name))
    }

    pub fn lookup_sub_attribute<'a>(
        &self,
        parent: &'a AttributeDescriptor,
        name: &str,
    ) -> Option<&'a AttributeDescriptor> {
        parent.sub_attribute(name)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        SchemaRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::definitions::{DataType, SCHEMA_URI_CORE_USER};

    #[test]
    fn test_lookup_resource_case_insensitive() {
        let registry = SchemaRegistry::new();
        assert!(registry.lookup_resource("user").is_some());
        assert!(registry.lookup_resource("USER").is_some());
        assert!(registry.lookup_resource("Group").is_some());
        assert!(registry.lookup_resource("Device").is_none());
    }

    #[test]
    fn test_lookup_attribute() {
        let registry = SchemaRegistry::new();
        let attr = registry
            .lookup_attribute(SCHEMA_URI_CORE_USER, "USERNAME")
            .unwrap();
        assert_eq!(attr.name, "userName");

        // Schema URIs are case-sensitive.
        assert!(registry
            .lookup_attribute(&SCHEMA_URI_CORE_USER.to_uppercase(), "userName")
            .is_none());
    }

    #[test]
    fn test_lookup_sub_attribute() {
        let registry = SchemaRegistry::new();
        let name = registry
            .lookup_attribute(SCHEMA_URI_CORE_USER, "name")
            .unwrap();
        let given = registry.lookup_sub_attribute(name, "givenname").unwrap();
        assert_eq!(given.name, "givenName");
        assert_eq!(given.data_type, DataType::String);
        assert!(registry.lookup_sub_attribute(name, "value").is_none());
    }
}
