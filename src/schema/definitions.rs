//! SCIM schema knowledge.
//!
//! This module centralizes the resource and attribute descriptors the
//! mapping layer is driven by. The built-in core User and Group schemas
//! live here; deployments may register additional resource descriptors.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// SCIM core schema identifiers
pub const SCHEMA_URI_CORE_USER: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const SCHEMA_URI_CORE_GROUP: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";

/// Attribute data type in SCIM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    String,
    Boolean,
    Integer,
    DateTime,
    Binary,
    Complex,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::DateTime => "dateTime",
            DataType::Binary => "binary",
            DataType::Complex => "complex",
        }
    }
}

/// Descriptor for one SCIM attribute or sub-attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    /// Schema URI qualifying the attribute name.
    pub schema: String,
    pub name: String,
    pub data_type: DataType,
    pub multi_valued: bool,
    /// Sub-attribute descriptors; only populated for complex attributes and
    /// for multi-valued simple attributes (value/type/primary).
    pub sub_attributes: Vec<AttributeDescriptor>,
    /// Recognized type tags for multi-valued attributes (e.g. work, home).
    pub canonical_types: Vec<String>,
}

impl AttributeDescriptor {
    /// A single-valued simple attribute.
    pub fn simple(schema: &str, name: &str, data_type: DataType) -> Self {
        AttributeDescriptor {
            schema: schema.to_string(),
            name: name.to_string(),
            data_type,
            multi_valued: false,
            sub_attributes: Vec::new(),
            canonical_types: Vec::new(),
        }
    }

    /// A single-valued complex attribute with the given sub-attributes.
    pub fn complex(schema: &str, name: &str, sub_attributes: Vec<AttributeDescriptor>) -> Self {
        AttributeDescriptor {
            schema: schema.to_string(),
            name: name.to_string(),
            data_type: DataType::Complex,
            multi_valued: false,
            sub_attributes,
            canonical_types: Vec::new(),
        }
    }

    /// A multi-valued simple attribute. Values carry the normative
    /// value/type/primary sub-attributes, with `value` typed by `data_type`.
    pub fn multi_simple(
        schema: &str,
        name: &str,
        data_type: DataType,
        canonical_types: &[&str],
    ) -> Self {
        AttributeDescriptor {
            schema: schema.to_string(),
            name: name.to_string(),
            data_type,
            multi_valued: true,
            sub_attributes: vec![
                AttributeDescriptor::simple(schema, "value", data_type),
                AttributeDescriptor::simple(schema, "type", DataType::String),
                AttributeDescriptor::simple(schema, "primary", DataType::Boolean),
            ],
            canonical_types: canonical_types.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A multi-valued complex attribute with the given sub-attributes.
    pub fn multi_complex(
        schema: &str,
        name: &str,
        mut sub_attributes: Vec<AttributeDescriptor>,
        canonical_types: &[&str],
    ) -> Self {
        sub_attributes.push(AttributeDescriptor::simple(schema, "type", DataType::String));
        sub_attributes.push(AttributeDescriptor::simple(schema, "primary", DataType::Boolean));
        AttributeDescriptor {
            schema: schema.to_string(),
            name: name.to_string(),
            data_type: DataType::Complex,
            multi_valued: true,
            sub_attributes,
            canonical_types: canonical_types.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Look up a sub-attribute descriptor by name, case-insensitively.
    pub fn sub_attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.sub_attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// Descriptor for one SCIM resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    pub name: String,
    pub schema: String,
    pub attributes: Vec<AttributeDescriptor>,
}

impl ResourceDescriptor {
    pub fn new(name: &str, schema: &str, attributes: Vec<AttributeDescriptor>) -> Self {
        ResourceDescriptor {
            name: name.to_string(),
            schema: schema.to_string(),
            attributes,
        }
    }

    /// Look up an attribute descriptor by name, case-insensitively.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

lazy_static! {
    /// Core User resource descriptor
    pub static ref USER_DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new(
        "User",
        SCHEMA_URI_CORE_USER,
        vec![
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "id", DataType::String),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "externalId", DataType::String),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "userName", DataType::String),
            AttributeDescriptor::complex(
                SCHEMA_URI_CORE_USER,
                "name",
                vec![
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "formatted", DataType::String),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "familyName", DataType::String),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "givenName", DataType::String),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "middleName", DataType::String),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "honorificPrefix", DataType::String),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "honorificSuffix", DataType::String),
                ],
            ),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "displayName", DataType::String),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "nickName", DataType::String),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "title", DataType::String),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "userType", DataType::String),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "preferredLanguage", DataType::String),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "locale", DataType::String),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "timezone", DataType::String),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "active", DataType::Boolean),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "password", DataType::String),
            AttributeDescriptor::multi_simple(
                SCHEMA_URI_CORE_USER,
                "emails",
                DataType::String,
                &["work", "home", "other"],
            ),
            AttributeDescriptor::multi_simple(
                SCHEMA_URI_CORE_USER,
                "phoneNumbers",
                DataType::String,
                &["work", "home", "mobile", "fax", "pager", "other"],
            ),
            AttributeDescriptor::multi_simple(
                SCHEMA_URI_CORE_USER,
                "photos",
                DataType::String,
                &["photo", "thumbnail"],
            ),
            AttributeDescriptor::multi_complex(
                SCHEMA_URI_CORE_USER,
                "addresses",
                vec![
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "formatted", DataType::String),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "streetAddress", DataType::String),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "locality", DataType::String),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "region", DataType::String),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "postalCode", DataType::String),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "country", DataType::String),
                ],
                &["work", "home", "other"],
            ),
            AttributeDescriptor::complex(
                SCHEMA_URI_CORE_USER,
                "meta",
                vec![
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "created", DataType::DateTime),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "lastModified", DataType::DateTime),
                ],
            ),
        ],
    );

    /// Core Group resource descriptor
    pub static ref GROUP_DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new(
        "Group",
        SCHEMA_URI_CORE_GROUP,
        vec![
            AttributeDescriptor::simple(SCHEMA_URI_CORE_GROUP, "id", DataType::String),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_GROUP, "externalId", DataType::String),
            AttributeDescriptor::simple(SCHEMA_URI_CORE_GROUP, "displayName", DataType::String),
            AttributeDescriptor::multi_simple(SCHEMA_URI_CORE_GROUP, "members", DataType::String, &[]),
            AttributeDescriptor::complex(
                SCHEMA_URI_CORE_GROUP,
                "meta",
                vec![
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_GROUP, "created", DataType::DateTime),
                    AttributeDescriptor::simple(SCHEMA_URI_CORE_GROUP, "lastModified", DataType::DateTime),
                ],
            ),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_descriptor_attribute_lookup() {
        let attr = USER_DESCRIPTOR.attribute("username").unwrap();
        assert_eq!(attr.name, "userName");
        assert_eq!(attr.data_type, DataType::String);
        assert!(!attr.multi_valued);

        assert!(USER_DESCRIPTOR.attribute("nonexistent").is_none());
    }

    #[test]
    fn test_complex_sub_attribute_lookup() {
        let name = USER_DESCRIPTOR.attribute("name").unwrap();
        assert_eq!(name.data_type, DataType::Complex);
        let family = name.sub_attribute("FAMILYNAME").unwrap();
        assert_eq!(family.name, "familyName");
        assert!(name.sub_attribute("value").is_none());
    }

    #[test]
    fn test_multi_simple_has_normative_sub_attributes() {
        let emails = USER_DESCRIPTOR.attribute("emails").unwrap();
        assert!(emails.multi_valued);
        assert_eq!(emails.data_type, DataType::String);
        assert_eq!(emails.sub_attribute("value").unwrap().data_type, DataType::String);
        assert_eq!(emails.sub_attribute("type").unwrap().data_type, DataType::String);
        assert_eq!(
            emails.sub_attribute("primary").unwrap().data_type,
            DataType::Boolean
        );
        assert_eq!(emails.canonical_types, vec!["work", "home", "other"]);
    }

    #[test]
    fn test_multi_complex_gains_type_and_primary() {
        let addresses = USER_DESCRIPTOR.attribute("addresses").unwrap();
        assert!(addresses.multi_valued);
        assert_eq!(addresses.data_type, DataType::Complex);
        assert!(addresses.sub_attribute("streetAddress").is_some());
        assert!(addresses.sub_attribute("type").is_some());
        assert!(addresses.sub_attribute("primary").is_some());
    }

    #[test]
    fn test_meta_is_datetime() {
        let meta = USER_DESCRIPTOR.attribute("meta").unwrap();
        assert_eq!(
            meta.sub_attribute("created").unwrap().data_type,
            DataType::DateTime
        );
    }
}
