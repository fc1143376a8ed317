//! The in-memory SCIM resource model the mapping layer operates on.
//!
//! JSON and XML marshalling happen outside this crate; here a resource is a
//! list of named attributes whose simple values are carried as
//! `serde_json::Value` scalars.

use serde_json::{Map, Value};

/// A single SCIM attribute value: either a simple scalar or a complex value
/// holding named simple sub-attribute values.
#[derive(Debug, Clone, PartialEq)]
pub enum ScimValue {
    Simple(Value),
    Complex(Map<String, Value>),
}

impl ScimValue {
    pub fn as_simple(&self) -> Option<&Value> {
        match self {
            ScimValue::Simple(v) => Some(v),
            ScimValue::Complex(_) => None,
        }
    }

    pub fn as_complex(&self) -> Option<&Map<String, Value>> {
        match self {
            ScimValue::Simple(_) => None,
            ScimValue::Complex(map) => Some(map),
        }
    }

    /// Look up a sub-attribute value by name, case-insensitively.
    pub fn sub_value(&self, name: &str) -> Option<&Value> {
        let map = self.as_complex()?;
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

/// Whether an attribute holds one value or a list of values.
#[derive(Debug, Clone, PartialEq)]
pub enum ScimAttributeValue {
    Singular(ScimValue),
    Plural(Vec<ScimValue>),
}

/// A named attribute of a SCIM resource, qualified by its schema URI.
#[derive(Debug, Clone, PartialEq)]
pub struct ScimAttribute {
    pub schema: String,
    pub name: String,
    pub value: ScimAttributeValue,
}

impl ScimAttribute {
    pub fn singular(schema: impl Into<String>, name: impl Into<String>, value: ScimValue) -> Self {
        ScimAttribute {
            schema: schema.into(),
            name: name.into(),
            value: ScimAttributeValue::Singular(value),
        }
    }

    pub fn plural(
        schema: impl Into<String>,
        name: impl Into<String>,
        values: Vec<ScimValue>,
    ) -> Self {
        ScimAttribute {
            schema: schema.into(),
            name: name.into(),
            value: ScimAttributeValue::Plural(values),
        }
    }

    pub fn singular_value(&self) -> Option<&ScimValue> {
        match &self.value {
            ScimAttributeValue::Singular(v) => Some(v),
            ScimAttributeValue::Plural(_) => None,
        }
    }

    /// The attribute's values as a slice, regardless of plurality.
    pub fn values(&self) -> &[ScimValue] {
        match &self.value {
            ScimAttributeValue::Singular(v) => std::slice::from_ref(v),
            ScimAttributeValue::Plural(values) => values,
        }
    }
}

/// A SCIM resource: an ordered set of attributes plus the resource type name.
///
/// Attribute names are case-insensitive; schema URIs are case-sensitive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScimObject {
    resource_type: String,
    attributes: Vec<ScimAttribute>,
}

impl ScimObject {
    pub fn new(resource_type: impl Into<String>) -> Self {
        ScimObject {
            resource_type: resource_type.into(),
            attributes: Vec::new(),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn add_attribute(&mut self, attribute: ScimAttribute) {
        self.attributes.push(attribute);
    }

    pub fn get_attribute(&self, schema: &str, name: &str) -> Option<&ScimAttribute> {
        self.attributes
            .iter()
            .find(|a| a.schema == schema && a.name.eq_ignore_ascii_case(name))
    }

    pub fn attributes(&self) -> &[ScimAttribute] {
        &self.attributes
    }
}
