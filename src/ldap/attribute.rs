//! LDAP attributes and entries as handled by the mapping layer: flat sets
//! of octet-string values indexed by a case-insensitive attribute type.

/// One LDAP attribute: a type name plus an ordered list of raw values.
#[derive(Debug, Clone, PartialEq)]
pub struct LdapAttribute {
    name: String,
    values: Vec<Vec<u8>>,
}

impl LdapAttribute {
    pub fn new(name: impl Into<String>, value: Vec<u8>) -> Self {
        LdapAttribute {
            name: name.into(),
            values: vec![value],
        }
    }

    pub fn with_values(name: impl Into<String>, values: Vec<Vec<u8>>) -> Self {
        LdapAttribute {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Vec<u8>] {
        &self.values
    }

    pub fn first_value(&self) -> Option<&[u8]> {
        self.values.first().map(|v| v.as_slice())
    }

    pub fn add_value(&mut self, value: Vec<u8>) {
        self.values.push(value);
    }
}

/// An LDAP entry under construction or read from the directory. Attribute
/// types are unique within an entry; adding values for an existing type
/// merges them in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LdapEntry {
    attributes: Vec<LdapAttribute>,
}

impl LdapEntry {
    pub fn new() -> Self {
        LdapEntry::default()
    }

    /// Build an entry from a list of attributes, merging duplicate types.
    pub fn from_attributes(attributes: Vec<LdapAttribute>) -> Self {
        let mut entry = LdapEntry::new();
        for attribute in attributes {
            entry.add_attribute(attribute);
        }
        entry
    }

    pub fn add_attribute(&mut self, attribute: LdapAttribute) {
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(&attribute.name))
        {
            Some(existing) => existing.values.extend(attribute.values),
            None => self.attributes.push(attribute),
        }
    }

    pub fn get(&self, name: &str) -> Option<&LdapAttribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn attributes(&self) -> &[LdapAttribute] {
        &self.attributes
    }
}
