//! The resource mapper: the ordered set of attribute mappers for one SCIM
//! resource type, plus the structural object classes and the DN template.
//!
//! The filter compiler lives here too: it walks the parsed SCIM filter and
//! delegates each leaf to the mapper owning the referenced attribute.
//! Compilation is total; a leaf that no mapper can satisfy becomes the
//! always-false filter so that an enclosing disjunction can still match.

use tracing::debug;

use crate::error::{Error, Result};
use crate::ldap::attribute::{LdapAttribute, LdapEntry};
use crate::ldap::filter::LdapFilter;
use crate::mapping::attribute::AttributeMapper;
use crate::parser::filter::{FilterType, ScimFilter};
use crate::parser::sort_parser::SortSpec;
use crate::scim::path::AttributePath;
use crate::scim::value::{ScimAttribute, ScimObject};

/// The set of SCIM attributes a client asked to be returned. An empty
/// projection selects every mapped attribute.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    attributes: Vec<String>,
}

impl Projection {
    pub fn all() -> Self {
        Projection::default()
    }

    pub fn of(attributes: &[&str]) -> Self {
        Projection {
            attributes: attributes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse the comma-separated `attributes` query parameter.
    pub fn from_param(attributes: Option<&str>) -> Self {
        let attributes = attributes
            .map(|s| {
                s.split(',')
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Projection { attributes }
    }

    pub fn includes(&self, attribute_name: &str) -> bool {
        self.attributes.is_empty()
            || self
                .attributes
                .iter()
                .any(|a| a.eq_ignore_ascii_case(attribute_name))
    }
}

/// Maps one SCIM resource type onto its LDAP representation.
#[derive(Debug, Clone)]
pub struct ResourceMapper {
    resource_name: String,
    object_classes: Vec<String>,
    dn_template: String,
    mappers: Vec<AttributeMapper>,
}

impl ResourceMapper {
    pub fn new(
        resource_name: impl Into<String>,
        object_classes: Vec<String>,
        dn_template: impl Into<String>,
        mappers: Vec<AttributeMapper>,
    ) -> Self {
        ResourceMapper {
            resource_name: resource_name.into(),
            object_classes,
            dn_template: dn_template.into(),
            mappers,
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn mappers(&self) -> &[AttributeMapper] {
        &self.mappers
    }

    /// Every LDAP attribute type read or written by this resource mapping,
    /// in declared order.
    pub fn ldap_attribute_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for mapper in &self.mappers {
            for name in mapper.ldap_attribute_types() {
                if !types.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
                    types.push(name);
                }
            }
        }
        types
    }

    /// Map a SCIM resource to the LDAP attributes of a new or replaced
    /// entry, including the configured structural object classes.
    pub fn to_ldap_attributes(&self, object: &ScimObject) -> Result<Vec<LdapAttribute>> {
        let mut out = Vec::new();
        for mapper in &self.mappers {
            mapper.to_ldap_attributes(object, &mut out)?;
        }
        if !self.object_classes.is_empty() {
            out.push(LdapAttribute::with_values(
                "objectClass",
                self.object_classes
                    .iter()
                    .map(|oc| oc.as_bytes().to_vec())
                    .collect(),
            ));
        }
        Ok(out)
    }

    /// Map an LDAP entry to the SCIM attributes selected by the projection.
    /// An attribute whose values cannot be converted is skipped rather than
    /// failing the whole read.
    pub fn to_scim_attributes(&self, entry: &LdapEntry, projection: &Projection) -> Vec<ScimAttribute> {
        let mut attributes = Vec::new();
        for mapper in &self.mappers {
            if !projection.includes(mapper.scim_name()) {
                continue;
            }
            match mapper.to_scim_attribute(entry) {
                Ok(Some(attribute)) => attributes.push(attribute),
                Ok(None) => {}
                Err(e) => {
                    debug!(
                        attribute = %mapper.scim_name(),
                        error = %e,
                        "skipping attribute that failed to convert"
                    );
                }
            }
        }
        attributes
    }

    /// Compile a SCIM filter to an LDAP filter.
    pub fn to_ldap_filter(&self, filter: &ScimFilter) -> Result<LdapFilter> {
        match filter.filter_type() {
            FilterType::And => Ok(LdapFilter::And(self.compile_components(filter)?)),
            FilterType::Or => Ok(LdapFilter::Or(self.compile_components(filter)?)),
            _ => {
                let path = filter.filter_attribute().ok_or_else(|| {
                    Error::Internal("comparison filter without an attribute path".to_string())
                })?;
                match self.mapper_for(path) {
                    Some(mapper) => mapper.to_ldap_filter(filter),
                    None => {
                        debug!(attribute = %path, "filter on unmapped attribute is unsatisfiable");
                        Ok(LdapFilter::always_false())
                    }
                }
            }
        }
    }

    fn compile_components(&self, filter: &ScimFilter) -> Result<Vec<LdapFilter>> {
        filter
            .filter_components()
            .iter()
            .map(|component| self.to_ldap_filter(component))
            .collect()
    }

    /// The LDAP attribute that realizes a SCIM sort key, if the sort
    /// attribute is mapped and its mapper supports server-side sorting.
    pub fn to_ldap_sort_key(&self, sort: &SortSpec) -> Option<String> {
        self.mapper_for(&sort.attribute)?
            .to_ldap_sort_attribute()
            .map(str::to_string)
    }

    /// Resolve the DN template against the resource's mapped attributes.
    /// Placeholders take the form `{attrName}` and resolve to the first
    /// LDAP value the named attribute maps to.
    pub fn construct_dn(&self, object: &ScimObject) -> Result<String> {
        let mut dn = String::with_capacity(self.dn_template.len());
        let mut rest = self.dn_template.as_str();
        while let Some(start) = rest.find('{') {
            let Some(end) = rest[start..].find('}') else {
                return Err(Error::Configuration(format!(
                    "unterminated placeholder in DN template '{}'",
                    self.dn_template
                )));
            };
            dn.push_str(&rest[..start]);
            let name = &rest[start + 1..start + end];
            dn.push_str(&self.resolve_dn_attribute(object, name)?);
            rest = &rest[start + end + 1..];
        }
        dn.push_str(rest);
        Ok(dn)
    }

    fn resolve_dn_attribute(&self, object: &ScimObject, name: &str) -> Result<String> {
        let Some(mapper) = self
            .mappers
            .iter()
            .find(|m| m.scim_name().eq_ignore_ascii_case(name))
        else {
            return Err(Error::Configuration(format!(
                "DN template for '{}' refers to unmapped attribute '{}'",
                self.resource_name, name
            )));
        };
        let mut attributes = Vec::new();
        mapper.to_ldap_attributes(object, &mut attributes)?;
        let value = attributes
            .first()
            .and_then(LdapAttribute::first_value)
            .ok_or_else(|| {
                Error::UnsupportedConversion(format!(
                    "the DN template requires a value for attribute '{}'",
                    name
                ))
            })?;
        String::from_utf8(value.to_vec()).map_err(|_| {
            Error::UnsupportedConversion(format!(
                "the DN value for attribute '{}' is not valid UTF-8",
                name
            ))
        })
    }

    /// Find the mapper owning the attribute a filter path refers to. The
    /// name comparison is case-insensitive; when the path carries a schema
    /// URI it must match the mapper's schema exactly.
    fn mapper_for(&self, path: &AttributePath) -> Option<&AttributeMapper> {
        self.mappers.iter().find(|m| {
            m.scim_name().eq_ignore_ascii_case(&path.attribute)
                && path
                    .schema
                    .as_deref()
                    .map_or(true, |schema| m.scim_schema() == schema)
        })
    }
}
