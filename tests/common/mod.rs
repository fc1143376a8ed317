//! Shared helpers for the integration tests: registry construction, resource
//! builders, and reference evaluators for SCIM and LDAP filters used by the
//! compiler soundness checks.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Map, Value};

use scim_ldap_gateway::parser::filter::{FilterType, ScimFilter};
use scim_ldap_gateway::scim::value::{ScimAttribute, ScimObject, ScimValue};
use scim_ldap_gateway::{
    GatewayConfig, LdapEntry, LdapFilter, MappingRegistry, ResourceMapper, SchemaRegistry,
};

pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const GROUP_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";

pub fn registry() -> MappingRegistry {
    MappingRegistry::from_config(&GatewayConfig::default_config(), &SchemaRegistry::new())
        .expect("default configuration must build")
}

pub fn user_mapper() -> Arc<ResourceMapper> {
    registry().get("User").expect("User mapping").clone()
}

pub fn group_mapper() -> Arc<ResourceMapper> {
    registry().get("Group").expect("Group mapping").clone()
}

pub fn complex(fields: &[(&str, Value)]) -> ScimValue {
    let mut map = Map::new();
    for (name, value) in fields {
        map.insert(name.to_string(), value.clone());
    }
    ScimValue::Complex(map)
}

pub fn singular(object: &mut ScimObject, name: &str, value: Value) {
    object.add_attribute(ScimAttribute::singular(
        USER_SCHEMA,
        name,
        ScimValue::Simple(value),
    ));
}

/// Evaluate a SCIM filter against a resource, mirroring the matching rules
/// the REST layer applies. Used as the reference model for compiler
/// soundness: whenever this accepts, the compiled LDAP filter must accept
/// the mapped entry.
pub fn scim_matches(filter: &ScimFilter, object: &ScimObject) -> bool {
    match filter.filter_type() {
        FilterType::And => filter
            .filter_components()
            .iter()
            .all(|component| scim_matches(component, object)),
        FilterType::Or => filter
            .filter_components()
            .iter()
            .any(|component| scim_matches(component, object)),
        _ => {
            let path = filter.filter_attribute().expect("leaf carries a path");
            let attribute = object
                .attributes()
                .iter()
                .find(|a| a.name.eq_ignore_ascii_case(&path.attribute));
            let candidates = match attribute {
                None => Vec::new(),
                Some(attribute) => candidate_values(attribute, path.sub_attribute.as_deref()),
            };
            match filter.filter_type() {
                FilterType::Pr => !candidates.is_empty(),
                _ => {
                    let value = filter.filter_value().expect("comparison carries a value");
                    candidates.iter().any(|candidate| {
                        let candidate = value_as_string(candidate);
                        match filter.filter_type() {
                            FilterType::Eq => candidate == value,
                            FilterType::Co => candidate.contains(value),
                            FilterType::Sw => candidate.starts_with(value),
                            FilterType::Gt => candidate.as_str() > value,
                            FilterType::Ge => candidate.as_str() >= value,
                            FilterType::Lt => candidate.as_str() < value,
                            FilterType::Le => candidate.as_str() <= value,
                            _ => unreachable!(),
                        }
                    })
                }
            }
        }
    }
}

/// The simple values a filter path selects from an attribute. A bare path
/// on multi-valued entries targets the normative `value` sub-attribute.
fn candidate_values(attribute: &ScimAttribute, sub: Option<&str>) -> Vec<Value> {
    let mut candidates = Vec::new();
    for value in attribute.values() {
        match (value, sub) {
            (ScimValue::Simple(v), None) => candidates.push(v.clone()),
            (ScimValue::Simple(_), Some(_)) => {}
            (ScimValue::Complex(_), sub) => {
                let name = sub.unwrap_or("value");
                if let Some(v) = value.sub_value(name) {
                    candidates.push(v.clone());
                }
            }
        }
    }
    candidates
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Evaluate an RFC 4515 filter tree against an entry the way a directory
/// server would, on the UTF-8 readings of the attribute values.
pub fn ldap_matches(filter: &LdapFilter, entry: &LdapEntry) -> bool {
    match filter {
        LdapFilter::And(components) => components.iter().all(|c| ldap_matches(c, entry)),
        LdapFilter::Or(components) => components.iter().any(|c| ldap_matches(c, entry)),
        LdapFilter::Equality(attribute, value) => {
            entry_values(entry, attribute).iter().any(|v| v == value)
        }
        LdapFilter::Substring {
            attribute,
            initial,
            any,
            end,
        } => entry_values(entry, attribute)
            .iter()
            .any(|v| substring_match(v, initial.as_deref(), any, end.as_deref())),
        LdapFilter::Presence(attribute) => !entry_values(entry, attribute).is_empty(),
        LdapFilter::GreaterOrEqual(attribute, value) => entry_values(entry, attribute)
            .iter()
            .any(|v| v.as_str() >= value.as_str()),
        LdapFilter::LessOrEqual(attribute, value) => entry_values(entry, attribute)
            .iter()
            .any(|v| v.as_str() <= value.as_str()),
    }
}

fn entry_values(entry: &LdapEntry, attribute: &str) -> Vec<String> {
    entry
        .get(attribute)
        .map(|a| {
            a.values()
                .iter()
                .filter_map(|raw| String::from_utf8(raw.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn substring_match(value: &str, initial: Option<&str>, any: &[String], end: Option<&str>) -> bool {
    let mut rest = value;
    if let Some(initial) = initial {
        match rest.strip_prefix(initial) {
            Some(stripped) => rest = stripped,
            None => return false,
        }
    }
    if let Some(end) = end {
        match rest.strip_suffix(end) {
            Some(stripped) => rest = stripped,
            None => return false,
        }
    }
    for part in any {
        match rest.find(part.as_str()) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    true
}
