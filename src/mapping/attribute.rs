//! The four attribute-mapper variants binding one SCIM attribute to one or
//! more LDAP attributes.
//!
//! The set of variants is closed, so they are modeled as a tagged sum with
//! match-based dispatch rather than a trait object. Mappers are built once
//! from configuration and shared read-only across workers.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

use crate::error::{Error, Result};
use crate::ldap::attribute::{LdapAttribute, LdapEntry};
use crate::ldap::filter::LdapFilter;
use crate::mapping::transform::Transformation;
use crate::parser::filter::{FilterType, ScimFilter};
use crate::schema::definitions::AttributeDescriptor;
use crate::scim::value::{ScimAttribute, ScimObject, ScimValue};

/// One LDAP attribute type together with the transformation applied to the
/// values flowing through it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBinding {
    pub ldap_attribute: String,
    pub transformation: Transformation,
}

impl AttributeBinding {
    pub fn new(ldap_attribute: impl Into<String>, transformation: Transformation) -> Self {
        AttributeBinding {
            ldap_attribute: ldap_attribute.into(),
            transformation,
        }
    }
}

/// Binds one SCIM sub-attribute to an LDAP attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct SubAttributeBinding {
    pub sub_attribute: String,
    pub binding: AttributeBinding,
}

impl SubAttributeBinding {
    pub fn new(sub_attribute: impl Into<String>, binding: AttributeBinding) -> Self {
        SubAttributeBinding {
            sub_attribute: sub_attribute.into(),
            binding,
        }
    }
}

/// Binds one type tag of a plural simple attribute to an LDAP attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeBinding {
    pub type_tag: String,
    pub binding: AttributeBinding,
}

impl TypeBinding {
    pub fn new(type_tag: impl Into<String>, binding: AttributeBinding) -> Self {
        TypeBinding {
            type_tag: type_tag.into(),
            binding,
        }
    }
}

/// One canonical value group of a plural complex attribute: a type tag plus
/// the per-sub-attribute LDAP bindings for values carrying that tag.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalValueGroup {
    pub type_tag: String,
    pub sub_attributes: Vec<SubAttributeBinding>,
}

impl CanonicalValueGroup {
    pub fn new(type_tag: impl Into<String>, sub_attributes: Vec<SubAttributeBinding>) -> Self {
        CanonicalValueGroup {
            type_tag: type_tag.into(),
            sub_attributes,
        }
    }

    fn sub_binding(&self, name: &str) -> Option<&SubAttributeBinding> {
        self.sub_attributes
            .iter()
            .find(|s| s.sub_attribute.eq_ignore_ascii_case(name))
    }
}

/// An attribute mapper: one SCIM attribute bound to its LDAP representation.
#[derive(Debug, Clone)]
pub enum AttributeMapper {
    SingularSimple(SingularSimpleMapper),
    SingularComplex(SingularComplexMapper),
    PluralSimple(PluralSimpleMapper),
    PluralComplex(PluralComplexMapper),
}

impl AttributeMapper {
    pub fn singular_simple(descriptor: Arc<AttributeDescriptor>, binding: AttributeBinding) -> Self {
        AttributeMapper::SingularSimple(SingularSimpleMapper {
            descriptor,
            binding,
        })
    }

    pub fn singular_complex(
        descriptor: Arc<AttributeDescriptor>,
        sub_bindings: Vec<SubAttributeBinding>,
    ) -> Self {
        AttributeMapper::SingularComplex(SingularComplexMapper {
            descriptor,
            sub_bindings,
        })
    }

    pub fn plural_simple(
        descriptor: Arc<AttributeDescriptor>,
        type_bindings: Vec<TypeBinding>,
        default_binding: Option<AttributeBinding>,
    ) -> Self {
        AttributeMapper::PluralSimple(PluralSimpleMapper {
            descriptor,
            type_bindings,
            default_binding,
        })
    }

    pub fn plural_complex(
        descriptor: Arc<AttributeDescriptor>,
        groups: Vec<CanonicalValueGroup>,
    ) -> Self {
        AttributeMapper::PluralComplex(PluralComplexMapper { descriptor, groups })
    }

    pub fn descriptor(&self) -> &AttributeDescriptor {
        match self {
            AttributeMapper::SingularSimple(m) => &m.descriptor,
            AttributeMapper::SingularComplex(m) => &m.descriptor,
            AttributeMapper::PluralSimple(m) => &m.descriptor,
            AttributeMapper::PluralComplex(m) => &m.descriptor,
        }
    }

    pub fn scim_schema(&self) -> &str {
        &self.descriptor().schema
    }

    pub fn scim_name(&self) -> &str {
        &self.descriptor().name
    }

    /// The LDAP attribute types this mapper reads and writes.
    pub fn ldap_attribute_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !types.iter().any(|t| t.eq_ignore_ascii_case(name)) {
                types.push(name.to_string());
            }
        };
        match self {
            AttributeMapper::SingularSimple(m) => push(&m.binding.ldap_attribute),
            AttributeMapper::SingularComplex(m) => {
                for sub in &m.sub_bindings {
                    push(&sub.binding.ldap_attribute);
                }
            }
            AttributeMapper::PluralSimple(m) => {
                for tb in &m.type_bindings {
                    push(&tb.binding.ldap_attribute);
                }
                if let Some(binding) = &m.default_binding {
                    push(&binding.ldap_attribute);
                }
            }
            AttributeMapper::PluralComplex(m) => {
                for group in &m.groups {
                    for sub in &group.sub_attributes {
                        push(&sub.binding.ldap_attribute);
                    }
                }
            }
        }
        types
    }

    /// Append the LDAP attributes for this SCIM attribute, if present on
    /// the resource.
    pub fn to_ldap_attributes(
        &self,
        object: &ScimObject,
        out: &mut Vec<LdapAttribute>,
    ) -> Result<()> {
        match self {
            AttributeMapper::SingularSimple(m) => m.to_ldap_attributes(object, out),
            AttributeMapper::SingularComplex(m) => m.to_ldap_attributes(object, out),
            AttributeMapper::PluralSimple(m) => m.to_ldap_attributes(object, out),
            AttributeMapper::PluralComplex(m) => m.to_ldap_attributes(object, out),
        }
    }

    /// Assemble the SCIM attribute from an LDAP entry, or `None` when none
    /// of the mapped LDAP attributes is present.
    pub fn to_scim_attribute(&self, entry: &LdapEntry) -> Result<Option<ScimAttribute>> {
        match self {
            AttributeMapper::SingularSimple(m) => m.to_scim_attribute(entry),
            AttributeMapper::SingularComplex(m) => m.to_scim_attribute(entry),
            AttributeMapper::PluralSimple(m) => m.to_scim_attribute(entry),
            AttributeMapper::PluralComplex(m) => m.to_scim_attribute(entry),
        }
    }

    /// Translate a filter leaf whose attribute path targets this mapper.
    pub fn to_ldap_filter(&self, filter: &ScimFilter) -> Result<LdapFilter> {
        match self {
            AttributeMapper::SingularSimple(m) => m.to_ldap_filter(filter),
            AttributeMapper::SingularComplex(m) => m.to_ldap_filter(filter),
            AttributeMapper::PluralSimple(m) => m.to_ldap_filter(filter),
            AttributeMapper::PluralComplex(m) => m.to_ldap_filter(filter),
        }
    }

    /// The LDAP attribute representing this attribute's sort order, if any.
    pub fn to_ldap_sort_attribute(&self) -> Option<&str> {
        match self {
            AttributeMapper::SingularSimple(m) => Some(&m.binding.ldap_attribute),
            AttributeMapper::SingularComplex(_) => None,
            AttributeMapper::PluralSimple(m) => m
                .type_bindings
                .first()
                .map(|tb| tb.binding.ldap_attribute.as_str())
                .or(m.default_binding.as_ref().map(|b| b.ldap_attribute.as_str())),
            AttributeMapper::PluralComplex(_) => None,
        }
    }
}

/// One SCIM simple attribute held in one LDAP attribute.
#[derive(Debug, Clone)]
pub struct SingularSimpleMapper {
    descriptor: Arc<AttributeDescriptor>,
    binding: AttributeBinding,
}

impl SingularSimpleMapper {
    fn to_ldap_attributes(&self, object: &ScimObject, out: &mut Vec<LdapAttribute>) -> Result<()> {
        let Some(attribute) = object.get_attribute(&self.descriptor.schema, &self.descriptor.name)
        else {
            return Ok(());
        };
        let Some(value) = attribute.singular_value().and_then(ScimValue::as_simple) else {
            warn!(
                attribute = %self.descriptor.name,
                "expected a singular simple value; skipping"
            );
            return Ok(());
        };
        let raw = self
            .binding
            .transformation
            .to_ldap_value(&self.descriptor, value)?;
        out.push(LdapAttribute::new(self.binding.ldap_attribute.clone(), raw));
        Ok(())
    }

    fn to_scim_attribute(&self, entry: &LdapEntry) -> Result<Option<ScimAttribute>> {
        let Some(raw) = entry
            .get(&self.binding.ldap_attribute)
            .and_then(LdapAttribute::first_value)
        else {
            return Ok(None);
        };
        let value = self.binding.transformation.to_scim_value(&self.descriptor, raw)?;
        Ok(Some(ScimAttribute::singular(
            self.descriptor.schema.clone(),
            self.descriptor.name.clone(),
            ScimValue::Simple(value),
        )))
    }

    fn to_ldap_filter(&self, filter: &ScimFilter) -> Result<LdapFilter> {
        simple_filter(
            &self.binding.ldap_attribute,
            self.binding.transformation,
            filter,
        )
    }
}

/// One SCIM complex attribute spread over a fixed set of LDAP attributes,
/// one per mapped sub-attribute.
#[derive(Debug, Clone)]
pub struct SingularComplexMapper {
    descriptor: Arc<AttributeDescriptor>,
    sub_bindings: Vec<SubAttributeBinding>,
}

impl SingularComplexMapper {
    fn to_ldap_attributes(&self, object: &ScimObject, out: &mut Vec<LdapAttribute>) -> Result<()> {
        let Some(attribute) = object.get_attribute(&self.descriptor.schema, &self.descriptor.name)
        else {
            return Ok(());
        };
        let Some(value) = attribute.singular_value() else {
            warn!(
                attribute = %self.descriptor.name,
                "expected a singular complex value; skipping"
            );
            return Ok(());
        };
        for sub in &self.sub_bindings {
            let Some(sub_value) = value.sub_value(&sub.sub_attribute) else {
                continue;
            };
            let Some(sub_descriptor) = self.descriptor.sub_attribute(&sub.sub_attribute) else {
                warn!(
                    attribute = %self.descriptor.name,
                    sub_attribute = %sub.sub_attribute,
                    "mapped sub-attribute missing from schema; skipping"
                );
                continue;
            };
            let raw = sub
                .binding
                .transformation
                .to_ldap_value(sub_descriptor, sub_value)?;
            out.push(LdapAttribute::new(sub.binding.ldap_attribute.clone(), raw));
        }
        Ok(())
    }

    fn to_scim_attribute(&self, entry: &LdapEntry) -> Result<Option<ScimAttribute>> {
        let mut members = Map::new();
        for sub in &self.sub_bindings {
            let Some(sub_descriptor) = self.descriptor.sub_attribute(&sub.sub_attribute) else {
                continue;
            };
            if let Some(raw) = entry
                .get(&sub.binding.ldap_attribute)
                .and_then(LdapAttribute::first_value)
            {
                let value = sub.binding.transformation.to_scim_value(sub_descriptor, raw)?;
                members.insert(sub_descriptor.name.clone(), value);
            }
        }
        if members.is_empty() {
            return Ok(None);
        }
        Ok(Some(ScimAttribute::singular(
            self.descriptor.schema.clone(),
            self.descriptor.name.clone(),
            ScimValue::Complex(members),
        )))
    }

    fn to_ldap_filter(&self, filter: &ScimFilter) -> Result<LdapFilter> {
        // A filter on the complex attribute itself cannot be satisfied.
        let Some(sub_name) = filter
            .filter_attribute()
            .and_then(|path| path.sub_attribute.as_deref())
        else {
            return Ok(LdapFilter::always_false());
        };
        let Some(sub) = self
            .sub_bindings
            .iter()
            .find(|s| s.sub_attribute.eq_ignore_ascii_case(sub_name))
        else {
            return Ok(LdapFilter::always_false());
        };
        simple_filter(&sub.binding.ldap_attribute, sub.binding.transformation, filter)
    }
}

/// One SCIM multi-valued simple attribute fanned out over one LDAP
/// attribute per recognized type tag, with an optional default attribute
/// for untyped values.
#[derive(Debug, Clone)]
pub struct PluralSimpleMapper {
    descriptor: Arc<AttributeDescriptor>,
    type_bindings: Vec<TypeBinding>,
    default_binding: Option<AttributeBinding>,
}

impl PluralSimpleMapper {
    /// The descriptor used to transform the scalar of each value.
    fn value_descriptor(&self) -> &AttributeDescriptor {
        self.descriptor
            .sub_attribute("value")
            .unwrap_or(&self.descriptor)
    }

    fn to_ldap_attributes(&self, object: &ScimObject, out: &mut Vec<LdapAttribute>) -> Result<()> {
        let Some(attribute) = object.get_attribute(&self.descriptor.schema, &self.descriptor.name)
        else {
            return Ok(());
        };
        let value_descriptor = self.value_descriptor();

        for tb in &self.type_bindings {
            let mut raws = Vec::new();
            for value in attribute.values() {
                let (scalar, tag) = split_plural_value(value);
                let Some(scalar) = scalar else { continue };
                if tag.is_some_and(|t| t.eq_ignore_ascii_case(&tb.type_tag)) {
                    raws.push(
                        tb.binding
                            .transformation
                            .to_ldap_value(value_descriptor, scalar)?,
                    );
                }
            }
            if !raws.is_empty() {
                out.push(LdapAttribute::with_values(
                    tb.binding.ldap_attribute.clone(),
                    raws,
                ));
            }
        }

        // Values with no recognized tag fall through to the default
        // attribute, or are dropped when none is declared.
        let mut raws = Vec::new();
        for value in attribute.values() {
            let (scalar, tag) = split_plural_value(value);
            let Some(scalar) = scalar else { continue };
            let recognized = tag.is_some_and(|t| {
                self.type_bindings
                    .iter()
                    .any(|tb| tb.type_tag.eq_ignore_ascii_case(t))
            });
            if recognized {
                continue;
            }
            match &self.default_binding {
                Some(binding) => {
                    raws.push(binding.transformation.to_ldap_value(value_descriptor, scalar)?)
                }
                None => warn!(
                    attribute = %self.descriptor.name,
                    r#type = tag.unwrap_or("<none>"),
                    "no LDAP attribute for value type; dropping value"
                ),
            }
        }
        if let (Some(binding), false) = (&self.default_binding, raws.is_empty()) {
            out.push(LdapAttribute::with_values(
                binding.ldap_attribute.clone(),
                raws,
            ));
        }
        Ok(())
    }

    fn to_scim_attribute(&self, entry: &LdapEntry) -> Result<Option<ScimAttribute>> {
        let mut values: Vec<ScimValue> = Vec::new();

        for tb in &self.type_bindings {
            if let Some(attribute) = entry.get(&tb.binding.ldap_attribute) {
                for raw in attribute.values() {
                    self.emit_value(&mut values, raw, tb.binding.transformation, Some(&tb.type_tag))?;
                }
            }
        }
        if let Some(binding) = &self.default_binding {
            if let Some(attribute) = entry.get(&binding.ldap_attribute) {
                for raw in attribute.values() {
                    self.emit_value(&mut values, raw, binding.transformation, None)?;
                }
            }
        }

        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(ScimAttribute::plural(
            self.descriptor.schema.clone(),
            self.descriptor.name.clone(),
            values,
        )))
    }

    /// Append one plural entry `{value, type, primary}`. The first entry
    /// emitted carries `primary=true`.
    fn emit_value(
        &self,
        values: &mut Vec<ScimValue>,
        raw: &[u8],
        transformation: Transformation,
        tag: Option<&str>,
    ) -> Result<()> {
        let value = transformation.to_scim_value(self.value_descriptor(), raw)?;
        let mut member = Map::new();
        member.insert("value".to_string(), value);
        if let Some(tag) = tag {
            member.insert("type".to_string(), Value::String(tag.to_string()));
        }
        if values.is_empty() {
            member.insert("primary".to_string(), Value::Bool(true));
        }
        values.push(ScimValue::Complex(member));
        Ok(())
    }

    fn to_ldap_filter(&self, filter: &ScimFilter) -> Result<LdapFilter> {
        let sub_name = filter
            .filter_attribute()
            .and_then(|path| path.sub_attribute.as_deref());
        match sub_name {
            // The top-level value and the `value` sub-attribute behave the
            // same: any mapped LDAP attribute may hold a matching value.
            None => self.filter_across_all(filter),
            Some(name) if name.eq_ignore_ascii_case("value") => self.filter_across_all(filter),
            Some(name) if name.eq_ignore_ascii_case("type") => {
                if filter.filter_type() != FilterType::Eq {
                    return Ok(LdapFilter::always_false());
                }
                let Some(tag) = filter.filter_value() else {
                    return Ok(LdapFilter::always_false());
                };
                match self
                    .type_bindings
                    .iter()
                    .find(|tb| tb.type_tag.eq_ignore_ascii_case(tag))
                {
                    Some(tb) => Ok(LdapFilter::presence(tb.binding.ldap_attribute.clone())),
                    None => Ok(LdapFilter::always_false()),
                }
            }
            Some(_) => Ok(LdapFilter::always_false()),
        }
    }

    fn filter_across_all(&self, filter: &ScimFilter) -> Result<LdapFilter> {
        let mut components = Vec::new();
        for tb in &self.type_bindings {
            components.push(simple_filter(
                &tb.binding.ldap_attribute,
                tb.binding.transformation,
                filter,
            )?);
        }
        if let Some(binding) = &self.default_binding {
            components.push(simple_filter(
                &binding.ldap_attribute,
                binding.transformation,
                filter,
            )?);
        }
        if components.is_empty() {
            return Ok(LdapFilter::always_false());
        }
        Ok(LdapFilter::or_of(components))
    }
}

/// One SCIM multi-valued complex attribute fanned out over canonical value
/// groups, one per type tag.
#[derive(Debug, Clone)]
pub struct PluralComplexMapper {
    descriptor: Arc<AttributeDescriptor>,
    groups: Vec<CanonicalValueGroup>,
}

impl PluralComplexMapper {
    fn to_ldap_attributes(&self, object: &ScimObject, out: &mut Vec<LdapAttribute>) -> Result<()> {
        let Some(attribute) = object.get_attribute(&self.descriptor.schema, &self.descriptor.name)
        else {
            return Ok(());
        };

        for group in &self.groups {
            // Values assigned to this group, in their input order.
            let members: Vec<&Map<String, Value>> = attribute
                .values()
                .iter()
                .filter_map(ScimValue::as_complex)
                .filter(|m| {
                    complex_sub_value(m, "type")
                        .and_then(Value::as_str)
                        .is_some_and(|t| t.eq_ignore_ascii_case(&group.type_tag))
                })
                .collect();
            if members.is_empty() {
                continue;
            }
            for sub in &group.sub_attributes {
                let Some(sub_descriptor) = self.descriptor.sub_attribute(&sub.sub_attribute)
                else {
                    warn!(
                        attribute = %self.descriptor.name,
                        sub_attribute = %sub.sub_attribute,
                        "mapped sub-attribute missing from schema; skipping"
                    );
                    continue;
                };
                let mut raws = Vec::new();
                for member in &members {
                    if let Some(value) = complex_sub_value(member, &sub.sub_attribute) {
                        raws.push(
                            sub.binding
                                .transformation
                                .to_ldap_value(sub_descriptor, value)?,
                        );
                    }
                }
                if !raws.is_empty() {
                    out.push(LdapAttribute::with_values(
                        sub.binding.ldap_attribute.clone(),
                        raws,
                    ));
                }
            }
        }

        for value in attribute.values() {
            let tag = value.sub_value("type").and_then(Value::as_str);
            let recognized = tag.is_some_and(|t| {
                self.groups
                    .iter()
                    .any(|g| g.type_tag.eq_ignore_ascii_case(t))
            });
            if !recognized {
                warn!(
                    attribute = %self.descriptor.name,
                    r#type = tag.unwrap_or("<none>"),
                    "no canonical value group for value type; dropping value"
                );
            }
        }
        Ok(())
    }

    fn to_scim_attribute(&self, entry: &LdapEntry) -> Result<Option<ScimAttribute>> {
        let mut values: Vec<ScimValue> = Vec::new();
        for group in &self.groups {
            let mut member = Map::new();
            for sub in &group.sub_attributes {
                let Some(sub_descriptor) = self.descriptor.sub_attribute(&sub.sub_attribute)
                else {
                    continue;
                };
                if let Some(raw) = entry
                    .get(&sub.binding.ldap_attribute)
                    .and_then(LdapAttribute::first_value)
                {
                    let value = sub.binding.transformation.to_scim_value(sub_descriptor, raw)?;
                    member.insert(sub_descriptor.name.clone(), value);
                }
            }
            if member.is_empty() {
                continue;
            }
            member.insert("type".to_string(), Value::String(group.type_tag.clone()));
            if values.is_empty() {
                member.insert("primary".to_string(), Value::Bool(true));
            }
            values.push(ScimValue::Complex(member));
        }
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(ScimAttribute::plural(
            self.descriptor.schema.clone(),
            self.descriptor.name.clone(),
            values,
        )))
    }

    fn to_ldap_filter(&self, filter: &ScimFilter) -> Result<LdapFilter> {
        let sub_name = filter
            .filter_attribute()
            .and_then(|path| path.sub_attribute.as_deref());
        match sub_name {
            None => match filter.filter_type() {
                // Presence of the attribute means presence of any mapped
                // LDAP attribute.
                FilterType::Pr => {
                    let components = self
                        .groups
                        .iter()
                        .flat_map(|g| &g.sub_attributes)
                        .map(|s| LdapFilter::presence(s.binding.ldap_attribute.clone()))
                        .collect::<Vec<_>>();
                    if components.is_empty() {
                        return Ok(LdapFilter::always_false());
                    }
                    Ok(LdapFilter::or_of(components))
                }
                // A comparison against the bare attribute targets the
                // normative `value` sub-attribute.
                _ => self.sub_filter("value", filter),
            },
            Some(name) if name.eq_ignore_ascii_case("type") => {
                if filter.filter_type() != FilterType::Eq {
                    return Ok(LdapFilter::always_false());
                }
                let Some(tag) = filter.filter_value() else {
                    return Ok(LdapFilter::always_false());
                };
                let Some(group) = self
                    .groups
                    .iter()
                    .find(|g| g.type_tag.eq_ignore_ascii_case(tag))
                else {
                    return Ok(LdapFilter::always_false());
                };
                let components = group
                    .sub_attributes
                    .iter()
                    .map(|s| LdapFilter::presence(s.binding.ldap_attribute.clone()))
                    .collect::<Vec<_>>();
                if components.is_empty() {
                    return Ok(LdapFilter::always_false());
                }
                Ok(LdapFilter::or_of(components))
            }
            Some(name) => self.sub_filter(name, filter),
        }
    }

    /// The sub-attribute's singular-simple translation, OR'd across every
    /// group that maps it.
    fn sub_filter(&self, sub_name: &str, filter: &ScimFilter) -> Result<LdapFilter> {
        let mut components = Vec::new();
        for group in &self.groups {
            if let Some(sub) = group.sub_binding(sub_name) {
                components.push(simple_filter(
                    &sub.binding.ldap_attribute,
                    sub.binding.transformation,
                    filter,
                )?);
            }
        }
        if components.is_empty() {
            return Ok(LdapFilter::always_false());
        }
        Ok(LdapFilter::or_of(components))
    }
}

/// Translate a simple comparison onto one LDAP attribute. LDAP has no
/// strict greater/less operator, so gt and lt widen to the inclusive form
/// and the caller re-filters results.
fn simple_filter(
    ldap_attribute: &str,
    transformation: Transformation,
    filter: &ScimFilter,
) -> Result<LdapFilter> {
    let value = || -> Result<String> {
        let raw = filter
            .filter_value()
            .ok_or_else(|| Error::Internal("comparison filter without a value".to_string()))?;
        Ok(transformation.to_ldap_filter_value(raw))
    };
    match filter.filter_type() {
        FilterType::Eq => Ok(LdapFilter::equality(ldap_attribute, value()?)),
        FilterType::Co => Ok(LdapFilter::contains(ldap_attribute, value()?)),
        FilterType::Sw => Ok(LdapFilter::starts_with(ldap_attribute, value()?)),
        FilterType::Pr => Ok(LdapFilter::presence(ldap_attribute)),
        FilterType::Gt | FilterType::Ge => {
            Ok(LdapFilter::greater_or_equal(ldap_attribute, value()?))
        }
        FilterType::Lt | FilterType::Le => Ok(LdapFilter::less_or_equal(ldap_attribute, value()?)),
        FilterType::And | FilterType::Or => Err(Error::Internal(
            "logical filter dispatched to an attribute mapper".to_string(),
        )),
    }
}

/// The scalar and type tag of one value of a plural simple attribute.
/// A bare simple value is an untyped scalar.
fn split_plural_value(value: &ScimValue) -> (Option<&Value>, Option<&str>) {
    match value {
        ScimValue::Simple(v) => (Some(v), None),
        ScimValue::Complex(_) => (
            value.sub_value("value"),
            value.sub_value("type").and_then(Value::as_str),
        ),
    }
}

fn complex_sub_value<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}
