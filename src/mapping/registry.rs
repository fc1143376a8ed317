//! Builds the immutable mapper structures from the declarative
//! configuration and holds them for lookup by resource name.
//!
//! All validation of configuration identifiers happens here, at startup:
//! unknown resources, attributes, sub-attributes, type tags and
//! transformations fail the load with an error naming the offender.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::{AttributeMappingConfig, GatewayConfig, ResourceMappingConfig};
use crate::error::{Error, Result};
use crate::mapping::attribute::{
    AttributeBinding, AttributeMapper, CanonicalValueGroup, SubAttributeBinding, TypeBinding,
};
use crate::mapping::resource::ResourceMapper;
use crate::mapping::transform::Transformation;
use crate::schema::definitions::{AttributeDescriptor, DataType, ResourceDescriptor};
use crate::schema::registry::SchemaRegistry;

/// The set of resource mappers, frozen after construction and shared by
/// all request-serving workers.
#[derive(Debug, Clone)]
pub struct MappingRegistry {
    mappers: HashMap<String, Arc<ResourceMapper>>,
}

impl MappingRegistry {
    pub fn from_config(config: &GatewayConfig, schemas: &SchemaRegistry) -> Result<Self> {
        let mut mappers = HashMap::new();
        for resource_config in &config.resources {
            let mapper = build_resource_mapper(resource_config, schemas)?;
            debug!(
                resource = %mapper.resource_name(),
                attributes = mapper.mappers().len(),
                "registered resource mapping"
            );
            mappers.insert(
                mapper.resource_name().to_lowercase(),
                Arc::new(mapper),
            );
        }
        Ok(MappingRegistry { mappers })
    }

    pub fn get(&self, resource_name: &str) -> Option<&Arc<ResourceMapper>> {
        self.mappers.get(&resource_name.to_lowercase())
    }

    pub fn resource_mappers(&self) -> impl Iterator<Item = &Arc<ResourceMapper>> {
        self.mappers.values()
    }
}

fn build_resource_mapper(
    config: &ResourceMappingConfig,
    schemas: &SchemaRegistry,
) -> Result<ResourceMapper> {
    let descriptor = schemas.lookup_resource(&config.resource).ok_or_else(|| {
        Error::Configuration(format!("unknown resource type '{}'", config.resource))
    })?;

    let mut mappers = Vec::new();
    for attribute_config in &config.attributes {
        mappers.push(build_attribute_mapper(descriptor, attribute_config)?);
    }

    // Every LDAP attribute must be owned by exactly one attribute mapping
    // within a resource; overlapping writes would be ambiguous.
    let mut seen: Vec<(String, String)> = Vec::new();
    for mapper in &mappers {
        for ldap_attribute in mapper.ldap_attribute_types() {
            if let Some((_, owner)) = seen
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&ldap_attribute))
            {
                return Err(Error::Configuration(format!(
                    "LDAP attribute '{}' in resource '{}' is mapped by both '{}' and '{}'",
                    ldap_attribute,
                    config.resource,
                    owner,
                    mapper.scim_name()
                )));
            }
            seen.push((ldap_attribute, mapper.scim_name().to_string()));
        }
    }

    Ok(ResourceMapper::new(
        descriptor.name.clone(),
        config.object_classes.clone(),
        config.dn_template.clone(),
        mappers,
    ))
}

fn build_attribute_mapper(
    resource: &ResourceDescriptor,
    config: &AttributeMappingConfig,
) -> Result<AttributeMapper> {
    let descriptor = resource.attribute(&config.scim_attribute).ok_or_else(|| {
        Error::Configuration(format!(
            "unknown attribute '{}' in resource '{}'",
            config.scim_attribute, resource.name
        ))
    })?;
    let descriptor = Arc::new(descriptor.clone());

    match (descriptor.multi_valued, descriptor.data_type) {
        (false, DataType::Complex) => {
            build_singular_complex(resource, &descriptor, config)
        }
        (false, _) => build_singular_simple(resource, &descriptor, config),
        (true, DataType::Complex) => build_plural_complex(resource, &descriptor, config),
        (true, _) => build_plural_simple(resource, &descriptor, config),
    }
}

fn build_singular_simple(
    resource: &ResourceDescriptor,
    descriptor: &Arc<AttributeDescriptor>,
    config: &AttributeMappingConfig,
) -> Result<AttributeMapper> {
    let ldap_attribute = config.ldap_attribute.as_ref().ok_or_else(|| {
        Error::Configuration(format!(
            "attribute '{}' in resource '{}' requires ldap_attribute",
            config.scim_attribute, resource.name
        ))
    })?;
    let transformation = transformation(&config.transform, resource, &config.scim_attribute)?;
    Ok(AttributeMapper::singular_simple(
        Arc::clone(descriptor),
        AttributeBinding::new(ldap_attribute.clone(), transformation),
    ))
}

fn build_singular_complex(
    resource: &ResourceDescriptor,
    descriptor: &Arc<AttributeDescriptor>,
    config: &AttributeMappingConfig,
) -> Result<AttributeMapper> {
    if config.sub_attributes.is_empty() {
        return Err(Error::Configuration(format!(
            "complex attribute '{}' in resource '{}' requires sub_attributes",
            config.scim_attribute, resource.name
        )));
    }
    let mut sub_bindings = Vec::new();
    for sub_config in &config.sub_attributes {
        let sub_descriptor = descriptor.sub_attribute(&sub_config.name).ok_or_else(|| {
            Error::Configuration(format!(
                "unknown sub-attribute '{}.{}' in resource '{}'",
                config.scim_attribute, sub_config.name, resource.name
            ))
        })?;
        let transformation = transformation(&sub_config.transform, resource, &config.scim_attribute)?;
        sub_bindings.push(SubAttributeBinding::new(
            sub_descriptor.name.clone(),
            AttributeBinding::new(sub_config.ldap_attribute.clone(), transformation),
        ));
    }
    Ok(AttributeMapper::singular_complex(
        Arc::clone(descriptor),
        sub_bindings,
    ))
}

fn build_plural_simple(
    resource: &ResourceDescriptor,
    descriptor: &Arc<AttributeDescriptor>,
    config: &AttributeMappingConfig,
) -> Result<AttributeMapper> {
    if config.types.is_empty() && config.default_ldap_attribute.is_none() {
        return Err(Error::Configuration(format!(
            "multi-valued attribute '{}' in resource '{}' requires types or default_ldap_attribute",
            config.scim_attribute, resource.name
        )));
    }
    let mut type_bindings: Vec<TypeBinding> = Vec::new();
    for type_config in &config.types {
        validate_type_tag(resource, descriptor, config, &type_config.type_tag)?;
        if type_bindings
            .iter()
            .any(|tb| tb.type_tag.eq_ignore_ascii_case(&type_config.type_tag))
        {
            return Err(duplicate_tag(resource, config, &type_config.type_tag));
        }
        let transformation = transformation(&type_config.transform, resource, &config.scim_attribute)?;
        type_bindings.push(TypeBinding::new(
            type_config.type_tag.clone(),
            AttributeBinding::new(type_config.ldap_attribute.clone(), transformation),
        ));
    }
    let default_binding = match &config.default_ldap_attribute {
        Some(ldap_attribute) => Some(AttributeBinding::new(
            ldap_attribute.clone(),
            transformation(&config.transform, resource, &config.scim_attribute)?,
        )),
        None => None,
    };
    Ok(AttributeMapper::plural_simple(
        Arc::clone(descriptor),
        type_bindings,
        default_binding,
    ))
}

fn build_plural_complex(
    resource: &ResourceDescriptor,
    descriptor: &Arc<AttributeDescriptor>,
    config: &AttributeMappingConfig,
) -> Result<AttributeMapper> {
    if config.canonical_values.is_empty() {
        return Err(Error::Configuration(format!(
            "multi-valued complex attribute '{}' in resource '{}' requires canonical_values",
            config.scim_attribute, resource.name
        )));
    }
    let mut groups: Vec<CanonicalValueGroup> = Vec::new();
    for group_config in &config.canonical_values {
        validate_type_tag(resource, descriptor, config, &group_config.type_tag)?;
        if groups
            .iter()
            .any(|g| g.type_tag.eq_ignore_ascii_case(&group_config.type_tag))
        {
            return Err(duplicate_tag(resource, config, &group_config.type_tag));
        }
        let mut sub_bindings = Vec::new();
        for sub_config in &group_config.sub_attributes {
            let sub_descriptor = descriptor.sub_attribute(&sub_config.name).ok_or_else(|| {
                Error::Configuration(format!(
                    "unknown sub-attribute '{}.{}' in resource '{}'",
                    config.scim_attribute, sub_config.name, resource.name
                ))
            })?;
            let transformation =
                transformation(&sub_config.transform, resource, &config.scim_attribute)?;
            sub_bindings.push(SubAttributeBinding::new(
                sub_descriptor.name.clone(),
                AttributeBinding::new(sub_config.ldap_attribute.clone(), transformation),
            ));
        }
        groups.push(CanonicalValueGroup::new(
            group_config.type_tag.clone(),
            sub_bindings,
        ));
    }
    Ok(AttributeMapper::plural_complex(Arc::clone(descriptor), groups))
}

fn transformation(
    name: &str,
    resource: &ResourceDescriptor,
    scim_attribute: &str,
) -> Result<Transformation> {
    Transformation::from_name(name).map_err(|_| {
        Error::Configuration(format!(
            "unknown transformation '{}' on attribute '{}' in resource '{}'",
            name, scim_attribute, resource.name
        ))
    })
}

fn validate_type_tag(
    resource: &ResourceDescriptor,
    descriptor: &AttributeDescriptor,
    config: &AttributeMappingConfig,
    tag: &str,
) -> Result<()> {
    if descriptor.canonical_types.is_empty()
        || descriptor
            .canonical_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag))
    {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "type '{}' on attribute '{}' in resource '{}' is not a recognized canonical type",
            tag, config.scim_attribute, resource.name
        )))
    }
}

fn duplicate_tag(
    resource: &ResourceDescriptor,
    config: &AttributeMappingConfig,
    tag: &str,
) -> Error {
    Error::Configuration(format!(
        "duplicate type '{}' on attribute '{}' in resource '{}'",
        tag, config.scim_attribute, resource.name
    ))
}
