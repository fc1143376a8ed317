//! Declarative mapping configuration.
//!
//! A gateway configuration describes, per SCIM resource type, the
//! structural object classes, the DN template and the attribute mappings.
//! It is loaded once at startup; [`crate::mapping::MappingRegistry`] turns
//! it into immutable mapper structures and rejects unknown resource,
//! attribute and transformation identifiers.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GatewayConfig {
    pub resources: Vec<ResourceMappingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResourceMappingConfig {
    /// Name of a registered resource descriptor, e.g. "User".
    pub resource: String,
    #[serde(default)]
    pub object_classes: Vec<String>,
    pub dn_template: String,
    pub attributes: Vec<AttributeMappingConfig>,
}

/// One attribute mapping. Which fields apply depends on the attribute's
/// shape: `ldap_attribute` for singular simple, `sub_attributes` for
/// singular complex, `types`/`default_ldap_attribute` for plural simple and
/// `canonical_values` for plural complex attributes.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AttributeMappingConfig {
    pub scim_attribute: String,
    #[serde(default)]
    pub ldap_attribute: Option<String>,
    #[serde(default = "default_transform")]
    pub transform: String,
    #[serde(default)]
    pub sub_attributes: Vec<SubAttributeMappingConfig>,
    #[serde(default)]
    pub types: Vec<TypeMappingConfig>,
    #[serde(default)]
    pub default_ldap_attribute: Option<String>,
    #[serde(default)]
    pub canonical_values: Vec<CanonicalValueConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SubAttributeMappingConfig {
    pub name: String,
    pub ldap_attribute: String,
    #[serde(default = "default_transform")]
    pub transform: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TypeMappingConfig {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub ldap_attribute: String,
    #[serde(default = "default_transform")]
    pub transform: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CanonicalValueConfig {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub sub_attributes: Vec<SubAttributeMappingConfig>,
}

fn default_transform() -> String {
    "default".to_string()
}

impl GatewayConfig {
    /// Load configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(Error::Configuration(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        // Expand environment variables before parsing
        let expanded_content = Self::expand_env_vars(&content)?;

        let config: GatewayConfig = serde_yaml::from_str(&expanded_content).map_err(|e| {
            Error::Configuration(format!(
                "failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        if config.resources.is_empty() {
            return Err(Error::Configuration(
                "configuration must contain at least one resource mapping".to_string(),
            ));
        }

        Ok(config)
    }

    /// Expand environment variables in format ${VAR_NAME} or ${VAR_NAME:-default}
    fn expand_env_vars(content: &str) -> Result<String> {
        let chars: Vec<char> = content.chars().collect();
        let mut expanded = String::with_capacity(content.len());
        let mut i = 0;

        while i < chars.len() {
            if i + 1 < chars.len() && chars[i] == '$' && chars[i + 1] == '{' {
                let Some(close) = chars[i + 2..].iter().position(|c| *c == '}') else {
                    return Err(Error::Configuration(
                        "unterminated ${...} in configuration".to_string(),
                    ));
                };
                let expression: String = chars[i + 2..i + 2 + close].iter().collect();
                let (name, default) = match expression.split_once(":-") {
                    Some((name, default)) => (name, Some(default)),
                    None => (expression.as_str(), None),
                };
                match std::env::var(name) {
                    Ok(value) => expanded.push_str(&value),
                    Err(_) => match default {
                        Some(default) => expanded.push_str(default),
                        None => {
                            return Err(Error::Configuration(format!(
                                "environment variable '{}' is not set",
                                name
                            )));
                        }
                    },
                }
                i += close + 3;
            } else {
                expanded.push(chars[i]);
                i += 1;
            }
        }

        Ok(expanded)
    }

    /// The stock mapping onto an inetOrgPerson / groupOfNames directory
    /// layout, usable without a configuration file.
    pub fn default_config() -> Self {
        GatewayConfig {
            resources: vec![
                ResourceMappingConfig {
                    resource: "User".to_string(),
                    object_classes: vec![
                        "top".to_string(),
                        "person".to_string(),
                        "organizationalPerson".to_string(),
                        "inetOrgPerson".to_string(),
                    ],
                    dn_template: "uid={userName},ou=people,dc=example,dc=com".to_string(),
                    attributes: vec![
                        simple("userName", "uid"),
                        AttributeMappingConfig {
                            scim_attribute: "name".to_string(),
                            sub_attributes: vec![
                                sub("familyName", "sn", "default"),
                                sub("givenName", "givenName", "default"),
                                sub("formatted", "cn", "default"),
                            ],
                            ..empty("name")
                        },
                        simple("displayName", "displayName"),
                        simple("title", "title"),
                        simple("preferredLanguage", "preferredLanguage"),
                        simple("password", "userPassword"),
                        AttributeMappingConfig {
                            scim_attribute: "emails".to_string(),
                            types: vec![
                                typed("work", "mail", "default"),
                                typed("home", "homeEmail", "default"),
                            ],
                            ..empty("emails")
                        },
                        AttributeMappingConfig {
                            scim_attribute: "phoneNumbers".to_string(),
                            types: vec![
                                typed("work", "telephoneNumber", "telephoneNumber"),
                                typed("home", "homePhone", "telephoneNumber"),
                                typed("mobile", "mobile", "telephoneNumber"),
                            ],
                            ..empty("phoneNumbers")
                        },
                        AttributeMappingConfig {
                            scim_attribute: "addresses".to_string(),
                            canonical_values: vec![
                                CanonicalValueConfig {
                                    type_tag: "work".to_string(),
                                    sub_attributes: vec![
                                        sub("formatted", "postalAddress", "postalAddress"),
                                        sub("streetAddress", "street", "default"),
                                        sub("locality", "l", "default"),
                                        sub("region", "st", "default"),
                                        sub("postalCode", "postalCode", "default"),
                                    ],
                                },
                                CanonicalValueConfig {
                                    type_tag: "home".to_string(),
                                    sub_attributes: vec![sub(
                                        "formatted",
                                        "homePostalAddress",
                                        "postalAddress",
                                    )],
                                },
                            ],
                            ..empty("addresses")
                        },
                        AttributeMappingConfig {
                            scim_attribute: "meta".to_string(),
                            sub_attributes: vec![
                                sub("created", "createTimestamp", "generalizedTime"),
                                sub("lastModified", "modifyTimestamp", "generalizedTime"),
                            ],
                            ..empty("meta")
                        },
                    ],
                },
                ResourceMappingConfig {
                    resource: "Group".to_string(),
                    object_classes: vec!["top".to_string(), "groupOfNames".to_string()],
                    dn_template: "cn={displayName},ou=groups,dc=example,dc=com".to_string(),
                    attributes: vec![
                        simple("displayName", "cn"),
                        AttributeMappingConfig {
                            scim_attribute: "members".to_string(),
                            default_ldap_attribute: Some("member".to_string()),
                            ..empty("members")
                        },
                    ],
                },
            ],
        }
    }
}

fn empty(scim_attribute: &str) -> AttributeMappingConfig {
    AttributeMappingConfig {
        scim_attribute: scim_attribute.to_string(),
        ldap_attribute: None,
        transform: default_transform(),
        sub_attributes: Vec::new(),
        types: Vec::new(),
        default_ldap_attribute: None,
        canonical_values: Vec::new(),
    }
}

fn simple(scim_attribute: &str, ldap_attribute: &str) -> AttributeMappingConfig {
    AttributeMappingConfig {
        ldap_attribute: Some(ldap_attribute.to_string()),
        ..empty(scim_attribute)
    }
}

fn sub(name: &str, ldap_attribute: &str, transform: &str) -> SubAttributeMappingConfig {
    SubAttributeMappingConfig {
        name: name.to_string(),
        ldap_attribute: ldap_attribute.to_string(),
        transform: transform.to_string(),
    }
}

fn typed(type_tag: &str, ldap_attribute: &str, transform: &str) -> TypeMappingConfig {
    TypeMappingConfig {
        type_tag: type_tag.to_string(),
        ldap_attribute: ldap_attribute.to_string(),
        transform: transform.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
resources:
  - resource: User
    object_classes: [top, person, inetOrgPerson]
    dn_template: "uid={userName},ou=people,dc=example,dc=com"
    attributes:
      - scim_attribute: userName
        ldap_attribute: uid
      - scim_attribute: emails
        types:
          - type: work
            ldap_attribute: mail
          - type: home
            ldap_attribute: homeEmail
"#;

    #[test]
    fn test_parse_sample_config() {
        let config: GatewayConfig = serde_yaml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.resources.len(), 1);
        let user = &config.resources[0];
        assert_eq!(user.resource, "User");
        assert_eq!(user.object_classes.len(), 3);
        assert_eq!(user.attributes[0].ldap_attribute.as_deref(), Some("uid"));
        assert_eq!(user.attributes[0].transform, "default");
        assert_eq!(user.attributes[1].types[1].type_tag, "home");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("scim_ldap_gateway_config_test.yaml");
        fs::write(&path, SAMPLE_CONFIG).unwrap();
        let config = GatewayConfig::load_from_file(&path).unwrap();
        assert_eq!(config.resources.len(), 1);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let err = GatewayConfig::load_from_file("/nonexistent/mapping.yaml").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let path = std::env::temp_dir().join("scim_ldap_gateway_invalid_test.yaml");
        fs::write(&path, "resources: [invalid: yaml: [").unwrap();
        let err = GatewayConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        let expanded =
            GatewayConfig::expand_env_vars("dn_template: \"${MISSING_BASE_DN:-dc=example,dc=com}\"")
                .unwrap();
        assert_eq!(expanded, "dn_template: \"dc=example,dc=com\"");
    }

    #[test]
    fn test_expand_env_vars_set_variable() {
        std::env::set_var("SCIM_LDAP_GATEWAY_TEST_VAR", "dc=test");
        let expanded = GatewayConfig::expand_env_vars("base: ${SCIM_LDAP_GATEWAY_TEST_VAR}").unwrap();
        assert_eq!(expanded, "base: dc=test");
        std::env::remove_var("SCIM_LDAP_GATEWAY_TEST_VAR");
    }

    #[test]
    fn test_expand_env_vars_missing_without_default() {
        let err = GatewayConfig::expand_env_vars("base: ${DEFINITELY_NOT_SET_ANYWHERE}").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_default_config_covers_user_and_group() {
        let config = GatewayConfig::default_config();
        assert_eq!(config.resources.len(), 2);
        assert_eq!(config.resources[0].resource, "User");
        assert_eq!(config.resources[1].resource, "Group");
    }
}
