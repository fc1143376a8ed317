//! Value transformations between SCIM simple values and LDAP octet strings.
//!
//! Each transformation is a pair of pure functions plus a third used by
//! filter compilation. Applying a transformation to a data type it does not
//! support fails with `UnsupportedConversion`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::definitions::{AttributeDescriptor, DataType};
use crate::utils;

/// The closed set of value transformations the mapping configuration may
/// name. `Default` covers string, boolean, integer and binary data;
/// the others are syntax-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformation {
    Default,
    GeneralizedTime,
    PostalAddress,
    TelephoneNumber,
}

impl Transformation {
    /// Resolve a configuration identifier. Unknown identifiers fail
    /// configuration load.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "default" => Ok(Transformation::Default),
            "generalizedTime" => Ok(Transformation::GeneralizedTime),
            "postalAddress" => Ok(Transformation::PostalAddress),
            "telephoneNumber" => Ok(Transformation::TelephoneNumber),
            _ => Err(Error::Configuration(format!(
                "unknown transformation '{}'",
                name
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transformation::Default => "default",
            Transformation::GeneralizedTime => "generalizedTime",
            Transformation::PostalAddress => "postalAddress",
            Transformation::TelephoneNumber => "telephoneNumber",
        }
    }

    /// Convert a SCIM simple value to an LDAP octet string.
    pub fn to_ldap_value(&self, descriptor: &AttributeDescriptor, value: &Value) -> Result<Vec<u8>> {
        match self {
            Transformation::Default => match descriptor.data_type {
                DataType::String => Ok(expect_string(descriptor, value)?.into_bytes()),
                DataType::Boolean => {
                    let b = value.as_bool().ok_or_else(|| malformed(descriptor, value))?;
                    Ok(if b { b"true".to_vec() } else { b"false".to_vec() })
                }
                DataType::Integer => {
                    let n = value.as_i64().ok_or_else(|| malformed(descriptor, value))?;
                    Ok(n.to_string().into_bytes())
                }
                DataType::Binary => {
                    let encoded = expect_string(descriptor, value)?;
                    BASE64
                        .decode(encoded.as_bytes())
                        .map_err(|_| malformed(descriptor, value))
                }
                other => Err(unsupported(self, other)),
            },
            Transformation::GeneralizedTime => match descriptor.data_type {
                DataType::DateTime => {
                    let s = expect_string(descriptor, value)?;
                    let dt = utils::parse_scim_datetime(&s)
                        .ok_or_else(|| malformed(descriptor, value))?;
                    Ok(utils::format_generalized_time(dt).into_bytes())
                }
                other => Err(unsupported(self, other)),
            },
            Transformation::PostalAddress => match descriptor.data_type {
                DataType::String => {
                    let s = expect_string(descriptor, value)?;
                    Ok(encode_postal_address(&s).into_bytes())
                }
                other => Err(unsupported(self, other)),
            },
            Transformation::TelephoneNumber => match descriptor.data_type {
                DataType::String => Ok(expect_string(descriptor, value)?.into_bytes()),
                other => Err(unsupported(self, other)),
            },
        }
    }

    /// Convert an LDAP octet string to a SCIM simple value.
    pub fn to_scim_value(&self, descriptor: &AttributeDescriptor, raw: &[u8]) -> Result<Value> {
        match self {
            Transformation::Default => match descriptor.data_type {
                DataType::String => Ok(Value::String(expect_utf8(descriptor, raw)?)),
                DataType::Boolean => {
                    let s = expect_utf8(descriptor, raw)?;
                    // Directories write RFC 4517 booleans as "TRUE"/"FALSE".
                    match s.to_ascii_lowercase().as_str() {
                        "true" => Ok(Value::Bool(true)),
                        "false" => Ok(Value::Bool(false)),
                        _ => Err(malformed_raw(descriptor, &s)),
                    }
                }
                DataType::Integer => {
                    let s = expect_utf8(descriptor, raw)?;
                    let n: i64 = s.parse().map_err(|_| malformed_raw(descriptor, &s))?;
                    Ok(Value::Number(n.into()))
                }
                DataType::Binary => Ok(Value::String(BASE64.encode(raw))),
                other => Err(unsupported(self, other)),
            },
            Transformation::GeneralizedTime => match descriptor.data_type {
                DataType::DateTime => {
                    let s = expect_utf8(descriptor, raw)?;
                    let dt = utils::parse_generalized_time(&s)
                        .ok_or_else(|| malformed_raw(descriptor, &s))?;
                    Ok(Value::String(utils::format_scim_datetime(dt)))
                }
                other => Err(unsupported(self, other)),
            },
            Transformation::PostalAddress => match descriptor.data_type {
                DataType::String => {
                    let s = expect_utf8(descriptor, raw)?;
                    Ok(Value::String(decode_postal_address(&s)))
                }
                other => Err(unsupported(self, other)),
            },
            Transformation::TelephoneNumber => match descriptor.data_type {
                DataType::String => Ok(Value::String(expect_utf8(descriptor, raw)?)),
                other => Err(unsupported(self, other)),
            },
        }
    }

    /// Convert a SCIM filter value to the form LDAP matching expects.
    /// Filter compilation is total, so this never fails; values that do not
    /// parse are passed through unchanged.
    pub fn to_ldap_filter_value(&self, value: &str) -> String {
        match self {
            Transformation::Default => value.to_string(),
            Transformation::GeneralizedTime => match utils::parse_scim_datetime(value) {
                Some(dt) => utils::format_generalized_time(dt),
                None => value.to_string(),
            },
            Transformation::PostalAddress => encode_postal_address(value),
            // Some servers require the canonical form without separators.
            Transformation::TelephoneNumber => {
                value.chars().filter(|c| *c != ' ' && *c != '-').collect()
            }
        }
    }
}

fn expect_string(descriptor: &AttributeDescriptor, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| malformed(descriptor, value))
}

fn expect_utf8(descriptor: &AttributeDescriptor, raw: &[u8]) -> Result<String> {
    String::from_utf8(raw.to_vec()).map_err(|_| {
        Error::UnsupportedConversion(format!(
            "attribute '{}' holds a value that is not valid UTF-8",
            descriptor.name
        ))
    })
}

fn unsupported(transformation: &Transformation, data_type: DataType) -> Error {
    Error::UnsupportedConversion(format!(
        "the {} transformation cannot be applied to {} data",
        transformation.name(),
        data_type.as_str()
    ))
}

fn malformed(descriptor: &AttributeDescriptor, value: &Value) -> Error {
    Error::UnsupportedConversion(format!(
        "malformed {} value for attribute '{}': {}",
        descriptor.data_type.as_str(),
        descriptor.name,
        value
    ))
}

fn malformed_raw(descriptor: &AttributeDescriptor, value: &str) -> Error {
    Error::UnsupportedConversion(format!(
        "malformed {} value for attribute '{}': {}",
        descriptor.data_type.as_str(),
        descriptor.name,
        value
    ))
}

/// RFC 4517 postal address encoding: lines are joined with `$`, and any
/// literal `\` or `$` is escaped as `\5C` or `\24`.
fn encode_postal_address(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => encoded.push('$'),
            '\\' => encoded.push_str("\\5C"),
            '$' => encoded.push_str("\\24"),
            _ => encoded.push(c),
        }
    }
    encoded
}

/// Inverse of [`encode_postal_address`]. Unknown `\xx` sequences and a
/// trailing `\` are passed through unchanged rather than rejected.
fn decode_postal_address(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut decoded = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                if i + 3 > chars.len() {
                    decoded.push('\\');
                    i += 1;
                } else {
                    let hex: String = chars[i + 1..i + 3].iter().collect::<String>().to_uppercase();
                    match hex.as_str() {
                        "5C" => decoded.push('\\'),
                        "24" => decoded.push('$'),
                        _ => {
                            decoded.push('\\');
                            decoded.push_str(&hex);
                        }
                    }
                    i += 3;
                }
            }
            '$' => {
                decoded.push('\n');
                i += 1;
            }
            c => {
                decoded.push(c);
                i += 1;
            }
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::definitions::SCHEMA_URI_CORE_USER;
    use serde_json::json;

    fn descriptor(data_type: DataType) -> AttributeDescriptor {
        AttributeDescriptor::simple(SCHEMA_URI_CORE_USER, "test", data_type)
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            Transformation::from_name("generalizedTime").unwrap(),
            Transformation::GeneralizedTime
        );
        assert!(Transformation::from_name("base64").is_err());
    }

    #[test]
    fn test_default_string() {
        let desc = descriptor(DataType::String);
        let t = Transformation::Default;
        let raw = t.to_ldap_value(&desc, &json!("bjensen")).unwrap();
        assert_eq!(raw, b"bjensen");
        assert_eq!(t.to_scim_value(&desc, &raw).unwrap(), json!("bjensen"));
    }

    #[test]
    fn test_default_boolean() {
        let desc = descriptor(DataType::Boolean);
        let t = Transformation::Default;
        assert_eq!(t.to_ldap_value(&desc, &json!(true)).unwrap(), b"true");
        assert_eq!(t.to_scim_value(&desc, b"TRUE").unwrap(), json!(true));
        assert_eq!(t.to_scim_value(&desc, b"false").unwrap(), json!(false));
        assert!(t.to_scim_value(&desc, b"yes").is_err());
        assert!(t.to_ldap_value(&desc, &json!("true")).is_err());
    }

    #[test]
    fn test_default_integer() {
        let desc = descriptor(DataType::Integer);
        let t = Transformation::Default;
        assert_eq!(t.to_ldap_value(&desc, &json!(1042)).unwrap(), b"1042");
        assert_eq!(t.to_scim_value(&desc, b"-7").unwrap(), json!(-7));
        assert!(t.to_scim_value(&desc, b"seven").is_err());
    }

    #[test]
    fn test_default_binary_is_base64_on_the_scim_side() {
        let desc = descriptor(DataType::Binary);
        let t = Transformation::Default;
        let raw = t.to_ldap_value(&desc, &json!("AQID")).unwrap();
        assert_eq!(raw, vec![1u8, 2, 3]);
        assert_eq!(t.to_scim_value(&desc, &raw).unwrap(), json!("AQID"));
        assert!(t.to_ldap_value(&desc, &json!("not base64!")).is_err());
    }

    #[test]
    fn test_default_rejects_datetime() {
        let desc = descriptor(DataType::DateTime);
        let err = Transformation::Default
            .to_ldap_value(&desc, &json!("2024-01-01T00:00:00Z"))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedConversion(_)));
    }

    #[test]
    fn test_generalized_time() {
        let desc = descriptor(DataType::DateTime);
        let t = Transformation::GeneralizedTime;
        let raw = t
            .to_ldap_value(&desc, &json!("2011-08-01T21:32:44.882Z"))
            .unwrap();
        assert_eq!(raw, b"20110801213244.882Z");
        assert_eq!(
            t.to_scim_value(&desc, &raw).unwrap(),
            json!("2011-08-01T21:32:44.882Z")
        );
    }

    #[test]
    fn test_generalized_time_preserves_instant_across_offsets() {
        let desc = descriptor(DataType::DateTime);
        let t = Transformation::GeneralizedTime;
        let raw = t
            .to_ldap_value(&desc, &json!("2011-08-01T23:32:44.882+02:00"))
            .unwrap();
        assert_eq!(raw, b"20110801213244.882Z");
    }

    #[test]
    fn test_generalized_time_rejects_string_data() {
        let desc = descriptor(DataType::String);
        assert!(Transformation::GeneralizedTime
            .to_ldap_value(&desc, &json!("2011-08-01T21:32:44Z"))
            .is_err());
    }

    #[test]
    fn test_postal_address_escaping() {
        let desc = descriptor(DataType::String);
        let t = Transformation::PostalAddress;
        let raw = t
            .to_ldap_value(&desc, &json!("100 Main St\nCity, ST 00000"))
            .unwrap();
        assert_eq!(raw, b"100 Main St$City, ST 00000");
        assert_eq!(
            t.to_scim_value(&desc, &raw).unwrap(),
            json!("100 Main St\nCity, ST 00000")
        );

        let raw = t.to_ldap_value(&desc, &json!("c:\\dir\n$5")).unwrap();
        assert_eq!(raw, b"c:\\5Cdir$\\245");
        assert_eq!(t.to_scim_value(&desc, &raw).unwrap(), json!("c:\\dir\n$5"));
    }

    #[test]
    fn test_postal_address_tolerates_unknown_escapes() {
        let desc = descriptor(DataType::String);
        let t = Transformation::PostalAddress;
        assert_eq!(t.to_scim_value(&desc, b"a\\7Fb").unwrap(), json!("a\\7Fb"));
        assert_eq!(t.to_scim_value(&desc, b"trailing\\").unwrap(), json!("trailing\\"));
    }

    #[test]
    fn test_telephone_number_filter_value_strips_separators() {
        let t = Transformation::TelephoneNumber;
        assert_eq!(t.to_ldap_filter_value("+1 555-123 4567"), "+15551234567");

        let desc = descriptor(DataType::String);
        let raw = t.to_ldap_value(&desc, &json!("+1 555-123 4567")).unwrap();
        assert_eq!(raw, b"+1 555-123 4567");
    }

    #[test]
    fn test_filter_value_conversion() {
        assert_eq!(
            Transformation::GeneralizedTime.to_ldap_filter_value("2011-08-01T21:32:44.882Z"),
            "20110801213244.882Z"
        );
        assert_eq!(
            Transformation::GeneralizedTime.to_ldap_filter_value("garbage"),
            "garbage"
        );
        assert_eq!(
            Transformation::PostalAddress.to_ldap_filter_value("a$b"),
            "a\\24b"
        );
        assert_eq!(Transformation::Default.to_ldap_filter_value("x"), "x");
    }
}
