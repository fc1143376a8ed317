use std::fmt;

/// The path to a SCIM attribute or sub-attribute, as it appears in filter
/// expressions and sort keys: `[schemaURI:]attrName[.subAttrName]`.
///
/// The schema URI is any colon-bearing prefix up to the last colon before
/// the attribute name, so URN-style URIs parse without special casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    pub schema: Option<String>,
    pub attribute: String,
    pub sub_attribute: Option<String>,
}

impl AttributePath {
    pub fn new(
        schema: Option<String>,
        attribute: impl Into<String>,
        sub_attribute: Option<String>,
    ) -> Self {
        AttributePath {
            schema,
            attribute: attribute.into(),
            sub_attribute,
        }
    }

    /// Parse an attribute path. Returns a message describing the problem on
    /// malformed input; callers attach their own position information.
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        let (schema, rest) = match s.rfind(':') {
            Some(pos) => {
                let uri = &s[..pos];
                if uri.is_empty() {
                    return Err(format!("empty schema URI in attribute path '{}'", s));
                }
                (Some(uri.to_string()), &s[pos + 1..])
            }
            None => (None, s),
        };

        let (attribute, sub_attribute) = match rest.split_once('.') {
            Some((attr, sub)) => (attr, Some(sub)),
            None => (rest, None),
        };

        validate_name(attribute, s)?;
        if let Some(sub) = sub_attribute {
            validate_name(sub, s)?;
        }

        Ok(AttributePath {
            schema,
            attribute: attribute.to_string(),
            sub_attribute: sub_attribute.map(str::to_string),
        })
    }
}

fn validate_name(name: &str, path: &str) -> std::result::Result<(), String> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphabetic()
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("invalid attribute name in path '{}'", path))
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}:", schema)?;
        }
        write!(f, "{}", self.attribute)?;
        if let Some(sub) = &self.sub_attribute {
            write!(f, ".{}", sub)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_attribute() {
        let path = AttributePath::parse("userName").unwrap();
        assert_eq!(path.schema, None);
        assert_eq!(path.attribute, "userName");
        assert_eq!(path.sub_attribute, None);
    }

    #[test]
    fn test_parse_sub_attribute() {
        let path = AttributePath::parse("name.familyName").unwrap();
        assert_eq!(path.attribute, "name");
        assert_eq!(path.sub_attribute.as_deref(), Some("familyName"));
    }

    #[test]
    fn test_parse_with_schema_urn() {
        let path =
            AttributePath::parse("urn:ietf:params:scim:schemas:core:2.0:User:userName").unwrap();
        assert_eq!(
            path.schema.as_deref(),
            Some("urn:ietf:params:scim:schemas:core:2.0:User")
        );
        assert_eq!(path.attribute, "userName");
    }

    #[test]
    fn test_parse_with_schema_and_sub_attribute() {
        // The dots inside the URN must not be confused with a sub-attribute
        // separator; the last colon splits the path first.
        let path =
            AttributePath::parse("urn:ietf:params:scim:schemas:core:2.0:User:name.givenName")
                .unwrap();
        assert_eq!(
            path.schema.as_deref(),
            Some("urn:ietf:params:scim:schemas:core:2.0:User")
        );
        assert_eq!(path.attribute, "name");
        assert_eq!(path.sub_attribute.as_deref(), Some("givenName"));
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        assert!(AttributePath::parse("").is_err());
        assert!(AttributePath::parse(":userName").is_err());
        assert!(AttributePath::parse("name.").is_err());
        assert!(AttributePath::parse("9name").is_err());
        assert!(AttributePath::parse("user name").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for s in [
            "userName",
            "name.familyName",
            "urn:ietf:params:scim:schemas:core:2.0:User:name.givenName",
        ] {
            let path = AttributePath::parse(s).unwrap();
            assert_eq!(path.to_string(), s);
            assert_eq!(AttributePath::parse(&path.to_string()).unwrap(), path);
        }
    }
}
