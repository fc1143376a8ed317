//! The LDAP filter tree produced by filter compilation, rendered in the
//! RFC 4515 string representation consumed by the LDAP client.

use std::fmt;

/// An LDAP search filter. Only the filter shapes the compiler emits are
/// modeled; extensible-match and NOT filters are never produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LdapFilter {
    And(Vec<LdapFilter>),
    Or(Vec<LdapFilter>),
    Equality(String, String),
    Substring {
        attribute: String,
        initial: Option<String>,
        any: Vec<String>,
        end: Option<String>,
    },
    Presence(String),
    GreaterOrEqual(String, String),
    LessOrEqual(String, String),
}

impl LdapFilter {
    /// The empty OR: matches no entry.
    pub fn always_false() -> Self {
        LdapFilter::Or(Vec::new())
    }

    /// The empty AND: matches every entry.
    pub fn always_true() -> Self {
        LdapFilter::And(Vec::new())
    }

    pub fn equality(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        LdapFilter::Equality(attribute.into(), value.into())
    }

    /// `(attr=*value*)`
    pub fn contains(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        LdapFilter::Substring {
            attribute: attribute.into(),
            initial: None,
            any: vec![value.into()],
            end: None,
        }
    }

    /// `(attr=value*)`
    pub fn starts_with(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        LdapFilter::Substring {
            attribute: attribute.into(),
            initial: Some(value.into()),
            any: Vec::new(),
            end: None,
        }
    }

    pub fn presence(attribute: impl Into<String>) -> Self {
        LdapFilter::Presence(attribute.into())
    }

    pub fn greater_or_equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        LdapFilter::GreaterOrEqual(attribute.into(), value.into())
    }

    pub fn less_or_equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        LdapFilter::LessOrEqual(attribute.into(), value.into())
    }

    /// OR the components together, collapsing a single component to itself.
    pub fn or_of(mut components: Vec<LdapFilter>) -> Self {
        if components.len() == 1 {
            components.remove(0)
        } else {
            LdapFilter::Or(components)
        }
    }
}

/// Escape a value for inclusion in an RFC 4515 filter string.
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl fmt::Display for LdapFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LdapFilter::And(components) => {
                write!(f, "(&")?;
                for component in components {
                    write!(f, "{}", component)?;
                }
                write!(f, ")")
            }
            LdapFilter::Or(components) => {
                write!(f, "(|")?;
                for component in components {
                    write!(f, "{}", component)?;
                }
                write!(f, ")")
            }
            LdapFilter::Equality(attribute, value) => {
                write!(f, "({}={})", attribute, escape_filter_value(value))
            }
            LdapFilter::Substring {
                attribute,
                initial,
                any,
                end,
            } => {
                write!(f, "({}=", attribute)?;
                if let Some(initial) = initial {
                    write!(f, "{}", escape_filter_value(initial))?;
                }
                write!(f, "*")?;
                for part in any {
                    write!(f, "{}*", escape_filter_value(part))?;
                }
                if let Some(end) = end {
                    write!(f, "{}", escape_filter_value(end))?;
                }
                write!(f, ")")
            }
            LdapFilter::Presence(attribute) => write!(f, "({}=*)", attribute),
            LdapFilter::GreaterOrEqual(attribute, value) => {
                write!(f, "({}>={})", attribute, escape_filter_value(value))
            }
            LdapFilter::LessOrEqual(attribute, value) => {
                write!(f, "({}<={})", attribute, escape_filter_value(value))
            }
        }
    }
}
