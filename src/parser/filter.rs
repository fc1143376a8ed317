//! The SCIM filter AST.
//!
//! Nodes are immutable after parsing. The `Display` impl produces the
//! textual filter form, which round-trips through the parser.

use std::fmt;

use crate::scim::path::AttributePath;

/// The kind of a filter node. Operator keywords are case-insensitive in
/// the textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    And,
    Or,
    Eq,
    Co,
    Sw,
    Pr,
    Gt,
    Ge,
    Lt,
    Le,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::And => "and",
            FilterType::Or => "or",
            FilterType::Eq => "eq",
            FilterType::Co => "co",
            FilterType::Sw => "sw",
            FilterType::Pr => "pr",
            FilterType::Gt => "gt",
            FilterType::Ge => "ge",
            FilterType::Lt => "lt",
            FilterType::Le => "le",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A SCIM query filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScimFilter {
    filter_type: FilterType,
    /// The attribute or sub-attribute to filter by; `None` for and/or nodes.
    filter_attribute: Option<AttributePath>,
    /// The comparison value; `None` for presence and logical nodes.
    filter_value: Option<String>,
    /// Whether the value is quoted in the textual form. String and dateTime
    /// values are quoted; integer and boolean values are not.
    quote_filter_value: bool,
    /// Child nodes of an and/or filter.
    filter_components: Vec<ScimFilter>,
}

impl ScimFilter {
    pub fn and_of(components: Vec<ScimFilter>) -> Self {
        ScimFilter {
            filter_type: FilterType::And,
            filter_attribute: None,
            filter_value: None,
            quote_filter_value: false,
            filter_components: components,
        }
    }

    pub fn or_of(components: Vec<ScimFilter>) -> Self {
        ScimFilter {
            filter_type: FilterType::Or,
            filter_attribute: None,
            filter_value: None,
            quote_filter_value: false,
            filter_components: components,
        }
    }

    /// A comparison node (any type except and/or/pr).
    pub fn comparison(
        filter_type: FilterType,
        attribute: AttributePath,
        value: impl Into<String>,
        quoted: bool,
    ) -> Self {
        ScimFilter {
            filter_type,
            filter_attribute: Some(attribute),
            filter_value: Some(value.into()),
            quote_filter_value: quoted,
            filter_components: Vec::new(),
        }
    }

    pub fn equality(attribute: AttributePath, value: impl Into<String>) -> Self {
        ScimFilter::comparison(FilterType::Eq, attribute, value, true)
    }

    pub fn present(attribute: AttributePath) -> Self {
        ScimFilter {
            filter_type: FilterType::Pr,
            filter_attribute: Some(attribute),
            filter_value: None,
            quote_filter_value: false,
            filter_components: Vec::new(),
        }
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn filter_attribute(&self) -> Option<&AttributePath> {
        self.filter_attribute.as_ref()
    }

    pub fn filter_value(&self) -> Option<&str> {
        self.filter_value.as_deref()
    }

    pub fn is_quoted(&self) -> bool {
        self.quote_filter_value
    }

    pub fn filter_components(&self) -> &[ScimFilter] {
        &self.filter_components
    }
}

impl fmt::Display for ScimFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.filter_type {
            FilterType::And | FilterType::Or => {
                write!(f, "(")?;
                for (i, component) in self.filter_components.iter().enumerate() {
                    if i != 0 {
                        write!(f, " {} ", self.filter_type)?;
                    }
                    write!(f, "{}", component)?;
                }
                write!(f, ")")
            }
            FilterType::Pr => {
                write!(
                    f,
                    "{} pr",
                    self.filter_attribute.as_ref().expect("pr carries a path")
                )
            }
            _ => {
                let attribute = self
                    .filter_attribute
                    .as_ref()
                    .expect("comparison carries a path");
                let value = self
                    .filter_value
                    .as_deref()
                    .expect("comparison carries a value");
                write!(f, "{} {} ", attribute, self.filter_type)?;
                if self.quote_filter_value {
                    write!(f, "'")?;
                    for c in value.chars() {
                        match c {
                            '\'' | '\\' => write!(f, "\\{}", c)?,
                            '\n' => write!(f, "\\n")?,
                            '\t' => write!(f, "\\t")?,
                            _ => write!(f, "{}", c)?,
                        }
                    }
                    write!(f, "'")
                } else {
                    write!(f, "{}", value)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> AttributePath {
        AttributePath::parse(s).unwrap()
    }

    #[test]
    fn test_display_comparison() {
        let filter = ScimFilter::equality(path("userName"), "bjensen");
        assert_eq!(filter.to_string(), "userName eq 'bjensen'");
    }

    #[test]
    fn test_display_unquoted_value() {
        let filter = ScimFilter::comparison(FilterType::Eq, path("active"), "true", false);
        assert_eq!(filter.to_string(), "active eq true");
    }

    #[test]
    fn test_display_presence() {
        let filter = ScimFilter::present(path("emails"));
        assert_eq!(filter.to_string(), "emails pr");
    }

    #[test]
    fn test_display_logical() {
        let filter = ScimFilter::and_of(vec![
            ScimFilter::comparison(FilterType::Sw, path("name.familyName"), "Jen", true),
            ScimFilter::or_of(vec![
                ScimFilter::equality(path("userName"), "a"),
                ScimFilter::equality(path("userName"), "b"),
            ]),
        ]);
        assert_eq!(
            filter.to_string(),
            "(name.familyName sw 'Jen' and (userName eq 'a' or userName eq 'b'))"
        );
    }

    #[test]
    fn test_display_escapes_value() {
        let filter = ScimFilter::equality(path("displayName"), "it's\\a\ttest\n");
        assert_eq!(
            filter.to_string(),
            "displayName eq 'it\\'s\\\\a\\ttest\\n'"
        );
    }
}
