//! Recursive-descent parser for the SCIM filter grammar:
//!
//! ```text
//! filter      := orExpr
//! orExpr      := andExpr ( "or" andExpr )*
//! andExpr     := term   ( "and" term )*
//! term        := "(" filter ")" | predicate
//! predicate   := attrPath ws op ( ws value )?
//! op          := "eq" | "co" | "sw" | "pr" | "gt" | "ge" | "lt" | "le"
//! attrPath    := [ schemaURI ":" ] attrName [ "." subAttrName ]
//! value       := quotedString | bareLiteral
//! ```
//!
//! Operator keywords are case-insensitive. Malformed input fails with
//! `Error::InvalidFilter` carrying the byte offset of the problem.

use crate::error::{Error, Result};
use crate::parser::filter::{FilterType, ScimFilter};
use crate::scim::path::AttributePath;

/// Parse a SCIM filter string into its AST.
pub fn parse_filter(input: &str) -> Result<ScimFilter> {
    let mut parser = FilterParser::new(input);
    let filter = parser.parse_or_expr()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(filter)
}

struct FilterParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> FilterParser<'a> {
    fn new(input: &'a str) -> Self {
        FilterParser { input, pos: 0 }
    }

    fn parse_or_expr(&mut self) -> Result<ScimFilter> {
        let mut components = vec![self.parse_and_expr()?];
        while self.try_keyword("or") {
            components.push(self.parse_and_expr()?);
        }
        if components.len() == 1 {
            Ok(components.remove(0))
        } else {
            Ok(ScimFilter::or_of(components))
        }
    }

    fn parse_and_expr(&mut self) -> Result<ScimFilter> {
        let mut components = vec![self.parse_term()?];
        while self.try_keyword("and") {
            components.push(self.parse_term()?);
        }
        if components.len() == 1 {
            Ok(components.remove(0))
        } else {
            Ok(ScimFilter::and_of(components))
        }
    }

    fn parse_term(&mut self) -> Result<ScimFilter> {
        self.skip_whitespace();
        if self.peek() == Some('(') {
            self.pos += 1;
            let filter = self.parse_or_expr()?;
            self.skip_whitespace();
            if self.peek() != Some(')') {
                return Err(self.error("expected ')'"));
            }
            self.pos += 1;
            Ok(filter)
        } else {
            self.parse_predicate()
        }
    }

    fn parse_predicate(&mut self) -> Result<ScimFilter> {
        self.skip_whitespace();
        let path_start = self.pos;
        let path_word = self.read_word();
        if path_word.is_empty() {
            return Err(self.error_at(path_start, "expected an attribute path"));
        }
        let attribute = AttributePath::parse(path_word)
            .map_err(|message| self.error_at(path_start, message))?;

        self.skip_whitespace();
        let op_start = self.pos;
        let op_word = self.read_word();
        if op_word.is_empty() {
            return Err(self.error_at(op_start, "expected a filter operator"));
        }
        let filter_type = match op_word.to_ascii_lowercase().as_str() {
            "eq" => FilterType::Eq,
            "co" => FilterType::Co,
            "sw" => FilterType::Sw,
            "pr" => FilterType::Pr,
            "gt" => FilterType::Gt,
            "ge" => FilterType::Ge,
            "lt" => FilterType::Lt,
            "le" => FilterType::Le,
            other => {
                return Err(
                    self.error_at(op_start, format!("unrecognized operator '{}'", other))
                );
            }
        };

        if filter_type == FilterType::Pr {
            return Ok(ScimFilter::present(attribute));
        }

        self.skip_whitespace();
        let (value, quoted) = self.parse_value()?;
        Ok(ScimFilter::comparison(filter_type, attribute, value, quoted))
    }

    /// Parse a quoted string or a bare boolean/integer literal. Returns the
    /// value together with whether it was quoted.
    fn parse_value(&mut self) -> Result<(String, bool)> {
        let start = self.pos;
        match self.peek() {
            None => Err(self.error("expected a filter value")),
            Some('\'') => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.bump() {
                        None => return Err(self.error_at(start, "unterminated string value")),
                        Some('\'') => return Ok((value, true)),
                        Some('\\') => match self.bump() {
                            Some('\'') => value.push('\''),
                            Some('\\') => value.push('\\'),
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some(c) => {
                                return Err(self.error_at(
                                    self.pos - c.len_utf8(),
                                    format!("invalid escape sequence '\\{}'", c),
                                ));
                            }
                            None => {
                                return Err(self.error_at(start, "unterminated string value"))
                            }
                        },
                        Some(c) => value.push(c),
                    }
                }
            }
            Some(_) => {
                let word = self.read_word();
                if word == "true" || word == "false" || word.parse::<i64>().is_ok() {
                    Ok((word.to_string(), false))
                } else {
                    Err(self.error_at(
                        start,
                        format!("expected a quoted string, boolean or integer, found '{}'", word),
                    ))
                }
            }
        }
    }

    /// Consume the given keyword (case-insensitively) if it is the next
    /// word; otherwise leave the position unchanged.
    fn try_keyword(&mut self, keyword: &str) -> bool {
        let saved = self.pos;
        self.skip_whitespace();
        let word = self.read_word();
        if word.eq_ignore_ascii_case(keyword) {
            true
        } else {
            self.pos = saved;
            false
        }
    }

    /// A word is a maximal run of characters up to whitespace, parentheses
    /// or a quote.
    fn read_word(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '(' || c == ')' || c == '\'' {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::invalid_filter(self.pos, message)
    }

    fn error_at(&self, position: usize, message: impl Into<String>) -> Error {
        Error::invalid_filter(position, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_equality_filter() {
        let filter = parse_filter("userName eq 'bjensen'").unwrap();
        assert_eq!(filter.filter_type(), FilterType::Eq);
        assert_eq!(filter.filter_attribute().unwrap().attribute, "userName");
        assert_eq!(filter.filter_value(), Some("bjensen"));
        assert!(filter.is_quoted());
    }

    #[test]
    fn test_value_with_spaces() {
        let filter = parse_filter("title eq 'Product Manager'").unwrap();
        assert_eq!(filter.filter_value(), Some("Product Manager"));
    }

    #[test]
    fn test_operators_are_case_insensitive() {
        let filter = parse_filter("userName EQ 'bjensen'").unwrap();
        assert_eq!(filter.filter_type(), FilterType::Eq);
        let filter = parse_filter("a eq '1' AND b eq '2'").unwrap();
        assert_eq!(filter.filter_type(), FilterType::And);
    }

    #[test]
    fn test_sub_attribute_path() {
        let filter = parse_filter("name.familyName sw 'Jen'").unwrap();
        let path = filter.filter_attribute().unwrap();
        assert_eq!(path.attribute, "name");
        assert_eq!(path.sub_attribute.as_deref(), Some("familyName"));
    }

    #[test]
    fn test_schema_qualified_path() {
        let filter =
            parse_filter("urn:ietf:params:scim:schemas:core:2.0:User:userName eq 'bjensen'")
                .unwrap();
        let path = filter.filter_attribute().unwrap();
        assert_eq!(
            path.schema.as_deref(),
            Some("urn:ietf:params:scim:schemas:core:2.0:User")
        );
        assert_eq!(path.attribute, "userName");
    }

    #[test]
    fn test_presence_filter() {
        let filter = parse_filter("emails pr").unwrap();
        assert_eq!(filter.filter_type(), FilterType::Pr);
        assert_eq!(filter.filter_value(), None);
    }

    #[test]
    fn test_bare_literals() {
        let filter = parse_filter("active eq true").unwrap();
        assert_eq!(filter.filter_value(), Some("true"));
        assert!(!filter.is_quoted());

        let filter = parse_filter("uidNumber gt 100").unwrap();
        assert_eq!(filter.filter_value(), Some("100"));
        assert!(!filter.is_quoted());

        let filter = parse_filter("uidNumber le -5").unwrap();
        assert_eq!(filter.filter_value(), Some("-5"));
    }

    #[test]
    fn test_invalid_bare_literal() {
        let err = parse_filter("userName eq bjensen").unwrap_err();
        match err {
            Error::InvalidFilter { position, message } => {
                assert_eq!(position, 12);
                assert!(message.contains("bjensen"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_string_escapes() {
        let filter = parse_filter("displayName eq 'it\\'s\\\\a\\ttest\\n'").unwrap();
        assert_eq!(filter.filter_value(), Some("it's\\a\ttest\n"));
    }

    #[test]
    fn test_invalid_escape() {
        let err = parse_filter("displayName eq 'a\\qb'").unwrap_err();
        assert!(matches!(err, Error::InvalidFilter { .. }));
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse_filter("userName eq 'bjensen").unwrap_err();
        match err {
            Error::InvalidFilter { position, .. } => assert_eq!(position, 12),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_and_or_precedence() {
        // and binds tighter than or
        let filter = parse_filter("a eq '1' or b eq '2' and c eq '3'").unwrap();
        assert_eq!(filter.filter_type(), FilterType::Or);
        let components = filter.filter_components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].filter_type(), FilterType::Eq);
        assert_eq!(components[1].filter_type(), FilterType::And);
    }

    #[test]
    fn test_logical_operators_are_n_ary() {
        let filter = parse_filter("a eq '1' or b eq '2' or c eq '3'").unwrap();
        assert_eq!(filter.filter_type(), FilterType::Or);
        assert_eq!(filter.filter_components().len(), 3);
    }

    #[test]
    fn test_parenthesized_group() {
        let filter = parse_filter("(a eq '1' or b eq '2') and c eq '3'").unwrap();
        assert_eq!(filter.filter_type(), FilterType::And);
        let components = filter.filter_components();
        assert_eq!(components[0].filter_type(), FilterType::Or);
        assert_eq!(components[1].filter_type(), FilterType::Eq);
    }

    #[test]
    fn test_nested_parentheses() {
        let filter =
            parse_filter("((a eq '1' or b eq '2') and (c eq '3')) or d eq '4'").unwrap();
        assert_eq!(filter.filter_type(), FilterType::Or);
        assert_eq!(filter.filter_components()[0].filter_type(), FilterType::And);
    }

    #[test]
    fn test_missing_closing_paren() {
        let err = parse_filter("(userName eq 'bjensen'").unwrap_err();
        assert!(matches!(err, Error::InvalidFilter { .. }));
    }

    #[test]
    fn test_trailing_input_rejected() {
        let err = parse_filter("userName eq 'bjensen' extra").unwrap_err();
        match err {
            Error::InvalidFilter { message, .. } => {
                assert!(message.contains("trailing"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_operator() {
        let err = parse_filter("userName like 'b%'").unwrap_err();
        match err {
            Error::InvalidFilter { position, message } => {
                assert_eq!(position, 9);
                assert!(message.contains("like"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_filter("").is_err());
        assert!(parse_filter("   ").is_err());
    }

    #[test]
    fn test_pretty_printed_filter_round_trips() {
        for input in [
            "userName eq 'bjensen'",
            "emails pr",
            "active eq true",
            "uidNumber ge 1000",
            "name.familyName sw 'Jen' and emails.value co '@x'",
            "(a eq '1' or b eq '2') and c pr",
            "a eq '1' or b eq '2' or c eq '3'",
            "displayName eq 'it\\'s\\\\a\\ttest\\n'",
        ] {
            let parsed = parse_filter(input).unwrap();
            let printed = parsed.to_string();
            let reparsed = parse_filter(&printed)
                .unwrap_or_else(|e| panic!("'{}' did not round-trip: {}", printed, e));
            assert_eq!(reparsed, parsed, "round-trip mismatch for '{}'", input);
        }
    }
}
