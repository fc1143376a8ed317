use crate::scim::path::AttributePath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn from_str(s: &str) -> SortOrder {
        match s.to_lowercase().as_str() {
            "descending" | "desc" => SortOrder::Descending,
            _ => SortOrder::Ascending, // Default to ascending
        }
    }
}

/// A SCIM sort key: the attribute path to sort by plus the direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub attribute: AttributePath,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(attribute: AttributePath, order: SortOrder) -> Self {
        SortSpec { attribute, order }
    }

    /// Parse SCIM sortBy and sortOrder parameters. Returns `None` when no
    /// sortBy was given or its path is malformed; sorting is best-effort.
    pub fn from_params(sort_by: Option<&str>, sort_order: Option<&str>) -> Option<SortSpec> {
        let attribute = AttributePath::parse(sort_by?).ok()?;
        let order = sort_order
            .map(SortOrder::from_str)
            .unwrap_or(SortOrder::Ascending);
        Some(SortSpec::new(attribute, order))
    }
}
