pub mod filter;
pub mod filter_parser;
pub mod sort_parser;

pub use filter::{FilterType, ScimFilter};
pub use filter_parser::parse_filter;
pub use sort_parser::{SortOrder, SortSpec};
