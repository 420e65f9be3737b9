//! Query domain - normalized user requests and their serving parameters

mod entity;

pub use entity::{normalize_query, Query, QueryParams};
