//! # Query Builder
//!
//! Turns raw query-string pairs into the paging, sort and filter
//! settings a list query runs with.
//!
//! Recognized keys:
//! - `page`: 1-based page number; values <= 0 disable skipping
//! - `pageSize` (alias `count`): page size, used as the result limit
//! - `sort`: field to sort on, always ascending
//! - any queryable field of the record type: equality constraint
//!
//! Field aliases accepted in request bodies are accepted here too.
//!
//! Anything else is ignored.

use serde::Deserialize;
use serde_json::Value;

use super::filter::{FilterExpr, FilterSet};
use crate::model::{FieldKind, GearId, GearRecord};

/// Page number used when none (or garbage) is supplied
pub const DEFAULT_PAGE_NUMBER: i64 = 1;

/// Page size used when none (or garbage) is supplied
pub const DEFAULT_PAGE_SIZE: i64 = 25;

/// Field every list query sorts on unless told otherwise
pub const DEFAULT_SORT_FIELD: &str = "_id";

/// Field holding the record identifier
pub const ID_FIELD: &str = "_id";

const PAGE_KEY: &str = "page";
const PAGE_SIZE_KEYS: &[&str] = &["pageSize", "count"];
const SORT_KEY: &str = "sort";

/// Raw query-string pairs in request order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// First value supplied for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Paging, sort and filter settings for one list query
#[derive(Debug, Clone, PartialEq)]
pub struct GearQuery {
    pub page_number: i64,
    pub page_count: i64,
    pub sort_field: String,
    pub filter: FilterSet,
}

impl Default for GearQuery {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_count: DEFAULT_PAGE_SIZE,
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            filter: FilterSet::new(),
        }
    }
}

impl GearQuery {
    /// Number of records to skip
    pub fn skip(&self) -> u64 {
        if self.page_number > 0 {
            (self.page_number - 1).saturating_mul(self.page_count).max(0) as u64
        } else {
            0
        }
    }

    /// Maximum number of records to return
    pub fn limit(&self) -> i64 {
        self.page_count
    }
}

/// Build the list query for record type `R` from raw query parameters
pub fn build_filter<R: GearRecord>(params: &QueryParams) -> GearQuery {
    let mut query = GearQuery::default();

    if let Some(page) = params.get(PAGE_KEY).and_then(|v| v.trim().parse::<i64>().ok()) {
        query.page_number = page;
    }

    if let Some(size) = PAGE_SIZE_KEYS
        .iter()
        .find_map(|key| params.get(key))
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|size| *size > 0)
    {
        query.page_count = size;
    }

    if let Some(sort) = params.get(SORT_KEY).map(R::canonical_field) {
        if sort == ID_FIELD || R::is_queryable(sort) {
            query.sort_field = sort.to_string();
        } else {
            tracing::warn!(sort, kind = R::KIND, "unsupported sort field, using default");
        }
    }

    for (key, value) in params.iter() {
        let key = R::canonical_field(key);
        if query.filter.constrains(key) {
            continue;
        }
        if let Some(kind) = R::field_kind(key) {
            query.filter.filters.push(FilterExpr::eq(key, parse_filter_value(kind, value)));
        }
    }

    query
}

/// Build the equality filter for a single-record operation
pub fn build_query(id: Option<GearId>, filter: Option<&FilterSet>) -> FilterSet {
    let mut query = filter.cloned().unwrap_or_default();
    if let Some(id) = id {
        query = query.and(FilterExpr::eq(ID_FIELD, Value::String(id.to_hex())));
    }
    query
}

/// Convert a query-string value to the JSON scalar the field stores
///
/// A non-numeric value for an integer field stays a string, which no
/// stored document can equal.
fn parse_filter_value(kind: FieldKind, value: &str) -> Value {
    match kind {
        FieldKind::Integer => match value.trim().parse::<i64>() {
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::String(value.to_string()),
        },
        FieldKind::Text => Value::String(value.to_string()),
    }
}
