//! 搜索、过滤与排序
//!
//! Pure functions behind the search box and the record table. The query is
//! matched case-insensitively; an empty query leaves the input untouched.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use whois_bi_client::utils::datetime;
use whois_bi_client::{Domain, Record};

/// Something the search box can match against.
pub trait Searchable {
    /// `query` is already lower-cased and non-empty.
    fn matches(&self, query: &str) -> bool;
}

impl Searchable for Domain {
    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
    }
}

impl Searchable for Record {
    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.fields.to_lowercase().contains(query)
            || self.ttl.to_string() == query
            || self.rr_type.to_lowercase() == query
    }
}

/// Items matching `query`, in input order.
///
/// An empty query borrows the input as is.
pub fn filter<'a, T>(items: &'a [T], query: &str) -> Cow<'a, [T]>
where
    T: Searchable + Clone,
{
    if query.is_empty() {
        return Cow::Borrowed(items);
    }
    let query = query.to_lowercase();
    Cow::Owned(
        items
            .iter()
            .filter(|item| item.matches(&query))
            .cloned()
            .collect(),
    )
}

/// Split records into `(current, historical)`.
pub fn partition_records(records: &[Record]) -> (Vec<Record>, Vec<Record>) {
    records.iter().cloned().partition(Record::is_current)
}

/// Record table column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Type,
    Ttl,
    AddedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Stable sort of `records` by one column.
///
/// Unparseable or unset `added_at` values sort before every real timestamp.
pub fn sort_records(records: &mut [Record], key: SortKey, direction: SortDirection) {
    let compare = |a: &Record, b: &Record| -> Ordering {
        match key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Type => a.rr_type.cmp(&b.rr_type),
            SortKey::Ttl => a.ttl.cmp(&b.ttl),
            SortKey::AddedAt => datetime::parse(&a.added_at).cmp(&datetime::parse(&b.added_at)),
        }
    };
    match direction {
        SortDirection::Ascending => records.sort_by(compare),
        SortDirection::Descending => records.sort_by(|a, b| compare(a, b).reverse()),
    }
}
