//! Recognised view query parameter names.
//!
//! These are the names the server understands. Nothing restricts a query to
//! this list; any name is passed through.

/// JSON value to match exactly
pub const KEY: &str = "key";
/// JSON array of keys to match
pub const KEYS: &str = "keys";
/// JSON value to start the range with
pub const START_KEY: &str = "startkey";
/// JSON value to end the range with
pub const END_KEY: &str = "endkey";
/// Document id to start with, for paging through duplicate start keys
pub const START_KEY_DOC_ID: &str = "startkey_docid";
/// Last document id to include, for paging through duplicate end keys
pub const END_KEY_DOC_ID: &str = "endkey_docid";
/// Maximum number of rows returned
pub const LIMIT: &str = "limit";
/// `"ok"` or `"update_after"` to skip refreshing the index before answering
pub const STALE: &str = "stale";
/// Reverse the row order
pub const DESCENDING: &str = "descending";
/// Number of rows to skip
pub const SKIP: &str = "skip";
/// Reduce to distinct keys instead of a single row
pub const GROUP: &str = "group";
pub const GROUP_LEVEL: &str = "group_level";
/// Whether to run the view's reduce function
pub const REDUCE: &str = "reduce";
/// Fetch the emitting document with each row
pub const INCLUDE_DOCS: &str = "include_docs";
/// Whether the end key itself is part of the range
pub const INCLUSIVE_END: &str = "inclusive_end";
/// Ask for the database sequence the view reflects
pub const UPDATE_SEQ: &str = "update_seq";

/// Every recognised name, in the order listed above
pub const ALL: [&str; 16] = [
    KEY,
    KEYS,
    START_KEY,
    END_KEY,
    START_KEY_DOC_ID,
    END_KEY_DOC_ID,
    LIMIT,
    STALE,
    DESCENDING,
    SKIP,
    GROUP,
    GROUP_LEVEL,
    REDUCE,
    INCLUDE_DOCS,
    INCLUSIVE_END,
    UPDATE_SEQ,
];

pub fn is_recognised(name: &str) -> bool {
    ALL.contains(&name)
}
