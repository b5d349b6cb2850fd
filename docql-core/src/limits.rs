//! Parser limits.

use serde::{Deserialize, Serialize};

/// Configuration for what the parser accepts.
///
/// Exceeding any limit is reported as a grammar error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    /// Maximum query text length in characters (default: 64 KiB)
    pub max_query_length: usize,
    /// Maximum number of predicates in a WHERE clause (default: 1024)
    pub max_predicates: usize,
    /// Maximum nesting of lists, objects, `convert` and `NOT` (default: 32)
    pub max_value_depth: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_query_length: 64 * 1024,
            max_predicates: 1024,
            max_value_depth: 32,
        }
    }
}

impl QueryLimits {
    /// Limits for untrusted input
    pub fn strict() -> Self {
        Self {
            max_query_length: 4 * 1024,
            max_predicates: 64,
            max_value_depth: 8,
        }
    }

    /// Limits for generated or batch queries
    pub fn relaxed() -> Self {
        Self {
            max_query_length: 1024 * 1024,
            max_predicates: 16 * 1024,
            max_value_depth: 128,
        }
    }
}
