//! docql core - storage-independent parser and translator for a small
//! SQL-like document query language.
//!
//! A query such as
//!
//! ```text
//! select name, age from God where age between 10 and 30 and name like "A%"
//!     order by age desc skip 5 limit 10
//! ```
//!
//! is parsed into a [`SelectQuery`], its WHERE tree is translated into a
//! [`DocumentCondition`] (binding `@parameters`, applying `convert(..)` and
//! renaming fields through a [`FieldResolver`]), and the assembled
//! [`DocumentQuery`] is handed to a store.
//!
//! # Main Components
//!
//! - **Lexer / Parser**: query text to AST, with configurable [`QueryLimits`]
//! - **Value resolver**: AST values to [`FieldValue`]s
//! - **Condition translator**: AST conditions to store conditions
//! - **Executor**: immediate and prepared execution against a [`DocumentStore`]
//!   or a callback-based [`DocumentStoreAsync`]
//!
//! # Example
//!
//! ```rust
//! use docql_core::{prepare, Document, DocumentQuery, DocumentStore, DocqlResult, IdentityResolver};
//!
//! struct Echo;
//!
//! impl DocumentStore for Echo {
//!     fn select(&self, query: &DocumentQuery) -> DocqlResult<Vec<Document>> {
//!         Ok(vec![serde_json::to_value(query).unwrap()])
//!     }
//! }
//!
//! let store = Echo;
//! let mut statement =
//!     prepare("select * from God where name = @name", &store, &IdentityResolver).unwrap();
//! statement.bind("name", "Ada");
//! let results = statement.result_list().unwrap();
//! assert_eq!(results[0]["condition"]["value"], "Ada");
//! ```

pub mod ast;
pub mod condition;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod limits;
pub mod parser;
pub mod query;
pub mod value;

// Re-export main types for convenience
pub use ast::{ConditionNode, Operator, SelectQuery, SortDirection, SortSpec, Value};
pub use condition::{translate, DocumentCondition, FieldOperator, FieldResolver, IdentityResolver};
pub use error::{DocqlError, DocqlResult};
pub use executor::{
    prepare, query, query_async, Document, DocumentStore, DocumentStoreAsync, PreparedStatement,
    QueryParser, ResultCallback,
};
pub use lexer::{Lexer, Token};
pub use limits::QueryLimits;
pub use parser::{parse, parse_with_limits, Parser};
pub use query::{DocumentQuery, Sort};
pub use value::{resolve, ConversionTarget, FieldValue, Params};
