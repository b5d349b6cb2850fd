//! Statement execution.
//!
//! A [`QueryParser`] parses query text, translates the WHERE tree, assembles a
//! [`DocumentQuery`] and hands it to a store. Stores implement
//! [`DocumentStore`] (blocking) or [`DocumentStoreAsync`] (callback based).
//! Parse and translation failures are always reported to the caller directly;
//! a callback only ever carries the store's own outcome.

mod statement;

pub use statement::PreparedStatement;

use tracing::debug;

use crate::ast::SelectQuery;
use crate::condition::{translate, FieldResolver};
use crate::error::DocqlResult;
use crate::limits::QueryLimits;
use crate::parser;
use crate::query::DocumentQuery;
use crate::value::Params;

/// A document as returned by a store
pub type Document = serde_json::Value;

/// Completion callback for [`DocumentStoreAsync::select`]. Invoked exactly once.
pub type ResultCallback = Box<dyn FnOnce(DocqlResult<Vec<Document>>) + Send + 'static>;

/// Store that answers queries on the calling thread.
pub trait DocumentStore {
    fn select(&self, query: &DocumentQuery) -> DocqlResult<Vec<Document>>;
}

/// Store that answers queries later through a callback.
///
/// Implementations take ownership of the query; the caller does not wait for
/// the callback before returning.
pub trait DocumentStoreAsync {
    fn select(&self, query: DocumentQuery, callback: ResultCallback);
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn select(&self, query: &DocumentQuery) -> DocqlResult<Vec<Document>> {
        (**self).select(query)
    }
}

impl<T: DocumentStoreAsync + ?Sized> DocumentStoreAsync for &T {
    fn select(&self, query: DocumentQuery, callback: ResultCallback) {
        (**self).select(query, callback)
    }
}

/// Entry point for running query text against a store.
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    limits: QueryLimits,
}

impl QueryParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser that enforces custom limits.
    pub fn with_limits(limits: QueryLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &QueryLimits {
        &self.limits
    }

    /// Parse query text into its AST.
    pub fn parse(&self, text: &str) -> DocqlResult<SelectQuery> {
        let ast = parser::parse_with_limits(text, &self.limits)?;
        debug!(
            entity = %ast.entity,
            predicates = ast.condition.as_ref().map_or(0, |c| c.predicate_count()),
            "Parsed query"
        );
        Ok(ast)
    }

    /// Parse and assemble against `params` without executing.
    pub fn explain(
        &self,
        text: &str,
        params: &Params,
        resolver: &dyn FieldResolver,
    ) -> DocqlResult<DocumentQuery> {
        let ast = self.parse(text)?;
        build_query(&ast, params, resolver)
    }

    /// Run query text once against a blocking store.
    ///
    /// Nothing is bound, so any `@name` reference fails with `UnboundParameter`
    /// before the store is called.
    pub fn query<S>(
        &self,
        text: &str,
        store: &S,
        resolver: &dyn FieldResolver,
    ) -> DocqlResult<Vec<Document>>
    where
        S: DocumentStore + ?Sized,
    {
        let query = self.explain(text, &Params::new(), resolver)?;
        debug!(collection = %query.document_collection, "Dispatching query");
        store.select(&query)
    }

    /// Run query text once against a callback store.
    ///
    /// Returns as soon as the query is dispatched. On error the callback is
    /// dropped without being called.
    pub fn query_async<S>(
        &self,
        text: &str,
        store: &S,
        callback: ResultCallback,
        resolver: &dyn FieldResolver,
    ) -> DocqlResult<()>
    where
        S: DocumentStoreAsync + ?Sized,
    {
        let query = self.explain(text, &Params::new(), resolver)?;
        debug!(collection = %query.document_collection, "Dispatching async query");
        store.select(query, callback);
        Ok(())
    }

    /// Parse once into a statement that can be bound and executed repeatedly.
    pub fn prepare<'a, S>(
        &self,
        text: &str,
        store: &'a S,
        resolver: &'a dyn FieldResolver,
    ) -> DocqlResult<PreparedStatement<'a, S>>
    where
        S: ?Sized,
    {
        let ast = self.parse(text)?;
        Ok(PreparedStatement::new(ast, store, resolver))
    }
}

/// [`QueryParser::query`] with default limits.
pub fn query<S>(text: &str, store: &S, resolver: &dyn FieldResolver) -> DocqlResult<Vec<Document>>
where
    S: DocumentStore + ?Sized,
{
    QueryParser::new().query(text, store, resolver)
}

/// [`QueryParser::query_async`] with default limits.
pub fn query_async<S>(
    text: &str,
    store: &S,
    callback: ResultCallback,
    resolver: &dyn FieldResolver,
) -> DocqlResult<()>
where
    S: DocumentStoreAsync + ?Sized,
{
    QueryParser::new().query_async(text, store, callback, resolver)
}

/// [`QueryParser::prepare`] with default limits.
pub fn prepare<'a, S>(
    text: &str,
    store: &'a S,
    resolver: &'a dyn FieldResolver,
) -> DocqlResult<PreparedStatement<'a, S>>
where
    S: ?Sized,
{
    QueryParser::new().prepare(text, store, resolver)
}

/// Translate the condition of `ast` against `params` and assemble the query.
pub(crate) fn build_query(
    ast: &SelectQuery,
    params: &Params,
    resolver: &dyn FieldResolver,
) -> DocqlResult<DocumentQuery> {
    let condition = ast
        .condition
        .as_ref()
        .map(|node| translate(node, params, resolver, &ast.entity))
        .transpose()?;

    debug!(
        entity = %ast.entity,
        params = params.len(),
        conditioned = condition.is_some(),
        "Translated query"
    );

    Ok(DocumentQuery::assemble(ast, condition, resolver))
}
