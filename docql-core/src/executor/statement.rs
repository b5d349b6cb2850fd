use tracing::{debug, trace};

use super::{build_query, Document, DocumentStore, DocumentStoreAsync, ResultCallback};
use crate::ast::SelectQuery;
use crate::condition::FieldResolver;
use crate::error::DocqlResult;
use crate::query::DocumentQuery;
use crate::value::{FieldValue, Params};

/// A parsed query with its parameter bindings.
///
/// The text is parsed once; the condition is translated again on every
/// execution against whatever is bound at that moment. Executing does not
/// clear bindings, and a failed execution leaves them as they were, so a
/// statement can be rebound and run any number of times.
pub struct PreparedStatement<'a, S: ?Sized> {
    ast: SelectQuery,
    params: Params,
    store: &'a S,
    resolver: &'a dyn FieldResolver,
}

impl<'a, S: ?Sized> PreparedStatement<'a, S> {
    pub(super) fn new(ast: SelectQuery, store: &'a S, resolver: &'a dyn FieldResolver) -> Self {
        Self {
            ast,
            params: Params::new(),
            store,
            resolver,
        }
    }

    /// Bind `@name`, replacing any previous value.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        trace!(param = %name, value = %value, "Binding parameter");
        self.params.insert(name, value);
        self
    }

    /// Every parameter the query references, in source order
    pub fn parameters(&self) -> Vec<String> {
        self.ast.parameter_names()
    }

    /// Referenced parameters that have no value yet
    pub fn unbound_parameters(&self) -> Vec<String> {
        self.ast
            .parameter_names()
            .into_iter()
            .filter(|name| !self.params.contains_key(name))
            .collect()
    }

    pub fn ast(&self) -> &SelectQuery {
        &self.ast
    }

    /// The query that would be sent with the current bindings.
    pub fn document_query(&self) -> DocqlResult<DocumentQuery> {
        build_query(&self.ast, &self.params, self.resolver)
    }
}

impl<'a, S: DocumentStore + ?Sized> PreparedStatement<'a, S> {
    /// Execute against the blocking store.
    pub fn result_list(&self) -> DocqlResult<Vec<Document>> {
        let query = self.document_query()?;
        debug!(collection = %query.document_collection, "Dispatching prepared query");
        self.store.select(&query)
    }
}

impl<'a, S: DocumentStoreAsync + ?Sized> PreparedStatement<'a, S> {
    /// Execute against the callback store. Translation errors are returned
    /// here and the callback is dropped unused.
    pub fn result_list_async(&self, callback: ResultCallback) -> DocqlResult<()> {
        let query = self.document_query()?;
        debug!(collection = %query.document_collection, "Dispatching async prepared query");
        self.store.select(query, callback);
        Ok(())
    }
}
