use serde::Serialize;

use crate::ast::{SelectQuery, SortDirection};
use crate::condition::{DocumentCondition, FieldResolver};

/// Sort instruction in store terms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sort {
    pub name: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// The query handed to a store.
///
/// `documents` is the projection (empty selects whole documents). `skip` and
/// `limit` use 0 for "no offset" and "unbounded".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentQuery {
    pub documents: Vec<String>,
    pub document_collection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<DocumentCondition>,
    pub sorts: Vec<Sort>,
    pub skip: u64,
    pub limit: u64,
}

impl DocumentQuery {
    /// Compose a store query from a parsed select and its translated condition.
    /// Projected and sort fields go through the same resolver as the condition.
    pub fn assemble(
        ast: &SelectQuery,
        condition: Option<DocumentCondition>,
        resolver: &dyn FieldResolver,
    ) -> Self {
        let mut documents: Vec<String> = Vec::with_capacity(ast.fields.len());
        for field in &ast.fields {
            let name = resolver.resolve_field(&ast.entity, field);
            // two logical names may map onto one stored name
            if !documents.contains(&name) {
                documents.push(name);
            }
        }

        let sorts = ast
            .sorts
            .iter()
            .map(|spec| Sort {
                name: resolver.resolve_field(&ast.entity, &spec.field),
                direction: spec.direction,
            })
            .collect();

        Self {
            documents,
            document_collection: resolver.resolve_entity(&ast.entity),
            condition,
            sorts,
            skip: ast.skip,
            limit: ast.limit,
        }
    }

    pub fn is_projection(&self) -> bool {
        !self.documents.is_empty()
    }
}
