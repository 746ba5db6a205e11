//! Shared response bodies for API handlers.

use serde::Serialize;

/// `{ "results": [...], "total": n }` listing envelope.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub results: Vec<T>,
    pub total: usize,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(results: Vec<T>) -> Self {
        let total = results.len();
        Self { results, total }
    }
}

/// Confirmation returned by soft-delete endpoints, echoing the record as it
/// was before deletion.
#[derive(Debug, Serialize)]
pub struct DeletedResponse<T: Serialize> {
    pub message: &'static str,
    pub project: T,
}
