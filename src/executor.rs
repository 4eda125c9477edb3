use async_trait::async_trait;

use crate::callback::complete;
use crate::error::DbError;
use crate::results::{CustomDbRow, ResultSet, WriteResult};
use crate::types::{RowValues, Statement};

/// The four data-access verbs, identical for every backend.
///
/// Each verb also has a completion-callback form (`*_with`) that hands the
/// outcome to a closure and still returns it, so callers written in either
/// style observe the same results.
#[async_trait]
pub trait DatabaseExecutor: Send + Sync {
    /// Run a read statement and return every matching row, in order.
    async fn query(&self, query: &str, params: &[RowValues]) -> Result<ResultSet, DbError>;

    /// Run a read statement and return its first row, or `None`.
    async fn get(&self, query: &str, params: &[RowValues])
    -> Result<Option<CustomDbRow>, DbError>;

    /// Run a write statement and return the generated id and change count.
    async fn execute(&self, query: &str, params: &[RowValues]) -> Result<WriteResult, DbError>;

    /// Run `statements` in order as one all-or-nothing unit.
    async fn transaction(&self, statements: &[Statement]) -> Result<Vec<WriteResult>, DbError>;

    /// Alias of [`DatabaseExecutor::query`].
    async fn all(&self, query: &str, params: &[RowValues]) -> Result<ResultSet, DbError> {
        self.query(query, params).await
    }

    /// Alias of [`DatabaseExecutor::execute`].
    async fn run(&self, query: &str, params: &[RowValues]) -> Result<WriteResult, DbError> {
        self.execute(query, params).await
    }

    async fn query_with<F>(
        &self,
        query: &str,
        params: &[RowValues],
        callback: F,
    ) -> Result<ResultSet, DbError>
    where
        F: FnOnce(Result<&ResultSet, &DbError>) + Send,
        Self: Sized,
    {
        complete(self.query(query, params).await, callback)
    }

    async fn get_with<F>(
        &self,
        query: &str,
        params: &[RowValues],
        callback: F,
    ) -> Result<Option<CustomDbRow>, DbError>
    where
        F: FnOnce(Result<&Option<CustomDbRow>, &DbError>) + Send,
        Self: Sized,
    {
        complete(self.get(query, params).await, callback)
    }

    async fn execute_with<F>(
        &self,
        query: &str,
        params: &[RowValues],
        callback: F,
    ) -> Result<WriteResult, DbError>
    where
        F: FnOnce(Result<&WriteResult, &DbError>) + Send,
        Self: Sized,
    {
        complete(self.execute(query, params).await, callback)
    }

    async fn transaction_with<F>(
        &self,
        statements: &[Statement],
        callback: F,
    ) -> Result<Vec<WriteResult>, DbError>
    where
        F: FnOnce(Result<&Vec<WriteResult>, &DbError>) + Send,
        Self: Sized,
    {
        complete(self.transaction(statements).await, callback)
    }
}
