//! The storage driver contract.

use crudkit_model::{Paginated, QueryParams, Record};
use futures_util::future::BoxFuture;

use crate::error::Result;
use crate::meta::PersistenceMeta;

/// Future returned by every [`Driver`] operation.
pub type DriverFuture<'a, T> = BoxFuture<'a, Result<T>>;

/// Asynchronous CRUD storage for schema-described resources.
///
/// Records are addressed by their identity string, computed from
/// [`PersistenceMeta::identity`] exactly like the table engine does.
pub trait Driver: Send + Sync {
    /// Prepare storage for `meta.resource`. Idempotent.
    fn initialize<'a>(&'a self, meta: &'a PersistenceMeta) -> DriverFuture<'a, ()>;

    /// Insert `data`; returns the stored record.
    fn create<'a>(&'a self, meta: &'a PersistenceMeta, data: Record) -> DriverFuture<'a, Record>;

    fn read<'a>(&'a self, meta: &'a PersistenceMeta, id: &'a str) -> DriverFuture<'a, Record>;

    /// Shallow-merge `data` into record `id`; returns the stored record.
    fn update<'a>(
        &'a self,
        meta: &'a PersistenceMeta,
        id: &'a str,
        data: Record,
    ) -> DriverFuture<'a, Record>;

    fn destroy<'a>(&'a self, meta: &'a PersistenceMeta, id: &'a str) -> DriverFuture<'a, ()>;

    /// One page of records matching `params`.
    fn search<'a>(
        &'a self,
        meta: &'a PersistenceMeta,
        params: QueryParams,
    ) -> DriverFuture<'a, Paginated<Record>>;
}
