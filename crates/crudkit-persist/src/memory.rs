//! In-memory reference driver.
//!
//! Records live per resource in insertion order. Search applies filters,
//! then a stable sort, then pagination:
//!
//! - string filters on string-typed fields match case-insensitive substrings;
//! - string filters on numeric or boolean fields are parsed first;
//! - every other filter compares by equality.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crudkit_model::{
    DataType, Paginated, QueryParams, Record, SortOrder, display_string, is_blank,
};
use futures_util::FutureExt;
use futures_util::future::ready;
use serde_json::Value;

use crate::driver::{Driver, DriverFuture};
use crate::error::{PersistError, Result};
use crate::meta::PersistenceMeta;

/// Driver keeping every resource in process memory.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    resources: Mutex<HashMap<String, Vec<Record>>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Record>>> {
        self.resources.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the records of `meta.resource`.
    fn with_records<T>(
        &self,
        meta: &PersistenceMeta,
        f: impl FnOnce(&mut Vec<Record>) -> Result<T>,
    ) -> Result<T> {
        let mut resources = self.lock();
        let records = resources
            .get_mut(&meta.resource)
            .ok_or_else(|| PersistError::NotInitialized {
                resource: meta.resource.clone(),
            })?;
        f(records)
    }

    /// Number of records stored for `resource`.
    pub fn len(&self, resource: &str) -> usize {
        self.lock().get(resource).map_or(0, Vec::len)
    }

    fn create_now(&self, meta: &PersistenceMeta, data: Record) -> Result<Record> {
        check_identity(meta, &data)?;
        let id = meta.identity.of(&data);
        self.with_records(meta, |records| {
            if position(meta, records, &id).is_some() {
                return Err(PersistError::Duplicate {
                    resource: meta.resource.clone(),
                    id,
                });
            }
            records.push(data.clone());
            tracing::debug!(resource = %meta.resource, %id, "record created");
            Ok(data)
        })
    }

    fn read_now(&self, meta: &PersistenceMeta, id: &str) -> Result<Record> {
        self.with_records(meta, |records| {
            position(meta, records, id)
                .map(|index| records[index].clone())
                .ok_or_else(|| not_found(meta, id))
        })
    }

    fn update_now(&self, meta: &PersistenceMeta, id: &str, data: Record) -> Result<Record> {
        self.with_records(meta, |records| {
            let index = position(meta, records, id).ok_or_else(|| not_found(meta, id))?;
            let mut merged = records[index].clone();
            merged.extend(data);
            check_identity(meta, &merged)?;

            let new_id = meta.identity.of(&merged);
            if new_id != id && position(meta, records, &new_id).is_some() {
                return Err(PersistError::Duplicate {
                    resource: meta.resource.clone(),
                    id: new_id,
                });
            }
            records[index] = merged.clone();
            tracing::debug!(resource = %meta.resource, id, "record updated");
            Ok(merged)
        })
    }

    fn destroy_now(&self, meta: &PersistenceMeta, id: &str) -> Result<()> {
        self.with_records(meta, |records| {
            let index = position(meta, records, id).ok_or_else(|| not_found(meta, id))?;
            records.remove(index);
            tracing::debug!(resource = %meta.resource, id, "record destroyed");
            Ok(())
        })
    }

    fn search_now(
        &self,
        meta: &PersistenceMeta,
        params: &QueryParams,
    ) -> Result<Paginated<Record>> {
        self.with_records(meta, |records| {
            let mut matches: Vec<&Record> = records
                .iter()
                .filter(|record| {
                    params
                        .filters
                        .iter()
                        .all(|(field, filter)| matches_filter(meta, field, record, filter))
                })
                .collect();

            if let Some(field) = &params.sort {
                matches.sort_by(|a, b| {
                    let ordering = compare_values(
                        a.get(field).unwrap_or(&Value::Null),
                        b.get(field).unwrap_or(&Value::Null),
                    );
                    match params.order {
                        Some(SortOrder::Desc) => ordering.reverse(),
                        _ => ordering,
                    }
                });
            }

            let total = matches.len() as u64;
            let data = matches
                .into_iter()
                .skip(params.offset())
                .take(params.limit as usize)
                .cloned()
                .collect();
            Ok(Paginated {
                data,
                total,
                page: params.page,
                limit: params.limit,
            })
        })
    }
}

impl Driver for MemoryDriver {
    fn initialize<'a>(&'a self, meta: &'a PersistenceMeta) -> DriverFuture<'a, ()> {
        self.lock().entry(meta.resource.clone()).or_default();
        tracing::debug!(resource = %meta.resource, "resource initialized");
        ready(Ok(())).boxed()
    }

    fn create<'a>(&'a self, meta: &'a PersistenceMeta, data: Record) -> DriverFuture<'a, Record> {
        ready(self.create_now(meta, data)).boxed()
    }

    fn read<'a>(&'a self, meta: &'a PersistenceMeta, id: &'a str) -> DriverFuture<'a, Record> {
        ready(self.read_now(meta, id)).boxed()
    }

    fn update<'a>(
        &'a self,
        meta: &'a PersistenceMeta,
        id: &'a str,
        data: Record,
    ) -> DriverFuture<'a, Record> {
        ready(self.update_now(meta, id, data)).boxed()
    }

    fn destroy<'a>(&'a self, meta: &'a PersistenceMeta, id: &'a str) -> DriverFuture<'a, ()> {
        ready(self.destroy_now(meta, id)).boxed()
    }

    fn search<'a>(
        &'a self,
        meta: &'a PersistenceMeta,
        params: QueryParams,
    ) -> DriverFuture<'a, Paginated<Record>> {
        ready(self.search_now(meta, &params)).boxed()
    }
}

fn not_found(meta: &PersistenceMeta, id: &str) -> PersistError {
    PersistError::NotFound {
        resource: meta.resource.clone(),
        id: id.to_string(),
    }
}

fn check_identity(meta: &PersistenceMeta, record: &Record) -> Result<()> {
    for field in meta.identity.fields() {
        if record.get(field).is_none_or(Value::is_null) {
            return Err(PersistError::MissingIdentity {
                resource: meta.resource.clone(),
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

fn position(meta: &PersistenceMeta, records: &[Record], id: &str) -> Option<usize> {
    records.iter().position(|record| meta.identity.of(record) == id)
}

fn matches_filter(meta: &PersistenceMeta, field: &str, record: &Record, filter: &Value) -> bool {
    if is_blank(filter) {
        return true;
    }
    let value = record.get(field).unwrap_or(&Value::Null);
    let Value::String(text) = filter else {
        return value == filter;
    };
    match meta.data_type(field) {
        DataType::Number | DataType::Integer => match text.trim().parse::<f64>() {
            Ok(wanted) => value.as_f64() == Some(wanted),
            Err(_) => false,
        },
        DataType::Boolean => match text.trim().parse::<bool>() {
            Ok(wanted) => value.as_bool() == Some(wanted),
            Err(_) => false,
        },
        _ => display_string(value)
            .to_lowercase()
            .contains(&text.to_lowercase()),
    }
}

/// Nulls first, numbers numerically, everything else by display string.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or_default()
            .total_cmp(&y.as_f64().unwrap_or_default()),
        _ => display_string(a).cmp(&display_string(b)),
    }
}
