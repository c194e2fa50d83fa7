//! Persistence contract for crudkit resources.
//!
//! A [`Driver`] stores records of the resources described by
//! [`PersistenceMeta`]. [`MemoryDriver`] is the in-process reference driver;
//! [`fetch_hook`] plugs any driver into a table engine.
//!
//! # Example
//!
//! ```
//! use crudkit_model::QueryParams;
//! use crudkit_persist::{Driver, MemoryDriver, PersistenceMeta};
//! use serde_json::json;
//!
//! # futures_util::FutureExt::now_or_never(async {
//! let driver = MemoryDriver::new();
//! let meta = PersistenceMeta::new("users", "id");
//! driver.initialize(&meta).await.unwrap();
//! let record = serde_json::from_value(json!({ "id": 1, "name": "Ada" })).unwrap();
//! driver.create(&meta, record).await.unwrap();
//!
//! let page = driver.search(&meta, QueryParams::default()).await.unwrap();
//! assert_eq!(page.total, 1);
//! # }).unwrap();
//! ```

mod driver;
mod error;
mod hook;
mod memory;
mod meta;

pub use driver::{Driver, DriverFuture};
pub use error::{PersistError, Result};
pub use hook::fetch_hook;
pub use memory::MemoryDriver;
pub use meta::{FieldMeta, PersistenceMeta};
