//! Bridges a [`Driver`] to the table engine.

use std::sync::Arc;

use crudkit_engine::{BoxError, FetchContext, FetchHook};
use futures_util::FutureExt;

use crate::driver::Driver;
use crate::meta::PersistenceMeta;

/// Fetch hook answering every table query with `driver.search`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use crudkit_engine::Hooks;
/// use crudkit_model::Scope;
/// use crudkit_persist::{MemoryDriver, PersistenceMeta, fetch_hook};
///
/// let driver = Arc::new(MemoryDriver::new());
/// let meta = Arc::new(PersistenceMeta::new("users", "id"));
/// let hooks = Hooks::new().with_fetch_hook(Scope::Index, fetch_hook(driver, meta));
/// assert!(hooks.has_fetch(Scope::Index));
/// ```
pub fn fetch_hook<D>(driver: Arc<D>, meta: Arc<PersistenceMeta>) -> FetchHook
where
    D: Driver + ?Sized + 'static,
{
    Arc::new(move |ctx: FetchContext| {
        let driver = Arc::clone(&driver);
        let meta = Arc::clone(&meta);
        async move {
            driver
                .search(&meta, ctx.params)
                .await
                .map_err(BoxError::from)
        }
        .boxed()
    })
}
