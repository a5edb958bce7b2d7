//! The process-wide active language.
//!
//! Engine functions take a `&LanguageData` explicitly; this store is a
//! convenience for callers that want "the current language". Readers get an
//! [`Arc`] snapshot, so installing a new model never disturbs a query that is
//! already running against the old one.

use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use super::LanguageData;
use crate::error::LanguageDataResult;
use crate::index;

static ACTIVE: LazyLock<RwLock<Arc<LanguageData>>> =
    LazyLock::new(|| RwLock::new(Arc::new(LanguageData::default())));

/// Replace the active model, returning the previous one.
///
/// Cached candidate words of the previous model are dropped.
pub fn install(model: LanguageData) -> Arc<LanguageData> {
    let model = Arc::new(model);
    tracing::info!(language = %model.name, id = %model.id, "installing language data");
    let mut slot = ACTIVE.write().unwrap_or_else(PoisonError::into_inner);
    let previous = std::mem::replace(&mut *slot, model);
    index::clear_word_cache();
    previous
}

/// Snapshot of the active model.
pub fn current() -> Arc<LanguageData> {
    Arc::clone(&ACTIVE.read().unwrap_or_else(PoisonError::into_inner))
}

/// Run `f` against a snapshot of the active model.
pub fn with_current<R>(f: impl FnOnce(&LanguageData) -> R) -> R {
    let model = current();
    f(&model)
}

/// Parse language data and make it active.
///
/// On a parse error the active model is left untouched.
pub fn load_from_str(text: &str) -> LanguageDataResult<Arc<LanguageData>> {
    let model = super::parse::parse_language_data(text)?;
    install(model);
    Ok(current())
}
