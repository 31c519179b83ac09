//! Paginator with a search/filter input
//!
//! The filter input sets a single query parameter of the wrapped
//! [`Paginator`]. Three triggers apply it:
//! - Enter pressed in the input (immediately)
//! - the input changed externally or lost focus (immediately)
//! - typing, once the input has been quiet for the debounce delay

use super::debounce::Debouncer;
use super::paginator::{Paginator, PaginatorConfig};
use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::types::Key;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// A [`Paginator`] plus the filter input that drives one of its parameters
pub struct FilteredPaginator<T> {
    paginator: Paginator<T>,
    param: String,
    value: Arc<Mutex<String>>,
    debouncer: Debouncer,
}

impl FilteredPaginator<Value> {
    /// A filtered paginator over raw JSON items
    pub fn json(client: Arc<ApiClient>, config: &PaginatorConfig) -> Result<Self> {
        Self::from_config(client, config, Value::clone)
    }
}

impl<T> FilteredPaginator<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap `paginator`, filtering on `param`
    pub fn new(paginator: Paginator<T>, param: impl Into<String>, delay: Duration) -> Self {
        Self {
            paginator,
            param: param.into(),
            value: Arc::new(Mutex::new(String::new())),
            debouncer: Debouncer::new(delay),
        }
    }

    /// Build from a config that names its `filter_param`
    pub fn from_config<F>(client: Arc<ApiClient>, config: &PaginatorConfig, item_constructor: F) -> Result<Self>
    where
        F: Fn(&Value) -> T + Send + Sync + 'static,
    {
        let param = config
            .filter_param
            .clone()
            .ok_or_else(|| Error::missing_field(format!("{}: filter_param", config.endpoint)))?;

        let paginator = Paginator::new(client, config, item_constructor);
        Ok(Self::new(
            paginator,
            param,
            Duration::from_millis(config.debounce_ms),
        ))
    }

    /// The wrapped paginator
    pub fn paginator(&self) -> &Paginator<T> {
        &self.paginator
    }

    /// Query parameter the filter sets
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Current text of the filter input
    pub fn value(&self) -> String {
        self.value.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Set the input text without triggering anything
    pub fn set_value(&self, text: impl Into<String>) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = text.into();
    }

    /// A key was pressed in the input; Enter applies the filter
    pub async fn on_key(&self, key: Key) -> bool {
        if key == Key::Enter {
            self.apply().await
        } else {
            false
        }
    }

    /// The input changed externally or lost focus
    pub async fn on_change(&self) -> bool {
        self.apply().await
    }

    /// The user edited the input. The filter is applied once the input
    /// has been quiet for the debounce delay, with whatever the input
    /// holds at that point.
    pub fn on_input(&self, text: impl Into<String>) {
        self.set_value(text);

        let paginator = self.paginator.clone();
        let param = self.param.clone();
        let value = Arc::clone(&self.value);
        self.debouncer.call(move || async move {
            let text = value.lock().unwrap_or_else(PoisonError::into_inner).clone();
            debug!("Applying filter {}={:?}", param, text);
            paginator.update_query_data(param, text).await;
        });
    }

    /// Whether a debounced edit is still waiting to be applied
    pub fn has_pending_input(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Wait until a debounced edit has been applied and its page loaded
    pub async fn settled(&self) {
        self.debouncer.settled().await;
    }

    async fn apply(&self) -> bool {
        // An immediate apply supersedes any debounced edit
        self.debouncer.cancel();
        let text = self.value();
        self.paginator.update_query_data(self.param.clone(), text).await
    }
}
