//! Cursor paginator
//!
//! A [`Paginator`] renders one page of an endpoint at a time. The first
//! page is requested with the configured query data; the pages after that
//! are reached by following the `next`/`prev` relations of the `Links`
//! header, which already encode the right cursor.

use crate::error::Error;
use crate::http::{ApiClient, ApiResponse, RequestOptions};
use crate::output::Output;
use crate::types::{endpoint_link, LinkMap, Method, QueryData};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

/// Default delay before a filter edit is applied
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Builds one rendered list item from one element of the response array
pub type ItemConstructor<T> = Arc<dyn Fn(&Value) -> T + Send + Sync>;

/// Called with the item a user selected
pub type SelectHook<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Configuration of one paginated list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatorConfig {
    /// Endpoint below the API prefix, e.g. `/players/`
    pub endpoint: String,

    /// Query data of the first request
    #[serde(default)]
    pub query: QueryData,

    /// Query parameter driven by a filter input, if any
    #[serde(default)]
    pub filter_param: Option<String>,

    /// Debounce delay for filter edits, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl PaginatorConfig {
    /// Create a config for an endpoint with no initial query data
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: QueryData::new(),
            filter_param: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }

    /// Add a parameter to the initial query data
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Make this a filtered list driven by `param`
    #[must_use]
    pub fn filter(mut self, param: impl Into<String>) -> Self {
        self.filter_param = Some(param.into());
        self
    }

    /// Set the filter debounce delay
    #[must_use]
    pub fn debounce_ms(mut self, millis: u64) -> Self {
        self.debounce_ms = millis;
        self
    }
}

/// UI controls of a paginator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// The "next" button was clicked
    Next,
    /// The "previous" button was clicked
    Prev,
    /// The rendered item at this index was clicked
    Select(usize),
}

struct PageState<T> {
    query_data: QueryData,
    /// Always `endpoint?serialize(query_data)`
    current_link: String,
    links: LinkMap,
    items: Vec<T>,
    pages_loaded: u64,
    on_select: Option<SelectHook<T>>,
}

struct Inner<T> {
    client: Arc<ApiClient>,
    endpoint: String,
    error_output: Output,
    item_constructor: ItemConstructor<T>,
    state: RwLock<PageState<T>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

/// A list of API results, one page at a time
pub struct Paginator<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Paginator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Paginator<Value> {
    /// A paginator whose items are the raw JSON objects of each page
    pub fn json(client: Arc<ApiClient>, config: &PaginatorConfig) -> Self {
        Self::new(client, config, Value::clone)
    }
}

impl<T> Paginator<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a paginator. No request is made until [`initialize`](Self::initialize).
    pub fn new<F>(client: Arc<ApiClient>, config: &PaginatorConfig, item_constructor: F) -> Self
    where
        F: Fn(&Value) -> T + Send + Sync + 'static,
    {
        let query_data = config.query.clone();
        let current_link = endpoint_link(&config.endpoint, &query_data);

        Self {
            inner: Arc::new(Inner {
                client,
                endpoint: config.endpoint.clone(),
                error_output: Output::new(),
                item_constructor: Arc::new(item_constructor),
                state: RwLock::new(PageState {
                    query_data,
                    current_link,
                    links: LinkMap::new(),
                    items: Vec::new(),
                    pages_loaded: 0,
                    on_select: None,
                }),
                listener: Mutex::new(None),
            }),
        }
    }

    /// The endpoint this paginator lists
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Banner every failed request of this paginator is reported on
    pub fn error_output(&self) -> &Output {
        &self.inner.error_output
    }

    /// Current query data
    pub async fn query_data(&self) -> QueryData {
        self.inner.state.read().await.query_data.clone()
    }

    /// Link of the request that produced the current data
    pub async fn current_link(&self) -> String {
        self.inner.state.read().await.current_link.clone()
    }

    /// Links parsed from the most recent response
    pub async fn links(&self) -> LinkMap {
        self.inner.state.read().await.links.clone()
    }

    /// Items of the current page
    pub async fn items(&self) -> Vec<T> {
        self.inner.state.read().await.items.clone()
    }

    /// Whether a page has been rendered yet
    pub async fn is_loaded(&self) -> bool {
        self.inner.state.read().await.pages_loaded > 0
    }

    /// Number of responses rendered so far
    pub async fn pages_loaded(&self) -> u64 {
        self.inner.state.read().await.pages_loaded
    }

    /// Whether the current page has a `next` relation
    pub async fn has_next(&self) -> bool {
        self.inner.state.read().await.links.contains_key("next")
    }

    /// Whether the current page has a `prev` relation
    pub async fn has_prev(&self) -> bool {
        self.inner.state.read().await.links.contains_key("prev")
    }

    /// Replace the selection hook
    pub async fn on_select<F>(&self, hook: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.state.write().await.on_select = Some(Arc::new(hook));
    }

    /// Load the first page using the configured query data.
    ///
    /// Must be called once before anything else.
    pub async fn initialize(&self) -> bool {
        self.refresh().await
    }

    /// Reissue the request that produced the current data
    pub async fn refresh(&self) -> bool {
        let link = self.current_link().await;
        self.load(&link).await
    }

    /// Set one query parameter and reload from the first page
    pub async fn update_query_data(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        {
            let mut state = self.inner.state.write().await;
            state.query_data.insert(key.into(), value.into());
            state.current_link = endpoint_link(&self.inner.endpoint, &state.query_data);
        }
        self.refresh().await
    }

    /// Replace the query data and reload from the first page
    pub async fn set_query_data(&self, query_data: QueryData) -> bool {
        {
            let mut state = self.inner.state.write().await;
            state.current_link = endpoint_link(&self.inner.endpoint, &query_data);
            state.query_data = query_data;
        }
        self.refresh().await
    }

    /// Follow the `next` relation. No request when there is none.
    pub async fn next(&self) -> bool {
        self.follow("next").await
    }

    /// Follow the `prev` relation. No request when there is none.
    pub async fn prev(&self) -> bool {
        self.follow("prev").await
    }

    /// Hand the rendered item at `index` to the selection hook
    pub async fn select(&self, index: usize) -> bool {
        let (item, hook) = {
            let state = self.inner.state.read().await;
            (state.items.get(index).cloned(), state.on_select.clone())
        };

        match (item, hook) {
            (Some(item), Some(hook)) => {
                hook(&item);
                true
            }
            (Some(_), None) => {
                debug!("No selection hook on {}", self.inner.endpoint);
                false
            }
            (None, _) => false,
        }
    }

    /// Attach the UI controls, returning the channel they are fed through.
    ///
    /// Replaces any previously attached controls.
    pub fn attach(&self) -> mpsc::UnboundedSender<Control> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listen(rx);
        tx
    }

    /// Handle control events from `events` until it closes or [`stop`](Self::stop) is called
    pub fn listen(&self, mut events: mpsc::UnboundedReceiver<Control>) {
        let paginator = self.clone();
        let handle = tokio::spawn(async move {
            while let Some(control) = events.recv().await {
                match control {
                    Control::Next => {
                        paginator.next().await;
                    }
                    Control::Prev => {
                        paginator.prev().await;
                    }
                    Control::Select(index) => {
                        paginator.select(index).await;
                    }
                }
            }
        });

        if let Some(previous) = self.listener().replace(handle) {
            previous.abort();
        }
    }

    /// Detach the UI controls. Data is left as it is.
    pub fn stop(&self) {
        if let Some(handle) = self.listener().take() {
            handle.abort();
        }
    }

    /// Whether controls are currently attached
    pub fn is_listening(&self) -> bool {
        self.listener()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn listener(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner
            .listener
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn follow(&self, rel: &str) -> bool {
        let link = self.inner.state.read().await.links.get(rel).cloned();
        match link {
            Some(link) => self.load(&link).await,
            None => {
                debug!("No '{}' link on {}, staying put", rel, self.inner.endpoint);
                false
            }
        }
    }

    async fn load(&self, link: &str) -> bool {
        let response = self
            .inner
            .client
            .request(
                Method::GET,
                link,
                &self.inner.error_output,
                |response| response,
                &RequestOptions::new(),
            )
            .await;

        match response {
            Some(response) => self.render(response).await,
            None => false,
        }
    }

    async fn render(&self, response: ApiResponse) -> bool {
        let links = response.links();

        let items = match response.body.as_array() {
            Some(results) => {
                let construct = &self.inner.item_constructor;
                Some(results.iter().map(|result| construct(result)).collect::<Vec<_>>())
            }
            None => None,
        };

        let mut state = self.inner.state.write().await;
        state.links = links;

        let Some(items) = items else {
            drop(state);
            let error = Error::decode(format!(
                "expected a JSON array from {}, got {}",
                self.inner.endpoint,
                json_kind(&response.body)
            ));
            self.inner.error_output.show(error.display_message());
            return false;
        };

        debug!(
            "Rendered {} items from {} (next: {}, prev: {})",
            items.len(),
            self.inner.endpoint,
            state.links.contains_key("next"),
            state.links.contains_key("prev")
        );
        state.items = items;
        state.pages_loaded += 1;
        true
    }
}

impl<T> fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("endpoint", &self.inner.endpoint)
            .field("error_output", &self.inner.error_output)
            .finish_non_exhaustive()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
