//! [`Store`] over the Elasticsearch REST API.

use crate::query::{self, CatIndex, Hit, SearchResponse, UpdateResponse, VersionMapping};
use crate::script;
use anyhow::{Context, Result};
use elasticsearch_types::hit_to_record;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use sync_core::{Record, Window, TIMESTAMP_FIELD};
use sync_store::{Connect, RecordStream, Store, SyncError, WriteOutcome};

/// Connection options (library type without clap).
#[derive(Clone, Debug)]
pub struct ElasticsearchOpts {
    pub url: String,
    /// Table `t` is stored in index `<index_prefix>-t`.
    pub index_prefix: String,
    /// Hits fetched per scroll page.
    pub page_size: usize,
    /// How long the scroll context survives between pages, e.g. `1m`.
    pub scroll_keep_alive: String,
}

/// Addressing handle for an endpoint and index prefix.
#[derive(Clone, Debug)]
pub struct ElasticsearchConnector {
    opts: ElasticsearchOpts,
}

impl ElasticsearchConnector {
    pub fn new(opts: ElasticsearchOpts) -> Self {
        Self { opts }
    }

    fn name(&self) -> String {
        format!(
            "{}/{}-*",
            self.opts.url.trim_end_matches('/'),
            self.opts.index_prefix
        )
    }
}

#[async_trait::async_trait]
impl Connect for ElasticsearchConnector {
    type Store = ElasticsearchStore;

    async fn connect(&self) -> Result<ElasticsearchStore, SyncError> {
        let name = self.name();
        tracing::debug!("Connecting to {}", name);
        let store = ElasticsearchStore::open(name.clone(), &self.opts)
            .await
            .map_err(|e| SyncError::connection(&name, e))?;
        tracing::info!("Connected to {}", name);
        Ok(store)
    }
}

/// An open scroll context. Dropping it before [`ScrollContext::clear`]
/// clears it in the background.
struct ScrollContext {
    client: Client,
    url: Url,
    id: Option<String>,
}

impl ScrollContext {
    async fn clear(mut self) {
        if let Some(id) = self.id.take() {
            clear_scroll(self.client.clone(), self.url.clone(), id).await;
        }
    }
}

impl Drop for ScrollContext {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(clear_scroll(self.client.clone(), self.url.clone(), id));
            }
            Err(_) => tracing::warn!("Scroll context dropped outside a runtime, left to expire"),
        }
    }
}

async fn clear_scroll(client: Client, url: Url, id: String) {
    let request = client.delete(url).json(&json!({"scroll_id": id}));
    if let Err(e) = send::<Value>(request).await {
        tracing::warn!("Failed to clear scroll context: {:#}", e);
    }
}

/// An HTTP client bound to one endpoint and index prefix.
pub struct ElasticsearchStore {
    name: String,
    base: Url,
    client: Client,
    index_prefix: String,
    page_size: usize,
    scroll_keep_alive: String,
    version_mappings: Mutex<HashMap<String, VersionMapping>>,
    closed: AtomicBool,
}

impl ElasticsearchStore {
    async fn open(name: String, opts: &ElasticsearchOpts) -> Result<Self> {
        let base = Url::parse(&opts.url)
            .with_context(|| format!("Invalid Elasticsearch URL: {}", opts.url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("Elasticsearch URL cannot be a base: {}", opts.url);
        }
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        let store = Self {
            name,
            base,
            client,
            index_prefix: opts.index_prefix.clone(),
            page_size: opts.page_size,
            scroll_keep_alive: opts.scroll_keep_alive.clone(),
            version_mappings: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        };

        let info: Value = send(store.client.get(store.endpoint(&[])?)).await?;
        tracing::debug!(
            "Elasticsearch version: {}",
            info["version"]["number"].as_str().unwrap_or("unknown")
        );
        Ok(store)
    }

    fn index(&self, table: &str) -> String {
        format!("{}-{}", self.index_prefix, table)
    }

    /// `base` extended by `segments`, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot be a base: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn ensure_open(&self) -> Result<(), SyncError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SyncError::connection(&self.name, "store is closed"));
        }
        Ok(())
    }

    /// How `table` maps `tmstmp`, fetched once per table.
    ///
    /// A missing index reads as [`VersionMapping::Date`] and is not cached:
    /// the first upsert creates it with dynamic mapping.
    async fn version_mapping(&self, table: &str) -> Result<VersionMapping> {
        if let Some(mapping) = self.cached_mapping(table) {
            return Ok(mapping);
        }
        let index = self.index(table);
        let url = self.endpoint(&[index.as_str(), "_mapping", "field", TIMESTAMP_FIELD])?;
        let response = self.client.get(url).send().await.context("Request failed")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(VersionMapping::Date);
        }
        let body: Value = decode(response).await?;
        let mapping = VersionMapping::from_field_mapping(&body);
        tracing::debug!("{} stores {} as {:?}", index, TIMESTAMP_FIELD, mapping);
        self.version_mappings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(table.to_string(), mapping);
        Ok(mapping)
    }

    fn cached_mapping(&self, table: &str) -> Option<VersionMapping> {
        self.version_mappings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .copied()
    }

    fn scroll_context(&self, id: String) -> Result<ScrollContext> {
        Ok(ScrollContext {
            client: self.client.clone(),
            url: self.endpoint(&["_search", "scroll"])?,
            id: Some(id),
        })
    }

    /// Opens the scroll search and fetches its first page.
    async fn first_page(
        &self,
        table: &str,
        window: &Window,
    ) -> Result<(Vec<Record>, Option<ScrollContext>)> {
        let mapping = self.version_mapping(table).await?;
        let mut url = self.endpoint(&[self.index(table).as_str(), "_search"])?;
        url.query_pairs_mut()
            .append_pair("scroll", &self.scroll_keep_alive);
        let body = query::search_body(window, mapping, self.page_size);
        let response: SearchResponse = send(self.client.post(url).json(&body)).await?;
        let context = match response.scroll_id {
            Some(id) => Some(self.scroll_context(id)?),
            None => None,
        };
        self.finish_page(table, response.hits.hits, context).await
    }

    /// Fetches the page after `context`.
    async fn next_page(
        &self,
        table: &str,
        mut context: ScrollContext,
    ) -> Result<(Vec<Record>, Option<ScrollContext>)> {
        let body = json!({"scroll": self.scroll_keep_alive, "scroll_id": context.id});
        let response: SearchResponse =
            send(self.client.post(context.url.clone()).json(&body)).await?;
        if let Some(id) = response.scroll_id {
            context.id = Some(id);
        }
        self.finish_page(table, response.hits.hits, Some(context)).await
    }

    /// Normalizes a page of hits. An empty page ends the scroll and clears
    /// its context.
    async fn finish_page(
        &self,
        table: &str,
        hits: Vec<Hit>,
        context: Option<ScrollContext>,
    ) -> Result<(Vec<Record>, Option<ScrollContext>)> {
        tracing::trace!("Fetched {} hits from {}", hits.len(), self.index(table));
        let records = hits
            .iter()
            .map(|hit| {
                hit_to_record(&hit.id, &hit.source)
                    .with_context(|| format!("Malformed document '{}'", hit.id))
            })
            .collect::<Result<Vec<_>>>()?;
        let next = match context {
            Some(context) if records.is_empty() => {
                context.clear().await;
                None
            }
            context => context,
        };
        Ok((records, next))
    }

    async fn update(&self, table: &str, record: &Record) -> Result<WriteOutcome> {
        let mapping = self.version_mapping(table).await?;
        let mut url = self.endpoint(&[self.index(table).as_str(), "_update", record.id()])?;
        url.query_pairs_mut().append_pair("retry_on_conflict", "3");
        let response: UpdateResponse =
            send(self.client.post(url).json(&script::update_body(record, mapping))).await?;
        script::parse_outcome(&response.result)
            .with_context(|| format!("Unexpected update result '{}'", response.result))
    }
}

/// Sends `request` and decodes a successful JSON response.
async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await.context("Request failed")?;
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Elasticsearch responded with {status}: {body}");
    }
    response
        .json()
        .await
        .context("Failed to decode Elasticsearch response")
}

#[async_trait::async_trait]
impl Store for ElasticsearchStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_tables(&self) -> Result<Vec<String>, SyncError> {
        self.ensure_open()?;
        let pattern = format!("{}-*", self.index_prefix);
        let indices: Vec<CatIndex> = async {
            let mut url = self.endpoint(&["_cat", "indices", pattern.as_str()])?;
            url.query_pairs_mut()
                .append_pair("format", "json")
                .append_pair("h", "index");
            send::<Vec<CatIndex>>(self.client.get(url)).await
        }
        .await
        .map_err(|e| SyncError::connection(&self.name, e))?;
        let tables = query::tables_from_indices(&self.index_prefix, indices);
        tracing::debug!("Found {} indices in {}", tables.len(), self.name);
        Ok(tables)
    }

    async fn load<'a>(
        &'a self,
        table: &'a str,
        window: Window,
    ) -> Result<RecordStream<'a>, SyncError> {
        self.ensure_open()?;
        tracing::debug!("Loading {} from {} in {}", table, self.name, window);

        // The first page is fetched eagerly so a missing index fails the load
        // itself rather than the first item.
        let (first, next) = self
            .first_page(table, &window)
            .await
            .map_err(|e| SyncError::load(&self.name, table, e))?;

        // The context travels in the stream state, so dropping the stream
        // early clears it.
        let rest = stream::try_unfold(next, move |context| async move {
            let Some(context) = context else {
                return Ok(None);
            };
            match self.next_page(table, context).await {
                Ok((records, next)) => Ok(Some((records, next))),
                Err(e) => Err(SyncError::load(&self.name, table, e)),
            }
        });

        let records = stream::once(futures::future::ready(Ok(first)))
            .chain(rest)
            .map_ok(|page| stream::iter(page.into_iter().map(Ok::<Record, SyncError>)))
            .try_flatten();
        Ok(records.boxed())
    }

    async fn upsert_if_newer(
        &self,
        table: &str,
        record: &Record,
    ) -> Result<WriteOutcome, SyncError> {
        self.ensure_open()?;
        let outcome = self
            .update(table, record)
            .await
            .map_err(|e| SyncError::write(&self.name, table, record.id(), e))?;
        tracing::trace!("{}/{}: {:?}", table, record.id(), outcome);
        Ok(outcome)
    }

    async fn close(&self) -> Result<(), SyncError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("Closed {}", self.name);
        }
        Ok(())
    }
}
