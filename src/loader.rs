//! URL-keyed image loader
//!
//! `ImageLoader::load_image` shows the placeholder immediately, serves
//! cache hits synchronously, and otherwise spawns one fetch task per call.
//! Completed fetches are applied through the dispatcher, and only if they
//! belong to the newest request issued for that target.
//!
//! # Request bookkeeping
//!
//! Every call registers a sequence number for its target. Starting a new
//! request aborts the target's previous in-flight task, and a completion
//! whose sequence number is no longer current is dropped. Overlapping loads
//! on one target therefore resolve to the last one started, regardless of
//! which fetch finishes first.

use crate::assets::Assets;
use crate::cache::ImageCache;
use crate::config::Config;
use crate::decode::{decode, DecodedImage};
use crate::dispatch::Dispatcher;
use crate::error::{LogoError, LogoResult};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::target::{DisplayTarget, Shown, TargetId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, warn};
use url::Url;

/// How a single load ended
#[derive(Debug)]
pub enum LoadOutcome {
    /// Served from the cache without network activity
    CacheHit,
    /// Fetched, decoded and cached
    Fetched,
    /// Invalid URL, fetch or decode failure; the placeholder stays
    Failed(LogoError),
    /// Aborted by a newer request for the same target, `release`, or `cancel`
    Cancelled,
}

impl LoadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoadOutcome::CacheHit | LoadOutcome::Fetched)
    }

    /// Short label for reports
    pub fn label(&self) -> &'static str {
        match self {
            LoadOutcome::CacheHit => "cache-hit",
            LoadOutcome::Fetched => "fetched",
            LoadOutcome::Failed(_) => "failed",
            LoadOutcome::Cancelled => "cancelled",
        }
    }
}

/// Handle to one `load_image` call
///
/// Dropping the handle leaves the load running. Awaiting it is only needed
/// by callers that want to know how the load ended.
#[derive(Debug)]
pub struct LoadHandle {
    url: String,
    state: HandleState,
}

#[derive(Debug)]
enum HandleState {
    Done(LoadOutcome),
    Running(RunningLoad),
}

#[derive(Debug)]
struct RunningLoad {
    task: JoinHandle<LoadOutcome>,
    id: TargetId,
    seq: u64,
    requests: Arc<Requests>,
}

impl LoadHandle {
    fn done(url: &str, outcome: LoadOutcome) -> Self {
        Self {
            url: url.to_string(),
            state: HandleState::Done(outcome),
        }
    }

    /// The URL string this load was issued for
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Abort the fetch; the target keeps showing the placeholder
    ///
    /// The target's request entry is dropped as well, unless a newer load
    /// for the same target has already replaced it.
    pub fn cancel(&self) {
        if let HandleState::Running(running) = &self.state {
            running.requests.forget(running.id, running.seq);
            running.task.abort();
        }
    }

    /// Wait for the fetch task to finish
    ///
    /// Resolves when the result has been handed to the dispatcher, which
    /// may be before the UI context has applied it.
    pub async fn wait(self) -> LoadOutcome {
        match self.state {
            HandleState::Done(outcome) => outcome,
            HandleState::Running(running) => match running.task.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => LoadOutcome::Cancelled,
                Err(e) => {
                    // A panicked task never dispatches its completion
                    running.requests.forget(running.id, running.seq);
                    LoadOutcome::Failed(LogoError::Internal(format!(
                        "load task panicked: {}",
                        e
                    )))
                }
            },
        }
    }
}

/// Loader counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoaderStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub fetches: u64,
    pub failures: u64,
    pub invalid_urls: u64,
    pub superseded: u64,
}

#[derive(Default)]
struct Counters {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
    invalid_urls: AtomicU64,
    superseded: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> LoaderStats {
        LoaderStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            invalid_urls: self.invalid_urls.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
struct Pending {
    seq: u64,
    abort: Option<AbortHandle>,
}

/// Latest request per target
#[derive(Debug, Default)]
struct Requests {
    next_seq: AtomicU64,
    pending: Mutex<HashMap<TargetId, Pending>>,
}

impl Requests {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TargetId, Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new in-flight request, superseding any previous one
    fn begin(&self, id: TargetId) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let previous = self.lock().insert(id, Pending { seq, abort: None });
        if let Some(abort) = previous.and_then(|p| p.abort) {
            abort.abort();
        }
        seq
    }

    fn attach(&self, id: TargetId, seq: u64, abort: AbortHandle) {
        // The task may already have completed and cleared its entry
        if let Some(pending) = self.lock().get_mut(&id) {
            if pending.seq == seq {
                pending.abort = Some(abort);
            }
        }
    }

    /// Claim the right to update the target; false if superseded
    fn finish(&self, id: TargetId, seq: u64) -> bool {
        let mut pending = self.lock();
        match pending.get(&id) {
            Some(p) if p.seq == seq => {
                pending.remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Drop the target's entry if `seq` is still its current request
    fn forget(&self, id: TargetId, seq: u64) {
        let mut pending = self.lock();
        if pending.get(&id).is_some_and(|p| p.seq == seq) {
            pending.remove(&id);
        }
    }

    /// Drop any in-flight request for the target
    fn clear(&self, id: TargetId) {
        let previous = self.lock().remove(&id);
        if let Some(abort) = previous.and_then(|p| p.abort) {
            abort.abort();
        }
    }

    fn in_flight(&self) -> usize {
        self.lock().len()
    }
}

/// Fetch-and-cache image loader
///
/// All collaborators are injected; the composition root decides which
/// loaders share a cache.
pub struct ImageLoader {
    cache: Arc<dyn ImageCache>,
    fetcher: Arc<dyn Fetcher>,
    assets: Arc<Assets>,
    dispatcher: Arc<dyn Dispatcher>,
    runtime: Handle,
    max_edge: u32,
    requests: Arc<Requests>,
    counters: Arc<Counters>,
}

impl ImageLoader {
    /// Create a loader that spawns fetches on the current tokio runtime
    pub fn new(
        cache: Arc<dyn ImageCache>,
        fetcher: Arc<dyn Fetcher>,
        assets: Arc<Assets>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> LogoResult<Self> {
        let runtime = Handle::try_current().map_err(|e| LogoError::NoRuntime(e.to_string()))?;

        Ok(Self {
            cache,
            fetcher,
            assets,
            dispatcher,
            runtime,
            max_edge: 0,
            requests: Arc::new(Requests::default()),
            counters: Arc::new(Counters::default()),
        })
    }

    /// Create an HTTP-backed loader from configuration
    pub fn from_config(
        config: &Config,
        cache: Arc<dyn ImageCache>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> LogoResult<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.fetch));
        let assets = Arc::new(Assets::from_config(&config.placeholders)?);

        Ok(Self::new(cache, fetcher, assets, dispatcher)?.with_max_edge(config.decode.max_edge))
    }

    /// Downscale decoded images to fit within `max_edge` pixels
    pub fn with_max_edge(mut self, max_edge: u32) -> Self {
        self.max_edge = max_edge;
        self
    }

    /// Load `url` into `target` using the default placeholder
    pub fn load_image<T>(&self, target: &Arc<T>, url: &str) -> LoadHandle
    where
        T: DisplayTarget + ?Sized,
    {
        let placeholder = self.assets.default_placeholder();
        self.load(target, url, placeholder)
    }

    /// Load `url` into `target`, falling back to the named placeholder
    pub fn load_image_with_placeholder<T>(
        &self,
        target: &Arc<T>,
        url: &str,
        placeholder: &str,
    ) -> LoadHandle
    where
        T: DisplayTarget + ?Sized,
    {
        let placeholder = self.assets.get(placeholder);
        self.load(target, url, placeholder)
    }

    fn load<T>(&self, target: &Arc<T>, url: &str, placeholder: DecodedImage) -> LoadHandle
    where
        T: DisplayTarget + ?Sized,
    {
        let id = target.id();
        target.show(Shown::Placeholder(placeholder.clone()));

        if let Some(image) = self.cache.get(url) {
            debug!("Cache hit for {}", url);
            Counters::bump(&self.counters.cache_hits);
            self.requests.clear(id);
            target.show(Shown::Image {
                url: url.to_string(),
                image,
            });
            return LoadHandle::done(url, LoadOutcome::CacheHit);
        }
        Counters::bump(&self.counters.cache_misses);

        let parsed = match parse_image_url(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("{}", e);
                Counters::bump(&self.counters.invalid_urls);
                self.requests.clear(id);
                return LoadHandle::done(url, LoadOutcome::Failed(e));
            }
        };

        let seq = self.requests.begin(id);
        Counters::bump(&self.counters.fetches);

        let task = self.runtime.spawn(fetch_task(FetchJob {
            url: url.to_string(),
            parsed,
            placeholder,
            target: Arc::downgrade(target),
            id,
            seq,
            max_edge: self.max_edge,
            cache: Arc::clone(&self.cache),
            fetcher: Arc::clone(&self.fetcher),
            dispatcher: Arc::clone(&self.dispatcher),
            requests: Arc::clone(&self.requests),
            counters: Arc::clone(&self.counters),
        }));
        self.requests.attach(id, seq, task.abort_handle());

        LoadHandle {
            url: url.to_string(),
            state: HandleState::Running(RunningLoad {
                task,
                id,
                seq,
                requests: Arc::clone(&self.requests),
            }),
        }
    }

    /// Forget a target, aborting its in-flight fetch
    ///
    /// Call when a target is destroyed so a late completion cannot be
    /// applied to whatever reuses its id.
    pub fn release<T>(&self, target: &T)
    where
        T: DisplayTarget + ?Sized,
    {
        self.requests.clear(target.id());
    }

    /// Number of targets with a fetch still in flight
    pub fn in_flight(&self) -> usize {
        self.requests.in_flight()
    }

    pub fn stats(&self) -> LoaderStats {
        self.counters.snapshot()
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn fetcher_name(&self) -> &'static str {
        self.fetcher.name()
    }
}

/// Parse a URL string, accepting only schemes the loader can fetch
pub fn parse_image_url(url: &str) -> LogoResult<Url> {
    let parsed = Url::parse(url).map_err(|e| LogoError::invalid_url(url, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(LogoError::invalid_url(
            url,
            format!("unsupported scheme '{}'", other),
        )),
    }
}

struct FetchJob<T: ?Sized> {
    url: String,
    parsed: Url,
    placeholder: DecodedImage,
    target: Weak<T>,
    id: TargetId,
    seq: u64,
    max_edge: u32,
    cache: Arc<dyn ImageCache>,
    fetcher: Arc<dyn Fetcher>,
    dispatcher: Arc<dyn Dispatcher>,
    requests: Arc<Requests>,
    counters: Arc<Counters>,
}

async fn fetch_task<T>(job: FetchJob<T>) -> LoadOutcome
where
    T: DisplayTarget + ?Sized,
{
    let FetchJob {
        url,
        parsed,
        placeholder,
        target,
        id,
        seq,
        max_edge,
        cache,
        fetcher,
        dispatcher,
        requests,
        counters,
    } = job;

    let result = match fetcher.fetch(&parsed).await {
        Ok(fetched) => decode(&url, &fetched.bytes, max_edge).inspect_err(|_| {
            debug!(
                "Undecodable body from {} ({} bytes, content-type {})",
                url,
                fetched.bytes.len(),
                fetched.content_type.as_deref().unwrap_or("unknown")
            );
        }),
        Err(e) => Err(e),
    };

    let (content, outcome) = match result {
        Ok(image) => {
            cache.put(&url, image.clone());
            let content = Shown::Image {
                url: url.clone(),
                image,
            };
            (content, LoadOutcome::Fetched)
        }
        Err(e) => {
            warn!("Failed to load {}: {}", url, e);
            Counters::bump(&counters.failures);
            (Shown::Placeholder(placeholder), LoadOutcome::Failed(e))
        }
    };

    dispatcher.dispatch(Box::new(move || {
        if !requests.finish(id, seq) {
            debug!("Discarding superseded result for {}", url);
            Counters::bump(&counters.superseded);
            return;
        }
        match target.upgrade() {
            Some(target) => target.show(content),
            None => debug!("Target for {} was dropped before the load finished", url),
        }
    }));

    outcome
}
