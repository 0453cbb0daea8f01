//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator turns one seed URL into a deduplicated, host-scoped graph
//! of items. It runs a single control loop that:
//! - Owns the dedup tables and the outstanding-task count
//! - Dispatches one task per newly discovered item
//! - Applies each finished task's result and links its children
//! - Finishes the moment no task is outstanding
//!
//! Tasks only probe, fetch and scan; they never touch shared state.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{probe_and_fetch, FetchResult, Fetcher, HttpFetcher};
use crate::state::{Classification, CrawlGraph, CrawlState, Discovery, ItemId};
use crate::url::{resolve, HostScope};
use crate::SiteError;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio::time::MissedTickBehavior;
use url::Url;

/// Work handed to a crawl task
#[derive(Debug)]
struct CrawlJob {
    id: ItemId,
    url: Url,
    in_scope: bool,
}

/// What a crawl task reports back to the control loop
#[derive(Debug)]
struct CrawlOutcome {
    id: ItemId,
    result: TaskResult,
}

#[derive(Debug)]
enum TaskResult {
    /// Off-site; nothing was fetched
    Remote,

    /// Probe/fetch finished with a classification
    Fetched(FetchResult),

    /// The task gave up before reaching the network
    Unfinished,
}

/// Per-crawl bookkeeping owned by the control loop
struct CrawlRun {
    state: CrawlState,
    tasks: JoinSet<CrawlOutcome>,
    task_items: HashMap<tokio::task::Id, ItemId>,
    scope: HostScope,
}

impl CrawlRun {
    fn new(scope: HostScope) -> Self {
        Self {
            state: CrawlState::new(),
            tasks: JoinSet::new(),
            task_items: HashMap::new(),
            scope,
        }
    }
}

/// Main crawler coordinator structure
///
/// A coordinator can run any number of crawls, one after another or at once;
/// each `crawl` call builds and discards its own state.
pub struct Coordinator {
    fetcher: Arc<dyn Fetcher>,
    limiter: Arc<Semaphore>,
    progress_interval: Duration,
    deadline: Option<Duration>,
}

impl Coordinator {
    /// Creates a coordinator driven by `fetcher`
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The network collaborator
    /// * `config` - Concurrency, progress and deadline settings
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            limiter: Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
            progress_interval: config.progress_interval(),
            deadline: config.crawl_deadline(),
        }
    }

    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SiteError)` - Failed to build the HTTP client
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::new(Arc::new(fetcher), &config.crawler))
    }

    /// Overrides the overall crawl deadline
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Overrides the progress report interval
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Crawls the site rooted at `seed`
    ///
    /// Returns once every dispatched task has completed (or, with a deadline,
    /// once the deadline has passed and the remaining tasks were cancelled).
    /// Per-item failures only affect that item's classification.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlGraph)` - Every item discovered, each exactly once
    /// * `Err(SiteError::InvalidSeedUrl)` - The seed cannot be canonicalized;
    ///   no request was made
    pub async fn crawl(&self, seed: &str) -> crate::Result<CrawlGraph> {
        let seed_url = resolve(None, seed).map_err(|source| SiteError::InvalidSeedUrl {
            url: seed.to_string(),
            source,
        })?;

        let started_at = Utc::now();
        let clock = Instant::now();
        let mut run = CrawlRun::new(HostScope::new(&seed_url));
        tracing::info!("Starting crawl of {} (host {})", seed_url, run.scope.host());

        let root = run.state.discover(seed_url, None).id();
        self.dispatch(&mut run, root);

        let mut progress = tokio::time::interval(self.progress_interval);
        progress.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        progress.tick().await;

        let deadline = self.deadline.map(|d| tokio::time::Instant::now() + d);
        let expired = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expired);

        while run.state.outstanding() > 0 {
            tokio::select! {
                joined = run.tasks.join_next_with_id() => match joined {
                    Some(joined) => self.handle_joined(&mut run, joined, true),
                    None => break,
                },
                _ = progress.tick() => report_progress(&run, clock),
                _ = &mut expired => {
                    tracing::warn!(
                        "Crawl deadline reached with {} tasks outstanding, cancelling",
                        run.state.outstanding()
                    );
                    run.tasks.abort_all();
                    while let Some(joined) = run.tasks.join_next_with_id().await {
                        self.handle_joined(&mut run, joined, false);
                    }
                    break;
                }
            }
        }

        tracing::info!(
            "Crawl of {} completed: {} items in {:?}",
            run.state.item(root).url(),
            run.state.len(),
            clock.elapsed()
        );

        Ok(run.state.into_graph(root, started_at))
    }

    /// Dispatches a task for a freshly registered item
    fn dispatch(&self, run: &mut CrawlRun, id: ItemId) {
        let url = run.state.item(id).url().clone();
        let job = CrawlJob {
            id,
            in_scope: run.scope.contains(&url),
            url,
        };

        run.state.mark_dispatched(id);
        let handle = run.tasks.spawn(crawl_item(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.limiter),
            job,
        ));
        run.task_items.insert(handle.id(), id);
    }

    /// Routes a joined task to the state update it calls for
    fn handle_joined(
        &self,
        run: &mut CrawlRun,
        joined: Result<(tokio::task::Id, CrawlOutcome), JoinError>,
        accepting: bool,
    ) {
        match joined {
            Ok((task_id, outcome)) => {
                run.task_items.remove(&task_id);
                self.apply(run, outcome, accepting);
            }
            Err(error) => {
                let Some(id) = run.task_items.remove(&error.id()) else {
                    tracing::warn!("Untracked crawl task failed: {}", error);
                    return;
                };

                if error.is_cancelled() {
                    tracing::debug!("Crawl of {} cancelled", run.state.item(id).url());
                } else {
                    tracing::warn!(
                        "Crawl task for {} failed: {}",
                        run.state.item(id).url(),
                        error
                    );
                }
                run.state.complete(id, Classification::Unknown, String::new());
            }
        }
    }

    /// Records a task's classification and links the children it found
    ///
    /// When `accepting` is false, brand-new children are registered and
    /// linked but not dispatched; they stay unclassified.
    fn apply(&self, run: &mut CrawlRun, outcome: CrawlOutcome, accepting: bool) {
        let CrawlOutcome { id, result } = outcome;

        let (classification, title, links) = match result {
            TaskResult::Remote => (Classification::Remote, String::new(), Vec::new()),
            TaskResult::Unfinished => (Classification::Unknown, String::new(), Vec::new()),
            TaskResult::Fetched(FetchResult::Page { title, links }) => {
                (Classification::HtmlPage, title, links)
            }
            TaskResult::Fetched(FetchResult::Asset { content_type }) => {
                tracing::trace!("{} is an asset ({})", run.state.item(id).url(), content_type);
                (Classification::Asset, String::new(), Vec::new())
            }
            TaskResult::Fetched(FetchResult::Broken { error }) => {
                tracing::debug!("Broken: {}", error);
                (Classification::Broken, String::new(), Vec::new())
            }
        };

        run.state.complete(id, classification, title);
        let parent_url = run.state.item(id).url().clone();
        tracing::debug!("Classified {} as {}", parent_url, classification);

        for raw in links {
            let url = match resolve(Some(&parent_url), &raw) {
                Ok(url) => url,
                Err(e) => {
                    tracing::trace!("Dropping link {:?} on {}: {}", raw, parent_url, e);
                    continue;
                }
            };

            match run.state.discover(url, Some(&parent_url)) {
                Discovery::Known(child) | Discovery::Alias(child) => {
                    run.state.add_child(id, child);
                }
                Discovery::New(child) => {
                    run.state.add_child(id, child);
                    if accepting {
                        self.dispatch(run, child);
                    }
                }
            }
        }
    }
}

/// Probes, fetches and scans a single item
///
/// Off-site items complete immediately without touching the network. Every
/// other item waits for a fetch permit first.
async fn crawl_item(
    fetcher: Arc<dyn Fetcher>,
    limiter: Arc<Semaphore>,
    job: CrawlJob,
) -> CrawlOutcome {
    if !job.in_scope {
        return CrawlOutcome {
            id: job.id,
            result: TaskResult::Remote,
        };
    }

    let _permit = match limiter.acquire().await {
        Ok(permit) => permit,
        Err(_) => {
            return CrawlOutcome {
                id: job.id,
                result: TaskResult::Unfinished,
            }
        }
    };

    let result = probe_and_fetch(fetcher.as_ref(), &job.url).await;
    CrawlOutcome {
        id: job.id,
        result: TaskResult::Fetched(result),
    }
}

fn report_progress(run: &CrawlRun, clock: Instant) {
    tracing::info!(
        "Progress: {} discovered, {} in flight, {} done, {:.1}s elapsed",
        run.state.len(),
        run.state.outstanding(),
        run.state.done(),
        clock.elapsed().as_secs_f64()
    );
}

/// Runs a complete crawl over HTTP
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The URL to start from
///
/// # Example
///
/// ```no_run
/// use sitegraph::config::Config;
/// use sitegraph::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let graph = crawl(&Config::default(), "https://example.com/").await?;
/// println!("{} items", graph.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config, seed: &str) -> crate::Result<CrawlGraph> {
    Coordinator::from_config(config)?.crawl(seed).await
}
