//! Tag allow-list cache
//!
//! Holds the list of allowed module tags read from a flat text file (one tag
//! per line). The list is reloaded lazily: a read that finds the cached copy
//! older than the refresh interval reloads the whole file before answering.
//! There is no background timer.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::logger;

/// Cached tags and the moment they were read
struct TagSnapshot {
    tags: Arc<Vec<String>>,
    last_refresh: Instant,
}

/// Time-bounded cache of the tag allow-list
pub struct TagCache {
    path: PathBuf,
    interval: Duration,
    inner: Mutex<TagSnapshot>,
}

impl TagCache {
    /// Read the tag file once at startup
    pub async fn load(path: impl Into<PathBuf>, interval: Duration) -> io::Result<Self> {
        let path = path.into();
        let tags = read_tags(&path).await?;

        Ok(Self {
            path,
            interval,
            inner: Mutex::new(TagSnapshot {
                tags: Arc::new(tags),
                last_refresh: Instant::now(),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current tag list, reloading first if the cached copy is stale
    pub async fn get_tags(&self) -> Arc<Vec<String>> {
        self.refresh_if_stale(Instant::now()).await
    }

    /// Reload the list if more than `interval` has passed since the last
    /// refresh at `now`. Check and reload run under one lock.
    pub async fn refresh_if_stale(&self, now: Instant) -> Arc<Vec<String>> {
        let mut snapshot = self.inner.lock().await;

        if now.saturating_duration_since(snapshot.last_refresh) > self.interval {
            match read_tags(&self.path).await {
                Ok(tags) => {
                    logger::log_tags_reloaded(tags.len(), &self.path);
                    snapshot.tags = Arc::new(tags);
                    snapshot.last_refresh = now;
                }
                Err(e) => {
                    // Keep serving the previous list; the next request retries
                    logger::log_error(&format!(
                        "Failed to reload tags from '{}': {e}",
                        self.path.display()
                    ));
                }
            }
        }

        Arc::clone(&snapshot.tags)
    }

    /// Unconditionally reload the list
    pub async fn force_refresh(&self) -> io::Result<usize> {
        let tags = read_tags(&self.path).await?;
        let count = tags.len();

        let mut snapshot = self.inner.lock().await;
        snapshot.tags = Arc::new(tags);
        snapshot.last_refresh = Instant::now();
        logger::log_tags_reloaded(count, &self.path);

        Ok(count)
    }
}

/// Split file content into trimmed, non-empty tags in file order
pub fn parse_tags(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

async fn read_tags(path: &Path) -> io::Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_tags(&content))
}
