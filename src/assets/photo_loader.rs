//! Asynchronous photo loading.
//!
//! Requests complete off the UI thread and deliver decoded images over a
//! `flume` channel; the owner drains the channel once per frame. Natively,
//! local files are read with `tokio::fs` on a shared runtime and decoded in
//! `spawn_blocking`. URLs, and everything on the web, go through `ehttp`.
//!
//! Every request captures the stage's liveness flag. A completion that finds
//! the flag cleared is dropped before it is sent, and [`PhotoLoader::drain`]
//! checks the flag again before handing anything to the scene, so a photo
//! can never land in a scene that was already torn down.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(target_arch = "wasm32"))]
use std::sync::OnceLock;

use flume::{Receiver, Sender};
#[cfg(not(target_arch = "wasm32"))]
use tokio::runtime::{Handle, Runtime};

use crate::errors::{FeteError, Result};
use crate::resources::Image;

/// Outcome of one photo request.
#[derive(Debug)]
pub struct PhotoResult {
    /// Index of the photo frame the request belongs to.
    pub index: usize,
    pub source: String,
    pub image: Result<Image>,
}

/// Runtime shared by every loader. `None` if it could not be created.
#[cfg(not(target_arch = "wasm32"))]
fn photo_runtime() -> Option<Handle> {
    static RUNTIME: OnceLock<Option<Runtime>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| match Runtime::new() {
            Ok(runtime) => Some(runtime),
            Err(e) => {
                log::error!("Failed to create photo loader runtime: {e}");
                None
            }
        })
        .as_ref()
        .map(|runtime| runtime.handle().clone())
}

pub struct PhotoLoader {
    alive: Arc<AtomicBool>,
    #[cfg(not(target_arch = "wasm32"))]
    runtime: Option<Handle>,
    tx: Sender<PhotoResult>,
    rx: Receiver<PhotoResult>,
    pending: usize,
}

impl PhotoLoader {
    /// Creates a loader bound to a stage liveness flag.
    #[must_use]
    pub fn new(alive: Arc<AtomicBool>) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            alive,
            #[cfg(not(target_arch = "wasm32"))]
            runtime: photo_runtime(),
            tx,
            rx,
            pending: 0,
        }
    }

    /// Number of requests that have not been drained yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Starts loading `source` for frame `index`.
    pub fn request(&mut self, index: usize, source: &str) {
        self.pending += 1;
        let source = source.to_string();
        log::debug!("Requesting photo {index}: {source}");

        #[cfg(not(target_arch = "wasm32"))]
        if !is_url(&source) {
            self.read_local(index, source);
            return;
        }

        self.fetch(index, source);
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn read_local(&self, index: usize, source: String) {
        let Some(runtime) = &self.runtime else {
            let image = Err(FeteError::TaskJoinError("photo runtime unavailable".into()));
            deliver(&self.alive, &self.tx, PhotoResult { index, source, image });
            return;
        };
        let tx = self.tx.clone();
        let alive = Arc::clone(&self.alive);
        runtime.spawn(async move {
            let image = read_and_decode(&source).await;
            deliver(&alive, &tx, PhotoResult { index, source, image });
        });
    }

    fn fetch(&self, index: usize, source: String) {
        let tx = self.tx.clone();
        let alive = Arc::clone(&self.alive);
        let request = ehttp::Request::get(&source);
        ehttp::fetch(request, move |response| {
            let image = match response {
                Ok(response) if response.ok => Image::decode(&response.bytes),
                Ok(response) => Err(FeteError::HttpResponseError {
                    status: response.status,
                    url: response.url,
                }),
                Err(e) => Err(FeteError::HttpError(e)),
            };
            deliver(&alive, &tx, PhotoResult { index, source, image });
        });
    }

    /// Sends a completed result through the same liveness-checked path as the
    /// asynchronous requests.
    pub fn inject(&mut self, result: PhotoResult) {
        self.pending += 1;
        deliver(&self.alive, &self.tx, result);
    }

    /// Collects finished requests. Returns nothing once the owning stage is
    /// no longer alive, even if results are queued.
    pub fn drain(&mut self) -> Vec<PhotoResult> {
        let results: Vec<PhotoResult> = self.rx.try_iter().collect();
        self.pending = self.pending.saturating_sub(results.len());
        if !self.alive.load(Ordering::Acquire) {
            if !results.is_empty() {
                log::debug!("Dropping {} stale photo results", results.len());
            }
            return Vec::new();
        }
        results
    }
}

fn deliver(alive: &AtomicBool, tx: &Sender<PhotoResult>, result: PhotoResult) {
    if !alive.load(Ordering::Acquire) {
        log::debug!("Photo {} finished after unmount, discarded", result.index);
        return;
    }
    // The receiver only disappears together with its stage.
    let _ = tx.send(result);
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_and_decode(path: &str) -> Result<Image> {
    let bytes = tokio::fs::read(path).await?;
    tokio::task::spawn_blocking(move || Image::decode(&bytes)).await?
}

#[cfg(not(target_arch = "wasm32"))]
fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
