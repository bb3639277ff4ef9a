//! Frame scheduling
//!
//! Each mounted stage owns one frame chain: a loop that runs once per
//! platform frame until it is cancelled. [`FrameScheduler`] keeps the live
//! chains, so a stage that forgets to cancel (or mounts twice) shows up in
//! [`FrameScheduler::active_chains`].
//!
//! Animation reads the wall clock each frame; the scheduler never replays
//! missed frames.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(u64);

/// What a chain sees when its frame runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub now_ms: f64,
    /// Milliseconds since this chain's previous frame; 0 on the first frame.
    pub dt_ms: f64,
    /// Frames run by this chain, this one included.
    pub frame: u64,
}

#[derive(Debug, Default)]
struct Chain {
    frames: u64,
    last_ms: Option<f64>,
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    chains: FxHashMap<ChainId, Chain>,
}

impl FrameScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new chain.
    pub fn start(&mut self) -> ChainId {
        self.next_id += 1;
        let id = ChainId(self.next_id);
        self.chains.insert(id, Chain::default());
        log::debug!("Frame chain {id:?} started");
        id
    }

    /// Stops a chain. Returns `false` if it was not running.
    pub fn cancel(&mut self, id: ChainId) -> bool {
        let removed = self.chains.remove(&id).is_some();
        if removed {
            log::debug!("Frame chain {id:?} cancelled");
        }
        removed
    }

    #[must_use]
    pub fn is_active(&self, id: ChainId) -> bool {
        self.chains.contains_key(&id)
    }

    #[must_use]
    pub fn active_chains(&self) -> usize {
        self.chains.len()
    }

    /// Advances chain `id` to `now_ms`. `None` means the chain was cancelled
    /// and its frame must not run.
    pub fn begin_frame(&mut self, id: ChainId, now_ms: f64) -> Option<FrameInfo> {
        let chain = self.chains.get_mut(&id)?;
        let dt_ms = chain.last_ms.map_or(0.0, |last| (now_ms - last).max(0.0));
        chain.last_ms = Some(now_ms);
        chain.frames += 1;
        Some(FrameInfo {
            now_ms,
            dt_ms,
            frame: chain.frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_chain_stops_running() {
        let mut scheduler = FrameScheduler::new();
        let id = scheduler.start();
        assert_eq!(scheduler.begin_frame(id, 0.0).map(|f| f.frame), Some(1));
        let second = scheduler.begin_frame(id, 16.0);
        assert_eq!(second.map(|f| f.dt_ms), Some(16.0));

        assert!(scheduler.cancel(id));
        assert!(scheduler.begin_frame(id, 32.0).is_none());
        assert_eq!(scheduler.active_chains(), 0);
    }
}
