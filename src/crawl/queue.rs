//! FIFO work queue of albums with cycle and depth bookkeeping.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace};

use crate::parser::AlbumId;

/// One album waiting to be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedAlbum {
    /// Album to fetch.
    pub id: AlbumId,
    /// Distance from the root album (root is 0).
    pub depth: u32,
}

/// Result of offering an album to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    /// The album will be processed.
    Queued,
    /// The album was processed already or is waiting in the queue.
    AlreadySeen,
    /// The album lies beyond the configured maximum depth.
    TooDeep,
}

/// Albums still to process, plus every album the run has seen.
///
/// Each album is processed at most once per run, even when albums link to
/// each other. Items come out in discovery order (breadth first), so an
/// album is always reached at its smallest depth.
///
/// ```
/// use imgur_downloader::{AlbumId, CrawlQueue};
/// use imgur_downloader::crawl::Enqueue;
///
/// let a = AlbumId::new("aaaaa").unwrap();
/// let b = AlbumId::new("bbbbb").unwrap();
///
/// let mut queue = CrawlQueue::new(Some(1));
/// queue.push_root(a.clone());
/// let root = queue.pop().unwrap();
/// assert_eq!(queue.push_discovered(b.clone(), root.depth), Enqueue::Queued);
/// assert_eq!(queue.push_discovered(a, root.depth), Enqueue::AlreadySeen);
///
/// let child = queue.pop().unwrap();
/// assert_eq!(child.depth, 1);
/// assert_eq!(queue.push_discovered(AlbumId::new("ccccc").unwrap(), child.depth), Enqueue::TooDeep);
/// ```
#[derive(Debug, Default)]
pub struct CrawlQueue {
    pending: VecDeque<QueuedAlbum>,
    seen: HashSet<AlbumId>,
    max_depth: Option<u32>,
}

impl CrawlQueue {
    /// Creates an empty queue. `None` means no depth limit.
    #[must_use]
    pub fn new(max_depth: Option<u32>) -> Self {
        Self {
            pending: VecDeque::new(),
            seen: HashSet::new(),
            max_depth,
        }
    }

    /// Queues the album the run starts from, at depth 0.
    ///
    /// Returns `false` when the album was already seen.
    pub fn push_root(&mut self, id: AlbumId) -> bool {
        self.push(id, 0) == Enqueue::Queued
    }

    /// Queues an album found while processing an album at `parent_depth`.
    pub fn push_discovered(&mut self, id: AlbumId, parent_depth: u32) -> Enqueue {
        let depth = parent_depth.saturating_add(1);
        if self.seen.contains(&id) {
            trace!(album = %id, "album already seen");
            return Enqueue::AlreadySeen;
        }
        if self.max_depth.is_some_and(|max| depth > max) {
            debug!(album = %id, depth, max_depth = ?self.max_depth, "album beyond max depth");
            return Enqueue::TooDeep;
        }
        self.push(id, depth)
    }

    fn push(&mut self, id: AlbumId, depth: u32) -> Enqueue {
        if !self.seen.insert(id.clone()) {
            return Enqueue::AlreadySeen;
        }
        debug!(album = %id, depth, "queued album");
        self.pending.push_back(QueuedAlbum { id, depth });
        Enqueue::Queued
    }

    /// Takes the next album to process.
    pub fn pop(&mut self) -> Option<QueuedAlbum> {
        self.pending.pop_front()
    }

    /// Returns whether `id` was queued at some point during the run.
    #[must_use]
    pub fn has_seen(&self, id: &AlbumId) -> bool {
        self.seen.contains(id)
    }

    /// Number of albums waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns whether no album is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of distinct albums seen so far.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
