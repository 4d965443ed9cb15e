// Copyright © 2022 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    convert::TryFrom,
};

use crate::{
    fetch::{MoreChildren, Sort},
    node::{NodeId, Parent},
    Error,
    Identified,
    Thread,
};

pub const DEFAULT_LIMIT: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnError {
    /// Stop and return the error.
    Abort,
    /// Report the placeholder as skipped and carry on.
    Skip,
}

impl Default for OnError {
    fn default() -> Self {
        Self::Abort
    }
}

/// Options for [`crate::ForestMut::replace_more`].
#[derive(Clone, Debug)]
pub struct ReplaceMore {
    /// Maximum number of fetches. `None` expands everything.
    pub limit: Option<usize>,
    /// Placeholders standing for fewer comments than this are skipped without
    /// counting towards `limit`.
    pub threshold: u32,
    pub on_error: OnError,
    /// Remove skipped placeholders from the tree once done.
    pub prune_skipped: bool,
    pub sort: Sort,
}

impl Default for ReplaceMore {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_LIMIT),
            threshold: 0,
            on_error: OnError::default(),
            prune_skipped: false,
            sort: Sort::default(),
        }
    }
}

impl ReplaceMore {
    /// Validate externally supplied numbers.
    pub fn try_new(limit: Option<i64>, threshold: i64) -> Result<Self, Error> {
        let limit = limit
            .map(|l| usize::try_from(l).map_err(|_| Error::InvalidLimit(l)))
            .transpose()?;
        let threshold =
            u32::try_from(threshold).map_err(|_| Error::InvalidThreshold(threshold))?;
        Ok(Self {
            limit,
            threshold,
            ..Self::default()
        })
    }

    pub fn unbounded() -> Self {
        Self {
            limit: None,
            ..Self::default()
        }
    }

    pub fn limit(self, limit: impl Into<Option<usize>>) -> Self {
        Self {
            limit: limit.into(),
            ..self
        }
    }

    pub fn threshold(self, threshold: u32) -> Self {
        Self { threshold, ..self }
    }

    pub fn skip_on_error(self) -> Self {
        Self {
            on_error: OnError::Skip,
            ..self
        }
    }

    pub fn prune_skipped(self) -> Self {
        Self {
            prune_skipped: true,
            ..self
        }
    }

    pub fn sort(self, sort: Sort) -> Self {
        Self { sort, ..self }
    }
}

/// A placeholder left unexpanded by a run.
#[derive(Debug)]
pub struct Skipped {
    pub more: NodeId,
    pub count: u32,
    pub reason: Reason,
}

#[derive(Debug)]
pub enum Reason {
    /// "Continue this thread": nothing to fetch.
    Unfetchable,
    /// The remote handed back a placeholder for exactly the ids of a request
    /// issued before.
    Repeated,
    Threshold,
    Limit,
    /// The fetch failed and [`OnError::Skip`] was in effect.
    Failed(Error),
}

#[derive(Debug, PartialEq, Eq)]
struct Candidate {
    count: u32,
    seq: Reverse<usize>,
    ix: NodeId,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Heaviest first, first come first served among equals.
#[derive(Default)]
struct Queue {
    heap: BinaryHeap<Candidate>,
    seq: usize,
}

impl Queue {
    fn push(&mut self, ix: NodeId, count: u32) {
        self.heap.push(Candidate {
            count,
            seq: Reverse(self.seq),
            ix,
        });
        self.seq += 1;
    }

    fn pop(&mut self) -> Option<Candidate> {
        self.heap.pop()
    }
}

#[tracing::instrument(
    skip(thread, cx, opts),
    fields(
        submission = %thread.submission(),
        limit = ?opts.limit,
        threshold = opts.threshold,
    )
)]
pub(crate) fn replace_more<C, F>(
    thread: &mut Thread<C>,
    root: Parent,
    cx: &F,
    opts: &ReplaceMore,
) -> Result<Vec<Skipped>, Error>
where
    C: Identified,
    F: MoreChildren<C>,
{
    let mut queue = Queue::default();
    for more in thread.forest(root).more() {
        queue.push(more.id(), more.count());
    }

    let mut remaining = opts.limit;
    let mut skipped = Vec::new();
    while let Some(Candidate { count, seq, ix }) = queue.pop() {
        let more = thread
            .more(ix)
            .expect("BUG: queued node must be a placeholder");
        let reason = if more.is_sentinel() {
            Some(Reason::Unfetchable)
        } else if thread.is_repeat(more) {
            Some(Reason::Repeated)
        } else if count < opts.threshold {
            Some(Reason::Threshold)
        } else if remaining == Some(0) {
            Some(Reason::Limit)
        } else {
            None
        };
        if let Some(reason) = reason {
            trace!(%ix, count, ?reason, "skipping placeholder");
            skipped.push((seq, Skipped { more: ix, count, reason }));
            continue;
        }

        if let Some(n) = remaining.as_mut() {
            *n -= 1;
        }
        debug!(%ix, count, "expanding placeholder");
        match thread.expand(ix, cx, opts.sort) {
            Ok(revealed) => {
                for new in revealed {
                    if !thread.is_within(new, root) {
                        continue;
                    }
                    let count = thread.more(new).map(|m| m.count()).unwrap_or_default();
                    queue.push(new, count);
                }
            },
            Err(e @ Error::Fetch { .. }) if opts.on_error == OnError::Skip => {
                warn!(%ix, err = %e, "skipping placeholder after failed fetch");
                skipped.push((
                    seq,
                    Skipped {
                        more: ix,
                        count,
                        reason: Reason::Failed(e),
                    },
                ));
            },
            Err(e) => return Err(e),
        }
    }

    skipped.sort_by_key(|(Reverse(seq), _)| *seq);
    let skipped = skipped.into_iter().map(|(_, s)| s).collect::<Vec<_>>();
    if opts.prune_skipped {
        for s in &skipped {
            thread.detach(s.more);
        }
    }
    debug!(skipped = skipped.len(), "done");

    Ok(skipped)
}
