// Copyright © 2022 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use std::{cell::Cell, collections::HashMap, convert::Infallible, convert::TryFrom};

use crate::{
    fetch::{Fetched, MoreChildren, Request, Stub},
    CommentId,
    Identified,
    ParentId,
    SubmissionId,
};

/// How much of a thread a listing renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Shape {
    /// Maximum number of comments per level. The rest is folded into a
    /// placeholder.
    pub breadth: Option<usize>,
    /// Maximum number of levels. Comments at the last level which have
    /// replies get a "continue this thread" placeholder.
    pub depth: Option<usize>,
}

/// A very simple in-memory remote, serving one complete thread.
///
/// Placeholders it hands out name every hidden comment (not just the hidden
/// siblings), so expanding one materialises exactly `count` comments, unless
/// the response is cut by [`Remote::with_batch`].
#[derive(Debug)]
pub struct Remote<C> {
    submission: SubmissionId,
    comments: HashMap<CommentId, C>,
    children: HashMap<ParentId, Vec<CommentId>>,
    batch: Option<usize>,
    calls: Cell<usize>,
    served: Cell<usize>,
}

impl<C> Remote<C>
where
    C: Identified + Clone,
{
    /// Comments are expected in listing order. Comments whose parent is not
    /// part of the thread are unreachable.
    pub fn new<I>(submission: SubmissionId, comments: I) -> Self
    where
        I: IntoIterator<Item = C>,
    {
        let mut by_id = HashMap::new();
        let mut children = HashMap::<_, Vec<_>>::new();
        for comment in comments {
            children
                .entry(comment.parent_id().clone())
                .or_default()
                .push(comment.id().clone());
            by_id.insert(comment.id().clone(), comment);
        }
        Self {
            submission,
            comments: by_id,
            children,
            batch: None,
            calls: Cell::new(0),
            served: Cell::new(0),
        }
    }

    /// Serve at most `n` comments per request.
    pub fn with_batch(self, n: usize) -> Self {
        Self {
            batch: Some(n.max(1)),
            ..self
        }
    }

    pub fn submission(&self) -> &SubmissionId {
        &self.submission
    }

    /// Total number of comments in the thread.
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Number of requests answered so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Number of comments handed out by requests so far.
    pub fn served(&self) -> usize {
        self.served.get()
    }

    /// Render the submission's initial listing.
    pub fn listing(&self, shape: Shape) -> Vec<Fetched<C>> {
        let root = ParentId::Submission(self.submission.clone());
        self.render(&root, shape, 0)
    }

    fn kids(&self, parent: &ParentId) -> &[CommentId] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or_default()
    }

    fn render(&self, parent: &ParentId, shape: Shape, level: usize) -> Vec<Fetched<C>> {
        let kids = self.kids(parent);
        let shown = shape.breadth.map_or(kids.len(), |b| b.min(kids.len()));
        let last_level = shape.depth.map_or(false, |d| level + 1 >= d);

        let mut out = kids[..shown]
            .iter()
            .map(|id| {
                let this = ParentId::Comment(id.clone());
                let replies = if !last_level {
                    self.render(&this, shape, level + 1)
                } else if self.kids(&this).is_empty() {
                    vec![]
                } else {
                    vec![Fetched::More(Stub::sentinel(this))]
                };
                Fetched::with_replies(self.comments[id].clone(), replies)
            })
            .collect::<Vec<_>>();

        if shown < kids.len() {
            let hidden = kids[shown..]
                .iter()
                .flat_map(|id| self.subtree(id))
                .collect::<Vec<_>>();
            out.push(Fetched::More(Stub {
                parent: parent.clone(),
                count: count(&hidden),
                children: hidden,
            }));
        }

        out
    }

    /// `id` and all of its descendants, in pre-order.
    fn subtree(&self, id: &CommentId) -> Vec<CommentId> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(id) = stack.pop() {
            let this = ParentId::Comment(id.clone());
            stack.extend(self.kids(&this).iter().rev().cloned());
            out.push(id);
        }
        out
    }
}

fn count(ids: &[CommentId]) -> u32 {
    u32::try_from(ids.len()).unwrap_or(u32::MAX)
}

#[async_trait(?Send)]
impl<C> MoreChildren<C> for Remote<C>
where
    C: Identified + Clone + 'static,
{
    type Error = Infallible;

    /// Answers with a flat list, the way the remote API does. Unknown ids are
    /// ignored.
    async fn more_children(&self, req: Request<'_>) -> Result<Vec<Fetched<C>>, Self::Error> {
        self.calls.set(self.calls.get() + 1);
        let batch = self.batch.unwrap_or(usize::MAX);

        let mut out = Vec::new();
        let mut rest = Vec::new();
        for id in req.children.iter() {
            if out.len() >= batch {
                rest.push(id.clone());
            } else if let Some(comment) = self.comments.get(id) {
                out.push(Fetched::comment(comment.clone()));
            }
        }
        self.served.set(self.served.get() + out.len());
        trace!(requested = req.children.len(), served = out.len(), "more children");

        if !rest.is_empty() {
            out.push(Fetched::More(Stub {
                parent: req.parent.clone(),
                count: count(&rest),
                children: rest,
            }));
        }

        Ok(out)
    }
}
