// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{cell::Cell, collections::HashSet};

use async_trait::async_trait;
use comment_forest::{
    mem::{Remote, Shape},
    CommentId,
    Fetched,
    Forest,
    Identified,
    MoreChildren,
    Node,
    ParentId,
    Request,
    Stub,
    SubmissionId,
    Thread,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestComment {
    pub id: CommentId,
    pub parent: ParentId,
    pub body: String,
}

impl Identified for TestComment {
    fn id(&self) -> &CommentId {
        &self.id
    }

    fn parent_id(&self) -> &ParentId {
        &self.parent
    }
}

pub fn submission() -> SubmissionId {
    "3hahrw".parse().unwrap()
}

pub fn cid(s: &str) -> CommentId {
    s.parse().unwrap()
}

/// A top-level comment of [`submission`].
pub fn top(id: &str) -> TestComment {
    TestComment {
        id: cid(id),
        parent: ParentId::Submission(submission()),
        body: format!("comment {}", id),
    }
}

pub fn reply(id: &str, parent: &str) -> TestComment {
    TestComment {
        id: cid(id),
        parent: ParentId::Comment(cid(parent)),
        body: format!("reply {} to {}", id, parent),
    }
}

pub fn stub(parent: ParentId, children: &[&str]) -> Fetched<TestComment> {
    Fetched::More(Stub {
        parent,
        count: children.len() as u32,
        children: children.iter().map(|c| cid(c)).collect(),
    })
}

pub fn thread_of(remote: &Remote<TestComment>, shape: Shape) -> Thread<TestComment> {
    Thread::with_comments(remote.submission().clone(), remote.listing(shape)).unwrap()
}

/// A compact rendering of [`Forest::list`]: comment ids, and `+n` for a
/// placeholder hiding `n` comments.
pub fn render(forest: Forest<'_, TestComment>) -> Vec<String> {
    forest
        .list()
        .into_iter()
        .map(|node| match node {
            Node::Comment(c) => c.id().to_string(),
            Node::More(m) => format!("+{}", m.count()),
        })
        .collect()
}

pub fn count_comments(forest: Forest<'_, TestComment>) -> usize {
    forest.list().into_iter().filter(|n| n.is_comment()).count()
}

/// The thread used by the scenario tests: two visible top-level comments,
/// followed by 18 placeholders hiding 1, 2, .., 18 top-level comments
/// respectively.
pub struct Eighteen {
    pub remote: Remote<TestComment>,
    pub thread: Thread<TestComment>,
}

impl Eighteen {
    pub const GROUPS: u32 = 18;

    pub fn group(g: u32) -> Vec<String> {
        (0..=g).map(|i| format!("g{}x{}", g, i)).collect()
    }

    pub fn new() -> Self {
        let visible = vec![top("v0"), top("v1")];
        let hidden = (0..Self::GROUPS)
            .flat_map(Self::group)
            .map(|id| top(&id))
            .collect::<Vec<_>>();
        let remote = Remote::new(submission(), visible.iter().cloned().chain(hidden));

        let listing = visible
            .into_iter()
            .map(Fetched::comment)
            .chain((0..Self::GROUPS).map(|g| {
                let ids = Self::group(g);
                stub(
                    ParentId::Submission(submission()),
                    &ids.iter().map(String::as_str).collect::<Vec<_>>(),
                )
            }));
        let thread = Thread::with_comments(submission(), listing).unwrap();

        Self { remote, thread }
    }
}

impl Default for Eighteen {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("connection reset by peer")]
pub struct Reset;

/// Wraps a [`Remote`], failing every request which names one of `fail_on`.
pub struct Flaky {
    pub remote: Remote<TestComment>,
    pub fail_on: HashSet<CommentId>,
    pub failures: Cell<usize>,
}

impl Flaky {
    pub fn new<'a>(
        remote: Remote<TestComment>,
        fail_on: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            remote,
            fail_on: fail_on.into_iter().map(cid).collect(),
            failures: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl MoreChildren<TestComment> for Flaky {
    type Error = Reset;

    async fn more_children(
        &self,
        req: Request<'_>,
    ) -> Result<Vec<Fetched<TestComment>>, Self::Error> {
        if req.children.iter().any(|id| self.fail_on.contains(id)) {
            self.failures.set(self.failures.get() + 1);
            return Err(Reset);
        }
        match self.remote.more_children(req).await {
            Ok(fetched) => Ok(fetched),
            Err(void) => match void {},
        }
    }
}

/// Answers every request with the same response.
pub struct Canned {
    pub response: Vec<Fetched<TestComment>>,
    pub calls: Cell<usize>,
}

impl Canned {
    pub fn new(response: Vec<Fetched<TestComment>>) -> Self {
        Self {
            response,
            calls: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl MoreChildren<TestComment> for Canned {
    type Error = std::convert::Infallible;

    async fn more_children(
        &self,
        _: Request<'_>,
    ) -> Result<Vec<Fetched<TestComment>>, Self::Error> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.response.clone())
    }
}
