// Copyright © 2022 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    fmt,
    mem,
};

use futures_lite::future::block_on;
use tracing::Instrument as _;

use crate::{
    fetch::{Fetched, MoreChildren, Request, Sort},
    node::{Comment, Expansion, More, Node, NodeId, Parent},
    replace::{self, ReplaceMore, Skipped},
    CommentId,
    Error,
    Identified,
    ParentId,
    SubmissionId,
};

/// The comments of one submission, as far as they have been materialised.
///
/// Nodes are kept in an arena and refer to each other by [`NodeId`]. Every
/// comment anywhere in the tree is also registered in a by-id index, which
/// is only ever extended by the engine itself.
#[derive(Clone, Debug)]
pub struct Thread<C> {
    submission: SubmissionId,
    nodes: Vec<Node<C>>,
    top: Vec<NodeId>,
    by_id: HashMap<CommentId, NodeId>,
    /// The id sets of all requests issued so far, successful or not yet
    /// answered.
    requested: HashSet<BTreeSet<CommentId>>,
}

impl<C> Thread<C> {
    pub fn new(submission: SubmissionId) -> Self {
        Self {
            submission,
            nodes: Vec::new(),
            top: Vec::new(),
            by_id: HashMap::new(),
            requested: HashSet::new(),
        }
    }

    pub fn submission(&self) -> &SubmissionId {
        &self.submission
    }

    /// Look up any node ever created in this thread, including placeholders
    /// which have since been expanded.
    pub fn node(&self, ix: NodeId) -> Option<&Node<C>> {
        self.nodes.get(ix.0)
    }

    pub fn more(&self, ix: NodeId) -> Option<&More> {
        self.node(ix).and_then(Node::as_more)
    }

    /// The top-level forest.
    pub fn comments(&self) -> Forest<'_, C> {
        Forest {
            thread: self,
            root: Parent::Root,
        }
    }

    pub(crate) fn forest(&self, root: Parent) -> Forest<'_, C> {
        Forest { thread: self, root }
    }

    pub fn comments_mut(&mut self) -> ForestMut<'_, C> {
        ForestMut {
            thread: self,
            root: Parent::Root,
        }
    }

    pub fn comments_by_id(&self) -> Index<'_, C> {
        Index { thread: self }
    }

    pub fn comment(&self, id: &CommentId) -> Option<&Comment<C>> {
        self.by_id
            .get(id)
            .and_then(|ix| self.node(*ix))
            .and_then(Node::as_comment)
    }

    /// The reply forest of the comment `id`.
    pub fn replies(&self, id: &CommentId) -> Result<Forest<'_, C>, Error> {
        let ix = self.lookup(id)?;
        Ok(Forest {
            thread: self,
            root: Parent::Comment(ix),
        })
    }

    pub fn replies_mut(&mut self, id: &CommentId) -> Result<ForestMut<'_, C>, Error> {
        let ix = self.lookup(id)?;
        Ok(ForestMut {
            thread: self,
            root: Parent::Comment(ix),
        })
    }

    fn lookup(&self, id: &CommentId) -> Result<NodeId, Error> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownComment(id.clone()))
    }

    fn get(&self, ix: NodeId) -> &Node<C> {
        &self.nodes[ix.0]
    }

    fn more_mut(&mut self, ix: NodeId) -> Result<&mut More, Error> {
        match self.nodes.get_mut(ix.0) {
            Some(Node::More(more)) => Ok(more),
            _ => Err(Error::NotAPlaceholder(ix)),
        }
    }

    pub(crate) fn children(&self, parent: Parent) -> &[NodeId] {
        match parent {
            Parent::Root => &self.top,
            Parent::Comment(ix) => match self.get(ix) {
                Node::Comment(c) => &c.replies,
                Node::More(_) => unreachable!("BUG: placeholder {} used as a parent", ix),
            },
        }
    }

    fn children_mut(&mut self, parent: Parent) -> &mut Vec<NodeId> {
        match parent {
            Parent::Root => &mut self.top,
            Parent::Comment(ix) => match &mut self.nodes[ix.0] {
                Node::Comment(c) => &mut c.replies,
                Node::More(_) => unreachable!("BUG: placeholder {} used as a parent", ix),
            },
        }
    }

    fn position(&self, ix: NodeId) -> Option<usize> {
        let parent = self.get(ix).parent();
        self.children(parent).iter().position(|x| *x == ix)
    }

    /// `true` if `ix` is `root` or hangs off it, transitively.
    pub(crate) fn is_within(&self, ix: NodeId, root: Parent) -> bool {
        let mut cur = self.get(ix).parent();
        loop {
            if cur == root {
                return true;
            }
            match cur {
                Parent::Root => return false,
                Parent::Comment(up) => cur = self.get(up).parent(),
            }
        }
    }

    /// `true` if `more` was never submitted itself, but a request for exactly
    /// its ids was, eg. because the remote handed the same placeholder back.
    pub(crate) fn is_repeat(&self, more: &More) -> bool {
        more.state() == Expansion::Pending
            && !more.is_sentinel()
            && self.requested.contains(&request_key(more.children()))
    }

    /// Remove a placeholder from its parent's children, keeping its slot.
    pub(crate) fn detach(&mut self, ix: NodeId) {
        if let Some(pos) = self.position(ix) {
            let parent = self.get(ix).parent();
            self.children_mut(parent).remove(pos);
        }
    }
}

impl<C: Identified> Thread<C> {
    /// Create a thread from the initial listing of a submission.
    pub fn with_comments<I>(submission: SubmissionId, nodes: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Fetched<C>>,
    {
        let mut thread = Self::new(submission);
        thread.extend(nodes)?;
        Ok(thread)
    }

    /// Append nodes to the top-level forest, eg. a further page of the
    /// listing. Returns the placeholders among them.
    pub fn extend<I>(&mut self, nodes: I) -> Result<Vec<NodeId>, Error>
    where
        I: IntoIterator<Item = Fetched<C>>,
    {
        let nodes = nodes.into_iter().collect::<Vec<_>>();
        let at = self.top.len();
        self.splice(Parent::Root, at, None, nodes)
    }

    pub(crate) fn parent_id(&self, parent: Parent) -> ParentId {
        match parent {
            Parent::Root => ParentId::Submission(self.submission.clone()),
            Parent::Comment(ix) => match self.get(ix) {
                Node::Comment(c) => ParentId::Comment(c.id().clone()),
                Node::More(_) => unreachable!("BUG: placeholder {} used as a parent", ix),
            },
        }
    }

    fn resolve(&self, parent: &ParentId) -> Option<Parent> {
        match parent {
            ParentId::Submission(id) if id == &self.submission => Some(Parent::Root),
            ParentId::Submission(_) => None,
            ParentId::Comment(id) => self.by_id.get(id).map(|ix| Parent::Comment(*ix)),
        }
    }

    /// Issue the fetch for placeholder `ix` and return the response without
    /// grafting it onto the tree.
    ///
    /// The placeholder counts as submitted from here on: any later attempt to
    /// expand it fails with [`Error::DuplicateExpansion`], as does expanding a
    /// placeholder naming exactly the ids of a request issued before. If the
    /// fetch fails, the placeholder is left as it was.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub fn fetch_more<F>(
        &mut self,
        ix: NodeId,
        cx: &F,
        sort: Sort,
    ) -> Result<Vec<Fetched<C>>, Error>
    where
        F: MoreChildren<C>,
    {
        let more = self.more_mut(ix)?;
        if more.state() != Expansion::Pending {
            return Err(Error::DuplicateExpansion(ix));
        }
        let children = more.request().ok_or(Error::Unfetchable(ix))?;
        let parent = more.parent();
        if self.position(ix).is_none() {
            return Err(Error::Detached(ix));
        }
        let key = request_key(children.iter());
        if self.requested.contains(&key) {
            return Err(Error::DuplicateExpansion(ix));
        }
        self.more_mut(ix)?.begin()?;
        self.requested.insert(key.clone());

        let parent_id = self.parent_id(parent);
        let res = block_on(
            cx.more_children(Request {
                submission: &self.submission,
                parent: &parent_id,
                children: &children,
                sort,
            })
            .in_current_span(),
        );

        let more = self.more_mut(ix)?;
        match res {
            Ok(fetched) => {
                more.state = Expansion::Fetched;
                Ok(fetched)
            },
            Err(e) => {
                more.state = Expansion::Pending;
                self.requested.remove(&key);
                Err(Error::Fetch {
                    parent: parent_id,
                    source: Box::new(e),
                })
            },
        }
    }

    /// Replace placeholder `ix` by the comments it stands for.
    ///
    /// Returns the placeholders revealed by the expansion.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub fn expand<F>(&mut self, ix: NodeId, cx: &F, sort: Sort) -> Result<Vec<NodeId>, Error>
    where
        F: MoreChildren<C>,
    {
        let fetched = self.fetch_more(ix, cx, sort)?;
        self.graft(ix, fetched)
    }

    fn graft(&mut self, ix: NodeId, fetched: Vec<Fetched<C>>) -> Result<Vec<NodeId>, Error> {
        let parent = self.get(ix).parent();
        let at = self.position(ix).ok_or(Error::Detached(ix))?;
        let revealed = self.splice(parent, at, Some(ix), fetched)?;
        self.more_mut(ix)?.state = Expansion::Expanded;
        debug!(%ix, revealed = revealed.len(), "grafted placeholder");
        Ok(revealed)
    }

    /// Insert `nodes` into the children of `parent` at position `at`,
    /// replacing `replacing` if given.
    ///
    /// Nodes whose parent is another known comment (including one from the
    /// same batch, wherever it appears in it) are appended to that comment's
    /// replies instead. Nothing is mutated if the batch would register a
    /// comment twice, or names a parent which is neither part of the thread
    /// nor of the batch.
    fn splice(
        &mut self,
        parent: Parent,
        at: usize,
        replacing: Option<NodeId>,
        nodes: Vec<Fetched<C>>,
    ) -> Result<Vec<NodeId>, Error> {
        self.validate(&nodes)?;

        let mut revealed = Vec::new();
        let mut in_place = Vec::new();
        let mut deferred = Vec::new();
        for node in nodes {
            match self.resolve(node.parent_id()) {
                Some(target) if target == parent => {
                    in_place.push(self.insert(parent, node, &mut revealed))
                },
                Some(target) => {
                    let ix = self.insert(target, node, &mut revealed);
                    self.children_mut(target).push(ix);
                },
                // Parent comes later in the batch.
                None => deferred.push(node),
            }
        }
        while !deferred.is_empty() {
            let pending = deferred.len();
            for node in mem::take(&mut deferred) {
                match self.resolve(node.parent_id()) {
                    Some(target) => {
                        let ix = self.insert(target, node, &mut revealed);
                        self.children_mut(target).push(ix);
                    },
                    None => deferred.push(node),
                }
            }
            if deferred.len() == pending {
                unreachable!("BUG: validated batch has unresolvable parents");
            }
        }

        let replaced = usize::from(replacing.is_some());
        let removed = self
            .children_mut(parent)
            .splice(at..at + replaced, in_place)
            .collect::<Vec<_>>();
        debug_assert_eq!(removed, replacing.into_iter().collect::<Vec<_>>());

        Ok(revealed)
    }

    fn validate(&self, nodes: &[Fetched<C>]) -> Result<(), Error> {
        // Every comment of the batch, with the parent it will end up under.
        let mut batch = HashMap::new();
        let mut stack = nodes.iter().map(|node| (node, None)).collect::<Vec<_>>();
        while let Some((node, container)) = stack.pop() {
            if let Fetched::Comment { comment, replies } = node {
                let id = comment.id();
                if self.by_id.contains_key(id) || batch.contains_key(id) {
                    return Err(Error::DuplicateComment(id.clone()));
                }
                let parent = match container {
                    Some(c) => ParentId::Comment(CommentId::clone(c)),
                    None => comment.parent_id().clone(),
                };
                batch.insert(id, parent);
                stack.extend(replies.iter().map(|reply| (reply, Some(id))));
            }
        }

        for node in nodes {
            let parent = node.parent_id();
            if !self.is_anchored(parent, &batch) {
                return Err(Error::UnknownParent(parent.clone()));
            }
        }
        Ok(())
    }

    /// `true` if following `parent` up through `batch` ends in this thread.
    fn is_anchored(&self, parent: &ParentId, batch: &HashMap<&CommentId, ParentId>) -> bool {
        let mut cur = parent;
        for _ in 0..=batch.len() {
            match cur {
                ParentId::Submission(id) => return id == &self.submission,
                ParentId::Comment(id) if self.by_id.contains_key(id) => return true,
                ParentId::Comment(id) => match batch.get(id) {
                    Some(up) => cur = up,
                    None => return false,
                },
            }
        }
        // Cycle within the batch.
        false
    }

    fn insert(&mut self, parent: Parent, node: Fetched<C>, revealed: &mut Vec<NodeId>) -> NodeId {
        let ix = NodeId(self.nodes.len());
        match node {
            Fetched::Comment { comment, replies } => {
                self.by_id.insert(comment.id().clone(), ix);
                self.nodes.push(Node::Comment(Comment {
                    ix,
                    parent,
                    submission: self.submission.clone(),
                    data: comment,
                    replies: Vec::with_capacity(replies.len()),
                }));
                for reply in replies {
                    let child = self.insert(Parent::Comment(ix), reply, revealed);
                    self.children_mut(Parent::Comment(ix)).push(child);
                }
            },
            Fetched::More(stub) => {
                self.nodes.push(Node::More(More {
                    ix,
                    parent,
                    count: stub.count,
                    children: stub.children,
                    state: Expansion::Pending,
                }));
                revealed.push(ix);
            },
        }
        ix
    }
}

/// A read-only view of one level of the thread: the top-level comments of the
/// submission, or the replies to one comment.
pub struct Forest<'a, C> {
    thread: &'a Thread<C>,
    root: Parent,
}

impl<C> fmt::Debug for Forest<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forest")
            .field("root", &self.root)
            .field("len", &self.len())
            .finish()
    }
}

impl<C> Clone for Forest<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Forest<'_, C> {}

impl<'a, C> Forest<'a, C> {
    pub fn root(&self) -> Parent {
        self.root
    }

    /// Number of top-level nodes in this forest.
    pub fn len(&self) -> usize {
        self.thread.children(self.root).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<&'a Node<C>> {
        let thread = self.thread;
        thread.children(self.root).get(i).map(|ix| thread.get(*ix))
    }

    /// The top-level nodes, in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Node<C>> + 'a {
        let thread = self.thread;
        thread.children(self.root).iter().map(move |ix| thread.get(*ix))
    }

    /// All nodes of the forest in depth-first pre-order: every node comes
    /// before its replies.
    pub fn list(&self) -> Vec<&'a Node<C>> {
        let thread = self.thread;
        let mut out = Vec::new();
        let mut stack = thread
            .children(self.root)
            .iter()
            .rev()
            .copied()
            .collect::<Vec<_>>();
        while let Some(ix) = stack.pop() {
            let node = thread.get(ix);
            if let Node::Comment(c) = node {
                stack.extend(c.replies.iter().rev());
            }
            out.push(node);
        }
        out
    }

    /// All placeholders in the forest, in the order [`Forest::list`] yields
    /// them.
    pub fn more(&self) -> Vec<&'a More> {
        self.list().into_iter().filter_map(Node::as_more).collect()
    }
}

pub struct ForestMut<'a, C> {
    thread: &'a mut Thread<C>,
    root: Parent,
}

impl<'a, C> ForestMut<'a, C> {
    pub fn as_forest(&self) -> Forest<'_, C> {
        Forest {
            thread: &*self.thread,
            root: self.root,
        }
    }

    pub fn list(&self) -> Vec<&Node<C>> {
        self.as_forest().list()
    }
}

impl<'a, C: Identified> ForestMut<'a, C> {
    /// Expand the placeholders of this forest, heaviest first.
    ///
    /// Returns the placeholders which were not expanded, in the order they
    /// were encountered. See [`ReplaceMore`] for the knobs.
    pub fn replace_more<F>(&mut self, cx: &F, opts: &ReplaceMore) -> Result<Vec<Skipped>, Error>
    where
        F: MoreChildren<C>,
    {
        replace::replace_more(self.thread, self.root, cx, opts)
    }
}

/// Read-only view of the by-id index of a [`Thread`].
pub struct Index<'a, C> {
    thread: &'a Thread<C>,
}

impl<'a, C> Index<'a, C> {
    pub fn get(&self, id: &CommentId) -> Option<&'a Comment<C>> {
        let thread = self.thread;
        thread
            .by_id
            .get(id)
            .and_then(|ix| thread.get(*ix).as_comment())
    }

    pub fn contains(&self, id: &CommentId) -> bool {
        self.thread.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.thread.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thread.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a CommentId, &'a Comment<C>)> + 'a {
        let thread = self.thread;
        thread.by_id.iter().filter_map(move |(id, ix)| {
            thread.get(*ix).as_comment().map(|c| (id, c))
        })
    }
}

fn request_key<'a>(ids: impl IntoIterator<Item = &'a CommentId>) -> BTreeSet<CommentId> {
    ids.into_iter().cloned().collect()
}
