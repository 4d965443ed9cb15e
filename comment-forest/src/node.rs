// Copyright © 2022 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use std::fmt::{self, Display};

use nonempty::NonEmpty;

use crate::{CommentId, Error, Identified, SubmissionId};

/// Stable handle of a node within its [`crate::Thread`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The in-tree parent of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parent {
    /// The top-level forest of the submission.
    Root,
    Comment(NodeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expansion {
    Pending,
    /// The fetch has been issued, but has not returned yet.
    InFlight,
    /// The fetch returned, but the result was not grafted onto the tree.
    Fetched,
    Expanded,
}

/// A placeholder standing in for comments which have not been fetched yet.
#[derive(Clone, Debug)]
pub struct More {
    pub(crate) ix: NodeId,
    pub(crate) parent: Parent,
    pub(crate) count: u32,
    pub(crate) children: Vec<CommentId>,
    pub(crate) state: Expansion,
}

impl More {
    pub fn id(&self) -> NodeId {
        self.ix
    }

    pub fn parent(&self) -> Parent {
        self.parent
    }

    /// Number of comments hidden behind this placeholder.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Remote ids this placeholder expands into.
    pub fn children(&self) -> &[CommentId] {
        &self.children
    }

    pub fn state(&self) -> Expansion {
        self.state
    }

    /// A "continue this thread" link: there is nothing to ask the remote for.
    pub fn is_sentinel(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn request(&self) -> Option<NonEmpty<CommentId>> {
        NonEmpty::from_slice(&self.children)
    }

    pub(crate) fn begin(&mut self) -> Result<(), Error> {
        match self.state {
            Expansion::Pending => {
                self.state = Expansion::InFlight;
                Ok(())
            },
            _ => Err(Error::DuplicateExpansion(self.ix)),
        }
    }
}

/// A comment materialised in a [`crate::Thread`].
#[derive(Clone, Debug)]
pub struct Comment<C> {
    pub(crate) ix: NodeId,
    pub(crate) parent: Parent,
    pub(crate) submission: SubmissionId,
    pub(crate) data: C,
    pub(crate) replies: Vec<NodeId>,
}

impl<C> Comment<C> {
    pub fn node_id(&self) -> NodeId {
        self.ix
    }

    pub fn parent(&self) -> Parent {
        self.parent
    }

    /// The submission this comment belongs to.
    pub fn submission(&self) -> &SubmissionId {
        &self.submission
    }

    pub fn data(&self) -> &C {
        &self.data
    }

    pub fn into_data(self) -> C {
        self.data
    }
}

impl<C: Identified> Comment<C> {
    pub fn id(&self) -> &CommentId {
        self.data.id()
    }
}

#[derive(Clone, Debug)]
pub enum Node<C> {
    Comment(Comment<C>),
    More(More),
}

impl<C> Node<C> {
    pub fn node_id(&self) -> NodeId {
        match self {
            Self::Comment(c) => c.ix,
            Self::More(m) => m.ix,
        }
    }

    pub fn parent(&self) -> Parent {
        match self {
            Self::Comment(c) => c.parent,
            Self::More(m) => m.parent,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Self::Comment(_))
    }

    pub fn is_more(&self) -> bool {
        matches!(self, Self::More(_))
    }

    pub fn as_comment(&self) -> Option<&Comment<C>> {
        match self {
            Self::Comment(c) => Some(c),
            Self::More(_) => None,
        }
    }

    pub fn as_more(&self) -> Option<&More> {
        match self {
            Self::More(m) => Some(m),
            Self::Comment(_) => None,
        }
    }
}
