// Copyright © 2022 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use crate::{error, CommentId, Identified, ParentId, SubmissionId};

/// The remote capability of materialising the comments behind a placeholder.
///
/// Implementations are driven to completion one call at a time, and must not
/// be called again for the same placeholder: the engine guarantees that it
/// never issues a second request for a placeholder whose request has been
/// issued before.
#[async_trait(?Send)]
pub trait MoreChildren<C> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the comments named by `req.children`.
    ///
    /// The response may be nested (replies attached to their comment) or flat
    /// (every comment at the top, carrying its parent id), or any mix of the
    /// two. It may contain further placeholders.
    async fn more_children(&self, req: Request<'_>) -> Result<Vec<Fetched<C>>, Self::Error>;
}

#[derive(Clone, Copy, Debug)]
pub struct Request<'a> {
    pub submission: &'a SubmissionId,
    /// The parent of the placeholder being expanded.
    pub parent: &'a ParentId,
    pub children: &'a NonEmpty<CommentId>,
    pub sort: Sort,
}

/// A node as returned by the remote, not yet part of any thread.
#[derive(Clone, Debug)]
pub enum Fetched<C> {
    Comment { comment: C, replies: Vec<Fetched<C>> },
    More(Stub),
}

impl<C> Fetched<C> {
    pub fn comment(comment: C) -> Self {
        Self::Comment {
            comment,
            replies: vec![],
        }
    }

    pub fn with_replies(comment: C, replies: Vec<Fetched<C>>) -> Self {
        Self::Comment { comment, replies }
    }
}

impl<C: Identified> Fetched<C> {
    /// What the remote says this node hangs off.
    pub fn parent_id(&self) -> &ParentId {
        match self {
            Self::Comment { comment, .. } => comment.parent_id(),
            Self::More(stub) => &stub.parent,
        }
    }
}

/// The remote's description of a placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stub {
    pub parent: ParentId,
    pub count: u32,
    pub children: Vec<CommentId>,
}

impl Stub {
    /// A "continue this thread" link under `parent`.
    pub fn sentinel(parent: ParentId) -> Self {
        Self {
            parent,
            count: 0,
            children: vec![],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Confidence,
    Top,
    New,
    Controversial,
    Old,
    Qa,
}

impl Default for Sort {
    fn default() -> Self {
        Self::Confidence
    }
}

impl Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Confidence => "confidence",
            Self::Top => "top",
            Self::New => "new",
            Self::Controversial => "controversial",
            Self::Old => "old",
            Self::Qa => "qa",
        };
        f.write_str(s)
    }
}

impl FromStr for Sort {
    type Err = error::Parse;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "confidence" => Ok(Self::Confidence),
            "top" => Ok(Self::Top),
            "new" => Ok(Self::New),
            "controversial" => Ok(Self::Controversial),
            "old" => Ok(Self::Old),
            "qa" => Ok(Self::Qa),
            _ => Err(error::Parse::UnknownSort(input.to_owned())),
        }
    }
}
