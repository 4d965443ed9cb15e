// Copyright © 2022 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use thiserror::Error;

use crate::{CommentId, NodeId, ParentId};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("placeholder {0} was already submitted for expansion")]
    DuplicateExpansion(NodeId),

    #[error("comment {0} is already part of the thread")]
    DuplicateComment(CommentId),

    #[error("failed to fetch more comments under {parent}")]
    Fetch {
        parent: ParentId,
        #[source]
        source: BoxError,
    },

    #[error("invalid limit {0}: must not be negative")]
    InvalidLimit(i64),

    #[error("invalid threshold {0}: must be between 0 and {}", u32::MAX)]
    InvalidThreshold(i64),

    #[error("placeholder {0} continues the thread elsewhere and cannot be fetched")]
    Unfetchable(NodeId),

    #[error("placeholder {0} is no longer part of the tree")]
    Detached(NodeId),

    #[error("parent {0} is neither part of the thread nor of the response")]
    UnknownParent(ParentId),

    #[error("no comment {0} in this thread")]
    UnknownComment(CommentId),

    #[error("{0} is not a placeholder")]
    NotAPlaceholder(NodeId),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Parse {
    #[error("empty identifier")]
    Empty,

    #[error("invalid character {0:?} in identifier")]
    InvalidChar(char),

    #[error("unknown kind prefix `{0}`")]
    UnknownKind(String),

    #[error("`{0}` is not a fullname")]
    MissingKind(String),

    #[error("unsupported comment sort `{0}`")]
    UnknownSort(String),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Config {
    #[error("malformed configuration")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] Error),
}
