// Copyright © 2022 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use std::{
    convert::TryFrom,
    fmt::{self, Display},
    str::FromStr,
};

use crate::error;

const COMMENT_KIND: &str = "t1";
const SUBMISSION_KIND: &str = "t3";

fn validate(s: &str) -> Result<(), error::Parse> {
    if s.is_empty() {
        return Err(error::Parse::Empty);
    }
    match s
        .chars()
        .find(|c| !(c.is_ascii_digit() || c.is_ascii_lowercase()))
    {
        Some(c) => Err(error::Parse::InvalidChar(c)),
        None => Ok(()),
    }
}

macro_rules! base36_id {
    ($name:ident, $kind:expr) => {
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// The prefixed form used by the remote API, eg. `t1_c0ffee`.
            pub fn fullname(&self) -> String {
                format!("{}_{}", $kind, self.0)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        /// Accepts both the bare and the prefixed form.
        impl FromStr for $name {
            type Err = error::Parse;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bare = match s.split_once('_') {
                    None => s,
                    Some((kind, rest)) if kind == $kind => rest,
                    Some((kind, _)) => return Err(error::Parse::UnknownKind(kind.to_owned())),
                };
                validate(bare)?;
                Ok(Self(bare.to_owned()))
            }
        }

        impl TryFrom<&str> for $name {
            type Error = error::Parse;

            fn try_from(s: &str) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    };
}

base36_id!(CommentId, COMMENT_KIND);
base36_id!(SubmissionId, SUBMISSION_KIND);

/// What a comment or placeholder hangs off, as named by the remote.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParentId {
    Submission(SubmissionId),
    Comment(CommentId),
}

impl ParentId {
    pub fn as_comment(&self) -> Option<&CommentId> {
        match self {
            Self::Comment(id) => Some(id),
            Self::Submission(_) => None,
        }
    }
}

impl From<CommentId> for ParentId {
    fn from(id: CommentId) -> Self {
        Self::Comment(id)
    }
}

impl From<SubmissionId> for ParentId {
    fn from(id: SubmissionId) -> Self {
        Self::Submission(id)
    }
}

impl Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submission(id) => f.write_str(&id.fullname()),
            Self::Comment(id) => f.write_str(&id.fullname()),
        }
    }
}

/// Parses a fullname. The kind prefix is mandatory here, as it is the only
/// thing telling the two variants apart.
impl FromStr for ParentId {
    type Err = error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('_') {
            Some((COMMENT_KIND, _)) => s.parse().map(Self::Comment),
            Some((SUBMISSION_KIND, _)) => s.parse().map(Self::Submission),
            Some((kind, _)) => Err(error::Parse::UnknownKind(kind.to_owned())),
            None => Err(error::Parse::MissingKind(s.to_owned())),
        }
    }
}

/// The identity contract the engine relies on for comment payloads.
///
/// `id` must be stable for the lifetime of the payload: it is what keeps the
/// per-thread index free of duplicates.
pub trait Identified {
    fn id(&self) -> &CommentId;
    fn parent_id(&self) -> &ParentId;
}
