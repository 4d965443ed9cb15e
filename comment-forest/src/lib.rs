// Copyright © 2022 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Comment threads which are materialised lazily.
//!
//! A [`Thread`] holds the comments of one submission as far as they have been
//! fetched. Where the remote elided comments, the tree contains placeholders
//! ([`More`]), which [`ForestMut::replace_more`] replaces by the comments they
//! stand for, one [`MoreChildren`] request at a time.

#![warn(clippy::extra_unused_lifetimes)]
#![deny(rustdoc::broken_intra_doc_links)]

#[macro_use]
extern crate async_trait;
#[macro_use]
extern crate tracing;

pub mod config;
pub use config::Config;

pub mod error;
pub use error::Error;

mod fetch;
pub use fetch::{Fetched, MoreChildren, Request, Sort, Stub};

mod ids;
pub use ids::{CommentId, Identified, ParentId, SubmissionId};

pub mod mem;

mod node;
pub use node::{Comment, Expansion, More, Node, NodeId, Parent};

mod replace;
pub use replace::{OnError, Reason, ReplaceMore, Skipped, DEFAULT_LIMIT};

mod thread;
pub use thread::{Forest, ForestMut, Index, Thread};

// Re-exports
pub use nonempty::NonEmpty;
