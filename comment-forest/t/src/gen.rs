// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use comment_forest::mem::Shape;
use proptest::{prelude::*, sample::Index};

use crate::helpers::{reply, top, TestComment};

/// A thread of up to `max` comments, in listing order.
///
/// Every comment is either top-level, or replies to one which precedes it.
pub fn gen_comments(max: usize) -> impl Strategy<Value = Vec<TestComment>> {
    prop::collection::vec((any::<bool>(), any::<Index>()), 1..max).prop_map(|picks| {
        picks
            .into_iter()
            .enumerate()
            .map(|(i, (is_top, parent))| {
                let id = format!("c{}", i);
                if i == 0 || is_top {
                    top(&id)
                } else {
                    reply(&id, &format!("c{}", parent.index(i)))
                }
            })
            .collect()
    })
}

/// Listings which never cut the thread short by depth, so every placeholder
/// can be fetched.
pub fn gen_breadth_only() -> impl Strategy<Value = Shape> {
    (1usize..4).prop_map(|breadth| Shape {
        breadth: Some(breadth),
        depth: None,
    })
}

pub fn gen_shape() -> impl Strategy<Value = Shape> {
    (
        prop::option::weighted(0.8, 1usize..4),
        prop::option::of(1usize..4),
    )
        .prop_map(|(breadth, depth)| Shape { breadth, depth })
}
