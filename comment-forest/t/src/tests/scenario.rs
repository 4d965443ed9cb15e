// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use comment_forest::{Reason, ReplaceMore};
use pretty_assertions::assert_eq;

use crate::helpers::{count_comments, render, Eighteen};

#[test]
fn fixture_shape() {
    let Eighteen { thread, .. } = Eighteen::new();
    assert_eq!(2, count_comments(thread.comments()));
    assert_eq!(18, thread.comments().more().len());
    assert_eq!(20, thread.comments().len());
}

#[test]
fn skip_at_limit() {
    test_helpers::logging::init();

    let Eighteen { remote, mut thread } = Eighteen::new();
    let skipped = thread
        .comments_mut()
        .replace_more(&remote, &ReplaceMore::default().limit(1))
        .unwrap();

    assert_eq!(17, skipped.len());
    assert_eq!(1, remote.calls());
    // The heaviest placeholder went first.
    assert!(skipped.iter().all(|s| s.count < 18));
    assert!(skipped.iter().all(|s| matches!(s.reason, Reason::Limit)));
    assert_eq!(2 + 18, count_comments(thread.comments()));
}

#[test]
fn skip_all() {
    let Eighteen { remote, mut thread } = Eighteen::new();
    let before = render(thread.comments());
    let skipped = thread
        .comments_mut()
        .replace_more(&remote, &ReplaceMore::default().limit(0))
        .unwrap();

    assert_eq!(18, skipped.len());
    assert_eq!(0, remote.calls());
    assert_eq!(before, render(thread.comments()));
    // Encounter order.
    assert_eq!(
        (1..=18).collect::<Vec<_>>(),
        skipped.iter().map(|s| s.count).collect::<Vec<_>>()
    );
}

#[test]
fn skip_below_threshold() {
    let Eighteen { remote, mut thread } = Eighteen::new();
    let before = count_comments(thread.comments());
    let skipped = thread
        .comments_mut()
        .replace_more(&remote, &ReplaceMore::default().limit(16).threshold(5))
        .unwrap();

    // 5..=18 are eligible, which is within the limit.
    assert_eq!(14, remote.calls());
    assert_eq!(4, skipped.len());
    assert!(skipped.iter().all(|s| s.count < 5));
    assert!(skipped
        .iter()
        .all(|s| matches!(s.reason, Reason::Threshold)));
    assert_eq!(
        before + (5..=18).sum::<usize>(),
        count_comments(thread.comments())
    );
}

#[test]
fn threshold_and_limit() {
    let Eighteen { remote, mut thread } = Eighteen::new();
    let skipped = thread
        .comments_mut()
        .replace_more(&remote, &ReplaceMore::default().limit(10).threshold(5))
        .unwrap();

    assert_eq!(10, remote.calls());
    assert_eq!(
        (1..=8).collect::<Vec<_>>(),
        skipped.iter().map(|s| s.count).collect::<Vec<_>>()
    );
    for s in &skipped {
        if s.count < 5 {
            assert_matches!(s.reason, Reason::Threshold)
        } else {
            assert_matches!(s.reason, Reason::Limit)
        }
    }
}

#[test]
fn replace_all() {
    let Eighteen { remote, mut thread } = Eighteen::new();
    let skipped = thread
        .comments_mut()
        .replace_more(&remote, &ReplaceMore::unbounded())
        .unwrap();

    assert!(skipped.is_empty());
    assert_eq!(18, remote.calls());
    let listed = thread.comments().list();
    assert!(listed.iter().all(|n| n.is_comment()));
    assert_eq!(remote.len(), listed.len());
    assert_eq!(listed.len(), thread.comments_by_id().len());
}

#[test]
fn expanded_in_place() {
    let Eighteen { remote, mut thread } = Eighteen::new();
    thread
        .comments_mut()
        .replace_more(&remote, &ReplaceMore::unbounded())
        .unwrap();

    let expected = ["v0", "v1"]
        .iter()
        .map(|s| s.to_string())
        .chain((0..Eighteen::GROUPS).flat_map(Eighteen::group))
        .collect::<Vec<_>>();
    assert_eq!(expected, render(thread.comments()));
}
