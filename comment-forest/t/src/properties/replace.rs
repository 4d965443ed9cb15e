// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use comment_forest::{mem::Remote, Expansion, Parent, Reason, ReplaceMore};
use proptest::prelude::*;

use crate::{
    gen::{gen_breadth_only, gen_comments, gen_shape},
    helpers::{count_comments, render, submission, thread_of},
};

proptest! {
    #[test]
    fn unbounded_expands_everything(
        comments in gen_comments(40),
        shape in gen_breadth_only(),
        batch in prop::option::of(1usize..4),
    ) {
        let remote = Remote::new(submission(), comments);
        let remote = match batch {
            Some(n) => remote.with_batch(n),
            None => remote,
        };
        let mut thread = thread_of(&remote, shape);

        let skipped = thread
            .comments_mut()
            .replace_more(&remote, &ReplaceMore::unbounded())
            .unwrap();

        assert!(skipped.is_empty());
        assert!(thread.comments().more().is_empty());
        assert_eq!(remote.len(), thread.comments().list().len());
        assert_eq!(remote.len(), thread.comments_by_id().len());
        for (id, comment) in thread.comments_by_id().iter() {
            assert_eq!(id, comment.id());
            assert_eq!(&submission(), comment.submission());
            match comment.parent() {
                Parent::Root => assert!(comment.data().parent.as_comment().is_none()),
                Parent::Comment(ix) => {
                    let parent = thread.node(ix).and_then(|n| n.as_comment()).unwrap();
                    assert_eq!(comment.data().parent.as_comment(), Some(parent.id()));
                }
            }
        }
    }

    #[test]
    fn zero_limit_is_a_noop(
        comments in gen_comments(40),
        shape in gen_shape(),
    ) {
        let remote = Remote::new(submission(), comments);
        let mut thread = thread_of(&remote, shape);
        let before = render(thread.comments());
        let placeholders = thread.comments().more().len();

        let skipped = thread
            .comments_mut()
            .replace_more(&remote, &ReplaceMore::default().limit(0))
            .unwrap();

        assert_eq!(placeholders, skipped.len());
        assert_eq!(0, remote.calls());
        assert_eq!(before, render(thread.comments()));
    }

    #[test]
    fn accounting(
        comments in gen_comments(40),
        shape in gen_shape(),
        limit in 0usize..6,
        threshold in 0u32..4,
    ) {
        let remote = Remote::new(submission(), comments);
        let mut thread = thread_of(&remote, shape);
        let before = count_comments(thread.comments());

        let skipped = thread
            .comments_mut()
            .replace_more(&remote, &ReplaceMore::default().limit(limit).threshold(threshold))
            .unwrap();

        assert!(remote.calls() <= limit);
        assert_eq!(before + remote.served(), count_comments(thread.comments()));
        assert_eq!(thread.comments().more().len(), skipped.len());
        for s in &skipped {
            match s.reason {
                Reason::Threshold => assert!(s.count < threshold),
                Reason::Limit => assert_eq!(limit, remote.calls()),
                Reason::Unfetchable => assert!(thread.more(s.more).unwrap().is_sentinel()),
                Reason::Repeated | Reason::Failed(_) => unreachable!(),
            }
            assert_eq!(
                Some(Expansion::Pending),
                thread.more(s.more).map(|m| m.state())
            );
        }
    }

    #[test]
    fn heaviest_goes_first(
        comments in gen_comments(40),
        shape in gen_shape(),
    ) {
        let remote = Remote::new(submission(), comments);
        let mut thread = thread_of(&remote, shape);
        let heaviest = {
            let mores = thread.comments().more();
            let max = mores.iter().filter(|m| !m.is_sentinel()).map(|m| m.count()).max();
            max.and_then(|max| {
                mores
                    .iter()
                    .find(|m| !m.is_sentinel() && m.count() == max)
                    .map(|m| m.id())
            })
        };

        thread
            .comments_mut()
            .replace_more(&remote, &ReplaceMore::default().limit(1))
            .unwrap();

        match heaviest {
            Some(ix) => {
                assert_eq!(1, remote.calls());
                assert_eq!(Some(Expansion::Expanded), thread.more(ix).map(|m| m.state()));
            },
            None => assert_eq!(0, remote.calls()),
        }
    }
}
