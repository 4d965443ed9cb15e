// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::convert::TryFrom;

use comment_forest::{error, Config, Error, OnError, ReplaceMore, Sort, DEFAULT_LIMIT};
use pretty_assertions::assert_eq;
use test_helpers::roundtrip;

#[test]
fn defaults() {
    let cfg = Config::from_toml("").unwrap();
    assert_eq!(Config::default(), cfg);

    let opts = cfg.replace_more().unwrap();
    assert_eq!(Some(DEFAULT_LIMIT), opts.limit);
    assert_eq!(0, opts.threshold);
    assert_eq!(OnError::Abort, opts.on_error);
    assert!(!opts.prune_skipped);
    assert_eq!(Sort::Confidence, opts.sort);
}

#[test]
fn all_fields() {
    let cfg = Config::from_toml(
        r#"
        limit = 10
        threshold = 5
        skip-on-error = true
        prune-skipped = true
        sort = "qa"
        "#,
    )
    .unwrap();
    assert_eq!(
        Config {
            limit: Some(10),
            threshold: 5,
            skip_on_error: true,
            prune_skipped: true,
            sort: Sort::Qa,
        },
        cfg
    );

    let opts = ReplaceMore::try_from(&cfg).unwrap();
    assert_eq!(Some(10), opts.limit);
    assert_eq!(5, opts.threshold);
    assert_eq!(OnError::Skip, opts.on_error);
    assert!(opts.prune_skipped);
    assert_eq!(Sort::Qa, opts.sort);
}

#[test]
fn unbounded() {
    let opts = ReplaceMore::from_toml(r#"limit = "unbounded""#).unwrap();
    assert_eq!(None, opts.limit);
}

#[test]
fn negative_limit() {
    let cfg = Config::from_toml("limit = -1").unwrap();
    assert_matches!(cfg.replace_more(), Err(Error::InvalidLimit(-1)));
    assert_matches!(
        ReplaceMore::from_toml("limit = -1"),
        Err(error::Config::Invalid(Error::InvalidLimit(-1)))
    );
}

#[test]
fn negative_threshold() {
    assert_matches!(
        ReplaceMore::from_toml("threshold = -3"),
        Err(error::Config::Invalid(Error::InvalidThreshold(-3)))
    );
}

#[test]
fn malformed() {
    assert_matches!(
        Config::from_toml(r#"limit = "lots""#),
        Err(error::Config::Toml(_))
    );
    assert_matches!(
        Config::from_toml(r#"sort = "best""#),
        Err(error::Config::Toml(_))
    );
    assert_matches!(Config::from_toml("limit = 1.5"), Err(error::Config::Toml(_)));
}

#[test]
fn sort_names() {
    for sort in [
        Sort::Confidence,
        Sort::Top,
        Sort::New,
        Sort::Controversial,
        Sort::Old,
        Sort::Qa,
    ] {
        roundtrip::str(sort);
        roundtrip::json(sort);
    }
    assert_matches!(
        "best".parse::<Sort>(),
        Err(error::Parse::UnknownSort(s)) if s == "best"
    );
}

#[test]
fn toml_roundtrip() {
    roundtrip::toml(Config::default());
    roundtrip::toml(Config {
        limit: None,
        threshold: 3,
        skip_on_error: true,
        prune_skipped: false,
        sort: Sort::New,
    });
}
