// Copyright © 2022 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use std::env;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialise logging / tracing for a test binary.
///
/// Output is captured by the test harness. If `RUST_LOG` is not set, only
/// errors are shown. Calling this more than once is harmless.
pub fn init() {
    if env_logger::builder().is_test(true).try_init().is_ok() {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "error");
        }

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(true)
            .with_test_writer()
            .compact()
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting tracing default failed");
    }
}
