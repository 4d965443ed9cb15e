// Copyright © 2022 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use serde::{Deserialize, Serialize};

use crate::{
    error,
    fetch::Sort,
    replace::{OnError, ReplaceMore, DEFAULT_LIMIT},
    Error,
};

/// User-facing settings for expanding comment threads.
///
/// Numbers are kept signed, so that nonsensical values can be reported
/// rather than rejected by the parser:
///
/// ```toml
/// limit = 32            # or "unbounded"
/// threshold = 0
/// skip-on-error = false
/// prune-skipped = false
/// sort = "confidence"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    #[serde(with = "limit")]
    pub limit: Option<i64>,
    pub threshold: i64,
    pub skip_on_error: bool,
    pub prune_skipped: bool,
    pub sort: Sort,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_LIMIT as i64),
            threshold: 0,
            skip_on_error: false,
            prune_skipped: false,
            sort: Sort::default(),
        }
    }
}

impl Config {
    pub fn from_toml(s: &str) -> Result<Self, error::Config> {
        Ok(toml::from_str(s)?)
    }

    /// Validate into options for [`crate::ForestMut::replace_more`].
    pub fn replace_more(&self) -> Result<ReplaceMore, Error> {
        let opts = ReplaceMore::try_new(self.limit, self.threshold)?;
        Ok(ReplaceMore {
            on_error: if self.skip_on_error {
                OnError::Skip
            } else {
                OnError::Abort
            },
            prune_skipped: self.prune_skipped,
            sort: self.sort,
            ..opts
        })
    }
}

impl ReplaceMore {
    /// Parse and validate a [`Config`] in one go.
    pub fn from_toml(s: &str) -> Result<Self, error::Config> {
        Ok(Config::from_toml(s)?.replace_more()?)
    }
}

impl TryFrom<&Config> for ReplaceMore {
    type Error = Error;

    fn try_from(cfg: &Config) -> Result<Self, Self::Error> {
        cfg.replace_more()
    }
}

mod limit {
    use std::{convert::TryFrom, fmt};

    use serde::{de, Deserializer, Serializer};

    const UNBOUNDED: &str = "unbounded";

    pub fn serialize<S>(limit: &Option<i64>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match limit {
            Some(n) => s.serialize_i64(*n),
            None => s.serialize_str(UNBOUNDED),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = Option<i64>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an integer or \"{}\"", UNBOUNDED)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Some(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(Some)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v == UNBOUNDED {
                    Ok(None)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        d.deserialize_any(Visitor)
    }
}
