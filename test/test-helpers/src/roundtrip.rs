// Copyright © 2022 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use pretty_assertions::assert_eq;

pub fn json<A>(a: A)
where
    for<'de> A: Debug + PartialEq + serde::Serialize + serde::Deserialize<'de>,
{
    assert_eq!(
        a,
        serde_json::from_str(&serde_json::to_string(&a).unwrap()).unwrap()
    )
}

pub fn toml<A>(a: A)
where
    for<'de> A: Debug + PartialEq + serde::Serialize + serde::Deserialize<'de>,
{
    assert_eq!(a, toml::from_str(&toml::to_string(&a).unwrap()).unwrap())
}

pub fn str<A>(a: A)
where
    A: Debug + PartialEq + Display + FromStr,
    <A as FromStr>::Err: Debug,
{
    assert_eq!(a, a.to_string().parse().unwrap())
}
