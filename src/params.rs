//! Named environment parameters.
//!
//! Every size/count knob of a run is read here, once, at startup. A value that
//! is present but not a number aborts the run: silently falling back to the
//! default would make two runs look comparable when they are not.

use std::env::{self, VarError};
use std::fmt::Display;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{BenchError, Result};

/// A named parameter with its documented default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub default: &'static str,
}

/// Repeat count for fixed-repetition timing.
pub const LOOP_CNT: Param = Param {
    name: "ENV_LOOP_CNT",
    default: "10",
};

/// Number of elements in each pushed list.
pub const LIST_SIZE: Param = Param {
    name: "ENV_LIST_SIZE",
    default: "1",
};

/// Length of the byte string written by `Set`.
pub const BYTE_SZ: Param = Param {
    name: "ENV_BYTE_SZ",
    default: "1",
};

/// Nested fields written per repetition of the nested operation.
pub const DKEY_CNT: Param = Param {
    name: "ENV_DKEY_CNT",
    default: "1",
};

/// Looks `param` up, substituting its default when absent.
pub fn resolve<F>(lookup: F, param: &Param) -> Result<String>
where
    F: Fn(&str) -> Result<Option<String>>,
{
    Ok(lookup(param.name)?.unwrap_or_else(|| param.default.to_string()))
}

/// Reads `name` from the process environment.
///
/// A variable that is set to something other than UTF-8 is an error, not an
/// absent value.
pub fn env_value(name: &str) -> Result<Option<String>> {
    match env::var(name) {
        Ok(v) => Ok(Some(v)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(BenchError::config(
            name,
            &raw.to_string_lossy(),
            "not valid UTF-8",
        )),
    }
}

pub fn coerce<T>(param: &Param, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| BenchError::config(param.name, raw, e))
}

/// All resolved parameters of one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BenchParams {
    pub loop_cnt: u64,
    pub list_size: u64,
    pub byte_size: u64,
    pub dkey_cnt: u64,
}

impl Default for BenchParams {
    fn default() -> Self {
        Self {
            loop_cnt: 10,
            list_size: 1,
            byte_size: 1,
            dkey_cnt: 1,
        }
    }
}

impl BenchParams {
    pub fn from_env() -> Result<Self> {
        Self::try_from_lookup(env_value)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::try_from_lookup(|name| Ok(lookup(name)))
    }

    /// Like [`BenchParams::from_lookup`], for lookups that can fail.
    pub fn try_from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<Option<String>>,
    {
        let get = |p: &Param| -> Result<u64> {
            let raw = resolve(&lookup, p)?;
            let v = coerce(p, &raw)?;
            debug!(name = p.name, value = v, "resolved parameter");
            Ok(v)
        };

        Ok(Self {
            loop_cnt: get(&LOOP_CNT)?,
            list_size: get(&LIST_SIZE)?,
            byte_size: get(&BYTE_SZ)?,
            dkey_cnt: get(&DKEY_CNT)?,
        })
    }
}
