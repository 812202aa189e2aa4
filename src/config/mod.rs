//! Configuration files for the projector.
//!
//! TOML understands very few types, so quantities with units, such as
//! `"100 mm"`, must be written as strings in the TOML source. These strings
//! are then parsed into the relevant `uom` type by the helpers in this module.

pub mod projection;

pub use projection::{read_config_file, Config};

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't read config file `{}`: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("angles: {0}")]
    Angles(String),

    #[error("offsets.{what} has {actual} entries, but there are {expected} angles")]
    OffsetCount { what: &'static str, expected: usize, actual: usize },
}

fn parse_all<T, const N: usize>(items: &[String; N]) -> Result<[T; N], String>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    let parsed = items
        .iter()
        .map(|s| s.parse::<T>().map_err(|e| format!("`{s}`: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    parsed.try_into().map_err(|_| format!("expected {N} values"))
}

pub(crate) fn deserialize_uom<'d, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<T>()
     .map_err(|e| de::Error::custom(format!("`{s}`: {e}")))
}

pub(crate) fn deserialize_uom_array<'d, D, T, const N: usize>(deserializer: D) -> Result<[T; N], D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: Display,
    [String; N]: Deserialize<'d>,
{
    let items = <[String; N]>::deserialize(deserializer)?;
    parse_all(&items).map_err(de::Error::custom)
}

pub(crate) fn deserialize_uom_vec_opt<'d, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    Option::<Vec<String>>::deserialize(deserializer)?
        .map(|items| items
             .iter()
             .map(|s| s.parse::<T>().map_err(|e| format!("`{s}`: {e}")))
             .collect::<Result<Vec<_>, _>>())
        .transpose()
        .map_err(de::Error::custom)
}

/// One value for all angles, or one value per angle
#[derive(Clone, Debug, PartialEq)]
pub enum PerAngle<T> {
    All(T),
    Each(Vec<T>),
}

impl<T: Clone> PerAngle<T> {
    /// One value for each of `n_angles`
    pub fn broadcast(&self, what: &'static str, n_angles: usize) -> Result<Vec<T>, ConfigError> {
        match self {
            Self::All(x) => Ok(vec![x.clone(); n_angles]),
            Self::Each(xs) if xs.len() == n_angles => Ok(xs.clone()),
            Self::Each(xs) => Err(ConfigError::OffsetCount { what, expected: n_angles, actual: xs.len() }),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

pub(crate) fn deserialize_uom_per_angle<'d, D, T, const N: usize>(deserializer: D) -> Result<PerAngle<[T; N]>, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: Display,
    [String; N]: Deserialize<'d>,
{
    Ok(match OneOrMany::<[String; N]>::deserialize(deserializer)? {
        OneOrMany::One(items) => PerAngle::All(parse_all(&items).map_err(de::Error::custom)?),
        OneOrMany::Many(rows) => PerAngle::Each(rows
            .iter()
            .map(parse_all)
            .collect::<Result<_, _>>()
            .map_err(de::Error::custom)?),
    })
}
