use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{route::Route, Client};

/// A `major.minor[.patch]` version as reported by OctoPrint.
///
/// Versions order by major, then minor, then patch, with a missing patch
/// ordering before any present one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    /// Major version.
    pub major: u32,

    /// Minor version.
    pub minor: u32,

    /// Patch version, if the server reported one.
    pub patch: Option<u32>,
}

/// A string that is not a `major.minor[.patch]` version.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid version string {0:?}")]
pub struct ParseVersionError(String);

impl Version {
    /// Create a new version.
    pub fn new(major: u32, minor: u32, patch: Option<u32>) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = |part: &str| part.parse::<u32>().map_err(|_| ParseVersionError(s.to_owned()));

        let parts: Vec<&str> = s.trim().split('.').collect();
        match parts.as_slice() {
            [major, minor] => Ok(Self::new(number(major)?, number(minor)?, None)),
            [major, minor, patch] => Ok(Self::new(number(major)?, number(minor)?, Some(number(patch)?))),
            _ => Err(ParseVersionError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Version {
    type Error = ParseVersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

/// Server and api version, from `GET api/version`.
///
/// Decoding checks that the `text` field reads `OctoPrint <server>`, which
/// tells a genuine OctoPrint instance apart from anything else answering on
/// that path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VersionResponseWire", into = "VersionResponseWire")]
pub struct VersionResponse {
    /// Api version.
    pub api: Version,

    /// Server version.
    pub server: Version,
}

/// The `text` field of a version response disagrees with its server version.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("version text {text:?} does not match server version {server}")]
pub struct VersionTextMismatch {
    text: String,
    server: Version,
}

impl VersionResponse {
    /// Server version including the `OctoPrint` prefix, as sent in the
    /// `text` field.
    pub fn text(&self) -> String {
        format!("OctoPrint {}", self.server)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct VersionResponseWire {
    api: Version,
    server: Version,
    text: String,
}

impl TryFrom<VersionResponseWire> for VersionResponse {
    type Error = VersionTextMismatch;

    fn try_from(wire: VersionResponseWire) -> Result<Self, Self::Error> {
        let response = Self {
            api: wire.api,
            server: wire.server,
        };
        if response.text() != wire.text {
            return Err(VersionTextMismatch {
                text: wire.text,
                server: wire.server,
            });
        }
        Ok(response)
    }
}

impl From<VersionResponse> for VersionResponseWire {
    fn from(response: VersionResponse) -> Self {
        Self {
            text: response.text(),
            api: response.api,
            server: response.server,
        }
    }
}

impl Client {
    /// Retrieve the server and api version.
    pub async fn version(&self) -> crate::Result<VersionResponse> {
        self.get_json(Route::ApiVersion).await
    }
}
