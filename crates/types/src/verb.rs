use std::{error::Error, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// HTTP verbs a resource may declare.
///
/// The declaration order of the variants is the order in which a resource's
/// verb sections are inspected when its definition is assembled.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

/// Where validated arguments are placed in an outgoing request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgsLocation {
    /// Arguments are encoded into the URL query string.
    Query,
    /// Arguments are encoded into the request body.
    Body,
}

impl Verb {
    /// Every verb, in declaration order.
    pub const ALL: [Verb; 7] = [
        Verb::Get,
        Verb::Post,
        Verb::Put,
        Verb::Patch,
        Verb::Delete,
        Verb::Head,
        Verb::Options,
    ];

    /// Upper-case wire name (e.g., `"GET"`), also the key used in service definitions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Title-cased name used when composing generated type names (e.g., `"Get"`).
    pub fn title(&self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::Post => "Post",
            Self::Put => "Put",
            Self::Patch => "Patch",
            Self::Delete => "Delete",
            Self::Head => "Head",
            Self::Options => "Options",
        }
    }

    /// Transport mapping for this verb.
    ///
    /// `None` means the verb has no defined placement for its arguments and
    /// any call through it is rejected.
    pub fn args_location(&self) -> Option<ArgsLocation> {
        match self {
            Self::Get | Self::Head | Self::Delete => Some(ArgsLocation::Query),
            Self::Post | Self::Put | Self::Patch => Some(ArgsLocation::Body),
            Self::Options => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ParseVerbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseVerbError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVerbError(String);

impl fmt::Display for ParseVerbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid http verb '{}'", self.0)
    }
}

impl Error for ParseVerbError {}
