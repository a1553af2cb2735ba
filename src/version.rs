// ABOUTME: STOMP protocol version negotiation helpers
// ABOUTME: Wire versions are dotted strings, not primitive codes, so no num_enum mapping applies here

use std::fmt;
use std::str::FromStr;

/// A negotiated STOMP protocol wire version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StompVersion {
    V1_0,
    V1_1,
    V1_2,
}

impl StompVersion {
    pub const ALL: [StompVersion; 3] = [StompVersion::V1_0, StompVersion::V1_1, StompVersion::V1_2];

    /// Whether this version requires subscription-id matching on MESSAGE frames.
    pub fn requires_subscription_id(self) -> bool {
        self >= StompVersion::V1_1
    }

    /// Whether this version supports the NACK command.
    pub fn supports_nack(self) -> bool {
        self >= StompVersion::V1_1
    }

    /// Whether bare heart-beat markers are part of this version's wire format.
    pub fn supports_heartbeats(self) -> bool {
        self >= StompVersion::V1_1
    }
}

impl fmt::Display for StompVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StompVersion::V1_0 => "1.0",
            StompVersion::V1_1 => "1.1",
            StompVersion::V1_2 => "1.2",
        };
        f.write_str(s)
    }
}

impl FromStr for StompVersion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" => Ok(StompVersion::V1_0),
            "1.1" => Ok(StompVersion::V1_1),
            "1.2" => Ok(StompVersion::V1_2),
            _ => Err(()),
        }
    }
}

/// Parses a comma-separated `accept-version` header value, e.g. `"1.0,1.1,1.2"`.
pub fn parse_accept_versions(value: &str) -> Vec<StompVersion> {
    value
        .split(',')
        .filter_map(|token| token.trim().parse().ok())
        .collect()
}

/// Renders a list of versions back into an `accept-version` header value.
pub fn render_accept_versions(versions: &[StompVersion]) -> String {
    versions
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Picks the highest version common to both the client's offered list and the
/// server's `version` header. Returns `None` on empty intersection.
pub fn negotiate(offered: &[StompVersion], server_version: StompVersion) -> Option<StompVersion> {
    offered.iter().copied().find(|v| *v == server_version)
}
