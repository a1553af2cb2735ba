//! Parsing for the `failover:(uri1,uri2,...)?k=v&...` transport URI grammar
//! (and its `failover:uri1,uri2,...` shorthand with no options).

use std::fmt;
use std::str::FromStr;

use crate::failover::error::FailoverError;

/// The two schemes a failover endpoint may use. The core never dials
/// either; the scheme is carried through to whatever transport the
/// caller builds from the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Tcp,
    Ssl,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scheme::Tcp => "tcp",
            Scheme::Ssl => "ssl",
        })
    }
}

impl FromStr for Scheme {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tcp" => Ok(Scheme::Tcp),
            "ssl" => Ok(Scheme::Ssl),
            _ => Err(()),
        }
    }
}

/// A single broker endpoint: `scheme://host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = FailoverError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (scheme_str, rest) = value.split_once("://").ok_or_else(|| FailoverError::InvalidUri(value.to_string()))?;
        let scheme = Scheme::from_str(scheme_str).map_err(|_| FailoverError::InvalidUri(value.to_string()))?;
        let (host, port_str) = rest.rsplit_once(':').ok_or_else(|| FailoverError::InvalidUri(value.to_string()))?;
        if host.is_empty() {
            return Err(FailoverError::InvalidUri(value.to_string()));
        }
        let port: u16 = port_str.parse().map_err(|_| FailoverError::InvalidUri(value.to_string()))?;
        Ok(Endpoint { scheme, host: host.to_string(), port })
    }
}

/// The recognized `failover:` query options, with the defaults the
/// grammar specifies.
#[derive(Debug, Clone, PartialEq)]
pub struct FailoverOptions {
    pub initial_reconnect_delay: u64,
    pub max_reconnect_delay: u64,
    pub use_exponential_back_off: bool,
    pub back_off_multiplier: f64,
    /// `-1` means unlimited, `0` means never reconnect.
    pub max_reconnect_attempts: i64,
    /// If `> 0`, overrides `max_reconnect_attempts` for the first connect
    /// cycle only (before any successful connect has ever occurred).
    pub startup_max_reconnect_attempts: i64,
    pub randomize: bool,
}

impl Default for FailoverOptions {
    fn default() -> Self {
        FailoverOptions {
            initial_reconnect_delay: 10,
            max_reconnect_delay: 30_000,
            use_exponential_back_off: true,
            back_off_multiplier: 2.0,
            max_reconnect_attempts: -1,
            startup_max_reconnect_attempts: 0,
            randomize: true,
        }
    }
}

impl FailoverOptions {
    /// Applies one `key=value` query pair. Unrecognized keys are ignored
    /// (forward-compatible with broker-side options this crate doesn't
    /// model); a recognized key with a value that fails to parse is an
    /// error.
    fn apply(&mut self, key: &str, value: &str) -> Result<(), ()> {
        match key {
            "initialReconnectDelay" => self.initial_reconnect_delay = value.parse().map_err(|_| ())?,
            "maxReconnectDelay" => self.max_reconnect_delay = value.parse().map_err(|_| ())?,
            "useExponentialBackOff" => self.use_exponential_back_off = value.parse().map_err(|_| ())?,
            "backOffMultiplier" => self.back_off_multiplier = value.parse().map_err(|_| ())?,
            "maxReconnectAttempts" => self.max_reconnect_attempts = value.parse().map_err(|_| ())?,
            "startupMaxReconnectAttempts" => self.startup_max_reconnect_attempts = value.parse().map_err(|_| ())?,
            "randomize" => self.randomize = value.parse().map_err(|_| ())?,
            _ => {}
        }
        Ok(())
    }
}

/// A parsed `failover:` transport URI: the endpoint list plus options.
#[derive(Debug, Clone, PartialEq)]
pub struct FailoverUri {
    pub endpoints: Vec<Endpoint>,
    pub options: FailoverOptions,
}

/// Parses either `failover:(uri1,uri2,...)?k=v&...` or the shorthand
/// `failover:uri1,uri2,...` (which carries no options).
pub fn parse(input: &str) -> Result<FailoverUri, FailoverError> {
    let rest = input.strip_prefix("failover:").ok_or_else(|| FailoverError::InvalidUri(input.to_string()))?;

    let (endpoint_list, query) = if let Some(body) = rest.strip_prefix('(') {
        let close = body.find(')').ok_or_else(|| FailoverError::InvalidUri(input.to_string()))?;
        let endpoints_part = &body[..close];
        let query = body[close + 1..].strip_prefix('?').unwrap_or("");
        (endpoints_part, query)
    } else {
        (rest, "")
    };

    if endpoint_list.trim().is_empty() {
        return Err(FailoverError::InvalidUri(input.to_string()));
    }

    let endpoints = endpoint_list
        .split(',')
        .map(|piece| piece.trim().parse::<Endpoint>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut options = FailoverOptions::default();
    for pair in query.split('&').filter(|piece| !piece.is_empty()) {
        let (key, value) = pair.split_once('=').ok_or_else(|| FailoverError::InvalidUri(input.to_string()))?;
        options.apply(key, value).map_err(|_| FailoverError::InvalidUri(input.to_string()))?;
    }

    Ok(FailoverUri { endpoints, options })
}
