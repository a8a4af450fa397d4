//! Authentication settings that shape the published API description.

use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

/// Routes that never require credentials.
pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &["/health", "/ready", "/openapi.json", "/docs"];

/// How clients authenticate against the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// No authentication
    #[default]
    Open,
    /// API key pair sent as HTTP Basic credentials
    Basic,
    /// OIDC/JWT bearer tokens
    Sso,
    /// Either bearer tokens or API keys
    Hybrid,
}

impl AuthMode {
    /// Parses an `AUTH_MODE` value case-insensitively.
    ///
    /// Blank input means `Open`. Unknown values are logged and also mean
    /// `Open`, since no security scheme can be derived from them.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "open" => Self::Open,
            "basic" => Self::Basic,
            "sso" => Self::Sso,
            "hybrid" => Self::Hybrid,
            other => {
                warn!("Unknown auth mode '{}', treating as open", other);
                Self::Open
            }
        }
    }

    /// Whether bearer tokens are accepted.
    pub fn accepts_bearer(self) -> bool {
        matches!(self, Self::Sso | Self::Hybrid)
    }

    /// Whether Basic credentials are accepted.
    pub fn accepts_basic(self) -> bool {
        matches!(self, Self::Basic | Self::Hybrid)
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Basic => "basic",
            Self::Sso => "sso",
            Self::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// Builds the public route set from the defaults plus a comma-separated list.
pub fn public_routes(extra: Option<&str>) -> BTreeSet<String> {
    DEFAULT_PUBLIC_ROUTES
        .iter()
        .map(|route| (*route).to_string())
        .chain(
            extra
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|route| !route.is_empty())
                .map(str::to_string),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_mode() {
        assert_eq!(AuthMode::parse(""), AuthMode::Open);
        assert_eq!(AuthMode::parse("BASIC"), AuthMode::Basic);
        assert_eq!(AuthMode::parse(" sso "), AuthMode::Sso);
        assert_eq!(AuthMode::parse("Hybrid"), AuthMode::Hybrid);
        assert_eq!(AuthMode::parse("kerberos"), AuthMode::Open);
    }

    #[test]
    fn test_scheme_flags() {
        assert!(AuthMode::Hybrid.accepts_bearer() && AuthMode::Hybrid.accepts_basic());
        assert!(!AuthMode::Open.accepts_bearer() && !AuthMode::Open.accepts_basic());
        assert!(AuthMode::Sso.accepts_bearer() && !AuthMode::Sso.accepts_basic());
    }

    #[test]
    fn test_public_routes_merges_extras() {
        let routes = public_routes(Some("/metrics, ,/v1/status"));
        assert!(routes.contains("/health"));
        assert!(routes.contains("/metrics"));
        assert!(routes.contains("/v1/status"));
        assert_eq!(routes.len(), DEFAULT_PUBLIC_ROUTES.len() + 2);
    }
}
