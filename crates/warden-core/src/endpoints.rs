//! Provider endpoint paths.

/// Exchange credentials for tokens.
pub const LOGIN_PATH: &str = "/auth/login";

/// Exchange a refresh token for a new pair.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Profile of the bearer.
pub const PROFILE_PATH: &str = "/auth/me";

/// End the session on the provider side.
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Paths that must go out without a bearer credential: they are how a
/// credential is obtained in the first place.
pub const NO_AUTH_PATHS: [&str; 2] = [LOGIN_PATH, REFRESH_PATH];
