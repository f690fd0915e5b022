/// Maximum number of characters kept from the user-agent header when the
/// caller does not supply a limit of its own.
pub const DEFAULT_USER_AGENT_MAX_LENGTH: usize = 1024;

/// Address substituted for the network peer when running offline.
pub const OFFLINE_IP_ADDRESS: &str = "127.0.0.1";

/// User agent substituted for the client when running offline.
pub const OFFLINE_USER_AGENT: &str = "offline";

/// Prefix for environment variables that override settings, joined to the
/// key path with `__` (e.g. `CLIENT_FINGERPRINT__USER_AGENT__MAX_LENGTH`).
pub const ENV_PREFIX: &str = "CLIENT_FINGERPRINT";
