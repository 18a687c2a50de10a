/// API path prefix
pub const API_PREFIX: &str = "/v1";

/// Default broadcast destination for wake datagrams, on the well-known
/// discard port
pub const DEFAULT_WAKE_BROADCAST: &str = "255.255.255.255:9";
