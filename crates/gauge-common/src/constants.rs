// Environment variable names and protocol limits shared by the runner.

/// Environment variables the host sets when launching a runner.
pub mod variables {
    /// Port the runner connects back to for the message exchange.
    pub const INTERNAL_PORT: &str = "GAUGE_INTERNAL_PORT";
    /// Root directory of the project under test.
    pub const PROJECT_ROOT: &str = "GAUGE_PROJECT_ROOT";
    /// Optional override of the host address to connect to.
    pub const RUNNER_HOST: &str = "GAUGE_RUNNER_HOST";
}

/// Host address used when `GAUGE_RUNNER_HOST` is not set.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Largest message body accepted from the wire (64 MiB).
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;
