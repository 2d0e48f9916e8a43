use std::time::Duration;

/// Tuning knobs of the listener and of every connection it drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Bytes requested from the socket per read
    pub read_buffer_size: usize,
    /// Longest wait for the next bytes of a request before the connection is dropped
    pub read_timeout: Duration,
    /// Pending connection queue length passed to `listen`
    pub backlog: u32,
    /// Upper bound of concurrently served connections, unbounded when `None`
    pub max_connections: Option<usize>,
}

impl ConnectionConfig {
    pub const DEFAULT_READ_BUFFER_SIZE: usize = 2048;
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_BACKLOG: u32 = 1024;

    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size.max(1);
        self
    }

    #[must_use]
    pub fn read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    #[must_use]
    pub fn backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog;
        self
    }

    #[must_use]
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = Some(max_connections.max(1));
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: Self::DEFAULT_READ_BUFFER_SIZE,
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
            backlog: Self::DEFAULT_BACKLOG,
            max_connections: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.read_buffer_size, 2048);
        assert_eq!(config.read_timeout, Duration::from_secs(30));
        assert_eq!(config.backlog, 1024);
        assert_eq!(config.max_connections, None);
    }

    #[test]
    fn zero_sizes_are_clamped() {
        let config = ConnectionConfig::new().read_buffer_size(0).max_connections(0);
        assert_eq!(config.read_buffer_size, 1);
        assert_eq!(config.max_connections, Some(1));
    }
}
