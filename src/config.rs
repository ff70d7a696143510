/// Limits applied by the wire codec.
///
/// Use the builder methods to customize, or use [`Default`] for sensible defaults.
///
/// # Examples
///
/// ```rust
/// use postmark::Config;
///
/// let config = Config::default()
///     .with_max_message_size(64 * 1024);     // Reject frames above 64 KiB
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Largest encoded envelope (header and body) accepted by
    /// [`Envelope::from_bytes_with`](crate::Envelope::from_bytes_with) and produced by
    /// [`Envelope::to_bytes_with`](crate::Envelope::to_bytes_with).
    /// Default: 4 MiB
    pub max_message_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_message_size: 4 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Set the maximum encoded envelope size in bytes.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }
}
