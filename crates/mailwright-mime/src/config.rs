//! Writer configuration.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Default length of generated multipart boundaries.
pub const DEFAULT_BOUNDARY_LENGTH: usize = 40;

/// Longest boundary allowed by RFC 2046.
pub const MAX_BOUNDARY_LENGTH: usize = 70;

/// Message writer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct WriterConfig {
    /// Length of generated multipart boundaries.
    pub boundary_length: usize,
    /// Seed for boundary generation. `None` draws from the OS.
    ///
    /// With a seed, the same input always produces the same bytes.
    pub seed: Option<u64>,
    /// Whether a top-level writer adds `MIME-Version: 1.0` when it is missing.
    pub mime_version: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            boundary_length: DEFAULT_BOUNDARY_LENGTH,
            seed: None,
            mime_version: true,
        }
    }
}

impl WriterConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> WriterConfigBuilder {
        WriterConfigBuilder::new()
    }

    /// Returns the random source for boundaries.
    pub(crate) fn rng(&self) -> StdRng {
        self.seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }

    /// Boundary length clamped to what RFC 2046 allows.
    pub(crate) fn clamped_boundary_length(&self) -> usize {
        self.boundary_length.clamp(1, MAX_BOUNDARY_LENGTH)
    }
}

/// Builder for writer configuration.
#[derive(Debug, Clone, Default)]
pub struct WriterConfigBuilder {
    config: WriterConfig,
}

impl WriterConfigBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the length of generated boundaries (1 to 70).
    #[must_use]
    pub const fn boundary_length(mut self, length: usize) -> Self {
        self.config.boundary_length = length;
        self
    }

    /// Makes boundary generation deterministic.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Sets whether `MIME-Version: 1.0` is added to top-level headers.
    #[must_use]
    pub const fn mime_version(mut self, enabled: bool) -> Self {
        self.config.mime_version = enabled;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> WriterConfig {
        WriterConfig {
            boundary_length: self.config.clamped_boundary_length(),
            ..self.config
        }
    }
}
