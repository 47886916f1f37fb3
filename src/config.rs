//! Codec configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COMPRESS_EXTENSION_HEADERS, DEFAULT_ELIDE_UDP_CHECKSUM};

/// Compression policy applied by a [`LowpanCodec`](crate::engine::LowpanCodec).
///
/// Only affects what the compressor emits. The decompressor accepts every
/// legal encoding regardless of configuration. Missing fields deserialize to
/// their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowpanConfig {
    /// Elide UDP checksums. Only safe when the link layer protects integrity.
    pub elide_udp_checksum: bool,
    /// NHC-compress hop-by-hop, routing and destination options headers.
    pub compress_extension_headers: bool,
}

impl Default for LowpanConfig {
    fn default() -> Self {
        Self {
            elide_udp_checksum: DEFAULT_ELIDE_UDP_CHECKSUM,
            compress_extension_headers: DEFAULT_COMPRESS_EXTENSION_HEADERS,
        }
    }
}

impl LowpanConfig {
    pub fn with_elide_udp_checksum(mut self, elide: bool) -> Self {
        self.elide_udp_checksum = elide;
        self
    }

    pub fn with_compress_extension_headers(mut self, compress: bool) -> Self {
        self.compress_extension_headers = compress;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_checksum_and_compress_extensions() {
        let config = LowpanConfig::default();
        assert!(!config.elide_udp_checksum);
        assert!(config.compress_extension_headers);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: LowpanConfig = serde_json::from_str(r#"{"elide_udp_checksum": true}"#).unwrap();
        assert_eq!(
            config,
            LowpanConfig::default().with_elide_udp_checksum(true)
        );

        let config: LowpanConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LowpanConfig::default());
    }
}
