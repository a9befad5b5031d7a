// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Emulator configuration
//!
//! Settings are read from a TOML file. Missing keys fall back to their
//! defaults, so an empty file is a valid configuration.
//!
//! ```toml
//! rdram_size = 8388608
//! clock_divider = 7
//! big_endian = true
//! halt_on_unimplemented = false
//! snapshot_interval = 100000
//! trace_limit = 0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{EmulatorError, Result};

/// Default RDRAM size (8 MiB, expansion pak installed)
pub const DEFAULT_RDRAM_SIZE: usize = 8 * 1024 * 1024;

/// Runtime configuration for the CPU core and bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// RDRAM size in bytes
    pub rdram_size: usize,

    /// Config.EC value applied by the cold reset
    pub clock_divider: u8,

    /// Config.BE value applied by the cold reset
    pub big_endian: bool,

    /// Stop the run loop on the first unimplemented instruction
    pub halt_on_unimplemented: bool,

    /// Cycles between published CPU snapshots
    pub snapshot_interval: u64,

    /// Maximum number of traced instructions (0 = unlimited)
    pub trace_limit: u64,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            rdram_size: DEFAULT_RDRAM_SIZE,
            clock_divider: 7,
            big_endian: true,
            halt_on_unimplemented: false,
            snapshot_interval: 100_000,
            trace_limit: 0,
        }
    }
}

impl EmulatorConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Example
    ///
    /// ```
    /// use n64rx::core::config::EmulatorConfig;
    ///
    /// let config = EmulatorConfig::from_toml_str("clock_divider = 3").unwrap();
    /// assert_eq!(config.clock_divider, 3);
    /// assert!(config.big_endian);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EmulatorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text =
            toml::to_string_pretty(self).map_err(|e| EmulatorError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Check value ranges the memory map and CP0 depend on
    pub(crate) fn validate(&self) -> Result<()> {
        if self.rdram_size == 0 || self.rdram_size % 4 != 0 {
            return Err(EmulatorError::Config(format!(
                "rdram_size must be a non-zero multiple of 4, got {}",
                self.rdram_size
            )));
        }
        if self.rdram_size > 0x03F0_0000 {
            return Err(EmulatorError::Config(format!(
                "rdram_size 0x{:X} overlaps the RDRAM register space",
                self.rdram_size
            )));
        }
        if self.clock_divider > 7 {
            return Err(EmulatorError::Config(format!(
                "clock_divider must fit in 3 bits, got {}",
                self.clock_divider
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = EmulatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EmulatorConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            EmulatorConfig::from_toml_str("big_endian = false\ntrace_limit = 50").unwrap();
        assert!(!config.big_endian);
        assert_eq!(config.trace_limit, 50);
        assert_eq!(config.rdram_size, DEFAULT_RDRAM_SIZE);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(EmulatorConfig::from_toml_str("rdram_size = 3").is_err());
        assert!(EmulatorConfig::from_toml_str("clock_divider = 8").is_err());
        assert!(EmulatorConfig::from_toml_str("rdram_size = \"big\"").is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rdram_size = 4194304").unwrap();
        let config = EmulatorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.rdram_size, 4 * 1024 * 1024);

        let out = tempfile::NamedTempFile::new().unwrap();
        config.save_to_file(out.path()).unwrap();
        assert_eq!(EmulatorConfig::from_file(out.path()).unwrap(), config);
    }
}
