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

//! Save state serialization
//!
//! A save state holds everything needed to resume execution: the CPU
//! register state and the contents of RDRAM. Memory-mapped register blocks
//! and the PIF ROM are not included.
//!
//! # Save State Format
//!
//! States are encoded with bincode's standard configuration. The version
//! number is checked on load and a mismatch is rejected.
//!
//! # Example
//!
//! ```no_run
//! use n64rx::core::save_state::SaveState;
//! use n64rx::core::system::System;
//!
//! let mut system = System::new().unwrap();
//! // ... run emulation ...
//!
//! let state = SaveState::from_system(&system);
//! state.save_to_file("save.state").unwrap();
//!
//! let loaded = SaveState::load_from_file("save.state").unwrap();
//! loaded.apply(&mut system).unwrap();
//! ```

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use bincode::{config, Decode, Encode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{EmulatorError, Result};
use crate::core::system::{CpuSnapshot, System};

/// Save state version for compatibility checking
///
/// Bump whenever the encoded layout changes.
pub const SAVE_STATE_VERSION: u32 = 2;

/// Complete emulator save state
#[derive(Serialize, Deserialize, Encode, Decode)]
pub struct SaveState {
    /// Version number for compatibility checking
    pub version: u32,

    pub metadata: SaveStateMetadata,

    /// CPU registers, CP0 and FCR31
    pub cpu: CpuSnapshot,

    /// RDRAM contents as words
    pub rdram: Vec<u32>,
}

/// When and at what point the state was taken
#[derive(Serialize, Deserialize, Encode, Decode)]
#[bincode(encode_bounds = "", decode_bounds = "")]
pub struct SaveStateMetadata {
    #[bincode(with_serde)]
    pub timestamp: DateTime<Utc>,

    /// Cycle count at save time
    pub cycles: u64,
}

impl SaveState {
    /// Capture the state of a running system
    pub fn from_system(system: &System) -> Self {
        let snapshot = system.snapshot();
        Self {
            version: SAVE_STATE_VERSION,
            metadata: SaveStateMetadata {
                timestamp: Utc::now(),
                cycles: snapshot.cycles,
            },
            cpu: snapshot,
            rdram: system.bus().rdram().borrow().words().to_vec(),
        }
    }

    /// Restore this state into `system`
    ///
    /// Fails without touching the CPU if the RDRAM size differs from the
    /// system's.
    pub fn apply(&self, system: &mut System) -> Result<()> {
        system.restore(&self.cpu, &self.rdram)?;
        log::info!(
            "Restored save state from {} (cycle {})",
            self.metadata.timestamp.to_rfc3339(),
            self.metadata.cycles
        );
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::encode_to_vec(self, config::standard())
            .map_err(|e| EmulatorError::SaveState(e.to_string()))
    }

    /// Decode a state and check its version
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (state, _): (SaveState, usize) =
            bincode::decode_from_slice(bytes, config::standard())
                .map_err(|e| EmulatorError::SaveState(e.to_string()))?;

        if state.version != SAVE_STATE_VERSION {
            return Err(EmulatorError::SaveState(format!(
                "Incompatible save state version: expected {}, got {}",
                SAVE_STATE_VERSION, state.version
            )));
        }

        Ok(state)
    }

    /// Save state to file
    ///
    /// # Arguments
    ///
    /// * `path` - Destination file, created or truncated
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let encoded = self.to_bytes()?;
        let mut file = File::create(path.as_ref())?;
        file.write_all(&encoded)?;
        log::info!(
            "Saved state to {} ({} bytes)",
            path.as_ref().display(),
            encoded.len()
        );
        Ok(())
    }

    /// Load state from file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be opened or read
    /// - Decoding fails
    /// - Version is incompatible
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::from_bytes(&buffer)
    }
}
