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

use super::io_device::IODevice;
use crate::core::error::{EmulatorError, Result};

/// Main system memory
///
/// Stored as 32-bit words since that is the only granularity the bus moves.
/// Sub-word accesses are synthesised by the CPU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rdram {
    words: Vec<u32>,
}

impl Rdram {
    /// Physical base address
    pub const BASE: u64 = 0x0000_0000;

    /// Create zeroed RDRAM of `size` bytes (rounded up to a whole word)
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size.div_ceil(4)],
        }
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.words.len() * 4
    }

    pub fn read(&self, offset: u32) -> Result<u32> {
        self.words
            .get((offset / 4) as usize)
            .copied()
            .ok_or(EmulatorError::UnmappedAddress {
                address: Self::BASE + offset as u64,
            })
    }

    pub fn write(&mut self, offset: u32, value: u32) -> Result<()> {
        match self.words.get_mut((offset / 4) as usize) {
            Some(word) => {
                *word = value;
                Ok(())
            }
            None => Err(EmulatorError::UnmappedAddress {
                address: Self::BASE + offset as u64,
            }),
        }
    }

    /// Copy a big-endian image into memory at `offset`
    ///
    /// `offset` must be word-aligned. A trailing partial word is zero-padded.
    pub fn load(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let capacity = self.size().saturating_sub(offset);
        if offset % 4 != 0 || data.len() > capacity {
            return Err(EmulatorError::ProgramTooLarge {
                size: data.len(),
                capacity,
            });
        }

        let first = offset / 4;
        for (i, chunk) in data.chunks(4).enumerate() {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            self.words[first + i] = u32::from_be_bytes(word);
        }
        log::debug!("Loaded {} bytes into RDRAM at 0x{:08X}", data.len(), offset);
        Ok(())
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Replace the whole contents (save-state restore)
    pub fn restore(&mut self, words: &[u32]) -> Result<()> {
        if words.len() != self.words.len() {
            return Err(EmulatorError::SaveState(format!(
                "RDRAM size mismatch: state has {} words, memory has {}",
                words.len(),
                self.words.len()
            )));
        }
        self.words.copy_from_slice(words);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }
}

impl IODevice for Rdram {
    fn address_range(&self) -> (u64, u64) {
        (Self::BASE, Self::BASE + self.size() as u64 - 1)
    }

    fn read_register(&self, offset: u32) -> Result<u32> {
        self.read(offset)
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        self.write(offset, value)
    }

    fn name(&self) -> &str {
        "RDRAM"
    }
}
