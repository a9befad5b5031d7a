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

//! Memory-mapped device interface
//!
//! Peripherals plug into the bus through [`IODevice`]. The bus only moves
//! 32-bit words, so a device implements word reads and writes at
//! zero-based offsets and declares the physical range it occupies.
//!
//! # Example
//!
//! ```
//! use n64rx::core::memory::IODevice;
//! use n64rx::core::error::Result;
//!
//! struct Latch {
//!     value: u32,
//! }
//!
//! impl IODevice for Latch {
//!     fn address_range(&self) -> (u64, u64) {
//!         (0x0500_0000, 0x0500_0003)
//!     }
//!
//!     fn read_register(&self, _offset: u32) -> Result<u32> {
//!         Ok(self.value)
//!     }
//!
//!     fn write_register(&mut self, _offset: u32, value: u32) -> Result<()> {
//!         self.value = value;
//!         Ok(())
//!     }
//! }
//! ```

use crate::core::error::{EmulatorError, Result};

/// Trait for memory-mapped I/O devices
///
/// The bus subtracts the device base address before calling the register
/// methods. For a device at `0x0440_0000`, an access to `0x0440_0008`
/// arrives as offset `0x08`.
///
/// Devices are shared with the bus as `Rc<RefCell<D>>`, so they do not need
/// to be `Send` or `Sync`.
pub trait IODevice {
    /// Physical address range (inclusive)
    fn address_range(&self) -> (u64, u64);

    /// Check if this device contains the given physical address
    fn contains(&self, addr: u64) -> bool {
        let (start, end) = self.address_range();
        addr >= start && addr <= end
    }

    /// Read a 32-bit register at a word-aligned offset
    fn read_register(&self, offset: u32) -> Result<u32>;

    /// Write a 32-bit register at a word-aligned offset
    fn write_register(&mut self, offset: u32, value: u32) -> Result<()>;

    /// Device name for logging
    fn name(&self) -> &str {
        "Unknown Device"
    }
}

/// A bank of plain read/write 32-bit registers
///
/// Stands in for peripherals whose behaviour lives outside the CPU core
/// (the RCP interfaces, SP memory, PIF RAM). Reads return the last value
/// written.
#[derive(Debug, Clone)]
pub struct RegisterBlock {
    name: String,
    base: u64,
    registers: Vec<u32>,
}

impl RegisterBlock {
    /// Create a zero-filled block of `count` registers at `base`
    pub fn new(name: impl Into<String>, base: u64, count: usize) -> Self {
        Self {
            name: name.into(),
            base,
            registers: vec![0; count],
        }
    }

    /// Create a block sized to hold `bytes` bytes
    pub fn with_bytes(name: impl Into<String>, base: u64, bytes: usize) -> Self {
        Self::new(name, base, bytes.div_ceil(4))
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    /// Register value by index (0 for out-of-range indices)
    pub fn register(&self, index: usize) -> u32 {
        self.registers.get(index).copied().unwrap_or(0)
    }

    pub fn set_register(&mut self, index: usize, value: u32) {
        if let Some(reg) = self.registers.get_mut(index) {
            *reg = value;
        }
    }

    /// Fill the block from a big-endian byte image
    ///
    /// Bytes beyond the block size are ignored; a trailing partial word is
    /// zero-padded.
    pub fn load_bytes(&mut self, data: &[u8]) {
        for (reg, chunk) in self.registers.iter_mut().zip(data.chunks(4)) {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            *reg = u32::from_be_bytes(word);
        }
    }

    fn index(&self, offset: u32) -> Result<usize> {
        let index = (offset / 4) as usize;
        if index < self.registers.len() {
            Ok(index)
        } else {
            Err(EmulatorError::UnmappedAddress {
                address: self.base + offset as u64,
            })
        }
    }
}

impl IODevice for RegisterBlock {
    fn address_range(&self) -> (u64, u64) {
        (self.base, self.base + (self.registers.len() as u64 * 4) - 1)
    }

    fn read_register(&self, offset: u32) -> Result<u32> {
        let index = self.index(offset)?;
        Ok(self.registers[index])
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        let index = self.index(offset)?;
        self.registers[index] = value;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
