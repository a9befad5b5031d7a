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

//! Shared sized-access path for loads and stores
//!
//! The bus only moves 32-bit words. Bytes and halfwords are extracted from
//! or merged into the containing word; the lane is picked from Config.BE
//! and the low address bits. Doublewords are two word accesses.
//!
//! ```text
//! byte lane shift (bits)      offset: 0   1   2   3
//!   big-endian                       24  16   8   0
//!   little-endian                     0   8  16  24
//! ```
//!
//! Every accessor returns `Ok(None)` / `Ok(false)` when it raised an
//! address error, in which case the caller must not touch registers.

use super::super::exception::Exception;
use super::super::CPU;
use crate::core::error::Result;
use crate::core::memory::Bus;

/// Access width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Size {
    Byte = 1,
    Half = 2,
    Word = 4,
    Double = 8,
}

impl CPU {
    /// Effective address `rs + sign_extend(imm)`
    #[inline(always)]
    pub(crate) fn effective_address(&self, base: u8, imm_sext: u64) -> u64 {
        self.reg(base).wrapping_add(imm_sext)
    }

    /// Check alignment and translate a data address
    fn translate_data(&mut self, vaddr: u64, size: Size, store: bool) -> Result<Option<u64>> {
        if vaddr & (size as u64 - 1) != 0 {
            log::debug!(
                "Misaligned {:?} {} at 0x{:016X}",
                size,
                if store { "store" } else { "load" },
                vaddr
            );
            self.raise(Exception::address_error(store, vaddr));
            return Ok(None);
        }
        Ok(Some(self.cop0.translate(vaddr)?))
    }

    /// Bit position of a sub-word value inside its bus word
    #[inline(always)]
    pub(crate) fn lane_shift(&self, paddr: u64, size: Size) -> u32 {
        let offset = (paddr & 0x3) as u32;
        if self.cop0.config().be() {
            (4 - size as u32 - offset) * 8
        } else {
            offset * 8
        }
    }

    /// Read a sub-word or word value, zero-extended
    pub(crate) fn read_sized(&mut self, vaddr: u64, size: Size, bus: &Bus) -> Result<Option<u64>> {
        let Some(paddr) = self.translate_data(vaddr, size, false)? else {
            return Ok(None);
        };

        let value = match size {
            Size::Double => self.read_double_physical(paddr, bus)?,
            Size::Word => bus.read_word(paddr)? as u64,
            Size::Byte | Size::Half => {
                let word = bus.read_word(paddr & !0x3)?;
                let mask = (1u32 << (size as u32 * 8)) - 1;
                ((word >> self.lane_shift(paddr, size)) & mask) as u64
            }
        };
        Ok(Some(value))
    }

    /// Write a sub-word or word value
    ///
    /// Sub-word stores are read-modify-write on the containing word.
    pub(crate) fn write_sized(
        &mut self,
        vaddr: u64,
        size: Size,
        value: u64,
        bus: &Bus,
    ) -> Result<bool> {
        let Some(paddr) = self.translate_data(vaddr, size, true)? else {
            return Ok(false);
        };

        match size {
            Size::Double => self.write_double_physical(paddr, value, bus)?,
            Size::Word => bus.write_word(paddr, value as u32)?,
            Size::Byte | Size::Half => {
                let aligned = paddr & !0x3;
                let shift = self.lane_shift(paddr, size);
                let mask = ((1u32 << (size as u32 * 8)) - 1) << shift;
                let word = bus.read_word(aligned)?;
                let merged = (word & !mask) | (((value as u32) << shift) & mask);
                bus.write_word(aligned, merged)?;
            }
        }
        Ok(true)
    }

    /// Read the aligned word containing `vaddr`, for LWL/LWR/SWL/SWR
    pub(crate) fn read_word_unaligned(&mut self, vaddr: u64, bus: &Bus) -> Result<Option<u32>> {
        Ok(self
            .read_sized(vaddr & !0x3, Size::Word, bus)?
            .map(|v| v as u32))
    }

    /// Read the aligned doubleword containing `vaddr`, for LDL/LDR/SDL/SDR
    pub(crate) fn read_double_unaligned(&mut self, vaddr: u64, bus: &Bus) -> Result<Option<u64>> {
        self.read_sized(vaddr & !0x7, Size::Double, bus)
    }

    /// Byte index of `vaddr` within its word/doubleword, counted from the
    /// most significant byte of the register image
    #[inline(always)]
    pub(crate) fn unaligned_index(&self, vaddr: u64, size: Size) -> u32 {
        let last = size as u64 - 1;
        let offset = vaddr & last;
        if self.cop0.config().be() {
            offset as u32
        } else {
            (last - offset) as u32
        }
    }

    fn read_double_physical(&self, paddr: u64, bus: &Bus) -> Result<u64> {
        let first = bus.read_word(paddr)? as u64;
        let second = bus.read_word(paddr + 4)? as u64;
        Ok(if self.cop0.config().be() {
            (first << 32) | second
        } else {
            (second << 32) | first
        })
    }

    fn write_double_physical(&self, paddr: u64, value: u64, bus: &Bus) -> Result<()> {
        let (first, second) = if self.cop0.config().be() {
            ((value >> 32) as u32, value as u32)
        } else {
            (value as u32, (value >> 32) as u32)
        };
        bus.write_word(paddr, first)?;
        bus.write_word(paddr + 4, second)
    }
}
