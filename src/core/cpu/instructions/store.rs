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

use super::super::decode::Instruction;
use super::super::CPU;
use super::access::Size;
use crate::core::error::Result;
use crate::core::memory::Bus;

impl CPU {
    // === Store Instructions ===

    fn store(&mut self, instruction: Instruction, size: Size, bus: &Bus) -> Result<()> {
        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        let value = self.reg(instruction.rt());
        self.write_sized(vaddr, size, value, bus)?;
        Ok(())
    }

    /// SB: Store Byte
    ///
    /// Format: sb rt, offset(rs)
    /// Operation: memory[rs + offset] = rt[7:0]
    pub(crate) fn op_sb(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.store(instruction, Size::Byte, bus)
    }

    /// SH: Store Halfword
    ///
    /// Raises AddressErrorStore if the address is not 2-byte aligned.
    pub(crate) fn op_sh(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.store(instruction, Size::Half, bus)
    }

    /// SW: Store Word
    ///
    /// Raises AddressErrorStore if the address is not 4-byte aligned.
    pub(crate) fn op_sw(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.store(instruction, Size::Word, bus)
    }

    /// SD: Store Doubleword
    pub(crate) fn op_sd(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.store(instruction, Size::Double, bus)
    }

    /// SWL: Store Word Left
    ///
    /// Stores the most significant bytes of rt from the effective address
    /// up to the end of its word.
    pub(crate) fn op_swl(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        let Some(word) = self.read_word_unaligned(vaddr, bus)? else {
            return Ok(());
        };

        let shift = self.unaligned_index(vaddr, Size::Word) * 8;
        let rt = self.reg(instruction.rt()) as u32;
        let keep = !(0xFFFF_FFFFu32 >> shift);
        let merged = (word & keep) | (rt >> shift);
        self.write_sized(vaddr & !0x3, Size::Word, merged as u64, bus)?;
        Ok(())
    }

    /// SWR: Store Word Right
    ///
    /// Stores the least significant bytes of rt from the start of the word
    /// up to the effective address.
    pub(crate) fn op_swr(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        let Some(word) = self.read_word_unaligned(vaddr, bus)? else {
            return Ok(());
        };

        let shift = (3 - self.unaligned_index(vaddr, Size::Word)) * 8;
        let rt = self.reg(instruction.rt()) as u32;
        let keep = !(0xFFFF_FFFFu32 << shift);
        let merged = (word & keep) | (rt << shift);
        self.write_sized(vaddr & !0x3, Size::Word, merged as u64, bus)?;
        Ok(())
    }

    /// SDL: Store Doubleword Left
    pub(crate) fn op_sdl(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        let Some(double) = self.read_double_unaligned(vaddr, bus)? else {
            return Ok(());
        };

        let shift = self.unaligned_index(vaddr, Size::Double) * 8;
        let rt = self.reg(instruction.rt());
        let keep = !(u64::MAX >> shift);
        let merged = (double & keep) | (rt >> shift);
        self.write_sized(vaddr & !0x7, Size::Double, merged, bus)?;
        Ok(())
    }

    /// SDR: Store Doubleword Right
    pub(crate) fn op_sdr(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        let Some(double) = self.read_double_unaligned(vaddr, bus)? else {
            return Ok(());
        };

        let shift = (7 - self.unaligned_index(vaddr, Size::Double)) * 8;
        let rt = self.reg(instruction.rt());
        let keep = !(u64::MAX << shift);
        let merged = (double & keep) | (rt << shift);
        self.write_sized(vaddr & !0x7, Size::Double, merged, bus)?;
        Ok(())
    }

    /// SC: Store Conditional
    ///
    /// Stores only if the LL bit is still set, then writes 1 (stored) or
    /// 0 (failed) to rt.
    pub(crate) fn op_sc(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.store_conditional(instruction, Size::Word, bus)
    }

    /// SCD: Store Conditional Doubleword
    pub(crate) fn op_scd(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.store_conditional(instruction, Size::Double, bus)
    }

    fn store_conditional(&mut self, instruction: Instruction, size: Size, bus: &Bus) -> Result<()> {
        let rt = instruction.rt();
        if !self.regs.ll_bit {
            self.set_reg(rt, 0);
            return Ok(());
        }

        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        if self.write_sized(vaddr, size, self.reg(rt), bus)? {
            self.set_reg(rt, 1);
        }
        Ok(())
    }
}
