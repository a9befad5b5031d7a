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

use super::super::cop0::Cop0;
use super::super::decode::Instruction;
use super::super::CPU;
use super::access::Size;
use crate::core::error::Result;
use crate::core::memory::Bus;

impl CPU {
    // === Load Instructions ===

    /// Shared body of the aligned loads
    ///
    /// `extend` turns the zero-extended memory value into the register
    /// value.
    fn load(
        &mut self,
        instruction: Instruction,
        size: Size,
        bus: &Bus,
        extend: fn(u64) -> u64,
    ) -> Result<()> {
        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        if let Some(value) = self.read_sized(vaddr, size, bus)? {
            self.set_reg(instruction.rt(), extend(value));
        }
        Ok(())
    }

    /// LB: Load Byte (sign-extended)
    ///
    /// Format: lb rt, offset(rs)
    pub(crate) fn op_lb(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.load(instruction, Size::Byte, bus, |v| v as u8 as i8 as i64 as u64)
    }

    /// LBU: Load Byte Unsigned
    ///
    /// Format: lbu rt, offset(rs)
    pub(crate) fn op_lbu(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.load(instruction, Size::Byte, bus, |v| v)
    }

    /// LH: Load Halfword (sign-extended)
    ///
    /// Format: lh rt, offset(rs)
    ///
    /// Raises AddressErrorLoad if the address is not 2-byte aligned.
    pub(crate) fn op_lh(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.load(instruction, Size::Half, bus, |v| v as u16 as i16 as i64 as u64)
    }

    /// LHU: Load Halfword Unsigned
    pub(crate) fn op_lhu(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.load(instruction, Size::Half, bus, |v| v)
    }

    /// LW: Load Word (sign-extended to 64 bits)
    ///
    /// Format: lw rt, offset(rs)
    ///
    /// Raises AddressErrorLoad if the address is not 4-byte aligned.
    pub(crate) fn op_lw(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.load(instruction, Size::Word, bus, |v| v as u32 as i32 as i64 as u64)
    }

    /// LWU: Load Word Unsigned
    pub(crate) fn op_lwu(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.load(instruction, Size::Word, bus, |v| v)
    }

    /// LD: Load Doubleword
    ///
    /// Format: ld rt, offset(rs)
    pub(crate) fn op_ld(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.load(instruction, Size::Double, bus, |v| v)
    }

    /// LWL: Load Word Left
    ///
    /// Loads the bytes from the effective address up to the end of its word
    /// into the most significant end of rt. Paired with LWR for unaligned
    /// word loads.
    ///
    /// Format: lwl rt, offset(rs)
    pub(crate) fn op_lwl(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        let Some(word) = self.read_word_unaligned(vaddr, bus)? else {
            return Ok(());
        };

        let shift = self.unaligned_index(vaddr, Size::Word) * 8;
        let rt = instruction.rt();
        let keep = (1u32 << shift) - 1;
        let merged = (word << shift) | (self.reg(rt) as u32 & keep);
        self.set_reg_sext32(rt, merged);
        Ok(())
    }

    /// LWR: Load Word Right
    ///
    /// Loads the bytes from the start of the word up to the effective
    /// address into the least significant end of rt. The result is only
    /// sign-extended when the whole word was loaded.
    ///
    /// Format: lwr rt, offset(rs)
    pub(crate) fn op_lwr(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        let Some(word) = self.read_word_unaligned(vaddr, bus)? else {
            return Ok(());
        };

        let shift = (3 - self.unaligned_index(vaddr, Size::Word)) * 8;
        let rt = instruction.rt();
        let old = self.reg(rt);
        let keep = !(0xFFFF_FFFFu32 >> shift);
        let merged = (old as u32 & keep) | (word >> shift);

        if shift == 0 {
            self.set_reg_sext32(rt, merged);
        } else {
            self.set_reg(rt, (old & 0xFFFF_FFFF_0000_0000) | merged as u64);
        }
        Ok(())
    }

    /// LDL: Load Doubleword Left
    pub(crate) fn op_ldl(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        let Some(double) = self.read_double_unaligned(vaddr, bus)? else {
            return Ok(());
        };

        let shift = self.unaligned_index(vaddr, Size::Double) * 8;
        let rt = instruction.rt();
        let keep = (1u64 << shift) - 1;
        self.set_reg(rt, (double << shift) | (self.reg(rt) & keep));
        Ok(())
    }

    /// LDR: Load Doubleword Right
    pub(crate) fn op_ldr(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        let Some(double) = self.read_double_unaligned(vaddr, bus)? else {
            return Ok(());
        };

        let shift = (7 - self.unaligned_index(vaddr, Size::Double)) * 8;
        let rt = instruction.rt();
        let keep = !(u64::MAX >> shift);
        self.set_reg(rt, (self.reg(rt) & keep) | (double >> shift));
        Ok(())
    }

    /// LL: Load Linked
    ///
    /// LW that also sets the LL bit and records the physical address in
    /// LLAddr for a following SC.
    pub(crate) fn op_ll(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.load_linked(instruction, Size::Word, bus)
    }

    /// LLD: Load Linked Doubleword
    pub(crate) fn op_lld(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.load_linked(instruction, Size::Double, bus)
    }

    fn load_linked(&mut self, instruction: Instruction, size: Size, bus: &Bus) -> Result<()> {
        let vaddr = self.effective_address(instruction.rs(), instruction.imm_sext());
        let Some(value) = self.read_sized(vaddr, size, bus)? else {
            return Ok(());
        };

        let value = match size {
            Size::Word => value as u32 as i32 as i64 as u64,
            _ => value,
        };
        self.set_reg(instruction.rt(), value);

        let paddr = self.cop0.translate(vaddr)?;
        self.cop0.set_reg(Cop0::LL_ADDR, paddr >> 4);
        self.regs.ll_bit = true;
        Ok(())
    }
}
