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
use crate::core::error::Result;

impl CPU {
    // === Shift Instructions ===

    /// SLL: Shift Left Logical
    ///
    /// Format: sll rd, rt, sa
    /// Operation: rd = sign_extend((rt << sa)[31:0])
    ///
    /// `sll r0, r0, 0` is the canonical NOP.
    pub(crate) fn op_sll(&mut self, instruction: Instruction) -> Result<()> {
        let result = (self.reg(instruction.rt()) as u32) << instruction.sa();
        self.set_reg_sext32(instruction.rd(), result);
        Ok(())
    }

    /// SRL: Shift Right Logical (32-bit)
    pub(crate) fn op_srl(&mut self, instruction: Instruction) -> Result<()> {
        let result = (self.reg(instruction.rt()) as u32) >> instruction.sa();
        self.set_reg_sext32(instruction.rd(), result);
        Ok(())
    }

    /// SRA: Shift Right Arithmetic (32-bit)
    pub(crate) fn op_sra(&mut self, instruction: Instruction) -> Result<()> {
        let result = (self.reg(instruction.rt()) as i32) >> instruction.sa();
        self.set_reg_sext32(instruction.rd(), result as u32);
        Ok(())
    }

    /// SLLV: Shift Left Logical Variable
    ///
    /// Only the low 5 bits of rs are used as the shift amount.
    pub(crate) fn op_sllv(&mut self, instruction: Instruction) -> Result<()> {
        let sa = (self.reg(instruction.rs()) & 0x1F) as u32;
        let result = (self.reg(instruction.rt()) as u32) << sa;
        self.set_reg_sext32(instruction.rd(), result);
        Ok(())
    }

    /// SRLV: Shift Right Logical Variable
    pub(crate) fn op_srlv(&mut self, instruction: Instruction) -> Result<()> {
        let sa = (self.reg(instruction.rs()) & 0x1F) as u32;
        let result = (self.reg(instruction.rt()) as u32) >> sa;
        self.set_reg_sext32(instruction.rd(), result);
        Ok(())
    }

    /// SRAV: Shift Right Arithmetic Variable
    pub(crate) fn op_srav(&mut self, instruction: Instruction) -> Result<()> {
        let sa = (self.reg(instruction.rs()) & 0x1F) as u32;
        let result = (self.reg(instruction.rt()) as i32) >> sa;
        self.set_reg_sext32(instruction.rd(), result as u32);
        Ok(())
    }

    // 64-bit shifts. The *32 forms add 32 to the 5-bit shift amount and the
    // variable forms use the low 6 bits of rs.

    pub(crate) fn op_dsll(&mut self, instruction: Instruction) -> Result<()> {
        self.dshift_left(instruction, instruction.sa())
    }

    pub(crate) fn op_dsll32(&mut self, instruction: Instruction) -> Result<()> {
        self.dshift_left(instruction, instruction.sa() + 32)
    }

    pub(crate) fn op_dsllv(&mut self, instruction: Instruction) -> Result<()> {
        let sa = (self.reg(instruction.rs()) & 0x3F) as u32;
        self.dshift_left(instruction, sa)
    }

    pub(crate) fn op_dsrl(&mut self, instruction: Instruction) -> Result<()> {
        self.dshift_right_logical(instruction, instruction.sa())
    }

    pub(crate) fn op_dsrl32(&mut self, instruction: Instruction) -> Result<()> {
        self.dshift_right_logical(instruction, instruction.sa() + 32)
    }

    pub(crate) fn op_dsrlv(&mut self, instruction: Instruction) -> Result<()> {
        let sa = (self.reg(instruction.rs()) & 0x3F) as u32;
        self.dshift_right_logical(instruction, sa)
    }

    pub(crate) fn op_dsra(&mut self, instruction: Instruction) -> Result<()> {
        self.dshift_right_arithmetic(instruction, instruction.sa())
    }

    pub(crate) fn op_dsra32(&mut self, instruction: Instruction) -> Result<()> {
        self.dshift_right_arithmetic(instruction, instruction.sa() + 32)
    }

    pub(crate) fn op_dsrav(&mut self, instruction: Instruction) -> Result<()> {
        let sa = (self.reg(instruction.rs()) & 0x3F) as u32;
        self.dshift_right_arithmetic(instruction, sa)
    }

    fn dshift_left(&mut self, instruction: Instruction, sa: u32) -> Result<()> {
        let result = self.reg(instruction.rt()) << sa;
        self.set_reg(instruction.rd(), result);
        Ok(())
    }

    fn dshift_right_logical(&mut self, instruction: Instruction, sa: u32) -> Result<()> {
        let result = self.reg(instruction.rt()) >> sa;
        self.set_reg(instruction.rd(), result);
        Ok(())
    }

    fn dshift_right_arithmetic(&mut self, instruction: Instruction, sa: u32) -> Result<()> {
        let result = (self.reg(instruction.rt()) as i64) >> sa;
        self.set_reg(instruction.rd(), result as u64);
        Ok(())
    }
}
