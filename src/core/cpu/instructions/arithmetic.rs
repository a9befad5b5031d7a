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
use super::super::exception::ExceptionCode;
use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    // === Arithmetic Instructions ===
    //
    // 32-bit forms operate on the low word of their operands and
    // sign-extend the result; D-forms use the full 64 bits.

    /// 32-bit add with overflow trap; rd is left unchanged on overflow
    fn add32_checked(&mut self, a: u64, b: u64, dest: u8) {
        match (a as i32).checked_add(b as i32) {
            Some(result) => self.set_reg_sext32(dest, result as u32),
            None => self.raise_if(true, ExceptionCode::Overflow),
        }
    }

    fn add64_checked(&mut self, a: u64, b: u64, dest: u8) {
        match (a as i64).checked_add(b as i64) {
            Some(result) => self.set_reg(dest, result as u64),
            None => self.raise_if(true, ExceptionCode::Overflow),
        }
    }

    /// ADD: Add (with overflow exception)
    ///
    /// Format: add rd, rs, rt
    /// Operation: rd = sign_extend((rs + rt)[31:0])
    pub(crate) fn op_add(&mut self, instruction: Instruction) -> Result<()> {
        let (a, b) = (self.reg(instruction.rs()), self.reg(instruction.rt()));
        self.add32_checked(a, b, instruction.rd());
        Ok(())
    }

    /// ADDU: Add Unsigned (no overflow exception)
    pub(crate) fn op_addu(&mut self, instruction: Instruction) -> Result<()> {
        let result =
            (self.reg(instruction.rs()) as u32).wrapping_add(self.reg(instruction.rt()) as u32);
        self.set_reg_sext32(instruction.rd(), result);
        Ok(())
    }

    /// SUB: Subtract (with overflow exception)
    pub(crate) fn op_sub(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs()) as i32;
        let b = self.reg(instruction.rt()) as i32;
        match a.checked_sub(b) {
            Some(result) => self.set_reg_sext32(instruction.rd(), result as u32),
            None => self.raise_if(true, ExceptionCode::Overflow),
        }
        Ok(())
    }

    /// SUBU: Subtract Unsigned
    pub(crate) fn op_subu(&mut self, instruction: Instruction) -> Result<()> {
        let result =
            (self.reg(instruction.rs()) as u32).wrapping_sub(self.reg(instruction.rt()) as u32);
        self.set_reg_sext32(instruction.rd(), result);
        Ok(())
    }

    /// ADDI: Add Immediate (with overflow exception)
    ///
    /// Format: addi rt, rs, imm
    pub(crate) fn op_addi(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs());
        self.add32_checked(a, instruction.imm_sext(), instruction.rt());
        Ok(())
    }

    /// ADDIU: Add Immediate Unsigned
    ///
    /// Despite the name the immediate is sign-extended; only the overflow
    /// trap is dropped.
    pub(crate) fn op_addiu(&mut self, instruction: Instruction) -> Result<()> {
        let result =
            (self.reg(instruction.rs()) as u32).wrapping_add(instruction.imm_sext() as u32);
        self.set_reg_sext32(instruction.rt(), result);
        Ok(())
    }

    /// DADD: Doubleword Add (with overflow exception)
    pub(crate) fn op_dadd(&mut self, instruction: Instruction) -> Result<()> {
        let (a, b) = (self.reg(instruction.rs()), self.reg(instruction.rt()));
        self.add64_checked(a, b, instruction.rd());
        Ok(())
    }

    /// DADDU: Doubleword Add Unsigned
    pub(crate) fn op_daddu(&mut self, instruction: Instruction) -> Result<()> {
        let result = self.reg(instruction.rs()).wrapping_add(self.reg(instruction.rt()));
        self.set_reg(instruction.rd(), result);
        Ok(())
    }

    /// DSUB: Doubleword Subtract (with overflow exception)
    pub(crate) fn op_dsub(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs()) as i64;
        let b = self.reg(instruction.rt()) as i64;
        match a.checked_sub(b) {
            Some(result) => self.set_reg(instruction.rd(), result as u64),
            None => self.raise_if(true, ExceptionCode::Overflow),
        }
        Ok(())
    }

    /// DSUBU: Doubleword Subtract Unsigned
    pub(crate) fn op_dsubu(&mut self, instruction: Instruction) -> Result<()> {
        let result = self.reg(instruction.rs()).wrapping_sub(self.reg(instruction.rt()));
        self.set_reg(instruction.rd(), result);
        Ok(())
    }

    /// DADDI: Doubleword Add Immediate (with overflow exception)
    pub(crate) fn op_daddi(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs());
        self.add64_checked(a, instruction.imm_sext(), instruction.rt());
        Ok(())
    }

    /// DADDIU: Doubleword Add Immediate Unsigned
    pub(crate) fn op_daddiu(&mut self, instruction: Instruction) -> Result<()> {
        let result = self.reg(instruction.rs()).wrapping_add(instruction.imm_sext());
        self.set_reg(instruction.rt(), result);
        Ok(())
    }

    /// SLT: Set on Less Than (signed, 64-bit compare)
    pub(crate) fn op_slt(&mut self, instruction: Instruction) -> Result<()> {
        let result = (self.reg(instruction.rs()) as i64) < (self.reg(instruction.rt()) as i64);
        self.set_reg(instruction.rd(), result as u64);
        Ok(())
    }

    /// SLTU: Set on Less Than Unsigned
    pub(crate) fn op_sltu(&mut self, instruction: Instruction) -> Result<()> {
        let result = self.reg(instruction.rs()) < self.reg(instruction.rt());
        self.set_reg(instruction.rd(), result as u64);
        Ok(())
    }

    /// SLTI: Set on Less Than Immediate (signed)
    pub(crate) fn op_slti(&mut self, instruction: Instruction) -> Result<()> {
        let result = (self.reg(instruction.rs()) as i64) < (instruction.imm_sext() as i64);
        self.set_reg(instruction.rt(), result as u64);
        Ok(())
    }

    /// SLTIU: Set on Less Than Immediate Unsigned
    ///
    /// The immediate is sign-extended, then compared unsigned.
    pub(crate) fn op_sltiu(&mut self, instruction: Instruction) -> Result<()> {
        let result = self.reg(instruction.rs()) < instruction.imm_sext();
        self.set_reg(instruction.rt(), result as u64);
        Ok(())
    }
}
