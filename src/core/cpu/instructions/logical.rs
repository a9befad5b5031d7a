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
    // === Logical Instructions ===
    //
    // Register forms work on all 64 bits. Immediate forms zero-extend the
    // immediate.

    /// AND: Bitwise AND
    ///
    /// Format: and rd, rs, rt
    pub(crate) fn op_and(&mut self, instruction: Instruction) -> Result<()> {
        let result = self.reg(instruction.rs()) & self.reg(instruction.rt());
        self.set_reg(instruction.rd(), result);
        Ok(())
    }

    /// OR: Bitwise OR
    pub(crate) fn op_or(&mut self, instruction: Instruction) -> Result<()> {
        let result = self.reg(instruction.rs()) | self.reg(instruction.rt());
        self.set_reg(instruction.rd(), result);
        Ok(())
    }

    /// XOR: Bitwise XOR
    pub(crate) fn op_xor(&mut self, instruction: Instruction) -> Result<()> {
        let result = self.reg(instruction.rs()) ^ self.reg(instruction.rt());
        self.set_reg(instruction.rd(), result);
        Ok(())
    }

    /// NOR: Bitwise NOR
    pub(crate) fn op_nor(&mut self, instruction: Instruction) -> Result<()> {
        let result = !(self.reg(instruction.rs()) | self.reg(instruction.rt()));
        self.set_reg(instruction.rd(), result);
        Ok(())
    }

    /// ANDI: AND Immediate
    ///
    /// Format: andi rt, rs, imm
    pub(crate) fn op_andi(&mut self, instruction: Instruction) -> Result<()> {
        let result = self.reg(instruction.rs()) & instruction.imm_zext();
        self.set_reg(instruction.rt(), result);
        Ok(())
    }

    /// ORI: OR Immediate
    pub(crate) fn op_ori(&mut self, instruction: Instruction) -> Result<()> {
        let result = self.reg(instruction.rs()) | instruction.imm_zext();
        self.set_reg(instruction.rt(), result);
        Ok(())
    }

    /// XORI: XOR Immediate
    pub(crate) fn op_xori(&mut self, instruction: Instruction) -> Result<()> {
        let result = self.reg(instruction.rs()) ^ instruction.imm_zext();
        self.set_reg(instruction.rt(), result);
        Ok(())
    }

    /// LUI: Load Upper Immediate
    ///
    /// Format: lui rt, imm
    /// Operation: rt = sign_extend(imm << 16)
    pub(crate) fn op_lui(&mut self, instruction: Instruction) -> Result<()> {
        self.set_reg_sext32(instruction.rt(), (instruction.imm() as u32) << 16);
        Ok(())
    }
}
