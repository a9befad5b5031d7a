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
use super::super::registers::RA;
use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    // === Branch Instructions ===
    //
    // When a branch executes, PC already points at its delay slot. A taken
    // branch queues that address as the delay slot and moves PC to the
    // target; the delay-slot instruction then runs before the target.

    /// Conditionally branch by the instruction's 16-bit offset
    ///
    /// # Arguments
    ///
    /// * `condition` - Whether the branch is taken
    /// * `instruction` - The branch instruction (supplies the offset)
    ///
    /// # Returns
    ///
    /// `true` if the branch was taken
    pub(crate) fn branch(&mut self, condition: bool, instruction: Instruction) -> bool {
        if condition {
            let delay_slot = self.regs.pc;
            self.regs.delay_slot = Some(delay_slot);
            self.regs.pc = delay_slot.wrapping_add(instruction.imm_sext() << 2);
        }
        condition
    }

    /// Branch-likely variant of [`CPU::branch`]
    ///
    /// A branch-likely that is not taken nullifies its delay slot: PC skips
    /// past it without executing it.
    pub(crate) fn branch_likely(&mut self, condition: bool, instruction: Instruction) -> bool {
        let taken = self.branch(condition, instruction);
        if !taken {
            self.regs.pc = self.regs.pc.wrapping_add(4);
        }
        taken
    }

    /// Write the return address (the instruction after the delay slot) to $ra
    fn link(&mut self) {
        self.set_reg(RA, self.regs.pc.wrapping_add(4));
    }

    fn rs_signed(&self, instruction: Instruction) -> i64 {
        self.reg(instruction.rs()) as i64
    }

    /// BEQ: Branch on Equal
    ///
    /// Format: beq rs, rt, offset
    /// Operation: if (rs == rt) PC = PC + 4 + (sign_extend(offset) << 2)
    pub(crate) fn op_beq(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.reg(instruction.rs()) == self.reg(instruction.rt());
        self.branch(condition, instruction);
        Ok(())
    }

    /// BNE: Branch on Not Equal
    pub(crate) fn op_bne(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.reg(instruction.rs()) != self.reg(instruction.rt());
        self.branch(condition, instruction);
        Ok(())
    }

    /// BLEZ: Branch on Less Than or Equal to Zero
    pub(crate) fn op_blez(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) <= 0;
        self.branch(condition, instruction);
        Ok(())
    }

    /// BGTZ: Branch on Greater Than Zero
    pub(crate) fn op_bgtz(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) > 0;
        self.branch(condition, instruction);
        Ok(())
    }

    /// BEQL: Branch on Equal Likely
    ///
    /// Format: beql rs, rt, offset
    ///
    /// The delay slot only executes when the branch is taken.
    pub(crate) fn op_beql(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.reg(instruction.rs()) == self.reg(instruction.rt());
        self.branch_likely(condition, instruction);
        Ok(())
    }

    /// BNEL: Branch on Not Equal Likely
    pub(crate) fn op_bnel(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.reg(instruction.rs()) != self.reg(instruction.rt());
        self.branch_likely(condition, instruction);
        Ok(())
    }

    /// BLEZL: Branch on Less Than or Equal to Zero Likely
    pub(crate) fn op_blezl(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) <= 0;
        self.branch_likely(condition, instruction);
        Ok(())
    }

    /// BGTZL: Branch on Greater Than Zero Likely
    pub(crate) fn op_bgtzl(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) > 0;
        self.branch_likely(condition, instruction);
        Ok(())
    }

    // REGIMM branches

    pub(crate) fn op_bltz(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) < 0;
        self.branch(condition, instruction);
        Ok(())
    }

    pub(crate) fn op_bgez(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) >= 0;
        self.branch(condition, instruction);
        Ok(())
    }

    pub(crate) fn op_bltzl(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) < 0;
        self.branch_likely(condition, instruction);
        Ok(())
    }

    pub(crate) fn op_bgezl(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) >= 0;
        self.branch_likely(condition, instruction);
        Ok(())
    }

    /// BLTZAL: Branch on Less Than Zero And Link
    ///
    /// $ra is written whether or not the branch is taken. The condition is
    /// sampled first so `bltzal $ra, ...` tests the old value.
    pub(crate) fn op_bltzal(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) < 0;
        self.link();
        self.branch(condition, instruction);
        Ok(())
    }

    /// BGEZAL: Branch on Greater Than or Equal to Zero And Link
    ///
    /// `bgezal $zero, offset` is the usual "bal" idiom.
    pub(crate) fn op_bgezal(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) >= 0;
        self.link();
        self.branch(condition, instruction);
        Ok(())
    }

    pub(crate) fn op_bltzall(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) < 0;
        self.link();
        self.branch_likely(condition, instruction);
        Ok(())
    }

    pub(crate) fn op_bgezall(&mut self, instruction: Instruction) -> Result<()> {
        let condition = self.rs_signed(instruction) >= 0;
        self.link();
        self.branch_likely(condition, instruction);
        Ok(())
    }
}
