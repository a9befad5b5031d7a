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
    // === Jump Instructions ===

    /// Queue the delay slot and move PC to `target`
    fn jump(&mut self, target: u64) {
        self.regs.delay_slot = Some(self.regs.pc);
        self.regs.pc = target;
    }

    /// Target of J/JAL: the 256 MiB region of the delay slot, with the low
    /// 28 bits taken from the instruction
    fn region_target(&self, instruction: Instruction) -> u64 {
        (self.regs.pc & 0xFFFF_FFFF_F000_0000) | ((instruction.target() as u64) << 2)
    }

    /// J: Jump
    ///
    /// Format: j target
    ///
    /// # Arguments
    ///
    /// * `instruction` - The J instruction
    ///
    /// # Returns
    ///
    /// Ok(()) on success
    pub(crate) fn op_j(&mut self, instruction: Instruction) -> Result<()> {
        let target = self.region_target(instruction);
        self.jump(target);
        Ok(())
    }

    /// JAL: Jump And Link
    ///
    /// Format: jal target
    /// Operation: $ra = PC + 8; jump
    pub(crate) fn op_jal(&mut self, instruction: Instruction) -> Result<()> {
        let target = self.region_target(instruction);
        self.set_reg(RA, self.regs.pc.wrapping_add(4));
        self.jump(target);
        Ok(())
    }

    /// JR: Jump Register
    ///
    /// Format: jr rs
    pub(crate) fn op_jr(&mut self, instruction: Instruction) -> Result<()> {
        let target = self.reg(instruction.rs());
        self.jump(target);
        Ok(())
    }

    /// JALR: Jump And Link Register
    ///
    /// Format: jalr rd, rs
    ///
    /// The target is read before rd is written, so `jalr $t0, $t0` jumps to
    /// the old value.
    pub(crate) fn op_jalr(&mut self, instruction: Instruction) -> Result<()> {
        let target = self.reg(instruction.rs());
        self.set_reg(instruction.rd(), self.regs.pc.wrapping_add(4));
        self.jump(target);
        Ok(())
    }
}
