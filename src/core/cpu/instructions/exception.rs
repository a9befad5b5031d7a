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
    // === Exception Instructions ===

    /// SYSCALL: System Call
    ///
    /// Format: syscall
    ///
    /// Raises a Syscall exception. The 20-bit code field is left for the
    /// guest handler to decode from the instruction word.
    pub(crate) fn op_syscall(&mut self, _instruction: Instruction) -> Result<()> {
        self.raise_if(true, ExceptionCode::Syscall);
        Ok(())
    }

    /// BREAK: Breakpoint
    pub(crate) fn op_break(&mut self, _instruction: Instruction) -> Result<()> {
        self.raise_if(true, ExceptionCode::Breakpoint);
        Ok(())
    }

    // Register traps compare rs with rt; immediate traps compare rs with
    // the sign-extended immediate. Unsigned forms compare the 64-bit values
    // unsigned.

    pub(crate) fn op_tge(&mut self, instruction: Instruction) -> Result<()> {
        let (a, b) = self.trap_operands(instruction);
        self.raise_if(a as i64 >= b as i64, ExceptionCode::Trap);
        Ok(())
    }

    pub(crate) fn op_tgeu(&mut self, instruction: Instruction) -> Result<()> {
        let (a, b) = self.trap_operands(instruction);
        self.raise_if(a >= b, ExceptionCode::Trap);
        Ok(())
    }

    pub(crate) fn op_tlt(&mut self, instruction: Instruction) -> Result<()> {
        let (a, b) = self.trap_operands(instruction);
        self.raise_if((a as i64) < b as i64, ExceptionCode::Trap);
        Ok(())
    }

    pub(crate) fn op_tltu(&mut self, instruction: Instruction) -> Result<()> {
        let (a, b) = self.trap_operands(instruction);
        self.raise_if(a < b, ExceptionCode::Trap);
        Ok(())
    }

    pub(crate) fn op_teq(&mut self, instruction: Instruction) -> Result<()> {
        let (a, b) = self.trap_operands(instruction);
        self.raise_if(a == b, ExceptionCode::Trap);
        Ok(())
    }

    pub(crate) fn op_tne(&mut self, instruction: Instruction) -> Result<()> {
        let (a, b) = self.trap_operands(instruction);
        self.raise_if(a != b, ExceptionCode::Trap);
        Ok(())
    }

    pub(crate) fn op_tgei(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs());
        self.raise_if(a as i64 >= instruction.imm_sext() as i64, ExceptionCode::Trap);
        Ok(())
    }

    pub(crate) fn op_tgeiu(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs());
        self.raise_if(a >= instruction.imm_sext(), ExceptionCode::Trap);
        Ok(())
    }

    pub(crate) fn op_tlti(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs());
        self.raise_if((a as i64) < instruction.imm_sext() as i64, ExceptionCode::Trap);
        Ok(())
    }

    pub(crate) fn op_tltiu(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs());
        self.raise_if(a < instruction.imm_sext(), ExceptionCode::Trap);
        Ok(())
    }

    pub(crate) fn op_teqi(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs());
        self.raise_if(a == instruction.imm_sext(), ExceptionCode::Trap);
        Ok(())
    }

    pub(crate) fn op_tnei(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs());
        self.raise_if(a != instruction.imm_sext(), ExceptionCode::Trap);
        Ok(())
    }

    fn trap_operands(&self, instruction: Instruction) -> (u64, u64) {
        (self.reg(instruction.rs()), self.reg(instruction.rt()))
    }
}
