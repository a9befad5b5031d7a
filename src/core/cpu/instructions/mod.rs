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

//! CPU instruction implementations
//!
//! Handlers are organized by instruction type. [`DispatchTable`] maps the
//! normalized form of an instruction ([`Instruction::to_opcode`]) to its
//! handler, so each opcode / SPECIAL function / REGIMM code is registered
//! exactly once.

use std::collections::HashMap;

use super::coprocessor::Coprocessor;
use super::decode::{Instruction, OpCode, RegImm, Special};
use super::disassembler::Disassembler;
use super::exception::{Exception, ExceptionCode};
use super::CPU;
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::Bus;

// Instruction modules organized by type
mod access;
mod arithmetic;
mod branch;
mod exception;
mod jump;
mod load;
mod logical;
mod multiply;
mod shift;
mod store;

/// Instruction handler
pub(crate) type Handler = fn(&mut CPU, Instruction, &mut Bus) -> Result<()>;

/// Normalized instruction -> handler
pub(crate) struct DispatchTable {
    handlers: HashMap<Instruction, Handler>,
}

impl DispatchTable {
    fn insert(&mut self, key: impl Into<Instruction>, handler: Handler) {
        self.handlers.insert(key.into(), handler);
    }

    #[inline(always)]
    pub(crate) fn get(&self, instruction: Instruction) -> Option<Handler> {
        self.handlers.get(&instruction.to_opcode()).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Register every implemented primary, SPECIAL and REGIMM instruction
    pub(crate) fn build() -> Self {
        let mut t = Self {
            handlers: HashMap::with_capacity(160),
        };

        // Primary opcodes
        t.insert(OpCode::J, |cpu, i, _| cpu.op_j(i));
        t.insert(OpCode::Jal, |cpu, i, _| cpu.op_jal(i));
        t.insert(OpCode::Beq, |cpu, i, _| cpu.op_beq(i));
        t.insert(OpCode::Bne, |cpu, i, _| cpu.op_bne(i));
        t.insert(OpCode::Blez, |cpu, i, _| cpu.op_blez(i));
        t.insert(OpCode::Bgtz, |cpu, i, _| cpu.op_bgtz(i));
        t.insert(OpCode::Addi, |cpu, i, _| cpu.op_addi(i));
        t.insert(OpCode::Addiu, |cpu, i, _| cpu.op_addiu(i));
        t.insert(OpCode::Slti, |cpu, i, _| cpu.op_slti(i));
        t.insert(OpCode::Sltiu, |cpu, i, _| cpu.op_sltiu(i));
        t.insert(OpCode::Andi, |cpu, i, _| cpu.op_andi(i));
        t.insert(OpCode::Ori, |cpu, i, _| cpu.op_ori(i));
        t.insert(OpCode::Xori, |cpu, i, _| cpu.op_xori(i));
        t.insert(OpCode::Lui, |cpu, i, _| cpu.op_lui(i));
        t.insert(OpCode::Beql, |cpu, i, _| cpu.op_beql(i));
        t.insert(OpCode::Bnel, |cpu, i, _| cpu.op_bnel(i));
        t.insert(OpCode::Blezl, |cpu, i, _| cpu.op_blezl(i));
        t.insert(OpCode::Bgtzl, |cpu, i, _| cpu.op_bgtzl(i));
        t.insert(OpCode::Daddi, |cpu, i, _| cpu.op_daddi(i));
        t.insert(OpCode::Daddiu, |cpu, i, _| cpu.op_daddiu(i));
        t.insert(OpCode::Ldl, CPU::op_ldl);
        t.insert(OpCode::Ldr, CPU::op_ldr);
        t.insert(OpCode::Lb, CPU::op_lb);
        t.insert(OpCode::Lh, CPU::op_lh);
        t.insert(OpCode::Lwl, CPU::op_lwl);
        t.insert(OpCode::Lw, CPU::op_lw);
        t.insert(OpCode::Lbu, CPU::op_lbu);
        t.insert(OpCode::Lhu, CPU::op_lhu);
        t.insert(OpCode::Lwr, CPU::op_lwr);
        t.insert(OpCode::Lwu, CPU::op_lwu);
        t.insert(OpCode::Sb, CPU::op_sb);
        t.insert(OpCode::Sh, CPU::op_sh);
        t.insert(OpCode::Swl, CPU::op_swl);
        t.insert(OpCode::Sw, CPU::op_sw);
        t.insert(OpCode::Sdl, CPU::op_sdl);
        t.insert(OpCode::Sdr, CPU::op_sdr);
        t.insert(OpCode::Swr, CPU::op_swr);
        t.insert(OpCode::Cache, |cpu, i, _| cpu.op_cache(i));
        t.insert(OpCode::Ll, CPU::op_ll);
        t.insert(OpCode::Lld, CPU::op_lld);
        t.insert(OpCode::Ld, CPU::op_ld);
        t.insert(OpCode::Sc, CPU::op_sc);
        t.insert(OpCode::Scd, CPU::op_scd);
        t.insert(OpCode::Sd, CPU::op_sd);

        // SPECIAL
        t.insert(Special::Sll, |cpu, i, _| cpu.op_sll(i));
        t.insert(Special::Srl, |cpu, i, _| cpu.op_srl(i));
        t.insert(Special::Sra, |cpu, i, _| cpu.op_sra(i));
        t.insert(Special::Sllv, |cpu, i, _| cpu.op_sllv(i));
        t.insert(Special::Srlv, |cpu, i, _| cpu.op_srlv(i));
        t.insert(Special::Srav, |cpu, i, _| cpu.op_srav(i));
        t.insert(Special::Jr, |cpu, i, _| cpu.op_jr(i));
        t.insert(Special::Jalr, |cpu, i, _| cpu.op_jalr(i));
        t.insert(Special::Syscall, |cpu, i, _| cpu.op_syscall(i));
        t.insert(Special::Break, |cpu, i, _| cpu.op_break(i));
        t.insert(Special::Sync, |cpu, i, _| cpu.op_sync(i));
        t.insert(Special::Mfhi, |cpu, i, _| cpu.op_mfhi(i));
        t.insert(Special::Mthi, |cpu, i, _| cpu.op_mthi(i));
        t.insert(Special::Mflo, |cpu, i, _| cpu.op_mflo(i));
        t.insert(Special::Mtlo, |cpu, i, _| cpu.op_mtlo(i));
        t.insert(Special::Dsllv, |cpu, i, _| cpu.op_dsllv(i));
        t.insert(Special::Dsrlv, |cpu, i, _| cpu.op_dsrlv(i));
        t.insert(Special::Dsrav, |cpu, i, _| cpu.op_dsrav(i));
        t.insert(Special::Mult, |cpu, i, _| cpu.op_mult(i));
        t.insert(Special::Multu, |cpu, i, _| cpu.op_multu(i));
        t.insert(Special::Div, |cpu, i, _| cpu.op_div(i));
        t.insert(Special::Divu, |cpu, i, _| cpu.op_divu(i));
        t.insert(Special::Dmult, |cpu, i, _| cpu.op_dmult(i));
        t.insert(Special::Dmultu, |cpu, i, _| cpu.op_dmultu(i));
        t.insert(Special::Ddiv, |cpu, i, _| cpu.op_ddiv(i));
        t.insert(Special::Ddivu, |cpu, i, _| cpu.op_ddivu(i));
        t.insert(Special::Add, |cpu, i, _| cpu.op_add(i));
        t.insert(Special::Addu, |cpu, i, _| cpu.op_addu(i));
        t.insert(Special::Sub, |cpu, i, _| cpu.op_sub(i));
        t.insert(Special::Subu, |cpu, i, _| cpu.op_subu(i));
        t.insert(Special::And, |cpu, i, _| cpu.op_and(i));
        t.insert(Special::Or, |cpu, i, _| cpu.op_or(i));
        t.insert(Special::Xor, |cpu, i, _| cpu.op_xor(i));
        t.insert(Special::Nor, |cpu, i, _| cpu.op_nor(i));
        t.insert(Special::Slt, |cpu, i, _| cpu.op_slt(i));
        t.insert(Special::Sltu, |cpu, i, _| cpu.op_sltu(i));
        t.insert(Special::Dadd, |cpu, i, _| cpu.op_dadd(i));
        t.insert(Special::Daddu, |cpu, i, _| cpu.op_daddu(i));
        t.insert(Special::Dsub, |cpu, i, _| cpu.op_dsub(i));
        t.insert(Special::Dsubu, |cpu, i, _| cpu.op_dsubu(i));
        t.insert(Special::Tge, |cpu, i, _| cpu.op_tge(i));
        t.insert(Special::Tgeu, |cpu, i, _| cpu.op_tgeu(i));
        t.insert(Special::Tlt, |cpu, i, _| cpu.op_tlt(i));
        t.insert(Special::Tltu, |cpu, i, _| cpu.op_tltu(i));
        t.insert(Special::Teq, |cpu, i, _| cpu.op_teq(i));
        t.insert(Special::Tne, |cpu, i, _| cpu.op_tne(i));
        t.insert(Special::Dsll, |cpu, i, _| cpu.op_dsll(i));
        t.insert(Special::Dsrl, |cpu, i, _| cpu.op_dsrl(i));
        t.insert(Special::Dsra, |cpu, i, _| cpu.op_dsra(i));
        t.insert(Special::Dsll32, |cpu, i, _| cpu.op_dsll32(i));
        t.insert(Special::Dsrl32, |cpu, i, _| cpu.op_dsrl32(i));
        t.insert(Special::Dsra32, |cpu, i, _| cpu.op_dsra32(i));

        // REGIMM
        t.insert(RegImm::Bltz, |cpu, i, _| cpu.op_bltz(i));
        t.insert(RegImm::Bgez, |cpu, i, _| cpu.op_bgez(i));
        t.insert(RegImm::Bltzl, |cpu, i, _| cpu.op_bltzl(i));
        t.insert(RegImm::Bgezl, |cpu, i, _| cpu.op_bgezl(i));
        t.insert(RegImm::Tgei, |cpu, i, _| cpu.op_tgei(i));
        t.insert(RegImm::Tgeiu, |cpu, i, _| cpu.op_tgeiu(i));
        t.insert(RegImm::Tlti, |cpu, i, _| cpu.op_tlti(i));
        t.insert(RegImm::Tltiu, |cpu, i, _| cpu.op_tltiu(i));
        t.insert(RegImm::Teqi, |cpu, i, _| cpu.op_teqi(i));
        t.insert(RegImm::Tnei, |cpu, i, _| cpu.op_tnei(i));
        t.insert(RegImm::Bltzal, |cpu, i, _| cpu.op_bltzal(i));
        t.insert(RegImm::Bgezal, |cpu, i, _| cpu.op_bgezal(i));
        t.insert(RegImm::Bltzall, |cpu, i, _| cpu.op_bltzall(i));
        t.insert(RegImm::Bgezall, |cpu, i, _| cpu.op_bgezall(i));

        t
    }
}

impl CPU {
    /// Decode and execute an instruction
    ///
    /// Lookup order:
    /// 1. the dispatch table
    /// 2. the coprocessor slot named by the instruction, after a usability
    ///    check
    /// 3. Reserved Instruction, followed by an `UnimplementedInstruction`
    ///    error so the host can report the opcode
    ///
    /// Coprocessor opcodes the slot does not implement take the same path
    /// as step 3.
    pub(super) fn execute(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if let Some(handler) = self.dispatch.get(instruction) {
            return handler(self, instruction, bus);
        }

        if let Some(unit) = instruction.coprocessor_unit() {
            return self.execute_coprocessor(unit, instruction);
        }

        self.unimplemented(instruction)
    }

    /// Route an instruction to a coprocessor slot
    ///
    /// CP3 does not exist on the VR4300 and always raises Reserved
    /// Instruction, even when Status.CU3 is set. Reserved instructions from
    /// the other slots are opcodes this core does not model and are
    /// reported like a dispatch table miss.
    fn execute_coprocessor(&mut self, unit: u8, instruction: Instruction) -> Result<()> {
        if unit != 3 && !self.cop0.is_coprocessor_usable(unit) {
            log::debug!(
                "Coprocessor {} unusable at PC=0x{:016X}",
                unit,
                self.current_pc
            );
            self.raise(Exception::coprocessor_unusable(unit));
            return Ok(());
        }

        let regs = &mut self.regs;
        let result = match unit {
            0 => self.cop0.run(instruction, regs),
            1 => self.cop1.run(instruction, regs),
            2 => self.cop2.run(instruction, regs),
            _ => self.cop3.run(instruction, regs),
        };

        if let Err(exception) = result {
            if unit != 3 && exception.code == ExceptionCode::ReservedInstruction {
                return self.unimplemented(instruction);
            }
            self.raise(exception);
        }
        Ok(())
    }

    /// Deliver Reserved Instruction, then report the opcode to the host
    fn unimplemented(&mut self, instruction: Instruction) -> Result<()> {
        let pc = self.current_pc;
        let mnemonic = Disassembler::disassemble(instruction.raw(), pc);
        log::warn!(
            "Reserved instruction 0x{:08X} ({}) at PC=0x{:016X}",
            instruction.raw(),
            mnemonic,
            pc
        );
        self.raise(Exception::reserved_instruction());
        Err(EmulatorError::UnimplementedInstruction {
            pc,
            instruction: instruction.raw(),
            mnemonic,
        })
    }

    /// SYNC: no-op on a single in-order core
    pub(crate) fn op_sync(&mut self, _instruction: Instruction) -> Result<()> {
        Ok(())
    }

    /// CACHE: caches are not modelled
    pub(crate) fn op_cache(&mut self, instruction: Instruction) -> Result<()> {
        log::trace!(
            "CACHE op 0x{:02X} ignored at PC=0x{:016X}",
            instruction.rt(),
            self.current_pc
        );
        Ok(())
    }

    /// Raise `code` when `condition` holds
    pub(crate) fn raise_if(&mut self, condition: bool, code: ExceptionCode) {
        if condition {
            self.raise(Exception::new(code));
        }
    }
}
