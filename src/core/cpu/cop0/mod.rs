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

//! System Control Coprocessor (CP0)
//!
//! Owns the 32 CP0 registers, the kseg0/kseg1 address translation, the
//! Count/Compare timer and the privileged instructions (MTC0, MFC0, ERET and
//! the TLB write stubs).

mod views;

pub use views::{Cause, Config, DiagnosticStatus, InterruptPending, OperatingMode, Status};

use super::coprocessor::{cop0_funct, cop_op, CopResult, Coprocessor};
use super::decode::Instruction;
use super::exception::Exception;
use super::registers::Registers;
use crate::core::error::{EmulatorError, Result};

/// Start of the cached, unmapped kernel segment
pub const KSEG0_START: u64 = 0xFFFF_FFFF_8000_0000;
pub const KSEG0_END: u64 = 0xFFFF_FFFF_9FFF_FFFF;

/// Start of the uncached, unmapped kernel segment
pub const KSEG1_START: u64 = 0xFFFF_FFFF_A000_0000;
pub const KSEG1_END: u64 = 0xFFFF_FFFF_BFFF_FFFF;

/// System Control Coprocessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cop0 {
    /// Raw register file
    pub(crate) regs: [u64; 32],
}

impl Cop0 {
    // Register indices
    pub const INDEX: usize = 0;
    pub const RANDOM: usize = 1;
    pub const ENTRY_LO0: usize = 2;
    pub const ENTRY_LO1: usize = 3;
    pub const CONTEXT: usize = 4;
    pub const PAGE_MASK: usize = 5;
    pub const WIRED: usize = 6;
    pub const BAD_VADDR: usize = 8;
    pub const COUNT: usize = 9;
    pub const ENTRY_HI: usize = 10;
    pub const COMPARE: usize = 11;
    pub const STATUS: usize = 12;
    pub const CAUSE: usize = 13;
    pub const EPC: usize = 14;
    pub const PRID: usize = 15;
    pub const CONFIG: usize = 16;
    pub const LL_ADDR: usize = 17;
    pub const WATCH_LO: usize = 18;
    pub const WATCH_HI: usize = 19;
    pub const XCONTEXT: usize = 20;
    pub const TAG_LO: usize = 28;
    pub const TAG_HI: usize = 29;
    pub const ERROR_EPC: usize = 30;

    /// VR4300 implementation/revision
    pub const PRID_VALUE: u64 = 0x0000_0B22;

    /// Config value at power-on, before the cold reset adjusts BE and EC
    pub const CONFIG_POWER_ON: u64 = 0x7006_E463;

    /// Cause bits a CPU write may change (IP0-IP1)
    pub const CAUSE_SOFTWARE_MASK: u64 = 0x3 << 8;

    pub fn new() -> Self {
        let mut regs = [0u64; 32];
        regs[Self::RANDOM] = 31;
        regs[Self::PRID] = Self::PRID_VALUE;
        regs[Self::CONFIG] = Self::CONFIG_POWER_ON;
        Self { regs }
    }

    /// Raw register read
    #[inline(always)]
    pub fn reg(&self, index: usize) -> u64 {
        self.regs[index & 0x1F]
    }

    /// Raw register write, without MTC0 side effects
    #[inline(always)]
    pub fn set_reg(&mut self, index: usize, value: u64) {
        self.regs[index & 0x1F] = value;
    }

    pub fn regs(&self) -> &[u64; 32] {
        &self.regs
    }

    pub fn status(&self) -> Status<&u64> {
        Status(&self.regs[Self::STATUS])
    }

    pub fn status_mut(&mut self) -> Status<&mut u64> {
        Status(&mut self.regs[Self::STATUS])
    }

    pub fn cause(&self) -> Cause<&u64> {
        Cause(&self.regs[Self::CAUSE])
    }

    pub fn cause_mut(&mut self) -> Cause<&mut u64> {
        Cause(&mut self.regs[Self::CAUSE])
    }

    pub fn config(&self) -> Config<&u64> {
        Config(&self.regs[Self::CONFIG])
    }

    pub fn config_mut(&mut self) -> Config<&mut u64> {
        Config(&mut self.regs[Self::CONFIG])
    }

    /// True when an enabled interrupt is pending and not masked by EXL/ERL
    pub fn has_pending_interrupt(&self) -> bool {
        let status = self.status();
        status.ie()
            && !status.exl()
            && !status.erl()
            && (status.im() & self.cause().ip().raw()) != 0
    }

    /// Translate a virtual address to a physical address
    ///
    /// Only the unmapped kernel segments are supported.
    ///
    /// # Arguments
    ///
    /// * `vaddr` - Sign-extended 64-bit virtual address
    ///
    /// # Returns
    ///
    /// The physical address, or `UnknownSegment` for any other region
    ///
    /// # Example
    ///
    /// ```
    /// use n64rx::core::cpu::Cop0;
    ///
    /// let cop0 = Cop0::new();
    /// assert_eq!(cop0.translate(0xFFFF_FFFF_8000_1000).unwrap(), 0x1000);
    /// assert_eq!(cop0.translate(0xFFFF_FFFF_BFC0_0000).unwrap(), 0x1FC0_0000);
    /// assert!(cop0.translate(0x0000_0000_0040_0000).is_err());
    /// ```
    pub fn translate(&self, vaddr: u64) -> Result<u64> {
        match vaddr {
            KSEG0_START..=KSEG0_END => Ok(vaddr - KSEG0_START),
            KSEG1_START..=KSEG1_END => Ok(vaddr - KSEG1_START),
            _ => Err(EmulatorError::UnknownSegment { address: vaddr }),
        }
    }

    /// Advance the Count register by one
    ///
    /// Count is 32 bits wide. The timer interrupt (IP7) is raised when Count
    /// reaches Compare.
    pub fn increment_counter(&mut self) {
        let count = (self.regs[Self::COUNT] as u32).wrapping_add(1);
        self.regs[Self::COUNT] = count as u64;

        if count == self.regs[Self::COMPARE] as u32 {
            log::trace!("Count reached Compare (0x{:08X})", count);
            self.cause_mut().ip_mut().set_timer(true);
        }
    }

    /// Check whether a coprocessor unit may be used
    ///
    /// CP0 is always usable in kernel mode.
    pub fn is_coprocessor_usable(&self, unit: u8) -> bool {
        let status = self.status();
        if unit == 0 && status.mode() == OperatingMode::Kernel {
            return true;
        }
        status.cu() & (1 << (unit & 0x3)) != 0
    }

    /// MTC0/DMTC0 write with register side effects
    pub fn write_register(&mut self, index: usize, value: u64) {
        let index = index & 0x1F;
        match index {
            Self::CAUSE => {
                let cause = self.regs[Self::CAUSE];
                self.regs[Self::CAUSE] =
                    (cause & !Self::CAUSE_SOFTWARE_MASK) | (value & Self::CAUSE_SOFTWARE_MASK);
            }
            Self::COMPARE => {
                self.regs[Self::COMPARE] = value;
                self.cause_mut().ip_mut().set_timer(false);
            }
            Self::COUNT => {
                self.regs[Self::COUNT] = value & 0xFFFF_FFFF;
            }
            Self::PRID => {
                log::warn!("Ignoring write of 0x{:016X} to read-only PRId", value);
            }
            _ => {
                self.regs[index] = value;
            }
        }
        log::trace!("CP0 r{} <- 0x{:016X}", index, self.regs[index]);
    }

    /// ERET: return from exception or error level
    pub fn eret(&mut self, regs: &mut Registers) {
        if self.status().erl() {
            regs.pc = self.regs[Self::ERROR_EPC];
            self.status_mut().set_erl(false);
        } else {
            regs.pc = self.regs[Self::EPC];
            self.status_mut().set_exl(false);
        }
        regs.ll_bit = false;
        regs.delay_slot = None;
        log::debug!("ERET -> 0x{:016X}", regs.pc);
    }
}

impl Default for Cop0 {
    fn default() -> Self {
        Self::new()
    }
}

impl Coprocessor for Cop0 {
    fn run(&mut self, instruction: Instruction, regs: &mut Registers) -> CopResult {
        if instruction.op() != 0x10 {
            return Err(Exception::reserved_instruction());
        }

        if instruction.is_cop_function() {
            return match instruction.funct() {
                cop0_funct::TLBWI | cop0_funct::TLBWR => {
                    log::trace!("TLB write ignored ({})", instruction);
                    Ok(())
                }
                cop0_funct::ERET => {
                    self.eret(regs);
                    Ok(())
                }
                _ => Err(Exception::reserved_instruction()),
            };
        }

        let rt = instruction.rt();
        let rd = instruction.rd() as usize;
        match instruction.rs() {
            cop_op::MF => {
                regs.set_reg_sext32(rt, self.reg(rd) as u32);
                Ok(())
            }
            cop_op::DMF => {
                regs.set_reg(rt, self.reg(rd));
                Ok(())
            }
            cop_op::MT => {
                let value = regs.reg(rt) as u32 as i32 as i64 as u64;
                self.write_register(rd, value);
                Ok(())
            }
            cop_op::DMT => {
                self.write_register(rd, regs.reg(rt));
                Ok(())
            }
            _ => Err(Exception::reserved_instruction()),
        }
    }
}
