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

//! Cold reset and general exception processing
//!
//! Exceptions here are architectural: they redirect the guest to its
//! handler and never surface as [`EmulatorError`](crate::core::error::EmulatorError).

use super::cop0::Cop0;
use super::CPU;

/// Reset vector (kseg1 view of the PIF boot ROM)
pub const RESET_VECTOR: u64 = 0xFFFF_FFFF_BFC0_0000;

/// General exception vector base when Status.DS.BEV is set
pub const BOOTSTRAP_VECTOR_BASE: u64 = 0xFFFF_FFFF_BFC0_0200;

/// General exception vector base when Status.DS.BEV is clear
pub const NORMAL_VECTOR_BASE: u64 = 0xFFFF_FFFF_8000_0000;

/// Offset of the general exception handler from the vector base
pub const GENERAL_VECTOR_OFFSET: u64 = 0x180;

/// Exception codes stored in Cause.ExcCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExceptionCode {
    /// Interrupt
    Interrupt = 0,
    /// TLB modification
    TlbModification = 1,
    /// TLB miss (load or instruction fetch)
    TlbMissLoad = 2,
    /// TLB miss (store)
    TlbMissStore = 3,
    /// Address error (load or instruction fetch)
    AddressErrorLoad = 4,
    /// Address error (store)
    AddressErrorStore = 5,
    /// Bus error (instruction fetch)
    BusErrorFetch = 6,
    /// Bus error (data load/store)
    BusErrorData = 7,
    /// SYSCALL instruction
    Syscall = 8,
    /// BREAK instruction
    Breakpoint = 9,
    /// Reserved instruction
    ReservedInstruction = 10,
    /// Coprocessor unusable
    CoprocessorUnusable = 11,
    /// Arithmetic overflow
    Overflow = 12,
    /// Trap instruction condition met
    Trap = 13,
    /// Floating-point exception
    FloatingPoint = 15,
    /// Watch address reference
    Watch = 23,
}

impl TryFrom<u8> for ExceptionCode {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        use ExceptionCode::*;
        Ok(match value {
            0 => Interrupt,
            1 => TlbModification,
            2 => TlbMissLoad,
            3 => TlbMissStore,
            4 => AddressErrorLoad,
            5 => AddressErrorStore,
            6 => BusErrorFetch,
            7 => BusErrorData,
            8 => Syscall,
            9 => Breakpoint,
            10 => ReservedInstruction,
            11 => CoprocessorUnusable,
            12 => Overflow,
            13 => Trap,
            15 => FloatingPoint,
            23 => Watch,
            other => return Err(other),
        })
    }
}

/// An architectural exception raised while executing an instruction
///
/// Handlers and coprocessors return this instead of mutating CP0 directly;
/// the CPU turns it into a vectored exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exception {
    pub code: ExceptionCode,
    /// Unit number for Coprocessor Unusable (Cause.CE)
    pub coprocessor: Option<u8>,
    /// Explicit BadVAddr, used by address errors
    pub bad_vaddr: Option<u64>,
}

impl Exception {
    pub fn new(code: ExceptionCode) -> Self {
        Self {
            code,
            coprocessor: None,
            bad_vaddr: None,
        }
    }

    pub fn reserved_instruction() -> Self {
        Self::new(ExceptionCode::ReservedInstruction)
    }

    pub fn coprocessor_unusable(unit: u8) -> Self {
        Self {
            code: ExceptionCode::CoprocessorUnusable,
            coprocessor: Some(unit & 0x3),
            bad_vaddr: None,
        }
    }

    /// Address error for a misaligned or otherwise illegal access
    pub fn address_error(store: bool, vaddr: u64) -> Self {
        let code = if store {
            ExceptionCode::AddressErrorStore
        } else {
            ExceptionCode::AddressErrorLoad
        };
        Self {
            code,
            coprocessor: None,
            bad_vaddr: Some(vaddr),
        }
    }
}

impl From<ExceptionCode> for Exception {
    fn from(code: ExceptionCode) -> Self {
        Self::new(code)
    }
}

impl CPU {
    /// Cold reset sequence
    ///
    /// Applies the power-on CP0 state and jumps to the reset vector. The
    /// previous PC is kept in ErrorEPC.
    pub(crate) fn cold_reset(&mut self) {
        let cop0 = &mut self.cop0;

        {
            let mut status = cop0.status_mut();
            status.ds_mut().set_ts(false);
            status.ds_mut().set_sr(false);
            status.set_rp(false);
            status.set_erl(true);
            status.ds_mut().set_bev(true);
        }
        {
            let mut config = cop0.config_mut();
            config.set_be(self.big_endian);
            config.set_ec(self.clock_divider);
        }
        cop0.set_reg(Cop0::RANDOM, 31);

        cop0.set_reg(Cop0::ERROR_EPC, self.regs.pc);
        self.regs.pc = RESET_VECTOR;
        self.regs.delay_slot = None;

        log::info!("Cold reset: PC=0x{:016X}", RESET_VECTOR);
    }

    /// Deliver a general exception
    ///
    /// `fault_pc` is the address of the instruction that caused it (or the
    /// instruction that would have run next, for interrupts) and
    /// `in_delay_slot` tells whether that instruction sits in a branch delay
    /// slot.
    ///
    /// EPC and Cause.BD are only written when Status.EXL is clear, so a
    /// nested exception keeps the original return address.
    pub fn exception(&mut self, exception: Exception, fault_pc: u64, in_delay_slot: bool) {
        let cop0 = &mut self.cop0;

        {
            let mut cause = cop0.cause_mut();
            cause.set_exc_code(exception.code);
            if let Some(unit) = exception.coprocessor {
                cause.set_ce(unit);
            }
        }

        let bad_vaddr = exception.bad_vaddr.unwrap_or(fault_pc);
        cop0.set_reg(Cop0::BAD_VADDR, bad_vaddr);

        let nested = cop0.status().exl();
        if !nested {
            let epc = if in_delay_slot {
                fault_pc.wrapping_sub(4)
            } else {
                fault_pc
            };
            cop0.cause_mut().set_bd(in_delay_slot);
            cop0.set_reg(Cop0::EPC, epc);
        }
        cop0.status_mut().set_exl(true);

        let base = if cop0.status().ds().bev() {
            BOOTSTRAP_VECTOR_BASE
        } else {
            NORMAL_VECTOR_BASE
        };
        let vector = base.wrapping_add(GENERAL_VECTOR_OFFSET);

        log::debug!(
            "Exception {:?} at 0x{:016X} (delay slot: {}, nested: {}) -> 0x{:016X}",
            exception.code,
            fault_pc,
            in_delay_slot,
            nested,
            vector
        );

        self.regs.pc = vector;
        self.regs.delay_slot = None;
    }
}
