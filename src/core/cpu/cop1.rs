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

//! Floating-point unit (CP1)
//!
//! Only the control registers are modelled. CFC1/CTC1 move FCR0 and FCR31;
//! every arithmetic, load/store and branch form raises Reserved Instruction.

use bitflags::bitflags;

use super::coprocessor::{cop_op, CopResult, Coprocessor};
use super::decode::Instruction;
use super::exception::{Exception, ExceptionCode};
use super::registers::Registers;

bitflags! {
    /// One FCR31 exception group (flags, enables or cause)
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct FpuExceptions: u32 {
        const INEXACT = 1 << 0;
        const UNDERFLOW = 1 << 1;
        const OVERFLOW = 1 << 2;
        const DIVIDE_BY_ZERO = 1 << 3;
        const INVALID = 1 << 4;
        /// Only present in the cause group
        const UNIMPLEMENTED = 1 << 5;
    }
}

/// Rounding mode (FCR31.RM)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    Nearest = 0,
    TowardZero = 1,
    TowardPositive = 2,
    TowardNegative = 3,
}

/// Floating-point unit state
#[derive(Debug, Clone, PartialEq)]
pub struct Cop1 {
    /// Floating-point registers, stored as raw 64-bit patterns
    pub(crate) fpr: [u64; 32],
    /// Control/Status register
    pub(crate) fcr31: u32,
}

impl Cop1 {
    /// Implementation/Revision register (FCR0)
    pub const FCR0: u32 = 0x0000_0A00;

    const FLAGS_SHIFT: u32 = 2;
    const ENABLES_SHIFT: u32 = 7;
    const CAUSE_SHIFT: u32 = 12;
    const CONDITION_BIT: u32 = 1 << 23;
    const FLUSH_BIT: u32 = 1 << 24;

    /// Bits of FCR31 that hold state; the rest read as zero
    const FCR31_MASK: u32 = 0x0183_FFFF;

    pub fn new() -> Self {
        Self {
            fpr: [0u64; 32],
            fcr31: 0,
        }
    }

    pub fn fcr31(&self) -> u32 {
        self.fcr31
    }

    /// Raw FCR31 write with no exception check
    pub fn set_fcr31(&mut self, value: u32) {
        self.fcr31 = value & Self::FCR31_MASK;
    }

    pub fn rounding_mode(&self) -> RoundingMode {
        match self.fcr31 & 0x3 {
            0 => RoundingMode::Nearest,
            1 => RoundingMode::TowardZero,
            2 => RoundingMode::TowardPositive,
            _ => RoundingMode::TowardNegative,
        }
    }

    /// Sticky exception flags
    pub fn flags(&self) -> FpuExceptions {
        FpuExceptions::from_bits_truncate((self.fcr31 >> Self::FLAGS_SHIFT) & 0x1F)
    }

    pub fn enables(&self) -> FpuExceptions {
        FpuExceptions::from_bits_truncate((self.fcr31 >> Self::ENABLES_SHIFT) & 0x1F)
    }

    pub fn cause(&self) -> FpuExceptions {
        FpuExceptions::from_bits_truncate((self.fcr31 >> Self::CAUSE_SHIFT) & 0x3F)
    }

    /// Compare condition bit
    pub fn condition(&self) -> bool {
        self.fcr31 & Self::CONDITION_BIT != 0
    }

    /// Flush denormals to zero
    pub fn flush_to_zero(&self) -> bool {
        self.fcr31 & Self::FLUSH_BIT != 0
    }

    /// Raw register bits
    pub fn fpr(&self, index: u8) -> u64 {
        self.fpr[(index & 0x1F) as usize]
    }

    pub fn set_fpr(&mut self, index: u8, value: u64) {
        self.fpr[(index & 0x1F) as usize] = value;
    }

    /// Register contents viewed as a double
    pub fn fpr_f64(&self, index: u8) -> f64 {
        f64::from_bits(self.fpr(index))
    }

    pub fn set_fpr_f64(&mut self, index: u8, value: f64) {
        self.set_fpr(index, value.to_bits());
    }

    /// Control register read (CFC1)
    pub fn read_control(&self, index: u8) -> Option<u32> {
        match index {
            0 => Some(Self::FCR0),
            31 => Some(self.fcr31),
            _ => None,
        }
    }

    /// Control register write (CTC1)
    ///
    /// FCR0 is read-only and ignores writes. Returns a Floating-Point
    /// exception when the new cause bits hit an enabled exception or the
    /// unimplemented-operation bit.
    pub fn write_control(&mut self, index: u8, value: u32) -> CopResult {
        match index {
            0 => {
                log::warn!("Ignoring write of 0x{:08X} to FCR0", value);
                Ok(())
            }
            31 => {
                self.fcr31 = value & Self::FCR31_MASK;
                let trapped = self.cause() & (self.enables() | FpuExceptions::UNIMPLEMENTED);
                if trapped.is_empty() {
                    Ok(())
                } else {
                    log::debug!("FCR31 write raises floating-point exception: {:?}", trapped);
                    Err(Exception::new(ExceptionCode::FloatingPoint))
                }
            }
            _ => Err(Exception::reserved_instruction()),
        }
    }
}

impl Default for Cop1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Coprocessor for Cop1 {
    fn run(&mut self, instruction: Instruction, regs: &mut Registers) -> CopResult {
        if instruction.op() != 0x11 || instruction.is_cop_function() {
            return Err(Exception::reserved_instruction());
        }

        let rt = instruction.rt();
        let fs = instruction.rd();
        match instruction.rs() {
            cop_op::CF => match self.read_control(fs) {
                Some(value) => {
                    regs.set_reg_sext32(rt, value);
                    Ok(())
                }
                None => Err(Exception::reserved_instruction()),
            },
            cop_op::CT => self.write_control(fs, regs.reg(rt) as u32),
            _ => Err(Exception::reserved_instruction()),
        }
    }
}
