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

/// Integer register state shared between the CPU and its coprocessors
///
/// Coprocessors receive `&mut Registers` when they run an instruction, which
/// is how CP0 reaches the program counter for `ERET` and how register moves
/// reach the GPR file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    /// General purpose registers (r0-r31)
    ///
    /// r0 is stored like the others and cleared after every instruction.
    pub(crate) gpr: [u64; 32],

    /// Program counter (address of the next sequential fetch)
    pub(crate) pc: u64,

    /// HI register (multiply high word / division remainder)
    pub(crate) hi: u64,

    /// LO register (multiply low word / division quotient)
    pub(crate) lo: u64,

    /// Load-linked flag set by LL/LLD, consumed by SC/SCD
    pub(crate) ll_bit: bool,

    /// Address of a queued delay-slot instruction
    ///
    /// `Some` means the instruction at that address must run before normal
    /// sequential fetch resumes at `pc`.
    pub(crate) delay_slot: Option<u64>,
}

/// Link register used by JAL and the REGIMM link branches
pub const RA: u8 = 31;

impl Registers {
    pub fn new() -> Self {
        Self {
            gpr: [0u64; 32],
            pc: 0,
            hi: 0,
            lo: 0,
            ll_bit: false,
            delay_slot: None,
        }
    }

    /// Read a general purpose register
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u64 {
        self.gpr[(index & 0x1F) as usize]
    }

    /// Write a general purpose register
    ///
    /// Writes to r0 land in storage and are discarded once the current
    /// instruction retires.
    #[inline(always)]
    pub fn set_reg(&mut self, index: u8, value: u64) {
        self.gpr[(index & 0x1F) as usize] = value;
    }

    /// Write the low 32 bits of `value`, sign-extended to 64 bits
    #[inline(always)]
    pub fn set_reg_sext32(&mut self, index: u8, value: u32) {
        self.set_reg(index, value as i32 as i64 as u64);
    }

    /// Program counter
    pub fn pc(&self) -> u64 {
        self.pc
    }

    /// Pending delay-slot address
    pub fn delay_slot(&self) -> Option<u64> {
        self.delay_slot
    }

    /// Load-linked flag
    pub fn ll_bit(&self) -> bool {
        self.ll_bit
    }

    /// HI register
    pub fn hi(&self) -> u64 {
        self.hi
    }

    /// LO register
    pub fn lo(&self) -> u64 {
        self.lo
    }

    /// Clear r0 after an instruction retires
    #[inline(always)]
    pub(crate) fn clear_zero(&mut self) {
        self.gpr[0] = 0;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
