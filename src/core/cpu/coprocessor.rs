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

use super::decode::Instruction;
use super::exception::Exception;
use super::registers::Registers;

/// Outcome of a coprocessor instruction
pub type CopResult = std::result::Result<(), Exception>;

/// A coprocessor slot
///
/// The CPU routes every instruction that carries a coprocessor unit number
/// and has no primary handler to the matching slot. `regs` gives access to
/// the GPR file and the program counter.
pub trait Coprocessor {
    fn run(&mut self, instruction: Instruction, regs: &mut Registers) -> CopResult;
}

/// Slot for a coprocessor that does not exist (CP2 and CP3)
#[derive(Debug, Clone, Copy, Default)]
pub struct ReservedCoprocessor;

impl Coprocessor for ReservedCoprocessor {
    fn run(&mut self, instruction: Instruction, _regs: &mut Registers) -> CopResult {
        log::warn!("Reserved coprocessor instruction {}", instruction);
        Err(Exception::reserved_instruction())
    }
}

/// COPz sub-operations (rs field)
pub mod cop_op {
    pub const MF: u8 = 0x00;
    pub const DMF: u8 = 0x01;
    pub const CF: u8 = 0x02;
    pub const MT: u8 = 0x04;
    pub const DMT: u8 = 0x05;
    pub const CT: u8 = 0x06;
    pub const BC: u8 = 0x08;
}

/// CP0 function codes (CO bit set)
pub mod cop0_funct {
    pub const TLBR: u8 = 0x01;
    pub const TLBWI: u8 = 0x02;
    pub const TLBWR: u8 = 0x06;
    pub const TLBP: u8 = 0x08;
    pub const ERET: u8 = 0x18;
}
