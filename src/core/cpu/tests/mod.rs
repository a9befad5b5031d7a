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

//! CPU test modules
//!
//! Tests are organized into the following categories:
//! - `basic`: construction, reset, register access, r0 behavior
//! - `decode`: instruction codec and key normalization
//! - `arithmetic`: ALU, shifts, multiply/divide
//! - `branch`: jumps, branches, branch-likely and delay slots
//! - `load_store`: sized accesses, unaligned and linked loads/stores
//! - `cop0`: CP0 moves, views, translation, ERET
//! - `cop1`: FPU control register transfer
//! - `exceptions`: vectoring, EPC/BD bookkeeping, interrupts, traps
//! - `dispatch`: coprocessor routing and unimplemented opcodes

use super::*;
use crate::core::config::EmulatorConfig;
use crate::core::error::EmulatorError;
use crate::core::memory::Bus;



#[cfg(test)]
mod arithmetic;





#[cfg(test)]
mod exceptions;


/// Physical address test programs are placed at
pub(crate) const PROGRAM_BASE: u64 = 0x1000;

/// kseg0 virtual address of a physical address
pub(crate) fn kseg0(paddr: u64) -> u64 {
    KSEG0_START + paddr
}

/// CPU + bus with PC at the program base and the normal exception vectors
pub(crate) fn setup() -> (CPU, Bus) {
    let mut cpu = CPU::new();
    let bus = Bus::new(&EmulatorConfig::default()).unwrap();
    {
        let mut status = cpu.cop0_mut().status_mut();
        status.set_erl(false);
        status.ds_mut().set_bev(false);
    }
    cpu.set_pc(kseg0(PROGRAM_BASE));
    (cpu, bus)
}

/// Write instructions to consecutive words starting at `paddr`
pub(crate) fn load_program(bus: &Bus, paddr: u64, program: &[Instruction]) {
    for (i, instruction) in program.iter().enumerate() {
        bus.write_word(paddr + 4 * i as u64, instruction.raw()).unwrap();
    }
}

/// Execute a single instruction placed at the program base
///
/// Any delay slot queued by a previous call is dropped first.
pub(crate) fn exec(cpu: &mut CPU, bus: &mut Bus, instruction: Instruction) {
    load_program(bus, PROGRAM_BASE, &[instruction]);
    cpu.regs.delay_slot = None;
    cpu.set_pc(kseg0(PROGRAM_BASE));
    cpu.step(bus).unwrap();
}

/// Like `exec`, for an opcode the core reports as unimplemented
///
/// Returns the raw word carried by the error.
pub(crate) fn exec_unimplemented(cpu: &mut CPU, bus: &mut Bus, instruction: Instruction) -> u32 {
    load_program(bus, PROGRAM_BASE, &[instruction]);
    cpu.regs.delay_slot = None;
    cpu.set_pc(kseg0(PROGRAM_BASE));
    match cpu.step(bus) {
        Err(EmulatorError::UnimplementedInstruction { instruction, .. }) => instruction,
        other => panic!("expected an unimplemented instruction, got {:?}", other),
    }
}

/// Address of the general exception vector with BEV clear
pub(crate) const GENERAL_VECTOR: u64 = 0xFFFF_FFFF_8000_0180;
