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

use crate::core::config::EmulatorConfig;
use crate::core::error::Result;
use crate::core::memory::Bus;

// Module declarations
mod cop0;
mod cop1;
mod coprocessor;
mod decode;
mod disassembler;
mod exception;
mod instructions;
mod registers;
#[cfg(test)]
mod tests;
mod tracer;

// Re-exports
pub use cop0::{
    Cause, Config, Cop0, DiagnosticStatus, InterruptPending, OperatingMode, Status, KSEG0_START,
    KSEG1_START,
};
pub use cop1::{Cop1, FpuExceptions, RoundingMode};
pub use coprocessor::{cop0_funct, cop_op, CopResult, Coprocessor, ReservedCoprocessor};
pub use decode::{Instruction, OpCode, RegImm, Special};
pub use disassembler::Disassembler;
pub use exception::{Exception, ExceptionCode, RESET_VECTOR};
pub use registers::{Registers, RA};
pub use tracer::CpuTracer;

use instructions::DispatchTable;

/// CPU (NEC VR4300, MIPS III) emulation
///
/// # Specifications
/// - Architecture: MIPS III (64-bit)
/// - Registers: 32 x 64-bit GPRs, HI/LO, PC
/// - Coprocessors: CP0 (system control), CP1 (FPU control registers only)
/// - Timing: one instruction per cycle
///
/// # Example
/// ```
/// use n64rx::core::cpu::{CPU, RESET_VECTOR};
///
/// let cpu = CPU::new();
/// assert_eq!(cpu.pc(), RESET_VECTOR);
/// assert!(cpu.cop0().status().erl());
/// assert_eq!(cpu.reg(0), 0);
/// ```
pub struct CPU {
    /// GPRs, PC, HI/LO, LL bit and the pending delay slot
    pub(crate) regs: Registers,

    /// Coprocessor 0 (System Control Unit)
    pub(crate) cop0: Cop0,

    /// Coprocessor 1 (FPU)
    pub(crate) cop1: Cop1,

    /// Coprocessor 2 slot (absent on the VR4300)
    cop2: ReservedCoprocessor,

    /// Coprocessor 3 slot (absent on the VR4300)
    cop3: ReservedCoprocessor,

    /// Normalized instruction -> handler
    dispatch: DispatchTable,

    /// Instruction being executed (for debugging)
    current_instruction: Instruction,

    /// Address of the instruction being executed
    current_pc: u64,

    /// The instruction being executed sits in a branch delay slot
    in_delay_slot: bool,

    /// Config.BE applied at cold reset
    big_endian: bool,

    /// Config.EC applied at cold reset
    clock_divider: u8,
}

impl CPU {
    /// Create a CPU with the default configuration
    ///
    /// All registers start at zero and a cold reset is applied, so the CPU
    /// is ready to fetch from the reset vector.
    ///
    /// # Example
    /// ```
    /// use n64rx::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// assert_eq!(cpu.reg(0), 0);
    /// ```
    pub fn new() -> Self {
        Self::with_config(&EmulatorConfig::default())
    }

    /// Create a CPU using the reset parameters from `config`
    pub fn with_config(config: &EmulatorConfig) -> Self {
        let mut cpu = Self {
            regs: Registers::new(),
            cop0: Cop0::new(),
            cop1: Cop1::new(),
            cop2: ReservedCoprocessor,
            cop3: ReservedCoprocessor,
            dispatch: DispatchTable::build(),
            current_instruction: Instruction::default(),
            current_pc: 0,
            in_delay_slot: false,
            big_endian: config.big_endian,
            clock_divider: config.clock_divider & 0x7,
        };
        log::debug!("Dispatch table built with {} handlers", cpu.dispatch.len());
        cpu.cold_reset();
        cpu
    }

    /// Reset CPU
    ///
    /// Clears the integer registers and the FPU, then performs a cold reset.
    /// The PC at the time of the call ends up in ErrorEPC.
    ///
    /// # Example
    /// ```
    /// use n64rx::core::cpu::{CPU, RESET_VECTOR};
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_pc(0xFFFF_FFFF_8000_0400);
    /// cpu.set_reg(5, 42);
    /// cpu.reset();
    /// assert_eq!(cpu.pc(), RESET_VECTOR);
    /// assert_eq!(cpu.reg(5), 0);
    /// ```
    pub fn reset(&mut self) {
        let pc = self.regs.pc;
        self.regs = Registers::new();
        self.regs.pc = pc;
        self.cop1 = Cop1::new();
        self.current_instruction = Instruction::default();
        self.current_pc = 0;
        self.in_delay_slot = false;
        self.cold_reset();
    }

    /// Read a general purpose register
    ///
    /// # Arguments
    /// - `index`: Register number (0-31)
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u64 {
        self.regs.reg(index)
    }

    /// Write a general purpose register
    ///
    /// A write to r0 is visible until the current instruction retires,
    /// after which r0 is zero again.
    ///
    /// # Example
    /// ```
    /// use n64rx::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_reg(1, 0x1234_5678_9ABC_DEF0);
    /// assert_eq!(cpu.reg(1), 0x1234_5678_9ABC_DEF0);
    /// ```
    #[inline(always)]
    pub fn set_reg(&mut self, index: u8, value: u64) {
        self.regs.set_reg(index, value);
    }

    /// Write the sign-extended low 32 bits of `value`
    #[inline(always)]
    pub(crate) fn set_reg_sext32(&mut self, index: u8, value: u32) {
        self.regs.set_reg_sext32(index, value);
    }

    pub fn pc(&self) -> u64 {
        self.regs.pc
    }

    pub fn set_pc(&mut self, pc: u64) {
        self.regs.pc = pc;
    }

    /// Address of a queued delay-slot instruction
    pub fn delay_slot(&self) -> Option<u64> {
        self.regs.delay_slot
    }

    pub fn hi(&self) -> u64 {
        self.regs.hi
    }

    pub fn lo(&self) -> u64 {
        self.regs.lo
    }

    pub fn set_hi(&mut self, value: u64) {
        self.regs.hi = value;
    }

    pub fn set_lo(&mut self, value: u64) {
        self.regs.lo = value;
    }

    pub fn ll_bit(&self) -> bool {
        self.regs.ll_bit
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn cop0(&self) -> &Cop0 {
        &self.cop0
    }

    pub fn cop0_mut(&mut self) -> &mut Cop0 {
        &mut self.cop0
    }

    pub fn cop1(&self) -> &Cop1 {
        &self.cop1
    }

    pub fn cop1_mut(&mut self) -> &mut Cop1 {
        &mut self.cop1
    }

    /// Last executed instruction word
    pub fn current_instruction(&self) -> Instruction {
        self.current_instruction
    }

    /// Address of the last executed instruction
    pub fn current_pc(&self) -> u64 {
        self.current_pc
    }

    /// Check if the last executed instruction was in a branch delay slot
    pub fn in_delay_slot(&self) -> bool {
        self.in_delay_slot
    }

    /// Execute one instruction
    ///
    /// A queued delay-slot instruction runs first and leaves PC untouched;
    /// otherwise the instruction at PC is fetched and PC advances by 4
    /// before it executes.
    ///
    /// # Arguments
    ///
    /// * `bus` - Memory bus for instruction fetch and data accesses
    ///
    /// # Returns
    ///
    /// `Ok(())` once the instruction (or the exception it raised) has been
    /// applied. Errors are emulator faults, never guest exceptions.
    ///
    /// # Example
    ///
    /// ```
    /// use n64rx::core::config::EmulatorConfig;
    /// use n64rx::core::cpu::CPU;
    /// use n64rx::core::memory::Bus;
    ///
    /// let mut cpu = CPU::new();
    /// let mut bus = Bus::new(&EmulatorConfig::default()).unwrap();
    ///
    /// // NOP at 0x8000_0000
    /// cpu.set_pc(0xFFFF_FFFF_8000_0000);
    /// cpu.step(&mut bus).unwrap();
    /// assert_eq!(cpu.pc(), 0xFFFF_FFFF_8000_0004);
    /// ```
    pub fn step(&mut self, bus: &mut Bus) -> Result<()> {
        let (pc, in_delay_slot) = match self.regs.delay_slot.take() {
            Some(address) => (address, true),
            None => (self.regs.pc, false),
        };
        self.current_pc = pc;
        self.in_delay_slot = in_delay_slot;

        let instruction = match self.fetch(pc, bus)? {
            Some(instruction) => instruction,
            None => return Ok(()),
        };
        self.current_instruction = instruction;

        if !in_delay_slot {
            self.regs.pc = pc.wrapping_add(4);
        }

        let result = self.execute(instruction, bus);
        self.regs.clear_zero();
        result
    }

    /// Advance the machine by one cycle
    ///
    /// Bumps Count, then either takes a pending interrupt or executes one
    /// instruction.
    pub fn cycle(&mut self, bus: &mut Bus) -> Result<()> {
        self.cop0.increment_counter();

        let result = if self.cop0.has_pending_interrupt() {
            let (pc, in_delay_slot) = match self.regs.delay_slot {
                Some(address) => (address, true),
                None => (self.regs.pc, false),
            };
            self.exception(
                Exception::new(ExceptionCode::Interrupt),
                pc,
                in_delay_slot,
            );
            Ok(())
        } else {
            self.step(bus)
        };

        self.regs.clear_zero();
        result
    }

    /// Fetch the instruction word at a virtual address
    ///
    /// Returns `None` when the fetch raised an address error.
    fn fetch(&mut self, pc: u64, bus: &mut Bus) -> Result<Option<Instruction>> {
        if pc & 0x3 != 0 {
            self.exception(Exception::address_error(false, pc), pc, self.in_delay_slot);
            return Ok(None);
        }
        let paddr = self.cop0.translate(pc)?;
        Ok(Some(Instruction(bus.read_word(paddr)?)))
    }

    /// Deliver an exception raised by the executing instruction
    pub(crate) fn raise(&mut self, exception: Exception) {
        self.exception(exception, self.current_pc, self.in_delay_slot);
    }

    /// Raise a pending external interrupt line (0-4, IP2-IP6)
    pub fn set_interrupt_line(&mut self, line: u8, asserted: bool) {
        self.cop0.cause_mut().ip_mut().set_external_line(line, asserted);
    }

    /// Dump all CPU registers for debugging
    ///
    /// # Example
    ///
    /// ```no_run
    /// use n64rx::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// cpu.dump_registers();
    /// ```
    pub fn dump_registers(&self) {
        println!("CPU Registers:");
        match self.regs.delay_slot {
            Some(slot) => println!("PC: 0x{:016X}  Delay slot: 0x{:016X}", self.regs.pc, slot),
            None => println!("PC: 0x{:016X}", self.regs.pc),
        }
        println!("HI: 0x{:016X}  LO: 0x{:016X}", self.regs.hi, self.regs.lo);
        println!();

        for i in 0..32u8 {
            if i % 4 == 0 && i > 0 {
                println!();
            }
            print!("{:>4}: 0x{:016X}  ", Disassembler::reg_name(i), self.reg(i));
        }
        println!("\n");

        println!("COP0 Registers:");
        println!("Status:   0x{:016X}", self.cop0.reg(Cop0::STATUS));
        println!("Cause:    0x{:016X}", self.cop0.reg(Cop0::CAUSE));
        println!("EPC:      0x{:016X}", self.cop0.reg(Cop0::EPC));
        println!("ErrorEPC: 0x{:016X}", self.cop0.reg(Cop0::ERROR_EPC));
        println!("BadVAddr: 0x{:016X}", self.cop0.reg(Cop0::BAD_VADDR));
        println!("Count:    0x{:08X}", self.cop0.reg(Cop0::COUNT));
        println!("Compare:  0x{:08X}", self.cop0.reg(Cop0::COMPARE));
        println!("FCR31:    0x{:08X}", self.cop1.fcr31());
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}
