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

/// Emulator error types
///
/// Architectural exceptions (interrupts, reserved instruction, overflow, ...)
/// are delivered to the guest by the CPU and never show up here. These errors
/// describe conditions the guest cannot observe: broken memory maps, opcodes
/// the emulator does not implement yet, and host-side I/O problems.
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Kind of bus access, used when reporting access violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
        }
    }
}

/// Main error type for the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("Unmapped physical address 0x{address:08X}")]
    UnmappedAddress { address: u64 },

    #[error("Virtual address 0x{address:016X} is outside kseg0/kseg1")]
    UnknownSegment { address: u64 },

    #[error("Unimplemented instruction 0x{instruction:08X} ({mnemonic}) at PC=0x{pc:016X}")]
    UnimplementedInstruction {
        pc: u64,
        instruction: u32,
        mnemonic: String,
    },

    #[error("Address 0x{address:08X} does not support {access} access")]
    AccessViolation { address: u64, access: Access },

    #[error("Mapping 0x{start:08X}-0x{end:08X} overlaps an existing entry")]
    OverlappingMapping { start: u64, end: u64 },

    #[error("Invalid register index: {index} (valid range: 0-31)")]
    InvalidRegister { index: u8 },

    #[error("Program of {size} bytes does not fit in {capacity} bytes at the load address")]
    ProgramTooLarge { size: usize, capacity: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Save state error: {0}")]
    SaveState(String),
}

impl EmulatorError {
    /// True for errors the run loop can log and continue past
    ///
    /// An unimplemented instruction has already been reported to the guest as
    /// a reserved-instruction exception, so the machine state is consistent.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EmulatorError::UnimplementedInstruction { .. })
    }
}
