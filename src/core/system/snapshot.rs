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

//! Read-only CPU state snapshots
//!
//! A snapshot is a plain copy of the architectural state. The run loop
//! publishes one through [`RunControl`](super::RunControl) so another thread
//! can look at the machine without touching the CPU itself.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::core::cpu::CPU;
use crate::core::error::{EmulatorError, Result};

/// Architectural CPU state at an instruction boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct CpuSnapshot {
    /// Cycles executed by the owning system
    pub cycles: u64,
    pub pc: u64,
    /// Queued delay-slot address, if a branch was just taken
    pub delay_slot: Option<u64>,
    pub gpr: [u64; 32],
    pub hi: u64,
    pub lo: u64,
    pub ll_bit: bool,
    /// CP0 register file, indexed by register number
    pub cop0: [u64; 32],
    /// FPU registers as raw 64-bit storage
    pub fpr: [u64; 32],
    pub fcr31: u32,
}

impl CpuSnapshot {
    /// Copy the current state out of `cpu`
    pub fn capture(cpu: &CPU, cycles: u64) -> Self {
        let regs = cpu.registers();
        Self {
            cycles,
            pc: regs.pc(),
            delay_slot: regs.delay_slot(),
            gpr: regs.gpr,
            hi: regs.hi(),
            lo: regs.lo(),
            ll_bit: regs.ll_bit(),
            cop0: *cpu.cop0().regs(),
            fpr: cpu.cop1().fpr,
            fcr31: cpu.cop1().fcr31(),
        }
    }

    /// Write this state back into `cpu`
    ///
    /// CP0 registers are restored verbatim, bypassing the side effects of
    /// MTC0 (a Compare write would otherwise clear the timer interrupt).
    pub fn restore(&self, cpu: &mut CPU) {
        {
            let regs = cpu.registers_mut();
            regs.gpr = self.gpr;
            regs.gpr[0] = 0;
            regs.pc = self.pc;
            regs.delay_slot = self.delay_slot;
            regs.hi = self.hi;
            regs.lo = self.lo;
            regs.ll_bit = self.ll_bit;
        }
        for (index, value) in self.cop0.iter().enumerate() {
            cpu.cop0_mut().set_reg(index, *value);
        }
        let cop1 = cpu.cop1_mut();
        cop1.fpr = self.fpr;
        cop1.set_fcr31(self.fcr31);
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| EmulatorError::SaveState(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EmulatorError::SaveState(e.to_string()))
    }
}
