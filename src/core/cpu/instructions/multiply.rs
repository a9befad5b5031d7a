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

use super::super::decode::Instruction;
use super::super::CPU;
use crate::core::error::Result;

/// Full 64x64 -> 128-bit unsigned product as (hi, lo)
///
/// Built from four 32x32 partial products so the carry between the middle
/// terms is explicit.
pub(crate) fn mul_u64_wide(a: u64, b: u64) -> (u64, u64) {
    let (a_lo, a_hi) = (a & 0xFFFF_FFFF, a >> 32);
    let (b_lo, b_hi) = (b & 0xFFFF_FFFF, b >> 32);

    let lo_lo = a_lo * b_lo;
    let hi_lo = a_hi * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_hi = a_hi * b_hi;

    let cross = (lo_lo >> 32) + (hi_lo & 0xFFFF_FFFF) + (lo_hi & 0xFFFF_FFFF);
    let lo = (cross << 32) | (lo_lo & 0xFFFF_FFFF);
    let hi = hi_hi + (hi_lo >> 32) + (lo_hi >> 32) + (cross >> 32);
    (hi, lo)
}

impl CPU {
    // === Multiply/Divide Instructions ===
    //
    // The 32-bit forms store each half of the result sign-extended into
    // HI and LO. Division by zero leaves HI and LO untouched.

    /// MULT: Multiply (signed, 32-bit)
    ///
    /// Format: mult rs, rt
    /// Operation: (HI, LO) = rs[31:0] * rt[31:0]
    pub(crate) fn op_mult(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs()) as i32 as i64;
        let b = self.reg(instruction.rt()) as i32 as i64;
        let product = a.wrapping_mul(b) as u64;
        self.set_hilo32((product >> 32) as u32, product as u32);
        Ok(())
    }

    /// MULTU: Multiply Unsigned (32-bit)
    pub(crate) fn op_multu(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs()) as u32 as u64;
        let b = self.reg(instruction.rt()) as u32 as u64;
        let product = a * b;
        self.set_hilo32((product >> 32) as u32, product as u32);
        Ok(())
    }

    /// DIV: Divide (signed, 32-bit)
    ///
    /// LO = quotient, HI = remainder. `i32::MIN / -1` wraps to `i32::MIN`
    /// with a zero remainder, as on hardware.
    pub(crate) fn op_div(&mut self, instruction: Instruction) -> Result<()> {
        let n = self.reg(instruction.rs()) as i32;
        let d = self.reg(instruction.rt()) as i32;
        if d == 0 {
            log::trace!("DIV by zero at PC=0x{:016X}", self.current_pc);
            return Ok(());
        }
        self.set_hilo32(n.wrapping_rem(d) as u32, n.wrapping_div(d) as u32);
        Ok(())
    }

    /// DIVU: Divide Unsigned (32-bit)
    pub(crate) fn op_divu(&mut self, instruction: Instruction) -> Result<()> {
        let n = self.reg(instruction.rs()) as u32;
        let d = self.reg(instruction.rt()) as u32;
        if d == 0 {
            log::trace!("DIVU by zero at PC=0x{:016X}", self.current_pc);
            return Ok(());
        }
        self.set_hilo32(n % d, n / d);
        Ok(())
    }

    /// DMULT: Doubleword Multiply (signed)
    pub(crate) fn op_dmult(&mut self, instruction: Instruction) -> Result<()> {
        let a = self.reg(instruction.rs()) as i64 as i128;
        let b = self.reg(instruction.rt()) as i64 as i128;
        let product = (a * b) as u128;
        self.regs.hi = (product >> 64) as u64;
        self.regs.lo = product as u64;
        Ok(())
    }

    /// DMULTU: Doubleword Multiply Unsigned
    ///
    /// Format: dmultu rs, rt
    /// Operation: (HI, LO) = rs * rt (128-bit unsigned product)
    pub(crate) fn op_dmultu(&mut self, instruction: Instruction) -> Result<()> {
        let (hi, lo) = mul_u64_wide(self.reg(instruction.rs()), self.reg(instruction.rt()));
        self.regs.hi = hi;
        self.regs.lo = lo;
        Ok(())
    }

    /// DDIV: Doubleword Divide (signed)
    pub(crate) fn op_ddiv(&mut self, instruction: Instruction) -> Result<()> {
        let n = self.reg(instruction.rs()) as i64;
        let d = self.reg(instruction.rt()) as i64;
        if d == 0 {
            log::trace!("DDIV by zero at PC=0x{:016X}", self.current_pc);
            return Ok(());
        }
        self.regs.lo = n.wrapping_div(d) as u64;
        self.regs.hi = n.wrapping_rem(d) as u64;
        Ok(())
    }

    /// DDIVU: Doubleword Divide Unsigned
    ///
    /// Format: ddivu rs, rt
    /// Operation: LO = rs / rt, HI = rs % rt; unchanged when rt == 0
    pub(crate) fn op_ddivu(&mut self, instruction: Instruction) -> Result<()> {
        let n = self.reg(instruction.rs());
        let d = self.reg(instruction.rt());
        if d == 0 {
            log::trace!("DDIVU by zero at PC=0x{:016X}", self.current_pc);
            return Ok(());
        }
        self.regs.lo = n / d;
        self.regs.hi = n % d;
        Ok(())
    }

    /// MFHI: Move From HI
    pub(crate) fn op_mfhi(&mut self, instruction: Instruction) -> Result<()> {
        self.set_reg(instruction.rd(), self.regs.hi);
        Ok(())
    }

    /// MFLO: Move From LO
    pub(crate) fn op_mflo(&mut self, instruction: Instruction) -> Result<()> {
        self.set_reg(instruction.rd(), self.regs.lo);
        Ok(())
    }

    /// MTHI: Move To HI
    pub(crate) fn op_mthi(&mut self, instruction: Instruction) -> Result<()> {
        self.regs.hi = self.reg(instruction.rs());
        Ok(())
    }

    /// MTLO: Move To LO
    pub(crate) fn op_mtlo(&mut self, instruction: Instruction) -> Result<()> {
        self.regs.lo = self.reg(instruction.rs());
        Ok(())
    }

    fn set_hilo32(&mut self, hi: u32, lo: u32) {
        self.regs.hi = hi as i32 as i64 as u64;
        self.regs.lo = lo as i32 as i64 as u64;
    }
}
