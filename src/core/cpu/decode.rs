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

//! Instruction codec
//!
//! Packs and unpacks the fixed 32-bit MIPS III instruction formats:
//!
//! ```text
//! R-type: | op (6) | rs (5) | rt (5) | rd (5) | sa (5) | funct (6) |
//! I-type: | op (6) | rs (5) | rt (5) |       immediate (16)        |
//! J-type: | op (6) |                target (26)                   |
//! ```
//!
//! The codec carries no state. [`Instruction::to_opcode`] produces the
//! operand-free key used by the dispatch table.

use std::fmt;

/// A single 32-bit instruction word
///
/// Equality and hashing are bitwise, so a normalized instruction can be used
/// directly as a lookup key.
///
/// # Example
/// ```
/// use n64rx::core::cpu::{Instruction, OpCode};
///
/// // addiu r2, r1, -1
/// let instr = Instruction::i_type(OpCode::Addiu, 1, 2, 0xFFFF);
/// assert_eq!(instr.rs(), 1);
/// assert_eq!(instr.rt(), 2);
/// assert_eq!(instr.imm_sext(), 0xFFFF_FFFF_FFFF_FFFF);
/// assert_eq!(instr.to_opcode(), Instruction::from(OpCode::Addiu));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Instruction(pub u32);

/// Primary opcodes (bits [31:26])
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Special = 0x00,
    RegImm = 0x01,
    J = 0x02,
    Jal = 0x03,
    Beq = 0x04,
    Bne = 0x05,
    Blez = 0x06,
    Bgtz = 0x07,
    Addi = 0x08,
    Addiu = 0x09,
    Slti = 0x0A,
    Sltiu = 0x0B,
    Andi = 0x0C,
    Ori = 0x0D,
    Xori = 0x0E,
    Lui = 0x0F,
    Cop0 = 0x10,
    Cop1 = 0x11,
    Cop2 = 0x12,
    Cop3 = 0x13,
    Beql = 0x14,
    Bnel = 0x15,
    Blezl = 0x16,
    Bgtzl = 0x17,
    Daddi = 0x18,
    Daddiu = 0x19,
    Ldl = 0x1A,
    Ldr = 0x1B,
    Lb = 0x20,
    Lh = 0x21,
    Lwl = 0x22,
    Lw = 0x23,
    Lbu = 0x24,
    Lhu = 0x25,
    Lwr = 0x26,
    Lwu = 0x27,
    Sb = 0x28,
    Sh = 0x29,
    Swl = 0x2A,
    Sw = 0x2B,
    Sdl = 0x2C,
    Sdr = 0x2D,
    Swr = 0x2E,
    Cache = 0x2F,
    Ll = 0x30,
    Lwc1 = 0x31,
    Lwc2 = 0x32,
    Lld = 0x34,
    Ldc1 = 0x35,
    Ldc2 = 0x36,
    Ld = 0x37,
    Sc = 0x38,
    Swc1 = 0x39,
    Swc2 = 0x3A,
    Scd = 0x3C,
    Sdc1 = 0x3D,
    Sdc2 = 0x3E,
    Sd = 0x3F,
}

/// SPECIAL function codes (bits [5:0] when opcode = 0x00)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Special {
    Sll = 0x00,
    Srl = 0x02,
    Sra = 0x03,
    Sllv = 0x04,
    Srlv = 0x06,
    Srav = 0x07,
    Jr = 0x08,
    Jalr = 0x09,
    Syscall = 0x0C,
    Break = 0x0D,
    Sync = 0x0F,
    Mfhi = 0x10,
    Mthi = 0x11,
    Mflo = 0x12,
    Mtlo = 0x13,
    Dsllv = 0x14,
    Dsrlv = 0x16,
    Dsrav = 0x17,
    Mult = 0x18,
    Multu = 0x19,
    Div = 0x1A,
    Divu = 0x1B,
    Dmult = 0x1C,
    Dmultu = 0x1D,
    Ddiv = 0x1E,
    Ddivu = 0x1F,
    Add = 0x20,
    Addu = 0x21,
    Sub = 0x22,
    Subu = 0x23,
    And = 0x24,
    Or = 0x25,
    Xor = 0x26,
    Nor = 0x27,
    Slt = 0x2A,
    Sltu = 0x2B,
    Dadd = 0x2C,
    Daddu = 0x2D,
    Dsub = 0x2E,
    Dsubu = 0x2F,
    Tge = 0x30,
    Tgeu = 0x31,
    Tlt = 0x32,
    Tltu = 0x33,
    Teq = 0x34,
    Tne = 0x36,
    Dsll = 0x38,
    Dsrl = 0x3A,
    Dsra = 0x3B,
    Dsll32 = 0x3C,
    Dsrl32 = 0x3E,
    Dsra32 = 0x3F,
}

/// REGIMM codes (bits [20:16] when opcode = 0x01)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RegImm {
    Bltz = 0x00,
    Bgez = 0x01,
    Bltzl = 0x02,
    Bgezl = 0x03,
    Tgei = 0x08,
    Tgeiu = 0x09,
    Tlti = 0x0A,
    Tltiu = 0x0B,
    Teqi = 0x0C,
    Tnei = 0x0E,
    Bltzal = 0x10,
    Bgezal = 0x11,
    Bltzall = 0x12,
    Bgezall = 0x13,
}

impl From<OpCode> for Instruction {
    fn from(op: OpCode) -> Self {
        Instruction((op as u32) << 26)
    }
}

impl From<Special> for Instruction {
    fn from(funct: Special) -> Self {
        Instruction(funct as u32)
    }
}

impl From<RegImm> for Instruction {
    fn from(rt: RegImm) -> Self {
        Instruction(((OpCode::RegImm as u32) << 26) | ((rt as u32) << 16))
    }
}

impl Instruction {
    /// Pack an I-type instruction
    pub fn i_type(op: OpCode, rs: u8, rt: u8, imm: u16) -> Self {
        Instruction(
            ((op as u32) << 26)
                | (((rs & 0x1F) as u32) << 21)
                | (((rt & 0x1F) as u32) << 16)
                | imm as u32,
        )
    }

    /// Pack an R-type (SPECIAL) instruction
    pub fn r_type(funct: Special, rs: u8, rt: u8, rd: u8, sa: u8) -> Self {
        Instruction(
            (((rs & 0x1F) as u32) << 21)
                | (((rt & 0x1F) as u32) << 16)
                | (((rd & 0x1F) as u32) << 11)
                | (((sa & 0x1F) as u32) << 6)
                | funct as u32,
        )
    }

    /// Pack a REGIMM instruction
    pub fn reg_imm_type(rt: RegImm, rs: u8, imm: u16) -> Self {
        Instruction(
            ((OpCode::RegImm as u32) << 26)
                | (((rs & 0x1F) as u32) << 21)
                | ((rt as u32) << 16)
                | imm as u32,
        )
    }

    /// Pack a J-type instruction
    pub fn j_type(op: OpCode, target: u32) -> Self {
        Instruction(((op as u32) << 26) | (target & 0x03FF_FFFF))
    }

    /// Pack a coprocessor register move (`MFCz`, `MTCz`, `CFCz`, ...)
    ///
    /// `sub_op` lands in the rs field, `rt` is the GPR and `rd` the
    /// coprocessor register.
    pub fn cop_move(unit: u8, sub_op: u8, rt: u8, rd: u8) -> Self {
        Instruction(
            ((OpCode::Cop0 as u32 + (unit & 0x3) as u32) << 26)
                | (((sub_op & 0x1F) as u32) << 21)
                | (((rt & 0x1F) as u32) << 16)
                | (((rd & 0x1F) as u32) << 11),
        )
    }

    /// Pack a coprocessor function instruction (CO bit set), e.g. `ERET`
    pub fn cop_function(unit: u8, funct: u8) -> Self {
        Instruction(
            ((OpCode::Cop0 as u32 + (unit & 0x3) as u32) << 26) | (1 << 25) | (funct & 0x3F) as u32,
        )
    }

    /// Raw instruction word
    #[inline(always)]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Primary opcode, bits [31:26]
    #[inline(always)]
    pub fn op(self) -> u8 {
        (self.0 >> 26) as u8
    }

    /// Source register, bits [25:21]
    #[inline(always)]
    pub fn rs(self) -> u8 {
        ((self.0 >> 21) & 0x1F) as u8
    }

    /// Target register, bits [20:16]
    #[inline(always)]
    pub fn rt(self) -> u8 {
        ((self.0 >> 16) & 0x1F) as u8
    }

    /// Destination register, bits [15:11]
    #[inline(always)]
    pub fn rd(self) -> u8 {
        ((self.0 >> 11) & 0x1F) as u8
    }

    /// Shift amount, bits [10:6]
    #[inline(always)]
    pub fn sa(self) -> u32 {
        (self.0 >> 6) & 0x1F
    }

    /// Function field, bits [5:0]
    #[inline(always)]
    pub fn funct(self) -> u8 {
        (self.0 & 0x3F) as u8
    }

    /// Raw 16-bit immediate
    #[inline(always)]
    pub fn imm(self) -> u16 {
        self.0 as u16
    }

    /// Immediate sign-extended to 64 bits
    #[inline(always)]
    pub fn imm_sext(self) -> u64 {
        self.0 as u16 as i16 as i64 as u64
    }

    /// Immediate zero-extended to 64 bits
    #[inline(always)]
    pub fn imm_zext(self) -> u64 {
        (self.0 & 0xFFFF) as u64
    }

    /// 26-bit jump target
    #[inline(always)]
    pub fn target(self) -> u32 {
        self.0 & 0x03FF_FFFF
    }

    /// SPECIAL function code, if this is a SPECIAL instruction
    pub fn special(self) -> Option<u8> {
        (self.op() == OpCode::Special as u8).then(|| self.funct())
    }

    /// REGIMM code, if this is a REGIMM instruction
    pub fn reg_imm(self) -> Option<u8> {
        (self.op() == OpCode::RegImm as u8).then(|| self.rt())
    }

    /// Coprocessor unit addressed by this instruction
    ///
    /// Covers COPz, LWCz, LDCz, SWCz and SDCz. Opcodes that reuse the old
    /// coprocessor-0/3 load/store slots (LL, LD, SC, SD, ...) are claimed by
    /// the primary dispatch table before this view is consulted.
    pub fn coprocessor_unit(self) -> Option<u8> {
        match self.op() {
            0x10..=0x13 | 0x30..=0x33 | 0x34..=0x37 | 0x38..=0x3B | 0x3C..=0x3F => {
                Some(self.op() & 0x3)
            }
            _ => None,
        }
    }

    /// True for COPz instructions with the CO bit (bit 25) set
    pub fn is_cop_function(self) -> bool {
        (0x10..=0x13).contains(&self.op()) && self.0 & (1 << 25) != 0
    }

    /// Strip operand fields, keeping what is needed to find a handler
    ///
    /// - SPECIAL: opcode (zero) plus function field
    /// - REGIMM: opcode plus rt
    /// - everything else: opcode only
    pub fn to_opcode(self) -> Instruction {
        match self.op() {
            0x00 => Instruction(self.0 & 0x3F),
            0x01 => Instruction(self.0 & 0xFC1F_0000),
            _ => Instruction(self.0 & 0xFC00_0000),
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instruction(0x{:08X})", self.0)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}
