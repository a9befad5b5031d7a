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

//! MIPS III instruction disassembler for debugging
//!
//! Converts instruction words to assembly text using the conventional ABI
//! register names. Branch and jump targets are printed as absolute
//! addresses computed from the instruction's own PC.

use super::coprocessor::{cop0_funct, cop_op};
use super::decode::Instruction;

const REG_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp", "s8",
    "ra",
];

/// Instruction disassembler
///
/// # Example
/// ```
/// use n64rx::core::cpu::Disassembler;
///
/// let disasm = Disassembler::disassemble(0x0000_0000, 0xFFFF_FFFF_BFC0_0000);
/// assert_eq!(disasm, "nop");
/// ```
pub struct Disassembler;

impl Disassembler {
    /// ABI name of a general-purpose register
    pub fn reg_name(index: u8) -> &'static str {
        REG_NAMES[(index & 0x1F) as usize]
    }

    /// Disassemble a single instruction to human-readable format
    ///
    /// # Arguments
    ///
    /// * `word` - The 32-bit instruction word
    /// * `pc` - Address of the instruction (used for branch/jump targets)
    ///
    /// # Returns
    ///
    /// The assembly text, or `??? 0x........` for encodings with no
    /// mnemonic
    ///
    /// # Example
    /// ```
    /// use n64rx::core::cpu::Disassembler;
    ///
    /// let disasm = Disassembler::disassemble(0x3C01_1234, 0); // LUI at, 0x1234
    /// assert_eq!(disasm, "lui at, 0x1234");
    /// ```
    pub fn disassemble(word: u32, pc: u64) -> String {
        let i = Instruction(word);
        let rs = Self::reg_name(i.rs());
        let rt = Self::reg_name(i.rt());
        let offset = i.imm() as i16;
        let branch_target = pc.wrapping_add(4).wrapping_add(i.imm_sext() << 2);

        let mnemonic = match i.op() {
            0x00 => return Self::disasm_special(i),
            0x01 => return Self::disasm_regimm(i, branch_target),
            0x02 | 0x03 => {
                let target =
                    (pc.wrapping_add(4) & 0xFFFF_FFFF_F000_0000) | ((i.target() as u64) << 2);
                let name = if i.op() == 0x02 { "j" } else { "jal" };
                return format!("{} 0x{:016X}", name, target);
            }
            0x10..=0x13 => return Self::disasm_cop(i),
            0x04 => "beq",
            0x05 => "bne",
            0x14 => "beql",
            0x15 => "bnel",
            0x06 => "blez",
            0x07 => "bgtz",
            0x16 => "blezl",
            0x17 => "bgtzl",
            0x08 => "addi",
            0x09 => "addiu",
            0x0A => "slti",
            0x0B => "sltiu",
            0x0C => "andi",
            0x0D => "ori",
            0x0E => "xori",
            0x0F => "lui",
            0x18 => "daddi",
            0x19 => "daddiu",
            0x1A => "ldl",
            0x1B => "ldr",
            0x20 => "lb",
            0x21 => "lh",
            0x22 => "lwl",
            0x23 => "lw",
            0x24 => "lbu",
            0x25 => "lhu",
            0x26 => "lwr",
            0x27 => "lwu",
            0x28 => "sb",
            0x29 => "sh",
            0x2A => "swl",
            0x2B => "sw",
            0x2C => "sdl",
            0x2D => "sdr",
            0x2E => "swr",
            0x2F => "cache",
            0x30 => "ll",
            0x34 => "lld",
            0x37 => "ld",
            0x38 => "sc",
            0x3C => "scd",
            0x3F => "sd",
            _ => return format!("??? 0x{:08X}", word),
        };

        match i.op() {
            0x04 | 0x05 | 0x14 | 0x15 => {
                format!("{} {}, {}, 0x{:016X}", mnemonic, rs, rt, branch_target)
            }
            0x06 | 0x07 | 0x16 | 0x17 => format!("{} {}, 0x{:016X}", mnemonic, rs, branch_target),
            0x0C..=0x0E => format!("{} {}, {}, 0x{:04X}", mnemonic, rt, rs, i.imm()),
            0x0F => format!("lui {}, 0x{:04X}", rt, i.imm()),
            0x08..=0x0B | 0x18 | 0x19 => format!("{} {}, {}, {}", mnemonic, rt, rs, offset),
            0x2F => format!("cache 0x{:02X}, {}({})", i.rt(), offset, rs),
            _ => format!("{} {}, {}({})", mnemonic, rt, offset, rs),
        }
    }

    /// Disassemble a SPECIAL (opcode 0x00) instruction
    fn disasm_special(i: Instruction) -> String {
        let rs = Self::reg_name(i.rs());
        let rt = Self::reg_name(i.rt());
        let rd = Self::reg_name(i.rd());
        let sa = i.sa();

        match i.funct() {
            0x00 if i.raw() == 0 => "nop".to_string(),
            0x00 => format!("sll {}, {}, {}", rd, rt, sa),
            0x02 => format!("srl {}, {}, {}", rd, rt, sa),
            0x03 => format!("sra {}, {}, {}", rd, rt, sa),
            0x04 => format!("sllv {}, {}, {}", rd, rt, rs),
            0x06 => format!("srlv {}, {}, {}", rd, rt, rs),
            0x07 => format!("srav {}, {}, {}", rd, rt, rs),
            0x08 => format!("jr {}", rs),
            0x09 if i.rd() == 31 => format!("jalr {}", rs),
            0x09 => format!("jalr {}, {}", rd, rs),
            0x0C => "syscall".to_string(),
            0x0D => "break".to_string(),
            0x0F => "sync".to_string(),
            0x10 => format!("mfhi {}", rd),
            0x11 => format!("mthi {}", rs),
            0x12 => format!("mflo {}", rd),
            0x13 => format!("mtlo {}", rs),
            0x14 => format!("dsllv {}, {}, {}", rd, rt, rs),
            0x16 => format!("dsrlv {}, {}, {}", rd, rt, rs),
            0x17 => format!("dsrav {}, {}, {}", rd, rt, rs),
            0x18 => format!("mult {}, {}", rs, rt),
            0x19 => format!("multu {}, {}", rs, rt),
            0x1A => format!("div {}, {}", rs, rt),
            0x1B => format!("divu {}, {}", rs, rt),
            0x1C => format!("dmult {}, {}", rs, rt),
            0x1D => format!("dmultu {}, {}", rs, rt),
            0x1E => format!("ddiv {}, {}", rs, rt),
            0x1F => format!("ddivu {}, {}", rs, rt),
            0x20 => format!("add {}, {}, {}", rd, rs, rt),
            0x21 => format!("addu {}, {}, {}", rd, rs, rt),
            0x22 => format!("sub {}, {}, {}", rd, rs, rt),
            0x23 => format!("subu {}, {}, {}", rd, rs, rt),
            0x24 => format!("and {}, {}, {}", rd, rs, rt),
            0x25 => format!("or {}, {}, {}", rd, rs, rt),
            0x26 => format!("xor {}, {}, {}", rd, rs, rt),
            0x27 => format!("nor {}, {}, {}", rd, rs, rt),
            0x2A => format!("slt {}, {}, {}", rd, rs, rt),
            0x2B => format!("sltu {}, {}, {}", rd, rs, rt),
            0x2C => format!("dadd {}, {}, {}", rd, rs, rt),
            0x2D => format!("daddu {}, {}, {}", rd, rs, rt),
            0x2E => format!("dsub {}, {}, {}", rd, rs, rt),
            0x2F => format!("dsubu {}, {}, {}", rd, rs, rt),
            0x30 => format!("tge {}, {}", rs, rt),
            0x31 => format!("tgeu {}, {}", rs, rt),
            0x32 => format!("tlt {}, {}", rs, rt),
            0x33 => format!("tltu {}, {}", rs, rt),
            0x34 => format!("teq {}, {}", rs, rt),
            0x36 => format!("tne {}, {}", rs, rt),
            0x38 => format!("dsll {}, {}, {}", rd, rt, sa),
            0x3A => format!("dsrl {}, {}, {}", rd, rt, sa),
            0x3B => format!("dsra {}, {}, {}", rd, rt, sa),
            0x3C => format!("dsll32 {}, {}, {}", rd, rt, sa),
            0x3E => format!("dsrl32 {}, {}, {}", rd, rt, sa),
            0x3F => format!("dsra32 {}, {}, {}", rd, rt, sa),
            _ => format!("??? 0x{:08X}", i.raw()),
        }
    }

    /// Disassemble a REGIMM (opcode 0x01) instruction
    fn disasm_regimm(i: Instruction, target: u64) -> String {
        let rs = Self::reg_name(i.rs());
        let imm = i.imm() as i16;

        let (name, is_trap) = match i.rt() {
            0x00 => ("bltz", false),
            0x01 => ("bgez", false),
            0x02 => ("bltzl", false),
            0x03 => ("bgezl", false),
            0x08 => ("tgei", true),
            0x09 => ("tgeiu", true),
            0x0A => ("tlti", true),
            0x0B => ("tltiu", true),
            0x0C => ("teqi", true),
            0x0E => ("tnei", true),
            0x10 => ("bltzal", false),
            0x11 => ("bgezal", false),
            0x12 => ("bltzall", false),
            0x13 => ("bgezall", false),
            _ => return format!("??? 0x{:08X}", i.raw()),
        };

        if is_trap {
            format!("{} {}, {}", name, rs, imm)
        } else {
            format!("{} {}, 0x{:016X}", name, rs, target)
        }
    }

    /// Disassemble a COPz instruction
    fn disasm_cop(i: Instruction) -> String {
        let unit = i.op() & 0x3;
        let rt = Self::reg_name(i.rt());
        let rd = i.rd();

        if i.is_cop_function() {
            if unit == 0 {
                let name = match i.funct() {
                    cop0_funct::TLBR => "tlbr",
                    cop0_funct::TLBWI => "tlbwi",
                    cop0_funct::TLBWR => "tlbwr",
                    cop0_funct::TLBP => "tlbp",
                    cop0_funct::ERET => "eret",
                    _ => return format!("??? 0x{:08X}", i.raw()),
                };
                return name.to_string();
            }
            return format!("cop{} 0x{:07X}", unit, i.raw() & 0x01FF_FFFF);
        }

        let name = match i.rs() {
            cop_op::MF => "mfc",
            cop_op::DMF => "dmfc",
            cop_op::CF => "cfc",
            cop_op::MT => "mtc",
            cop_op::DMT => "dmtc",
            cop_op::CT => "ctc",
            _ => return format!("??? 0x{:08X}", i.raw()),
        };
        format!("{}{} {}, ${}", name, unit, rt, rd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disasm_nop() {
        assert_eq!(Disassembler::disassemble(0x0000_0000, 0), "nop");
    }

    #[test]
    fn test_disasm_addiu() {
        // ADDIU v0, at, 66
        assert_eq!(Disassembler::disassemble(0x2422_0042, 0), "addiu v0, at, 66");
    }

    #[test]
    fn test_disasm_or() {
        // OR v1, v0, at
        assert_eq!(Disassembler::disassemble(0x0041_1825, 0), "or v1, v0, at");
    }

    #[test]
    fn test_disasm_loads_and_stores() {
        assert_eq!(Disassembler::disassemble(0xAC22_0000, 0), "sw v0, 0(at)");
        assert_eq!(Disassembler::disassemble(0x8C22_FFFC, 0), "lw v0, -4(at)");
        assert_eq!(Disassembler::disassemble(0xDC22_0008, 0), "ld v0, 8(at)");
    }

    #[test]
    fn test_disasm_branch_target_is_absolute() {
        // BEQ zero, zero, -1 at 0x8000_0010 -> 0x8000_0010
        let disasm = Disassembler::disassemble(0x1000_FFFF, 0xFFFF_FFFF_8000_0010);
        assert_eq!(disasm, "beq zero, zero, 0xFFFFFFFF80000010");
    }

    #[test]
    fn test_disasm_jump() {
        // J 0x0000_0100 from kseg0
        let disasm = Disassembler::disassemble(0x0800_0040, 0xFFFF_FFFF_8000_0000);
        assert_eq!(disasm, "j 0xFFFFFFFF80000100");
    }

    #[test]
    fn test_disasm_jr_ra() {
        assert_eq!(Disassembler::disassemble(0x03E0_0008, 0), "jr ra");
    }

    #[test]
    fn test_disasm_cop0() {
        assert_eq!(Disassembler::disassemble(0x4200_0018, 0), "eret");
        // MTC0 t0, $12
        assert_eq!(Disassembler::disassemble(0x4088_6000, 0), "mtc0 t0, $12");
        // CFC1 t0, $31
        assert_eq!(Disassembler::disassemble(0x4448_F800, 0), "cfc1 t0, $31");
    }

    #[test]
    fn test_disasm_doubleword_shift() {
        // DSLL32 v0, v1, 4
        assert_eq!(Disassembler::disassemble(0x0003_113C, 0), "dsll32 v0, v1, 4");
    }

    #[test]
    fn test_disasm_unknown() {
        assert!(Disassembler::disassemble(0xFFFF_FFFF, 0).starts_with("sd"));
        assert!(Disassembler::disassemble(0xEC00_0000, 0).starts_with("???"));
    }

    #[test]
    fn test_reg_names() {
        assert_eq!(Disassembler::reg_name(0), "zero");
        assert_eq!(Disassembler::reg_name(29), "sp");
        assert_eq!(Disassembler::reg_name(31), "ra");
    }
}
