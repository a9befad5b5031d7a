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

use super::*;

fn special(funct: Special, rs: u8, rt: u8, rd: u8) -> Instruction {
    Instruction::r_type(funct, rs, rt, rd, 0)
}

#[test]
fn test_addu_sign_extends_32bit_result() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0x7FFF_FFFF);
    cpu.set_reg(2, 1);
    exec(&mut cpu, &mut bus, special(Special::Addu, 1, 2, 3));
    assert_eq!(cpu.reg(3), 0xFFFF_FFFF_8000_0000);
}

#[test]
fn test_addu_ignores_upper_bits() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0x1234_5678_0000_0001);
    cpu.set_reg(2, 0xFFFF_0000_0000_0002);
    exec(&mut cpu, &mut bus, special(Special::Addu, 1, 2, 3));
    assert_eq!(cpu.reg(3), 3);
}

#[test]
fn test_add_overflow_raises_and_keeps_rd() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0x7FFF_FFFF);
    cpu.set_reg(2, 1);
    cpu.set_reg(3, 0xAAAA);
    exec(&mut cpu, &mut bus, special(Special::Add, 1, 2, 3));

    assert_eq!(cpu.reg(3), 0xAAAA);
    assert_eq!(cpu.cop0().cause().exc_code(), Some(ExceptionCode::Overflow));
    assert_eq!(cpu.pc(), GENERAL_VECTOR);
}

#[test]
fn test_addi_negative_immediate() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 10);
    exec(&mut cpu, &mut bus, Instruction::i_type(OpCode::Addi, 1, 2, (-20i16) as u16));
    assert_eq!(cpu.reg(2), (-10i64) as u64);
}

#[test]
fn test_addiu_never_traps() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0x7FFF_FFFF);
    exec(&mut cpu, &mut bus, Instruction::i_type(OpCode::Addiu, 1, 2, 1));
    assert_eq!(cpu.reg(2), 0xFFFF_FFFF_8000_0000);
    assert_eq!(cpu.pc(), kseg0(PROGRAM_BASE + 4));
}

#[test]
fn test_sub_and_subu() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 5);
    cpu.set_reg(2, 7);
    exec(&mut cpu, &mut bus, special(Special::Subu, 1, 2, 3));
    assert_eq!(cpu.reg(3), (-2i64) as u64);

    cpu.set_reg(1, 0x8000_0000);
    cpu.set_reg(2, 1);
    cpu.set_reg(4, 0x55);
    exec(&mut cpu, &mut bus, special(Special::Sub, 1, 2, 4));
    assert_eq!(cpu.reg(4), 0x55);
    assert_eq!(cpu.cop0().cause().exc_code(), Some(ExceptionCode::Overflow));
}

#[test]
fn test_daddu_and_dsubu_are_64bit() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0x0000_0001_FFFF_FFFF);
    cpu.set_reg(2, 1);
    exec(&mut cpu, &mut bus, special(Special::Daddu, 1, 2, 3));
    assert_eq!(cpu.reg(3), 0x0000_0002_0000_0000);

    exec(&mut cpu, &mut bus, special(Special::Dsubu, 2, 1, 4));
    assert_eq!(cpu.reg(4), 0xFFFF_FFFE_0000_0002);
}

#[test]
fn test_dadd_overflow() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, i64::MAX as u64);
    cpu.set_reg(2, 1);
    exec(&mut cpu, &mut bus, special(Special::Dadd, 1, 2, 3));
    assert_eq!(cpu.reg(3), 0);
    assert_eq!(cpu.cop0().cause().exc_code(), Some(ExceptionCode::Overflow));
}

#[test]
fn test_daddiu() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0x1_0000_0000);
    exec(&mut cpu, &mut bus, Instruction::i_type(OpCode::Daddiu, 1, 2, 0xFFFF));
    assert_eq!(cpu.reg(2), 0xFFFF_FFFF);
}

#[test]
fn test_set_less_than_signed_and_unsigned() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, (-1i64) as u64);
    cpu.set_reg(2, 1);
    exec(&mut cpu, &mut bus, special(Special::Slt, 1, 2, 3));
    assert_eq!(cpu.reg(3), 1);
    exec(&mut cpu, &mut bus, special(Special::Sltu, 1, 2, 3));
    assert_eq!(cpu.reg(3), 0);

    // SLTIU compares against the sign-extended immediate
    cpu.set_reg(1, 5);
    exec(&mut cpu, &mut bus, Instruction::i_type(OpCode::Sltiu, 1, 4, 0xFFFF));
    assert_eq!(cpu.reg(4), 1);
    exec(&mut cpu, &mut bus, Instruction::i_type(OpCode::Slti, 1, 4, 0xFFFF));
    assert_eq!(cpu.reg(4), 0);
}

#[test]
fn test_logical_immediates_zero_extend() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0xFFFF_FFFF_FFFF_0000);
    exec(&mut cpu, &mut bus, Instruction::i_type(OpCode::Ori, 1, 2, 0x8001));
    assert_eq!(cpu.reg(2), 0xFFFF_FFFF_FFFF_8001);
    exec(&mut cpu, &mut bus, Instruction::i_type(OpCode::Andi, 1, 3, 0xFFFF));
    assert_eq!(cpu.reg(3), 0);
    exec(&mut cpu, &mut bus, Instruction::i_type(OpCode::Xori, 2, 4, 0xFFFF));
    assert_eq!(cpu.reg(4), 0xFFFF_FFFF_FFFF_7FFE);
}

#[test]
fn test_lui_sign_extends() {
    let (mut cpu, mut bus) = setup();
    exec(&mut cpu, &mut bus, Instruction::i_type(OpCode::Lui, 0, 1, 0x8000));
    assert_eq!(cpu.reg(1), 0xFFFF_FFFF_8000_0000);
}

#[test]
fn test_nor() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0xF0F0);
    cpu.set_reg(2, 0x0F0F);
    exec(&mut cpu, &mut bus, special(Special::Nor, 1, 2, 3));
    assert_eq!(cpu.reg(3), 0xFFFF_FFFF_FFFF_0000);
}

#[test]
fn test_32bit_shifts() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0x0000_0000_8000_0001);
    exec(&mut cpu, &mut bus, Instruction::r_type(Special::Sll, 0, 1, 2, 1));
    assert_eq!(cpu.reg(2), 2);

    cpu.set_reg(1, 0xFFFF_FFFF_8000_0000);
    exec(&mut cpu, &mut bus, Instruction::r_type(Special::Srl, 0, 1, 2, 4));
    assert_eq!(cpu.reg(2), 0x0800_0000);
    exec(&mut cpu, &mut bus, Instruction::r_type(Special::Sra, 0, 1, 2, 4));
    assert_eq!(cpu.reg(2), 0xFFFF_FFFF_F800_0000);

    // Variable shifts use only the low 5 bits of rs
    cpu.set_reg(3, 33);
    cpu.set_reg(1, 1);
    exec(&mut cpu, &mut bus, special(Special::Sllv, 3, 1, 2));
    assert_eq!(cpu.reg(2), 2);
}

#[test]
fn test_64bit_shifts() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 1);
    exec(&mut cpu, &mut bus, Instruction::r_type(Special::Dsll32, 0, 1, 2, 4));
    assert_eq!(cpu.reg(2), 1 << 36);

    cpu.set_reg(1, 0x8000_0000_0000_0000);
    exec(&mut cpu, &mut bus, Instruction::r_type(Special::Dsra32, 0, 1, 2, 0));
    assert_eq!(cpu.reg(2), 0xFFFF_FFFF_8000_0000);
    exec(&mut cpu, &mut bus, Instruction::r_type(Special::Dsrl, 0, 1, 2, 31));
    assert_eq!(cpu.reg(2), 0x8000_0000_0000_0000 >> 31);

    cpu.set_reg(3, 63);
    exec(&mut cpu, &mut bus, special(Special::Dsrlv, 3, 1, 2));
    assert_eq!(cpu.reg(2), 1);
}

#[test]
fn test_mult_signed() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, (-2i64) as u64);
    cpu.set_reg(2, 3);
    exec(&mut cpu, &mut bus, special(Special::Mult, 1, 2, 0));
    assert_eq!(cpu.lo(), (-6i64) as u64);
    assert_eq!(cpu.hi(), u64::MAX);
}

#[test]
fn test_multu_sign_extends_halves() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0xFFFF_FFFF);
    cpu.set_reg(2, 0xFFFF_FFFF);
    exec(&mut cpu, &mut bus, special(Special::Multu, 1, 2, 0));
    // 0xFFFF_FFFE_0000_0001
    assert_eq!(cpu.hi(), 0xFFFF_FFFF_FFFF_FFFE);
    assert_eq!(cpu.lo(), 1);
}

#[test]
fn test_dmultu_full_product() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, u64::MAX);
    cpu.set_reg(2, u64::MAX);
    exec(&mut cpu, &mut bus, special(Special::Dmultu, 1, 2, 0));
    assert_eq!(cpu.hi(), 0xFFFF_FFFF_FFFF_FFFE);
    assert_eq!(cpu.lo(), 0x0000_0000_0000_0001);
}

#[test]
fn test_dmultu_cross_term_carry() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0x1_0000_0001);
    cpu.set_reg(2, 0xFFFF_FFFF_0000_0000);
    exec(&mut cpu, &mut bus, special(Special::Dmultu, 1, 2, 0));
    let expected = 0x1_0000_0001u128 * 0xFFFF_FFFF_0000_0000u128;
    assert_eq!(cpu.hi(), (expected >> 64) as u64);
    assert_eq!(cpu.lo(), expected as u64);
}

#[test]
fn test_dmult_signed() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, (-1i64) as u64);
    cpu.set_reg(2, 5);
    exec(&mut cpu, &mut bus, special(Special::Dmult, 1, 2, 0));
    assert_eq!(cpu.lo(), (-5i64) as u64);
    assert_eq!(cpu.hi(), u64::MAX);
}

#[test]
fn test_div_and_divu() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, (-7i64) as u64);
    cpu.set_reg(2, 2);
    exec(&mut cpu, &mut bus, special(Special::Div, 1, 2, 0));
    assert_eq!(cpu.lo(), (-3i64) as u64);
    assert_eq!(cpu.hi(), (-1i64) as u64);

    cpu.set_reg(1, 0xFFFF_FFFF);
    exec(&mut cpu, &mut bus, special(Special::Divu, 1, 2, 0));
    assert_eq!(cpu.lo(), 0x7FFF_FFFF);
    assert_eq!(cpu.hi(), 1);
}

#[test]
fn test_div_min_by_minus_one() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0xFFFF_FFFF_8000_0000);
    cpu.set_reg(2, u64::MAX);
    exec(&mut cpu, &mut bus, special(Special::Div, 1, 2, 0));
    assert_eq!(cpu.lo(), 0xFFFF_FFFF_8000_0000);
    assert_eq!(cpu.hi(), 0);
}

#[test]
fn test_divide_by_zero_leaves_hi_lo() {
    let (mut cpu, mut bus) = setup();
    for funct in [Special::Div, Special::Divu, Special::Ddiv, Special::Ddivu] {
        cpu.set_hi(0x1111);
        cpu.set_lo(0x2222);
        cpu.set_reg(1, 99);
        cpu.set_reg(2, 0);
        exec(&mut cpu, &mut bus, special(funct, 1, 2, 0));
        assert_eq!(cpu.hi(), 0x1111, "{:?}", funct);
        assert_eq!(cpu.lo(), 0x2222, "{:?}", funct);
    }
}

#[test]
fn test_ddivu() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, u64::MAX);
    cpu.set_reg(2, 0x1_0000_0000);
    exec(&mut cpu, &mut bus, special(Special::Ddivu, 1, 2, 0));
    assert_eq!(cpu.lo(), 0xFFFF_FFFF);
    assert_eq!(cpu.hi(), 0xFFFF_FFFF);
}

#[test]
fn test_hi_lo_moves() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 0xDEAD_BEEF_0000_0001);
    exec(&mut cpu, &mut bus, special(Special::Mthi, 1, 0, 0));
    exec(&mut cpu, &mut bus, special(Special::Mtlo, 1, 0, 0));
    exec(&mut cpu, &mut bus, special(Special::Mfhi, 0, 0, 2));
    exec(&mut cpu, &mut bus, special(Special::Mflo, 0, 0, 3));
    assert_eq!(cpu.reg(2), 0xDEAD_BEEF_0000_0001);
    assert_eq!(cpu.reg(3), 0xDEAD_BEEF_0000_0001);
}
