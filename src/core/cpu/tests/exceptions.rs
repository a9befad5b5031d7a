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

fn base(offset: u64) -> u64 {
    kseg0(PROGRAM_BASE + offset)
}

fn syscall() -> Instruction {
    Instruction::r_type(Special::Syscall, 0, 0, 0, 0)
}

#[test]
fn test_syscall_vectors_and_saves_epc() {
    let (mut cpu, mut bus) = setup();
    exec(&mut cpu, &mut bus, syscall());

    let cop0 = cpu.cop0();
    assert_eq!(cop0.cause().exc_code(), Some(ExceptionCode::Syscall));
    assert!(!cop0.cause().bd());
    assert!(cop0.status().exl());
    assert_eq!(cop0.reg(Cop0::EPC), base(0));
    assert_eq!(cop0.reg(Cop0::BAD_VADDR), base(0));
    assert_eq!(cpu.pc(), GENERAL_VECTOR);
}

#[test]
fn test_break_raises_breakpoint() {
    let (mut cpu, mut bus) = setup();
    exec(&mut cpu, &mut bus, Instruction::r_type(Special::Break, 0, 0, 0, 0));
    assert_eq!(cpu.cop0().cause().exc_code(), Some(ExceptionCode::Breakpoint));
}

#[test]
fn test_bootstrap_vector_when_bev_set() {
    let (mut cpu, mut bus) = setup();
    cpu.cop0_mut().status_mut().ds_mut().set_bev(true);
    exec(&mut cpu, &mut bus, syscall());
    assert_eq!(cpu.pc(), 0xFFFF_FFFF_BFC0_0380);
}

#[test]
fn test_exception_in_delay_slot_sets_bd_and_epc() {
    let (mut cpu, mut bus) = setup();
    load_program(
        &bus,
        PROGRAM_BASE,
        &[Instruction::i_type(OpCode::Beq, 0, 0, 8), syscall()],
    );

    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();

    let cop0 = cpu.cop0();
    assert!(cop0.cause().bd());
    assert_eq!(cop0.reg(Cop0::EPC), base(4) - 4);
    assert_eq!(cop0.reg(Cop0::BAD_VADDR), base(4));
    assert_eq!(cpu.pc(), GENERAL_VECTOR);
    assert_eq!(cpu.delay_slot(), None);
}

#[test]
fn test_nested_exception_keeps_epc() {
    let (mut cpu, mut bus) = setup();
    exec(&mut cpu, &mut bus, syscall());
    assert_eq!(cpu.cop0().reg(Cop0::EPC), base(0));

    // Second exception from a different address while EXL is still set
    load_program(&bus, PROGRAM_BASE + 0x40, &[Instruction::r_type(Special::Break, 0, 0, 0, 0)]);
    cpu.set_pc(base(0x40));
    cpu.step(&mut bus).unwrap();

    let cop0 = cpu.cop0();
    assert_eq!(cop0.cause().exc_code(), Some(ExceptionCode::Breakpoint));
    assert_eq!(cop0.reg(Cop0::EPC), base(0));
    assert_eq!(cop0.reg(Cop0::BAD_VADDR), base(0x40));
    assert_eq!(cpu.pc(), GENERAL_VECTOR);
}

#[test]
fn test_misaligned_fetch_raises_address_error() {
    let (mut cpu, mut bus) = setup();
    cpu.set_pc(base(2));
    cpu.step(&mut bus).unwrap();

    let cop0 = cpu.cop0();
    assert_eq!(cop0.cause().exc_code(), Some(ExceptionCode::AddressErrorLoad));
    assert_eq!(cop0.reg(Cop0::BAD_VADDR), base(2));
    assert_eq!(cop0.reg(Cop0::EPC), base(2));
    assert_eq!(cpu.pc(), GENERAL_VECTOR);
}

fn enable_line0(cpu: &mut CPU) {
    let mut status = cpu.cop0_mut().status_mut();
    status.set_ie(true);
    status.set_im(0x04);
}

#[test]
fn test_interrupt_taken_before_next_instruction() {
    let (mut cpu, mut bus) = setup();
    load_program(&bus, PROGRAM_BASE, &[Instruction::i_type(OpCode::Addiu, 0, 8, 1)]);
    enable_line0(&mut cpu);
    cpu.set_interrupt_line(0, true);

    cpu.cycle(&mut bus).unwrap();

    let cop0 = cpu.cop0();
    assert_eq!(cop0.cause().exc_code(), Some(ExceptionCode::Interrupt));
    assert_eq!(cop0.reg(Cop0::EPC), base(0));
    assert!(!cop0.cause().bd());
    assert_eq!(cpu.reg(8), 0);
    assert_eq!(cpu.pc(), GENERAL_VECTOR);
}

#[test]
fn test_masked_interrupt_is_ignored() {
    let (mut cpu, mut bus) = setup();
    cpu.cop0_mut().status_mut().set_ie(true);
    cpu.set_interrupt_line(1, true);

    cpu.cycle(&mut bus).unwrap();
    assert_eq!(cpu.pc(), base(4));
}

#[test]
fn test_interrupt_with_pending_delay_slot() {
    let (mut cpu, mut bus) = setup();
    load_program(&bus, PROGRAM_BASE, &[Instruction::i_type(OpCode::Beq, 0, 0, 8)]);
    cpu.cycle(&mut bus).unwrap();
    assert_eq!(cpu.delay_slot(), Some(base(4)));

    enable_line0(&mut cpu);
    cpu.set_interrupt_line(0, true);
    cpu.cycle(&mut bus).unwrap();

    let cop0 = cpu.cop0();
    assert!(cop0.cause().bd());
    assert_eq!(cop0.reg(Cop0::EPC), base(0));
    assert_eq!(cpu.delay_slot(), None);
}

#[test]
fn test_timer_interrupt_from_compare() {
    let (mut cpu, mut bus) = setup();
    {
        let cop0 = cpu.cop0_mut();
        cop0.write_register(Cop0::COUNT, 0);
        cop0.write_register(Cop0::COMPARE, 3);
        let mut status = cop0.status_mut();
        status.set_ie(true);
        status.set_im(0x80);
    }

    cpu.cycle(&mut bus).unwrap();
    cpu.cycle(&mut bus).unwrap();
    assert!(!cpu.cop0().cause().ip().timer());
    assert_eq!(cpu.pc(), base(8));

    // Count reaches Compare on the third cycle and the interrupt is taken
    // in place of the instruction at base + 8
    cpu.cycle(&mut bus).unwrap();
    assert!(cpu.cop0().cause().ip().timer());
    assert_eq!(cpu.cop0().cause().exc_code(), Some(ExceptionCode::Interrupt));
    assert_eq!(cpu.cop0().reg(Cop0::EPC), base(8));
    assert_eq!(cpu.pc(), GENERAL_VECTOR);
}

#[test]
fn test_register_traps() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 5);
    cpu.set_reg(2, 5);

    exec(&mut cpu, &mut bus, Instruction::r_type(Special::Tne, 1, 2, 0, 0));
    assert_eq!(cpu.pc(), base(4));

    exec(&mut cpu, &mut bus, Instruction::r_type(Special::Teq, 1, 2, 0, 0));
    assert_eq!(cpu.cop0().cause().exc_code(), Some(ExceptionCode::Trap));
    assert_eq!(cpu.pc(), GENERAL_VECTOR);
}

#[test]
fn test_signed_and_unsigned_trap_compares() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, (-1i64) as u64);
    cpu.set_reg(2, 1);

    // -1 < 1 signed, but not unsigned
    exec(&mut cpu, &mut bus, Instruction::r_type(Special::Tltu, 1, 2, 0, 0));
    assert_eq!(cpu.pc(), base(4));
    exec(&mut cpu, &mut bus, Instruction::r_type(Special::Tlt, 1, 2, 0, 0));
    assert_eq!(cpu.pc(), GENERAL_VECTOR);
}

#[test]
fn test_immediate_traps() {
    let (mut cpu, mut bus) = setup();
    cpu.set_reg(1, 10);

    exec(&mut cpu, &mut bus, Instruction::reg_imm_type(RegImm::Tlti, 1, 5));
    assert_eq!(cpu.pc(), base(4));
    exec(&mut cpu, &mut bus, Instruction::reg_imm_type(RegImm::Tgeiu, 1, 0xFFFF));
    assert_eq!(cpu.pc(), base(4));
    exec(&mut cpu, &mut bus, Instruction::reg_imm_type(RegImm::Teqi, 1, 10));
    assert_eq!(cpu.cop0().cause().exc_code(), Some(ExceptionCode::Trap));
}

#[test]
fn test_exception_code_conversion() {
    assert_eq!(ExceptionCode::try_from(13), Ok(ExceptionCode::Trap));
    assert_eq!(ExceptionCode::try_from(23), Ok(ExceptionCode::Watch));
    assert_eq!(ExceptionCode::try_from(14), Err(14));
}
