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

//! Small test programs

use n64rx::core::cpu::{cop0_funct, cop_op, Cop0, Instruction, OpCode, Special};

#[allow(dead_code)]
pub fn addiu(rt: u8, rs: u8, imm: u16) -> Instruction {
    Instruction::i_type(OpCode::Addiu, rs, rt, imm)
}

#[allow(dead_code)]
pub fn nop() -> Instruction {
    Instruction(0)
}

/// Register arithmetic: $3 = 1 + 2, $4 = $3 << 4, $5 = $4 - $3
#[allow(dead_code)]
pub fn basic_arithmetic() -> Vec<Instruction> {
    vec![
        addiu(1, 0, 1),
        addiu(2, 0, 2),
        Instruction::r_type(Special::Add, 1, 2, 3, 0),
        Instruction::r_type(Special::Sll, 0, 3, 4, 4),
        Instruction::r_type(Special::Subu, 4, 3, 5, 0),
    ]
}

/// Store through kseg1 and load back through kseg0
///
/// Leaves 0xAA in $3 and physical 0x2000 holding 0xAA.
#[allow(dead_code)]
pub fn uncached_store_cached_load() -> Vec<Instruction> {
    vec![
        Instruction::i_type(OpCode::Lui, 0, 1, 0xA000),
        Instruction::i_type(OpCode::Lui, 0, 4, 0x8000),
        addiu(2, 0, 0xAA),
        Instruction::i_type(OpCode::Sw, 1, 2, 0x2000),
        Instruction::i_type(OpCode::Lw, 4, 3, 0x2000),
    ]
}

/// Taken BEQ over one instruction; $3 must stay zero
#[allow(dead_code)]
pub fn branch_over() -> Vec<Instruction> {
    vec![
        addiu(1, 0, 1),
        addiu(2, 0, 1),
        Instruction::i_type(OpCode::Beq, 1, 2, 2),
        nop(),
        addiu(3, 0, 0x42),
        addiu(4, 0, 0x99),
    ]
}

/// SYSCALL followed by a marker write to $8
#[allow(dead_code)]
pub fn syscall_then_marker() -> Vec<Instruction> {
    vec![Instruction::r_type(Special::Syscall, 0, 0, 0, 0), addiu(8, 0, 7)]
}

/// Handler that skips the faulting instruction: EPC += 4, $27 = 1, ERET
#[allow(dead_code)]
pub fn skip_handler() -> Vec<Instruction> {
    vec![
        Instruction::cop_move(0, cop_op::MF, 26, Cop0::EPC as u8),
        addiu(26, 26, 4),
        Instruction::cop_move(0, cop_op::MT, 26, Cop0::EPC as u8),
        addiu(27, 0, 1),
        Instruction::cop_function(0, cop0_funct::ERET),
    ]
}
