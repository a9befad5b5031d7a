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
use crate::core::cpu::{Cop0, OpCode};

#[test]
fn test_snapshot_captures_registers() {
    let mut system = booted_system(EmulatorConfig::default(), &[]);
    {
        let cpu = system.cpu_mut();
        cpu.set_reg(4, 0xAAAA);
        cpu.set_hi(1);
        cpu.set_lo(2);
        cpu.cop0_mut().set_reg(Cop0::EPC, 0x8000_0040);
        cpu.cop1_mut().set_fcr31(0x0100_0003);
        cpu.cop1_mut().set_fpr_f64(2, 1.5);
    }
    system.step_n(3).unwrap();

    let snapshot = system.snapshot();
    assert_eq!(snapshot.cycles, 3);
    assert_eq!(snapshot.pc, System::kseg0(LOAD_ADDRESS) + 12);
    assert_eq!(snapshot.gpr[4], 0xAAAA);
    assert_eq!((snapshot.hi, snapshot.lo), (1, 2));
    assert_eq!(snapshot.cop0[Cop0::EPC], 0x8000_0040);
    assert_eq!(snapshot.cop0[Cop0::PRID], Cop0::PRID_VALUE);
    assert_eq!(snapshot.fcr31, 0x0100_0003);
    assert_eq!(snapshot.fpr[2], 1.5f64.to_bits());
}

#[test]
fn test_snapshot_restore() {
    let program = [Instruction::i_type(OpCode::Beq, 0, 0, 4)];
    let mut system = booted_system(EmulatorConfig::default(), &program);
    system.cycle().unwrap();
    let snapshot = system.snapshot();

    let mut other = booted_system(EmulatorConfig::default(), &[]);
    snapshot.restore(other.cpu_mut());

    assert_eq!(CpuSnapshot::capture(other.cpu(), 1), snapshot);
    assert_eq!(other.cpu().delay_slot(), Some(System::kseg0(LOAD_ADDRESS) + 4));
}

#[test]
fn test_snapshot_json() {
    let system = booted_system(EmulatorConfig::default(), &[]);
    let snapshot = system.snapshot();

    let json = snapshot.to_json().unwrap();
    assert!(json.contains("\"pc\""));
    assert!(json.contains("\"fcr31\""));
    assert_eq!(CpuSnapshot::from_json(&json).unwrap(), snapshot);
}

#[test]
fn test_save_and_load_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("machine.state");

    let program = [
        Instruction::i_type(OpCode::Addiu, 0, 8, 0x55),
        Instruction::i_type(OpCode::Lui, 0, 9, 0x8000),
        Instruction::i_type(OpCode::Sw, 9, 8, 0x0200),
    ];
    let mut system = booted_system(EmulatorConfig::default(), &program);
    system.step_n(3).unwrap();
    system.cpu_mut().cop1_mut().set_fpr(31, 0x4009_21FB_5444_2D18);
    system.save_state(&path).unwrap();
    let saved = system.snapshot();

    system.reset();
    assert_eq!(system.bus().read_word(0x200).unwrap(), 0);

    system.load_state(&path).unwrap();
    assert_eq!(system.snapshot(), saved);
    assert_eq!(system.cycles(), 3);
    assert_eq!(system.cpu().reg(8), 0x55);
    assert_eq!(system.cpu().cop1().fpr(31), 0x4009_21FB_5444_2D18);
    assert_eq!(system.bus().read_word(0x200).unwrap(), 0x55);
}
