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

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use n64rx::core::config::EmulatorConfig;
use n64rx::core::cpu::{Disassembler, Instruction, OpCode, Special, CPU};
use n64rx::core::memory::Bus;
use n64rx::core::system::{RunControl, System};
use std::hint::black_box;

const PROGRAM_BASE: u64 = 0x1000;
const KSEG0_PROGRAM: u64 = 0xFFFF_FFFF_8000_1000;

fn setup(program: &[Instruction]) -> (CPU, Bus) {
    let mut cpu = CPU::new();
    let bus = Bus::new(&EmulatorConfig::default()).unwrap();
    for (i, instruction) in program.iter().enumerate() {
        bus.write_word(PROGRAM_BASE + 4 * i as u64, instruction.raw())
            .unwrap();
    }
    cpu.cop0_mut().status_mut().set_erl(false);
    cpu.set_pc(KSEG0_PROGRAM);
    (cpu, bus)
}

fn cpu_step_benchmark(c: &mut Criterion) {
    c.bench_function("cpu_step_nop", |b| {
        let (mut cpu, mut bus) = setup(&[]);
        b.iter(|| {
            cpu.set_pc(KSEG0_PROGRAM);
            black_box(cpu.step(&mut bus).unwrap());
        });
    });

    c.bench_function("cpu_step_alu_block", |b| {
        let program = [
            Instruction::i_type(OpCode::Addiu, 8, 8, 1),
            Instruction::r_type(Special::Addu, 8, 9, 10, 0),
            Instruction::r_type(Special::Dsll32, 0, 10, 11, 4),
            Instruction::r_type(Special::Xor, 11, 8, 12, 0),
            Instruction::r_type(Special::Dmultu, 12, 10, 0, 0),
            Instruction::r_type(Special::Mflo, 0, 0, 13, 0),
            Instruction::i_type(OpCode::Sltiu, 13, 14, 0x7FFF),
            Instruction::r_type(Special::Srav, 14, 13, 15, 0),
        ];
        let (mut cpu, mut bus) = setup(&program);
        b.iter(|| {
            cpu.set_pc(KSEG0_PROGRAM);
            for _ in 0..program.len() {
                cpu.step(&mut bus).unwrap();
            }
            black_box(cpu.reg(15));
        });
    });
}

fn cpu_register_access_benchmark(c: &mut Criterion) {
    c.bench_function("cpu_register_read", |b| {
        let cpu = CPU::new();
        b.iter(|| {
            for i in 0..32 {
                black_box(cpu.reg(i));
            }
        });
    });

    c.bench_function("cpu_register_write", |b| {
        let mut cpu = CPU::new();
        b.iter(|| {
            for i in 0..32 {
                cpu.set_reg(i, black_box(i as u64 * 100));
            }
        });
    });
}

fn bus_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("bus");
    let bus = Bus::new(&EmulatorConfig::default()).unwrap();

    // RDRAM sits in the first root entry; SI is behind the RCP sub-table
    for (name, paddr) in [("rdram", 0x0010_0000u64), ("rcp_forwarded", 0x0480_0000)] {
        group.bench_with_input(BenchmarkId::new("read_word", name), &paddr, |b, &paddr| {
            b.iter(|| black_box(bus.read_word(black_box(paddr)).unwrap()));
        });
    }

    group.bench_function("write_word_rdram", |b| {
        b.iter(|| bus.write_word(black_box(0x0010_0000), black_box(0xDEAD_BEEF)).unwrap());
    });

    group.finish();
}

fn system_run_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("system");

    for cycles in [1_000u64, 10_000] {
        group.bench_with_input(BenchmarkId::new("run_for", cycles), &cycles, |b, &cycles| {
            let mut system = System::new().unwrap();
            // j . ; nop
            let target = (KSEG0_PROGRAM as u32 & 0x0FFF_FFFF) >> 2;
            let program = [Instruction::j_type(OpCode::J, target).raw(), 0];
            let bytes: Vec<u8> = program.iter().flat_map(|w| w.to_be_bytes()).collect();
            system.load_program(PROGRAM_BASE, &bytes).unwrap();
            system.boot(KSEG0_PROGRAM);
            let control = RunControl::new();

            b.iter(|| black_box(system.run_for(&control, cycles).unwrap()));
        });
    }

    group.finish();
}

fn disassembler_benchmark(c: &mut Criterion) {
    let words = [0x3C01_1234u32, 0x2422_0042, 0x0043_2021, 0x1022_0001, 0x8C23_0000];
    c.bench_function("disassemble", |b| {
        b.iter(|| {
            for &word in &words {
                black_box(Disassembler::disassemble(black_box(word), 0xFFFF_FFFF_8000_0000));
            }
        });
    });
}

criterion_group!(
    benches,
    cpu_step_benchmark,
    cpu_register_access_benchmark,
    bus_benchmark,
    system_run_benchmark,
    disassembler_benchmark
);
criterion_main!(benches);
