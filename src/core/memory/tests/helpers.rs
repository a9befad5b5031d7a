// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Helper functions for memory tests

use super::*;

/// Creates a Bus with the default configuration
#[allow(dead_code)]
pub fn create_test_bus() -> Bus {
    Bus::new(&EmulatorConfig::default()).unwrap()
}

/// Creates a Bus with a small RDRAM
#[allow(dead_code)]
pub fn create_small_bus(rdram_size: usize) -> Bus {
    let config = EmulatorConfig {
        rdram_size,
        ..EmulatorConfig::default()
    };
    Bus::new(&config).unwrap()
}

/// Builds a read/write entry backed by a register block
#[allow(dead_code)]
pub fn block_entry(
    name: &str,
    base: u64,
    count: usize,
) -> (MappingEntry, Rc<RefCell<RegisterBlock>>) {
    let block = Rc::new(RefCell::new(RegisterBlock::new(name, base, count)));
    (MappingEntry::device(Rc::clone(&block)), block)
}
