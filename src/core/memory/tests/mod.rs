// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Memory Bus Tests
//!
//! - `basic`: construction, RDRAM access and program loading
//! - `bus`: mapping-entry dispatch, offsets, forwarding and overlaps
//! - `regions`: physical region identification
//! - `helpers`: common test utilities

use super::*;
use crate::core::error::EmulatorError;

mod helpers;
