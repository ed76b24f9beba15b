// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Host integration: the persistence bridge and its implementations.

pub mod bridge;
pub mod file;
pub mod memory;
pub mod sync;
