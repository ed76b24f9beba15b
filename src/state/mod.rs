// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Reducer-based editor state machines.
//!
//! Two nested machines: the document machine owns the committed screen
//! and delegates pointer interaction to the stage machine.

pub mod document;
pub mod stage;
