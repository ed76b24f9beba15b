// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the hotspot editor.

pub mod sidebar;
pub mod stage;
