// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for image-map documents.

pub mod area;
pub mod screen;
