// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration dictionaries handed to components

mod dictionary;

pub use dictionary::{Dictionary, Value};
