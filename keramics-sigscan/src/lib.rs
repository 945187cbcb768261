/* Copyright 2024-2025 Joachim Metz <joachim.metz@gmail.com>
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may
 * obtain a copy of the License at https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
 * WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
 * License for the specific language governing permissions and limitations
 * under the License.
 */

//! Detects the presence and position of binary signatures within a byte stream.
//!
//! A [`Scanner`] owns a set of [`Signature`]s, each a fixed byte pattern anchored
//! at an offset relative to the stream start, the stream end, or unbound.
//! `Scanner::build` compiles three scan trees (header, footer, unbound) plus a
//! Boyer-Moore-Horspool skip table for the unbound path; a [`ScanState`] then
//! streams bytes through the compiled scanner and collects [`ScanResult`]s.

mod constants;
mod enums;
mod errors;
mod flags;
mod groups;
mod pattern_weights;
mod scan_result;
mod scan_state;
mod scan_tree;
mod scanner;
mod signature;
mod signature_table;
mod skip_table;
mod types;

pub use enums::{PatternType, ScanStatus};
pub use errors::SigscanError;
pub use flags::{pattern_type_from_flags, SignatureFlags};
pub use scan_result::ScanResult;
pub use scan_state::ScanState;
pub use scanner::Scanner;
pub use signature::Signature;
pub use types::SignatureReference;
