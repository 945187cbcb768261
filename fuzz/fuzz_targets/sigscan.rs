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

#![no_main]

use std::cmp::max;

use libfuzzer_sys::fuzz_target;

use keramics_sigscan::{PatternType, ScanState, Scanner};

/// Builds a scanner with a fixed, representative mix of bound-to-start,
/// bound-to-end and unbound signatures, exercising all three compiled trees.
fn build_scanner() -> Scanner {
    let mut scanner: Scanner = Scanner::new();

    let _ = scanner.add_signature(
        "header",
        PatternType::BoundToStart,
        0,
        &[0x4c, 0x00, 0x00, 0x00, 0x01, 0x14, 0x02, 0x00],
    );
    let _ = scanner.add_signature(
        "header2",
        PatternType::BoundToStart,
        0,
        "regf".as_bytes(),
    );
    let _ = scanner.add_signature(
        "footer",
        PatternType::BoundToEnd,
        8,
        "conectix".as_bytes(),
    );
    let _ = scanner.add_signature(
        "unbound",
        PatternType::Unbound,
        0,
        &[0x50, 0x4b, 0x07, 0x08],
    );
    let _ = scanner.build();
    scanner
}

// Signature scanner fuzz target: feeds arbitrary data through the streaming
// scan state, split into chunks whose size is derived from the input so the
// buffer-boundary carry-over path gets exercised too.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let scanner: Scanner = build_scanner();

    let chunk_size: usize = max(1, data[0] as usize);
    let data: &[u8] = &data[1..];

    let mut scan_state: ScanState = ScanState::new();
    if scan_state.set_data_size(data.len() as u64).is_err() {
        return;
    }
    if scan_state.start(&scanner).is_err() {
        return;
    }
    for chunk in data.chunks(chunk_size) {
        if scan_state.scan_buffer(chunk).is_err() {
            return;
        }
    }
    _ = scan_state.stop();
    if let Ok(number_of_results) = scan_state.number_of_results() {
        for result_index in 0..number_of_results {
            _ = scan_state.get_result(result_index);
        }
    }
});
