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

/// Default size in bytes of the internal scan buffer used by a scan state.
pub(super) const DEFAULT_SCAN_BUFFER_SIZE: usize = 64 * 1024;

/// Smallest pattern size accepted by `Scanner::add_signature`.
pub(super) const MINIMUM_PATTERN_SIZE: usize = 4;

/// Per-byte-value classification used when calculating byte value weights.
///
/// Indexed by byte value. `true` marks a byte value considered uncommon enough in
/// arbitrary data to be a useful split point (most byte values); `false` marks tab,
/// newline, carriage return, space, ASCII digits and letters, 0xff, and the two
/// low values 0x00 and 0x01, which occur too frequently in ordinary data to
/// discriminate well between signatures. 0x08 is left marked uncommon, matching
/// the reference table this is reproduced from byte-for-byte.
pub(super) const SIGSCAN_COMMON_BYTE_VALUES: [bool; 256] = [
    false, false, true, true, true, true, true, true, true, false, false, true, true, false, true, true,
    true, true, true, true, true, true, true, true, true, true, true, true, true, true, true, true,
    false, true, true, true, true, true, true, true, true, true, true, true, true, true, true, true,
    false, false, false, false, false, false, false, false, false, false, true, true, true, true, true, true,
    true, false, false, false, false, false, false, false, false, false, false, false, false, false, false, false,
    false, false, false, false, false, false, false, false, false, false, false, true, true, true, true, true,
    true, false, false, false, false, false, false, false, false, false, false, false, false, false, false, false,
    false, false, false, false, false, false, false, false, false, false, false, true, true, true, true, true,
    true, true, true, true, true, true, true, true, true, true, true, true, true, true, true, true,
    true, true, true, true, true, true, true, true, true, true, true, true, true, true, true, true,
    true, true, true, true, true, true, true, true, true, true, true, true, true, true, true, true,
    true, true, true, true, true, true, true, true, true, true, true, true, true, true, true, true,
    true, true, true, true, true, true, true, true, true, true, true, true, true, true, true, true,
    true, true, true, true, true, true, true, true, true, true, true, true, true, true, true, true,
    true, true, true, true, true, true, true, true, true, true, true, true, true, true, true, true,
    true, true, true, true, true, true, true, true, true, true, true, true, true, true, true, false,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_byte_values_length() {
        assert_eq!(SIGSCAN_COMMON_BYTE_VALUES.len(), 256);
    }

    #[test]
    fn test_common_byte_values_ascii_letters_are_common() {
        assert_eq!(SIGSCAN_COMMON_BYTE_VALUES[b'A' as usize], false);
        assert_eq!(SIGSCAN_COMMON_BYTE_VALUES[b'z' as usize], false);
        assert_eq!(SIGSCAN_COMMON_BYTE_VALUES[b'5' as usize], false);
        assert_eq!(SIGSCAN_COMMON_BYTE_VALUES[0xff], false);
    }

    #[test]
    fn test_common_byte_values_low_values_reproduce_reference_table() {
        assert_eq!(SIGSCAN_COMMON_BYTE_VALUES[0x00], false);
        assert_eq!(SIGSCAN_COMMON_BYTE_VALUES[0x01], false);
        assert_eq!(SIGSCAN_COMMON_BYTE_VALUES[0x08], true);
    }
}
