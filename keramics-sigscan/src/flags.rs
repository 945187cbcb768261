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

use super::enums::PatternType;

bitflags::bitflags! {
    /// Signature flags, as passed to `Scanner::add_signature`.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct SignatureFlags: u32 {
        /// The pattern offset is relative from the start of the data.
        const OFFSET_RELATIVE_FROM_START = 0x00000001;
        /// The pattern offset is relative from the end of the data.
        const OFFSET_RELATIVE_FROM_END = 0x00000002;
    }
}

/// Converts signature flags into the pattern type used throughout the scan engine.
///
/// Returns `None` if both relative flags are set, which is not a valid combination.
pub fn pattern_type_from_flags(flags: SignatureFlags) -> Option<PatternType> {
    let from_start: bool = flags.contains(SignatureFlags::OFFSET_RELATIVE_FROM_START);
    let from_end: bool = flags.contains(SignatureFlags::OFFSET_RELATIVE_FROM_END);

    match (from_start, from_end) {
        (true, true) => None,
        (true, false) => Some(PatternType::BoundToStart),
        (false, true) => Some(PatternType::BoundToEnd),
        (false, false) => Some(PatternType::Unbound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_type_from_flags() {
        assert_eq!(
            pattern_type_from_flags(SignatureFlags::OFFSET_RELATIVE_FROM_START),
            Some(PatternType::BoundToStart)
        );
        assert_eq!(
            pattern_type_from_flags(SignatureFlags::OFFSET_RELATIVE_FROM_END),
            Some(PatternType::BoundToEnd)
        );
        assert_eq!(
            pattern_type_from_flags(SignatureFlags::empty()),
            Some(PatternType::Unbound)
        );
        assert_eq!(
            pattern_type_from_flags(
                SignatureFlags::OFFSET_RELATIVE_FROM_START | SignatureFlags::OFFSET_RELATIVE_FROM_END
            ),
            None
        );
    }
}
