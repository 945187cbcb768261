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

use super::types::SignatureReference;

/// A single signature match, produced by a scan state and retained until it is
/// stopped. Immutable; callers read it through the accessors below.
#[derive(Clone, Debug)]
pub struct ScanResult {
    signature: SignatureReference,
    offset: u64,
}

impl ScanResult {
    /// Creates a new scan result.
    pub(super) fn new(signature: SignatureReference, offset: u64) -> Self {
        Self {
            signature: signature,
            offset: offset,
        }
    }

    /// The identifier of the matching signature.
    pub fn get_identifier(&self) -> &str {
        &self.signature.identifier
    }

    /// The matching signature.
    pub fn signature(&self) -> &SignatureReference {
        &self.signature
    }

    /// The absolute offset at which the pattern was found.
    pub fn get_offset(&self) -> u64 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::enums::PatternType;
    use crate::signature::Signature;

    #[test]
    fn test_accessors() {
        let signature: SignatureReference = Arc::new(Signature::new(
            "vdh",
            PatternType::BoundToStart,
            0,
            "conectix".as_bytes(),
        ));
        let scan_result: ScanResult = ScanResult::new(Arc::clone(&signature), 512);

        assert_eq!(scan_result.get_identifier(), "vdh");
        assert_eq!(scan_result.get_offset(), 512);
    }
}
