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

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::constants::DEFAULT_SCAN_BUFFER_SIZE;
use super::constants::MINIMUM_PATTERN_SIZE;
use super::enums::PatternType;
use super::errors::SigscanError;
use super::scan_tree::ScanTree;
use super::signature::Signature;
use super::types::SignatureReference;

/// Compiled signature scanner.
///
/// Holds the signature store and the three compiled scan trees (header, footer,
/// unbound). Immutable once `build` has run; safe to share read-only across scan
/// states and threads.
pub struct Scanner {
    /// Signatures.
    pub(super) signatures: Vec<SignatureReference>,

    /// Identifiers already in use, to reject duplicates.
    identifiers: HashSet<String>,

    /// Header (offset relative from start) scan tree.
    pub(super) header_scan_tree: ScanTree,

    /// Footer (offset relative from end) scan tree.
    pub(super) footer_scan_tree: ScanTree,

    /// Unbound scan tree.
    pub(super) unbound_scan_tree: ScanTree,

    /// Whether `build` has run.
    compiled: bool,

    /// Size in bytes of the internal buffer a scan state allocates for this scanner.
    pub(super) scan_buffer_size: usize,

    /// Cooperative abort flag, observed by active scan states between scan windows.
    abort_requested: AtomicBool,
}

impl Scanner {
    /// Creates a new, empty scanner.
    pub fn new() -> Self {
        Self {
            signatures: Vec::new(),
            identifiers: HashSet::new(),
            header_scan_tree: ScanTree::new(PatternType::BoundToStart),
            footer_scan_tree: ScanTree::new(PatternType::BoundToEnd),
            unbound_scan_tree: ScanTree::new(PatternType::Unbound),
            compiled: false,
            scan_buffer_size: DEFAULT_SCAN_BUFFER_SIZE,
            abort_requested: AtomicBool::new(false),
        }
    }

    /// Adds a new signature.
    ///
    /// Fails if the scanner has already been compiled, the identifier is already in
    /// use, or the pattern is shorter than the minimum pattern size.
    pub fn add_signature(
        &mut self,
        identifier: &str,
        pattern_type: PatternType,
        pattern_offset: usize,
        pattern: &[u8],
    ) -> Result<(), SigscanError> {
        if self.compiled {
            return Err(SigscanError::InvalidState(format!(
                "cannot add signature: {} after the scanner has been compiled",
                identifier
            )));
        }
        if pattern.len() < MINIMUM_PATTERN_SIZE {
            return Err(SigscanError::InvalidArgument(format!(
                "pattern for signature: {} is smaller than the minimum pattern size: {}",
                identifier, MINIMUM_PATTERN_SIZE
            )));
        }
        if self.identifiers.contains(identifier) {
            return Err(SigscanError::AlreadyExists(identifier.to_string()));
        }
        self.identifiers.insert(identifier.to_string());
        self.signatures.push(Arc::new(Signature::new(
            identifier,
            pattern_type,
            pattern_offset,
            pattern,
        )));
        Ok(())
    }

    /// Sets the size of the internal buffer scan states allocate for this scanner.
    pub fn set_scan_buffer_size(&mut self, size: usize) -> Result<(), SigscanError> {
        if size == 0 {
            return Err(SigscanError::InvalidArgument(
                "scan buffer size must be greater than zero".to_string(),
            ));
        }
        self.scan_buffer_size = size;
        Ok(())
    }

    /// Builds the three scan trees. Idempotent: calling `build` again is a no-op.
    pub fn build(&mut self) -> Result<(), SigscanError> {
        if self.compiled {
            return Ok(());
        }
        self.header_scan_tree
            .build(&self.signatures)
            .map_err(|error_trace| SigscanError::InvalidState(error_trace.to_string()))?;
        self.footer_scan_tree
            .build(&self.signatures)
            .map_err(|error_trace| SigscanError::InvalidState(error_trace.to_string()))?;
        self.unbound_scan_tree
            .build(&self.signatures)
            .map_err(|error_trace| SigscanError::InvalidState(error_trace.to_string()))?;
        self.compiled = true;
        Ok(())
    }

    /// Whether `build` has already run.
    pub(super) fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// Requests cancellation of any scan state currently scanning with this scanner.
    pub fn signal_abort(&self) {
        self.abort_requested.store(true, Ordering::SeqCst);
    }

    /// Whether `signal_abort` has been called.
    pub(super) fn is_abort_requested(&self) -> bool {
        self.abort_requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_signature() {
        let mut scanner: Scanner = Scanner::new();

        assert_eq!(scanner.signatures.len(), 0);

        scanner
            .add_signature("vdh", PatternType::BoundToStart, 0, "conectix".as_bytes())
            .unwrap();

        assert_eq!(scanner.signatures.len(), 1);
    }

    #[test]
    fn test_add_signature_rejects_short_pattern() {
        let mut scanner: Scanner = Scanner::new();

        let result = scanner.add_signature("abc", PatternType::Unbound, 0, &[0x41, 0x42]);
        assert!(matches!(result, Err(SigscanError::InvalidArgument(_))));
    }

    #[test]
    fn test_add_signature_rejects_duplicate_identifier() {
        let mut scanner: Scanner = Scanner::new();

        scanner
            .add_signature("vdh", PatternType::BoundToStart, 0, "conectix".as_bytes())
            .unwrap();

        let result = scanner.add_signature("vdh", PatternType::BoundToStart, 0, "conectix".as_bytes());
        assert!(matches!(result, Err(SigscanError::AlreadyExists(_))));
    }

    #[test]
    fn test_add_signature_rejects_after_build() {
        let mut scanner: Scanner = Scanner::new();

        scanner
            .add_signature("vdh", PatternType::BoundToStart, 0, "conectix".as_bytes())
            .unwrap();
        scanner.build().unwrap();

        let result = scanner.add_signature("vdh2", PatternType::BoundToStart, 0, "conectix".as_bytes());
        assert!(matches!(result, Err(SigscanError::InvalidState(_))));
    }

    #[test]
    fn test_build() {
        let mut scanner: Scanner = Scanner::new();

        scanner
            .add_signature("vdh", PatternType::BoundToStart, 0, "conectix".as_bytes())
            .unwrap();
        scanner.build().unwrap();
        // Building again is idempotent.
        scanner.build().unwrap();
    }

    #[test]
    fn test_signal_abort() {
        let scanner: Scanner = Scanner::new();

        assert_eq!(scanner.is_abort_requested(), false);
        scanner.signal_abort();
        assert_eq!(scanner.is_abort_requested(), true);
    }
}
