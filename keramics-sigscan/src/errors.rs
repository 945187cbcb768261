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

use std::fmt;

use keramics_core::ErrorTrace;

/// Error returned by the public scanner and scan state operations.
///
/// Internal helpers (signature table filling, scan tree construction) keep reporting
/// through `ErrorTrace`, consistent with the rest of this crate family; these tagged
/// kinds exist for the handful of call sites where a caller needs to branch on what
/// kind of failure occurred rather than only read a message.
#[derive(Debug)]
pub enum SigscanError {
    /// A supplied argument is invalid (e.g. an empty identifier or pattern too short).
    InvalidArgument(String),

    /// The operation is not valid in the scanner or scan state's current state.
    InvalidState(String),

    /// Memory allocation failed while compiling the scan trees.
    OutOfMemory(String),

    /// The file-like data source reported an error.
    IOError(ErrorTrace),

    /// The scan was cancelled through `signal_abort`.
    Aborted,

    /// A signature with the same identifier was already added.
    AlreadyExists(String),

    /// Reserved for callers that wish to report malformed input of their own; not
    /// emitted by the core engine.
    CorruptInput(String),
}

impl fmt::Display for SigscanError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SigscanError::InvalidArgument(message) => {
                write!(formatter, "invalid argument: {}", message)
            }
            SigscanError::InvalidState(message) => write!(formatter, "invalid state: {}", message),
            SigscanError::OutOfMemory(message) => write!(formatter, "out of memory: {}", message),
            SigscanError::IOError(error_trace) => write!(formatter, "I/O error: {}", error_trace),
            SigscanError::Aborted => write!(formatter, "scan aborted"),
            SigscanError::AlreadyExists(identifier) => {
                write!(formatter, "signature already exists: {}", identifier)
            }
            SigscanError::CorruptInput(message) => write!(formatter, "corrupt input: {}", message),
        }
    }
}

impl std::error::Error for SigscanError {}

impl From<ErrorTrace> for SigscanError {
    fn from(error_trace: ErrorTrace) -> Self {
        SigscanError::IOError(error_trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let error: SigscanError = SigscanError::AlreadyExists("vdh".to_string());
        assert_eq!(error.to_string(), "signature already exists: vdh");

        let error: SigscanError = SigscanError::Aborted;
        assert_eq!(error.to_string(), "scan aborted");
    }
}
