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

/// Pattern type, determines how a signature's pattern offset is interpreted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PatternType {
    /// Offset is relative from the end of the data.
    BoundToEnd,

    /// Offset is relative from the start of the data.
    BoundToStart,

    /// Offset is not bound, the pattern may occur anywhere.
    Unbound,
}

/// Scan state lifecycle status.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScanStatus {
    /// Created but not yet started.
    Initialized,

    /// Started, accepting buffers.
    Started,

    /// Stopped, results are final.
    Stopped,
}
