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

use std::cmp::min;
use std::collections::HashSet;
use std::io::SeekFrom;
use std::path::Path;

use keramics_core::{open_os_data_stream, DataStream, DataStreamReference, ErrorTrace};

use super::enums::{PatternType, ScanStatus};
use super::errors::SigscanError;
use super::scan_result::ScanResult;
use super::scan_tree::{ScanDispatch, ScanTree, ScanTreeNode};
use super::scanner::Scanner;
use super::types::SignatureReference;

/// Streaming scan state bound to one scanner.
///
/// Borrows the scanner immutably so the same compiled scanner can drive multiple
/// scan states concurrently, on different threads, each tracking its own offset
/// and result set. A scan state moves through `Initialized` -> `Started` ->
/// `Stopped`; `scan_buffer` is only valid in the `Started` state.
pub struct ScanState<'a> {
    /// The scanner this state is bound to, set by `start`.
    scanner: Option<&'a Scanner>,

    /// Current lifecycle status.
    status: ScanStatus,

    /// Total size of the data being scanned, set by `set_data_size`.
    data_size: u64,

    /// Trailing bytes carried over from the previous `scan_buffer` call, retained so
    /// a pattern split across two calls is still matched whole on the next call.
    pending: Vec<u8>,

    /// Absolute offset of `pending[0]`.
    pending_offset: u64,

    /// Results collected so far, in the order they were first observed.
    results: Vec<ScanResult>,

    /// Dedup key set for results already recorded: (identifier, absolute offset).
    seen: HashSet<(String, u64)>,

    /// Header scan tree spanning size, cached from the scanner at `start`.
    header_range_size: u64,

    /// Footer scan tree spanning size, cached from the scanner at `start`.
    footer_range_size: u64,

    /// Unbound scan tree spanning size, cached from the scanner at `start`.
    unbound_range_size: usize,

    /// Largest pattern size across all signatures, determines how many trailing
    /// bytes must be carried over between `scan_buffer` calls.
    largest_pattern_size: usize,

    /// Whether a flush (explicit or via `stop`) has run since the last `scan_buffer`.
    flushed: bool,
}

impl<'a> ScanState<'a> {
    /// Creates a new, unstarted scan state.
    pub fn new() -> Self {
        Self {
            scanner: None,
            status: ScanStatus::Initialized,
            data_size: 0,
            pending: Vec::new(),
            pending_offset: 0,
            results: Vec::new(),
            seen: HashSet::new(),
            header_range_size: 0,
            footer_range_size: 0,
            unbound_range_size: 0,
            largest_pattern_size: 0,
            flushed: false,
        }
    }

    /// Sets the total size of the data to be scanned. Must be called before `start`.
    pub fn set_data_size(&mut self, data_size: u64) -> Result<(), SigscanError> {
        if self.status != ScanStatus::Initialized {
            return Err(SigscanError::InvalidState(
                "cannot set data size after the scan has started".to_string(),
            ));
        }
        self.data_size = data_size;
        Ok(())
    }

    /// Binds the scan state to a compiled scanner and transitions to `Started`.
    ///
    /// The scanner must already be compiled: since this state only borrows the
    /// scanner immutably, it cannot trigger `Scanner::build` itself.
    pub fn start(&mut self, scanner: &'a Scanner) -> Result<(), SigscanError> {
        if self.status != ScanStatus::Initialized {
            return Err(SigscanError::InvalidState(
                "scan state has already been started".to_string(),
            ));
        }
        if !scanner.is_compiled() {
            return Err(SigscanError::InvalidState(
                "scanner must be compiled before a scan state can start".to_string(),
            ));
        }
        let (_, header_end_offset): (usize, usize) = scanner.header_scan_tree.get_spanning_range();
        let (_, footer_end_offset): (usize, usize) = scanner.footer_scan_tree.get_spanning_range();
        let (unbound_start_offset, unbound_end_offset): (usize, usize) =
            scanner.unbound_scan_tree.get_spanning_range();

        self.header_range_size = header_end_offset as u64;
        self.footer_range_size = footer_end_offset as u64;
        self.unbound_range_size = unbound_end_offset - unbound_start_offset;

        self.largest_pattern_size = scanner
            .signatures
            .iter()
            .map(|signature| signature.pattern_size)
            .max()
            .unwrap_or(0);

        self.scanner = Some(scanner);
        self.status = ScanStatus::Started;
        Ok(())
    }

    /// Scans the next chunk of data, in order, with no gaps or overlaps between calls.
    pub fn scan_buffer(&mut self, buffer: &[u8]) -> Result<(), SigscanError> {
        if self.status != ScanStatus::Started {
            return Err(SigscanError::InvalidState(
                "scan_buffer called outside the started state".to_string(),
            ));
        }
        let scanner: &'a Scanner = self.scanner.unwrap();
        if scanner.is_abort_requested() {
            return Err(SigscanError::Aborted);
        }
        self.flushed = false;

        if buffer.is_empty() {
            return Ok(());
        }
        let combined_start_offset: u64 = self.pending_offset;
        let mut combined: Vec<u8> = std::mem::take(&mut self.pending);
        combined.extend_from_slice(buffer);

        let buffer_size: usize = combined.len();
        let next_data_offset: u64 = combined_start_offset + buffer_size as u64;

        if combined_start_offset < self.header_range_size {
            self.walk_scan_tree(
                &scanner.header_scan_tree,
                &combined,
                0,
                buffer_size,
                combined_start_offset,
                0,
            );
        }
        let footer_start_offset: u64 = if self.footer_range_size <= self.data_size {
            self.data_size - self.footer_range_size
        } else {
            0
        };
        if next_data_offset >= footer_start_offset {
            self.walk_scan_tree(
                &scanner.footer_scan_tree,
                &combined,
                0,
                buffer_size,
                combined_start_offset,
                footer_start_offset,
            );
        }
        if self.unbound_range_size > 0 {
            self.walk_scan_tree(
                &scanner.unbound_scan_tree,
                &combined,
                0,
                buffer_size,
                combined_start_offset,
                0,
            );
        }
        let carry_over_size: usize = min(
            self.largest_pattern_size.saturating_sub(1),
            combined.len(),
        );
        let split_offset: usize = combined.len() - carry_over_size;

        self.pending_offset = combined_start_offset + split_offset as u64;
        self.pending = combined[split_offset..].to_vec();
        Ok(())
    }

    /// Walks a single scan tree over the full carried-over-plus-new buffer, recording
    /// every signature match, deduplicated against results already recorded.
    ///
    /// Re-walking the whole buffer on every call (rather than resuming where the
    /// previous call left off) is what lets a pattern split across a buffer boundary
    /// still be found: the carried-over tail from the previous call plus the new
    /// buffer covers the full pattern, and the dedup set drops the positions this
    /// walk has already reported.
    ///
    /// `range_start_offset` is the absolute stream offset `scan_tree`'s node pattern
    /// offsets are relative to: 0 for the header and unbound trees, the footer
    /// window's absolute start offset for the footer tree.
    fn walk_scan_tree(
        &mut self,
        scan_tree: &ScanTree,
        buffer: &[u8],
        mut buffer_offset: usize,
        buffer_size: usize,
        combined_start_offset: u64,
        range_start_offset: u64,
    ) {
        if buffer_size == 0 {
            return;
        }
        let buffer_end_offset: usize = buffer_size - 1;
        let mut scan_tree_node: &ScanTreeNode = &scan_tree.root_node;

        while buffer_offset < buffer_size {
            let scan_dispatch: ScanDispatch = scan_tree_node.scan_buffer(
                combined_start_offset,
                self.data_size,
                buffer,
                buffer_offset,
                buffer_size,
                scan_tree.pattern_type,
                range_start_offset,
            );
            let mut skip_value: usize = 1;

            match scan_dispatch {
                ScanDispatch::ScanTreeNode(next_node) => {
                    scan_tree_node = next_node;
                    continue;
                }
                ScanDispatch::Signature(signature) => {
                    let absolute_offset: u64 = match signature.pattern_type {
                        PatternType::BoundToStart => signature.pattern_offset as u64,
                        PatternType::BoundToEnd => self.data_size - signature.pattern_offset as u64,
                        PatternType::Unbound => combined_start_offset + buffer_offset as u64,
                    };
                    self.record_result(signature, absolute_offset);
                    scan_tree_node = &scan_tree.root_node;
                }
                ScanDispatch::None => {
                    let smallest_pattern_size: usize =
                        min(buffer_size, scan_tree.skip_table.smallest_pattern_size);
                    let mut skip_value_offset: usize =
                        min(buffer_offset + smallest_pattern_size - 1, buffer_end_offset);

                    loop {
                        let byte_value: u8 = buffer[skip_value_offset];
                        skip_value = scan_tree.skip_table.get_skip_value(&byte_value);
                        if skip_value == 0 {
                            skip_value = match scan_tree.pattern_type {
                                PatternType::Unbound => scan_tree.skip_table.smallest_skip_value,
                                _ => scan_tree.skip_table.smallest_pattern_size,
                            };
                        }
                        if skip_value_offset <= buffer_offset || skip_value != 0 {
                            break;
                        }
                        skip_value_offset -= 1;
                    }
                    scan_tree_node = &scan_tree.root_node;
                }
            };
            if scan_tree.pattern_type != PatternType::Unbound {
                break;
            }
            buffer_offset += skip_value;
        }
    }

    /// Records a signature match, skipping it if already recorded at this offset.
    fn record_result(&mut self, signature: SignatureReference, offset: u64) {
        let key: (String, u64) = (signature.identifier.clone(), offset);
        if self.seen.insert(key) {
            self.results.push(ScanResult::new(signature, offset));
        }
    }

    /// Flushes any carried-over bytes. A no-op beyond bookkeeping, since every
    /// `scan_buffer` call already walks the full carried-over buffer; exists so
    /// `number_of_results`/`get_result` have a well-defined point before `stop`.
    pub fn flush(&mut self) -> Result<(), SigscanError> {
        if self.status != ScanStatus::Started {
            return Err(SigscanError::InvalidState(
                "flush called outside the started state".to_string(),
            ));
        }
        self.flushed = true;
        Ok(())
    }

    /// Stops the scan state. Idempotent once stopped.
    pub fn stop(&mut self) -> Result<(), SigscanError> {
        if self.status == ScanStatus::Stopped {
            return Ok(());
        }
        if self.status != ScanStatus::Started {
            return Err(SigscanError::InvalidState(
                "stop called before the scan has started".to_string(),
            ));
        }
        self.flush()?;
        self.status = ScanStatus::Stopped;
        Ok(())
    }

    /// The number of results collected so far. Valid once stopped or flushed.
    pub fn number_of_results(&self) -> Result<usize, SigscanError> {
        if self.status != ScanStatus::Stopped && !self.flushed {
            return Err(SigscanError::InvalidState(
                "results are not available until the scan is flushed or stopped".to_string(),
            ));
        }
        Ok(self.results.len())
    }

    /// Retrieves a result by index. Valid once stopped or flushed.
    pub fn get_result(&self, index: usize) -> Result<&ScanResult, SigscanError> {
        if self.status != ScanStatus::Stopped && !self.flushed {
            return Err(SigscanError::InvalidState(
                "results are not available until the scan is flushed or stopped".to_string(),
            ));
        }
        self.results.get(index).ok_or_else(|| {
            SigscanError::InvalidArgument(format!("no result at index: {}", index))
        })
    }

    /// Scans an entire data stream, driving `set_data_size`/`start`/`scan_buffer`/
    /// `stop` in sequence, reading in chunks of the scanner's configured buffer size.
    pub fn scan_data_stream(
        &mut self,
        scanner: &'a Scanner,
        data_stream: &DataStreamReference,
    ) -> Result<(), SigscanError> {
        let data_size: u64 = get_data_stream_size(data_stream)?;

        self.set_data_size(data_size)?;
        self.start(scanner)?;

        let chunk_size: usize = scanner.scan_buffer_size;
        let mut position: u64 = 0;
        let mut buffer: Vec<u8> = vec![0u8; chunk_size];

        while position < data_size {
            if scanner.is_abort_requested() {
                return Err(SigscanError::Aborted);
            }
            let read_size: usize = min(chunk_size as u64, data_size - position) as usize;

            read_data_stream_exact_at_position(data_stream, &mut buffer[..read_size], position)?;

            self.scan_buffer(&buffer[..read_size])?;
            position += read_size as u64;
        }
        self.stop()?;
        Ok(())
    }

    /// Scans an entire file, opening it through the operating system data stream
    /// collaborator and driving `scan_data_stream` over it.
    pub fn scan_file(&mut self, scanner: &'a Scanner, path: &Path) -> Result<(), SigscanError> {
        let data_stream: DataStreamReference = open_os_data_stream(&path.to_path_buf())
            .map_err(|error_trace: ErrorTrace| SigscanError::IOError(error_trace))?;

        self.scan_data_stream(scanner, &data_stream)
    }
}

/// Locks a data stream for its size, translating lock/read errors into `SigscanError`.
fn get_data_stream_size(data_stream: &DataStreamReference) -> Result<u64, SigscanError> {
    match data_stream.write() {
        Ok(mut data_stream) => data_stream
            .get_size()
            .map_err(|error_trace: ErrorTrace| SigscanError::IOError(error_trace)),
        Err(_) => Err(SigscanError::InvalidState(
            "unable to obtain write lock on data stream".to_string(),
        )),
    }
}

/// Locks a data stream to read an exact amount of data at a position.
fn read_data_stream_exact_at_position(
    data_stream: &DataStreamReference,
    buffer: &mut [u8],
    position: u64,
) -> Result<(), SigscanError> {
    match data_stream.write() {
        Ok(mut data_stream) => data_stream
            .read_exact_at_position(buffer, SeekFrom::Start(position))
            .map(|_| ())
            .map_err(|error_trace: ErrorTrace| SigscanError::IOError(error_trace)),
        Err(_) => Err(SigscanError::InvalidState(
            "unable to obtain write lock on data stream".to_string(),
        )),
    }
}
