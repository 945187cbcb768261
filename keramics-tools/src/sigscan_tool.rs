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

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use keramics_core::mediator::Mediator;
use keramics_sigscan::{pattern_type_from_flags, PatternType, ScanState, Scanner, SignatureFlags};

#[derive(Parser)]
#[command(version, about = "Scan a file for binary signatures", long_about = None)]
struct CommandLineArguments {
    /// Enable debug output
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Size in bytes of the internal scan buffer
    #[arg(long = "buffer-size")]
    buffer_size: Option<usize>,

    /// Path of the configuration file listing the signatures to scan for
    config: PathBuf,

    /// Path of the source file to scan; reads standard input if omitted
    source: Option<PathBuf>,
}

/// One signature definition parsed from a configuration file.
struct SignatureDefinition {
    identifier: String,
    pattern_type: PatternType,
    pattern_offset: usize,
    pattern: Vec<u8>,
}

/// Parses a configuration file into signature definitions.
///
/// Lines are `identifier offset flags hex_pattern`, space-separated; `flags` is
/// the numeric value described in the signature flags table. Blank lines and
/// lines starting with `#` are ignored.
fn read_signature_definitions(path: &PathBuf) -> Result<Vec<SignatureDefinition>, String> {
    let contents: String = fs::read_to_string(path)
        .map_err(|error| format!("unable to read configuration file: {}", error))?;

    let mut definitions: Vec<SignatureDefinition> = Vec::new();

    for (line_number, line) in contents.lines().enumerate() {
        let line: &str = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(format!(
                "malformed signature definition on line: {}",
                line_number + 1
            ));
        }
        let pattern_offset: usize = fields[1]
            .parse()
            .map_err(|_| format!("invalid offset on line: {}", line_number + 1))?;
        let flags_value: u32 = if let Some(hex_value) = fields[2].strip_prefix("0x") {
            u32::from_str_radix(hex_value, 16)
        } else {
            fields[2].parse()
        }
        .map_err(|_| format!("invalid flags on line: {}", line_number + 1))?;
        let flags: SignatureFlags = SignatureFlags::from_bits_truncate(flags_value);
        let pattern_type: PatternType = pattern_type_from_flags(flags)
            .ok_or_else(|| format!("invalid flags on line: {}", line_number + 1))?;
        let pattern: Vec<u8> = parse_hex_pattern(fields[3])
            .map_err(|_| format!("invalid pattern on line: {}", line_number + 1))?;

        definitions.push(SignatureDefinition {
            identifier: fields[0].to_string(),
            pattern_type: pattern_type,
            pattern_offset: pattern_offset,
            pattern: pattern,
        });
    }
    Ok(definitions)
}

/// Parses a hexadecimal byte pattern, e.g. `4c000000` into `[0x4c, 0x00, 0x00, 0x00]`.
fn parse_hex_pattern(value: &str) -> Result<Vec<u8>, ()> {
    if value.len() % 2 != 0 {
        return Err(());
    }
    let mut pattern: Vec<u8> = Vec::with_capacity(value.len() / 2);

    for byte_index in (0..value.len()).step_by(2) {
        let byte_value: u8 =
            u8::from_str_radix(&value[byte_index..byte_index + 2], 16).map_err(|_| ())?;
        pattern.push(byte_value);
    }
    Ok(pattern)
}

fn build_scanner(
    definitions: &[SignatureDefinition],
    buffer_size: Option<usize>,
) -> Result<Scanner, String> {
    let mut scanner: Scanner = Scanner::new();

    if let Some(buffer_size) = buffer_size {
        scanner
            .set_scan_buffer_size(buffer_size)
            .map_err(|error| error.to_string())?;
    }
    for definition in definitions.iter() {
        scanner
            .add_signature(
                &definition.identifier,
                definition.pattern_type,
                definition.pattern_offset,
                &definition.pattern,
            )
            .map_err(|error| format!("{}: {}", definition.identifier, error))?;
    }
    scanner.build().map_err(|error| error.to_string())?;
    Ok(scanner)
}

fn run(arguments: &CommandLineArguments) -> Result<(), String> {
    let definitions: Vec<SignatureDefinition> = read_signature_definitions(&arguments.config)?;
    let scanner: Scanner = build_scanner(&definitions, arguments.buffer_size)?;

    let mut scan_state: ScanState = ScanState::new();

    match &arguments.source {
        Some(source) => scan_state
            .scan_file(&scanner, source)
            .map_err(|error| error.to_string())?,
        None => {
            let mut data: Vec<u8> = Vec::new();
            std::io::stdin()
                .read_to_end(&mut data)
                .map_err(|error| format!("unable to read standard input: {}", error))?;

            scan_state
                .set_data_size(data.len() as u64)
                .map_err(|error| error.to_string())?;
            scan_state.start(&scanner).map_err(|error| error.to_string())?;
            scan_state
                .scan_buffer(&data)
                .map_err(|error| error.to_string())?;
            scan_state.stop().map_err(|error| error.to_string())?;
        }
    }
    let number_of_results: usize = scan_state
        .number_of_results()
        .map_err(|error| error.to_string())?;

    for result_index in 0..number_of_results {
        let scan_result = scan_state
            .get_result(result_index)
            .map_err(|error| error.to_string())?;
        println!("{}\t{}", scan_result.get_identifier(), scan_result.get_offset());
    }
    Ok(())
}

fn main() -> ExitCode {
    let arguments: CommandLineArguments = CommandLineArguments::parse();

    Mediator {
        debug_output: arguments.debug,
    }
    .make_current();

    match run(&arguments) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_pattern() {
        let pattern: Vec<u8> = parse_hex_pattern("4c000000").unwrap();
        assert_eq!(pattern, vec![0x4c, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_parse_hex_pattern_rejects_odd_length() {
        assert!(parse_hex_pattern("4c0").is_err());
    }

    #[test]
    fn test_read_signature_definitions() {
        let mut path: PathBuf = std::env::temp_dir();
        path.push(format!(
            "keramics_sigscan_tool_test_config_{}",
            std::process::id()
        ));
        fs::write(
            &path,
            "# comment\nvdh 0 1 636f6e6563746978\n\nvhd1 8 2 636f6e6563746978\nunb 0 0 636f6e6563746978\n",
        )
        .unwrap();

        let definitions: Vec<SignatureDefinition> = read_signature_definitions(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(definitions.len(), 3);
        assert_eq!(definitions[0].identifier, "vdh");
        assert!(matches!(definitions[0].pattern_type, PatternType::BoundToStart));
        assert_eq!(definitions[1].identifier, "vhd1");
        assert!(matches!(definitions[1].pattern_type, PatternType::BoundToEnd));
        assert_eq!(definitions[2].identifier, "unb");
        assert!(matches!(definitions[2].pattern_type, PatternType::Unbound));
    }

    #[test]
    fn test_read_signature_definitions_rejects_invalid_flags() {
        let mut path: PathBuf = std::env::temp_dir();
        path.push(format!(
            "keramics_sigscan_tool_test_bad_config_{}",
            std::process::id()
        ));
        fs::write(&path, "bad 0 3 636f6e6563746978\n").unwrap();

        let result = read_signature_definitions(&path);
        fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }
}
