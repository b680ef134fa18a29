//! Classification of compiler and linker output from a failed probe.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ProbeError;
use crate::probe::{ENTRY_POINT, HEADER, LINK_NAME};
use crate::version::AbiVersion;

static VERSION_MISMATCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"libcec major version is ([^,\s]+), not as expected \((\d+)\)")
        .unwrap_or_else(|err| panic!("invalid mismatch pattern: {err}"))
});

const MISSING_HEADER_MARKERS: [&str; 3] = [
    "No such file or directory",
    "file not found",
    "Cannot open include file",
];

const MISSING_SYMBOL_MARKERS: [&str; 5] = [
    "undefined reference",
    "undefined symbol",
    "Undefined symbols",
    "unresolved external symbol",
    "undeclared",
];

/// Lines of compiler output kept in `CompilerFailed`.
const STDERR_TAIL_LINES: usize = 20;

/// Maps the output of a failed probe build to the reason it failed.
pub fn classify(expected: AbiVersion, status: &str, output: &str) -> ProbeError {
    if output.contains(HEADER) && MISSING_HEADER_MARKERS.iter().any(|m| output.contains(m)) {
        return ProbeError::HeaderNotFound { header: HEADER };
    }

    if let Some(captures) = VERSION_MISMATCH.captures(output) {
        let actual = captures[1].trim_matches('"').to_string();
        return ProbeError::VersionMismatch {
            expected: captures[2].parse().unwrap_or(expected.major()),
            actual,
        };
    }

    if missing_library(output) {
        return ProbeError::LibraryNotFound;
    }

    if output.contains(ENTRY_POINT) && MISSING_SYMBOL_MARKERS.iter().any(|m| output.contains(m)) {
        return ProbeError::MissingSymbol {
            expected: expected.major(),
            symbol: ENTRY_POINT,
        };
    }

    ProbeError::CompilerFailed {
        status: status.to_string(),
        stderr: tail(output, STDERR_TAIL_LINES),
    }
}

fn missing_library(output: &str) -> bool {
    let flag = format!("-l{LINK_NAME}");
    let msvc_lib = format!("'{LINK_NAME}.lib'");
    output.contains(&format!("cannot find {flag}"))
        || output.contains(&format!("library not found for {flag}"))
        || output.contains(&format!("unable to find library {flag}"))
        || output.contains(&format!("cannot open input file {msvc_lib}"))
}

fn tail(output: &str, lines: usize) -> String {
    let all: Vec<&str> = output.trim().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
