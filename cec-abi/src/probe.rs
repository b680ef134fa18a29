//! Generated C smoke tests, one per supported libcec major version.
//!
//! A probe only compiles when `CEC_LIB_VERSION_MAJOR` in `cecc.h` equals the
//! probe's expected major, and only links when `libcec_initialise` resolves.
//! The two checks fail independently, so a wrong header and a missing symbol
//! surface as different errors.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ProbeError;
use crate::version::AbiVersion;

/// Public libcec C header included by every probe.
pub const HEADER: &str = "cecc.h";

/// Exported initialization function referenced by every probe.
pub const ENTRY_POINT: &str = "libcec_initialise";

/// Library name passed to the linker.
pub const LINK_NAME: &str = "cec";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Probe {
    pub expected: AbiVersion,
}

impl Probe {
    pub const fn new(expected: AbiVersion) -> Self {
        Self { expected }
    }

    /// One probe per supported version, in preference order.
    pub fn all() -> Vec<Probe> {
        AbiVersion::PREFERENCE.into_iter().map(Probe::new).collect()
    }

    pub fn file_name(&self) -> String {
        format!("smoke_abi{}.c", self.expected.major())
    }

    pub fn output_name(&self) -> String {
        let suffix = if cfg!(windows) { ".exe" } else { "" };
        format!("smoke_abi{}{suffix}", self.expected.major())
    }

    /// C source of the probe.
    pub fn source(&self) -> String {
        let major = self.expected.major();
        format!(
            "#include <stdint.h>\n\
             #include <{HEADER}>\n\
             \n\
             int main()\n\
             {{\n    \
             _Static_assert(CEC_LIB_VERSION_MAJOR == {major},\n        \
             \"libcec major version is \" CEC_LIB_VERSION_MAJOR_STR \", not as expected ({major})\");\n    \
             return (intptr_t){ENTRY_POINT};\n\
             }}\n"
        )
    }

    /// Writes the probe source into `dir`, leaving an identical file untouched.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ProbeError> {
        let path = dir.join(self.file_name());
        let source = self.source();
        let unchanged = fs::read_to_string(&path).is_ok_and(|existing| existing == source);
        if !unchanged {
            fs::write(&path, source).map_err(|source| ProbeError::WriteSource {
                path: path.clone(),
                source,
            })?;
        }
        Ok(path)
    }
}

/// Result of compiling and linking one probe.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub version: AbiVersion,
    pub result: Result<(), ProbeError>,
}

impl ProbeOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Picks the first passing probe in preference order, regardless of the
/// order the outcomes were produced in.
pub fn select(outcomes: &[ProbeOutcome]) -> Option<AbiVersion> {
    AbiVersion::PREFERENCE.into_iter().find(|version| {
        outcomes
            .iter()
            .any(|outcome| outcome.version == *version && outcome.passed())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_for_abi5() {
        let expected = r#"#include <stdint.h>
#include <cecc.h>

int main()
{
    _Static_assert(CEC_LIB_VERSION_MAJOR == 5,
        "libcec major version is " CEC_LIB_VERSION_MAJOR_STR ", not as expected (5)");
    return (intptr_t)libcec_initialise;
}
"#;
        assert_eq!(Probe::new(AbiVersion::V5).source(), expected);
    }

    #[test]
    fn each_probe_embeds_only_its_own_version() {
        for probe in Probe::all() {
            let major = probe.expected.major();
            let source = probe.source();
            assert!(source.contains(&format!("CEC_LIB_VERSION_MAJOR == {major},")));
            assert!(source.contains(&format!("not as expected ({major})")));
            for other in AbiVersion::PREFERENCE {
                if other != probe.expected {
                    assert!(!source.contains(&format!("({})", other.major())));
                }
            }
        }
    }

    #[test]
    fn file_names_are_distinct() {
        let names: Vec<String> = Probe::all().iter().map(Probe::file_name).collect();
        assert_eq!(
            names,
            vec!["smoke_abi7.c", "smoke_abi6.c", "smoke_abi5.c", "smoke_abi4.c"]
        );
    }

    #[test]
    fn write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let probe = Probe::new(AbiVersion::V6);
        let path = probe.write_to(dir.path()).unwrap();
        let first = fs::metadata(&path).unwrap().modified().unwrap();

        let again = probe.write_to(dir.path()).unwrap();
        assert_eq!(path, again);
        assert_eq!(fs::metadata(&again).unwrap().modified().unwrap(), first);
        assert_eq!(fs::read_to_string(&path).unwrap(), probe.source());
    }

    #[test]
    fn write_replaces_stale_source() {
        let dir = tempfile::tempdir().unwrap();
        let probe = Probe::new(AbiVersion::V4);
        fs::write(dir.path().join(probe.file_name()), "stale").unwrap();
        let path = probe.write_to(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), probe.source());
    }

    #[test]
    fn select_follows_preference_not_input_order() {
        let outcomes = vec![
            ProbeOutcome {
                version: AbiVersion::V4,
                result: Ok(()),
            },
            ProbeOutcome {
                version: AbiVersion::V6,
                result: Ok(()),
            },
            ProbeOutcome {
                version: AbiVersion::V7,
                result: Err(ProbeError::LibraryNotFound),
            },
        ];
        assert_eq!(select(&outcomes), Some(AbiVersion::V6));
    }

    #[test]
    fn select_none_when_all_fail() {
        let outcomes = vec![ProbeOutcome {
            version: AbiVersion::V5,
            result: Err(ProbeError::LibraryNotFound),
        }];
        assert_eq!(select(&outcomes), None);
        assert_eq!(select(&[]), None);
    }
}
