//! Fake C compilers for exercising probes without libcec installed.
//!
//! Each fake is a shell script run as `/bin/sh <script> <probe source> ...`,
//! so `$1` is the generated probe.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use cec_abi::{BuildConfig, ProbeRunner};

/// Behaves like a toolchain whose `cecc.h` reports `major`.
pub fn library_with_major(dir: &Path, major: u32) -> PathBuf {
    let script = format!(
        r#"src="$1"
case "$src" in
  *smoke_abi{major}.c) exit 0 ;;
esac
expected=$(grep -o 'not as expected ([0-9]*)' "$src" | tr -dc '0-9')
echo "$src:6:5: error: static assertion failed: \"libcec major version is {major}, not as expected ($expected)\"" >&2
exit 1
"#
    );
    write_script(dir, "cc-libcec", &script)
}

/// Header matches every probe but the library lacks `libcec_initialise`.
pub fn library_without_entry_point(dir: &Path) -> PathBuf {
    let script = "echo \"/usr/bin/ld: /tmp/ccX.o: in function \\`main': undefined reference to \\`libcec_initialise'\" >&2\n\
                  echo 'collect2: error: ld returned 1 exit status' >&2\n\
                  exit 1\n";
    write_script(dir, "cc-nosymbol", script)
}

/// No libcec at all.
pub fn no_library(dir: &Path) -> PathBuf {
    let script = "echo \"$1:2:10: fatal error: cecc.h: No such file or directory\" >&2\nexit 1\n";
    write_script(dir, "cc-empty", script)
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

pub fn runner(script: &Path, out_dir: &Path) -> ProbeRunner {
    ProbeRunner::new("/bin/sh", out_dir).flag(script)
}

pub fn config(out_dir: &Path, manifest_dir: &Path, vars: &[(&str, &str)]) -> BuildConfig {
    let mut env: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    env.insert("OUT_DIR".to_string(), out_dir.display().to_string());
    env.insert("CARGO_MANIFEST_DIR".to_string(), manifest_dir.display().to_string());
    env.insert(cec_abi::env::NO_PKG_CONFIG.to_string(), "1".to_string());
    BuildConfig::from_lookup(|key| env.get(key).cloned()).unwrap()
}
