//! Compiles and links probes with the host C compiler.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use log::{debug, info};
use tokio::process::Command;

use crate::diagnostic::classify;
use crate::error::{DetectError, ProbeError};
use crate::probe::{LINK_NAME, Probe, ProbeOutcome};
use crate::runtime::runtime;

/// Compiler invocation shared by every probe of one detection run.
#[derive(Clone, Debug)]
pub struct ProbeRunner {
    compiler: PathBuf,
    args: Vec<OsString>,
    env: Vec<(OsString, OsString)>,
    msvc: bool,
    out_dir: PathBuf,
    include_dirs: Vec<PathBuf>,
    link_dirs: Vec<PathBuf>,
}

impl ProbeRunner {
    /// Runner using `compiler` with GCC/Clang style flags.
    pub fn new(compiler: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            compiler: compiler.into(),
            args: Vec::new(),
            env: Vec::new(),
            msvc: false,
            out_dir: out_dir.into(),
            include_dirs: Vec::new(),
            link_dirs: Vec::new(),
        }
    }

    /// Runner using the C compiler `cc` selects for the current build target.
    ///
    /// Only meaningful inside a build script, where cargo provides `TARGET`,
    /// `HOST` and `OPT_LEVEL`.
    pub fn from_build_env(out_dir: impl Into<PathBuf>) -> Result<Self, DetectError> {
        let tool = cc::Build::new()
            .cargo_metadata(false)
            .try_get_compiler()
            .map_err(|err| DetectError::Compiler(err.to_string()))?;
        Ok(Self {
            compiler: tool.path().to_path_buf(),
            args: tool.args().to_vec(),
            env: tool.env().to_vec(),
            msvc: tool.is_like_msvc(),
            ..Self::new(PathBuf::new(), out_dir)
        })
    }

    /// Extra argument placed before the probe source.
    pub fn flag(mut self, flag: impl Into<OsString>) -> Self {
        self.args.push(flag.into());
        self
    }

    pub fn include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dirs.push(dir.into());
        self
    }

    pub fn include_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.include_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn link_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.link_dirs.push(dir.into());
        self
    }

    pub fn link_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.link_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Arguments passed to the compiler for `probe` whose source is at `source`.
    pub fn arguments(&self, probe: &Probe, source: &Path) -> Vec<OsString> {
        let output = self.out_dir.join(probe.output_name());
        let mut args = self.args.clone();
        args.push(source.as_os_str().to_owned());

        if self.msvc {
            args.push(prefixed("/Fe:", &output));
            args.extend(self.include_dirs.iter().map(|dir| prefixed("/I", dir)));
            args.push("/link".into());
            args.extend(self.link_dirs.iter().map(|dir| prefixed("/LIBPATH:", dir)));
            args.push(format!("{LINK_NAME}.lib").into());
        } else {
            args.push("-o".into());
            args.push(output.into_os_string());
            args.extend(self.include_dirs.iter().map(|dir| prefixed("-I", dir)));
            args.extend(self.link_dirs.iter().map(|dir| prefixed("-L", dir)));
            args.push(format!("-l{LINK_NAME}").into());
        }
        args
    }

    async fn run_async(&self, probe: Probe) -> ProbeOutcome {
        let result = self.compile(&probe).await;
        match &result {
            Ok(()) => info!("smoke_abi{} -> ok", probe.expected.major()),
            Err(err) => debug!("smoke_abi{} -> fail: {err}", probe.expected.major()),
        }
        ProbeOutcome {
            version: probe.expected,
            result,
        }
    }

    async fn compile(&self, probe: &Probe) -> Result<(), ProbeError> {
        let source = probe.write_to(&self.out_dir)?;
        let output = Command::new(&self.compiler)
            .args(self.arguments(probe, &source))
            .envs(self.env.iter().cloned())
            .output()
            .await
            .map_err(|source| ProbeError::Spawn {
                compiler: self.compiler.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        // cl.exe reports diagnostics on stdout.
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(classify(probe.expected, &output.status.to_string(), &text))
    }

    /// Compiles and links one probe.
    pub fn run(&self, probe: Probe) -> Result<ProbeOutcome, DetectError> {
        let runtime = runtime().map_err(DetectError::Runtime)?;
        Ok(runtime.block_on(self.run_async(probe)))
    }

    /// Compiles all `probes` concurrently. Outcomes keep the order of `probes`.
    pub fn run_all(&self, probes: &[Probe]) -> Result<Vec<ProbeOutcome>, DetectError> {
        let runtime = runtime().map_err(DetectError::Runtime)?;
        Ok(runtime.block_on(join_all(
            probes.iter().map(|probe| self.run_async(*probe)),
        )))
    }
}

fn prefixed(prefix: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(path.as_os_str());
    arg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::AbiVersion;

    #[test]
    fn gnu_style_arguments() {
        let runner = ProbeRunner::new("cc", "/out")
            .include_dir("/opt/cec/include")
            .link_dir("/opt/cec/lib");
        let probe = Probe::new(AbiVersion::V5);
        let args = runner.arguments(&probe, Path::new("/out/smoke_abi5.c"));
        let args: Vec<String> = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let output = Path::new("/out").join(probe.output_name());
        assert_eq!(
            args,
            vec![
                "/out/smoke_abi5.c".to_string(),
                "-o".to_string(),
                output.to_string_lossy().into_owned(),
                "-I/opt/cec/include".to_string(),
                "-L/opt/cec/lib".to_string(),
                "-lcec".to_string(),
            ]
        );
    }

    #[test]
    fn msvc_style_arguments() {
        let mut runner = ProbeRunner::new("cl.exe", "out").link_dir("C:/cec/lib");
        runner.msvc = true;
        let probe = Probe::new(AbiVersion::V6);
        let args: Vec<String> = runner
            .arguments(&probe, Path::new("out/smoke_abi6.c"))
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[0], "out/smoke_abi6.c");
        assert!(args[1].starts_with("/Fe:"));
        let link = args.iter().position(|arg| arg == "/link").unwrap();
        assert_eq!(args[link + 1], "/LIBPATH:C:/cec/lib");
        assert_eq!(args.last().unwrap(), "cec.lib");
    }

    #[test]
    fn every_probe_gets_its_own_output() {
        let runner = ProbeRunner::new("cc", "/out");
        let outputs: Vec<OsString> = Probe::all()
            .iter()
            .map(|probe| runner.arguments(probe, Path::new("x.c"))[2].clone())
            .collect();
        for (i, a) in outputs.iter().enumerate() {
            for b in &outputs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn missing_compiler_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProbeRunner::new(dir.path().join("no-such-cc"), dir.path());
        let outcome = runner.run(Probe::new(AbiVersion::V4)).unwrap();
        assert!(matches!(outcome.result, Err(ProbeError::Spawn { .. })));
        assert!(dir.path().join("smoke_abi4.c").exists());
    }
}
