// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract discovery — an ordered list of strategies evaluated against a
// probe of the host system. The first strategy that finds a usable
// executable wins; otherwise a platform default is assumed.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use lesewerk_core::Outcome;
use tracing::{debug, info, warn};

/// Upper bound on how long a `--version` probe may run.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Host facilities discovery depends on.
pub trait SystemProbe {
    /// Whether `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Whether `program args...` starts and exits successfully within
    /// `timeout`.
    fn runs_successfully(&self, program: &OsStr, args: &[&str], timeout: Duration) -> bool;
}

/// [`SystemProbe`] over the real filesystem and process table.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSystem;

impl SystemProbe for HostSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn runs_successfully(&self, program: &OsStr, args: &[&str], timeout: Duration) -> bool {
        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                debug!(program = %program.to_string_lossy(), %err, "Probe failed to start");
                return false;
            }
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return status.success(),
                Ok(None) if Instant::now() >= deadline => {
                    warn!(program = %program.to_string_lossy(), "Probe timed out");
                    let _ = child.kill();
                    let _ = child.wait();
                    return false;
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => {
                    debug!(program = %program.to_string_lossy(), %err, "Probe wait failed");
                    return false;
                }
            }
        }
    }
}

/// One way of finding the Tesseract executable.
pub trait LocateStrategy: fmt::Debug {
    fn locate(&self, probe: &dyn SystemProbe) -> Option<PathBuf>;
}

/// Accept a fixed path if a file exists there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingFile(pub PathBuf);

impl LocateStrategy for ExistingFile {
    fn locate(&self, probe: &dyn SystemProbe) -> Option<PathBuf> {
        probe.is_file(&self.0).then(|| self.0.clone())
    }
}

/// Accept a program name resolved through `PATH` if `--version` succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCommand(pub String);

impl LocateStrategy for PathCommand {
    fn locate(&self, probe: &dyn SystemProbe) -> Option<PathBuf> {
        probe
            .runs_successfully(OsStr::new(&self.0), &["--version"], PROBE_TIMEOUT)
            .then(|| PathBuf::from(&self.0))
    }
}

/// The user's home directory, from `USERPROFILE` or `HOME`.
pub fn home_dir() -> Option<PathBuf> {
    ["USERPROFILE", "HOME"]
        .iter()
        .filter_map(std::env::var_os)
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Candidates in the order they are tried: the override, install locations,
/// per-user locations, folders relative to the working directory, then bare
/// command names.
pub fn default_strategies(
    override_path: Option<&Path>,
    home: Option<&Path>,
) -> Vec<Box<dyn LocateStrategy>> {
    let mut strategies: Vec<Box<dyn LocateStrategy>> = Vec::new();

    if let Some(path) = override_path {
        strategies.push(Box::new(ExistingFile(path.to_path_buf())));
        strategies.push(Box::new(PathCommand(path.to_string_lossy().into_owned())));
    }

    let (install_paths, user_paths, relative_paths, commands) = platform_candidates();
    strategies.extend(
        install_paths
            .iter()
            .map(|p| Box::new(ExistingFile(PathBuf::from(p))) as Box<dyn LocateStrategy>),
    );
    if let Some(home) = home {
        strategies.extend(
            user_paths
                .iter()
                .map(|p| Box::new(ExistingFile(home.join(p))) as Box<dyn LocateStrategy>),
        );
    }
    strategies.extend(
        relative_paths
            .iter()
            .map(|p| Box::new(ExistingFile(PathBuf::from(p))) as Box<dyn LocateStrategy>),
    );
    strategies.extend(
        commands
            .iter()
            .map(|c| Box::new(PathCommand((*c).to_string())) as Box<dyn LocateStrategy>),
    );

    strategies
}

type CandidateSet = (
    &'static [&'static str],
    &'static [&'static str],
    &'static [&'static str],
    &'static [&'static str],
);

#[cfg(windows)]
fn platform_candidates() -> CandidateSet {
    (
        &[
            r"C:\Program Files\Tesseract-OCR\tesseract.exe",
            r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
        ],
        &[
            r"AppData\Local\Tesseract-OCR\tesseract.exe",
            r"AppData\Roaming\Tesseract-OCR\tesseract.exe",
        ],
        &[r".\Tesseract-OCR\tesseract.exe", r".\tesseract\tesseract.exe"],
        &["tesseract.exe", "tesseract"],
    )
}

#[cfg(not(windows))]
fn platform_candidates() -> CandidateSet {
    (
        &[
            "/usr/bin/tesseract",
            "/usr/local/bin/tesseract",
            "/opt/homebrew/bin/tesseract",
        ],
        &[".local/bin/tesseract"],
        &["./Tesseract-OCR/tesseract", "./tesseract/tesseract"],
        &["tesseract"],
    )
}

/// Path assumed when discovery finds nothing.
pub fn fallback_executable() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Program Files\Tesseract-OCR\tesseract.exe")
    } else {
        PathBuf::from("/usr/bin/tesseract")
    }
}

/// Run `strategies` in order and return the first hit, or the platform
/// fallback as a degraded outcome.
pub fn discover(
    strategies: &[Box<dyn LocateStrategy>],
    probe: &dyn SystemProbe,
) -> Outcome<PathBuf> {
    for strategy in strategies {
        if let Some(path) = strategy.locate(probe) {
            info!(path = %path.display(), "Tesseract found");
            return Outcome::Success(path);
        }
        debug!(?strategy, "Tesseract candidate rejected");
    }

    let fallback = fallback_executable();
    warn!(
        fallback = %fallback.display(),
        "Tesseract not found; using the default install path"
    );
    Outcome::degraded(
        fallback,
        format!("none of {} candidates was usable", strategies.len()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakeProbe {
        files: HashSet<PathBuf>,
        commands: HashSet<String>,
        calls: RefCell<Vec<String>>,
    }

    impl SystemProbe for FakeProbe {
        fn is_file(&self, path: &Path) -> bool {
            self.calls.borrow_mut().push(path.display().to_string());
            self.files.contains(path)
        }

        fn runs_successfully(&self, program: &OsStr, args: &[&str], timeout: Duration) -> bool {
            assert_eq!(args, ["--version"]);
            assert_eq!(timeout, PROBE_TIMEOUT);
            let name = program.to_string_lossy().into_owned();
            self.calls.borrow_mut().push(name.clone());
            self.commands.contains(&name)
        }
    }

    #[test]
    fn first_matching_strategy_wins() {
        let probe = FakeProbe {
            files: HashSet::from([PathBuf::from("/b/tesseract")]),
            commands: HashSet::from(["tesseract".to_string()]),
            ..Default::default()
        };
        let strategies: Vec<Box<dyn LocateStrategy>> = vec![
            Box::new(ExistingFile(PathBuf::from("/a/tesseract"))),
            Box::new(ExistingFile(PathBuf::from("/b/tesseract"))),
            Box::new(PathCommand("tesseract".into())),
        ];

        let outcome = discover(&strategies, &probe);
        assert_eq!(outcome, Outcome::Success(PathBuf::from("/b/tesseract")));
        // The command strategy is never consulted.
        assert_eq!(probe.calls.borrow().len(), 2);
    }

    #[test]
    fn bare_command_is_verified_by_running_it() {
        let probe = FakeProbe {
            commands: HashSet::from(["tesseract".to_string()]),
            ..Default::default()
        };
        let strategies: Vec<Box<dyn LocateStrategy>> =
            vec![Box::new(PathCommand("tesseract".into()))];
        assert_eq!(
            discover(&strategies, &probe).into_value(),
            PathBuf::from("tesseract")
        );
    }

    #[test]
    fn nothing_found_falls_back_with_degraded_outcome() {
        let probe = FakeProbe::default();
        let strategies = default_strategies(None, Some(Path::new("/home/reader")));
        let outcome = discover(&strategies, &probe);

        assert!(outcome.is_degraded());
        assert_eq!(outcome.value(), &fallback_executable());
        assert_eq!(probe.calls.borrow().len(), strategies.len());
    }

    #[test]
    fn override_is_tried_first() {
        let override_path = Path::new("/custom/tesseract");
        let strategies = default_strategies(Some(override_path), None);
        let probe = FakeProbe {
            files: HashSet::from([override_path.to_path_buf(), fallback_executable()]),
            ..Default::default()
        };
        assert_eq!(
            discover(&strategies, &probe),
            Outcome::Success(override_path.to_path_buf())
        );
    }

    #[test]
    fn user_paths_are_joined_to_home() {
        let strategies = default_strategies(None, Some(Path::new("/home/reader")));
        let listed = format!("{strategies:?}");
        assert!(listed.contains("/home/reader") || listed.contains(r"\home\reader"));

        let without_home = default_strategies(None, None);
        assert!(without_home.len() < strategies.len());
    }

    #[cfg(unix)]
    #[test]
    fn host_system_runs_real_commands() {
        let host = HostSystem;
        assert!(host.runs_successfully(OsStr::new("true"), &[], PROBE_TIMEOUT));
        assert!(!host.runs_successfully(OsStr::new("false"), &[], PROBE_TIMEOUT));
        assert!(!host.runs_successfully(
            OsStr::new("/nonexistent/lesewerk/tesseract"),
            &[],
            PROBE_TIMEOUT
        ));
    }

    #[cfg(unix)]
    #[test]
    fn host_system_kills_slow_commands() {
        let started = Instant::now();
        let ok = HostSystem.runs_successfully(
            OsStr::new("sleep"),
            &["5"],
            Duration::from_millis(100),
        );
        assert!(!ok);
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
