// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job configuration: the raw (all-string, YAML-shaped) form and the typed
//! form the engine actually operates on.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::signal::{self, Signal};

/// A job's restart policy.
///
/// `Always` restarts the instance on every exit, regardless of whether the
/// exit code matched `expected_exit` — this is intentional: an `always`
/// job is restarted unconditionally, `expected_exit` notwithstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    Always,
    #[default]
    Never,
    Unexpected,
}

impl RestartPolicy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            "unexpected" => Some(Self::Unexpected),
            _ => None,
        }
    }
}

crate::simple_display! {
    RestartPolicy {
        Always => "always",
        Never => "never",
        Unexpected => "unexpected",
    }
}

/// Where to wire up a child's standard streams. `None` leaves the stream
/// untouched (inherited from the supervisor).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirections {
    pub stdin: Option<PathBuf>,
    pub stdout: Option<PathBuf>,
    pub stderr: Option<PathBuf>,
}

/// The nested `redirections:` block from the YAML config shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRedirections {
    pub stdin: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

/// The YAML shape: every field is a string (or absent), matching the
/// declarative job config format. Field names follow the camelCase
/// example in the job config documentation (`atLaunch`, `restartPolicy`,
/// ...); the `alias`es accept the equivalent snake_case spelling, so
/// either style of config file parses. Validated and converted into
/// [`JobConfig`] via [`RawJobConfig::into_typed`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawJobConfig {
    pub id: Option<String>,
    pub command: Option<String>,
    #[serde(alias = "numprocs")]
    pub instances: Option<String>,
    #[serde(rename = "atLaunch", alias = "at_launch")]
    pub at_launch: Option<String>,
    #[serde(rename = "restartPolicy", alias = "restart_policy")]
    pub restart_policy: Option<String>,
    #[serde(rename = "expectedExit", alias = "expected_exit")]
    pub expected_exit: Option<String>,
    #[serde(rename = "startCheckup", alias = "start_checkup")]
    pub start_checkup: Option<String>,
    #[serde(rename = "maxRestarts", alias = "max_restarts")]
    pub max_restarts: Option<String>,
    #[serde(rename = "stopSignal", alias = "stop_signal")]
    pub stop_signal: Option<String>,
    #[serde(rename = "stopTimeout", alias = "stop_timeout")]
    pub stop_timeout: Option<String>,
    #[serde(rename = "envVars", alias = "env")]
    pub env_vars: Option<String>,
    #[serde(rename = "workingDir", alias = "working_dir")]
    pub working_dir: Option<String>,
    pub umask: Option<String>,
    pub redirections: Option<RawRedirections>,
}

/// The fully validated, typed job configuration the engine operates on.
///
/// Field-wise `PartialEq` backs the supervisor's reload classification: two
/// configs with the same `id` are "changed" exactly when they differ under
/// this derive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub id: u32,
    pub command: Vec<String>,
    pub instances: u32,
    pub at_launch: bool,
    pub restart_policy: RestartPolicy,
    pub expected_exit: i32,
    pub start_checkup_secs: u64,
    pub max_restarts: u32,
    pub stop_signal: Option<Signal>,
    pub stop_timeout_secs: u64,
    pub env_vars: Vec<(String, String)>,
    pub working_dir: Option<PathBuf>,
    pub umask: u32,
    pub redirections: Redirections,
}

crate::builder! {
    pub struct JobConfigBuilder => JobConfig {
        set {
            id: u32 = 1,
            instances: u32 = 1,
            at_launch: bool = true,
            restart_policy: RestartPolicy = RestartPolicy::Never,
            expected_exit: i32 = 0,
            start_checkup_secs: u64 = 0,
            max_restarts: u32 = 0,
            stop_signal: Option<Signal> = None,
            stop_timeout_secs: u64 = 1,
            umask: u32 = 0o022,
            command: Vec<String> = vec!["/bin/true".to_string()],
            env_vars: Vec<(String, String)> = Vec::new(),
            redirections: Redirections = Redirections::default()
        }
        option {
            working_dir: PathBuf = None
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobConfigBuilder {
    /// Convenience over [`command`](Self::command) for literal argv slices.
    pub fn argv(mut self, argv: &[&str]) -> Self {
        self.command = argv.iter().map(|s| s.to_string()).collect();
        self
    }
}

fn parse_field<T: std::str::FromStr>(
    id: u32,
    name: &'static str,
    raw: &str,
) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidInteger(id, name, raw.to_string()))
}

impl RawJobConfig {
    /// Validate and convert into a [`JobConfig`], given the umask the
    /// supervisor inherited at startup (used when the job doesn't specify
    /// its own).
    pub fn into_typed(self, inherited_umask: u32) -> Result<JobConfig, ConfigError> {
        let id_str = self.id.as_deref().unwrap_or_default();
        let id: u32 = id_str
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidId(id_str.to_string()))?;

        let command_str = self
            .command
            .ok_or(ConfigError::MissingField(id, "command"))?;
        let command: Vec<String> = command_str.split_whitespace().map(str::to_string).collect();
        if command.is_empty() {
            return Err(ConfigError::EmptyCommand(id));
        }

        let instances = match self.instances {
            Some(raw) => {
                let n: u32 = parse_field(id, "instances", &raw)?;
                if n == 0 {
                    return Err(ConfigError::InvalidInstanceCount(id, raw));
                }
                n
            }
            None => 1,
        };

        let at_launch = match self.at_launch {
            Some(raw) => parse_bool(id, "at_launch", &raw)?,
            None => true,
        };

        let restart_policy = match self.restart_policy {
            Some(raw) => RestartPolicy::parse(&raw)
                .ok_or_else(|| ConfigError::InvalidRestartPolicy(id, raw.clone()))?,
            None => {
                tracing::info!(job_id = id, "restart_policy not specified, defaulting to never");
                RestartPolicy::default()
            }
        };

        let expected_exit = match self.expected_exit {
            Some(raw) => parse_field(id, "expected_exit", &raw)?,
            None => 0,
        };

        let start_checkup_secs = match self.start_checkup {
            Some(raw) => parse_field(id, "start_checkup", &raw)?,
            None => 0,
        };

        let max_restarts = match self.max_restarts {
            Some(raw) => parse_field(id, "max_restarts", &raw)?,
            None => 0,
        };

        let stop_signal = match self.stop_signal {
            Some(raw) if !raw.trim().is_empty() => Some(signal::parse(&raw)?),
            _ => None,
        };

        let stop_timeout_secs = match self.stop_timeout {
            Some(raw) => parse_field(id, "stop_timeout", &raw)?,
            None => 1,
        };
        if stop_timeout_secs < 1 {
            return Err(ConfigError::StopTimeoutTooShort(id, stop_timeout_secs));
        }

        let env_vars = match self.env_vars {
            Some(raw) => raw
                .split_whitespace()
                .filter_map(|tok| tok.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            None => Vec::new(),
        };

        let working_dir = self.working_dir.map(PathBuf::from);

        let umask = match self.umask {
            Some(raw) => u32::from_str_radix(raw.trim(), 8)
                .map_err(|_| ConfigError::InvalidInteger(id, "umask", raw))?,
            None => inherited_umask,
        };

        let redirections = self
            .redirections
            .map(|r| Redirections {
                stdin: r.stdin.filter(|s| !s.is_empty()).map(PathBuf::from),
                stdout: r.stdout.filter(|s| !s.is_empty()).map(PathBuf::from),
                stderr: r.stderr.filter(|s| !s.is_empty()).map(PathBuf::from),
            })
            .unwrap_or_default();

        Ok(JobConfig {
            id,
            command,
            instances,
            at_launch,
            restart_policy,
            expected_exit,
            start_checkup_secs,
            max_restarts,
            stop_signal,
            stop_timeout_secs,
            env_vars,
            working_dir,
            umask,
            redirections,
        })
    }
}

fn parse_bool(id: u32, field: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidInteger(id, field, raw.to_string())),
    }
}

/// Parse a full YAML document (a top-level sequence of job entries) into
/// validated [`JobConfig`]s, rejecting duplicate ids.
pub fn parse_all(yaml: &str, inherited_umask: u32) -> Result<Vec<JobConfig>, ConfigError> {
    let raw: Vec<RawJobConfig> =
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))?;

    let mut configs = Vec::with_capacity(raw.len());
    let mut seen = std::collections::HashSet::new();
    for entry in raw {
        let cfg = entry.into_typed(inherited_umask)?;
        if !seen.insert(cfg.id) {
            return Err(ConfigError::DuplicateId(cfg.id));
        }
        configs.push(cfg);
    }
    Ok(configs)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
