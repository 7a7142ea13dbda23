//! Out-of-process estimator over stdin/stdout JSON.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;

use survey_core::{EstimatorError, Location};
use tracing::debug;

use crate::estimator::UncertaintyEstimator;
use crate::request::EstimateRequest;

/// Runs an external program once per estimate.
///
/// The request is written to the child's stdin from a helper thread while
/// the calling thread drains stdout and stderr, so neither side can fill
/// a pipe and deadlock. The call blocks until the child exits; there is
/// no timeout, so a hung estimator stalls the cycle.
///
/// # Examples
///
/// ```no_run
/// use survey_estimator::SubprocessEstimator;
///
/// let gp = SubprocessEstimator::new("python3")
///     .arg("gp.py")
///     .working_dir("/opt/estimators");
/// assert_eq!(gp.program(), "python3");
/// ```
#[derive(Clone, Debug)]
pub struct SubprocessEstimator {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl SubprocessEstimator {
    /// An estimator that runs `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the program from `dir`.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The program that will be executed.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl UncertaintyEstimator for SubprocessEstimator {
    fn estimate(&self, request: &EstimateRequest) -> Result<Vec<Location>, EstimatorError> {
        let input = request.to_json().map_err(|e| EstimatorError::Encode {
            reason: e.to_string(),
        })?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|e| EstimatorError::Spawn {
            program: self.program.clone(),
            reason: e.to_string(),
        })?;

        let mut stdin = child.stdin.take().ok_or_else(|| EstimatorError::Io {
            reason: "child stdin was not captured".to_string(),
        })?;
        let writer = thread::spawn(move || {
            stdin.write_all(&input)
            // stdin drops here, closing the pipe so the child sees EOF.
        });

        let output = child.wait_with_output().map_err(|e| EstimatorError::Io {
            reason: format!("waiting for estimator: {e}"),
        })?;
        let write_result = writer.join().map_err(|_| EstimatorError::Io {
            reason: "request writer thread panicked".to_string(),
        })?;

        if !output.status.success() {
            return Err(EstimatorError::ExitStatus {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        match write_result {
            Ok(()) => {}
            // A successful child may answer without reading all of stdin.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!(program = %self.program, "estimator closed stdin early");
            }
            Err(e) => {
                return Err(EstimatorError::Io {
                    reason: format!("writing request: {e}"),
                });
            }
        }

        let locations: Vec<Location> =
            serde_json::from_slice(&output.stdout).map_err(|e| {
                EstimatorError::MalformedResponse {
                    reason: e.to_string(),
                }
            })?;

        debug!(
            program = %self.program,
            measurements = request.measurements.len(),
            queries = request.queries.len(),
            flagged = locations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "estimator finished"
        );
        Ok(locations)
    }
}
