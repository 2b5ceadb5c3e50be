//! Process execution.
//!
//! [`ProcessExecutor`] is the seam between the orchestrator and the operating
//! system. [`SystemExecutor`] spawns the real checker; tests substitute an
//! in-memory implementation.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use crate::error_handling::ExecutionError;

use super::Invocation;

/// How long to wait for pipes to drain after killing a timed-out process.
const KILL_GRACE: Duration = Duration::from_secs(5);

/// Everything a finished process produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, or -1 when the process was terminated by a signal
    pub exit_code: i32,
}

/// Runs an invocation to completion within a wall-clock budget.
pub trait ProcessExecutor: Send + Sync {
    /// Executes `invocation` once.
    ///
    /// Implementations must stop the process, and any processes it spawned,
    /// when `budget` elapses and return [`ExecutionError::TimedOut`].
    fn execute(
        &self,
        invocation: &Invocation,
        budget: Duration,
    ) -> impl Future<Output = Result<ProcessOutput, ExecutionError>> + Send;
}

/// Executes invocations as real child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor {
    working_dir: Option<PathBuf>,
}

impl SystemExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs processes in `dir` instead of the current directory.
    pub fn with_working_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(dir.into()),
        }
    }
}

impl ProcessExecutor for SystemExecutor {
    async fn execute(
        &self,
        invocation: &Invocation,
        budget: Duration,
    ) -> Result<ProcessOutput, ExecutionError> {
        let mut command = tokio::process::Command::new(invocation.program());
        command
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(ExecutionError::Spawn)?;
        let child_pid = child.id();
        log::debug!("Spawned {} with pid {:?}", invocation.program(), child_pid);

        let mut output_fut = Box::pin(child.wait_with_output());
        tokio::select! {
            output = &mut output_fut => {
                let output = output.map_err(ExecutionError::Wait)?;
                Ok(ProcessOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code: output.status.code().unwrap_or(-1),
                })
            }
            _ = tokio::time::sleep(budget) => {
                log::warn!(
                    "{} exceeded its budget of {}s; killing process tree",
                    invocation.program(),
                    budget.as_secs_f64()
                );
                kill_process_tree(child_pid);
                // Reap the child; dropping the future kills it if it lingers.
                let _ = tokio::time::timeout(KILL_GRACE, &mut output_fut).await;
                Err(ExecutionError::TimedOut(budget))
            }
        }
    }
}

/// Kills a process and all of its descendants, children first.
pub fn kill_process_tree(pid: Option<u32>) {
    let Some(pid) = pid else {
        return;
    };
    let root = sysinfo::Pid::from_u32(pid);

    let mut sys = sysinfo::System::new();
    sys.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

    let mut children_map: HashMap<sysinfo::Pid, Vec<sysinfo::Pid>> = HashMap::new();
    for (p, proc_) in sys.processes() {
        if let Some(parent) = proc_.parent() {
            children_map.entry(parent).or_default().push(*p);
        }
    }

    let mut to_kill = Vec::new();
    collect_process_tree(root, &children_map, &mut to_kill);

    for pid in to_kill.into_iter().rev() {
        if let Some(proc_) = sys.process(pid) {
            if !proc_.kill() {
                log::debug!("Could not kill process {}", pid);
            }
        }
    }
}

fn collect_process_tree(
    pid: sysinfo::Pid,
    children_map: &HashMap<sysinfo::Pid, Vec<sysinfo::Pid>>,
    out: &mut Vec<sysinfo::Pid>,
) {
    out.push(pid);
    if let Some(children) = children_map.get(&pid) {
        for child in children {
            collect_process_tree(*child, children_map, out);
        }
    }
}
