//! Low-level async process management utilities.

use std::{
    ffi::OsStr,
    io,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::{Child, Command},
    task::JoinHandle,
};
use tracing::{debug, warn};

/// Errors that can occur during process operations.
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    /// Failed to spawn the process.
    #[error("Failed to spawn process {command:?} - {source}")]
    SpawnProcessFail {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Failed to wait for child process.
    #[error("Failed to wait for child process - {0}")]
    WaitChildFail(io::Error),

    /// Failed to read one of the child output streams.
    #[error("Failed to read process output - {0}")]
    ReadOutputFail(io::Error),
}

/// How long output readers may keep going once a timed out process group
/// has been killed. Only a process that left the group can hold a pipe open
/// past this.
const READER_GRACE: Duration = Duration::from_secs(1);

/// Everything a finished (or killed) process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit status, `None` if the status could not be collected after a kill.
    pub status: Option<ExitStatus>,
    /// Raw bytes written to stdout.
    pub stdout: Vec<u8>,
    /// Raw bytes written to stderr.
    pub stderr: Vec<u8>,
    /// The process outlived its time limit and was killed.
    pub timed_out: bool,
}

impl ProcessOutput {
    /// Exit code of the process, `None` when it was terminated by a signal.
    pub fn exit_code(&self) -> Option<i32> {
        self.status.and_then(|status| status.code())
    }

    /// Whether the process ran to completion and exited with code 0.
    pub fn success(&self) -> bool {
        !self.timed_out && self.status.is_some_and(|status| status.success())
    }

    /// Stdout followed by stderr, decoded lossily.
    pub fn combined_output(&self) -> String {
        let mut output = String::from_utf8_lossy(&self.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&self.stderr));
        output
    }
}

/// Spawn a new async process with null stdin and piped stdout and stderr.
///
/// The child is killed if its handle is dropped before it exits. On unix it
/// also leads a new process group, so [`stop_child`] reaches everything it
/// spawned.
///
/// # Examples
///
/// ```rust
/// use ccv_io::process::spawn_process;
///
/// #[tokio::main]
/// async fn main() {
///     let mut child = spawn_process("echo", ["Hello"]).unwrap();
///     let output = child.stdout.take().unwrap();
/// }
/// ```
pub fn spawn_process<I, S>(cmd: impl AsRef<OsStr>, args: I) -> Result<Child, ProcessError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let cmd = cmd.as_ref();
    let mut command = Command::new(cmd);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    command
        .spawn()
        .map_err(|source| ProcessError::SpawnProcessFail {
            command: cmd.to_string_lossy().into_owned(),
            source,
        })
}

/// Asynchronously terminate a child process and its process group.
pub async fn stop_child(child: &mut Child) -> Result<(), io::Error> {
    if let Some(pid) = child.id() {
        kill_process_group(pid);
    }
    child.kill().await
}

/// Send SIGKILL to every process in the group led by `pgid`.
///
/// The group outlives its leader, so this still works once the child itself
/// has been reaped.
#[cfg(unix)]
pub fn kill_process_group(pgid: u32) {
    use nix::{
        sys::signal::{Signal, killpg},
        unistd::Pid,
    };

    let Ok(raw) = i32::try_from(pgid) else {
        warn!("Process group id {pgid} out of range");
        return;
    };
    if let Err(err) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        debug!("Process group {pgid} not signalled - {err}");
    }
}

#[cfg(not(unix))]
pub fn kill_process_group(_pgid: u32) {}

/// Asynchronously wait for the child to exit and return its status.
pub async fn capture_exit_status(child: &mut Child) -> Result<ExitStatus, io::Error> {
    child.wait().await
}

/// Wait for a child to finish while draining both of its output streams.
///
/// Stdout and stderr are read concurrently with the wait so a chatty process
/// can never block on a full pipe. The returned value is only produced once
/// the process has exited and both streams reached EOF.
///
/// When `timeout` is set and elapses first, the child and its process group
/// are killed. The output is reported with `timed_out` set and whatever the
/// process wrote before it was killed.
///
/// # Examples
///
/// ```rust
/// use ccv_io::process::{spawn_process, capture_output};
///
/// #[tokio::main]
/// async fn main() {
///     let child = spawn_process("echo", ["done"]).unwrap();
///     let output = capture_output(child, None).await.unwrap();
///     assert!(output.success());
/// }
/// ```
pub async fn capture_output(
    mut child: Child,
    timeout: Option<Duration>,
) -> Result<ProcessOutput, ProcessError> {
    let group = child.id();
    let mut stdout_reader = tokio::spawn(read_stream(child.stdout.take()));
    let mut stderr_reader = tokio::spawn(read_stream(child.stderr.take()));
    let mut stdout = None;
    let mut stderr = None;

    let finished = async {
        let status = capture_exit_status(&mut child)
            .await
            .map_err(ProcessError::WaitChildFail)?;
        stdout = Some(joined((&mut stdout_reader).await)?);
        stderr = Some(joined((&mut stderr_reader).await)?);
        Ok::<_, ProcessError>(status)
    };

    let status = match timeout {
        Some(limit) => tokio::time::timeout(limit, finished).await.ok(),
        None => Some(finished.await),
    };

    if let Some(status) = status {
        return Ok(ProcessOutput {
            status: Some(status?),
            stdout: stdout.unwrap_or_default(),
            stderr: stderr.unwrap_or_default(),
            timed_out: false,
        });
    }

    warn!("Process {:?} exceeded its time limit, killing it", group);
    if let Some(pgid) = group {
        kill_process_group(pgid);
    }
    if let Err(err) = stop_child(&mut child).await {
        debug!("Failed to kill timed out process - {err}");
    }
    let status = capture_exit_status(&mut child).await.ok();

    // A reader that already finished was consumed above and must not be
    // polled again.
    let stdout = match stdout {
        Some(bytes) => bytes,
        None => drain_reader(stdout_reader).await,
    };
    let stderr = match stderr {
        Some(bytes) => bytes,
        None => drain_reader(stderr_reader).await,
    };

    Ok(ProcessOutput {
        status,
        stdout,
        stderr,
        timed_out: true,
    })
}

/// Spawn `cmd` and wait for its complete output.
pub async fn run_process<I, S>(
    cmd: impl AsRef<OsStr>,
    args: I,
    timeout: Option<Duration>,
) -> Result<ProcessOutput, ProcessError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let child = spawn_process(cmd, args)?;
    debug!("Spawned process {:?}", child.id());
    capture_output(child, timeout).await
}

type Reader = JoinHandle<Result<Vec<u8>, ProcessError>>;

fn joined(
    result: Result<Result<Vec<u8>, ProcessError>, tokio::task::JoinError>,
) -> Result<Vec<u8>, ProcessError> {
    result.map_err(|err| ProcessError::ReadOutputFail(io::Error::other(err)))?
}

/// Bytes a reader collected before its process was killed.
async fn drain_reader(mut reader: Reader) -> Vec<u8> {
    match tokio::time::timeout(READER_GRACE, &mut reader).await {
        Ok(result) => joined(result).unwrap_or_default(),
        Err(_) => {
            reader.abort();
            Vec::new()
        }
    }
}

async fn read_stream(
    stream: Option<impl AsyncRead + Unpin>,
) -> Result<Vec<u8>, ProcessError> {
    let mut buffer = Vec::new();
    if let Some(mut stream) = stream {
        stream
            .read_to_end(&mut buffer)
            .await
            .map_err(ProcessError::ReadOutputFail)?;
    }
    Ok(buffer)
}
