//! Bounded execution of one external command.
//!
//! Each run gets a deadline (SIGTERM, then SIGKILL after a short grace),
//! a byte cap per output stream, and a scrubbed environment so parsers
//! always see C-locale output. Optional `nice`/`ionice` wrapping keeps
//! collection from competing with real workloads.
//!
//! The probe layer in [`super::runner`] maps every outcome of this module
//! into a [`super::ProbeResult`]; nothing here is visible to parsers.

use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, instrument, trace, warn};

/// Default timeout per command in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default cap per output stream in bytes (10 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Time a child gets between SIGTERM and SIGKILL.
const KILL_GRACE: Duration = Duration::from_millis(500);

/// Idle wait between polls when neither pipe had data.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

const READ_CHUNK: usize = 8192;

/// Reasons a command never produced any output.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("command not found: {0}")]
    NotFound(String),

    #[error("command rejected: {0}")]
    Rejected(String),

    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while waiting for child: {0}")]
    Io(#[from] std::io::Error),
}

/// What a finished (or killed) command left behind.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,

    /// Exit status, or `128 + signal` when killed by a signal.
    pub exit_code: Option<i32>,

    /// Whether either stream hit the byte cap.
    pub truncated: bool,

    /// Whether the deadline passed and the child was killed.
    pub timed_out: bool,

    pub duration: Duration,
}

/// Runner limits.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Deadline used when a run does not name its own.
    pub default_timeout: Duration,

    /// Cap per output stream in bytes.
    pub max_output_bytes: usize,

    /// Wrap commands in `nice -n <nice_value>`.
    pub use_nice: bool,

    pub nice_value: i32,

    /// Add `ionice -c <ionice_class>` inside the nice wrapper.
    #[cfg(target_os = "linux")]
    pub use_ionice: bool,

    #[cfg(target_os = "linux")]
    pub ionice_class: i32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            use_nice: false,
            nice_value: 10,
            #[cfg(target_os = "linux")]
            use_ionice: false,
            #[cfg(target_os = "linux")]
            ionice_class: 3,
        }
    }
}

/// Runs argv vectors under a [`ToolConfig`].
#[derive(Debug, Clone)]
pub struct ToolRunner {
    config: ToolConfig,
}

impl ToolRunner {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    /// Run `argv[0]` with the remaining arguments.
    ///
    /// A non-zero exit or a timeout is still `Ok`; `Err` means the process
    /// never started.
    #[instrument(skip(self), fields(cmd = argv.first().copied().unwrap_or("")))]
    pub fn run(&self, argv: &[&str], timeout: Option<Duration>) -> Result<ToolOutput, ToolError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ToolError::Rejected("empty argv".to_string()))?;
        check_program(program)?;

        let timeout = timeout.unwrap_or(self.config.default_timeout);
        debug!(
            program,
            ?args,
            timeout_ms = timeout.as_millis() as u64,
            "spawning"
        );

        let started = Instant::now();
        let mut child = self
            .command(program, args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => ToolError::NotFound(program.to_string()),
                _ => {
                    error!(program, error = %source, "spawn failed");
                    ToolError::Spawn {
                        command: program.to_string(),
                        source,
                    }
                }
            })?;

        let mut pipes = Pipes::new(&mut child, self.config.max_output_bytes);
        let (exit_code, timed_out) = wait_bounded(&mut child, &mut pipes, started + timeout)?;
        let duration = started.elapsed();

        trace!(
            program,
            duration_ms = duration.as_millis() as u64,
            ?exit_code,
            timed_out,
            "finished"
        );

        Ok(ToolOutput {
            truncated: pipes.truncated,
            stdout: pipes.stdout_buf,
            stderr: pipes.stderr_buf,
            exit_code,
            timed_out,
            duration,
        })
    }

    fn command(&self, program: &str, args: &[&str]) -> Command {
        let mut command = if cfg!(unix) && self.config.use_nice {
            let mut wrapped = Command::new("nice");
            wrapped.arg("-n").arg(self.config.nice_value.to_string());
            #[cfg(target_os = "linux")]
            if self.config.use_ionice {
                wrapped
                    .arg("ionice")
                    .arg("-c")
                    .arg(self.config.ionice_class.to_string());
            }
            wrapped.arg(program);
            wrapped
        } else {
            Command::new(program)
        };
        command.args(args);

        // Parsers key on English labels and C number formatting.
        command.env_clear();
        if let Some(path) = std::env::var_os("PATH") {
            command.env("PATH", path);
        }
        command.env("LC_ALL", "C").env("LANG", "C");
        command
    }
}

/// Poll the child until it exits or `deadline` passes, pumping both pipes.
fn wait_bounded(
    child: &mut Child,
    pipes: &mut Pipes,
    deadline: Instant,
) -> Result<(Option<i32>, bool), ToolError> {
    loop {
        if Instant::now() >= deadline {
            warn!(pid = child.id(), "deadline passed, terminating");
            terminate(child);
            pipes.drain();
            let code = child.wait().ok().and_then(exit_code_of);
            return Ok((code, true));
        }

        let progressed = pipes.pump();
        match child.try_wait() {
            Ok(Some(status)) => {
                pipes.drain();
                return Ok((exit_code_of(status), false));
            }
            Ok(None) if !progressed => thread::sleep(POLL_INTERVAL),
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "try_wait failed");
                terminate(child);
                return Err(ToolError::Io(e));
            }
        }
    }
}

/// Both output pipes of a child and what has been read from them so far.
struct Pipes {
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    stdout_buf: Vec<u8>,
    stderr_buf: Vec<u8>,
    cap: usize,
    truncated: bool,
    chunk: Vec<u8>,
}

impl Pipes {
    fn new(child: &mut Child, cap: usize) -> Self {
        Self {
            stdout: child.stdout.take(),
            stderr: child.stderr.take(),
            stdout_buf: Vec::with_capacity(cap.min(64 * 1024)),
            stderr_buf: Vec::with_capacity(cap.min(64 * 1024)),
            cap,
            truncated: false,
            chunk: vec![0; READ_CHUNK],
        }
    }

    /// One non-blocking read from each pipe. True if anything arrived.
    fn pump(&mut self) -> bool {
        let mut got = false;
        if let Some(out) = self.stdout.as_mut() {
            got |= read_into(out, &mut self.chunk, &mut self.stdout_buf, self.cap, &mut self.truncated);
        }
        if let Some(err) = self.stderr.as_mut() {
            got |= read_into(err, &mut self.chunk, &mut self.stderr_buf, self.cap, &mut self.truncated);
        }
        got
    }

    /// Read each pipe until it is empty or its buffer is full.
    ///
    /// Grandchildren may keep a pipe open after the child exits, so this
    /// stops at the first empty read rather than waiting for EOF.
    fn drain(&mut self) {
        let cap = self.cap;
        if let Some(out) = self.stdout.as_mut() {
            while self.stdout_buf.len() < cap
                && read_into(out, &mut self.chunk, &mut self.stdout_buf, cap, &mut self.truncated)
            {}
        }
        if let Some(err) = self.stderr.as_mut() {
            while self.stderr_buf.len() < cap
                && read_into(err, &mut self.chunk, &mut self.stderr_buf, cap, &mut self.truncated)
            {}
        }
    }
}

fn read_into<R: Pipe>(
    stream: &mut R,
    chunk: &mut [u8],
    buf: &mut Vec<u8>,
    cap: usize,
    truncated: &mut bool,
) -> bool {
    match read_nonblocking(stream, chunk) {
        Ok(0) | Err(_) => false,
        Ok(n) => {
            let room = cap.saturating_sub(buf.len());
            if n > room {
                *truncated = true;
            }
            buf.extend_from_slice(&chunk[..n.min(room)]);
            true
        }
    }
}

/// Refuse names that only make sense to a shell.
fn check_program(program: &str) -> Result<(), ToolError> {
    if program.is_empty() {
        return Err(ToolError::Rejected("empty command".to_string()));
    }
    if program.contains(['|', '&', ';', '$', '`', '\n', '\r']) {
        return Err(ToolError::Rejected(format!("shell metacharacters in {program:?}")));
    }
    if program.starts_with('/') && !Path::new(program).exists() {
        return Err(ToolError::NotFound(program.to_string()));
    }
    Ok(())
}

#[cfg(unix)]
fn exit_code_of(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|sig| 128 + sig))
}

#[cfg(not(unix))]
fn exit_code_of(status: ExitStatus) -> Option<i32> {
    status.code()
}

/// SIGTERM, wait up to [`KILL_GRACE`], then SIGKILL.
#[cfg(unix)]
fn terminate(child: &mut Child) {
    let pid = child.id() as libc::pid_t;
    // SAFETY: pid belongs to a child we have not reaped yet.
    unsafe {
        libc::kill(pid, libc::SIGTERM);
    }

    let grace_end = Instant::now() + KILL_GRACE;
    while Instant::now() < grace_end {
        match child.try_wait() {
            Ok(Some(_)) => return,
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                error!(pid, error = %e, "lost track of child during grace period");
                return;
            }
        }
    }

    warn!(pid, "still alive after SIGTERM, sending SIGKILL");
    // SAFETY: as above.
    unsafe {
        libc::kill(pid, libc::SIGKILL);
    }
    let _ = child.wait();
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// A child output pipe.
#[cfg(unix)]
trait Pipe: Read + std::os::unix::io::AsRawFd {}
#[cfg(unix)]
impl<T: Read + std::os::unix::io::AsRawFd> Pipe for T {}

#[cfg(not(unix))]
trait Pipe: Read {}
#[cfg(not(unix))]
impl<T: Read> Pipe for T {}

/// Read whatever is available without blocking; `Ok(0)` when nothing is.
#[cfg(unix)]
fn read_nonblocking<R: Pipe>(stream: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    use std::os::unix::io::AsRawFd;

    let fd = stream.as_raw_fd();
    // SAFETY: fd is owned by `stream` for the duration of this call.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(std::io::Error::last_os_error());
    }
    let toggle = flags & libc::O_NONBLOCK == 0;
    if toggle {
        let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
        if rc < 0 {
            return Err(std::io::Error::last_os_error());
        }
    }

    let result = stream.read(buf);

    if toggle {
        unsafe {
            libc::fcntl(fd, libc::F_SETFL, flags);
        }
    }
    match result {
        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
        other => other,
    }
}

#[cfg(not(unix))]
fn read_nonblocking<R: Pipe>(stream: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    stream.read(buf)
}
