//! Child-process primitive underneath every git invocation.
//!
//! A [`CommandInvocation`] describes one run of an external program. [`run`]
//! spawns it, streams complete output lines to caller-supplied callbacks and
//! reports how the process ended as an [`ExitState`].

use crate::error::{GitError, GitResult};
use encoding_rs::Encoding;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::RwLock;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a timed wait re-checks the child once its streams are closed
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to keep collecting output after a forced termination
const KILL_DRAIN_GRACE: Duration = Duration::from_millis(200);

/// Process-wide decoder for child output. `None` means UTF-8.
static OUTPUT_ENCODING: RwLock<Option<&'static Encoding>> = RwLock::new(None);

/// Override the text encoding used to decode stdout/stderr of every child.
///
/// Intended to be set once at startup, e.g. for machines whose git emits
/// GBK or Windows-1252 output. Pass `None` to go back to UTF-8.
pub fn set_output_encoding(encoding: Option<&'static Encoding>) {
    match OUTPUT_ENCODING.write() {
        Ok(mut guard) => *guard = encoding,
        Err(poisoned) => *poisoned.into_inner() = encoding,
    }
}

/// The encoding currently used to decode child output, if overridden
pub fn output_encoding() -> Option<&'static Encoding> {
    match OUTPUT_ENCODING.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Writes the child's standard input. Runs once on a helper thread; the pipe
/// is closed afterwards.
pub type InputWriter = Box<dyn FnOnce(&mut dyn Write) -> io::Result<()> + Send>;

/// One execution of an external program.
///
/// Arguments are kept as a vector and handed to the OS as-is; nothing is ever
/// interpreted by a shell.
pub struct CommandInvocation {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
    timeout: Option<Duration>,
    input: Option<InputWriter>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
            timeout: None,
            input: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// A zero duration disables the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn input<F>(mut self, writer: F) -> Self
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()> + Send + 'static,
    {
        self.input = Some(Box::new(writer));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Human-readable form for logs and error messages
    pub fn display(&self) -> String {
        let mut text = self.program.clone();
        for arg in &self.args {
            text.push(' ');
            text.push_str(arg);
        }
        text
    }
}

impl fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInvocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("current_dir", &self.current_dir)
            .field("envs", &self.envs)
            .field("timeout", &self.timeout)
            .field("input", &self.input.is_some())
            .finish()
    }
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// The process exited on its own with this code
    Exited(i32),
    /// The process was killed by a signal it did not get from us
    Signaled(i32),
    /// The timeout elapsed and the runner terminated the process
    TimedOut,
}

impl ExitState {
    pub fn success(&self) -> bool {
        matches!(self, ExitState::Exited(0))
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitState::Exited(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitState::Exited(code) => write!(f, "exit code {}", code),
            ExitState::Signaled(signal) => write!(f, "signal {}", signal),
            ExitState::TimedOut => write!(f, "timed out"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Run `invocation` to completion, feeding each complete output line to the
/// matching callback.
///
/// Lines are split on `\n` with a trailing `\r` removed. Text left without a
/// terminator when a stream closes is delivered once as a final line.
/// Callbacks are invoked on the calling thread. Blocks until the process
/// exits or the timeout elapses; in the latter case the process is killed and
/// [`ExitState::TimedOut`] is returned. Lines already delivered stay
/// delivered.
pub fn run(
    invocation: CommandInvocation,
    on_stdout: &mut dyn FnMut(&str),
    on_stderr: &mut dyn FnMut(&str),
) -> GitResult<ExitState> {
    let CommandInvocation {
        program,
        args,
        current_dir,
        envs,
        timeout,
        input,
    } = invocation;

    let mut command = Command::new(&program);
    command
        .args(&args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &current_dir {
        command.current_dir(dir);
    }
    for (key, value) in &envs {
        command.env(key, value);
    }

    let mut child = command
        .spawn()
        .map_err(|source| GitError::ProcessLaunchFailed {
            program: program.clone(),
            source,
        })?;

    let encoding = output_encoding();
    let (tx, rx) = mpsc::channel();
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_reader(Stream::Stdout, stdout, encoding, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_reader(Stream::Stderr, stderr, encoding, tx.clone()));
    }
    drop(tx);

    // Written concurrently so a child that never reads cannot outlast the deadline
    let writer = input.and_then(|write_input| {
        child
            .stdin
            .take()
            .map(|stdin| spawn_writer(stdin, write_input))
    });

    let mut dispatch = |(stream, line): (Stream, String)| match stream {
        Stream::Stdout => on_stdout(&line),
        Stream::Stderr => on_stderr(&line),
    };

    let deadline = timeout.map(|t| Instant::now() + t);
    let mut timed_out = false;
    loop {
        let event = match deadline {
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    timed_out = true;
                    break;
                }
                rx.recv_timeout(remaining)
            }
        };
        match event {
            Ok(event) => dispatch(event),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                timed_out = true;
                break;
            }
        }
    }

    let status = if timed_out {
        None
    } else {
        wait_until(&mut child, deadline)?
    };

    let state = match status {
        Some(status) => {
            for reader in readers {
                let _ = reader.join();
            }
            for event in rx.try_iter() {
                dispatch(event);
            }
            if let Some(writer) = writer {
                finish_input(writer, &program)?;
            }
            exit_state(status)
        }
        None => {
            for event in rx.try_iter() {
                dispatch(event);
            }
            if let Ok(None) = child.try_wait() {
                tracing::warn!(
                    "Terminating '{} {}' after {:?}",
                    program,
                    args.join(" "),
                    timeout.unwrap_or_default()
                );
                if let Err(err) = child.kill() {
                    tracing::debug!("Failed to kill {}: {}", program, err);
                }
            }
            if let Err(err) = child.wait() {
                tracing::debug!("Failed to reap {}: {}", program, err);
            }
            let grace = Instant::now() + KILL_DRAIN_GRACE;
            loop {
                let remaining = grace.saturating_duration_since(Instant::now());
                match rx.recv_timeout(remaining) {
                    Ok(event) => dispatch(event),
                    Err(_) => break,
                }
            }
            ExitState::TimedOut
        }
    };

    Ok(state)
}

/// Hand the child's stdin to the writer, then flush it. The pipe closes
/// when the thread ends.
fn spawn_writer(mut stdin: ChildStdin, write_input: InputWriter) -> JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        write_input(&mut stdin)?;
        stdin.flush()
    })
}

/// Surface a failed input write once the child has exited
fn finish_input(writer: JoinHandle<io::Result<()>>, program: &str) -> GitResult<()> {
    match writer.join() {
        Ok(Ok(())) => Ok(()),
        // The child stopped reading; its exit state tells the rest
        Ok(Err(err)) if err.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("{} closed stdin early: {}", program, err);
            Ok(())
        }
        Ok(Err(err)) => Err(GitError::IoError(err)),
        Err(_) => Err(GitError::IoError(io::Error::other(format!(
            "stdin writer for {} panicked",
            program
        )))),
    }
}

/// Wait for the child to exit. Returns `None` if the deadline passes first.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> GitResult<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return Ok(Some(child.wait()?));
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        thread::sleep(remaining.min(POLL_INTERVAL));
    }
}

fn exit_state(status: ExitStatus) -> ExitState {
    if let Some(code) = status.code() {
        return ExitState::Exited(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitState::Signaled(signal);
        }
    }

    ExitState::Exited(-1)
}

fn spawn_reader<R>(
    stream: Stream,
    source: R,
    encoding: Option<&'static Encoding>,
    tx: Sender<(Stream, String)>,
) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }
                    if tx.send((stream, decode(&buf, encoding))).is_err() {
                        break;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    })
}

fn decode(bytes: &[u8], encoding: Option<&'static Encoding>) -> String {
    match encoding {
        Some(encoding) if encoding != encoding_rs::UTF_8 => encoding
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}
