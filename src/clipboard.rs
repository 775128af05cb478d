use anyhow::{Context, Result, anyhow, bail};
use arboard::Clipboard;
#[cfg(target_os = "linux")]
use arboard::SetExtLinux;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

pub const DAEMON_FLAG: &str = "__clipboard_daemon";

/// Written by the helper on stdout once it has a clipboard handle.
const READY_BYTE: u8 = b'1';
const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(2);

/// Receives text to place on the clipboard. Fire-and-forget: callers are
/// never told whether the copy worked.
pub trait CopySink {
    fn copy(&self, text: &str);
}

/// Sink for runs that never copy (headless output).
pub struct NoClipboard;

impl CopySink for NoClipboard {
    fn copy(&self, text: &str) {
        log::debug!("clipboard disabled, not copying {:?}", text);
    }
}

/// A single way of writing to the clipboard that may fail.
pub trait ClipboardBackend {
    fn name(&self) -> &'static str;
    fn write_text(&mut self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Primary,
    Fallback,
    Failed,
}

/// Tries `primary`, then `fallback`. Failures are logged, never returned.
pub fn copy_with_fallback(
    primary: &mut dyn ClipboardBackend,
    fallback: &mut dyn ClipboardBackend,
    text: &str,
) -> CopyOutcome {
    match primary.write_text(text) {
        Ok(()) => {
            log::info!("copied {:?} via {}", text, primary.name());
            CopyOutcome::Primary
        }
        Err(primary_err) => {
            log::warn!(
                "{} clipboard write failed ({primary_err:#}), trying {}",
                primary.name(),
                fallback.name()
            );
            match fallback.write_text(text) {
                Ok(()) => {
                    log::info!("copied {:?} via {}", text, fallback.name());
                    CopyOutcome::Fallback
                }
                Err(fallback_err) => {
                    log::warn!("{} clipboard write failed: {fallback_err:#}", fallback.name());
                    CopyOutcome::Failed
                }
            }
        }
    }
}

/// In-process clipboard handle, opened on first use and kept for the
/// session.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl ClipboardBackend for SystemClipboard {
    fn name(&self) -> &'static str {
        "system"
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            self.inner = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = self.inner.as_mut() {
            clipboard.set_text(text)?;
        }
        Ok(())
    }
}

/// Hands the text to a detached helper process. On Linux the helper keeps
/// owning the selection after we exit.
///
/// A write only succeeds once the helper reports [`READY_BYTE`]; a helper
/// that exits, errors or stays silent past the timeout is killed and the
/// write fails.
pub struct DaemonClipboard {
    /// `None` re-executes the current binary with [`DAEMON_FLAG`].
    program: Option<PathBuf>,
    args: Vec<String>,
    ready_timeout: Duration,
    helpers: Vec<Child>,
}

impl Default for DaemonClipboard {
    fn default() -> Self {
        DaemonClipboard {
            program: None,
            args: vec![DAEMON_FLAG.to_string()],
            ready_timeout: DEFAULT_READY_TIMEOUT,
            helpers: Vec::new(),
        }
    }
}

impl DaemonClipboard {
    pub fn with_command(program: impl Into<PathBuf>, args: &[&str]) -> Self {
        DaemonClipboard {
            program: Some(program.into()),
            args: args.iter().map(|a| a.to_string()).collect(),
            ready_timeout: DEFAULT_READY_TIMEOUT,
            helpers: Vec::new(),
        }
    }

    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Helpers still running (they hold the clipboard).
    pub fn running_helpers(&self) -> usize {
        self.helpers.len()
    }

    /// Collects helpers that have exited.
    pub fn reap_exited(&mut self) {
        self.helpers.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                log::debug!("clipboard helper {} exited with {}", child.id(), status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("cannot poll clipboard helper {}: {}", child.id(), e);
                false
            }
        });
    }

    fn spawn_helper(&self) -> Result<Child> {
        let program = match &self.program {
            Some(program) => program.clone(),
            None => std::env::current_exe()?,
        };
        let child = Command::new(program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .current_dir("/")
            .spawn()?;
        Ok(child)
    }

    fn hand_over(&self, child: &mut Child, text: &str) -> Result<()> {
        let mut stdin = child
            .stdin
            .take()
            .context("Failed to get stdin for clipboard daemon")?;
        stdin.write_all(text.as_bytes())?;
        stdin.flush()?;
        // Closing stdin tells the helper the text is complete.
        drop(stdin);
        wait_until_ready(child, self.ready_timeout)
    }
}

fn wait_until_ready(child: &mut Child, timeout: Duration) -> Result<()> {
    let mut stdout = child
        .stdout
        .take()
        .context("Failed to get stdout for clipboard daemon")?;
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut byte = [0u8; 1];
        let read = stdout.read(&mut byte).map(|n| n == 1 && byte[0] == READY_BYTE);
        let _ = tx.send(read);
    });
    match rx.recv_timeout(timeout) {
        Ok(Ok(true)) => Ok(()),
        Ok(Ok(false)) => Err(anyhow!("clipboard helper exited without taking the clipboard")),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => bail!("clipboard helper not ready after {:?}", timeout),
    }
}

impl ClipboardBackend for DaemonClipboard {
    fn name(&self) -> &'static str {
        "daemon"
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.reap_exited();
        let mut child = self.spawn_helper()?;
        match self.hand_over(&mut child, text) {
            Ok(()) => {
                self.helpers.push(child);
                Ok(())
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(e)
            }
        }
    }
}

impl Drop for DaemonClipboard {
    fn drop(&mut self) {
        // Running helpers are left alone: they own what was copied.
        self.reap_exited();
    }
}

pub type BackendPair = (Box<dyn ClipboardBackend>, Box<dyn ClipboardBackend>);

/// Primary and fallback backends for this platform.
pub fn default_backends() -> BackendPair {
    let system: Box<dyn ClipboardBackend> = Box::new(SystemClipboard::default());
    let daemon: Box<dyn ClipboardBackend> = Box::new(DaemonClipboard::default());
    if cfg!(target_os = "linux") {
        // The in-process handle loses its contents once we exit, so prefer the daemon.
        (daemon, system)
    } else {
        (system, daemon)
    }
}

/// Background thread performing clipboard writes in submission order.
pub struct ClipboardWorker {
    tx: Option<Sender<String>>,
    handle: Option<JoinHandle<()>>,
}

impl ClipboardWorker {
    pub fn spawn() -> Result<Self> {
        Self::spawn_with(default_backends)
    }

    /// Backends are created on the worker thread, so they need not be `Send`.
    pub fn spawn_with<F>(make_backends: F) -> Result<Self>
    where
        F: FnOnce() -> BackendPair + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<String>();
        let handle = std::thread::Builder::new()
            .name("clipboard".into())
            .spawn(move || {
                let (mut primary, mut fallback) = make_backends();
                for text in rx {
                    copy_with_fallback(primary.as_mut(), fallback.as_mut(), &text);
                }
            })?;
        Ok(ClipboardWorker {
            tx: Some(tx),
            handle: Some(handle),
        })
    }
}

impl CopySink for ClipboardWorker {
    fn copy(&self, text: &str) {
        let Some(tx) = &self.tx else { return };
        if tx.send(text.to_string()).is_err() {
            log::warn!("clipboard worker is gone, dropping copy of {:?}", text);
        }
    }
}

impl Drop for ClipboardWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once queued copies are done.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("clipboard worker panicked");
            }
        }
    }
}

fn signal_ready() -> Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(&[READY_BYTE])?;
    stdout.flush()?;
    Ok(())
}

/// Runs as the helper process. Any failure before the ready byte makes the
/// parent fall back.
fn run_daemon_mode() -> Result<()> {
    let text = std::io::read_to_string(std::io::stdin())?;

    let mut clipboard = Clipboard::new()?;

    #[cfg(target_os = "linux")]
    {
        signal_ready()?;
        // Blocks until the selection is taken over by someone else.
        clipboard.set().wait().text(text)?;
    }

    #[cfg(not(target_os = "linux"))]
    {
        clipboard.set_text(text)?;
        signal_ready()?;
    }
    Ok(())
}

/// Checks if the DAEMON_FLAG is present in args. If so, runs in daemon mode.
/// Returns Ok(true) if daemon mode was run, Ok(false) otherwise.
pub fn check_and_run_daemon_if_requested() -> Result<bool> {
    if std::env::args().any(|a| a == DAEMON_FLAG) {
        run_daemon_mode()?;
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    struct Failing;

    impl ClipboardBackend for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn write_text(&mut self, _text: &str) -> Result<()> {
            Err(anyhow::anyhow!("no clipboard here"))
        }
    }

    #[derive(Clone, Default)]
    struct Recording(Arc<Mutex<Vec<String>>>);

    impl Recording {
        fn written(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl ClipboardBackend for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn write_text(&mut self, text: &str) -> Result<()> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn primary_success_skips_fallback() {
        let mut primary = Recording::default();
        let mut fallback = Recording::default();
        let outcome = copy_with_fallback(&mut primary, &mut fallback, "root/a");
        assert_eq!(outcome, CopyOutcome::Primary);
        assert_eq!(primary.written(), vec!["root/a"]);
        assert!(fallback.written().is_empty());
    }

    #[test]
    fn primary_failure_uses_fallback() {
        let mut fallback = Recording::default();
        let outcome = copy_with_fallback(&mut Failing, &mut fallback, "root/a");
        assert_eq!(outcome, CopyOutcome::Fallback);
        assert_eq!(fallback.written(), vec!["root/a"]);
    }

    #[test]
    fn double_failure_is_swallowed() {
        let outcome = copy_with_fallback(&mut Failing, &mut Failing, "root/a");
        assert_eq!(outcome, CopyOutcome::Failed);
    }

    #[test]
    fn worker_copies_in_submission_order() {
        let fallback = Recording::default();
        let seen = fallback.clone();
        let worker = ClipboardWorker::spawn_with(move || {
            let primary: Box<dyn ClipboardBackend> = Box::new(Failing);
            let fallback: Box<dyn ClipboardBackend> = Box::new(fallback);
            (primary, fallback)
        })
        .unwrap();
        worker.copy("first");
        worker.copy("second");
        drop(worker);
        assert_eq!(seen.written(), vec!["first", "second"]);
    }

    #[test]
    fn default_backend_order_depends_on_platform() {
        let (primary, fallback) = default_backends();
        if cfg!(target_os = "linux") {
            assert_eq!((primary.name(), fallback.name()), ("daemon", "system"));
        } else {
            assert_eq!((primary.name(), fallback.name()), ("system", "daemon"));
        }
    }

    #[cfg(unix)]
    #[test]
    fn daemon_without_clipboard_falls_back() {
        // Reads the text, then exits without reporting ready, like a helper
        // whose clipboard could not be opened.
        let mut daemon = DaemonClipboard::with_command("sh", &["-c", "cat >/dev/null; exit 3"]);
        let mut fallback = Recording::default();
        let outcome = copy_with_fallback(&mut daemon, &mut fallback, "root/a");
        assert_eq!(outcome, CopyOutcome::Fallback);
        assert_eq!(fallback.written(), vec!["root/a"]);
        assert_eq!(daemon.running_helpers(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn missing_helper_binary_is_an_error() {
        let mut daemon = DaemonClipboard::with_command("/nonexistent/treeyank-helper", &[]);
        assert!(daemon.write_text("root/a").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn silent_helper_is_killed_after_timeout() {
        let mut daemon = DaemonClipboard::with_command("sh", &["-c", "cat >/dev/null; sleep 30"])
            .ready_timeout(Duration::from_millis(200));
        let started = Instant::now();
        assert!(daemon.write_text("root/a").is_err());
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(daemon.running_helpers(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn ready_helper_succeeds_and_is_reaped_after_exit() {
        let mut daemon = DaemonClipboard::with_command("sh", &["-c", "cat >/dev/null; printf 1"]);
        daemon.write_text("root/a").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while daemon.running_helpers() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
            daemon.reap_exited();
        }
        assert_eq!(daemon.running_helpers(), 0);
    }
}
