//! The `atvremote` session supervisor

use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use atv_process::{ManagedChild, ProcessConfig, ProcessManager};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::ChildStdin;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::close::{CloseCallback, CloseEvent, CloseReason, CloseSlot};
use crate::command::{Command, RemoteKey, RepeatState, ShuffleState};
use crate::error::{RemoteError, Result};
use crate::heartbeat::{HeartbeatDecision, HeartbeatPolicy};
use crate::logger::{Logger, PrefixLogger};
use crate::output::{classify_stdout, OutputLine, StderrPolicy};
use crate::sequence::{avada_kedavra_sequence, DEFAULT_RESET_APP_COUNT};

/// Label prepended to every message a session logs
pub const SESSION_LOG_PREFIX: &str = "Rocket Remote";

/// How long teardown waits for the readers to drain buffered output
const READER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

type HomeListener = Arc<dyn Fn() + Send + Sync>;

/// Connection parameters for one device
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Network address passed to `--scan-hosts`
    pub address: String,
    /// Device identifier passed to `--id`, usually the MAC
    pub device_id: Option<String>,
    pub atvremote_path: String,
    /// May be empty when the device is not paired for AirPlay
    pub airplay_credentials: String,
    /// May be empty when the device is not paired for Companion
    pub companion_credentials: String,
    pub heartbeat: HeartbeatPolicy,
    pub stderr_policy: StderrPolicy,
    /// Apps swiped away by [`RemoteSession::avada_kedavra`]
    pub reset_app_count: usize,
}

impl SessionConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            device_id: None,
            atvremote_path: "atvremote".to_string(),
            airplay_credentials: String::new(),
            companion_credentials: String::new(),
            heartbeat: HeartbeatPolicy::default(),
            stderr_policy: StderrPolicy::default(),
            reset_app_count: DEFAULT_RESET_APP_COUNT,
        }
    }

    pub fn with_device_id(mut self, id: impl Into<String>) -> Self {
        self.device_id = Some(id.into());
        self
    }

    pub fn with_atvremote_path(mut self, path: impl Into<String>) -> Self {
        self.atvremote_path = path.into();
        self
    }

    pub fn with_credentials(
        mut self,
        airplay: impl Into<String>,
        companion: impl Into<String>,
    ) -> Self {
        self.airplay_credentials = airplay.into();
        self.companion_credentials = companion.into();
        self
    }

    pub fn with_heartbeat(mut self, heartbeat: HeartbeatPolicy) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    pub fn with_stderr_policy(mut self, policy: StderrPolicy) -> Self {
        self.stderr_policy = policy;
        self
    }

    pub fn with_reset_app_count(mut self, count: usize) -> Self {
        self.reset_app_count = count;
        self
    }

    /// Arguments shared by the interactive and one-shot invocations
    pub fn base_args(&self) -> Vec<String> {
        let mut args = vec!["--scan-hosts".to_string(), self.address.clone()];
        if let Some(id) = &self.device_id {
            args.push("--id".to_string());
            args.push(id.clone());
        }
        args.extend([
            "--companion-credentials".to_string(),
            self.companion_credentials.clone(),
            "--airplay-credentials".to_string(),
            self.airplay_credentials.clone(),
        ]);
        args
    }

    fn interactive_process(&self) -> ProcessConfig {
        ProcessConfig::new(&self.atvremote_path)
            .args(self.base_args())
            .arg("cli")
            .kill_on_drop(true)
    }

    fn oneshot_process(&self, tokens: Vec<String>) -> ProcessConfig {
        ProcessConfig::new(&self.atvremote_path)
            .args(self.base_args())
            .args(tokens)
            .pipe_stdin(false)
            .kill_on_drop(true)
    }
}

/// Requests a kill from a supervisor; only the first request counts
struct KillSwitch {
    requested: AtomicBool,
    tx: mpsc::UnboundedSender<CloseReason>,
}

impl KillSwitch {
    fn new(tx: mpsc::UnboundedSender<CloseReason>) -> Self {
        Self {
            requested: AtomicBool::new(false),
            tx,
        }
    }

    fn trigger(&self, reason: CloseReason) -> bool {
        if self.requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        // The supervisor may already be gone if the process exited first
        let _ = self.tx.send(reason);
        true
    }
}

/// Where a line of output came from
#[derive(Debug, Clone, Copy)]
enum OutputSource {
    Stdout,
    Stderr(StderrPolicy),
}

impl OutputSource {
    fn classify(&self, line: &str) -> OutputLine {
        match self {
            OutputSource::Stdout => classify_stdout(line),
            OutputSource::Stderr(policy) => policy.classify(line),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            OutputSource::Stdout => "stdout",
            OutputSource::Stderr(_) => "stderr",
        }
    }
}

/// State reachable from the session handle and its background tasks
struct Shared {
    log: Arc<dyn Logger>,
    commands: mpsc::UnboundedSender<String>,
    last_sent: Mutex<Option<Instant>>,
    kill: Arc<KillSwitch>,
    close: CloseSlot,
    home_listener: Mutex<Option<HomeListener>>,
    closed: AtomicBool,
}

impl Shared {
    fn new(
        log: Arc<dyn Logger>,
        commands: mpsc::UnboundedSender<String>,
        kill: Arc<KillSwitch>,
    ) -> Self {
        Self {
            log,
            commands,
            last_sent: Mutex::new(None),
            kill,
            close: CloseSlot::new(),
            home_listener: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    fn send(&self, command: &Command, hide_from_log: bool) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RemoteError::SessionClosed);
        }

        let line = command.to_string();
        if hide_from_log {
            self.log.debug(&line);
        } else {
            self.log.info(&line);
        }

        if command.is_key(RemoteKey::Home) {
            let listener = self.home_listener.lock().clone();
            if let Some(listener) = listener {
                listener();
            }
        }

        *self.last_sent.lock() = Some(Instant::now());
        self.commands
            .send(format!("{}\n", line))
            .map_err(|_| RemoteError::SessionClosed)
    }

    fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn finish(&self, reason: CloseReason, status: atv_process::Result<ExitStatus>) {
        self.mark_closed();

        let exit_code = match status {
            Ok(status) => status.code(),
            Err(e) => {
                warn!(error = %e, "Failed to collect atvremote exit status");
                None
            }
        };

        self.log.warn("Lost connection. Trying to reconnect ...");
        self.close.fire(CloseEvent { exit_code, reason });
    }
}

/// A live control channel to one Apple TV.
///
/// Commands are written to a persistent `atvremote ... cli` process. The session
/// dies when the process exits, when it prints a fatal line, or when it is
/// disconnected; after that every send returns [`RemoteError::SessionClosed`] and
/// the caller reconnects by creating a new session.
pub struct RemoteSession {
    config: SessionConfig,
    shared: Arc<Shared>,
    closed_rx: watch::Receiver<bool>,
    pid: u32,
}

impl RemoteSession {
    /// Spawn `atvremote` and start supervising it.
    ///
    /// Must be called from within a tokio runtime. Spawn failure is returned
    /// directly; every later failure is reported through [`on_close`](Self::on_close).
    pub fn connect(config: SessionConfig, logger: Arc<dyn Logger>) -> Result<Self> {
        let log: Arc<dyn Logger> = Arc::new(PrefixLogger::new(logger, SESSION_LOG_PREFIX));

        let mut child = ProcessManager::new().spawn(config.interactive_process())?;
        let pid = child.pid();
        let stdin = child.stdin().ok_or(RemoteError::MissingStream("stdin"))?;
        let stdout = child.stdout().ok_or(RemoteError::MissingStream("stdout"))?;
        let stderr = child.stderr().ok_or(RemoteError::MissingStream("stderr"))?;

        info!(pid, address = %config.address, "atvremote session started");

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = watch::channel(false);
        let kill = Arc::new(KillSwitch::new(kill_tx));
        let shared = Arc::new(Shared::new(log.clone(), commands_tx, kill.clone()));
        let cancel = CancellationToken::new();

        let readers = vec![
            tokio::spawn(read_output(stdout, OutputSource::Stdout, log.clone(), kill.clone())),
            tokio::spawn(read_output(
                stderr,
                OutputSource::Stderr(config.stderr_policy),
                log,
                kill,
            )),
        ];
        tokio::spawn(write_commands(stdin, commands_rx, shared.clone(), cancel.clone()));
        tokio::spawn(run_heartbeat(shared.clone(), config.heartbeat, cancel.clone()));

        let supervised = shared.clone();
        tokio::spawn(async move {
            let (reason, status) = supervise(child, kill_rx).await;
            // Reject sends while the readers drain output a grandchild may hold open
            supervised.mark_closed();
            drain(readers).await;
            cancel.cancel();
            supervised.finish(reason, status);
            let _ = closed_tx.send(true);
        });

        Ok(Self {
            config,
            shared,
            closed_rx,
            pid,
        })
    }

    /// Write one command line to the session.
    ///
    /// Hidden commands are logged at debug instead of info. The last-send
    /// timestamp is updated either way.
    pub fn send_command(&self, command: impl Into<Command>, hide_from_log: bool) -> Result<()> {
        self.shared.send(&command.into(), hide_from_log)
    }

    /// `launch_app=<id>`
    pub fn open_app(&self, id: &str, hide_from_log: bool) -> Result<()> {
        self.send_command(Command::launch_app(id), hide_from_log)
    }

    pub fn set_volume(&self, percentage: u8, hide_from_log: bool) -> Result<()> {
        self.send_command(Command::set_volume(percentage), hide_from_log)
    }

    pub fn set_repeat(&self, state: RepeatState, hide_from_log: bool) -> Result<()> {
        self.send_command(Command::set_repeat(state), hide_from_log)
    }

    pub fn set_shuffle(&self, state: ShuffleState, hide_from_log: bool) -> Result<()> {
        self.send_command(Command::set_shuffle(state), hide_from_log)
    }

    pub fn add_output_devices<S: AsRef<str>>(&self, identifiers: &[S], hide_from_log: bool) -> Result<()> {
        self.send_command(Command::add_output_devices(identifiers), hide_from_log)
    }

    pub fn remove_output_devices<S: AsRef<str>>(&self, identifiers: &[S], hide_from_log: bool) -> Result<()> {
        self.send_command(Command::remove_output_devices(identifiers), hide_from_log)
    }

    pub fn set_output_devices<S: AsRef<str>>(&self, identifiers: &[S], hide_from_log: bool) -> Result<()> {
        self.send_command(Command::set_output_devices(identifiers), hide_from_log)
    }

    /// Run the reset gesture in a separate one-shot process.
    ///
    /// Fatal output from that process only kills that process; this session stays up.
    pub fn avada_kedavra(&self) -> Result<()> {
        self.shared.log.info("Avada Kedavra");
        self.spawn_oneshot(avada_kedavra_sequence(self.config.reset_app_count))
    }

    /// Run `command` in its own short-lived `atvremote` process instead of the session
    pub fn send_dedicated(&self, command: impl Into<Command>) -> Result<()> {
        let command = command.into().to_string();
        self.shared.log.info(&format!("{} (dedicated)", command));
        self.spawn_oneshot(command.split_whitespace().map(str::to_string).collect())
    }

    fn spawn_oneshot(&self, tokens: Vec<String>) -> Result<()> {
        let mut child = ProcessManager::new().spawn(self.config.oneshot_process(tokens))?;
        let stdout = child.stdout().ok_or(RemoteError::MissingStream("stdout"))?;
        let stderr = child.stderr().ok_or(RemoteError::MissingStream("stderr"))?;

        let (kill_tx, kill_rx) = mpsc::unbounded_channel();
        let kill = Arc::new(KillSwitch::new(kill_tx));
        let log = self.shared.log.clone();
        let readers = vec![
            tokio::spawn(read_output(stdout, OutputSource::Stdout, log.clone(), kill.clone())),
            tokio::spawn(read_output(
                stderr,
                OutputSource::Stderr(self.config.stderr_policy),
                log,
                kill,
            )),
        ];

        let pid = child.pid();
        tokio::spawn(async move {
            let (reason, status) = supervise(child, kill_rx).await;
            drain(readers).await;
            match status {
                Ok(status) => debug!(pid, ?reason, code = ?status.code(), "One-shot atvremote finished"),
                Err(e) => warn!(pid, error = %e, "Failed to reap one-shot atvremote"),
            }
        });
        Ok(())
    }

    /// Register the close callback, replacing any earlier one.
    ///
    /// Returns `true` when a previous registration was replaced. The callback runs
    /// at most once; registering on an already closed session runs it right away
    /// unless a callback already ran.
    pub fn on_close<F>(&self, callback: F) -> bool
    where
        F: FnOnce(CloseEvent) + Send + 'static,
    {
        let callback: CloseCallback = Box::new(callback);
        self.shared.close.replace(callback)
    }

    /// Register a listener invoked whenever `home` is sent
    pub fn on_home<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.shared.home_listener.lock() = Some(Arc::new(listener));
    }

    /// Resolves once the session has been torn down
    pub async fn closed(&self) {
        let mut rx = self.closed_rx.clone();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Kill the process; the close callback fires with [`CloseReason::Disconnected`]
    pub fn disconnect(&self) {
        if self.shared.kill.trigger(CloseReason::Disconnected) {
            debug!(pid = self.pid, "Disconnect requested");
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn last_command_sent(&self) -> Option<Instant> {
        *self.shared.last_sent.lock()
    }
}

macro_rules! key_shortcuts {
    ($($name:ident => $key:ident),* $(,)?) => {
        impl RemoteSession {
            $(
                #[doc = concat!("Send `", stringify!($name), "`")]
                pub fn $name(&self, hide_from_log: bool) -> Result<()> {
                    self.send_command(RemoteKey::$key, hide_from_log)
                }
            )*
        }
    };
}

key_shortcuts! {
    up => Up,
    down => Down,
    left => Left,
    right => Right,
    select => Select,
    menu => Menu,
    home => Home,
    home_hold => HomeHold,
    top_menu => TopMenu,
    play => Play,
    pause => Pause,
    play_pause => PlayPause,
    next => Next,
    previous => Previous,
    stop => Stop,
    skip_forward => SkipForward,
    skip_backward => SkipBackward,
    turn_on => TurnOn,
    turn_off => TurnOff,
    volume_up => VolumeUp,
    volume_down => VolumeDown,
    channel_up => ChannelUp,
    channel_down => ChannelDown,
    screensaver => Screensaver,
    app_list => AppList,
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        self.shared.kill.trigger(CloseReason::Disconnected);
    }
}

impl std::fmt::Debug for RemoteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSession")
            .field("address", &self.config.address)
            .field("pid", &self.pid)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Wait for the child to exit, killing it on the first kill request
async fn supervise(
    mut child: ManagedChild,
    mut kill_rx: mpsc::UnboundedReceiver<CloseReason>,
) -> (CloseReason, atv_process::Result<ExitStatus>) {
    let mut reason = CloseReason::Exited;
    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            Some(requested) = kill_rx.recv() => {
                reason = requested;
                if let Err(e) = child.start_kill() {
                    warn!(pid = child.pid(), error = %e, "Failed to kill atvremote");
                }
            }
        }
    };
    debug!(pid = child.pid(), ?reason, "atvremote exited");
    (reason, status)
}

async fn drain(readers: Vec<JoinHandle<()>>) {
    for reader in readers {
        let abort = reader.abort_handle();
        if tokio::time::timeout(READER_DRAIN_TIMEOUT, reader).await.is_err() {
            abort.abort();
        }
    }
}

async fn read_output<R>(stream: R, source: OutputSource, log: Arc<dyn Logger>, kill: Arc<KillSwitch>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => match source.classify(&decode_line(&buf)) {
                OutputLine::Empty => {}
                OutputLine::Info(text) => log.debug(&text),
                OutputLine::Connected(text) => {
                    log.debug(&text);
                    log.success("Connected");
                }
                OutputLine::Warning(text) => log.warn(&text),
                OutputLine::Fatal(text) => {
                    log.error(&text);
                    kill.trigger(CloseReason::FatalOutput);
                }
            },
            Err(e) => {
                debug!(stream = source.name(), error = %e, "Stopped reading atvremote output");
                break;
            }
        }
    }
}

/// Decode one raw line, replacing invalid UTF-8 and dropping the line ending
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

async fn write_line(stdin: &mut ChildStdin, line: &str) -> std::io::Result<()> {
    stdin.write_all(line.as_bytes()).await?;
    stdin.flush().await
}

async fn write_commands(
    mut stdin: ChildStdin,
    mut commands: mpsc::UnboundedReceiver<String>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) {
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            next = commands.recv() => match next {
                Some(line) => line,
                None => break,
            },
        };

        if let Err(e) = write_line(&mut stdin, &line).await {
            shared.log.error(&format!("Failed to write command: {}", e));
            shared.kill.trigger(CloseReason::WriteFailed);
            break;
        }
    }
}

async fn run_heartbeat(shared: Arc<Shared>, policy: HeartbeatPolicy, cancel: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + policy.period, policy.period);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let last_sent = *shared.last_sent.lock();
        match policy.check(last_sent, Instant::now()) {
            HeartbeatDecision::Probe => {
                if shared.send(&Command::Key(RemoteKey::AppList), true).is_err() {
                    break;
                }
            }
            HeartbeatDecision::Skip {
                since_last,
                remaining,
            } => shared.log.debug(&format!(
                "Skipping heartbeat since last command was only {}s before ({}s until next probe)",
                since_last.as_secs(),
                remaining.as_secs()
            )),
        }
    }
}
