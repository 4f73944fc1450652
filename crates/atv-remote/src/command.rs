//! Commands understood by an interactive `atvremote` session

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix of the parameterized app launch command
pub const LAUNCH_APP_PREFIX: &str = "launch_app=";

/// Remote keys with a fixed wire token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteKey {
    Up,
    Down,
    Left,
    Right,
    Select,
    Menu,
    Home,
    HomeHold,
    TopMenu,
    Play,
    Pause,
    PlayPause,
    Next,
    Previous,
    Stop,
    SkipForward,
    SkipBackward,
    TurnOn,
    TurnOff,
    VolumeUp,
    VolumeDown,
    ChannelUp,
    ChannelDown,
    Screensaver,
    /// Lists installed apps; harmless, so it doubles as the heartbeat probe
    AppList,
}

impl RemoteKey {
    /// Every key, in declaration order
    pub const ALL: [RemoteKey; 25] = [
        RemoteKey::Up,
        RemoteKey::Down,
        RemoteKey::Left,
        RemoteKey::Right,
        RemoteKey::Select,
        RemoteKey::Menu,
        RemoteKey::Home,
        RemoteKey::HomeHold,
        RemoteKey::TopMenu,
        RemoteKey::Play,
        RemoteKey::Pause,
        RemoteKey::PlayPause,
        RemoteKey::Next,
        RemoteKey::Previous,
        RemoteKey::Stop,
        RemoteKey::SkipForward,
        RemoteKey::SkipBackward,
        RemoteKey::TurnOn,
        RemoteKey::TurnOff,
        RemoteKey::VolumeUp,
        RemoteKey::VolumeDown,
        RemoteKey::ChannelUp,
        RemoteKey::ChannelDown,
        RemoteKey::Screensaver,
        RemoteKey::AppList,
    ];

    /// Wire token sent to `atvremote`
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteKey::Up => "up",
            RemoteKey::Down => "down",
            RemoteKey::Left => "left",
            RemoteKey::Right => "right",
            RemoteKey::Select => "select",
            RemoteKey::Menu => "menu",
            RemoteKey::Home => "home",
            RemoteKey::HomeHold => "home_hold",
            RemoteKey::TopMenu => "top_menu",
            RemoteKey::Play => "play",
            RemoteKey::Pause => "pause",
            RemoteKey::PlayPause => "play_pause",
            RemoteKey::Next => "next",
            RemoteKey::Previous => "previous",
            RemoteKey::Stop => "stop",
            RemoteKey::SkipForward => "skip_forward",
            RemoteKey::SkipBackward => "skip_backward",
            RemoteKey::TurnOn => "turn_on",
            RemoteKey::TurnOff => "turn_off",
            RemoteKey::VolumeUp => "volume_up",
            RemoteKey::VolumeDown => "volume_down",
            RemoteKey::ChannelUp => "channel_up",
            RemoteKey::ChannelDown => "channel_down",
            RemoteKey::Screensaver => "screensaver",
            RemoteKey::AppList => "app_list",
        }
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoteKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        RemoteKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| format!("unknown remote key: {}", token))
    }
}

/// Repeat mode for `set_repeat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatState {
    Off,
    Track,
    All,
}

impl RepeatState {
    fn code(self) -> u8 {
        match self {
            RepeatState::Off => 0,
            RepeatState::Track => 1,
            RepeatState::All => 2,
        }
    }
}

/// Shuffle mode for `set_shuffle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleState {
    Off,
    Albums,
    Songs,
}

impl ShuffleState {
    fn code(self) -> u8 {
        match self {
            ShuffleState::Off => 0,
            ShuffleState::Albums => 1,
            ShuffleState::Songs => 2,
        }
    }
}

/// A single line written to the `atvremote` prompt
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// A known remote key
    Key(RemoteKey),
    /// Anything else, usually a `name=value` command
    Raw(String),
}

impl Command {
    /// Parse user input: known key tokens become [`Command::Key`], everything else is raw
    pub fn parse(input: &str) -> Self {
        match input.parse::<RemoteKey>() {
            Ok(key) => Command::Key(key),
            Err(_) => Command::Raw(input.trim().to_string()),
        }
    }

    /// `launch_app=<id>`
    pub fn launch_app(id: &str) -> Self {
        Command::Raw(format!("{}{}", LAUNCH_APP_PREFIX, id))
    }

    /// `set_volume=<percentage>`, clamped to 100
    pub fn set_volume(percentage: u8) -> Self {
        Command::Raw(format!("set_volume={}", percentage.min(100)))
    }

    /// `set_repeat=<0|1|2>`
    pub fn set_repeat(state: RepeatState) -> Self {
        Command::Raw(format!("set_repeat={}", state.code()))
    }

    /// `set_shuffle=<0|1|2>`
    pub fn set_shuffle(state: ShuffleState) -> Self {
        Command::Raw(format!("set_shuffle={}", state.code()))
    }

    /// `add_output_devices=<id,id,...>`
    pub fn add_output_devices<S: AsRef<str>>(identifiers: &[S]) -> Self {
        Self::output_devices("add_output_devices", identifiers)
    }

    /// `remove_output_devices=<id,id,...>`
    pub fn remove_output_devices<S: AsRef<str>>(identifiers: &[S]) -> Self {
        Self::output_devices("remove_output_devices", identifiers)
    }

    /// `set_output_devices=<id,id,...>`
    pub fn set_output_devices<S: AsRef<str>>(identifiers: &[S]) -> Self {
        Self::output_devices("set_output_devices", identifiers)
    }

    fn output_devices<S: AsRef<str>>(name: &str, identifiers: &[S]) -> Self {
        let joined = identifiers
            .iter()
            .map(|id| id.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        Command::Raw(format!("{}={}", name, joined))
    }

    /// Whether this is the given key
    pub fn is_key(&self, key: RemoteKey) -> bool {
        matches!(self, Command::Key(k) if *k == key)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Key(key) => f.write_str(key.as_str()),
            Command::Raw(raw) => f.write_str(raw),
        }
    }
}

impl From<RemoteKey> for Command {
    fn from(key: RemoteKey) -> Self {
        Command::Key(key)
    }
}
