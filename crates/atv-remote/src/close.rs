//! Single-slot close notification
//!
//! A session has one close callback. Registering again replaces the previous one,
//! and the callback runs at most once per session.

use parking_lot::Mutex;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The process exited by itself
    Exited,
    /// Output classified as fatal made the supervisor kill the process
    FatalOutput,
    /// Writing a command to stdin failed
    WriteFailed,
    /// The owner disconnected or dropped the session
    Disconnected,
}

/// Delivered to the close callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseEvent {
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub reason: CloseReason,
}

/// Close callback
pub type CloseCallback = Box<dyn FnOnce(CloseEvent) + Send + 'static>;

enum SlotState {
    Open(Option<CloseCallback>),
    Closed { event: CloseEvent, fired: bool },
}

/// Holds the close callback for one session
pub(crate) struct CloseSlot {
    state: Mutex<SlotState>,
}

impl CloseSlot {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Open(None)),
        }
    }

    /// Register `callback`, returning whether an earlier registration was replaced.
    ///
    /// On a closed session the callback runs immediately if nothing has fired yet,
    /// otherwise it is dropped.
    pub(crate) fn replace(&self, callback: CloseCallback) -> bool {
        let mut state = self.state.lock();
        match &mut *state {
            SlotState::Open(slot) => slot.replace(callback).is_some(),
            SlotState::Closed { event, fired } => {
                if !*fired {
                    *fired = true;
                    let event = *event;
                    drop(state);
                    callback(event);
                }
                false
            }
        }
    }

    /// Mark the session closed and run the registered callback, if any.
    ///
    /// Only the first call has an effect.
    pub(crate) fn fire(&self, event: CloseEvent) {
        let mut state = self.state.lock();
        let callback = match &mut *state {
            SlotState::Open(slot) => slot.take(),
            SlotState::Closed { .. } => return,
        };
        *state = SlotState::Closed {
            event,
            fired: callback.is_some(),
        };
        drop(state);

        if let Some(callback) = callback {
            callback(event);
        }
    }
}
