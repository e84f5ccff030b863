//! Fetch state shared by every screen.
//!
//! `Idle -> Loading -> Ready | Failed`. The last good value survives a reload
//! and a failed reload, so a screen never goes blank because a refresh broke.

use crate::error::ScreenError;

/// Identifies one fetch. Completions carrying an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteState<T> {
    Idle,
    Loading { previous: Option<T> },
    Ready(T),
    Failed { error: ScreenError, previous: Option<T> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Remote<T> {
    state: RemoteState<T>,
    issued: u64,
}

impl<T> Default for Remote<T> {
    fn default() -> Self {
        Self {
            state: RemoteState::Idle,
            issued: 0,
        }
    }
}

impl<T> Remote<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RemoteState<T> {
        &self.state
    }

    fn take_data(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, RemoteState::Idle) {
            RemoteState::Idle => None,
            RemoteState::Loading { previous } => previous,
            RemoteState::Ready(data) => Some(data),
            RemoteState::Failed { previous, .. } => previous,
        }
    }

    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        let previous = self.take_data();
        self.state = RemoteState::Loading { previous };
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    pub fn resolve(&mut self, ticket: Ticket, data: T) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = RemoteState::Ready(data);
        true
    }

    pub fn fail(&mut self, ticket: Ticket, error: ScreenError) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let previous = self.take_data();
        self.state = RemoteState::Failed { error, previous };
        true
    }

    /// Last successfully fetched value, whatever the current phase.
    pub fn data(&self) -> Option<&T> {
        match &self.state {
            RemoteState::Idle => None,
            RemoteState::Loading { previous } => previous.as_ref(),
            RemoteState::Ready(data) => Some(data),
            RemoteState::Failed { previous, .. } => previous.as_ref(),
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            RemoteState::Idle => None,
            RemoteState::Loading { previous } => previous.as_mut(),
            RemoteState::Ready(data) => Some(data),
            RemoteState::Failed { previous, .. } => previous.as_mut(),
        }
    }

    pub fn error(&self) -> Option<&ScreenError> {
        match &self.state {
            RemoteState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RemoteState::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, RemoteState::Ready(_))
    }

    /// True only before the first fetch has produced anything to show.
    pub fn is_initial_load(&self) -> bool {
        matches!(self.state, RemoteState::Loading { previous: None })
    }
}

impl<T> Remote<Vec<T>> {
    /// A successful fetch that returned no rows.
    pub fn is_empty_result(&self) -> bool {
        matches!(&self.state, RemoteState::Ready(rows) if rows.is_empty())
    }
}
