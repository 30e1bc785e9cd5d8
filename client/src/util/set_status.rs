//! Readiness label for a channel set.
//!
//! The label is derived from two backend fields only, `channel_count` and
//! `all_parsed`, so list rows and detail views agree even when the channel
//! membership list was not included in the payload.

use std::fmt;

use wire::ChannelsSet;

/// Backend-enforced maximum number of channels in one set.
pub const MAX_CHANNELS_PER_SET: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetStatus {
    /// No channels yet.
    Empty,
    /// Some channels are still being parsed.
    Processing,
    /// Every channel parsed; room for more.
    Ready { count: u32 },
    /// At the channel cap.
    Full { count: u32 },
}

impl SetStatus {
    #[must_use]
    pub fn from_parts(channel_count: u32, all_parsed: bool) -> Self {
        if channel_count == 0 {
            Self::Empty
        } else if channel_count >= MAX_CHANNELS_PER_SET {
            Self::Full { count: channel_count }
        } else if !all_parsed {
            Self::Processing
        } else {
            Self::Ready { count: channel_count }
        }
    }

    #[must_use]
    pub fn of(set: &ChannelsSet) -> Self {
        Self::from_parts(set.channel_count, set.all_parsed)
    }

    /// Analysis needs at least one channel and nothing left to parse.
    ///
    /// A full set may still be parsing; the label hides that, so the caller
    /// checks `all_parsed` separately for `Full`.
    #[must_use]
    pub fn can_analyze(self, all_parsed: bool) -> bool {
        match self {
            Self::Empty | Self::Processing => false,
            Self::Ready { .. } => true,
            Self::Full { .. } => all_parsed,
        }
    }
}

/// Channels that can still be added to `set`.
#[must_use]
pub fn remaining_for(set: &ChannelsSet) -> u32 {
    MAX_CHANNELS_PER_SET.saturating_sub(set.channel_count)
}

impl fmt::Display for SetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty"),
            Self::Processing => f.write_str("processing"),
            Self::Ready { count } => write!(f, "ready ({count}/{MAX_CHANNELS_PER_SET})"),
            Self::Full { count } => write!(f, "full ({count}/{MAX_CHANNELS_PER_SET})"),
        }
    }
}

#[cfg(test)]
#[path = "set_status_test.rs"]
mod tests;
