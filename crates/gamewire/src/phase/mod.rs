// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Game-phase state machine: the legal-transition table, per-phase event
//! denylist, and the observing [`Tracker`].
//!
//! The tracker is an observer, not an enforcer: it follows whatever the
//! input claims, including illegal transitions, because flagging exactly
//! those claims is its purpose. Anomaly detection is heuristic: a hit means
//! "this sequence violates the declared state machine", never "the server
//! provably accepted it". Reports keep that distinction first-class.

pub mod tracker;

pub use tracker::{Statistics, Tracker};

use crate::findings::Severity;
use serde::Serialize;
use std::fmt;

/// Top-level session/round phases, in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Init,
    AuthPending,
    AuthComplete,
    Lobby,
    Day,
    Voting,
    Night,
    End,
    Dead,
}

impl Phase {
    pub const ALL: [Phase; 9] = [
        Phase::Init,
        Phase::AuthPending,
        Phase::AuthComplete,
        Phase::Lobby,
        Phase::Day,
        Phase::Voting,
        Phase::Night,
        Phase::End,
        Phase::Dead,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Init => "INIT",
            Phase::AuthPending => "AUTH_PENDING",
            Phase::AuthComplete => "AUTH_COMPLETE",
            Phase::Lobby => "LOBBY",
            Phase::Day => "DAY",
            Phase::Voting => "VOTING",
            Phase::Night => "NIGHT",
            Phase::End => "END",
            Phase::Dead => "DEAD",
        }
    }

    /// Parse a phase name (case-insensitive). Unknown names are `None`
    /// rather than silently mapping to a default.
    pub fn parse(name: &str) -> Option<Phase> {
        match name.to_ascii_uppercase().as_str() {
            "INIT" => Some(Phase::Init),
            "AUTH_PENDING" => Some(Phase::AuthPending),
            "AUTH_COMPLETE" => Some(Phase::AuthComplete),
            "LOBBY" => Some(Phase::Lobby),
            "DAY" => Some(Phase::Day),
            "VOTING" => Some(Phase::Voting),
            "NIGHT" => Some(Phase::Night),
            "END" => Some(Phase::End),
            "DEAD" => Some(Phase::Dead),
            _ => None,
        }
    }

    /// Phases this phase may legally move to.
    pub fn allowed_successors(self) -> &'static [Phase] {
        match self {
            Phase::Init => &[Phase::AuthPending],
            Phase::AuthPending => &[Phase::AuthComplete, Phase::Init],
            Phase::AuthComplete => &[Phase::Lobby, Phase::Init],
            Phase::Lobby => &[Phase::Day, Phase::Init],
            Phase::Day => &[Phase::Voting, Phase::Dead, Phase::End],
            Phase::Voting => &[Phase::Night, Phase::End],
            Phase::Night => &[Phase::Day, Phase::End, Phase::Dead],
            Phase::End => &[Phase::Lobby, Phase::Init],
            Phase::Dead => &[Phase::Lobby, Phase::Init],
        }
    }

    /// Event labels that must not appear while this phase is active
    /// (movement while frozen, world edits in the lobby, and so on).
    pub fn denied_events(self) -> &'static [&'static str] {
        match self {
            Phase::Init => &["MOVEMENT", "CHAT", "BLOCK_INTERACTION"],
            Phase::AuthPending => &["MOVEMENT", "BLOCK_INTERACTION"],
            Phase::Lobby => &["BLOCK_INTERACTION"],
            Phase::Voting => &["MOVEMENT", "BLOCK_INTERACTION"],
            _ => &[],
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One observed phase change. Immutable once recorded; `is_valid` is stamped
/// at creation from the static table and never revised afterward, even if
/// later analysis reclassifies severity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub event_label: String,
    pub timestamp_ms: u64,
    pub is_valid: bool,
}

/// Heuristic anomaly classes over the transition log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    InvalidTransitionAccepted,
    RapidTransition,
    PhaseLoop,
}

impl AnomalyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyKind::InvalidTransitionAccepted => "INVALID_TRANSITION_ACCEPTED",
            AnomalyKind::RapidTransition => "RAPID_TRANSITION",
            AnomalyKind::PhaseLoop => "PHASE_LOOP",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One anomaly hit. `index` is the position (in append order) of the first
/// transition involved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub index: usize,
    pub description: String,
}
