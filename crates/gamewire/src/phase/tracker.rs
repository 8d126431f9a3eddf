// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transition log and anomaly heuristics.
//!
//! The log is append-only and totally ordered by append, not by timestamp:
//! concurrent event sources must serialize their `record` calls, and two
//! records with out-of-order timestamps are still analyzed in append order.

use super::{Anomaly, AnomalyKind, Phase, Transition};
use crate::findings::Severity;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Two consecutive records closer than this hint at a race window.
pub const RAPID_WINDOW_MS: u64 = 50;

/// Observing phase tracker. Each instance is independently constructed
/// and owns its own log; there is no process-wide state.
#[derive(Debug)]
pub struct Tracker {
    transitions: Vec<Transition>,
    current: Phase,
}

impl Default for Tracker {
    fn default() -> Self {
        Self {
            transitions: Vec::new(),
            current: Phase::Init,
        }
    }
}

/// Aggregate counters over one tracker's log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_transitions: usize,
    pub invalid_transitions: usize,
    pub invalid_percentage: f64,
    /// Arrival counts per phase, in [`Phase::ALL`] order, zero-count
    /// phases omitted.
    pub phase_counts: Vec<(Phase, usize)>,
    pub current_phase: Phase,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The phase the tracker currently believes the session is in: `Init`
    /// until the first record, then the `to` side of the last record, valid
    /// or not.
    pub fn current_phase(&self) -> Phase {
        self.current
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Record an observed transition stamped with wall-clock time.
    pub fn record(&mut self, from: Phase, to: Phase, event_label: &str) -> &Transition {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.record_at(from, to, event_label, timestamp_ms)
    }

    /// Record an observed transition with an explicit timestamp: the entry
    /// point for replaying captured traffic and for deterministic tests.
    ///
    /// Validity is computed once, here, from the static table. The current
    /// phase then follows `to` unconditionally: the tracker observes what
    /// the stream claims, it does not reject it.
    pub fn record_at(
        &mut self,
        from: Phase,
        to: Phase,
        event_label: &str,
        timestamp_ms: u64,
    ) -> &Transition {
        let is_valid = from.allowed_successors().contains(&to);
        if is_valid {
            log::debug!("[phase] {} -> {} via {}", from, to, event_label);
        } else {
            log::warn!("[phase] INVALID transition {} -> {} via {}", from, to, event_label);
        }

        self.transitions.push(Transition {
            from,
            to,
            event_label: event_label.to_string(),
            timestamp_ms,
            is_valid,
        });
        self.current = to;
        &self.transitions[self.transitions.len() - 1]
    }

    /// Whether an event label is permitted while `phase` is active.
    pub fn is_event_allowed(&self, phase: Phase, event_label: &str) -> bool {
        let allowed = !phase.denied_events().contains(&event_label);
        if !allowed {
            log::warn!("[phase] event {} not allowed during {}", event_label, phase);
        }
        allowed
    }

    /// Run the three heuristics over the full log.
    ///
    /// These are indicators of where to probe, not proof that a live server
    /// accepted the sequence; the severity wording preserves that.
    pub fn detect_anomalies(&self) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        // 1. Every invalid transition ever recorded.
        for (index, t) in self.transitions.iter().enumerate() {
            if !t.is_valid {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::InvalidTransitionAccepted,
                    severity: Severity::High,
                    index,
                    description: format!(
                        "state machine violated: {} -> {} via {}",
                        t.from, t.to, t.event_label
                    ),
                });
            }
        }

        // 2. Consecutive records inside the race window. Append order
        // governs; abs_diff tolerates out-of-order timestamps.
        for (index, pair) in self.transitions.windows(2).enumerate() {
            let diff_ms = pair[1].timestamp_ms.abs_diff(pair[0].timestamp_ms);
            if diff_ms < RAPID_WINDOW_MS {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::RapidTransition,
                    severity: Severity::Medium,
                    index,
                    description: format!(
                        "{} -> {} then {} -> {} within {} ms: potential race window",
                        pair[0].from, pair[0].to, pair[1].from, pair[1].to, diff_ms
                    ),
                });
            }
        }

        // 3. Chained consecutive triple returning to its origin phase.
        for (index, triple) in self.transitions.windows(3).enumerate() {
            let chained = triple[1].from == triple[0].to && triple[2].from == triple[1].to;
            if chained && triple[2].to == triple[0].from {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::PhaseLoop,
                    severity: Severity::Medium,
                    index,
                    description: format!(
                        "phase loop {} -> {} -> {} -> {}: possible state confusion",
                        triple[0].from, triple[0].to, triple[1].to, triple[2].to
                    ),
                });
            }
        }

        anomalies
    }

    /// Aggregate counters for one run.
    pub fn statistics(&self) -> Statistics {
        let total = self.transitions.len();
        let invalid = self.transitions.iter().filter(|t| !t.is_valid).count();
        let mut phase_counts = Vec::new();
        for phase in Phase::ALL {
            let count = self.transitions.iter().filter(|t| t.to == phase).count();
            if count > 0 {
                phase_counts.push((phase, count));
            }
        }
        Statistics {
            total_transitions: total,
            invalid_transitions: invalid,
            invalid_percentage: if total > 0 {
                invalid as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            phase_counts,
            current_phase: self.current,
        }
    }

    /// Read-only DOT projection of the log: nodes are phases, edges are
    /// observed transitions, edges ever seen invalid are dashed red.
    /// Renderable with any graphviz-compatible tool.
    pub fn export_dot(&self) -> String {
        let mut out = String::from("digraph phases {\n  rankdir=LR;\n  node [shape=circle];\n\n");

        let mut edges: Vec<(Phase, Phase, &str)> = Vec::new();
        for t in &self.transitions {
            let edge = (t.from, t.to, t.event_label.as_str());
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }

        for (from, to, event) in edges {
            let ever_invalid = self
                .transitions
                .iter()
                .any(|t| t.from == from && t.to == to && t.event_label == event && !t.is_valid);
            let (style, color) = if ever_invalid {
                ("dashed", "red")
            } else {
                ("solid", "black")
            };
            out.push_str(&format!(
                "  {} -> {} [label=\"{}\", style={}, color={}];\n",
                from, to, event, style, color
            ));
        }

        out.push_str("}\n");
        out
    }

    /// Machine-readable dump of the whole run: statistics, the full log and
    /// the anomaly list.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Export<'a> {
            statistics: Statistics,
            transitions: &'a [Transition],
            anomalies: Vec<Anomaly>,
        }
        serde_json::to_string_pretty(&Export {
            statistics: self.statistics(),
            transitions: &self.transitions,
            anomalies: self.detect_anomalies(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replay the normal session flow with comfortably spaced timestamps.
    fn normal_flow(tracker: &mut Tracker) {
        let steps = [
            (Phase::Init, Phase::AuthPending, "AUTH_REQUEST"),
            (Phase::AuthPending, Phase::AuthComplete, "AUTH_RESPONSE"),
            (Phase::AuthComplete, Phase::Lobby, "JOIN_LOBBY"),
            (Phase::Lobby, Phase::Day, "GAME_START"),
            (Phase::Day, Phase::Voting, "PHASE_CHANGE"),
            (Phase::Voting, Phase::Night, "VOTE_COMPLETE"),
            (Phase::Night, Phase::End, "GAME_END"),
        ];
        for (i, (from, to, event)) in steps.iter().enumerate() {
            tracker.record_at(*from, *to, event, 1_000 + i as u64 * 1_000);
        }
    }

    #[test]
    fn test_valid_flow_has_no_invalid_anomalies() {
        let mut tracker = Tracker::new();
        normal_flow(&mut tracker);
        assert_eq!(tracker.current_phase(), Phase::End);
        assert!(tracker.transitions().iter().all(|t| t.is_valid));
        let anomalies = tracker.detect_anomalies();
        assert!(anomalies
            .iter()
            .all(|a| a.kind != AnomalyKind::InvalidTransitionAccepted));
    }

    #[test]
    fn test_invalid_transition_recorded_and_followed() {
        let mut tracker = Tracker::new();
        normal_flow(&mut tracker);
        let t = tracker.record_at(Phase::End, Phase::Day, "INVALID_PACKET", 60_000);
        assert!(!t.is_valid);
        // The tracker follows the claim anyway.
        assert_eq!(tracker.current_phase(), Phase::Day);

        let anomalies = tracker.detect_anomalies();
        let invalid: Vec<_> = anomalies
            .iter()
            .filter(|a| a.kind == AnomalyKind::InvalidTransitionAccepted)
            .collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].severity, Severity::High);
        assert_eq!(invalid[0].index, 7);
    }

    #[test]
    fn test_validity_is_stamped_once() {
        let mut tracker = Tracker::new();
        let first = tracker
            .record_at(Phase::Init, Phase::AuthPending, "AUTH_REQUEST", 100)
            .clone();
        tracker.record_at(Phase::End, Phase::Day, "INVALID", 200);
        // Later records never rewrite earlier ones.
        assert_eq!(tracker.transitions()[0], first);
    }

    #[test]
    fn test_rapid_transition_window() {
        let mut tracker = Tracker::new();
        tracker.record_at(Phase::Day, Phase::Voting, "PHASE_CHANGE", 1_000);
        tracker.record_at(Phase::Voting, Phase::Night, "VOTE_COMPLETE", 1_010);
        let rapid: Vec<_> = tracker
            .detect_anomalies()
            .into_iter()
            .filter(|a| a.kind == AnomalyKind::RapidTransition)
            .collect();
        assert_eq!(rapid.len(), 1);
        assert_eq!(rapid[0].severity, Severity::Medium);

        let mut slow = Tracker::new();
        slow.record_at(Phase::Day, Phase::Voting, "PHASE_CHANGE", 1_000);
        slow.record_at(Phase::Voting, Phase::Night, "VOTE_COMPLETE", 1_200);
        assert!(slow
            .detect_anomalies()
            .iter()
            .all(|a| a.kind != AnomalyKind::RapidTransition));
    }

    #[test]
    fn test_out_of_order_timestamps_use_append_order() {
        let mut tracker = Tracker::new();
        tracker.record_at(Phase::Day, Phase::Voting, "PHASE_CHANGE", 5_000);
        tracker.record_at(Phase::Voting, Phase::Night, "VOTE_COMPLETE", 4_990);
        let rapid = tracker
            .detect_anomalies()
            .into_iter()
            .filter(|a| a.kind == AnomalyKind::RapidTransition)
            .count();
        assert_eq!(rapid, 1);
    }

    #[test]
    fn test_phase_loop_detection() {
        let mut tracker = Tracker::new();
        tracker.record_at(Phase::Day, Phase::Voting, "PHASE_CHANGE", 1_000);
        tracker.record_at(Phase::Voting, Phase::Night, "VOTE_COMPLETE", 2_000);
        tracker.record_at(Phase::Night, Phase::Day, "PHASE_CHANGE", 3_000);
        let loops: Vec<_> = tracker
            .detect_anomalies()
            .into_iter()
            .filter(|a| a.kind == AnomalyKind::PhaseLoop)
            .collect();
        assert_eq!(loops.len(), 1);
        assert!(loops[0].description.contains("DAY -> VOTING -> NIGHT -> DAY"));
    }

    #[test]
    fn test_unchained_triple_is_not_a_loop() {
        let mut tracker = Tracker::new();
        tracker.record_at(Phase::Day, Phase::Voting, "A", 1_000);
        tracker.record_at(Phase::Lobby, Phase::Day, "B", 2_000);
        tracker.record_at(Phase::Day, Phase::Day, "C", 3_000);
        assert!(tracker
            .detect_anomalies()
            .iter()
            .all(|a| a.kind != AnomalyKind::PhaseLoop));
    }

    #[test]
    fn test_event_denylist() {
        let tracker = Tracker::new();
        assert!(!tracker.is_event_allowed(Phase::Voting, "MOVEMENT"));
        assert!(!tracker.is_event_allowed(Phase::Lobby, "BLOCK_INTERACTION"));
        assert!(tracker.is_event_allowed(Phase::Day, "MOVEMENT"));
        assert!(tracker.is_event_allowed(Phase::Voting, "CHAT"));
    }

    #[test]
    fn test_statistics() {
        let mut tracker = Tracker::new();
        assert_eq!(tracker.statistics().total_transitions, 0);
        assert_eq!(tracker.statistics().invalid_percentage, 0.0);

        normal_flow(&mut tracker);
        tracker.record_at(Phase::End, Phase::Day, "INVALID", 60_000);
        let stats = tracker.statistics();
        assert_eq!(stats.total_transitions, 8);
        assert_eq!(stats.invalid_transitions, 1);
        assert_eq!(stats.invalid_percentage, 12.5);
        assert_eq!(stats.current_phase, Phase::Day);
        // Day is arrived at twice: GAME_START and the invalid claim.
        assert!(stats.phase_counts.contains(&(Phase::Day, 2)));
    }

    #[test]
    fn test_dot_export_styles_invalid_edges() {
        let mut tracker = Tracker::new();
        tracker.record_at(Phase::Init, Phase::AuthPending, "AUTH_REQUEST", 1_000);
        tracker.record_at(Phase::End, Phase::Day, "INVALID_PACKET", 2_000);
        let dot = tracker.export_dot();
        assert!(dot.starts_with("digraph phases {"));
        assert!(dot.contains(
            "INIT -> AUTH_PENDING [label=\"AUTH_REQUEST\", style=solid, color=black];"
        ));
        assert!(dot.contains("END -> DAY [label=\"INVALID_PACKET\", style=dashed, color=red];"));
    }

    #[test]
    fn test_json_export_is_well_formed() {
        let mut tracker = Tracker::new();
        normal_flow(&mut tracker);
        let json = tracker.export_json().expect("serialize");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(parsed["statistics"]["total_transitions"], 7);
        assert_eq!(parsed["transitions"][0]["from"], "INIT");
        assert_eq!(parsed["transitions"][0]["to"], "AUTH_PENDING");
    }
}
