// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Finding aggregation and report rendering.
//!
//! The codec, mutation engine and phase tracker emit structured records;
//! this module collects them and owns formatting: human-readable text and
//! machine-readable JSON. It never classifies: kind and severity arrive
//! stamped by whoever observed the behavior.

use serde::Serialize;
use std::fmt;

/// Report severity ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vulnerability classes used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FindingKind {
    AuthenticationBypass,
    Idor,
    DenialOfService,
    InformationDisclosure,
    ServerCrash,
    StateCorruption,
    PacketInjection,
    MemoryLeak,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::AuthenticationBypass => "Authentication Bypass",
            FindingKind::Idor => "Insecure Direct Object Reference",
            FindingKind::DenialOfService => "Denial of Service",
            FindingKind::InformationDisclosure => "Information Disclosure",
            FindingKind::ServerCrash => "Server Crash",
            FindingKind::StateCorruption => "State Corruption",
            FindingKind::PacketInjection => "Packet Injection",
            FindingKind::MemoryLeak => "Memory Leak",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded observation, with everything needed to reproduce it.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub reproduction: Vec<String>,
    pub impact: String,
    pub mitigation: String,
    /// Offending packet bytes, lowercase hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packet_hex: Option<String>,
}

impl Finding {
    /// Render this finding as a report section.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(72);
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!("FINDING: {}\n", self.title));
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!("Type: {}\n", self.kind));
        out.push_str(&format!("Severity: {}\n\n", self.severity));
        out.push_str(&format!("{}\n", self.description));
        if !self.reproduction.is_empty() {
            out.push_str("\nReproduction:\n");
            for (i, step) in self.reproduction.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, step));
            }
        }
        if !self.impact.is_empty() {
            out.push_str(&format!("\nImpact: {}\n", self.impact));
        }
        if !self.mitigation.is_empty() {
            out.push_str(&format!("\nMitigation: {}\n", self.mitigation));
        }
        if let Some(hex) = &self.packet_hex {
            out.push_str(&format!("\nPacket (hex): {}\n", hex));
        }
        out
    }
}

/// Append-only collection of findings for one run.
#[derive(Debug, Default)]
pub struct FindingLog {
    findings: Vec<Finding>,
}

impl FindingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, finding: Finding) {
        log::warn!(
            "[findings] {} ({}, {})",
            finding.title,
            finding.kind,
            finding.severity
        );
        self.findings.push(finding);
    }

    /// Fold a phase-tracker anomaly into the log. Anomalies are heuristic
    /// indicators, so the wording stays "potential"; they do not prove a
    /// live server accepted the sequence.
    pub fn record_anomaly(&mut self, anomaly: &crate::phase::Anomaly) {
        self.record(Finding {
            kind: FindingKind::StateCorruption,
            severity: anomaly.severity,
            title: format!("Potential state-machine issue: {}", anomaly.kind),
            description: anomaly.description.clone(),
            reproduction: Vec::new(),
            impact: String::new(),
            mitigation: String::new(),
            packet_hex: None,
        });
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }

    /// Full human-readable report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Total findings: {}\n\n", self.findings.len()));
        for finding in &self.findings {
            out.push_str(&finding.render_text());
            out.push('\n');
        }
        out
    }

    /// Machine-readable report.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.findings)
    }
}
