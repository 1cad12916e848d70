// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-fatal diagnostics
//!
//! Operations that can partially ignore their input (a hard point outside
//! [0, 1], a sparse element map naming a panel that does not exist) succeed
//! and describe what they skipped in a [`Report`]. Every diagnostic is also
//! forwarded to the `log` facade at warn level when it is recorded.

use afmesh_model::WebId;
use std::fmt;

/// A single non-fatal event
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Hard point rejected because `t` is not a finite value in [0, 1]
    HardPointOutOfRange { t: f64 },
    /// Hard point rejected because it coincides with an existing one
    DuplicateHardPoint { t: f64, existing: String },
    /// Sparse element counts named a panel past the last one
    UnknownPanel { panel: usize, panel_count: usize },
    /// Explicit distribution value dropped because it is outside [0, 1]
    DistributionValueDropped { t: f64 },
    /// Total-point allocation rounded a panel to zero segments; one was used
    CoarsePanel { panel: usize, length: f64 },
    /// Element length larger than the profile; only hard points remain
    ElementLengthExceedsProfile { element_length: f64, arc_length: f64 },
    /// Closest approach of a line web does not touch the profile
    LineMissesProfile { web: WebId, t: f64, distance: f64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::HardPointOutOfRange { t } => {
                write!(f, "hard point t={} is outside [0, 1], ignored", t)
            }
            Diagnostic::DuplicateHardPoint { t, existing } => {
                write!(f, "hard point t={} duplicates `{}`, ignored", t, existing)
            }
            Diagnostic::UnknownPanel { panel, panel_count } => write!(
                f,
                "element count for panel {} ignored, profile has {} panels",
                panel, panel_count
            ),
            Diagnostic::DistributionValueDropped { t } => {
                write!(f, "distribution value t={} is outside [0, 1], dropped", t)
            }
            Diagnostic::CoarsePanel { panel, length } => write!(
                f,
                "panel {} (length {:.3e}) rounded to zero segments, using one",
                panel, length
            ),
            Diagnostic::ElementLengthExceedsProfile {
                element_length,
                arc_length,
            } => write!(
                f,
                "element length {} exceeds profile arc length {}",
                element_length, arc_length
            ),
            Diagnostic::LineMissesProfile { web, t, distance } => write!(
                f,
                "line {} passes {:.3e} from the profile at t={:.6}",
                web, distance, t
            ),
        }
    }
}

/// Diagnostics collected by one operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and emit it as a warning
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Append another report
    pub fn extend(&mut self, other: Report) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Check if nothing was reported
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of diagnostics
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if the report is empty
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Iterate over the diagnostics
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_collects() {
        let mut report = Report::new();
        assert!(report.is_clean());

        report.push(Diagnostic::HardPointOutOfRange { t: 1.5 });
        let mut other = Report::new();
        other.push(Diagnostic::UnknownPanel {
            panel: 4,
            panel_count: 2,
        });
        report.extend(other);

        assert_eq!(report.len(), 2);
        assert!(!report.is_clean());
        assert!(report.iter().any(|d| matches!(d, Diagnostic::UnknownPanel { panel: 4, .. })));
    }

    #[test]
    fn test_display_mentions_value() {
        let text = Diagnostic::DuplicateHardPoint {
            t: 0.5,
            existing: "hp_2".into(),
        }
        .to_string();
        assert!(text.contains("0.5"));
        assert!(text.contains("hp_2"));
    }
}
