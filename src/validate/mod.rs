//! Descriptive validation. Nothing here mutates the document or returns an
//! error: every finding is an [`Issue`] in a [`ValidationReport`], and the
//! caller decides whether to block on it.

mod routes;
mod schedules;

pub use routes::{validate_route_structure, validate_routes};
pub use schedules::validate_schedules;

use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks submission.
    Error,
    /// Shown to the user, submission may continue.
    Warning,
}

/// What part of the document an issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Target {
    Workspace,
    RouteGroup,
    Route(usize),
    Schedule(usize),
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Workspace => f.write_str("workspace"),
            Target::RouteGroup => f.write_str("route group"),
            Target::Route(i) => write!(f, "route #{}", i + 1),
            Target::Schedule(i) => write!(f, "schedule #{}", i + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub target: Target,
    /// Path of the field within the target, e.g. `stops[2].arrival_time`.
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.target, self.field, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Issues whose field path starts with `prefix` on the given target.
    pub fn issues_for<'a>(
        &'a self,
        target: Target,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.target == target && issue.field.starts_with(prefix))
    }

    pub(crate) fn error(&mut self, target: Target, field: impl Into<String>, message: String) {
        self.push(target, field.into(), message, Severity::Error);
    }

    pub(crate) fn warning(&mut self, target: Target, field: impl Into<String>, message: String) {
        self.push(target, field.into(), message, Severity::Warning);
    }

    fn push(&mut self, target: Target, field: String, message: String, severity: Severity) {
        self.issues.push(Issue {
            target,
            field,
            message,
            severity,
        });
    }

    pub(crate) fn extend(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }
}
