use serde::{Serialize, Serializer};
use std::fmt;

use super::Pid;
use crate::core::time::{Ticks, to_units};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    Process(Pid),
    Idle,
}

impl Subject {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process(pid) => write!(f, "P{pid}"),
            Self::Idle => write!(f, "Idle"),
        }
    }
}

// Serialized as the pid number, or the string "Idle"
impl Serialize for Subject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Process(pid) => serializer.serialize_u64(*pid),
            Self::Idle => serializer.serialize_str("Idle"),
        }
    }
}

/// One output segment, in the caller's time units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineSegment {
    pub subject: Subject,
    pub start: f64,
    pub end: f64,
}

impl TimelineSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub subject: Subject,
    pub start: Ticks,
    pub end: Ticks,
}

/// Tick-level timeline built by the engine. Adjacent spans for the same
/// subject are merged on push, so consecutive spans always differ.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    spans: Vec<Span>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subject: Subject, start: Ticks, end: Ticks) {
        debug_assert!(start < end, "Empty span for {subject} at {start}");
        if let Some(last) = self.spans.last_mut() {
            debug_assert!(last.end <= start, "Span for {subject} overlaps {}", last.subject);
            if last.subject == subject && last.end == start {
                last.end = end;
                return;
            }
        }
        self.spans.push(Span {
            subject,
            start,
            end,
        });
    }

    pub fn last_subject(&self) -> Option<Subject> {
        self.spans.last().map(|s| s.subject)
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn to_segments(&self) -> Vec<TimelineSegment> {
        self.spans
            .iter()
            .map(|s| TimelineSegment {
                subject: s.subject,
                start: to_units(s.start),
                end: to_units(s.end),
            })
            .collect()
    }
}
