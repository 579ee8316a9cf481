//! Matching conditions
//!
//! A [`Matcher`] is the predicate half of every lookup: it decides whether an
//! entry belongs to a query for a given integer value (a pid, a CPU, ...).
//! Matchers are compared by [`MatcherKey`], never by function address, so a
//! registry can keep exactly one collection per `(key, value)`.

use crate::data::{Entry, VisMask};
use std::fmt;

/// Predicate signature for user-defined matchers
pub type MatchFn = fn(&Entry, i32) -> bool;

/// User-defined matcher, identified by name
#[derive(Clone, Copy)]
pub struct CustomMatcher {
    pub name: &'static str,
    pub func: MatchFn,
}

impl fmt::Debug for CustomMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomMatcher")
            .field("name", &self.name)
            .finish()
    }
}

/// Entry predicate
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Entry belongs to task `value`
    Pid,
    /// Entry was recorded on CPU `value`
    Cpu,
    /// Entry was recorded on CPU `value` and is visible in the graph
    CpuVisible,
    /// Entry is of event kind `value`
    Event,
    /// Entry comes from stream `value`
    Stream,
    /// Named user predicate
    Custom(CustomMatcher),
}

/// Identity of a matcher, used as registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherKey {
    Pid,
    Cpu,
    CpuVisible,
    Event,
    Stream,
    Custom(&'static str),
}

impl Matcher {
    /// Create a named user predicate
    pub fn custom(name: &'static str, func: MatchFn) -> Self {
        Matcher::Custom(CustomMatcher { name, func })
    }

    /// Evaluate the predicate
    #[inline]
    pub fn matches(&self, entry: &Entry, value: i32) -> bool {
        match self {
            Matcher::Pid => entry.pid == value,
            Matcher::Cpu => entry.cpu == value,
            Matcher::CpuVisible => entry.cpu == value && entry.is_visible(VisMask::GRAPH_VIEW),
            Matcher::Event => entry.event_id == value,
            Matcher::Stream => i32::from(entry.stream_id) == value,
            Matcher::Custom(custom) => (custom.func)(entry, value),
        }
    }

    /// Registry identity of this matcher
    pub fn key(&self) -> MatcherKey {
        match self {
            Matcher::Pid => MatcherKey::Pid,
            Matcher::Cpu => MatcherKey::Cpu,
            Matcher::CpuVisible => MatcherKey::CpuVisible,
            Matcher::Event => MatcherKey::Event,
            Matcher::Stream => MatcherKey::Stream,
            Matcher::Custom(custom) => MatcherKey::Custom(custom.name),
        }
    }
}

impl fmt::Display for MatcherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatcherKey::Pid => write!(f, "pid"),
            MatcherKey::Cpu => write!(f, "cpu"),
            MatcherKey::CpuVisible => write!(f, "cpu-visible"),
            MatcherKey::Event => write!(f, "event"),
            MatcherKey::Stream => write!(f, "stream"),
            MatcherKey::Custom(name) => write!(f, "custom:{}", name),
        }
    }
}
