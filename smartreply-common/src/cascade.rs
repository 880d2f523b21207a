//! Ranked selector cascades.
//!
//! The remote markup is unstable and undocumented, so every structural
//! lookup is expressed as an ordered list of candidate CSS selectors. A
//! cascade is evaluated strictly in order and commits to the first candidate
//! that yields anything; partial matches from different candidates are never
//! merged. When no candidate matches, the lookup is simply "not found";
//! cascades do not self-heal or adapt.
use std::future::Future;

/// An ordered, named list of candidate CSS selectors for one structural
/// lookup (a container, a field, a control).
#[derive(Debug, Clone, Copy)]
pub struct CssCascade {
    name: &'static str,
    candidates: &'static [&'static str],
}

impl CssCascade {
    pub const fn new(name: &'static str, candidates: &'static [&'static str]) -> Self {
        Self { name, candidates }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn candidates(&self) -> &'static [&'static str] {
        self.candidates
    }

    /// Evaluate candidates in order against `probe`, committing to the
    /// first one that returns `Some`. The probe decides what "a match"
    /// means (non-empty element list, parseable text, ...), which keeps
    /// individual strategies testable in isolation.
    pub async fn select<T, F, Fut>(&self, mut probe: F) -> Option<T>
    where
        F: FnMut(&'static str) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        for candidate in self.candidates {
            if let Some(hit) = probe(candidate).await {
                tracing::trace!(
                    target: "cascade",
                    cascade = self.name,
                    selector = candidate,
                    "candidate matched"
                );
                return Some(hit);
            }
        }
        None
    }

    /// Synchronous twin of [`CssCascade::select`], used by the static
    /// snapshot fallback where queries run against parsed HTML.
    pub fn select_sync<T, F>(&self, mut probe: F) -> Option<T>
    where
        F: FnMut(&'static str) -> Option<T>,
    {
        self.candidates.iter().find_map(|c| probe(c))
    }
}
