//! Collision-free identifier generation
//!
//! Repeated runs against the same backend must never reuse an entity
//! name, so generated names combine a millisecond timestamp, the
//! process id, and a process-wide counter. Uniqueness is guaranteed
//! within a process and overwhelmingly likely across processes; there
//! is no determinism guarantee across runs.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generates monotonically distinguished, human-readable names.
#[derive(Debug, Default)]
pub struct NameGenerator {
    counter: AtomicU64,
}

impl NameGenerator {
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Produce the next name for `prefix`. Never exhausts.
    pub fn next_name(&self, prefix: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}-{}-{}", prefix, millis, std::process::id(), seq)
    }
}

static GLOBAL: NameGenerator = NameGenerator::new();

/// Produce a unique name from the shared process-wide generator.
pub fn unique_name(prefix: &str) -> String {
    GLOBAL.next_name(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_carry_the_prefix() {
        let name = unique_name("proj");
        assert!(name.starts_with("proj-"));
    }

    #[test]
    fn ten_thousand_names_are_pairwise_distinct() {
        let generator = NameGenerator::new();
        let names: HashSet<String> = (0..10_000).map(|_| generator.next_name("subj")).collect();
        assert_eq!(names.len(), 10_000);
    }

    #[test]
    fn distinct_across_prefixes_and_threads() {
        let generator = std::sync::Arc::new(NameGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let generator = generator.clone();
            handles.push(std::thread::spawn(move || {
                (0..500).map(|_| generator.next_name("exp")).collect::<Vec<_>>()
            }));
        }
        let mut seen = HashSet::new();
        for handle in handles {
            for name in handle.join().unwrap() {
                assert!(seen.insert(name));
            }
        }
        assert_eq!(seen.len(), 2000);
    }
}
