//! Process-wide entity store backing the mock backend
//!
//! The store maps containment scopes to insertion-ordered child
//! entities. All check-then-insert sequences run under one lock, which
//! makes per-scope uniqueness atomic with respect to concurrent
//! creates; creation is infrequent enough that the coarse lock is not
//! a bottleneck.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use tracing::debug;

use neuroarc_common::{EntityRecord, Error, Result, ScopePath};

/// Stateful entity and credential store.
///
/// Seeded with the default `admin`/`admin` principal. Entity names are
/// unique within their parent scope, immutable once created, and never
/// reused for the lifetime of the store; only [`MockStore::reset`]
/// clears them.
pub struct MockStore {
    inner: Mutex<Inner>,
}

struct Inner {
    credentials: HashMap<String, String>,
    /// Children per scope, in insertion order. A scope is present here
    /// once the entity that owns it exists.
    children: HashMap<ScopePath, Vec<EntityRecord>>,
    /// Every name ever created per scope. Never shrinks except on reset.
    reserved: HashMap<ScopePath, HashSet<String>>,
}

impl Inner {
    fn seeded() -> Self {
        let mut credentials = HashMap::new();
        credentials.insert("admin".to_string(), "admin".to_string());
        let mut children = HashMap::new();
        children.insert(ScopePath::root(), Vec::new());
        Self {
            credentials,
            children,
            reserved: HashMap::new(),
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::seeded()),
        }
    }

    /// Drop all entities and restore the seeded credentials.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        *inner = Inner::seeded();
        debug!("mock store reset");
    }

    /// Register an additional accepted credential pair.
    pub fn add_credential(&self, username: &str, password: &str) {
        let mut inner = self.inner.lock();
        inner
            .credentials
            .entry(username.to_string())
            .or_insert_with(|| password.to_string());
    }

    /// Exact-match credential check. Repeated checks have no side
    /// effects; there is no lockout or rate limiting.
    pub fn check_credentials(&self, username: &str, password: &str) -> bool {
        let inner = self.inner.lock();
        inner.credentials.get(username).map(String::as_str) == Some(password)
    }

    /// Whether `scope` denotes an existing entity (or the root).
    pub fn scope_exists(&self, scope: &ScopePath) -> bool {
        self.inner.lock().children.contains_key(scope)
    }

    /// Insert `record` under `scope`. The duplicate check and the
    /// insert happen under one lock.
    pub fn insert(&self, scope: &ScopePath, record: EntityRecord) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.children.contains_key(scope) {
            return Err(Error::not_found(scope));
        }
        let reserved = inner.reserved.entry(scope.clone()).or_default();
        if !reserved.insert(record.name.clone()) {
            return Err(Error::duplicate(scope, record.name));
        }
        let child_scope = child_scope(scope, &record.name);
        debug!(scope = %scope, name = %record.name, "entity created");
        inner
            .children
            .get_mut(scope)
            .ok_or_else(|| Error::Internal(format!("scope vanished: {}", scope)))?
            .push(record);
        // Experiments own no child scope.
        if let Some(child_scope) = child_scope {
            inner.children.entry(child_scope).or_default();
        }
        Ok(())
    }

    /// Children of `scope` in insertion order. Empty when the scope
    /// exists but owns nothing.
    pub fn list_children(&self, scope: &ScopePath) -> Result<Vec<EntityRecord>> {
        let inner = self.inner.lock();
        inner
            .children
            .get(scope)
            .cloned()
            .ok_or_else(|| Error::not_found(scope))
    }

    /// Look up a single child by name.
    pub fn get(&self, scope: &ScopePath, name: &str) -> Result<EntityRecord> {
        let inner = self.inner.lock();
        inner
            .children
            .get(scope)
            .and_then(|records| records.iter().find(|r| r.name == name).cloned())
            .ok_or_else(|| Error::not_found(format!("{}/{}", scope, name)))
    }
}

/// Scope owned by a newly created child, if its kind can have children.
fn child_scope(parent: &ScopePath, name: &str) -> Option<ScopePath> {
    match parent {
        ScopePath::Root => Some(ScopePath::project(name)),
        ScopePath::Project { project } => Some(ScopePath::subject(project.clone(), name)),
        ScopePath::Subject { .. } => None,
    }
}
