//! Core entity types shared by the mock backend and the page objects

use serde::{Deserialize, Serialize};

/// Kinds of entities managed by the archive UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Subject,
    Experiment,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Project => write!(f, "project"),
            EntityKind::Subject => write!(f, "subject"),
            EntityKind::Experiment => write!(f, "experiment"),
        }
    }
}

/// Parent-child containment path used for uniqueness checks.
///
/// Projects live at the root scope, subjects under a project, and
/// experiments under a subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ScopePath {
    Root,
    Project { project: String },
    Subject { project: String, subject: String },
}

impl ScopePath {
    pub fn root() -> Self {
        ScopePath::Root
    }

    pub fn project(project: impl Into<String>) -> Self {
        ScopePath::Project {
            project: project.into(),
        }
    }

    pub fn subject(project: impl Into<String>, subject: impl Into<String>) -> Self {
        ScopePath::Subject {
            project: project.into(),
            subject: subject.into(),
        }
    }

    /// The scope one level up, if any.
    pub fn parent(&self) -> Option<ScopePath> {
        match self {
            ScopePath::Root => None,
            ScopePath::Project { .. } => Some(ScopePath::Root),
            ScopePath::Subject { project, .. } => Some(ScopePath::project(project.clone())),
        }
    }

    /// Kind of entity created directly under this scope.
    pub fn child_kind(&self) -> EntityKind {
        match self {
            ScopePath::Root => EntityKind::Project,
            ScopePath::Project { .. } => EntityKind::Subject,
            ScopePath::Subject { .. } => EntityKind::Experiment,
        }
    }
}

impl std::fmt::Display for ScopePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopePath::Root => write!(f, "/"),
            ScopePath::Project { project } => write!(f, "project/{}", project),
            ScopePath::Subject { project, subject } => {
                write!(f, "project/{}/subject/{}", project, subject)
            }
        }
    }
}

/// A project as entered through the archive UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            aliases: Vec::new(),
            keywords: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

/// A subject (study participant) within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub label: String,
    #[serde(default)]
    pub species: Option<String>,
}

impl Subject {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            species: None,
        }
    }

    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }
}

/// An imaging session (experiment) registered for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    pub label: String,
    #[serde(default)]
    pub modality: Option<String>,
}

impl Experiment {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            modality: None,
        }
    }

    pub fn with_modality(mut self, modality: impl Into<String>) -> Self {
        self.modality = Some(modality.into());
        self
    }
}

/// A stored entity as returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub kind: EntityKind,
    /// Unique name within the parent scope (project id, subject label,
    /// or experiment label). Immutable once created.
    pub name: String,
    /// Additional displayed columns (display name, description,
    /// species, modality) in UI order.
    #[serde(default)]
    pub extra: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub created_by: String,
}

impl EntityRecord {
    /// Row text as rendered in the archive listing tables.
    pub fn row_text(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.extra.iter().map(String::as_str))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_paths_nest_and_display() {
        let root = ScopePath::root();
        let proj = ScopePath::project("p1");
        let subj = ScopePath::subject("p1", "s1");

        assert_eq!(root.child_kind(), EntityKind::Project);
        assert_eq!(proj.child_kind(), EntityKind::Subject);
        assert_eq!(subj.child_kind(), EntityKind::Experiment);

        assert_eq!(subj.parent(), Some(proj.clone()));
        assert_eq!(proj.parent(), Some(root.clone()));
        assert_eq!(root.parent(), None);

        assert_eq!(subj.to_string(), "project/p1/subject/s1");
    }

    #[test]
    fn same_name_under_different_parents_hashes_apart() {
        let a = ScopePath::subject("p1", "s1");
        let b = ScopePath::subject("p2", "s1");
        assert_ne!(a, b);
    }

    #[test]
    fn row_text_skips_empty_columns() {
        let record = EntityRecord {
            kind: EntityKind::Project,
            name: "AUTO1".to_string(),
            extra: vec!["Automated Project".to_string(), String::new()],
            created_at: chrono::Utc::now(),
            created_by: "admin".to_string(),
        };
        assert_eq!(record.row_text(), "AUTO1 | Automated Project");
    }
}
