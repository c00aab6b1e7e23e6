//! Reconciler: change records to file mutations
//!
//! Files are matched by name. A file that already exists is updated even
//! when the model said "create", and a missing file is created even when it
//! said "update", so replaying the same change list converges instead of
//! duplicating files.
//!
//! Mutations run one at a time and are not rolled back. When a sink call
//! fails the report carries what was applied so far; replaying the list is
//! safe because of the name matching above.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

use crate::language::language_for;
use crate::types::{ChangeAction, ChangeRecord, File, NewFile};
use crate::{Result, WorkspaceError};

/// Destination for reconciled mutations
#[async_trait]
pub trait FileSink: Send + Sync {
    async fn create_file(&self, file: NewFile) -> Result<File>;

    /// `None` when the id is unknown
    async fn update_file(&self, id: &str, content: &str) -> Result<Option<File>>;

    /// `false` when the id is unknown
    async fn delete_file(&self, id: &str) -> Result<bool>;
}

/// File a mutation applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Target {
    /// A file present in the snapshot
    Existing(String),
    /// A file created earlier in the same plan, keyed by name
    Pending(String),
}

/// One store operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    Create {
        name: String,
        path: String,
        content: String,
        language: String,
    },
    Update {
        target: Target,
        file_name: String,
        content: String,
    },
    Delete {
        target: Target,
        file_name: String,
    },
}

impl Mutation {
    pub fn file_name(&self) -> &str {
        match self {
            Mutation::Create { name, .. } => name,
            Mutation::Update { file_name, .. } | Mutation::Delete { file_name, .. } => file_name,
        }
    }
}

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    Created { file: File },
    Updated { file: File },
    Deleted { id: String, file_name: String },
    /// The sink no longer had the file; nothing to delete
    AlreadyGone { id: String, file_name: String },
}

/// Failure that stopped a reconciliation run
#[derive(Debug)]
pub struct ReconcileFailure {
    /// Position in the mutation plan
    pub index: usize,
    pub file_name: String,
    pub error: WorkspaceError,
}

/// Result of applying a change list
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub outcomes: Vec<MutationOutcome>,
    pub failure: Option<ReconcileFailure>,
    /// Mutations never attempted because of the failure
    pub skipped: usize,
}

impl ReconcileReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    pub fn applied(&self) -> usize {
        self.outcomes.len()
    }
}

/// Translates change records into sink mutations
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    project_id: String,
}

impl Reconciler {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Decide the mutations for `changes` against the snapshot `current`
    ///
    /// Pure: nothing is written. Files created by an earlier change in the
    /// list are visible to later ones, so a list never creates the same name
    /// twice.
    pub fn plan(changes: &[ChangeRecord], current: &[File]) -> Vec<Mutation> {
        let mut view: Vec<(String, Target)> = current
            .iter()
            .map(|f| (f.name.clone(), Target::Existing(f.id.clone())))
            .collect();
        let mut mutations = Vec::with_capacity(changes.len());

        for change in changes {
            if change.action == ChangeAction::Delete {
                let position = match &change.file_id {
                    Some(id) => view
                        .iter()
                        .position(|(_, t)| matches!(t, Target::Existing(existing) if existing == id)),
                    None => view.iter().position(|(name, _)| name == &change.file_name),
                };
                if let Some(position) = position {
                    let (file_name, target) = view.remove(position);
                    mutations.push(Mutation::Delete { target, file_name });
                }
                continue;
            }

            match view.iter().find(|(name, _)| name == &change.file_name) {
                Some((file_name, target)) => mutations.push(Mutation::Update {
                    target: target.clone(),
                    file_name: file_name.clone(),
                    content: change.new_content.clone(),
                }),
                None => {
                    mutations.push(Mutation::Create {
                        name: change.file_name.clone(),
                        path: format!("/{}", change.file_name),
                        content: change.new_content.clone(),
                        language: language_for(&change.file_name).to_string(),
                    });
                    view.push((
                        change.file_name.clone(),
                        Target::Pending(change.file_name.clone()),
                    ));
                }
            }
        }

        mutations
    }

    /// Plan and execute `changes` against `sink`, stopping at the first failure
    pub async fn apply<S>(&self, sink: &S, changes: &[ChangeRecord], current: &[File]) -> ReconcileReport
    where
        S: FileSink + ?Sized,
    {
        let plan = Self::plan(changes, current);
        let total = plan.len();
        let mut created: HashMap<String, String> = HashMap::new();
        let mut report = ReconcileReport::default();

        for (index, mutation) in plan.into_iter().enumerate() {
            let file_name = mutation.file_name().to_string();
            match self.execute(sink, mutation, &mut created).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(error) => {
                    tracing::warn!("Reconcile stopped at {} ({}): {}", index, file_name, error);
                    report.failure = Some(ReconcileFailure {
                        index,
                        file_name,
                        error,
                    });
                    report.skipped = total - index - 1;
                    break;
                }
            }
        }

        tracing::info!(
            "Reconciled {} of {} mutations for project {}",
            report.applied(),
            total,
            self.project_id
        );
        report
    }

    async fn execute<S>(
        &self,
        sink: &S,
        mutation: Mutation,
        created: &mut HashMap<String, String>,
    ) -> Result<MutationOutcome>
    where
        S: FileSink + ?Sized,
    {
        match mutation {
            Mutation::Create {
                name,
                path,
                content,
                language,
            } => {
                let record = NewFile {
                    project_id: self.project_id.clone(),
                    name: name.clone(),
                    path,
                    content,
                    language,
                };
                let file = sink.create_file(record).await?;
                created.insert(name, file.id.clone());
                Ok(MutationOutcome::Created { file })
            }
            Mutation::Update {
                target,
                file_name,
                content,
            } => {
                let id = resolve(&target, created)?;
                match sink.update_file(&id, &content).await? {
                    Some(file) => Ok(MutationOutcome::Updated { file }),
                    None => Err(WorkspaceError::FileNotFound(format!("{} ({})", file_name, id))),
                }
            }
            Mutation::Delete { target, file_name } => {
                let id = resolve(&target, created)?;
                if sink.delete_file(&id).await? {
                    created.retain(|_, created_id| created_id != &id);
                    Ok(MutationOutcome::Deleted { id, file_name })
                } else {
                    Ok(MutationOutcome::AlreadyGone { id, file_name })
                }
            }
        }
    }
}

fn resolve(target: &Target, created: &HashMap<String, String>) -> Result<String> {
    match target {
        Target::Existing(id) => Ok(id.clone()),
        Target::Pending(name) => created
            .get(name)
            .cloned()
            .ok_or_else(|| WorkspaceError::FileNotFound(name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStore;
    use parking_lot::Mutex;

    fn file(id: &str, name: &str) -> File {
        File {
            id: id.to_string(),
            project_id: "p".to_string(),
            name: name.to_string(),
            path: format!("/{}", name),
            content: String::new(),
            language: language_for(name).to_string(),
        }
    }

    #[test]
    fn test_plan_create_on_existing_name_updates() {
        let current = vec![file("1", "style.css")];
        let plan = Reconciler::plan(&[ChangeRecord::create("style.css", "a{}")], &current);

        assert_eq!(
            plan,
            vec![Mutation::Update {
                target: Target::Existing("1".to_string()),
                file_name: "style.css".to_string(),
                content: "a{}".to_string(),
            }]
        );
    }

    #[test]
    fn test_plan_update_on_missing_name_creates() {
        let plan = Reconciler::plan(&[ChangeRecord::update("a.ts", "let x = 1")], &[]);
        assert_eq!(
            plan,
            vec![Mutation::Create {
                name: "a.ts".to_string(),
                path: "/a.ts".to_string(),
                content: "let x = 1".to_string(),
                language: "typescript".to_string(),
            }]
        );
    }

    #[test]
    fn test_plan_delete_missing_is_noop() {
        let current = vec![file("1", "index.html")];
        assert!(Reconciler::plan(&[ChangeRecord::delete("gone.js")], &current).is_empty());
    }

    #[test]
    fn test_plan_delete_by_id_has_no_name_fallback() {
        let current = vec![file("1", "index.html")];
        let changes = [ChangeRecord::delete("index.html").with_file_id("other")];
        assert!(Reconciler::plan(&changes, &current).is_empty());

        let changes = [ChangeRecord::delete("whatever").with_file_id("1")];
        assert_eq!(
            Reconciler::plan(&changes, &current),
            vec![Mutation::Delete {
                target: Target::Existing("1".to_string()),
                file_name: "index.html".to_string(),
            }]
        );
    }

    #[test]
    fn test_plan_repeated_create_in_one_list() {
        let changes = [
            ChangeRecord::create("a.js", "1"),
            ChangeRecord::create("a.js", "2"),
        ];
        let plan = Reconciler::plan(&changes, &[]);

        assert_eq!(plan.len(), 2);
        assert!(matches!(plan[0], Mutation::Create { .. }));
        assert_eq!(
            plan[1],
            Mutation::Update {
                target: Target::Pending("a.js".to_string()),
                file_name: "a.js".to_string(),
                content: "2".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_apply_resolves_pending_targets() {
        let store = FileStore::new();
        let reconciler = Reconciler::new("p");
        let changes = [
            ChangeRecord::create("a.js", "1"),
            ChangeRecord::update("a.js", "2"),
        ];

        let report = reconciler.apply(&store, &changes, &[]).await;
        assert!(report.is_complete());
        assert_eq!(report.applied(), 2);

        let files = store.list("p");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "2");
    }

    /// Sink whose creates fail once `budget` runs out
    struct FlakySink {
        inner: FileStore,
        budget: Mutex<usize>,
    }

    #[async_trait]
    impl FileSink for FlakySink {
        async fn create_file(&self, file: NewFile) -> Result<File> {
            let mut budget = self.budget.lock();
            if *budget == 0 {
                return Err(WorkspaceError::Remote {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            *budget -= 1;
            Ok(self.inner.create(file))
        }

        async fn update_file(&self, id: &str, content: &str) -> Result<Option<File>> {
            Ok(self.inner.update(id, content))
        }

        async fn delete_file(&self, id: &str) -> Result<bool> {
            Ok(self.inner.delete(id))
        }
    }

    #[tokio::test]
    async fn test_partial_failure_then_replay() {
        let sink = FlakySink {
            inner: FileStore::new(),
            budget: Mutex::new(1),
        };
        let reconciler = Reconciler::new("p");
        let changes = [
            ChangeRecord::create("index.html", "<p>"),
            ChangeRecord::create("style.css", "p{}"),
            ChangeRecord::create("script.js", "go()"),
        ];

        let report = reconciler.apply(&sink, &changes, &[]).await;
        assert!(!report.is_complete());
        assert_eq!(report.applied(), 1);
        assert_eq!(report.skipped, 1);
        let failure = report.failure.unwrap();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.file_name, "style.css");

        *sink.budget.lock() = 10;
        let current = sink.inner.list("p");
        let report = reconciler.apply(&sink, &changes, &current).await;
        assert!(report.is_complete());
        assert!(matches!(report.outcomes[0], MutationOutcome::Updated { .. }));
        assert_eq!(sink.inner.list("p").len(), 3);
    }

    #[tokio::test]
    async fn test_update_of_vanished_file_fails() {
        let store = FileStore::new();
        let current = vec![file("ghost", "index.html")];
        let report = Reconciler::new("p")
            .apply(&store, &[ChangeRecord::update("index.html", "x")], &current)
            .await;

        assert!(matches!(
            report.failure,
            Some(ReconcileFailure {
                error: WorkspaceError::FileNotFound(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_delete_of_vanished_file_is_noop() {
        let store = FileStore::new();
        let current = vec![file("ghost", "index.html")];
        let report = Reconciler::new("p")
            .apply(&store, &[ChangeRecord::delete("index.html")], &current)
            .await;

        assert!(report.is_complete());
        assert!(matches!(report.outcomes[0], MutationOutcome::AlreadyGone { .. }));
    }
}
