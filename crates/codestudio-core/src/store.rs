//! In-memory File Store
//!
//! One store per deployment, shared through `Arc` handles. Nothing is
//! persisted: a restart re-seeds the default project and its welcome files.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::reconciler::FileSink;
use crate::types::{File, NewFile, Project, DEFAULT_PROJECT_ID};
use crate::Result;

const WELCOME_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Welcome to CodeStudio</title>
</head>
<body>
  <div class="container">
    <h1>Welcome to CodeStudio!</h1>
    <p>Start coding or ask the AI assistant for help.</p>
    <button id="testBtn">Click me!</button>
  </div>
</body>
</html>"#;

const WELCOME_CSS: &str = r#"* {
  margin: 0;
  padding: 0;
  box-sizing: border-box;
}

body {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
  min-height: 100vh;
  display: flex;
  align-items: center;
  justify-content: center;
  color: #fff;
}

.container {
  text-align: center;
  background: rgba(255, 255, 255, 0.1);
  padding: 3rem;
  border-radius: 20px;
}

button {
  background: #fff;
  color: #667eea;
  border: none;
  padding: 1rem 2rem;
  border-radius: 50px;
  cursor: pointer;
}"#;

const WELCOME_JS: &str = r#"document.addEventListener('DOMContentLoaded', function() {
  const button = document.getElementById('testBtn');

  button.addEventListener('click', function() {
    alert('Hello from CodeStudio! Try asking the AI to modify this code!');
  });

  console.log('CodeStudio initialized successfully!');
});"#;

/// Files keyed by id, with insertion order kept for stable listings
#[derive(Default)]
struct FileTable {
    by_id: HashMap<String, File>,
    order: Vec<String>,
}

/// Process-local project and file store
#[derive(Default)]
pub struct FileStore {
    projects: RwLock<HashMap<String, Project>>,
    files: RwLock<FileTable>,
}

impl FileStore {
    /// Empty store, no projects
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the default project and the three welcome files
    pub fn seeded() -> Self {
        let store = Self::new();
        store.projects.write().insert(
            DEFAULT_PROJECT_ID.to_string(),
            Project {
                id: DEFAULT_PROJECT_ID.to_string(),
                name: "My Project".to_string(),
                description: Some("Default project".to_string()),
            },
        );

        for (name, content, language) in [
            ("index.html", WELCOME_HTML, "html"),
            ("style.css", WELCOME_CSS, "css"),
            ("script.js", WELCOME_JS, "javascript"),
        ] {
            store.create(
                NewFile::new(DEFAULT_PROJECT_ID, name)
                    .with_content(content)
                    .with_language(language),
            );
        }

        tracing::debug!("Seeded default project with {} files", store.file_count());
        store
    }

    pub fn get_project(&self, id: &str) -> Option<Project> {
        self.projects.read().get(id).cloned()
    }

    pub fn create_project(&self, name: impl Into<String>, description: Option<String>) -> Project {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description,
        };
        self.projects
            .write()
            .insert(project.id.clone(), project.clone());
        tracing::info!("Project created: {}", project.id);
        project
    }

    pub fn project_count(&self) -> usize {
        self.projects.read().len()
    }

    pub fn get_file(&self, id: &str) -> Option<File> {
        self.files.read().by_id.get(id).cloned()
    }

    /// Files of a project, oldest first
    pub fn list(&self, project_id: &str) -> Vec<File> {
        let table = self.files.read();
        table
            .order
            .iter()
            .filter_map(|id| table.by_id.get(id))
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect()
    }

    /// Insert a file under a fresh identifier
    pub fn create(&self, record: NewFile) -> File {
        let path = if record.path.is_empty() {
            format!("/{}", record.name)
        } else {
            record.path
        };
        let file = File {
            id: Uuid::new_v4().to_string(),
            project_id: record.project_id,
            name: record.name,
            path,
            content: record.content,
            language: record.language,
        };

        let mut table = self.files.write();
        table.order.push(file.id.clone());
        table.by_id.insert(file.id.clone(), file.clone());

        tracing::debug!("File created: {} ({})", file.name, file.id);
        file
    }

    /// Replace a file's content; `None` when the id is unknown
    pub fn update(&self, id: &str, content: impl Into<String>) -> Option<File> {
        let mut table = self.files.write();
        let file = table.by_id.get_mut(id)?;
        file.content = content.into();
        tracing::debug!("File updated: {} ({})", file.name, file.id);
        Some(file.clone())
    }

    /// Remove a file; `false` when the id is unknown
    pub fn delete(&self, id: &str) -> bool {
        let mut table = self.files.write();
        match table.by_id.remove(id) {
            Some(file) => {
                table.order.retain(|existing| existing != id);
                tracing::debug!("File deleted: {} ({})", file.name, file.id);
                true
            }
            None => false,
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.read().by_id.len()
    }
}

#[async_trait]
impl FileSink for FileStore {
    async fn create_file(&self, file: NewFile) -> Result<File> {
        Ok(self.create(file))
    }

    async fn update_file(&self, id: &str, content: &str) -> Result<Option<File>> {
        Ok(self.update(id, content))
    }

    async fn delete_file(&self, id: &str) -> Result<bool> {
        Ok(self.delete(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_store() {
        let store = FileStore::seeded();
        let files = store.list(DEFAULT_PROJECT_ID);
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["index.html", "style.css", "script.js"]);
        assert_eq!(files[2].language, "javascript");
        assert_eq!(files[0].path, "/index.html");
        assert!(store.get_project(DEFAULT_PROJECT_ID).is_some());
    }

    #[test]
    fn test_create_then_list_round_trip() {
        let store = FileStore::new();
        let created = store.create(NewFile::new("p1", "a.js").with_content("console.log(1)"));

        let listed = store.list("p1");
        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(listed[0].content, "console.log(1)");
        assert!(store.list("other").is_empty());
    }

    #[test]
    fn test_create_assigns_fresh_ids() {
        let store = FileStore::new();
        let a = store.create(NewFile::new("p", "same.txt"));
        let b = store.create(NewFile::new("p", "same.txt"));

        assert_ne!(a.id, b.id);
        assert_eq!(store.list("p").len(), 2);
    }

    #[test]
    fn test_empty_path_defaults_to_name() {
        let store = FileStore::new();
        let file = store.create(NewFile::new("p", "x.css").with_path(""));
        assert_eq!(file.path, "/x.css");
    }

    #[test]
    fn test_update_and_delete_unknown_id() {
        let store = FileStore::new();
        assert!(store.update("missing", "x").is_none());
        assert!(!store.delete("missing"));
    }

    #[test]
    fn test_update_then_delete() {
        let store = FileStore::new();
        let file = store.create(NewFile::new("p", "a.html"));

        let updated = store.update(&file.id, "<p>hi</p>").unwrap();
        assert_eq!(updated.content, "<p>hi</p>");
        assert_eq!(store.get_file(&file.id).unwrap().content, "<p>hi</p>");

        assert!(store.delete(&file.id));
        assert!(store.get_file(&file.id).is_none());
        assert_eq!(store.file_count(), 0);
    }

    #[test]
    fn test_create_project() {
        let store = FileStore::new();
        let project = store.create_project("Scratch", None);
        assert_eq!(store.get_project(&project.id), Some(project));
        assert_eq!(store.project_count(), 1);
    }
}
