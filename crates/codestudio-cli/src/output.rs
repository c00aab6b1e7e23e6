//! Plain-text rendering of chat turns and reconcile results

use codestudio_core::{AiChatResponse, File, Mutation, MutationOutcome, ReconcileReport, Target};
use colored::Colorize;

fn target_label(target: &Target) -> String {
    match target {
        Target::Existing(id) => id.clone(),
        Target::Pending(name) => format!("new {}", name),
    }
}

pub fn render_mutation(mutation: &Mutation) -> String {
    match mutation {
        Mutation::Create {
            name,
            language,
            content,
            ..
        } => format!("create {} ({}, {} bytes)", name, language, content.len()),
        Mutation::Update {
            target,
            file_name,
            content,
        } => format!(
            "update {} [{}] ({} bytes)",
            file_name,
            target_label(target),
            content.len()
        ),
        Mutation::Delete { target, file_name } => {
            format!("delete {} [{}]", file_name, target_label(target))
        }
    }
}

pub fn render_outcome(outcome: &MutationOutcome) -> String {
    match outcome {
        MutationOutcome::Created { file } => format!("created {}", file.name),
        MutationOutcome::Updated { file } => format!("updated {}", file.name),
        MutationOutcome::Deleted { file_name, .. } => format!("deleted {}", file_name),
        MutationOutcome::AlreadyGone { file_name, .. } => {
            format!("{} was already gone", file_name)
        }
    }
}

/// Notice shown when a run stopped early; `None` for complete runs
pub fn render_failure(report: &ReconcileReport) -> Option<String> {
    let failure = report.failure.as_ref()?;
    Some(format!(
        "Stopped at {} after {} change(s): {}. {} change(s) not attempted; send the request again to finish.",
        failure.file_name,
        report.applied(),
        failure.error,
        report.skipped
    ))
}

pub fn render_file(file: &File) -> String {
    format!(
        "{:<24} {:<12} {:>8}  {}",
        file.name,
        file.language,
        file.content.len(),
        file.id
    )
}

pub fn print_response(response: &AiChatResponse) {
    println!("{} {}", "assistant:".cyan().bold(), response.explanation);
    if let Some(suggestion) = &response.suggestion {
        if !suggestion.is_empty() {
            println!("{} {}", "suggestion:".dimmed(), suggestion);
        }
    }
}

pub fn print_plan(mutations: &[Mutation]) {
    if mutations.is_empty() {
        println!("{}", "no file changes".dimmed());
        return;
    }
    println!("{}", "planned changes (dry run):".yellow());
    for mutation in mutations {
        println!("  {}", render_mutation(mutation));
    }
}

pub fn print_report(report: &ReconcileReport) {
    for outcome in &report.outcomes {
        println!("  {} {}", "✓".green(), render_outcome(outcome));
    }
    if let Some(notice) = render_failure(report) {
        eprintln!("  {} {}", "✗".red(), notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codestudio_core::reconciler::ReconcileFailure;
    use codestudio_core::WorkspaceError;

    fn file(name: &str) -> File {
        File {
            id: "id-1".to_string(),
            project_id: "default".to_string(),
            name: name.to_string(),
            path: format!("/{}", name),
            content: "abc".to_string(),
            language: "plaintext".to_string(),
        }
    }

    #[test]
    fn test_render_mutations() {
        let create = Mutation::Create {
            name: "a.js".to_string(),
            path: "/a.js".to_string(),
            content: "x".to_string(),
            language: "javascript".to_string(),
        };
        assert_eq!(render_mutation(&create), "create a.js (javascript, 1 bytes)");

        let update = Mutation::Update {
            target: Target::Pending("a.js".to_string()),
            file_name: "a.js".to_string(),
            content: "xy".to_string(),
        };
        assert_eq!(render_mutation(&update), "update a.js [new a.js] (2 bytes)");
    }

    #[test]
    fn test_render_outcomes() {
        assert_eq!(
            render_outcome(&MutationOutcome::Created { file: file("b.css") }),
            "created b.css"
        );
        assert_eq!(
            render_outcome(&MutationOutcome::AlreadyGone {
                id: "x".to_string(),
                file_name: "old.js".to_string()
            }),
            "old.js was already gone"
        );
    }

    #[test]
    fn test_failure_notice() {
        let mut report = ReconcileReport::default();
        assert!(render_failure(&report).is_none());

        report.outcomes.push(MutationOutcome::Created { file: file("a.js") });
        report.failure = Some(ReconcileFailure {
            index: 1,
            file_name: "b.js".to_string(),
            error: WorkspaceError::Remote {
                status: 500,
                message: "boom".to_string(),
            },
        });
        report.skipped = 2;

        let notice = render_failure(&report).unwrap();
        assert!(notice.starts_with("Stopped at b.js after 1 change(s)"));
        assert!(notice.contains("boom"));
        assert!(notice.contains("2 change(s) not attempted"));
    }
}
