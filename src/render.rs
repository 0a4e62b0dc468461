//! Markdown context bundle for the analysis model.
//!
//! The bundle has the repository structure in a fenced block followed by every
//! retained file under a `### File: <path>` heading.

use crate::models::Ingestion;

pub fn render_context(ingestion: &Ingestion) -> String {
    let digest = &ingestion.digest;
    let mut out = String::new();

    out.push_str("## Repository Structure:\n```\n");
    out.push_str(&ingestion.tree);
    out.push_str("\n```\n\n");

    out.push_str(&format!(
        "## Files ({} files, {} lines):\n",
        digest.files, digest.total_lines
    ));

    let sections: Vec<String> = ingestion
        .files
        .iter()
        .map(|f| format!("### File: {}\n```\n{}\n```", f.path, f.content))
        .collect();
    out.push_str(&sections.join("\n\n"));
    out.push('\n');
    out
}
