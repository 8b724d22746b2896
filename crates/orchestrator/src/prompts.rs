//! Stable, parsed-by-the-core prompt formats (§6).

use council_core::Task;

pub const ROUND_SUFFIX: &str = "Considering the above opinions, provide your refined assessment.";

pub const VOTE_PROMPT: &str = "Cast your final vote in exactly this format:\n\n\
VOTE: [APPROVE/REJECT]\n\
CONFIDENCE: [0.0-1.0]\n\
REASONING: [your reasoning]";

/// Initial round-1 user message: title, task id/description/context, a
/// newline-joined files list, and a four-point analysis instruction.
pub fn format_task(task: &Task) -> String {
    let files = if task.files.is_empty() {
        "(none)".to_string()
    } else {
        task.files.join("\n")
    };

    format!(
        "# Code Review Request\n\n\
        Task ID: {}\n\
        Description: {}\n\
        Context: {}\n\
        Files Affected:\n{}\n\n\
        Please analyze this task and provide:\n\
        1. Code quality assessment\n\
        2. Potential risks or issues\n\
        3. Suggested improvements\n\
        4. Your recommendation on whether to approve",
        task.id, task.description, task.context, files
    )
}

/// Build the text appended to the running debate context for round N>1:
/// the previous round's concatenated `{name}: {text}` opinions, followed by
/// the refinement suffix.
pub fn format_round_context(opinions: &[(String, String)]) -> String {
    let joined = opinions
        .iter()
        .map(|(name, text)| format!("{name}: {text}"))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{joined}\n\n{ROUND_SUFFIX}")
}
