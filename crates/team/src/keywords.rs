use council_core::TaskType;

/// Keyword sets per task type (§4.3). A trailing `*` matches as a prefix —
/// e.g. `"vulnerab*"` matches "vulnerable" and "vulnerability".
fn keywords_for(task_type: TaskType) -> &'static [&'static str] {
    match task_type {
        TaskType::SecurityAudit => &["sql injection", "xss", "auth", "vulnerab*", "csrf", "exploit", "cve"],
        TaskType::UiDesign => &["button", "layout", "css", "tsx", "component", "responsive", "stylesheet"],
        TaskType::BugFix => &["crash", "fix", "error", "stack trace", "exception", "panic", "regression"],
        TaskType::Documentation => &["readme", "documentation", "docs", "md"],
        TaskType::Testing => &["test", ".test.", "unit test", "integration test", "coverage"],
        TaskType::Architecture => &["microservice", "design", "scalab*", "architecture", "module boundary"],
        TaskType::Performance => &["latency", "throughput", "performance", "benchmark", "bottleneck"],
        TaskType::ApiDesign => &["endpoint", "rest", "graphql", "api contract", "openapi"],
        TaskType::CodeReview => &["review", "pull request", "diff", "code quality"],
        TaskType::Refactoring => &["refactor", "cleanup", "technical debt", "simplify"],
        TaskType::General => &[],
    }
}

/// Task types considered during detection, in the order ties break on
/// (alphabetic by wire string, §4.3 "Ties break on alphabetic order of type").
pub fn scored_task_types() -> Vec<TaskType> {
    let mut types: Vec<TaskType> = TaskType::ALL
        .into_iter()
        .filter(|t| !matches!(t, TaskType::General))
        .collect();
    types.sort_by_key(|t| t.as_str());
    types
}

/// Score one task type against the haystack built from description + context
/// + file extensions, all lower-cased.
pub fn score(task_type: TaskType, haystack: &str, extensions: &[String]) -> u32 {
    let mut score = 0u32;
    for keyword in keywords_for(task_type) {
        if let Some(prefix) = keyword.strip_suffix('*') {
            if haystack.split_whitespace().any(|w| w.starts_with(prefix)) || haystack.contains(prefix) {
                score += 1;
            }
        } else if haystack.contains(keyword) {
            score += 1;
        }
    }
    // File-extension hints, independent of the textual keyword list.
    let ext_hints: &[&str] = match task_type {
        TaskType::UiDesign => &["css", "tsx", "jsx"],
        TaskType::Documentation => &["md"],
        TaskType::Testing => &["spec"],
        _ => &[],
    };
    for ext in ext_hints {
        if extensions.iter().any(|e| e == ext) {
            score += 1;
        }
    }
    if matches!(task_type, TaskType::Testing) && extensions.iter().any(|e| e.contains("test")) {
        score += 1;
    }
    score
}
