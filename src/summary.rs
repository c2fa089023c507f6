//! Markdown summary of every window with its recent output.
//!
//! Gathering ([`collect`]) talks to kitty and git; rendering ([`render`])
//! is pure so it can be checked against fixtures.

use crate::kitten::{Kitten, KittenError};
use crate::model::{Window, display_id};
use crate::request::Extent;
use crate::view::truncate;
use chrono::{DateTime, Local, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Only the tail of a window is scanned for errors.
const ERROR_SCAN_LINES: usize = 30;
/// Reported errors per window.
const MAX_ERRORS: usize = 3;
/// Ready windows listed in the closing section.
const MAX_READY_LISTED: usize = 10;
const GIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Options for a summary run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Lines of output shown per window.
    pub lines: usize,
    pub extent: Extent,
    /// Include the window running this command.
    pub include_self: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            lines: 20,
            extent: Extent::Screen,
            include_self: false,
        }
    }
}

/// Everything known about one window, ready to render.
#[derive(Debug, Clone)]
pub struct WindowReport {
    pub window: Window,
    pub tab_id: Option<u64>,
    pub tab_title: String,
    /// Window text, `None` if it could not be read.
    pub text: Option<String>,
    pub git_branch: Option<String>,
}

/// Rough category of what is running in a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    Shell,
    Editor,
    Build,
    Test,
    Server,
    Ssh,
    Agent,
    Git,
    Container,
    Viewer,
    Flutter,
    Script,
    Process,
    Unknown,
}

impl ProcessKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shell => "🐚 shell",
            Self::Editor => "📝 editor",
            Self::Build => "🔨 build",
            Self::Test => "🧪 test",
            Self::Server => "🌐 server",
            Self::Ssh => "🔗 ssh",
            Self::Agent => "🤖 agent",
            Self::Git => "📦 git",
            Self::Container => "🐳 container",
            Self::Viewer => "👁 viewer",
            Self::Flutter => "📱 flutter",
            Self::Script => "⚡ script",
            Self::Process => "💻 process",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Final path component of a program name.
fn base_name(program: &str) -> &str {
    program.rsplit('/').next().unwrap_or(program)
}

/// Categorise a command line. Checks run in a fixed precedence, so
/// `cargo test` is a build and `pytest` is a test.
#[must_use]
pub fn categorize(cmdline: &[String]) -> ProcessKind {
    let Some(first) = cmdline.first() else {
        return ProcessKind::Unknown;
    };
    let program = first.to_lowercase();
    let base = base_name(&program);
    let full = cmdline.join(" ").to_lowercase();
    let is = |names: &[&str]| names.contains(&base);

    if is(&["zsh", "bash", "sh", "fish", "tcsh", "ksh", "-zsh", "-bash"]) {
        ProcessKind::Shell
    } else if is(&["vim", "nvim", "vi", "nano", "emacs", "code", "subl", "micro", "helix"]) {
        ProcessKind::Editor
    } else if is(&[
        "make", "cmake", "cargo", "go", "gcc", "clang", "rustc", "npm", "yarn", "pnpm", "gradle",
        "mvn",
    ]) {
        ProcessKind::Build
    } else if is(&["pytest", "jest", "mocha", "rspec"]) || full.contains("test") {
        ProcessKind::Test
    } else if is(&[
        "node", "python", "ruby", "java", "uvicorn", "gunicorn", "nginx", "postgres", "redis",
    ]) && ["server", "serve", "run"].iter().any(|w| full.contains(w))
    {
        ProcessKind::Server
    } else if base == "ssh" || full.contains("ssh ") {
        ProcessKind::Ssh
    } else if is(&["codex", "claude", "aider", "copilot"])
        || full.contains("codex")
        || full.contains("claude")
    {
        ProcessKind::Agent
    } else if base == "git" {
        ProcessKind::Git
    } else if is(&["docker", "podman", "kubectl", "k9s"]) {
        ProcessKind::Container
    } else if is(&["less", "more", "cat", "bat", "ranger", "mc", "htop", "top", "btop"]) {
        ProcessKind::Viewer
    } else if base == "flutter" || full.contains("flutter") {
        ProcessKind::Flutter
    } else if is(&["python", "python3", "node", "ruby", "perl"]) {
        ProcessKind::Script
    } else {
        ProcessKind::Process
    }
}

/// ssh options whose value is the following argument.
const SSH_OPTS_WITH_VALUE: &[&str] = &["-i", "-p", "-l", "-o", "-F", "-J", "-W", "-L", "-R", "-D"];

/// Destination of an ssh command line, if it is one.
#[must_use]
pub fn ssh_target(cmdline: &[String]) -> Option<String> {
    let first = cmdline.first()?;
    let full = cmdline.join(" ").to_lowercase();
    if !full.contains("ssh ") && base_name(first) != "ssh" {
        return None;
    }

    let mut args = cmdline.iter();
    while let Some(arg) = args.next() {
        if SSH_OPTS_WITH_VALUE.contains(&arg.as_str()) {
            args.next();
        } else if arg.starts_with('-') || base_name(arg) == "ssh" {
            continue;
        } else {
            return Some(arg.clone());
        }
    }
    None
}

static ERROR_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"^error:", "Error"),
        (r"^error\[", "Compiler error"),
        (r"\berror\b.*:", "Error"),
        (r"\berror \[", "Error"),
        (r"^\d{2}:\d{2}:\d{2} error", "Error"),
        (r"^exception:", "Exception"),
        (r"exception:", "Exception"),
        (r"^traceback", "Python traceback"),
        (r"^fatal:", "Fatal error"),
        (r"^panic:", "Panic/crash"),
        (r"segmentation fault", "Segmentation fault"),
        (r"^permission denied", "Permission denied"),
        (r"command not found", "Command not found"),
        (r"^syntaxerror:", "Syntax error"),
        (r"compilation failed", "Compilation failed"),
        (r"build failed", "Build failed"),
        (r"tests? failed", "Test failed"),
        (r"^failed:", "Failed"),
        (r"npm err!", "NPM error"),
        (r"unhandled.*exception", "Unhandled exception"),
        (r"unhandled.*rejection", "Unhandled rejection"),
        (r"stack trace:", "Stack trace"),
        (r"^\[error\]", "Error"),
        (r"error:.*failed", "Error"),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).expect("error pattern is valid"), label))
    .collect()
});

/// Line prefixes that mark a shell prompt.
const PROMPT_PREFIXES: &[char] = &['❯', '›', '$', '%', '>'];
const NOISE_PREFIXES: &[&str] = &["info", "warn", "debug", "notice"];

/// Find error-looking lines near the end of a window's text.
///
/// Each pattern reports at most once and at most three errors are
/// returned, formatted as ``Label: `line` ``.
#[must_use]
pub fn detect_errors(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    let recent = &lines[lines.len().saturating_sub(ERROR_SCAN_LINES)..];

    let mut seen = vec![false; ERROR_PATTERNS.len()];
    let mut errors = Vec::new();

    for line in recent {
        let clean = strip_ansi_escapes::strip_str(line.trim());
        let clean = clean.trim();
        let lower = clean.to_lowercase();
        if lower.is_empty()
            || lower.starts_with(PROMPT_PREFIXES)
            || NOISE_PREFIXES.iter().any(|p| lower.starts_with(p))
        {
            continue;
        }

        let hit = ERROR_PATTERNS
            .iter()
            .enumerate()
            .find(|(i, (re, _))| !seen[*i] && re.is_match(&lower));
        if let Some((i, (_, label))) = hit {
            seen[i] = true;
            errors.push(format!("{label}: `{}`", truncate(clean, 60)));
        }

        if errors.len() >= MAX_ERRORS {
            break;
        }
    }

    errors
}

/// Active Python environment of a window, from its environment variables.
#[must_use]
pub fn virtualenv(env: &HashMap<String, String>) -> Option<String> {
    if let Some(venv) = env.get("VIRTUAL_ENV").filter(|v| !v.is_empty()) {
        return Some(base_name(venv).to_string());
    }
    env.get("CONDA_DEFAULT_ENV")
        .filter(|c| !c.is_empty() && c.as_str() != "base")
        .map(|c| format!("conda:{c}"))
}

/// Age of a window from kitty's `created_at` (nanoseconds since epoch).
#[must_use]
#[allow(clippy::cast_possible_truncation)] // nanosecond timestamps fit in i64 until 2262
pub fn format_age(created_at_ns: Option<f64>, now: DateTime<Utc>) -> String {
    let Some(ns) = created_at_ns.filter(|ns| ns.is_finite() && *ns > 0.0) else {
        return "unknown".to_string();
    };
    let created = DateTime::<Utc>::from_timestamp_nanos(ns as i64);
    let delta = (now - created).max(chrono::TimeDelta::zero());

    if delta.num_days() > 0 {
        format!("{}d ago", delta.num_days())
    } else if delta.num_hours() > 0 {
        format!("{}h ago", delta.num_hours())
    } else if delta.num_minutes() > 0 {
        format!("{}m ago", delta.num_minutes())
    } else {
        format!("{}s ago", delta.num_seconds())
    }
}

/// Current git branch of a directory, `None` if unknown or detached.
pub async fn git_branch(cwd: &str) -> Option<String> {
    if cwd.is_empty() {
        return None;
    }
    let output = Command::new("git")
        .args(["-C", cwd, "branch", "--show-current"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(GIT_TIMEOUT, output).await {
        Ok(Ok(output)) if output.status.success() => {
            let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!branch.is_empty()).then_some(branch)
        }
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            debug!("git unavailable: {}", e);
            None
        }
        Err(_) => {
            debug!(cwd, "git timed out");
            None
        }
    }
}

/// Query kitty (and git) for every window to include in the summary.
pub async fn collect(kitten: &Kitten, opts: SummaryOptions) -> Result<Vec<WindowReport>, KittenError> {
    let os_windows = kitten.ls().await?;
    let mut reports = Vec::new();

    for os_win in os_windows {
        for tab in os_win.tabs {
            for window in tab.windows {
                if window.is_self && !opts.include_self {
                    continue;
                }

                let text = match window.id {
                    Some(id) => match kitten.get_text(id, opts.extent).await {
                        Ok(text) => Some(text),
                        Err(e) => {
                            warn!(window = id, "could not read window text: {}", e);
                            None
                        }
                    },
                    None => None,
                };
                let git_branch = git_branch(window.foreground_cwd()).await;

                reports.push(WindowReport {
                    window,
                    tab_id: tab.id,
                    tab_title: tab.title.clone(),
                    text,
                    git_branch,
                });
            }
        }
    }

    Ok(reports)
}

/// Render collected reports as markdown.
#[must_use]
pub fn render(
    reports: &[WindowReport],
    opts: SummaryOptions,
    now: DateTime<Local>,
) -> String {
    let mut parts: Vec<String> = vec![
        "# Kitty Terminal Summary\n".to_string(),
        format!("*Generated: {}*\n", now.format("%Y-%m-%d %H:%M:%S")),
        format!(
            "*Showing last {} lines from each window (extent: {})*\n",
            opts.lines,
            opts.extent.as_str()
        ),
        "---\n".to_string(),
    ];

    let mut ready = Vec::new();
    let mut with_errors = Vec::new();

    for report in reports {
        let id = display_id(report.window.id);
        if report.window.at_prompt {
            ready.push(id.clone());
        }
        let errors = report.text.as_deref().map(detect_errors).unwrap_or_default();
        if !errors.is_empty() {
            with_errors.push(id.clone());
        }
        render_window(&mut parts, report, &errors, opts, now.with_timezone(&Utc));
    }

    if reports.is_empty() {
        parts.push("*No windows found (or all windows excluded)*".to_string());
    } else {
        parts.push("\n## Summary\n".to_string());
        parts.push(format!("- **Total windows:** {}", reports.len()));
        parts.push(format!(
            "- **Ready for input:** {} windows: {}",
            ready.len(),
            ready.iter().take(MAX_READY_LISTED).cloned().collect::<Vec<_>>().join(", ")
        ));
        if !with_errors.is_empty() {
            parts.push(format!(
                "- **⚠️ Windows with errors:** {} windows: {}",
                with_errors.len(),
                with_errors.join(", ")
            ));
        }
    }

    parts.join("\n")
}

fn render_window(
    parts: &mut Vec<String>,
    report: &WindowReport,
    errors: &[String],
    opts: SummaryOptions,
    now: DateTime<Utc>,
) {
    let win = &report.window;
    let id = display_id(win.id);
    let cmdline = win.foreground_cmdline();
    let kind = categorize(cmdline);
    let command = if cmdline.is_empty() { "shell".to_string() } else { cmdline.join(" ") };

    let status = if win.is_focused {
        "🟢 FOCUSED"
    } else if win.is_active {
        "🟡 ACTIVE"
    } else {
        "⚪ IDLE"
    };
    let (prompt, activity) = if win.at_prompt {
        ("✅ READY", "Can receive commands")
    } else {
        ("⏳ BUSY", "Running a process")
    };
    let size = format!(
        "{}x{}",
        win.columns.map_or_else(|| "?".to_string(), |c| c.to_string()),
        win.lines.map_or_else(|| "?".to_string(), |l| l.to_string()),
    );

    parts.push(format!("## Window {id} | {status} | {prompt} | {kind}\n"));
    parts.push("| Property | Value |".to_string());
    parts.push("|----------|-------|".to_string());
    parts.push(format!("| **Window ID** | `{id}` |"));
    parts.push(format!("| **Status** | {prompt} - {activity} |"));
    parts.push(format!("| **Process** | {kind} |"));
    parts.push(format!(
        "| **Tab** | {} ({}) |",
        display_id(report.tab_id),
        truncate(&report.tab_title, 30)
    ));
    parts.push(format!("| **Size** | {size} |"));
    parts.push(format!("| **CWD** | `{}` |", win.foreground_cwd()));
    parts.push(format!("| **PID** | {} |", display_id(win.foreground_pid())));
    parts.push(format!("| **Command** | `{}` |", truncate(&command, 50)));
    parts.push(format!("| **Session Age** | {} |", format_age(win.created_at, now)));
    if let Some(branch) = &report.git_branch {
        parts.push(format!("| **Git Branch** | `{branch}` |"));
    }
    if let Some(target) = ssh_target(cmdline) {
        parts.push(format!("| **SSH Target** | `{target}` |"));
    }
    if let Some(venv) = virtualenv(&win.env) {
        parts.push(format!("| **Virtual Env** | `{venv}` |"));
    }
    parts.push(String::new());

    if !errors.is_empty() {
        parts.push("**⚠️ Errors Detected:**".to_string());
        parts.extend(errors.iter().map(|e| format!("- {e}")));
        parts.push(String::new());
    }

    parts.push("**Quick commands:**".to_string());
    parts.push(format!("- Send text: `send-text -w {id} -e \"your command\"`"));
    parts.push(format!("- Send Ctrl+C: `send-key -w {id} ctrl+c`"));
    parts.push(format!("- Get more output: `get-text -w {id} -e all`"));
    parts.push(format!("- Focus: `focus -w {id}`"));
    parts.push(String::new());

    match report.text.as_deref() {
        Some(text) if !text.is_empty() => {
            let lines: Vec<&str> = text.trim_end_matches('\n').split('\n').collect();
            let shown = if lines.len() > opts.lines {
                parts.push(format!("*(...truncated, showing last {} lines)*\n", opts.lines));
                &lines[lines.len() - opts.lines..]
            } else {
                &lines[..]
            };
            parts.push("```".to_string());
            parts.push(shown.join("\n"));
            parts.push("```".to_string());
        }
        _ => parts.push("*No output available*".to_string()),
    }

    parts.push("\n---\n".to_string());
}
