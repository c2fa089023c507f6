//! Human-readable rendering of kitty state.

use crate::model::{OsWindow, Window, display_id};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::Path;

/// Inner width of the monitor header box.
const BOX_WIDTH: usize = 76;

/// Collapse a value onto one line and cut it to `max_len` characters,
/// ending in `...` when shortened.
#[must_use]
pub fn truncate(text: &str, max_len: usize) -> String {
    let text = text.replace('\n', " ").replace('\r', "");
    let text = text.trim();
    if text.chars().count() > max_len {
        let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}

/// Replace a leading home directory with `~`.
#[must_use]
pub fn shorten_home(path: &str, home: Option<&Path>) -> String {
    let Some(home) = home.and_then(Path::to_str).filter(|h| !h.is_empty() && *h != "/") else {
        return path.to_string();
    };
    match path.strip_prefix(home) {
        Some("") => "~".to_string(),
        Some(rest) if rest.starts_with('/') => format!("~{rest}"),
        _ => path.to_string(),
    }
}

/// Short status label for a window in the tree view.
#[must_use]
pub const fn window_status(win: &Window) -> &'static str {
    if win.is_self {
        "🔵 SELF"
    } else if win.is_focused {
        "🟢 FOCUS"
    } else if win.is_active {
        "🟡 ACTIVE"
    } else {
        "⚪ IDLE"
    }
}

/// Render the `ls` tree ("terminal monitor").
#[must_use]
pub fn render_tree(os_windows: &[OsWindow], now: DateTime<Local>, home: Option<&Path>) -> String {
    let mut out = String::new();
    let title = format!("║ KITTY TERMINAL MONITOR - {}", now.format("%Y-%m-%d %H:%M:%S"));

    let _ = writeln!(out, "╔{}╗", "═".repeat(BOX_WIDTH));
    let _ = writeln!(out, "{title:<width$}║", width = BOX_WIDTH + 1);
    let _ = writeln!(out, "╚{}╝", "═".repeat(BOX_WIDTH));
    out.push('\n');

    for os_win in os_windows {
        let marker = if os_win.is_focused { "🟢" } else { "⚪" };
        let _ = writeln!(out, "┌── OS Window {} {marker}", display_id(os_win.id));

        for tab in &os_win.tabs {
            let marker = if tab.is_active { "●" } else { "○" };
            let _ = writeln!(
                out,
                "│  ├── Tab {} {marker} [{}] {}",
                display_id(tab.id),
                tab.layout.as_deref().unwrap_or("unknown"),
                truncate(&tab.title, 30),
            );

            for win in &tab.windows {
                render_window(&mut out, win, home);
            }
        }

        out.push_str("│\n");
    }

    let _ = write!(out, "└{}", "─".repeat(BOX_WIDTH));
    out
}

fn render_window(out: &mut String, win: &Window, home: Option<&Path>) {
    let _ = writeln!(
        out,
        "│  │   └── Window {} │ {:<12} │ pid:{}",
        display_id(win.id),
        window_status(win),
        display_id(win.pid),
    );

    let title = truncate(&win.title, 25);
    if !title.is_empty() {
        let _ = writeln!(out, "│  │       Title: {title}");
    }

    if !win.cwd.is_empty() {
        let cwd = truncate(&shorten_home(&win.cwd, home), 20);
        let _ = writeln!(out, "│  │       CWD: {cwd}");
    }

    let cmdline = win.foreground_cmdline();
    if !cmdline.is_empty() {
        let _ = writeln!(out, "│  │       Cmd: {}", truncate(&cmdline.join(" "), 25));
    }
}

/// Flatten the hierarchy into a compact listing, one entry per window.
#[must_use]
pub fn listing_json(os_windows: &[OsWindow]) -> serde_json::Value {
    let windows: Vec<_> = os_windows
        .iter()
        .flat_map(|os_win| {
            os_win.tabs.iter().flat_map(move |tab| {
                tab.windows.iter().map(move |win| {
                    let mut entry = serde_json::json!({
                        "id": win.id,
                        "os_window": os_win.id,
                        "tab": tab.id,
                        "title": win.title,
                        "cwd": win.foreground_cwd(),
                        "pid": win.foreground_pid(),
                        "command": win.foreground_cmdline().join(" "),
                        "at_prompt": win.at_prompt,
                    });
                    // Only flag the interesting states to keep output compact
                    if win.is_focused {
                        entry["focused"] = serde_json::json!(true);
                    }
                    if win.is_self {
                        entry["self"] = serde_json::json!(true);
                    }
                    entry
                })
            })
        })
        .collect();
    serde_json::json!({ "windows": windows })
}

/// TOON rendering of [`listing_json`] (token-efficient for LLMs).
#[must_use]
pub fn render_toon(os_windows: &[OsWindow]) -> String {
    let data = listing_json(os_windows);
    toon_format::encode(&data, &toon_format::EncodeOptions::default())
        .unwrap_or_else(|_| data.to_string())
}

/// Parse `get-colors` output (`name value` lines, `#` comments).
#[must_use]
pub fn parse_colors(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (name, value) = line.split_once(char::is_whitespace)?;
            let value = value.trim();
            (!value.is_empty()).then(|| (name.to_string(), value.to_string()))
        })
        .collect()
}

#[must_use]
pub fn render_colors(colors: &[(String, String)]) -> String {
    colors
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn colors_json(colors: &[(String, String)]) -> serde_json::Value {
    let map: serde_json::Map<_, _> = colors
        .iter()
        .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
        .collect();
    serde_json::Value::Object(map)
}
