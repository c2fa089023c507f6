//! Types for kitty's `ls` output.
//!
//! kitty owns this schema; we only read the fields we display. Every field
//! defaults when absent or `null` and unknown fields are ignored, so newer
//! or older kitty versions still parse.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A top-level OS window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OsWindow {
    pub id: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_focused: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub tabs: Vec<Tab>,
}

/// A tab inside an OS window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tab {
    pub id: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_focused: bool,
    pub layout: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub windows: Vec<Window>,
}

/// A single terminal window (kitty's unit of "pane").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Window {
    pub id: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub pid: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub cwd: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cmdline: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub env: HashMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub foreground_processes: Vec<ForegroundProcess>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_focused: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_self: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub at_prompt: bool,
    pub columns: Option<u32>,
    pub lines: Option<u32>,
    /// Creation time in nanoseconds since the Unix epoch.
    pub created_at: Option<f64>,
}

/// A process in the foreground process group of a window's tty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForegroundProcess {
    pub pid: Option<u64>,
    pub cwd: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub cmdline: Vec<String>,
}

impl Window {
    /// The first foreground process, which is what the user is looking at.
    #[must_use]
    pub fn foreground(&self) -> Option<&ForegroundProcess> {
        self.foreground_processes.first()
    }

    /// Command line of the foreground process, empty if unknown.
    #[must_use]
    pub fn foreground_cmdline(&self) -> &[String] {
        self.foreground().map_or(&[], |p| p.cmdline.as_slice())
    }

    /// Working directory of the foreground process, falling back to the
    /// window's own cwd.
    #[must_use]
    pub fn foreground_cwd(&self) -> &str {
        self.foreground()
            .and_then(|p| p.cwd.as_deref())
            .unwrap_or(&self.cwd)
    }

    /// Pid of the foreground process, falling back to the window's shell.
    #[must_use]
    pub fn foreground_pid(&self) -> Option<u64> {
        self.foreground().and_then(|p| p.pid).or(self.pid)
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Parse the document printed by `kitten @ ls`.
pub fn parse_ls(json: &str) -> Result<Vec<OsWindow>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Format an optional id, using `?` for missing ones.
#[must_use]
pub fn display_id(id: Option<u64>) -> String {
    id.map_or_else(|| "?".to_string(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let windows = parse_ls(r#"[{"id": 1, "tabs": [{"id": 2, "windows": [{"id": 3}]}]}]"#)
            .expect("parse");
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].tabs[0].windows[0].id, Some(3));
        assert!(windows[0].tabs[0].layout.is_none());
        assert!(!windows[0].tabs[0].windows[0].at_prompt);
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let windows = parse_ls(
            r#"[{"id": 1, "wm_class": "kitty", "tabs": [{"id": 1, "enabled_layouts": ["tall"],
                "windows": [{"id": 7, "user_vars": {}, "created_at": 1700000000123456789}]}]}]"#,
        )
        .expect("parse");
        let win = &windows[0].tabs[0].windows[0];
        assert_eq!(win.id, Some(7));
        assert!(win.created_at.is_some());
    }

    #[test]
    fn test_parse_tolerates_nulls() {
        let windows = parse_ls(
            r#"[{"id": 1, "is_focused": null, "tabs": [{"id": 2, "title": null, "windows": [
                {"id": 3, "title": null, "cwd": null, "env": null, "at_prompt": null,
                 "foreground_processes": [{"pid": 5, "cmdline": null}]},
                {"id": 4, "foreground_processes": null}
            ]}]}, {"id": 9, "tabs": null}]"#,
        )
        .expect("parse");
        assert_eq!(windows.len(), 2);
        assert!(!windows[0].is_focused);
        assert!(windows[1].tabs.is_empty());

        let tab = &windows[0].tabs[0];
        assert_eq!(tab.title, "");
        let win = &tab.windows[0];
        assert_eq!(win.title, "");
        assert_eq!(win.cwd, "");
        assert!(win.env.is_empty());
        assert!(!win.at_prompt);
        assert_eq!(win.foreground_pid(), Some(5));
        assert!(win.foreground_cmdline().is_empty());
        assert!(tab.windows[1].foreground_processes.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_list() {
        assert!(parse_ls(r#"{"error": "nope"}"#).is_err());
    }

    #[test]
    fn test_foreground_fallbacks() {
        let mut win = Window {
            pid: Some(10),
            cwd: "/home/me".into(),
            ..Window::default()
        };
        assert_eq!(win.foreground_pid(), Some(10));
        assert_eq!(win.foreground_cwd(), "/home/me");
        assert!(win.foreground_cmdline().is_empty());

        win.foreground_processes.push(ForegroundProcess {
            pid: Some(11),
            cwd: Some("/tmp".into()),
            cmdline: vec!["vim".into()],
        });
        assert_eq!(win.foreground_pid(), Some(11));
        assert_eq!(win.foreground_cwd(), "/tmp");
        assert_eq!(win.foreground_cmdline(), ["vim".to_string()]);
    }

    #[test]
    fn test_display_id() {
        assert_eq!(display_id(Some(4)), "4");
        assert_eq!(display_id(None), "?");
    }
}
