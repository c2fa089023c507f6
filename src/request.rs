//! Typed remote-control requests.
//!
//! Each [`Request`] renders to the argument vector that follows `kitten @`
//! (see [`Request::args`]). Options always precede positional arguments:
//! kitty stops option parsing at the first positional, so a trailing
//! `--match` would otherwise become part of a title or text payload.

use clap::ValueEnum;

/// Which part of a window's text `get-text` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Extent {
    /// The visible screen.
    #[default]
    #[value(name = "screen")]
    Screen,
    /// Screen plus scrollback.
    #[value(name = "all")]
    All,
    /// The current selection.
    #[value(name = "selection")]
    Selection,
    #[value(name = "first_cmd_output_on_screen")]
    FirstCmdOutputOnScreen,
    #[value(name = "last_cmd_output")]
    LastCmdOutput,
    #[value(name = "last_non_empty_output")]
    LastNonEmptyOutput,
    #[value(name = "last_visited_cmd_output")]
    LastVisitedCmdOutput,
}

impl Extent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::All => "all",
            Self::Selection => "selection",
            Self::FirstCmdOutputOnScreen => "first_cmd_output_on_screen",
            Self::LastCmdOutput => "last_cmd_output",
            Self::LastNonEmptyOutput => "last_non_empty_output",
            Self::LastVisitedCmdOutput => "last_visited_cmd_output",
        }
    }
}

/// Where `launch` places the new window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LaunchType {
    #[default]
    Window,
    Tab,
    OsWindow,
    Overlay,
    OverlayMain,
    Background,
}

impl LaunchType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::Tab => "tab",
            Self::OsWindow => "os-window",
            Self::Overlay => "overlay",
            Self::OverlayMain => "overlay-main",
            Self::Background => "background",
        }
    }
}

/// Axis for `resize-window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
    Reset,
}

impl Axis {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Reset => "reset",
        }
    }
}

/// kitty's built-in layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    Tall,
    Fat,
    Stack,
    Grid,
    Splits,
    Horizontal,
    Vertical,
}

impl Layout {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tall => "tall",
            Self::Fat => "fat",
            Self::Stack => "stack",
            Self::Grid => "grid",
            Self::Splits => "splits",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Source of colours for `set-colors`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSource {
    /// A kitty config file with colour definitions.
    File(String),
    /// Explicit `name=value` assignments.
    Pairs(Vec<(String, String)>),
}

/// A single `kitten @` invocation.
///
/// `matcher` fields hold a kitty match expression (`id:3`, `title:vim`).
/// `None` lets kitty pick its default target (usually the active window).
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Ls {
        matcher: Option<String>,
        tab_matcher: Option<String>,
    },
    GetText {
        matcher: Option<String>,
        extent: Extent,
        ansi: bool,
    },
    SendText {
        matcher: Option<String>,
        all: bool,
        bracketed: bool,
        text: String,
    },
    SendKey {
        matcher: Option<String>,
        keys: Vec<String>,
    },
    Launch {
        kind: LaunchType,
        title: Option<String>,
        cwd: Option<String>,
        hold: bool,
        env: Vec<(String, String)>,
        cmd: Vec<String>,
    },
    FocusWindow {
        matcher: Option<String>,
    },
    FocusTab {
        matcher: Option<String>,
    },
    CloseWindow {
        matcher: Option<String>,
        ignore_no_match: bool,
    },
    CloseTab {
        matcher: Option<String>,
        ignore_no_match: bool,
    },
    ResizeWindow {
        matcher: Option<String>,
        increment: i32,
        axis: Axis,
    },
    ScrollWindow {
        matcher: Option<String>,
        amount: String,
    },
    SetWindowTitle {
        matcher: Option<String>,
        title: String,
    },
    SetTabTitle {
        matcher: Option<String>,
        title: String,
    },
    GetColors {
        matcher: Option<String>,
    },
    SetColors {
        matcher: Option<String>,
        all: bool,
        source: ColorSource,
    },
    SetBackgroundOpacity {
        opacity: f64,
        all: bool,
    },
    SetFontSize {
        size: String,
        all: bool,
    },
    GotoLayout {
        matcher: Option<String>,
        layout: Layout,
    },
    LastUsedLayout,
    CreateMarker {
        matcher: Option<String>,
        spec: Vec<String>,
    },
    RemoveMarker {
        matcher: Option<String>,
    },
    SignalChild {
        matcher: Option<String>,
        signal: String,
    },
    LoadConfig {
        config: Option<String>,
    },
    Action {
        name: String,
        args: Vec<String>,
    },
    DetachWindow {
        matcher: Option<String>,
        target: Option<String>,
    },
    DetachTab {
        matcher: Option<String>,
        target: Option<String>,
    },
}

impl Request {
    /// The remote-control command name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ls { .. } => "ls",
            Self::GetText { .. } => "get-text",
            Self::SendText { .. } => "send-text",
            Self::SendKey { .. } => "send-key",
            Self::Launch { .. } => "launch",
            Self::FocusWindow { .. } => "focus-window",
            Self::FocusTab { .. } => "focus-tab",
            Self::CloseWindow { .. } => "close-window",
            Self::CloseTab { .. } => "close-tab",
            Self::ResizeWindow { .. } => "resize-window",
            Self::ScrollWindow { .. } => "scroll-window",
            Self::SetWindowTitle { .. } => "set-window-title",
            Self::SetTabTitle { .. } => "set-tab-title",
            Self::GetColors { .. } => "get-colors",
            Self::SetColors { .. } => "set-colors",
            Self::SetBackgroundOpacity { .. } => "set-background-opacity",
            Self::SetFontSize { .. } => "set-font-size",
            Self::GotoLayout { .. } => "goto-layout",
            Self::LastUsedLayout => "last-used-layout",
            Self::CreateMarker { .. } => "create-marker",
            Self::RemoveMarker { .. } => "remove-marker",
            Self::SignalChild { .. } => "signal-child",
            Self::LoadConfig { .. } => "load-config",
            Self::Action { .. } => "action",
            Self::DetachWindow { .. } => "detach-window",
            Self::DetachTab { .. } => "detach-tab",
        }
    }

    /// Arguments following `kitten @`, starting with the command name.
    #[must_use]
    #[allow(clippy::too_many_lines)] // One arm per remote command
    pub fn args(&self) -> Vec<String> {
        let mut args = Args::new(self.name());

        match self {
            Self::Ls { matcher, tab_matcher } => {
                args.opt("--match", matcher.as_deref());
                args.opt("--match-tab", tab_matcher.as_deref());
            }
            Self::GetText { matcher, extent, ansi } => {
                args.opt("--match", matcher.as_deref());
                args.pair("--extent", extent.as_str());
                args.flag("--ansi", *ansi);
            }
            Self::SendText { matcher, all, bracketed, text } => {
                args.opt("--match", matcher.as_deref());
                args.flag("--all", *all);
                if *bracketed {
                    args.pair("--bracketed-paste", "enable");
                }
                args.positional([text.as_str()]);
            }
            Self::SendKey { matcher, keys } => {
                args.opt("--match", matcher.as_deref());
                args.positional(keys.iter().map(String::as_str));
            }
            Self::Launch { kind, title, cwd, hold, env, cmd } => {
                args.pair("--type", kind.as_str());
                args.opt("--title", title.as_deref());
                args.opt("--cwd", cwd.as_deref());
                args.flag("--hold", *hold);
                for (key, value) in env {
                    args.pair("--env", &format!("{key}={value}"));
                }
                args.positional(cmd.iter().map(String::as_str));
            }
            Self::FocusWindow { matcher }
            | Self::FocusTab { matcher }
            | Self::GetColors { matcher }
            | Self::RemoveMarker { matcher } => {
                args.opt("--match", matcher.as_deref());
            }
            Self::CloseWindow { matcher, ignore_no_match }
            | Self::CloseTab { matcher, ignore_no_match } => {
                args.opt("--match", matcher.as_deref());
                args.flag("--ignore-no-match", *ignore_no_match);
            }
            Self::ResizeWindow { matcher, increment, axis } => {
                args.pair("--increment", &increment.to_string());
                args.pair("--axis", axis.as_str());
                args.opt("--match", matcher.as_deref());
            }
            Self::ScrollWindow { matcher, amount } => {
                args.opt("--match", matcher.as_deref());
                args.positional([amount.as_str()]);
            }
            Self::SetWindowTitle { matcher, title } | Self::SetTabTitle { matcher, title } => {
                args.opt("--match", matcher.as_deref());
                args.positional([title.as_str()]);
            }
            Self::SetColors { matcher, all, source } => {
                args.opt("--match", matcher.as_deref());
                args.flag("--all", *all);
                match source {
                    ColorSource::File(path) => args.positional([path.as_str()]),
                    ColorSource::Pairs(pairs) => {
                        let pairs: Vec<String> =
                            pairs.iter().map(|(name, value)| format!("{name}={value}")).collect();
                        args.positional(pairs.iter().map(String::as_str));
                    }
                }
            }
            Self::SetBackgroundOpacity { opacity, all } => {
                args.flag("--all", *all);
                args.positional([opacity.to_string().as_str()]);
            }
            Self::SetFontSize { size, all } => {
                args.flag("--all", *all);
                args.positional([size.as_str()]);
            }
            Self::GotoLayout { matcher, layout } => {
                args.opt("--match", matcher.as_deref());
                args.positional([layout.as_str()]);
            }
            Self::LastUsedLayout => {}
            Self::CreateMarker { matcher, spec } => {
                args.opt("--match", matcher.as_deref());
                args.positional(spec.iter().map(String::as_str));
            }
            Self::SignalChild { matcher, signal } => {
                args.opt("--match", matcher.as_deref());
                args.positional([signal.as_str()]);
            }
            Self::LoadConfig { config } => {
                if let Some(config) = config {
                    args.positional([config.as_str()]);
                }
            }
            Self::Action { name, args: action_args } => {
                args.positional(std::iter::once(name.as_str()).chain(action_args.iter().map(String::as_str)));
            }
            Self::DetachWindow { matcher, target } | Self::DetachTab { matcher, target } => {
                args.opt("--match", matcher.as_deref());
                args.opt("--target-tab", target.as_deref());
            }
        }

        args.0
    }

    /// Whether the request only reads state.
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Ls { .. } | Self::GetText { .. } | Self::GetColors { .. })
    }
}

/// Argument vector builder.
struct Args(Vec<String>);

impl Args {
    fn new(command: &str) -> Self {
        Self(vec![command.to_string()])
    }

    fn flag(&mut self, name: &str, on: bool) {
        if on {
            self.0.push(name.to_string());
        }
    }

    fn pair(&mut self, name: &str, value: &str) {
        self.0.push(name.to_string());
        self.0.push(value.to_string());
    }

    fn opt(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.pair(name, value);
        }
    }

    /// Append positionals, inserting `--` if the first one looks like an option.
    fn positional<'a>(&mut self, values: impl IntoIterator<Item = &'a str>) {
        let mut values = values.into_iter().peekable();
        if values.peek().is_some_and(|first| first.starts_with('-')) {
            self.0.push("--".to_string());
        }
        self.0.extend(values.map(str::to_string));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(expr: &str) -> Option<String> {
        Some(expr.to_string())
    }

    #[test]
    fn test_ls_args() {
        let req = Request::Ls { matcher: None, tab_matcher: None };
        assert_eq!(req.args(), ["ls"]);

        let req = Request::Ls { matcher: m("title:vim"), tab_matcher: m("id:2") };
        assert_eq!(req.args(), ["ls", "--match", "title:vim", "--match-tab", "id:2"]);
    }

    #[test]
    fn test_get_text_args() {
        let req = Request::GetText { matcher: m("id:4"), extent: Extent::LastCmdOutput, ansi: true };
        assert_eq!(
            req.args(),
            ["get-text", "--match", "id:4", "--extent", "last_cmd_output", "--ansi"]
        );
    }

    #[test]
    fn test_send_text_args() {
        let req = Request::SendText {
            matcher: m("id:1"),
            all: true,
            bracketed: true,
            text: "ls -la\\r".into(),
        };
        assert_eq!(
            req.args(),
            ["send-text", "--match", "id:1", "--all", "--bracketed-paste", "enable", "ls -la\\r"]
        );
    }

    #[test]
    fn test_send_text_leading_dash_is_protected() {
        let req = Request::SendText { matcher: None, all: false, bracketed: false, text: "-h".into() };
        assert_eq!(req.args(), ["send-text", "--", "-h"]);
    }

    #[test]
    fn test_send_key_args() {
        let req = Request::SendKey { matcher: None, keys: vec!["ctrl+c".into(), "enter".into()] };
        assert_eq!(req.args(), ["send-key", "ctrl+c", "enter"]);
    }

    #[test]
    fn test_launch_args() {
        let req = Request::Launch {
            kind: LaunchType::OsWindow,
            title: m("Dev"),
            cwd: m("/src"),
            hold: true,
            env: vec![("A".into(), "1".into()), ("B".into(), "x=y".into())],
            cmd: vec!["htop".into()],
        };
        assert_eq!(
            req.args(),
            [
                "launch", "--type", "os-window", "--title", "Dev", "--cwd", "/src", "--hold",
                "--env", "A=1", "--env", "B=x=y", "htop"
            ]
        );
    }

    #[test]
    fn test_close_window_args() {
        let req = Request::CloseWindow { matcher: m("id:9"), ignore_no_match: true };
        assert_eq!(req.args(), ["close-window", "--match", "id:9", "--ignore-no-match"]);
        let req = Request::CloseTab { matcher: m("id:2"), ignore_no_match: true };
        assert_eq!(req.args(), ["close-tab", "--match", "id:2", "--ignore-no-match"]);
        let req = Request::CloseTab { matcher: None, ignore_no_match: false };
        assert_eq!(req.args(), ["close-tab"]);
    }

    #[test]
    fn test_resize_args() {
        let req = Request::ResizeWindow { matcher: m("id:2"), increment: -3, axis: Axis::Vertical };
        assert_eq!(
            req.args(),
            ["resize-window", "--increment", "-3", "--axis", "vertical", "--match", "id:2"]
        );
    }

    #[test]
    fn test_title_puts_match_before_title() {
        let req = Request::SetTabTitle { matcher: m("id:5"), title: "build logs".into() };
        assert_eq!(req.args(), ["set-tab-title", "--match", "id:5", "build logs"]);
    }

    #[test]
    fn test_set_colors_args() {
        let req = Request::SetColors {
            matcher: None,
            all: true,
            source: ColorSource::Pairs(vec![("background".into(), "#000000".into())]),
        };
        assert_eq!(req.args(), ["set-colors", "--all", "background=#000000"]);

        let req = Request::SetColors {
            matcher: m("id:1"),
            all: false,
            source: ColorSource::File("theme.conf".into()),
        };
        assert_eq!(req.args(), ["set-colors", "--match", "id:1", "theme.conf"]);
    }

    #[test]
    fn test_appearance_args() {
        let req = Request::SetBackgroundOpacity { opacity: 0.85, all: true };
        assert_eq!(req.args(), ["set-background-opacity", "--all", "0.85"]);

        let req = Request::SetFontSize { size: "-2".into(), all: false };
        assert_eq!(req.args(), ["set-font-size", "--", "-2"]);
    }

    #[test]
    fn test_layout_args() {
        let req = Request::GotoLayout { matcher: None, layout: Layout::Splits };
        assert_eq!(req.args(), ["goto-layout", "splits"]);
        assert_eq!(Request::LastUsedLayout.args(), ["last-used-layout"]);
    }

    #[test]
    fn test_marker_and_signal_args() {
        let req = Request::CreateMarker {
            matcher: m("id:3"),
            spec: vec!["text".into(), "1".into(), "ERROR".into()],
        };
        assert_eq!(req.args(), ["create-marker", "--match", "id:3", "text", "1", "ERROR"]);

        let req = Request::SignalChild { matcher: None, signal: "SIGTERM".into() };
        assert_eq!(req.args(), ["signal-child", "SIGTERM"]);
    }

    #[test]
    fn test_misc_args() {
        assert_eq!(Request::LoadConfig { config: None }.args(), ["load-config"]);
        assert_eq!(
            Request::LoadConfig { config: m("kitty.conf") }.args(),
            ["load-config", "kitty.conf"]
        );
        let req = Request::Action { name: "new_tab".into(), args: vec!["--x".into()] };
        assert_eq!(req.args(), ["action", "new_tab", "--x"]);
    }

    #[test]
    fn test_detach_args() {
        let req = Request::DetachTab { matcher: m("id:2"), target: m("new") };
        assert_eq!(req.args(), ["detach-tab", "--match", "id:2", "--target-tab", "new"]);
        let req = Request::DetachWindow { matcher: None, target: None };
        assert_eq!(req.args(), ["detach-window"]);
    }

    #[test]
    fn test_is_query() {
        assert!(Request::GetColors { matcher: None }.is_query());
        assert!(!Request::LastUsedLayout.is_query());
    }
}
