//! Command-line interface for kitctl.
//!
//! Subcommands map onto [`Invocation`]s. The few places where arguments are
//! not passed through verbatim (key names, scroll amounts, signals, font
//! sizes, marker specs, window/tab ids) are handled by the helpers below.

use crate::kitten::DEFAULT_KITTEN;
use crate::request::{Axis, ColorSource, Extent, LaunchType, Layout, Request};
use crate::summary::SummaryOptions;
use clap::{Args, Parser, Subcommand, ValueEnum};
use nix::sys::signal::Signal;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Errors from translating arguments into a request.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("no text given (pass TEXT or pipe it on stdin)")]
    MissingText,

    #[error("marker spec required, e.g. `text 1 ERROR`")]
    MissingMarkerSpec,

    #[error("invalid marker spec {0:?}: expected TYPE NUM PATTERN with TYPE one of text, itext, regex, iregex")]
    InvalidMarkerSpec(String),
}

const MODIFIERS: &[(&str, &[&str])] = &[
    ("ctrl", &["ctrl", "control", "ctl", "c"]),
    ("alt", &["alt", "opt", "option", "m"]),
    ("shift", &["shift"]),
    ("super", &["super", "cmd", "command", "win"]),
    ("hyper", &["hyper"]),
    ("meta", &["meta"]),
];

const KEY_ALIASES: &[(&str, &[&str])] = &[
    ("escape", &["esc"]),
    ("enter", &["return", "ret", "cr"]),
    ("backspace", &["bs"]),
    ("delete", &["del"]),
    ("insert", &["ins"]),
    ("space", &["spc"]),
    ("page_up", &["pgup", "pageup", "page-up"]),
    ("page_down", &["pgdn", "pagedown", "page-down"]),
];

fn modifier(name: &str) -> Option<&'static str> {
    MODIFIERS
        .iter()
        .find(|(_, aliases)| aliases.contains(&name))
        .map(|(canonical, _)| *canonical)
}

fn key_name(name: &str) -> String {
    KEY_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&name))
        .map_or_else(|| name.to_string(), |(canonical, _)| (*canonical).to_string())
}

/// Normalise a key description to kitty's `mod+mod+key` syntax.
///
/// Supported formats:
/// - `ctrl+c`, `ctrl-c`, `C-c` - modifiers joined by `+` or `-`
/// - `^C` - control shorthand
/// - `esc`, `return`, `pgup` ... - aliases for kitty key names
///
/// Anything unrecognised is passed through lowercased.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    let key = key.trim().to_lowercase();

    // ^X format
    if let Some(rest) = key.strip_prefix('^')
        && rest.chars().count() == 1
    {
        return format!("ctrl+{rest}");
    }

    if let Some(combo) = split_combo(&key, '+').or_else(|| split_combo(&key, '-')) {
        return combo;
    }

    key_name(&key)
}

/// Split `mod<sep>mod<sep>key` into kitty syntax.
///
/// Leading modifiers are consumed up to the last part; whatever remains
/// is the key, so `ctrl-page-down` and `ctrl--` keep their key intact.
fn split_combo(key: &str, sep: char) -> Option<String> {
    let parts: Vec<&str> = key.split(sep).collect();
    let (_, candidates) = parts.split_last()?;
    let mut mods: Vec<&str> = candidates.iter().map_while(|part| modifier(part)).collect();
    if mods.is_empty() {
        return None;
    }

    let rest = parts[mods.len()..].join(&sep.to_string());
    let key = match rest.as_str() {
        "" => return None,
        "-" => "minus".to_string(),
        "+" => "plus".to_string(),
        name => key_name(name),
    };
    mods.dedup();
    Some(format!("{}+{key}", mods.join("+")))
}

/// Translate scroll aliases to kitty's `scroll-window` amount syntax.
///
/// `page-down` -> `1p`, `line-up` -> `1-`, `home` -> `start`, `-3` -> `3-`.
#[must_use]
pub fn scroll_amount(amount: &str) -> String {
    let amount = amount.trim();
    match amount {
        "page-down" | "pgdn" => "1p".to_string(),
        "page-up" | "pgup" => "1p-".to_string(),
        "line-down" => "1".to_string(),
        "line-up" => "1-".to_string(),
        "home" | "top" => "start".to_string(),
        "end" | "bottom" => "end".to_string(),
        _ => match amount.strip_prefix('-') {
            Some(count) if is_scroll_count(count) => format!("{count}-"),
            _ => amount.to_string(),
        },
    }
}

fn is_scroll_count(s: &str) -> bool {
    let digits = s.strip_suffix('p').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Parse a signal given as `INT`, `sigint`, `SIGINT` or `2`.
pub fn parse_signal(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    let signal = if let Ok(number) = trimmed.parse::<i32>() {
        Signal::try_from(number).map_err(|_| format!("unknown signal number {number}"))?
    } else {
        let upper = trimmed.to_uppercase();
        let name = if upper.starts_with("SIG") { upper } else { format!("SIG{upper}") };
        Signal::from_str(&name).map_err(|_| format!("unknown signal {trimmed:?}"))?
    };
    Ok(signal.as_str().to_string())
}

/// Validate a font size, optionally signed for a relative change.
pub fn parse_font_size(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    let magnitude = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if magnitude.starts_with(['+', '-']) {
        return Err(format!("invalid font size {s:?}"));
    }
    match magnitude.parse::<f64>() {
        Ok(size) if size.is_finite() && size >= 0.0 => Ok(trimmed.to_string()),
        _ => Err(format!("invalid font size {s:?}")),
    }
}

/// Size argument for `set-font-size`; `increment` makes an unsigned size relative.
#[must_use]
pub fn font_size_arg(size: &str, increment: bool) -> String {
    if increment && !size.starts_with(['+', '-']) {
        format!("+{size}")
    } else {
        size.to_string()
    }
}

/// Parse a background opacity in `0.0..=1.0`.
pub fn parse_opacity(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok(value),
        Ok(value) => Err(format!("opacity {value} is outside 0.0..=1.0")),
        Err(e) => Err(format!("invalid opacity {s:?}: {e}")),
    }
}

/// Parse a `KEY=VALUE` pair. The value may itself contain `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

const MARKER_TYPES: &[&str] = &["text", "itext", "regex", "iregex"];

/// Re-split marker words on whitespace and check the marker type.
pub fn marker_spec(words: &[String]) -> Result<Vec<String>, CliError> {
    let joined = words.join(" ");
    let spec: Vec<String> = joined.split_whitespace().map(str::to_string).collect();
    match spec.first() {
        None => Err(CliError::MissingMarkerSpec),
        Some(kind) if MARKER_TYPES.contains(&kind.as_str()) && spec.len() >= 3 => Ok(spec),
        Some(_) => Err(CliError::InvalidMarkerSpec(joined)),
    }
}

/// Window selection shared by most subcommands.
#[derive(Debug, Clone, Default, Args)]
pub struct WindowTarget {
    /// Window ID.
    #[arg(short = 'w', long = "window-id", conflicts_with = "pattern")]
    pub window_id: Option<u64>,

    /// kitty match expression (e.g. title:vim, cwd:~/src).
    #[arg(short = 'm', long = "match")]
    pub pattern: Option<String>,
}

impl WindowTarget {
    /// Match expression for kitty: `id:N` for an id, else the raw pattern.
    #[must_use]
    pub fn matcher(&self) -> Option<String> {
        self.window_id
            .map(|id| format!("id:{id}"))
            .or_else(|| self.pattern.clone())
    }
}

fn tab_match(tab_id: u64) -> Option<String> {
    Some(format!("id:{tab_id}"))
}

/// Layout names accepted by `layout`, including `last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    Tall,
    Fat,
    Stack,
    Grid,
    Splits,
    Horizontal,
    Vertical,
    /// The previously used layout.
    Last,
}

impl LayoutArg {
    #[must_use]
    pub const fn layout(self) -> Option<Layout> {
        match self {
            Self::Tall => Some(Layout::Tall),
            Self::Fat => Some(Layout::Fat),
            Self::Stack => Some(Layout::Stack),
            Self::Grid => Some(Layout::Grid),
            Self::Splits => Some(Layout::Splits),
            Self::Horizontal => Some(Layout::Horizontal),
            Self::Vertical => Some(Layout::Vertical),
            Self::Last => None,
        }
    }
}

const EXAMPLES: &str = "\
Examples:
  kitctl ls                                  # List all windows
  kitctl ls -w                               # Watch mode (continuous)
  kitctl summary -n 50                       # Markdown summary, 50 lines per window
  kitctl get-text -w 1 -e last_cmd_output    # Output of the last command
  kitctl send-text -w 1 -e \"ls -la\"          # Send a command and press Enter
  kitctl send-key -w 1 ctrl+c                # Send Ctrl+C
  kitctl launch -t tab --title Dev           # Launch a new tab
  kitctl signal -w 1 term                    # Send SIGTERM to the child";

/// Convenience CLI over kitty's remote control.
#[derive(Debug, Parser)]
#[command(name = "kitctl", version, about, after_help = EXAMPLES)]
pub struct Cli {
    /// Address of the kitty instance to control (e.g. unix:/tmp/kitty).
    #[arg(long, env = "KITCTL_TO")]
    pub to: Option<String>,

    /// Path to the kitten binary.
    #[arg(long, env = "KITCTL_KITTEN", default_value = DEFAULT_KITTEN)]
    pub kitten: PathBuf,

    /// Timeout for each kitten call, in seconds.
    #[arg(long, env = "KITCTL_TIMEOUT", default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Output JSON where supported (ls, colors, launch).
    #[arg(short, long)]
    pub json: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List OS windows, tabs and windows.
    Ls {
        /// Refresh continuously until interrupted.
        #[arg(short, long)]
        watch: bool,

        /// Watch interval in seconds.
        #[arg(short = 'n', long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,

        /// Window match expression (prints raw JSON).
        #[arg(short = 'm', long = "match")]
        pattern: Option<String>,

        /// Tab match expression (prints raw JSON).
        #[arg(short = 't', long = "match-tab")]
        tab_pattern: Option<String>,

        /// Compact TOON listing (token-efficient for LLMs).
        #[arg(long, conflicts_with = "watch")]
        toon: bool,
    },

    /// Get text from a window.
    GetText {
        #[command(flatten)]
        target: WindowTarget,

        /// What text to get.
        #[arg(short, long, value_enum, default_value_t)]
        extent: Extent,

        /// Include ANSI formatting codes.
        #[arg(short, long)]
        ansi: bool,
    },

    /// Send text to a window.
    SendText {
        #[command(flatten)]
        target: WindowTarget,

        /// Press Enter after the text.
        #[arg(short, long)]
        enter: bool,

        /// Wrap the text in bracketed paste.
        #[arg(short, long)]
        bracketed: bool,

        /// Send to all windows.
        #[arg(short, long)]
        all: bool,

        /// Read the text from stdin.
        #[arg(long, conflicts_with = "text")]
        stdin: bool,

        /// Text to send (read from stdin if omitted).
        #[arg(allow_hyphen_values = true)]
        text: Option<String>,
    },

    /// Send keys to a window (e.g. ctrl+c, escape, enter).
    SendKey {
        #[command(flatten)]
        target: WindowTarget,

        /// Keys to send.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Launch a new window or tab and print its ID.
    Launch {
        /// Where to open the new window.
        #[arg(short = 't', long = "type", value_enum, default_value_t)]
        kind: LaunchType,

        /// Window title.
        #[arg(long)]
        title: Option<String>,

        /// Working directory.
        #[arg(long)]
        cwd: Option<String>,

        /// Keep the window open after the command exits.
        #[arg(long)]
        hold: bool,

        /// Environment variables (KEY=VALUE format, can be repeated).
        #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
        env: Vec<(String, String)>,

        /// Command to run.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        cmd: Vec<String>,
    },

    /// Focus a window or tab.
    Focus {
        #[command(flatten)]
        target: WindowTarget,

        /// Focus a tab instead of a window.
        #[arg(short = 't', long = "tab-id", conflicts_with_all = ["window_id", "pattern"])]
        tab_id: Option<u64>,
    },

    /// Close a window or tab.
    Close {
        #[command(flatten)]
        target: WindowTarget,

        /// Close a tab instead of a window.
        #[arg(short = 't', long = "tab-id", conflicts_with_all = ["window_id", "pattern"])]
        tab_id: Option<u64>,

        /// Do not fail if nothing matches.
        #[arg(long)]
        ignore_no_match: bool,
    },

    /// Resize a window in the current layout.
    Resize {
        #[command(flatten)]
        target: WindowTarget,

        /// Cells to grow by (negative to shrink).
        #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
        increment: i32,

        /// Axis to resize along.
        #[arg(short, long, value_enum, default_value_t)]
        axis: Axis,
    },

    /// Scroll a window.
    Scroll {
        #[command(flatten)]
        target: WindowTarget,

        /// page-up, page-down, line-up, line-down, home, end, or a line count
        /// (negative scrolls up; suffix p for pages).
        #[arg(default_value = "page-down", allow_hyphen_values = true)]
        amount: String,
    },

    /// Set a window or tab title.
    SetTitle {
        #[command(flatten)]
        target: WindowTarget,

        /// Set the title of a tab instead of a window.
        #[arg(short = 't', long = "tab-id", conflicts_with_all = ["window_id", "pattern"])]
        tab_id: Option<u64>,

        /// New title.
        #[arg(allow_hyphen_values = true)]
        title: String,
    },

    /// Get or set terminal colors.
    Colors {
        /// Print the current colors (default).
        #[arg(short, long, group = "color_op")]
        get: bool,

        /// Set colors (name=value).
        #[arg(short, long, num_args = 1.., value_name = "NAME=VALUE", value_parser = parse_key_value, group = "color_op")]
        set: Vec<(String, String)>,

        /// Load colors from a kitty config file.
        #[arg(short, long, group = "color_op")]
        file: Option<String>,

        #[command(flatten)]
        target: WindowTarget,

        /// Apply to all windows.
        #[arg(short, long)]
        all: bool,
    },

    /// Set background opacity.
    Opacity {
        /// Apply to all OS windows.
        #[arg(short, long)]
        all: bool,

        /// Opacity between 0.0 and 1.0.
        #[arg(value_parser = parse_opacity)]
        value: f64,
    },

    /// Set font size.
    FontSize {
        /// Apply to all OS windows.
        #[arg(short, long)]
        all: bool,

        /// Treat SIZE as an increment.
        #[arg(short, long)]
        increment: bool,

        /// Font size in points (prefix with + or - for a relative change).
        #[arg(value_parser = parse_font_size, allow_hyphen_values = true)]
        size: String,
    },

    /// Change the window layout.
    Layout {
        #[command(flatten)]
        target: WindowTarget,

        /// Layout name, or `last` for the previous one.
        #[arg(value_enum)]
        layout: LayoutArg,
    },

    /// Create or remove text markers.
    Marker {
        #[command(flatten)]
        target: WindowTarget,

        /// Remove markers instead of creating one.
        #[arg(short, long)]
        remove: bool,

        /// Marker spec: TYPE NUM PATTERN (e.g. text 1 ERROR).
        #[arg(allow_hyphen_values = true)]
        spec: Vec<String>,
    },

    /// Send a signal to a window's child process.
    Signal {
        #[command(flatten)]
        target: WindowTarget,

        /// Signal name or number (SIGINT, term, 9 ...).
        #[arg(default_value = "SIGINT", value_parser = parse_signal)]
        signal: String,
    },

    /// Reload kitty's configuration.
    Reload {
        /// Config file to load instead of the default.
        config: Option<String>,
    },

    /// Run a kitty mappable action.
    Action {
        /// Action name (e.g. new_tab, next_layout).
        name: String,

        /// Action arguments.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Detach a window or tab.
    Detach {
        #[command(flatten)]
        target: WindowTarget,

        /// Detach a tab instead of a window.
        #[arg(short = 't', long = "tab-id", conflicts_with_all = ["window_id", "pattern"])]
        tab_id: Option<u64>,

        /// Destination tab or OS window (e.g. new, id:3).
        #[arg(long = "target")]
        destination: Option<String>,
    },

    /// Markdown summary of all windows with their recent output.
    Summary {
        /// Lines of output to show per window.
        #[arg(short = 'n', long, default_value = "20")]
        lines: usize,

        /// What text to get from each window.
        #[arg(short, long, value_enum, default_value_t)]
        extent: Extent,

        /// Include the window running this command.
        #[arg(long)]
        include_self: bool,
    },
}

/// What a subcommand asks of kitty.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// One remote-control request.
    Single(Request),
    /// `ls`, then `get-text` for every window.
    Summary(SummaryOptions),
}

impl Command {
    /// Translate into what to run against kitty.
    ///
    /// `send-text` must already carry its text.
    #[allow(clippy::too_many_lines)] // One arm per subcommand
    pub fn invocation(&self) -> Result<Invocation, CliError> {
        let request = match self {
            Self::Ls { pattern, tab_pattern, .. } => Request::Ls {
                matcher: pattern.clone(),
                tab_matcher: tab_pattern.clone(),
            },
            Self::GetText { target, extent, ansi } => Request::GetText {
                matcher: target.matcher(),
                extent: *extent,
                ansi: *ansi,
            },
            Self::SendText { target, enter, bracketed, all, text, .. } => {
                let mut text = text.clone().ok_or(CliError::MissingText)?;
                if *enter {
                    // kitty unescapes \r in send-text payloads
                    text.push_str("\\r");
                }
                Request::SendText {
                    matcher: target.matcher(),
                    all: *all,
                    bracketed: *bracketed,
                    text,
                }
            }
            Self::SendKey { target, keys } => Request::SendKey {
                matcher: target.matcher(),
                keys: keys.iter().map(|k| normalize_key(k)).collect(),
            },
            Self::Launch { kind, title, cwd, hold, env, cmd } => Request::Launch {
                kind: *kind,
                title: title.clone(),
                cwd: cwd.clone(),
                hold: *hold,
                env: env.clone(),
                cmd: cmd.clone(),
            },
            Self::Focus { tab_id: Some(tab_id), .. } => Request::FocusTab {
                matcher: tab_match(*tab_id),
            },
            Self::Focus { target, tab_id: None } => Request::FocusWindow {
                matcher: target.matcher(),
            },
            Self::Close { tab_id: Some(tab_id), ignore_no_match, .. } => Request::CloseTab {
                matcher: tab_match(*tab_id),
                ignore_no_match: *ignore_no_match,
            },
            Self::Close { target, tab_id: None, ignore_no_match } => Request::CloseWindow {
                matcher: target.matcher(),
                ignore_no_match: *ignore_no_match,
            },
            Self::Resize { target, increment, axis } => Request::ResizeWindow {
                matcher: target.matcher(),
                increment: *increment,
                axis: *axis,
            },
            Self::Scroll { target, amount } => Request::ScrollWindow {
                matcher: target.matcher(),
                amount: scroll_amount(amount),
            },
            Self::SetTitle { tab_id: Some(tab_id), title, .. } => Request::SetTabTitle {
                matcher: tab_match(*tab_id),
                title: title.clone(),
            },
            Self::SetTitle { target, tab_id: None, title } => Request::SetWindowTitle {
                matcher: target.matcher(),
                title: title.clone(),
            },
            Self::Colors { set, file, target, all, .. } => {
                if let Some(file) = file {
                    Request::SetColors {
                        matcher: target.matcher(),
                        all: *all,
                        source: ColorSource::File(file.clone()),
                    }
                } else if !set.is_empty() {
                    Request::SetColors {
                        matcher: target.matcher(),
                        all: *all,
                        source: ColorSource::Pairs(set.clone()),
                    }
                } else {
                    Request::GetColors { matcher: target.matcher() }
                }
            }
            Self::Opacity { all, value } => Request::SetBackgroundOpacity {
                opacity: *value,
                all: *all,
            },
            Self::FontSize { all, increment, size } => Request::SetFontSize {
                size: font_size_arg(size, *increment),
                all: *all,
            },
            Self::Layout { target, layout } => match layout.layout() {
                Some(layout) => Request::GotoLayout { matcher: target.matcher(), layout },
                None => Request::LastUsedLayout,
            },
            Self::Marker { target, remove: true, .. } => Request::RemoveMarker {
                matcher: target.matcher(),
            },
            Self::Marker { target, remove: false, spec } => Request::CreateMarker {
                matcher: target.matcher(),
                spec: marker_spec(spec)?,
            },
            Self::Signal { target, signal } => Request::SignalChild {
                matcher: target.matcher(),
                signal: signal.clone(),
            },
            Self::Reload { config } => Request::LoadConfig { config: config.clone() },
            Self::Action { name, args } => Request::Action {
                name: name.clone(),
                args: args.clone(),
            },
            Self::Detach { tab_id: Some(tab_id), destination, .. } => Request::DetachTab {
                matcher: tab_match(*tab_id),
                target: destination.clone(),
            },
            Self::Detach { target, tab_id: None, destination } => Request::DetachWindow {
                matcher: target.matcher(),
                target: destination.clone(),
            },
            Self::Summary { lines, extent, include_self } => {
                return Ok(Invocation::Summary(SummaryOptions {
                    lines: *lines,
                    extent: *extent,
                    include_self: *include_self,
                }));
            }
        };
        Ok(Invocation::Single(request))
    }

    /// Confirmation printed after a successful mutating command.
    #[must_use]
    pub fn success_message(&self) -> Option<String> {
        let message = match self {
            Self::SendText { .. } => "Text sent successfully",
            Self::SendKey { .. } => "Keys sent successfully",
            Self::Focus { .. } => "Focused successfully",
            Self::Close { .. } => "Closed successfully",
            Self::Resize { .. } => "Resized successfully",
            Self::SetTitle { .. } => "Title set successfully",
            Self::Colors { set, file, .. } if !set.is_empty() || file.is_some() => "Colors set",
            Self::Opacity { .. } => "Opacity set",
            Self::FontSize { .. } => "Font size set",
            Self::Layout { .. } => "Layout changed",
            Self::Marker { remove: true, .. } => "Markers removed",
            Self::Marker { remove: false, .. } => "Marker created",
            Self::Signal { signal, .. } => return Some(format!("Signal {signal} sent")),
            Self::Reload { .. } => "Config reloaded",
            Self::Action { .. } => "Action executed",
            Self::Detach { .. } => "Detached successfully",
            _ => return None,
        };
        Some(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        let mut argv = vec!["kitctl"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("valid arguments").command
    }

    fn request(args: &[&str]) -> Request {
        match parse(args).invocation().expect("translates") {
            Invocation::Single(request) => request,
            Invocation::Summary(opts) => panic!("expected a single request, got {opts:?}"),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_normalize_key_modifier_formats() {
        assert_eq!(normalize_key("ctrl+c"), "ctrl+c");
        assert_eq!(normalize_key("ctrl-c"), "ctrl+c");
        assert_eq!(normalize_key("CTRL-C"), "ctrl+c");
        assert_eq!(normalize_key("C-x"), "ctrl+x");
        assert_eq!(normalize_key("M-x"), "alt+x");
        assert_eq!(normalize_key("control+shift+t"), "ctrl+shift+t");
        assert_eq!(normalize_key("cmd+opt+i"), "super+alt+i");
        assert_eq!(normalize_key("ctrl++"), "ctrl+plus");
        assert_eq!(normalize_key("ctrl--"), "ctrl+minus");
        assert_eq!(normalize_key("ctrl+-"), "ctrl+minus");
        assert_eq!(normalize_key("M-C-x"), "alt+ctrl+x");
    }

    #[test]
    fn test_normalize_key_caret_format() {
        assert_eq!(normalize_key("^c"), "ctrl+c");
        assert_eq!(normalize_key("^C"), "ctrl+c");
        assert_eq!(normalize_key("^"), "^");
    }

    #[test]
    fn test_normalize_key_aliases() {
        assert_eq!(normalize_key("esc"), "escape");
        assert_eq!(normalize_key("Return"), "enter");
        assert_eq!(normalize_key("pgup"), "page_up");
        assert_eq!(normalize_key("page-down"), "page_down");
        assert_eq!(normalize_key("ctrl+esc"), "ctrl+escape");
        assert_eq!(normalize_key("shift-pgdn"), "shift+page_down");
        assert_eq!(normalize_key("ctrl-page-down"), "ctrl+page_down");
        assert_eq!(normalize_key("ctrl+shift+page-up"), "ctrl+shift+page_up");
    }

    #[test]
    fn test_normalize_key_passthrough() {
        assert_eq!(normalize_key("f5"), "f5");
        assert_eq!(normalize_key("-"), "-");
        assert_eq!(normalize_key("a"), "a");
        assert_eq!(normalize_key("foo-bar"), "foo-bar");
        assert_eq!(normalize_key("ctrl-"), "ctrl-");
    }

    #[test]
    fn test_scroll_amount() {
        assert_eq!(scroll_amount("page-down"), "1p");
        assert_eq!(scroll_amount("page-up"), "1p-");
        assert_eq!(scroll_amount("line-down"), "1");
        assert_eq!(scroll_amount("line-up"), "1-");
        assert_eq!(scroll_amount("home"), "start");
        assert_eq!(scroll_amount("end"), "end");
        assert_eq!(scroll_amount("-3"), "3-");
        assert_eq!(scroll_amount("-2p"), "2p-");
        assert_eq!(scroll_amount("5"), "5");
        assert_eq!(scroll_amount("-x"), "-x");
    }

    #[test]
    fn test_parse_signal() {
        assert_eq!(parse_signal("SIGINT").as_deref(), Ok("SIGINT"));
        assert_eq!(parse_signal("term").as_deref(), Ok("SIGTERM"));
        assert_eq!(parse_signal("sigkill").as_deref(), Ok("SIGKILL"));
        assert_eq!(parse_signal("9").as_deref(), Ok("SIGKILL"));
        assert!(parse_signal("SIGNOPE").is_err());
        assert!(parse_signal("999").is_err());
    }

    #[test]
    fn test_font_size() {
        assert_eq!(parse_font_size("12").as_deref(), Ok("12"));
        assert_eq!(parse_font_size("+2").as_deref(), Ok("+2"));
        assert_eq!(parse_font_size("-1.5").as_deref(), Ok("-1.5"));
        assert!(parse_font_size("big").is_err());
        assert!(parse_font_size("").is_err());
        assert!(parse_font_size("++2").is_err());
        assert!(parse_font_size("+-2").is_err());
        assert!(parse_font_size("--2").is_err());

        assert_eq!(font_size_arg("2", true), "+2");
        assert_eq!(font_size_arg("-2", true), "-2");
        assert_eq!(font_size_arg("14", false), "14");
    }

    #[test]
    fn test_parse_opacity() {
        assert_eq!(parse_opacity("0.5"), Ok(0.5));
        assert_eq!(parse_opacity("1"), Ok(1.0));
        assert!(parse_opacity("1.5").is_err());
        assert!(parse_opacity("-0.1").is_err());
        assert!(parse_opacity("opaque").is_err());
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("A=1"), Ok(("A".into(), "1".into())));
        assert_eq!(parse_key_value("URL=a=b"), Ok(("URL".into(), "a=b".into())));
        assert_eq!(parse_key_value("EMPTY="), Ok(("EMPTY".into(), String::new())));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_marker_spec() {
        let words = vec!["text 1".to_string(), "ERROR".to_string()];
        assert_eq!(marker_spec(&words).expect("valid"), ["text", "1", "ERROR"]);
        assert!(matches!(marker_spec(&[]), Err(CliError::MissingMarkerSpec)));
        assert!(matches!(
            marker_spec(&["glob 1 x".to_string()]),
            Err(CliError::InvalidMarkerSpec(_))
        ));
        assert!(matches!(marker_spec(&["regex".to_string()]), Err(CliError::InvalidMarkerSpec(_))));
    }

    #[test]
    fn test_window_id_becomes_match_expression() {
        assert_eq!(
            request(&["get-text", "-w", "4", "-e", "all"]),
            Request::GetText { matcher: Some("id:4".into()), extent: Extent::All, ansi: false }
        );
        assert_eq!(
            request(&["get-text", "-m", "title:vim"]),
            Request::GetText { matcher: Some("title:vim".into()), extent: Extent::Screen, ansi: false }
        );
    }

    #[test]
    fn test_window_id_conflicts_with_match() {
        let result = Cli::try_parse_from(["kitctl", "focus", "-w", "1", "-m", "title:x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tab_id_selects_tab_command() {
        assert_eq!(
            request(&["focus", "-t", "3"]),
            Request::FocusTab { matcher: Some("id:3".into()) }
        );
        assert_eq!(
            request(&["close", "-w", "2", "--ignore-no-match"]),
            Request::CloseWindow { matcher: Some("id:2".into()), ignore_no_match: true }
        );
        assert_eq!(
            request(&["set-title", "-t", "1", "logs"]),
            Request::SetTabTitle { matcher: Some("id:1".into()), title: "logs".into() }
        );
        assert_eq!(
            request(&["detach", "-t", "5", "--target", "new"]),
            Request::DetachTab { matcher: Some("id:5".into()), target: Some("new".into()) }
        );
    }

    #[test]
    fn test_close_tab_keeps_ignore_no_match() {
        assert_eq!(
            request(&["close", "-t", "4", "--ignore-no-match"]),
            Request::CloseTab { matcher: Some("id:4".into()), ignore_no_match: true }
        );
    }

    #[test]
    fn test_tab_id_conflicts_with_window_selection() {
        for sub in ["focus", "close", "detach"] {
            assert!(Cli::try_parse_from(["kitctl", sub, "-t", "1", "-m", "title:x"]).is_err());
            assert!(Cli::try_parse_from(["kitctl", sub, "-t", "1", "-w", "2"]).is_err());
        }
        assert!(Cli::try_parse_from(["kitctl", "set-title", "-t", "1", "-m", "title:x", "new"]).is_err());
    }

    #[test]
    fn test_send_text_enter_appends_carriage_return() {
        assert_eq!(
            request(&["send-text", "-w", "1", "-e", "ls"]),
            Request::SendText {
                matcher: Some("id:1".into()),
                all: false,
                bracketed: false,
                text: "ls\\r".into(),
            }
        );
        assert!(matches!(parse(&["send-text"]).invocation(), Err(CliError::MissingText)));
    }

    #[test]
    fn test_send_key_normalizes() {
        assert_eq!(
            request(&["send-key", "ctrl-c", "esc"]),
            Request::SendKey { matcher: None, keys: vec!["ctrl+c".into(), "escape".into()] }
        );
    }

    #[test]
    fn test_launch_parses_env_and_command() {
        assert_eq!(
            request(&["launch", "-t", "tab", "--env", "A=1", "htop", "-d", "5"]),
            Request::Launch {
                kind: LaunchType::Tab,
                title: None,
                cwd: None,
                hold: false,
                env: vec![("A".into(), "1".into())],
                cmd: vec!["htop".into(), "-d".into(), "5".into()],
            }
        );
        assert!(Cli::try_parse_from(["kitctl", "launch", "--env", "bad"]).is_err());
    }

    #[test]
    fn test_scroll_and_resize_translation() {
        assert_eq!(
            request(&["scroll", "-w", "2", "-5"]),
            Request::ScrollWindow { matcher: Some("id:2".into()), amount: "5-".into() }
        );
        assert_eq!(
            request(&["scroll"]),
            Request::ScrollWindow { matcher: None, amount: "1p".into() }
        );
        assert_eq!(
            request(&["resize", "-i", "-2", "-a", "vertical"]),
            Request::ResizeWindow { matcher: None, increment: -2, axis: Axis::Vertical }
        );
    }

    #[test]
    fn test_colors_translation() {
        assert_eq!(request(&["colors"]), Request::GetColors { matcher: None });
        assert_eq!(
            request(&["colors", "--set", "background=#000", "foreground=#fff", "-a"]),
            Request::SetColors {
                matcher: None,
                all: true,
                source: ColorSource::Pairs(vec![
                    ("background".into(), "#000".into()),
                    ("foreground".into(), "#fff".into()),
                ]),
            }
        );
        assert!(Cli::try_parse_from(["kitctl", "colors", "--get", "--file", "x.conf"]).is_err());
    }

    #[test]
    fn test_appearance_translation() {
        assert_eq!(
            request(&["font-size", "-i", "2"]),
            Request::SetFontSize { size: "+2".into(), all: false }
        );
        assert_eq!(
            request(&["font-size", "-a", "-1"]),
            Request::SetFontSize { size: "-1".into(), all: true }
        );
        assert!(Cli::try_parse_from(["kitctl", "opacity", "2"]).is_err());
    }

    #[test]
    fn test_layout_translation() {
        assert_eq!(request(&["layout", "last"]), Request::LastUsedLayout);
        assert_eq!(
            request(&["layout", "grid"]),
            Request::GotoLayout { matcher: None, layout: Layout::Grid }
        );
    }

    #[test]
    fn test_signal_translation() {
        assert_eq!(
            request(&["signal", "-w", "3", "term"]),
            Request::SignalChild { matcher: Some("id:3".into()), signal: "SIGTERM".into() }
        );
        assert_eq!(
            request(&["signal"]),
            Request::SignalChild { matcher: None, signal: "SIGINT".into() }
        );
        assert!(Cli::try_parse_from(["kitctl", "signal", "bogus"]).is_err());
    }

    #[test]
    fn test_ls_is_a_single_request() {
        assert_eq!(
            request(&["ls", "-m", "title:vim", "-t", "id:2"]),
            Request::Ls { matcher: Some("title:vim".into()), tab_matcher: Some("id:2".into()) }
        );
        assert_eq!(request(&["ls", "-w"]), Request::Ls { matcher: None, tab_matcher: None });
    }

    #[test]
    fn test_summary_invocation() {
        assert_eq!(
            parse(&["summary", "-n", "5", "--include-self"]).invocation().expect("translates"),
            Invocation::Summary(SummaryOptions {
                lines: 5,
                extent: Extent::Screen,
                include_self: true,
            })
        );
    }

    #[test]
    fn test_success_messages() {
        assert_eq!(parse(&["focus", "-w", "1"]).success_message().as_deref(), Some("Focused successfully"));
        assert_eq!(parse(&["signal", "kill"]).success_message().as_deref(), Some("Signal SIGKILL sent"));
        assert_eq!(parse(&["colors"]).success_message(), None);
        assert_eq!(parse(&["scroll"]).success_message(), None);
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from(["kitctl", "--to", "unix:/tmp/k", "--timeout", "5", "-j", "ls"])
            .expect("valid");
        assert_eq!(cli.to.as_deref(), Some("unix:/tmp/k"));
        assert_eq!(cli.timeout, 5);
        assert!(cli.json);
    }

    #[test]
    fn test_timeout_must_be_positive() {
        assert!(Cli::try_parse_from(["kitctl", "--timeout", "0", "ls"]).is_err());
        let cli = Cli::try_parse_from(["kitctl", "--timeout", "1", "ls"]).expect("valid");
        assert_eq!(cli.timeout, 1);
    }
}
