//! kitctl - convenience CLI over kitty's remote control
//!
//! Wraps `kitten @` with shorter subcommands, window-id shortcuts, a tree
//! view of all windows, a watch mode and a markdown summary of what every
//! window is doing.

// Error documentation is deferred - the errors are self-explanatory from types
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod kitten;
pub mod model;
pub mod request;
pub mod summary;
pub mod view;
pub mod watch;

pub use cli::{Cli, CliError, Command, Invocation, normalize_key};
pub use kitten::{Kitten, KittenError, Output};
pub use model::{OsWindow, Tab, Window};
pub use request::{Axis, Extent, LaunchType, Layout, Request};
pub use summary::{SummaryOptions, WindowReport};
