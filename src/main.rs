//! kitctl - convenience CLI over kitty's remote control

use chrono::Local;
use clap::Parser;
use kitctl::summary::{self, SummaryOptions};
use kitctl::{Cli, Command, Invocation, Kitten, KittenError, Request, view, watch};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("kitctl=debug")
    } else {
        EnvFilter::new("kitctl=warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let kitten = Kitten::new(&cli.kitten)
        .with_to(cli.to.clone())
        .with_timeout(Duration::from_secs(cli.timeout));

    let result = run(&kitten, cli.json, cli.command).await;

    if let Err(e) = result {
        std::process::exit(report_error(e.as_ref()));
    }
}

/// Print an error the way the user expects and return the exit code.
///
/// kitten's own stderr is relayed verbatim with its exit status.
fn report_error(e: &(dyn std::error::Error + 'static)) -> i32 {
    match e.downcast_ref::<KittenError>() {
        Some(KittenError::Failed { code, stderr }) if !stderr.trim().is_empty() => {
            eprint!("{stderr}");
            if !stderr.ends_with('\n') {
                eprintln!();
            }
            *code
        }
        Some(err) => {
            error!("{}", err);
            err.exit_code()
        }
        None => {
            error!("{}", e);
            1
        }
    }
}

async fn run(kitten: &Kitten, json: bool, mut cmd: Command) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::SendText { text, stdin, .. } = &mut cmd
        && (*stdin || text.is_none())
    {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        *text = Some(buf);
    }

    let request = match cmd.invocation()? {
        Invocation::Single(request) => request,
        Invocation::Summary(opts) => return run_summary(kitten, opts).await,
    };

    match &cmd {
        Command::Ls { watch, interval, pattern, tab_pattern, toon } => {
            let listing = if json || pattern.is_some() || tab_pattern.is_some() {
                Listing::Json
            } else if *toon {
                Listing::Toon
            } else {
                Listing::Tree
            };
            let interval = watch.then(|| Duration::from_secs(*interval));
            run_ls(kitten, &request, listing, interval).await?;
        }
        Command::GetText { .. } => {
            let text = kitten.call(&request).await?;
            let mut stdout = std::io::stdout();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        Command::Launch { .. } => {
            let id = kitten.launch(&request).await?;
            if json {
                println!("{}", serde_json::json!({ "window_id": id }));
            } else {
                println!("Launched window ID: {id}");
            }
        }
        Command::Colors { .. } if request.is_query() => {
            let stdout = kitten.call(&request).await?;
            let colors = view::parse_colors(&stdout);
            if json {
                println!("{}", serde_json::to_string_pretty(&view::colors_json(&colors))?);
            } else {
                println!("{}", view::render_colors(&colors));
            }
        }
        _ => {
            let stdout = kitten.call(&request).await?;
            match cmd.success_message() {
                Some(message) => println!("{message}"),
                None if !stdout.trim().is_empty() => print!("{stdout}"),
                None => {}
            }
        }
    }

    Ok(())
}

/// How `ls` presents its result.
#[derive(Debug, Clone, Copy)]
enum Listing {
    /// kitty's document, pretty-printed (used for `--json` and any match).
    Json,
    Toon,
    Tree,
}

/// Print an `ls` listing once, or keep refreshing it every `interval`.
async fn run_ls(
    kitten: &Kitten,
    request: &Request,
    listing: Listing,
    interval: Option<Duration>,
) -> Result<(), Box<dyn std::error::Error>> {
    let home = dirs::home_dir();
    let home = home.as_deref();

    let render = move || async move {
        let frame = match listing {
            Listing::Json => {
                let value = kitten.ls_json(request).await?;
                serde_json::to_string_pretty(&value).map_err(KittenError::InvalidJson)?
            }
            Listing::Toon => view::render_toon(&kitten.ls().await?),
            Listing::Tree => view::render_tree(&kitten.ls().await?, Local::now(), home),
        };
        Ok::<_, KittenError>(frame)
    };

    if let Some(interval) = interval {
        debug!(?interval, "starting watch mode");
        return watch::watch(interval, &mut std::io::stdout(), render).await;
    }
    println!("{}", render().await?);
    Ok(())
}

async fn run_summary(kitten: &Kitten, opts: SummaryOptions) -> Result<(), Box<dyn std::error::Error>> {
    let reports = summary::collect(kitten, opts).await?;
    println!("{}", summary::render(&reports, opts, Local::now()));
    Ok(())
}
