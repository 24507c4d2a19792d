#![warn(missing_docs)]
//! # insta-audit-app binary
//!
//! Line-oriented terminal shell for insta-audit.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use insta_audit_app::{AppConfig, AppError, AuditApp, app_version, open_flag_store};
use insta_audit_client::HttpGenerationTransport;
use insta_audit_core::{Language, Platform};
use insta_audit_gate::{GateError, LinkOpener};
use insta_audit_locale::{native_language_name, strings};
use insta_audit_ui::{Body, ReportView, ViewModel};
use tracing::error;
use tracing_subscriber::EnvFilter;
use url::Url;

const HELP: &str = "commands: unlock | accept | lang <ar|en|he> | platform <instagram|tiktok> | \
user <name> | niche <text> | analyze | reset | help | quit";

/// CLI entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    if let Err(error) = run() {
        error!(%error, "insta-audit exited with an error");
        eprintln!("insta-audit: {error}");
        std::process::exit(1);
    }
}

/// Prints the profile link instead of launching a browser.
struct TerminalLinkOpener;

impl LinkOpener for TerminalLinkOpener {
    fn open(&self, url: &Url) -> Result<(), GateError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, ">> open {url} and follow")
            .map_err(|error| GateError::Link(error.to_string()))
    }
}

fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let transport = HttpGenerationTransport::new(config.api_key.clone(), config.timeout)?;
    let store = open_flag_store(&config.state_path);

    let started = Instant::now();
    let now_ms = || u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let mut app = AuditApp::new(
        &config,
        Box::new(store),
        Arc::new(TerminalLinkOpener),
        Arc::new(transport),
        now_ms(),
    )?;

    println!("insta-audit {}", app_version());
    println!("{HELP}");

    let input = spawn_line_reader();
    let mut shown: Option<ViewModel> = None;
    let mut prompt = true;

    loop {
        let wait = app.drive(now_ms())?;

        let view = app.view();
        if prompt || shown.as_ref() != Some(&view) {
            render(&view, app.gate().profile_url());
            print!("> ");
            io::stdout().flush()?;
            shown = Some(view);
        }

        let line = match wait {
            Some(timeout) => match input.recv_timeout(timeout) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => {
                    prompt = false;
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match input.recv() {
                Ok(line) => line,
                Err(_) => break,
            },
        };
        let line = line?;
        prompt = true;
        app.tick(now_ms())?;

        let (command, argument) = match line.trim().split_once(' ') {
            Some((command, argument)) => (command, argument.trim()),
            None => (line.trim(), ""),
        };

        match command {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "unlock" => app.unlock(now_ms())?,
            "accept" => app.accept_cookies(now_ms())?,
            "lang" => match argument.parse::<Language>() {
                Ok(language) => app.set_language(language),
                Err(error) => println!("{error}"),
            },
            "platform" => match argument.parse::<Platform>() {
                Ok(platform) => app.set_platform(platform),
                Err(error) => println!("{error}"),
            },
            "user" => app.set_username(argument),
            "niche" => app.set_niche(argument),
            "analyze" => {
                println!("{}", strings(app.flow().language()).analyzing);
                if let Err(error) = app.submit() {
                    println!("{error}");
                }
            }
            "reset" => app.reset(),
            other => println!("unknown command `{other}`; {HELP}"),
        }
    }

    app.shutdown(now_ms())
}

/// Reads stdin on its own thread so timers keep firing while the user is idle.
fn spawn_line_reader() -> Receiver<io::Result<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let failed = line.is_err();
            if sender.send(line).is_err() || failed {
                break;
            }
        }
    });
    receiver
}

fn render(view: &ViewModel, profile_url: &Url) {
    let table = strings(view.language);
    println!();
    println!(
        "== {} [{}{}]",
        table.title,
        native_language_name(view.language),
        if view.rtl { ", rtl" } else { "" }
    );

    if view.overlay.lock_overlay {
        println!("## {}", table.lock_title);
        println!("   {}", table.lock_desc);
        println!("   [{}] -> `unlock` ({profile_url})", table.lock_btn);
        return;
    }

    match &view.body {
        Body::Form {
            submit_enabled,
            submit_label,
            error,
        } => {
            println!("{}", table.hero_title);
            if let Some(message) = error {
                println!("!! {message}");
            }
            let state = if *submit_enabled { "ready" } else { "fill in user and niche" };
            println!("[{submit_label}] ({state})");
        }
        Body::Report(report) => render_report(report, view.language),
    }

    if view.overlay.cookie_banner {
        println!("-- {} [{}] -> `accept`", table.cookie_text, table.cookie_accept);
    }
}

fn render_report(report: &ReportView, language: Language) {
    let table = strings(language);
    println!("{}: {}/100 ({:?})", table.score, report.score, report.band);
    println!("{}", report.summary);
    for (heading, critique) in &report.audit {
        println!("\n[{heading}]\n{critique}");
    }

    println!("\n# {}", table.problems_title);
    for problem in &report.problems {
        println!("- ({}) {}: {}", problem.badge, problem.title, problem.description);
    }

    println!("\n# {}", table.solutions_title);
    for solution in &report.solutions {
        println!("{}. {}: {}", solution.number, solution.step, solution.details);
    }

    println!("\n# {}", table.hashtags_title);
    println!("{}", report.hashtags.join(" "));
    println!("\n[{}] -> `reset`", table.reset_btn);
}
