use std::{env, fs::File};

use anyhow::{Context, Result};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::{error, info};
use simplelog::{LevelFilter, WriteLogger};

use tillscan::clock::SystemClock;
use tillscan::config::Settings;
use tillscan::event_source::KeyboardEventSource;
use tillscan::listener::{ScanListener, run_listener_with_event_source};
use tillscan::panic_handler;
use tillscan::submit::{AjaxSubmit, NativeFormSubmit, SubmitStrategy, Submitter};

const USAGE: &str = "Usage: tillscan [--config <path>] [--native] [--write-config <path>]";

struct Args {
    config: Option<String>,
    native: bool,
    write_config: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        native: false,
        write_config: None,
    };
    let mut raw = env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--config" => args.config = Some(raw.next().context(USAGE)?),
            "--write-config" => args.write_config = Some(raw.next().context(USAGE)?),
            "--native" => args.native = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => anyhow::bail!("Unknown argument {other:?}\n{USAGE}"),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let mut settings = Settings::load_or_default(args.config.as_deref());
    settings.apply_env();
    if args.native {
        settings.ajax = false;
    }

    if let Some(path) = &args.write_config {
        settings
            .save_to(path)
            .with_context(|| format!("Failed to write settings to {path}"))?;
        println!("Settings written to {path}");
        return Ok(());
    }

    // Raw mode owns the terminal, so logs go to a file
    WriteLogger::init(
        LevelFilter::Debug,
        simplelog::ConfigBuilder::new()
            .set_max_level(LevelFilter::Debug)
            .add_filter_ignore_str("reqwest")
            .add_filter_ignore_str("hyper")
            .build(),
        File::create(&settings.log_file)
            .with_context(|| format!("Failed to create log file {}", settings.log_file))?,
    )?;

    panic_handler::initialize_panic_handler();

    info!(
        "Starting tillscan against {} (gap {} ms, idle reset {} ms, ajax {})",
        settings.base_url, settings.gap_threshold_ms, settings.idle_reset_ms, settings.ajax
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let native = Box::new(NativeFormSubmit::new(settings.base_url.clone()));
    let ajax = settings.ajax.then(|| {
        Box::new(AjaxSubmit::new(
            settings.base_url.clone(),
            runtime.handle().clone(),
        )) as Box<dyn SubmitStrategy>
    });

    let mut listener = ScanListener::new(
        settings.timings(),
        settings.page(),
        Submitter::new(ajax, native),
    );
    if listener.page().scan_form().is_none() {
        info!("No scan form configured, scans will be dropped");
    }

    println!("tillscan listening for scans on {}. Ctrl+C to quit.", settings.base_url);

    enable_raw_mode().map_err(|e| {
        error!("Failed to enable raw mode: {e}");
        anyhow::anyhow!(
            "Failed to initialize terminal: {e}\n\
             Make sure you are running tillscan in a terminal, not from a pipe or redirection."
        )
    })?;

    let mut event_source = KeyboardEventSource;
    let res = run_listener_with_event_source(&mut listener, &mut event_source, &SystemClock);

    let _ = disable_raw_mode();

    if let Err(err) = res {
        error!("Listener error: {err:?}");
        println!("{err:?}");
    }

    // Give in-flight AJAX submissions a moment to land
    drop(listener);
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));

    info!("Shutting down tillscan");
    Ok(())
}
