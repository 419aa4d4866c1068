//! bytebeat — check, render and play bytebeat expressions.

use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytebeat::audio::{AudioEngine, AudioError};
use bytebeat::config::{default_config_path, AppConfig};
use bytebeat::control::{control_channel, ControlEvent, ControlReceiver};
use bytebeat::expr::{parse, Expr};
use bytebeat::interpreter::Interpreter;
use bytebeat::osc::OscListener;
use bytebeat::render::{write_raw, write_wav};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};

/// How often the playback loop wakes to handle control events.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Evaluate bytebeat expressions: one integer formula of `t` per sample.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an expression and print its canonical form.
    Check {
        expr: String,
    },
    /// Write one unsigned byte per tick to stdout (pipe into `aplay`).
    Raw {
        expr: String,
        /// Number of bytes to write; unbounded when omitted.
        #[arg(long)]
        count: Option<u64>,
        /// First value of `t`.
        #[arg(long, default_value_t = 0)]
        start: i32,
    },
    /// Render to a mono 16-bit WAV file.
    Render {
        expr: String,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, default_value_t = 30.0)]
        seconds: f64,
        /// Ticks per second.
        #[arg(long, default_value_t = bytebeat::audio::DEFAULT_RATE)]
        rate: u32,
    },
    /// Play through the default audio device until Ctrl+C.
    Play {
        /// Starting expression; defaults to the config file's, then silence.
        expr: Option<String>,
        /// Ticks per second.
        #[arg(long)]
        rate: Option<u32>,
        #[arg(long)]
        volume: Option<f32>,
        /// Accept expressions and controls over OSC.
        #[arg(long)]
        osc: bool,
        #[arg(long)]
        osc_port: Option<u16>,
        /// Open the device at this sample rate instead of its default.
        #[arg(long)]
        sample_rate: Option<u32>,
        /// Output channels when `--sample-rate` is given (default 2).
        #[arg(long, requires = "sample_rate")]
        channels: Option<u16>,
    },
    /// Manage the config file under `~/.bytebeat/`.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a config file with the default settings.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location.
    Path,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&args.log_level)
        .with_writer(io::stderr)
        .init();

    let result = match args.command {
        Command::Check { expr } => check(&expr),
        Command::Raw { expr, count, start } => raw(&expr, count, start),
        Command::Render {
            expr,
            out,
            seconds,
            rate,
        } => render(&expr, out, seconds, rate),
        Command::Play {
            expr,
            rate,
            volume,
            osc,
            osc_port,
            sample_rate,
            channels,
        } => play(
            expr,
            rate,
            volume,
            osc,
            osc_port,
            sample_rate.map(|sr| (sr, channels.unwrap_or(2))),
        ),
        Command::Config { action } => config(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn check(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let expr = parse(source)?;
    println!("{expr}");
    println!("{} nodes", expr.node_count());
    Ok(())
}

fn raw(source: &str, count: Option<u64>, start: i32) -> Result<(), Box<dyn std::error::Error>> {
    let expr = parse(source)?;
    let written = write_raw(&expr, start, count, io::stdout().lock())?;
    debug!(written, "raw output finished");
    Ok(())
}

fn render(
    source: &str,
    out: PathBuf,
    seconds: f64,
    rate: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut interpreter = Interpreter::new();
    interpreter.set_source(source)?;
    let frames = write_wav(&out, &mut interpreter, seconds, rate.max(1))?;
    info!(frames, path = %out.display(), "wrote WAV");
    Ok(())
}

fn play(
    source: Option<String>,
    rate: Option<u32>,
    volume: Option<f32>,
    osc: bool,
    osc_port: Option<u16>,
    device: Option<(u32, u16)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load();
    if let Some(rate) = rate {
        config.rate = rate;
    }
    if let Some(volume) = volume {
        config.volume = volume;
    }
    if let Some(port) = osc_port {
        config.osc.listen_port = port;
    }

    // Reject a bad starting expression before opening the device.
    let initial = match source.or(config.expression.take()) {
        Some(text) => Some(parse(&text)?),
        None => None,
    };

    let mut engine = match device {
        Some((sample_rate, channels)) => {
            AudioEngine::with_config(sample_rate, channels, config.rate)?
        }
        None => AudioEngine::new(config.rate)?,
    };
    engine.set_volume(config.volume)?;
    match initial {
        Some(expr) => engine.set_expression(expr)?,
        None => info!("no expression yet, playing silence"),
    }

    let (sender, receiver) = control_channel();
    let _listener = if osc {
        Some(OscListener::start(&config.osc, sender)?)
    } else {
        drop(sender);
        None
    };

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

    info!(
        sample_rate = engine.sample_rate(),
        channels = engine.channels(),
        "playing, Ctrl+C to stop"
    );

    while running.load(Ordering::SeqCst) {
        handle_events(&mut engine, &receiver);
        engine.collect_retired();
        thread::sleep(POLL_INTERVAL);
    }

    engine.pause()?;
    info!("stopped");
    Ok(())
}

/// Apply pending control events. Expressions are parsed here, never on the
/// audio thread; a rejected expression leaves the current one playing.
fn handle_events(engine: &mut AudioEngine, receiver: &ControlReceiver) {
    while let Some(event) = receiver.poll() {
        let result = match event {
            ControlEvent::SetExpression(source) => match parse(&source) {
                Ok(expr) => install(engine, expr, &source),
                Err(e) => {
                    warn!(%source, "rejected expression: {e}");
                    Ok(())
                }
            },
            ControlEvent::SetVolume(volume) => engine.set_volume(volume),
            ControlEvent::SetRate(rate) => engine.set_rate(rate),
            ControlEvent::ResetTime => engine.reset_time(),
        };
        if let Err(e) = result {
            error!("control event dropped: {e}");
        }
    }
}

fn config(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let path = default_config_path().ok_or("no home directory to hold the config file")?;
    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(format!("{} already exists, use --force", path.display()).into());
            }
            AppConfig::default().save_to(&path)?;
            info!(path = %path.display(), "wrote default config");
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn install(engine: &mut AudioEngine, expr: Expr, source: &str) -> Result<(), AudioError> {
    engine.set_expression(expr)?;
    info!(%source, "expression installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn play_device_flags() {
        let args =
            Args::try_parse_from(["bytebeat", "play", "t", "--sample-rate", "44100", "--channels", "1"])
                .unwrap();
        match args.command {
            Command::Play {
                sample_rate,
                channels,
                ..
            } => {
                assert_eq!(sample_rate, Some(44100));
                assert_eq!(channels, Some(1));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Args::try_parse_from(["bytebeat", "play", "--channels", "1"]).is_err());
    }

    #[test]
    fn config_subcommands() {
        let args = Args::try_parse_from(["bytebeat", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
        let args = Args::try_parse_from(["bytebeat", "config", "path"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Path
            }
        ));
    }
}
