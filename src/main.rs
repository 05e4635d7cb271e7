//! VRCar entrypoint
//!
//! Two modes, sharing one wire protocol:
//!
//! - `vrcar server` - robot daemon: listens on the camera and control
//!   ports, streams frames, executes commands.
//! - `vrcar client <address>` - operator console: connects to a robot,
//!   merges provider input, sends control diffs.

use std::env;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vrcar::config::AppConfig;
use vrcar::error::Result;
use vrcar::{console, robot};

const USAGE: &str = "\
usage: vrcar server [-b ADDRESS] [--camera-port PORT] [--controls-port PORT] [-c CONFIG]
       vrcar client ADDRESS [--camera-port PORT] [--controls-port PORT] [-c CONFIG]";

struct Args {
    mode: String,
    /// Bind address (server) or connect address (client)
    address: String,
    camera_port: Option<u16>,
    controls_port: Option<u16>,
    config_path: Option<String>,
}

fn parse_args() -> std::result::Result<Args, String> {
    let argv: Vec<String> = env::args().collect();
    let mode = argv.get(1).cloned().ok_or("missing mode")?;
    if mode != "server" && mode != "client" {
        return Err(format!("unknown mode: {mode}"));
    }

    let mut address = if mode == "server" {
        Some("0.0.0.0".to_string())
    } else {
        None
    };
    let mut camera_port = None;
    let mut controls_port = None;
    let mut config_path = None;

    let mut i = 2;
    while i < argv.len() {
        let arg = argv[i].as_str();
        let mut flag_value = |name: &str| -> std::result::Result<String, String> {
            i += 1;
            argv.get(i)
                .cloned()
                .ok_or_else(|| format!("{name} requires a value"))
        };
        match arg {
            "-b" | "--bind" if mode == "server" => address = Some(flag_value(arg)?),
            "--camera-port" => {
                camera_port = Some(parse_port(arg, &flag_value(arg)?)?);
            }
            "--controls-port" => {
                controls_port = Some(parse_port(arg, &flag_value(arg)?)?);
            }
            "-c" | "--config" => config_path = Some(flag_value(arg)?),
            other if !other.starts_with('-') && mode == "client" && address.is_none() => {
                address = Some(other.to_string());
            }
            other => return Err(format!("unexpected argument: {other}")),
        }
        i += 1;
    }

    let address = address.ok_or("client mode requires an address")?;
    Ok(Args {
        mode,
        address,
        camera_port,
        controls_port,
        config_path,
    })
}

fn parse_port(flag: &str, value: &str) -> std::result::Result<u16, String> {
    value
        .parse()
        .map_err(|_| format!("{flag}: invalid port: {value}"))
}

fn main() -> Result<()> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("vrcar: {msg}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let config = match &args.config_path {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    log::info!("vrcar v{} starting ({} mode)", env!("CARGO_PKG_VERSION"), args.mode);
    if let Some(path) = &args.config_path {
        log::info!("Using config: {}", path);
    }

    let camera_port = args.camera_port.unwrap_or(config.network.camera_port);
    let controls_port = args.controls_port.unwrap_or(config.network.controls_port);

    // User interrupt is the normal, non-error shutdown path.
    let running = Arc::new(AtomicBool::new(true));
    setup_signal_handler(Arc::clone(&running));

    if args.mode == "server" {
        let camera_listener = TcpListener::bind((args.address.as_str(), camera_port))?;
        let controls_listener = TcpListener::bind((args.address.as_str(), controls_port))?;
        log::info!(
            "Listening on {} (camera: {}, controls: {})",
            args.address,
            camera_port,
            controls_port
        );

        let capture = robot::create_capture(&config)?;
        let pwm = robot::create_pwm(&config)?;
        robot::run(camera_listener, controls_listener, capture, pwm, running)
    } else {
        let composer = console::default_providers(Arc::clone(&running));
        console::run(
            &args.address,
            camera_port,
            controls_port,
            composer,
            running,
        )
    }
}

fn setup_signal_handler(running: Arc<AtomicBool>) {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    std::thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            let mut signals = match Signals::new([SIGINT, SIGTERM]) {
                Ok(signals) => signals,
                Err(e) => {
                    log::error!("Failed to register signal handlers: {}", e);
                    return;
                }
            };
            if let Some(sig) = signals.forever().next() {
                log::info!("Received signal {:?}, shutting down", sig);
                running.store(false, Ordering::Relaxed);
            }
        })
        .expect("Failed to spawn signal handler thread");
}
