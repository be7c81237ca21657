use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use mediactl::logging::{self, LoggingMode};
use mediactl::{
    Device, DeviceConfig, DeviceKind, Probe, Registry, TvDevice, WaitOptions,
};

pub mod device_selection;

use device_selection::DeviceSelector;

/// Remote control for smart TVs and network speakers
///
/// Devices are found with `discover` and remembered in a JSON registry
/// together with the pairing token each TV issues on first connect.
#[derive(Parser, Debug)]
#[command(name = "mediactl")]
#[command(about = "Remote control for smart TVs and network speakers")]
#[command(version)]
pub struct Args {
    /// Registry file (default: ~/.mediactl.json)
    #[arg(long, global = true, env = "MEDIACTL_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Target device: index, address or name (default: first in the registry)
    #[arg(short, long, global = true, env = "MEDIACTL_DEVICE")]
    pub device: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Timeout in seconds for discovery, pairing and event waits
    #[arg(short, long, global = true, default_value = "5")]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search the network and add new devices to the registry
    Discover,
    /// Show the registry
    Devices,
    /// Print a TV's model, network and power details as JSON
    Info,
    /// List the applications installed on a TV
    List,
    /// Press a remote key, e.g. KEY_HOME
    Key { key: String },
    /// Type text into the focused input field
    Text { text: String },
    /// Show the volume, or set it (0-100)
    Vol { volume: Option<u8> },
    /// Volume up one step
    Volup,
    /// Volume down one step
    Voldown,
    /// Open a web page, or launch an application by id
    Open { target: String },
    /// Play a media URL
    Stream { url: String },
    Play,
    Pause,
    Stop,
    Next,
    Prev,
    /// Print transport state and current track as JSON
    Status,
    /// Turn a TV on, waking it over the network if needed
    Poweron,
    /// Turn a TV off
    Poweroff,
    /// Block until an event containing the given text arrives
    Wait { event: String },
}

impl Args {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        if self.timeout == 0 {
            bail!("Timeout must be positive");
        }

        match self.log_level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => bail!(
                "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
                self.log_level
            ),
        }

        if let Command::Vol { volume: Some(volume) } = self.command {
            if volume > 100 {
                bail!("Volume must be between 0 and 100, got {}", volume);
            }
        }

        Ok(())
    }
}

fn load_registry(args: &Args) -> Result<Registry> {
    let registry = match &args.registry {
        Some(path) => Registry::load(path),
        None => Registry::load_default(),
    };
    registry.context("Failed to load the device registry")
}

fn persist(registry: &mut Registry, device: &Device) -> Result<()> {
    if registry.update(device.descriptor()) {
        registry
            .save()
            .context("Failed to save the device registry")?;
        info!(path = %registry.path().display(), "registry updated");
    }
    Ok(())
}

fn discover(args: &Args, registry: &mut Registry) -> Result<()> {
    let timeout = args.timeout_duration();
    info!("Discovering devices for {}s...", timeout.as_secs());

    let found = mediactl::discover_all(&[Probe::tv(), Probe::speaker()], timeout);
    let added = registry.merge(found);
    registry
        .save()
        .context("Failed to save the device registry")?;

    println!("{} new device(s)", added);
    print!("{}", DeviceSelector::list_devices(registry.devices()));
    Ok(())
}

/// Make sure a TV is up and paired before a remote-input command
fn prepare_tv(tv: &TvDevice) -> Result<()> {
    if !tv.is_alive() {
        bail!(
            "{} at {} is off or unreachable; try `mediactl poweron`",
            tv.descriptor().name,
            tv.descriptor().ip
        );
    }
    if tv.descriptor().token.is_none() {
        println!("Accept the connection on the TV screen...");
        tv.init().context("Pairing with the TV failed")?;
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut registry = load_registry(&args)?;

    match &args.command {
        Command::Discover => return discover(&args, &mut registry),
        Command::Devices => {
            print!("{}", DeviceSelector::list_devices(registry.devices()));
            return Ok(());
        }
        _ => {}
    }

    let descriptor = DeviceSelector::select(&registry, args.device.as_deref())?;
    info!(name = %descriptor.name, ip = %descriptor.ip, "selected device");

    let config = DeviceConfig::default()
        .with_init_timeout(args.timeout_duration().max(Duration::from_secs(30)));
    let device = Device::with_config(descriptor, config).context("Failed to set up the device")?;

    if let Device::Tv(tv) = &device {
        match args.command {
            Command::Poweron | Command::Poweroff | Command::Wait { .. } => {}
            Command::Info => {}
            Command::List
            | Command::Key { .. }
            | Command::Text { .. }
            | Command::Volup
            | Command::Voldown
            | Command::Open { .. } => prepare_tv(tv)?,
            _ => {
                if !tv.is_alive() {
                    bail!("{} is off or unreachable", tv.descriptor().name);
                }
            }
        }
    }

    let result = execute(&args, &device);
    if let Err(e) = persist(&mut registry, &device) {
        warn!("{:#}", e);
    }
    result
}

fn execute(args: &Args, device: &Device) -> Result<()> {
    match &args.command {
        Command::Discover | Command::Devices => {}
        Command::List => {
            for app in device.list_apps()? {
                println!("{} - {}", app.app_id, app.name);
            }
        }
        Command::Info => {
            let info = device.info()?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Key { key } => device.key(key)?,
        Command::Text { text } => device.text(text)?,
        Command::Vol { volume: None } => println!("volume is {}", device.volume()?),
        Command::Vol { volume: Some(volume) } => device.set_volume(*volume)?,
        Command::Volup => device.volume_up()?,
        Command::Voldown => device.volume_down()?,
        Command::Open { target } => device.open(target)?,
        Command::Stream { url } => device.stream(url)?,
        Command::Play => device.play()?,
        Command::Pause => device.pause()?,
        Command::Stop => device.stop()?,
        Command::Next => device.next()?,
        Command::Prev => device.previous()?,
        Command::Status => {
            let status = device.status()?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Poweron => {
            device.power_on().context("Failed to power on")?;
            if device.kind() == DeviceKind::Tv && device.token().is_none() {
                device.init().context("Pairing with the TV failed")?;
            }
        }
        Command::Poweroff => device.power_off()?,
        Command::Wait { event } => match device {
            Device::Tv(tv) => {
                let options = WaitOptions::new().with_deadline(args.timeout_duration());
                tv.session().wait_for_event(event, &options)?;
                println!("{}", event);
            }
            Device::Speaker(_) => bail!("wait is only supported by TVs"),
        },
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;

    logging::init_logging_with_level(LoggingMode::Development, &args.log_level)
        .context("Failed to initialize logging")?;

    run(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["mediactl", "key", "KEY_HOME", "--device", "1", "--timeout", "9"]);

        assert_eq!(args.command, Command::Key { key: "KEY_HOME".to_string() });
        assert_eq!(args.device.as_deref(), Some("1"));
        assert_eq!(args.timeout_duration(), Duration::from_secs(9));
        assert!(args.validate().is_ok());
    }

    #[rstest]
    #[case(&["mediactl", "vol"], Command::Vol { volume: None })]
    #[case(&["mediactl", "vol", "40"], Command::Vol { volume: Some(40) })]
    #[case(&["mediactl", "prev"], Command::Prev)]
    #[case(&["mediactl", "info", "-d", "0"], Command::Info)]
    #[case(&["mediactl", "poweron"], Command::Poweron)]
    #[case(&["mediactl", "wait", "ms.channel.connect"], Command::Wait { event: "ms.channel.connect".to_string() })]
    fn test_commands(#[case] argv: &[&str], #[case] expected: Command) {
        assert_eq!(parse(argv).command, expected);
    }

    #[rstest]
    #[case(&["mediactl", "vol", "101"])]
    #[case(&["mediactl", "play", "--timeout", "0"])]
    #[case(&["mediactl", "play", "--log-level", "loud"])]
    fn test_validate_rejects(#[case] argv: &[&str]) {
        assert!(parse(argv).validate().is_err());
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Args::try_parse_from(["mediactl", "reboot"]).is_err());
    }
}
