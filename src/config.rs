//! Server configuration

use anyhow::{anyhow, bail, Context, Result};
use joycontrol_shared::{defaults, Controller};
use std::path::PathBuf;
use std::time::Duration;

const USAGE: &str = "usage: joycontrol-socket <JOYCON_R|JOYCON_L|PRO_CONTROLLER> \
                     [-s|--socket PATH] [--nfc PATH] [--nfc-clear-delay SECONDS]";

/// Configuration for the socket server
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Path of the Unix socket
    pub socket_path: PathBuf,
    /// Controller variant to emulate
    pub controller: Controller,
    /// NFC dump loaded at startup, kept until replaced
    pub nfc: Option<PathBuf>,
    /// Default auto-clear delay for `nfc` commands
    pub nfc_clear_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(defaults::SOCKET_PATH),
            controller: Controller::default(),
            nfc: None,
            nfc_clear_delay: defaults::NFC_CLEAR_DELAY,
        }
    }
}

impl ServerConfig {
    /// Build a config from command-line arguments (without the program name)
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut controller = None;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-s" | "--socket" => config.socket_path = PathBuf::from(value(&mut args, &arg)?),
                "--nfc" => config.nfc = Some(PathBuf::from(value(&mut args, &arg)?)),
                "--nfc-clear-delay" => {
                    let raw = value(&mut args, &arg)?;
                    let secs: f64 = raw
                        .parse()
                        .with_context(|| format!("Invalid delay \"{}\"", raw))?;
                    config.nfc_clear_delay = Duration::try_from_secs_f64(secs)
                        .with_context(|| format!("Invalid delay \"{}\"", raw))?;
                }
                "-h" | "--help" => bail!(USAGE),
                flag if flag.starts_with('-') => bail!("Unknown option {}\n{}", flag, USAGE),
                name if controller.is_none() => controller = Some(name.parse::<Controller>()?),
                extra => bail!("Unexpected argument {}\n{}", extra, USAGE),
            }
        }

        config.controller = controller.ok_or_else(|| anyhow!("Missing controller\n{}", USAGE))?;
        Ok(config)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{} requires a value\n{}", flag, USAGE))
}
