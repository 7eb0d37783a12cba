use std::str::FromStr;

use argh::FromArgs;
use mapedit::log;

use crate::config;

/// CLI options for the editor driver
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug
    #[argh(option)]
    pub verbose: Option<log::LevelFilter>,
    /// visibility strategy <portal, bsp, both>
    #[argh(option)]
    pub strategy: Option<config::Strategy>,
    /// editing grid size in map units
    #[argh(option, default = "0")]
    pub grid_size: i32,
    /// number of demo rooms to draw around the hub
    #[argh(option, default = "0")]
    pub rooms: u32,
}

impl FromStr for config::Strategy {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portal" => Ok(Self::Portal),
            "bsp" => Ok(Self::Bsp),
            "both" => Ok(Self::Both),
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "Invalid visibility strategy",
            )),
        }
    }
}
