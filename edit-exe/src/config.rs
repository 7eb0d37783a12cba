//! User configuration options.

use crate::{BASE_DIR, CLIOptions};
use dirs::config_dir;
use mapedit::log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs::{File, OpenOptions, create_dir},
    io::{Read, Write},
    path::PathBuf,
};

const LOG_TAG: &str = "UserConfig";

fn get_cfg_file() -> PathBuf {
    let mut dir =
        config_dir().unwrap_or_else(|| panic!("{}: Couldn't open user config dir", LOG_TAG));
    dir.push(BASE_DIR);
    if !dir.exists() {
        create_dir(&dir)
            .unwrap_or_else(|e| panic!("{}: Couldn't create {:?}: {}", LOG_TAG, dir, e));
    }
    dir.push("user.toml");
    dir
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Strategy {
    /// Flood the sector graph through two-sided linedefs
    Portal,
    /// Walk the prebuilt BSP tree (falls back to portals without one)
    Bsp,
    /// Run both and cross-check the resulting sector sets
    #[default]
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub strategy: Strategy,
    pub grid_size: i32,
    pub rooms: u32,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            grid_size: 32,
            rooms: 3,
        }
    }
}

impl UserConfig {
    /// `load` will attempt to read the config, and recreate it if parsing
    /// fails
    pub fn load() -> Self {
        let path = get_cfg_file();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.clone())
            .unwrap_or_else(|e| panic!("Couldn't open {:?}, {}", path, e));
        let mut buf = String::new();
        if let Ok(read_len) = file.read_to_string(&mut buf) {
            if read_len == 0 {
                return UserConfig::create_default(&mut file);
            } else {
                if let Ok(data) = toml::from_str(&buf) {
                    info!(target: LOG_TAG, "Loaded user config file");
                    return data;
                }
                warn!("Could not deserialise {:?}, recreating config", path);
            }
        }
        UserConfig::create_default(&mut file)
    }

    fn create_default(file: &mut File) -> Self {
        let config = UserConfig::default();
        // Should be okay to unwrap this as is since it is a Default
        let data = toml::to_string(&config).unwrap();
        file.write_all(data.as_bytes())
            .unwrap_or_else(|_| panic!("Could not write {:?}", get_cfg_file()));
        info!("Created default user config file");
        config
    }

    pub fn write(&self) {
        let mut file = File::create(get_cfg_file()).expect("Couldn't overwrite config");
        let data = toml::to_string_pretty(self).expect("Serialise config failed");
        file.write_all(data.as_bytes())
            .unwrap_or_else(|err| error!("Could not write config: {}", err));
    }

    /// Sync the CLI options and UserConfig with each other
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!("Checking CLI options");

        if let Some(strategy) = cli.strategy {
            if strategy != self.strategy {
                self.strategy = strategy;
            }
        } else {
            cli.strategy = Some(self.strategy);
        }

        if cli.grid_size != 0 && cli.grid_size != self.grid_size {
            self.grid_size = cli.grid_size;
        } else {
            cli.grid_size = self.grid_size;
        }

        if cli.rooms != 0 && cli.rooms != self.rooms {
            self.rooms = cli.rooms;
        } else {
            cli.rooms = self.rooms;
        }
    }
}
