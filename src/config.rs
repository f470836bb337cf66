// config.rs - configuration
//
// simple-irc-server - simple IRC server
// Copyright (C) 2022  Mateusz Szpakowski
//
// This library is free software; you can redistribute it and/or
// modify it under the terms of the GNU Lesser General Public
// License as published by the Free Software Foundation; either
// version 2.1 of the License, or (at your option) any later version.
//
// This library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public
// License along with this library; if not, write to the Free Software
// Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301  USA

use clap::Parser;
use serde_derive::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

use crate::utils::*;

pub(crate) const DEFAULT_CONFIG_PATH: &str = "loop-ircd.toml";

#[derive(clap::Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub(crate) struct Cli {
    #[clap(short, long, help = "Configuration file path")]
    pub(crate) config: Option<String>,
    #[clap(short, long, help = "Listen bind address")]
    pub(crate) listen: Option<IpAddr>,
    #[clap(short, long, help = "Listen port")]
    pub(crate) port: Option<u16>,
    #[clap(short = 'n', long, help = "Server name")]
    pub(crate) name: Option<String>,
    #[clap(short = 'N', long, help = "Network")]
    pub(crate) network: Option<String>,
    #[clap(short, long, help = "DNS lookup if client connects")]
    pub(crate) dns_lookup: bool,
    #[clap(short = 'D', long, help = "Channel database path")]
    pub(crate) database: Option<String>,
    #[clap(short, long, help = "Message of the day file path")]
    pub(crate) motd: Option<String>,
    #[clap(short = 'P', long, help = "Generate password hash and exit")]
    pub(crate) gen_password_hash: bool,
}

impl Cli {
    pub(crate) fn parse_args() -> Cli {
        Cli::parse()
    }
}

#[derive(PartialEq, Eq, Serialize, Deserialize, Debug, Validate, Clone)]
pub(crate) struct OperatorConfig {
    #[validate(custom = "validate_username")]
    pub(crate) name: String,
    #[validate(custom = "validate_password_hash")]
    pub(crate) password: String,
}

#[derive(PartialEq, Eq, Serialize, Deserialize, Debug, Validate, Clone)]
pub(crate) struct TheaterConfig {
    #[validate(custom = "validate_channel")]
    pub(crate) name: String,
    #[validate(custom = "validate_password_hash")]
    pub(crate) password: String,
}

/// Main configuration structure.
#[derive(PartialEq, Eq, Serialize, Deserialize, Debug, Validate, Clone)]
#[serde(default)]
pub(crate) struct MainConfig {
    #[validate(contains = ".")]
    pub(crate) name: String,
    pub(crate) info: String,
    pub(crate) listen: IpAddr,
    pub(crate) port: u16,
    pub(crate) network: String,
    #[validate(custom = "validate_password_hash")]
    pub(crate) password: Option<String>,
    pub(crate) motd: Option<String>,
    pub(crate) database: Option<String>,
    pub(crate) max_connections: Option<usize>,
    #[validate(range(min = 1))]
    pub(crate) max_nickname_len: usize,
    #[validate(range(min = 1))]
    pub(crate) idle_timeout: u64,
    #[validate(range(min = 1))]
    pub(crate) quit_timeout: u64,
    #[validate(range(min = 1))]
    pub(crate) whowas_length: usize,
    pub(crate) dns_lookup: bool,
    pub(crate) log_level: Option<String>,
    #[validate]
    pub(crate) operators: Option<Vec<OperatorConfig>>,
    #[validate]
    pub(crate) theaters: Option<Vec<TheaterConfig>>,
}

impl MainConfig {
    pub(crate) fn new(cli: Cli) -> Result<MainConfig, Box<dyn Error>> {
        let mut config = match cli.config.as_deref() {
            Some(path) => Self::read_from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::read_from_file(DEFAULT_CONFIG_PATH)?
            }
            None => MainConfig::default(),
        };
        // modify configuration by CLI options
        if let Some(addr) = cli.listen {
            config.listen = addr;
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(name) = cli.name {
            config.name = name;
        }
        if let Some(network) = cli.network {
            config.network = network;
        }
        if let Some(database) = cli.database {
            config.database = Some(database);
        }
        if let Some(motd) = cli.motd {
            config.motd = Some(motd);
        }
        config.dns_lookup = config.dns_lookup || cli.dns_lookup;

        config.validate()?;
        Ok(config)
    }

    fn read_from_file(path: &str) -> Result<MainConfig, Box<dyn Error>> {
        let config_str = fs::read_to_string(path)?;
        Ok(toml::from_str(&config_str)?)
    }

    pub(crate) fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }

    pub(crate) fn quit_timeout(&self) -> Duration {
        Duration::from_secs(self.quit_timeout)
    }

    pub(crate) fn operator_password(&self, name: &str) -> Option<&str> {
        let name = Name::new(name);
        self.operators.as_ref().and_then(|ops| {
            ops.iter()
                .find(|op| Name::new(op.name.as_str()) == name)
                .map(|op| op.password.as_str())
        })
    }

    pub(crate) fn theater_password(&self, channel: &str) -> Option<&str> {
        let channel = Name::new(channel);
        self.theaters.as_ref().and_then(|theaters| {
            theaters
                .iter()
                .find(|t| Name::new(t.name.as_str()) == channel)
                .map(|t| t.password.as_str())
        })
    }
}

impl Default for MainConfig {
    fn default() -> Self {
        MainConfig {
            name: "irc.irc".to_string(),
            info: "This is IRC server".to_string(),
            listen: IpAddr::from([127, 0, 0, 1]),
            port: 6667,
            network: "IRCnetwork".to_string(),
            password: None,
            motd: None,
            database: None,
            max_connections: None,
            max_nickname_len: 20,
            idle_timeout: 60,
            quit_timeout: 60,
            whowas_length: 100,
            dns_lookup: false,
            log_level: None,
            operators: None,
            theaters: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::env::temp_dir;

    struct TempFileHandle {
        path: String,
    }

    impl TempFileHandle {
        fn new(path: &str) -> TempFileHandle {
            TempFileHandle {
                path: temp_dir().join(path).to_string_lossy().to_string(),
            }
        }
    }

    impl Drop for TempFileHandle {
        fn drop(&mut self) {
            let _ = fs::remove_file(self.path.as_str());
        }
    }

    fn cli_for(path: Option<String>) -> Cli {
        Cli {
            config: path,
            listen: None,
            port: None,
            name: None,
            network: None,
            dns_lookup: false,
            database: None,
            motd: None,
            gen_password_hash: false,
        }
    }

    #[test]
    fn test_mainconfig_new() {
        let file_handle = TempFileHandle::new("loop_ircd_temp_config.toml");
        let op_hash = argon2_hash_password("top_secret").unwrap();
        let theater_hash = argon2_hash_password("stage_pass").unwrap();
        fs::write(
            file_handle.path.as_str(),
            format!(
                r##"
name = "irci.localhost"
info = "This is IRCI server"
listen = "127.0.0.1"
port = 6668
network = "IRCInetwork"
motd = "motd.txt"
database = "channels.db"
max_connections = 4000
idle_timeout = 30
whowas_length = 10

[[operators]]
name = "matiszpaki"
password = "{}"

[[theaters]]
name = "#stage"
password = "{}"
"##,
                op_hash, theater_hash
            ),
        )
        .unwrap();

        let mut cli = cli_for(Some(file_handle.path.clone()));
        cli.port = Some(7000);
        let config = MainConfig::new(cli).unwrap();
        assert_eq!("irci.localhost", config.name);
        assert_eq!(7000, config.port);
        assert_eq!("IRCInetwork", config.network);
        assert_eq!(Some("motd.txt".to_string()), config.motd);
        assert_eq!(Some("channels.db".to_string()), config.database);
        assert_eq!(Some(4000), config.max_connections);
        assert_eq!(Duration::from_secs(30), config.idle_timeout());
        // defaults for missing fields
        assert_eq!(Duration::from_secs(60), config.quit_timeout());
        assert_eq!(20, config.max_nickname_len);
        assert_eq!(10, config.whowas_length);
        assert_eq!(Some(op_hash.as_str()), config.operator_password("MatiSzpaki"));
        assert_eq!(None, config.operator_password("nobody"));
        assert_eq!(Some(theater_hash.as_str()), config.theater_password("#STAGE"));
    }

    #[test]
    fn test_mainconfig_validation() {
        let file_handle = TempFileHandle::new("loop_ircd_temp_config2.toml");
        fs::write(
            file_handle.path.as_str(),
            r##"
name = "ircilocalhost"
"##,
        )
        .unwrap();
        assert!(MainConfig::new(cli_for(Some(file_handle.path.clone()))).is_err());

        // theater names must be channels
        fs::write(
            file_handle.path.as_str(),
            format!(
                r##"
[[theaters]]
name = "stage"
password = "{}"
"##,
                argon2_hash_password("x").unwrap()
            ),
        )
        .unwrap();
        assert!(MainConfig::new(cli_for(Some(file_handle.path.clone()))).is_err());

        // passwords must be hashed
        fs::write(
            file_handle.path.as_str(),
            r##"
password = "plain"
"##,
        )
        .unwrap();
        assert!(MainConfig::new(cli_for(Some(file_handle.path.clone()))).is_err());
    }
}
