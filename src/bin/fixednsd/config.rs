// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implements the daemon configuration file.

use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::Level::Debug;
use log::{debug, log_enabled};
use serde::Deserialize;

use fixedns::server::Server;
use fixedns::thread::{self, ThreadGroup};

use crate::args::RunArgs;

////////////////////////////////////////////////////////////////////////
// CONFIGURATION LOADING                                              //
////////////////////////////////////////////////////////////////////////

/// Loads the configuration from the file given by `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let raw_config = fs::read(path.as_ref()).context("failed to read the configuration file")?;
    let config: Config =
        toml::from_slice(&raw_config).context("failed to parse the configuration file")?;
    log_config_summary(&config);
    Ok(config)
}

/// Loads the configuration from the parsed command line arguments given
/// by `args`.
pub fn load_from_args(args: RunArgs) -> Config {
    let bind = args.bind.unwrap_or_else(|| {
        let ip = args.ip.unwrap_or(DEFAULT_BIND_IP);
        let port = args.port.unwrap_or(DEFAULT_BIND_PORT);
        SocketAddr::new(ip, port)
    });

    let config = Config {
        bind,
        io: default_io_provider_config(),
    };
    log_config_summary(&config);
    config
}

/// Summarizes the configuration in the log, if the debug log level is
/// enabled.
fn log_config_summary(config: &Config) {
    if !log_enabled!(Debug) {
        // Don't compute the message if it will never be printed.
        return;
    }

    let IoProviderConfig::Blocking(ref blocking) = config.io;
    debug!(
        "Configuration loaded:\n\
         Bind address: {}\n\
         I/O provider: {}\n\
         UDP workers:  {}",
        config.bind,
        config.io.name(),
        blocking.udp_workers,
    );
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION FILE STRUCTURE                                       //
////////////////////////////////////////////////////////////////////////

/// The complete configuration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    #[serde(default = "default_io_provider_config")]
    pub io: IoProviderConfig,
}

const DEFAULT_BIND_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_BIND_PORT: u16 = 2053;

fn default_bind() -> SocketAddr {
    SocketAddr::new(DEFAULT_BIND_IP, DEFAULT_BIND_PORT)
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION SECTION: I/O PROVIDERS                               //
////////////////////////////////////////////////////////////////////////

/// An abstraction over all supported I/O providers.
pub trait IoProvider {
    fn start(
        self: Box<Self>,
        server: &Arc<Server>,
        group: &Arc<ThreadGroup>,
    ) -> Result<(), thread::Error>;
}

/// The selection of I/O provider and its configuration.
///
/// To actually create the selected provider with its configuration and
/// bind it to an address, use [`IoProviderConfig::bind_provider`].
#[derive(Debug, Deserialize)]
#[serde(tag = "provider")]
pub enum IoProviderConfig {
    #[serde(rename = "blocking")]
    Blocking(blocking_io::Config),
}

impl IoProviderConfig {
    /// Returns the name of the selected I/O provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blocking(_) => "blocking",
        }
    }

    /// Creates the selected I/O provider with this configuration and
    /// binds it to the provided address.
    pub fn bind_provider(&self, addr: SocketAddr) -> io::Result<Box<dyn IoProvider>> {
        match self {
            Self::Blocking(config) => {
                let io_provider = fixedns::io::BlockingIoProvider::bind(config.into(), [addr])?;
                Ok(Box::new(io_provider))
            }
        }
    }
}

/// Support for the [`BlockingIoProvider`](fixedns::io::BlockingIoProvider).
mod blocking_io {
    use super::*;
    use fixedns::io::{BlockingIoConfig, BlockingIoProvider};

    impl IoProvider for BlockingIoProvider {
        fn start(
            self: Box<Self>,
            server: &Arc<Server>,
            group: &Arc<ThreadGroup>,
        ) -> Result<(), thread::Error> {
            BlockingIoProvider::start(*self, server, group)
        }
    }

    /// Provider configuration for the [`BlockingIoProvider`]. This
    /// mirrors [`BlockingIoConfig`] and can be converted into one; its
    /// purpose is to make the configuration deserializable and to
    /// provide defaults.
    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct Config {
        #[serde(default = "default_udp_workers")]
        pub udp_workers: usize,
    }

    fn default_udp_workers() -> usize {
        1
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                udp_workers: default_udp_workers(),
            }
        }
    }

    impl From<&Config> for BlockingIoConfig {
        fn from(toml_config: &Config) -> Self {
            Self {
                udp_workers_per_socket: toml_config.udp_workers,
            }
        }
    }
}

fn default_io_provider_config() -> IoProviderConfig {
    IoProviderConfig::Blocking(blocking_io::Config::default())
}
