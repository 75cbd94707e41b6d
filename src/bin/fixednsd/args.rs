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

//! Implements command-line argument parsing.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Parses the command line arguments.
pub fn parse() -> Args {
    Args::parse()
}

/// A DNS endpoint that answers every query with a fixed response
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the endpoint
    Run(RunArgs),
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Set the configuration file to use
    #[clap(long, conflicts_with_all = ["bind", "ip", "port"], value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Set the bind IP address and port
    #[clap(long, value_name = "IP:PORT")]
    pub bind: Option<SocketAddr>,

    /// Set the bind IP address
    #[clap(long, conflicts_with = "bind", value_name = "IP")]
    pub ip: Option<IpAddr>,

    /// Set the port
    #[clap(long, conflicts_with = "bind", value_name = "PORT")]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_run(argv: &[&str]) -> Result<RunArgs, clap::Error> {
        let args = Args::try_parse_from(["fixednsd", "run"].iter().chain(argv))?;
        match args.command {
            Command::Run(run_args) => Ok(run_args),
        }
    }

    #[test]
    fn run_accepts_ip_and_port() {
        let run_args = parse_run(&["--ip", "::1", "--port", "5353"]).unwrap();
        assert_eq!(run_args.ip, Some("::1".parse().unwrap()));
        assert_eq!(run_args.port, Some(5353));
        assert!(run_args.bind.is_none());
        assert!(run_args.config.is_none());
    }

    #[test]
    fn run_rejects_conflicting_options() {
        assert!(parse_run(&["--bind", "127.0.0.1:2053", "--port", "53"]).is_err());
        assert!(parse_run(&["--config", "fixednsd.toml", "--ip", "127.0.0.1"]).is_err());
    }

    #[test]
    fn clap_configuration_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
