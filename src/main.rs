// main.rs - main program
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

mod command;
mod config;
mod reply;
mod state;
mod store;
mod utils;

use std::error::Error;
use std::process;
use tracing_subscriber::EnvFilter;

use config::*;
use state::run_server;
use store::{ChannelStore, SqliteStore};
use utils::argon2_hash_password;

fn gen_password_hash() -> Result<(), Box<dyn Error>> {
    let password = rpassword::prompt_password("Enter password: ")?;
    println!("{}", argon2_hash_password(&password)?);
    Ok(())
}

fn init_logging(config: &MainConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_level.as_deref().unwrap_or("info"))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(config: MainConfig) -> Result<(), Box<dyn Error>> {
    let store = match config.database.as_ref() {
        Some(path) => Some(Box::new(SqliteStore::open(path)?) as Box<dyn ChannelStore>),
        None => None,
    };
    // control stays alive: the loop stops on a signal
    let (_control, handle) = run_server(config, store).await?;
    handle.await?;
    Ok(())
}

fn main() {
    let cli = Cli::parse_args();
    let result = if cli.gen_password_hash {
        gen_password_hash()
    } else {
        MainConfig::new(cli).and_then(|config| {
            init_logging(&config);
            tokio::runtime::Runtime::new()?.block_on(run(config))
        })
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
