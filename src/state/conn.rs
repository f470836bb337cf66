// conn.rs - connection tasks
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

use futures::SinkExt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc::{Sender, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_stream::StreamExt;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::*;

use super::structs::ClientId;
use super::{Envelope, Origin};
use crate::command::*;
use crate::config::MainConfig;
use crate::utils::*;

pub(super) const MAX_LINE_LENGTH: usize = 2000;

/// Deliver envelope into the command channel after a delay.
pub(super) fn spawn_timer(
    commands: Sender<Envelope>,
    after: Duration,
    envelope: Envelope,
) -> JoinHandle<()> {
    let deadline = time::Instant::now() + after;
    tokio::spawn(async move {
        time::sleep_until(deadline).await;
        // event loop gone means shutdown
        let _ = commands.send(envelope).await;
    })
}

#[cfg(feature = "dns_lookup")]
pub(super) async fn lookup_hostname(ip: IpAddr) -> Option<String> {
    use trust_dns_resolver::TokioAsyncResolver;
    let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
        Ok(resolver) => resolver,
        Err(e) => {
            warn!("DNS resolver error: {}", e);
            return None;
        }
    };
    match resolver.reverse_lookup(ip).await {
        Ok(names) => names
            .iter()
            .next()
            .map(|name| name.to_string().trim_end_matches('.').to_string()),
        Err(e) => {
            debug!("Reverse lookup for {} failed: {}", ip, e);
            None
        }
    }
}

#[cfg(not(feature = "dns_lookup"))]
pub(super) async fn lookup_hostname(_ip: IpAddr) -> Option<String> {
    None
}

// password checks happen here, on the connection task: hashing must
// not stall the event loop.
async fn check_credentials(command: Command, config: &MainConfig) -> Command {
    match command {
        Command::PASS {
            password: Credential::Plain(password),
        } => {
            let accepted = match config.password.as_ref() {
                Some(hash) => argon2_verify_password_async(password, hash.clone()).await,
                None => true,
            };
            Command::PASS {
                password: Credential::Verified(accepted),
            }
        }
        Command::OPER {
            name,
            password: Credential::Plain(password),
        } => {
            let accepted = match config.operator_password(&name) {
                Some(hash) => argon2_verify_password_async(password, hash.to_string()).await,
                None => false,
            };
            Command::OPER {
                name,
                password: Credential::Verified(accepted),
            }
        }
        Command::THEATER(TheaterCommand::IDENTIFY {
            channel,
            password: Credential::Plain(password),
        }) => {
            let accepted = match config.theater_password(&channel) {
                Some(hash) => argon2_verify_password_async(password, hash.to_string()).await,
                None => false,
            };
            Command::THEATER(TheaterCommand::IDENTIFY {
                channel,
                password: Credential::Verified(accepted),
            })
        }
        Command::PROXY { hostname } if config.dns_lookup => {
            let resolved = match hostname.parse::<IpAddr>() {
                Ok(ip) => lookup_hostname(ip).await,
                Err(_) => None,
            };
            Command::PROXY {
                hostname: resolved.unwrap_or(hostname),
            }
        }
        command => command,
    }
}

/// Read loop of one client: parse lines and hand commands to the event loop.
pub(super) async fn read_loop(
    client: ClientId,
    mut lines: FramedRead<OwnedReadHalf, IRCLinesCodec>,
    commands: Sender<Envelope>,
    config: Arc<MainConfig>,
    peer: IpAddr,
) {
    let envelope = |command| Envelope {
        client,
        origin: Origin::Connection,
        command,
    };

    if config.dns_lookup {
        if let Some(hostname) = lookup_hostname(peer).await {
            if commands
                .send(envelope(Command::HOSTNAME { hostname }))
                .await
                .is_err()
            {
                return;
            }
        }
    }

    loop {
        let next = lines.next().await;
        let too_long = lines.decoder_mut().take_too_long();
        let command = match next {
            Some(Ok(_)) if too_long => Command::MALFORMED {
                error: CommandError::InputTooLong,
            },
            Some(Ok(line)) => match Command::parse_line(&line) {
                Some(command) => command,
                None => continue,
            },
            Some(Err(e)) => {
                debug!("Read error from {}: {}", client, e);
                Command::QUIT {
                    message: CONN_CLOSED.to_string(),
                    reason: CONN_CLOSED.to_string(),
                }
            }
            None => Command::QUIT {
                message: CONN_CLOSED.to_string(),
                reason: CONN_CLOSED.to_string(),
            },
        };
        let closed = matches!(command, Command::QUIT { .. });
        let command = check_credentials(command, &config).await;
        if commands.send(envelope(command)).await.is_err() || closed {
            break;
        }
    }
}

/// Write loop of one client: ends when every sender is dropped.
pub(super) async fn write_loop(
    client: ClientId,
    mut sink: FramedWrite<OwnedWriteHalf, IRCLinesCodec>,
    mut lines: UnboundedReceiver<String>,
    commands: Sender<Envelope>,
) {
    while let Some(line) = lines.recv().await {
        if let Err(e) = sink.send(line).await {
            debug!("Write error to {}: {}", client, e);
            let _ = commands
                .send(Envelope {
                    client,
                    origin: Origin::Connection,
                    command: Command::QUIT {
                        message: CONN_CLOSED.to_string(),
                        reason: CONN_CLOSED.to_string(),
                    },
                })
                .await;
            break;
        }
    }
}
