// conn_cmds.rs - connection commands
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

use super::*;

const SUPPORTED_CAPS: &str = "multi-prefix";

impl ServerState {
    pub(super) fn process_cap(&mut self, id: ClientId, subcommand: CapCommand, caps: Vec<String>) {
        let client = match self.clients.get_mut(&id) {
            Some(client) => client,
            None => return,
        };
        let prefix = format!(":{} CAP {}", self.server_name, client.nick_or_star());
        match subcommand {
            CapCommand::LS => {
                if !client.registered {
                    client.cap_state = CapState::Negotiating;
                }
                client.send(format!("{} LS :{}", prefix, SUPPORTED_CAPS));
            }
            CapCommand::LIST => {
                let enabled = if client.multi_prefix { SUPPORTED_CAPS } else { "" };
                client.send(format!("{} LIST :{}", prefix, enabled));
            }
            CapCommand::REQ => {
                if !client.registered {
                    client.cap_state = CapState::Negotiating;
                }
                // accept only if all capabilities are known
                let mut multi_prefix = client.multi_prefix;
                let known = caps.iter().all(|cap| match cap.as_str() {
                    "multi-prefix" => {
                        multi_prefix = true;
                        true
                    }
                    "-multi-prefix" => {
                        multi_prefix = false;
                        true
                    }
                    _ => false,
                });
                if known {
                    client.multi_prefix = multi_prefix;
                    client.send(format!("{} ACK :{}", prefix, caps.join(" ")));
                } else {
                    client.send(format!("{} NAK :{}", prefix, caps.join(" ")));
                }
            }
            CapCommand::CLEAR => {
                let cleared = if client.multi_prefix { "-multi-prefix" } else { "" };
                client.multi_prefix = false;
                client.send(format!("{} ACK :{}", prefix, cleared));
            }
            CapCommand::END => {
                if !client.registered {
                    client.cap_state = CapState::Negotiated;
                    self.try_register(id);
                }
            }
        }
    }

    pub(super) fn process_pass(&mut self, id: ClientId, password: Credential) {
        let client = match self.clients.get_mut(&id) {
            Some(client) => client,
            None => return,
        };
        if client.registered {
            client.reply(ErrAlreadyRegistered462 {
                client: client.nick_or_star(),
            });
        } else if password.is_accepted() {
            client.authorized = true;
        } else {
            client.reply(ErrPasswdMismatch464 {
                client: client.nick_or_star(),
            });
            info!("Bad password from {}", client.peer);
            self.quit_client(id, CONN_BAD_PASSWORD, CONN_BAD_PASSWORD);
        }
    }

    pub(super) fn process_proxy(&mut self, id: ClientId, hostname: String) {
        let client = match self.clients.get_mut(&id) {
            Some(client) => client,
            None => return,
        };
        if !client.peer.is_loopback() {
            warn!("PROXY from untrusted peer {} ignored", client.peer);
        } else if client.proxied {
            warn!("Repeated PROXY from {} ignored", id);
        } else {
            debug!("Client {} proxied for {}", id, hostname);
            client.hostname = hostname;
            client.proxied = true;
        }
    }

    pub(super) fn process_hostname(&mut self, id: ClientId, hostname: String) {
        if let Some(client) = self.clients.get_mut(&id) {
            // proxy preamble wins over lookup of the proxy itself
            if !client.proxied {
                client.hostname = hostname;
            }
        }
    }

    pub(super) fn process_nick(&mut self, id: ClientId, nickname: &str) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        let nick = client.nick_or_star();
        if !is_valid_nickname(nickname, self.config.max_nickname_len) {
            client.reply(ErrErroneusNickname432 {
                client: nick,
                nick: nickname,
            });
            return;
        }
        if let Some(other) = self.registry.get(nickname) {
            if other != id {
                client.reply(ErrNicknameInUse433 {
                    client: nick,
                    nick: nickname,
                });
                return;
            }
        }

        if client.registered {
            self.change_nickname(id, Name::new(nickname));
        } else if let Some(client) = self.clients.get_mut(&id) {
            client.nick = Some(Name::new(nickname));
            self.try_register(id);
        }
    }

    pub(super) fn process_user(
        &mut self,
        id: ClientId,
        username: String,
        mode: Option<u8>,
        realname: String,
    ) {
        let client = match self.clients.get_mut(&id) {
            Some(client) => client,
            None => return,
        };
        if client.registered {
            client.reply(ErrAlreadyRegistered462 {
                client: client.nick_or_star(),
            });
            return;
        }
        if !client.authorized {
            client.reply(ErrPasswdMismatch464 {
                client: client.nick_or_star(),
            });
            self.quit_client(id, CONN_BAD_PASSWORD, CONN_BAD_PASSWORD);
            return;
        }

        // mode bits: 2 is wallops, 3 is invisible
        if let Some(mode) = mode.filter(|m| m & 0b1100 != 0) {
            if mode & 0b0100 != 0 {
                client.modes |= UserMode::Wallops;
            }
            if mode & 0b1000 != 0 {
                client.modes |= UserMode::Invisible;
            }
            client.reply(RplUModeIs221 {
                client: client.nick_or_star(),
                user_modes: &client.modes_string(),
            });
        }
        if client.cap_state == CapState::Negotiating {
            client.cap_state = CapState::Negotiated;
        }
        client.username = Some(Name::new(username));
        client.realname = realname;
        self.try_register(id);
    }

    pub(super) fn process_ping(&mut self, id: ClientId, token: &str) {
        if let Some(client) = self.clients.get(&id) {
            client.send(format!(
                ":{} PONG {} :{}",
                self.server_name, self.server_name, token
            ));
        }
    }

    pub(super) fn process_oper(&mut self, id: ClientId, name: &str, password: Credential) {
        let client = match self.clients.get_mut(&id) {
            Some(client) => client,
            None => return,
        };
        if !password.is_accepted() {
            client.reply(ErrPasswdMismatch464 {
                client: client.nick_or_star(),
            });
            return;
        }
        client.modes |= UserMode::Operator;
        info!("{} is now an operator as {}", client.user_host(), name);
        client.reply(RplYoureOper381 {
            client: client.nick_or_star(),
        });
        client.send(format!(
            ":{} MODE {} :+o",
            client.user_host(),
            client.nick_or_star()
        ));
    }

    pub(super) fn process_idle(&mut self, id: ClientId) {
        if let Some(client) = self.clients.get_mut(&id) {
            debug!("Client {} is idle", id);
            client.mark_idle();
        }
    }

    pub(super) fn process_malformed(&mut self, id: ClientId, error: CommandError) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        let nick = client.nick_or_star();
        match &error {
            CommandError::NeedMoreParams(command) if command.name == "NICK" => {
                client.reply(ErrNoNicknameGiven431 { client: nick })
            }
            CommandError::NeedMoreParams(command) => client.reply(ErrNeedMoreParams461 {
                client: nick,
                command: command.name,
            }),
            CommandError::UnknownSubcommand(command, subcommand) if command.name == "CAP" => {
                client.reply(ErrInvalidCapCmd410 {
                    client: nick,
                    cmd: subcommand,
                })
            }
            CommandError::InputTooLong => client.reply(ErrInputTooLong417 { client: nick }),
            _ => {
                debug!("Malformed command from {}: {}", id, error);
                client.notice(&format!("failed to parse command: {}", error));
            }
        }
    }

    /// Complete registration when nickname and username are set and
    /// capability negotiation is not in progress.
    pub(super) fn try_register(&mut self, id: ClientId) {
        let client = match self.clients.get_mut(&id) {
            Some(client) => client,
            None => return,
        };
        if !client.can_register() {
            return;
        }
        let nick = match client.nick {
            Some(ref nick) => nick.clone(),
            None => return,
        };
        // another client could register this nick in the meantime
        if !self.registry.add(nick.clone(), id) {
            client.reply(ErrNicknameInUse433 {
                client: "*",
                nick: nick.as_str(),
            });
            client.nick = None;
            return;
        }
        client.registered = true;
        client.touch();
        info!("Client {} registered as {}", id, client.user_host());

        if let Some(client) = self.clients.get(&id) {
            self.send_welcome(client);
            self.send_motd(client);
        }
    }

    fn send_welcome(&self, client: &Client) {
        let nick = client.nick_or_star();
        client.reply(RplWelcome001 {
            client: nick,
            networkname: &self.config.network,
            nick,
            user: client.username_or_star(),
            host: &client.hostname,
        });
        client.reply(RplYourHost002 {
            client: nick,
            servername: &self.server_name,
            version: VERSION,
        });
        client.reply(RplCreated003 {
            client: nick,
            datetime: &self.created,
        });
        client.reply(RplMyInfo004 {
            client: nick,
            servername: &self.server_name,
            version: VERSION,
            avail_user_modes: AVAILABLE_USER_MODES,
            avail_chmodes: AVAILABLE_CHANNEL_MODES,
        });
    }

    pub(super) fn send_motd(&self, client: &Client) {
        let nick = client.nick_or_star();
        let motd = match self.motd {
            Some(ref motd) => motd,
            None => {
                client.reply(ErrNoMotd422 { client: nick });
                return;
            }
        };
        client.reply(RplMotdStart375 {
            client: nick,
            server: &self.server_name,
        });
        for line in motd.lines() {
            for part in wrap_line(line, MOTD_MAX_LINE_LENGTH) {
                client.reply(RplMotd372 {
                    client: nick,
                    motd: part,
                });
            }
        }
        client.reply(RplEndOfMotd376 { client: nick });
    }

    /// Rename a registered client. Friends see the change from the old identity.
    pub(super) fn change_nickname(&mut self, id: ClientId, nickname: Name) {
        let friends = self.friends(id);
        let client = match self.clients.get_mut(&id) {
            Some(client) => client,
            None => return,
        };
        if client.nick.as_ref().map(|n| n.as_str()) == Some(nickname.as_str()) {
            return;
        }
        let old_source = client.user_host();
        let line = format!(":{} NICK :{}", old_source, nickname);
        if let Some(entry) = client.whowas_entry() {
            self.whowas.append(entry);
        }
        if let Some(old) = client.nick.take() {
            self.registry.remove(&old);
        }
        self.registry.add(nickname.clone(), id);
        info!("{} changed nickname to {}", old_source, nickname);
        client.nick = Some(nickname);

        friends
            .iter()
            .filter_map(|friend| self.clients.get(friend))
            .for_each(|friend| friend.send(line.clone()));
    }

    /// Tear down a client. Calling it again for the same client does nothing.
    pub(super) fn quit_client(&mut self, id: ClientId, message: &str, reason: &str) {
        let friends = self.friends(id);
        let mut client = match self.clients.remove(&id) {
            Some(client) => client,
            None => return,
        };
        client.send(format!("ERROR :{}", reason));
        client.has_quit = true;
        if let Some(entry) = client.whowas_entry() {
            self.whowas.append(entry);
        }

        for name in client.channels.drain() {
            if let Some(channel) = self.channels.get_mut(&name) {
                channel.quit(id);
            }
            self.drop_channel_if_empty(&name);
        }
        if client.registered {
            if let Some(ref nick) = client.nick {
                self.registry.remove(nick);
            }
        }
        client.cancel_timers();
        client.close();
        info!("Client {} quit: {}", client.user_host(), reason);

        let line = format!(":{} QUIT :{}", client.user_host(), message);
        friends
            .iter()
            .filter(|friend| **friend != id)
            .filter_map(|friend| self.clients.get(friend))
            .for_each(|friend| friend.send(line.clone()));
    }
}
