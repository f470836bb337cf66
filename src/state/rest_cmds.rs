// rest_cmds.rs - rest of commands
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

use super::channel_cmds::ModeChanges;
use super::*;

impl ServerState {
    /// PRIVMSG and NOTICE. NOTICE never produces error replies.
    pub(super) fn process_message(
        &mut self,
        id: ClientId,
        command: &str,
        targets: Vec<String>,
        text: &str,
    ) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        let nick = client.nick_or_star();
        let is_privmsg = command == "PRIVMSG";
        let mut seen = HashSet::new();
        for target in targets {
            if !seen.insert(fold_name(&target)) {
                continue;
            }
            if is_channel_name(&target) {
                match self.channels.get(&Name::new(target.as_str())) {
                    Some(channel) => channel.message(&self.clients, id, command, text),
                    None if is_privmsg => client.reply(ErrNoSuchChannel403 {
                        client: nick,
                        channel: &target,
                    }),
                    None => (),
                }
                continue;
            }
            match self
                .registry
                .get(&target)
                .and_then(|t| self.clients.get(&t))
            {
                Some(recipient) => {
                    recipient.send(format!(
                        ":{} {} {} :{}",
                        client.user_host(),
                        command,
                        recipient.nick_or_star(),
                        text
                    ));
                    if is_privmsg {
                        if let Some(ref away) = recipient.away_message {
                            client.reply(RplAway301 {
                                client: nick,
                                nick: recipient.nick_or_star(),
                                message: away,
                            });
                        }
                    }
                }
                None if is_privmsg => client.reply(ErrNoSuchNick401 {
                    client: nick,
                    nick: &target,
                }),
                None => (),
            }
        }
    }

    fn send_who_reply(&self, client: &Client, channel: Option<&Channel>, member: &Client) {
        let mut flags = if member.away_message.is_some() {
            "G".to_string()
        } else {
            "H".to_string()
        };
        if member.is_operator() {
            flags.push('*');
        }
        if let Some(channel) = channel {
            flags += &channel.member_prefix(member.id, client.multi_prefix);
        }
        client.reply(RplWhoReply352 {
            client: client.nick_or_star(),
            channel: channel.map(|ch| ch.name.as_str()).unwrap_or("*"),
            username: member.username_or_star(),
            host: &member.hostname,
            server: &self.server_name,
            nick: member.nick_or_star(),
            flags: &flags,
            hopcount: 0,
            realname: &member.realname,
        });
    }

    pub(super) fn process_who(&mut self, id: ClientId, mask: Option<String>, operators_only: bool) {
        let friends = self.friends(id);
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        // invisible users are shown only to those sharing a channel
        let visible = |member: &Client| {
            (!member.is_invisible() || friends.contains(&member.id))
                && (!operators_only || member.is_operator())
        };
        let who_channel = |channel: &Channel| {
            if channel.is_hidden() && !channel.is_member(id) {
                return;
            }
            let mut members = channel
                .members
                .keys()
                .filter_map(|m| self.clients.get(m))
                .filter(|m| visible(m))
                .collect::<Vec<_>>();
            members.sort_by_key(|m| fold_name(m.nick_or_star()));
            for member in members {
                self.send_who_reply(client, Some(channel), member);
            }
        };

        match mask {
            None => self.sorted_channels().into_iter().for_each(who_channel),
            Some(ref mask) if is_channel_name(mask) => {
                if let Some(channel) = self.channels.get(&Name::new(mask.as_str())) {
                    who_channel(channel);
                }
            }
            Some(ref mask) => self
                .registry
                .find_all(mask)
                .iter()
                .filter_map(|m| self.clients.get(m))
                .filter(|m| visible(m))
                .for_each(|member| self.send_who_reply(client, None, member)),
        }
        client.reply(RplEndOfWho315 {
            client: client.nick_or_star(),
            mask: mask.as_deref().unwrap_or("*"),
        });
    }

    fn send_whois(&self, client: &Client, target: &Client) {
        let nick = client.nick_or_star();
        let target_nick = target.nick_or_star();
        client.reply(RplWhoIsUser311 {
            client: nick,
            nick: target_nick,
            username: target.username_or_star(),
            host: &target.hostname,
            realname: &target.realname,
        });
        client.reply(RplWhoIsServer312 {
            client: nick,
            nick: target_nick,
            server: &self.server_name,
            server_info: &self.config.info,
        });
        if target.is_operator() {
            client.reply(RplWhoIsOperator313 {
                client: nick,
                nick: target_nick,
            });
        }
        client.reply(RplWhoIsIdle317 {
            client: nick,
            nick: target_nick,
            secs: target.idle_seconds(),
            signon: target.ctime.max(0) as u64,
        });

        let mut channels = target
            .channels
            .iter()
            .filter_map(|name| self.channels.get(name))
            .filter(|ch| !ch.is_hidden() || ch.is_member(client.id))
            .collect::<Vec<_>>();
        channels.sort_by(|a, b| a.name.folded().cmp(b.name.folded()));
        if !channels.is_empty() {
            let list = channels
                .iter()
                .map(|ch| format!("{}{}", ch.member_prefix(target.id, false), ch.name))
                .collect::<Vec<_>>()
                .join(" ");
            client.reply(RplWhoIsChannels319 {
                client: nick,
                nick: target_nick,
                channels: &list,
            });
        }
    }

    pub(super) fn process_whois(&mut self, id: ClientId, masks: Vec<String>) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        for mask in masks {
            let found = self.registry.find_all(&mask);
            if found.is_empty() {
                client.reply(ErrNoSuchNick401 {
                    client: client.nick_or_star(),
                    nick: &mask,
                });
            }
            found
                .iter()
                .filter_map(|t| self.clients.get(t))
                .for_each(|target| self.send_whois(client, target));
            client.reply(RplEndOfWhoIs318 {
                client: client.nick_or_star(),
                nick: &mask,
            });
        }
    }

    pub(super) fn process_whowas(&mut self, id: ClientId, nicknames: Vec<String>, count: usize) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        let nick = client.nick_or_star();
        for nickname in nicknames {
            let entries = self.whowas.find(&nickname, count);
            if entries.is_empty() {
                client.reply(ErrWasNoSuchNick406 {
                    client: nick,
                    nick: &nickname,
                });
            }
            for entry in entries {
                client.reply(RplWhoWasUser314 {
                    client: nick,
                    nick: entry.nickname.as_str(),
                    username: &entry.username,
                    host: &entry.hostname,
                    realname: &entry.realname,
                });
            }
            client.reply(RplEndOfWhoWas369 {
                client: nick,
                nick: &nickname,
            });
        }
    }

    pub(super) fn process_kill(&mut self, id: ClientId, nickname: &str, comment: &str) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        if !client.is_operator() {
            client.reply(ErrNoPrivileges481 {
                client: client.nick_or_star(),
            });
            return;
        }
        let target = match self.registry.get(nickname) {
            Some(target) => target,
            None => {
                client.reply(ErrNoSuchNick401 {
                    client: client.nick_or_star(),
                    nick: nickname,
                });
                return;
            }
        };
        let text = format!("KILLed by {}: {}", client.nick_or_star(), comment);
        info!("{} killed by {}", nickname, client.user_host());
        self.quit_client(target, &text, &text);
    }

    pub(super) fn process_away(&mut self, id: ClientId, text: Option<String>) {
        let client = match self.clients.get_mut(&id) {
            Some(client) => client,
            None => return,
        };
        let change = match text {
            Some(text) => {
                client.away_message = Some(text);
                client.modes |= UserMode::Away;
                client.reply(RplNowAway306 {
                    client: client.nick_or_star(),
                });
                "+a"
            }
            None => {
                client.away_message = None;
                client.modes -= UserMode::Away;
                client.reply(RplUnAway305 {
                    client: client.nick_or_star(),
                });
                "-a"
            }
        };
        client.send(format!(
            ":{} MODE {} :{}",
            client.user_host(),
            client.nick_or_star(),
            change
        ));
    }

    pub(super) fn process_ison(&mut self, id: ClientId, nicknames: Vec<String>) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        let online = nicknames
            .iter()
            .filter_map(|n| self.registry.get(n))
            .filter_map(|t| self.clients.get(&t))
            .map(|c| c.nick_or_star())
            .collect::<Vec<_>>()
            .join(" ");
        client.reply(RplIsOn303 {
            client: client.nick_or_star(),
            nicknames: &online,
        });
    }

    pub(super) fn process_user_mode(&mut self, id: ClientId, target: &str, modestring: Option<String>) {
        let client = match self.clients.get_mut(&id) {
            Some(client) => client,
            None => return,
        };
        let nick = client.nick_or_star().to_string();
        if Name::new(target) != Name::new(nick.as_str()) {
            if self.registry.get(target).is_some() {
                client.reply(ErrUsersDontMatch502 { client: &nick });
            } else {
                client.reply(ErrNoSuchNick401 {
                    client: &nick,
                    nick: target,
                });
            }
            return;
        }
        let modestring = match modestring {
            Some(modestring) => modestring,
            None => {
                client.reply(RplUModeIs221 {
                    client: &nick,
                    user_modes: &client.modes_string(),
                });
                return;
            }
        };

        let mut changes = ModeChanges::default();
        let mut adding = true;
        let mut unknown = false;
        for mode in modestring.chars() {
            let flag = match mode {
                '+' => {
                    adding = true;
                    continue;
                }
                '-' => {
                    adding = false;
                    continue;
                }
                'i' => UserMode::Invisible,
                'w' => UserMode::Wallops,
                // operator status comes only from OPER, away only from AWAY
                'o' if !adding => UserMode::Operator,
                'o' | 'a' => continue,
                _ => {
                    unknown = true;
                    continue;
                }
            };
            if client.modes.contains(flag) != adding {
                if adding {
                    client.modes |= flag;
                } else {
                    client.modes -= flag;
                }
                changes.push(adding, mode, None);
            }
        }
        if unknown {
            client.reply(ErrUModeUnknownFlag501 { client: &nick });
        }
        if !changes.is_empty() {
            client.send(format!(":{} MODE {} :{}", client.user_host(), nick, changes));
        }
    }

    // replies 402 for a target other than this server
    fn is_local_target(&self, client: &Client, target: Option<&str>) -> bool {
        match target {
            Some(target) if target != &*self.server_name => {
                client.reply(ErrNoSuchServer402 {
                    client: client.nick_or_star(),
                    server: target,
                });
                false
            }
            _ => true,
        }
    }

    pub(super) fn process_motd(&mut self, id: ClientId, target: Option<String>) {
        if let Some(client) = self.clients.get(&id) {
            if self.is_local_target(client, target.as_deref()) {
                self.send_motd(client);
            }
        }
    }

    pub(super) fn process_version(&mut self, id: ClientId, target: Option<String>) {
        if let Some(client) = self.clients.get(&id) {
            if self.is_local_target(client, target.as_deref()) {
                client.reply(RplVersion351 {
                    client: client.nick_or_star(),
                    version: VERSION,
                    server: &self.server_name,
                    comments: &self.config.info,
                });
            }
        }
    }

    pub(super) fn process_time(&mut self, id: ClientId, target: Option<String>) {
        if let Some(client) = self.clients.get(&id) {
            if self.is_local_target(client, target.as_deref()) {
                client.reply(RplTime391 {
                    client: client.nick_or_star(),
                    server: &self.server_name,
                    time: &chrono::Local::now().to_rfc2822(),
                });
            }
        }
    }
}
