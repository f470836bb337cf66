// channel_cmds.rs - channel commands
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

use std::fmt;

use super::*;

// applied mode changes, collected for the broadcast
#[derive(Default)]
pub(super) struct ModeChanges {
    modes: String,
    args: Vec<String>,
    adding: Option<bool>,
}

impl ModeChanges {
    pub(super) fn push(&mut self, adding: bool, mode: char, arg: Option<String>) {
        if self.adding != Some(adding) {
            self.modes.push(if adding { '+' } else { '-' });
            self.adding = Some(adding);
        }
        self.modes.push(mode);
        self.args.extend(arg);
    }

    pub(super) fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl fmt::Display for ModeChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.modes)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

fn send_mask_list(client: &Client, channel: &str, mode: char, list: &MaskList) {
    let nick = client.nick_or_star();
    for mask in list.iter() {
        client.reply(match mode {
            'b' => RplBanList367 {
                client: nick,
                channel,
                mask,
            },
            'e' => RplExceptList348 {
                client: nick,
                channel,
                mask,
            },
            _ => RplInviteList346 {
                client: nick,
                channel,
                mask,
            },
        });
    }
    client.reply(match mode {
        'b' => RplEndOfBanList368 {
            client: nick,
            channel,
        },
        'e' => RplEndOfExceptList349 {
            client: nick,
            channel,
        },
        _ => RplEndOfInviteList347 {
            client: nick,
            channel,
        },
    });
}

impl ServerState {
    fn part_all(&mut self, id: ClientId) {
        let (nick, mut names) = match self.clients.get(&id) {
            Some(client) => (
                client.nick_or_star().to_string(),
                client.channels.iter().cloned().collect::<Vec<_>>(),
            ),
            None => return,
        };
        names.sort_by(|a, b| a.folded().cmp(b.folded()));
        for name in names {
            if let Some(channel) = self.channels.get_mut(&name) {
                channel.part(&mut self.clients, id, &nick);
            }
            self.drop_channel_if_empty(&name);
        }
    }

    pub(super) fn process_join(&mut self, id: ClientId, channels: Vec<String>, keys: Vec<String>) {
        if channels.len() == 1 && channels[0] == "0" {
            self.part_all(id);
            return;
        }
        for (i, name) in channels.iter().enumerate() {
            if !is_channel_name(name) {
                if let Some(client) = self.clients.get(&id) {
                    client.reply(ErrNoSuchChannel403 {
                        client: client.nick_or_star(),
                        channel: name,
                    });
                }
                continue;
            }
            let chname = Name::new(name.as_str());
            if !self.channels.contains_key(&chname) {
                info!("Channel {} created", chname);
            }
            let channel = self
                .channels
                .entry(chname.clone())
                .or_insert_with(|| Channel::new(chname.clone()));
            let key = keys.get(i).map(|k| k.as_str()).filter(|k| !k.is_empty());
            channel.join(&mut self.clients, id, key);
            self.drop_channel_if_empty(&chname);
        }
    }

    pub(super) fn process_part(&mut self, id: ClientId, channels: Vec<String>, message: Option<String>) {
        let message = match (message, self.clients.get(&id)) {
            (Some(message), _) => message,
            (None, Some(client)) => client.nick_or_star().to_string(),
            (None, None) => return,
        };
        for name in channels {
            let chname = Name::new(name.as_str());
            match self.channels.get_mut(&chname) {
                Some(channel) => channel.part(&mut self.clients, id, &message),
                None => {
                    if let Some(client) = self.clients.get(&id) {
                        client.reply(ErrNoSuchChannel403 {
                            client: client.nick_or_star(),
                            channel: &name,
                        });
                    }
                    continue;
                }
            }
            self.drop_channel_if_empty(&chname);
        }
    }

    pub(super) fn process_topic(&mut self, id: ClientId, channel: &str, topic: Option<String>) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        let chanobj = match self.channels.get_mut(&Name::new(channel)) {
            Some(chanobj) => chanobj,
            None => {
                client.reply(ErrNoSuchChannel403 {
                    client: client.nick_or_star(),
                    channel,
                });
                return;
            }
        };
        match topic {
            Some(topic) => chanobj.set_topic(&self.clients, id, &topic),
            None => chanobj.get_topic(client),
        }
    }

    pub(super) fn sorted_channels(&self) -> Vec<&Channel> {
        let mut channels = self.channels.values().collect::<Vec<_>>();
        channels.sort_by(|a, b| a.name.folded().cmp(b.name.folded()));
        channels
    }

    pub(super) fn process_names(&mut self, id: ClientId, channels: Vec<String>) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        if channels.is_empty() {
            self.sorted_channels()
                .into_iter()
                .filter(|ch| !ch.is_hidden() || ch.is_member(id))
                .for_each(|ch| ch.names(&self.clients, client));
            client.reply(RplEndOfNames366 {
                client: client.nick_or_star(),
                channel: "*",
            });
            return;
        }
        for name in channels {
            match self.channels.get(&Name::new(name.as_str())) {
                Some(ch) if !ch.is_hidden() || ch.is_member(id) => ch.names(&self.clients, client),
                _ => client.reply(ErrNoSuchChannel403 {
                    client: client.nick_or_star(),
                    channel: &name,
                }),
            }
        }
    }

    pub(super) fn process_list(&mut self, id: ClientId, channels: Vec<String>, target: Option<String>) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        let nick = client.nick_or_star();
        if let Some(ref target) = target {
            if target.as_str() != &*self.server_name {
                client.reply(ErrNoSuchServer402 {
                    client: nick,
                    server: target,
                });
                return;
            }
        }
        // operators see private and secret channels
        let visible = |ch: &Channel| !ch.is_hidden() || client.is_operator() || ch.is_member(id);
        let list_reply = |ch: &Channel| {
            client.reply(RplList322 {
                client: nick,
                channel: ch.name.as_str(),
                client_count: ch.members.len(),
                topic: &ch.topic,
            })
        };

        if channels.is_empty() {
            self.sorted_channels()
                .into_iter()
                .filter(|ch| visible(*ch))
                .for_each(list_reply);
        } else {
            for name in channels {
                match self.channels.get(&Name::new(name.as_str())) {
                    Some(ch) if visible(ch) => list_reply(ch),
                    _ => client.reply(ErrNoSuchChannel403 {
                        client: nick,
                        channel: &name,
                    }),
                }
            }
        }
        client.reply(RplListEnd323 { client: nick });
    }

    pub(super) fn process_invite(&mut self, id: ClientId, nickname: &str, channel: &str) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
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
        match self.channels.get_mut(&Name::new(channel)) {
            Some(chanobj) => chanobj.invite(&self.clients, id, target),
            None => {
                if let Some(invitee) = self.clients.get(&target) {
                    send_invitation(client, invitee, channel);
                }
            }
        }
    }

    pub(super) fn process_kick(
        &mut self,
        id: ClientId,
        channels: Vec<String>,
        users: Vec<String>,
        comment: Option<String>,
    ) {
        let comment = match (comment, self.clients.get(&id)) {
            (Some(comment), _) => comment,
            (None, Some(client)) => client.nick_or_star().to_string(),
            (None, None) => return,
        };
        // one channel with many users, or pairs by position
        let pairs = if channels.len() == 1 {
            users
                .iter()
                .map(|user| (channels[0].as_str(), user.as_str()))
                .collect::<Vec<_>>()
        } else {
            channels
                .iter()
                .zip(users.iter())
                .map(|(ch, user)| (ch.as_str(), user.as_str()))
                .collect()
        };

        for (channel, user) in pairs {
            let chname = Name::new(channel);
            let target = self.registry.get(user);
            match (self.channels.get_mut(&chname), target) {
                (Some(chanobj), Some(_)) => {
                    chanobj.kick(&mut self.clients, id, user, target, &comment);
                }
                (chanobj, _) => {
                    if let Some(client) = self.clients.get(&id) {
                        if chanobj.is_none() {
                            client.reply(ErrNoSuchChannel403 {
                                client: client.nick_or_star(),
                                channel,
                            });
                        } else {
                            client.reply(ErrNoSuchNick401 {
                                client: client.nick_or_star(),
                                nick: user,
                            });
                        }
                    }
                    continue;
                }
            }
            self.drop_channel_if_empty(&chname);
        }
    }

    /// Channel MODE: query without modestring, list queries for masks,
    /// otherwise changes applied by a channel operator.
    pub(super) fn process_channel_mode(
        &mut self,
        id: ClientId,
        target: &str,
        modestring: Option<String>,
        args: Vec<String>,
    ) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        let nick = client.nick_or_star();
        let channel = match self.channels.get_mut(&Name::new(target)) {
            Some(channel) => channel,
            None => {
                client.reply(ErrNoSuchChannel403 {
                    client: nick,
                    channel: target,
                });
                return;
            }
        };
        let chname = channel.name.to_string();
        let modestring = match modestring {
            Some(modestring) => modestring,
            None => {
                client.reply(RplChannelModeIs324 {
                    client: nick,
                    channel: &chname,
                    modestring: &channel.mode_string(channel.is_member(id)),
                });
                return;
            }
        };

        let is_operator = channel.is_operator(id);
        let mut args = args.into_iter();
        let mut changes = ModeChanges::default();
        let mut adding = true;
        let mut denied = false;
        for mode in modestring.chars() {
            match mode {
                '+' => adding = true,
                '-' => adding = false,
                'b' | 'e' | 'I' => {
                    let list = match mode {
                        'b' => &mut channel.bans,
                        'e' => &mut channel.excepts,
                        _ => &mut channel.invites,
                    };
                    match args.next() {
                        None => send_mask_list(client, &chname, mode, list),
                        Some(_) if !is_operator => {
                            denied = true;
                            break;
                        }
                        Some(mask) => {
                            let changed = if adding {
                                list.add(&mask)
                            } else {
                                list.remove(&mask)
                            };
                            if changed {
                                changes.push(adding, mode, Some(mask));
                            }
                        }
                    }
                }
                _ if !is_operator && (mode == 'o' || mode == 'v' || mode == 'k' || mode == 'l') => {
                    denied = true;
                    break;
                }
                'o' | 'v' => {
                    let member = match args.next() {
                        Some(member) => member,
                        None => continue,
                    };
                    let member_mode = if mode == 'o' {
                        MemberMode::Operator
                    } else {
                        MemberMode::Voice
                    };
                    let target = self.registry.get(&member);
                    match target.and_then(|t| channel.members.get_mut(&t)) {
                        Some(modes) => {
                            if adding {
                                *modes |= member_mode;
                            } else {
                                *modes -= member_mode;
                            }
                            changes.push(adding, mode, Some(member));
                        }
                        None if target.is_none() => client.reply(ErrNoSuchNick401 {
                            client: nick,
                            nick: &member,
                        }),
                        None => client.reply(ErrUserNotInChannel441 {
                            client: nick,
                            nick: &member,
                            channel: &chname,
                        }),
                    }
                }
                'k' => {
                    if adding {
                        if let Some(key) = args.next() {
                            channel.key = Some(key.clone());
                            changes.push(true, 'k', Some(key));
                        }
                    } else {
                        // key argument of -k is ignored
                        args.next();
                        if channel.key.take().is_some() {
                            changes.push(false, 'k', None);
                        }
                    }
                }
                'l' => {
                    if adding {
                        if let Some(limit) = args.next().and_then(|l| l.parse::<usize>().ok()) {
                            channel.user_limit = Some(limit);
                            changes.push(true, 'l', Some(limit.to_string()));
                        }
                    } else if channel.user_limit.take().is_some() {
                        changes.push(false, 'l', None);
                    }
                }
                _ => match ChannelFlag::from_letter(mode) {
                    Some(_) if !is_operator => {
                        denied = true;
                        break;
                    }
                    Some(flag) => {
                        if channel.flags.contains(flag) != adding {
                            if adding {
                                channel.flags |= flag;
                            } else {
                                channel.flags -= flag;
                            }
                            changes.push(adding, mode, None);
                        }
                    }
                    None => client.reply(ErrUnknownMode472 {
                        client: nick,
                        modechar: mode,
                    }),
                },
            }
        }

        if denied {
            client.reply(ErrChanOpPrivsNeeded482 {
                client: nick,
                channel: &chname,
            });
        }
        if !changes.is_empty() {
            debug!("Channel {} modes changed by {}: {}", chname, nick, changes);
            channel.broadcast(
                &self.clients,
                &format!(":{} MODE {} {}", client.user_host(), chname, changes),
                None,
            );
        }
    }

    pub(super) fn process_theater(&mut self, id: ClientId, command: TheaterCommand) {
        let client = match self.clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        let nick = client.nick_or_star();
        let channel_name = match command {
            TheaterCommand::IDENTIFY { ref channel, .. }
            | TheaterCommand::PRIVMSG { ref channel, .. }
            | TheaterCommand::ACTION { ref channel, .. } => channel.clone(),
        };
        let channel = match self.channels.get_mut(&Name::new(channel_name.as_str())) {
            Some(channel) => channel,
            None => {
                client.reply(ErrNoSuchChannel403 {
                    client: nick,
                    channel: &channel_name,
                });
                return;
            }
        };
        let chname = channel.name.to_string();

        let (actor, text) = match command {
            TheaterCommand::IDENTIFY { password, .. } => {
                if !password.is_accepted() {
                    client.reply(ErrPasswdMismatch464 { client: nick });
                    return;
                }
                match channel.members.get_mut(&id) {
                    Some(modes) => {
                        *modes |= MemberMode::Theater;
                        info!("{} is theater operator of {}", client.user_host(), chname);
                        client.notice(&format!("theater mode granted for {}", chname));
                    }
                    None => client.reply(ErrNotOnChannel442 {
                        client: nick,
                        channel: &chname,
                    }),
                }
                return;
            }
            TheaterCommand::PRIVMSG { nickname, text, .. } => (nickname, text),
            TheaterCommand::ACTION { nickname, text, .. } => {
                (nickname, format!("\x01ACTION {}\x01", text))
            }
        };

        let allowed = channel
            .members
            .get(&id)
            .map(|modes| modes.contains(MemberMode::Theater))
            .unwrap_or(false);
        if !allowed {
            client.reply(ErrNoPrivileges481 { client: nick });
            return;
        }
        channel.broadcast(
            &self.clients,
            &format!(":{}!{}@theater PRIVMSG {} :{}", actor, actor, chname, text),
            None,
        );
    }
}
