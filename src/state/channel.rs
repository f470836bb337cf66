// channel.rs - channel entity
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

use flagset::{flags, FlagSet};
use std::collections::HashMap;

use super::structs::*;
use crate::reply::Reply::*;
use crate::store::ChannelRow;
use crate::utils::*;

flags! {
    pub(super) enum ChannelFlag: u8 {
        InviteOnly = 0b000001,
        Moderated = 0b000010,
        NoOutside = 0b000100,
        Private = 0b001000,
        Secret = 0b010000,
        TopicProtect = 0b100000,
    }
}

impl ChannelFlag {
    pub(super) fn letter(self) -> char {
        match self {
            ChannelFlag::InviteOnly => 'i',
            ChannelFlag::Moderated => 'm',
            ChannelFlag::NoOutside => 'n',
            ChannelFlag::Private => 'p',
            ChannelFlag::Secret => 's',
            ChannelFlag::TopicProtect => 't',
        }
    }

    pub(super) fn from_letter(c: char) -> Option<ChannelFlag> {
        match c {
            'i' => Some(ChannelFlag::InviteOnly),
            'm' => Some(ChannelFlag::Moderated),
            'n' => Some(ChannelFlag::NoOutside),
            'p' => Some(ChannelFlag::Private),
            's' => Some(ChannelFlag::Secret),
            't' => Some(ChannelFlag::TopicProtect),
            _ => None,
        }
    }
}

flags! {
    pub(super) enum MemberMode: u8 {
        Operator = 0b001,
        Voice = 0b010,
        Theater = 0b100,
    }
}

pub(super) const AVAILABLE_CHANNEL_MODES: &str = "beIiklmnopstv";

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub(super) struct MaskList(Vec<String>);

impl MaskList {
    fn from_vec(masks: &[String]) -> MaskList {
        let mut list = MaskList::default();
        masks.iter().for_each(|m| {
            list.add(m);
        });
        list
    }

    pub(super) fn add(&mut self, mask: &str) -> bool {
        let folded = fold_name(mask);
        if self.0.iter().any(|m| fold_name(m) == folded) {
            false
        } else {
            self.0.push(mask.to_string());
            true
        }
    }

    pub(super) fn remove(&mut self, mask: &str) -> bool {
        let folded = fold_name(mask);
        let before = self.0.len();
        self.0.retain(|m| fold_name(m) != folded);
        before != self.0.len()
    }

    pub(super) fn matches(&self, subject: &str) -> bool {
        self.0.iter().any(|m| mask_matches(m, subject))
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

pub(super) struct Channel {
    pub(super) name: Name,
    pub(super) topic: String,
    pub(super) key: Option<String>,
    pub(super) user_limit: Option<usize>,
    pub(super) flags: FlagSet<ChannelFlag>,
    pub(super) bans: MaskList,
    pub(super) excepts: MaskList,
    pub(super) invites: MaskList,
    pub(super) members: HashMap<ClientId, FlagSet<MemberMode>>,
    // loaded from store: kept in the index when empty
    pub(super) persistent: bool,
}

impl Channel {
    pub(super) fn new(name: Name) -> Channel {
        Channel {
            name,
            topic: String::new(),
            key: None,
            user_limit: None,
            flags: FlagSet::default(),
            bans: MaskList::default(),
            excepts: MaskList::default(),
            invites: MaskList::default(),
            members: HashMap::new(),
            persistent: false,
        }
    }

    pub(super) fn from_row(row: &ChannelRow) -> Channel {
        let mut channel = Channel::new(Name::new(row.name.as_str()));
        row.flags
            .chars()
            .filter_map(ChannelFlag::from_letter)
            .for_each(|f| channel.flags |= f);
        channel.key = row.key.clone();
        channel.topic = row.topic.clone();
        channel.user_limit = row.user_limit;
        channel.bans = MaskList::from_vec(&row.ban_list);
        channel.excepts = MaskList::from_vec(&row.except_list);
        channel.invites = MaskList::from_vec(&row.invite_list);
        channel.persistent = true;
        channel
    }

    pub(super) fn is_member(&self, id: ClientId) -> bool {
        self.members.contains_key(&id)
    }

    pub(super) fn is_operator(&self, id: ClientId) -> bool {
        self.members
            .get(&id)
            .map(|m| m.contains(MemberMode::Operator))
            .unwrap_or(false)
    }

    pub(super) fn can_speak(&self, id: ClientId) -> bool {
        match self.members.get(&id) {
            Some(modes) => {
                !self.flags.contains(ChannelFlag::Moderated)
                    || modes.contains(MemberMode::Operator)
                    || modes.contains(MemberMode::Voice)
            }
            None => !self.flags.contains(ChannelFlag::NoOutside),
        }
    }

    pub(super) fn is_hidden(&self) -> bool {
        self.flags.contains(ChannelFlag::Private) || self.flags.contains(ChannelFlag::Secret)
    }

    pub(super) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(super) fn symbol(&self) -> &'static str {
        if self.flags.contains(ChannelFlag::Secret) {
            "@"
        } else if self.flags.contains(ChannelFlag::Private) {
            "*"
        } else {
            "="
        }
    }

    /// Member prefix: all of "@+" with multi-prefix, otherwise the highest.
    pub(super) fn member_prefix(&self, id: ClientId, multi_prefix: bool) -> String {
        let modes = match self.members.get(&id) {
            Some(modes) => *modes,
            None => return String::new(),
        };
        let mut prefix = String::new();
        if modes.contains(MemberMode::Operator) {
            prefix.push('@');
        }
        if modes.contains(MemberMode::Voice) && (multi_prefix || prefix.is_empty()) {
            prefix.push('+');
        }
        prefix
    }

    pub(super) fn mode_string(&self, show_key: bool) -> String {
        let mut modes = "+".to_string();
        modes.extend(self.flags.into_iter().map(|f| f.letter()));
        let mut args = vec![];
        if let Some(ref key) = self.key {
            modes.push('k');
            if show_key {
                args.push(key.clone());
            }
        }
        if let Some(limit) = self.user_limit {
            modes.push('l');
            args.push(limit.to_string());
        }
        args.into_iter().fold(modes, |s, a| s + " " + &a)
    }

    /// Send line to members, optionally skipping one.
    pub(super) fn broadcast(&self, clients: &ClientMap, line: &str, except: Option<ClientId>) {
        self.members
            .keys()
            .filter(|id| Some(**id) != except)
            .filter_map(|id| clients.get(id))
            .for_each(|c| c.send(line.to_string()));
    }

    pub(super) fn join(&mut self, clients: &mut ClientMap, id: ClientId, key: Option<&str>) {
        let client = match clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        if self.is_member(id) {
            return;
        }
        let nick = client.nick_or_star();
        let user_host = client.user_host();
        let channel = self.name.as_str();

        if self.key.is_some() && self.key.as_deref() != key {
            client.reply(ErrBadChannelKey475 {
                client: nick,
                channel,
            });
            return;
        }
        if let Some(limit) = self.user_limit {
            if self.members.len() >= limit {
                client.reply(ErrChannelIsFull471 {
                    client: nick,
                    channel,
                });
                return;
            }
        }
        let invited = self.invites.matches(&user_host);
        if self.flags.contains(ChannelFlag::InviteOnly) && !invited {
            client.reply(ErrInviteOnlyChan473 {
                client: nick,
                channel,
            });
            return;
        }
        if self.bans.matches(&user_host) && !self.excepts.matches(&user_host) && !invited {
            client.reply(ErrBannedFromChan474 {
                client: nick,
                channel,
            });
            return;
        }

        let mut modes = FlagSet::default();
        if self.members.is_empty() {
            modes |= MemberMode::Operator;
        }
        self.members.insert(id, modes);
        if let Some(client) = clients.get_mut(&id) {
            client.channels.insert(self.name.clone());
        }

        self.broadcast(clients, &format!(":{} JOIN {}", user_host, self.name), None);
        if let Some(client) = clients.get(&id) {
            self.get_topic(client);
            self.names(clients, client);
        }
    }

    pub(super) fn part(&mut self, clients: &mut ClientMap, id: ClientId, message: &str) {
        let client = match clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        if !self.is_member(id) {
            client.reply(ErrNotOnChannel442 {
                client: client.nick_or_star(),
                channel: self.name.as_str(),
            });
            return;
        }
        // broadcast to members before removal, leaving client included
        self.broadcast(
            clients,
            &format!(":{} PART {} :{}", client.user_host(), self.name, message),
            None,
        );
        self.remove_member(clients, id);
    }

    /// Silent removal used by quit: the quit itself notifies friends.
    pub(super) fn quit(&mut self, id: ClientId) {
        self.members.remove(&id);
    }

    fn remove_member(&mut self, clients: &mut ClientMap, id: ClientId) {
        self.members.remove(&id);
        if let Some(client) = clients.get_mut(&id) {
            client.channels.remove(&self.name);
        }
    }

    pub(super) fn get_topic(&self, client: &Client) {
        let nick = client.nick_or_star();
        let channel = self.name.as_str();
        if !self.is_member(client.id) {
            client.reply(ErrNotOnChannel442 {
                client: nick,
                channel,
            });
        } else if self.topic.is_empty() {
            client.reply(RplNoTopic331 {
                client: nick,
                channel,
            });
        } else {
            client.reply(RplTopic332 {
                client: nick,
                channel,
                topic: &self.topic,
            });
        }
    }

    pub(super) fn set_topic(&mut self, clients: &ClientMap, id: ClientId, topic: &str) {
        let client = match clients.get(&id) {
            Some(client) => client,
            None => return,
        };
        let nick = client.nick_or_star();
        let channel = self.name.as_str();
        if !self.is_member(id) {
            client.reply(ErrNotOnChannel442 {
                client: nick,
                channel,
            });
            return;
        }
        if self.flags.contains(ChannelFlag::TopicProtect) && !self.is_operator(id) {
            client.reply(ErrChanOpPrivsNeeded482 {
                client: nick,
                channel,
            });
            return;
        }
        self.topic = topic.to_string();
        self.broadcast(
            clients,
            &format!(":{} TOPIC {} :{}", client.user_host(), self.name, self.topic),
            None,
        );
    }

    pub(super) fn invite(&mut self, clients: &ClientMap, from: ClientId, target: ClientId) {
        let (inviter, invitee) = match (clients.get(&from), clients.get(&target)) {
            (Some(inviter), Some(invitee)) => (inviter, invitee),
            _ => return,
        };
        let nick = inviter.nick_or_star();
        let channel = self.name.as_str();
        if !self.is_member(from) {
            inviter.reply(ErrNotOnChannel442 {
                client: nick,
                channel,
            });
            return;
        }
        if self.flags.contains(ChannelFlag::InviteOnly) && !self.is_operator(from) {
            inviter.reply(ErrChanOpPrivsNeeded482 {
                client: nick,
                channel,
            });
            return;
        }
        if self.is_member(target) {
            inviter.reply(ErrUserOnChannel443 {
                client: nick,
                nick: invitee.nick_or_star(),
                channel,
            });
            return;
        }
        if self.flags.contains(ChannelFlag::InviteOnly) {
            self.invites.add(&invitee.user_host());
        }
        send_invitation(inviter, invitee, channel);
    }

    pub(super) fn kick(
        &mut self,
        clients: &mut ClientMap,
        actor: ClientId,
        target_nick: &str,
        target: Option<ClientId>,
        comment: &str,
    ) {
        let client = match clients.get(&actor) {
            Some(client) => client,
            None => return,
        };
        let nick = client.nick_or_star();
        let channel = self.name.as_str();
        if !self.is_member(actor) {
            client.reply(ErrNotOnChannel442 {
                client: nick,
                channel,
            });
            return;
        }
        if !self.is_operator(actor) {
            client.reply(ErrChanOpPrivsNeeded482 {
                client: nick,
                channel,
            });
            return;
        }
        let target = match target {
            Some(target) if self.is_member(target) => target,
            _ => {
                client.reply(ErrUserNotInChannel441 {
                    client: nick,
                    nick: target_nick,
                    channel,
                });
                return;
            }
        };
        let target_nick = clients
            .get(&target)
            .map(|c| c.nick_or_star())
            .unwrap_or(target_nick);
        self.broadcast(
            clients,
            &format!(
                ":{} KICK {} {} :{}",
                client.user_host(),
                self.name,
                target_nick,
                comment
            ),
            None,
        );
        self.remove_member(clients, target);
    }

    /// PRIVMSG or NOTICE to channel. Only PRIVMSG reports refusal.
    pub(super) fn message(&self, clients: &ClientMap, from: ClientId, command: &str, text: &str) {
        let client = match clients.get(&from) {
            Some(client) => client,
            None => return,
        };
        if !self.can_speak(from) {
            if command == "PRIVMSG" {
                client.reply(ErrCannotSendToChain404 {
                    client: client.nick_or_star(),
                    channel: self.name.as_str(),
                });
            }
            return;
        }
        self.broadcast(
            clients,
            &format!(":{} {} {} :{}", client.user_host(), command, self.name, text),
            Some(from),
        );
    }

    pub(super) fn names(&self, clients: &ClientMap, client: &Client) {
        let nick = client.nick_or_star();
        let mut names = self
            .members
            .keys()
            .filter_map(|id| clients.get(id))
            .map(|c| {
                format!(
                    "{}{}",
                    self.member_prefix(c.id, client.multi_prefix),
                    c.nick_or_star()
                )
            })
            .collect::<Vec<_>>();
        names.sort();
        // keep reply lines short
        for chunk in names.chunks(20) {
            client.reply(RplNameReply353 {
                client: nick,
                symbol: self.symbol(),
                channel: self.name.as_str(),
                replies: &chunk.join(" "),
            });
        }
        client.reply(RplEndOfNames366 {
            client: nick,
            channel: self.name.as_str(),
        });
    }
}

pub(super) fn send_invitation(inviter: &Client, invitee: &Client, channel: &str) {
    let nick = inviter.nick_or_star();
    inviter.reply(RplInviting341 {
        client: nick,
        nick: invitee.nick_or_star(),
        channel,
    });
    invitee.send(format!(
        ":{} INVITE {} {}",
        inviter.user_host(),
        invitee.nick_or_star(),
        channel
    ));
    if let Some(ref away) = invitee.away_message {
        inviter.reply(RplAway301 {
            client: nick,
            nick: invitee.nick_or_star(),
            message: away,
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn add_client(
        clients: &mut ClientMap,
        id: u64,
        nick: &str,
    ) -> UnboundedReceiver<String> {
        let (commands, _) = mpsc::channel(1);
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut client = Client::new(
            ClientId(id),
            Arc::from("irc.irc"),
            "127.0.0.1".parse().unwrap(),
            true,
            sender,
            ClientTimers::new(commands, Duration::from_secs(60), Duration::from_secs(60)),
        );
        client.nick = Some(Name::new(nick));
        client.username = Some(Name::new(&nick[0..1]));
        client.registered = true;
        clients.insert(ClientId(id), client);
        receiver
    }

    fn drain(receiver: &mut UnboundedReceiver<String>) -> Vec<String> {
        let mut lines = vec![];
        while let Ok(line) = receiver.try_recv() {
            lines.push(line);
        }
        lines
    }

    fn symmetric(channel: &Channel, clients: &ClientMap) -> bool {
        clients
            .values()
            .all(|c| c.channels.contains(&channel.name) == channel.is_member(c.id))
    }

    #[test]
    fn test_mask_list() {
        let mut list = MaskList::default();
        assert!(list.add("bob!*"));
        assert!(!list.add("BOB!*"));
        assert!(list.add("eve!e@host.org"));
        assert!(list.matches("Bob!b@x.org"));
        assert!(list.matches("eve!e@host.org"));
        assert!(!list.matches("eve!e@host.org2"));
        assert!(list.remove("bob!*"));
        assert!(!list.remove("bob!*"));
        assert_eq!(vec!["eve!e@host.org"], list.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_channel_from_row() {
        let channel = Channel::from_row(&ChannelRow {
            name: "#Rust".to_string(),
            flags: "ntx".to_string(),
            key: Some("k".to_string()),
            topic: "Rust talk".to_string(),
            user_limit: Some(5),
            ban_list: vec!["troll!*".to_string()],
            except_list: vec![],
            invite_list: vec!["friend!*".to_string()],
        });
        assert_eq!(Name::new("#rust"), channel.name);
        assert_eq!(ChannelFlag::NoOutside | ChannelFlag::TopicProtect, channel.flags);
        assert!(channel.bans.matches("troll!t@h"));
        assert!(channel.invites.matches("friend!f@h"));
        assert!(channel.persistent);
        assert_eq!("+ntkl k 5", channel.mode_string(true));
        assert_eq!("+ntkl 5", channel.mode_string(false));
    }

    #[tokio::test]
    async fn test_channel_join_first_member_is_operator() {
        let mut clients = ClientMap::new();
        let mut alice = add_client(&mut clients, 1, "alice");
        let mut bob = add_client(&mut clients, 2, "bob");
        let mut channel = Channel::new(Name::new("#test"));

        channel.join(&mut clients, ClientId(1), None);
        assert_eq!(
            vec![
                ":alice!a@127.0.0.1 JOIN #test".to_string(),
                ":irc.irc 331 alice #test :No topic is set".to_string(),
                ":irc.irc 353 alice = #test :@alice".to_string(),
                ":irc.irc 366 alice #test :End of /NAMES list".to_string(),
            ],
            drain(&mut alice)
        );
        channel.join(&mut clients, ClientId(2), None);
        assert_eq!(
            vec![":bob!b@127.0.0.1 JOIN #test".to_string()],
            drain(&mut alice)
        );
        assert_eq!(
            vec![
                ":bob!b@127.0.0.1 JOIN #test".to_string(),
                ":irc.irc 331 bob #test :No topic is set".to_string(),
                ":irc.irc 353 bob = #test :@alice bob".to_string(),
                ":irc.irc 366 bob #test :End of /NAMES list".to_string(),
            ],
            drain(&mut bob)
        );
        assert!(channel.is_operator(ClientId(1)));
        assert!(!channel.is_operator(ClientId(2)));
        assert!(symmetric(&channel, &clients));

        // joining again does nothing
        channel.join(&mut clients, ClientId(2), None);
        assert!(drain(&mut bob).is_empty());
    }

    #[tokio::test]
    async fn test_channel_join_restrictions() {
        let mut clients = ClientMap::new();
        let mut bob = add_client(&mut clients, 2, "bob");
        let mut eve = add_client(&mut clients, 3, "eve");
        let mut channel = Channel::new(Name::new("#test"));
        channel.key = Some("secret".to_string());

        channel.join(&mut clients, ClientId(2), Some("wrong"));
        assert_eq!(
            vec![":irc.irc 475 bob #test :Cannot join channel (+k)".to_string()],
            drain(&mut bob)
        );
        channel.join(&mut clients, ClientId(2), Some("secret"));
        assert!(channel.is_member(ClientId(2)));
        drain(&mut bob);

        channel.user_limit = Some(1);
        channel.join(&mut clients, ClientId(3), Some("secret"));
        assert_eq!(
            vec![":irc.irc 471 eve #test :Cannot join channel (+l)".to_string()],
            drain(&mut eve)
        );

        channel.user_limit = None;
        channel.bans.add("eve!*");
        channel.join(&mut clients, ClientId(3), Some("secret"));
        assert_eq!(
            vec![":irc.irc 474 eve #test :Cannot join channel (+b)".to_string()],
            drain(&mut eve)
        );
        // except wins over ban
        channel.excepts.add("eve!e@*");
        channel.join(&mut clients, ClientId(3), Some("secret"));
        assert!(channel.is_member(ClientId(3)));
        assert!(symmetric(&channel, &clients));

        drain(&mut bob);
        let mut channel = Channel::new(Name::new("#private"));
        channel.join(&mut clients, ClientId(3), None);
        drain(&mut eve);
        channel.flags |= ChannelFlag::InviteOnly;
        channel.join(&mut clients, ClientId(2), None);
        assert_eq!(
            vec![":irc.irc 473 bob #private :Cannot join channel (+i)".to_string()],
            drain(&mut bob)
        );
        channel.invite(&clients, ClientId(3), ClientId(2));
        assert_eq!(
            vec![":irc.irc 341 eve bob #private".to_string()],
            drain(&mut eve)
        );
        assert_eq!(
            vec![":eve!e@127.0.0.1 INVITE bob #private".to_string()],
            drain(&mut bob)
        );
        channel.join(&mut clients, ClientId(2), None);
        assert!(channel.is_member(ClientId(2)));
    }

    #[tokio::test]
    async fn test_channel_part_and_kick() {
        let mut clients = ClientMap::new();
        let mut alice = add_client(&mut clients, 1, "alice");
        let mut bob = add_client(&mut clients, 2, "bob");
        let mut eve = add_client(&mut clients, 3, "eve");
        let mut channel = Channel::new(Name::new("#test"));
        for id in 1..=3 {
            channel.join(&mut clients, ClientId(id), None);
        }
        drain(&mut alice);
        drain(&mut bob);
        drain(&mut eve);

        // non-operator cannot kick
        channel.kick(&mut clients, ClientId(2), "alice", Some(ClientId(1)), "bye");
        assert_eq!(
            vec![":irc.irc 482 bob #test :You're not channel operator".to_string()],
            drain(&mut bob)
        );
        assert!(channel.is_member(ClientId(1)));

        channel.kick(&mut clients, ClientId(1), "carol", None, "bye");
        assert_eq!(
            vec![":irc.irc 441 alice carol #test :They aren't on that channel".to_string()],
            drain(&mut alice)
        );

        channel.kick(&mut clients, ClientId(1), "BOB", Some(ClientId(2)), "bye");
        let kick = ":alice!a@127.0.0.1 KICK #test bob :bye".to_string();
        assert_eq!(vec![kick.clone()], drain(&mut alice));
        assert_eq!(vec![kick.clone()], drain(&mut bob));
        assert_eq!(vec![kick], drain(&mut eve));
        assert!(!channel.is_member(ClientId(2)));
        assert!(symmetric(&channel, &clients));

        channel.part(&mut clients, ClientId(3), "later");
        let part = ":eve!e@127.0.0.1 PART #test :later".to_string();
        assert_eq!(vec![part.clone()], drain(&mut alice));
        assert_eq!(vec![part], drain(&mut eve));
        assert!(symmetric(&channel, &clients));

        channel.part(&mut clients, ClientId(3), "later");
        assert_eq!(
            vec![":irc.irc 442 eve #test :You're not on that channel".to_string()],
            drain(&mut eve)
        );
    }

    #[tokio::test]
    async fn test_channel_topic_and_messages() {
        let mut clients = ClientMap::new();
        let mut alice = add_client(&mut clients, 1, "alice");
        let mut bob = add_client(&mut clients, 2, "bob");
        let mut eve = add_client(&mut clients, 3, "eve");
        let mut channel = Channel::new(Name::new("#test"));
        channel.join(&mut clients, ClientId(1), None);
        channel.join(&mut clients, ClientId(2), None);
        drain(&mut alice);
        drain(&mut bob);

        channel.set_topic(&clients, ClientId(2), "bob's topic");
        let topic = ":bob!b@127.0.0.1 TOPIC #test :bob's topic".to_string();
        assert_eq!(vec![topic.clone()], drain(&mut alice));
        assert_eq!(vec![topic], drain(&mut bob));

        channel.flags |= ChannelFlag::TopicProtect;
        channel.set_topic(&clients, ClientId(2), "other");
        assert_eq!(
            vec![":irc.irc 482 bob #test :You're not channel operator".to_string()],
            drain(&mut bob)
        );
        assert_eq!("bob's topic", channel.topic);
        channel.get_topic(&clients[&ClientId(2)]);
        assert_eq!(
            vec![":irc.irc 332 bob #test :bob's topic".to_string()],
            drain(&mut bob)
        );

        channel.message(&clients, ClientId(1), "PRIVMSG", "hello");
        assert!(drain(&mut alice).is_empty());
        assert_eq!(
            vec![":alice!a@127.0.0.1 PRIVMSG #test :hello".to_string()],
            drain(&mut bob)
        );
        // outsiders may talk until +n
        channel.message(&clients, ClientId(3), "NOTICE", "hi");
        assert_eq!(1, drain(&mut bob).len());
        assert_eq!(1, drain(&mut alice).len());
        channel.flags |= ChannelFlag::NoOutside;
        channel.message(&clients, ClientId(3), "PRIVMSG", "hi");
        assert_eq!(
            vec![":irc.irc 404 eve #test :Cannot send to channel".to_string()],
            drain(&mut eve)
        );
        channel.flags |= ChannelFlag::Moderated;
        channel.message(&clients, ClientId(2), "PRIVMSG", "hi");
        assert_eq!(1, drain(&mut bob).len());
        assert!(drain(&mut alice).is_empty());
    }

    #[tokio::test]
    async fn test_channel_names_prefixes() {
        let mut clients = ClientMap::new();
        let mut alice = add_client(&mut clients, 1, "alice");
        add_client(&mut clients, 2, "bob");
        let mut channel = Channel::new(Name::new("#test"));
        channel.join(&mut clients, ClientId(1), None);
        channel.join(&mut clients, ClientId(2), None);
        channel.flags |= ChannelFlag::Secret;
        channel.members.insert(
            ClientId(1),
            MemberMode::Operator | MemberMode::Voice,
        );
        drain(&mut alice);

        channel.names(&clients, &clients[&ClientId(1)]);
        assert_eq!(
            vec![
                ":irc.irc 353 alice @ #test :@alice bob".to_string(),
                ":irc.irc 366 alice #test :End of /NAMES list".to_string(),
            ],
            drain(&mut alice)
        );
        if let Some(client) = clients.get_mut(&ClientId(1)) {
            client.multi_prefix = true;
        }
        channel.names(&clients, &clients[&ClientId(1)]);
        assert_eq!(
            ":irc.irc 353 alice @ #test :@+alice bob".to_string(),
            drain(&mut alice)[0]
        );
    }
}
