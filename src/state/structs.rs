// structs.rs - main state structures
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
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{Sender, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::*;

use super::conn::spawn_timer;
use super::{Envelope, Origin};
use crate::command::{Command, CONN_TIMEOUT};
use crate::reply::Reply;
use crate::utils::*;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub(crate) struct ClientId(pub(crate) u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(super) type ClientMap = HashMap<ClientId, Client>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) enum CapState {
    None,
    Negotiating,
    Negotiated,
}

flags! {
    pub(super) enum UserMode: u8 {
        Away = 0b0001,
        Invisible = 0b0010,
        Operator = 0b0100,
        Wallops = 0b1000,
    }
}

impl UserMode {
    pub(super) fn letter(self) -> char {
        match self {
            UserMode::Away => 'a',
            UserMode::Invisible => 'i',
            UserMode::Operator => 'o',
            UserMode::Wallops => 'w',
        }
    }
}

pub(super) const AVAILABLE_USER_MODES: &str = "aiow";

pub(super) fn user_modes_string(modes: FlagSet<UserMode>) -> String {
    let mut s = "+".to_string();
    s.extend(modes.into_iter().map(|m| m.letter()));
    s
}

// timers of one client. Every touch bumps the generation: timer events
// carrying an older generation are dropped by the event loop.
pub(super) struct ClientTimers {
    commands: Sender<Envelope>,
    idle_timeout: Duration,
    quit_timeout: Duration,
    generation: u64,
    idle: Option<JoinHandle<()>>,
    quit: Option<JoinHandle<()>>,
}

impl ClientTimers {
    pub(super) fn new(
        commands: Sender<Envelope>,
        idle_timeout: Duration,
        quit_timeout: Duration,
    ) -> ClientTimers {
        ClientTimers {
            commands,
            idle_timeout,
            quit_timeout,
            generation: 0,
            idle: None,
            quit: None,
        }
    }

    fn stop_idle(&mut self) {
        if let Some(handle) = self.idle.take() {
            handle.abort();
        }
    }

    fn stop_quit(&mut self) {
        if let Some(handle) = self.quit.take() {
            handle.abort();
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub(super) struct WhoWasEntry {
    pub(super) nickname: Name,
    pub(super) username: String,
    pub(super) hostname: String,
    pub(super) realname: String,
}

pub(crate) struct Client {
    pub(super) id: ClientId,
    pub(super) server_name: Arc<str>,
    pub(super) nick: Option<Name>,
    pub(super) username: Option<Name>,
    pub(super) realname: String,
    pub(super) hostname: String,
    pub(super) peer: IpAddr,
    pub(super) proxied: bool,
    pub(super) ctime: i64,
    pub(super) atime: i64,
    pub(super) registered: bool,
    pub(super) authorized: bool,
    pub(super) has_quit: bool,
    pub(super) cap_state: CapState,
    pub(super) multi_prefix: bool,
    pub(super) modes: FlagSet<UserMode>,
    pub(super) away_message: Option<String>,
    pub(super) channels: HashSet<Name>,
    sender: UnboundedSender<String>,
    timers: ClientTimers,
    connection: Option<JoinHandle<()>>,
}

impl Client {
    pub(super) fn new(
        id: ClientId,
        server_name: Arc<str>,
        peer: IpAddr,
        authorized: bool,
        sender: UnboundedSender<String>,
        timers: ClientTimers,
    ) -> Client {
        let now = chrono::Local::now().timestamp();
        Client {
            id,
            server_name,
            nick: None,
            username: None,
            realname: String::new(),
            hostname: peer.to_string(),
            peer,
            proxied: false,
            ctime: now,
            atime: now,
            registered: false,
            authorized,
            has_quit: false,
            cap_state: CapState::None,
            multi_prefix: false,
            modes: FlagSet::default(),
            away_message: None,
            channels: HashSet::new(),
            sender,
            timers,
            connection: None,
        }
    }

    pub(super) fn set_connection(&mut self, connection: JoinHandle<()>) {
        self.connection = Some(connection);
    }

    pub(super) fn nick_or_star(&self) -> &str {
        self.nick.as_ref().map(|n| n.as_str()).unwrap_or("*")
    }

    pub(super) fn username_or_star(&self) -> &str {
        self.username.as_ref().map(|n| n.as_str()).unwrap_or("*")
    }

    /// Identity as used in message sources and masks: nick!user@host.
    pub(super) fn user_host(&self) -> String {
        format!(
            "{}!{}@{}",
            self.nick_or_star(),
            self.username_or_star(),
            self.hostname
        )
    }

    pub(super) fn is_operator(&self) -> bool {
        self.modes.contains(UserMode::Operator)
    }

    pub(super) fn is_invisible(&self) -> bool {
        self.modes.contains(UserMode::Invisible)
    }

    pub(super) fn modes_string(&self) -> String {
        user_modes_string(self.modes)
    }

    pub(super) fn can_register(&self) -> bool {
        !self.registered
            && self.nick.is_some()
            && self.username.is_some()
            && self.cap_state != CapState::Negotiating
    }

    pub(super) fn whowas_entry(&self) -> Option<WhoWasEntry> {
        self.nick.as_ref().map(|nick| WhoWasEntry {
            nickname: nick.clone(),
            username: self.username_or_star().to_string(),
            hostname: self.hostname.clone(),
            realname: self.realname.clone(),
        })
    }

    pub(super) fn send(&self, line: String) {
        if self.has_quit {
            return;
        }
        if self.sender.send(line).is_err() {
            debug!("Client {} output is closed", self.id);
        }
    }

    pub(super) fn reply(&self, reply: Reply<'_>) {
        self.send(format!(":{} {}", self.server_name, reply));
    }

    pub(super) fn notice(&self, text: &str) {
        self.send(format!(
            ":{} NOTICE {} :{}",
            self.server_name,
            self.nick_or_star(),
            text
        ));
    }

    pub(super) fn active(&mut self) {
        self.atime = chrono::Local::now().timestamp();
    }

    pub(super) fn idle_seconds(&self) -> u64 {
        (chrono::Local::now().timestamp() - self.atime).max(0) as u64
    }

    pub(super) fn timer_generation(&self) -> u64 {
        self.timers.generation
    }

    /// Restart idle detection and cancel a pending quit timeout.
    pub(super) fn touch(&mut self) {
        let timers = &mut self.timers;
        timers.generation += 1;
        timers.stop_quit();
        timers.stop_idle();
        timers.idle = Some(spawn_timer(
            timers.commands.clone(),
            timers.idle_timeout,
            Envelope {
                client: self.id,
                origin: Origin::IdleTimer(timers.generation),
                command: Command::IDLE,
            },
        ));
    }

    /// Probe an idle client and give it quit_timeout to answer.
    pub(super) fn mark_idle(&mut self) {
        self.send(format!("PING :{}", self.server_name));
        let timers = &mut self.timers;
        timers.stop_quit();
        timers.quit = Some(spawn_timer(
            timers.commands.clone(),
            timers.quit_timeout,
            Envelope {
                client: self.id,
                origin: Origin::QuitTimer(timers.generation),
                command: Command::QUIT {
                    message: CONN_TIMEOUT.to_string(),
                    reason: CONN_TIMEOUT.to_string(),
                },
            },
        ));
    }

    pub(super) fn cancel_timers(&mut self) {
        self.timers.generation += 1;
        self.timers.stop_idle();
        self.timers.stop_quit();
    }

    // stops reading. Writer finishes after the last queued line
    // when this client (holding the sender) is dropped.
    pub(super) fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.abort();
        }
    }
}

/// Nickname index of registered clients.
#[derive(Default)]
pub(super) struct ClientRegistry {
    by_nick: HashMap<Name, ClientId>,
}

impl ClientRegistry {
    pub(super) fn add(&mut self, nick: Name, id: ClientId) -> bool {
        if self.by_nick.contains_key(&nick) {
            false
        } else {
            self.by_nick.insert(nick, id);
            true
        }
    }

    pub(super) fn remove(&mut self, nick: &Name) -> Option<ClientId> {
        self.by_nick.remove(nick)
    }

    pub(super) fn get(&self, nick: &str) -> Option<ClientId> {
        self.by_nick.get(&Name::new(nick)).copied()
    }

    /// All clients whose nickname matches an exact or prefix mask, sorted by nick.
    pub(super) fn find_all(&self, mask: &str) -> Vec<ClientId> {
        let mut found = self
            .by_nick
            .iter()
            .filter(|(nick, _)| mask_matches(mask, nick.as_str()))
            .collect::<Vec<_>>();
        found.sort_by(|(a, _), (b, _)| a.folded().cmp(b.folded()));
        found.into_iter().map(|(_, id)| *id).collect()
    }

    pub(super) fn len(&self) -> usize {
        self.by_nick.len()
    }
}

/// Fixed-capacity ring of departed and renamed identities.
pub(super) struct WhoWasList {
    capacity: usize,
    buffer: VecDeque<WhoWasEntry>,
}

impl WhoWasList {
    pub(super) fn new(capacity: usize) -> WhoWasList {
        let capacity = capacity.max(1);
        WhoWasList {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub(super) fn append(&mut self, entry: WhoWasEntry) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(entry);
    }

    /// Most recent first. A limit of 0 returns every match.
    pub(super) fn find(&self, nick: &str, limit: usize) -> Vec<&WhoWasEntry> {
        let nick = Name::new(nick);
        let matches = self.buffer.iter().rev().filter(|e| e.nickname == nick);
        if limit == 0 {
            matches.collect()
        } else {
            matches.take(limit).collect()
        }
    }

    pub(super) fn len(&self) -> usize {
        self.buffer.len()
    }
}
