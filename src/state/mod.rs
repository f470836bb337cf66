// mod.rs - main state
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

//! Server state owned by one event loop. Connection readers and timers
//! never touch it: they only enqueue `Envelope`s which the loop
//! processes one at a time.

use futures::SinkExt;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fs;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, Receiver, Sender, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::*;

use crate::command::*;
use crate::config::*;
use crate::reply::Reply::*;
use crate::store::ChannelStore;
use crate::utils::*;

mod channel;
mod channel_cmds;
mod conn;
mod conn_cmds;
mod rest_cmds;
mod structs;

use channel::*;
use conn::*;
pub(crate) use structs::ClientId;
use structs::*;

pub(super) const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));

/// Who produced an envelope. Timer envelopes carry the generation of the
/// client timers that armed them.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Origin {
    Connection,
    IdleTimer(u64),
    QuitTimer(u64),
}

/// One unit of work for the event loop.
#[derive(Debug, PartialEq)]
pub(crate) struct Envelope {
    pub(crate) client: ClientId,
    pub(crate) origin: Origin,
    pub(crate) command: Command,
}

pub(crate) struct ServerState {
    config: Arc<MainConfig>,
    server_name: Arc<str>,
    created: String,
    motd: Option<String>,
    clients: ClientMap,
    registry: ClientRegistry,
    channels: HashMap<Name, Channel>,
    whowas: WhoWasList,
    store: Option<Box<dyn ChannelStore>>,
    commands: Sender<Envelope>,
    next_id: u64,
}

impl ServerState {
    pub(crate) fn new(
        config: Arc<MainConfig>,
        store: Option<Box<dyn ChannelStore>>,
        commands: Sender<Envelope>,
    ) -> Result<ServerState, Box<dyn Error>> {
        let mut channels = HashMap::new();
        if let Some(ref store) = store {
            for row in store.load_channels()? {
                let channel = Channel::from_row(&row);
                channels.insert(channel.name.clone(), channel);
            }
        }
        let motd = match config.motd.as_ref() {
            Some(path) => match fs::read_to_string(path) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("Cannot read MOTD file {}: {}", path, e);
                    None
                }
            },
            None => None,
        };
        Ok(ServerState {
            server_name: Arc::from(config.name.as_str()),
            created: chrono::Local::now().to_rfc2822(),
            motd,
            clients: HashMap::new(),
            registry: ClientRegistry::default(),
            channels,
            whowas: WhoWasList::new(config.whowas_length),
            store,
            commands,
            next_id: 1,
            config,
        })
    }

    pub(crate) fn add_client(&mut self, peer: IpAddr, sender: UnboundedSender<String>) -> ClientId {
        let id = ClientId(self.next_id);
        self.next_id += 1;
        let timers = ClientTimers::new(
            self.commands.clone(),
            self.config.idle_timeout(),
            self.config.quit_timeout(),
        );
        let mut client = Client::new(
            id,
            self.server_name.clone(),
            peer,
            self.config.password.is_none(),
            sender,
            timers,
        );
        client.touch();
        self.clients.insert(id, client);
        id
    }

    /// Admit a new connection: create the client and start its tasks.
    pub(crate) fn accept(&mut self, stream: TcpStream, addr: SocketAddr) {
        if let Some(max_connections) = self.config.max_connections {
            if self.clients.len() >= max_connections {
                warn!("Too many connections, rejecting {}", addr);
                tokio::spawn(async move {
                    let mut sink = FramedWrite::new(stream, IRCLinesCodec::new());
                    let _ = sink.send("ERROR :Too many connections").await;
                });
                return;
            }
        }
        let (read_half, write_half) = stream.into_split();
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.add_client(addr.ip(), sender);
        info!("Accepted connection {} from {}", id, addr);

        tokio::spawn(write_loop(
            id,
            FramedWrite::new(write_half, IRCLinesCodec::new_with_max_length(MAX_LINE_LENGTH)),
            receiver,
            self.commands.clone(),
        ));
        let reader = tokio::spawn(read_loop(
            id,
            FramedRead::new(read_half, IRCLinesCodec::new_with_max_length(MAX_LINE_LENGTH)),
            self.commands.clone(),
            self.config.clone(),
            addr.ip(),
        ));
        if let Some(client) = self.clients.get_mut(&id) {
            client.set_connection(reader);
        }
    }

    pub(crate) fn process(&mut self, envelope: Envelope) {
        use Command::*;
        let Envelope {
            client: id,
            origin,
            command,
        } = envelope;
        let client = match self.clients.get_mut(&id) {
            Some(client) => client,
            None => {
                debug!("Command for gone client {}", id);
                return;
            }
        };
        match origin {
            Origin::IdleTimer(generation) | Origin::QuitTimer(generation)
                if generation != client.timer_generation() =>
            {
                debug!("Stale timer event for {}", id);
                return;
            }
            _ => (),
        }

        let cmd_id = command.id();
        if !client.registered {
            if !cmd_id.pre_registration {
                debug!("Unexpected {} from unregistered {}", cmd_id.name, id);
                self.quit_client(id, CONN_UNEXPECTED, CONN_UNEXPECTED);
                return;
            }
        } else if !cmd_id.post_registration {
            let name = match command {
                UNKNOWN { ref name } => name.as_str(),
                _ => cmd_id.name,
            };
            client.reply(ErrUnknownCommand421 {
                client: client.nick_or_star(),
                command: name,
            });
            return;
        }

        match command.pre_handle() {
            PreHandle::ActiveAndTouch => {
                client.active();
                client.touch();
            }
            PreHandle::TouchOnly => client.touch(),
            PreHandle::Nothing => (),
        }

        match command {
            CAP { subcommand, caps } => self.process_cap(id, subcommand, caps),
            PASS { password } => self.process_pass(id, password),
            PROXY { hostname } => self.process_proxy(id, hostname),
            NICK { nickname } => self.process_nick(id, &nickname),
            USER {
                username,
                mode,
                realname,
            } => self.process_user(id, username, mode, realname),
            QUIT { message, reason } => self.quit_client(id, &message, &reason),
            PING { token } => self.process_ping(id, &token),
            PONG { .. } => (),
            OPER { name, password } => self.process_oper(id, &name, password),
            JOIN { channels, keys } => self.process_join(id, channels, keys),
            PART { channels, message } => self.process_part(id, channels, message),
            TOPIC { channel, topic } => self.process_topic(id, &channel, topic),
            NAMES { channels } => self.process_names(id, channels),
            LIST { channels, target } => self.process_list(id, channels, target),
            INVITE { nickname, channel } => self.process_invite(id, &nickname, &channel),
            KICK {
                channels,
                users,
                comment,
            } => self.process_kick(id, channels, users, comment),
            MODE {
                target,
                modestring,
                args,
            } => {
                if is_channel_name(&target) {
                    self.process_channel_mode(id, &target, modestring, args)
                } else {
                    self.process_user_mode(id, &target, modestring)
                }
            }
            PRIVMSG { targets, text } => self.process_message(id, "PRIVMSG", targets, &text),
            NOTICE { targets, text } => self.process_message(id, "NOTICE", targets, &text),
            WHO {
                mask,
                operators_only,
            } => self.process_who(id, mask, operators_only),
            WHOIS { masks } => self.process_whois(id, masks),
            WHOWAS { nicknames, count } => self.process_whowas(id, nicknames, count),
            KILL { nickname, comment } => self.process_kill(id, &nickname, &comment),
            AWAY { text } => self.process_away(id, text),
            ISON { nicknames } => self.process_ison(id, nicknames),
            MOTD { target } => self.process_motd(id, target),
            VERSION { target } => self.process_version(id, target),
            TIME { target } => self.process_time(id, target),
            THEATER(subcommand) => self.process_theater(id, subcommand),
            IDLE => self.process_idle(id),
            HOSTNAME { hostname } => self.process_hostname(id, hostname),
            MALFORMED { error } => self.process_malformed(id, error),
            // rejected by the dispatch table
            UNKNOWN { .. } => (),
        }
    }

    /// The client and every member of every channel it occupies.
    pub(super) fn friends(&self, id: ClientId) -> HashSet<ClientId> {
        let mut friends = HashSet::from([id]);
        if let Some(client) = self.clients.get(&id) {
            client
                .channels
                .iter()
                .filter_map(|name| self.channels.get(name))
                .for_each(|channel| friends.extend(channel.members.keys().copied()));
        }
        friends
    }

    pub(super) fn drop_channel_if_empty(&mut self, name: &Name) {
        let remove = self
            .channels
            .get(name)
            .map(|ch| ch.is_empty() && !ch.persistent)
            .unwrap_or(false);
        if remove {
            self.channels.remove(name);
            info!("Channel {} removed", name);
        }
    }

    pub(crate) fn shutdown(&mut self) {
        info!("Server is shutting down");
        self.clients
            .values()
            .filter(|c| c.registered)
            .for_each(|c| c.notice("shutting down"));
        for (_, mut client) in self.clients.drain() {
            client.cancel_timers();
            client.close();
        }
        self.registry = ClientRegistry::default();
        if let Some(store) = self.store.take() {
            if let Err(e) = store.close() {
                error!("Closing database failed: {}", e);
            }
        }
    }
}

async fn accept_loop(listener: TcpListener, connections: Sender<(TcpStream, SocketAddr)>) {
    loop {
        match listener.accept().await {
            Ok(conn) => {
                if connections.send(conn).await.is_err() {
                    break;
                }
            }
            Err(e) => error!("Accept connection error: {}", e),
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> Result<impl Future<Output = &'static str>, Box<dyn Error>> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut quit = signal(SignalKind::quit())?;
    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
            _ = hangup.recv() => "SIGHUP",
            _ = quit.recv() => "SIGQUIT",
        }
    })
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<impl Future<Output = &'static str>, Box<dyn Error>> {
    Ok(async move {
        let _ = tokio::signal::ctrl_c().await;
        "Ctrl-C"
    })
}

async fn event_loop(
    mut state: ServerState,
    mut commands: Receiver<Envelope>,
    mut connections: Receiver<(TcpStream, SocketAddr)>,
    signal: impl Future<Output = &'static str>,
    stop: oneshot::Receiver<()>,
) {
    // a dropped ServerControl does not stop the server
    let stop = async move {
        if stop.await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    tokio::pin!(signal);
    tokio::pin!(stop);
    loop {
        tokio::select! {
            name = &mut signal => {
                info!("Received {}", name);
                break;
            }
            _ = &mut stop => {
                info!("Shutdown requested");
                break;
            }
            Some((stream, addr)) = connections.recv() => state.accept(stream, addr),
            Some(envelope) = commands.recv() => state.process(envelope),
            else => break,
        }
    }
    state.shutdown();
}

/// Handle to a running server.
pub(crate) struct ServerControl {
    pub(crate) local_addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
}

impl ServerControl {
    pub(crate) fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

pub(crate) async fn run_server(
    config: MainConfig,
    store: Option<Box<dyn ChannelStore>>,
) -> Result<(ServerControl, JoinHandle<()>), Box<dyn Error>> {
    let listener = TcpListener::bind((config.listen, config.port)).await?;
    let local_addr = listener.local_addr()?;
    let signal = shutdown_signal().await?;
    // unbuffered hand-off: senders wait until the loop takes the envelope
    let (commands, command_receiver) = mpsc::channel(1);
    let state = ServerState::new(Arc::new(config), store, commands)?;
    let (conn_sender, conn_receiver) = mpsc::channel(1);
    let (stop_sender, stop_receiver) = oneshot::channel();

    info!("Listening on {}", local_addr);
    let acceptor = tokio::spawn(accept_loop(listener, conn_sender));
    let handle = tokio::spawn(async move {
        event_loop(state, command_receiver, conn_receiver, signal, stop_receiver).await;
        acceptor.abort();
    });
    Ok((
        ServerControl {
            local_addr,
            stop: Some(stop_sender),
        },
        handle,
    ))
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::time;
    use tokio_stream::StreamExt;
    use tokio_util::codec::Framed;

    pub(crate) async fn run_test_server(
        config: MainConfig,
    ) -> (ServerControl, JoinHandle<()>, u16) {
        run_test_server_with_store(config, None).await
    }

    pub(crate) async fn run_test_server_with_store(
        mut config: MainConfig,
        store: Option<Box<dyn ChannelStore>>,
    ) -> (ServerControl, JoinHandle<()>, u16) {
        config.port = 0;
        let (control, handle) = run_server(config, store).await.unwrap();
        let port = control.local_addr.port();
        (control, handle, port)
    }

    pub(crate) async fn quit_test_server(mut control: ServerControl, handle: JoinHandle<()>) {
        control.shutdown();
        handle.await.unwrap();
    }

    pub(crate) async fn connect_to_test(port: u16) -> Framed<TcpStream, IRCLinesCodec> {
        let stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        Framed::new(stream, IRCLinesCodec::new())
    }

    pub(crate) async fn login_to_test(
        port: u16,
        nick: &str,
        name: &str,
        realname: &str,
    ) -> Framed<TcpStream, IRCLinesCodec> {
        let mut line_stream = connect_to_test(port).await;
        line_stream.send(format!("NICK {}", nick)).await.unwrap();
        line_stream
            .send(format!("USER {} 0 * :{}", name, realname))
            .await
            .unwrap();
        line_stream
    }

    // skips welcome replies and the missing MOTD
    pub(crate) async fn login_to_test_and_skip(
        port: u16,
        nick: &str,
        name: &str,
        realname: &str,
    ) -> Framed<TcpStream, IRCLinesCodec> {
        let mut line_stream = login_to_test(port, nick, name, realname).await;
        for _ in 0..5 {
            line_stream.next().await.unwrap().unwrap();
        }
        line_stream
    }

    // state driven directly, without sockets

    pub(crate) fn test_state(config: MainConfig) -> (ServerState, Receiver<Envelope>) {
        let (commands, receiver) = mpsc::channel(1);
        let state = ServerState::new(Arc::new(config), None, commands).unwrap();
        (state, receiver)
    }

    pub(crate) fn connect(state: &mut ServerState) -> (ClientId, UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = state.add_client("127.0.0.1".parse().unwrap(), sender);
        (id, receiver)
    }

    pub(crate) fn send_line(state: &mut ServerState, id: ClientId, line: &str) {
        if let Some(command) = Command::parse_line(line) {
            send_command(state, id, command);
        }
    }

    pub(crate) fn send_command(state: &mut ServerState, id: ClientId, command: Command) {
        state.process(Envelope {
            client: id,
            origin: Origin::Connection,
            command,
        });
    }

    pub(crate) fn drain(receiver: &mut UnboundedReceiver<String>) -> Vec<String> {
        let mut lines = vec![];
        while let Ok(line) = receiver.try_recv() {
            lines.push(line);
        }
        lines
    }

    /// Registered client with the welcome sequence already drained.
    pub(crate) fn register(
        state: &mut ServerState,
        nick: &str,
    ) -> (ClientId, UnboundedReceiver<String>) {
        let (id, mut receiver) = connect(state);
        send_line(state, id, &format!("NICK {}", nick));
        send_line(state, id, &format!("USER {} 0 * :{} Real", nick, nick));
        drain(&mut receiver);
        (id, receiver)
    }

    pub(crate) fn is_registry_consistent(state: &ServerState) -> bool {
        state.clients.values().all(|c| {
            let indexed = c
                .nick
                .as_ref()
                .and_then(|n| state.registry.get(n.as_str()))
                == Some(c.id);
            indexed == (c.registered && !c.has_quit)
        }) && state.registry.len() == state.clients.values().filter(|c| c.registered).count()
    }

    pub(crate) fn is_membership_symmetric(state: &ServerState) -> bool {
        state.clients.values().all(|c| {
            c.channels.iter().all(|name| {
                state
                    .channels
                    .get(name)
                    .map(|ch| ch.is_member(c.id))
                    .unwrap_or(false)
            })
        }) && state.channels.values().all(|ch| {
            ch.members.keys().all(|id| {
                state
                    .clients
                    .get(id)
                    .map(|c| c.channels.contains(&ch.name))
                    .unwrap_or(false)
            })
        })
    }

    #[tokio::test]
    async fn test_process_stale_timer_events() {
        let (mut state, _receiver) = test_state(MainConfig::default());
        let (id, mut output) = register(&mut state, "alice");
        let generation = state.clients[&id].timer_generation();

        state.process(Envelope {
            client: id,
            origin: Origin::IdleTimer(generation - 1),
            command: Command::IDLE,
        });
        assert!(drain(&mut output).is_empty());
        state.process(Envelope {
            client: id,
            origin: Origin::IdleTimer(generation),
            command: Command::IDLE,
        });
        assert_eq!(vec!["PING :irc.irc".to_string()], drain(&mut output));

        // activity makes the pending quit timeout stale
        send_line(&mut state, id, "PONG :irc.irc");
        state.process(Envelope {
            client: id,
            origin: Origin::QuitTimer(generation),
            command: Command::QUIT {
                message: CONN_TIMEOUT.to_string(),
                reason: CONN_TIMEOUT.to_string(),
            },
        });
        assert!(state.clients.contains_key(&id));

        let generation = state.clients[&id].timer_generation();
        state.process(Envelope {
            client: id,
            origin: Origin::QuitTimer(generation),
            command: Command::QUIT {
                message: CONN_TIMEOUT.to_string(),
                reason: CONN_TIMEOUT.to_string(),
            },
        });
        assert!(!state.clients.contains_key(&id));
        assert_eq!(
            vec!["ERROR :connection timeout".to_string()],
            drain(&mut output)
        );
        // events for gone clients are ignored
        send_line(&mut state, id, "PING :x");
        assert!(is_registry_consistent(&state));
    }

    #[tokio::test]
    async fn test_process_registration_gating() {
        let (mut state, _receiver) = test_state(MainConfig::default());
        let (id, mut output) = connect(&mut state);
        send_line(&mut state, id, "NICK alice");
        send_line(&mut state, id, "JOIN #test");
        assert_eq!(
            vec!["ERROR :unexpected command".to_string()],
            drain(&mut output)
        );
        assert!(!state.clients.contains_key(&id));
        assert!(state.channels.is_empty());
        assert_eq!(0, state.registry.len());

        let (id, mut output) = connect(&mut state);
        send_line(&mut state, id, "FOO bar");
        assert_eq!(
            vec!["ERROR :unexpected command".to_string()],
            drain(&mut output)
        );

        let (id, mut output) = register(&mut state, "bob");
        send_line(&mut state, id, "FOO bar");
        send_line(&mut state, id, "PROXY TCP4 10.0.0.1 10.0.0.2 1000 6667");
        assert_eq!(
            vec![
                ":irc.irc 421 bob FOO :Unknown command".to_string(),
                ":irc.irc 421 bob PROXY :Unknown command".to_string(),
            ],
            drain(&mut output)
        );
        assert!(state.clients.contains_key(&id));
    }

    #[tokio::test]
    async fn test_process_shutdown() {
        let (mut state, _receiver) = test_state(MainConfig::default());
        let (_, mut alice) = register(&mut state, "alice");
        let (_, mut unregistered) = connect(&mut state);
        state.shutdown();
        assert_eq!(
            vec![":irc.irc NOTICE alice :shutting down".to_string()],
            drain(&mut alice)
        );
        assert!(drain(&mut unregistered).is_empty());
        assert!(state.clients.is_empty());
        assert_eq!(0, state.registry.len());
    }

    #[tokio::test]
    async fn test_run_server_persistent_channels() {
        let store = crate::store::SqliteStore::open_memory().unwrap();
        store
            .save_channel(&crate::store::ChannelRow {
                name: "#stored".to_string(),
                flags: "t".to_string(),
                topic: "kept topic".to_string(),
                ..Default::default()
            })
            .unwrap();
        let (control, handle, port) =
            run_test_server_with_store(MainConfig::default(), Some(Box::new(store))).await;
        {
            let mut line_stream = login_to_test_and_skip(port, "alice", "alice", "Alice").await;
            line_stream.send("LIST".to_string()).await.unwrap();
            assert_eq!(
                ":irc.irc 322 alice #stored 0 :kept topic".to_string(),
                line_stream.next().await.unwrap().unwrap()
            );
            assert_eq!(
                ":irc.irc 323 alice :End of /LIST".to_string(),
                line_stream.next().await.unwrap().unwrap()
            );
            line_stream.send("JOIN #stored".to_string()).await.unwrap();
            line_stream.send("PART #stored".to_string()).await.unwrap();
            for _ in 0..5 {
                line_stream.next().await.unwrap().unwrap();
            }
            // still listed after the last member left
            line_stream.send("LIST".to_string()).await.unwrap();
            assert_eq!(
                ":irc.irc 322 alice #stored 0 :kept topic".to_string(),
                line_stream.next().await.unwrap().unwrap()
            );
            line_stream.next().await.unwrap().unwrap();
        }
        quit_test_server(control, handle).await;
    }

    #[tokio::test]
    async fn test_run_server_shutdown_notifies_clients() {
        let (control, handle, port) = run_test_server(MainConfig::default()).await;
        let mut line_stream = login_to_test_and_skip(port, "alice", "alice", "Alice").await;
        line_stream.send("PING :sync".to_string()).await.unwrap();
        assert_eq!(
            ":irc.irc PONG irc.irc :sync".to_string(),
            line_stream.next().await.unwrap().unwrap()
        );
        quit_test_server(control, handle).await;
        assert_eq!(
            ":irc.irc NOTICE alice :shutting down".to_string(),
            line_stream.next().await.unwrap().unwrap()
        );
        assert!(line_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_run_server_max_connections() {
        let mut config = MainConfig::default();
        config.max_connections = Some(1);
        let (control, handle, port) = run_test_server(config).await;
        {
            let mut first = login_to_test_and_skip(port, "alice", "alice", "Alice").await;
            let mut second = connect_to_test(port).await;
            assert_eq!(
                "ERROR :Too many connections".to_string(),
                second.next().await.unwrap().unwrap()
            );
            assert!(second.next().await.is_none());

            first.send("QUIT :bye".to_string()).await.unwrap();
            assert_eq!(
                "ERROR :client quit".to_string(),
                first.next().await.unwrap().unwrap()
            );
            time::sleep(Duration::from_millis(50)).await;
            let mut third = login_to_test(port, "bob", "bob", "Bob").await;
            assert_eq!(
                ":irc.irc 001 bob :Welcome to the IRCnetwork Network, bob!bob@127.0.0.1"
                    .to_string(),
                third.next().await.unwrap().unwrap()
            );
        }
        quit_test_server(control, handle).await;
    }
}
