// command.rs - commands
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

use const_table::const_table;
use std::error::Error;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum MessageError {
    Empty,
    WrongSource,
    NoCommand,
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::Empty => write!(f, "Message is empty"),
            MessageError::WrongSource => write!(f, "Wrong source syntax"),
            MessageError::NoCommand => write!(f, "No command"),
        }
    }
}

impl Error for MessageError {}

#[derive(PartialEq, Eq, Debug)]
pub(crate) struct Message<'a> {
    pub(crate) source: Option<&'a str>,
    pub(crate) command: &'a str,
    pub(crate) params: Vec<&'a str>,
}

fn validate_source(s: &str) -> bool {
    if s.is_empty() || s.contains(':') {
        false
    } else {
        let excl = s.find('!');
        let atchar = s.find('@');
        if let Some(excl_pos) = excl {
            if let Some(atchar_pos) = atchar {
                return excl_pos < atchar_pos;
            }
        }
        true
    }
}

impl<'a> Message<'a> {
    pub(crate) fn from_shared_str(input: &'a str) -> Result<Self, MessageError> {
        let trimmed = input.trim_start();
        if trimmed.is_empty() {
            return Err(MessageError::Empty);
        }

        // source after ':' at start of line
        let (source, rest) = if let Some(stripped) = trimmed.strip_prefix(':') {
            let (s, rest) = stripped.split_once(' ').unwrap_or((stripped, ""));
            if !validate_source(s) {
                return Err(MessageError::WrongSource);
            }
            (Some(s), rest.trim_start())
        } else {
            (None, trimmed)
        };

        // trailing parameter starts at first " :"
        let (middle, last_param) = if let Some(lp) = rest.strip_prefix(':') {
            ("", Some(lp))
        } else if let Some((m, lp)) = rest.split_once(" :") {
            (m, Some(lp))
        } else {
            (rest, None)
        };

        let mut words = middle.split_ascii_whitespace();
        let command = match words.next() {
            Some(cmd) => cmd,
            None => return Err(MessageError::NoCommand),
        };
        let mut params = words.collect::<Vec<_>>();
        if let Some(lp) = last_param {
            params.push(lp); // add last parameter
        }
        Ok(Message {
            source,
            command,
            params,
        })
    }
}

// Dispatch rows: which registration phase accepts each command kind.
#[const_table]
pub(crate) enum CommandId {
    CommandName {
        pub name: &'static str,
        pub pre_registration: bool,
        pub post_registration: bool,
    },
    CAPId = CommandName { name: "CAP", pre_registration: true, post_registration: true },
    PASSId = CommandName { name: "PASS", pre_registration: true, post_registration: true },
    PROXYId = CommandName { name: "PROXY", pre_registration: true, post_registration: false },
    NICKId = CommandName { name: "NICK", pre_registration: true, post_registration: true },
    USERId = CommandName { name: "USER", pre_registration: true, post_registration: true },
    QUITId = CommandName { name: "QUIT", pre_registration: true, post_registration: true },
    PINGId = CommandName { name: "PING", pre_registration: false, post_registration: true },
    PONGId = CommandName { name: "PONG", pre_registration: true, post_registration: true },
    OPERId = CommandName { name: "OPER", pre_registration: false, post_registration: true },
    JOINId = CommandName { name: "JOIN", pre_registration: false, post_registration: true },
    PARTId = CommandName { name: "PART", pre_registration: false, post_registration: true },
    TOPICId = CommandName { name: "TOPIC", pre_registration: false, post_registration: true },
    NAMESId = CommandName { name: "NAMES", pre_registration: false, post_registration: true },
    LISTId = CommandName { name: "LIST", pre_registration: false, post_registration: true },
    INVITEId = CommandName { name: "INVITE", pre_registration: false, post_registration: true },
    KICKId = CommandName { name: "KICK", pre_registration: false, post_registration: true },
    MODEId = CommandName { name: "MODE", pre_registration: false, post_registration: true },
    PRIVMSGId = CommandName { name: "PRIVMSG", pre_registration: false, post_registration: true },
    NOTICEId = CommandName { name: "NOTICE", pre_registration: false, post_registration: true },
    WHOId = CommandName { name: "WHO", pre_registration: false, post_registration: true },
    WHOISId = CommandName { name: "WHOIS", pre_registration: false, post_registration: true },
    WHOWASId = CommandName { name: "WHOWAS", pre_registration: false, post_registration: true },
    KILLId = CommandName { name: "KILL", pre_registration: false, post_registration: true },
    AWAYId = CommandName { name: "AWAY", pre_registration: false, post_registration: true },
    ISONId = CommandName { name: "ISON", pre_registration: false, post_registration: true },
    MOTDId = CommandName { name: "MOTD", pre_registration: false, post_registration: true },
    VERSIONId = CommandName { name: "VERSION", pre_registration: false, post_registration: true },
    TIMEId = CommandName { name: "TIME", pre_registration: false, post_registration: true },
    THEATERId = CommandName { name: "THEATER", pre_registration: false, post_registration: true },
    // internal commands, never parsed from the wire
    IDLEId = CommandName { name: "IDLE", pre_registration: true, post_registration: true },
    HOSTNAMEId = CommandName { name: "HOSTNAME", pre_registration: true, post_registration: true },
    MALFORMEDId = CommandName { name: "MALFORMED", pre_registration: true, post_registration: true },
    UNKNOWNId = CommandName { name: "UNKNOWN", pre_registration: false, post_registration: false },
}

use CommandId::*;

#[derive(Clone, Debug)]
pub(crate) enum CommandError {
    UnknownCommand(String),
    UnknownSubcommand(CommandId, String),
    NeedMoreParams(CommandId),
    WrongParameter(CommandId, usize),
    WrongMessage(MessageError),
    InputTooLong,
}

use CommandError::*;

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownCommand(s) => write!(f, "Unknown command '{}'", s),
            UnknownSubcommand(cmd, scmd) => write!(
                f,
                "Unknown subcommand '{}' in command '{}'",
                scmd, cmd.name
            ),
            NeedMoreParams(s) => write!(f, "Command '{}' needs more parameters", s.name),
            WrongParameter(s, i) => write!(f, "Wrong parameter {} in command '{}'", i, s.name),
            WrongMessage(e) => write!(f, "Wrong message: {}", e),
            InputTooLong => write!(f, "Input line too long"),
        }
    }
}

impl Error for CommandError {}

impl PartialEq for CommandError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (UnknownCommand(a), UnknownCommand(b)) => a == b,
            (UnknownSubcommand(a, sa), UnknownSubcommand(b, sb)) => a.name == b.name && sa == sb,
            (NeedMoreParams(a), NeedMoreParams(b)) => a.name == b.name,
            (WrongParameter(a, ia), WrongParameter(b, ib)) => a.name == b.name && ia == ib,
            (WrongMessage(a), WrongMessage(b)) => a == b,
            (InputTooLong, InputTooLong) => true,
            _ => false,
        }
    }
}

impl Eq for CommandError {}

/// Password carried by PASS, OPER and THEATER IDENTIFY.
/// Plain text is replaced by the verification result on the connection task,
/// so the event loop never sees the password.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) enum Credential {
    Plain(String),
    Verified(bool),
}

impl Credential {
    pub(crate) fn is_accepted(&self) -> bool {
        matches!(self, Credential::Verified(true))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum CapCommand {
    LS,
    LIST,
    REQ,
    END,
    CLEAR,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) enum TheaterCommand {
    IDENTIFY {
        channel: String,
        password: Credential,
    },
    PRIVMSG {
        channel: String,
        nickname: String,
        text: String,
    },
    ACTION {
        channel: String,
        nickname: String,
        text: String,
    },
}

pub(crate) const CONN_BAD_PASSWORD: &str = "bad password";
pub(crate) const CONN_CLOSED: &str = "connection closed";
pub(crate) const CONN_TIMEOUT: &str = "connection timeout";
pub(crate) const CONN_UNEXPECTED: &str = "unexpected command";
pub(crate) const CONN_CLIENT_QUIT: &str = "client quit";

#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) enum Command {
    CAP {
        subcommand: CapCommand,
        caps: Vec<String>,
    },
    PASS {
        password: Credential,
    },
    PROXY {
        hostname: String,
    },
    NICK {
        nickname: String,
    },
    USER {
        username: String,
        mode: Option<u8>,
        realname: String,
    },
    QUIT {
        message: String,
        reason: String,
    },
    PING {
        token: String,
    },
    PONG {
        token: String,
    },
    OPER {
        name: String,
        password: Credential,
    },
    JOIN {
        channels: Vec<String>,
        keys: Vec<String>,
    },
    PART {
        channels: Vec<String>,
        message: Option<String>,
    },
    TOPIC {
        channel: String,
        topic: Option<String>,
    },
    NAMES {
        channels: Vec<String>,
    },
    LIST {
        channels: Vec<String>,
        target: Option<String>,
    },
    INVITE {
        nickname: String,
        channel: String,
    },
    KICK {
        channels: Vec<String>,
        users: Vec<String>,
        comment: Option<String>,
    },
    MODE {
        target: String,
        modestring: Option<String>,
        args: Vec<String>,
    },
    PRIVMSG {
        targets: Vec<String>,
        text: String,
    },
    NOTICE {
        targets: Vec<String>,
        text: String,
    },
    WHO {
        mask: Option<String>,
        operators_only: bool,
    },
    WHOIS {
        masks: Vec<String>,
    },
    WHOWAS {
        nicknames: Vec<String>,
        count: usize,
    },
    KILL {
        nickname: String,
        comment: String,
    },
    AWAY {
        text: Option<String>,
    },
    ISON {
        nicknames: Vec<String>,
    },
    MOTD {
        target: Option<String>,
    },
    VERSION {
        target: Option<String>,
    },
    TIME {
        target: Option<String>,
    },
    THEATER(TheaterCommand),
    // internal
    IDLE,
    HOSTNAME {
        hostname: String,
    },
    MALFORMED {
        error: CommandError,
    },
    UNKNOWN {
        name: String,
    },
}

use Command::*;

/// What runs before a post-registration handler.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum PreHandle {
    ActiveAndTouch,
    TouchOnly,
    Nothing,
}

fn split_list(param: &str) -> Vec<String> {
    param
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

impl Command {
    pub(crate) fn id(&self) -> CommandId {
        match self {
            CAP { .. } => CAPId,
            PASS { .. } => PASSId,
            PROXY { .. } => PROXYId,
            NICK { .. } => NICKId,
            USER { .. } => USERId,
            QUIT { .. } => QUITId,
            PING { .. } => PINGId,
            PONG { .. } => PONGId,
            OPER { .. } => OPERId,
            JOIN { .. } => JOINId,
            PART { .. } => PARTId,
            TOPIC { .. } => TOPICId,
            NAMES { .. } => NAMESId,
            LIST { .. } => LISTId,
            INVITE { .. } => INVITEId,
            KICK { .. } => KICKId,
            MODE { .. } => MODEId,
            PRIVMSG { .. } => PRIVMSGId,
            NOTICE { .. } => NOTICEId,
            WHO { .. } => WHOId,
            WHOIS { .. } => WHOISId,
            WHOWAS { .. } => WHOWASId,
            KILL { .. } => KILLId,
            AWAY { .. } => AWAYId,
            ISON { .. } => ISONId,
            MOTD { .. } => MOTDId,
            VERSION { .. } => VERSIONId,
            TIME { .. } => TIMEId,
            THEATER(_) => THEATERId,
            IDLE => IDLEId,
            HOSTNAME { .. } => HOSTNAMEId,
            MALFORMED { .. } => MALFORMEDId,
            UNKNOWN { .. } => UNKNOWNId,
        }
    }

    pub(crate) fn pre_handle(&self) -> PreHandle {
        match self {
            IDLE | QUIT { .. } | HOSTNAME { .. } => PreHandle::Nothing,
            PING { .. } | PONG { .. } => PreHandle::TouchOnly,
            _ => PreHandle::ActiveAndTouch,
        }
    }

    /// Parse a line read from a client. Blank lines give None, errors are
    /// wrapped into internal commands and reported by the event loop.
    pub(crate) fn parse_line(line: &str) -> Option<Command> {
        // PROXY preamble is not IRC framed: IPv6 addresses may start with ':'
        let mut words = line.split_ascii_whitespace();
        if words
            .next()
            .map(|w| w.eq_ignore_ascii_case("PROXY"))
            .unwrap_or(false)
        {
            let params = words.collect::<Vec<_>>();
            return Some(match Command::from_proxy_params(&params) {
                Ok(command) => command,
                Err(error) => MALFORMED { error },
            });
        }
        match Message::from_shared_str(line) {
            Ok(message) => Some(match Command::from_message(&message) {
                Ok(command) => command,
                Err(UnknownCommand(name)) => UNKNOWN { name },
                Err(error) => MALFORMED { error },
            }),
            Err(MessageError::Empty) => None,
            Err(e) => Some(MALFORMED {
                error: WrongMessage(e),
            }),
        }
    }

    // PROXY TCP4|TCP6 source destination source-port destination-port
    fn from_proxy_params(params: &[&str]) -> Result<Command, CommandError> {
        if params.len() < 5 {
            return Err(NeedMoreParams(PROXYId));
        }
        let source = params[1];
        if source.parse::<std::net::IpAddr>().is_err() {
            return Err(WrongParameter(PROXYId, 1));
        }
        Ok(PROXY {
            hostname: source.to_string(),
        })
    }

    pub(crate) fn from_message(message: &Message<'_>) -> Result<Command, CommandError> {
        let params = &message.params;
        let param = |i: usize| params.get(i).map(|s| s.to_string());
        let command = message.command.to_ascii_uppercase();
        match command.as_str() {
            "CAP" => {
                let subcommand = match params.first() {
                    Some(s) => match s.to_ascii_uppercase().as_str() {
                        "LS" => CapCommand::LS,
                        "LIST" => CapCommand::LIST,
                        "REQ" => CapCommand::REQ,
                        "END" => CapCommand::END,
                        "CLEAR" => CapCommand::CLEAR,
                        _ => return Err(UnknownSubcommand(CAPId, s.to_string())),
                    },
                    None => return Err(NeedMoreParams(CAPId)),
                };
                let caps = if subcommand == CapCommand::REQ {
                    params
                        .get(1)
                        .map(|x| x.split_ascii_whitespace().map(|c| c.to_string()).collect())
                        .unwrap_or_default()
                } else {
                    vec![]
                };
                Ok(CAP { subcommand, caps })
            }
            "PASS" => match param(0) {
                Some(password) => Ok(PASS {
                    password: Credential::Plain(password),
                }),
                None => Err(NeedMoreParams(PASSId)),
            },
            "PROXY" => Command::from_proxy_params(params),
            "NICK" => match param(0) {
                Some(nickname) => Ok(NICK { nickname }),
                None => Err(NeedMoreParams(NICKId)),
            },
            "USER" => {
                if params.len() >= 4 {
                    Ok(USER {
                        username: params[0].to_string(),
                        mode: params[1].parse().ok(),
                        realname: params[3].to_string(),
                    })
                } else {
                    Err(NeedMoreParams(USERId))
                }
            }
            "QUIT" => Ok(QUIT {
                message: param(0).unwrap_or_else(|| CONN_CLIENT_QUIT.to_string()),
                reason: CONN_CLIENT_QUIT.to_string(),
            }),
            "PING" => match param(0) {
                Some(token) => Ok(PING { token }),
                None => Err(NeedMoreParams(PINGId)),
            },
            "PONG" => Ok(PONG {
                token: param(0).unwrap_or_default(),
            }),
            "OPER" => {
                if params.len() >= 2 {
                    Ok(OPER {
                        name: params[0].to_string(),
                        password: Credential::Plain(params[1].to_string()),
                    })
                } else {
                    Err(NeedMoreParams(OPERId))
                }
            }
            "JOIN" => match params.first() {
                Some(channels) => Ok(JOIN {
                    channels: if *channels == "0" {
                        vec!["0".to_string()]
                    } else {
                        split_list(channels)
                    },
                    // keys stay positional: an empty slot is a channel without key
                    keys: params
                        .get(1)
                        .map(|k| k.split(',').map(|s| s.to_string()).collect())
                        .unwrap_or_default(),
                }),
                None => Err(NeedMoreParams(JOINId)),
            },
            "PART" => match params.first() {
                Some(channels) => Ok(PART {
                    channels: split_list(channels),
                    message: param(1),
                }),
                None => Err(NeedMoreParams(PARTId)),
            },
            "TOPIC" => match param(0) {
                Some(channel) => Ok(TOPIC {
                    channel,
                    topic: param(1),
                }),
                None => Err(NeedMoreParams(TOPICId)),
            },
            "NAMES" => Ok(NAMES {
                channels: params.first().map(|c| split_list(c)).unwrap_or_default(),
            }),
            "LIST" => Ok(LIST {
                channels: params.first().map(|c| split_list(c)).unwrap_or_default(),
                target: param(1),
            }),
            "INVITE" => {
                if params.len() >= 2 {
                    Ok(INVITE {
                        nickname: params[0].to_string(),
                        channel: params[1].to_string(),
                    })
                } else {
                    Err(NeedMoreParams(INVITEId))
                }
            }
            "KICK" => {
                if params.len() >= 2 {
                    let channels = split_list(params[0]);
                    let users = split_list(params[1]);
                    if channels.len() != 1 && channels.len() != users.len() {
                        return Err(WrongParameter(KICKId, 1));
                    }
                    Ok(KICK {
                        channels,
                        users,
                        comment: param(2),
                    })
                } else {
                    Err(NeedMoreParams(KICKId))
                }
            }
            "MODE" => match param(0) {
                Some(target) => Ok(MODE {
                    target,
                    modestring: param(1),
                    args: params.iter().skip(2).map(|s| s.to_string()).collect(),
                }),
                None => Err(NeedMoreParams(MODEId)),
            },
            "PRIVMSG" | "NOTICE" => {
                if params.len() >= 2 && !params[1].is_empty() {
                    let targets = split_list(params[0]);
                    let text = params[1].to_string();
                    if command == "PRIVMSG" {
                        Ok(PRIVMSG { targets, text })
                    } else {
                        Ok(NOTICE { targets, text })
                    }
                } else if command == "PRIVMSG" {
                    Err(NeedMoreParams(PRIVMSGId))
                } else {
                    Err(NeedMoreParams(NOTICEId))
                }
            }
            "WHO" => Ok(WHO {
                mask: param(0).filter(|m| m != "0"),
                operators_only: params.get(1) == Some(&"o"),
            }),
            "WHOIS" => {
                // WHOIS [target] masks
                match params.len() {
                    0 => Err(NeedMoreParams(WHOISId)),
                    1 => Ok(WHOIS {
                        masks: split_list(params[0]),
                    }),
                    _ => Ok(WHOIS {
                        masks: split_list(params[1]),
                    }),
                }
            }
            "WHOWAS" => match params.first() {
                Some(nicknames) => Ok(WHOWAS {
                    nicknames: split_list(nicknames),
                    count: params
                        .get(1)
                        .and_then(|c| c.parse::<i64>().ok())
                        .filter(|c| *c > 0)
                        .map(|c| c as usize)
                        .unwrap_or(0),
                }),
                None => Err(NeedMoreParams(WHOWASId)),
            },
            "KILL" => {
                if params.len() >= 2 {
                    Ok(KILL {
                        nickname: params[0].to_string(),
                        comment: params[1].to_string(),
                    })
                } else {
                    Err(NeedMoreParams(KILLId))
                }
            }
            "AWAY" => Ok(AWAY {
                text: param(0).filter(|t| !t.is_empty()),
            }),
            "ISON" => {
                if !params.is_empty() {
                    Ok(ISON {
                        nicknames: params
                            .iter()
                            .flat_map(|p| p.split_ascii_whitespace())
                            .map(|s| s.to_string())
                            .collect(),
                    })
                } else {
                    Err(NeedMoreParams(ISONId))
                }
            }
            "MOTD" => Ok(MOTD { target: param(0) }),
            "VERSION" => Ok(VERSION { target: param(0) }),
            "TIME" => Ok(TIME { target: param(0) }),
            "THEATER" => {
                let subcommand = match params.first() {
                    Some(s) => s.to_ascii_uppercase(),
                    None => return Err(NeedMoreParams(THEATERId)),
                };
                match subcommand.as_str() {
                    "IDENTIFY" if params.len() >= 3 => {
                        Ok(THEATER(TheaterCommand::IDENTIFY {
                            channel: params[1].to_string(),
                            password: Credential::Plain(params[2].to_string()),
                        }))
                    }
                    "PRIVMSG" | "ACTION" if params.len() >= 4 => {
                        let channel = params[1].to_string();
                        let nickname = params[2].to_string();
                        let text = params[3].to_string();
                        if subcommand == "PRIVMSG" {
                            Ok(THEATER(TheaterCommand::PRIVMSG {
                                channel,
                                nickname,
                                text,
                            }))
                        } else {
                            Ok(THEATER(TheaterCommand::ACTION {
                                channel,
                                nickname,
                                text,
                            }))
                        }
                    }
                    "IDENTIFY" | "PRIVMSG" | "ACTION" => Err(NeedMoreParams(THEATERId)),
                    _ => Err(UnknownSubcommand(THEATERId, params[0].to_string())),
                }
            }
            _ => Err(UnknownCommand(message.command.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_message_from_shared_str() {
        assert_eq!(
            Ok(Message {
                source: None,
                command: "QUIT",
                params: vec![]
            }),
            Message::from_shared_str("QUIT")
        );
        assert_eq!(
            Ok(Message {
                source: Some("alice!a@host.org"),
                command: "PRIVMSG",
                params: vec!["#test", "hello: world"]
            }),
            Message::from_shared_str(":alice!a@host.org PRIVMSG #test :hello: world")
        );
        assert_eq!(
            Ok(Message {
                source: None,
                command: "USER",
                params: vec!["a", "0", "*", "Alice Liddell"]
            }),
            Message::from_shared_str("  USER a 0 *   :Alice Liddell")
        );
        assert_eq!(
            Ok(Message {
                source: None,
                command: "KICK",
                params: vec!["#test", "bob", ":1 and :2"]
            }),
            Message::from_shared_str("KICK #test bob ::1 and :2")
        );
        assert_eq!(
            Ok(Message {
                source: None,
                command: "TOPIC",
                params: vec!["#test", ""]
            }),
            Message::from_shared_str("TOPIC #test :")
        );
        assert_eq!(Err(MessageError::Empty), Message::from_shared_str("   "));
        assert_eq!(
            Err(MessageError::NoCommand),
            Message::from_shared_str(":alice")
        );
        assert_eq!(
            Err(MessageError::WrongSource),
            Message::from_shared_str(":al@ice!x PING x")
        );
    }

    #[test]
    fn test_command_parse_line() {
        assert_eq!(
            Some(NICK {
                nickname: "alice".to_string()
            }),
            Command::parse_line("nick alice")
        );
        assert_eq!(
            Some(USER {
                username: "a".to_string(),
                mode: Some(8),
                realname: "Alice".to_string()
            }),
            Command::parse_line("USER a 8 * :Alice")
        );
        assert_eq!(
            Some(USER {
                username: "a".to_string(),
                mode: None,
                realname: "Alice".to_string()
            }),
            Command::parse_line("USER a host.org server.org :Alice")
        );
        assert_eq!(
            Some(PASS {
                password: Credential::Plain("secret".to_string())
            }),
            Command::parse_line("PASS secret")
        );
        assert_eq!(
            Some(JOIN {
                channels: vec!["#a".to_string(), "#b".to_string()],
                keys: vec!["key".to_string()]
            }),
            Command::parse_line("JOIN #a,#b key")
        );
        assert_eq!(
            Some(JOIN {
                channels: vec!["#a".to_string(), "#b".to_string()],
                keys: vec!["".to_string(), "kb".to_string()]
            }),
            Command::parse_line("JOIN #a,#b ,kb")
        );
        assert_eq!(
            Some(JOIN {
                channels: vec!["0".to_string()],
                keys: vec![]
            }),
            Command::parse_line("JOIN 0")
        );
        assert_eq!(
            Some(QUIT {
                message: "Bye".to_string(),
                reason: CONN_CLIENT_QUIT.to_string()
            }),
            Command::parse_line("QUIT :Bye")
        );
        assert_eq!(
            Some(WHOWAS {
                nicknames: vec!["alice".to_string()],
                count: 2
            }),
            Command::parse_line("WHOWAS alice 2")
        );
        assert_eq!(
            Some(WHOIS {
                masks: vec!["ali*".to_string()]
            }),
            Command::parse_line("WHOIS irc.irc ali*")
        );
        assert_eq!(
            Some(KICK {
                channels: vec!["#a".to_string()],
                users: vec!["bob".to_string(), "eve".to_string()],
                comment: Some("out".to_string())
            }),
            Command::parse_line("KICK #a bob,eve :out")
        );
        assert_eq!(
            Some(PROXY {
                hostname: "10.0.0.1".to_string()
            }),
            Command::parse_line("PROXY TCP4 10.0.0.1 10.0.0.2 5000 6667")
        );
        assert_eq!(
            Some(PROXY {
                hostname: "2001:db8::7".to_string()
            }),
            Command::parse_line("PROXY TCP6 2001:db8::7 ::1 40000 6667")
        );
        assert_eq!(
            Some(PROXY {
                hostname: "::1".to_string()
            }),
            Command::parse_line("proxy TCP6 ::1 ::1 40000 6667")
        );
        assert_eq!(
            Some(MALFORMED {
                error: NeedMoreParams(PROXYId)
            }),
            Command::parse_line("PROXY TCP6 ::1")
        );
        assert_eq!(
            Some(THEATER(TheaterCommand::ACTION {
                channel: "#stage".to_string(),
                nickname: "Romeo".to_string(),
                text: "sighs".to_string()
            })),
            Command::parse_line("THEATER action #stage Romeo :sighs")
        );
        assert_eq!(None, Command::parse_line(""));
    }

    #[test]
    fn test_command_parse_line_errors() {
        assert_eq!(
            Some(UNKNOWN {
                name: "FOO".to_string()
            }),
            Command::parse_line("FOO bar")
        );
        assert_eq!(
            Some(MALFORMED {
                error: NeedMoreParams(NICKId)
            }),
            Command::parse_line("NICK")
        );
        assert_eq!(
            Some(MALFORMED {
                error: NeedMoreParams(PRIVMSGId)
            }),
            Command::parse_line("PRIVMSG #test")
        );
        assert_eq!(
            Some(MALFORMED {
                error: UnknownSubcommand(CAPId, "XX".to_string())
            }),
            Command::parse_line("CAP XX")
        );
        assert_eq!(
            Some(MALFORMED {
                error: WrongMessage(MessageError::NoCommand)
            }),
            Command::parse_line(":alice")
        );
        assert_eq!(
            Some(MALFORMED {
                error: WrongParameter(KICKId, 1)
            }),
            Command::parse_line("KICK #a,#b bob")
        );
        assert_eq!(
            "Command 'USER' needs more parameters",
            NeedMoreParams(USERId).to_string()
        );
    }

    #[test]
    fn test_dispatch_rows() {
        let pre: Vec<&str> = [
            CAPId, PASSId, PROXYId, NICKId, USERId, QUITId, PINGId, JOINId, IDLEId, UNKNOWNId,
        ]
        .iter()
        .filter(|id| id.pre_registration)
        .map(|id| id.name)
        .collect();
        assert_eq!(
            vec!["CAP", "PASS", "PROXY", "NICK", "USER", "QUIT", "IDLE"],
            pre
        );
        assert!(!PROXYId.post_registration);
        assert!(!UNKNOWNId.post_registration);
        assert!(JOINId.post_registration);
    }

    #[test]
    fn test_pre_handle() {
        assert_eq!(PreHandle::Nothing, IDLE.pre_handle());
        assert_eq!(
            PreHandle::Nothing,
            Command::parse_line("QUIT").unwrap().pre_handle()
        );
        assert_eq!(
            PreHandle::TouchOnly,
            Command::parse_line("PING x").unwrap().pre_handle()
        );
        assert_eq!(
            PreHandle::ActiveAndTouch,
            Command::parse_line("JOIN #x").unwrap().pre_handle()
        );
    }
}
