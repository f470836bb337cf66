// reply.rs - replies
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

// replies

use std::fmt;

// all replies used by this IRC server.
pub(crate) enum Reply<'a> {
    RplWelcome001 {
        client: &'a str,
        networkname: &'a str,
        nick: &'a str,
        user: &'a str,
        host: &'a str,
    },
    RplYourHost002 {
        client: &'a str,
        servername: &'a str,
        version: &'a str,
    },
    RplCreated003 {
        client: &'a str,
        datetime: &'a str,
    },
    RplMyInfo004 {
        client: &'a str,
        servername: &'a str,
        version: &'a str,
        avail_user_modes: &'a str,
        avail_chmodes: &'a str,
    },
    RplUModeIs221 {
        client: &'a str,
        user_modes: &'a str,
    },
    RplAway301 {
        client: &'a str,
        nick: &'a str,
        message: &'a str,
    },
    RplIsOn303 {
        client: &'a str,
        nicknames: &'a str,
    },
    RplUnAway305 {
        client: &'a str,
    },
    RplNowAway306 {
        client: &'a str,
    },
    RplWhoIsUser311 {
        client: &'a str,
        nick: &'a str,
        username: &'a str,
        host: &'a str,
        realname: &'a str,
    },
    RplWhoIsServer312 {
        client: &'a str,
        nick: &'a str,
        server: &'a str,
        server_info: &'a str,
    },
    RplWhoIsOperator313 {
        client: &'a str,
        nick: &'a str,
    },
    RplWhoWasUser314 {
        client: &'a str,
        nick: &'a str,
        username: &'a str,
        host: &'a str,
        realname: &'a str,
    },
    RplEndOfWho315 {
        client: &'a str,
        mask: &'a str,
    },
    RplWhoIsIdle317 {
        client: &'a str,
        nick: &'a str,
        secs: u64,
        signon: u64,
    },
    RplEndOfWhoIs318 {
        client: &'a str,
        nick: &'a str,
    },
    RplWhoIsChannels319 {
        client: &'a str,
        nick: &'a str,
        channels: &'a str,
    },
    RplList322 {
        client: &'a str,
        channel: &'a str,
        client_count: usize,
        topic: &'a str,
    },
    RplListEnd323 {
        client: &'a str,
    },
    RplChannelModeIs324 {
        client: &'a str,
        channel: &'a str,
        modestring: &'a str,
    },
    RplNoTopic331 {
        client: &'a str,
        channel: &'a str,
    },
    RplTopic332 {
        client: &'a str,
        channel: &'a str,
        topic: &'a str,
    },
    RplInviting341 {
        client: &'a str,
        nick: &'a str,
        channel: &'a str,
    },
    RplInviteList346 {
        client: &'a str,
        channel: &'a str,
        mask: &'a str,
    },
    RplEndOfInviteList347 {
        client: &'a str,
        channel: &'a str,
    },
    RplExceptList348 {
        client: &'a str,
        channel: &'a str,
        mask: &'a str,
    },
    RplEndOfExceptList349 {
        client: &'a str,
        channel: &'a str,
    },
    RplVersion351 {
        client: &'a str,
        version: &'a str,
        server: &'a str,
        comments: &'a str,
    },
    RplWhoReply352 {
        client: &'a str,
        channel: &'a str,
        username: &'a str,
        host: &'a str,
        server: &'a str,
        nick: &'a str,
        flags: &'a str,
        hopcount: usize,
        realname: &'a str,
    },
    RplNameReply353 {
        client: &'a str,
        symbol: &'a str,
        channel: &'a str,
        replies: &'a str,
    },
    RplEndOfNames366 {
        client: &'a str,
        channel: &'a str,
    },
    RplBanList367 {
        client: &'a str,
        channel: &'a str,
        mask: &'a str,
    },
    RplEndOfBanList368 {
        client: &'a str,
        channel: &'a str,
    },
    RplEndOfWhoWas369 {
        client: &'a str,
        nick: &'a str,
    },
    RplMotd372 {
        client: &'a str,
        motd: &'a str,
    },
    RplMotdStart375 {
        client: &'a str,
        server: &'a str,
    },
    RplEndOfMotd376 {
        client: &'a str,
    },
    RplYoureOper381 {
        client: &'a str,
    },
    RplTime391 {
        client: &'a str,
        server: &'a str,
        time: &'a str,
    },
    ErrNoSuchNick401 {
        client: &'a str,
        nick: &'a str,
    },
    ErrNoSuchServer402 {
        client: &'a str,
        server: &'a str,
    },
    ErrNoSuchChannel403 {
        client: &'a str,
        channel: &'a str,
    },
    ErrCannotSendToChain404 {
        client: &'a str,
        channel: &'a str,
    },
    ErrWasNoSuchNick406 {
        client: &'a str,
        nick: &'a str,
    },
    ErrInvalidCapCmd410 {
        client: &'a str,
        cmd: &'a str,
    },
    ErrInputTooLong417 {
        client: &'a str,
    },
    ErrUnknownCommand421 {
        client: &'a str,
        command: &'a str,
    },
    ErrNoMotd422 {
        client: &'a str,
    },
    ErrNoNicknameGiven431 {
        client: &'a str,
    },
    ErrErroneusNickname432 {
        client: &'a str,
        nick: &'a str,
    },
    ErrNicknameInUse433 {
        client: &'a str,
        nick: &'a str,
    },
    ErrUserNotInChannel441 {
        client: &'a str,
        nick: &'a str,
        channel: &'a str,
    },
    ErrNotOnChannel442 {
        client: &'a str,
        channel: &'a str,
    },
    ErrUserOnChannel443 {
        client: &'a str,
        nick: &'a str,
        channel: &'a str,
    },
    ErrNeedMoreParams461 {
        client: &'a str,
        command: &'a str,
    },
    ErrAlreadyRegistered462 {
        client: &'a str,
    },
    ErrPasswdMismatch464 {
        client: &'a str,
    },
    ErrChannelIsFull471 {
        client: &'a str,
        channel: &'a str,
    },
    ErrUnknownMode472 {
        client: &'a str,
        modechar: char,
    },
    ErrInviteOnlyChan473 {
        client: &'a str,
        channel: &'a str,
    },
    ErrBannedFromChan474 {
        client: &'a str,
        channel: &'a str,
    },
    ErrBadChannelKey475 {
        client: &'a str,
        channel: &'a str,
    },
    ErrNoPrivileges481 {
        client: &'a str,
    },
    ErrChanOpPrivsNeeded482 {
        client: &'a str,
        channel: &'a str,
    },
    ErrUModeUnknownFlag501 {
        client: &'a str,
    },
    ErrUsersDontMatch502 {
        client: &'a str,
    },
}

use Reply::*;

impl<'a> fmt::Display for Reply<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RplWelcome001 {
                client,
                networkname,
                nick,
                user,
                host,
            } => {
                write!(
                    f,
                    "001 {} :Welcome to the {} Network, {}!{}@{}",
                    client, networkname, nick, user, host
                )
            }
            RplYourHost002 {
                client,
                servername,
                version,
            } => {
                write!(
                    f,
                    "002 {} :Your host is {}, running version {}",
                    client, servername, version
                )
            }
            RplCreated003 { client, datetime } => {
                write!(f, "003 {} :This server was created {}", client, datetime)
            }
            RplMyInfo004 {
                client,
                servername,
                version,
                avail_user_modes,
                avail_chmodes,
            } => {
                write!(
                    f,
                    "004 {} {} {} {} {}",
                    client, servername, version, avail_user_modes, avail_chmodes
                )
            }
            RplUModeIs221 { client, user_modes } => write!(f, "221 {} {}", client, user_modes),
            RplAway301 {
                client,
                nick,
                message,
            } => write!(f, "301 {} {} :{}", client, nick, message),
            RplIsOn303 { client, nicknames } => write!(f, "303 {} :{}", client, nicknames),
            RplUnAway305 { client } => {
                write!(f, "305 {} :You are no longer marked as being away", client)
            }
            RplNowAway306 { client } => {
                write!(f, "306 {} :You have been marked as being away", client)
            }
            RplWhoIsUser311 {
                client,
                nick,
                username,
                host,
                realname,
            } => {
                write!(
                    f,
                    "311 {} {} {} {} * :{}",
                    client, nick, username, host, realname
                )
            }
            RplWhoIsServer312 {
                client,
                nick,
                server,
                server_info,
            } => write!(f, "312 {} {} {} :{}", client, nick, server, server_info),
            RplWhoIsOperator313 { client, nick } => {
                write!(f, "313 {} {} :is an IRC operator", client, nick)
            }
            RplWhoWasUser314 {
                client,
                nick,
                username,
                host,
                realname,
            } => {
                write!(
                    f,
                    "314 {} {} {} {} * :{}",
                    client, nick, username, host, realname
                )
            }
            RplEndOfWho315 { client, mask } => {
                write!(f, "315 {} {} :End of WHO list", client, mask)
            }
            RplWhoIsIdle317 {
                client,
                nick,
                secs,
                signon,
            } => {
                write!(
                    f,
                    "317 {} {} {} {} :seconds idle, signon time",
                    client, nick, secs, signon
                )
            }
            RplEndOfWhoIs318 { client, nick } => {
                write!(f, "318 {} {} :End of /WHOIS list", client, nick)
            }
            RplWhoIsChannels319 {
                client,
                nick,
                channels,
            } => write!(f, "319 {} {} :{}", client, nick, channels),
            RplList322 {
                client,
                channel,
                client_count,
                topic,
            } => write!(f, "322 {} {} {} :{}", client, channel, client_count, topic),
            RplListEnd323 { client } => write!(f, "323 {} :End of /LIST", client),
            RplChannelModeIs324 {
                client,
                channel,
                modestring,
            } => write!(f, "324 {} {} {}", client, channel, modestring),
            RplNoTopic331 { client, channel } => {
                write!(f, "331 {} {} :No topic is set", client, channel)
            }
            RplTopic332 {
                client,
                channel,
                topic,
            } => write!(f, "332 {} {} :{}", client, channel, topic),
            RplInviting341 {
                client,
                nick,
                channel,
            } => write!(f, "341 {} {} {}", client, nick, channel),
            RplInviteList346 {
                client,
                channel,
                mask,
            } => write!(f, "346 {} {} {}", client, channel, mask),
            RplEndOfInviteList347 { client, channel } => {
                write!(f, "347 {} {} :End of channel invite list", client, channel)
            }
            RplExceptList348 {
                client,
                channel,
                mask,
            } => write!(f, "348 {} {} {}", client, channel, mask),
            RplEndOfExceptList349 { client, channel } => {
                write!(f, "349 {} {} :End of channel exception list", client, channel)
            }
            RplVersion351 {
                client,
                version,
                server,
                comments,
            } => write!(f, "351 {} {} {} :{}", client, version, server, comments),
            RplWhoReply352 {
                client,
                channel,
                username,
                host,
                server,
                nick,
                flags,
                hopcount,
                realname,
            } => {
                write!(
                    f,
                    "352 {} {} {} {} {} {} {} :{} {}",
                    client, channel, username, host, server, nick, flags, hopcount, realname
                )
            }
            RplNameReply353 {
                client,
                symbol,
                channel,
                replies,
            } => write!(f, "353 {} {} {} :{}", client, symbol, channel, replies),
            RplEndOfNames366 { client, channel } => {
                write!(f, "366 {} {} :End of /NAMES list", client, channel)
            }
            RplBanList367 {
                client,
                channel,
                mask,
            } => write!(f, "367 {} {} {}", client, channel, mask),
            RplEndOfBanList368 { client, channel } => {
                write!(f, "368 {} {} :End of channel ban list", client, channel)
            }
            RplEndOfWhoWas369 { client, nick } => {
                write!(f, "369 {} {} :End of WHOWAS", client, nick)
            }
            RplMotd372 { client, motd } => write!(f, "372 {} :- {}", client, motd),
            RplMotdStart375 { client, server } => {
                write!(f, "375 {} :- {} Message of the day - ", client, server)
            }
            RplEndOfMotd376 { client } => write!(f, "376 {} :End of /MOTD command.", client),
            RplYoureOper381 { client } => write!(f, "381 {} :You are now an IRC operator", client),
            RplTime391 {
                client,
                server,
                time,
            } => write!(f, "391 {} {} :{}", client, server, time),
            ErrNoSuchNick401 { client, nick } => {
                write!(f, "401 {} {} :No such nick/channel", client, nick)
            }
            ErrNoSuchServer402 { client, server } => {
                write!(f, "402 {} {} :No such server", client, server)
            }
            ErrNoSuchChannel403 { client, channel } => {
                write!(f, "403 {} {} :No such channel", client, channel)
            }
            ErrCannotSendToChain404 { client, channel } => {
                write!(f, "404 {} {} :Cannot send to channel", client, channel)
            }
            ErrWasNoSuchNick406 { client, nick } => {
                write!(f, "406 {} {} :There was no such nickname", client, nick)
            }
            ErrInvalidCapCmd410 { client, cmd } => {
                write!(f, "410 {} {} :Invalid CAP command", client, cmd)
            }
            ErrInputTooLong417 { client } => write!(f, "417 {} :Input line was too long", client),
            ErrUnknownCommand421 { client, command } => {
                write!(f, "421 {} {} :Unknown command", client, command)
            }
            ErrNoMotd422 { client } => write!(f, "422 {} :MOTD File is missing", client),
            ErrNoNicknameGiven431 { client } => write!(f, "431 {} :No nickname given", client),
            ErrErroneusNickname432 { client, nick } => {
                write!(f, "432 {} {} :Erroneus nickname", client, nick)
            }
            ErrNicknameInUse433 { client, nick } => {
                write!(f, "433 {} {} :Nickname is already in use", client, nick)
            }
            ErrUserNotInChannel441 {
                client,
                nick,
                channel,
            } => {
                write!(
                    f,
                    "441 {} {} {} :They aren't on that channel",
                    client, nick, channel
                )
            }
            ErrNotOnChannel442 { client, channel } => {
                write!(f, "442 {} {} :You're not on that channel", client, channel)
            }
            ErrUserOnChannel443 {
                client,
                nick,
                channel,
            } => write!(f, "443 {} {} {} :is already on channel", client, nick, channel),
            ErrNeedMoreParams461 { client, command } => {
                write!(f, "461 {} {} :Not enough parameters", client, command)
            }
            ErrAlreadyRegistered462 { client } => {
                write!(f, "462 {} :You may not reregister", client)
            }
            ErrPasswdMismatch464 { client } => write!(f, "464 {} :Password incorrect", client),
            ErrChannelIsFull471 { client, channel } => {
                write!(f, "471 {} {} :Cannot join channel (+l)", client, channel)
            }
            ErrUnknownMode472 { client, modechar } => {
                write!(f, "472 {} {} :is unknown mode char to me", client, modechar)
            }
            ErrInviteOnlyChan473 { client, channel } => {
                write!(f, "473 {} {} :Cannot join channel (+i)", client, channel)
            }
            ErrBannedFromChan474 { client, channel } => {
                write!(f, "474 {} {} :Cannot join channel (+b)", client, channel)
            }
            ErrBadChannelKey475 { client, channel } => {
                write!(f, "475 {} {} :Cannot join channel (+k)", client, channel)
            }
            ErrNoPrivileges481 { client } => write!(
                f,
                "481 {} :Permission Denied- You're not an IRC operator",
                client
            ),
            ErrChanOpPrivsNeeded482 { client, channel } => {
                write!(f, "482 {} {} :You're not channel operator", client, channel)
            }
            ErrUModeUnknownFlag501 { client } => {
                write!(f, "501 {} :Unknown MODE flag", client)
            }
            ErrUsersDontMatch502 { client } => {
                write!(f, "502 {} :Cant change mode for other users", client)
            }
        }
    }
}
