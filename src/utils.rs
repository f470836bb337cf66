// utils.rs - main library utilities
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

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use bytes::{BufMut, BytesMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};
use validator::ValidationError;

pub(crate) const MOTD_MAX_LINE_LENGTH: usize = 80;
pub(crate) const MAX_CHANNEL_NAME_LENGTH: usize = 50;

// special LinesCodec for IRC - encode with "\r\n".
// An over-long line is skipped and yields an empty frame with `too_long` set.
pub(crate) struct IRCLinesCodec {
    lines: LinesCodec,
    too_long: bool,
}

impl IRCLinesCodec {
    pub(crate) fn new() -> IRCLinesCodec {
        IRCLinesCodec {
            lines: LinesCodec::new(),
            too_long: false,
        }
    }

    pub(crate) fn new_with_max_length(max_length: usize) -> IRCLinesCodec {
        IRCLinesCodec {
            lines: LinesCodec::new_with_max_length(max_length),
            too_long: false,
        }
    }

    /// Whether the last frame stands for a skipped over-long line.
    pub(crate) fn take_too_long(&mut self) -> bool {
        std::mem::take(&mut self.too_long)
    }

    fn skip_too_long(
        &mut self,
        result: Result<Option<String>, LinesCodecError>,
    ) -> Result<Option<String>, LinesCodecError> {
        match result {
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                self.too_long = true;
                Ok(Some(String::new()))
            }
            result => result,
        }
    }
}

impl<T: AsRef<str>> Encoder<T> for IRCLinesCodec {
    type Error = <LinesCodec as Encoder<T>>::Error;

    fn encode(&mut self, line: T, buf: &mut BytesMut) -> Result<(), Self::Error> {
        let line = line.as_ref();
        buf.reserve(line.len() + 2);
        buf.put(line.as_bytes());
        // put "\r\n"
        buf.put_u8(b'\r');
        buf.put_u8(b'\n');
        Ok(())
    }
}

impl Decoder for IRCLinesCodec {
    type Item = <LinesCodec as Decoder>::Item;
    type Error = <LinesCodec as Decoder>::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        let result = self.lines.decode(buf);
        self.skip_too_long(result)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        let result = self.lines.decode_eof(buf);
        self.skip_too_long(result)
    }
}

/// Case-insensitive identifier: nicknames, usernames, channel names.
/// Equality and hashing use the folded form, display keeps the original case.
#[derive(Clone, Debug)]
pub(crate) struct Name {
    display: String,
    folded: String,
}

impl Name {
    pub(crate) fn new<S: Into<String>>(name: S) -> Name {
        let display = name.into();
        let folded = fold_name(&display);
        Name { display, folded }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.display
    }

    pub(crate) fn folded(&self) -> &str {
        &self.folded
    }

    pub(crate) fn is_channel(&self) -> bool {
        is_channel_name(&self.display)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

// Unicode lowercase: nicknames are ASCII, channel names may not be
pub(crate) fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Match subject against mask. Mask is an exact name or a prefix ending with '*'.
pub(crate) fn mask_matches(mask: &str, subject: &str) -> bool {
    let mask = fold_name(mask);
    let subject = fold_name(subject);
    if let Some(prefix) = mask.strip_suffix('*') {
        subject.starts_with(prefix)
    } else {
        subject == mask
    }
}

fn is_nick_special(c: char) -> bool {
    matches!(c, '[' | ']' | '\\' | '`' | '_' | '^' | '{' | '|' | '}')
}

pub(crate) fn is_valid_nickname(nick: &str, max_len: usize) -> bool {
    let mut chars = nick.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || is_nick_special(c) => (),
        _ => return false,
    }
    nick.len() <= max_len && chars.all(|c| c.is_ascii_alphanumeric() || is_nick_special(c) || c == '-')
}

pub(crate) fn is_channel_name(channel: &str) -> bool {
    channel.len() > 1
        && channel.len() <= MAX_CHANNEL_NAME_LENGTH
        && (channel.starts_with('#') || channel.starts_with('&'))
        && !channel.contains(|c| c == ' ' || c == ',' || c == ':' || c == '\x07')
}

pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if is_valid_nickname(username, usize::MAX) {
        Ok(())
    } else {
        Err(ValidationError::new("Username must be a valid nickname."))
    }
}

pub(crate) fn validate_channel(channel: &str) -> Result<(), ValidationError> {
    if is_channel_name(channel) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "Channel name must have '#' or '&' at start and \
                must not contains ',', ' ' or ':'.",
        ))
    }
}

pub(crate) fn validate_password_hash(hash: &str) -> Result<(), ValidationError> {
    if PasswordHash::new(hash).is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("Password must be an argon2 PHC string."))
    }
}

pub(crate) fn argon2_hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub(crate) fn argon2_verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// hashing is deliberately slow: keep it off the runtime workers.
pub(crate) async fn argon2_verify_password_async(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || argon2_verify_password(&password, &hash))
        .await
        .unwrap_or(false)
}

/// Hard-wrap line into pieces of at most `width` characters.
pub(crate) fn wrap_line(line: &str, width: usize) -> Vec<&str> {
    if line.is_empty() || width == 0 {
        return vec![line];
    }
    let mut parts = vec![];
    let mut rest = line;
    while !rest.is_empty() {
        let split = rest
            .char_indices()
            .nth(width)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(split);
        parts.push(head);
        rest = tail;
    }
    parts
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_irc_lines_codec() {
        let mut codec = IRCLinesCodec::new();
        let mut buf = BytesMut::new();
        codec.encode("my line", &mut buf).unwrap();
        assert_eq!("my line\r\n".as_bytes(), buf);
        let mut buf = BytesMut::from("my line 2\n");
        assert_eq!(
            codec.decode(&mut buf).map_err(|e| e.to_string()),
            Ok(Some("my line 2".to_string()))
        );
        assert_eq!(buf, BytesMut::new());
        let mut buf = BytesMut::from("my line 2\r\n");
        assert_eq!(
            codec.decode(&mut buf).map_err(|e| e.to_string()),
            Ok(Some("my line 2".to_string()))
        );
        assert_eq!(buf, BytesMut::new());
    }

    #[test]
    fn test_irc_lines_codec_max_length() {
        let mut codec = IRCLinesCodec::new_with_max_length(10);
        let mut buf = BytesMut::from("0123456789abcdef\r\nshort\r\n");
        assert_eq!(
            codec.decode(&mut buf).map_err(|e| e.to_string()),
            Ok(Some(String::new()))
        );
        assert!(codec.take_too_long());
        assert!(!codec.take_too_long());
        assert_eq!(
            codec.decode(&mut buf).map_err(|e| e.to_string()),
            Ok(Some("short".to_string()))
        );
        assert!(!codec.take_too_long());
    }

    #[test]
    fn test_name() {
        let name = Name::new("AliCe");
        assert_eq!("AliCe", name.as_str());
        assert_eq!("alice", name.folded());
        assert_eq!(Name::new("alice"), name);
        assert_eq!("AliCe", name.to_string());
        let mut map = HashMap::new();
        map.insert(name, 1);
        assert_eq!(Some(&1), map.get(&Name::new("ALICE")));
        assert!(Name::new("#Test").is_channel());
        assert!(!Name::new("test").is_channel());
        assert_eq!(Name::new("#Ąb"), Name::new("#ąB"));
        assert_eq!("#ąb", Name::new("#ĄB").folded());
    }

    #[test]
    fn test_mask_matches() {
        assert!(mask_matches("alice", "ALICE"));
        assert!(!mask_matches("alice", "alice2"));
        assert!(mask_matches("ali*", "Alice"));
        assert!(mask_matches("*", "bob"));
        assert!(mask_matches("bob!*", "bob!b@host.org"));
        assert!(!mask_matches("bob!*", "bobby!b@host.org"));
        // only a trailing star is a wildcard
        assert!(!mask_matches("*bob", "bob"));
    }

    #[test]
    fn test_is_valid_nickname() {
        assert!(is_valid_nickname("alice", 20));
        assert!(is_valid_nickname("[a]l-i_c^e", 20));
        assert!(!is_valid_nickname("", 20));
        assert!(!is_valid_nickname("1alice", 20));
        assert!(!is_valid_nickname("-alice", 20));
        assert!(!is_valid_nickname("#alice", 20));
        assert!(!is_valid_nickname("al.ice", 20));
        assert!(!is_valid_nickname("alicealice", 5));
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(true, validate_username("ala").is_ok());
        assert_eq!(false, validate_username("#ala").is_ok());
        assert_eq!(false, validate_username("&ala").is_ok());
        assert_eq!(false, validate_username("a.la").is_ok());
        assert_eq!(false, validate_username("a,la").is_ok());
        assert_eq!(false, validate_username("aL:a").is_ok());
    }

    #[test]
    fn test_validate_channel() {
        assert_eq!(true, validate_channel("#ala").is_ok());
        assert_eq!(true, validate_channel("&ala").is_ok());
        assert_eq!(false, validate_channel("&al:a").is_ok());
        assert_eq!(false, validate_channel("&al,a").is_ok());
        assert_eq!(false, validate_channel("#al a").is_ok());
        assert_eq!(false, validate_channel("#").is_ok());
        assert_eq!(false, validate_channel("ala").is_ok());
    }

    #[test]
    fn test_argon2_password() {
        let hash = argon2_hash_password("top_secret").unwrap();
        assert!(validate_password_hash(&hash).is_ok());
        assert!(validate_password_hash("top_secret").is_err());
        assert!(argon2_verify_password("top_secret", &hash));
        assert!(!argon2_verify_password("top_secret2", &hash));
        assert!(!argon2_verify_password("top_secret", "garbage"));
    }

    #[tokio::test]
    async fn test_argon2_verify_password_async() {
        let hash = argon2_hash_password("blamblam").unwrap();
        assert!(argon2_verify_password_async("blamblam".to_string(), hash.clone()).await);
        assert!(!argon2_verify_password_async("blam".to_string(), hash).await);
    }

    #[test]
    fn test_wrap_line() {
        let line: String = std::iter::repeat('x').take(80).chain(Some('y')).collect();
        let parts = wrap_line(&line, MOTD_MAX_LINE_LENGTH);
        assert_eq!(2, parts.len());
        assert_eq!(80, parts[0].len());
        assert_eq!("y", parts[1]);
        assert_eq!(line, parts.concat());

        assert_eq!(vec![""], wrap_line("", MOTD_MAX_LINE_LENGTH));
        assert_eq!(vec!["short"], wrap_line("short", MOTD_MAX_LINE_LENGTH));
        assert_eq!(vec!["abc", "def", "g"], wrap_line("abcdefg", 3));
        assert_eq!(vec!["ąę", "ść"], wrap_line("ąęść", 2));
    }
}
