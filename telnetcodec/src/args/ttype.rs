//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Terminal Type
//!

use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use bytes::BufMut;

/// TERMINAL-TYPE subcommand: the payload carries a terminal name.
pub const IS: u8 = 0;
/// TERMINAL-TYPE subcommand: ask the peer to send its terminal name.
pub const SEND: u8 = 1;

/// A TERMINAL-TYPE subnegotiation payload (RFC 1091).
///
/// Servers send [`TerminalType::Send`]; clients answer with
/// [`TerminalType::Is`] carrying their terminal identifier. The identifier is
/// decoded leniently: invalid UTF-8 sequences are replaced and surrounding
/// whitespace is trimmed, so decoding a name never fails. An empty name is
/// representable; whether it means anything is up to the consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalType {
    /// `IS <name>`: the peer's terminal identifier.
    Is(String),
    /// `SEND`: request that the peer report its terminal type.
    Send,
}

impl TerminalType {
    /// Encoded payload length.
    pub fn len(&self) -> usize {
        match self {
            TerminalType::Is(name) => 1 + name.len(),
            TerminalType::Send => 1,
        }
    }

    /// Payloads always carry at least the subcommand byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Encodes this payload into a byte buffer.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        Ok(self.write(&mut dst.writer())?)
    }

    /// Writes the subcommand byte followed by the name, if any.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        match self {
            TerminalType::Is(name) => {
                writer.write_all(&[IS])?;
                writer.write_all(name.as_bytes())?;
                Ok(1 + name.len())
            }
            TerminalType::Send => {
                writer.write_all(&[SEND])?;
                Ok(1)
            }
        }
    }

    /// Decodes a TERMINAL-TYPE payload.
    ///
    /// `IS` requires at least one byte of name data after the subcommand;
    /// the name is decoded lossily and trimmed. `SEND` must be the lone
    /// subcommand byte.
    ///
    /// # Errors
    /// `InsufficientData` for an empty payload or a bare `IS`;
    /// `InvalidCommand` for any other subcommand byte.
    pub fn decode(payload: &[u8]) -> CodecResult<TerminalType> {
        match payload.first() {
            Some(&IS) => {
                if payload.len() < 2 {
                    return Err(CodecError::SubnegotiationError {
                        option: Some(crate::consts::option::TTYPE),
                        reason: SubnegotiationErrorKind::InsufficientData {
                            required: 2,
                            available: payload.len(),
                        },
                    });
                }
                let name = String::from_utf8_lossy(&payload[1..]).trim().to_string();
                Ok(TerminalType::Is(name))
            }
            Some(&SEND) => Ok(TerminalType::Send),
            Some(&other) => Err(CodecError::SubnegotiationError {
                option: Some(crate::consts::option::TTYPE),
                reason: SubnegotiationErrorKind::InvalidCommand { command: other },
            }),
            None => Err(CodecError::SubnegotiationError {
                option: Some(crate::consts::option::TTYPE),
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: 1,
                    available: 0,
                },
            }),
        }
    }
}

impl std::fmt::Display for TerminalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalType::Is(name) => write!(f, "IS {name}"),
            TerminalType::Send => write!(f, "SEND"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_is_xterm() {
        let mut payload = vec![IS];
        payload.extend_from_slice(b"xterm");
        assert_eq!(
            TerminalType::decode(&payload).unwrap(),
            TerminalType::Is("xterm".to_string())
        );
    }

    #[test]
    fn decode_trims_whitespace_and_replaces_invalid_utf8() {
        let payload = [IS, b' ', 0xC3, 0x28, b' '];
        let TerminalType::Is(name) = TerminalType::decode(&payload).unwrap() else {
            panic!("expected IS");
        };
        assert_eq!(name, "\u{FFFD}(");
    }

    #[test]
    fn decode_send() {
        assert_eq!(TerminalType::decode(&[SEND]).unwrap(), TerminalType::Send);
    }

    #[test]
    fn decode_rejects_other_subcommands() {
        assert!(TerminalType::decode(&[2, b'x']).is_err());
        assert!(TerminalType::decode(&[]).is_err());
        assert!(TerminalType::decode(&[IS]).is_err());
    }

    #[test]
    fn encode_send_request() {
        let mut buf = bytes::BytesMut::new();
        TerminalType::Send.encode(&mut buf).expect("encode ok");
        assert_eq!(&buf[..], &[SEND]);
    }
}
