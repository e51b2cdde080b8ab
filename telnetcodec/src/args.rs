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

use crate::TelnetOption;
use crate::args::naws::WindowSize;
use crate::args::ttype::TerminalType;
use crate::result::CodecResult;
use bytes::{BufMut, BytesMut};
use tracing::debug;

pub mod naws;
pub mod ttype;

///
/// Telnet Subnegotiation Argument
///
/// Payloads for the options this codec interprets get typed variants; every
/// other option (NEW-ENVIRON and LINEMODE included) is carried opaquely in
/// [`TelnetArgument::Unknown`] so the byte stream stays aligned even when the
/// payload is ignored.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetArgument {
    /// A NAWS window-size report: columns then rows.
    WindowSize(WindowSize),
    /// A TERMINAL-TYPE payload: `IS <name>` or `SEND`.
    TerminalType(TerminalType),
    /// A subnegotiation for any option this codec does not interpret.
    Unknown(TelnetOption, BytesMut),
}

impl TelnetArgument {
    /// Interpret a completed subnegotiation block.
    ///
    /// A payload that fails its option-specific parse is demoted to
    /// [`TelnetArgument::Unknown`] rather than surfaced as an error; the
    /// stream is already aligned by the framer, so a malformed payload only
    /// costs us its meaning, never the connection.
    pub fn decode(option: TelnetOption, payload: BytesMut) -> TelnetArgument {
        match option {
            TelnetOption::NegotiateAboutWindowSize => {
                match WindowSize::decode(&mut payload.clone()) {
                    Ok(size) => TelnetArgument::WindowSize(size),
                    Err(error) => {
                        debug!("discarding malformed NAWS payload: {error}");
                        TelnetArgument::Unknown(option, payload)
                    }
                }
            }
            TelnetOption::TerminalType => match TerminalType::decode(&payload) {
                Ok(ttype) => TelnetArgument::TerminalType(ttype),
                Err(error) => {
                    debug!("discarding malformed TERMINAL-TYPE payload: {error}");
                    TelnetArgument::Unknown(option, payload)
                }
            },
            other => TelnetArgument::Unknown(other, payload),
        }
    }

    /// The option this argument belongs to.
    pub fn option(&self) -> TelnetOption {
        match self {
            TelnetArgument::WindowSize(_) => TelnetOption::NegotiateAboutWindowSize,
            TelnetArgument::TerminalType(_) => TelnetOption::TerminalType,
            TelnetArgument::Unknown(option, _) => *option,
        }
    }

    /// Encoded payload length in bytes, excluding the IAC SB / IAC SE framing.
    pub fn len(&self) -> usize {
        match self {
            TelnetArgument::WindowSize(inner) => inner.len(),
            TelnetArgument::TerminalType(inner) => inner.len(),
            TelnetArgument::Unknown(_option, inner) => inner.len(),
        }
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode the payload bytes into `dst`.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        match self {
            TelnetArgument::WindowSize(inner) => inner.encode(dst),
            TelnetArgument::TerminalType(inner) => inner.encode(dst),
            TelnetArgument::Unknown(_option, inner) => {
                dst.put_slice(inner);
                Ok(inner.len())
            }
        }
    }
}
