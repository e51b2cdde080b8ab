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

use crate::consts;

/// A Telnet option that may appear in a DO/DONT/WILL/WONT command or open a
/// subnegotiation block.
///
/// Only the options the honeypot's negotiation policy knows about get named
/// variants; everything else round-trips through [`TelnetOption::Unknown`] so
/// the original option byte is preserved in replies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TelnetOption {
    /// Binary Transmission (RFC 856)
    TransmitBinary,
    /// Echo (RFC 857)
    Echo,
    /// Suppress Go Ahead (RFC 858)
    SuppressGoAhead,
    /// Terminal Type (RFC 1091)
    TerminalType,
    /// Negotiate About Window Size (RFC 1073)
    NegotiateAboutWindowSize,
    /// Linemode (RFC 1184)
    Linemode,
    /// New Environment Option (RFC 1572)
    NewEnviron,
    /// Any option this codec does not model
    Unknown(u8),
}

impl TelnetOption {
    /// Decode an option byte.
    pub fn from_u8(value: u8) -> TelnetOption {
        match value {
            consts::option::BINARY => TelnetOption::TransmitBinary,
            consts::option::ECHO => TelnetOption::Echo,
            consts::option::SGA => TelnetOption::SuppressGoAhead,
            consts::option::TTYPE => TelnetOption::TerminalType,
            consts::option::NAWS => TelnetOption::NegotiateAboutWindowSize,
            consts::option::LINEMODE => TelnetOption::Linemode,
            consts::option::NEW_ENVIRON => TelnetOption::NewEnviron,
            other => TelnetOption::Unknown(other),
        }
    }

    /// Encode this option back to its wire byte.
    pub fn to_u8(self) -> u8 {
        match self {
            TelnetOption::TransmitBinary => consts::option::BINARY,
            TelnetOption::Echo => consts::option::ECHO,
            TelnetOption::SuppressGoAhead => consts::option::SGA,
            TelnetOption::TerminalType => consts::option::TTYPE,
            TelnetOption::NegotiateAboutWindowSize => consts::option::NAWS,
            TelnetOption::Linemode => consts::option::LINEMODE,
            TelnetOption::NewEnviron => consts::option::NEW_ENVIRON,
            TelnetOption::Unknown(other) => other,
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(value: u8) -> Self {
        TelnetOption::from_u8(value)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetOption::TransmitBinary => write!(f, "TRANSMIT-BINARY"),
            TelnetOption::Echo => write!(f, "ECHO"),
            TelnetOption::SuppressGoAhead => write!(f, "SUPPRESS-GO-AHEAD"),
            TelnetOption::TerminalType => write!(f, "TERMINAL-TYPE"),
            TelnetOption::NegotiateAboutWindowSize => write!(f, "NAWS"),
            TelnetOption::Linemode => write!(f, "LINEMODE"),
            TelnetOption::NewEnviron => write!(f, "NEW-ENVIRON"),
            TelnetOption::Unknown(code) => write!(f, "UNKNOWN({code})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_bytes_round_trip() {
        for value in 0..=u8::MAX {
            assert_eq!(TelnetOption::from_u8(value).to_u8(), value);
        }
    }

    #[test]
    fn known_options_map_to_named_variants() {
        assert_eq!(TelnetOption::from_u8(0), TelnetOption::TransmitBinary);
        assert_eq!(TelnetOption::from_u8(1), TelnetOption::Echo);
        assert_eq!(TelnetOption::from_u8(3), TelnetOption::SuppressGoAhead);
        assert_eq!(TelnetOption::from_u8(24), TelnetOption::TerminalType);
        assert_eq!(
            TelnetOption::from_u8(31),
            TelnetOption::NegotiateAboutWindowSize
        );
        assert_eq!(TelnetOption::from_u8(34), TelnetOption::Linemode);
        assert_eq!(TelnetOption::from_u8(39), TelnetOption::NewEnviron);
        assert_eq!(TelnetOption::from_u8(42), TelnetOption::Unknown(42));
    }
}
