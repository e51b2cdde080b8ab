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

//! Reactive option negotiation.
//!
//! This is deliberately NOT an RFC 1143 state machine. Each received
//! DO/DONT/WILL/WONT is answered from a fixed per-option table with no memory
//! of earlier exchanges. Because the reply is a pure function of
//! (command, option), repeated negotiation of the same option just repeats
//! the same answer: redundant traffic, never protocol divergence.

use crate::args::TelnetArgument;
use crate::args::ttype::TerminalType;
use crate::{TelnetEvent, TelnetFrame, TelnetOption};

/// Options we agree to perform ourselves when the peer sends `DO <opt>`.
const ACCEPT_LOCAL: [TelnetOption; 3] = [
    TelnetOption::TransmitBinary,
    TelnetOption::SuppressGoAhead,
    TelnetOption::Echo,
];

/// Options we want the peer to perform when it offers `WILL <opt>`.
const ACCEPT_REMOTE: [TelnetOption; 6] = [
    TelnetOption::NegotiateAboutWindowSize,
    TelnetOption::TerminalType,
    TelnetOption::NewEnviron,
    TelnetOption::Linemode,
    TelnetOption::TransmitBinary,
    TelnetOption::SuppressGoAhead,
];

/// Stateless DO/DONT/WILL/WONT reply table.
pub struct NegotiationPolicy;

impl NegotiationPolicy {
    /// The reply (if any) to a received protocol event.
    ///
    /// Data and subnegotiation events produce no reply; the four negotiation
    /// commands always do.
    pub fn reply(event: &TelnetEvent) -> Option<TelnetFrame> {
        match event {
            TelnetEvent::Do(option) => {
                if ACCEPT_LOCAL.contains(option) {
                    Some(TelnetFrame::Will(*option))
                } else {
                    Some(TelnetFrame::Wont(*option))
                }
            }
            TelnetEvent::Dont(option) => Some(TelnetFrame::Wont(*option)),
            TelnetEvent::Will(option) => {
                if ACCEPT_REMOTE.contains(option) {
                    Some(TelnetFrame::Do(*option))
                } else {
                    Some(TelnetFrame::Dont(*option))
                }
            }
            TelnetEvent::Wont(option) => Some(TelnetFrame::Dont(*option)),
            TelnetEvent::Data(_) | TelnetEvent::Subnegotiate(_) => None,
        }
    }

    /// Whether this event should schedule the delayed terminal-type request.
    pub fn requests_terminal_type(event: &TelnetEvent) -> bool {
        matches!(event, TelnetEvent::Will(TelnetOption::TerminalType))
    }

    /// The frames announced proactively when a connection opens, front-loading
    /// the negotiation a modern client would otherwise initiate.
    pub fn opening_announcement() -> Vec<TelnetFrame> {
        vec![
            TelnetFrame::Will(TelnetOption::SuppressGoAhead),
            TelnetFrame::Will(TelnetOption::TransmitBinary),
            TelnetFrame::Do(TelnetOption::TransmitBinary),
            TelnetFrame::Do(TelnetOption::NegotiateAboutWindowSize),
            TelnetFrame::Do(TelnetOption::TerminalType),
            TelnetFrame::Do(TelnetOption::NewEnviron),
            TelnetFrame::Do(TelnetOption::Linemode),
        ]
    }

    /// `IAC SB TERMINAL-TYPE SEND IAC SE`: ask the peer for its terminal
    /// name. Sent after a short delay so the peer has finished processing our
    /// WILL/DO burst first.
    pub fn terminal_type_request() -> TelnetFrame {
        TelnetFrame::Subnegotiate(TelnetArgument::TerminalType(TerminalType::Send))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn do_supported_option_yields_will() {
        for option in ACCEPT_LOCAL {
            assert_eq!(
                NegotiationPolicy::reply(&TelnetEvent::Do(option)),
                Some(TelnetFrame::Will(option))
            );
        }
    }

    #[test]
    fn do_unknown_option_yields_wont() {
        let option = TelnetOption::Unknown(200);
        assert_eq!(
            NegotiationPolicy::reply(&TelnetEvent::Do(option)),
            Some(TelnetFrame::Wont(option))
        );
    }

    #[test]
    fn dont_always_yields_wont() {
        for byte in [0u8, 1, 31, 99, 255] {
            let option = TelnetOption::from_u8(byte);
            assert_eq!(
                NegotiationPolicy::reply(&TelnetEvent::Dont(option)),
                Some(TelnetFrame::Wont(option))
            );
        }
    }

    #[test]
    fn will_supported_option_yields_do() {
        for option in ACCEPT_REMOTE {
            assert_eq!(
                NegotiationPolicy::reply(&TelnetEvent::Will(option)),
                Some(TelnetFrame::Do(option))
            );
        }
    }

    #[test]
    fn will_echo_is_refused() {
        assert_eq!(
            NegotiationPolicy::reply(&TelnetEvent::Will(TelnetOption::Echo)),
            Some(TelnetFrame::Dont(TelnetOption::Echo))
        );
    }

    #[test]
    fn wont_always_yields_dont() {
        for byte in [0u8, 24, 34, 77] {
            let option = TelnetOption::from_u8(byte);
            assert_eq!(
                NegotiationPolicy::reply(&TelnetEvent::Wont(option)),
                Some(TelnetFrame::Dont(option))
            );
        }
    }

    #[test]
    fn replies_are_idempotent_under_repetition() {
        let event = TelnetEvent::Do(TelnetOption::Unknown(123));
        let first = NegotiationPolicy::reply(&event);
        for _ in 0..3 {
            assert_eq!(NegotiationPolicy::reply(&event), first);
        }
    }

    #[test]
    fn will_ttype_schedules_terminal_type_request() {
        assert!(NegotiationPolicy::requests_terminal_type(
            &TelnetEvent::Will(TelnetOption::TerminalType)
        ));
        assert!(!NegotiationPolicy::requests_terminal_type(
            &TelnetEvent::Will(TelnetOption::Linemode)
        ));
    }

    #[test]
    fn data_produces_no_reply() {
        assert_eq!(NegotiationPolicy::reply(&TelnetEvent::Data(b'x')), None);
    }

    #[test]
    fn announcement_matches_expected_order() {
        let frames = NegotiationPolicy::opening_announcement();
        assert_eq!(
            frames,
            vec![
                TelnetFrame::Will(TelnetOption::SuppressGoAhead),
                TelnetFrame::Will(TelnetOption::TransmitBinary),
                TelnetFrame::Do(TelnetOption::TransmitBinary),
                TelnetFrame::Do(TelnetOption::NegotiateAboutWindowSize),
                TelnetFrame::Do(TelnetOption::TerminalType),
                TelnetFrame::Do(TelnetOption::NewEnviron),
                TelnetFrame::Do(TelnetOption::Linemode),
            ]
        );
    }
}
