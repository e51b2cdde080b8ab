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

//! # Honeywire Telnet Protocol Codec
//!
//! Telnet (RFC 854) interleaves two streams on one TCP connection: in-band
//! control sequences (IAC-prefixed commands and variable-length
//! subnegotiation blocks) and the plain byte stream an application-level line
//! reader expects. Either can be split at any point across TCP reads. This
//! crate de-interleaves them for the honeypot server: a stateful
//! [`TelnetCodec`] built on `tokio_util::codec`, plus the fixed negotiation
//! reply table ([`NegotiationPolicy`]) and typed subnegotiation payloads
//! ([`TelnetArgument`]) the server reacts to.
//!
//! ## Core Components
//!
//! ### [`TelnetCodec`]
//!
//! Implements [`Decoder`](tokio_util::codec::Decoder) and
//! [`Encoder`](tokio_util::codec::Encoder). Decoding is a byte-at-a-time
//! state machine, so control sequences reassemble identically no matter how
//! the input is chunked; incomplete sequences simply wait for more bytes.
//!
//! ### [`TelnetEvent`] / [`TelnetFrame`]
//!
//! [`TelnetEvent`] is what decoding produces: application data bytes (IAC
//! escaping already resolved) and received protocol commands. [`TelnetFrame`]
//! is what encoding consumes: the frames a server puts on the wire.
//!
//! ### [`NegotiationPolicy`]
//!
//! The stateless DO/DONT/WILL/WONT answer table, plus the proactive opening
//! announcement and the delayed TERMINAL-TYPE request. Intentionally not an
//! RFC 1143 Q-method implementation; see the module docs for the reasoning.
//!
//! ## Usage Example
//!
//! ```rust
//! use honeywire_telnetcodec::{NegotiationPolicy, TelnetCodec, TelnetEvent};
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut codec = TelnetCodec::new();
//! let mut input = BytesMut::from(&b"root\xFF\xFD\x01"[..]); // Data + DO ECHO
//! while let Some(event) = codec.decode(&mut input)? {
//!     match event {
//!         TelnetEvent::Data(byte) => println!("data: {byte:#04X}"),
//!         other => {
//!             if let Some(reply) = NegotiationPolicy::reply(&other) {
//!                 println!("would answer {reply:?}");
//!             }
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Protocol Details
//!
//! - 2-byte commands: `IAC <command>`, skipped if unrecognized
//! - 3-byte negotiation: `IAC <DO|DONT|WILL|WONT> <option>`
//! - Subnegotiation: `IAC SB <option> <data...> IAC SE`
//! - `IAC IAC` is a literal 0xFF data byte
//!
//! ## Error Handling
//!
//! The decoder never fails on malformed peer input: unknown commands are
//! skipped, malformed subnegotiation payloads decay to opaque arguments, and
//! a block that never closes is capped rather than buffered forever. This is
//! a honeypot; the peer must never learn anything from our error surface.
//!
//! ## Thread Safety
//!
//! `TelnetCodec` is not thread-safe; each connection owns its own instance.
//!
//! ## Related RFCs
//!
//! - RFC 854: Telnet Protocol Specification
//! - RFC 855: Telnet Option Specifications
//! - RFC 857: Telnet Echo Option
//! - RFC 858: Telnet Suppress Go Ahead Option
//! - RFC 1073: Telnet Window Size Option
//! - RFC 1091: Telnet Terminal-Type Option

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod args;
mod codec;
pub mod consts;
mod event;
mod frame;
mod options;
mod policy;
mod result;

pub use self::args::{TelnetArgument, naws, ttype};
pub use self::codec::TelnetCodec;
pub use self::consts as protocol;
pub use self::event::TelnetEvent;
pub use self::frame::TelnetFrame;
pub use self::options::TelnetOption;
pub use self::policy::NegotiationPolicy;
pub use self::result::{CodecError, CodecResult, SubnegotiationErrorKind};

#[cfg(test)]
mod tests {
    use super::{TelnetCodec, TelnetEvent, TelnetOption, consts};
    use bytes::BytesMut;
    use tokio_util::codec::Decoder;

    #[tokio::test]
    async fn decode_interleaved_login_stream() {
        let mut codec = TelnetCodec::new();
        let mut input_buffer = BytesMut::from(
            &[
                b'r',
                b'o',
                b'o',
                b't',
                consts::CR,
                consts::LF,
                consts::IAC,
                consts::DO,
                consts::option::ECHO,
                b'h',
                b'u',
                b'n',
                b't',
                b'e',
                b'r',
                b'2',
                consts::CR,
                consts::LF,
            ][..],
        );
        let expected_output = vec![
            TelnetEvent::Data(b'r'),
            TelnetEvent::Data(b'o'),
            TelnetEvent::Data(b'o'),
            TelnetEvent::Data(b't'),
            TelnetEvent::Data(consts::CR),
            TelnetEvent::Data(consts::LF),
            TelnetEvent::Do(TelnetOption::Echo),
            TelnetEvent::Data(b'h'),
            TelnetEvent::Data(b'u'),
            TelnetEvent::Data(b'n'),
            TelnetEvent::Data(b't'),
            TelnetEvent::Data(b'e'),
            TelnetEvent::Data(b'r'),
            TelnetEvent::Data(b'2'),
            TelnetEvent::Data(consts::CR),
            TelnetEvent::Data(consts::LF),
        ];
        let mut actual_output = Vec::new();
        while let Some(event) = codec.decode(&mut input_buffer).unwrap() {
            actual_output.push(event);
        }
        assert_eq!(expected_output, actual_output);
    }
}
