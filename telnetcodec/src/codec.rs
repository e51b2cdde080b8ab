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

use super::{CodecError, TelnetEvent, TelnetFrame, TelnetOption, consts};
use crate::args::TelnetArgument;
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

/// Upper bound on a buffered subnegotiation payload. A peer that opens a
/// block and never closes it would otherwise grow the buffer without limit;
/// past this cap payload bytes are discarded while the scanner keeps looking
/// for the closing IAC SE, and the overfull block is dropped once it closes.
const SUBNEGOTIATION_LIMIT: usize = 64 * 1024;

/// A codec for the Telnet wire protocol.
///
/// `TelnetCodec` separates the two streams RFC 854 interleaves on one TCP
/// connection: in-band control sequences (IAC-prefixed commands and
/// subnegotiation blocks) and plain application data. Decoding is a
/// byte-at-a-time state machine, so a control sequence split across any
/// number of reads reassembles exactly as if it had arrived whole: the
/// undecoded tail stays in the caller's buffer and the machine state plus the
/// subnegotiation buffer carry everything else between calls.
///
/// The codec is purely a framer: it never answers negotiation commands
/// itself. Received DO/DONT/WILL/WONT surface as [`TelnetEvent`]s for the
/// session's policy to answer.
pub struct TelnetCodec {
    decoder_state: DecoderState,
    decoder_buffer: BytesMut,
    subnegotiation_overflow: bool,
}

impl TelnetCodec {
    /// Creates a new `TelnetCodec` with the decoder in the normal-data state.
    pub fn new() -> TelnetCodec {
        TelnetCodec::default()
    }
}

impl Default for TelnetCodec {
    fn default() -> Self {
        TelnetCodec {
            decoder_state: DecoderState::NormalData,
            decoder_buffer: BytesMut::new(),
            subnegotiation_overflow: false,
        }
    }
}

impl TelnetCodec {
    fn push_subnegotiation_byte(&mut self, byte: u8) {
        if self.decoder_buffer.len() < SUBNEGOTIATION_LIMIT {
            self.decoder_buffer.put_u8(byte);
        } else if !self.subnegotiation_overflow {
            self.subnegotiation_overflow = true;
            warn!(
                "subnegotiation block exceeded {} bytes, discarding remainder",
                SUBNEGOTIATION_LIMIT
            );
        }
    }
}

impl Decoder for TelnetCodec {
    type Item = TelnetEvent;
    type Error = CodecError;

    /// Decodes the next [`TelnetEvent`] out of `src`, consuming only the
    /// bytes it interprets.
    ///
    /// Returns `Ok(None)` when `src` runs out mid-sequence; the decoder state
    /// persists, so feeding the remaining bytes later yields the identical
    /// event stream regardless of where the input was split.
    ///
    /// Resilience rules:
    /// - `IAC IAC` decodes to a single 0xFF data byte.
    /// - An unrecognized `IAC <cmd>` pair is skipped with a warning.
    /// - Inside a subnegotiation block, `IAC IAC` unescapes to one 0xFF and
    ///   any other `IAC <x>` is kept as payload; the block runs until the
    ///   first real `IAC SE`.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TelnetEvent>, Self::Error> {
        while src.remaining() > 0 {
            let byte = src.get_u8();
            match (self.decoder_state, byte) {
                (DecoderState::NormalData, consts::IAC) => {
                    self.decoder_state = DecoderState::InterpretAsCommand;
                }
                (DecoderState::NormalData, _) => {
                    return Ok(Some(TelnetEvent::Data(byte)));
                }
                (DecoderState::InterpretAsCommand, consts::IAC) => {
                    // Escaped 0xFF data byte
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::Data(consts::IAC)));
                }
                (DecoderState::InterpretAsCommand, consts::DO) => {
                    self.decoder_state = DecoderState::NegotiateDo;
                }
                (DecoderState::InterpretAsCommand, consts::DONT) => {
                    self.decoder_state = DecoderState::NegotiateDont;
                }
                (DecoderState::InterpretAsCommand, consts::WILL) => {
                    self.decoder_state = DecoderState::NegotiateWill;
                }
                (DecoderState::InterpretAsCommand, consts::WONT) => {
                    self.decoder_state = DecoderState::NegotiateWont;
                }
                (DecoderState::InterpretAsCommand, consts::SB) => {
                    self.decoder_state = DecoderState::Subnegotiate;
                }
                (DecoderState::InterpretAsCommand, _) => {
                    // Two-byte command we don't act on; skip it
                    warn!("ignoring telnet command {:#04X}", byte);
                    self.decoder_state = DecoderState::NormalData;
                }
                (DecoderState::NegotiateDo, _) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::Do(TelnetOption::from_u8(byte))));
                }
                (DecoderState::NegotiateDont, _) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::Dont(TelnetOption::from_u8(byte))));
                }
                (DecoderState::NegotiateWill, _) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::Will(TelnetOption::from_u8(byte))));
                }
                (DecoderState::NegotiateWont, _) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::Wont(TelnetOption::from_u8(byte))));
                }
                (DecoderState::Subnegotiate, _) => {
                    self.decoder_state = DecoderState::SubnegotiateArgument(byte);
                }
                (DecoderState::SubnegotiateArgument(option), consts::IAC) => {
                    self.decoder_state = DecoderState::SubnegotiateArgumentIAC(option);
                }
                (DecoderState::SubnegotiateArgument(_option), _) => {
                    self.push_subnegotiation_byte(byte);
                }
                (DecoderState::SubnegotiateArgumentIAC(option), consts::IAC) => {
                    self.decoder_state = DecoderState::SubnegotiateArgument(option);
                    self.push_subnegotiation_byte(consts::IAC);
                }
                (DecoderState::SubnegotiateArgumentIAC(option), consts::SE) => {
                    self.decoder_state = DecoderState::NormalData;
                    let option = TelnetOption::from_u8(option);
                    let payload = BytesMut::from(self.decoder_buffer.as_ref());
                    self.decoder_buffer.clear();
                    if self.subnegotiation_overflow {
                        self.subnegotiation_overflow = false;
                        warn!("dropping oversized subnegotiation block for {option}");
                        continue;
                    }
                    return Ok(Some(TelnetEvent::Subnegotiate(TelnetArgument::decode(
                        option, payload,
                    ))));
                }
                (DecoderState::SubnegotiateArgumentIAC(option), _) => {
                    // Not a terminator and not an escape; the block runs to
                    // the first IAC SE, so both bytes belong to the payload.
                    self.decoder_state = DecoderState::SubnegotiateArgument(option);
                    self.push_subnegotiation_byte(consts::IAC);
                    self.push_subnegotiation_byte(byte);
                }
            }
        }
        Ok(None)
    }
}

impl Encoder<TelnetFrame> for TelnetCodec {
    type Error = CodecError;

    /// Encodes a `TelnetFrame` into its wire representation.
    ///
    /// Data bytes of 0xFF are escaped as `IAC IAC`, negotiation commands are
    /// the fixed three-byte sequences, and subnegotiation payloads are
    /// wrapped in `IAC SB <opt> ... IAC SE` with any payload 0xFF escaped.
    fn encode(&mut self, item: TelnetFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            TelnetFrame::Data(byte) => {
                dst.reserve(2);
                if byte == consts::IAC {
                    dst.put_u8(consts::IAC);
                }
                dst.put_u8(byte);
            }
            TelnetFrame::Do(option) => {
                dst.reserve(3);
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::DO);
                dst.put_u8(option.to_u8());
            }
            TelnetFrame::Dont(option) => {
                dst.reserve(3);
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::DONT);
                dst.put_u8(option.to_u8());
            }
            TelnetFrame::Will(option) => {
                dst.reserve(3);
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::WILL);
                dst.put_u8(option.to_u8());
            }
            TelnetFrame::Wont(option) => {
                dst.reserve(3);
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::WONT);
                dst.put_u8(option.to_u8());
            }
            TelnetFrame::Subnegotiate(argument) => {
                dst.reserve(5 + argument.len() * 2);
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::SB);
                dst.put_u8(argument.option().to_u8());
                let mut payload = BytesMut::with_capacity(argument.len());
                argument.encode(&mut payload)?;
                for byte in &payload {
                    if *byte == consts::IAC {
                        dst.put_u8(consts::IAC);
                    }
                    dst.put_u8(*byte);
                }
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::SE);
            }
        }
        Ok(())
    }
}

impl Encoder<&[u8]> for TelnetCodec {
    type Error = CodecError;

    /// Encodes raw application bytes, escaping any embedded 0xFF. No line
    /// ending is appended; prompts are written without one.
    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        for byte in item {
            if *byte == consts::IAC {
                dst.put_u8(consts::IAC);
            }
            dst.put_u8(*byte);
        }
        Ok(())
    }
}

///
/// Internal decoder state. Tracks where in a control sequence the last
/// consumed byte left us, which is what lets sequences span reads.
///
#[derive(Clone, Copy, Debug)]
enum DecoderState {
    /// Normal Data
    NormalData,
    /// Received IAC, next byte is a command
    InterpretAsCommand,
    /// Received DO, next byte is the option
    NegotiateDo,
    /// Received DONT, next byte is the option
    NegotiateDont,
    /// Received WILL, next byte is the option
    NegotiateWill,
    /// Received WONT, next byte is the option
    NegotiateWont,
    /// Received SB, next byte is the option
    Subnegotiate,
    /// Accumulating subnegotiation payload for the given option
    SubnegotiateArgument(u8),
    /// Received IAC inside a subnegotiation payload
    SubnegotiateArgumentIAC(u8),
}
