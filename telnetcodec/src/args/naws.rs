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

//! Negotiate About Window Size
//!

use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, BufMut};

/// The dimensions a client reports in a NAWS subnegotiation.
///
/// The payload is four bytes in big-endian order: two for columns followed by
/// two for rows. A dimension of zero means the client is not reporting that
/// dimension; the consumer decides what to do with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    /// The number of columns (characters) in the terminal window
    pub cols: u16,
    /// The number of rows (lines) in the terminal window
    pub rows: u16,
}

impl WindowSize {
    /// Creates a new `WindowSize` with the specified columns and rows.
    pub fn new(cols: u16, rows: u16) -> Self {
        WindowSize { cols, rows }
    }

    /// Encoded length of the NAWS payload. Always 4.
    pub fn len(&self) -> usize {
        4
    }

    /// NAWS payloads are never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Encodes this `WindowSize` into a byte buffer in big-endian order.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        Ok(self.write(&mut dst.writer())?)
    }

    /// Writes this `WindowSize` to a writer: columns then rows, big-endian.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        writer.write_u16::<BigEndian>(self.cols)?;
        writer.write_u16::<BigEndian>(self.rows)?;
        Ok(4)
    }

    /// Decodes a `WindowSize` from the first four payload bytes.
    ///
    /// # Errors
    /// Returns `CodecError::SubnegotiationError` with `InsufficientData` if
    /// fewer than 4 bytes are available.
    pub fn decode<T: Buf>(src: &mut T) -> CodecResult<WindowSize> {
        // NAWS format: WIDTH-HIGH WIDTH-LOW HEIGHT-HIGH HEIGHT-LOW
        if src.remaining() >= 4 {
            Ok(WindowSize {
                cols: src.get_u16(),
                rows: src.get_u16(),
            })
        } else {
            Err(CodecError::SubnegotiationError {
                option: Some(crate::consts::option::NAWS),
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: 4,
                    available: src.remaining(),
                },
            })
        }
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn decode_standard_terminal() {
        let mut src = BytesMut::from(&[0x00, 0x50, 0x00, 0x18][..]);
        let size = WindowSize::decode(&mut src).expect("decode ok");
        assert_eq!(size, WindowSize::new(80, 24));
    }

    #[test]
    fn decode_short_payload_is_an_error() {
        let mut src = BytesMut::from(&[0x00, 0x50, 0x00][..]);
        let err = WindowSize::decode(&mut src).unwrap_err();
        assert_eq!(
            err,
            CodecError::SubnegotiationError {
                option: Some(crate::consts::option::NAWS),
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: 4,
                    available: 3,
                },
            }
        );
    }

    #[test]
    fn encode_round_trips() {
        let size = WindowSize::new(132, 50);
        let mut buf = BytesMut::new();
        size.encode(&mut buf).expect("encode ok");
        assert_eq!(&buf[..], &[0x00, 0x84, 0x00, 0x32]);
        assert_eq!(WindowSize::decode(&mut buf).unwrap(), size);
    }
}
