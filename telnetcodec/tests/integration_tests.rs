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

//! Chunk-boundary invariance: however the inbound byte stream is split
//! across reads, the decoder must produce the identical event sequence.

use bytes::BytesMut;
use honeywire_telnetcodec::{TelnetCodec, TelnetEvent, protocol};
use proptest::prelude::*;
use tokio_util::codec::Decoder;

/// Decode `stream` fed as the given chunks, one decoder for the whole run.
fn decode_chunked(chunks: &[&[u8]]) -> Vec<TelnetEvent> {
    let mut codec = TelnetCodec::new();
    let mut buffer = BytesMut::new();
    let mut events = Vec::new();
    for chunk in chunks {
        buffer.extend_from_slice(chunk);
        while let Some(event) = codec.decode(&mut buffer).expect("decode should not error") {
            events.push(event);
        }
    }
    events
}

/// A representative protocol stream: text, escaped IAC, all four negotiation
/// verbs, a NAWS block, a TTYPE block, an unknown command, more text.
fn sample_stream() -> Vec<u8> {
    let mut stream = Vec::new();
    stream.extend_from_slice(b"login: ");
    stream.extend_from_slice(&[protocol::IAC, protocol::IAC]);
    stream.extend_from_slice(&[protocol::IAC, protocol::DO, protocol::option::ECHO]);
    stream.extend_from_slice(&[protocol::IAC, protocol::WILL, protocol::option::TTYPE]);
    stream.extend_from_slice(&[protocol::IAC, protocol::DONT, protocol::option::LINEMODE]);
    stream.extend_from_slice(&[protocol::IAC, protocol::WONT, protocol::option::SGA]);
    stream.extend_from_slice(&[
        protocol::IAC,
        protocol::SB,
        protocol::option::NAWS,
        0,
        132,
        0,
        43,
        protocol::IAC,
        protocol::SE,
    ]);
    stream.extend_from_slice(&[protocol::IAC, protocol::SB, protocol::option::TTYPE, 0]);
    stream.extend_from_slice(b"vt220");
    stream.extend_from_slice(&[protocol::IAC, protocol::SE]);
    stream.extend_from_slice(&[protocol::IAC, protocol::GA]);
    stream.extend_from_slice(b"admin\r\n");
    stream
}

#[test]
fn split_at_every_boundary_matches_unsplit() {
    let stream = sample_stream();
    let whole = decode_chunked(&[&stream]);
    for split in 1..stream.len() {
        let (head, tail) = stream.split_at(split);
        assert_eq!(
            decode_chunked(&[head, tail]),
            whole,
            "split at byte {split} diverged"
        );
    }
}

#[test]
fn one_byte_at_a_time_matches_unsplit() {
    let stream = sample_stream();
    let whole = decode_chunked(&[&stream]);
    let singles: Vec<&[u8]> = stream.chunks(1).collect();
    assert_eq!(decode_chunked(&singles), whole);
}

proptest! {
    #[test]
    fn arbitrary_splits_of_arbitrary_streams_are_invariant(
        payload in proptest::collection::vec(any::<u8>(), 0..256),
        split_points in proptest::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        // Terminate with IAC SE so trailing partial subnegotiations from the
        // random payload cannot hold back events forever, then compare a
        // whole-buffer decode against a randomly chunked decode.
        let mut stream = payload;
        stream.extend_from_slice(&[protocol::IAC, protocol::SE]);

        let whole = decode_chunked(&[&stream]);

        let mut cuts: Vec<usize> = split_points
            .iter()
            .map(|index| index.index(stream.len() + 1))
            .collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut chunks: Vec<&[u8]> = Vec::new();
        let mut start = 0;
        for cut in cuts {
            chunks.push(&stream[start..cut]);
            start = cut;
        }
        chunks.push(&stream[start..]);

        prop_assert_eq!(decode_chunked(&chunks), whole);
    }
}
