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

use super::TelnetOption;
use crate::args::TelnetArgument;

///
/// `TelnetFrame` represents a unit the codec can place on the wire: a data
/// byte (IAC-escaped as needed), one of the four negotiation commands, or a
/// complete subnegotiation block.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetFrame {
    /// Telnet Data Byte
    Data(u8),
    /// Request the peer enable an option (`IAC DO <opt>`)
    Do(TelnetOption),
    /// Request the peer disable an option (`IAC DONT <opt>`)
    Dont(TelnetOption),
    /// Offer to enable an option locally (`IAC WILL <opt>`)
    Will(TelnetOption),
    /// Refuse or disable an option locally (`IAC WONT <opt>`)
    Wont(TelnetOption),
    /// Subnegotiation block (`IAC SB <opt> <payload> IAC SE`)
    Subnegotiate(TelnetArgument),
}
