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
/// `TelnetEvent` represents what the decoder extracted from the inbound byte
/// stream: either one byte of application data (control sequences already
/// stripped, `IAC IAC` already unescaped) or a protocol command the session
/// should react to. Unrecognized two-byte IAC commands are skipped inside the
/// decoder and never surface here.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetEvent {
    /// One byte of application data
    Data(u8),
    /// Peer asks us to enable an option
    Do(TelnetOption),
    /// Peer asks us to disable an option
    Dont(TelnetOption),
    /// Peer offers to enable an option on its side
    Will(TelnetOption),
    /// Peer refuses an option on its side
    Wont(TelnetOption),
    /// Completed subnegotiation block
    Subnegotiate(TelnetArgument),
}
