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

//! Login session state machine
//!
//! Two states, no success path. Every username/password pair is recorded and
//! rejected; after the attempt limit the peer gets the lockout message and
//! the connection closes. Echo negotiation hides password entry: entering the
//! password state sends `WILL ECHO` (we claim echoing, so the client stops
//! local echo and typed characters vanish), returning to the username state
//! sends `WONT ECHO` (the client resumes local echo).
//!
//! Transitions are pure: each input returns a [`LoginStep`] describing what
//! to send, what to audit and whether to disconnect, and the connection
//! worker executes it. That keeps the whole prompt loop testable without a
//! socket.

use crate::audit::AuditRecord;
use bytes::Bytes;
use honeywire_telnetcodec::naws::WindowSize;
use honeywire_telnetcodec::ttype::TerminalType;
use honeywire_telnetcodec::{TelnetFrame, TelnetOption};

const USERNAME_PROMPT: &[u8] = b"Username: ";
const PASSWORD_PROMPT: &[u8] = b"Password: ";
const WRONG_PASSWORD: &[u8] = b"Wrong password.\r\n";
const LOCKOUT_MESSAGE: &[u8] = b"Too many wrong attempts. Disconnecting.\r\n";

/// Which prompt the session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// Waiting for a username line
    AwaitingUsername,
    /// Waiting for a password line
    AwaitingPassword,
}

/// One outbound action produced by a transition, in send order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Write literal text to the peer
    Send(Bytes),
    /// Write a protocol frame to the peer
    SendFrame(TelnetFrame),
    /// Flush and close the connection
    Disconnect,
}

/// Everything a transition asks the connection worker to do.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoginStep {
    /// Outbound writes and the optional final disconnect, in order
    pub actions: Vec<SessionAction>,
    /// Audit records the transition produced
    pub records: Vec<AuditRecord>,
}

/// Per-connection login state.
#[derive(Debug)]
pub struct LoginSession {
    state: LoginState,
    attempts: u32,
    max_attempts: u32,
    terminal_type: Option<String>,
    window_cols: Option<u16>,
    window_rows: Option<u16>,
}

impl LoginSession {
    /// Create a session allowing `max_attempts` password attempts.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            state: LoginState::AwaitingUsername,
            attempts: 0,
            max_attempts,
            terminal_type: None,
            window_cols: None,
            window_rows: None,
        }
    }

    /// Current prompt state.
    pub fn state(&self) -> LoginState {
        self.state
    }

    /// Failed password attempts so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Terminal type the peer last reported, if any.
    pub fn terminal_type(&self) -> Option<&str> {
        self.terminal_type.as_deref()
    }

    /// Window dimensions the peer last reported, per dimension.
    pub fn window_size(&self) -> (Option<u16>, Option<u16>) {
        (self.window_cols, self.window_rows)
    }

    /// Opening sequence: banner, then the username prompt.
    pub fn on_connect(&mut self, banner: &Bytes) -> LoginStep {
        let mut step = LoginStep::default();
        step.actions.push(SessionAction::Send(banner.clone()));
        self.prompt_username(&mut step);
        step
    }

    /// Feed one completed line (delimiter and trailing CR already stripped).
    pub fn on_line(&mut self, line: &[u8]) -> LoginStep {
        let mut step = LoginStep::default();
        match self.state {
            LoginState::AwaitingUsername => {
                step.records.push(AuditRecord::UsernameAttempt {
                    line: line.to_vec(),
                });
                self.prompt_password(&mut step);
            }
            LoginState::AwaitingPassword => {
                step.records.push(AuditRecord::PasswordAttempt {
                    line: line.to_vec(),
                });
                self.attempts += 1;
                if self.attempts < self.max_attempts {
                    step.actions
                        .push(SessionAction::Send(Bytes::from_static(WRONG_PASSWORD)));
                    self.prompt_username(&mut step);
                } else {
                    step.records.push(AuditRecord::MaxAttemptsReached);
                    step.actions
                        .push(SessionAction::Send(Bytes::from_static(LOCKOUT_MESSAGE)));
                    step.actions.push(SessionAction::Disconnect);
                }
            }
        }
        step
    }

    /// Apply a NAWS report. A zero dimension means "not reported" and leaves
    /// the stored value alone; any update yields the audit record.
    pub fn apply_window_size(&mut self, size: WindowSize) -> Option<AuditRecord> {
        let mut updated = false;
        if size.cols > 0 {
            self.window_cols = Some(size.cols);
            updated = true;
        }
        if size.rows > 0 {
            self.window_rows = Some(size.rows);
            updated = true;
        }
        updated.then(|| AuditRecord::WindowSize {
            cols: self.window_cols.unwrap_or(0),
            rows: self.window_rows.unwrap_or(0),
        })
    }

    /// Apply a TERMINAL-TYPE payload. Only a non-empty `IS` name counts.
    pub fn apply_terminal_type(&mut self, ttype: &TerminalType) -> Option<AuditRecord> {
        match ttype {
            TerminalType::Is(name) if !name.is_empty() => {
                self.terminal_type = Some(name.clone());
                Some(AuditRecord::TerminalType { name: name.clone() })
            }
            _ => None,
        }
    }

    fn prompt_username(&mut self, step: &mut LoginStep) {
        self.state = LoginState::AwaitingUsername;
        step.actions.push(SessionAction::SendFrame(TelnetFrame::Wont(
            TelnetOption::Echo,
        )));
        step.actions
            .push(SessionAction::Send(Bytes::from_static(USERNAME_PROMPT)));
    }

    fn prompt_password(&mut self, step: &mut LoginStep) {
        self.state = LoginState::AwaitingPassword;
        step.actions.push(SessionAction::SendFrame(TelnetFrame::Will(
            TelnetOption::Echo,
        )));
        step.actions
            .push(SessionAction::Send(Bytes::from_static(PASSWORD_PROMPT)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(step: &LoginStep) -> Vec<Vec<u8>> {
        step.actions
            .iter()
            .filter_map(|action| match action {
                SessionAction::Send(bytes) => Some(bytes.to_vec()),
                _ => None,
            })
            .collect()
    }

    fn echo_frames(step: &LoginStep) -> Vec<TelnetFrame> {
        step.actions
            .iter()
            .filter_map(|action| match action {
                SessionAction::SendFrame(frame) => Some(frame.clone()),
                _ => None,
            })
            .collect()
    }

    fn disconnects(step: &LoginStep) -> bool {
        step.actions
            .iter()
            .any(|action| matches!(action, SessionAction::Disconnect))
    }

    #[test]
    fn connect_sends_banner_then_username_prompt_with_local_echo() {
        let mut session = LoginSession::new(3);
        let banner = Bytes::from_static(b"Welcome to the Telnet Honeypot!\r\n");
        let step = session.on_connect(&banner);

        assert_eq!(
            texts(&step),
            vec![banner.to_vec(), b"Username: ".to_vec()]
        );
        assert_eq!(
            echo_frames(&step),
            vec![TelnetFrame::Wont(TelnetOption::Echo)]
        );
        assert_eq!(session.state(), LoginState::AwaitingUsername);
    }

    #[test]
    fn full_login_transcript_locks_out_on_third_password() {
        let mut session = LoginSession::new(3);
        session.on_connect(&Bytes::from_static(b"hi\r\n"));

        // "alice" -> password prompt, server claims echo (hidden input)
        let step = session.on_line(b"alice");
        assert_eq!(
            step.records,
            vec![AuditRecord::UsernameAttempt {
                line: b"alice".to_vec()
            }]
        );
        assert_eq!(
            echo_frames(&step),
            vec![TelnetFrame::Will(TelnetOption::Echo)]
        );
        assert_eq!(texts(&step), vec![b"Password: ".to_vec()]);
        assert_eq!(session.state(), LoginState::AwaitingPassword);

        // "wrong1" -> rejection, back to username prompt, echo restored
        let step = session.on_line(b"wrong1");
        assert_eq!(
            step.records,
            vec![AuditRecord::PasswordAttempt {
                line: b"wrong1".to_vec()
            }]
        );
        assert_eq!(
            texts(&step),
            vec![b"Wrong password.\r\n".to_vec(), b"Username: ".to_vec()]
        );
        assert_eq!(
            echo_frames(&step),
            vec![TelnetFrame::Wont(TelnetOption::Echo)]
        );
        assert_eq!(session.attempts(), 1);
        assert!(!disconnects(&step));

        // second round
        session.on_line(b"bob");
        let step = session.on_line(b"wrong2");
        assert_eq!(session.attempts(), 2);
        assert!(!disconnects(&step));

        // third password hits the limit
        session.on_line(b"carol");
        let step = session.on_line(b"wrong3");
        assert_eq!(session.attempts(), 3);
        assert!(step.records.contains(&AuditRecord::MaxAttemptsReached));
        assert_eq!(
            texts(&step),
            vec![b"Too many wrong attempts. Disconnecting.\r\n".to_vec()]
        );
        assert!(disconnects(&step));
    }

    #[test]
    fn no_input_ever_authenticates() {
        let mut session = LoginSession::new(3);
        session.on_connect(&Bytes::from_static(b"hi\r\n"));
        for (user, pass) in [("root", "root"), ("admin", "admin")] {
            session.on_line(user.as_bytes());
            let step = session.on_line(pass.as_bytes());
            let sent = texts(&step).concat();
            let sent = String::from_utf8_lossy(&sent).to_string();
            assert!(!sent.to_lowercase().contains("welcome back"));
            assert!(
                sent.contains("Wrong password.") || sent.contains("Too many wrong attempts."),
                "unexpected response: {sent}"
            );
        }
    }

    #[test]
    fn window_size_report_updates_both_dimensions() {
        let mut session = LoginSession::new(3);
        let record = session.apply_window_size(WindowSize::new(80, 24));
        assert_eq!(record, Some(AuditRecord::WindowSize { cols: 80, rows: 24 }));
        assert_eq!(session.window_size(), (Some(80), Some(24)));
    }

    #[test]
    fn zero_column_report_leaves_columns_unchanged() {
        let mut session = LoginSession::new(3);
        session.apply_window_size(WindowSize::new(80, 24));
        let record = session.apply_window_size(WindowSize::new(0, 50));
        assert_eq!(record, Some(AuditRecord::WindowSize { cols: 80, rows: 50 }));
        assert_eq!(session.window_size(), (Some(80), Some(50)));
    }

    #[test]
    fn zero_column_report_on_fresh_session_sets_only_rows() {
        let mut session = LoginSession::new(3);
        let record = session.apply_window_size(WindowSize::new(0, 24));
        assert_eq!(record, Some(AuditRecord::WindowSize { cols: 0, rows: 24 }));
        assert_eq!(session.window_size(), (None, Some(24)));
    }

    #[test]
    fn all_zero_report_changes_nothing() {
        let mut session = LoginSession::new(3);
        assert_eq!(session.apply_window_size(WindowSize::new(0, 0)), None);
        assert_eq!(session.window_size(), (None, None));
    }

    #[test]
    fn terminal_type_is_stored_and_empty_names_discarded() {
        let mut session = LoginSession::new(3);
        assert_eq!(
            session.apply_terminal_type(&TerminalType::Is("xterm".to_string())),
            Some(AuditRecord::TerminalType {
                name: "xterm".to_string()
            })
        );
        assert_eq!(session.terminal_type(), Some("xterm"));

        assert_eq!(
            session.apply_terminal_type(&TerminalType::Is(String::new())),
            None
        );
        assert_eq!(session.terminal_type(), Some("xterm"));

        // a later report overwrites
        session.apply_terminal_type(&TerminalType::Is("vt100".to_string()));
        assert_eq!(session.terminal_type(), Some("vt100"));
    }
}
