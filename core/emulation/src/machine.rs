// Path and File Name : /home/netsnare/rebuild/core/emulation/src/machine.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Pure per-protocol decoy transition tables - deterministic (protocol, sub-state, input) -> (output, next sub-state, closed)

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Decoy protocols are a fixed enumerated set - no plugin surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "FTP")]
    Ftp,
    #[serde(rename = "TELNET")]
    Telnet,
    #[serde(rename = "REDIS")]
    Redis,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Ftp => write!(f, "FTP"),
            Protocol::Telnet => write!(f, "TELNET"),
            Protocol::Redis => write!(f, "REDIS"),
        }
    }
}

/// Per-protocol sub-state. Redis emulation is stateless but still carries a
/// variant so every live connection owns exactly one state value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulationState {
    FtpAwaitUser,
    FtpAwaitPass,
    TelnetLogin,
    TelnetPass,
    RedisIdle,
}

/// Result of one transition. `delay` is presentation fidelity only (slow
/// "authentication" replies); correctness never depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub output: String,
    pub next: EmulationState,
    pub closed: bool,
    pub delay: Option<Duration>,
}

impl Reply {
    fn stay(output: &str, state: EmulationState) -> Self {
        Self {
            output: output.to_string(),
            next: state,
            closed: false,
            delay: None,
        }
    }

    fn close(output: &str, state: EmulationState) -> Self {
        Self {
            output: output.to_string(),
            next: state,
            closed: true,
            delay: None,
        }
    }
}

pub const FTP_FAIL_DELAY_MS: u64 = 500;
pub const TELNET_FAIL_DELAY_MS: u64 = 800;

const FTP_BANNER: &str = "220 (vsFTPd 2.3.4)\r\n";
const TELNET_BANNER: &str = "\r\nUbuntu 20.04.6 LTS\r\nserver login: ";

/// Connect-time output and initial sub-state. The Redis-like decoy sends no
/// banner (real redis-server is silent until the first command).
pub fn connect_banner(protocol: Protocol) -> (&'static str, EmulationState) {
    match protocol {
        Protocol::Ftp => (FTP_BANNER, EmulationState::FtpAwaitUser),
        Protocol::Telnet => (TELNET_BANNER, EmulationState::TelnetLogin),
        Protocol::Redis => ("", EmulationState::RedisIdle),
    }
}

/// Evaluate one inbound chunk against the decoy table. Pure and
/// deterministic; callers schedule `delay` themselves so one slow peer never
/// blocks another connection.
pub fn step(protocol: Protocol, state: EmulationState, input: &str) -> Reply {
    match protocol {
        Protocol::Ftp => step_ftp(state, input),
        Protocol::Telnet => step_telnet(state, input),
        Protocol::Redis => step_redis(input),
    }
}

fn step_ftp(state: EmulationState, input: &str) -> Reply {
    let line = input.trim_end_matches(['\r', '\n']);
    let verb = line
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();

    // QUIT is honored from every sub-state.
    if verb == "QUIT" {
        return Reply::close("221 Goodbye.\r\n", state);
    }

    match state {
        EmulationState::FtpAwaitUser if verb == "USER" => Reply::stay(
            "331 Please specify the password.\r\n",
            EmulationState::FtpAwaitPass,
        ),
        EmulationState::FtpAwaitPass if verb == "PASS" => Reply {
            output: "530 Login incorrect.\r\n".to_string(),
            next: EmulationState::FtpAwaitUser,
            closed: false,
            delay: Some(Duration::from_millis(FTP_FAIL_DELAY_MS)),
        },
        _ => Reply::stay("500 Unknown command.\r\n", state),
    }
}

fn step_telnet(state: EmulationState, _input: &str) -> Reply {
    match state {
        EmulationState::TelnetPass => Reply {
            output: "\r\nLogin incorrect\r\n\r\nserver login: ".to_string(),
            next: EmulationState::TelnetLogin,
            closed: false,
            delay: Some(Duration::from_millis(TELNET_FAIL_DELAY_MS)),
        },
        // LOGIN (and any unexpected state) treats the chunk as a username.
        _ => Reply::stay("Password: ", EmulationState::TelnetPass),
    }
}

fn step_redis(input: &str) -> Reply {
    let upper = input.trim().to_ascii_uppercase();

    if upper == "QUIT" {
        return Reply::close("+OK\r\n", EmulationState::RedisIdle);
    }
    if upper.contains("CONFIG") || upper.contains("GET") {
        return Reply::stay(
            "-NOAUTH Authentication required.\r\n",
            EmulationState::RedisIdle,
        );
    }
    if upper.contains("AUTH") {
        return Reply::stay("-ERR invalid password\r\n", EmulationState::RedisIdle);
    }
    Reply::stay("-ERR unknown command\r\n", EmulationState::RedisIdle)
}
