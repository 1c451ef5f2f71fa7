// Path and File Name : /home/netsnare/rebuild/core/emulation/src/lib.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Library root for protocol emulation - decoy protocol enum and pure transition tables

mod machine;

pub use machine::{
    connect_banner, step, EmulationState, Protocol, Reply, FTP_FAIL_DELAY_MS,
    TELNET_FAIL_DELAY_MS,
};
