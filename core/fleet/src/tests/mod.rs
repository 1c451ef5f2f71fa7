// Path and File Name : /home/netsnare/rebuild/core/fleet/src/tests/mod.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Tests for the fleet crate - enrollment protocol and actor status lifecycle

#[cfg(test)]
mod enrollment_tests;
