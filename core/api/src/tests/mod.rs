// Path and File Name : /home/netsnare/rebuild/core/api/src/tests/mod.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Tests for the api crate - end-to-end boundary scenarios over the assembled router
