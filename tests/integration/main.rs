//! End-to-end tests over the full router and a live socket listener.

mod helpers;

mod chatrooms_test;
mod conversations_test;
mod users_test;
mod ws_test;
