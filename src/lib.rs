/// Gridlock engine: sliding-block puzzle rules and session state.
///
/// `domain` holds the pure board model and rules, `sim` the stateful
/// session, logs and persistence. The terminal front end lives in the
/// binary (`main.rs` + `ui/`).

pub mod config;
pub mod domain;
pub mod sim;
