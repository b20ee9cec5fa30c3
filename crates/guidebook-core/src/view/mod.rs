//! View/navigation state machine.
//!
//! - `state`: the six views, the serializable `ViewState` and the pure
//!   `reduce` transition function
//! - `history`: back/forward over visited location fragments

pub mod history;
pub mod state;

pub use history::History;
pub use state::{reduce, Action, View, ViewState};
