//! Game core: everything that decides what happens, nothing that draws or
//! plays it.  The terminal shell reaches in only through `SessionController`
//! and the traits in `ports`.

pub mod board;
pub mod generator;
pub mod input;
pub mod judge;
pub mod playback;
pub mod ports;
pub mod score;
pub mod session;
pub mod timer;

pub use generator::SequenceGenerator;
pub use ports::{KeyValueStore, Ports, Renderer, Sound};
pub use session::{MistakePolicy, Phase, SelectOutcome, SessionConfig, SessionController};
