pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
pub mod terminal_view;

pub use self::config::{Environment, Settings};
pub use router::create_router;
pub use state::AppState;
pub use terminal_view::{EMPTY_STATE, TerminalRenderer, render_transcript};
