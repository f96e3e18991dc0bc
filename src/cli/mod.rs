pub mod commands;
pub mod ui;
pub mod util;

pub use ui::Output;
pub use util::{AssistantContext, read_input, require_min_chars, require_non_blank};
