//! Text generation with a tool loop, and streaming.

pub mod stream;
pub mod text;

pub use stream::{collect_stream, collect_stream_with};
pub use text::generate_text;
