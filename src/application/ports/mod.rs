mod relay_transport;
mod text_generator;

pub use relay_transport::{ByteStream, RelayReply, RelayTransport, TransportError};
pub use text_generator::{GenerationParams, TextGenerationError, TextGenerator, TextStream};
