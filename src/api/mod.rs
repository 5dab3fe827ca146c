pub mod client;
pub mod error;
pub mod generation;
#[cfg(test)]
pub mod mock_client;
pub mod stream;

pub use client::{ApiClient, ByteStream, Download};
pub use error::ClientError;
pub use generation::{start_generation, GenerationHandle, GenerationUpdate};
