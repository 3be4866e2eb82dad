//! Generation backend abstraction.

use crate::types::StreamRecord;
use futures::Stream;
use std::pin::Pin;

/// Records produced for one generation request, in backend order.
///
/// The stream ends after the first terminal record (a fragment with
/// `done = true` or an error). Dropping it releases the backend connection.
pub type RecordStream = Pin<Box<dyn Stream<Item = StreamRecord> + Send>>;

/// A streaming text generator.
///
/// Failures are reported in-band as [`StreamRecord::Error`] rather than as a
/// `Result`, since the HTTP response has usually started by the time the
/// backend is contacted.
pub trait GenerationBackend: Send + Sync {
    /// Start generating a completion for `prompt`.
    fn generate(&self, prompt: String) -> RecordStream;

    /// Identifier of the model generating text.
    fn model_name(&self) -> &str;
}
