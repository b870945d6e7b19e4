//! Seams between the quiz core and its collaborators.

use serde_json::Value;

use crate::error::Result;
use crate::session::SessionSnapshot;

/// Supplies raw vocabulary records in whatever shape they were stored.
///
/// Records are run through the normalizer; a source never needs to agree
/// on field names.
pub trait WordSource {
    fn load_words(&self) -> Result<Vec<Value>>;
}

/// Receives a read-only snapshot after every session transition.
pub trait Renderer {
    fn render(&mut self, snapshot: &SessionSnapshot);
}

/// In-memory record list, mostly useful for tests and embedding.
impl WordSource for Vec<Value> {
    fn load_words(&self) -> Result<Vec<Value>> {
        Ok(self.clone())
    }
}

impl<F> Renderer for F
where
    F: FnMut(&SessionSnapshot),
{
    fn render(&mut self, snapshot: &SessionSnapshot) {
        self(snapshot)
    }
}
