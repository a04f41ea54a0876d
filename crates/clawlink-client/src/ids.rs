/// Source of segment and tool-call identifiers.
///
/// Injected into the tracker so production code gets UUIDs while tests get
/// deterministic sequences.
pub trait IdSource: Send {
    fn next_id(&mut self) -> String;
}

/// Production id source — random v4 UUIDs.
#[derive(Debug, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic id source for tests: `id-1`, `id-2`, ...
#[derive(Debug, Default)]
pub struct SeqIds {
    n: u32,
}

impl IdSource for SeqIds {
    fn next_id(&mut self) -> String {
        self.n += 1;
        format!("id-{}", self.n)
    }
}
