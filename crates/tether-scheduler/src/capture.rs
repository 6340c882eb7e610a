/// Source of the observable state streamed while the session is controlled.
///
/// Capture must be bounded in time. `None` means nothing could be captured
/// this time; the scheduler treats it as "no change", never as a fault.
pub trait SnapshotSource: Send + Sync {
    fn capture(&self) -> Option<Vec<u8>>;
}

impl<F> SnapshotSource for F
where
    F: Fn() -> Option<Vec<u8>> + Send + Sync,
{
    fn capture(&self) -> Option<Vec<u8>> {
        self()
    }
}
