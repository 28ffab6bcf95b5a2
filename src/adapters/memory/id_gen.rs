//! Sequential ID generator.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ports::IdGenerator;

/// Produces `00000001`, `00000002`, ... in order.
#[derive(Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{n:08x}")
    }
}
