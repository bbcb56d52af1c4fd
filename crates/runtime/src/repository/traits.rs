//! Repository contract for sealed battle logs.

use battle_core::BattleLog;

use crate::repository::Result;

/// Repository for battle-log persistence.
///
/// Append-only: logs are never rewritten once stored. Offsets are byte
/// positions of frames and stay valid for the life of the store.
pub trait BattleLogRepository: Send + Sync {
    /// Append a sealed log.
    ///
    /// Returns the byte offset where the log was written.
    fn append(&mut self, log: &BattleLog) -> Result<u64>;

    /// Read the log at a specific byte offset.
    ///
    /// Returns `None` if the offset is at or beyond the end of the store.
    /// Returns `Some((log, next_offset))` otherwise.
    fn read_at_offset(&self, byte_offset: u64) -> Result<Option<(BattleLog, u64)>>;

    /// Flush buffered writes.
    fn flush(&mut self) -> Result<()>;

    /// Current size of the store in bytes.
    fn size(&self) -> Result<u64>;

    /// Every stored log, oldest first.
    fn read_all(&self) -> Result<Vec<BattleLog>> {
        let mut logs = Vec::new();
        let mut offset = 0;
        while let Some((log, next)) = self.read_at_offset(offset)? {
            logs.push(log);
            offset = next;
        }
        Ok(logs)
    }
}
