//! In-memory BattleLogRepository implementation.

use battle_core::BattleLog;

use crate::repository::traits::BattleLogRepository;
use crate::repository::{FRAME_HEADER, RepositoryError, Result, decode_body, encode_frame};

/// In-memory battle-log store.
///
/// Uses the same framing as the file store, so offsets are interchangeable.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBattleLogRepository {
    bytes: Vec<u8>,
}

impl InMemoryBattleLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw framed content, as it would appear on disk.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl BattleLogRepository for InMemoryBattleLogRepository {
    fn append(&mut self, log: &BattleLog) -> Result<u64> {
        let offset = self.bytes.len() as u64;
        self.bytes.extend(encode_frame(log)?);
        Ok(offset)
    }

    fn read_at_offset(&self, byte_offset: u64) -> Result<Option<(BattleLog, u64)>> {
        let Ok(start) = usize::try_from(byte_offset) else {
            return Ok(None);
        };
        let Some(rest) = self.bytes.get(start..).filter(|rest| !rest.is_empty()) else {
            return Ok(None);
        };
        let Some((header, tail)) = rest.split_first_chunk::<4>() else {
            return Err(RepositoryError::CorruptedData(format!(
                "truncated frame header at offset {}",
                byte_offset
            )));
        };
        let len = u32::from_le_bytes(*header) as usize;
        let body = tail.get(..len).ok_or_else(|| {
            RepositoryError::CorruptedData(format!(
                "frame at offset {} claims {} bytes past end of store",
                byte_offset, len
            ))
        })?;

        let log = decode_body(body, byte_offset)?;
        Ok(Some((log, byte_offset + FRAME_HEADER + len as u64)))
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        Ok(self.bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::sample_log;

    #[test]
    fn offsets_follow_the_frame_layout() {
        let mut repo = InMemoryBattleLogRepository::new();
        let first = repo.append(&sample_log(1)).unwrap();
        let second = repo.append(&sample_log(2)).unwrap();

        let body = u32::from_le_bytes(repo.as_bytes()[..4].try_into().unwrap());
        assert_eq!(first, 0);
        assert_eq!(second, FRAME_HEADER + u64::from(body));
        assert_eq!(repo.read_all().unwrap(), vec![sample_log(1), sample_log(2)]);
    }

    #[test]
    fn corrupt_body_reports_its_offset() {
        let mut repo = InMemoryBattleLogRepository::new();
        repo.append(&sample_log(1)).unwrap();
        // Version byte.
        repo.bytes[4] = 0xEE;

        let err = repo.read_at_offset(0).unwrap_err();
        assert!(matches!(err, RepositoryError::Codec { offset: 0, .. }));
    }
}
