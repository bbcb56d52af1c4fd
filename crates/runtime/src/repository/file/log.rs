//! Append-only battle-log file.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use battle_core::BattleLog;

use crate::repository::traits::BattleLogRepository;
use crate::repository::{FRAME_HEADER, RepositoryError, Result, decode_body, encode_frame};

/// File-based repository storing sealed logs as length-prefixed frames.
///
/// Each frame goes out in a single write and is flushed before `append`
/// returns. A failed write is truncated away, and opening a file drops a torn
/// trailing frame, so the file always ends on a frame boundary.
pub struct FileBattleLogRepository {
    /// Filename identifier
    name: String,
    path: PathBuf,
    file: File,
    /// Byte offset of the next frame
    current_offset: u64,
}

impl FileBattleLogRepository {
    /// Create a new log file.
    ///
    /// # Errors
    ///
    /// Returns error if the file already exists (prevents accidental overwrites).
    pub fn create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let filename = filename.as_ref();
        std::fs::create_dir_all(base_dir)?;

        let path = base_dir.join(filename);
        if path.exists() {
            return Err(RepositoryError::LogAlreadyExists(
                path.display().to_string(),
            ));
        }

        let file = OpenOptions::new().create_new(true).write(true).open(&path)?;
        tracing::debug!("Created battle log: {}", path.display());
        Ok(Self::with_file(filename, path, file, 0))
    }

    /// Open an existing log file for appending.
    pub fn open(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let filename = filename.as_ref();
        let path = base_dir.as_ref().join(filename);

        let file = OpenOptions::new().append(true).open(&path)?;
        let current_offset = drop_torn_tail(&path, &file)?;
        tracing::debug!(
            "Opened battle log: {} at offset {}",
            path.display(),
            current_offset
        );
        Ok(Self::with_file(filename, path, file, current_offset))
    }

    /// Open or create a log file.
    pub fn open_or_create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        std::fs::create_dir_all(base_dir)?;

        let filename = filename.as_ref();
        let path = base_dir.join(filename);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let current_offset = drop_torn_tail(&path, &file)?;
        Ok(Self::with_file(filename, path, file, current_offset))
    }

    fn with_file(name: &str, path: PathBuf, file: File, current_offset: u64) -> Self {
        Self {
            name: name.to_string(),
            path,
            file,
            current_offset,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BattleLogRepository for FileBattleLogRepository {
    fn append(&mut self, log: &BattleLog) -> Result<u64> {
        let offset = self.current_offset;
        let frame = encode_frame(log)?;

        write_frame(&mut self.file, offset, &frame)?;
        self.current_offset += frame.len() as u64;

        Ok(offset)
    }

    fn read_at_offset(&self, byte_offset: u64) -> Result<Option<(BattleLog, u64)>> {
        // Separate reader; appends keep their own handle.
        let file = File::open(&self.path)?;
        let file_size = file.metadata()?.len();
        if byte_offset >= file_size {
            return Ok(None);
        }
        if file_size - byte_offset < FRAME_HEADER {
            return Err(RepositoryError::CorruptedData(format!(
                "truncated frame header at offset {}",
                byte_offset
            )));
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(byte_offset))?;

        let mut len_bytes = [0u8; 4];
        reader.read_exact(&mut len_bytes)?;
        let len = u64::from(u32::from_le_bytes(len_bytes));
        if file_size - byte_offset - FRAME_HEADER < len {
            return Err(RepositoryError::CorruptedData(format!(
                "frame at offset {} claims {} bytes past end of file",
                byte_offset, len
            )));
        }

        let mut body = vec![0u8; len as usize];
        reader.read_exact(&mut body)?;
        let log = decode_body(&body, byte_offset)?;

        Ok(Some((log, byte_offset + FRAME_HEADER + len)))
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        Ok(self.current_offset)
    }
}

/// Destination of frame writes that can be cut back to a length.
trait FrameSink: Write {
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl FrameSink for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Writes `frame` at `offset`; on failure cuts the sink back to `offset`
/// before reporting the write error.
fn write_frame<S: FrameSink>(sink: &mut S, offset: u64, frame: &[u8]) -> io::Result<()> {
    let written = sink.write_all(frame).and_then(|()| sink.flush());
    if let Err(err) = written {
        sink.truncate(offset)?;
        return Err(err);
    }
    Ok(())
}

/// Length of the longest run of complete frames at the start of the file at
/// `path`. Anything after it is a torn frame and is truncated.
fn drop_torn_tail(path: &Path, file: &File) -> Result<u64> {
    let file_size = file.metadata()?.len();
    let mut reader = BufReader::new(File::open(path)?);
    let mut end = 0u64;
    while file_size - end >= FRAME_HEADER {
        let mut len_bytes = [0u8; 4];
        reader.read_exact(&mut len_bytes)?;
        let len = u64::from(u32::from_le_bytes(len_bytes));
        if file_size - end - FRAME_HEADER < len {
            break;
        }
        let skip = i64::try_from(len).map_err(|_| {
            RepositoryError::CorruptedData(format!("frame at offset {} is too long", end))
        })?;
        reader.seek_relative(skip)?;
        end += FRAME_HEADER + len;
    }

    if end < file_size {
        tracing::warn!(
            "Dropping {} bytes of torn frame from {}",
            file_size - end,
            path.display()
        );
        file.set_len(end)?;
    }
    Ok(end)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::repository::sample_log;

    #[test]
    fn test_create_and_append() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = FileBattleLogRepository::create(temp_dir.path(), "battles.log").unwrap();

        let first = repo.append(&sample_log(1)).unwrap();
        let second = repo.append(&sample_log(2)).unwrap();
        assert_eq!(first, 0);
        assert!(second > first);

        let (log, next) = repo.read_at_offset(first).unwrap().unwrap();
        assert_eq!(log, sample_log(1));
        assert_eq!(next, second);
        assert_eq!(repo.read_at_offset(repo.size().unwrap()).unwrap(), None);
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        drop(FileBattleLogRepository::create(temp_dir.path(), "battles.log").unwrap());

        let err = FileBattleLogRepository::create(temp_dir.path(), "battles.log")
            .err()
            .unwrap();
        assert!(matches!(err, RepositoryError::LogAlreadyExists(_)));
    }

    #[test]
    fn test_reopen_continues_at_end() {
        let temp_dir = TempDir::new().unwrap();
        let size = {
            let mut repo = FileBattleLogRepository::create(temp_dir.path(), "battles.log").unwrap();
            repo.append(&sample_log(1)).unwrap();
            repo.size().unwrap()
        };

        let mut repo = FileBattleLogRepository::open(temp_dir.path(), "battles.log").unwrap();
        assert_eq!(repo.size().unwrap(), size);
        assert_eq!(repo.append(&sample_log(3)).unwrap(), size);
        assert_eq!(repo.read_all().unwrap(), vec![sample_log(1), sample_log(3)]);
    }

    #[test]
    fn test_truncated_frame_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = FileBattleLogRepository::create(temp_dir.path(), "battles.log").unwrap();
        repo.append(&sample_log(1)).unwrap();
        let size = repo.size().unwrap();

        let file = OpenOptions::new().write(true).open(repo.path()).unwrap();
        file.set_len(size - 3).unwrap();

        let err = repo.read_at_offset(0).unwrap_err();
        assert!(matches!(err, RepositoryError::CorruptedData(_)));
    }

    #[test]
    fn test_reopen_drops_torn_trailing_frame() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("battles.log");
        let complete = encode_frame(&sample_log(1)).unwrap();
        let torn = encode_frame(&sample_log(2)).unwrap();
        let mut bytes = complete.clone();
        bytes.extend_from_slice(&torn[..torn.len() / 2]);
        std::fs::write(&path, &bytes).unwrap();

        let mut repo = FileBattleLogRepository::open(temp_dir.path(), "battles.log").unwrap();
        assert_eq!(repo.size().unwrap(), complete.len() as u64);
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            complete.len() as u64
        );

        assert_eq!(repo.append(&sample_log(3)).unwrap(), complete.len() as u64);
        assert_eq!(repo.read_all().unwrap(), vec![sample_log(1), sample_log(3)]);
    }

    #[test]
    fn test_reopen_drops_lone_partial_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("battles.log");
        std::fs::write(&path, [9u8, 0]).unwrap();

        let repo = FileBattleLogRepository::open_or_create(temp_dir.path(), "battles.log").unwrap();
        assert_eq!(repo.size().unwrap(), 0);
        assert!(repo.read_all().unwrap().is_empty());
    }

    /// Accepts `budget` bytes, then fails every write.
    struct ShortSink {
        bytes: Vec<u8>,
        budget: usize,
    }

    impl Write for ShortSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "disk full"));
            }
            let n = buf.len().min(self.budget);
            self.bytes.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl FrameSink for ShortSink {
        fn truncate(&mut self, len: u64) -> io::Result<()> {
            self.bytes.truncate(len as usize);
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_is_rolled_back() {
        let first = encode_frame(&sample_log(1)).unwrap();
        let second = encode_frame(&sample_log(2)).unwrap();
        let mut sink = ShortSink {
            bytes: Vec::new(),
            budget: first.len() + 6,
        };

        write_frame(&mut sink, 0, &first).unwrap();
        let err = write_frame(&mut sink, first.len() as u64, &second).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert_eq!(sink.bytes, first);
    }
}
