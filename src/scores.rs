//! High-Score Persistence
//!
//! The simulation reports a finished game as `(amount, level)` through
//! [`ScoreRecorder`]. Records are stored one per line, highest first:
//!
//! ```text
//! 2026-10-16T21:04:55 BRH 7 4310
//! 2026-10-12T18:30:02 ___ 3 1290
//! ```
//!
//! Nothing in here is called from inside a tick.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Records kept in a table.
pub const MAX_SCORES: usize = 10;

/// Longest initials stored.
pub const MAX_INITIALS: usize = 3;

/// Initials used when none are given.
pub const ANONYMOUS_INITIALS: &str = "???";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
// Older files separate date and time with a dot
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d.%H:%M:%S";

/// Score store errors.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Reading or writing the score file failed.
    #[error("score file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A line of the score file could not be parsed.
    #[error("malformed score record on line {line}: {reason}")]
    Malformed {
        /// 1-based line number
        line: usize,
        /// What was wrong with it
        reason: String,
    },
}

/// Receives finished games.
pub trait ScoreRecorder {
    /// Store a final score and return its 1-based rank. A rank past
    /// [`MAX_SCORES`] means the score did not make the table.
    fn record(&mut self, amount: u32, level: u32) -> Result<usize, ScoreError>;
}

/// Keep printable ASCII, turn spaces into `_`, cap at [`MAX_INITIALS`].
pub fn sanitize_initials(who: &str) -> String {
    let initials: String = who
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            '!'..='~' => Some(c),
            _ => None,
        })
        .take(MAX_INITIALS)
        .collect();

    if initials.is_empty() {
        ANONYMOUS_INITIALS.to_string()
    } else {
        initials
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// One finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Local time the game ended
    pub timestamp: NaiveDateTime,
    /// Player initials, already sanitized
    pub initials: String,
    /// Level reached
    pub level: u32,
    /// Final score
    pub amount: u32,
}

impl ScoreRecord {
    /// Record with an explicit timestamp.
    pub fn new(amount: u32, level: u32, who: &str, timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            initials: sanitize_initials(who),
            level,
            amount,
        }
    }

    /// Record stamped with the current local time.
    pub fn now(amount: u32, level: u32, who: &str) -> Self {
        Self::new(amount, level, who, Local::now().naive_local())
    }

    /// Parse one line of a score file. `line_number` is only used in errors.
    pub fn parse_line(text: &str, line_number: usize) -> Result<Self, ScoreError> {
        let malformed = |reason: String| ScoreError::Malformed {
            line: line_number,
            reason,
        };

        let fields: Vec<&str> = text.split_whitespace().collect();
        let &[timestamp, initials, level, amount] = fields.as_slice() else {
            return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
        };

        let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(timestamp, LEGACY_TIMESTAMP_FORMAT))
            .map_err(|e| malformed(format!("bad timestamp {timestamp:?}: {e}")))?;
        let level = level
            .parse::<u32>()
            .map_err(|e| malformed(format!("bad level {level:?}: {e}")))?;
        let amount = amount
            .parse::<u32>()
            .map_err(|e| malformed(format!("bad amount {amount:?}: {e}")))?;

        Ok(Self::new(amount, level, initials, timestamp))
    }
}

impl fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.initials,
            self.level,
            self.amount
        )
    }
}

// =============================================================================
// TABLE
// =============================================================================

/// Best scores, highest first, at most [`MAX_SCORES`].
///
/// A new score ranks below existing scores of the same amount.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreTable {
    records: Vec<ScoreRecord>,
}

impl HighScoreTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records, highest first.
    #[inline]
    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// No records yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Top record.
    pub fn best(&self) -> Option<&ScoreRecord> {
        self.records.first()
    }

    /// 1-based rank `amount` would get if inserted now.
    pub fn potential_rank(&self, amount: u32) -> usize {
        self.records.partition_point(|r| r.amount >= amount) + 1
    }

    /// Whether `amount` would make the table. Zero never does.
    pub fn qualifies(&self, amount: u32) -> bool {
        amount > 0 && self.potential_rank(amount) <= MAX_SCORES
    }

    /// Insert a record and return its rank, or `None` if it did not qualify.
    pub fn insert(&mut self, record: ScoreRecord) -> Option<usize> {
        if !self.qualifies(record.amount) {
            return None;
        }
        let rank = self.potential_rank(record.amount);
        self.records.insert(rank - 1, record);
        self.records.truncate(MAX_SCORES);
        Some(rank)
    }

    /// Parse a score file. Blank lines are skipped; order is restored
    /// highest-first whatever the file says.
    pub fn parse(text: &str) -> Result<Self, ScoreError> {
        let mut records = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| ScoreRecord::parse_line(line, i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        // Stable: equal amounts keep file order
        records.sort_by(|a, b| b.amount.cmp(&a.amount));
        records.truncate(MAX_SCORES);
        Ok(Self { records })
    }

    /// Serialize in file format, one record per line.
    pub fn to_text(&self) -> String {
        self.records.iter().map(|r| format!("{r}\n")).collect()
    }
}

// =============================================================================
// STORES
// =============================================================================

/// Score table backed by a text file.
#[derive(Debug)]
pub struct FileScoreStore {
    path: PathBuf,
    initials: String,
    table: HighScoreTable,
}

impl FileScoreStore {
    /// Store for `path`, recording under `initials`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>, initials: &str) -> Self {
        Self {
            path: path.into(),
            initials: sanitize_initials(initials),
            table: HighScoreTable::new(),
        }
    }

    /// Store for `path` with the table already loaded.
    pub fn open(path: impl Into<PathBuf>, initials: &str) -> Result<Self, ScoreError> {
        let mut store = Self::new(path, initials);
        store.load()?;
        Ok(store)
    }

    /// Read the file into the table and return the record count.
    ///
    /// A missing file is an empty table. On any other failure the table is
    /// left empty and the error returned.
    pub fn load(&mut self) -> Result<usize, ScoreError> {
        self.table = HighScoreTable::new();
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no score file yet");
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };
        self.table = HighScoreTable::parse(&text)?;
        Ok(self.table.len())
    }

    fn write_table(&self, table: &HighScoreTable) -> Result<(), ScoreError> {
        fs::write(&self.path, table.to_text())?;
        Ok(())
    }

    /// Loaded table.
    #[inline]
    pub fn table(&self) -> &HighScoreTable {
        &self.table
    }

    /// Backing file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreRecorder for FileScoreStore {
    fn record(&mut self, amount: u32, level: u32) -> Result<usize, ScoreError> {
        let rank = self.table.potential_rank(amount);
        let record = ScoreRecord::now(amount, level, &self.initials);
        let mut updated = self.table.clone();
        if updated.insert(record).is_some() {
            // The table only changes once the file does
            self.write_table(&updated)?;
            self.table = updated;
            info!(path = %self.path.display(), rank, amount, "high score saved");
        }
        Ok(rank)
    }
}

/// Score table kept in memory only.
#[derive(Clone, Debug, Default)]
pub struct MemoryScoreStore {
    initials: String,
    table: HighScoreTable,
}

impl MemoryScoreStore {
    /// Empty store with anonymous initials.
    pub fn new() -> Self {
        Self::with_initials(ANONYMOUS_INITIALS)
    }

    /// Empty store recording under `initials`.
    pub fn with_initials(initials: &str) -> Self {
        Self {
            initials: sanitize_initials(initials),
            table: HighScoreTable::new(),
        }
    }

    /// Recorded table.
    #[inline]
    pub fn table(&self) -> &HighScoreTable {
        &self.table
    }
}

impl ScoreRecorder for MemoryScoreStore {
    fn record(&mut self, amount: u32, level: u32) -> Result<usize, ScoreError> {
        let rank = self.table.potential_rank(amount);
        self.table.insert(ScoreRecord::now(amount, level, &self.initials));
        Ok(rank)
    }
}

// =============================================================================
// TESTS
// =============================================================================
