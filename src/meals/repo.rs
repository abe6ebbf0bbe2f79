use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use time::macros::format_description;
use time::Date;
use tracing::{debug, info, warn};

use super::repo_types::{MealEntry, MealLog, MealType};
use crate::catalog::FoodId;
use crate::error::{LoadError, PersistError};

pub const COLUMNS: [&str; 6] = ["ID", "Date", "Meal", "Rating", "Trust", "Meallist"];

/// Where the meal history lives. `append` is all-or-nothing per entry.
pub trait MealStore: Send + Sync {
    fn load(&self) -> Result<MealLog, LoadError>;
    fn append(&self, entry: &MealEntry) -> Result<(), PersistError>;
}

/// Meal log kept as a csv file, one row per referenced food id. The first
/// row of an entry carries the whole meal list as a JSON array; its
/// continuation rows leave `Meallist` empty.
#[derive(Debug, Clone)]
pub struct CsvMealStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl CsvMealStore {
    /// Open the store at `path`, writing a header-only file if none exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        let mut lock: OsString = path.as_os_str().to_owned();
        lock.push(".lock");

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                let mut wtr = csv::Writer::from_writer(file);
                wtr.write_record(COLUMNS)?;
                wtr.flush()?;
                info!(path = %path.display(), "created empty meal log");
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }

        // single writer: a lock present before we start was left by a dead process
        let lock_path = PathBuf::from(lock);
        match fs::remove_file(&lock_path) {
            Ok(()) => warn!(lock = %lock_path.display(), "removed stale meal log lock"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(Self { path, lock_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_header(&self) -> Result<StringRecord, LoadError> {
        let file = File::open(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));
        Ok(rdr.headers()?.clone())
    }
}

impl MealStore for CsvMealStore {
    fn load(&self) -> Result<MealLog, LoadError> {
        let file = File::open(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(BufReader::new(file));
        let layout = Layout::from_header(rdr.headers()?)?;

        let mut entries: Vec<MealEntry> = Vec::new();
        for record in rdr.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let row = record.position().map(|p| p.line() as usize).unwrap_or_default();
            let cell = |col: usize| record.get(layout.index[col]).unwrap_or("");
            let invalid = |col: usize| LoadError::InvalidValue {
                row,
                column: COLUMNS[col].to_string(),
                value: cell(col).to_string(),
            };

            let id = FoodId(cell(0).parse::<i64>().map_err(|_| invalid(0))?);
            if cell(5).is_empty() {
                match entries.last_mut() {
                    Some(entry) => entry.ids.push(id),
                    None => return Err(invalid(5)),
                }
                continue;
            }

            let date = Date::parse(cell(1), format_description!("[day].[month].[year]"))
                .map_err(|_| invalid(1))?;
            let meal = cell(2).parse::<MealType>().map_err(|_| invalid(2))?;
            let rating = parse_rating(cell(3)).ok_or_else(|| invalid(3))?;
            let trusted = parse_flag(cell(4)).ok_or_else(|| invalid(4))?;
            let meal_list: Vec<String> =
                serde_json::from_str(cell(5)).map_err(|_| invalid(5))?;

            entries.push(MealEntry {
                ids: vec![id],
                date,
                meal,
                rating,
                trusted,
                meal_list,
            });
        }

        debug!(path = %self.path.display(), entries = entries.len(), "meal log loaded");
        Ok(MealLog::new(entries))
    }

    fn append(&self, entry: &MealEntry) -> Result<(), PersistError> {
        if entry.ids.is_empty() {
            return Err(PersistError::EmptyEntry);
        }
        let _lock = StoreLock::acquire(&self.lock_path, &self.path)?;

        let header = self
            .read_header()
            .map_err(|e| PersistError::Header(e.to_string()))?;
        let layout = Layout::from_header(&header).map_err(|e| PersistError::Header(e.to_string()))?;

        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        let original_len = file.metadata()?.len();

        let mut buf = Vec::new();
        if !ends_with_newline(&mut file, original_len)? {
            buf.push(b'\n');
        }
        {
            let mut wtr = csv::Writer::from_writer(&mut buf);
            for record in layout.rows_for(entry)? {
                wtr.write_record(&record)?;
            }
            wtr.flush()?;
        }

        if let Err(e) = commit(&mut file, &buf, original_len) {
            warn!(error = %e, path = %self.path.display(), "meal append failed; truncated back");
            return Err(e);
        }

        info!(
            path = %self.path.display(),
            rows = entry.ids.len(),
            meal = %entry.meal,
            rating = entry.rating,
            "meal appended"
        );
        Ok(())
    }
}

/// Column positions of the six log fields within a store's header.
struct Layout {
    index: [usize; 6],
    width: usize,
}

impl Layout {
    fn from_header(header: &StringRecord) -> Result<Self, LoadError> {
        let mut index = [0; 6];
        for (slot, name) in index.iter_mut().zip(COLUMNS) {
            *slot = header
                .iter()
                .position(|c| c.eq_ignore_ascii_case(name))
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))?;
        }
        Ok(Self {
            index,
            width: header.len(),
        })
    }

    fn rows_for(&self, entry: &MealEntry) -> Result<Vec<Vec<String>>, PersistError> {
        let date = entry.date.format(format_description!("[day].[month].[year]"))?;
        let trust = if entry.trusted { "True" } else { "False" };
        let meal_list = serde_json::to_string(&entry.meal_list)
            .map_err(|e| PersistError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let rows = entry
            .ids
            .iter()
            .enumerate()
            .map(|(n, id)| {
                let mut row = vec![String::new(); self.width];
                row[self.index[0]] = id.to_string();
                row[self.index[1]] = date.clone();
                row[self.index[2]] = entry.meal.to_string();
                row[self.index[3]] = entry.rating.to_string();
                row[self.index[4]] = trust.to_string();
                if n == 0 {
                    row[self.index[5]] = meal_list.clone();
                }
                row
            })
            .collect();
        Ok(rows)
    }
}

fn parse_rating(raw: &str) -> Option<u8> {
    let value = raw.parse::<f64>().ok()?;
    if value.fract() != 0.0 || !(1.0..=5.0).contains(&value) {
        return None;
    }
    Some(value as u8)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

/// File the new rows land in. Split out so a failing sink can stand in.
trait AppendTarget: Write {
    fn sync(&mut self) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl AppendTarget for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Write `buf` in one go; on any failure cut the target back to `original_len`.
fn commit<T: AppendTarget>(
    target: &mut T,
    buf: &[u8],
    original_len: u64,
) -> Result<(), PersistError> {
    if let Err(e) = target.write_all(buf).and_then(|_| target.sync()) {
        target.truncate(original_len)?;
        return Err(e.into());
    }
    Ok(())
}

fn ends_with_newline(file: &mut File, len: u64) -> io::Result<bool> {
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Exclusive marker file held for the duration of one append.
struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    fn acquire(lock_path: &Path, store: &Path) -> Result<Self, PersistError> {
        match OpenOptions::new().write(true).create_new(true).open(lock_path) {
            Ok(_) => Ok(Self {
                path: lock_path.to_path_buf(),
            }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(PersistError::Locked(store.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(error = %e, path = %self.path.display(), "could not release meal log lock");
        }
    }
}
