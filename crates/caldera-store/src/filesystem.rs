//! Calendars stored as `<folder>/<principal>/<calendar>.ics` files.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use caldera_core::config::Settings;
use caldera_core::constants::{ICS_EXTENSION, ICS_SUFFIX};
use caldera_core::error::{CoreError, CoreResult};
use caldera_core::etag::generate_etag;
use caldera_core::store::{CalendarEdit, CalendarHandle, CalendarStore};
use caldera_core::types::{CalendarRef, ConditionalTag, Principal};
use encoding_rs::Encoding;

use crate::error::{StoreError, StoreResult};

const TEMP_SUFFIX: &str = ".tmp";

/// Filesystem calendar store.
///
/// The set of calendars is discovered once, when the store is opened. Every
/// calendar owns a lock serializing its read-modify-write cycles.
#[derive(Debug)]
pub struct FilesystemStore {
    folder: PathBuf,
    encoding: &'static Encoding,
    calendars: HashMap<CalendarRef, Arc<Mutex<()>>>,
}

impl FilesystemStore {
    /// ## Summary
    /// Opens the store rooted at `folder`, creating the folder if needed, and
    /// scans it for calendar files.
    ///
    /// ## Errors
    /// Returns an error if `stock_encoding` is not a known charset label, is
    /// a decode-only charset (UTF-16, `replacement`), or the folder cannot be
    /// created or listed.
    #[tracing::instrument(skip(folder), fields(folder = %folder.as_ref().display()))]
    pub fn load(folder: impl AsRef<Path>, stock_encoding: &str) -> StoreResult<Self> {
        let folder = folder.as_ref().to_path_buf();
        let encoding = Encoding::for_label(stock_encoding.trim().as_bytes())
            .ok_or_else(|| StoreError::UnknownEncoding(stock_encoding.to_owned()))?;
        if encoding.output_encoding() != encoding {
            return Err(StoreError::UnsupportedEncoding(stock_encoding.to_owned()));
        }

        std::fs::create_dir_all(&folder).map_err(|e| StoreError::io(&folder, e))?;

        let calendars = scan(&folder)?
            .into_iter()
            .map(|calendar| (calendar, Arc::new(Mutex::new(()))))
            .collect::<HashMap<_, _>>();

        tracing::info!(
            calendars = calendars.len(),
            encoding = encoding.name(),
            "Filesystem store opened"
        );

        Ok(Self {
            folder,
            encoding,
            calendars,
        })
    }

    /// ## Summary
    /// Opens the store configured by `storage.folder` and `encoding.stock`.
    ///
    /// ## Errors
    /// See [`FilesystemStore::load`].
    pub fn from_settings(settings: &Settings) -> StoreResult<Self> {
        Self::load(&settings.storage.folder, &settings.encoding.stock)
    }

    fn path_of(&self, calendar: &CalendarRef) -> PathBuf {
        self.folder
            .join(calendar.principal().as_str())
            .join(format!("{}{ICS_SUFFIX}", calendar.name()))
    }
}

impl CalendarStore for FilesystemStore {
    fn calendar_keys(&self) -> CoreResult<BTreeSet<String>> {
        Ok(self.calendars.keys().map(CalendarRef::key).collect())
    }

    fn open(&self, calendar: &CalendarRef) -> CoreResult<Box<dyn CalendarHandle>> {
        let lock = self
            .calendars
            .get(calendar)
            .ok_or_else(|| StoreError::UnknownCalendar(calendar.key()))?;

        Ok(Box::new(FileCalendar {
            calendar: calendar.clone(),
            path: self.path_of(calendar),
            encoding: self.encoding,
            lock: Arc::clone(lock),
        }))
    }
}

/// Lists `<principal>/<name>.ics` files below `folder`.
fn scan(folder: &Path) -> StoreResult<Vec<CalendarRef>> {
    let mut calendars = Vec::new();

    let owners = std::fs::read_dir(folder).map_err(|e| StoreError::io(folder, e))?;
    for owner in owners.filter_map(Result::ok) {
        let owner_path = owner.path();
        if !owner_path.is_dir() {
            continue;
        }
        let Some(principal) = owner_path.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!(path = %owner_path.display(), "Skipping non UTF-8 owner folder");
            continue;
        };

        let entries = std::fs::read_dir(&owner_path).map_err(|e| StoreError::io(&owner_path, e))?;
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != ICS_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                calendars.push(CalendarRef::new(Principal::new(principal), name));
            }
        }
    }

    calendars.sort();
    Ok(calendars)
}

/// Handle on one calendar file.
struct FileCalendar {
    calendar: CalendarRef,
    path: PathBuf,
    encoding: &'static Encoding,
    lock: Arc<Mutex<()>>,
}

impl FileCalendar {
    /// Reads the calendar text; a missing file is an empty calendar.
    fn read(&self) -> StoreResult<String> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(String::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let (text, had_errors) = self.encoding.decode_without_bom_handling(&bytes);
        if had_errors {
            tracing::warn!(
                calendar = %self.calendar,
                encoding = self.encoding.name(),
                "Calendar file holds undecodable bytes, replaced"
            );
        }
        Ok(text.into_owned())
    }

    /// Replaces the calendar file through a temporary sibling file.
    fn write(&self, text: &str) -> StoreResult<()> {
        let (bytes, _, had_unmappable) = self.encoding.encode(text);
        if had_unmappable {
            tracing::warn!(
                calendar = %self.calendar,
                encoding = self.encoding.name(),
                "Characters not representable in stock encoding were escaped"
            );
        }

        let mut temp = self.path.clone().into_os_string();
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);

        std::fs::write(&temp, &bytes).map_err(|e| StoreError::io(&temp, e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }
}

impl CalendarHandle for FileCalendar {
    fn calendar(&self) -> &CalendarRef {
        &self.calendar
    }

    fn text(&self) -> CoreResult<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read()?)
    }

    fn etag(&self) -> CoreResult<String> {
        Ok(generate_etag(self.text()?.as_bytes()))
    }

    #[tracing::instrument(skip(self, edit), fields(calendar = %self.calendar))]
    fn update(&self, tag: Option<&ConditionalTag>, edit: &mut CalendarEdit<'_>) -> CoreResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.read()?;
        if let Some(tag) = tag {
            let etag = generate_etag(current.as_bytes());
            if !tag.matches(&etag) {
                tracing::debug!(expected = %tag, current = %etag, "Entity tag mismatch");
                return Err(CoreError::PreconditionFailed {
                    expected: tag.to_string(),
                    current: etag,
                });
            }
        }

        let updated = edit(&current)?;
        self.write(&updated)?;
        tracing::debug!(len = updated.len(), "Calendar written");
        Ok(())
    }
}
