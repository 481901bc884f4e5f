use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use log::debug;
use serde::de::DeserializeOwned;
use std::{cell::RefCell, fs::File, io::Read, marker::PhantomData, path::Path};

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    core::product::COLUMN_COUNT,
    core::sku::Sku,
    error::BatchError,
};

const SKU_COLUMN: usize = 0;
const GRADE_COLUMN: usize = 1;
const BATCH_ID_COLUMN: usize = 3;

/// Canonical column keys, in file order, as produced by [`normalize_header`].
const COLUMN_KEYS: [&str; COLUMN_COUNT] = [
    "sku",
    "grade",
    "location",
    "batchid",
    "warehousetag",
    "upc",
    "manufacturer",
    "model",
    "notes",
    "timestamp",
    "manifestid",
    "palletid",
    "unitid",
    "piduid",
];

/// Lowercases a header cell and drops everything but letters and digits,
/// so `Batch ID`, `batch_id` and `batchId` all map to `batchid`.
pub fn normalize_header(cell: &str) -> String {
    cell.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Decides whether the first row of an inventory file is a header.
///
/// The row must have a cell reading `sku`, compared whole, trimmed and
/// case-insensitively. Since a note or tag could say that too, the row must
/// also either carry a `grade` cell or contain no valid SKU at all.
pub fn is_header_row(row: &StringRecord) -> bool {
    let has = |name: &str| row.iter().any(|cell| cell.trim().eq_ignore_ascii_case(name));
    has("sku") && (has("grade") || !row.iter().any(|cell| Sku::parse(cell).is_ok()))
}

/// Fills an empty grade or batch id cell of a canonical row from its SKU,
/// for exports that only kept the SKU column.
fn fill_from_sku(row: StringRecord) -> StringRecord {
    let blank = |index: usize| row.get(index).is_none_or(|cell| cell.is_empty());
    if !blank(GRADE_COLUMN) && !blank(BATCH_ID_COLUMN) {
        return row;
    }
    let Some(sku) = row.get(SKU_COLUMN).and_then(|cell| Sku::parse(cell).ok()) else {
        return row;
    };

    let grade = sku.grade.to_string();
    let batch_id = sku.batch_id.to_string();
    row.iter()
        .enumerate()
        .map(|(index, cell)| match index {
            GRADE_COLUMN if cell.is_empty() => grade.as_str(),
            BATCH_ID_COLUMN if cell.is_empty() => batch_id.as_str(),
            _ => cell,
        })
        .collect()
}

/// Where each canonical column lives in the source rows.
#[derive(Debug, Clone)]
enum ColumnMap {
    /// Headerless file: columns are in canonical order.
    Positional,
    /// Headered file: canonical column `i` is at `indices[i]`, if present.
    Named([Option<usize>; COLUMN_COUNT]),
}

impl ColumnMap {
    fn from_header(header: &StringRecord) -> Self {
        let mut indices = [None; COLUMN_COUNT];
        for (position, cell) in header.iter().enumerate() {
            let key = normalize_header(cell);
            if let Some(slot) = COLUMN_KEYS.iter().position(|k| *k == key) {
                // first occurrence wins
                if indices[slot].is_none() {
                    indices[slot] = Some(position);
                }
            }
        }
        ColumnMap::Named(indices)
    }

    /// Rebuilds `row` in canonical order, padding missing cells with "".
    fn canonical(&self, row: &StringRecord) -> StringRecord {
        let cell = |index: Option<usize>| index.and_then(|i| row.get(i)).unwrap_or("");
        match self {
            ColumnMap::Positional => (0..COLUMN_COUNT).map(|i| cell(Some(i))).collect(),
            ColumnMap::Named(indices) => indices.iter().map(|i| cell(*i)).collect(),
        }
    }
}

/// Reads inventory rows whether or not the file starts with a header.
///
/// The reader is flexible about row length: short rows (older exports
/// without the manifest columns) are padded and extra cells are ignored.
/// Blank rows are skipped. Each row is rebuilt in canonical column order
/// and then deserialized positionally with serde.
///
/// # Examples
///
/// ```
/// use sku_batch_rs::core::{grade::Grade, item::ItemReader, product::ProductRecord};
/// use sku_batch_rs::item::csv::csv_reader::CsvItemReaderBuilder;
///
/// let data = "\
/// LN-DEN001-B001-001,LN,DEN001,B001-001,,,Sony,WH-1000XM4,,2024-03-09 14:05:00
/// VG-DEN001-B001-002,VG,DEN001,B001-002,A12,,,,,2024-03-09 14:07:00
/// ";
///
/// let reader = CsvItemReaderBuilder::new().from_reader(data.as_bytes());
/// let records: Vec<ProductRecord> = reader.read_all().unwrap();
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].manufacturer.as_deref(), Some("Sony"));
/// assert_eq!(records[1].grade, Grade::VeryGood);
/// assert_eq!(records[1].warehouse_tag.as_deref(), Some("A12"));
/// ```
pub struct CsvItemReader<R, T> {
    records: RefCell<StringRecordsIntoIter<R>>,
    /// Unknown until the first non-blank row has been seen.
    columns: RefCell<Option<ColumnMap>>,
    _item: PhantomData<T>,
}

impl<R: Read, T> CsvItemReader<R, T> {
    fn next_row(&self) -> Result<Option<StringRecord>, BatchError> {
        let mut records = self.records.borrow_mut();
        loop {
            match records.next() {
                None => return Ok(None),
                Some(Err(error)) => return Err(BatchError::ItemReader(error.to_string())),
                Some(Ok(row)) if row.iter().all(|cell| cell.trim().is_empty()) => continue,
                Some(Ok(row)) => return Ok(Some(row)),
            }
        }
    }

    pub fn has_header(&self) -> Option<bool> {
        self.columns
            .borrow()
            .as_ref()
            .map(|columns| matches!(columns, ColumnMap::Named(_)))
    }
}

impl<R: Read, T: DeserializeOwned> ItemReader<T> for CsvItemReader<R, T> {
    fn read(&self) -> ItemReaderResult<T> {
        let Some(mut row) = self.next_row()? else {
            return Ok(None);
        };

        if self.columns.borrow().is_none() {
            let columns = if is_header_row(&row) {
                debug!("Inventory header detected: {:?}", row);
                ColumnMap::from_header(&row)
            } else {
                ColumnMap::Positional
            };
            let header = matches!(columns, ColumnMap::Named(_));
            *self.columns.borrow_mut() = Some(columns);

            if header {
                match self.next_row()? {
                    Some(next) => row = next,
                    None => return Ok(None),
                }
            }
        }

        let canonical = match self.columns.borrow().as_ref() {
            Some(columns) => fill_from_sku(columns.canonical(&row)),
            None => ColumnMap::Positional.canonical(&row),
        };

        let position = row.position().map(|p| p.line()).unwrap_or_default();
        canonical
            .deserialize(None)
            .map(Some)
            .map_err(|error| BatchError::ItemReader(format!("line {}: {}", position, error)))
    }
}

/// A builder for [`CsvItemReader`].
///
/// Readers split on commas, accept `\r\n` and `\n` line endings and trim
/// every field.
#[derive(Default)]
pub struct CsvItemReaderBuilder;

impl CsvItemReaderBuilder {
    pub fn new() -> Self {
        Self
    }

    fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .trim(Trim::All)
            // header sniffing is done by the item reader itself
            .has_headers(false)
            .flexible(true);
        builder
    }

    pub fn from_reader<R: Read, T>(self, rdr: R) -> CsvItemReader<R, T> {
        let records = self.reader_builder().from_reader(rdr).into_records();

        CsvItemReader {
            records: RefCell::new(records),
            columns: RefCell::new(None),
            _item: PhantomData,
        }
    }

    /// Creates a reader over the file at `path`.
    ///
    /// Unlike [`from_reader`](Self::from_reader), opening can fail and the
    /// error is returned rather than deferred to the first read.
    pub fn from_path<P: AsRef<Path>, T>(self, path: P) -> Result<CsvItemReader<File, T>, BatchError> {
        let file = File::open(path.as_ref())?;
        Ok(self.from_reader(file))
    }

    /// Returns the header row of `rdr`, if its first non-blank row is one.
    pub fn sniff_header<R: Read>(self, rdr: R) -> Result<Option<StringRecord>, BatchError> {
        let reader: CsvItemReader<R, ()> = self.from_reader(rdr);
        match reader.next_row()? {
            Some(row) if is_header_row(&row) => Ok(Some(row)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use crate::core::{grade::Grade, product::ProductRecord, sku::BatchId};

    use super::*;

    const HEADERLESS: &str = "\
LN-DEN001-B001-001,LN,DEN001,B001-001,,012345678905,Sony,WH-1000XM4,box dented,2024-03-09T14:05:00Z
G-DEN001-B001-002,G,DEN001,B001-002,,,,,,2024-03-09T14:06:00Z";

    fn read(data: &str) -> Result<Vec<ProductRecord>, BatchError> {
        CsvItemReaderBuilder::new()
            .from_reader(data.as_bytes())
            .read_all()
    }

    #[test]
    fn headerless_rows_are_read_by_position() -> Result<(), Box<dyn Error>> {
        let records = read(HEADERLESS)?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sku, "LN-DEN001-B001-001");
        assert_eq!(records[0].batch_id, Some(BatchId::new(1, 1)));
        assert_eq!(records[0].upc.as_deref(), Some("012345678905"));
        assert_eq!(records[0].notes.as_deref(), Some("box dented"));
        assert_eq!(records[0].warehouse_tag, None);
        assert_eq!(records[0].manifest_id, None);
        assert_eq!(records[1].grade, Grade::Good);
        Ok(())
    }

    #[test]
    fn headered_rows_are_read_by_name() -> Result<(), Box<dyn Error>> {
        let data = "\
timestamp,grade,sku,batch_id,notes
2024-03-09 14:05:00,ac,AC-DEN001-B002-001,B002-001,no charger";

        let reader = CsvItemReaderBuilder::new().from_reader(data.as_bytes());
        let records: Vec<ProductRecord> = reader.read_all()?;

        assert_eq!(reader.has_header(), Some(true));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sku, "AC-DEN001-B002-001");
        assert_eq!(records[0].grade, Grade::Acceptable);
        assert_eq!(records[0].batch_number(), Some(2));
        assert_eq!(records[0].notes.as_deref(), Some("no charger"));
        assert_eq!(records[0].location, None);
        Ok(())
    }

    #[test]
    fn a_note_saying_sku_is_not_a_header() -> Result<(), Box<dyn Error>> {
        let data = "LN-DEN001-B001-001,LN,DEN001,B001-001,,,,,sku,2024-03-09T14:05:00Z";

        let reader = CsvItemReaderBuilder::new().from_reader(data.as_bytes());
        let records: Vec<ProductRecord> = reader.read_all()?;

        assert_eq!(reader.has_header(), Some(false));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].notes.as_deref(), Some("sku"));
        Ok(())
    }

    #[test]
    fn blank_rows_are_skipped() -> Result<(), Box<dyn Error>> {
        let data = format!("\n{}\n,,,\n", HEADERLESS);
        assert_eq!(read(&data)?.len(), 2);
        Ok(())
    }

    #[test]
    fn header_only_file_has_no_records() -> Result<(), Box<dyn Error>> {
        assert!(read("SKU,Grade,Location")?.is_empty());
        assert!(read("")?.is_empty());
        Ok(())
    }

    #[test]
    fn bad_grade_is_reported_with_its_line() {
        let data = "LN-DEN001-B001-001,XX,DEN001,B001-001,,,,,,2024-03-09T14:05:00Z";
        match read(data) {
            Err(BatchError::ItemReader(message)) => assert!(message.starts_with("line 1")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn sku_only_header_recovers_grade_and_batch_from_the_sku() -> Result<(), Box<dyn Error>> {
        let data = "\
SKU,Notes
LN-DEN001-B001-001,boxed
VG-DEN001-B002-003-A12,";

        let reader = CsvItemReaderBuilder::new().from_reader(data.as_bytes());
        let records: Vec<ProductRecord> = reader.read_all()?;

        assert_eq!(reader.has_header(), Some(true));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].grade, Grade::LikeNew);
        assert_eq!(records[0].batch_id, Some(BatchId::new(1, 1)));
        assert_eq!(records[0].notes.as_deref(), Some("boxed"));
        assert_eq!(records[1].grade, Grade::VeryGood);
        assert_eq!(records[1].batch_number(), Some(2));
        assert_eq!(records[1].location, None);
        Ok(())
    }

    #[test]
    fn explicit_cells_win_over_the_sku() -> Result<(), Box<dyn Error>> {
        let data = "\
sku,grade,batch id
LN-DEN001-B001-001,G,B001-007";

        let records = read(data)?;

        assert_eq!(records[0].grade, Grade::Good);
        assert_eq!(records[0].batch_id, Some(BatchId::new(1, 7)));
        Ok(())
    }

    #[test]
    fn header_is_sniffed_without_reading_records() -> Result<(), Box<dyn Error>> {
        let header = CsvItemReaderBuilder::new()
            .sniff_header("\n timestamp , grade,sku\n2024-03-09 14:05:00,ln,X".as_bytes())?;
        let cells: Vec<&str> = header.as_ref().map(|h| h.iter().collect()).unwrap_or_default();
        assert_eq!(cells, vec!["timestamp", "grade", "sku"]);

        assert_eq!(CsvItemReaderBuilder::new().sniff_header(HEADERLESS.as_bytes())?, None);
        assert_eq!(CsvItemReaderBuilder::new().sniff_header("".as_bytes())?, None);
        Ok(())
    }

    #[test]
    fn header_names_are_normalized() {
        assert_eq!(normalize_header(" Batch ID "), "batchid");
        assert_eq!(normalize_header("warehouse_tag"), "warehousetag");
        assert_eq!(normalize_header("PID-UID"), "piduid");
    }
}
