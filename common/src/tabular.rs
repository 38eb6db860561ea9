//! ポリフェノールCSVの取込
//!
//! ヘッダーは大文字小文字を区別しない:
//! - `region` / `grade` / `sample` は完全一致（任意列）
//! - `absorbance` / `concentration` を含む列（必須）

use crate::batch::PolyphenolRow;
use crate::error::{Error, Result};
use csv::{ReaderBuilder, StringRecord, Trim};

const MSG_NO_DATA: &str = "CSV must contain at least one data row!";
const MSG_MISSING_HEADERS: &str = "CSV must have headers: Absorbance, Concentration";
const MSG_NO_NUMERIC: &str = "No valid numeric rows found in CSV!";

struct Columns {
    region: Option<usize>,
    grade: Option<usize>,
    sample: Option<usize>,
    absorbance: usize,
    concentration: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let exact = |name: &str| lower.iter().position(|h| h == name);
        let containing = |name: &str| lower.iter().position(|h| h.contains(name));

        match (containing("absorbance"), containing("concentration")) {
            (Some(absorbance), Some(concentration)) => Ok(Self {
                region: exact("region"),
                grade: exact("grade"),
                sample: exact("sample"),
                absorbance,
                concentration,
            }),
            _ => Err(Error::Validation(MSG_MISSING_HEADERS.into())),
        }
    }

    fn parse(&self, record: &StringRecord) -> Option<PolyphenolRow> {
        // 数値列まで届かない短い行は捨てる
        if record.len() <= self.absorbance.max(self.concentration) {
            return None;
        }
        let absorbance: f64 = record.get(self.absorbance)?.parse().ok()?;
        let concentration: f64 = record.get(self.concentration)?.parse().ok()?;
        if !absorbance.is_finite() || !concentration.is_finite() {
            return None;
        }
        let text = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::to_string)
                .filter(|s| !s.is_empty())
        };
        Some(PolyphenolRow {
            region: text(self.region),
            grade: text(self.grade),
            sample: text(self.sample),
            absorbance,
            concentration,
        })
    }
}

/// CSVテキストを行に変換
pub fn parse_polyphenol_csv(text: &str) -> Result<Vec<PolyphenolRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.trim().as_bytes());

    let headers = reader.headers()?.clone();
    let records: Vec<StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    if headers.is_empty() || records.is_empty() {
        return Err(Error::Validation(MSG_NO_DATA.into()));
    }

    let columns = Columns::from_headers(&headers)?;
    let rows: Vec<PolyphenolRow> = records.iter().filter_map(|r| columns.parse(r)).collect();
    if rows.is_empty() {
        return Err(Error::Validation(MSG_NO_NUMERIC.into()));
    }
    Ok(rows)
}
