//! Range references as they appear in validation rules and job settings
//!
//! A reference may be written as a formula (`=Backend!$AC$2:$AC`), may name a
//! sheet (quoted or not), and may leave its end row open (`AC2:AC`). Parsing
//! normalises all of these into a [`RangeReference`].

use crate::cell::{column_to_index, index_to_column, CellAddress};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Row used to close an open-ended range such as `AC2:AC`.
///
/// The true column length is unknown until the sheet is read, so a generous
/// fixed ceiling is used and the extra rows come back blank.
pub const DEFAULT_ROW_CEILING: u32 = 1000;

/// One side of a range: a column with an optional row.
///
/// `AC2` has a row, `AC` (as in `AC2:AC` or `A:A`) does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeBound {
    /// Column index (1-based)
    pub col: u32,
    /// Row number (1-based), absent for column-only bounds
    pub row: Option<u32>,
}

impl RangeBound {
    /// A bound pinned to a cell
    pub fn cell(addr: CellAddress) -> Self {
        Self {
            col: addr.col,
            row: Some(addr.row),
        }
    }

    /// A column-only bound
    pub fn column(col: u32) -> Self {
        Self { col, row: None }
    }

    /// Parse `AC`, `AC2` or `$AC$2`
    pub fn parse(s: &str) -> Result<Self> {
        let cleaned: String = s.trim().chars().filter(|c| *c != '$').collect();
        let split = cleaned
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(cleaned.len());
        let (letters, digits) = cleaned.split_at(split);

        if letters.is_empty() {
            return Err(Error::InvalidRange(format!("no column letters in '{}'", s)));
        }
        let col = column_to_index(letters)?;

        if digits.is_empty() {
            return Ok(Self::column(col));
        }

        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidRange(format!("invalid row number in '{}'", s)))?;
        if row == 0 {
            return Err(Error::InvalidRange(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self {
            col,
            row: Some(row),
        })
    }

    /// Whether the bound carries a row number
    pub fn has_row(&self) -> bool {
        self.row.is_some()
    }

    /// The bound as a cell address, when it has a row
    pub fn address(&self) -> Option<CellAddress> {
        self.row.map(|row| CellAddress { row, col: self.col })
    }

    /// Format as `AC2` or `AC`
    pub fn to_a1_string(&self) -> String {
        let letters = index_to_column(self.col).unwrap_or_default();
        match self.row {
            Some(row) => format!("{letters}{row}"),
            None => letters,
        }
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

/// A parsed range reference, optionally qualified with a sheet name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeReference {
    /// Sheet the range lives on. `None` means "the caller's default worksheet".
    pub sheet: Option<String>,
    /// Top-left bound
    pub start: RangeBound,
    /// Bottom-right bound, `None` for a single cell
    pub end: Option<RangeBound>,
}

impl RangeReference {
    /// Parse a reference, closing an open end row at [`DEFAULT_ROW_CEILING`].
    ///
    /// # Examples
    /// ```
    /// use sheet_sweep_core::RangeReference;
    ///
    /// let r = RangeReference::parse("=Backend!$AC$2:$AC").unwrap();
    /// assert_eq!(r.sheet.as_deref(), Some("Backend"));
    /// assert_eq!(r.body(), "AC2:AC1000");
    ///
    /// let r = RangeReference::parse("B9:B17").unwrap();
    /// assert_eq!(r.sheet_or("Sheet1"), "Sheet1");
    /// assert_eq!(r.body(), "B9:B17");
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        Self::parse_with_ceiling(raw, DEFAULT_ROW_CEILING)
    }

    /// Parse a reference, closing an open end row at `ceiling`.
    ///
    /// Only a range whose start has a row and whose end does not (`AC2:AC`) is
    /// closed. Whole-column ranges (`A:A`) are left as written.
    pub fn parse_with_ceiling(raw: &str, ceiling: u32) -> Result<Self> {
        let mut reference = Self::parse_literal(raw)?;
        if reference.start.has_row() {
            if let Some(end) = reference.end.as_mut() {
                if !end.has_row() {
                    end.row = Some(ceiling.max(reference.start.row.unwrap_or(1)));
                }
            }
        }
        Ok(reference)
    }

    /// Parse a reference exactly as written (no ceiling substitution).
    pub fn parse_literal(raw: &str) -> Result<Self> {
        let mut s = raw.trim();
        if let Some(stripped) = s.strip_prefix('=') {
            s = stripped.trim();
        }
        if s.is_empty() {
            return Err(Error::InvalidRange("empty range reference".into()));
        }

        let (sheet, body) = match s.rfind('!') {
            Some(pos) => {
                let name = unquote_sheet_name(&s[..pos]);
                if name.is_empty() {
                    return Err(Error::InvalidRange(format!("empty sheet name in '{}'", raw)));
                }
                (Some(name), &s[pos + 1..])
            }
            None => (None, s),
        };

        let body: String = body.chars().filter(|c| *c != '$').collect();
        let (start, end) = match body.split_once(':') {
            Some((start, end)) => (RangeBound::parse(start)?, Some(RangeBound::parse(end)?)),
            None => (RangeBound::parse(&body)?, None),
        };

        if end.is_none() && !start.has_row() {
            return Err(Error::InvalidRange(format!(
                "single-cell reference without a row in '{}'",
                raw
            )));
        }

        Ok(Self { sheet, start, end })
    }

    /// A reference to the rectangle spanned by two cells on the default sheet
    pub fn from_cells(start: CellAddress, end: CellAddress) -> Self {
        Self {
            sheet: None,
            start: RangeBound::cell(start),
            end: Some(RangeBound::cell(end)),
        }
    }

    /// The explicit sheet name, or `default` when none was given
    pub fn sheet_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.sheet.as_deref().unwrap_or(default)
    }

    /// Range body without the sheet, e.g. `AC2:AC1000`
    pub fn body(&self) -> String {
        match &self.end {
            Some(end) => format!("{}:{}", self.start, end),
            None => self.start.to_a1_string(),
        }
    }

    /// Range body qualified with `sheet` for provider calls, e.g. `'Backend'!AC2:AC1000`
    pub fn qualified(&self, sheet: &str) -> String {
        format!("{}!{}", quote_sheet_name(sheet), self.body())
    }

    /// Both bounds lack rows (`A:A`)
    pub fn is_columns_only(&self) -> bool {
        !self.start.has_row() && self.end.map_or(false, |end| !end.has_row())
    }

    /// The end bound lacks a row (`A2:A` or `A:A`)
    pub fn has_open_end(&self) -> bool {
        self.end.map_or(false, |end| !end.has_row())
    }

    /// Column of the bottom-right bound
    pub fn end_col(&self) -> u32 {
        self.end.map_or(self.start.col, |end| end.col)
    }

    /// Copy of this reference with the given row bounds filled in
    pub fn with_rows(&self, start_row: Option<u32>, end_row: Option<u32>) -> Self {
        let mut out = self.clone();
        if let Some(row) = start_row {
            out.start.row = Some(row);
        }
        if let Some(row) = end_row {
            let end = out.end.get_or_insert(RangeBound::column(self.start.col));
            end.row = Some(row);
        }
        out
    }
}

impl fmt::Display for RangeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) => write!(f, "{}", self.qualified(sheet)),
            None => write!(f, "{}", self.body()),
        }
    }
}

impl FromStr for RangeReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Quote a sheet name for A1 notation, doubling embedded quotes.
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

fn unquote_sheet_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('\'') && trimmed.ends_with('\''))
            || (trimmed.starts_with('"') && trimmed.ends_with('"')));
    if quoted {
        trimmed[1..trimmed.len() - 1].replace("''", "'")
    } else {
        trimmed.to_string()
    }
}
