//! Cell addresses and column-letter conversion

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Convert column letters to a 1-based index (A = 1, Z = 26, AA = 27, etc.)
///
/// Letters form a bijective base-26 number with no zero digit. Lowercase input
/// is accepted.
///
/// # Examples
/// ```
/// use sheet_sweep_core::column_to_index;
///
/// assert_eq!(column_to_index("A").unwrap(), 1);
/// assert_eq!(column_to_index("AC").unwrap(), 29);
/// ```
pub fn column_to_index(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!(
                "invalid column letter '{}' in '{}'",
                c, letters
            )));
        }
        col = col
            .checked_mul(26)
            .and_then(|n| n.checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
            .ok_or_else(|| Error::InvalidAddress(format!("column '{}' is too large", letters)))?;
    }

    Ok(col)
}

/// Convert a 1-based column index to letters (1 = A, 26 = Z, 27 = AA, etc.)
///
/// Fails with [`Error::InvalidInput`] for index 0.
pub fn index_to_column(index: u32) -> Result<String> {
    if index == 0 {
        return Err(Error::InvalidInput(
            "column index must be >= 1".into(),
        ));
    }

    let mut result = String::new();
    let mut n = index;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    Ok(result)
}

/// A single cell address such as `B6`.
///
/// Both coordinates are 1-based, matching how they are written in A1 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row number (1-based)
    pub row: u32,
    /// Column index (1-based, A=1)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address. Both `col` and `row` must be >= 1.
    pub fn new(col: u32, row: u32) -> Result<Self> {
        if col == 0 || row == 0 {
            return Err(Error::InvalidAddress(format!(
                "column and row must be >= 1 (got column {}, row {})",
                col, row
            )));
        }
        Ok(Self { row, col })
    }

    /// Parse a cell address from A1-style notation.
    ///
    /// Absolute markers (`$`) are ignored.
    ///
    /// # Examples
    /// ```
    /// use sheet_sweep_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("$B$6").unwrap();
    /// assert_eq!(addr.col, 2);
    /// assert_eq!(addr.row, 6);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let cleaned: String = s.trim().chars().filter(|c| *c != '$').collect();
        if cleaned.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let split = cleaned
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(cleaned.len());
        let (letters, digits) = cleaned.split_at(split);

        if letters.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }
        if digits.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        let col = column_to_index(letters)?;
        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self { row, col })
    }

    /// Column letters of this address
    pub fn column_letters(&self) -> String {
        // col >= 1 is upheld by every constructor
        index_to_column(self.col).unwrap_or_default()
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", self.column_letters(), self.row)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_index_to_column() {
        assert_eq!(index_to_column(1).unwrap(), "A");
        assert_eq!(index_to_column(2).unwrap(), "B");
        assert_eq!(index_to_column(26).unwrap(), "Z");
        assert_eq!(index_to_column(27).unwrap(), "AA");
        assert_eq!(index_to_column(29).unwrap(), "AC");
        assert_eq!(index_to_column(702).unwrap(), "ZZ");
        assert_eq!(index_to_column(703).unwrap(), "AAA");

        assert!(matches!(index_to_column(0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_column_to_index() {
        assert_eq!(column_to_index("A").unwrap(), 1);
        assert_eq!(column_to_index("Z").unwrap(), 26);
        assert_eq!(column_to_index("AA").unwrap(), 27);
        assert_eq!(column_to_index("ZZ").unwrap(), 702);
        assert_eq!(column_to_index("AAA").unwrap(), 703);

        // Case insensitive
        assert_eq!(column_to_index("ac").unwrap(), 29);

        assert!(column_to_index("").is_err());
        assert!(column_to_index("A1").is_err());
    }

    #[test]
    fn test_cell_address_parse() {
        let addr = CellAddress::parse("B6").unwrap();
        assert_eq!((addr.col, addr.row), (2, 6));

        let addr = CellAddress::parse("$AC$2").unwrap();
        assert_eq!((addr.col, addr.row), (29, 2));

        let addr = CellAddress::parse(" a9 ").unwrap();
        assert_eq!(addr.to_string(), "A9");
    }

    #[test]
    fn test_cell_address_parse_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("9").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("A1B").is_err());
        assert!(CellAddress::new(0, 3).is_err());
    }

    proptest! {
        #[test]
        fn prop_index_round_trip(n in 1u32..1_000_000) {
            let letters = index_to_column(n).unwrap();
            prop_assert_eq!(column_to_index(&letters).unwrap(), n);
        }

        #[test]
        fn prop_letters_round_trip(letters in "[A-Z]{1,4}") {
            let n = column_to_index(&letters).unwrap();
            prop_assert_eq!(index_to_column(n).unwrap(), letters);
        }
    }
}
