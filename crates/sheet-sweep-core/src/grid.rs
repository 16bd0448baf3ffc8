//! Cell value grids, snapshots and dropdown value sets

/// A rectangular (possibly ragged) block of cell values, row-major.
///
/// Providers may omit trailing empty cells and rows, the way the Sheets API does.
pub type Grid = Vec<Vec<String>>;

/// Values of a range captured at one instant.
///
/// Two snapshots of the same range are compared structurally; any difference
/// counts as a change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot(Grid);

impl Snapshot {
    /// Wrap a grid read from the provider
    pub fn new(grid: Grid) -> Self {
        Self(grid)
    }

    /// The captured values
    pub fn grid(&self) -> &Grid {
        &self.0
    }

    /// Whether every captured cell is blank
    pub fn is_blank(&self) -> bool {
        self.0.iter().flatten().all(|v| v.trim().is_empty())
    }
}

impl From<Grid> for Snapshot {
    fn from(grid: Grid) -> Self {
        Self(grid)
    }
}

/// The ordered, de-duplicated list of values a dropdown accepts.
///
/// Values are trimmed; blank cells and repeats are dropped, keeping the order
/// in which each value was first seen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DropdownValues(Vec<String>);

impl DropdownValues {
    /// Collect values from cells in reading order
    pub fn collect<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values: Vec<String> = Vec::new();
        for cell in cells {
            let value = cell.as_ref().trim();
            if value.is_empty() || values.iter().any(|v| v == value) {
                continue;
            }
            values.push(value.to_string());
        }
        Self(values)
    }

    /// Flatten a grid row-major and collect its values
    pub fn from_grid(grid: &Grid) -> Self {
        Self::collect(grid.iter().flatten())
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no values
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over values in order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Values as a slice
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl IntoIterator for DropdownValues {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DropdownValues {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let values = DropdownValues::collect(["Wing", "Wing", "Tail", "", " "]);
        assert_eq!(values.as_slice(), ["Wing", "Tail"]);
    }

    #[test]
    fn test_from_grid_is_row_major_and_trimmed() {
        let grid: Grid = vec![
            vec!["Nose".into(), " Wing ".into()],
            vec![],
            vec!["Wing".into(), "Tail".into()],
        ];
        let values = DropdownValues::from_grid(&grid);
        assert_eq!(values.as_slice(), ["Nose", "Wing", "Tail"]);
    }

    #[test]
    fn test_snapshot_equality_is_structural() {
        let a = Snapshot::new(vec![vec!["1".into()], vec!["2".into()]]);
        let b = Snapshot::new(vec![vec!["1".into()], vec!["2".into()]]);
        let c = Snapshot::new(vec![vec!["1".into(), "2".into()]]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_blank());
        assert!(Snapshot::new(vec![vec![" ".into()]]).is_blank());
    }
}
