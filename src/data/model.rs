use std::collections::HashSet;
use std::fmt;

use super::error::SweepError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Rows are compared and hashed value-for-value, so `CellValue` must be `Eq` + `Hash`.
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Absent value. Distinct from `0` and from the empty string.
    Missing,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

// -- Manual Eq/Ord so whole rows can live in hash sets and sorted views --
// Floats compare by `total_cmp` so equality agrees with the bit-pattern hash;
// `-0.0` is folded into `0.0` on both sides.

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Missing => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => unsigned_zero(*a).total_cmp(&unsigned_zero(*b)),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => unsigned_zero(*f).to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Missing => {}
        }
    }
}

fn unsigned_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Missing => write!(f, "<NA>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// The cell as it is written to a text file. Missing cells are empty.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Missing => String::new(),
            // Debug keeps the decimal point so floats read back as floats.
            CellValue::Float(f) => format!("{f:?}"),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Bool(true) => String::from("True"),
            CellValue::Bool(false) => String::from("False"),
            CellValue::Text(s) => s.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – a named, homogeneous sequence of cells
// ---------------------------------------------------------------------------

/// Semantic type of a column, derived from its present cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every present cell is an integer or a float. A column with no present
    /// cells at all also counts, like an all-NaN float column.
    Numeric,
    Boolean,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<CellValue>,
}

impl Column {
    /// Build a column and unify its cells to one type. A numeric column
    /// holding any float or any gap stores all of its numbers as floats; a
    /// text column stores every present cell as text.
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let mut column = Column {
            name: name.into(),
            values,
        };
        match column.kind() {
            ColumnKind::Numeric
                if column
                    .values
                    .iter()
                    .any(|v| matches!(v, CellValue::Float(_) | CellValue::Missing)) =>
            {
                for v in &mut column.values {
                    if let CellValue::Integer(i) = *v {
                        *v = CellValue::Float(i as f64);
                    }
                }
            }
            ColumnKind::Text => {
                for v in &mut column.values {
                    if !matches!(v, CellValue::Text(_) | CellValue::Missing) {
                        *v = CellValue::Text(v.to_text());
                    }
                }
            }
            _ => {}
        }
        column
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [CellValue] {
        &mut self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Recomputed on every call; cleaning mutates cells in place.
    pub fn kind(&self) -> ColumnKind {
        let mut present = self.values.iter().filter(|v| !v.is_missing()).peekable();
        if present.peek().is_none() {
            return ColumnKind::Numeric;
        }
        let mut all_numeric = true;
        let mut all_bool = true;
        for v in present {
            all_numeric &= v.is_numeric();
            all_bool &= matches!(v, CellValue::Bool(_));
        }
        if all_numeric {
            ColumnKind::Numeric
        } else if all_bool {
            ColumnKind::Boolean
        } else {
            ColumnKind::Text
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind() == ColumnKind::Numeric
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Present values as `f64`, skipping gaps and non-numeric cells.
    pub fn numeric_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(CellValue::as_f64)
    }

    fn retain_rows(&mut self, keep: &[bool]) {
        let mut flags = keep.iter();
        self.values.retain(|_| flags.next().copied().unwrap_or(true));
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded file
// ---------------------------------------------------------------------------

/// Ordered, named columns of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Assemble a table, rejecting columns whose lengths disagree.
    pub fn new(columns: Vec<Column>) -> Result<Self, SweepError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(SweepError::ColumnLengthMismatch {
                    column: bad.name.clone(),
                    expected,
                    found: bad.len(),
                });
            }
        }
        Ok(Table { columns })
    }

    /// Build a table from a header and row-major cells. Rows must all be as
    /// wide as the header.
    pub fn from_rows(header: &[&str], rows: Vec<Vec<CellValue>>) -> Result<Self, SweepError> {
        let mut cells: Vec<Vec<CellValue>> = vec![Vec::with_capacity(rows.len()); header.len()];
        for row in rows {
            if row.len() != header.len() {
                let column = header.get(row.len()).or(header.last()).copied().unwrap_or("");
                return Err(SweepError::ColumnLengthMismatch {
                    column: column.to_string(),
                    expected: header.len(),
                    found: row.len(),
                });
            }
            for (slot, value) in cells.iter_mut().zip(row) {
                slot.push(value);
            }
        }
        let columns = header
            .iter()
            .zip(cells)
            .map(|(name, values)| Column::new(*name, values))
            .collect();
        Table::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Cells of row `index`, left to right.
    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.n_rows()).map(move |i| self.row(i))
    }

    /// Numeric columns, recomputed from the current cells.
    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_numeric()).collect()
    }

    /// First `n` rows as a new table, for previews.
    pub fn head(&self, n: usize) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: c.values.iter().take(n).cloned().collect(),
            })
            .collect();
        Table { columns }
    }

    /// Keep row `i` iff `keep[i]`. Returns the number of rows dropped.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) -> usize {
        let before = self.n_rows();
        for column in &mut self.columns {
            column.retain_rows(keep);
        }
        before - self.n_rows()
    }

    /// Positions of rows that equal an earlier row.
    pub(crate) fn duplicate_mask(&self) -> Vec<bool> {
        let mut seen: HashSet<Vec<&CellValue>> = HashSet::with_capacity(self.n_rows());
        self.rows().map(|row| seen.insert(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(v: f64) -> CellValue {
        CellValue::Float(v)
    }

    fn i(v: i64) -> CellValue {
        CellValue::Integer(v)
    }

    #[test]
    fn integer_column_with_gap_becomes_float() {
        let col = Column::new("b", vec![i(2), CellValue::Missing, i(4)]);
        assert_eq!(col.values(), &[f(2.0), CellValue::Missing, f(4.0)]);
        assert_eq!(col.kind(), ColumnKind::Numeric);
    }

    #[test]
    fn dense_integer_column_stays_integer() {
        let col = Column::new("a", vec![i(1), i(3)]);
        assert_eq!(col.values(), &[i(1), i(3)]);
    }

    #[test]
    fn column_kinds() {
        let text = Column::new("t", vec![i(1), CellValue::Text("x".into())]);
        assert_eq!(text.kind(), ColumnKind::Text);

        let flags = Column::new("b", vec![CellValue::Bool(true), CellValue::Missing]);
        assert_eq!(flags.kind(), ColumnKind::Boolean);

        let empty = Column::new("e", vec![CellValue::Missing, CellValue::Missing]);
        assert_eq!(empty.kind(), ColumnKind::Numeric);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = Table::new(vec![
            Column::new("a", vec![i(1), i(2)]),
            Column::new("b", vec![i(1)]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            SweepError::ColumnLengthMismatch { ref column, expected: 2, found: 1 } if column == "b"
        ));
    }

    #[test]
    fn from_rows_rejects_short_rows() {
        let err = Table::from_rows(&["a", "b"], vec![vec![i(1)]]).unwrap_err();
        assert!(matches!(err, SweepError::ColumnLengthMismatch { .. }));
    }

    #[test]
    fn mixed_columns_become_text() {
        let col = Column::new(
            "code",
            vec![
                i(7),
                f(1.5),
                CellValue::Bool(true),
                CellValue::Missing,
                CellValue::Text("SW1A".into()),
            ],
        );
        assert_eq!(
            col.values(),
            &[
                CellValue::Text("7".into()),
                CellValue::Text("1.5".into()),
                CellValue::Text("True".into()),
                CellValue::Missing,
                CellValue::Text("SW1A".into()),
            ]
        );
    }

    #[test]
    fn numeric_columns_follow_mutation() {
        let mut table = Table::from_rows(
            &["a", "b"],
            vec![vec![i(1), CellValue::Missing], vec![i(2), CellValue::Missing]],
        )
        .unwrap();
        assert_eq!(table.numeric_columns().len(), 2);

        table.columns_mut()[1].values_mut()[0] = CellValue::Text("x".into());
        let names: Vec<&str> = table.numeric_columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn signed_zeros_are_equal() {
        assert_eq!(f(0.0), f(-0.0));
        let set: HashSet<CellValue> = [f(0.0), f(-0.0)].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn head_truncates_every_column() {
        let table = Table::from_rows(
            &["a", "b"],
            (0..10).map(|n| vec![i(n), i(n * 2)]).collect(),
        )
        .unwrap();
        let preview = table.head(5);
        assert_eq!(preview.n_rows(), 5);
        assert_eq!(preview.n_cols(), 2);
        assert_eq!(preview.row(4), vec![&i(4), &i(8)]);
    }

    #[test]
    fn missing_cells_compare_equal() {
        assert_eq!(CellValue::Missing, CellValue::Missing);
        assert_ne!(CellValue::Missing, CellValue::Text(String::new()));
        assert_ne!(CellValue::Missing, i(0));
    }
}
