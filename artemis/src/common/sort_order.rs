/// Specifies the direction for sorting query results.
///
/// # Variants
/// - `Ascending`: Sort from smallest to largest value
/// - `Descending`: Sort from largest to smallest value
///
/// Derived queries pick it from the `Asc`/`Desc` suffix of an `OrderBy` clause,
/// defaulting to `Ascending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Sort in ascending order (smallest to largest)
    #[default]
    Ascending,
    /// Sort in descending order (largest to smallest)
    Descending,
}
