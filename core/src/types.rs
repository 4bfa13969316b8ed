//! Shared primitive types used across the entire game core.

/// Spendable currency. Fractional values are allowed.
pub type Points = f64;

/// A player level. Levels are 1-indexed.
pub type Level = u32;

/// Stable identifier of an upgrade, achievement or skin in the catalog.
pub type CatalogId = String;

/// Skins are keyed by their icon name.
pub type SkinId = String;

/// Monotonic counter bumped every time the session state is overwritten
/// wholesale (remote load). Snapshots carry the generation they were read at.
pub type Generation = u64;
