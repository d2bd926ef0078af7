//! Keys the ledger persists its snapshots under.

use std::fmt;

/// Snapshot kinds written by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKey {
    Meals,
    DailyGoals,
    MealGoals,
}

impl SnapshotKey {
    /// Returns the store key for this snapshot.
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKey::Meals => "meals",
            SnapshotKey::DailyGoals => "dailyGoals",
            SnapshotKey::MealGoals => "mealGoals",
        }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
