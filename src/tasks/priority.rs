//! # Priority classes for ready tasks.
//!
//! Among simultaneously ready tasks, a higher class is always scheduled
//! first; inside one class, submission order wins. The comparison used by
//! the ready queue is an explicit ordering over `(rank, sequence number)`,
//! not the enum's declaration order.

use serde::{Deserialize, Serialize};

/// Scheduling preference of a task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Scheduled before everything else that is ready.
    High,
    /// The default class.
    #[default]
    Normal,
    /// Scheduled only when no higher class is ready.
    Low,
}

impl Priority {
    /// Scheduling rank: lower sorts first in the ready queue.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Normal => 1,
            Priority::Low => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_orders_high_before_normal_before_low() {
        assert!(Priority::High.rank() < Priority::Normal.rank());
        assert!(Priority::Normal.rank() < Priority::Low.rank());
    }

    #[test]
    fn default_is_normal() {
        assert_eq!(Priority::default(), Priority::Normal);
    }
}
