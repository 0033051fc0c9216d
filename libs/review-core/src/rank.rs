//! Learner ranks by experience points.
//!
//! The ladder is an immutable table built once and passed to whoever needs
//! it. Lookups are a binary search over the rank start points.

use serde::{Deserialize, Serialize};

use crate::error::RankError;

/// One rung of the ladder. `max_xp` is inclusive; `None` means open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rank {
    pub name: String,
    pub min_xp: u32,
    pub max_xp: Option<u32>,
}

impl Rank {
    pub fn new(name: impl Into<String>, min_xp: u32, max_xp: Option<u32>) -> Self {
        Self {
            name: name.into(),
            min_xp,
            max_xp,
        }
    }
}

/// Where a learner stands on the ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankProgress {
    pub xp: u32,
    pub rank: Rank,
    pub next_rank: Option<Rank>,
    pub xp_to_next: Option<u32>,
    /// Fraction of the current rank completed, 0.0 to 1.0.
    pub progress: f64,
}

/// Validated, ordered rank ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    ranks: Vec<Rank>,
}

impl RankTable {
    /// Build a table. Ranks must start at 0, ascend, and leave no gaps.
    pub fn new(ranks: Vec<Rank>) -> Result<Self, RankError> {
        let first = ranks.first().ok_or(RankError::Empty)?;
        if first.min_xp != 0 {
            return Err(RankError::FirstRankNotZero {
                name: first.name.clone(),
                min_xp: first.min_xp,
            });
        }

        for (index, rank) in ranks.iter().enumerate() {
            let is_last = index + 1 == ranks.len();
            match rank.max_xp {
                Some(max_xp) if max_xp < rank.min_xp => {
                    return Err(RankError::InvertedRange {
                        name: rank.name.clone(),
                        min_xp: rank.min_xp,
                        max_xp,
                    });
                }
                None if !is_last => {
                    return Err(RankError::OpenEndedNotLast {
                        name: rank.name.clone(),
                    });
                }
                _ => {}
            }

            if index > 0 {
                // Every non-last rank has a max_xp, checked above.
                let previous_max = ranks[index - 1].max_xp.unwrap_or(u32::MAX);
                if previous_max.checked_add(1) != Some(rank.min_xp) {
                    return Err(RankError::Gap {
                        name: rank.name.clone(),
                        min_xp: rank.min_xp,
                        previous_max,
                    });
                }
            }
        }

        Ok(Self { ranks })
    }

    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    /// Rank holding `xp`. Beyond a closed last rank, the last rank is returned.
    pub fn rank_for(&self, xp: u32) -> &Rank {
        let index = self.index_for(xp);
        &self.ranks[index]
    }

    /// Current rank, next rank and progress between them.
    pub fn progress(&self, xp: u32) -> RankProgress {
        let index = self.index_for(xp);
        let rank = &self.ranks[index];
        let next_rank = self.ranks.get(index + 1);

        let (xp_to_next, progress) = match next_rank {
            Some(next) => {
                let span = f64::from(next.min_xp - rank.min_xp);
                let done = f64::from(xp - rank.min_xp);
                (Some(next.min_xp - xp), (done / span).clamp(0.0, 1.0))
            }
            None => (None, 1.0),
        };

        RankProgress {
            xp,
            rank: rank.clone(),
            next_rank: next_rank.cloned(),
            xp_to_next,
            progress,
        }
    }

    fn index_for(&self, xp: u32) -> usize {
        // First rank starts at 0, so the partition point is at least 1.
        self.ranks
            .partition_point(|rank| rank.min_xp <= xp)
            .saturating_sub(1)
    }
}

impl Default for RankTable {
    fn default() -> Self {
        let ranks = vec![
            Rank::new("Beginner", 0, Some(99)),
            Rank::new("Novice", 100, Some(299)),
            Rank::new("Apprentice", 300, Some(699)),
            Rank::new("Intermediate", 700, Some(1499)),
            Rank::new("Advanced", 1500, Some(2999)),
            Rank::new("Expert", 3000, Some(5999)),
            Rank::new("Master", 6000, Some(9999)),
            Rank::new("Legend", 10000, None),
        ];
        Self { ranks }
    }
}
