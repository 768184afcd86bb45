//! Effort estimation from git commit history.
//!
//! Mines author signatures and timestamps from a repository using git2,
//! merges duplicate author identities, buckets each author's active days
//! into calendar periods, and converts per-period activity into a
//! person-month estimate capped by a full-time commit threshold.

pub mod authors;
pub mod estimate;
pub mod identity;
pub mod mining;
pub mod period;
