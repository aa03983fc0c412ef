//! cube-hunt: an endless, restartable search for integer solutions of
//! x^3 + y^3 + z^3 = 114.
//!
//! The search walks a two-parameter family: for each index n it factors
//! D(n) = 36n^3 - 19 and tries every divisor alpha as a candidate. A
//! candidate survives only when (alpha + 6n)^2 + D/alpha is a perfect
//! square, at which point the triple falls out algebraically and is
//! re-verified by cubing. Fleet members split the index line by residue
//! class, so the walk covers every integer n without coordination, and
//! each worker checkpoints its cursor so containers can die and resume.

pub mod arith;
pub mod candidates;
pub mod checkpoint;
pub mod config;
pub mod factor;
pub mod partition;
pub mod worker;
