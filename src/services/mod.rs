//! Pure computations over log snapshots. Nothing in here performs I/O; the
//! handlers fetch records from the store and pass them in.

pub mod correlation;
pub mod streak;
pub mod trends;
pub mod weight_guard;
