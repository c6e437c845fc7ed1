// Diagnostics: per-session frame statistics.

pub mod stats;
