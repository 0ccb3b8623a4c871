/// Crate-wide numeric thresholds.
///
/// THRESHOLD is the tolerance for treating a floating value as integral when
/// rendering constants and for comparing numeric samples in partition checks.
pub const THRESHOLD: f64 = 1e-12;

/// Largest magnitude still rendered as an integer literal.
pub const MAX_INTEGRAL_RENDER: f64 = 1e15;
