pub const MILLIS_PER_SECOND: f64 = 1000.0;
pub const MB_PER_GB: f64 = 1024.0;

#[inline]
pub fn millis_to_seconds(ms: f64) -> f64 {
    ms / MILLIS_PER_SECOND
}

#[inline]
pub fn mb_to_gb(mb: f64) -> f64 {
    mb / MB_PER_GB
}
