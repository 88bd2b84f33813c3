/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Scaling of the receiver clock unknown in the design matrix:
/// the fourth column models a nanosecond scale offset.
pub const CLOCK_UNKNOWN_SCALING: f64 = 1.0E-9;
