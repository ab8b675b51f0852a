/// Length of the file header shared by SL2 and SL3 logs.
pub const LOG_HEADER_SIZE: usize = 8;

/// Fixed part of an SL2 frame record, before the sounded data.
pub const SL2_FRAME_HEADER_SIZE: usize = 144;

/// Fixed part of an SL3 frame record, before the sounded data.
pub const SL3_FRAME_HEADER_SIZE: usize = 168;

/// Polar radius used by Lowrance spherical-Mercator coordinates, in meters.
pub const LOWRANCE_EARTH_RADIUS_M: f64 = 6_356_752.3142;

/// Mean Earth radius for haversine distances, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per international foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Two nearest-point distances closer than this (meters) are a tie.
pub const DISTANCE_TIE_TOLERANCE_M: f64 = 1e-9;

/// Minimum `base * to_adjust` pair count to use Rayon in the nearest-point search.
pub const PARALLEL_PAIR_THRESHOLD: usize = 65_536;

/// Number of bytes reinterpreted by the research decoder.
pub const RESEARCH_WIDTH: usize = 4;

/// Sounded-data length used when a depth-generated frame has no source payload.
pub const DEFAULT_SOUNDED_DATA_LEN: usize = 3072;

/// Amplitude of the water column in depth-generated sounded data.
pub const WATER_AMPLITUDE: u8 = 0;

/// Amplitude of the bottom echo band in depth-generated sounded data.
pub const BOTTOM_ECHO_AMPLITUDE: u8 = 255;

/// Amplitude below the bottom echo band in depth-generated sounded data.
pub const SUB_BOTTOM_AMPLITUDE: u8 = 96;

/// Bottom echo band thickness as a fraction of the displayed range.
pub const BOTTOM_ECHO_FRACTION: f64 = 0.02;
