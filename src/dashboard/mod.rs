//! Dashboard cards: capability classification and block selection.

pub mod blocks;
pub mod capabilities;

pub use blocks::{Block, BlockKind, DeviceCard, Entity, EntityValue, Footer, Icon, TemperatureIcon};
pub use capabilities::{classify, CapabilityFlags};

/// Format a reading the way the bridge reports it: whole numbers without a
/// trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(21.0), "21");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(21.5), "21.5");
        assert_eq!(format_number(0.25), "0.25");
    }
}
