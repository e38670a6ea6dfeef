//! Feature access modes.
//!
//! The bridge reports access as an integer whose bits combine freely, so this
//! stays a flag set rather than an enumeration.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Access bitmask attached to every exposed feature.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessMode: u8 {
        /// Value is published in the device state.
        const STATE = 0b001;
        /// Value can be set.
        const WRITE = 0b010;
        /// Value can be read back on request.
        const READ = 0b100;
    }
}

impl AccessMode {
    pub fn has_state(self) -> bool {
        self.contains(Self::STATE)
    }

    pub fn can_write(self) -> bool {
        self.contains(Self::WRITE)
    }

    pub fn can_read(self) -> bool {
        self.contains(Self::READ)
    }
}

impl Serialize for AccessMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for AccessMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Unknown high bits are kept so a round trip does not lose them
        let bits = u8::deserialize(deserializer)?;
        Ok(Self::from_bits_retain(bits))
    }
}
