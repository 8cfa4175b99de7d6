//! Serialization helpers for the swap client API

/// A module for serializing and deserializing U256 amounts as decimal strings
///
/// Scaled amounts are shown to users and logged, so the decimal form is easier
/// to read than the default hex encoding
pub(crate) mod u256_decimal_serialization {
    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize a U256 to a decimal string
    pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    /// Deserialize a decimal string to a U256
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        let s = String::deserialize(d)?;
        U256::from_str_radix(&s, 10).map_err(|_| D::Error::custom("Invalid U256 value"))
    }
}

/// A module for serializing and deserializing addresses as checksummed strings
pub(crate) mod address_checksum_serialization {
    use std::str::FromStr;

    use alloy_primitives::Address;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize an address to its EIP-55 checksummed form
    pub fn serialize<S: Serializer>(address: &Address, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&address.to_checksum(None))
    }

    /// Deserialize a hex string to an address, checksummed or not
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Address, D::Error> {
        let s = String::deserialize(d)?;
        Address::from_str(&s).map_err(|_| D::Error::custom("Invalid address"))
    }
}
