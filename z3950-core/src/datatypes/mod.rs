//! Value types carried in BER primitives

pub mod bit_string;
pub mod generalized_time;
pub mod object_identifier;

pub use bit_string::BitString;
pub use generalized_time::GeneralizedTime;
pub use object_identifier::ObjectIdentifier;
