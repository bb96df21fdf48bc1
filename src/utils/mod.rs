/// Enumerations for card modes and plot tags.
pub mod enums;
