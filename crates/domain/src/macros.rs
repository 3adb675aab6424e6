//! Macro for implementing Display and FromStr for plain domain enums
//!
//! Configuration values such as the client environment arrive as strings
//! from environment variables; this macro gives those enums a single,
//! case-insensitive string mapping.
//!
//! # Example
//!
//! ```rust
//! use bookstore_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Shelf {
//!     Fiction,
//!     Poetry,
//! }
//!
//! impl_domain_enum_conversions!(Shelf {
//!     Fiction => "fiction",
//!     Poetry => "poetry",
//! });
//! ```

/// Implements Display and FromStr traits for domain enums
///
/// - Display writes the lowercase mapping
/// - FromStr accepts any casing and reports the enum name on failure
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
