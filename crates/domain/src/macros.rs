//! Macro for implementing slug conversions on fieldless enums
//!
//! Scenario identifiers and failure kinds travel as short lowercase strings
//! in URLs, config files and log fields. This macro gives such enums a
//! single source of truth for that mapping.
//!
//! # Example
//!
//! ```rust
//! use retrykit_domain::impl_slug_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     Waiting,
//!     Attempting,
//! }
//!
//! impl_slug_conversions!(Phase {
//!     Waiting => "waiting",
//!     Attempting => "attempting",
//! });
//!
//! assert_eq!(Phase::Waiting.as_str(), "waiting");
//! assert_eq!("ATTEMPTING".parse::<Phase>(), Ok(Phase::Attempting));
//! ```

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum
///
/// This macro generates:
/// - `as_str()`: the variant's slug
/// - `Display`: writes the slug
/// - `FromStr`: case-insensitive parsing of the slug, with an error naming
///   the enum on failure
#[macro_export]
macro_rules! impl_slug_conversions {
    ($enum_name:ident { $($variant:ident => $slug:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Stable lowercase identifier.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $slug,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($slug => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
