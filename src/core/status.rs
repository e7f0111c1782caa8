use std::fmt;

use crate::core::{AppError, Result};

/// Declare a string-backed enum stored as VARCHAR and serialized as snake_case text.
///
/// Generates `as_str`, `ALL`, `Display` and `FromStr`.
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }
    };
}

/// Lookup-table workflow over a document status enum
pub trait StatusFlow: Copy + PartialEq + fmt::Display + 'static {
    /// Human name of the document, used in error messages
    const DOCUMENT: &'static str;

    /// States reachable in one step from `self`
    fn next_states(self) -> &'static [Self];

    fn can_transition_to(self, next: Self) -> bool {
        self.next_states().contains(&next)
    }

    fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }

    fn ensure_transition(self, next: Self) -> Result<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition(format!(
                "{} cannot move from '{}' to '{}'",
                Self::DOCUMENT,
                self,
                next
            )))
        }
    }
}

/// Parse a stored enum column (status, currency), reporting corrupt values as internal errors
pub fn parse_stored<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| AppError::internal(format!("Corrupt value in database: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::string_enum! {
        enum Light {
            Red => "red",
            Green => "green",
            Amber => "amber",
        }
    }

    impl StatusFlow for Light {
        const DOCUMENT: &'static str = "Light";

        fn next_states(self) -> &'static [Self] {
            match self {
                Light::Red => &[Light::Green],
                Light::Green => &[Light::Amber],
                Light::Amber => &[Light::Red],
            }
        }
    }

    #[test]
    fn test_string_enum_round_trip_text() {
        assert_eq!(Light::Amber.to_string(), "amber");
        assert_eq!("green".parse::<Light>().unwrap(), Light::Green);
        assert!("blue".parse::<Light>().is_err());
        assert_eq!(Light::ALL.len(), 3);
    }

    #[test]
    fn test_transition_check() {
        assert!(Light::Red.ensure_transition(Light::Green).is_ok());
        let err = Light::Red.ensure_transition(Light::Amber).unwrap_err();
        assert!(err.to_string().contains("from 'red' to 'amber'"));
    }

    #[test]
    fn test_parse_stored_reports_internal() {
        let err = parse_stored::<Light>("purple").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
