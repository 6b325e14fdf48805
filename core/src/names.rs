//! Compile-time outpost names.
//!
//! `declare_outposts!` turns a list of names into a `Copy` enum so that
//! registration, attachment and removal calls are checked by the compiler.
//! It has no runtime effect: every API still takes plain strings through
//! [`IntoNames`].

/// One name or a list of names.
pub trait IntoNames {
    fn into_names(self) -> Vec<String>;
}

impl IntoNames for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoNames for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoNames for &String {
    fn into_names(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<S: AsRef<str>> IntoNames for Vec<S> {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>> IntoNames for &[S] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> IntoNames for [S; N] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

/// Declare a typed set of outpost names.
///
/// ```rust
/// outpost_core::declare_outposts! {
///     pub enum AppOutpost {
///         Auth = "auth",
///         Audit = "audit",
///     }
/// }
///
/// assert_eq!(AppOutpost::Auth.as_ref(), "auth");
/// assert_eq!(AppOutpost::ALL.len(), 2);
/// ```
#[macro_export]
macro_rules! declare_outposts {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl ::std::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::names::IntoNames for $name {
            fn into_names(self) -> ::std::vec::Vec<::std::string::String> {
                ::std::vec![self.as_str().to_string()]
            }
        }

        impl ::std::convert::From<$name> for ::std::string::String {
            fn from(name: $name) -> ::std::string::String {
                name.as_str().to_string()
            }
        }
    };
}
