//! Embedded rule tables.
//!
//! The default correction and terminology tables are baked into the binary so
//! the agent behaves identically on every checkout. Projects extend them
//! through `scrivener.toml` (see [`crate::core::config`]).

/// Macro to embed rule tables at compile time as text.
///
/// Generates:
/// - Public constants for each embedded table
/// - `get_embedded_rules(path)` function for lookup
macro_rules! embedded_rules {
    ($($path:expr => $const_name:ident),* $(,)?) => {
        $(
            pub const $const_name: &str =
                include_str!(concat!("../../rules/", $path));
        )*

        pub fn get_embedded_rules(path: &str) -> Option<&'static str> {
            let key = path.strip_prefix("rules/").unwrap_or(path);
            match key {
                $( $path => Some($const_name), )*
                _ => None,
            }
        }
    };
}

embedded_rules! {
    "review.toml" => EMBEDDED_REVIEW_RULES,
    "terminology.toml" => EMBEDDED_TERMINOLOGY,
}
