//! Deterministic names for generated operations.

use heck::ToSnakeCase;
use rekt_types::Verb;

/// Prefix distinguishing the non-blocking variant of an operation.
pub const ASYNC_PREFIX: &str = "async_";

/// Name of the blocking operation for `verb` on `resource`.
///
/// ```rust
/// use rekt_registry::naming::operation_name;
/// use rekt_types::Verb;
///
/// assert_eq!(operation_name(Verb::Get, "PlacesAutoComplete"), "get_places_auto_complete");
/// ```
pub fn operation_name(verb: Verb, resource: &str) -> String {
    format!("{}_{}", verb.as_str().to_ascii_lowercase(), resource.to_snake_case())
}

/// Name of the non-blocking operation for `verb` on `resource`.
pub fn async_operation_name(verb: Verb, resource: &str) -> String {
    format!("{}{}", ASYNC_PREFIX, operation_name(verb, resource))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_camel_case_resources_to_snake_case() {
        assert_eq!(operation_name(Verb::Get, "Places"), "get_places");
        assert_eq!(operation_name(Verb::Get, "TextSearch"), "get_text_search");
        assert_eq!(operation_name(Verb::Delete, "userID"), "delete_user_id");
        assert_eq!(async_operation_name(Verb::Post, "Details"), "async_post_details");
    }

    #[test]
    fn case_variants_collide() {
        assert_eq!(operation_name(Verb::Get, "Places"), operation_name(Verb::Get, "places"));
        assert_eq!(operation_name(Verb::Get, "PlaceSearch"), operation_name(Verb::Get, "place_search"));
    }
}
