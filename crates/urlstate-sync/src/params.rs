//! Query-string helpers that work directly against a location.
//!
//! None of these mutate the location; they return the query string a caller
//! would navigate to.

use urlstate_codec::{UrlState, decode, encode};

use crate::location::Location;

/// Decode the current location's query string.
pub fn get_url_params(location: &(impl Location + ?Sized)) -> UrlState {
    decode(&location.search())
}

/// Shallow-merge `partial` into the current query and return the full query
/// string, with a leading `?`.
pub fn merge_params(location: &(impl Location + ?Sized), partial: &UrlState) -> String {
    replace_params(&get_url_params(location).merged(partial))
}

/// Encode `full` as a query string with a leading `?`, ignoring the current
/// location.
pub fn replace_params(full: &UrlState) -> String {
    format!("?{}", encode(full))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryLocation;

    fn location() -> MemoryLocation {
        MemoryLocation::new("/?foo=bar")
    }

    #[test]
    fn test_get_url_params() {
        let params = get_url_params(&location());
        assert_eq!(params.get_str("foo"), Some("bar"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_merge_params_appends_new_keys() {
        let partial = UrlState::new().with("bar", "foo");
        assert_eq!(merge_params(&location(), &partial), "?foo=bar&bar=foo");
    }

    #[test]
    fn test_merge_params_overrides_existing_keys() {
        let partial = UrlState::new().with("foo", "foo");
        assert_eq!(merge_params(&location(), &partial), "?foo=foo");
    }

    #[test]
    fn test_replace_params_discards_current_query() {
        let full = UrlState::new().with("bar", "foo");
        assert_eq!(replace_params(&full), "?bar=foo");
    }

    #[test]
    fn test_params_do_not_touch_location() {
        let location = location();
        let _ = merge_params(&location, &UrlState::new().with("x", "1"));
        assert_eq!(location.href(), "/?foo=bar");
        assert_eq!(location.len(), 1);
    }

    #[test]
    fn test_params_through_trait_object() {
        let location: std::rc::Rc<dyn Location> = std::rc::Rc::new(location());
        assert_eq!(get_url_params(location.as_ref()).get_str("foo"), Some("bar"));
    }
}
