//! JSON rendering of a sitemap

use crate::output::sitemap::Location;

/// Renders locations as pretty-printed JSON
///
/// # Example
///
/// ```
/// use sitegraph::output::{to_json, Location};
///
/// let json = to_json(&[Location {
///     url: "http://example.com/".to_string(),
///     ..Location::default()
/// }])
/// .unwrap();
/// assert!(json.contains("\"Links\": []"));
/// ```
pub fn to_json(locations: &[Location]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_field_names_and_empty_lists() {
        let location = Location {
            url: "http://site.test/".to_string(),
            title: "Home".to_string(),
            links: vec!["http://site.test/a.html".to_string()],
            ..Location::default()
        };

        let json = to_json(&[location]).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let entry = &value[0];

        assert_eq!(entry["URL"], "http://site.test/");
        assert_eq!(entry["Title"], "Home");
        assert_eq!(entry["Links"][0], "http://site.test/a.html");
        for field in ["Assets", "Broken", "Remote"] {
            assert_eq!(entry[field], Value::Array(vec![]), "{} missing", field);
        }
    }

    #[test]
    fn test_empty_sitemap() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }
}
