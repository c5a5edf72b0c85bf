//! URL extraction from markup
//!
//! Pages are not parsed as HTML. Every `href="..."` / `src='...'` attribute in
//! the text is picked up, including ones inside scripts, comments and inline
//! styles, so the mirror also catches links a DOM walk would miss.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL_ATTRIBUTE: Regex =
        Regex::new(r#"(?:href|src)=["']([^"']+)["']"#).expect("URL attribute regex is valid");
}

/// Extracts every `href`/`src` attribute value from the content
///
/// Values are returned raw, in document order, duplicates included. Attribute
/// names are matched case-sensitively and only quoted, non-empty values count.
///
/// # Arguments
///
/// * `content` - Page content as text
///
/// # Example
///
/// ```
/// use site_mirror::crawler::extract_urls;
///
/// let html = r#"<a href="/forum/">Forum</a><img src='logo.png'>"#;
/// assert_eq!(extract_urls(html), vec!["/forum/", "logo.png"]);
/// ```
pub fn extract_urls(content: &str) -> Vec<String> {
    URL_ATTRIBUTE
        .captures_iter(content)
        .filter_map(|captures| captures.get(1))
        .map(|value| value.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_in_document_order() {
        let html = r#"<div><a href="1"></a><a href='2'></a><script src="3"></script><script src="4"></script></div>"#;
        assert_eq!(extract_urls(html), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_keeps_duplicates() {
        let html = r#"<a href="/a">x</a><a href="/a">y</a>"#;
        assert_eq!(extract_urls(html), vec!["/a", "/a"]);
    }

    #[test]
    fn test_ignores_unquoted_and_empty_values() {
        let html = r#"<a href=/a>x</a><a href="">y</a><img src=''>"#;
        assert!(extract_urls(html).is_empty());
    }

    #[test]
    fn test_attribute_names_are_case_sensitive() {
        assert!(extract_urls(r#"<a HREF="/a">x</a>"#).is_empty());
    }

    #[test]
    fn test_matches_inside_scripts_and_comments() {
        let html = r#"<!-- <a href="/hidden"> --><script>el.src="/lazy.js";</script>"#;
        assert_eq!(extract_urls(html), vec!["/hidden", "/lazy.js"]);
    }

    #[test]
    fn test_suffix_attributes_match() {
        // data-src and xlink:href carry real URLs too
        let html = r##"<img data-src="/big.png"><use xlink:href="#icon">"##;
        assert_eq!(extract_urls(html), vec!["/big.png", "#icon"]);
    }

    #[test]
    fn test_value_stops_at_other_quote_kind() {
        let html = r#"<a href="it's">x</a>"#;
        assert_eq!(extract_urls(html), vec!["it"]);
    }

    #[test]
    fn test_no_urls() {
        assert!(extract_urls("plain text").is_empty());
        assert!(extract_urls("").is_empty());
    }
}
