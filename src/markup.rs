// Helpers for turning scraped page fragments into report values.

use scraper::{ElementRef, Html};

/// Serializes the element children of a container's inner HTML and
/// concatenates them. Bare text directly inside the container is dropped.
/// Returns `None` when there is no element child at all.
///
/// Markup is parsed as the body of a document, where table parts on their own
/// are discarded. When the markup starts with one, it is parsed inside the
/// table structure that would normally hold it.
pub fn child_elements_html(inner_html: &str) -> Option<String> {
    let (open, close, depth) = first_tag_name(inner_html)
        .as_deref()
        .and_then(table_context)
        .unwrap_or(("", "", 0));
    let fragment = Html::parse_fragment(&format!("{}{}{}", open, inner_html, close));

    let mut container = fragment.root_element();
    for _ in 0..depth {
        container = container.children().find_map(ElementRef::wrap)?;
    }
    let joined: String = container
        .children()
        .filter_map(ElementRef::wrap)
        .map(|child| child.html())
        .collect();

    if joined.trim().is_empty() {
        None
    } else {
        Some(joined)
    }
}

fn first_tag_name(html: &str) -> Option<String> {
    let rest = html.trim_start().strip_prefix('<')?;
    let name: String = rest.chars().take_while(char::is_ascii_alphanumeric).collect();
    (!name.is_empty()).then(|| name.to_ascii_lowercase())
}

// Wrapper markup for table parts, and how many elements deep the original
// children end up.
fn table_context(tag: &str) -> Option<(&'static str, &'static str, usize)> {
    match tag {
        "thead" | "tbody" | "tfoot" | "caption" | "colgroup" => Some(("<table>", "</table>", 1)),
        "tr" => Some(("<table><tbody>", "</tbody></table>", 2)),
        "td" | "th" => Some(("<table><tbody><tr>", "</tr></tbody></table>", 3)),
        _ => None,
    }
}

/// Builds the displayed product name from an optional brand label and title.
/// Both present: `"{brand} {title}"`; otherwise whichever one is present.
pub fn join_name(brand: Option<String>, title: Option<String>) -> Option<String> {
    let clean = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    match (clean(brand), clean(title)) {
        (Some(brand), Some(title)) => Some(format!("{} {}", brand, title)),
        (brand, title) => brand.or(title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_element_children() {
        let html = "intro text<p>First</p>\n<ul><li>One</li></ul>";
        assert_eq!(
            child_elements_html(html).as_deref(),
            Some("<p>First</p><ul><li>One</li></ul>")
        );
    }

    #[test]
    fn text_only_container_is_absent() {
        assert_eq!(child_elements_html("  just text  "), None);
        assert_eq!(child_elements_html(""), None);
    }

    #[test]
    fn table_rows_survive_serialization() {
        assert_eq!(
            child_elements_html("<tr><td>x</td></tr>").as_deref(),
            Some("<tr><td>x</td></tr>")
        );
        assert_eq!(
            child_elements_html("\n<TR><td>Size</td><td>42</td></TR><tr><td>Colour</td><td>Red</td></tr>").as_deref(),
            Some("<tr><td>Size</td><td>42</td></tr><tr><td>Colour</td><td>Red</td></tr>")
        );
    }

    #[test]
    fn table_sections_and_cells_survive_serialization() {
        assert_eq!(
            child_elements_html("<thead><tr><th>A</th></tr></thead><tbody><tr><td>1</td></tr></tbody>").as_deref(),
            Some("<thead><tr><th>A</th></tr></thead><tbody><tr><td>1</td></tr></tbody>")
        );
        assert_eq!(
            child_elements_html("<th>Size</th><td>42</td>").as_deref(),
            Some("<th>Size</th><td>42</td>")
        );
    }

    #[test]
    fn joins_brand_and_title() {
        assert_eq!(
            join_name(Some("Acme".into()), Some(" Red Shoe ".into())).as_deref(),
            Some("Acme Red Shoe")
        );
    }

    #[test]
    fn falls_back_to_the_part_that_exists() {
        assert_eq!(join_name(None, Some("Red Shoe".into())).as_deref(), Some("Red Shoe"));
        assert_eq!(join_name(Some("Acme".into()), Some("   ".into())).as_deref(), Some("Acme"));
        assert_eq!(join_name(None, None), None);
    }
}
