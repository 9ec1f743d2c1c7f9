//! HTML minification for production builds.
//!
//! Strips comments and collapses inter-tag whitespace. Content of
//! `<pre>`, `<textarea>`, `<script>` and `<style>` is preserved verbatim.

/// Elements whose text content must not be touched.
const RAW_TAGS: [&str; 4] = ["pre", "textarea", "script", "style"];

/// Minify an HTML document.
pub fn minify_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while !rest.is_empty() {
        // Comments vanish entirely.
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                None => "",
            };
            continue;
        }

        if rest.starts_with('<') {
            let (tag, remaining) = take_tag(rest);
            out.push_str(tag);
            rest = remaining;

            // Raw elements: copy verbatim through the matching close tag.
            if let Some(name) = raw_tag_name(tag) {
                let (content, remaining) = take_raw_content(rest, name);
                out.push_str(content);
                rest = remaining;
            }
            continue;
        }

        if rest.starts_with(char::is_whitespace) {
            let end = rest
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(rest.len());
            let next = &rest[end..];
            // Whitespace between tags disappears; inside text it collapses.
            if !(ends_with_tag(&out) && (next.starts_with('<') || next.is_empty())) {
                out.push(' ');
            }
            rest = next;
            continue;
        }

        let end = rest.find(|c: char| c == '<' || c.is_whitespace()).unwrap_or(rest.len());
        out.push_str(&rest[..end]);
        rest = &rest[end..];
    }

    out
}

/// Take one `<...>` tag, honoring quoted attribute values.
fn take_tag(input: &str) -> (&str, &str) {
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return input.split_at(i + 1),
            _ => {}
        }
    }
    (input, "")
}

/// Tag name if the tag opens a raw element.
fn raw_tag_name(tag: &str) -> Option<&'static str> {
    let name = tag
        .trim_start_matches('<')
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()?;
    RAW_TAGS
        .iter()
        .find(|raw| name.eq_ignore_ascii_case(raw))
        .copied()
}

/// Content up to (excluding) `</name`, or everything if unclosed.
fn take_raw_content<'a>(input: &'a str, name: &str) -> (&'a str, &'a str) {
    let closer = format!("</{name}");
    let lower = input.to_ascii_lowercase();
    match lower.find(&closer) {
        Some(pos) => input.split_at(pos),
        None => (input, ""),
    }
}

fn ends_with_tag(out: &str) -> bool {
    out.is_empty() || out.ends_with('>')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_comments() {
        let html = "<div><!-- note --><p>x</p></div>";
        assert_eq!(minify_html(html), "<div><p>x</p></div>");
    }

    #[test]
    fn test_collapses_between_tags() {
        let html = "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>";
        assert_eq!(minify_html(html), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_collapses_text_whitespace() {
        let html = "<p>hello   there\n  friend</p>";
        assert_eq!(minify_html(html), "<p>hello there friend</p>");
    }

    #[test]
    fn test_preserves_pre() {
        let html = "<pre>  two\n    spaces</pre>";
        assert_eq!(minify_html(html), html);
    }

    #[test]
    fn test_preserves_script() {
        let html = "<script>\nvar a = 1;  var b = 2;\n</script>";
        assert_eq!(minify_html(html), html);
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        let html = "<a title=\"a > b\">x</a>";
        assert_eq!(minify_html(html), html);
    }

    #[test]
    fn test_never_grows() {
        let html = "<html>\n  <body>\n    <h1>Title</h1>\n    <!-- c -->\n  </body>\n</html>";
        let min = minify_html(html);
        assert!(min.len() <= html.len());
        assert_eq!(min, "<html><body><h1>Title</h1></body></html>");
    }
}
