//! Body rewrites applied before reassembly: excerpt marker normalization,
//! Liquid `highlight` conversion, and an advisory scan for Liquid `include`
//! tags. Each pass is a single scan over the content and allocates only
//! when it has something to rewrite.

use std::borrow::Cow;

use memchr::memmem::Finder;
use once_cell::sync::Lazy;

use crate::frontmatter;

const MORE_TAG: &str = "<!--more-->";
const END_HIGHLIGHT: &str = "{% endhighlight %}";

static COMMENT_OPENING: Lazy<Finder<'static>> = Lazy::new(|| Finder::new("<!--"));
static COMMENT_CLOSING: Lazy<Finder<'static>> = Lazy::new(|| Finder::new("-->"));
static TAG_OPENING: Lazy<Finder<'static>> = Lazy::new(|| Finder::new("{%"));
static TAG_CLOSING: Lazy<Finder<'static>> = Lazy::new(|| Finder::new("%}"));
static END_HIGHLIGHT_FINDER: Lazy<Finder<'static>> = Lazy::new(|| Finder::new(END_HIGHLIGHT));

/// Rewrites every spelling of the excerpt marker (case-insensitive interior,
/// surrounding whitespace tolerated) to the canonical `<!--more-->`, placing
/// it at the start of a line unless a newline already precedes it. Other
/// HTML comments pass through untouched.
pub fn normalize_more_tag(input: &str) -> Cow<'_, str> {
    let mut output = String::new();
    let mut rest = input;

    loop {
        let Some(opening) = COMMENT_OPENING.find(rest.as_bytes()) else { break };
        let interior = opening + "<!--".len();
        let Some(closing) = COMMENT_CLOSING.find(rest[interior..].as_bytes()) else { break };

        let end = interior + closing + "-->".len();
        if rest[interior..interior + closing].trim().eq_ignore_ascii_case("more") {
            output.push_str(&rest[..opening]);
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(MORE_TAG);
        } else {
            output.push_str(&rest[..end]);
        }

        rest = &rest[end..];
    }

    if output.is_empty() {
        return Cow::Borrowed(input);
    }

    output.push_str(rest);
    Cow::Owned(output)
}

/// Converts `{% highlight lang %}` ... `{% endhighlight %}` blocks into
/// fenced code blocks carrying the same language annotation, trimming
/// exactly one leading and one trailing newline from the enclosed code.
/// Tags other than `highlight` pass through untouched; an opening tag with
/// no matching closing tag leaves the remainder unchanged.
pub fn convert_liquid_highlight(input: &str) -> Cow<'_, str> {
    let mut output = String::new();
    let mut rest = input;

    loop {
        let Some(opening) = TAG_OPENING.find(rest.as_bytes()) else { break };
        let interior = opening + "{%".len();
        let Some(closing) = TAG_CLOSING.find(rest[interior..].as_bytes()) else { break };

        let tag_end = interior + closing + "%}".len();
        let language = match rest[interior..interior + closing].trim().strip_prefix("highlight") {
            Some(language) => language.trim(),
            None => {
                output.push_str(&rest[..tag_end]);
                rest = &rest[tag_end..];
                continue;
            }
        };

        let Some(end) = END_HIGHLIGHT_FINDER.find(rest[tag_end..].as_bytes()) else {
            output.push_str(&rest[..tag_end]);
            rest = &rest[tag_end..];
            continue;
        };

        let code = &rest[tag_end..tag_end + end];
        let code = code.strip_prefix('\n').unwrap_or(code);
        let code = code.strip_suffix('\n').unwrap_or(code);

        output.push_str(&rest[..opening]);
        output.push_str("```");
        output.push_str(language);
        output.push('\n');
        output.push_str(code);
        output.push('\n');
        output.push_str("```");

        rest = &rest[tag_end + end + END_HIGHLIGHT.len()..];
    }

    if output.is_empty() {
        return Cow::Borrowed(input);
    }

    output.push_str(rest);
    Cow::Owned(output)
}

/// Reports Liquid `include` tags, which have no Zola equivalent. The
/// content itself is left untouched.
pub fn warn_liquid_includes(input: &str) {
    let mut rest = input;

    while let Some(opening) = TAG_OPENING.find(rest.as_bytes()) {
        let interior = opening + "{%".len();
        let Some(closing) = TAG_CLOSING.find(rest[interior..].as_bytes()) else { break };

        let tag = rest[interior..interior + closing].trim();
        if tag.starts_with("include") {
            tracing::warn!(tag, "unsupported Liquid tag (no Zola equivalent)");
        }

        rest = &rest[interior + closing + "%}".len()..];
    }
}

/// Builds the final document: the serialized metadata between `+++`
/// delimiters, followed by the normalized body. Normalization runs over the
/// full original content; the original front matter block is stripped only
/// afterwards, so rewrites see the document exactly as it was authored.
pub fn combine(metadata: &str, content: &str) -> String {
    let content = normalize_more_tag(content);
    let content = convert_liquid_highlight(&content);
    warn_liquid_includes(&content);

    let body = frontmatter::strip(&content);
    format!("+++\n{metadata}+++{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_more_tag_variants() {
        assert_eq!(normalize_more_tag("before\n<!--more-->\nafter"), "before\n<!--more-->\nafter");
        assert_eq!(
            normalize_more_tag("before\n<!-- more -->\nafter"),
            "before\n<!--more-->\nafter",
        );
        assert_eq!(
            normalize_more_tag("before\n<!-- MORE -->\nafter"),
            "before\n<!--more-->\nafter",
        );
        assert_eq!(
            normalize_more_tag("before\n<!--  More  -->\nafter"),
            "before\n<!--more-->\nafter",
        );
        assert_eq!(
            normalize_more_tag("a<!-- more -->b<!-- MORE -->c"),
            "a\n<!--more-->b\n<!--more-->c",
        );
    }

    #[test]
    fn more_tag_lands_at_the_start_of_a_line() {
        assert_eq!(
            normalize_more_tag("end of paragraph.<!--more-->\nnext paragraph"),
            "end of paragraph.\n<!--more-->\nnext paragraph",
        );
        assert_eq!(normalize_more_tag("<!--more-->rest"), "<!--more-->rest");
    }

    #[test]
    fn other_comments_pass_through() {
        assert_eq!(
            normalize_more_tag("just regular <!-- comment --> text"),
            "just regular <!-- comment --> text",
        );
        assert_eq!(
            normalize_more_tag("plain text without any tags"),
            "plain text without any tags",
        );
        assert_eq!(normalize_more_tag("text with <!-- unclosed"), "text with <!-- unclosed");
        assert_eq!(normalize_more_tag(""), "");
    }

    #[test]
    fn more_tag_normalization_is_idempotent() {
        let once = normalize_more_tag("a<!-- More -->b\n<!--  more-->\n<!--more-->");
        let twice = normalize_more_tag(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn converts_highlight_blocks_to_fences() {
        assert_eq!(
            convert_liquid_highlight("{% highlight ruby %}\nputs 'hello'\n{% endhighlight %}"),
            "```ruby\nputs 'hello'\n```",
        );
        assert_eq!(
            convert_liquid_highlight(
                "before\n{% highlight ruby %}\nputs 'hello'\n{% endhighlight %}\nafter",
            ),
            "before\n```ruby\nputs 'hello'\n```\nafter",
        );
        assert_eq!(
            convert_liquid_highlight("{% highlight %}\ncode\n{% endhighlight %}"),
            "```\ncode\n```",
        );
    }

    #[test]
    fn non_highlight_tags_pass_through() {
        assert_eq!(convert_liquid_highlight("just plain text"), "just plain text");
        assert_eq!(convert_liquid_highlight(""), "");
        assert_eq!(
            convert_liquid_highlight(
                "{% include header.html %}\n{% highlight go %}\nfmt.Println()\n{% endhighlight %}",
            ),
            "{% include header.html %}\n```go\nfmt.Println()\n```",
        );
    }

    #[test]
    fn unmatched_highlight_passes_through() {
        let input = "intro {% highlight rust %}\nfn main() {}\n";
        assert_eq!(convert_liquid_highlight(input), input);
    }

    #[test]
    fn fence_conversion_preserves_code() {
        let code = "let x = [1, 2];\n\nfor v in x {\n    dbg!(v);\n}";
        let input = format!("{{% highlight rust %}}\n{code}\n{{% endhighlight %}}");
        let converted = convert_liquid_highlight(&input);

        let inner = converted
            .strip_prefix("```rust\n").unwrap()
            .strip_suffix("\n```").unwrap();
        assert_eq!(inner, code);
    }

    #[test]
    fn include_scan_tolerates_malformed_tags() {
        warn_liquid_includes("{% include header.html %} and {% incomplete");
        warn_liquid_includes("");
    }

    #[test]
    fn combines_matter_and_normalized_body() {
        let content = "---\ntitle: Test\n---\n\nBody text here.\n";
        let combined = combine("title = \"Test\"\n", content);
        assert_eq!(combined, "+++\ntitle = \"Test\"\n+++\n\nBody text here.\n");
    }

    #[test]
    fn combine_tolerates_empty_metadata() {
        assert_eq!(combine("", "---\n\n---\nbody\n"), "+++\n+++\nbody\n");
    }
}
