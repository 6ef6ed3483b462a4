//! Markup fragment tree
//!
//! The copy interceptor receives the HTML half of a selection as a tree of
//! elements and text leaves, rewrites the leaves, and serializes the result
//! back to HTML. Serialization is depth-bounded so a pathological tree
//! fails cleanly instead of overflowing the stack.

use thiserror::Error;

/// Nesting depth past which serialization gives up.
pub const MAX_DEPTH: usize = 128;

#[derive(Error, Debug)]
pub enum FragmentError {
    #[error("fragment nesting exceeds {MAX_DEPTH} levels")]
    TooDeep,

    #[error("invalid tag name: {0:?}")]
    InvalidTag(String),
}

/// One node of a markup fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Fragment>,
    },
    Text(String),
}

impl Fragment {
    pub fn text(content: impl Into<String>) -> Self {
        Fragment::Text(content.into())
    }

    pub fn element(tag: impl Into<String>, children: Vec<Fragment>) -> Self {
        Fragment::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children,
        }
    }

    pub fn element_with_attrs(
        tag: impl Into<String>,
        attrs: Vec<(String, String)>,
        children: Vec<Fragment>,
    ) -> Self {
        Fragment::Element {
            tag: tag.into(),
            attrs,
            children,
        }
    }

    /// Rebuild the tree with every text leaf transformed, markup untouched.
    pub fn map_text<F>(&self, f: &F) -> Fragment
    where
        F: Fn(&str) -> String,
    {
        match self {
            Fragment::Text(t) => Fragment::Text(f(t)),
            Fragment::Element { tag, attrs, children } => Fragment::Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                children: children.iter().map(|c| c.map_text(f)).collect(),
            },
        }
    }

    /// Concatenated text of all leaves.
    pub fn plain_text(&self) -> String {
        match self {
            Fragment::Text(t) => t.clone(),
            Fragment::Element { children, .. } => {
                children.iter().map(Fragment::plain_text).collect()
            }
        }
    }

    /// Serialize to an HTML string.
    pub fn to_html(&self) -> Result<String, FragmentError> {
        let mut out = String::new();
        self.write_html(&mut out, 0)?;
        Ok(out)
    }

    fn write_html(&self, out: &mut String, depth: usize) -> Result<(), FragmentError> {
        if depth > MAX_DEPTH {
            return Err(FragmentError::TooDeep);
        }

        match self {
            Fragment::Text(t) => out.push_str(&escape_text(t)),
            Fragment::Element { tag, attrs, children } => {
                if !is_valid_tag(tag) {
                    return Err(FragmentError::InvalidTag(tag.clone()));
                }
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                for child in children {
                    child.write_html(out, depth + 1)?;
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
        Ok(())
    }
}

fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric())
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Fragment {
        Fragment::element(
            "p",
            vec![
                Fragment::text("call "),
                Fragment::element_with_attrs(
                    "b",
                    vec![("class".to_string(), "num".to_string())],
                    vec![Fragment::text("[PHONE]")],
                ),
            ],
        )
    }

    #[test]
    fn test_to_html() {
        let html = sample().to_html().unwrap();
        assert_eq!(html, r#"<p>call <b class="num">[PHONE]</b></p>"#);
    }

    #[test]
    fn test_map_text_preserves_markup() {
        let mapped = sample().map_text(&|t| t.replace("[PHONE]", "555-1234"));
        let html = mapped.to_html().unwrap();
        assert_eq!(html, r#"<p>call <b class="num">555-1234</b></p>"#);
    }

    #[test]
    fn test_text_is_escaped() {
        let html = Fragment::text("a < b & c").to_html().unwrap();
        assert_eq!(html, "a &lt; b &amp; c");
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let frag = Fragment::element("b><script", vec![]);
        assert!(matches!(frag.to_html(), Err(FragmentError::InvalidTag(_))));
    }

    #[test]
    fn test_depth_cap() {
        let mut frag = Fragment::text("x");
        for _ in 0..(MAX_DEPTH + 2) {
            frag = Fragment::element("div", vec![frag]);
        }
        assert!(matches!(frag.to_html(), Err(FragmentError::TooDeep)));
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(sample().plain_text(), "call [PHONE]");
    }
}
