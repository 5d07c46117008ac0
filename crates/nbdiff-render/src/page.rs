//! Self-contained HTML page for one changed document.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::html::{escape, href};
use crate::section::RenderedSection;

const PAGE_CSS: &str = include_str!("../assets/page.css");
const MATH_TOGGLE_JS: &str = include_str!("../assets/math_toggle.js");

const KATEX_CDN: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.8/dist";

/// Everything needed to lay out one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSpec {
    /// Repository-relative path of the document.
    pub document_path: String,
    /// Name the page is written under, normally from [`artifact_names`].
    pub file_name: String,
    pub left_label: String,
    pub right_label: String,
    pub sections: Vec<RenderedSection>,
    /// File name of the previous page, if any.
    pub prev: Option<String>,
    /// File name of the next page, if any.
    pub next: Option<String>,
    /// Include the KaTeX render toggle.
    pub math_toggle: bool,
}

/// A finished page, ready to be written by an artifact sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub file_name: String,
    pub html: String,
}

/// Flatten a repository path into a single artifact file name.
///
/// `analysis/run.ipynb` becomes `analysis_run.ipynb.html`.
pub fn artifact_name(path: &str) -> String {
    let mut name: String = path
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    name.push_str(".html");
    name
}

/// Artifact names for a run, one per path, all distinct.
///
/// Flattening can map two paths onto one name (`a/b.ipynb` and
/// `a_b.ipynb`); later paths then get a `-2`, `-3`, ... suffix before
/// `.html`.
pub fn artifact_names<S: AsRef<str>>(paths: &[S]) -> Vec<String> {
    let mut taken = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let base = artifact_name(path.as_ref());
            let stem = base.strip_suffix(".html").unwrap_or(&base);
            let mut name = base.clone();
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{stem}-{n}.html");
                n += 1;
            }
            name
        })
        .collect()
}

fn nav_button(target: Option<&str>, label: &str) -> String {
    match target {
        Some(target) => format!(r#"<a class="btn" href="{}">{label}</a>"#, href(target)),
        None => format!(r#"<a class="btn disabled">{label}</a>"#),
    }
}

/// Lay out a page from its sections.
pub fn assemble(spec: &PageSpec) -> Page {
    let mut body = String::new();
    if spec.sections.is_empty() {
        body.push_str(r#"<tr class="gap"><td colspan="4">No changed input cells.</td></tr>"#);
        body.push('\n');
    }
    for section in &spec.sections {
        body.push_str(&section.to_html());
    }

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8"/>
<title>{title} diff</title>
"#,
        title = escape(&spec.document_path),
    );
    if spec.math_toggle {
        let _ = writeln!(
            html,
            r#"<link rel="stylesheet" href="{KATEX_CDN}/katex.min.css"/>"#
        );
    }
    let _ = write!(
        html,
        r#"<style>
{PAGE_CSS}</style>
</head>
<body>
<div class="topbar">
{prev}
{next}
"#,
        prev = nav_button(spec.prev.as_deref(), "&#x2B05; Previous"),
        next = nav_button(spec.next.as_deref(), "Next &#x27A1;"),
    );
    if spec.math_toggle {
        html.push_str(
            r#"<div class="toggle"><span>KaTeX</span><button class="toggle-btn" id="mathToggle" type="button"><span class="toggle-thumb"></span></button></div>
"#,
        );
    }
    let _ = write!(
        html,
        r#"<span class="path">{path}</span>
</div>
<table>
<thead><tr><td colspan="2">{left}</td><td colspan="2">{right}</td></tr></thead>
<tbody id="contentArea">
{body}</tbody>
</table>
"#,
        path = escape(&spec.document_path),
        left = escape(&spec.left_label),
        right = escape(&spec.right_label),
    );
    if spec.math_toggle {
        let _ = write!(
            html,
            r#"<script src="{KATEX_CDN}/katex.min.js"></script>
<script src="{KATEX_CDN}/contrib/auto-render.min.js"></script>
<script>
{MATH_TOGGLE_JS}</script>
"#
        );
    }
    html.push_str("</body>\n</html>\n");

    Page {
        file_name: spec.file_name.clone(),
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{render_section, SectionKind};

    fn spec(sections: Vec<RenderedSection>) -> PageSpec {
        PageSpec {
            document_path: "nb/a.ipynb".into(),
            file_name: artifact_name("nb/a.ipynb"),
            left_label: "main".into(),
            right_label: "HEAD".into(),
            sections,
            prev: None,
            next: None,
            math_toggle: true,
        }
    }

    #[test]
    fn artifact_name_flattens_separators() {
        assert_eq!(artifact_name("a.ipynb"), "a.ipynb.html");
        assert_eq!(artifact_name("dir/sub/a.ipynb"), "dir_sub_a.ipynb.html");
        assert_eq!(artifact_name(r"dir\a.ipynb"), "dir_a.ipynb.html");
    }

    #[test]
    fn colliding_names_are_made_distinct() {
        let names = artifact_names(&["a/b.ipynb", "a_b.ipynb", "c.ipynb", "a/b.ipynb"]);
        assert_eq!(
            names,
            vec![
                "a_b.ipynb.html",
                "a_b.ipynb-2.html",
                "c.ipynb.html",
                "a_b.ipynb-3.html",
            ]
        );
    }

    #[test]
    fn empty_page_shows_placeholder() {
        let page = assemble(&spec(Vec::new()));
        assert_eq!(page.file_name, "nb_a.ipynb.html");
        assert!(page.html.contains("No changed input cells."));
    }

    #[test]
    fn boundary_buttons_are_disabled_without_href() {
        let page = assemble(&spec(Vec::new()));
        assert!(page.html.contains(r#"<a class="btn disabled">&#x2B05; Previous</a>"#));
        assert!(page.html.contains(r#"<a class="btn disabled">Next &#x27A1;</a>"#));
    }

    #[test]
    fn navigation_links_point_at_neighbours() {
        let mut s = spec(Vec::new());
        s.prev = Some("x.ipynb.html".into());
        s.next = Some("z.ipynb.html".into());
        let page = assemble(&s);
        assert!(page.html.contains(r#"<a class="btn" href="x.ipynb.html">"#));
        assert!(page.html.contains(r#"<a class="btn" href="z.ipynb.html">"#));
        assert!(!page.html.contains("btn disabled"));
    }

    #[test]
    fn navigation_links_are_percent_encoded() {
        let mut s = spec(Vec::new());
        s.next = Some("results #3.ipynb.html".into());
        let page = assemble(&s);
        assert!(page
            .html
            .contains(r#"<a class="btn" href="results%20%233.ipynb.html">"#));
    }

    #[test]
    fn labels_and_sections_are_embedded() {
        let a = vec!["old".to_string()];
        let b = vec!["new".to_string()];
        let section = render_section("Cell 1", SectionKind::Cell, &a, &b, 2);
        let mut s = spec(vec![section.clone()]);
        s.left_label = "<left>".into();
        let page = assemble(&s);
        assert!(page.html.contains(r#"<td colspan="2">&lt;left&gt;</td>"#));
        assert!(page.html.contains(&section.to_html()));
        assert!(!page.html.contains("No changed input cells."));
    }

    #[test]
    fn math_toggle_is_optional() {
        let with = assemble(&spec(Vec::new()));
        assert!(with.html.contains("mathToggle"));
        assert!(with.html.contains("auto-render.min.js"));

        let mut s = spec(Vec::new());
        s.math_toggle = false;
        let without = assemble(&s);
        assert!(!without.html.contains("mathToggle"));
        assert!(!without.html.contains("katex.min"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let s = spec(Vec::new());
        assert_eq!(assemble(&s), assemble(&s));
    }
}
