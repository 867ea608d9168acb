use serde::Serialize;

/// Title given to text that appears before any heading.
pub const DEFAULT_TITLE: &str = "Analysis";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    /// Leading and trailing blank lines are dropped; the rest is kept as is.
    fn new(title: impl Into<String>, lines: &[&str]) -> Self {
        let blank = |line: &&str| line.trim().is_empty();
        let start = lines.iter().position(|l| !blank(l)).unwrap_or(lines.len());
        let end = lines.iter().rposition(|l| !blank(l)).map_or(start, |i| i + 1);
        Self {
            title: title.into(),
            body: lines[start..end].join("\n"),
        }
    }
}

/// Returns the title of a `# ` or `## ` heading line.
fn heading_title(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let rest = line
        .strip_prefix("## ")
        .or_else(|| line.strip_prefix("# "))?;
    let title = rest.trim();
    (!title.is_empty()).then_some(title)
}

/// Splits text on level one and two headings.
///
/// Lines before the first heading form a section titled [`DEFAULT_TITLE`],
/// dropped when blank. Body lines are kept as written. Text without any
/// heading comes back trimmed as a single section.
pub fn sectionize(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut title: Option<&str> = None;
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        match heading_title(line) {
            Some(next) => {
                match title {
                    Some(current) => sections.push(Section::new(current, &lines)),
                    None if lines.iter().any(|l| !l.trim().is_empty()) => {
                        sections.push(Section::new(DEFAULT_TITLE, &lines))
                    }
                    None => {}
                }
                title = Some(next);
                lines.clear();
            }
            None => lines.push(line),
        }
    }

    if let Some(current) = title {
        sections.push(Section::new(current, &lines));
    }

    if sections.is_empty() {
        sections.push(Section {
            title: DEFAULT_TITLE.to_string(),
            body: text.trim().to_string(),
        });
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(sections: &[Section]) -> Vec<(&str, &str)> {
        sections
            .iter()
            .map(|s| (s.title.as_str(), s.body.as_str()))
            .collect()
    }

    #[test]
    fn preamble_and_headings() {
        let sections = sectionize("intro\n# A\nfoo\n## B\nbar");
        assert_eq!(
            pairs(&sections),
            vec![("Analysis", "intro"), ("A", "foo"), ("B", "bar")]
        );
    }

    #[test]
    fn headingless_input_is_one_trimmed_section() {
        let sections = sectionize("\n  just some text\nover two lines  \n");
        assert_eq!(
            pairs(&sections),
            vec![("Analysis", "just some text\nover two lines")]
        );
    }

    #[test]
    fn empty_input_still_yields_a_section() {
        assert_eq!(pairs(&sectionize("")), vec![("Analysis", "")]);
        assert_eq!(pairs(&sectionize("   \n\n")), vec![("Analysis", "")]);
    }

    #[test]
    fn leading_heading_skips_the_default_section() {
        let sections = sectionize("# Overall\nCalm light.\n\n# Eyes\n- open\n- bright");
        assert_eq!(
            pairs(&sections),
            vec![("Overall", "Calm light."), ("Eyes", "- open\n- bright")]
        );
    }

    #[test]
    fn deeper_headings_stay_in_the_body() {
        let sections = sectionize("# Face\n### Detail\ntext");
        assert_eq!(pairs(&sections), vec![("Face", "### Detail\ntext")]);
    }

    #[test]
    fn body_lines_are_not_rewritten() {
        let sections = sectionize("# Tips\n  - indented **bold**\n\n1. first");
        assert_eq!(sections[0].body, "  - indented **bold**\n\n1. first");
    }

    #[test]
    fn indented_code_keeps_its_first_line() {
        let sections = sectionize("# Code\n\n    indented line\n    second\n\n");
        assert_eq!(sections[0].body, "    indented line\n    second");
    }

    #[test]
    fn heading_without_body_keeps_an_empty_section() {
        let sections = sectionize("# Empty\n# Full\nx");
        assert_eq!(pairs(&sections), vec![("Empty", ""), ("Full", "x")]);
    }
}
