//! Heading-indexed view of a generated document.
//!
//! The document is parsed once per validation pass into addressable
//! sections; every check operates on the pre-sliced section text, never on
//! a re-scan of the raw document.

use oad_core::closure::contains_word;

/// One heading plus the text span running to the next heading at the same
/// or higher level (so a section includes its own sub-sections).
#[derive(Debug, Clone)]
pub struct Section {
    pub level: usize,
    pub heading: String,
    pub body: String,
}

/// All sections of a document, in order.
#[derive(Debug, Clone)]
pub struct Outline {
    pub sections: Vec<Section>,
}

impl Outline {
    /// Parse ATX headings. Fenced code blocks are opaque: a `#` inside a
    /// fence is content, not structure.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let mut headings: Vec<(usize, usize, String)> = Vec::new(); // (line, level, text)
        let mut in_fence = false;

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence {
                continue;
            }
            let level = line.bytes().take_while(|b| *b == b'#').count();
            if (1..=6).contains(&level) && line[level..].starts_with(' ') {
                let text = line[level..].trim().trim_end_matches('#').trim_end();
                headings.push((i, level, text.to_string()));
            }
        }

        let sections = headings
            .iter()
            .enumerate()
            .map(|(idx, (line, level, text))| {
                let end = headings[idx + 1..]
                    .iter()
                    .find(|(_, next_level, _)| next_level <= level)
                    .map(|(next_line, _, _)| *next_line)
                    .unwrap_or(lines.len());
                Section {
                    level: *level,
                    heading: text.clone(),
                    body: lines[line + 1..end].join("\n"),
                }
            })
            .collect();

        Outline { sections }
    }

    /// Match an identifier to a section heading via ordered fallbacks:
    /// exact backtick-quoted token, then first word after stripping a
    /// leading label, then case-insensitive whole-word scan. Progressively
    /// looser; the first strategy that matches anything wins.
    pub fn find(&self, id: &str) -> Option<&Section> {
        let quoted = format!("`{id}`");
        if let Some(section) = self.sections.iter().find(|s| s.heading.contains(&quoted)) {
            return Some(section);
        }
        if let Some(section) = self
            .sections
            .iter()
            .find(|s| first_word_matches(&s.heading, id))
        {
            return Some(section);
        }
        self.sections
            .iter()
            .find(|s| contains_word_ci(&s.heading, id))
    }

    /// A top-level (level 1 or 2) section whose heading names `title`.
    pub fn top_section(&self, title: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.level <= 2 && contains_word_ci(&s.heading, title))
    }

    /// Headings nested under the section at `index`, up to the next
    /// heading at the same or higher level.
    pub fn subheadings(&self, index: usize) -> Vec<&Section> {
        let level = self.sections[index].level;
        self.sections[index + 1..]
            .iter()
            .take_while(|s| s.level > level)
            .collect()
    }
}

/// Is `name` mentioned in `text`, as a backtick-quoted token or a
/// case-insensitive whole word?
pub fn mentions(text: &str, name: &str) -> bool {
    text.contains(&format!("`{name}`")) || contains_word_ci(text, name)
}

fn contains_word_ci(haystack: &str, word: &str) -> bool {
    contains_word(&haystack.to_lowercase(), &word.to_lowercase())
}

fn first_word_matches(heading: &str, id: &str) -> bool {
    let text = strip_label(heading);
    let first = text
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '-');
    !first.is_empty() && first.eq_ignore_ascii_case(id)
}

/// Strip a one-word leading label like `Operation:`.
fn strip_label(heading: &str) -> &str {
    match heading.split_once(':') {
        Some((label, rest)) if label.split_whitespace().count() == 1 => rest.trim_start(),
        _ => heading,
    }
}
