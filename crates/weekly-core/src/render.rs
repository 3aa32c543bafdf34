//! Display model for the update box: plain markdown blocks when settled,
//! diff segments while a change is revealing.

use crate::diff::{has_changes, DiffSegment, SegmentKind};
use crate::presentation::{Phase, PresentationSnapshot};
use serde::Serialize;

pub const PLACEHOLDER: &str = "No content available.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    Placeholder {
        text: String,
    },
    Diff {
        segments: Vec<DiffSegment>,
        /// Show the added/removed legend.
        legend: bool,
    },
    Markdown {
        blocks: Vec<Block>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    ListItem { ordered: bool, text: String },
    Quote { text: String },
    Code { language: Option<String>, text: String },
    Paragraph { text: String },
}

pub fn render(presentation: &PresentationSnapshot, content: &str) -> View {
    if content.is_empty() {
        return View::Placeholder {
            text: PLACEHOLDER.to_string(),
        };
    }
    if presentation.phase == Phase::Revealing && !presentation.segments.is_empty() {
        return View::Diff {
            legend: has_changes(&presentation.segments),
            segments: presentation.segments.clone(),
        };
    }
    View::Markdown {
        blocks: parse_blocks(content),
    }
}

/// Line-oriented markdown block split. Inline markup is left in the text.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut lines = markdown.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();

        if let Some(lang) = trimmed.strip_prefix("```") {
            flush_paragraph(&mut paragraph, &mut blocks);
            let mut body = Vec::new();
            for inner in lines.by_ref() {
                if inner.trim_start().starts_with("```") {
                    break;
                }
                body.push(inner);
            }
            let lang = lang.trim();
            blocks.push(Block::Code {
                language: (!lang.is_empty()).then(|| lang.to_string()),
                text: body.join("\n"),
            });
            continue;
        }

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            continue;
        }

        if let Some(block) = line_block(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(block);
        } else {
            paragraph.push(trimmed);
        }
    }
    flush_paragraph(&mut paragraph, &mut blocks);
    blocks
}

/// Plain-text rendering of a diff: `[-removed-]` and `{+added+}`.
pub fn diff_to_text(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .map(|s| match s.kind {
            SegmentKind::Unchanged => s.text.clone(),
            SegmentKind::Removed => format!("[-{}-]", s.text),
            SegmentKind::Added => format!("{{+{}+}}", s.text),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn line_block(line: &str) -> Option<Block> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&hashes) {
        if let Some(text) = line[hashes..].strip_prefix(' ') {
            return Some(Block::Heading {
                level: hashes as u8,
                text: text.trim().to_string(),
            });
        }
    }

    for marker in ["- ", "* ", "+ "] {
        if let Some(text) = line.strip_prefix(marker) {
            return Some(Block::ListItem {
                ordered: false,
                text: text.trim().to_string(),
            });
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(text) = line[digits..].strip_prefix(". ") {
            return Some(Block::ListItem {
                ordered: true,
                text: text.trim().to_string(),
            });
        }
    }

    if let Some(text) = line.strip_prefix('>') {
        return Some(Block::Quote {
            text: text.trim().to_string(),
        });
    }
    None
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if paragraph.is_empty() {
        return;
    }
    blocks.push(Block::Paragraph {
        text: paragraph.join(" "),
    });
    paragraph.clear();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(phase: Phase, segments: Vec<DiffSegment>) -> PresentationSnapshot {
        PresentationSnapshot {
            phase,
            segments,
            pulse: false,
        }
    }

    #[test]
    fn empty_content_is_placeholder() {
        let view = render(&snapshot(Phase::Settled, vec![]), "");
        assert_eq!(
            view,
            View::Placeholder {
                text: PLACEHOLDER.into()
            }
        );
    }

    #[test]
    fn revealing_shows_diff_with_legend() {
        let segments = vec![DiffSegment::unchanged("a"), DiffSegment::added("b")];
        let view = render(&snapshot(Phase::Revealing, segments.clone()), "a b");
        assert_eq!(
            view,
            View::Diff {
                segments,
                legend: true
            }
        );
    }

    #[test]
    fn unchanged_only_diff_has_no_legend() {
        let segments = vec![DiffSegment::unchanged("a b")];
        let View::Diff { legend, .. } = render(&snapshot(Phase::Revealing, segments), "a b")
        else {
            panic!("expected diff view")
        };
        assert!(!legend);
    }

    #[test]
    fn settled_shows_markdown() {
        let view = render(&snapshot(Phase::Settled, vec![]), "## Blockers\n- none");
        assert_eq!(
            view,
            View::Markdown {
                blocks: vec![
                    Block::Heading {
                        level: 2,
                        text: "Blockers".into()
                    },
                    Block::ListItem {
                        ordered: false,
                        text: "none".into()
                    },
                ]
            }
        );
    }

    #[test]
    fn paragraphs_join_lines_and_split_on_blank() {
        let blocks = parse_blocks("first line\nsecond line\n\nthird");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph {
                    text: "first line second line".into()
                },
                Block::Paragraph {
                    text: "third".into()
                },
            ]
        );
    }

    #[test]
    fn code_fence_and_quote_and_ordered_list() {
        let md = "> heads up\n1. first\n```rust\nfn main() {}\n```\n#not a heading";
        let blocks = parse_blocks(md);
        assert_eq!(
            blocks,
            vec![
                Block::Quote {
                    text: "heads up".into()
                },
                Block::ListItem {
                    ordered: true,
                    text: "first".into()
                },
                Block::Code {
                    language: Some("rust".into()),
                    text: "fn main() {}".into()
                },
                Block::Paragraph {
                    text: "#not a heading".into()
                },
            ]
        );
    }

    #[test]
    fn diff_text_markers() {
        let segments = vec![
            DiffSegment::unchanged("the"),
            DiffSegment::removed("cat"),
            DiffSegment::added("dog"),
        ];
        assert_eq!(diff_to_text(&segments), "the [-cat-] {+dog+}");
    }

    #[test]
    fn view_serializes_with_kind_tag() {
        let json = serde_json::to_value(View::Placeholder { text: "x".into() }).unwrap();
        assert_eq!(json["kind"], "placeholder");
    }
}
