use crate::common::markers::{COOLING_PARK, RAMMING_START};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RammingReplacement {
    pub(super) text: String,
    pub(super) replaced: usize,
}

pub(super) fn count_ramming_start_lines(content: &str) -> usize {
    content
        .split('\n')
        .filter(|line| line.contains(RAMMING_START))
        .count()
}

/// Replaces each span from a ramming-start marker through the nearest
/// following cooling-park marker with `block`. Spans may cross lines and
/// start or end mid-line. A start marker with no park after it ends the scan.
pub(super) fn replace_ramming_sections(content: &str, block: &str) -> RammingReplacement {
    let mut text = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut replaced = 0;

    while let Some(start_offset) = content[cursor..].find(RAMMING_START) {
        let start = cursor + start_offset;
        let body = start + RAMMING_START.len();
        let Some(park_offset) = content[body..].find(COOLING_PARK) else {
            break;
        };
        let end = body + park_offset + COOLING_PARK.len();

        text.push_str(&content[cursor..start]);
        text.push_str(block);
        cursor = end;
        replaced += 1;
    }

    text.push_str(&content[cursor..]);
    RammingReplacement { text, replaced }
}
