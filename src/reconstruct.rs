//! Applying chosen alternatives back onto the original prompt.

use crate::types::{RefactorSegment, SelectedAlternatives};
use std::borrow::Cow;

/// Substitute every selected alternative into `base`.
///
/// Segments are applied from the highest `start_index` down, so a
/// replacement never shifts the offsets of segments still to be applied.
/// Selections that don't resolve to one of the segment's alternatives are
/// ignored. When nothing applies the result borrows `base` unchanged, which
/// callers use to detect a no-op apply.
///
/// Overlapping segments (only possible with [`OverlapPolicy::Keep`]) can't
/// all be applied: once the inner one is replaced, the outer range no
/// longer matches the working text. Such a selection is skipped with a
/// warning rather than splicing at a shifted offset.
///
/// [`OverlapPolicy::Keep`]: crate::config::OverlapPolicy::Keep
pub fn build_modified_prompt<'a>(
    base: &'a str,
    segments: &[RefactorSegment],
    selections: &SelectedAlternatives,
) -> Cow<'a, str> {
    let mut ordered: Vec<&RefactorSegment> = segments.iter().collect();
    ordered.sort_by(|a, b| b.start_index.cmp(&a.start_index));

    let mut modified = Cow::Borrowed(base);
    // start of the leftmost replacement so far; ranges past it have shifted
    let mut applied_from: Option<usize> = None;
    for segment in ordered {
        let Some(alt) = selections
            .get(&segment.id)
            .and_then(|alt_id| segment.alternative(alt_id))
        else {
            continue;
        };

        let (start, end) = (segment.start_index, segment.end_index);
        let fits = start <= end
            && end <= modified.len()
            && modified.is_char_boundary(start)
            && modified.is_char_boundary(end)
            && applied_from.map_or(true, |applied| end <= applied);
        if !fits {
            log::warn!(
                "Skipping selection for segment {:?} ({}..{}): range no longer fits the prompt",
                segment.original,
                start,
                end
            );
            continue;
        }
        modified.to_mut().replace_range(start..end, &alt.text);
        applied_from = Some(start);
    }
    modified
}

/// Text to show for a segment: its selected alternative, or the original.
pub fn display_text<'a>(
    segment: &'a RefactorSegment,
    selections: &SelectedAlternatives,
) -> &'a str {
    selections
        .get(&segment.id)
        .and_then(|alt_id| segment.alternative(alt_id))
        .map(|alt| alt.text.as_str())
        .unwrap_or(segment.original.as_str())
}

/// A piece of a prompt laid out for inline highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment<'a> {
    /// Plain prompt text between segments.
    Text(&'a str),
    /// A highlighted segment and the text currently shown for it.
    Segment {
        segment: &'a RefactorSegment,
        display: &'a str,
    },
}

/// Split `prompt` into alternating plain and segment fragments.
///
/// Segments are walked by ascending `start_index`. A segment that starts
/// before the end of the previous one, or whose offsets don't fit the
/// prompt, is left out.
pub fn fragments<'a>(
    prompt: &'a str,
    segments: &'a [RefactorSegment],
    selections: &'a SelectedAlternatives,
) -> Vec<Fragment<'a>> {
    let mut ordered: Vec<&RefactorSegment> = segments.iter().collect();
    ordered.sort_by_key(|seg| seg.start_index);

    let mut out = Vec::with_capacity(ordered.len() * 2 + 1);
    let mut cursor = 0;
    for segment in ordered {
        let in_bounds = prompt
            .get(segment.start_index..segment.end_index)
            .is_some();
        if segment.start_index < cursor || !in_bounds {
            continue;
        }
        if segment.start_index > cursor {
            out.push(Fragment::Text(&prompt[cursor..segment.start_index]));
        }
        out.push(Fragment::Segment {
            segment,
            display: display_text(segment, selections),
        });
        cursor = segment.end_index;
    }
    if cursor < prompt.len() {
        out.push(Fragment::Text(&prompt[cursor..]));
    }
    out
}
