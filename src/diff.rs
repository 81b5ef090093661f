//! Unified diff rendering between two line sequences
//!
//! Output is classic unified-diff text: `--- before_<name>` /
//! `+++ after_<name>` headers, `@@` hunk headers with three lines of
//! context, and `-`/`+`/` ` prefixed change lines. Lines carry no trailing
//! terminator; the whole diff is joined with `\n`. Identical inputs produce
//! an empty string, and identical runs always produce byte-identical text.

use similar::{DiffTag, TextDiff};

/// Context lines kept around each hunk
const CONTEXT_RADIUS: usize = 3;

/// Render the difference between two versions of a file's lines.
///
/// `old == None` means the file has content but no cached baseline (for
/// example the first modification seen after a restart); the full new
/// content is returned verbatim with no diff markers.
pub fn unified(name: &str, old: Option<&[String]>, new: &[String]) -> String {
    let old = match old {
        Some(old) => old,
        None => return new.join("\n"),
    };

    let old_refs: Vec<&str> = old.iter().map(String::as_str).collect();
    let new_refs: Vec<&str> = new.iter().map(String::as_str).collect();
    let diff = TextDiff::from_slices(&old_refs, &new_refs);
    let groups = diff.grouped_ops(CONTEXT_RADIUS);
    if groups.is_empty() {
        return String::new();
    }

    let mut out: Vec<String> = Vec::new();
    out.push(format!("--- before_{name}"));
    out.push(format!("+++ after_{name}"));

    for group in &groups {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        out.push(format!(
            "@@ -{} +{} @@",
            format_range(first.old_range().start, last.old_range().end),
            format_range(first.new_range().start, last.new_range().end),
        ));

        for op in group {
            match op.tag() {
                DiffTag::Equal => {
                    for i in op.old_range() {
                        out.push(format!(" {}", old[i]));
                    }
                }
                DiffTag::Delete => {
                    for i in op.old_range() {
                        out.push(format!("-{}", old[i]));
                    }
                }
                DiffTag::Insert => {
                    for i in op.new_range() {
                        out.push(format!("+{}", new[i]));
                    }
                }
                DiffTag::Replace => {
                    for i in op.old_range() {
                        out.push(format!("-{}", old[i]));
                    }
                    for i in op.new_range() {
                        out.push(format!("+{}", new[i]));
                    }
                }
            }
        }
    }

    out.join("\n")
}

/// Format a hunk range the classic unified-diff way: `start,len`, with the
/// length omitted when it is 1 and the start shifted back for empty ranges.
fn format_range(start: usize, end: usize) -> String {
    let length = end - start;
    match length {
        1 => format!("{}", start + 1),
        0 => format!("{},0", start),
        _ => format!("{},{}", start + 1, length),
    }
}
