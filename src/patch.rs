// SPDX-License-Identifier: MIT
//
// Artifact Patcher — pure content-in/content-out splicing.
//
// Each artifact is treated as an ordered sequence of immutable text segments
// plus one insertion point. The patcher either locates that point
// unambiguously or fails; it never guesses and never reprints the document
// from a parse tree, so unrelated entries keep their exact bytes.

use crate::error::{OnboardError, Result};
use crate::render::{GeneratedFragment, PatchOp};
use std::path::Path;

/// Fail with `AlreadyPatched` when the target already carries a fragment
/// keyed by this organization. Defense in depth alongside the registry
/// duplicate check: the registry only sees the variable file, this probe
/// sees each artifact.
pub fn check_not_patched(content: &str, fragment: &GeneratedFragment, org: &str) -> Result<()> {
    if !fragment.probe.is_empty() && content.contains(&fragment.probe) {
        return Err(OnboardError::AlreadyPatched {
            path: fragment.path.clone(),
            org: org.to_string(),
        });
    }
    Ok(())
}

/// Splice the fragment into the existing content. For `CreateFile`
/// fragments the rendered text is the whole file.
pub fn apply(content: &str, fragment: &GeneratedFragment) -> Result<String> {
    match &fragment.op {
        PatchOp::CreateFile => Ok(fragment.text.clone()),
        PatchOp::AppendEof => Ok(append_eof(content, &fragment.text)),
        PatchOp::JsonArrayInsert { key } => {
            insert_into_json_array(content, key, &fragment.text, &fragment.path)
        }
        PatchOp::InsertAboveMarker { marker } => {
            insert_above_marker(content, marker, &fragment.text, &fragment.path)
        }
    }
}

/// Append at end of file, separated by one blank line. Existing bytes are
/// never altered; only the separator adapts to the file's final newline.
fn append_eof(content: &str, text: &str) -> String {
    let mut out = String::with_capacity(content.len() + text.len() + 2);
    out.push_str(content);
    if content.ends_with('\n') {
        out.push('\n');
    } else {
        out.push_str("\n\n");
    }
    out.push_str(text);
    out
}

/// Insert a pretty-printed JSON object at the end of the `key` array.
///
/// Only the whitespace run between the last element and the closing bracket
/// is rewritten; every existing element keeps its exact bytes.
fn insert_into_json_array(
    content: &str,
    key: &str,
    entry: &str,
    path: &Path,
) -> Result<String> {
    let anchor_err = |detail: &str| OnboardError::AnchorNotFound {
        path: path.to_path_buf(),
        anchor: format!("\"{key}\" array ({detail})"),
    };

    let key_pos = content
        .find(&format!("\"{key}\""))
        .ok_or_else(|| anchor_err("key not found"))?;
    let open_rel = content[key_pos..]
        .find('[')
        .ok_or_else(|| anchor_err("no opening bracket after key"))?;
    let open = key_pos + open_rel;
    let close = matching_bracket(content, open).ok_or_else(|| anchor_err("unbalanced array"))?;

    // Last non-whitespace byte before the closing bracket decides comma
    // placement: `[` empty array, `}` after an element, `,` trailing comma.
    let inner = &content[open + 1..close];
    let last_rel = inner.rfind(|c: char| !c.is_whitespace());
    let (splice_from, needs_comma) = match last_rel {
        None => (open + 1, false),
        Some(rel) => {
            let ch = inner[rel..].chars().next().unwrap_or(' ');
            match ch {
                '}' => (open + 1 + rel + ch.len_utf8(), true),
                ',' => (open + 1 + rel + ch.len_utf8(), false),
                _ => return Err(anchor_err("unexpected element shape")),
            }
        }
    };

    let close_indent = line_indent(content, close);
    let entry_indent = format!("{close_indent}  ");
    let indented = indent_block(entry.trim_end(), &entry_indent);

    let mut out = String::with_capacity(content.len() + indented.len() + 8);
    out.push_str(&content[..splice_from]);
    if needs_comma {
        out.push(',');
    }
    out.push('\n');
    out.push_str(&indented);
    out.push('\n');
    out.push_str(&close_indent);
    out.push_str(&content[close..]);
    Ok(out)
}

/// Insert the fragment immediately above the dedicated marker line. The
/// marker must be present; anything less explicit risks silent corruption
/// of the script.
fn insert_above_marker(content: &str, marker: &str, text: &str, path: &Path) -> Result<String> {
    let mut offset = 0usize;
    for line in content.split_inclusive('\n') {
        if line.trim() == marker {
            let mut out = String::with_capacity(content.len() + text.len());
            out.push_str(&content[..offset]);
            out.push_str(text);
            out.push_str(&content[offset..]);
            return Ok(out);
        }
        offset += line.len();
    }
    Err(OnboardError::AnchorNotFound {
        path: path.to_path_buf(),
        anchor: marker.to_string(),
    })
}

/// Position of the `]` matching the `[` at `open`, skipping string literals.
fn matching_bracket(content: &str, open: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Leading whitespace of the line containing `pos`.
fn line_indent(content: &str, pos: usize) -> String {
    let line_start = content[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    content[line_start..pos]
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect()
}

fn indent_block(block: &str, indent: &str) -> String {
    block
        .lines()
        .map(|line| {
            if line.is_empty() {
                line.to_string()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
