//! Line-oriented unified diff between two spell serializations.
//!
//! Small and self-contained: a longest-common-subsequence pass over the
//! line vectors, then hunk assembly with three lines of context. Enough to
//! eyeball how two related spells differ; not a general-purpose patch tool.

/// Context lines kept around each change run.
const CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

struct Edit<'a> {
    op: Op,
    line: &'a str,
    /// Zero-based line positions in the left and right inputs at the point
    /// this edit applies.
    a_pos: usize,
    b_pos: usize,
}

/// Render a unified diff of `a` against `b`. Returns an empty string when
/// the inputs are line-identical.
pub fn unified_diff(a: &str, b: &str, label_a: &str, label_b: &str) -> String {
    let a_lines: Vec<&str> = a.lines().collect();
    let b_lines: Vec<&str> = b.lines().collect();
    let edits = edit_script(&a_lines, &b_lines);
    if edits.iter().all(|e| e.op == Op::Equal) {
        return String::new();
    }

    let mut out = format!("--- {label_a}\n+++ {label_b}\n");
    for (start, end) in hunk_ranges(&edits) {
        let hunk = &edits[start..end];
        let a_count = hunk.iter().filter(|e| e.op != Op::Insert).count();
        let b_count = hunk.iter().filter(|e| e.op != Op::Delete).count();
        let a_start = hunk[0].a_pos + usize::from(a_count > 0);
        let b_start = hunk[0].b_pos + usize::from(b_count > 0);
        out.push_str(&format!(
            "@@ -{a_start},{a_count} +{b_start},{b_count} @@\n"
        ));
        for edit in hunk {
            let marker = match edit.op {
                Op::Equal => ' ',
                Op::Delete => '-',
                Op::Insert => '+',
            };
            out.push(marker);
            out.push_str(edit.line);
            out.push('\n');
        }
    }
    out
}

/// Turn the line vectors into a full edit script via LCS backtracking.
fn edit_script<'a>(a: &[&'a str], b: &[&'a str]) -> Vec<Edit<'a>> {
    // lcs[i][j]: length of the LCS of a[i..] and b[j..].
    let mut lcs = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut edits = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let (op, line) = if i < a.len() && j < b.len() && a[i] == b[j] {
            (Op::Equal, a[i])
        } else if j < b.len() && (i == a.len() || lcs[i][j + 1] >= lcs[i + 1][j]) {
            (Op::Insert, b[j])
        } else {
            (Op::Delete, a[i])
        };
        edits.push(Edit {
            op,
            line,
            a_pos: i,
            b_pos: j,
        });
        match op {
            Op::Equal => {
                i += 1;
                j += 1;
            }
            Op::Delete => i += 1,
            Op::Insert => j += 1,
        }
    }
    edits
}

/// Group change runs into hunk index ranges, padded with context and
/// merged when closer than two context widths.
fn hunk_ranges(edits: &[Edit<'_>]) -> Vec<(usize, usize)> {
    let changes: Vec<usize> = edits
        .iter()
        .enumerate()
        .filter(|(_, e)| e.op != Op::Equal)
        .map(|(index, _)| index)
        .collect();

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &change in &changes {
        let start = change.saturating_sub(CONTEXT);
        let end = (change + CONTEXT + 1).min(edits.len());
        match ranges.last_mut() {
            Some((_, last_end)) if start <= *last_end => *last_end = end,
            _ => ranges.push((start, end)),
        }
    }
    ranges
}
