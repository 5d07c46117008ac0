//! Character-level diff for intra-line highlighting.
//!
//! The raw alignment is a character Myers diff from `similar`. Raw character
//! diffs are noisy ("c<del>a</del><ins>o</ins>t" style fragments scattered
//! across a word), so the result goes through the same cleanup passes as
//! Neil Fraser's diff-match-patch:
//!
//! 1. merge: coalesce runs and factor shared prefixes/suffixes out of edits;
//! 2. semantic: fold short equalities that are dwarfed by the edits around
//!    them into those edits;
//! 3. lossless: slide single edits sideways onto word and line boundaries;
//! 4. overlap: pull a shared overlap between a deletion and an insertion out
//!    as an equality.
//!
//! None of the passes change the text reconstructed from either side.

use std::time::{Duration, Instant};

use similar::{capture_diff_slices_deadline, Algorithm, DiffTag};

/// Time allowed for one character alignment.
pub const CHAR_DIFF_TIMEOUT: Duration = Duration::from_secs(1);

/// The operation carried by one fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InlineOp {
    Equal,
    Delete,
    Insert,
}

/// A run of text with a single operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    pub op: InlineOp,
    pub text: String,
}

impl Fragment {
    pub fn new(op: InlineOp, text: impl Into<String>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }
}

/// Concatenate the equal and deleted fragments (the old string).
pub fn old_text(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .filter(|f| f.op != InlineOp::Insert)
        .map(|f| f.text.as_str())
        .collect()
}

/// Concatenate the equal and inserted fragments (the new string).
pub fn new_text(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .filter(|f| f.op != InlineOp::Delete)
        .map(|f| f.text.as_str())
        .collect()
}

type Chunk = (InlineOp, Vec<char>);

/// Diff two strings character by character, with semantic cleanup.
///
/// The result never contains empty fragments or two adjacent fragments with
/// the same operation. Alignment stops refining after [`CHAR_DIFF_TIMEOUT`].
pub fn diff_chars(a: &str, b: &str) -> Vec<Fragment> {
    let old: Vec<char> = a.chars().collect();
    let new: Vec<char> = b.chars().collect();

    let deadline = Some(Instant::now() + CHAR_DIFF_TIMEOUT);
    let mut chunks: Vec<Chunk> = Vec::new();
    for op in capture_diff_slices_deadline(Algorithm::Myers, &old, &new, deadline) {
        let (tag, o, n) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => chunks.push((InlineOp::Equal, old[o].to_vec())),
            DiffTag::Delete => chunks.push((InlineOp::Delete, old[o].to_vec())),
            DiffTag::Insert => chunks.push((InlineOp::Insert, new[n].to_vec())),
            DiffTag::Replace => {
                chunks.push((InlineOp::Delete, old[o].to_vec()));
                chunks.push((InlineOp::Insert, new[n].to_vec()));
            }
        }
    }

    cleanup_merge(&mut chunks);
    cleanup_semantic(&mut chunks);
    into_fragments(chunks)
}

/// Drop empty chunks and fuse neighbours that ended up with the same op.
fn into_fragments(chunks: Vec<Chunk>) -> Vec<Fragment> {
    let mut out: Vec<Fragment> = Vec::with_capacity(chunks.len());
    for (op, text) in chunks {
        if text.is_empty() {
            continue;
        }
        let text: String = text.into_iter().collect();
        match out.last_mut() {
            Some(last) if last.op == op => last.text.push_str(&text),
            _ => out.push(Fragment { op, text }),
        }
    }
    out
}

fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Length of the longest suffix of `a` that is also a prefix of `b`.
fn common_overlap(a: &[char], b: &[char]) -> usize {
    let max = a.len().min(b.len());
    (1..=max)
        .rev()
        .find(|&k| a[a.len() - k..] == b[..k])
        .unwrap_or(0)
}

fn concat(a: &[char], b: &[char]) -> Vec<char> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

/// Coalesce edit runs into at most one delete followed by one insert,
/// factor shared prefixes and suffixes into the surrounding equalities,
/// then shift single edits over neighbouring equalities where that removes
/// an equality.
fn cleanup_merge(chunks: &mut Vec<Chunk>) {
    chunks.push((InlineOp::Equal, Vec::new()));
    let mut pointer = 0usize;
    let mut count_delete = 0usize;
    let mut count_insert = 0usize;
    let mut text_delete: Vec<char> = Vec::new();
    let mut text_insert: Vec<char> = Vec::new();

    while pointer < chunks.len() {
        match chunks[pointer].0 {
            InlineOp::Insert => {
                count_insert += 1;
                text_insert.extend_from_slice(&chunks[pointer].1);
                pointer += 1;
            }
            InlineOp::Delete => {
                count_delete += 1;
                text_delete.extend_from_slice(&chunks[pointer].1);
                pointer += 1;
            }
            InlineOp::Equal => {
                if count_delete + count_insert > 1 {
                    if count_delete != 0 && count_insert != 0 {
                        let common = common_prefix(&text_insert, &text_delete);
                        if common != 0 {
                            let prefix = text_insert[..common].to_vec();
                            let run_start = pointer - count_delete - count_insert;
                            if run_start > 0 && chunks[run_start - 1].0 == InlineOp::Equal {
                                chunks[run_start - 1].1.extend(prefix);
                            } else {
                                chunks.insert(0, (InlineOp::Equal, prefix));
                                pointer += 1;
                            }
                            text_insert.drain(..common);
                            text_delete.drain(..common);
                        }
                        let common = common_suffix(&text_insert, &text_delete);
                        if common != 0 {
                            let suffix = &text_insert[text_insert.len() - common..];
                            chunks[pointer].1 = concat(suffix, &chunks[pointer].1);
                            text_insert.truncate(text_insert.len() - common);
                            text_delete.truncate(text_delete.len() - common);
                        }
                    }
                    let mut merged: Vec<Chunk> = Vec::with_capacity(2);
                    if !text_delete.is_empty() {
                        merged.push((InlineOp::Delete, std::mem::take(&mut text_delete)));
                    }
                    if !text_insert.is_empty() {
                        merged.push((InlineOp::Insert, std::mem::take(&mut text_insert)));
                    }
                    pointer -= count_delete + count_insert;
                    let width = merged.len();
                    chunks.splice(pointer..pointer + count_delete + count_insert, merged);
                    pointer += width + 1;
                } else if pointer != 0 && chunks[pointer - 1].0 == InlineOp::Equal {
                    let text = std::mem::take(&mut chunks[pointer].1);
                    chunks[pointer - 1].1.extend(text);
                    chunks.remove(pointer);
                } else {
                    pointer += 1;
                }
                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
    }
    if chunks.last().is_some_and(|c| c.1.is_empty()) {
        chunks.pop();
    }

    // Second pass: A<ins>BA</ins>C -> <ins>AB</ins>AC
    let mut changes = false;
    let mut pointer = 1usize;
    while pointer + 1 < chunks.len() {
        if chunks[pointer - 1].0 == InlineOp::Equal && chunks[pointer + 1].0 == InlineOp::Equal {
            let prev = chunks[pointer - 1].1.clone();
            let edit = chunks[pointer].1.clone();
            let next = chunks[pointer + 1].1.clone();
            if edit.ends_with(&prev) {
                if !prev.is_empty() {
                    chunks[pointer].1 = concat(&prev, &edit[..edit.len() - prev.len()]);
                    chunks[pointer + 1].1 = concat(&prev, &next);
                }
                chunks.remove(pointer - 1);
                changes = true;
            } else if edit.starts_with(&next) {
                chunks[pointer - 1].1.extend_from_slice(&next);
                chunks[pointer].1 = concat(&edit[next.len()..], &next);
                chunks.remove(pointer + 1);
                changes = true;
            }
        }
        pointer += 1;
    }
    if changes {
        cleanup_merge(chunks);
    }
}

/// Eliminate equalities that are no longer than the edits on both sides,
/// then align edits to semantic boundaries and extract overlaps.
fn cleanup_semantic(chunks: &mut Vec<Chunk>) {
    let mut changes = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<Vec<char>> = None;
    let mut pointer: isize = 0;
    // Edit lengths before (1) and after (2) the last equality.
    let (mut ins1, mut del1, mut ins2, mut del2) = (0usize, 0usize, 0usize, 0usize);

    while (pointer as usize) < chunks.len() {
        let p = pointer as usize;
        if chunks[p].0 == InlineOp::Equal {
            equalities.push(p);
            ins1 = ins2;
            del1 = del2;
            ins2 = 0;
            del2 = 0;
            last_equality = Some(chunks[p].1.clone());
        } else {
            if chunks[p].0 == InlineOp::Insert {
                ins2 += chunks[p].1.len();
            } else {
                del2 += chunks[p].1.len();
            }
            let eliminate = match (&last_equality, equalities.last()) {
                (Some(eq), Some(&at))
                    if !eq.is_empty()
                        && eq.len() <= ins1.max(del1)
                        && eq.len() <= ins2.max(del2) =>
                {
                    Some((at, eq.clone()))
                }
                _ => None,
            };
            if let Some((at, text)) = eliminate {
                chunks.insert(at, (InlineOp::Delete, text));
                chunks[at + 1].0 = InlineOp::Insert;
                equalities.pop();
                equalities.pop();
                pointer = equalities.last().map_or(-1, |&i| i as isize);
                ins1 = 0;
                del1 = 0;
                ins2 = 0;
                del2 = 0;
                last_equality = None;
                changes = true;
            }
        }
        pointer += 1;
    }

    if changes {
        cleanup_merge(chunks);
    }
    cleanup_semantic_lossless(chunks);

    // <del>abcxxx</del><ins>xxxdef</ins> -> <del>abc</del>xxx<ins>def</ins>
    // <del>xxxabc</del><ins>defxxx</ins> -> <ins>def</ins>xxx<del>abc</del>
    let mut pointer = 1usize;
    while pointer < chunks.len() {
        if chunks[pointer - 1].0 == InlineOp::Delete && chunks[pointer].0 == InlineOp::Insert {
            let deletion = chunks[pointer - 1].1.clone();
            let insertion = chunks[pointer].1.clone();
            let forward = common_overlap(&deletion, &insertion);
            let reverse = common_overlap(&insertion, &deletion);
            if forward >= reverse {
                if forward * 2 >= deletion.len() || forward * 2 >= insertion.len() {
                    chunks.insert(pointer, (InlineOp::Equal, insertion[..forward].to_vec()));
                    chunks[pointer - 1].1 = deletion[..deletion.len() - forward].to_vec();
                    chunks[pointer + 1].1 = insertion[forward..].to_vec();
                    pointer += 1;
                }
            } else if reverse * 2 >= deletion.len() || reverse * 2 >= insertion.len() {
                chunks.insert(pointer, (InlineOp::Equal, deletion[..reverse].to_vec()));
                chunks[pointer - 1] = (
                    InlineOp::Insert,
                    insertion[..insertion.len() - reverse].to_vec(),
                );
                chunks[pointer + 1] = (InlineOp::Delete, deletion[reverse..].to_vec());
                pointer += 1;
            }
            pointer += 1;
        }
        pointer += 1;
    }
}

/// Slide single edits surrounded by equalities to the position whose
/// boundaries score best (blank line > line break > end of sentence >
/// whitespace > punctuation > mid-word).
fn cleanup_semantic_lossless(chunks: &mut Vec<Chunk>) {
    let mut pointer = 1usize;
    while pointer + 1 < chunks.len() {
        if chunks[pointer - 1].0 == InlineOp::Equal && chunks[pointer + 1].0 == InlineOp::Equal {
            let mut equality1 = chunks[pointer - 1].1.clone();
            let mut edit = chunks[pointer].1.clone();
            let mut equality2 = chunks[pointer + 1].1.clone();

            // Shift the edit as far left as possible.
            let offset = common_suffix(&equality1, &edit);
            if offset > 0 {
                let common = edit[edit.len() - offset..].to_vec();
                equality1.truncate(equality1.len() - offset);
                edit = concat(&common, &edit[..edit.len() - offset]);
                equality2 = concat(&common, &equality2);
            }

            // Step right one character at a time, keeping the best fit.
            let mut best_equality1 = equality1.clone();
            let mut best_edit = edit.clone();
            let mut best_equality2 = equality2.clone();
            let mut best_score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
            while !edit.is_empty() && !equality2.is_empty() && edit[0] == equality2[0] {
                equality1.push(edit.remove(0));
                edit.push(equality2.remove(0));
                let score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
                // >= prefers trailing over leading whitespace on edits.
                if score >= best_score {
                    best_score = score;
                    best_equality1 = equality1.clone();
                    best_edit = edit.clone();
                    best_equality2 = equality2.clone();
                }
            }

            if chunks[pointer - 1].1 != best_equality1 {
                if best_equality1.is_empty() {
                    chunks.remove(pointer - 1);
                    pointer = pointer.saturating_sub(1);
                } else {
                    chunks[pointer - 1].1 = best_equality1;
                }
                chunks[pointer].1 = best_edit;
                if best_equality2.is_empty() {
                    chunks.remove(pointer + 1);
                    pointer = pointer.saturating_sub(1);
                } else {
                    chunks[pointer + 1].1 = best_equality2;
                }
            }
        }
        pointer += 1;
    }
}

/// Score how natural the boundary between `one` and `two` is, from 6 (edge
/// of the text) down to 0 (inside a word).
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
        return 6;
    };
    let non_alnum1 = !c1.is_alphanumeric();
    let non_alnum2 = !c2.is_alphanumeric();
    let space1 = non_alnum1 && c1.is_whitespace();
    let space2 = non_alnum2 && c2.is_whitespace();
    let break1 = space1 && (c1 == '\r' || c1 == '\n');
    let break2 = space2 && (c2 == '\r' || c2 == '\n');
    let blank1 = break1 && ends_with_blank_line(one);
    let blank2 = break2 && starts_with_blank_line(two);

    if blank1 || blank2 {
        5
    } else if break1 || break2 {
        4
    } else if non_alnum1 && !space1 && space2 {
        3
    } else if space1 || space2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

fn ends_with_blank_line(text: &[char]) -> bool {
    text.ends_with(&['\n', '\n']) || text.ends_with(&['\n', '\r', '\n'])
}

fn starts_with_blank_line(text: &[char]) -> bool {
    let rest = text.strip_prefix(&['\r']).unwrap_or(text);
    let Some(rest) = rest.strip_prefix(&['\n']) else {
        return false;
    };
    let rest = rest.strip_prefix(&['\r']).unwrap_or(rest);
    rest.starts_with(&['\n'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chunks(spec: &[(InlineOp, &str)]) -> Vec<Chunk> {
        spec.iter().map(|(op, s)| (*op, s.chars().collect())).collect()
    }

    fn frags(spec: &[(InlineOp, &str)]) -> Vec<Fragment> {
        spec.iter().map(|(op, s)| Fragment::new(*op, *s)).collect()
    }

    use InlineOp::{Delete as D, Equal as E, Insert as I};

    #[test]
    fn identical_strings() {
        assert_eq!(diff_chars("abc", "abc"), frags(&[(E, "abc")]));
    }

    #[test]
    fn empty_inputs() {
        assert!(diff_chars("", "").is_empty());
        assert_eq!(diff_chars("", "xy"), frags(&[(I, "xy")]));
        assert_eq!(diff_chars("xy", ""), frags(&[(D, "xy")]));
    }

    #[test]
    fn single_character_change() {
        assert_eq!(
            diff_chars("x = 1", "x = 2"),
            frags(&[(E, "x = "), (D, "1"), (I, "2")])
        );
    }

    #[test]
    fn word_insertion_lands_on_word_boundary() {
        assert_eq!(
            diff_chars("hello world", "hello there world"),
            frags(&[(E, "hello "), (I, "there "), (E, "world")])
        );
    }

    #[test]
    fn deterministic() {
        let a = "the quick brown fox jumps";
        let b = "the quack brown box jumped";
        assert_eq!(diff_chars(a, b), diff_chars(a, b));
    }

    #[test]
    fn merge_coalesces_runs() {
        let mut c = chunks(&[(D, "a"), (I, "b"), (D, "c"), (I, "d"), (E, "e"), (E, "f")]);
        cleanup_merge(&mut c);
        assert_eq!(c, chunks(&[(D, "ac"), (I, "bd"), (E, "ef")]));
    }

    #[test]
    fn merge_factors_prefix_and_suffix() {
        let mut c = chunks(&[(E, "x"), (D, "abc"), (I, "abd"), (E, "y")]);
        cleanup_merge(&mut c);
        assert_eq!(c, chunks(&[(E, "xab"), (D, "c"), (I, "d"), (E, "y")]));
    }

    #[test]
    fn merge_shifts_edit_left() {
        let mut c = chunks(&[(E, "a"), (I, "ba"), (E, "c")]);
        cleanup_merge(&mut c);
        assert_eq!(c, chunks(&[(I, "ab"), (E, "ac")]));
    }

    #[test]
    fn semantic_simple_elimination() {
        let mut c = chunks(&[(D, "a"), (E, "b"), (D, "c")]);
        cleanup_semantic(&mut c);
        assert_eq!(c, chunks(&[(D, "abc"), (I, "b")]));
    }

    #[test]
    fn semantic_backpass_elimination() {
        let mut c = chunks(&[(D, "ab"), (E, "cd"), (D, "e"), (E, "f"), (I, "g")]);
        cleanup_semantic(&mut c);
        assert_eq!(c, chunks(&[(D, "abcdef"), (I, "cdfg")]));
    }

    #[test]
    fn semantic_keeps_long_equalities() {
        let mut c = chunks(&[(D, "ab"), (I, "cd"), (E, "12"), (D, "e")]);
        cleanup_semantic(&mut c);
        assert_eq!(c, chunks(&[(D, "ab"), (I, "cd"), (E, "12"), (D, "e")]));
    }

    #[test]
    fn lossless_prefers_word_boundaries() {
        let mut c = chunks(&[(E, "The c"), (I, "ow and the c"), (E, "at.")]);
        cleanup_semantic_lossless(&mut c);
        assert_eq!(c, chunks(&[(E, "The "), (I, "cow and the "), (E, "cat.")]));
    }

    #[test]
    fn overlap_is_extracted() {
        let mut c = chunks(&[(D, "abcxxx"), (I, "xxxdef")]);
        cleanup_semantic(&mut c);
        assert_eq!(c, chunks(&[(D, "abc"), (E, "xxx"), (I, "def")]));
    }

    #[test]
    fn reverse_overlap_is_extracted() {
        let mut c = chunks(&[(D, "xxxabc"), (I, "defxxx")]);
        cleanup_semantic(&mut c);
        assert_eq!(c, chunks(&[(I, "def"), (E, "xxx"), (D, "abc")]));
    }

    #[test]
    fn boundary_scores() {
        let s = |x: &str| x.chars().collect::<Vec<_>>();
        assert_eq!(boundary_score(&s(""), &s("a")), 6);
        assert_eq!(boundary_score(&s("a\n\n"), &s("b")), 5);
        assert_eq!(boundary_score(&s("a\n"), &s("b")), 4);
        assert_eq!(boundary_score(&s("a."), &s(" b")), 3);
        assert_eq!(boundary_score(&s("a "), &s("b")), 2);
        assert_eq!(boundary_score(&s("a("), &s("b")), 1);
        assert_eq!(boundary_score(&s("a"), &s("b")), 0);
    }

    #[test]
    fn long_unrelated_lines_round_trip() {
        let a: String = (0..20_000u32)
            .map(|i| char::from(b'a' + (i * 7 % 26) as u8))
            .collect();
        let b: String = (0..20_000u32)
            .map(|i| char::from(b'A' + (i * 11 % 26) as u8))
            .collect();
        let fragments = diff_chars(&a, &b);
        assert_eq!(old_text(&fragments), a);
        assert_eq!(new_text(&fragments), b);
    }

    proptest! {
        #[test]
        fn round_trips_both_sides(a in "[ab .\n]{0,24}", b in "[ab .\n]{0,24}") {
            let fragments = diff_chars(&a, &b);
            prop_assert_eq!(old_text(&fragments), a);
            prop_assert_eq!(new_text(&fragments), b);
        }

        #[test]
        fn never_emits_empty_or_repeated_fragments(a in "[a-d ]{0,20}", b in "[a-d ]{0,20}") {
            let fragments = diff_chars(&a, &b);
            prop_assert!(fragments.iter().all(|f| !f.text.is_empty()));
            for pair in fragments.windows(2) {
                prop_assert_ne!(pair[0].op, pair[1].op);
            }
        }

        #[test]
        fn unicode_round_trips(a in "\\PC{0,12}", b in "\\PC{0,12}") {
            let fragments = diff_chars(&a, &b);
            prop_assert_eq!(old_text(&fragments), a);
            prop_assert_eq!(new_text(&fragments), b);
        }
    }
}
