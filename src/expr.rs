use crate::dictionary::{Dictionary, PostingEntry};
use crate::error::IndexError;
use crate::universe::Universe;

/// A parsed boolean query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Term(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    /// True for a bare `Not` node — the shape `And` partitions its children
    /// on to decide which side of the intersection/complement split it
    /// falls into.
    fn is_flipped(&self) -> bool {
        matches!(self, Expr::Not(_))
    }

    /// True for a `Term`, or a `Not` wrapping one — lets `And` recognize a
    /// negative primitive (`Not(Term)`) distinctly from a negated composite.
    fn is_primitive(&self) -> bool {
        match self {
            Expr::Term(_) => true,
            Expr::Not(inner) => inner.is_primitive(),
            _ => false,
        }
    }

    /// Evaluates this node to a sorted, deduplicated list of doc-ids.
    ///
    /// `forced` controls whether a `Not` materializes its universe
    /// complement (`true`, used at the query root and inside `Or`) or
    /// defers to an ancestor `And` via `is_flipped` (`false`, used for
    /// `And`'s own children).
    pub fn evaluate(
        &self,
        dict: &mut Dictionary,
        universe: &Universe,
        forced: bool,
    ) -> Result<Vec<u32>, IndexError> {
        match self {
            Expr::Term(term) => Ok(dict
                .get_postings(term)?
                .into_iter()
                .map(|e| e.doc_id)
                .collect()),
            Expr::Not(inner) => {
                let child = inner.evaluate(dict, universe, false)?;
                if forced {
                    Ok(universe.complement_of(&child))
                } else {
                    Ok(child)
                }
            }
            Expr::Or(lhs, rhs) => {
                let a = lhs.evaluate(dict, universe, true)?;
                let b = rhs.evaluate(dict, universe, true)?;
                Ok(union(&a, &b))
            }
            Expr::And(lhs, rhs) => evaluate_and(lhs, rhs, dict, universe),
        }
    }

    /// Size of this node's result set, without necessarily materializing it
    /// for `Term` (read straight from the dictionary's length field).
    pub fn get_size(&self, dict: &mut Dictionary, universe: &Universe) -> Result<usize, IndexError> {
        match self {
            Expr::Term(term) => Ok(dict.get_size(term)),
            Expr::Not(inner) => {
                let inner_size = inner.get_size(dict, universe)?;
                Ok(universe.as_set().len().saturating_sub(inner_size))
            }
            Expr::And(..) | Expr::Or(..) => Ok(self.evaluate(dict, universe, true)?.len()),
        }
    }
}

/// The child within a `Not` node — the thing whose presence/absence drives
/// the parent `And`'s positive/negative split.
fn flipped_inner(expr: &Expr) -> &Expr {
    match expr {
        Expr::Not(inner) => inner,
        other => other,
    }
}

fn evaluate_and(
    lhs: &Expr,
    rhs: &Expr,
    dict: &mut Dictionary,
    universe: &Universe,
) -> Result<Vec<u32>, IndexError> {
    let children = [lhs, rhs];
    let positives: Vec<&Expr> = children.iter().copied().filter(|c| !c.is_flipped()).collect();
    let negatives: Vec<&Expr> = children.iter().copied().filter(|c| c.is_flipped()).collect();

    if positives.is_empty() {
        let mut union_list: Vec<u32> = Vec::new();
        for neg in &negatives {
            let list = flipped_inner(neg).evaluate(dict, universe, false)?;
            union_list = union(&union_list, &list);
        }
        return Ok(universe.complement_of(&union_list));
    }

    if positives.len() == 1 && negatives.is_empty() {
        return positives[0].evaluate(dict, universe, false);
    }

    let mut prim_lists: Vec<Vec<PostingEntry>> = Vec::with_capacity(positives.len());
    for pos in &positives {
        prim_lists.push(positive_entries(pos, dict, universe)?);
    }
    prim_lists.sort_by_key(|l| l.len());

    let mut acc = prim_lists.remove(0);
    for next in prim_lists {
        acc = intersect_two(&acc, &next);
    }
    let mut result: Vec<u32> = acc.into_iter().map(|e| e.doc_id).collect();

    for neg in &negatives {
        let list = flipped_inner(neg).evaluate(dict, universe, false)?;
        result = set_difference(&result, &list);
    }

    Ok(result)
}

/// Posting entries for a positive `And` child: a `Term` reads its real
/// skip-encoded entries from disk; any composite child is evaluated in full
/// and padded with "no skip" entries.
fn positive_entries(
    expr: &Expr,
    dict: &mut Dictionary,
    universe: &Universe,
) -> Result<Vec<PostingEntry>, IndexError> {
    match expr {
        Expr::Term(term) => dict.get_postings(term),
        other => {
            let docs = other.evaluate(dict, universe, false)?;
            Ok(docs
                .into_iter()
                .map(|doc_id| PostingEntry { doc_id, next_skip: None })
                .collect())
        }
    }
}

fn skip_jump(n: usize) -> usize {
    if n == 0 {
        1
    } else {
        (n as f64).sqrt().ceil() as usize
    }
}

/// Two-pointer intersection using skip pointers where available. The
/// result entries carry no skip info of their own: a second round of
/// intersection treats this list's left-hand jumps as absent, matching
/// the rule that merged lists lose skip information after one round.
fn intersect_two(list1: &[PostingEntry], list2: &[PostingEntry]) -> Vec<PostingEntry> {
    let j1 = skip_jump(list1.len());
    let j2 = skip_jump(list2.len());
    let mut result = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < list1.len() && j < list2.len() {
        let a = list1[i];
        let b = list2[j];
        if a.doc_id == b.doc_id {
            result.push(PostingEntry { doc_id: a.doc_id, next_skip: None });
            i += 1;
            j += 1;
        } else if a.doc_id < b.doc_id {
            match a.next_skip {
                Some(skip) if skip < b.doc_id => i += j1,
                _ => i += 1,
            }
        } else {
            match b.next_skip {
                Some(skip) if skip < a.doc_id => j += j2,
                _ => j += 1,
            }
        }
    }

    result
}

fn union(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut result = Vec::with_capacity(a.len() + b.len());
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            result.push(a[i]);
            i += 1;
            j += 1;
        } else if a[i] < b[j] {
            result.push(a[i]);
            i += 1;
        } else {
            result.push(b[j]);
            j += 1;
        }
    }
    result.extend_from_slice(&a[i..]);
    result.extend_from_slice(&b[j..]);
    result
}

fn set_difference(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut result = Vec::with_capacity(a.len());
    let mut i = 0;
    let mut j = 0;
    while i < a.len() {
        if j < b.len() && a[i] == b[j] {
            i += 1;
            j += 1;
        } else if j < b.len() && b[j] < a[i] {
            j += 1;
        } else {
            result.push(a[i]);
            i += 1;
        }
    }
    result
}
