// Trie construction and perfect-hash output weight assignment.

use hashbrown::HashMap;

use crate::CompileError;
use crate::vocab::Vocab;

/// One transition of the automaton under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildArc {
    pub from: u32,
    pub iw: u32,
    pub dest: u32,
    pub ow: u32,
}

/// A compiled automaton ready for serialization: trie states with the
/// root as the initial state, arcs sorted by `(from, iw)`, accepting
/// states, and per-key info entries ordered by key.
#[derive(Debug)]
pub struct Automaton {
    pub state_count: u32,
    pub finals: Vec<u32>,
    pub arcs: Vec<BuildArc>,
    pub info: Vec<Vec<i32>>,
}

/// Encode a token into code units at `width`: UTF-8 bytes, UTF-16
/// units, or scalar values.
pub fn encode_units(token: &str, width: u8) -> Result<Vec<u32>, CompileError> {
    match width {
        1 => Ok(token.bytes().map(u32::from).collect()),
        2 => Ok(token.encode_utf16().map(u32::from).collect()),
        4 => Ok(token.chars().map(|c| c as u32).collect()),
        other => Err(CompileError::UnsupportedWidth(other)),
    }
}

struct Node {
    children: HashMap<u32, u32>,
    entry: Option<usize>,
}

impl Node {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            entry: None,
        }
    }
}

/// Build the trie automaton for `vocab` at the given code-unit width.
///
/// Output weights are assigned so that the weight sum along the path to
/// each accepting node equals that node's 0-based pre-order rank among
/// accepting nodes. Ranks are dense, so the info map is a plain array
/// indexed by key, and the key-to-index table is the identity.
pub fn build(vocab: &Vocab, width: u8) -> Result<Automaton, CompileError> {
    // Width errors surface even for an empty vocabulary.
    encode_units("", width)?;

    let mut nodes = vec![Node::new()];

    for (entry_idx, entry) in vocab.entries.iter().enumerate() {
        if entry.token.is_empty() {
            return Err(CompileError::EmptyToken);
        }
        if entry.id < 0 {
            return Err(CompileError::NegativeId {
                token: entry.token.clone(),
                id: i64::from(entry.id),
            });
        }

        let mut at = 0usize;
        for iw in encode_units(&entry.token, width)? {
            if !nodes[at].children.contains_key(&iw) {
                let next = nodes.len() as u32;
                nodes[at].children.insert(iw, next);
                nodes.push(Node::new());
            }
            at = nodes[at].children[&iw] as usize;
        }
        if nodes[at].entry.is_some() {
            return Err(CompileError::DuplicateToken(entry.token.clone()));
        }
        nodes[at].entry = Some(entry_idx);
    }

    // Pre-order pass over the trie with children in ascending symbol
    // order. `rank[v]` counts accepting nodes visited strictly before
    // `v`; the weight of an arc is then `rank[dest] - rank[from]`, and
    // every accepting path sums to its node's rank.
    let mut rank = vec![0u32; nodes.len()];
    let mut info = Vec::with_capacity(vocab.len());
    let mut order = Vec::with_capacity(nodes.len());
    let mut count = 0u32;
    let mut stack = vec![0usize];

    while let Some(v) = stack.pop() {
        order.push(v);
        rank[v] = count;
        if let Some(entry_idx) = nodes[v].entry {
            let entry = &vocab.entries[entry_idx];
            let mut values = vec![entry.id];
            if let Some(score) = entry.score {
                values.push(score);
            }
            info.push(values);
            count += 1;
        }

        let mut children: Vec<(u32, u32)> = nodes[v]
            .children
            .iter()
            .map(|(&iw, &dest)| (iw, dest))
            .collect();
        children.sort_unstable_by_key(|&(iw, _)| iw);
        for (_, c) in children.into_iter().rev() {
            stack.push(c as usize);
        }
    }

    // Renumber states in pre-order so the arc table comes out globally
    // sorted by (from, iw) and the root stays state 0.
    let mut new_id = vec![0u32; nodes.len()];
    for (i, &v) in order.iter().enumerate() {
        new_id[v] = i as u32;
    }

    let mut arcs = Vec::with_capacity(nodes.len().saturating_sub(1));
    for &v in &order {
        let mut out: Vec<(u32, u32)> = nodes[v]
            .children
            .iter()
            .map(|(&iw, &dest)| (iw, dest))
            .collect();
        out.sort_unstable_by_key(|&(iw, _)| iw);
        for (iw, dest) in out {
            arcs.push(BuildArc {
                from: new_id[v],
                iw,
                dest: new_id[dest as usize],
                ow: rank[dest as usize] - rank[v],
            });
        }
    }

    let finals = order
        .iter()
        .enumerate()
        .filter(|&(_, &v)| nodes[v].entry.is_some())
        .map(|(i, _)| i as u32)
        .collect();

    Ok(Automaton {
        state_count: nodes.len() as u32,
        finals,
        arcs,
        info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Follow `token` through the automaton's arcs, summing weights.
    fn walk(a: &Automaton, token: &str) -> Option<u32> {
        let mut state = 0u32;
        let mut sum = 0u32;
        for iw in encode_units(token, 1).unwrap() {
            let arc = a
                .arcs
                .iter()
                .find(|arc| arc.from == state && arc.iw == iw)?;
            state = arc.dest;
            sum += arc.ow;
        }
        a.finals.contains(&state).then_some(sum)
    }

    #[test]
    fn shared_prefixes_get_distinct_keys() {
        let vocab = Vocab::from_pairs([("a", 1), ("ab", 2), ("b", 3), ("abc", 4)]);
        let a = build(&vocab, 1).unwrap();

        // Pre-order over the trie: a, ab, abc, b.
        assert_eq!(walk(&a, "a"), Some(0));
        assert_eq!(walk(&a, "ab"), Some(1));
        assert_eq!(walk(&a, "abc"), Some(2));
        assert_eq!(walk(&a, "b"), Some(3));

        assert_eq!(a.info[0], vec![1]);
        assert_eq!(a.info[1], vec![2]);
        assert_eq!(a.info[2], vec![4]);
        assert_eq!(a.info[3], vec![3]);
    }

    #[test]
    fn arcs_are_sorted_by_state_and_symbol() {
        let vocab = Vocab::from_pairs([("ba", 1), ("bb", 2), ("a", 3)]);
        let a = build(&vocab, 1).unwrap();
        assert!(
            a.arcs
                .windows(2)
                .all(|w| (w[0].from, w[0].iw) < (w[1].from, w[1].iw))
        );
    }

    #[test]
    fn weights_are_nonnegative_by_construction() {
        let vocab = Vocab::from_pairs([("z", 1), ("za", 2), ("m", 3), ("a", 4)]);
        let a = build(&vocab, 1).unwrap();
        // BuildArc::ow is unsigned; the subtraction in `build` would
        // have panicked in debug if any rank went backwards.
        assert_eq!(a.info.len(), 4);
        assert_eq!(a.finals.len(), 4);
    }

    #[test]
    fn rejects_duplicate_token() {
        let vocab = Vocab::from_pairs([("a", 1), ("a", 2)]);
        let err = build(&vocab, 1).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateToken(t) if t == "a"));
    }

    #[test]
    fn rejects_empty_token() {
        let vocab = Vocab::from_pairs([("", 1)]);
        let err = build(&vocab, 1).unwrap_err();
        assert!(matches!(err, CompileError::EmptyToken));
    }

    #[test]
    fn rejects_negative_id() {
        let vocab = Vocab::from_pairs([("a", -1)]);
        let err = build(&vocab, 1).unwrap_err();
        assert!(matches!(err, CompileError::NegativeId { id: -1, .. }));
    }

    #[test]
    fn empty_vocab_is_a_single_state() {
        let a = build(&Vocab::default(), 1).unwrap();
        assert_eq!(a.state_count, 1);
        assert!(a.arcs.is_empty());
        assert!(a.finals.is_empty());
        assert!(a.info.is_empty());
    }

    #[test]
    fn encode_units_widths() {
        assert_eq!(encode_units("ab", 1).unwrap(), vec![97, 98]);
        assert_eq!(encode_units("\u{1F600}", 1).unwrap().len(), 4);
        assert_eq!(encode_units("\u{1F600}", 2).unwrap().len(), 2);
        assert_eq!(encode_units("\u{1F600}", 4).unwrap(), vec![0x1F600]);
        assert!(matches!(
            encode_units("a", 5),
            Err(CompileError::UnsupportedWidth(5))
        ));
    }
}
