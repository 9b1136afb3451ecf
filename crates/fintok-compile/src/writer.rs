// Model container serialization.

use fintok_fst::format::{COOKIE1, COOKIE2, FsmType, HEADER_SIZE, VERSION};
use fintok_fst::transition::{MealyArc, StateSpan};

use crate::trie::Automaton;

/// Serialize an automaton into container bytes at the given code-unit
/// width. The layout matches what [`fintok_fst::Model::from_bytes`]
/// loads: header, then 8-byte-aligned finals / states / arcs / k2i /
/// info offsets / info values sections.
pub fn write_model(automaton: &Automaton, width: u8) -> Vec<u8> {
    let state_count = automaton.state_count as usize;
    let info_value_count: usize = automaton.info.iter().map(Vec::len).sum();

    let mut data = Vec::new();

    // Header.
    data.extend_from_slice(&COOKIE1.to_le_bytes());
    data.extend_from_slice(&COOKIE2.to_le_bytes());
    data.extend_from_slice(&VERSION.to_le_bytes());
    data.push(FsmType::MealyDfa as u8);
    data.push(width);
    data.extend_from_slice(&0u32.to_le_bytes()); // initial state: the trie root
    data.extend_from_slice(&automaton.state_count.to_le_bytes());
    data.extend_from_slice(&(automaton.arcs.len() as u32).to_le_bytes());
    data.extend_from_slice(&(automaton.info.len() as u32).to_le_bytes()); // k2i: identity
    data.extend_from_slice(&(automaton.info.len() as u32).to_le_bytes());
    data.extend_from_slice(&(info_value_count as u32).to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes()); // reserved
    debug_assert_eq!(data.len(), HEADER_SIZE);

    // Finals bitset.
    pad8(&mut data);
    let mut words = vec![0u64; state_count.div_ceil(64)];
    for &s in &automaton.finals {
        words[(s / 64) as usize] |= 1 << (s % 64);
    }
    for w in &words {
        data.extend_from_slice(&w.to_le_bytes());
    }

    // State spans over the (from, iw)-sorted arc table.
    pad8(&mut data);
    let mut spans = vec![
        StateSpan {
            first_arc: 0,
            arc_count: 0
        };
        state_count
    ];
    for (i, arc) in automaton.arcs.iter().enumerate() {
        let span = &mut spans[arc.from as usize];
        if span.arc_count == 0 {
            span.first_arc = i as u32;
        }
        span.arc_count += 1;
    }
    for span in &spans {
        data.extend_from_slice(bytemuck::bytes_of(span));
    }

    // Arc table.
    pad8(&mut data);
    for arc in &automaton.arcs {
        let row = MealyArc {
            iw: arc.iw,
            dest: arc.dest,
            ow: arc.ow,
        };
        data.extend_from_slice(bytemuck::bytes_of(&row));
    }

    // Key-to-index table: the identity over the info entries.
    pad8(&mut data);
    for i in 0..automaton.info.len() as i32 {
        data.extend_from_slice(&i.to_le_bytes());
    }

    // Info offsets and values.
    pad8(&mut data);
    let mut offset = 0u32;
    data.extend_from_slice(&offset.to_le_bytes());
    for entry in &automaton.info {
        offset += entry.len() as u32;
        data.extend_from_slice(&offset.to_le_bytes());
    }

    pad8(&mut data);
    for entry in &automaton.info {
        for &v in entry {
            data.extend_from_slice(&v.to_le_bytes());
        }
    }

    data
}

fn pad8(data: &mut Vec<u8>) {
    while data.len() % 8 != 0 {
        data.push(0);
    }
}
