//! The four negation machines.

use annot::Token;
use fsm::conditions as cond;
use fsm::{rule, Machine, END, NT_END, START};

use crate::sets;

const REG_MODAL: fsm::State = "REG_MODAL";
const NEG_PART: fsm::State = "NEG_PART";
const NEG_VERB: fsm::State = "NEG_VERB";
const NEG_COLLOC: fsm::State = "NEG_COLLOC";
const NEG_COLPART: fsm::State = "NEG_COLPART";
const ANY_STATE: fsm::State = "ANY";
const NEG_PREP: fsm::State = "NEG_PREP";
const NEG_DET: fsm::State = "NEG_DET";
const REG_NOUN: fsm::State = "REG_NOUN";
const NEG_ADJ: fsm::State = "NEG_ADJ";
const REG_PREP: fsm::State = "REG_PREP";

/// Modals and negation particles, plus `rule out` collocations.
pub fn aspectual_machine() -> Machine<Token> {
    let reg_modal = cond::word_set(sets::modal_verbs());
    let neg_part = cond::word_set(sets::neg_particles());
    let reg_verb = cond::word_set(sets::reg_verbs());
    let neg_verb = cond::word_set(sets::neg_verbs());
    let neg_det = cond::word_set(sets::neg_determiners());
    let neg_colloc = cond::word_set(sets::neg_colloc());
    let neg_col_part = cond::word_set(sets::neg_col_part());
    let not_colloc = cond::negate(neg_colloc.clone());
    let part_or_det = cond::disjoint(vec![neg_part, neg_det]);

    Machine::new(vec![
        (
            START,
            vec![
                rule(neg_verb, NEG_VERB),
                rule(neg_colloc.clone(), NEG_COLLOC),
                rule(cond::disjoint(vec![reg_modal, reg_verb]), REG_MODAL),
                rule(part_or_det.clone(), NEG_PART),
                rule(cond::any(), START),
            ],
        ),
        (
            REG_MODAL,
            vec![
                rule(neg_colloc, NEG_COLLOC),
                rule(part_or_det.clone(), NEG_PART),
                rule(cond::any(), ANY_STATE),
            ],
        ),
        (
            NEG_COLLOC,
            vec![rule(neg_col_part, NEG_COLPART), rule(cond::any(), START)],
        ),
        (NEG_COLPART, vec![rule(cond::any(), NT_END)]),
        (
            ANY_STATE,
            vec![rule(part_or_det, NEG_PART), rule(cond::any(), START)],
        ),
        (
            NEG_PART,
            vec![rule(not_colloc.clone(), NT_END), rule(cond::any(), START)],
        ),
        (
            NEG_VERB,
            vec![rule(not_colloc, NT_END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
        (NT_END, vec![rule(cond::any(), END)]),
    ])
}

/// Negative prepositions/determiners plus clinical nouns (`no evidence`).
pub fn nominal_machine() -> Machine<Token> {
    let neg_prep = cond::word_set(sets::neg_prepositions());
    let neg_det = cond::word_set(sets::neg_determiners());
    let reg_noun = cond::word_set(sets::reg_nouns());

    Machine::new(vec![
        (
            START,
            vec![
                rule(neg_det, NEG_DET),
                rule(neg_prep, NEG_PREP),
                rule(cond::any(), START),
            ],
        ),
        (NEG_PREP, vec![rule(cond::any(), NT_END)]),
        (
            NEG_DET,
            vec![rule(reg_noun, REG_NOUN), rule(cond::any(), NT_END)],
        ),
        (REG_NOUN, vec![rule(cond::any(), NT_END)]),
        (NT_END, vec![rule(cond::any(), END)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

/// Negative adjective followed by a preposition (`negative for`).
pub fn adjectival_machine() -> Machine<Token> {
    let reg_prep = cond::word_set(sets::neg_prepositions());
    let neg_adj = cond::word_set(sets::neg_adjectives());

    Machine::new(vec![
        (
            START,
            vec![rule(neg_adj, NEG_ADJ), rule(cond::any(), START)],
        ),
        (
            NEG_ADJ,
            vec![rule(reg_prep, REG_PREP), rule(cond::any(), START)],
        ),
        (REG_PREP, vec![rule(cond::any(), NT_END)]),
        (END, vec![rule(cond::any(), START)]),
        (NT_END, vec![rule(cond::any(), END)]),
    ])
}

/// Bare negative adjective anywhere in the window.
pub fn correction_adjectival_machine() -> Machine<Token> {
    let neg_adj = cond::word_set(sets::neg_adjectives());

    Machine::new(vec![
        (
            START,
            vec![rule(neg_adj, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}
