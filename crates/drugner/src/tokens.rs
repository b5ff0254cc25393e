//! The drug FSM token sum type: raw sentence tokens plus the typed outputs
//! of prior machines.

use annot::{HasSpan, Span, Token};
use fsm::TokenView;

/// Route of administration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Topical,
    Oral,
    Gastric,
    Rectal,
    Intravenous,
    Transdermal,
}

impl FormMethod {
    pub fn label(self) -> &'static str {
        match self {
            FormMethod::Topical => "Topical",
            FormMethod::Oral => "Enteral_Oral",
            FormMethod::Gastric => "Enteral_Gastric",
            FormMethod::Rectal => "Enteral_Rectal",
            FormMethod::Intravenous => "Parenteral_Intravenous",
            FormMethod::Transdermal => "Parenteral_Transdermal",
        }
    }
}

/// Medication change status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrugChangeStatus {
    Start,
    Stop,
    IncreaseFrom,
    DecreaseFrom,
    Increase,
    Decrease,
    NoChange,
    Other,
    Sum,
    Max,
}

impl DrugChangeStatus {
    pub fn label(self) -> &'static str {
        match self {
            DrugChangeStatus::Start => "start",
            DrugChangeStatus::Stop => "stop",
            DrugChangeStatus::IncreaseFrom => "increasefrom",
            DrugChangeStatus::DecreaseFrom => "decreasefrom",
            DrugChangeStatus::Increase => "increase",
            DrugChangeStatus::Decrease => "decrease",
            DrugChangeStatus::NoChange => "noChange",
            DrugChangeStatus::Other => "change",
            DrugChangeStatus::Sum => "add",
            DrugChangeStatus::Max => "max imum",
        }
    }
}

/// Sub-section the drug mention sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubSectionStatus {
    Confirmed,
    History,
    FamilyHistory,
    Probable,
}

/// Frequency-unit quantity: doses per day, with sub-daily rates as
/// fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyQuantity {
    Prn,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Twelve,
    TwentyFour,
    Weekly,
    Biweekly,
    Monthly,
    EveryOtherDay,
    Yearly,
}

impl FrequencyQuantity {
    pub fn value(self) -> &'static str {
        match self {
            FrequencyQuantity::Prn => "0.0",
            FrequencyQuantity::One => "1.0",
            FrequencyQuantity::Two => "2.0",
            FrequencyQuantity::Three => "3.0",
            FrequencyQuantity::Four => "4.0",
            FrequencyQuantity::Five => "5.0",
            FrequencyQuantity::Six => "6.0",
            FrequencyQuantity::Twelve => "12.0",
            FrequencyQuantity::TwentyFour => "24.0",
            FrequencyQuantity::Weekly => "0.14",
            FrequencyQuantity::Biweekly => "0.07",
            FrequencyQuantity::Monthly => "0.03",
            FrequencyQuantity::EveryOtherDay => "0.5",
            FrequencyQuantity::Yearly => "0.003",
        }
    }
}

/// What an FSM produced over a span.
#[derive(Debug, Clone, PartialEq)]
pub enum OutKind {
    FractionStrength,
    RangeStrength,
    Range,
    Strength,
    StrengthUnit,
    StrengthUnitCombined,
    FrequencyUnit(FrequencyQuantity),
    Frequency(String),
    Route(FormMethod),
    Form,
    Dosage,
    Duration,
    SuffixStrength,
    DecimalStrength,
    ChangeStatus(DrugChangeStatus),
    Time,
    SubSection(SubSectionStatus),
}

/// An FSM output token.
#[derive(Debug, Clone)]
pub struct DrugOut {
    pub span: Span,
    pub kind: OutKind,
}

impl HasSpan for DrugOut {
    fn span(&self) -> &Span {
        &self.span
    }
}

/// Input token for the drug machines: a raw sentence token or a prior
/// machine's output.
#[derive(Debug, Clone)]
pub enum DrugTok {
    Raw(Token),
    Out(DrugOut),
}

impl DrugTok {
    pub fn from_tokens(tokens: &[Token]) -> Vec<DrugTok> {
        tokens.iter().cloned().map(DrugTok::Raw).collect()
    }

    pub fn from_outs(outs: &[DrugOut]) -> Vec<DrugTok> {
        outs.iter().cloned().map(DrugTok::Out).collect()
    }

    pub fn out_kind(&self) -> Option<&OutKind> {
        match self {
            DrugTok::Raw(_) => None,
            DrugTok::Out(out) => Some(&out.kind),
        }
    }
}

impl HasSpan for DrugTok {
    fn span(&self) -> &Span {
        match self {
            DrugTok::Raw(token) => &token.span,
            DrugTok::Out(out) => &out.span,
        }
    }
}

impl TokenView for DrugTok {
    fn is_word(&self) -> bool {
        matches!(self, DrugTok::Raw(token) if token.is_word)
    }
    fn is_number(&self) -> bool {
        matches!(self, DrugTok::Raw(token) if token.is_number)
    }
    fn is_punct(&self) -> bool {
        matches!(self, DrugTok::Raw(token) if token.is_punct)
    }
    fn is_newline(&self) -> bool {
        matches!(self, DrugTok::Raw(token) if token.is_newline)
    }
    fn is_raw_token(&self) -> bool {
        matches!(self, DrugTok::Raw(_))
    }
}

/// Variant-membership conditions, the sum-type replacement for the original
/// per-type assertions.
pub mod variant {
    use std::sync::Arc;

    use fsm::Cond;

    use super::{DrugTok, OutKind};

    fn kind_is(test: fn(&OutKind) -> bool) -> Cond<DrugTok> {
        Arc::new(move |tok: &DrugTok| tok.out_kind().map(test).unwrap_or(false))
    }

    pub fn fraction_strength() -> Cond<DrugTok> {
        kind_is(|kind| matches!(kind, OutKind::FractionStrength))
    }
    pub fn range_strength() -> Cond<DrugTok> {
        kind_is(|kind| matches!(kind, OutKind::RangeStrength))
    }
    pub fn range() -> Cond<DrugTok> {
        kind_is(|kind| matches!(kind, OutKind::Range))
    }
    pub fn strength() -> Cond<DrugTok> {
        kind_is(|kind| matches!(kind, OutKind::Strength))
    }
    pub fn strength_unit() -> Cond<DrugTok> {
        kind_is(|kind| matches!(kind, OutKind::StrengthUnit))
    }
    pub fn strength_unit_combined() -> Cond<DrugTok> {
        kind_is(|kind| matches!(kind, OutKind::StrengthUnitCombined))
    }
    pub fn frequency_unit() -> Cond<DrugTok> {
        kind_is(|kind| matches!(kind, OutKind::FrequencyUnit(_)))
    }
    pub fn route() -> Cond<DrugTok> {
        kind_is(|kind| matches!(kind, OutKind::Route(_)))
    }
    pub fn form() -> Cond<DrugTok> {
        kind_is(|kind| matches!(kind, OutKind::Form))
    }
    pub fn time() -> Cond<DrugTok> {
        kind_is(|kind| matches!(kind, OutKind::Time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annot::istr;

    #[test]
    fn labels_are_the_wire_values() {
        assert_eq!(FormMethod::Oral.label(), "Enteral_Oral");
        assert_eq!(FormMethod::Transdermal.label(), "Parenteral_Transdermal");
        assert_eq!(DrugChangeStatus::NoChange.label(), "noChange");
        assert_eq!(DrugChangeStatus::Max.label(), "max imum");
        assert_eq!(FrequencyQuantity::One.value(), "1.0");
        assert_eq!(FrequencyQuantity::Weekly.value(), "0.14");
        assert_eq!(FrequencyQuantity::Prn.value(), "0.0");
    }

    #[test]
    fn variant_conditions_ignore_raw_tokens() {
        let raw = DrugTok::Raw(Token::new(Span::new(0, 2, istr("mg"))));
        let out = DrugTok::Out(DrugOut {
            span: Span::new(0, 2, istr("mg")),
            kind: OutKind::StrengthUnit,
        });
        assert!(!variant::strength_unit()(&raw));
        assert!(variant::strength_unit()(&out));
        assert!(!variant::strength_unit_combined()(&out));
    }
}
