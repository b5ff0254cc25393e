//! The drug FSM battery: machine definitions and the per-sentence runner.

mod dosage;
mod frequency;
mod misc;
mod strength;

use annot::{istr, HasSpan, Sentence, Span};
use fsm::driver::Emission;
use fsm::{run_machines, ExitSpec, FsmError, Machine};

use crate::params::DrugFsmParams;
use crate::tokens::{DrugOut, DrugTok, OutKind};

/// All machines, built once from the word-set parameters.
pub struct FsmBattery {
    fraction: Vec<Machine<DrugTok>>,
    range: Vec<Machine<DrugTok>>,
    decimal: Vec<Machine<DrugTok>>,
    suffix: Vec<Machine<DrugTok>>,
    strength_unit: Vec<Machine<DrugTok>>,
    strength: Vec<Machine<DrugTok>>,
    dosage: Vec<Machine<DrugTok>>,
    form: Vec<Machine<DrugTok>>,
    route: Vec<Machine<DrugTok>>,
    frequency_unit: Vec<Machine<DrugTok>>,
    frequency: Vec<Machine<DrugTok>>,
    duration: Vec<Machine<DrugTok>>,
    time: Vec<Machine<DrugTok>>,
    change_status: Vec<Machine<DrugTok>>,
    subsection: Vec<Machine<DrugTok>>,
    frequency_words: crate::params::FrequencyParams,
}

/// Sorted outputs of one sentence run.
#[derive(Default)]
pub struct FsmResults {
    pub fractions: Vec<DrugOut>,
    pub ranges: Vec<DrugOut>,
    pub dosages: Vec<DrugOut>,
    pub suffixes: Vec<DrugOut>,
    pub durations: Vec<DrugOut>,
    pub routes: Vec<DrugOut>,
    pub frequencies: Vec<DrugOut>,
    pub statuses: Vec<DrugOut>,
    pub decimals: Vec<DrugOut>,
    pub strengths: Vec<DrugOut>,
    pub strength_units: Vec<DrugOut>,
    pub frequency_units: Vec<DrugOut>,
    pub forms: Vec<DrugOut>,
    pub subsections: Vec<DrugOut>,
    pub times: Vec<DrugOut>,
}

impl FsmResults {
    fn sort(&mut self) {
        for outs in [
            &mut self.fractions,
            &mut self.ranges,
            &mut self.dosages,
            &mut self.suffixes,
            &mut self.durations,
            &mut self.routes,
            &mut self.frequencies,
            &mut self.statuses,
            &mut self.decimals,
            &mut self.strengths,
            &mut self.strength_units,
            &mut self.frequency_units,
            &mut self.forms,
            &mut self.subsections,
            &mut self.times,
        ] {
            outs.sort_by(|a, b| annot::span::span_order(&a.span, &b.span));
        }
    }
}

/// Resolve an emission into an output token; spans that fall outside the
/// sentence are dropped, like every machine does on text extraction.
fn resolve(sent: &Sentence, emission: &Emission, kind: OutKind) -> Option<DrugOut> {
    let mut span = Span::new(emission.begin, emission.end, istr(""));
    if !span.fill_text_from_sentence(sent) {
        return None;
    }
    Some(DrugOut { span, kind })
}

fn run_family(
    machines: &[Machine<DrugTok>],
    exits: &[ExitSpec],
    sent: &Sentence,
    overrides: &[&[DrugTok]],
    mut kind_of: impl FnMut(&Emission) -> OutKind,
) -> Result<Vec<DrugOut>, FsmError> {
    let tokens = DrugTok::from_tokens(&sent.tokens);
    let emissions = run_machines(machines, exits, &tokens, overrides)?;
    Ok(emissions
        .iter()
        .filter_map(|emission| resolve(sent, emission, kind_of(emission)))
        .collect())
}

impl FsmBattery {
    pub fn new(params: &DrugFsmParams) -> Self {
        FsmBattery {
            fraction: strength::fraction_machines(&params.fraction),
            range: strength::range_machines(&params.range),
            decimal: strength::decimal_machines(),
            suffix: strength::suffix_machines(&params.suffix),
            strength_unit: strength::strength_unit_machines(&params.strength_unit),
            strength: strength::strength_machines(&params.strength),
            dosage: dosage::dosage_machines(&params.dosage),
            form: dosage::form_machines(&params.form),
            route: dosage::route_machines(&params.route),
            frequency_unit: frequency::frequency_unit_machines(&params.frequency_unit),
            frequency: frequency::frequency_machines(&params.frequency),
            duration: misc::duration_machines(&params.duration),
            time: misc::time_machines(&params.time),
            change_status: misc::change_status_machines(&params.change_status),
            subsection: misc::subsection_machines(&params.subsection),
            frequency_words: params.frequency.clone(),
        }
    }

    /// Run the whole battery over one sentence, feeding earlier outputs to
    /// the machines that consume them as overrides.
    pub fn execute(&self, sent: &Sentence) -> Result<FsmResults, FsmError> {
        let mut results = FsmResults::default();

        let end_only = [ExitSpec::terminal(fsm::END)];

        let times = run_family(&self.time, &end_only, sent, &[], |_| OutKind::Time)?;
        results.fractions =
            run_family(&self.fraction, &end_only, sent, &[], |_| OutKind::FractionStrength)?;
        results.decimals =
            run_family(&self.decimal, &end_only, sent, &[], |_| OutKind::DecimalStrength)?;
        results.statuses = run_family(&self.change_status, &end_only, sent, &[], |emission| {
            OutKind::ChangeStatus(misc::change_status_of(emission.machine))
        })?;
        results.ranges = run_family(&self.range, &end_only, sent, &[], |_| OutKind::RangeStrength)?;

        let range_toks = DrugTok::from_outs(&results.ranges);
        results.strength_units = run_family(
            &self.strength_unit,
            &[
                ExitSpec::terminal(fsm::END),
                ExitSpec::skip_first(fsm::NT_FALSE_TERM),
            ],
            sent,
            &[&range_toks],
            |emission| {
                if emission.machine == strength::STRENGTH_UNIT_COMBINED_MACHINE {
                    OutKind::StrengthUnitCombined
                } else {
                    OutKind::StrengthUnit
                }
            },
        )?;

        results.forms = run_family(&self.form, &end_only, sent, &[], |_| OutKind::Form)?;

        let strength_unit_toks = DrugTok::from_outs(&results.strength_units);
        let fraction_toks = DrugTok::from_outs(&results.fractions);
        results.strengths = run_family(
            &self.strength,
            &[
                ExitSpec::terminal(fsm::END),
                ExitSpec::back(fsm::NT_END, 1),
                ExitSpec::back(fsm::NT_END_HYPH, 2),
            ],
            sent,
            &[&strength_unit_toks, &fraction_toks],
            |_| OutKind::Strength,
        )?;

        let form_toks = DrugTok::from_outs(&results.forms);
        results.dosages = run_family(
            &self.dosage,
            &[
                ExitSpec::terminal(fsm::END),
                ExitSpec {
                    state: fsm::NT_END,
                    end_back: 1,
                    skip_first: false,
                    punct_back_off: true,
                },
                ExitSpec::skip_first(fsm::NT_FALSE_TERM),
            ],
            sent,
            &[&form_toks, &strength_unit_toks],
            |_| OutKind::Dosage,
        )?;

        results.suffixes = run_family(
            &self.suffix,
            &end_only,
            sent,
            &[&strength_unit_toks],
            |_| OutKind::SuffixStrength,
        )?;

        results.routes = run_family(&self.route, &end_only, sent, &[], |emission| {
            OutKind::Route(dosage::route_of(emission.machine))
        })?;

        let time_toks = DrugTok::from_outs(&times);
        results.frequency_units = run_family(
            &self.frequency_unit,
            &[
                ExitSpec::terminal(fsm::END),
                ExitSpec::back(fsm::NT_END, 1),
                ExitSpec::skip_first(fsm::SKIP_FIRST),
            ],
            sent,
            &[&time_toks],
            |emission| OutKind::FrequencyUnit(frequency::quantity_of(emission.machine)),
        )?;

        let frequency_unit_toks = DrugTok::from_outs(&results.frequency_units);
        results.frequencies = frequency::run_frequency(
            &self.frequency,
            sent,
            &[&frequency_unit_toks, &range_toks],
            &self.frequency_words,
        )?;

        results.durations =
            run_family(&self.duration, &end_only, sent, &[&range_toks], |_| OutKind::Duration)?;

        results.subsections = run_family(
            &self.subsection,
            &[ExitSpec::terminal(fsm::END), ExitSpec::back(fsm::NT_END, 1)],
            sent,
            &[],
            |emission| OutKind::SubSection(misc::subsection_of(emission.machine)),
        )?;

        results.times = times;
        results.sort();
        Ok(results)
    }
}

/// First output whose span lies inside `[begin, end)`.
pub fn first_in_span(outs: &[DrugOut], begin: i32, end: i32) -> Option<&DrugOut> {
    outs.iter()
        .find(|out| out.span().begin >= begin && out.span().end <= end)
}

#[cfg(test)]
mod tests;
