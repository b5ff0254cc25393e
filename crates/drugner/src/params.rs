//! Word-set parameters for the drug machines, loaded from
//! `resources/drug_ner/fsm/<machine>/<file>.txt`. A missing file leaves its
//! set empty, matching the tolerant loader contract of the resource layout.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

pub type WordSet = Arc<HashSet<String>>;
pub type WordMap = Arc<HashMap<String, String>>;

fn set_or_empty(path: &Path) -> WordSet {
    Arc::new(annot::read_set(path).unwrap_or_default())
}

fn map_or_empty(path: &Path) -> WordMap {
    Arc::new(annot::read_map(path).unwrap_or_default())
}

pub fn word_set(words: &[&str]) -> WordSet {
    Arc::new(words.iter().map(|w| w.to_string()).collect())
}

pub fn word_map(entries: &[(&str, &str)]) -> WordMap {
    Arc::new(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[derive(Clone, Default)]
pub struct FractionStrengthParams {
    pub text_numerator_set: WordSet,
    pub text_denominator_set: WordSet,
}

#[derive(Clone, Default)]
pub struct RangeStrengthParams {
    pub text_number_set: WordSet,
    pub range_set: WordSet,
    pub hyphenated_set: WordSet,
}

#[derive(Clone, Default)]
pub struct SuffixStrengthParams {
    pub text_suffix_set: WordSet,
}

#[derive(Clone, Default)]
pub struct StrengthUnitParams {
    pub full_text_set: WordSet,
}

#[derive(Clone, Default)]
pub struct StrengthParams {
    pub number_text_set: WordSet,
}

#[derive(Clone, Default)]
pub struct DosageParams {
    pub text_number_set: WordSet,
    pub solo_text_set: WordSet,
}

#[derive(Clone, Default)]
pub struct FormParams {
    pub full_text_set: WordSet,
}

#[derive(Clone, Default)]
pub struct RouteParams {
    pub specified_oral_word_set: WordSet,
    pub specified_patches_word_set: WordSet,
    pub specified_gastric_word_set: WordSet,
    pub single_topical_word_set: WordSet,
    pub single_oral_word_set: WordSet,
    pub single_rectal_word_set: WordSet,
    pub single_inject_word_set: WordSet,
    pub middle_term_set: WordSet,
}

#[derive(Clone, Default)]
pub struct FrequencyParams {
    pub frequency_set: WordMap,
    pub middle_term_set: WordSet,
    pub hyphenated_set: WordMap,
}

#[derive(Clone, Default)]
pub struct FrequencyUnitParams {
    pub daily_word_set: WordSet,
    pub per_day_word_set: WordSet,
    pub post_eight_word_set: WordSet,
    pub post_four_word_set: WordSet,
    pub post_six_word_set: WordSet,
    pub four_times_per_day_word_set: WordSet,
    pub per_week_word_set: WordSet,
    pub twice_a_day_word_set: WordSet,
    pub three_times_a_day_word_set: WordSet,
    pub six_times_per_day_word_set: WordSet,
    pub every_other_hour_word_set: WordSet,
    pub daily_suffix_set: WordSet,
    pub weekly_suffix_set: WordSet,
    pub yearly_suffix_set: WordSet,
    pub hourly_suffix_set: WordSet,
    pub monthly_suffix_set: WordSet,
    pub prn_word_set: WordSet,
    pub every_other_day_word_set: WordSet,
}

#[derive(Clone, Default)]
pub struct DurationParams {
    pub middle_numeric_term_set: WordSet,
    pub combined_set: WordSet,
    pub specified_word_set: WordSet,
    pub append_word_set: WordSet,
    pub period_set: WordSet,
}

#[derive(Clone, Default)]
pub struct TimeParams {
    pub day_night_set: WordSet,
}

#[derive(Clone, Default)]
pub struct ChangeStatusParams {
    pub single_stop_word_set: WordSet,
    pub single_start_word_set: WordSet,
    pub single_increase_word_set: WordSet,
    pub single_decrease_word_set: WordSet,
    pub single_no_change_word_set: WordSet,
    pub multi_then_word_set: WordSet,
    pub single_change_word_set: WordSet,
    pub first_start_dual_word_set: WordSet,
    pub first_stop_dual_word_set: WordSet,
    pub first_no_change_dual_word_set: WordSet,
    pub first_increase_dual_word_set: WordSet,
    pub first_decrease_dual_word_set: WordSet,
    pub second_dual_word_set: WordSet,
    pub second_dual_from_word_set: WordSet,
    pub second_off_dual_word_set: WordSet,
    pub no_change_word_set: WordSet,
    pub change_word_set: WordSet,
    pub single_max_word_set: WordSet,
    pub first_max_dual_word_set: WordSet,
    pub second_max_dual_word_set: WordSet,
    pub single_sum_word_set: WordSet,
}

#[derive(Clone, Default)]
pub struct SubSectionParams {
    pub probable_sub_begin_set: WordSet,
    pub probable_sub_next_set: WordSet,
    pub probable_sub_end_set: WordSet,
    pub history_sub_begin_set: WordSet,
    pub history_sub_next_set: WordSet,
    pub history_sub_mid_set: WordSet,
    pub confirmed_sub_begin_set: WordSet,
    pub confirmed_sub_next_set: WordSet,
    pub middle_word_set: WordSet,
}

/// Every word set and map the drug machines read.
#[derive(Clone, Default)]
pub struct DrugFsmParams {
    pub fraction: FractionStrengthParams,
    pub range: RangeStrengthParams,
    pub suffix: SuffixStrengthParams,
    pub strength_unit: StrengthUnitParams,
    pub strength: StrengthParams,
    pub dosage: DosageParams,
    pub form: FormParams,
    pub route: RouteParams,
    pub frequency: FrequencyParams,
    pub frequency_unit: FrequencyUnitParams,
    pub duration: DurationParams,
    pub time: TimeParams,
    pub change_status: ChangeStatusParams,
    pub subsection: SubSectionParams,
}

impl DrugFsmParams {
    /// Load the word-set files under `<res_path>/drug_ner/fsm`.
    pub fn load(res_path: &Path) -> Self {
        let root = res_path.join("drug_ner").join("fsm");
        let dir = |name: &str| root.join(name);

        DrugFsmParams {
            fraction: FractionStrengthParams {
                text_numerator_set: set_or_empty(&dir("fraction_strength_fsm").join("text_numerator_set.txt")),
                text_denominator_set: set_or_empty(&dir("fraction_strength_fsm").join("text_denominator_set.txt")),
            },
            range: RangeStrengthParams {
                text_number_set: set_or_empty(&dir("range_strength_fsm").join("text_number_set.txt")),
                range_set: set_or_empty(&dir("range_strength_fsm").join("range_set.txt")),
                hyphenated_set: set_or_empty(&dir("range_strength_fsm").join("hyphenated_set.txt")),
            },
            suffix: SuffixStrengthParams {
                text_suffix_set: set_or_empty(&dir("suffix_strength_fsm").join("text_suffix_set.txt")),
            },
            strength_unit: StrengthUnitParams {
                full_text_set: set_or_empty(&dir("strength_unit_fsm").join("full_text_set.txt")),
            },
            strength: StrengthParams {
                number_text_set: set_or_empty(&dir("strength_fsm").join("number_text_set.txt")),
            },
            dosage: DosageParams {
                text_number_set: set_or_empty(&dir("dosage_fsm").join("text_number_set.txt")),
                solo_text_set: set_or_empty(&dir("dosage_fsm").join("solo_text_set.txt")),
            },
            form: FormParams {
                full_text_set: set_or_empty(&dir("form_fsm").join("full_text_set.txt")),
            },
            route: RouteParams {
                specified_oral_word_set: set_or_empty(&dir("route_fsm").join("specified_oral_word_set.txt")),
                specified_patches_word_set: set_or_empty(&dir("route_fsm").join("specified_patches_word_set.txt")),
                specified_gastric_word_set: set_or_empty(&dir("route_fsm").join("specified_gastric_word_set.txt")),
                single_topical_word_set: set_or_empty(&dir("route_fsm").join("single_topical_word_set.txt")),
                single_oral_word_set: set_or_empty(&dir("route_fsm").join("single_oral_word_set.txt")),
                single_rectal_word_set: set_or_empty(&dir("route_fsm").join("single_rectal_word_set.txt")),
                single_inject_word_set: set_or_empty(&dir("route_fsm").join("single_inject_word_set.txt")),
                middle_term_set: set_or_empty(&dir("route_fsm").join("middle_term_set.txt")),
            },
            frequency: FrequencyParams {
                frequency_set: map_or_empty(&dir("frequency_fsm").join("frequency_set.txt")),
                middle_term_set: set_or_empty(&dir("frequency_fsm").join("middle_term_set.txt")),
                hyphenated_set: map_or_empty(&dir("frequency_fsm").join("hyphenated_set.txt")),
            },
            frequency_unit: FrequencyUnitParams {
                daily_word_set: set_or_empty(&dir("frequency_unit_fsm").join("daily_word_set.txt")),
                per_day_word_set: set_or_empty(&dir("frequency_unit_fsm").join("per_day_word_set.txt")),
                post_eight_word_set: set_or_empty(&dir("frequency_unit_fsm").join("post_eight_word_set.txt")),
                post_four_word_set: set_or_empty(&dir("frequency_unit_fsm").join("post_four_word_set.txt")),
                post_six_word_set: set_or_empty(&dir("frequency_unit_fsm").join("post_six_word_set.txt")),
                four_times_per_day_word_set: set_or_empty(&dir("frequency_unit_fsm").join("four_times_per_day_word_set.txt")),
                per_week_word_set: set_or_empty(&dir("frequency_unit_fsm").join("per_week_word_set.txt")),
                twice_a_day_word_set: set_or_empty(&dir("frequency_unit_fsm").join("twice_a_day_word_set.txt")),
                three_times_a_day_word_set: set_or_empty(&dir("frequency_unit_fsm").join("three_times_a_day_word_set.txt")),
                six_times_per_day_word_set: set_or_empty(&dir("frequency_unit_fsm").join("six_times_per_day_word_set.txt")),
                every_other_hour_word_set: set_or_empty(&dir("frequency_unit_fsm").join("every_other_hour_word_set.txt")),
                daily_suffix_set: set_or_empty(&dir("frequency_unit_fsm").join("daily_suffix_set.txt")),
                weekly_suffix_set: set_or_empty(&dir("frequency_unit_fsm").join("weekly_suffix_set.txt")),
                yearly_suffix_set: set_or_empty(&dir("frequency_unit_fsm").join("yearly_suffix_set.txt")),
                hourly_suffix_set: set_or_empty(&dir("frequency_unit_fsm").join("hourly_suffix_set.txt")),
                monthly_suffix_set: set_or_empty(&dir("frequency_unit_fsm").join("monthly_suffix_set.txt")),
                prn_word_set: set_or_empty(&dir("frequency_unit_fsm").join("prn_word_set.txt")),
                every_other_day_word_set: set_or_empty(&dir("frequency_unit_fsm").join("every_other_day_word_set.txt")),
            },
            duration: DurationParams {
                middle_numeric_term_set: set_or_empty(&dir("duration_fsm").join("middle_numeric_term_set.txt")),
                combined_set: set_or_empty(&dir("duration_fsm").join("combined_set.txt")),
                specified_word_set: set_or_empty(&dir("duration_fsm").join("specified_word_set.txt")),
                append_word_set: set_or_empty(&dir("duration_fsm").join("append_word_set.txt")),
                period_set: set_or_empty(&dir("duration_fsm").join("period_set.txt")),
            },
            time: TimeParams {
                day_night_set: set_or_empty(&dir("time_fsm").join("day_night_set.txt")),
            },
            change_status: ChangeStatusParams {
                single_stop_word_set: set_or_empty(&dir("drug_change_status_fsm").join("single_stop_word_set.txt")),
                single_start_word_set: set_or_empty(&dir("drug_change_status_fsm").join("single_start_word_set.txt")),
                single_increase_word_set: set_or_empty(&dir("drug_change_status_fsm").join("single_increase_word_set.txt")),
                single_decrease_word_set: set_or_empty(&dir("drug_change_status_fsm").join("single_decrease_word_set.txt")),
                single_no_change_word_set: set_or_empty(&dir("drug_change_status_fsm").join("single_no_change_word_set.txt")),
                multi_then_word_set: set_or_empty(&dir("drug_change_status_fsm").join("multi_then_word_set.txt")),
                single_change_word_set: set_or_empty(&dir("drug_change_status_fsm").join("single_change_word_set.txt")),
                first_start_dual_word_set: set_or_empty(&dir("drug_change_status_fsm").join("first_start_dual_word_set.txt")),
                first_stop_dual_word_set: set_or_empty(&dir("drug_change_status_fsm").join("first_stop_dual_word_set.txt")),
                first_no_change_dual_word_set: set_or_empty(&dir("drug_change_status_fsm").join("first_no_change_dual_word_set.txt")),
                first_increase_dual_word_set: set_or_empty(&dir("drug_change_status_fsm").join("first_increase_dual_word_set.txt")),
                first_decrease_dual_word_set: set_or_empty(&dir("drug_change_status_fsm").join("first_decrease_dual_word_set.txt")),
                second_dual_word_set: set_or_empty(&dir("drug_change_status_fsm").join("second_dual_word_set.txt")),
                second_dual_from_word_set: set_or_empty(&dir("drug_change_status_fsm").join("second_dual_from_word_set.txt")),
                second_off_dual_word_set: set_or_empty(&dir("drug_change_status_fsm").join("second_off_dual_word_set.txt")),
                no_change_word_set: set_or_empty(&dir("drug_change_status_fsm").join("no_change_word_set.txt")),
                change_word_set: set_or_empty(&dir("drug_change_status_fsm").join("change_word_set.txt")),
                single_max_word_set: set_or_empty(&dir("drug_change_status_fsm").join("single_max_word_set.txt")),
                first_max_dual_word_set: set_or_empty(&dir("drug_change_status_fsm").join("first_max_dual_word_set.txt")),
                second_max_dual_word_set: set_or_empty(&dir("drug_change_status_fsm").join("second_max_dual_word_set.txt")),
                single_sum_word_set: Default::default(),
            },
            subsection: SubSectionParams {
                probable_sub_begin_set: set_or_empty(&dir("subsection_indicator_fsm").join("probable_sub_begin_set.txt")),
                probable_sub_next_set: set_or_empty(&dir("subsection_indicator_fsm").join("probable_sub_next_set.txt")),
                probable_sub_end_set: set_or_empty(&dir("subsection_indicator_fsm").join("probable_sub_end_set.txt")),
                history_sub_begin_set: set_or_empty(&dir("subsection_indicator_fsm").join("history_sub_begin_set.txt")),
                history_sub_next_set: set_or_empty(&dir("subsection_indicator_fsm").join("history_sub_next_set.txt")),
                history_sub_mid_set: set_or_empty(&dir("subsection_indicator_fsm").join("history_sub_mid_set.txt")),
                confirmed_sub_begin_set: set_or_empty(&dir("subsection_indicator_fsm").join("confirmed_sub_begin_set.txt")),
                confirmed_sub_next_set: set_or_empty(&dir("subsection_indicator_fsm").join("confirmed_sub_next_set.txt")),
                middle_word_set: set_or_empty(&dir("subsection_indicator_fsm").join("middle_word_set.txt")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_resource_dir_loads_empty_sets() {
        let params = DrugFsmParams::load(Path::new("/definitely/not/there"));
        assert!(params.route.single_oral_word_set.is_empty());
        assert!(params.frequency.frequency_set.is_empty());
    }

    #[test]
    fn files_populate_their_sets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fsm_dir = dir.path().join("drug_ner").join("fsm").join("route_fsm");
        std::fs::create_dir_all(&fsm_dir).expect("mkdir");
        std::fs::write(fsm_dir.join("single_oral_word_set.txt"), "po\norally\n").expect("write");

        let params = DrugFsmParams::load(dir.path());
        assert!(params.route.single_oral_word_set.contains("po"));
        assert!(params.route.single_oral_word_set.contains("orally"));
    }
}
