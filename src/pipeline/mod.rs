//! Pipeline composition: stage wiring, per-configuration branches and the
//! response joiner.

pub mod adjuster;
pub mod response;
pub mod stages;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use annot::{intern, Annotation, Sentence};
use drugner::{DrugAttributesExtractor, DrugFsmParams};
use lab::LabValuesExtractor;
use lookup::{search_spans, ConceptFactory, Consumer, Dictionary, LookupParams};
use polarity::PolarityAnalyzer;
use sentence::SentenceDetector;
use serde::Deserialize;
use smoking::{DocumentSmokingResolver, SmokingParams, SmokingStatusAnnotator};
use tokenizer::PtbTokenizer;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::{self, Configuration};
use crate::PipelineError;

pub use stages::{fan_out, spawn_source, spawn_stage};

const POLARITY_ATTRIBUTE: &str = "polarity";
const MAX_LEFT_SCOPE: usize = 20;
const MAX_RIGHT_SCOPE: usize = 10;
const LAB_MAX_TOKEN_DISTANCE: usize = 15;
const DRUG_MAX_ATTRIBUTE_DISTANCE: usize = 10;

/// One annotation request. `tid` is an opaque correlation id echoed back.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub tid: String,
    pub text: String,
}

/// Per-configuration lookup machinery.
pub struct LookupBundle {
    pub name: String,
    pub dictionary: Dictionary,
    pub factory: ConceptFactory,
    pub consumer: Consumer,
    pub params: LookupParams,
}

/// The assembled pipeline: loaded once, shared read-only across requests.
pub struct Pipeline {
    configurations: Vec<Configuration>,
    detector: Arc<SentenceDetector>,
    tokenizer: Arc<PtbTokenizer>,
    tagger: Arc<pos::Tagger>,
    lemmatizer: Arc<lemma::Lemmatizer>,
    lookups: HashMap<String, Arc<LookupBundle>>,
    lab: Option<Arc<LabValuesExtractor>>,
    drug: Option<Arc<DrugAttributesExtractor>>,
    polarity: Arc<PolarityAnalyzer>,
    smoking: Option<Arc<SmokingStatusAnnotator>>,
}

impl Pipeline {
    /// Load everything from disk: configurations, models, dictionaries and
    /// word lists. Seals the string interner once loading has finished.
    pub fn load(
        config_dir: &Path,
        resource_dir: &Path,
        dictionary_dir: &Path,
    ) -> Result<Self, PipelineError> {
        let configurations = config::load_configurations(config_dir)?;

        let detector = SentenceDetector::load(&resource_dir.join("sentdetector"))?;
        let pos_model = pos::PosModel::load(&resource_dir.join("pos").join("pos.model.json"))?;
        let lemmatizer = lemma::Lemmatizer::load(&resource_dir.join("lemmatizer"))?;

        let mut lookups = HashMap::new();
        for configuration in configurations.iter().filter(|c| c.is_default_clinical()) {
            let bundle = load_lookup_bundle(configuration, dictionary_dir)?;
            lookups.insert(configuration.name.clone(), Arc::new(bundle));
        }

        let needs_lab = configurations
            .iter()
            .any(|c| c.is_default_clinical() && c.has_feature(config::FEATURE_LAB));
        let lab = if needs_lab {
            let lab_dir = resource_dir.join("lab_values");
            Some(Arc::new(LabValuesExtractor::load(
                &lab_dir.join("model.json"),
                &lab_dir.join("units.txt"),
                LAB_MAX_TOKEN_DISTANCE,
                vec!["normal".to_string()],
            )?))
        } else {
            None
        };

        let needs_drug = configurations
            .iter()
            .any(|c| c.is_default_clinical() && c.has_feature(config::FEATURE_DRUG));
        let drug = needs_drug.then(|| {
            Arc::new(DrugAttributesExtractor::new(
                DRUG_MAX_ATTRIBUTE_DISTANCE,
                &DrugFsmParams::load(resource_dir),
            ))
        });

        let needs_smoking = configurations.iter().any(|c| c.is_smoking_status());
        let smoking = if needs_smoking {
            Some(Arc::new(SmokingStatusAnnotator::new(SmokingParams::load(
                resource_dir,
            )?)))
        } else {
            None
        };

        let pipeline = Self::from_parts(
            configurations,
            detector,
            pos::Tagger::new(pos_model),
            lemmatizer,
            lookups,
            lab,
            drug,
            smoking,
        );
        annot::seal_interner();
        info!("pipeline loaded; string store sealed");
        Ok(pipeline)
    }

    /// Assemble a pipeline from already-built components (tests, embedders).
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        configurations: Vec<Configuration>,
        detector: SentenceDetector,
        tagger: pos::Tagger,
        lemmatizer: lemma::Lemmatizer,
        lookups: HashMap<String, Arc<LookupBundle>>,
        lab: Option<Arc<LabValuesExtractor>>,
        drug: Option<Arc<DrugAttributesExtractor>>,
        smoking: Option<Arc<SmokingStatusAnnotator>>,
    ) -> Self {
        Pipeline {
            configurations,
            detector: Arc::new(detector),
            tokenizer: Arc::new(PtbTokenizer::new()),
            tagger: Arc::new(tagger),
            lemmatizer: Arc::new(lemmatizer),
            lookups,
            lab,
            drug,
            polarity: Arc::new(PolarityAnalyzer::new(
                MAX_LEFT_SCOPE,
                MAX_RIGHT_SCOPE,
                polarity::default_boundaries(),
            )),
            smoking,
        }
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    /// Process one request into the JSON response object keyed by
    /// configuration name.
    pub async fn process(&self, request: &Request) -> Result<String, PipelineError> {
        info!(tid = %request.tid, "processing request");

        let sentences = self.detect_sentences(&request.text);
        let tokenized = self.tokenize_stage(sentences);
        let tagged = self.tagger_stage(tokenized);
        let lemmatized = self.lemma_stage(tagged);

        let branch_inputs = fan_out(lemmatized, self.configurations.len());

        let mut handles = Vec::with_capacity(self.configurations.len());
        for (configuration, branch_rx) in self.configurations.iter().zip(branch_inputs) {
            let name = configuration.name.clone();
            let handle = if configuration.is_smoking_status() {
                let annotator = self.smoking.clone();
                let tid = request.tid.clone();
                tokio::spawn(run_smoking_branch(branch_rx, annotator, tid))
            } else {
                let context = DefaultClinicalContext {
                    bundle: self.lookups.get(&configuration.name).cloned(),
                    lab: configuration
                        .has_feature(config::FEATURE_LAB)
                        .then(|| self.lab.clone())
                        .flatten(),
                    drug: configuration
                        .has_feature(config::FEATURE_DRUG)
                        .then(|| self.drug.clone())
                        .flatten(),
                    polarity: configuration
                        .has_feature(config::FEATURE_POLARITY)
                        .then(|| Arc::clone(&self.polarity)),
                    tid: request.tid.clone(),
                    text: request.text.clone(),
                };
                tokio::spawn(run_default_clinical_branch(branch_rx, context))
            };
            handles.push((name, handle));
        }

        let mut response = serde_json::Map::new();
        for (name, handle) in handles {
            let value = match handle.await {
                Ok(value) => value,
                Err(join_error) => {
                    // A panicked branch yields an empty result for its
                    // configuration; the request still completes.
                    error!(config = %name, %join_error, "configuration branch failed");
                    serde_json::json!({})
                }
            };
            info!(config = %name, "finished configuration branch");
            response.insert(name, value);
        }

        info!(tid = %request.tid, "finished request");
        Ok(serde_json::to_string(&serde_json::Value::Object(response))?)
    }

    fn detect_sentences(&self, text: &str) -> Receiver<Sentence> {
        let detector = Arc::clone(&self.detector);
        let text = text.to_string();
        spawn_source(move || detector.detect(&text))
    }

    fn tokenize_stage(&self, rx: Receiver<Sentence>) -> Receiver<Sentence> {
        let tokenizer = Arc::clone(&self.tokenizer);
        spawn_stage(
            rx,
            Arc::new(move |mut sent: Sentence| match tokenizer.tokenize(&mut sent) {
                Ok(()) => Some(sent),
                Err(error) => {
                    warn!(
                        begin = sent.span.begin,
                        end = sent.span.end,
                        %error,
                        "tokenizer dropped sentence"
                    );
                    None
                }
            }),
        )
    }

    fn tagger_stage(&self, rx: Receiver<Sentence>) -> Receiver<Sentence> {
        let tagger = Arc::clone(&self.tagger);
        spawn_stage(
            rx,
            Arc::new(move |mut sent: Sentence| {
                if !sent.tokens.is_empty() {
                    let word_indices: Vec<usize> = sent
                        .tokens
                        .iter()
                        .enumerate()
                        .filter(|(_, token)| !token.is_newline)
                        .map(|(idx, _)| idx)
                        .collect();
                    let words: Vec<&annot::Token> =
                        word_indices.iter().map(|idx| &sent.tokens[*idx]).collect();
                    let tags = tagger.tag(&words);
                    for (slot, tag) in tags.iter().enumerate() {
                        if let Some(idx) = word_indices.get(slot) {
                            sent.tokens[*idx].tag = Some(intern(tag));
                        }
                    }
                }
                Some(sent)
            }),
        )
    }

    fn lemma_stage(&self, rx: Receiver<Sentence>) -> Receiver<Sentence> {
        let lemmatizer = Arc::clone(&self.lemmatizer);
        spawn_stage(
            rx,
            Arc::new(move |mut sent: Sentence| {
                for token in sent.tokens.iter_mut() {
                    if !token.is_word {
                        continue;
                    }
                    let Some(tag) = token.tag.clone() else {
                        continue;
                    };
                    let lemma = lemmatizer.analyze(&token.span.text, &tag);
                    token.lemma = Some(intern(&lemma));
                }
                Some(sent)
            }),
        )
    }
}

fn load_lookup_bundle(
    configuration: &Configuration,
    dictionary_dir: &Path,
) -> Result<LookupBundle, PipelineError> {
    let fdl = &configuration.params.fdl;
    if fdl.term_dictionary.is_empty() || fdl.term_scheme.is_empty() {
        return Err(PipelineError::BadConfiguration {
            name: configuration.name.clone(),
            problem: "term dictionary path or scheme is empty".to_string(),
        });
    }
    if fdl.concept_dictionary.is_empty() || fdl.concept_scheme.is_empty() {
        return Err(PipelineError::BadConfiguration {
            name: configuration.name.clone(),
            problem: "concept dictionary path or scheme is empty".to_string(),
        });
    }

    let term_scheme: Vec<String> = fdl.term_scheme.split('|').map(str::to_string).collect();
    let concept_scheme: Vec<String> = fdl.concept_scheme.split('|').map(str::to_string).collect();

    let dictionary = Dictionary::load(
        &configuration.name,
        &dictionary_dir.join(&fdl.term_dictionary),
        &term_scheme,
    )?;
    let factory = ConceptFactory::load(
        &configuration.name,
        &dictionary_dir.join(&fdl.concept_dictionary),
        &concept_scheme,
        &fdl.concept_ignored_params,
    )?;

    Ok(LookupBundle {
        name: configuration.name.clone(),
        dictionary,
        factory,
        consumer: Consumer::new(fdl.precision_mode),
        params: LookupParams {
            minimum_lookup_span: 1,
            exclusion_tags: fdl.exclusion_tags.clone(),
        },
    })
}

struct DefaultClinicalContext {
    bundle: Option<Arc<LookupBundle>>,
    lab: Option<Arc<LabValuesExtractor>>,
    drug: Option<Arc<DrugAttributesExtractor>>,
    polarity: Option<Arc<PolarityAnalyzer>>,
    tid: String,
    text: String,
}

async fn run_default_clinical_branch(
    mut rx: Receiver<Sentence>,
    context: DefaultClinicalContext,
) -> serde_json::Value {
    let Some(bundle) = context.bundle else {
        warn!(tid = %context.tid, "default clinical branch has no lookup bundle");
        return serde_json::json!({});
    };

    // Lookup per sentence, in parallel, unordered.
    let mut tasks: JoinSet<Vec<Annotation>> = JoinSet::new();
    while let Some(sent) = rx.recv().await {
        let bundle = Arc::clone(&bundle);
        tasks.spawn(async move {
            let sent = Arc::new(sent);
            let (spans, cuis) = search_spans(&sent, &bundle.dictionary, &bundle.params);

            let mut all_cuis: Vec<annot::IStr> = Vec::new();
            for span_cuis in &cuis {
                for cui in span_cuis {
                    if !all_cuis.iter().any(|have| Arc::ptr_eq(have, cui)) {
                        all_cuis.push(Arc::clone(cui));
                    }
                }
            }
            let concept_map = bundle.factory.concepts_for(&all_cuis);
            let mut annotations = bundle.consumer.consume(&spans, &cuis, &concept_map, &sent);
            annotations.sort_by(|a, b| annot::span::span_order(&a.span, &b.span));
            annotations
        });
    }

    let mut batches: Vec<Vec<Annotation>> = Vec::new();
    while let Some(done) = tasks.join_next().await {
        match done {
            Ok(batch) => batches.push(batch),
            Err(join_error) => error!(%join_error, "lookup task failed; sentence dropped"),
        }
    }

    // Attribute stages run per sentence batch, in branch order.
    for batch in batches.iter_mut() {
        if batch.is_empty() {
            continue;
        }
        if let Some(lab) = &context.lab {
            if let Err(error) = lab.extract(batch) {
                warn!(%error, "lab attribute extraction failed for sentence");
            }
        }
        if let Some(drug) = &context.drug {
            if let Err(error) = drug.extract(batch) {
                warn!(%error, "drug attribute extraction failed for sentence");
            }
        }
    }

    let mut annotations: Vec<Annotation> = batches.into_iter().flatten().collect();
    annotations.sort_by(|a, b| {
        annot::span::span_order(&a.span, &b.span).then((a.semantic as u8).cmp(&(b.semantic as u8)))
    });

    if let Some(polarity) = &context.polarity {
        match polarity.analyze(&annotations, &[annot::Scope::Left, annot::Scope::Right]) {
            Ok(polarities) => {
                for (annotation, polarity) in annotations.iter_mut().zip(polarities) {
                    annotation.attributes.insert(
                        POLARITY_ATTRIBUTE.to_string(),
                        annot::AttrValue::Text(polarity.name().to_string()),
                    );
                }
            }
            Err(error) => warn!(%error, "polarity analysis failed"),
        }
    }

    let payload = response::default_clinical_response(&context.tid, &context.text, &annotations);
    serde_json::to_value(payload).unwrap_or_else(|error| {
        error!(%error, "response serialization failed");
        serde_json::json!({})
    })
}

async fn run_smoking_branch(
    mut rx: Receiver<Sentence>,
    annotator: Option<Arc<SmokingStatusAnnotator>>,
    tid: String,
) -> serde_json::Value {
    let Some(annotator) = annotator else {
        warn!(tid = %tid, "smoking branch has no annotator");
        return serde_json::json!({});
    };

    let mut sentences: Vec<Sentence> = Vec::new();
    while let Some(sent) = rx.recv().await {
        sentences.push(sent);
    }
    sentences.sort_by(|a, b| annot::span::span_order(&a.span, &b.span));
    let sentences = adjuster::adjust_sentences(sentences);

    // Classify per sentence in parallel, then restore order.
    let mut tasks: JoinSet<(usize, String)> = JoinSet::new();
    let shared: Vec<Arc<Sentence>> = sentences.into_iter().map(Arc::new).collect();
    for (idx, sent) in shared.iter().enumerate() {
        let annotator = Arc::clone(&annotator);
        let sent = Arc::clone(sent);
        tasks.spawn(async move { (idx, annotator.classify(&sent)) });
    }

    let mut labels: Vec<String> = vec![String::new(); shared.len()];
    while let Some(done) = tasks.join_next().await {
        match done {
            Ok((idx, label)) => labels[idx] = label,
            Err(join_error) => error!(%join_error, "smoking classification failed; sentence dropped"),
        }
    }

    let mut resolver = DocumentSmokingResolver::default();
    let mut classified: Vec<Sentence> = Vec::with_capacity(shared.len());
    for (sent, label) in shared.into_iter().zip(labels) {
        resolver.add_status(&label);
        let mut sent = Arc::try_unwrap(sent).unwrap_or_else(|shared| (*shared).clone());
        sent.attributes.smoking_status = label;
        classified.push(sent);
    }

    let payload = response::smoking_status_response(&tid, resolver.resolve(), &classified);
    serde_json::to_value(payload).unwrap_or_else(|error| {
        error!(%error, "response serialization failed");
        serde_json::json!({})
    })
}
