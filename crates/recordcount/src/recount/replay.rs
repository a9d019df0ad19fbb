//! Dataset replay: reset, evaluate every row, accumulate its paths.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::{accumulate_row, check_model, reset_counts, AcceptedModel, AccumulationStats, DatasetReader, RecountError};
use crate::config::ReplayConfig;
use crate::inference::{evaluate, parse_as, EvalOptions, FieldValue};
use crate::persist::WriteError;
use crate::repr::{Model, Value};

/// What a replay did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Content rows replayed.
    pub rows: usize,
    pub accumulated: AccumulationStats,
}

/// Replay every row of `dataset` against an accepted, freshly reset model.
///
/// Rows are handled strictly in order and the first failure aborts the
/// replay; counts added by earlier rows stay in `model`.
pub fn replay<R: Read>(
    model: &mut Model,
    accepted: &AcceptedModel,
    dataset: DatasetReader<R>,
    options: &EvalOptions,
) -> Result<ReplaySummary, RecountError> {
    warn_ignored_columns(model, accepted, dataset.header());

    let mut summary = ReplaySummary::default();
    for item in dataset {
        let (row, mut inputs) = item?;
        let raw_label = inputs.remove(&accepted.target_field);
        let expected = expected_label(accepted, options, row, raw_label.as_deref())?;

        let result = evaluate(model, &inputs, options).map_err(|source| RecountError::EvaluationFailure {
            row,
            inputs: inputs.clone(),
            source,
        })?;
        let stats = accumulate_row(model, &result.target, expected.as_ref(), row)?;
        debug!(
            "row {row}: {} segment paths, {} node visits",
            stats.paths, stats.node_visits
        );

        summary.rows += 1;
        summary.accumulated.merge(stats);
    }

    if summary.rows == 0 {
        warn!("dataset has no content rows; every count is left at zero");
    }
    Ok(summary)
}

/// Read the row's expected label. Only classification needs one.
fn expected_label(
    accepted: &AcceptedModel,
    options: &EvalOptions,
    row: usize,
    raw: Option<&str>,
) -> Result<Option<Value>, RecountError> {
    if !accepted.function.is_classification() {
        return Ok(None);
    }
    let missing = || RecountError::MissingTarget {
        row,
        field: accepted.target_field.clone(),
    };

    let raw = raw.ok_or_else(missing)?;
    if options.is_missing(raw) {
        return Err(missing());
    }
    match parse_as(accepted.target_type, raw) {
        Some(FieldValue::Text(text)) => Ok(Some(Value::Text(text))),
        Some(FieldValue::Number(n)) => Ok(Some(Value::Number(n))),
        Some(FieldValue::Missing) => Err(missing()),
        None => Err(RecountError::InvalidTarget {
            row,
            field: accepted.target_field.clone(),
            value: raw.to_string(),
        }),
    }
}

fn warn_ignored_columns(model: &Model, accepted: &AcceptedModel, header: &[String]) {
    let ignored: Vec<&str> = header
        .iter()
        .map(String::as_str)
        .filter(|name| *name != accepted.target_field && !model.data_dictionary.contains(name))
        .collect();
    if !ignored.is_empty() {
        warn!("ignoring columns not declared by the model: {}", ignored.join(", "));
    }
}

/// Recount `model` in place from a dataset read out of `dataset`.
///
/// The model is checked before the first byte of the dataset is read and
/// all of its counters are zeroed before the first row is replayed.
pub fn recount<R: Read>(model: &mut Model, dataset: R, config: &ReplayConfig) -> Result<ReplaySummary, RecountError> {
    let accepted = check_model(model)?;
    reset_counts(model);
    let dataset = DatasetReader::from_reader(dataset, config)?;
    replay(model, &accepted, dataset, &config.eval_options())
}

/// Load a model, recount it from a dataset file and write the result.
///
/// The output goes to `model_output`, or to standard output when `None`.
/// Nothing is written unless every row was replayed; the document is
/// rendered in memory before the output file is created.
pub fn run(
    model_input: &Path,
    csv_input: &Path,
    model_output: Option<&Path>,
    config: &ReplayConfig,
) -> Result<ReplaySummary, RecountError> {
    let mut model = Model::load_json(model_input).map_err(|source| RecountError::ModelLoad {
        path: model_input.to_path_buf(),
        source,
    })?;
    info!(
        "loaded model from {} ({} nodes)",
        model_input.display(),
        model.n_nodes()
    );

    let accepted = check_model(&model)?;
    info!(
        "{} ensemble of {} trees, method {}, target {:?}",
        accepted.function, accepted.n_segments, accepted.method, accepted.target_field
    );
    reset_counts(&mut model);

    let summary = {
        let dataset = DatasetReader::open(csv_input, config)?;
        replay(&mut model, &accepted, dataset, &config.eval_options())?
    };
    info!(
        "replayed {} rows from {} ({} segment paths, {} new score distributions)",
        summary.rows,
        csv_input.display(),
        summary.accumulated.paths,
        summary.accumulated.distributions_created
    );

    let output_path = model_output.map_or_else(|| PathBuf::from("<stdout>"), Path::to_path_buf);
    let write_failed = |source: WriteError| RecountError::ModelWrite {
        path: output_path.clone(),
        source,
    };
    let bytes = model.to_json_vec(config.write_options()).map_err(write_failed)?;
    match model_output {
        Some(path) => fs::write(path, &bytes).map_err(|e| write_failed(e.into()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&bytes)
                .and_then(|()| stdout.flush())
                .map_err(|e| write_failed(e.into()))?;
        }
    }
    info!("wrote recounted model to {}", output_path.display());
    Ok(summary)
}
