#![forbid(unsafe_code)]

use std::sync::{LazyLock, RwLock};

use gdl_core::{GdlConfig, GraphReport, export::to_json_document};
use gdl_parser::{ParseOptions, ParseResult, parse_with_options};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

/// Counts for an editor status bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasmParseSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RuntimeInitConfig {
    suggestions: SuggestionOverrides,
    validate: ValidateOverrides,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SuggestionOverrides {
    enabled: Option<bool>,
    cutoff: Option<f64>,
    max: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ValidateOverrides {
    strict: Option<bool>,
    report_unreferenced: Option<bool>,
    report_duplicates: Option<bool>,
}

/// Editor-side view of a parse: the result plus its analysis.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOutput {
    valid: bool,
    result: ParseResult,
    report: GraphReport,
}

static RUNTIME_CONFIG: LazyLock<RwLock<GdlConfig>> =
    LazyLock::new(|| RwLock::new(GdlConfig::default()));

fn read_runtime_config() -> GdlConfig {
    match RUNTIME_CONFIG.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn write_runtime_config(config: GdlConfig) {
    match RUNTIME_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => {
            let mut guard = poisoned.into_inner();
            *guard = config;
        }
    }
}

fn js_error(message: impl Into<String>) -> JsValue {
    JsValue::from_str(&message.into())
}

fn parse_js_value_or_default<T>(value: Option<JsValue>) -> Result<T, JsValue>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match value {
        None => Ok(T::default()),
        Some(raw) if raw.is_undefined() || raw.is_null() => Ok(T::default()),
        Some(raw) => {
            #[cfg(target_arch = "wasm32")]
            {
                serde_wasm_bindgen::from_value(raw)
                    .map_err(|err| js_error(format!("invalid config: {err}")))
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = raw;
                Ok(T::default())
            }
        }
    }
}

fn to_js_value<T>(value: &T) -> Result<JsValue, JsValue>
where
    T: Serialize,
{
    #[cfg(target_arch = "wasm32")]
    {
        serde_wasm_bindgen::to_value(value)
            .map_err(|err| js_error(format!("failed to serialize response: {err}")))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        serde_json::to_string(value)
            .map(|json| JsValue::from_str(&json))
            .map_err(|err| js_error(format!("failed to serialize response: {err}")))
    }
}

fn merge_config(base: &GdlConfig, overrides: &RuntimeInitConfig) -> Result<GdlConfig, String> {
    let mut merged = base.clone();

    let suggestions = &overrides.suggestions;
    if let Some(enabled) = suggestions.enabled {
        merged.suggestions.enabled = enabled;
    }
    if let Some(cutoff) = suggestions.cutoff {
        merged.suggestions.cutoff = cutoff;
    }
    if let Some(max) = suggestions.max {
        merged.suggestions.max = max;
    }

    let validate = &overrides.validate;
    if let Some(strict) = validate.strict {
        merged.validate.strict = strict;
    }
    if let Some(report_unreferenced) = validate.report_unreferenced {
        merged.validate.report_unreferenced = report_unreferenced;
    }
    if let Some(report_duplicates) = validate.report_duplicates {
        merged.validate.report_duplicates = report_duplicates;
    }

    merged.validate().map_err(|err| err.to_string())?;
    Ok(merged)
}

fn parse_with_config(input: &str, config: &GdlConfig) -> ParseResult {
    parse_with_options(input, &ParseOptions::from(config))
}

fn analyze_with_config(input: &str, config: &GdlConfig) -> AnalyzeOutput {
    let result = parse_with_config(input, config);
    let report = GraphReport::analyze(&result.graph);
    let valid = report.is_valid(&config.validate, &result.warnings);

    AnalyzeOutput {
        valid,
        result,
        report,
    }
}

#[must_use]
pub fn summarize(input: &str) -> WasmParseSummary {
    let parsed = parse_with_config(input, &read_runtime_config());
    WasmParseSummary {
        node_count: parsed.graph.nodes.len(),
        edge_count: parsed.graph.edges.len(),
        warnings: parsed.warnings.iter().map(|warning| warning.message()).collect(),
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn init(config: Option<JsValue>) -> Result<(), JsValue> {
    let overrides: RuntimeInitConfig = parse_js_value_or_default(config)?;
    let next = merge_config(&read_runtime_config(), &overrides).map_err(js_error)?;
    write_runtime_config(next);
    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = parse))]
pub fn parse_js(input: &str) -> Result<JsValue, JsValue> {
    let parsed = parse_with_config(input, &read_runtime_config());
    to_js_value(&parsed)
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = analyze))]
pub fn analyze_js(input: &str) -> Result<JsValue, JsValue> {
    let output = analyze_with_config(input, &read_runtime_config());
    to_js_value(&output)
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = exportJson))]
pub fn export_js(input: &str) -> Result<String, JsValue> {
    let parsed = parse_with_config(input, &read_runtime_config());
    to_json_document(&parsed.graph)
        .map_err(|err| js_error(format!("failed to export graph: {err}")))
}
