//! Render job factory
//!
//! Turns the flat job submission form into the job document the director
//! hands to an agent.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_RES_X: u32 = 1920;
pub const DEFAULT_RES_Y: u32 = 1080;

/// Submission form as posted by the operator. Numeric fields may arrive as
/// numbers or strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobForm {
    #[serde(default)]
    pub project_path: Option<String>,
    #[serde(default)]
    pub graph_path: Option<String>,
    #[serde(default)]
    pub level_path: Option<String>,
    #[serde(default)]
    pub sequence_path: Option<String>,
    #[serde(default)]
    pub camera_name: Option<String>,
    #[serde(default, deserialize_with = "keep_null")]
    pub res_x: Option<Value>,
    #[serde(default, deserialize_with = "keep_null")]
    pub res_y: Option<Value>,
    #[serde(default)]
    pub time_of_day: Option<Value>,
    #[serde(default)]
    pub cloud_coverage: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub job_id: String,
    pub project_path: String,
    pub graph_path: String,
    pub level_path: String,
    pub sequence_path: String,
    pub camera_actor_name: String,
    pub output_path: String,
    pub resolution: [u32; 2],
    pub scene_settings: BTreeMap<String, f64>,
}

/// Build a job from `form`, naming it after `now`.
pub fn create_job(form: &JobForm, now: DateTime<Utc>) -> Result<JobSpec> {
    let job_id = format!("job_{}", now.timestamp());
    let project_path = form.project_path.clone().unwrap_or_default();
    let output_path = output_path_for(&project_path, &job_id);

    let resolution = [
        parse_u32("res_x", form.res_x.as_ref())?.unwrap_or(DEFAULT_RES_X),
        parse_u32("res_y", form.res_y.as_ref())?.unwrap_or(DEFAULT_RES_Y),
    ];

    let scene_params = [
        ("time_of_day", form.time_of_day.as_ref()),
        ("cloud_coverage", form.cloud_coverage.as_ref()),
    ];
    let mut scene_settings = BTreeMap::new();
    for (param, raw) in scene_params {
        if let Some(value) = parse_f64(param, raw)? {
            scene_settings.insert(param.to_string(), value);
        }
    }

    Ok(JobSpec {
        job_id,
        project_path,
        graph_path: form.graph_path.clone().unwrap_or_default(),
        level_path: form.level_path.clone().unwrap_or_default(),
        sequence_path: form.sequence_path.clone().unwrap_or_default(),
        camera_actor_name: form.camera_name.clone().unwrap_or_default(),
        output_path,
        resolution,
        scene_settings,
    })
}

/// `<project dir>/Saved/RenderJobs/<job_id>/export`, with forward slashes.
///
/// The project dir is the parent of a `.uproject` file, otherwise the path
/// itself.
pub fn output_path_for(project_path: &str, job_id: &str) -> String {
    let normalized = project_path.replace('\\', "/");
    let project_dir = if normalized.ends_with(".uproject") {
        match normalized.rfind('/') {
            Some(idx) => &normalized[..idx],
            None => "",
        }
    } else {
        normalized.trim_end_matches('/')
    };

    let tail = format!("Saved/RenderJobs/{}/export", job_id);
    if project_dir.is_empty() {
        tail
    } else {
        format!("{}/{}", project_dir, tail)
    }
}

// A present `null` stays `Some(Value::Null)` so it can be told apart from an
// absent key.
fn keep_null<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Absent means default; an explicit `null` is an error.
fn parse_u32(field: &str, value: Option<&Value>) -> Result<Option<u32>> {
    match value {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .with_context(|| format!("{} must be a positive integer, got {}", field, n)),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a positive integer, got {:?}", field, s)),
        Some(other) => anyhow::bail!("{} must be a positive integer, got {}", field, other),
    }
}

fn parse_f64(field: &str, value: Option<&Value>) -> Result<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .with_context(|| format!("{} must be a number", field)),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a number, got {:?}", field, s)),
        Some(other) => anyhow::bail!("{} must be a number, got {}", field, other),
    }
}
