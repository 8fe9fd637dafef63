//! Shared JSON fixtures for rig tests and benches.
//!
//! Fixture files live under the workspace `fixtures/` directory and are indexed
//! by `fixtures/manifest.json`. Poses are skeletons (`PoseNodeData` arrays);
//! rigs are constraint descriptions that bind against a named pose.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    poses: HashMap<String, String>,
    rigs: HashMap<String, RigEntry>,
}

#[derive(Debug, Deserialize)]
struct RigEntry {
    path: String,
    /// Pose fixture the rig's references resolve against.
    pose: String,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod poses {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.poses.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.poses, "pose", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.poses, "pose", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.poses, "pose", name)?;
        Ok(resolve_path(rel))
    }
}

pub mod rigs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.rigs.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.rigs, "rig", name)?;
        read_to_string(&entry.path)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.rigs, "rig", name)?;
        super::load_json(&entry.path)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.rigs, "rig", name)?;
        Ok(resolve_path(&entry.path))
    }

    /// Name of the pose fixture this rig is authored against.
    pub fn pose_key(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.rigs, "rig", name)?;
        Ok(entry.pose.clone())
    }

    /// Pose JSON for the rig's skeleton.
    pub fn pose_json(name: &str) -> Result<String> {
        super::poses::json(&pose_key(name)?)
    }
}
