//! Skybox descriptors and the environment update protocol.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! Skybox materials travel as material extras under the `skybox` key. When a
//! document is read back, each marker becomes an [`EnvironmentRequest`].
//! Hosts apply them in two phases: requests are queued with
//! [`EnvironmentUpdateQueue::request_environment_update`] and applied later by
//! [`EnvironmentUpdateQueue::poll_and_apply`] once the host is ready.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Material extras key carrying a [`SkyboxDescriptor`].
pub const SKYBOX_EXTRAS_KEY: &str = "skybox";

/// Serialized skybox parameters. Texture references are document texture indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SkyboxDescriptor {
    /// Faces in +X, -X, +Y, -Y, +Z, -Z order; `None` where a face failed to export.
    SixSided {
        faces: Vec<Option<u32>>,
        tint: [f32; 4],
        exposure: f32,
        rotation: f32,
    },
    Equirectangular {
        texture: Option<u32>,
        tint: [f32; 4],
        exposure: f32,
        rotation: f32,
    },
    Procedural {
        sun_size: f32,
        atmosphere_thickness: f32,
        sky_tint: [f32; 4],
        ground_color: [f32; 4],
        exposure: f32,
    },
}

impl SkyboxDescriptor {
    /// Read a descriptor from material extras, if present and well-formed.
    #[must_use]
    pub fn from_extras(extras: &serde_json::Value) -> Option<Self> {
        let value = extras.get(SKYBOX_EXTRAS_KEY)?;
        match serde_json::from_value(value.clone()) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                tracing::warn!("ignoring malformed skybox extras: {e}");
                None
            }
        }
    }
}

/// A request to replace the host's environment.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentRequest {
    /// Material the skybox was read from.
    pub material: u32,
    pub material_name: Option<String>,
    pub skybox: SkyboxDescriptor,
}

/// Host side of the environment protocol.
pub trait EnvironmentHost {
    /// Whether the host can apply an environment now.
    fn ready_for_environment(&self) -> bool {
        true
    }

    fn apply_environment(&mut self, request: &EnvironmentRequest) -> Result<()>;
}

/// Pending environment updates.
#[derive(Debug, Default)]
pub struct EnvironmentUpdateQueue {
    pending: VecDeque<EnvironmentRequest>,
}

impl EnvironmentUpdateQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase one: record a request. Nothing is applied yet.
    pub fn request_environment_update(&mut self, request: EnvironmentRequest) {
        tracing::debug!(material = request.material, "environment update requested");
        self.pending.push_back(request);
    }

    /// Phase two: apply pending requests if the host is ready.
    ///
    /// Only one environment can be active, so the most recent request wins and
    /// earlier ones are discarded. Returns the number of requests consumed.
    /// If the host fails, the queue is left as it was.
    pub fn poll_and_apply(&mut self, host: &mut dyn EnvironmentHost) -> Result<usize> {
        if !host.ready_for_environment() {
            return Ok(0);
        }
        let Some(latest) = self.pending.back() else {
            return Ok(0);
        };
        host.apply_environment(latest)?;
        tracing::info!(material = latest.material, "environment applied");

        let consumed = self.pending.len();
        self.pending.clear();
        Ok(consumed)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
