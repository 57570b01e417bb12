/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};

const DEFAULT_MIN_COMPARABLE_CHARS: usize = 5;
const DEFAULT_CONTENT_MATCH_WINDOW_HOURS: u32 = 24;

/// Thresholds of the content-based duplicate rule. Policy numbers, not
/// invariants; unset fields fall back to the defaults.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DedupConfig {
    pub min_comparable_chars: Option<usize>,
    pub content_match_window_hours: Option<u32>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            min_comparable_chars: Some(DEFAULT_MIN_COMPARABLE_CHARS),
            content_match_window_hours: Some(DEFAULT_CONTENT_MATCH_WINDOW_HOURS),
        }
    }
}

impl DedupConfig {
    pub fn min_chars(&self) -> usize {
        self.min_comparable_chars.unwrap_or(DEFAULT_MIN_COMPARABLE_CHARS)
    }

    pub fn window_ms(&self) -> i64 {
        i64::from(
            self.content_match_window_hours
                .unwrap_or(DEFAULT_CONTENT_MATCH_WINDOW_HOURS),
        ) * 3600 * 1000
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub dedup: DedupConfig,
}

impl CoreConfig {
    pub fn from_json(json: &str) -> Result<CoreConfig> {
        serde_json::from_str(json).context("parse core config")
    }
}
