use chrono::{DateTime, Utc};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::models::{PersistedState, StatusRecord};
use crate::utils::fs::{append_line, load_json, save_json_atomic};
use crate::Result;

/// JSON file holding the monitor's [`PersistedState`].
///
/// Accessed by one process at a time; writes are atomic so an observer never
/// sees a half-written file.
pub struct StateStore {
    path: PathBuf,
    ci_output: Option<PathBuf>,
}

impl StateStore {
    /// Exports saved states to `$GITHUB_OUTPUT` when running under GitHub
    /// Actions.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ci_output: ci_output_path(env::var_os("GITHUB_ACTIONS"), env::var_os("GITHUB_OUTPUT")),
        }
    }

    pub fn with_ci_output(mut self, ci_output: Option<PathBuf>) -> Self {
        self.ci_output = ci_output;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file yields the empty first-run state.
    pub fn load(&self) -> Result<PersistedState> {
        match load_json::<PersistedState>(&self.path) {
            Ok(Some(state)) => {
                debug!(path = %self.path.display(), error_count = state.error_count, "Loaded state");
                Ok(state)
            }
            Ok(None) => {
                info!(path = %self.path.display(), "No previous state found");
                Ok(PersistedState::default())
            }
            Err(crate::AppError::Serialization(e)) => {
                warn!(path = %self.path.display(), error = %e, "State file is corrupt, starting fresh");
                Ok(PersistedState::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Writes `state` as given and stamps `last_check`.
    pub fn save(&self, state: &PersistedState) -> Result<PersistedState> {
        let mut stored = state.clone();
        stored.last_check = Some(Utc::now());
        save_json_atomic(&self.path, &stored)?;
        debug!(path = %self.path.display(), status = %stored.status(), "State saved");

        if let Some(ci_output) = &self.ci_output {
            if let Err(e) = export_state(ci_output, &stored) {
                warn!(path = %ci_output.display(), error = %e, "Could not export state to CI output");
            }
        }
        Ok(stored)
    }

    /// Replaces the last record, keeping the stored error bookkeeping.
    pub fn save_record(&self, record: StatusRecord) -> Result<PersistedState> {
        let mut state = self.load()?;
        state.last_record = Some(record);
        self.save(&state)
    }

    pub fn increment_error(&self) -> Result<u32> {
        let mut state = self.load()?;
        state.error_count += 1;
        state.last_error = Some(Utc::now());
        self.write_without_check_stamp(&state)?;
        Ok(state.error_count)
    }

    pub fn reset_error(&self) -> Result<()> {
        let mut state = self.load()?;
        if state.error_count == 0 {
            return Ok(());
        }
        state.error_count = 0;
        self.write_without_check_stamp(&state)?;
        info!("Error count reset");
        Ok(())
    }

    pub fn last_check_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.load()?.last_check)
    }

    fn write_without_check_stamp(&self, state: &PersistedState) -> Result<()> {
        save_json_atomic(&self.path, state)
    }
}

fn ci_output_path(github_actions: Option<OsString>, github_output: Option<OsString>) -> Option<PathBuf> {
    github_actions?;
    github_output
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

/// Appends `state_json=<compact json>` for the workflow's artifact step.
fn export_state(ci_output: &Path, state: &PersistedState) -> Result<()> {
    let json = serde_json::to_string(state)?;
    append_line(ci_output, &format!("state_json={}", json))?;
    info!("State saved to CI output");
    Ok(())
}
