//! Options for one verification run

use driftcheck_config::ConfigProvider;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Read-only settings for a verification run
#[derive(Debug, Clone, Serialize)]
pub struct VerificationOptions {
    /// Environment name, used as the prefix of every live resource name
    pub environment: String,

    /// Skip the `terraform plan` tie-break when counts match
    pub skip_plan: bool,

    /// Treat not-found live query errors as zero counts
    pub ignore_resource_errors: bool,

    /// Deadline for the whole run
    #[serde(with = "duration_secs")]
    pub timeout: Duration,

    /// Suffix of a parallel deployment (e.g. "-blue")
    pub suffix: Option<String>,

    /// Terraform working directory
    pub terraform_dir: PathBuf,

    /// Read the declared state from this file instead of `terraform show`
    pub state_file: Option<PathBuf>,
}

impl VerificationOptions {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            skip_plan: false,
            ignore_resource_errors: false,
            timeout: DEFAULT_TIMEOUT,
            suffix: None,
            terraform_dir: PathBuf::from("."),
            state_file: None,
        }
    }

    /// Build options from a config provider
    ///
    /// `environment` is required; everything else falls back to defaults.
    pub fn from_config(config: &impl ConfigProvider) -> crate::Result<Self> {
        let mut options = Self::new(config.get_required("environment")?);

        if let Some(skip) = config.get_bool("skip_plan")? {
            options.skip_plan = skip;
        }
        if let Some(ignore) = config.get_bool("ignore_resource_errors")? {
            options.ignore_resource_errors = ignore;
        }
        if let Some(secs) = config.get_parsed::<u64>("timeout_secs")? {
            options.timeout = Duration::from_secs(secs);
        }
        options.suffix = config.get("suffix").filter(|s| !s.is_empty());
        if let Some(dir) = config.get("terraform_dir") {
            options.terraform_dir = PathBuf::from(dir);
        }
        options.state_file = config.get("state_file").map(PathBuf::from);

        Ok(options)
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        self.suffix = if suffix.is_empty() { None } else { Some(suffix) };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_skip_plan(mut self, skip: bool) -> Self {
        self.skip_plan = skip;
        self
    }

    pub fn with_ignore_resource_errors(mut self, ignore: bool) -> Self {
        self.ignore_resource_errors = ignore;
        self
    }

    pub fn with_terraform_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.terraform_dir = dir.into();
        self
    }

    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    /// The configured suffix, or "" when none is set
    pub fn suffix_str(&self) -> &str {
        self.suffix.as_deref().unwrap_or("")
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}
