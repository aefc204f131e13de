// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Configuration of the hydrogen bond occurrence analysis.
//!
//! The configuration can be read from a YAML file:
//! ```yaml
//! trajectory: trajectory_prod1.dcd
//! topology: topology.pdb
//! output: 15-111_Hbond_occurence_prod1.dat
//! donor: resSeq 15 and name NZ
//! hydrogen: resSeq 15 and name HZ1
//! acceptor: resSeq 111 and name OE1
//! pre_acceptor: resSeq 111 and name CD
//! # optional
//! criteria:
//!   max_distance: 0.25
//!   dha_angle: [120.0, 180.0]
//!   hapa_angle: [90.0, 180.0]
//! ambiguity: error
//! degenerate: fail
//! n_threads: 1
//! progress: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use getset::{CopyGetters, Getters};
use serde::Deserialize;

use crate::errors::{ConfigError, CriteriaError};
use crate::hbonds::criteria::HBondCriteria;
use crate::hbonds::DegeneratePolicy;
use crate::select::AmbiguityPolicy;

/// Thresholds of the hydrogen bond definition as specified in the configuration.
/// Missing values are replaced by the default thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CriteriaConfig {
    /// Maximal hydrogen-acceptor distance in nm.
    pub max_distance: Option<f32>,
    /// Minimal and maximal donor-hydrogen-acceptor angle in degrees.
    pub dha_angle: Option<[f32; 2]>,
    /// Minimal and maximal hydrogen-acceptor-pre-acceptor angle in degrees.
    pub hapa_angle: Option<[f32; 2]>,
}

impl CriteriaConfig {
    /// Construct validated criteria.
    pub fn to_criteria(&self) -> Result<HBondCriteria, CriteriaError> {
        let default = HBondCriteria::default();

        HBondCriteria::new(
            self.max_distance.unwrap_or(default.max_distance()),
            self.dha_angle
                .map(|[min, max]| (min, max))
                .unwrap_or(default.dha_angle()),
            self.hapa_angle
                .map(|[min, max]| (min, max))
                .unwrap_or(default.hapa_angle()),
        )
    }

    /// Values specified in `other` take precedence.
    fn merge(self, other: CriteriaConfig) -> CriteriaConfig {
        CriteriaConfig {
            max_distance: other.max_distance.or(self.max_distance),
            dha_angle: other.dha_angle.or(self.dha_angle),
            hapa_angle: other.hapa_angle.or(self.hapa_angle),
        }
    }
}

/// Partially specified configuration. Can be read from a YAML file,
/// filled in from command line arguments, and merged.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigBuilder {
    pub trajectory: Option<PathBuf>,
    pub topology: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub donor: Option<String>,
    pub hydrogen: Option<String>,
    pub acceptor: Option<String>,
    pub pre_acceptor: Option<String>,
    pub criteria: Option<CriteriaConfig>,
    pub ambiguity: Option<AmbiguityPolicy>,
    pub degenerate: Option<DegeneratePolicy>,
    pub n_threads: Option<usize>,
    pub progress: Option<bool>,
}

impl ConfigBuilder {
    /// Read a partial configuration from a YAML file.
    ///
    /// ## Returns
    /// - `ConfigBuilder` if the file could be read and parsed.
    /// - `ConfigError::FileNotFound` if the file could not be read.
    /// - `ConfigError::CouldNotParse` if the file is not valid YAML or contains unknown options.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(filename.as_ref())
            .map_err(|_| ConfigError::FileNotFound(Box::from(filename.as_ref())))?;

        ConfigBuilder::from_yaml(&yaml, filename.as_ref())
    }

    fn from_yaml(yaml: &str, filename: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| ConfigError::CouldNotParse(Box::from(filename), e.to_string()))
    }

    /// Combine two configurations. Options specified in `other` take precedence.
    pub fn merge(self, other: ConfigBuilder) -> ConfigBuilder {
        let criteria = match (self.criteria, other.criteria) {
            (Some(x), Some(y)) => Some(x.merge(y)),
            (x, y) => y.or(x),
        };

        ConfigBuilder {
            trajectory: other.trajectory.or(self.trajectory),
            topology: other.topology.or(self.topology),
            output: other.output.or(self.output),
            donor: other.donor.or(self.donor),
            hydrogen: other.hydrogen.or(self.hydrogen),
            acceptor: other.acceptor.or(self.acceptor),
            pre_acceptor: other.pre_acceptor.or(self.pre_acceptor),
            criteria,
            ambiguity: other.ambiguity.or(self.ambiguity),
            degenerate: other.degenerate.or(self.degenerate),
            n_threads: other.n_threads.or(self.n_threads),
            progress: other.progress.or(self.progress),
        }
    }

    /// Validate the configuration and fill in the default values.
    ///
    /// ## Returns
    /// - `HBondConfig` if all required options are provided and valid.
    /// - `ConfigError::MissingOption` if a required option is missing.
    /// - `ConfigError::InvalidCriteria` if the thresholds are invalid.
    /// - `ConfigError::InvalidThreads` if the number of threads is zero.
    pub fn build(self) -> Result<HBondConfig, ConfigError> {
        fn required<T>(value: Option<T>, name: &str) -> Result<T, ConfigError> {
            value.ok_or_else(|| ConfigError::MissingOption(name.to_owned()))
        }

        let criteria = self
            .criteria
            .unwrap_or_default()
            .to_criteria()
            .map_err(ConfigError::InvalidCriteria)?;

        let n_threads = match self.n_threads {
            Some(0) => return Err(ConfigError::InvalidThreads),
            Some(n) => n,
            None => 1,
        };

        Ok(HBondConfig {
            trajectory: required(self.trajectory, "trajectory")?,
            topology: required(self.topology, "topology")?,
            output: required(self.output, "output")?,
            donor: required(self.donor, "donor")?,
            hydrogen: required(self.hydrogen, "hydrogen")?,
            acceptor: required(self.acceptor, "acceptor")?,
            pre_acceptor: required(self.pre_acceptor, "pre_acceptor")?,
            criteria,
            ambiguity: self.ambiguity.unwrap_or_default(),
            degenerate: self.degenerate.unwrap_or_default(),
            n_threads,
            progress: self.progress.unwrap_or(false),
        })
    }
}

/// Complete and validated configuration of the hydrogen bond occurrence analysis.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct HBondConfig {
    /// Trajectory file (`dcd`, `gro`, or `pdb`).
    #[getset(get = "pub")]
    trajectory: PathBuf,
    /// Structure file (`gro` or `pdb`).
    #[getset(get = "pub")]
    topology: PathBuf,
    /// Output file for the occurrence report.
    #[getset(get = "pub")]
    output: PathBuf,
    #[getset(get = "pub")]
    donor: String,
    #[getset(get = "pub")]
    hydrogen: String,
    #[getset(get = "pub")]
    acceptor: String,
    #[getset(get = "pub")]
    pre_acceptor: String,
    #[getset(get_copy = "pub")]
    criteria: HBondCriteria,
    #[getset(get_copy = "pub")]
    ambiguity: AmbiguityPolicy,
    #[getset(get_copy = "pub")]
    degenerate: DegeneratePolicy,
    #[getset(get_copy = "pub")]
    n_threads: usize,
    /// Print progress of the trajectory reading.
    #[getset(get_copy = "pub")]
    progress: bool,
}

impl HBondConfig {
    /// Read the configuration from a YAML file.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigBuilder::from_file(filename)?.build()
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn parse(yaml: &str) -> Result<ConfigBuilder, ConfigError> {
        ConfigBuilder::from_yaml(yaml, Path::new("config.yaml"))
    }

    const MINIMAL: &str = "
trajectory: traj.dcd
topology: top.pdb
output: out.dat
donor: resSeq 15 and name NZ
hydrogen: resSeq 15 and name HZ1
acceptor: resSeq 111 and name OE1
pre_acceptor: resSeq 111 and name CD
";

    #[test]
    fn read_full() {
        let config = HBondConfig::from_file("test_files/config.yaml").unwrap();

        assert_eq!(config.trajectory(), Path::new("test_files/hbond_traj.dcd"));
        assert_eq!(config.topology(), Path::new("test_files/hbond.pdb"));
        assert_eq!(config.output(), Path::new("hbond_occurrence.dat"));
        assert_eq!(config.donor(), "resSeq 15 and name NZ");
        assert_eq!(config.hydrogen(), "resSeq 15 and name HZ1");
        assert_eq!(config.acceptor(), "resSeq 111 and name OE1");
        assert_eq!(config.pre_acceptor(), "resSeq 111 and name CD");

        assert_approx_eq!(f32, config.criteria().max_distance(), 0.3);
        assert_eq!(config.criteria().dha_angle(), (130.0, 180.0));
        assert_eq!(config.criteria().hapa_angle(), (90.0, 180.0));

        assert_eq!(config.ambiguity(), AmbiguityPolicy::First);
        assert_eq!(config.degenerate(), DegeneratePolicy::Mark);
        assert_eq!(config.n_threads(), 4);
        assert!(config.progress());
    }

    #[test]
    fn read_minimal_defaults() {
        let config = parse(MINIMAL).unwrap().build().unwrap();

        assert_eq!(config.criteria(), HBondCriteria::default());
        assert_eq!(config.ambiguity(), AmbiguityPolicy::Error);
        assert_eq!(config.degenerate(), DegeneratePolicy::Fail);
        assert_eq!(config.n_threads(), 1);
        assert!(!config.progress());
    }

    #[test]
    fn read_nonexistent() {
        match HBondConfig::from_file("test_files/nonexistent.yaml") {
            Err(ConfigError::FileNotFound(_)) => (),
            other => panic!("Unexpected result `{:?}`.", other),
        }
    }

    #[test]
    fn unknown_option() {
        let yaml = format!("{}distance: 0.3\n", MINIMAL);
        match parse(&yaml) {
            Err(ConfigError::CouldNotParse(_, _)) => (),
            other => panic!("Unexpected result `{:?}`.", other),
        }
    }

    #[test]
    fn unknown_policy() {
        let yaml = format!("{}ambiguity: last\n", MINIMAL);
        match parse(&yaml) {
            Err(ConfigError::CouldNotParse(_, _)) => (),
            other => panic!("Unexpected result `{:?}`.", other),
        }
    }

    #[test]
    fn missing_option() {
        let builder = parse("trajectory: traj.dcd\ntopology: top.pdb\noutput: out.dat\n").unwrap();
        assert_eq!(
            builder.build(),
            Err(ConfigError::MissingOption("donor".to_owned()))
        );
    }

    #[test]
    fn invalid_criteria() {
        let yaml = format!("{}criteria:\n  dha_angle: [150.0, 120.0]\n", MINIMAL);
        assert_eq!(
            parse(&yaml).unwrap().build(),
            Err(ConfigError::InvalidCriteria(
                CriteriaError::InvalidAngleRange(150.0, 120.0)
            ))
        );
    }

    #[test]
    fn invalid_threads() {
        let yaml = format!("{}n_threads: 0\n", MINIMAL);
        assert_eq!(
            parse(&yaml).unwrap().build(),
            Err(ConfigError::InvalidThreads)
        );
    }

    #[test]
    fn merge_overrides() {
        let file = parse(&format!(
            "{}criteria:\n  max_distance: 0.3\n  dha_angle: [130.0, 180.0]\n",
            MINIMAL
        ))
        .unwrap();

        let cli = ConfigBuilder {
            output: Some("cli.dat".into()),
            criteria: Some(CriteriaConfig {
                max_distance: Some(0.35),
                ..Default::default()
            }),
            n_threads: Some(2),
            ..Default::default()
        };

        let config = file.merge(cli).build().unwrap();

        assert_eq!(config.output(), Path::new("cli.dat"));
        assert_eq!(config.trajectory(), Path::new("traj.dcd"));
        assert_approx_eq!(f32, config.criteria().max_distance(), 0.35);
        assert_eq!(config.criteria().dha_angle(), (130.0, 180.0));
        assert_eq!(config.n_threads(), 2);
    }

    #[test]
    fn merge_empty() {
        let file = parse(MINIMAL).unwrap();
        assert_eq!(file.clone().merge(ConfigBuilder::default()), file);
        assert_eq!(ConfigBuilder::default().merge(file.clone()), file);
    }
}
