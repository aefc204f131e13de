// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Command line interface for the hydrogen bond occurrence analysis.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use colored::Colorize;

use hbond_occurrence::config::{ConfigBuilder, CriteriaConfig};
use hbond_occurrence::hbonds::{self, DegeneratePolicy};
use hbond_occurrence::select::AmbiguityPolicy;

#[derive(Parser)]
#[command(name = "hbond_occurrence", version)]
#[command(about = "Calculate the per-frame occurrence of a single hydrogen bond", long_about = None)]
struct Cli {
    /// YAML configuration file. Options provided on the command line take precedence.
    #[arg(short, long, value_name = "YAML")]
    config: Option<PathBuf>,

    /// Trajectory file (dcd, gro, or pdb)
    #[arg(short = 'f', long)]
    trajectory: Option<PathBuf>,

    /// Structure file (gro or pdb)
    #[arg(short = 's', long)]
    topology: Option<PathBuf>,

    /// Output file for the occurrence report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Selection query for the donor atom
    #[arg(long)]
    donor: Option<String>,

    /// Selection query for the hydrogen atom
    #[arg(long)]
    hydrogen: Option<String>,

    /// Selection query for the acceptor atom
    #[arg(long)]
    acceptor: Option<String>,

    /// Selection query for the atom bound to the acceptor
    #[arg(long)]
    pre_acceptor: Option<String>,

    /// Maximal hydrogen-acceptor distance in nm [default: 0.25]
    #[arg(long)]
    max_distance: Option<f32>,

    /// Allowed donor-hydrogen-acceptor angles in degrees [default: 120 180]
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    dha_angle: Option<Vec<f32>>,

    /// Allowed hydrogen-acceptor-pre-acceptor angles in degrees [default: 90 180]
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    hapa_angle: Option<Vec<f32>>,

    /// What to do if a selection matches more than one atom [default: error]
    #[arg(long, value_parser = ["error", "first"])]
    ambiguity: Option<String>,

    /// What to do with frames in which two atoms share the same position [default: fail]
    #[arg(long, value_parser = ["fail", "mark"])]
    degenerate: Option<String>,

    /// Number of threads used to calculate the geometry [default: 1]
    #[arg(short, long)]
    n_threads: Option<usize>,

    /// Print progress of the trajectory reading
    #[arg(long, action = ArgAction::SetTrue)]
    progress: bool,
}

impl Cli {
    /// Convert the arguments into a partial configuration.
    fn into_builder(self) -> ConfigBuilder {
        let pair = |values: Option<Vec<f32>>| values.and_then(|v| <[f32; 2]>::try_from(v).ok());

        let criteria = CriteriaConfig {
            max_distance: self.max_distance,
            dha_angle: pair(self.dha_angle),
            hapa_angle: pair(self.hapa_angle),
        };

        ConfigBuilder {
            trajectory: self.trajectory,
            topology: self.topology,
            output: self.output,
            donor: self.donor,
            hydrogen: self.hydrogen,
            acceptor: self.acceptor,
            pre_acceptor: self.pre_acceptor,
            criteria: if criteria == CriteriaConfig::default() {
                None
            } else {
                Some(criteria)
            },
            ambiguity: self.ambiguity.map(|x| match x.as_str() {
                "first" => AmbiguityPolicy::First,
                _ => AmbiguityPolicy::Error,
            }),
            degenerate: self.degenerate.map(|x| match x.as_str() {
                "mark" => DegeneratePolicy::Mark,
                _ => DegeneratePolicy::Fail,
            }),
            n_threads: self.n_threads,
            progress: self.progress.then_some(true),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => ConfigBuilder::from_file(path)?,
        None => ConfigBuilder::default(),
    };

    let config = file.merge(cli.into_builder()).build()?;

    eprintln!(
        ">>>> Reading {}",
        config.trajectory().display().to_string().cyan()
    );

    let series = hbonds::run(&config).with_context(|| {
        format!(
            "analysis of trajectory '{}' failed",
            config.trajectory().display()
        )
    })?;

    println!("Occurrence is [%]: {}", series.fraction());

    if series.get_n_undefined() > 0 {
        eprintln!(
            "{} {} frame(s) with undefined geometry counted as frames without the hydrogen bond",
            "warning:".yellow().bold(),
            series.get_n_undefined().to_string().yellow(),
        );
    }

    eprintln!(
        ">>>> Written {}",
        config.output().display().to_string().cyan()
    );

    Ok(())
}
