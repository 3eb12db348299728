//! Command-line definitions
//!
//! One subcommand per primitive. The three positionals are optional at the
//! clap level so that a short argument list still produces a `UsageError`
//! envelope instead of clap's own exit. Anything after `<params>` is
//! collected into a hidden list and ignored.

use clap::{Args, Parser, Subcommand};

use crate::application::primitives::{
    DescribeRaster, DescribeTable, ReprojectVector, SubsetVector, ValidateVector,
};

/// Canopy - run one spatial-data primitive and emit a JSON envelope
#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// The `<inputs> <output> <params>` triple
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Inputs mapping: path to a JSON file or inline JSON
    pub inputs: Option<String>,

    /// Output path written by the primitive
    pub output: Option<String>,

    /// Parameters: path to a JSON file or inline JSON
    pub params: Option<String>,

    /// Trailing positionals, accepted and ignored
    #[arg(hide = true)]
    pub extra: Vec<String>,
}

impl Invocation {
    /// Positionals actually supplied, in order
    pub fn raw_args(&self) -> Vec<&str> {
        [&self.inputs, &self.output, &self.params]
            .into_iter()
            .map_while(|a| a.as_deref())
            .chain(self.extra.iter().map(String::as_str))
            .collect()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check and optionally repair a vector layer
    ValidateVector(Invocation),

    /// Reproject a vector layer into `target_crs`
    ReprojectVector(Invocation),

    /// Keep the features that fall within a boundary
    SubsetVector(Invocation),

    /// Summarize a raster, optionally reprojecting it
    DescribeRaster(Invocation),

    /// Summarize a tabular dataset
    DescribeTable(Invocation),
}

impl Commands {
    pub fn primitive_name(&self) -> &'static str {
        match self {
            Commands::ValidateVector(_) => ValidateVector::NAME,
            Commands::ReprojectVector(_) => ReprojectVector::NAME,
            Commands::SubsetVector(_) => SubsetVector::NAME,
            Commands::DescribeRaster(_) => DescribeRaster::NAME,
            Commands::DescribeTable(_) => DescribeTable::NAME,
        }
    }

    pub fn invocation(&self) -> &Invocation {
        match self {
            Commands::ValidateVector(inv)
            | Commands::ReprojectVector(inv)
            | Commands::SubsetVector(inv)
            | Commands::DescribeRaster(inv)
            | Commands::DescribeTable(inv) => inv,
        }
    }
}
