use structopt::StructOpt;

use bin_common::Config as BinCommonConfig;
use transaction_util::RctMode;

fn parse_mode(mode: &str) -> Result<RctMode, String> {
    match mode {
        "auto" => Ok(RctMode::Auto),
        "full" => Ok(RctMode::Full),
        "simple" => Ok(RctMode::Simple),
        _ => Err(format!("Unknown signature mode {}", mode)),
    }
}

#[derive(StructOpt, Debug)]
#[structopt(rename_all = "kebab-case")]
pub struct Config {
    #[structopt(flatten)]
    pub bin_common_config: BinCommonConfig,

    /// Number of ring members per input, including the real output
    #[structopt(long, default_value = "11")]
    pub ring_size: usize,

    /// Number of inputs per transaction
    #[structopt(long, default_value = "2")]
    pub inputs: usize,

    /// Number of outputs per transaction
    #[structopt(long, default_value = "2")]
    pub outputs: usize,

    /// Number of transactions to build
    #[structopt(long, default_value = "10")]
    pub iterations: u32,

    /// Signature layout: auto, full or simple
    #[structopt(long, default_value = "auto", parse(try_from_str = parse_mode))]
    pub mode: RctMode,
}
