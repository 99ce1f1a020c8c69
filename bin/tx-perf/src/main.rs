use std::time::{Duration, Instant};

use anyhow::{ensure, Context};
use log::{debug, info};
use rand::rngs::OsRng;
use structopt::StructOpt;

use common::GetHash;
use crypto::ecc::Scalar;
use transaction_util::{AccountKeys, TxConstructor};

mod config;
mod mock;

use config::Config;

fn main() -> anyhow::Result<()> {
    // Command Line Arguments
    let config = Config::from_args();

    // Logging
    bin_common::logger::init(&config.bin_common_config, "tx-perf")
        .context("Failed to initialise logger")?;

    run(&config)
}

fn run(config: &Config) -> anyhow::Result<()> {
    ensure!(config.ring_size >= 2, "Rings need at least two members");
    ensure!(config.inputs > 0 && config.outputs > 0, "Need inputs and outputs");

    info!(
        "Building {} transactions: {} inputs, ring size {}, {} outputs, {:?} signatures",
        config.iterations, config.inputs, config.ring_size, config.outputs, config.mode
    );

    let mut rng = OsRng;
    let sender = AccountKeys::from(Scalar::random(&mut rng));
    let recipient = AccountKeys::from(Scalar::random(&mut rng)).address();
    let destinations = mock::destinations(&recipient, config.inputs, config.outputs);

    let mut construction = Duration::default();
    let mut checking = Duration::default();
    let mut total_size = 0;
    for iteration in 0..config.iterations {
        let sources = (0..config.inputs)
            .map(|_| mock::source(&mut rng, &sender, config.ring_size))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let start = Instant::now();
        let (transaction, _) = TxConstructor::new(&sender, rng).construct(
            &sources,
            &destinations,
            &[],
            0,
            config.mode,
        )?;
        construction += start.elapsed();

        let signature = transaction
            .rct_signature
            .as_ref()
            .context("Transaction was not signed")?;
        let start = Instant::now();
        ringct::verify(signature)?;
        checking += start.elapsed();

        let size = bincode::serialize(&transaction)?.len();
        total_size += size;
        debug!(
            "Transaction {} ({:?}): {}, {} bytes",
            iteration,
            signature.signature_type(),
            transaction.get_hash(),
            size
        );
    }

    let iterations = config.iterations.max(1);
    info!("Construction: {:?} per transaction", construction / iterations);
    info!("Check: {:?} per transaction", checking / iterations);
    info!("Size: {} bytes per transaction", total_size / iterations as usize);
    Ok(())
}
