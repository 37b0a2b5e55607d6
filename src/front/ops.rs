use std::{io::Write, thread};

use anyhow::Context;
use log::{debug, error, info};
use tabwriter::TabWriter;

use super::cli::{CheckArgs, RunArgs};
use crate::core::{network::InterfaceList, Driver, DriverConfig, Operation};

pub fn check(args: CheckArgs) -> anyhow::Result<()> {
    let config = DriverConfig::load(&args.config)?;
    let driver = config.build_driver()?;

    info!(
        "[Ops]: Config {} is valid, {} networks, {} operations",
        args.config.display(),
        config.networks.len(),
        config.operations.len()
    );

    println!("{}", render_networks(&driver)?);
    Ok(())
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = DriverConfig::load(&args.config)?;
    let driver = config.build_driver()?;

    let failures = apply(&driver, &config.operations, args.workers);
    for failure in &failures {
        eprintln!("{failure:#}");
    }

    println!("{}", render_endpoints(&driver)?);

    if !failures.is_empty() {
        anyhow::bail!(
            "{} of {} operations failed",
            failures.len(),
            config.operations.len()
        );
    }
    Ok(())
}

/// Applies `ops` in order and returns the failures.
///
/// Runs of consecutive creates are spread over `workers` threads; a delete
/// waits for every operation before it.
pub fn apply(driver: &Driver, ops: &[Operation], workers: usize) -> Vec<anyhow::Error> {
    let mut failures = Vec::new();
    let mut batch: Vec<&Operation> = Vec::new();

    for op in ops {
        match op {
            Operation::Create { .. } if workers > 1 => batch.push(op),
            _ => {
                failures.extend(apply_batch(driver, &batch, workers));
                batch.clear();

                if let Err(e) = apply_one(driver, op) {
                    failures.push(e);
                }
            }
        }
    }
    failures.extend(apply_batch(driver, &batch, workers));

    failures
}

fn apply_batch(driver: &Driver, batch: &[&Operation], workers: usize) -> Vec<anyhow::Error> {
    if batch.is_empty() {
        return Vec::new();
    }

    debug!(
        "[Ops]: Applying {} creates on {workers} threads",
        batch.len()
    );

    let chunk_size = batch.len().div_ceil(workers);
    thread::scope(|s| {
        let handles: Vec<_> = batch
            .chunks(chunk_size)
            .map(|chunk| {
                s.spawn(move || {
                    chunk
                        .iter()
                        .filter_map(|op| apply_one(driver, op).err())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(failures) => failures,
                Err(_) => vec![anyhow::anyhow!("Worker thread panicked")],
            })
            .collect()
    })
}

fn apply_one(driver: &Driver, op: &Operation) -> anyhow::Result<()> {
    let result = match op {
        Operation::Create {
            network, endpoint, ..
        } => {
            let mut info = match op.interface()? {
                Some(iface) => InterfaceList {
                    interfaces: vec![iface],
                },
                None => InterfaceList::new(),
            };

            driver
                .create_endpoint(network, endpoint, Some(&mut info))
                .with_context(|| format!("Failed to create endpoint {endpoint} in {network}"))
        }
        Operation::Delete { network, endpoint } => driver
            .delete_endpoint(network, endpoint)
            .with_context(|| format!("Failed to delete endpoint {endpoint} from {network}")),
    };

    result.inspect_err(|e| error!("[Ops]: {e:#}"))
}

pub fn render_networks(driver: &Driver) -> anyhow::Result<String> {
    let mut tw = TabWriter::new(vec![]);
    tw.write_all(b"ID\tSUBNET\tCAPACITY\tIN USE\n")?;

    for net in driver.networks() {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}",
            net.id(),
            net.subnet(),
            net.pool().capacity(),
            net.pool().in_use()
        )?;
    }

    into_string(tw)
}

pub fn render_endpoints(driver: &Driver) -> anyhow::Result<String> {
    let mut tw = TabWriter::new(vec![]);
    tw.write_all(b"NETWORK\tENDPOINT\tMAC\tADDRESS\tSOURCE\n")?;

    for net in driver.networks() {
        for ep in driver.endpoints(net.id())? {
            let source = if ep.allocated {
                "allocated"
            } else {
                "pre-assigned"
            };
            writeln!(
                tw,
                "{}\t{}\t{}\t{}\t{}",
                net.id(),
                ep.id,
                ep.mac,
                ep.address,
                source
            )?;
        }
    }

    into_string(tw)
}

fn into_string(mut tw: TabWriter<Vec<u8>>) -> anyhow::Result<String> {
    tw.flush()?;

    let buf = tw
        .into_inner()
        .map_err(|_| anyhow::anyhow!("Failed to flush table"))?;
    Ok(String::from_utf8(buf)?)
}
