use std::io::Write;

use crate::config::{BagArgs, InspectConfig};
use crate::error::InspectError;

pub fn run(args: &BagArgs, config: &InspectConfig, out: &mut impl Write) -> Result<(), InspectError> {
    let registry = super::registry();
    let mut storage = super::open_storage(&registry, config, &args.bag)?;
    let metadata = storage.get_metadata()?;
    storage.close();

    serde_json::to_writer_pretty(&mut *out, &metadata)?;
    writeln!(out)?;
    Ok(())
}
