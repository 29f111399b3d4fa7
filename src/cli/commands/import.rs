use std::fs;

use super::super::{Ctx, ImportArgs};
use crate::core::Kind;
use crate::store::Store;
use crate::{Error, Result, import};

pub(crate) fn handle(ctx: &Ctx, args: ImportArgs) -> Result<()> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(Error::Usage("--name must not be empty".to_string()));
    }

    let input = fs::read_to_string(&args.file).map_err(|e| Error::Io {
        path: args.file.clone(),
        source: e,
    })?;
    let log = import::read_csv(&input, args.kind)?;

    let mut store = Store::open(&ctx.root)?;
    if args.kind == Kind::Base {
        store.create_base(name)?;
    } else {
        // Patches and snapshots only make sense against an existing base.
        store.base(name)?;
    }
    let path = store.append(name, &log)?;

    println!(
        "imported {} records into base `{}` ({})",
        log.records.len(),
        name,
        path.display()
    );
    Ok(())
}
