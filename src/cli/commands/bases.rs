use super::super::Ctx;
use crate::Result;
use crate::store::Store;

pub(crate) fn handle(ctx: &Ctx) -> Result<()> {
    let store = Store::open(&ctx.root)?;

    let mut any = false;
    for meta in store.bases() {
        any = true;
        let units = meta.next_log_id;
        let noun = if units == 1 { "unit" } else { "units" };
        println!("{}  ({units} {noun})", meta.name);
    }
    if !any {
        println!("no bases registered");
    }
    Ok(())
}
