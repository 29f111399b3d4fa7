use super::super::Ctx;
use crate::Result;
use crate::store::Store;

pub(crate) fn handle(ctx: &Ctx) -> Result<()> {
    Store::init(&ctx.root)?;
    println!("initialized store at {}", ctx.root.display());
    Ok(())
}
