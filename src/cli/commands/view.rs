use super::super::{Ctx, ViewArgs, render};
use crate::Result;
use crate::store::Store;

pub(crate) fn handle(ctx: &Ctx, args: ViewArgs) -> Result<()> {
    let store = Store::open(&ctx.root)?;
    let view = store.load(args.name.trim())?;
    print!("{}", render::render_table(&view));
    Ok(())
}
