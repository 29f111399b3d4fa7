use std::path::PathBuf;

use super::super::{Ctx, PluginArgs, render};
use crate::store::Store;
use crate::{Result, plugin};

/// Field used for preview runs; it is never persisted because preview skips
/// the append.
const PREVIEW_FIELD: &str = "@new";

pub(crate) fn handle(ctx: &Ctx, args: PluginArgs) -> Result<()> {
    let mut store = Store::open(&ctx.root)?;
    let name = args.name.trim();
    let mut view = store.load(name)?;

    match args.plugin.as_str() {
        plugin::HOMEWORK_COUNT => {
            let usage = "homework-count <submissions-dir> [field]";
            let (dir, field) = match args.args.as_slice() {
                [dir] => (PathBuf::from(dir), None),
                [dir, field] if !field.trim().is_empty() => {
                    (PathBuf::from(dir), Some(field.trim().to_string()))
                }
                _ => return Err(plugin::PluginError::Usage(usage).into()),
            };

            let view_only = field.is_none();
            let field = field.unwrap_or_else(|| PREVIEW_FIELD.to_string());
            let patch = plugin::homework_count(&dir, &field, "T")?;

            println!("derived patch:");
            print!("{}", render::render_table(&patch));

            // Folding into the loaded view checks the patch applies cleanly
            // before anything is persisted.
            view.merge(&patch)?;

            if view_only {
                println!("\npreview of the merged view:");
                print!("{}", render::render_table(&view));
            } else {
                let path = store.append(name, &patch)?;
                println!("recorded patch for base `{name}` ({})", path.display());
            }
            Ok(())
        }
        other => Err(plugin::PluginError::Unknown(other.to_string()).into()),
    }
}
