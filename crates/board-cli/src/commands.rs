//! Command execution
//!
//! Every board command loads, applies its change, settles outstanding
//! backend calls, then prints the resulting view and the shared error.
//! `optimize` only talks to the endpoint.

use crate::cli::BoardCommand;
use crate::render;
use crate::resolve::{resolve, ResolveError};
use anyhow::Context;
use board_core::{RequestId, ViewMode};
use board_sync::RequestStore;
use std::io::Write;

/// Run `command` against `store`, writing output to `out`
pub async fn execute<W: Write>(
    store: &RequestStore,
    command: BoardCommand,
    out: &mut W,
) -> anyhow::Result<()> {
    if let BoardCommand::Optimize { text } = &command {
        let optimized = store.optimize(text).await?;
        writeln!(out, "{optimized}")?;
        return Ok(());
    }

    store.load().await;

    let mut view = ViewMode::Board;
    match command {
        BoardCommand::List { view: chosen, json } => {
            if json {
                return print_json(store, out);
            }
            view = chosen;
        }
        BoardCommand::Add {
            requester,
            description,
            optimize,
        } => {
            let description = if optimize {
                store
                    .optimize(&description)
                    .await
                    .context("request not created")?
            } else {
                description
            };
            let created = store.create(&requester, &description)?;
            writeln!(out, "Added {}", render::short_id(&created.id))?;
        }
        BoardCommand::Move { id, status } => {
            let id = resolve(&store.requests(), &id)?;
            store.change_status(&id, status);
            writeln!(out, "Moved {} to {}", render::short_id(&id), status)?;
        }
        BoardCommand::Remove { ids } => {
            let requests = store.requests();
            let ids = ids
                .iter()
                .map(|raw| match resolve(&requests, raw) {
                    Ok(id) => Ok(id),
                    Err(ResolveError::NotFound(_)) => {
                        tracing::warn!("No local request matches '{}', deleting as given", raw);
                        Ok(RequestId::from(raw.trim()))
                    }
                    Err(e) => Err(e),
                })
                .collect::<Result<Vec<_>, _>>()?;

            match ids.as_slice() {
                [single] => store.remove(single),
                many => store.remove_batch(many),
            }
            writeln!(out, "Removed {}", ids.len())?;
        }
        BoardCommand::Optimize { .. } => {}
    }

    store.settle().await;

    let state = store.snapshot();
    writeln!(out)?;
    render::render(out, view, &state.requests)?;
    if let Some(error) = &state.error {
        render::render_error(out, error)?;
    }
    Ok(())
}

fn print_json<W: Write>(store: &RequestStore, out: &mut W) -> anyhow::Result<()> {
    let state = store.snapshot();
    let document = serde_json::json!({
        "requests": state.requests,
        "error": state.error,
    });
    serde_json::to_writer_pretty(&mut *out, &document)?;
    writeln!(out)?;
    Ok(())
}
