//! Message processing and fan-out.
//!
//! Everything here is plain async logic over [`AppState`] so the whole
//! connection flow is testable without a live socket; `ws.rs` only feeds
//! it frames and tears the channel down.

use tracing::warn;

use chronicle_core::{ClientFrame, PlayerCharacter, ServerFrame};
use chronicle_engine::creation::{self, CreationStep};
use chronicle_engine::{CreationStage, TurnSnapshot};
use chronicle_session::{ChannelHandle, SessionError};

use crate::state::AppState;

/// Greet a freshly attached channel: confirm the connection, then either
/// welcome the user's existing character back (with a full state snapshot
/// to this channel only) or open character creation.
pub async fn greet(
    state: &AppState,
    user_id: &str,
    origin: &ChannelHandle,
) -> Result<(), SessionError> {
    origin.send(ServerFrame::connected("Connected to the game server!"))?;

    let (created, name, pending) = {
        let mut game = state.game.write().await;
        let pc = game
            .player_characters
            .entry(user_id.to_string())
            .or_insert_with(|| PlayerCharacter::blank(user_id));
        (
            pc.is_created(),
            pc.name.clone(),
            CreationStage::for_character(pc),
        )
    };

    if created {
        origin.send(ServerFrame::system(format!(
            "Welcome back, {}! Your adventure continues.",
            name
        )))?;
        // Existing character: snapshot goes to the new channel only, the
        // user's other windows already have it.
        if let Some(view) = state.game.read().await.view_for(user_id) {
            origin.send(ServerFrame::GameState(view))?;
        }
    } else if let Some(stage) = pending {
        origin.send(ServerFrame::system(stage_prompt(stage, &name)))?;
    }

    Ok(())
}

fn stage_prompt(stage: CreationStage, name: &str) -> String {
    match stage {
        CreationStage::Name => creation::opening_prompt().to_string(),
        CreationStage::Race => format!(
            "Welcome, {}! What race are you? (Human, Elf, Dwarf, Halfling)",
            name
        ),
        CreationStage::Class => {
            "What class are you? (Fighter, Wizard, Rogue, Cleric)".to_string()
        }
    }
}

/// Process one inbound payload from a channel.
///
/// Errors are send failures on the originating channel only; the caller
/// treats them as the channel being gone. A processing failure is reported
/// back as a `system_message` and never closes the channel.
pub async fn handle_inbound(
    state: &AppState,
    user_id: &str,
    raw: &str,
    origin: &ChannelHandle,
) -> Result<(), SessionError> {
    let frame = ClientFrame::parse_lossy(raw);
    handle_player_text(state, user_id, frame.text(), origin).await
}

pub async fn handle_player_text(
    state: &AppState,
    user_id: &str,
    text: &str,
    origin: &ChannelHandle,
) -> Result<(), SessionError> {
    let step = {
        let mut game = state.game.write().await;
        let pc = game
            .player_characters
            .entry(user_id.to_string())
            .or_insert_with(|| PlayerCharacter::blank(user_id));
        if CreationStage::for_character(pc).is_some() {
            Some(creation::advance(pc, text))
        } else {
            None
        }
    };

    match step {
        Some(CreationStep::Prompt(prompt)) => {
            origin.send(ServerFrame::system(prompt))?;
        }
        Some(CreationStep::Finalized { summary }) => {
            origin.send(ServerFrame::system(summary))?;

            let (view, opening) = {
                let game = state.game.read().await;
                let view = game.view_for(user_id);
                let opening = game.character(user_id).and_then(|pc| {
                    game.location(&pc.current_location_id).map(|loc| {
                        format!("You find yourself in {}.\n\n{}", loc.name, loc.description)
                    })
                });
                (view, opening)
            };
            if let Some(view) = view {
                origin.send(ServerFrame::GameState(view))?;
            }
            if let Some(text) = opening {
                origin.send(ServerFrame::narrative(text))?;
            }
        }
        None => {
            let snapshot = {
                let game = state.game.read().await;
                // The entry above guarantees the character exists.
                let Some(pc) = game.character(user_id) else {
                    return Ok(());
                };
                TurnSnapshot {
                    player_character: pc.clone(),
                    current_location: game.location(&pc.current_location_id).cloned(),
                    active_combat: pc
                        .active_combat_id
                        .as_deref()
                        .and_then(|id| game.active_combats.get(id))
                        .cloned(),
                    locations: game.locations.clone(),
                }
            };

            // The lock is released across the generation call so other
            // connections keep flowing while this turn is narrated.
            match state.engine.process(text, &snapshot).await {
                Ok(result) => {
                    {
                        let mut game = state.game.write().await;
                        result.delta.apply(&mut game, user_id);
                    }
                    broadcast(state, user_id, ServerFrame::narrative(result.narrative));
                    broadcast_game_state(state, user_id).await;
                }
                Err(e) => {
                    warn!("Turn processing failed for {}: {}", user_id, e);
                    // Report on the same channel; the channel stays open.
                    origin.send(ServerFrame::system(format!(
                        "Error processing your message: {}",
                        e
                    )))?;
                }
            }
        }
    }

    Ok(())
}

/// Send a frame to every channel currently attached for the user, in attach
/// order. A channel that fails mid-broadcast is treated as gone: it is
/// detached and delivery continues with the rest.
pub fn broadcast(state: &AppState, user_id: &str, frame: ServerFrame) {
    for channel in state.registry.channels_for(user_id) {
        if channel.send(frame.clone()).is_err() {
            warn!(
                "Channel {} for user {} gone during broadcast, detaching",
                channel.id(),
                user_id
            );
            state.registry.detach(user_id, channel.id());
        }
    }
}

/// Broadcast the user's current game state to all of their channels.
pub async fn broadcast_game_state(state: &AppState, user_id: &str) {
    let view = state.game.read().await.view_for(user_id);
    if let Some(view) = view {
        broadcast(state, user_id, ServerFrame::GameState(view));
    }
}
