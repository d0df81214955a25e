use axum::extract::FromRef;

use crate::party_store::PartyStore;
use crate::slideshow::SlideDeck;
use crate::video_rotation::VideoRotation;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::ServerConfig;

pub type GuardedPartyStore = Arc<dyn PartyStore>;
pub type GuardedVideoRotation = Arc<VideoRotation>;
pub type GuardedSlideDeck = Arc<RwLock<SlideDeck>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub party_store: GuardedPartyStore,
    pub video_rotation: GuardedVideoRotation,
    pub slide_deck: GuardedSlideDeck,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        party_store: GuardedPartyStore,
        video_rotation: GuardedVideoRotation,
        slide_deck: SlideDeck,
    ) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            party_store,
            video_rotation,
            slide_deck: Arc::new(RwLock::new(slide_deck)),
        }
    }
}

impl FromRef<ServerState> for GuardedPartyStore {
    fn from_ref(input: &ServerState) -> Self {
        input.party_store.clone()
    }
}

impl FromRef<ServerState> for GuardedVideoRotation {
    fn from_ref(input: &ServerState) -> Self {
        input.video_rotation.clone()
    }
}

impl FromRef<ServerState> for GuardedSlideDeck {
    fn from_ref(input: &ServerState) -> Self {
        input.slide_deck.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
