//! Per-card resolution: Fetch → Parse → Extract → Favicon → Render.
//!
//! Every card gets its own worker thread and its own [`CardResolution`];
//! workers report [`RenderEvent`]s over a channel to the [`CardBoard`],
//! which owns the display regions. A worker always sends its main render
//! before its favicon patch.

use std::sync::mpsc;
use std::sync::Arc;

use serde::Serialize;

use super::{CardId, CardResolution, ResolutionState, ResolvedMetadata};
use crate::card::{Card, CardView};
use crate::config::ResolverConfig;
use crate::dom::parser::parse_document;
use crate::extract::{site_base, Extracted, HeuristicExtractor};
use crate::net::favicon::{FaviconLookup, FaviconResolver};
use crate::net::fetch::normalize_url;
use crate::net::proxy::ProxyCascade;
use crate::net::Transport;

/// Message from a card worker to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    Rendered {
        id: CardId,
        metadata: ResolvedMetadata,
    },
    FallbackRendered {
        id: CardId,
        metadata: ResolvedMetadata,
    },
    /// Favicon-only patch once the background probe settles.
    FaviconSettled {
        id: CardId,
        favicon: Option<String>,
    },
    /// The worker is done; carries its final state record.
    Finished { resolution: CardResolution },
}

/// The fetch/extract/favicon pipeline shared by all card workers.
pub struct MetadataResolver {
    cascade: ProxyCascade,
    extractor: HeuristicExtractor,
    favicons: FaviconResolver,
}

impl MetadataResolver {
    pub fn new(config: &ResolverConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            cascade: ProxyCascade::new(config, Arc::clone(&transport)),
            extractor: HeuristicExtractor::new(config.description_denylist.clone()),
            favicons: FaviconResolver::new(transport),
        }
    }

    /// Drive one card to a terminal state, sending render events to `sink`.
    ///
    /// Blocks the calling thread through backoffs and the favicon probe.
    pub fn resolve(
        &self,
        id: CardId,
        card: &Card,
        sink: &mpsc::Sender<RenderEvent>,
    ) -> CardResolution {
        let mut res = CardResolution::new(id);
        step(&mut res, ResolutionState::Fetching { attempt: 0 });

        let target = match normalize_url(&card.target_url) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("card {}: {}", id.0, e);
                return self.fall_back(res, card, sink);
            }
        };
        let Some(base) = site_base(&target) else {
            log::warn!("card {}: no usable origin for {}", id.0, target);
            return self.fall_back(res, card, sink);
        };

        let fetched = self.cascade.fetch_observed(target.as_str(), parse_document, |attempt| {
            if attempt > 0 {
                step(&mut res, ResolutionState::Fetching { attempt });
            }
            res.record_attempt();
        });
        let document = match fetched {
            Ok(fetched) => fetched.value,
            Err(exhausted) => {
                log::warn!("card {}: {}", id.0, exhausted);
                return self.fall_back(res, card, sink);
            }
        };

        step(&mut res, ResolutionState::Parsing);
        log::debug!("Parsing: {}", target);

        step(&mut res, ResolutionState::Extracting);
        let extracted = self.extractor.extract(&document, &base);
        let mut metadata = apply_overrides(card, extracted);

        step(&mut res, ResolutionState::AwaitingFavicon);
        let probe = match self.favicons.resolve(&document, &base) {
            FaviconLookup::Found(url) => {
                metadata.favicon = Some(url);
                None
            }
            FaviconLookup::Probing(probe) => Some(probe),
        };
        drop(document);

        step(&mut res, ResolutionState::Rendered);
        log::info!(
            "Resolved {} as {:?}",
            card.target_url,
            metadata.title.as_deref().unwrap_or_default()
        );
        let _ = sink.send(RenderEvent::Rendered { id, metadata });

        if let Some(probe) = probe {
            let favicon = probe.wait();
            let _ = sink.send(RenderEvent::FaviconSettled { id, favicon });
        }

        res
    }

    fn fall_back(
        &self,
        mut res: CardResolution,
        card: &Card,
        sink: &mpsc::Sender<RenderEvent>,
    ) -> CardResolution {
        step(&mut res, ResolutionState::FallbackRendered);
        let _ = sink.send(RenderEvent::FallbackRendered {
            id: res.id,
            metadata: card.fallback_metadata(),
        });
        res
    }
}

fn step(res: &mut CardResolution, next: ResolutionState) {
    if let Err(e) = res.advance(next) {
        log::error!("{}", e);
    }
}

/// Card attributes win over anything scraped from the page.
pub fn apply_overrides(card: &Card, extracted: Extracted) -> ResolvedMetadata {
    ResolvedMetadata {
        title: card.override_title.clone().or(Some(extracted.title)),
        description: card
            .override_description
            .clone()
            .or(extracted.description),
        favicon: None,
        avatar: card.override_avatar.clone().or(extracted.avatar),
    }
}

/// One card in the page-level arena.
#[derive(Debug, Clone, Serialize)]
pub struct CardSlot {
    pub card: Card,
    pub view: CardView,
    pub state: ResolutionState,
    pub attempts: usize,
}

/// Page-level owner of every card's display regions, indexed by [`CardId`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct CardBoard {
    slots: Vec<CardSlot>,
}

impl CardBoard {
    pub fn new(cards: Vec<Card>) -> Self {
        let slots = cards
            .into_iter()
            .map(|card| CardSlot {
                view: CardView::initial(&card),
                card,
                state: ResolutionState::Idle,
                attempts: 0,
            })
            .collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[CardSlot] {
        &self.slots
    }

    /// Apply one worker event to the matching slot.
    pub fn apply(&mut self, event: RenderEvent) {
        match event {
            RenderEvent::Rendered { id, metadata } => {
                if let Some(slot) = self.slots.get_mut(id.0) {
                    slot.view.render(&slot.card, &metadata);
                    slot.state = ResolutionState::Rendered;
                }
            }
            RenderEvent::FallbackRendered { id, metadata } => {
                if let Some(slot) = self.slots.get_mut(id.0) {
                    slot.view.render(&slot.card, &metadata);
                    slot.state = ResolutionState::FallbackRendered;
                }
            }
            RenderEvent::FaviconSettled { id, favicon } => {
                if let Some(slot) = self.slots.get_mut(id.0) {
                    slot.view.patch_favicon(favicon.as_deref());
                }
            }
            RenderEvent::Finished { resolution } => {
                if let Some(slot) = self.slots.get_mut(resolution.id.0) {
                    slot.state = resolution.state();
                    slot.attempts = resolution.attempts();
                }
            }
        }
    }

    /// Start one worker per card. Events arrive on the returned receiver,
    /// which closes once every worker has finished.
    pub fn spawn_all(&self, resolver: Arc<MetadataResolver>) -> mpsc::Receiver<RenderEvent> {
        let (tx, rx) = mpsc::channel();
        for (idx, slot) in self.slots.iter().enumerate() {
            let tx = tx.clone();
            let resolver = Arc::clone(&resolver);
            let card = slot.card.clone();
            std::thread::spawn(move || {
                let resolution = resolver.resolve(CardId(idx), &card, &tx);
                let _ = tx.send(RenderEvent::Finished { resolution });
            });
        }
        rx
    }

    /// Resolve every card and apply events until all workers are done.
    pub fn resolve_all(&mut self, resolver: Arc<MetadataResolver>) {
        let rx = self.spawn_all(resolver);
        for event in rx {
            self.apply(event);
        }
    }
}
