//! A session is one listing workspace: the last request, the generated
//! listing, its secondary results and the attached images.
//!
//! Every generation bumps `generation`. Results are applied only with the
//! ticket of the current generation, so a slow response from an older run
//! can never overwrite a newer one.

pub mod handlers;
pub mod store;
pub mod workflow;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::images::{ImageCollection, ImageError, ImageRecord, NewImage};
use crate::listing::models::{Keyword, ListingData, ListingRequest};
use crate::listing::orchestrator::{AltText, SecondaryResults};

pub use store::SessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(Uuid),

    #[error("Image {0} not found")]
    ImageNotFound(Uuid),

    #[error("A newer generation has started for this session")]
    Superseded,

    #[error("No listing has been generated yet")]
    NoListing,

    #[error("{0:?} is not one of the offered alternatives")]
    NotAnAlternative(String),

    #[error("Keyword index {index} out of range (listing has {len} keywords)")]
    KeywordIndex { index: usize, len: usize },
}

/// Proof of which generation a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket(u64);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    generation: u64,
    request: Option<ListingRequest>,
    listing: Option<ListingData>,
    alternative_titles: Vec<String>,
    alternative_categories: Vec<String>,
    alt_texts: Vec<AltText>,
    seasonal_keywords: Vec<String>,
    images: ImageCollection,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            generation: 0,
            request: None,
            listing: None,
            alternative_titles: Vec::new(),
            alternative_categories: Vec::new(),
            alt_texts: Vec::new(),
            seasonal_keywords: Vec::new(),
            images: ImageCollection::default(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> Option<&ListingRequest> {
        self.request.as_ref()
    }

    pub fn listing(&self) -> Option<&ListingData> {
        self.listing.as_ref()
    }

    pub fn require_listing(&self) -> Result<&ListingData, SessionError> {
        self.listing.as_ref().ok_or(SessionError::NoListing)
    }

    pub fn alternative_titles(&self) -> &[String] {
        &self.alternative_titles
    }

    pub fn alternative_categories(&self) -> &[String] {
        &self.alternative_categories
    }

    pub fn alt_texts(&self) -> &[AltText] {
        &self.alt_texts
    }

    pub fn alt_text_for(&self, image_id: Uuid) -> Option<&AltText> {
        self.alt_texts.iter().find(|a| a.image_id == image_id)
    }

    pub fn seasonal_keywords(&self) -> &[String] {
        &self.seasonal_keywords
    }

    pub fn images(&self) -> &ImageCollection {
        &self.images
    }

    // ── generation lifecycle ────────────────────────────────────────────────

    /// Starts a new generation: clears previous outputs and returns the ticket
    /// plus a snapshot of the images to describe.
    pub fn begin_generation(
        &mut self,
        request: ListingRequest,
    ) -> (GenerationTicket, Vec<ImageRecord>) {
        self.generation += 1;
        self.request = Some(request);
        self.listing = None;
        self.alternative_titles.clear();
        self.alternative_categories.clear();
        self.alt_texts.clear();
        self.seasonal_keywords.clear();
        (
            GenerationTicket(self.generation),
            self.images.as_slice().to_vec(),
        )
    }

    fn check_ticket(&self, ticket: GenerationTicket) -> Result<(), SessionError> {
        if ticket.0 == self.generation {
            Ok(())
        } else {
            Err(SessionError::Superseded)
        }
    }

    pub fn apply_listing(
        &mut self,
        ticket: GenerationTicket,
        listing: ListingData,
    ) -> Result<(), SessionError> {
        self.check_ticket(ticket)?;
        self.listing = Some(listing);
        Ok(())
    }

    /// Alt texts for images removed while the calls were in flight are dropped.
    pub fn apply_secondary(
        &mut self,
        ticket: GenerationTicket,
        results: SecondaryResults,
    ) -> Result<(), SessionError> {
        self.check_ticket(ticket)?;
        self.alternative_titles = results.alternative_titles;
        self.alternative_categories = results.alternative_categories;
        let images = &self.images;
        self.alt_texts = results
            .alt_texts
            .into_iter()
            .filter(|alt| images.contains(alt.image_id))
            .collect();
        Ok(())
    }

    /// Ticket of the generation currently owning the session's outputs.
    pub fn current_ticket(&self) -> GenerationTicket {
        GenerationTicket(self.generation)
    }

    pub fn set_seasonal_keywords(
        &mut self,
        ticket: GenerationTicket,
        keywords: Vec<String>,
    ) -> Result<(), SessionError> {
        self.check_ticket(ticket)?;
        self.seasonal_keywords = keywords;
        Ok(())
    }

    // ── user mutations ──────────────────────────────────────────────────────

    /// Makes `title` the listing title; the previous title takes its place in
    /// the alternatives.
    pub fn select_alternative_title(&mut self, title: &str) -> Result<(), SessionError> {
        let listing = self.listing.as_mut().ok_or(SessionError::NoListing)?;
        swap_with_alternative(&mut listing.title, &mut self.alternative_titles, title)
    }

    /// Same swap as titles; the previous category stays selectable.
    pub fn select_alternative_category(&mut self, category: &str) -> Result<(), SessionError> {
        let listing = self.listing.as_mut().ok_or(SessionError::NoListing)?;
        swap_with_alternative(
            &mut listing.category,
            &mut self.alternative_categories,
            category,
        )
    }

    pub fn save_keyword(&mut self, index: usize, keyword: Keyword) -> Result<(), SessionError> {
        let listing = self.listing.as_mut().ok_or(SessionError::NoListing)?;
        let len = listing.keywords.len();
        let slot = listing
            .keywords
            .get_mut(index)
            .ok_or(SessionError::KeywordIndex { index, len })?;
        *slot = keyword;
        Ok(())
    }

    pub fn add_images(&mut self, batch: Vec<NewImage>) -> Result<Vec<ImageRecord>, ImageError> {
        self.images.add_batch(batch)
    }

    /// Removes the image and its alt text.
    pub fn remove_image(&mut self, image_id: Uuid) -> Result<ImageRecord, SessionError> {
        let removed = self
            .images
            .remove(image_id)
            .ok_or(SessionError::ImageNotFound(image_id))?;
        self.alt_texts.retain(|alt| alt.image_id != image_id);
        Ok(removed)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn swap_with_alternative(
    current: &mut String,
    alternatives: &mut [String],
    chosen: &str,
) -> Result<(), SessionError> {
    let slot = alternatives
        .iter_mut()
        .find(|alt| alt.as_str() == chosen)
        .ok_or_else(|| SessionError::NotAnAlternative(chosen.to_string()))?;
    std::mem::swap(current, slot);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::sample_image;
    use crate::listing::models::Volume;
    use crate::listing::validation::fixtures::valid_listing_json;
    use crate::listing::validation::validate_listing;

    fn listing(title: &str) -> ListingData {
        validate_listing(&valid_listing_json(title)).unwrap()
    }

    fn generated_session() -> (Session, GenerationTicket) {
        let mut session = Session::new();
        let (ticket, _) = session.begin_generation(ListingRequest::new("oak sign"));
        session
            .apply_listing(ticket, listing("Oak Sign, Rustic Decor, Gift"))
            .unwrap();
        session
            .apply_secondary(
                ticket,
                SecondaryResults {
                    alternative_titles: vec!["Walnut Sign".to_string(), "Maple Sign".to_string()],
                    alternative_categories: vec!["Art > Signs".to_string()],
                    alt_texts: Vec::new(),
                },
            )
            .unwrap();
        (session, ticket)
    }

    #[test]
    fn test_stale_ticket_is_rejected() {
        let mut session = Session::new();
        let (old, _) = session.begin_generation(ListingRequest::new("first"));
        let (new, _) = session.begin_generation(ListingRequest::new("second"));

        session.apply_listing(new, listing("Newer Listing Title Here")).unwrap();
        let err = session
            .apply_listing(old, listing("Older Listing Title Here"))
            .unwrap_err();

        assert!(matches!(err, SessionError::Superseded));
        assert_eq!(session.listing().unwrap().title, "Newer Listing Title Here");
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn test_begin_generation_clears_previous_outputs() {
        let (mut session, ticket) = generated_session();
        session
            .set_seasonal_keywords(ticket, vec!["winter wool scarf".to_string()])
            .unwrap();

        session.begin_generation(ListingRequest::new("again"));

        assert!(session.listing().is_none());
        assert!(session.alternative_titles().is_empty());
        assert!(session.seasonal_keywords().is_empty());
        assert_eq!(session.request().unwrap().description, "again");
    }

    #[test]
    fn test_seasonal_keywords_from_older_generation_are_rejected() {
        let (mut session, old) = generated_session();
        session.begin_generation(ListingRequest::new("brass lamp"));

        let err = session
            .set_seasonal_keywords(old, vec!["oak winter sign".to_string()])
            .unwrap_err();

        assert!(matches!(err, SessionError::Superseded));
        assert!(session.seasonal_keywords().is_empty());
    }

    #[test]
    fn test_select_alternative_title_swaps() {
        let (mut session, _) = generated_session();

        session.select_alternative_title("Maple Sign").unwrap();

        assert_eq!(session.listing().unwrap().title, "Maple Sign");
        assert_eq!(
            session.alternative_titles(),
            ["Walnut Sign", "Oak Sign, Rustic Decor, Gift"]
        );
    }

    #[test]
    fn test_select_alternative_category_swaps() {
        let (mut session, _) = generated_session();

        session.select_alternative_category("Art > Signs").unwrap();

        assert_eq!(session.listing().unwrap().category, "Art > Signs");
        assert_eq!(
            session.alternative_categories(),
            ["Home & Living > Home Decor > Signs"]
        );
    }

    #[test]
    fn test_select_unknown_alternative_fails() {
        let (mut session, _) = generated_session();
        let err = session.select_alternative_title("Made Up").unwrap_err();
        assert!(matches!(err, SessionError::NotAnAlternative(_)));
        assert_eq!(session.alternative_titles().len(), 2);

        let mut empty = Session::new();
        assert!(matches!(
            empty.select_alternative_title("Maple Sign"),
            Err(SessionError::NoListing)
        ));
    }

    #[test]
    fn test_save_keyword_replaces_in_place() {
        let (mut session, _) = generated_session();
        let edited = Keyword {
            keyword: "oak wall art".to_string(),
            volume: Volume::Low,
            reason: "edited".to_string(),
        };

        session.save_keyword(4, edited.clone()).unwrap();
        assert_eq!(session.listing().unwrap().keywords[4], edited);
        assert_eq!(session.listing().unwrap().keywords.len(), 13);

        let err = session.save_keyword(13, edited).unwrap_err();
        assert!(matches!(err, SessionError::KeywordIndex { index: 13, len: 13 }));
    }

    #[test]
    fn test_remove_image_drops_its_alt_text() {
        let (mut session, _) = generated_session();
        let added = session
            .add_images(vec![sample_image("a.jpg"), sample_image("b.jpg")])
            .unwrap();
        let (ticket, images) = session.begin_generation(ListingRequest::new("oak sign"));
        assert_eq!(images.len(), 2);
        session
            .apply_secondary(
                ticket,
                SecondaryResults {
                    alt_texts: added
                        .iter()
                        .map(|image| AltText {
                            image_id: image.id,
                            text: format!("alt for {}", image.file_name),
                            failed: false,
                        })
                        .collect(),
                    ..SecondaryResults::default()
                },
            )
            .unwrap();

        session.remove_image(added[0].id).unwrap();

        assert!(session.alt_text_for(added[0].id).is_none());
        assert!(session.alt_text_for(added[1].id).is_some());
        assert!(matches!(
            session.remove_image(added[0].id),
            Err(SessionError::ImageNotFound(_))
        ));
    }

    #[test]
    fn test_alt_texts_for_removed_images_are_not_applied() {
        let mut session = Session::new();
        let added = session.add_images(vec![sample_image("a.jpg")]).unwrap();
        let (ticket, _) = session.begin_generation(ListingRequest::new("oak sign"));
        session.remove_image(added[0].id).unwrap();

        session
            .apply_secondary(
                ticket,
                SecondaryResults {
                    alt_texts: vec![AltText {
                        image_id: added[0].id,
                        text: "late".to_string(),
                        failed: false,
                    }],
                    ..SecondaryResults::default()
                },
            )
            .unwrap();

        assert!(session.alt_texts().is_empty());
    }
}
