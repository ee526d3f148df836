//! Session-level flows that call the model. The store lock is taken only to
//! snapshot inputs and to apply results, never across a model call.

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{AppError, ListingError, EMPTY_DESCRIPTION_MESSAGE};
use crate::images::{check_capacity, fetch_all, parse_url_list, ImageError, ImageFetcher, ImageRecord, NewImage};
use crate::listing::generator::{generate_seasonal_keywords, regenerate_keyword};
use crate::listing::models::{Keyword, ListingRequest};
use crate::listing::orchestrator::{generate_primary, generate_secondary};
use crate::llm_client::LanguageModel;
use crate::session::{Session, SessionError, SessionStore};

/// Runs a full generation for the session and returns its final state.
///
/// Fails with `Conflict` if another generation started on the same session
/// before this one finished; the newer run owns the session.
pub async fn run_generation(
    llm: &dyn LanguageModel,
    store: &SessionStore,
    session_id: Uuid,
    request: ListingRequest,
) -> Result<Session, AppError> {
    if request.description.trim().is_empty() {
        return Err(AppError::Validation(EMPTY_DESCRIPTION_MESSAGE.to_string()));
    }

    let (ticket, images) = store
        .update(session_id, |s| {
            Ok::<_, SessionError>(s.begin_generation(request.clone()))
        })
        .await?;
    info!(
        "Generation started for session {session_id} with {} images",
        images.len()
    );

    let listing = generate_primary(llm, &request).await?;
    store
        .update(session_id, |s| s.apply_listing(ticket, listing.clone()))
        .await?;

    let secondary = generate_secondary(llm, &request, &listing, &images).await;
    store
        .update(session_id, |s| s.apply_secondary(ticket, secondary))
        .await?;

    Ok(store.get(session_id).await?)
}

/// Seasonal suggestions for `description`, or for the session's last request
/// when none is given. Fails with `Conflict` if a generation started while the
/// call was in flight.
pub async fn run_seasonal_keywords(
    llm: &dyn LanguageModel,
    store: &SessionStore,
    session_id: Uuid,
    description: Option<String>,
) -> Result<Vec<String>, AppError> {
    let (ticket, stored) = store
        .read(session_id, |s| {
            (s.current_ticket(), s.request().map(|r| r.description.clone()))
        })
        .await?;
    let description = description
        .filter(|d| !d.trim().is_empty())
        .or(stored)
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::Validation(EMPTY_DESCRIPTION_MESSAGE.to_string()))?;

    let keywords = generate_seasonal_keywords(llm, description.trim()).await;
    store
        .update(session_id, |s| s.set_seasonal_keywords(ticket, keywords.clone()))
        .await?;
    Ok(keywords)
}

/// Suggests a replacement for the keyword at `index`. The listing is not
/// changed; the caller saves the suggestion with a keyword edit.
pub async fn run_regenerate_keyword(
    llm: &dyn LanguageModel,
    store: &SessionStore,
    session_id: Uuid,
    index: usize,
) -> Result<Keyword, AppError> {
    let (description, keywords) = store
        .read(session_id, |s| -> Result<_, SessionError> {
            let listing = s.require_listing()?;
            let description = s
                .request()
                .map(|r| r.description.clone())
                .unwrap_or_default();
            Ok((description, listing.keywords.clone()))
        })
        .await??;

    let target = keywords
        .get(index)
        .ok_or(SessionError::KeywordIndex {
            index,
            len: keywords.len(),
        })?
        .keyword
        .clone();

    Ok(regenerate_keyword(llm, &description, &keywords, &target).await?)
}

pub async fn add_uploaded_images(
    store: &SessionStore,
    session_id: Uuid,
    batch: Vec<NewImage>,
) -> Result<Vec<ImageRecord>, AppError> {
    let added = store
        .update(session_id, |s| s.add_images(batch).map_err(AppError::from))
        .await?;
    info!("Session {session_id}: {} images uploaded", added.len());
    Ok(added)
}

/// Images fetched from a newline-separated URL list, plus a warning when some
/// fetches failed.
#[derive(Debug)]
pub struct UrlIngest {
    pub added: Vec<ImageRecord>,
    pub failure: Option<ListingError>,
}

pub async fn add_images_from_urls(
    fetcher: &dyn ImageFetcher,
    store: &SessionStore,
    session_id: Uuid,
    url_text: &str,
) -> Result<UrlIngest, AppError> {
    let urls = parse_url_list(url_text);
    if urls.is_empty() {
        return Err(ImageError::NoUrls.into());
    }

    // Cap check before any fetch starts.
    let current = store.read(session_id, |s| s.images().len()).await?;
    check_capacity(current, urls.len())?;

    let (fetched, failed) = fetch_all(fetcher, &urls).await;
    let added = store
        .update(session_id, |s| s.add_images(fetched).map_err(AppError::from))
        .await?;

    let failure = (failed > 0).then(|| {
        let failure = ListingError::ImageFetch {
            failed,
            requested: urls.len(),
        };
        warn!("Session {session_id}: {failure}");
        failure
    });
    Ok(UrlIngest { added, failure })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;

    use crate::images::{sample_image, MAX_IMAGES};
    use crate::listing::prompts::markers;
    use crate::listing::validation::fixtures::valid_listing_json;
    use crate::llm_client::testing::{Reply, ScriptedModel};

    /// Serves any URL containing "ok"; everything else fails.
    struct FakeFetcher;

    #[async_trait]
    impl ImageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<NewImage, ImageError> {
            if url.contains("ok") {
                Ok(NewImage {
                    file_name: "ok.png".to_string(),
                    mime_type: "image/png".to_string(),
                    content: Bytes::from_static(b"png"),
                })
            } else {
                Err(ImageError::Fetch {
                    url: url.to_string(),
                    reason: "status 404".to_string(),
                })
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_generation_does_not_overwrite_newer() {
        let llm = ScriptedModel::new()
            .on_delayed(
                "slow lamp",
                Duration::from_secs(5),
                Reply::json(&valid_listing_json("Slow Lamp, Old Listing, Stale")),
            )
            .on_delayed(
                "fast lamp",
                Duration::from_secs(1),
                Reply::json(&valid_listing_json("Fast Lamp, New Listing, Fresh")),
            );
        let store = SessionStore::new();
        let id = store.create().await.id;

        let (slow, fast) = tokio::join!(
            run_generation(&llm, &store, id, ListingRequest::new("slow lamp")),
            run_generation(&llm, &store, id, ListingRequest::new("fast lamp")),
        );

        assert!(matches!(slow, Err(AppError::Conflict(_))));
        assert!(fast.is_ok());
        let session = store.get(id).await.unwrap();
        assert_eq!(session.listing().unwrap().title, "Fast Lamp, New Listing, Fresh");
        assert_eq!(session.request().unwrap().description, "fast lamp");
        assert_eq!(session.generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_seasonal_keywords_do_not_survive_newer_generation() {
        let llm = ScriptedModel::new()
            .on_delayed(
                markers::SEASONAL,
                Duration::from_secs(5),
                Reply::json(&json!(["oak winter sign"])),
            )
            .on_delayed(
                "brass lamp",
                Duration::from_secs(1),
                Reply::json(&valid_listing_json("Brass Lamp, Desk Light, Gift")),
            )
            .on(
                markers::LISTING,
                Reply::json(&valid_listing_json("Oak Sign, Rustic Decor, Gift")),
            );
        let store = SessionStore::new();
        let id = store.create().await.id;
        run_generation(&llm, &store, id, ListingRequest::new("oak sign"))
            .await
            .unwrap();

        let (seasonal, newer) = tokio::join!(
            run_seasonal_keywords(&llm, &store, id, None),
            run_generation(&llm, &store, id, ListingRequest::new("brass lamp")),
        );

        assert!(matches!(seasonal, Err(AppError::Conflict(_))));
        assert!(newer.is_ok());
        let session = store.get(id).await.unwrap();
        assert_eq!(session.listing().unwrap().title, "Brass Lamp, Desk Light, Gift");
        assert!(session.seasonal_keywords().is_empty());
    }

    #[tokio::test]
    async fn test_generation_applies_primary_and_secondary() {
        let llm = ScriptedModel::new()
            .on(
                markers::LISTING,
                Reply::json(&valid_listing_json("Oak Sign, Rustic Decor, Gift")),
            )
            .on(markers::ALT_TITLES, Reply::json(&json!(["Walnut Sign, Cabin Decor"])))
            .on(markers::ALT_CATEGORIES, Reply::json(&json!(["Art > Signs"])))
            .on(markers::ALT_TEXT, Reply::text("Rustic oak sign"));
        let store = SessionStore::new();
        let id = store.create().await.id;
        add_uploaded_images(&store, id, vec![sample_image("a.jpg")])
            .await
            .unwrap();

        let session = run_generation(&llm, &store, id, ListingRequest::new("oak sign"))
            .await
            .unwrap();

        assert_eq!(session.listing().unwrap().title, "Oak Sign, Rustic Decor, Gift");
        assert_eq!(session.alternative_titles(), ["Walnut Sign, Cabin Decor"]);
        assert_eq!(session.alternative_categories(), ["Art > Signs"]);
        assert_eq!(session.alt_texts().len(), 1);
        assert_eq!(session.alt_texts()[0].text, "Rustic oak sign");
    }

    #[tokio::test]
    async fn test_failed_primary_leaves_no_listing_and_skips_secondary() {
        let llm = ScriptedModel::new().on(markers::LISTING, Reply::text("not json"));
        let store = SessionStore::new();
        let id = store.create().await.id;

        let err = run_generation(&llm, &store, id, ListingRequest::new("oak sign"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Listing(ListingError::Generation(_))));
        assert!(store.get(id).await.unwrap().listing().is_none());
        assert_eq!(llm.count_matching(markers::ALT_TITLES), 0);
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected_without_model_call() {
        let llm = ScriptedModel::new();
        let store = SessionStore::new();
        let id = store.create().await.id;

        let err = run_generation(&llm, &store, id, ListingRequest::new("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == EMPTY_DESCRIPTION_MESSAGE));
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_seasonal_keywords_fall_back_to_session_description() {
        let llm = ScriptedModel::new()
            .on(markers::LISTING, Reply::json(&valid_listing_json("Oak Sign, Rustic Decor, Gift")))
            .on(markers::SEASONAL, Reply::json(&json!(["winter cabin sign"])));
        let store = SessionStore::new();
        let id = store.create().await.id;

        let missing = run_seasonal_keywords(&llm, &store, id, None).await;
        assert!(matches!(missing, Err(AppError::Validation(_))));

        run_generation(&llm, &store, id, ListingRequest::new("oak cabin sign"))
            .await
            .unwrap();
        let keywords = run_seasonal_keywords(&llm, &store, id, None).await.unwrap();

        assert_eq!(keywords, vec!["winter cabin sign"]);
        let seasonal = llm
            .requests()
            .into_iter()
            .find(|r| r.prompt.contains(markers::SEASONAL))
            .unwrap();
        assert!(seasonal.prompt.contains("\"oak cabin sign\""));
        assert_eq!(
            store.get(id).await.unwrap().seasonal_keywords(),
            ["winter cabin sign"]
        );
    }

    #[tokio::test]
    async fn test_regenerate_keyword_leaves_listing_untouched() {
        let llm = ScriptedModel::new()
            .on(markers::LISTING, Reply::json(&valid_listing_json("Oak Sign, Rustic Decor, Gift")))
            .on(
                markers::REGENERATE,
                Reply::json(&json!({"keyword": "cabin wall art", "volume": "High", "reason": "new"})),
            );
        let store = SessionStore::new();
        let id = store.create().await.id;
        run_generation(&llm, &store, id, ListingRequest::new("oak sign"))
            .await
            .unwrap();
        let before = store.get(id).await.unwrap().listing().cloned().unwrap();

        let suggestion = run_regenerate_keyword(&llm, &store, id, 0).await.unwrap();

        assert_eq!(suggestion.keyword, "cabin wall art");
        assert_eq!(store.get(id).await.unwrap().listing(), Some(&before));

        let out_of_range = run_regenerate_keyword(&llm, &store, id, 13).await;
        assert!(matches!(out_of_range, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_url_ingest_keeps_successes_and_counts_failures() {
        let store = SessionStore::new();
        let id = store.create().await.id;

        let ingest = add_images_from_urls(
            &FakeFetcher,
            &store,
            id,
            "https://cdn.example/ok-1.png\n\nhttps://cdn.example/missing.png\nhttps://cdn.example/ok-2.png",
        )
        .await
        .unwrap();

        assert_eq!(ingest.added.len(), 2);
        assert!(matches!(
            ingest.failure,
            Some(ListingError::ImageFetch {
                failed: 1,
                requested: 3
            })
        ));
        assert_eq!(store.get(id).await.unwrap().images().len(), 2);
    }

    #[tokio::test]
    async fn test_url_ingest_checks_cap_before_fetching() {
        let store = SessionStore::new();
        let id = store.create().await.id;
        let batch = (0..MAX_IMAGES - 1).map(|i| sample_image(&format!("{i}.jpg"))).collect();
        add_uploaded_images(&store, id, batch).await.unwrap();

        let err = add_images_from_urls(
            &FakeFetcher,
            &store,
            id,
            "https://cdn.example/ok-1.png\nhttps://cdn.example/ok-2.png",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ImageLimit(_)));
        assert_eq!(store.get(id).await.unwrap().images().len(), MAX_IMAGES - 1);

        let empty = add_images_from_urls(&FakeFetcher, &store, id, " \n ").await;
        assert!(matches!(empty, Err(AppError::Validation(_))));
    }
}
