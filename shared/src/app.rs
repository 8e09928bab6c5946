use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::capabilities::{KeyValueStore, LocationProvider};
use crate::catalog::DestinationCatalog;
use crate::config::GuideConfig;
use crate::favorites::FavoritesStore;
use crate::geo::{rank_nearby, Coordinates, NearbyDestination};
use crate::model::{Destination, DestinationId, User};
use crate::session::SessionStore;
use crate::AppError;

/// Outcome of startup rehydration. Failures degrade, they never abort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    pub user: Option<User>,
    pub favorites: usize,
    pub errors: Vec<AppError>,
}

impl RestoreReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Snapshot handed to the shell for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideView {
    pub is_authenticated: bool,
    pub user_name: Option<String>,
    pub favorite_ids: Vec<DestinationId>,
}

/// Root object of the core. Owns both stores and hands them the shared
/// storage; shells create one per process.
pub struct Guide<S, C, L>
where
    S: KeyValueStore,
    C: DestinationCatalog,
    L: LocationProvider,
{
    config: GuideConfig,
    session: SessionStore<S>,
    favorites: FavoritesStore<S>,
    catalog: Arc<C>,
    location: Arc<L>,
}

impl<S, C, L> Guide<S, C, L>
where
    S: KeyValueStore,
    C: DestinationCatalog,
    L: LocationProvider,
{
    pub fn new(
        config: GuideConfig,
        storage: Arc<S>,
        catalog: Arc<C>,
        location: Arc<L>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            session: SessionStore::new(Arc::clone(&storage), &config),
            favorites: FavoritesStore::new(storage),
            config,
            catalog,
            location,
        })
    }

    #[instrument(skip(self))]
    pub async fn restore(&self) -> RestoreReport {
        let mut report = RestoreReport::default();

        match self.session.restore().await {
            Ok(user) => report.user = user,
            Err(e) => report.errors.push(e.into()),
        }
        match self.favorites.restore().await {
            Ok(count) => report.favorites = count,
            Err(e) => report.errors.push(e.into()),
        }

        if report.is_clean() {
            info!(
                signed_in = report.user.is_some(),
                favorites = report.favorites,
                "guide restored"
            );
        } else {
            warn!(failures = report.errors.len(), "guide restored with failures");
        }
        report
    }

    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn favorites(&self) -> &FavoritesStore<S> {
        &self.favorites
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Favorited destinations in favorite order; ids missing from the
    /// catalog are left out.
    #[instrument(skip(self))]
    pub async fn favorite_destinations(&self) -> Result<Vec<Destination>, AppError> {
        let ids = self.favorites.ids().await;
        Ok(self.catalog.by_ids(&ids).await?)
    }

    /// Nearby destinations around the device's current position.
    #[instrument(skip(self))]
    pub async fn nearby(&self) -> Result<Vec<NearbyDestination>, AppError> {
        let origin = self.location.current_position().await?;
        self.nearby_from(origin).await
    }

    pub async fn nearby_from(
        &self,
        origin: Coordinates,
    ) -> Result<Vec<NearbyDestination>, AppError> {
        let all = self.catalog.all().await?;
        Ok(rank_nearby(
            origin,
            &all,
            self.config.nearby_radius_km,
            self.config.nearby_limit,
        ))
    }

    pub async fn view(&self) -> GuideView {
        let user = self.session.current_user().await;
        GuideView {
            is_authenticated: user.is_some(),
            user_name: user.map(|u| u.name),
            favorite_ids: self.favorites.ids().await,
        }
    }

    /// Flushes both stores before the process goes away.
    #[instrument(skip(self))]
    pub async fn teardown(self) -> Result<(), AppError> {
        self.session.persist().await?;
        self.favorites.persist().await?;
        info!("guide torn down");
        Ok(())
    }
}
