//! Install / activate lifecycle.
//!
//! ```text
//! Parsed -> Installing -> Waiting -> Activating -> Active -> Superseded
//!               |            |            |
//!               +------------+------------+--> Redundant
//! ```
//!
//! Install writes the whole asset manifest in one transaction or not at
//! all. Activation deletes every store that is not one of the two current
//! names, records the pair, then claims clients.

use std::fmt;

use futures_util::future::try_join_all;
use pwacache_core::{CachedEntry, Error, Request, Response};
use serde::Serialize;

use super::CacheEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Parsed,
    Installing,
    Waiting,
    Activating,
    Active,
    Superseded,
    Redundant,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleState::Parsed => "parsed",
            LifecycleState::Installing => "installing",
            LifecycleState::Waiting => "waiting",
            LifecycleState::Activating => "activating",
            LifecycleState::Active => "active",
            LifecycleState::Superseded => "superseded",
            LifecycleState::Redundant => "redundant",
        })
    }
}

fn is_valid_transition(from: LifecycleState, to: LifecycleState) -> bool {
    use LifecycleState::*;
    matches!(
        (from, to),
        (Parsed, Installing)
            | (Installing, Waiting)
            | (Installing, Redundant)
            | (Waiting, Activating)
            | (Waiting, Redundant)
            | (Activating, Active)
            | (Activating, Redundant)
            | (Active, Superseded)
    )
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Lifecycle {
    state: LifecycleState,
    controlling: bool,
    claims: u64,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self { state: LifecycleState::Parsed, controlling: false, claims: 0 }
    }
}

/// Host-visible lifecycle snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleStatus {
    pub state: LifecycleState,
    pub controlling: bool,
    /// Number of times this engine has claimed clients.
    pub claims: u64,
    pub static_store: String,
    pub dynamic_store: String,
}

impl CacheEngine {
    async fn transition(&self, to: LifecycleState) -> Result<(), Error> {
        let mut lifecycle = self.lifecycle.write().await;
        let from = lifecycle.state;
        if !is_valid_transition(from, to) {
            return Err(Error::InvalidState { from: from.to_string(), to: to.to_string() });
        }
        lifecycle.state = to;
        if to != LifecycleState::Active {
            lifecycle.controlling = false;
        }
        tracing::info!(%from, %to, static_store = %self.config.static_store_name(), "lifecycle transition");
        Ok(())
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.read().await.state
    }

    /// Whether this engine currently answers intercepted requests.
    pub async fn is_controlling(&self) -> bool {
        let lifecycle = self.lifecycle.read().await;
        lifecycle.state == LifecycleState::Active && lifecycle.controlling
    }

    pub async fn status(&self) -> LifecycleStatus {
        let lifecycle = *self.lifecycle.read().await;
        LifecycleStatus {
            state: lifecycle.state,
            controlling: lifecycle.controlling,
            claims: lifecycle.claims,
            static_store: self.config.static_store_name(),
            dynamic_store: self.config.dynamic_store_name(),
        }
    }

    async fn fetch_manifest_asset(&self, request: &Request) -> Result<Response, Error> {
        let response = self
            .network
            .fetch(request)
            .await
            .map_err(|e| Error::InstallFailed(format!("{}: {}", request.url, e)))?;

        if !response.is_ok() {
            return Err(Error::InstallFailed(format!("{}: status {}", request.url, response.status)));
        }

        Ok(response)
    }

    /// Fetch every manifest asset, then write them all in one transaction.
    async fn precache(&self) -> Result<usize, Error> {
        let store = self.config.static_store_name();

        let requests = self
            .config
            .asset_manifest
            .iter()
            .map(|path| {
                self.config
                    .url_for(path)
                    .map(Request::get)
                    .ok_or_else(|| Error::InstallFailed(format!("unresolvable manifest path: {path}")))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let responses = try_join_all(requests.iter().map(|r| self.fetch_manifest_asset(r))).await?;

        let entries = requests
            .iter()
            .zip(responses.iter())
            .map(|(request, response)| CachedEntry::from_response(&store, request, response))
            .collect();

        self.db.put_entries_atomic(entries).await?;
        self.db.open_store(&store).await?;

        for request in &requests {
            if self.db.match_entry(&store, request).await?.is_none() {
                return Err(Error::InstallFailed(format!("{} missing after install", request.url)));
            }
        }

        Ok(requests.len())
    }

    /// Install this version: pre-populate the static store.
    ///
    /// On failure the worker becomes redundant and any previously active
    /// version keeps its stores.
    pub async fn install(&self) -> Result<(), Error> {
        self.transition(LifecycleState::Installing).await?;

        match self.precache().await {
            Ok(count) => {
                tracing::info!(assets = count, store = %self.config.static_store_name(), "installed");
                self.transition(LifecycleState::Waiting).await
            }
            Err(err) => {
                tracing::error!("install failed: {}", err);
                self.transition(LifecycleState::Redundant).await?;
                Err(err)
            }
        }
    }

    /// Activate this version.
    ///
    /// Returns the names of the condemned stores that were deleted.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        self.transition(LifecycleState::Activating).await?;

        let keep = self.config.current_store_names();
        let cleanup = async {
            let deleted = self.db.delete_stores_not_in(&keep).await?;
            self.db.record_activation(&keep[0], &keep[1]).await?;
            Ok::<_, Error>(deleted)
        };

        match cleanup.await {
            Ok(deleted) => {
                for name in &deleted {
                    tracing::info!(store = %name, "deleted condemned store");
                }
                self.transition(LifecycleState::Active).await?;
                self.claim_clients().await;
                Ok(deleted)
            }
            Err(err) => {
                tracing::error!("activation failed: {}", err);
                self.transition(LifecycleState::Redundant).await?;
                Err(err)
            }
        }
    }

    /// Explicit takeover signal: activate a waiting version right away.
    pub async fn skip_waiting(&self) -> Result<Vec<String>, Error> {
        let state = self.state().await;
        if state != LifecycleState::Waiting {
            return Err(Error::InvalidState { from: state.to_string(), to: LifecycleState::Activating.to_string() });
        }
        tracing::debug!("skipping wait");
        self.activate().await
    }

    /// Take control of already-open clients without a reload.
    async fn claim_clients(&self) {
        let mut lifecycle = self.lifecycle.write().await;
        lifecycle.controlling = true;
        lifecycle.claims += 1;
        tracing::info!(static_store = %self.config.static_store_name(), claims = lifecycle.claims, "claimed clients");
    }

    /// Hand control to a newer version.
    ///
    /// Cache writes issued after this point are dropped; writes already in
    /// flight still land until `settle_writes` returns.
    pub async fn supersede(&self) -> Result<(), Error> {
        self.transition(LifecycleState::Superseded).await?;
        self.retire();
        Ok(())
    }

    /// Activate this waiting version in place of `previous`.
    ///
    /// `previous` stops controlling and its in-flight writes settle before
    /// condemned stores are deleted, so none of them can be recreated.
    pub async fn take_over(&self, previous: &CacheEngine) -> Result<Vec<String>, Error> {
        let state = self.state().await;
        if state != LifecycleState::Waiting {
            return Err(Error::InvalidState { from: state.to_string(), to: LifecycleState::Activating.to_string() });
        }
        if previous.state().await == LifecycleState::Active {
            previous.supersede().await?;
        }
        previous.settle_writes().await;
        self.skip_waiting().await
    }

    /// Resume control if the last activation recorded this version's stores.
    ///
    /// Returns true if the engine is now active without reinstalling.
    pub async fn resume(&self) -> Result<bool, Error> {
        let Some(registration) = self.db.active_registration().await? else {
            return Ok(false);
        };

        let [static_store, dynamic_store] = self.config.current_store_names();
        if registration.static_store != static_store || registration.dynamic_store != dynamic_store {
            tracing::info!(
                active = %registration.static_store,
                current = %static_store,
                "recorded version differs, reinstall required"
            );
            return Ok(false);
        }

        if !self.db.has_store(&static_store).await? {
            return Ok(false);
        }

        let mut lifecycle = self.lifecycle.write().await;
        if lifecycle.state != LifecycleState::Parsed {
            return Err(Error::InvalidState {
                from: lifecycle.state.to_string(),
                to: LifecycleState::Active.to_string(),
            });
        }

        // Writes that landed after the last activation may have recreated old stores.
        let keep = [static_store.clone(), dynamic_store.clone()];
        for name in self.db.delete_stores_not_in(&keep).await? {
            tracing::info!(store = %name, "deleted condemned store");
        }
        lifecycle.state = LifecycleState::Active;
        lifecycle.controlling = true;
        lifecycle.claims += 1;
        tracing::info!(%static_store, %dynamic_store, "resumed active version");
        Ok(true)
    }

    /// Bring this version into control: resume, or install and (when
    /// configured) activate straight away.
    pub async fn start(&self) -> Result<LifecycleState, Error> {
        if self.resume().await? {
            return Ok(LifecycleState::Active);
        }

        self.install().await?;
        if self.config.skip_waiting {
            self.skip_waiting().await?;
        }
        Ok(self.state().await)
    }
}
